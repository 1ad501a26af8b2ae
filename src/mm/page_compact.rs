use crate::error::{Error, Result};
use crate::mm::page::SlottedPage;
use crate::mm::page_header::{PageHeader, RecordEntry};
use crate::mm::page_ops::PageOps;
use crate::mm::BLOCK_SZ;

// 页面紧缩：记录区整体平移，保持记录区连续，槽号不变
pub(crate) trait PageCompact {
    /// 再分配一个目录项之后剩余的空闲字节数
    fn free_space(&self) -> usize;
    /// 能否再放下 size 字节（恰好放满也算有空间）
    fn has_room(&self, size: usize) -> bool;
    /// 把 [end_free + 1, start) 整体移动 end - start 字节，并修正其中记录的 loc
    fn slide(&mut self, start: usize, end: usize) -> Result<()>;
}

impl PageCompact for SlottedPage {
    fn free_space(&self) -> usize {
        available(self).unwrap_or(0)
    }

    fn has_room(&self, size: usize) -> bool {
        // 连目录项都放不下时，空记录也不能再加
        available(self).map_or(false, |free| size <= free)
    }

    fn slide(&mut self, start: usize, end: usize) -> Result<()> {
        let shift = end as isize - start as isize;
        if shift == 0 {
            return Ok(());
        }
        let region_start = self.header.end_free as usize + 1;
        let dest = region_start as isize + shift;
        if start < region_start
            || start > BLOCK_SZ
            || dest < self.header.directory_end() as isize
            || start as isize + shift > BLOCK_SZ as isize
        {
            return Err(Error::CorruptedPage(format!(
                "block {}: cannot slide [{}, {}) by {}",
                self.block_id(),
                region_start,
                start,
                shift
            )));
        }
        let dest = dest as usize;
        self.address_mut(0, BLOCK_SZ)?
            .copy_within(region_start..start, dest);

        // 只平移完全落在被移动区间内的记录
        for id in self.ids()? {
            let mut entry = self.get_entry(id)?;
            if entry.loc as usize + entry.size as usize <= start {
                entry.loc = (entry.loc as isize + shift) as u16;
                self.put_entry(id, entry)?;
            }
        }
        self.header.end_free = (self.header.end_free as isize + shift) as u16;
        self.put_header()
    }
}

// 空闲区在预留一个新目录项后剩余的字节数；目录项放不下时为 None
fn available(page: &SlottedPage) -> Option<usize> {
    let free_end = page.header.end_free as usize + 1;
    let reserved = PageHeader::SIZE + RecordEntry::SIZE * (page.header.num_records as usize + 1);
    free_end.checked_sub(reserved)
}
