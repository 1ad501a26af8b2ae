use crate::error::{Error, Result};
use crate::fm::BlockId;
use crate::mm::page_header::{PageHeader, RecordEntry};
use crate::mm::BLOCK_SZ;
use crate::rm::types::RecordId;

/// 槽页：对一个块的字节做“目录 + 堆”式管理。
///
/// 块布局：
/// ```text
/// [0..2]              num_records: u16 (little-endian)
/// [2..4]              end_free: u16
/// [4*id..4*id+2]      size[id]
/// [4*id+2..4*id+4]    loc[id]
/// [end_free+1..B]     记录数据，从块尾向前增长
/// ```
/// 目录从页头之后向高地址增长，记录从块尾向低地址增长，两者之间为空闲区。
pub struct SlottedPage {
    pub(crate) header: PageHeader,
    block: Vec<u8>,
    block_id: BlockId,
}

impl SlottedPage {
    /// 一个空页能容纳的最大记录长度（需要同时放下一个目录项）
    pub const MAX_RECORD_SIZE: usize = BLOCK_SZ - PageHeader::SIZE - RecordEntry::SIZE;

    /// 包装一个块。`is_new` 为真时初始化页头，否则从块中读取并校验页头
    pub fn new(mut block: Vec<u8>, block_id: BlockId, is_new: bool) -> Result<SlottedPage> {
        if block.len() < BLOCK_SZ {
            return Err(Error::BlockTooSmall {
                expected: BLOCK_SZ,
                actual: block.len(),
            });
        }
        block.truncate(BLOCK_SZ);
        let mut page = SlottedPage {
            header: PageHeader::empty(BLOCK_SZ),
            block,
            block_id,
        };
        if is_new {
            page.put_header()?;
        } else {
            page.header = page.get_header()?;
            page.check_header()?;
        }
        Ok(page)
    }

    pub fn block_id(&self) -> BlockId {
        self.block_id
    }

    /// 当前块内容，写回存储时使用
    pub fn block(&self) -> &[u8] {
        &self.block
    }

    pub fn into_block(self) -> Vec<u8> {
        self.block
    }

    pub fn num_records(&self) -> u16 {
        self.header.num_records
    }

    pub fn end_free(&self) -> u16 {
        self.header.end_free
    }

    fn check_header(&self) -> Result<()> {
        let end_free = self.header.end_free as usize;
        if end_free >= BLOCK_SZ {
            return Err(Error::CorruptedPage(format!(
                "block {}: end_free {} outside block",
                self.block_id, end_free
            )));
        }
        if self.header.directory_end() > end_free + 1 {
            return Err(Error::CorruptedPage(format!(
                "block {}: {} directory entries overlap record area at {}",
                self.block_id,
                self.header.num_records,
                end_free + 1
            )));
        }
        Ok(())
    }

    pub(crate) fn get_header(&self) -> Result<PageHeader> {
        Ok(PageHeader {
            num_records: self.get_n(0)?,
            end_free: self.get_n(2)?,
        })
    }

    pub(crate) fn put_header(&mut self) -> Result<()> {
        let PageHeader {
            num_records,
            end_free,
        } = self.header;
        self.put_n(0, num_records)?;
        self.put_n(2, end_free)
    }

    /// 读取目录项，id 必须在 1..=num_records 范围内
    pub(crate) fn get_entry(&self, id: RecordId) -> Result<RecordEntry> {
        if id == 0 || id > self.header.num_records {
            return Err(Error::InvalidRecordId(id));
        }
        let offset = RecordEntry::offset(id);
        let entry = RecordEntry {
            size: self.get_n(offset)?,
            loc: self.get_n(offset + 2)?,
        };
        if !entry.is_deleted() && entry.loc as usize + entry.size as usize > BLOCK_SZ {
            return Err(Error::CorruptedPage(format!(
                "block {}: record {} at {}+{} outside block",
                self.block_id, id, entry.loc, entry.size
            )));
        }
        Ok(entry)
    }

    pub(crate) fn put_entry(&mut self, id: RecordId, entry: RecordEntry) -> Result<()> {
        if id == 0 {
            return Err(Error::InvalidRecordId(id));
        }
        let offset = RecordEntry::offset(id);
        self.put_n(offset, entry.size)?;
        self.put_n(offset + 2, entry.loc)
    }

    /// 读取偏移处的 2 字节整数
    pub(crate) fn get_n(&self, offset: usize) -> Result<u16> {
        let bytes = self.address(offset, 2)?;
        Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
    }

    /// 在偏移处写入 2 字节整数
    pub(crate) fn put_n(&mut self, offset: usize, n: u16) -> Result<()> {
        self.address_mut(offset, 2)?.copy_from_slice(&n.to_le_bytes());
        Ok(())
    }

    /// 带边界检查的块内切片
    pub(crate) fn address(&self, offset: usize, len: usize) -> Result<&[u8]> {
        let end = self.bounded(offset, len)?;
        Ok(&self.block[offset..end])
    }

    pub(crate) fn address_mut(&mut self, offset: usize, len: usize) -> Result<&mut [u8]> {
        let end = self.bounded(offset, len)?;
        Ok(&mut self.block[offset..end])
    }

    fn bounded(&self, offset: usize, len: usize) -> Result<usize> {
        match offset.checked_add(len) {
            Some(end) if end <= self.block.len() => Ok(end),
            _ => Err(Error::CorruptedPage(format!(
                "block {}: access {}+{} outside block",
                self.block_id, offset, len
            ))),
        }
    }
}
