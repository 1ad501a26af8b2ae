use crate::error::{Error, Result};
use crate::mm::page::SlottedPage;
use crate::mm::page_compact::PageCompact;
use crate::mm::page_header::RecordEntry;
use crate::rm::types::RecordId;

/// 在页面上操作记录的接口
pub trait PageOps {
    /// 插入一条记录，返回槽 ID
    fn add(&mut self, data: &[u8]) -> Result<RecordId>;
    /// 根据槽 ID 获取记录数据切片，已删除时返回 None
    fn get(&self, id: RecordId) -> Result<Option<&[u8]>>;
    /// 替换指定槽的记录内容，槽 ID 不变
    fn put(&mut self, id: RecordId, data: &[u8]) -> Result<()>;
    /// 删除指定槽 ID 的记录并收紧空洞
    fn del(&mut self, id: RecordId) -> Result<()>;
    /// 所有未删除记录的槽 ID，升序
    fn ids(&self) -> Result<Vec<RecordId>>;
}

impl PageOps for SlottedPage {
    fn add(&mut self, data: &[u8]) -> Result<RecordId> {
        if !self.has_room(data.len()) {
            return Err(Error::NoRoom {
                needed: data.len(),
                available: self.free_space(),
            });
        }
        let id = self.header.num_records + 1;
        let size = data.len() as u16;
        let end_free = self.header.end_free - size;
        let loc = end_free + 1;
        self.address_mut(loc as usize, data.len())?
            .copy_from_slice(data);
        self.put_entry(id, RecordEntry { size, loc })?;
        // 页头最后更新，之前任何一步失败都不会让新记录可见
        self.header.num_records = id;
        self.header.end_free = end_free;
        self.put_header()?;
        Ok(id)
    }

    fn get(&self, id: RecordId) -> Result<Option<&[u8]>> {
        let entry = self.get_entry(id)?;
        if entry.is_deleted() {
            return Ok(None);
        }
        Ok(Some(self.address(entry.loc as usize, entry.size as usize)?))
    }

    fn put(&mut self, id: RecordId, data: &[u8]) -> Result<()> {
        let entry = self.get_entry(id)?;
        if entry.is_deleted() {
            return Err(Error::InvalidRecordId(id));
        }
        let size = entry.size as usize;
        let loc = entry.loc as usize;
        let new_size = data.len();
        let new_loc = if new_size > size {
            let extra = new_size - size;
            if !self.has_room(extra) {
                return Err(Error::NoRoom {
                    needed: extra,
                    available: self.free_space(),
                });
            }
            self.slide(loc, loc - extra)?;
            self.address_mut(loc - extra, new_size)?
                .copy_from_slice(data);
            loc - extra
        } else {
            self.address_mut(loc, new_size)?.copy_from_slice(data);
            self.slide(loc + new_size, loc + size)?;
            loc + (size - new_size)
        };
        self.put_entry(
            id,
            RecordEntry {
                size: new_size as u16,
                loc: new_loc as u16,
            },
        )
    }

    fn del(&mut self, id: RecordId) -> Result<()> {
        let entry = self.get_entry(id)?;
        self.put_entry(id, RecordEntry::TOMBSTONE)?;
        // 已删除的槽 size 为 0，slide 不做任何事
        self.slide(entry.loc as usize, entry.loc as usize + entry.size as usize)
    }

    fn ids(&self) -> Result<Vec<RecordId>> {
        let mut ids = Vec::with_capacity(self.header.num_records as usize);
        for id in 1..=self.header.num_records {
            if !self.get_entry(id)?.is_deleted() {
                ids.push(id);
            }
        }
        Ok(ids)
    }
}
