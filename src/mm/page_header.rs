use crate::rm::types::RecordId;

/// 页头元数据，位于块首：目录槽数与空闲区边界
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageHeader {
    /// 已分配过的槽数（只增不减，删除不会回收槽号）
    pub num_records: u16,
    /// 最后一个仍空闲字节的偏移；记录数据从 end_free + 1 开始一直到块尾
    pub end_free: u16,
}

impl PageHeader {
    /// 页头在块中的字节长度
    pub const SIZE: usize = 4;

    /// 新页：没有记录，整个块除页头外都空闲
    pub fn empty(block_size: usize) -> Self {
        PageHeader {
            num_records: 0,
            end_free: (block_size - 1) as u16,
        }
    }

    /// 目录当前占用到的偏移（不含）
    pub fn directory_end(&self) -> usize {
        Self::SIZE + RecordEntry::SIZE * self.num_records as usize
    }
}

/// 槽目录项：记录长度与记录在块内的起始偏移
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordEntry {
    pub size: u16,
    /// 0 表示已删除（墓碑）
    pub loc: u16,
}

impl RecordEntry {
    pub const SIZE: usize = 4;
    pub const TOMBSTONE: RecordEntry = RecordEntry { size: 0, loc: 0 };

    /// 槽 id（从 1 开始）对应目录项在块内的偏移
    pub fn offset(id: RecordId) -> usize {
        PageHeader::SIZE + Self::SIZE * (id as usize - 1)
    }

    pub fn is_deleted(&self) -> bool {
        self.loc == 0
    }
}
