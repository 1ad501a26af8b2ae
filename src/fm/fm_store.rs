//! 块存储接口
//!
//! 堆文件只通过这两个 trait 访问底层持久化：`BlockStore` 相当于一个数据库环境，
//! 按名字打开/删除文件；`BlockFile` 是打开后的单个文件，按块号读写定长块。

use crate::error::Result;
use crate::fm::BlockId;

/// 打开文件的方式
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OpenMode {
    /// 独占创建，文件已存在时返回 `Error::FileExists`
    Create,
    /// 打开已有文件，不存在时返回 `Error::FileNotFound`
    Attach,
}

pub trait BlockStore {
    type File: BlockFile;

    /// 该存储中每个块的字节数，文件生命周期内固定
    fn block_size(&self) -> usize;

    fn open(&self, name: &str, mode: OpenMode) -> Result<Self::File>;

    /// 删除文件的持久化数据；文件不存在时视为成功
    fn remove(&self, name: &str) -> Result<()>;
}

pub trait BlockFile {
    /// 读取整块数据，块号不存在时返回 `Error::BlockNotFound`
    fn get(&mut self, block_id: BlockId) -> Result<Vec<u8>>;

    /// 覆盖已有块，或在 `stat() + 1` 处追加新块
    fn put(&mut self, block_id: BlockId, data: &[u8]) -> Result<()>;

    /// 已写入的块数量，即最大块号
    fn stat(&self) -> Result<u32>;

    fn close(&mut self) -> Result<()>;
}
