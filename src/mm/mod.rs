pub mod page;
pub mod page_compact;
pub mod page_header;
pub mod page_ops;

/// 块大小（字节）。页内偏移用 u16 表示，因此不能超过 65536
pub const BLOCK_SZ: usize = 4096;

/// 导出 SlottedPage 及其记录操作接口
pub use page::SlottedPage;
pub use page_header::{PageHeader, RecordEntry};
pub use page_ops::PageOps;
