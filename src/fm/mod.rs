// fm 模块的子模块导出（块存储相关的子组件）
pub mod fm_bid; // 块标识符
pub mod fm_file_handler; // 单个文件的块级读写
pub mod fm_file_header; // 文件头结构和序列化
pub mod fm_manager; // 基于目录的块存储（创建/删除/打开/预分配）
pub mod fm_memory; // 内存块存储，测试用
pub mod fm_store; // 块存储接口

// 便捷重导出，便于外部使用统一类型名
pub use fm_bid::{BlockId, FIRST_BLOCK_ID};
pub use fm_file_handler::FileHandle;
pub use fm_file_header::FileHeader;
pub use fm_manager::{FileManager, FileManagerConfig};
pub use fm_memory::{MemoryFile, MemoryStore};
pub use fm_store::{BlockFile, BlockStore, OpenMode};
