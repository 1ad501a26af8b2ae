//! 教学用关系数据库的堆存储层。
//!
//! - `fm`：块存储接口及其文件、内存实现
//! - `mm`：槽页，管理单个块内的变长记录
//! - `rm`：堆文件与堆表，把带类型的行存进块序列

pub mod error;
pub mod fm;
pub mod mm;
pub mod rm;
pub mod test;

pub use error::{Error, Result};
