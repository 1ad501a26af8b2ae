// rm 模块：堆文件、行编解码与堆表
pub mod rm_codec; // 行与字节记录互转
pub mod rm_heap_file; // 块序列
pub mod rm_manager; // 堆表
pub mod rm_relation; // 表接口
pub mod types;

pub use rm_heap_file::HeapFile;
pub use rm_manager::HeapTable;
pub use rm_relation::DbRelation;
pub use types::{
    ColumnAttribute, ColumnAttributes, ColumnNames, DataType, Handle, Identifier, RecordId, Row,
    Value,
};
