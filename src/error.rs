//! 存储层统一错误类型

use std::io;
use thiserror::Error;

use crate::fm::BlockId;
use crate::rm::types::{DataType, Handle, RecordId};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// 页内空间不足；表层会换到新页重试
    #[error("not enough room for new record: need {needed} bytes, {available} available")]
    NoRoom { needed: usize, available: usize },

    #[error("row missing field `{0}`")]
    MissingField(String),

    #[error("unknown column `{0}`")]
    UnknownColumn(String),

    #[error("value for column `{column}` is not of type {expected:?}")]
    TypeMismatch { column: String, expected: DataType },

    #[error("text value of {0} bytes exceeds the 65535 byte limit")]
    TextTooLong(usize),

    #[error("record of {size} bytes cannot fit in an empty block (max {max})")]
    RecordTooLarge { size: usize, max: usize },

    #[error("only know how to marshal INT and TEXT, got {0:?}")]
    UnsupportedType(DataType),

    #[error("not implemented: {0}")]
    NotImplemented(&'static str),

    #[error("schema has {names} column names but {attributes} column attributes")]
    SchemaMismatch { names: usize, attributes: usize },

    #[error("invalid record id {0}")]
    InvalidRecordId(RecordId),

    #[error("no record at handle {0:?}")]
    RecordNotFound(Handle),

    #[error("corrupted page: {0}")]
    CorruptedPage(String),

    #[error("corrupted record: {0}")]
    CorruptedRecord(String),

    #[error("corrupted file: {0}")]
    CorruptedFile(String),

    #[error("block buffer too small: expected {expected} bytes, got {actual}")]
    BlockTooSmall { expected: usize, actual: usize },

    #[error("store block size {actual} does not match page size {expected}")]
    InvalidBlockSize { expected: usize, actual: usize },

    #[error("block {0} not found")]
    BlockNotFound(BlockId),

    #[error("file `{0}` already exists")]
    FileExists(String),

    #[error("file `{0}` not found")]
    FileNotFound(String),

    #[error("file `{0}` is not open")]
    FileClosed(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("header encoding error: {0}")]
    Encoding(#[from] bincode::Error),
}

impl Error {
    pub fn is_no_room(&self) -> bool {
        matches!(self, Error::NoRoom { .. })
    }

    /// 区分“功能未提供”和数据错误
    pub fn is_not_implemented(&self) -> bool {
        matches!(self, Error::NotImplemented(_))
    }
}
