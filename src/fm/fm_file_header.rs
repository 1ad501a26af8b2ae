use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

// 持久化的文件头，存放在文件的第一个块（块号 0）
// 字段：
// - magic: 文件标识，用于识别非本格式的文件
// - block_size: 创建文件时的块大小，打开时必须与配置一致
// - block_count: 已写入的数据块数量（即最后一个数据块号）
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileHeader {
    pub magic: u32,
    pub block_size: u32,
    pub block_count: u32,
}

impl FileHeader {
    pub const MAGIC: u32 = 0x4845_4150;

    // 文件头在磁盘上占用的字节数（bincode 定长编码，三个 u32）
    pub const BYTE_SIZE: usize = 12;

    // 创建一个空文件的文件头，尚无数据块
    pub fn new(block_size: usize) -> Self {
        Self {
            magic: Self::MAGIC,
            block_size: block_size as u32,
            block_count: 0,
        }
    }

    // 反序列化并校验 magic
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < Self::BYTE_SIZE {
            return Err(Error::CorruptedFile(format!(
                "header needs {} bytes, got {}",
                Self::BYTE_SIZE,
                bytes.len()
            )));
        }
        let header: FileHeader = bincode::deserialize(&bytes[..Self::BYTE_SIZE])?;
        if header.magic != Self::MAGIC {
            return Err(Error::CorruptedFile(format!(
                "bad magic {:#010x}",
                header.magic
            )));
        }
        Ok(header)
    }

    // 序列化为字节数组用于写回磁盘
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }
}
