use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::PathBuf;

use log::{debug, warn};

use super::fm_bid::BlockId;
use super::fm_file_header::FileHeader;
use super::fm_store::BlockFile;
use crate::error::{Error, Result};

// 文件头块编号常量（块 0）
const HEADER_BLOCK_NUMBER: u32 = 0;

// FileHandle: 对单个堆文件的抽象，封装了对块的读写和追加逻辑
pub struct FileHandle {
    file: File,
    path: PathBuf,
    block_size: usize,
    header: FileHeader,
    header_dirty: bool,
}

impl FileHandle {
    // 内部构造器，FileManager 打开文件后返回 FileHandle
    pub(crate) fn new(file: File, path: PathBuf, block_size: usize, header: FileHeader) -> Self {
        Self {
            file,
            path,
            block_size,
            header,
            header_dirty: false,
        }
    }

    // 将内存中脏的文件头写回并 flush 文件
    pub fn flush(&mut self) -> Result<()> {
        if self.header_dirty {
            self.write_header()?;
            self.header_dirty = false;
        }
        self.file.flush()?;
        Ok(())
    }

    // 验证块号是否在已写入范围内（并排除文件头块）
    fn ensure_valid_block(&self, block_number: u32) -> Result<()> {
        if block_number == HEADER_BLOCK_NUMBER || block_number > self.header.block_count {
            return Err(Error::BlockNotFound(block_number));
        }
        Ok(())
    }

    // 确保文件至少能容纳指定块号（按文件长度扩展）
    fn ensure_capacity(&mut self, block_number: u32) -> Result<()> {
        let required_len = (block_number as u64 + 1) * self.block_size as u64;
        let current_len = self.file.metadata()?.len();
        if current_len < required_len {
            self.file.set_len(required_len)?;
        }
        Ok(())
    }

    // 将内存中的文件头写回块 0
    fn write_header(&mut self) -> Result<()> {
        let bytes = self.header.to_bytes()?;
        self.seek_to_block(HEADER_BLOCK_NUMBER)?;
        self.file.write_all(&bytes)?;
        Ok(())
    }

    // 定位到指定块偏移
    fn seek_to_block(&mut self, block_number: u32) -> Result<()> {
        let offset = block_number as u64 * self.block_size as u64;
        self.file.seek(SeekFrom::Start(offset))?;
        Ok(())
    }
}

impl BlockFile for FileHandle {
    // 从指定块读取整个块数据
    fn get(&mut self, block_id: BlockId) -> Result<Vec<u8>> {
        self.ensure_valid_block(block_id)?;
        self.seek_to_block(block_id)?;
        let mut buffer = vec![0u8; self.block_size];
        self.file.read_exact(&mut buffer)?;
        Ok(buffer)
    }

    // 将整块数据写回指定块；块号为 block_count + 1 时追加新块
    fn put(&mut self, block_id: BlockId, data: &[u8]) -> Result<()> {
        if data.len() != self.block_size {
            return Err(Error::InvalidBlockSize {
                expected: self.block_size,
                actual: data.len(),
            });
        }
        if block_id == self.header.block_count + 1 {
            self.ensure_capacity(block_id)?;
            self.header.block_count = block_id;
            self.header_dirty = true;
            debug!("文件 {} 追加块 {}", self.path.display(), block_id);
        } else {
            self.ensure_valid_block(block_id)?;
        }
        self.seek_to_block(block_id)?;
        self.file.write_all(data)?;
        Ok(())
    }

    fn stat(&self) -> Result<u32> {
        Ok(self.header.block_count)
    }

    fn close(&mut self) -> Result<()> {
        self.flush()?;
        self.file.sync_all()?;
        Ok(())
    }
}

// 当 FileHandle 被 Drop 时，如果文件头脏则尝试持久化
impl Drop for FileHandle {
    fn drop(&mut self) {
        if self.header_dirty {
            if let Err(err) = self.write_header() {
                warn!("无法持久化文件头到 {}: {}", self.path.display(), err);
            }
        }
        let _ = self.file.flush();
    }
}
