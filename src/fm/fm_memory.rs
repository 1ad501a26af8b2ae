//! 内存块存储，主要用于测试。
//!
//! 每个文件是一组共享的块向量；同一个名字多次打开看到的是同一份数据，
//! 行为与磁盘上的 `FileManager` 一致，只是不落盘。

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use super::fm_bid::BlockId;
use super::fm_store::{BlockFile, BlockStore, OpenMode};
use crate::error::{Error, Result};
use crate::mm::BLOCK_SZ;

type Blocks = Rc<RefCell<Vec<Vec<u8>>>>;

pub struct MemoryStore {
    block_size: usize,
    files: RefCell<HashMap<String, Blocks>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_block_size(BLOCK_SZ)
    }

    pub fn with_block_size(block_size: usize) -> Self {
        Self {
            block_size,
            files: RefCell::new(HashMap::new()),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.files.borrow().contains_key(name)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockStore for MemoryStore {
    type File = MemoryFile;

    fn block_size(&self) -> usize {
        self.block_size
    }

    fn open(&self, name: &str, mode: OpenMode) -> Result<MemoryFile> {
        let mut files = self.files.borrow_mut();
        let blocks = match mode {
            OpenMode::Create => {
                if files.contains_key(name) {
                    return Err(Error::FileExists(name.to_string()));
                }
                let blocks = Blocks::default();
                files.insert(name.to_string(), Rc::clone(&blocks));
                blocks
            }
            OpenMode::Attach => files
                .get(name)
                .cloned()
                .ok_or_else(|| Error::FileNotFound(name.to_string()))?,
        };
        Ok(MemoryFile {
            block_size: self.block_size,
            blocks,
        })
    }

    fn remove(&self, name: &str) -> Result<()> {
        self.files.borrow_mut().remove(name);
        Ok(())
    }
}

pub struct MemoryFile {
    block_size: usize,
    blocks: Blocks,
}

impl BlockFile for MemoryFile {
    fn get(&mut self, block_id: BlockId) -> Result<Vec<u8>> {
        let blocks = self.blocks.borrow();
        let block = block_id
            .checked_sub(1)
            .and_then(|idx| blocks.get(idx as usize))
            .cloned();
        block.ok_or(Error::BlockNotFound(block_id))
    }

    fn put(&mut self, block_id: BlockId, data: &[u8]) -> Result<()> {
        if data.len() != self.block_size {
            return Err(Error::InvalidBlockSize {
                expected: self.block_size,
                actual: data.len(),
            });
        }
        let mut blocks = self.blocks.borrow_mut();
        let count = blocks.len() as u32;
        if block_id == count + 1 {
            blocks.push(data.to_vec());
        } else if block_id >= 1 && block_id <= count {
            blocks[block_id as usize - 1].copy_from_slice(data);
        } else {
            return Err(Error::BlockNotFound(block_id));
        }
        Ok(())
    }

    fn stat(&self) -> Result<u32> {
        Ok(self.blocks.borrow().len() as u32)
    }

    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn files_are_shared_by_name() {
        let store = MemoryStore::new();
        let mut a = store.open("t", OpenMode::Create).unwrap();
        a.put(1, &vec![3u8; BLOCK_SZ]).unwrap();

        let mut b = store.open("t", OpenMode::Attach).unwrap();
        assert_eq!(b.stat().unwrap(), 1);
        assert_eq!(b.get(1).unwrap(), vec![3u8; BLOCK_SZ]);
    }

    #[test]
    fn open_modes_follow_existence() {
        let store = MemoryStore::new();
        assert!(matches!(
            store.open("t", OpenMode::Attach),
            Err(Error::FileNotFound(_))
        ));
        store.open("t", OpenMode::Create).unwrap();
        assert!(matches!(
            store.open("t", OpenMode::Create),
            Err(Error::FileExists(_))
        ));
        store.remove("t").unwrap();
        assert!(!store.contains("t"));
    }

    #[test]
    fn get_and_put_check_block_ids() {
        let store = MemoryStore::new();
        let mut file = store.open("t", OpenMode::Create).unwrap();
        assert!(matches!(file.get(0), Err(Error::BlockNotFound(0))));
        assert!(matches!(file.get(1), Err(Error::BlockNotFound(1))));
        assert!(matches!(
            file.put(2, &vec![0u8; BLOCK_SZ]),
            Err(Error::BlockNotFound(2))
        ));
        assert!(matches!(
            file.put(1, &[0u8; 8]),
            Err(Error::InvalidBlockSize { .. })
        ));
    }
}
