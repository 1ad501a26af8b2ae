use std::rc::Rc;

use log::{debug, info};

use crate::error::{Error, Result};
use crate::fm::fm_bid::block_range;
use crate::fm::{BlockFile, BlockId, BlockStore, OpenMode};
use crate::mm::{SlottedPage, BLOCK_SZ};

/// 堆文件：一个按块号顺序增长的槽页序列，只追加不回收。
///
/// 每次 `get` 都从存储重新读出一个新的 `SlottedPage`，修改后需要 `put` 写回。
pub struct HeapFile<S: BlockStore> {
    name: String,
    store: Rc<S>,
    file: Option<S::File>,
    last: BlockId,
}

impl<S: BlockStore> HeapFile<S> {
    pub fn new(name: impl Into<String>, store: Rc<S>) -> Self {
        HeapFile {
            name: name.into(),
            store,
            file: None,
            last: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_open(&self) -> bool {
        self.file.is_some()
    }

    pub fn last_block_id(&self) -> BlockId {
        self.last
    }

    // 独占创建文件，并写入一个空的首块
    pub fn create(&mut self) -> Result<()> {
        self.db_open(OpenMode::Create)?;
        let first = self.get_new()?;
        self.put(&first)?;
        info!("创建堆文件 {}", self.name);
        Ok(())
    }

    // 关闭并删除底层文件
    pub fn drop(&mut self) -> Result<()> {
        self.close()?;
        self.store.remove(&self.name)?;
        self.last = 0;
        info!("删除堆文件 {}", self.name);
        Ok(())
    }

    pub fn open(&mut self) -> Result<()> {
        if self.is_open() {
            return Ok(());
        }
        self.db_open(OpenMode::Attach)?;
        debug!("打开堆文件 {}，共 {} 块", self.name, self.last);
        Ok(())
    }

    pub fn close(&mut self) -> Result<()> {
        if let Some(mut file) = self.file.take() {
            file.close()?;
        }
        Ok(())
    }

    // 分配下一个块：先把初始化好的空页写进存储，再读回来，保证之后的 get 看到一致的内容
    pub fn get_new(&mut self) -> Result<SlottedPage> {
        let block_id = self.last + 1;
        let page = SlottedPage::new(vec![0u8; BLOCK_SZ], block_id, true)?;
        self.file_mut()?.put(block_id, page.block())?;
        self.last = block_id;
        debug!("堆文件 {} 分配块 {}", self.name, block_id);
        self.get(block_id)
    }

    pub fn get(&mut self, block_id: BlockId) -> Result<SlottedPage> {
        let block = self.file_mut()?.get(block_id)?;
        SlottedPage::new(block, block_id, false)
    }

    pub fn put(&mut self, page: &SlottedPage) -> Result<()> {
        self.file_mut()?.put(page.block_id(), page.block())
    }

    pub fn block_ids(&self) -> Vec<BlockId> {
        block_range(self.last)
    }

    fn db_open(&mut self, mode: OpenMode) -> Result<()> {
        let block_size = self.store.block_size();
        if block_size != BLOCK_SZ {
            return Err(Error::InvalidBlockSize {
                expected: BLOCK_SZ,
                actual: block_size,
            });
        }
        let file = self.store.open(&self.name, mode)?;
        // 新建文件从 0 开始；已有文件的块数即最后一个块号
        self.last = match mode {
            OpenMode::Create => 0,
            OpenMode::Attach => file.stat()?,
        };
        self.file = Some(file);
        Ok(())
    }

    fn file_mut(&mut self) -> Result<&mut S::File> {
        let name = &self.name;
        self.file
            .as_mut()
            .ok_or_else(|| Error::FileClosed(name.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fm::MemoryStore;
    use crate::mm::PageOps;

    fn heap_file(store: &Rc<MemoryStore>) -> HeapFile<MemoryStore> {
        HeapFile::new("_test_heap_file", Rc::clone(store))
    }

    #[test]
    fn create_writes_one_empty_page() {
        let store = Rc::new(MemoryStore::new());
        let mut file = heap_file(&store);
        file.create().unwrap();

        assert!(file.is_open());
        assert_eq!(file.last_block_id(), 1);
        assert_eq!(file.block_ids(), vec![1]);
        let page = file.get(1).unwrap();
        assert_eq!(page.num_records(), 0);
        assert!(page.ids().unwrap().is_empty());
    }

    #[test]
    fn create_twice_fails() {
        let store = Rc::new(MemoryStore::new());
        heap_file(&store).create().unwrap();
        assert!(matches!(heap_file(&store).create(), Err(Error::FileExists(_))));
    }

    #[test]
    fn get_new_allocates_sequential_ids() {
        let store = Rc::new(MemoryStore::new());
        let mut file = heap_file(&store);
        file.create().unwrap();
        for expected in 2..=5 {
            let page = file.get_new().unwrap();
            assert_eq!(page.block_id(), expected);
        }
        assert_eq!(file.block_ids(), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn put_persists_page_changes() {
        let store = Rc::new(MemoryStore::new());
        let mut file = heap_file(&store);
        file.create().unwrap();

        let mut page = file.get(1).unwrap();
        let id = page.add(b"hello").unwrap();
        // 未 put 之前，重新读出的页看不到修改
        assert!(file.get(1).unwrap().ids().unwrap().is_empty());

        file.put(&page).unwrap();
        assert_eq!(file.get(1).unwrap().get(id).unwrap(), Some(&b"hello"[..]));
    }

    #[test]
    fn open_recovers_last_block_id() {
        let store = Rc::new(MemoryStore::new());
        {
            let mut file = heap_file(&store);
            file.create().unwrap();
            file.get_new().unwrap();
            file.get_new().unwrap();
            file.close().unwrap();
            assert!(!file.is_open());
        }
        let mut file = heap_file(&store);
        file.open().unwrap();
        assert_eq!(file.last_block_id(), 3);
        assert_eq!(file.block_ids(), vec![1, 2, 3]);
    }

    #[test]
    fn closed_file_rejects_access() {
        let store = Rc::new(MemoryStore::new());
        let mut file = heap_file(&store);
        assert!(matches!(file.get(1), Err(Error::FileClosed(_))));
        assert!(matches!(file.open(), Err(Error::FileNotFound(_))));

        file.create().unwrap();
        file.close().unwrap();
        assert!(matches!(file.get_new(), Err(Error::FileClosed(_))));
    }

    #[test]
    fn drop_removes_storage() {
        let store = Rc::new(MemoryStore::new());
        let mut file = heap_file(&store);
        file.create().unwrap();
        file.drop().unwrap();

        assert!(!store.contains("_test_heap_file"));
        assert!(!file.is_open());
        assert!(file.block_ids().is_empty());
    }

    #[test]
    fn store_block_size_must_match_page_size() {
        let store = Rc::new(MemoryStore::with_block_size(1024));
        let mut file = HeapFile::new("small", store);
        assert!(matches!(
            file.create(),
            Err(Error::InvalidBlockSize {
                expected: BLOCK_SZ,
                actual: 1024
            })
        ));
    }
}
