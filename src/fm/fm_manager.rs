use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use log::debug;

use super::fm_file_handler::FileHandle;
use super::fm_file_header::FileHeader;
use super::fm_store::{BlockStore, OpenMode};
use crate::error::{Error, Result};
use crate::mm::BLOCK_SZ;

// FileManager 配置：块大小与预分配字节数
#[derive(Clone, Copy, Debug)]
pub struct FileManagerConfig {
    pub block_size: usize,
    pub preallocate_bytes: u64,
}

impl Default for FileManagerConfig {
    fn default() -> Self {
        const DEFAULT_PREALLOC_BLOCKS: u64 = 16;
        Self {
            block_size: BLOCK_SZ,
            // 默认预分配若干块以减少小文件增长时的开销
            preallocate_bytes: BLOCK_SZ as u64 * DEFAULT_PREALLOC_BLOCKS,
        }
    }
}

// FileManager 是一个数据库环境：所有堆文件以 `<name>.db` 存放在 home 目录下
pub struct FileManager {
    home: PathBuf,
    config: FileManagerConfig,
}

impl FileManager {
    pub fn new<P: AsRef<Path>>(home: P, config: FileManagerConfig) -> Self {
        Self {
            home: home.as_ref().to_path_buf(),
            config,
        }
    }

    // 打开环境目录，不存在时递归创建
    pub fn open_env<P: AsRef<Path>>(home: P, config: FileManagerConfig) -> Result<Self> {
        let manager = Self::new(home, config);
        manager.create_dir(&manager.home)?;
        Ok(manager)
    }

    pub fn home(&self) -> &Path {
        &self.home
    }

    // 堆文件名到磁盘路径的映射
    pub fn file_path(&self, name: &str) -> PathBuf {
        self.home.join(format!("{}.db", name))
    }

    // 创建目录（递归），如果已存在且为目录则返回 Ok
    pub fn create_dir<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if path.exists() {
            if path.is_dir() {
                return Ok(());
            }
            return Err(Error::Io(std::io::Error::new(
                ErrorKind::AlreadyExists,
                format!("路径 {} 已存在但不是目录", path.display()),
            )));
        }
        fs::create_dir_all(path)?;
        Ok(())
    }

    // 创建表文件：按预分配大小扩展文件并写入初始文件头
    fn create_table_file(&self, name: &str, path: &Path) -> Result<File> {
        let mut file = match OpenOptions::new()
            .read(true)
            .write(true)
            .create_new(true)
            .open(path)
        {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::AlreadyExists => {
                return Err(Error::FileExists(name.to_string()))
            }
            Err(err) => return Err(err.into()),
        };

        let aligned_size = self.align_prealloc();
        file.set_len(aligned_size)?;
        self.initialize_file(&mut file)?;
        debug!("创建表文件 {}，预分配 {} 字节", path.display(), aligned_size);
        Ok(file)
    }

    // 打开已有文件并读取文件头，返回 FileHandle
    fn open_file(&self, name: &str, path: &Path, file: Option<File>) -> Result<FileHandle> {
        let mut file = match file {
            Some(file) => file,
            None => match OpenOptions::new().read(true).write(true).open(path) {
                Ok(file) => file,
                Err(err) if err.kind() == ErrorKind::NotFound => {
                    return Err(Error::FileNotFound(name.to_string()))
                }
                Err(err) => return Err(err.into()),
            },
        };
        let metadata = file.metadata()?;
        if metadata.len() < self.config.block_size as u64 {
            return Err(Error::CorruptedFile(format!(
                "文件 {} 小于一个块（{} 字节）",
                path.display(),
                self.config.block_size
            )));
        }
        let header = self.read_header(&mut file)?;
        if header.block_size as usize != self.config.block_size {
            return Err(Error::InvalidBlockSize {
                expected: self.config.block_size,
                actual: header.block_size as usize,
            });
        }
        Ok(FileHandle::new(
            file,
            path.to_path_buf(),
            self.config.block_size,
            header,
        ))
    }

    // 初始化新文件，写入默认文件头并填充首个块
    fn initialize_file(&self, file: &mut File) -> Result<()> {
        let header = FileHeader::new(self.config.block_size).to_bytes()?;
        let mut buffer = vec![0u8; self.config.block_size];
        buffer[..header.len()].copy_from_slice(&header);
        file.seek(SeekFrom::Start(0))?;
        file.write_all(&buffer)?;
        file.flush()?;
        Ok(())
    }

    // 读取文件头（块 0 的前若干字节）
    fn read_header(&self, file: &mut File) -> Result<FileHeader> {
        file.seek(SeekFrom::Start(0))?;
        let mut buf = [0u8; FileHeader::BYTE_SIZE];
        file.read_exact(&mut buf)?;
        FileHeader::from_bytes(&buf)
    }

    // 计算并对齐预分配的字节数到块大小的整数倍
    fn align_prealloc(&self) -> u64 {
        let block_size = self.config.block_size as u64;
        let mut prealloc = self.config.preallocate_bytes.max(block_size);
        let remainder = prealloc % block_size;
        if remainder != 0 {
            prealloc += block_size - remainder;
        }
        prealloc
    }
}

impl BlockStore for FileManager {
    type File = FileHandle;

    fn block_size(&self) -> usize {
        self.config.block_size
    }

    fn open(&self, name: &str, mode: OpenMode) -> Result<FileHandle> {
        if self.config.block_size < FileHeader::BYTE_SIZE {
            return Err(Error::InvalidBlockSize {
                expected: FileHeader::BYTE_SIZE,
                actual: self.config.block_size,
            });
        }
        let path = self.file_path(name);
        match mode {
            OpenMode::Create => {
                let file = self.create_table_file(name, &path)?;
                self.open_file(name, &path, Some(file))
            }
            OpenMode::Attach => self.open_file(name, &path, None),
        }
    }

    // 删除文件；文件不存在时直接返回
    fn remove(&self, name: &str) -> Result<()> {
        let path = self.file_path(name);
        if !path.exists() {
            return Ok(());
        }
        if path.is_dir() {
            return Err(Error::Io(std::io::Error::new(
                ErrorKind::InvalidInput,
                format!("{} 是一个目录", path.display()),
            )));
        }
        fs::remove_file(&path)?;
        debug!("删除表文件 {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fm::BlockFile;
    use tempfile::tempdir;

    fn block(fill: u8) -> Vec<u8> {
        vec![fill; BLOCK_SZ]
    }

    #[test]
    fn create_is_exclusive() {
        let dir = tempdir().unwrap();
        let store = FileManager::open_env(dir.path(), FileManagerConfig::default()).unwrap();

        let _file = store.open("t", OpenMode::Create).unwrap();
        assert!(matches!(
            store.open("t", OpenMode::Create),
            Err(Error::FileExists(name)) if name == "t"
        ));
    }

    #[test]
    fn attach_missing_file_fails() {
        let dir = tempdir().unwrap();
        let store = FileManager::open_env(dir.path(), FileManagerConfig::default()).unwrap();
        assert!(matches!(
            store.open("missing", OpenMode::Attach),
            Err(Error::FileNotFound(_))
        ));
    }

    #[test]
    fn put_appends_and_overwrites() {
        let dir = tempdir().unwrap();
        let store = FileManager::open_env(dir.path(), FileManagerConfig::default()).unwrap();
        let mut file = store.open("t", OpenMode::Create).unwrap();
        assert_eq!(file.stat().unwrap(), 0);

        file.put(1, &block(1)).unwrap();
        file.put(2, &block(2)).unwrap();
        file.put(1, &block(9)).unwrap();
        assert_eq!(file.stat().unwrap(), 2);
        assert_eq!(file.get(1).unwrap(), block(9));
        assert_eq!(file.get(2).unwrap(), block(2));

        // 跳号写入与读取不存在的块都失败
        assert!(matches!(file.put(4, &block(4)), Err(Error::BlockNotFound(4))));
        assert!(matches!(file.get(3), Err(Error::BlockNotFound(3))));
        assert!(matches!(file.get(0), Err(Error::BlockNotFound(0))));
    }

    #[test]
    fn put_rejects_wrong_sized_buffer() {
        let dir = tempdir().unwrap();
        let store = FileManager::open_env(dir.path(), FileManagerConfig::default()).unwrap();
        let mut file = store.open("t", OpenMode::Create).unwrap();
        assert!(matches!(
            file.put(1, &[0u8; 10]),
            Err(Error::InvalidBlockSize { actual: 10, .. })
        ));
    }

    #[test]
    fn block_count_survives_reopen() {
        let dir = tempdir().unwrap();
        let store = FileManager::open_env(dir.path(), FileManagerConfig::default()).unwrap();
        {
            let mut file = store.open("t", OpenMode::Create).unwrap();
            file.put(1, &block(1)).unwrap();
            file.put(2, &block(2)).unwrap();
            file.close().unwrap();
        }
        let mut file = store.open("t", OpenMode::Attach).unwrap();
        assert_eq!(file.stat().unwrap(), 2);
        assert_eq!(file.get(2).unwrap(), block(2));
    }

    #[test]
    fn header_is_written_on_drop() {
        let dir = tempdir().unwrap();
        let store = FileManager::open_env(dir.path(), FileManagerConfig::default()).unwrap();
        {
            let mut file = store.open("t", OpenMode::Create).unwrap();
            file.put(1, &block(7)).unwrap();
        }
        let file = store.open("t", OpenMode::Attach).unwrap();
        assert_eq!(file.stat().unwrap(), 1);
    }

    #[test]
    fn remove_deletes_backing_file() {
        let dir = tempdir().unwrap();
        let store = FileManager::open_env(dir.path(), FileManagerConfig::default()).unwrap();
        drop(store.open("t", OpenMode::Create).unwrap());
        assert!(store.file_path("t").exists());

        store.remove("t").unwrap();
        assert!(!store.file_path("t").exists());
        // 重复删除不报错
        store.remove("t").unwrap();
    }

    #[test]
    fn attach_with_other_block_size_fails() {
        let dir = tempdir().unwrap();
        let store = FileManager::open_env(dir.path(), FileManagerConfig::default()).unwrap();
        drop(store.open("t", OpenMode::Create).unwrap());

        let config = FileManagerConfig {
            block_size: 1024,
            preallocate_bytes: 0,
        };
        let other = FileManager::new(dir.path(), config);
        assert!(matches!(
            other.open("t", OpenMode::Attach),
            Err(Error::InvalidBlockSize {
                expected: 1024,
                actual: 4096
            })
        ));
    }

    #[test]
    fn prealloc_is_block_aligned() {
        let config = FileManagerConfig {
            block_size: 4096,
            preallocate_bytes: 5000,
        };
        let store = FileManager::new("unused", config);
        assert_eq!(store.align_prealloc(), 8192);
    }
}
