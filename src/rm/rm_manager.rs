use std::rc::Rc;

use log::debug;

use crate::error::{Error, Result};
use crate::fm::BlockStore;
use crate::mm::{PageOps, SlottedPage};
use crate::rm::rm_codec;
use crate::rm::rm_heap_file::HeapFile;
use crate::rm::rm_relation::DbRelation;
use crate::rm::types::{ColumnAttributes, ColumnNames, Handle, Identifier, Row};

// 堆表：一个堆文件加上固定的表结构，负责行与字节记录的互转
pub struct HeapTable<S: BlockStore> {
    table_name: Identifier,
    column_names: ColumnNames,
    column_attributes: ColumnAttributes,
    file: HeapFile<S>,
}

impl<S: BlockStore> HeapTable<S> {
    // 列名与列属性一一对应，顺序决定记录的编码顺序
    pub fn new(
        store: Rc<S>,
        table_name: impl Into<Identifier>,
        column_names: ColumnNames,
        column_attributes: ColumnAttributes,
    ) -> Result<Self> {
        if column_names.len() != column_attributes.len() {
            return Err(Error::SchemaMismatch {
                names: column_names.len(),
                attributes: column_attributes.len(),
            });
        }
        let table_name = table_name.into();
        let file = HeapFile::new(table_name.clone(), store);
        Ok(HeapTable {
            table_name,
            column_names,
            column_attributes,
            file,
        })
    }

    pub fn file(&self) -> &HeapFile<S> {
        &self.file
    }

    // 按表结构取出各列，缺列时报错，多余的键丢弃
    pub fn validate(&self, row: &Row) -> Result<Row> {
        let mut validated = Row::new();
        for name in &self.column_names {
            let value = row
                .get(name)
                .ok_or_else(|| Error::MissingField(name.clone()))?;
            validated.insert(name.clone(), value.clone());
        }
        Ok(validated)
    }

    // 追加到最后一个块；放不下时分配新块再试一次
    pub fn append(&mut self, row: &Row) -> Result<Handle> {
        let data = self.marshal(row)?;
        if data.len() > SlottedPage::MAX_RECORD_SIZE {
            return Err(Error::RecordTooLarge {
                size: data.len(),
                max: SlottedPage::MAX_RECORD_SIZE,
            });
        }
        let mut page = match self.file.last_block_id() {
            0 => self.file.get_new()?,
            last => self.file.get(last)?,
        };
        let record_id = match page.add(&data) {
            Ok(id) => id,
            Err(err) if err.is_no_room() => {
                debug!(
                    "表 {} 的块 {} 已满，分配新块",
                    self.table_name,
                    page.block_id()
                );
                page = self.file.get_new()?;
                page.add(&data)?
            }
            Err(err) => return Err(err),
        };
        self.file.put(&page)?;
        Ok((page.block_id(), record_id))
    }

    pub fn marshal(&self, row: &Row) -> Result<Vec<u8>> {
        rm_codec::marshal(&self.column_names, &self.column_attributes, row)
    }

    pub fn unmarshal(&self, data: &[u8]) -> Result<Row> {
        rm_codec::unmarshal(&self.column_names, &self.column_attributes, data)
    }
}

impl<S: BlockStore> DbRelation for HeapTable<S> {
    fn table_name(&self) -> &str {
        &self.table_name
    }

    fn create(&mut self) -> Result<()> {
        self.file.create()
    }

    fn create_if_not_exists(&mut self) -> Result<()> {
        match self.open() {
            Err(Error::FileNotFound(_)) => self.create(),
            other => other,
        }
    }

    fn drop(&mut self) -> Result<()> {
        self.file.drop()
    }

    fn open(&mut self) -> Result<()> {
        self.file.open()
    }

    fn close(&mut self) -> Result<()> {
        self.file.close()
    }

    fn insert(&mut self, row: &Row) -> Result<Handle> {
        let validated = self.validate(row)?;
        self.append(&validated)
    }

    fn update(&mut self, _handle: Handle, _new_values: &Row) -> Result<()> {
        Err(Error::NotImplemented("HeapTable::update"))
    }

    fn del(&mut self, _handle: Handle) -> Result<()> {
        Err(Error::NotImplemented("HeapTable::del"))
    }

    fn select(&mut self) -> Result<Vec<Handle>> {
        let mut handles = Vec::new();
        for block_id in self.file.block_ids() {
            let page = self.file.get(block_id)?;
            for record_id in page.ids()? {
                handles.push((block_id, record_id));
            }
        }
        Ok(handles)
    }

    fn select_where(&mut self, _predicate: &Row) -> Result<Vec<Handle>> {
        Err(Error::NotImplemented("HeapTable::select with predicate"))
    }

    fn project(&mut self, handle: Handle) -> Result<Row> {
        let (block_id, record_id) = handle;
        let page = self.file.get(block_id)?;
        let data = page
            .get(record_id)?
            .ok_or(Error::RecordNotFound(handle))?;
        self.unmarshal(data)
    }

    fn project_columns(&mut self, handle: Handle, column_names: &[Identifier]) -> Result<Row> {
        let mut row = self.project(handle)?;
        let mut result = Row::new();
        for name in column_names {
            let value = row
                .remove(name)
                .ok_or_else(|| Error::UnknownColumn(name.clone()))?;
            result.insert(name.clone(), value);
        }
        Ok(result)
    }
}
