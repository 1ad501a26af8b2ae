use std::collections::BTreeMap;

use crate::fm::BlockId;

// 槽号：页内从 1 开始，删除后不复用
pub type RecordId = u16;

// 记录标识符：指定页号(block)和槽(slot)
pub type Handle = (BlockId, RecordId);

pub type Identifier = String;
pub type ColumnNames = Vec<Identifier>;
pub type ColumnAttributes = Vec<ColumnAttribute>;

// 一行数据：列名到值的映射，与列顺序无关
pub type Row = BTreeMap<Identifier, Value>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DataType {
    Int,
    Text,
    Boolean,
}

// 列属性，目前只有数据类型
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ColumnAttribute {
    data_type: DataType,
}

impl ColumnAttribute {
    pub fn new(data_type: DataType) -> Self {
        ColumnAttribute { data_type }
    }

    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    pub fn set_data_type(&mut self, data_type: DataType) {
        self.data_type = data_type;
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Value {
    Int(i32),
    Text(String),
    Boolean(bool),
}

impl Value {
    pub fn data_type(&self) -> DataType {
        match self {
            Value::Int(_) => DataType::Int,
            Value::Text(_) => DataType::Text,
            Value::Boolean(_) => DataType::Boolean,
        }
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}
