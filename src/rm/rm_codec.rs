//! 行的字节编码。
//!
//! 按表结构的列顺序依次写出各列，没有填充和空值标记：
//! - INT：4 字节有符号整数，小端
//! - TEXT：2 字节无符号长度（小端）+ 原始字节

use crate::error::{Error, Result};
use crate::rm::types::{ColumnAttribute, DataType, Identifier, Row, Value};

pub fn marshal(
    column_names: &[Identifier],
    column_attributes: &[ColumnAttribute],
    row: &Row,
) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    for (name, attribute) in column_names.iter().zip(column_attributes) {
        let data_type = attribute.data_type();
        if !matches!(data_type, DataType::Int | DataType::Text) {
            return Err(Error::UnsupportedType(data_type));
        }
        let value = row
            .get(name)
            .ok_or_else(|| Error::MissingField(name.clone()))?;
        match (data_type, value) {
            (DataType::Int, Value::Int(n)) => bytes.extend_from_slice(&n.to_le_bytes()),
            (DataType::Text, Value::Text(s)) => {
                let size = u16::try_from(s.len()).map_err(|_| Error::TextTooLong(s.len()))?;
                bytes.extend_from_slice(&size.to_le_bytes());
                bytes.extend_from_slice(s.as_bytes());
            }
            _ => {
                return Err(Error::TypeMismatch {
                    column: name.clone(),
                    expected: data_type,
                })
            }
        }
    }
    Ok(bytes)
}

/// `marshal` 的逆过程。
///
/// TEXT 列按 UTF-8 解码：只有合法 UTF-8 的字节序列能还原成 `Value::Text`，
/// 其他字节序列（例如单字节编码写入的非 ASCII 文本）报 `CorruptedRecord`。
pub fn unmarshal(
    column_names: &[Identifier],
    column_attributes: &[ColumnAttribute],
    data: &[u8],
) -> Result<Row> {
    let mut reader = RecordReader { data, offset: 0 };
    let mut row = Row::new();
    for (name, attribute) in column_names.iter().zip(column_attributes) {
        let value = match attribute.data_type() {
            DataType::Int => {
                let bytes = reader.take(4)?;
                Value::Int(i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
            }
            DataType::Text => {
                let size = reader.take(2)?;
                let size = u16::from_le_bytes([size[0], size[1]]) as usize;
                let text = String::from_utf8(reader.take(size)?.to_vec())
                    .map_err(|err| Error::CorruptedRecord(format!("column `{}`: {}", name, err)))?;
                Value::Text(text)
            }
            other => return Err(Error::UnsupportedType(other)),
        };
        row.insert(name.clone(), value);
    }
    if reader.offset != data.len() {
        return Err(Error::CorruptedRecord(format!(
            "{} trailing bytes after last column",
            data.len() - reader.offset
        )));
    }
    Ok(row)
}

// 带边界检查的顺序读取
struct RecordReader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> RecordReader<'a> {
    fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        let end = self.offset + len;
        if end > self.data.len() {
            return Err(Error::CorruptedRecord(format!(
                "need {} bytes at offset {}, record has {}",
                len,
                self.offset,
                self.data.len()
            )));
        }
        let bytes = &self.data[self.offset..end];
        self.offset = end;
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> (Vec<Identifier>, Vec<ColumnAttribute>) {
        (
            vec!["a".to_string(), "b".to_string()],
            vec![
                ColumnAttribute::new(DataType::Int),
                ColumnAttribute::new(DataType::Text),
            ],
        )
    }

    fn row(a: i32, b: &str) -> Row {
        let mut row = Row::new();
        row.insert("a".to_string(), Value::from(a));
        row.insert("b".to_string(), Value::from(b));
        row
    }

    #[test]
    fn marshal_follows_schema_order() {
        let (names, attrs) = schema();
        let bytes = marshal(&names, &attrs, &row(12, "Hello!")).unwrap();
        let mut expected = 12i32.to_le_bytes().to_vec();
        expected.extend_from_slice(&6u16.to_le_bytes());
        expected.extend_from_slice(b"Hello!");
        assert_eq!(bytes, expected);
    }

    #[test]
    fn unmarshal_inverts_marshal() {
        let (names, attrs) = schema();
        for (a, b) in [(0, ""), (-1, "x"), (i32::MAX, "Hello!"), (i32::MIN, "text with spaces")] {
            let original = row(a, b);
            let bytes = marshal(&names, &attrs, &original).unwrap();
            assert_eq!(unmarshal(&names, &attrs, &bytes).unwrap(), original);
        }
    }

    #[test]
    fn marshal_rejects_boolean_column() {
        let names = vec!["flag".to_string()];
        let attrs = vec![ColumnAttribute::new(DataType::Boolean)];
        let mut r = Row::new();
        r.insert("flag".to_string(), Value::from(true));
        assert!(matches!(
            marshal(&names, &attrs, &r),
            Err(Error::UnsupportedType(DataType::Boolean))
        ));
        assert!(matches!(
            unmarshal(&names, &attrs, &[1]),
            Err(Error::UnsupportedType(DataType::Boolean))
        ));
    }

    #[test]
    fn marshal_rejects_wrong_value_type() {
        let (names, attrs) = schema();
        let mut r = row(1, "x");
        r.insert("a".to_string(), Value::from("not a number"));
        assert!(matches!(
            marshal(&names, &attrs, &r),
            Err(Error::TypeMismatch { column, expected: DataType::Int }) if column == "a"
        ));
    }

    #[test]
    fn marshal_rejects_long_text() {
        let (names, attrs) = schema();
        let long = "x".repeat(u16::MAX as usize + 1);
        assert!(matches!(
            marshal(&names, &attrs, &row(1, &long)),
            Err(Error::TextTooLong(65536))
        ));
    }

    #[test]
    fn unmarshal_rejects_invalid_utf8_text() {
        let (names, attrs) = schema();
        let mut bytes = 1i32.to_le_bytes().to_vec();
        bytes.extend_from_slice(&2u16.to_le_bytes());
        bytes.extend_from_slice(&[0xC3, 0x28]);
        assert!(matches!(
            unmarshal(&names, &attrs, &bytes),
            Err(Error::CorruptedRecord(msg)) if msg.contains("`b`")
        ));
    }

    #[test]
    fn unmarshal_rejects_short_and_long_records() {
        let (names, attrs) = schema();
        let bytes = marshal(&names, &attrs, &row(5, "abc")).unwrap();

        assert!(matches!(
            unmarshal(&names, &attrs, &bytes[..bytes.len() - 1]),
            Err(Error::CorruptedRecord(_))
        ));
        let mut longer = bytes.clone();
        longer.push(0);
        assert!(matches!(
            unmarshal(&names, &attrs, &longer),
            Err(Error::CorruptedRecord(_))
        ));
    }
}
