use crate::error::Result;
use crate::rm::types::{Handle, Identifier, Row};

/// 表接口：执行器等上层组件只通过它访问一张表。
///
/// 行更新、行删除和带条件的扫描属于接口的一部分，但当前实现一律返回
/// `Error::NotImplemented`，调用方可以据此区分“功能缺失”和数据错误。
pub trait DbRelation {
    fn table_name(&self) -> &str;

    /// 创建底层存储，已存在时失败
    fn create(&mut self) -> Result<()>;
    /// 打开已有表；不存在时创建
    fn create_if_not_exists(&mut self) -> Result<()>;
    /// 删除底层存储
    fn drop(&mut self) -> Result<()>;
    fn open(&mut self) -> Result<()>;
    fn close(&mut self) -> Result<()>;

    /// 校验并追加一行，返回该行的句柄
    fn insert(&mut self, row: &Row) -> Result<Handle>;
    fn update(&mut self, handle: Handle, new_values: &Row) -> Result<()>;
    fn del(&mut self, handle: Handle) -> Result<()>;

    /// 全表扫描，返回所有行的句柄
    fn select(&mut self) -> Result<Vec<Handle>>;
    fn select_where(&mut self, predicate: &Row) -> Result<Vec<Handle>>;

    /// 读出句柄指向的整行
    fn project(&mut self, handle: Handle) -> Result<Row>;
    /// 只取部分列
    fn project_columns(&mut self, handle: Handle, column_names: &[Identifier]) -> Result<Row>;
}
