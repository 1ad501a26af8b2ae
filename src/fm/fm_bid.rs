// 块标识符
// 每个数据块用一个 u32 编号，从 1 开始顺序分配（0 保留给文件头块）
pub type BlockId = u32;

// 第一个数据块的编号
pub const FIRST_BLOCK_ID: BlockId = 1;

// 从 1 到 last（含）的块编号序列；last 为 0 时为空
pub fn block_range(last: BlockId) -> Vec<BlockId> {
    (FIRST_BLOCK_ID..=last).collect()
}
