//! 位图操作模块
//!
//! - `ops` - 单个位的测试
//! - `runs` - 空闲区间提取（两状态扫描器）

mod ops;
mod runs;

pub use ops::test_bit;
pub use runs::{count_free, format_runs, free_runs, read_free_runs, BitRun, RunScanner};
