//! 目录操作模块
//!
//! 这个模块提供 ext2 目录数据块的解析。
//!
//! ## 模块结构
//!
//! - `entry` - 目录项
//! - `iterator` - 单块目录遍历器
//!
//! 只处理目录的第一个数据块，不做路径查找。

mod entry;
mod iterator;

pub use entry::DirEntry;
pub use iterator::{read_dir, DirWalker};
