//! Inode 操作模块
//!
//! 这个模块提供 ext2 inode 记录的定位和读取。

mod read;

pub use read::*;
