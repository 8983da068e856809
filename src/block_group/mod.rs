//! 块组操作模块
//!
//! 这个模块提供 ext2 块组描述符表的读取和每个块组的块号、inode 号范围。
mod read;

pub use read::*;
