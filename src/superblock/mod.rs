//! Superblock 操作模块
//!
//! 这个模块提供 ext2 superblock 的读取、验证以及派生量计算。

mod read;
pub mod features;

pub use features::{CompatFeatures, IncompatFeatures, RoCompatFeatures};
pub use read::*;
