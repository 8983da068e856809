//! ext2_inspect: ext2 磁盘镜像只读检查工具
//!
//! 这个库解码 ext2 镜像中的元数据并生成文本报告：
//! - 文件系统概况（superblock）
//! - 每个块组的描述符和空闲块、空闲 inode 区间
//! - 根 inode
//! - 根目录第一个数据块中的目录项
//!
//! 只读、离线，不挂载文件系统，也不修复损坏。
//!
//! # 示例
//!
//! ```rust,ignore
//! use ext2_inspect::{Ext2Inspector, FileDevice, InspectConfig, Result};
//!
//! fn main() -> Result<()> {
//!     let device = FileDevice::open("/tmp/disk.img")?;
//!     let mut inspector = Ext2Inspector::open(device, InspectConfig::default())?;
//!
//!     // 全部读取完成后才返回报告
//!     let report = inspector.report()?;
//!     print!("{report}");
//!
//!     Ok(())
//! }
//! ```
//!
//! # 模块结构
//!
//! - [`error`] - 错误类型定义
//! - [`block`] - 字节源抽象和 I/O 操作
//! - [`consts`] - 常量定义
//! - [`types`] - 磁盘数据结构定义
//! - [`superblock`] - Superblock 解码
//! - [`block_group`] - 块组描述符表解码
//! - [`bitmap`] - 空闲区间提取
//! - [`inode`] - Inode 解码
//! - [`dir`] - 目录项遍历
//! - [`fs`] - 检查会话和报告

#![forbid(unsafe_code)]

// ===== 核心模块 =====

/// 错误处理
pub mod error;

/// 字节源抽象
pub mod block;

/// 常量定义
pub mod consts;

/// 数据结构定义
pub mod types;

/// Superblock 操作
pub mod superblock;

/// 块组操作
pub mod block_group;

/// 位图操作
pub mod bitmap;

/// Inode 操作
pub mod inode;

/// 目录操作
pub mod dir;

/// 块缓存
pub mod cache;

/// 检查会话
pub mod fs;

// ===== 公共导出 =====

// 错误处理
pub use error::{Error, ErrorKind, Result};

// 字节源
pub use block::{BlockDev, BlockDevice, FileDevice, MemDevice};

// Superblock
pub use superblock::{read_superblock, Superblock};

// BlockGroup
pub use block_group::{read_group_desc_table, BlockGroup};

// Bitmap
pub use bitmap::{format_runs, free_runs, read_free_runs, BitRun, RunScanner};

// Inode
pub use inode::{read_inode, Inode};

// Dir
pub use dir::{read_dir, DirEntry, DirWalker};

// Inspector
pub use fs::{Ext2Inspector, FsReport, GroupReport, InodeType, InspectConfig};

// Cache
pub use cache::{BlockCache, CacheStats, DEFAULT_CACHE_SIZE};
