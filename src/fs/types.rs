//! 检查会话使用的类型定义

use crate::{cache::DEFAULT_CACHE_SIZE, consts::*};
use core::fmt;

/// 检查会话配置
#[derive(Debug, Clone, Copy)]
pub struct InspectConfig {
    /// 块缓存大小（块数），0 表示不启用缓存
    pub bcache_size: u32,
    /// 分析前执行完整的 superblock 检查
    pub strict: bool,
}

impl Default for InspectConfig {
    fn default() -> Self {
        Self {
            bcache_size: DEFAULT_CACHE_SIZE as u32,
            strict: true,
        }
    }
}

/// Inode 类型枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum InodeType {
    /// 未知类型
    #[default]
    Unknown = 0,
    /// FIFO（命名管道）
    Fifo = 1,
    /// 字符设备
    CharacterDevice = 2,
    /// 目录
    Directory = 3,
    /// 块设备
    BlockDevice = 4,
    /// 普通文件
    RegularFile = 5,
    /// 符号链接
    Symlink = 6,
    /// Socket
    Socket = 7,
}

impl InodeType {
    /// 从 mode 中提取 inode 类型
    pub fn from_mode(mode: u16) -> Self {
        match mode & EXT2_INODE_MODE_TYPE_MASK {
            EXT2_INODE_MODE_FIFO => InodeType::Fifo,
            EXT2_INODE_MODE_CHARDEV => InodeType::CharacterDevice,
            EXT2_INODE_MODE_DIRECTORY => InodeType::Directory,
            EXT2_INODE_MODE_BLOCKDEV => InodeType::BlockDevice,
            EXT2_INODE_MODE_FILE => InodeType::RegularFile,
            EXT2_INODE_MODE_SOFTLINK => InodeType::Symlink,
            EXT2_INODE_MODE_SOCKET => InodeType::Socket,
            _ => InodeType::Unknown,
        }
    }

    /// 从目录项文件类型代码转换
    pub fn from_de_type(de_type: u8) -> Self {
        match de_type {
            EXT2_DE_REG_FILE => InodeType::RegularFile,
            EXT2_DE_DIR => InodeType::Directory,
            EXT2_DE_CHRDEV => InodeType::CharacterDevice,
            EXT2_DE_BLKDEV => InodeType::BlockDevice,
            EXT2_DE_FIFO => InodeType::Fifo,
            EXT2_DE_SOCK => InodeType::Socket,
            EXT2_DE_SYMLINK => InodeType::Symlink,
            _ => InodeType::Unknown,
        }
    }

    /// 检查是否为目录
    pub fn is_dir(self) -> bool {
        self == InodeType::Directory
    }
}

impl fmt::Display for InodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InodeType::Unknown => "unknown",
            InodeType::Fifo => "fifo",
            InodeType::CharacterDevice => "character device",
            InodeType::Directory => "directory",
            InodeType::BlockDevice => "block device",
            InodeType::RegularFile => "regular file",
            InodeType::Symlink => "symlink",
            InodeType::Socket => "socket",
        };
        f.write_str(name)
    }
}
