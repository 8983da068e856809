//! ext2 文件系统常量定义
//!
//! 这个模块包含了分析器用到的磁盘布局常量，包括：
//! - Superblock 位置和大小
//! - 各类定长记录的大小
//! - 文件类型和 inode 模式位

//=============================================================================
// 基础常量
//=============================================================================

/// 最小块大小（1024 字节），也是块大小指数的基数
pub const EXT2_MIN_BLOCK_SIZE: u32 = 1024;

/// 块大小指数上限（1024 << 6 = 65536）
pub const EXT2_MAX_LOG_BLOCK_SIZE: u32 = 6;

//=============================================================================
// Superblock 相关
//=============================================================================

/// Superblock 在设备上的字节偏移（引导区之后）
pub const EXT2_SUPERBLOCK_OFFSET: u64 = 1024;

/// Superblock 记录大小（字节）
pub const EXT2_SUPERBLOCK_SIZE: usize = 1024;

/// ext2 魔数 (0xEF53)
pub const EXT2_SUPERBLOCK_MAGIC: u16 = 0xEF53;

/// 原始版本（固定 inode 大小）
pub const EXT2_GOOD_OLD_REV: u32 = 0;

/// 原始版本的 inode 大小
pub const EXT2_GOOD_OLD_INODE_SIZE: u16 = 128;

//=============================================================================
// 块组 / inode / 目录项
//=============================================================================

/// 块组描述符大小
pub const EXT2_GROUP_DESC_SIZE: usize = 32;

/// inode 记录中被解码的部分（经典 128 字节布局）
pub const EXT2_INODE_RECORD_SIZE: usize = 128;

/// Root inode 编号
pub const EXT2_ROOT_INODE: u32 = 2;

/// 直接块指针个数
pub const EXT2_NDIR_BLOCKS: usize = 12;

/// 块指针数组长度（12 直接 + 3 间接）
pub const EXT2_N_BLOCKS: usize = 15;

/// 目录项头部大小（inode + rec_len + name_len + file_type）
pub const EXT2_DIR_ENTRY_MIN_LEN: usize = 8;

/// 文件名最大长度
pub const EXT2_NAME_MAX: usize = 255;

//=============================================================================
// 目录项文件类型
//=============================================================================

/// 未知类型
pub const EXT2_DE_UNKNOWN: u8 = 0;
/// 普通文件
pub const EXT2_DE_REG_FILE: u8 = 1;
/// 目录
pub const EXT2_DE_DIR: u8 = 2;
/// 字符设备
pub const EXT2_DE_CHRDEV: u8 = 3;
/// 块设备
pub const EXT2_DE_BLKDEV: u8 = 4;
/// FIFO
pub const EXT2_DE_FIFO: u8 = 5;
/// Socket
pub const EXT2_DE_SOCK: u8 = 6;
/// 符号链接
pub const EXT2_DE_SYMLINK: u8 = 7;

//=============================================================================
// Inode 模式位
//=============================================================================

/// 文件类型掩码
pub const EXT2_INODE_MODE_TYPE_MASK: u16 = 0xF000;
/// FIFO
pub const EXT2_INODE_MODE_FIFO: u16 = 0x1000;
/// 字符设备
pub const EXT2_INODE_MODE_CHARDEV: u16 = 0x2000;
/// 目录
pub const EXT2_INODE_MODE_DIRECTORY: u16 = 0x4000;
/// 块设备
pub const EXT2_INODE_MODE_BLOCKDEV: u16 = 0x6000;
/// 普通文件
pub const EXT2_INODE_MODE_FILE: u16 = 0x8000;
/// 符号链接
pub const EXT2_INODE_MODE_SOFTLINK: u16 = 0xA000;
/// Socket
pub const EXT2_INODE_MODE_SOCKET: u16 = 0xC000;
/// 权限位掩码
pub const EXT2_INODE_MODE_PERM_MASK: u16 = 0x0FFF;
