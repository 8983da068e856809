//! ext2 数据结构定义
//!
//! 这个模块包含了直接对应磁盘格式的数据结构。
//!
//! ## 设计原则
//!
//! 1. **磁盘格式结构** - 保留 C 风格命名（便于对照 ext2 规范）
//! 2. **按字节解码** - 通过 `byteorder` 从小端字节切片逐字段解码，不做指针转换
//! 3. **辅助方法** - 提供 Rust 风格的访问器和工具函数

#![allow(non_camel_case_types)] // 允许C风格命名

use crate::consts::*;
use crate::error::{Error, ErrorKind, Result};
use byteorder::{ByteOrder, LittleEndian};

/// 检查缓冲区是否足够容纳一个记录
fn ensure_len(buf: &[u8], need: usize, what: &str) -> Result<()> {
    if buf.len() < need {
        return Err(Error::new(
            ErrorKind::TruncatedRead,
            format!("{what} needs {need} bytes, buffer has {}", buf.len()),
        ));
    }
    Ok(())
}

fn copy_array<const N: usize>(buf: &[u8], offset: usize) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(&buf[offset..offset + N]);
    out
}

//=============================================================================
// 磁盘格式结构定义
//=============================================================================

/// Superblock 结构
///
/// 对应 ext2 磁盘格式中的 superblock (ext2_super_block) 的前 200 字节，
/// 其余部分为日志、预分配等本工具不关心的字段。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ext2_sblock {
    pub inodes_count: u32,        // 0: 总 inode 数
    pub blocks_count: u32,        // 4: 总块数
    pub r_blocks_count: u32,      // 8: 保留块数
    pub free_blocks_count: u32,   // 12: 空闲块数
    pub free_inodes_count: u32,   // 16: 空闲 inode 数
    pub first_data_block: u32,    // 20: 第一个数据块
    pub log_block_size: u32,      // 24: 块大小（1024 << log_block_size）
    pub log_frag_size: u32,       // 28: 片段大小
    pub blocks_per_group: u32,    // 32: 每组块数
    pub frags_per_group: u32,     // 36: 每组片段数
    pub inodes_per_group: u32,    // 40: 每组 inode 数
    pub mtime: u32,               // 44: 挂载时间
    pub wtime: u32,               // 48: 写入时间
    pub mnt_count: u16,           // 52: 挂载次数
    pub max_mnt_count: u16,       // 54: 最大挂载次数
    pub magic: u16,               // 56: 魔数 (0xEF53)
    pub state: u16,               // 58: 文件系统状态
    pub errors: u16,              // 60: 错误处理方式
    pub minor_rev_level: u16,     // 62: 次版本号
    pub lastcheck: u32,           // 64: 最后检查时间
    pub checkinterval: u32,       // 68: 检查间隔
    pub creator_os: u32,          // 72: 创建者操作系统
    pub rev_level: u32,           // 76: 版本级别
    pub def_resuid: u16,          // 80: 默认保留 uid
    pub def_resgid: u16,          // 82: 默认保留 gid
    pub first_ino: u32,           // 84: 第一个非保留 inode
    pub inode_size: u16,          // 88: inode 大小
    pub block_group_nr: u16,      // 90: 本超级块所在的块组号
    pub feature_compat: u32,      // 92: 兼容特性
    pub feature_incompat: u32,    // 96: 不兼容特性
    pub feature_ro_compat: u32,   // 100: 只读兼容特性
    pub uuid: [u8; 16],           // 104: 128位UUID
    pub volume_name: [u8; 16],    // 120: 卷名称
}

impl ext2_sblock {
    /// 从 superblock 记录字节解码
    pub fn from_bytes(buf: &[u8]) -> Result<Self> {
        ensure_len(buf, EXT2_SUPERBLOCK_SIZE, "superblock")?;
        let u32_at = |off: usize| LittleEndian::read_u32(&buf[off..]);
        let u16_at = |off: usize| LittleEndian::read_u16(&buf[off..]);

        Ok(Self {
            inodes_count: u32_at(0),
            blocks_count: u32_at(4),
            r_blocks_count: u32_at(8),
            free_blocks_count: u32_at(12),
            free_inodes_count: u32_at(16),
            first_data_block: u32_at(20),
            log_block_size: u32_at(24),
            log_frag_size: u32_at(28),
            blocks_per_group: u32_at(32),
            frags_per_group: u32_at(36),
            inodes_per_group: u32_at(40),
            mtime: u32_at(44),
            wtime: u32_at(48),
            mnt_count: u16_at(52),
            max_mnt_count: u16_at(54),
            magic: u16_at(56),
            state: u16_at(58),
            errors: u16_at(60),
            minor_rev_level: u16_at(62),
            lastcheck: u32_at(64),
            checkinterval: u32_at(68),
            creator_os: u32_at(72),
            rev_level: u32_at(76),
            def_resuid: u16_at(80),
            def_resgid: u16_at(82),
            first_ino: u32_at(84),
            inode_size: u16_at(88),
            block_group_nr: u16_at(90),
            feature_compat: u32_at(92),
            feature_incompat: u32_at(96),
            feature_ro_compat: u32_at(100),
            uuid: copy_array(buf, 104),
            volume_name: copy_array(buf, 120),
        })
    }

    /// 验证魔数
    pub fn is_valid(&self) -> bool {
        self.magic == EXT2_SUPERBLOCK_MAGIC
    }

    /// inode 记录大小，原始版本固定为 128
    pub fn inode_record_size(&self) -> u16 {
        if self.rev_level == EXT2_GOOD_OLD_REV || self.inode_size == 0 {
            EXT2_GOOD_OLD_INODE_SIZE
        } else {
            self.inode_size
        }
    }
}

/// 块组描述符
///
/// 对应 ext2 磁盘格式中的块组描述符 (ext2_group_desc)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ext2_group_desc {
    pub block_bitmap: u32,      // 0: 块位图块号
    pub inode_bitmap: u32,      // 4: inode位图块号
    pub inode_table: u32,       // 8: inode表起始块号
    pub free_blocks_count: u16, // 12: 空闲块数
    pub free_inodes_count: u16, // 14: 空闲inode数
    pub used_dirs_count: u16,   // 16: 目录数
    pub pad: u16,               // 18: 填充
}

impl ext2_group_desc {
    /// 从 32 字节描述符记录解码
    pub fn from_bytes(buf: &[u8]) -> Result<Self> {
        ensure_len(buf, EXT2_GROUP_DESC_SIZE, "group descriptor")?;
        Ok(Self {
            block_bitmap: LittleEndian::read_u32(&buf[0..]),
            inode_bitmap: LittleEndian::read_u32(&buf[4..]),
            inode_table: LittleEndian::read_u32(&buf[8..]),
            free_blocks_count: LittleEndian::read_u16(&buf[12..]),
            free_inodes_count: LittleEndian::read_u16(&buf[14..]),
            used_dirs_count: LittleEndian::read_u16(&buf[16..]),
            pad: LittleEndian::read_u16(&buf[18..]),
        })
    }
}

/// Inode 结构
///
/// 对应 ext2 磁盘格式中 inode 的经典 128 字节部分 (ext2_inode)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ext2_inode {
    pub mode: u16,                   // 0: 文件模式
    pub uid: u16,                    // 2: 所有者 uid
    pub size: u32,                   // 4: 文件大小（低32位）
    pub atime: u32,                  // 8: 访问时间
    pub ctime: u32,                  // 12: inode改变时间
    pub mtime: u32,                  // 16: 修改时间
    pub dtime: u32,                  // 20: 删除时间
    pub gid: u16,                    // 24: 组 gid
    pub links_count: u16,            // 26: 硬链接数
    pub blocks: u32,                 // 28: 512B块数
    pub flags: u32,                  // 32: 标志
    pub osd1: u32,                   // 36: OS相关1
    pub block: [u32; EXT2_N_BLOCKS], // 40: 块指针数组（15个）
    pub generation: u32,             // 100: 文件版本
    pub file_acl: u32,               // 104: 文件 ACL
    pub size_high: u32,              // 108: 文件大小高32位（目录为 dir_acl）
    pub faddr: u32,                  // 112: 片段地址
}

impl ext2_inode {
    /// 从 inode 记录字节解码（只解码前 128 字节）
    pub fn from_bytes(buf: &[u8]) -> Result<Self> {
        ensure_len(buf, EXT2_INODE_RECORD_SIZE, "inode")?;
        let u32_at = |off: usize| LittleEndian::read_u32(&buf[off..]);
        let u16_at = |off: usize| LittleEndian::read_u16(&buf[off..]);

        let mut block = [0u32; EXT2_N_BLOCKS];
        LittleEndian::read_u32_into(&buf[40..40 + 4 * EXT2_N_BLOCKS], &mut block);

        Ok(Self {
            mode: u16_at(0),
            uid: u16_at(2),
            size: u32_at(4),
            atime: u32_at(8),
            ctime: u32_at(12),
            mtime: u32_at(16),
            dtime: u32_at(20),
            gid: u16_at(24),
            links_count: u16_at(26),
            blocks: u32_at(28),
            flags: u32_at(32),
            osd1: u32_at(36),
            block,
            generation: u32_at(100),
            file_acl: u32_at(104),
            size_high: u32_at(108),
            faddr: u32_at(112),
        })
    }

    /// 是否是目录
    pub fn is_dir(&self) -> bool {
        (self.mode & EXT2_INODE_MODE_TYPE_MASK) == EXT2_INODE_MODE_DIRECTORY
    }

    /// 是否是普通文件
    pub fn is_file(&self) -> bool {
        (self.mode & EXT2_INODE_MODE_TYPE_MASK) == EXT2_INODE_MODE_FILE
    }
}

/// 目录项头部
///
/// 对应 ext2 磁盘格式中的目录项 (ext2_dir_entry_2)，
/// 后面跟着 `name_len` 字节的变长文件名
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ext2_dir_entry {
    pub inode: u32,    // inode 编号
    pub rec_len: u16,  // 记录长度
    pub name_len: u8,  // 名称长度
    pub file_type: u8, // 文件类型
}

impl ext2_dir_entry {
    /// 从 8 字节头部解码
    pub fn from_bytes(buf: &[u8]) -> Result<Self> {
        ensure_len(buf, EXT2_DIR_ENTRY_MIN_LEN, "directory entry")?;
        Ok(Self {
            inode: LittleEndian::read_u32(&buf[0..]),
            rec_len: LittleEndian::read_u16(&buf[4..]),
            name_len: buf[6],
            file_type: buf[7],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_superblock_decode() {
        let mut buf = vec![0u8; EXT2_SUPERBLOCK_SIZE];
        LittleEndian::write_u32(&mut buf[0..], 10);
        LittleEndian::write_u32(&mut buf[4..], 64);
        LittleEndian::write_u32(&mut buf[24..], 2);
        LittleEndian::write_u32(&mut buf[40..], 4);
        LittleEndian::write_u16(&mut buf[56..], EXT2_SUPERBLOCK_MAGIC);
        LittleEndian::write_u32(&mut buf[76..], 1);
        LittleEndian::write_u16(&mut buf[88..], 256);
        buf[120..124].copy_from_slice(b"root");

        let sb = ext2_sblock::from_bytes(&buf).unwrap();
        assert!(sb.is_valid());
        assert_eq!(sb.inodes_count, 10);
        assert_eq!(sb.blocks_count, 64);
        assert_eq!(sb.log_block_size, 2);
        assert_eq!(sb.inodes_per_group, 4);
        assert_eq!(sb.inode_record_size(), 256);
        assert_eq!(&sb.volume_name[..4], b"root");
    }

    #[test]
    fn test_old_revision_inode_size() {
        let sb = ext2_sblock {
            rev_level: EXT2_GOOD_OLD_REV,
            inode_size: 256,
            ..Default::default()
        };
        assert_eq!(sb.inode_record_size(), 128);
    }

    #[test]
    fn test_short_buffer_rejected() {
        let err = ext2_sblock::from_bytes(&[0u8; 100]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TruncatedRead);

        let err = ext2_dir_entry::from_bytes(&[0u8; 7]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TruncatedRead);
    }

    #[test]
    fn test_inode_block_pointers() {
        let mut buf = vec![0u8; EXT2_INODE_RECORD_SIZE];
        LittleEndian::write_u16(&mut buf[0..], EXT2_INODE_MODE_DIRECTORY | 0o755);
        LittleEndian::write_u32(&mut buf[4..], 4096);
        LittleEndian::write_u32(&mut buf[40..], 77);
        LittleEndian::write_u32(&mut buf[96..], 99);

        let inode = ext2_inode::from_bytes(&buf).unwrap();
        assert!(inode.is_dir());
        assert!(!inode.is_file());
        assert_eq!(inode.size, 4096);
        assert_eq!(inode.block[0], 77);
        assert_eq!(inode.block[14], 99);
    }
}
