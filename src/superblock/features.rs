//! Superblock 特性标志
//!
//! 未知位保留在标志值中，由 [`unknown_bits`] 取出。

use bitflags::{bitflags, Flags};

bitflags! {
    /// 兼容特性（`s_feature_compat`）
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct CompatFeatures: u32 {
        /// 目录预分配
        const DIR_PREALLOC = 0x0001;
        /// AFS 服务器 inode
        const IMAGIC_INODES = 0x0002;
        /// 有日志（ext3）
        const HAS_JOURNAL = 0x0004;
        /// 扩展属性
        const EXT_ATTR = 0x0008;
        /// 预留 GDT 块用于在线扩容
        const RESIZE_INODE = 0x0010;
        /// HTree 目录索引
        const DIR_INDEX = 0x0020;
    }
}

bitflags! {
    /// 不兼容特性（`s_feature_incompat`）
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct IncompatFeatures: u32 {
        /// 压缩
        const COMPRESSION = 0x0001;
        /// 目录项带文件类型
        const FILETYPE = 0x0002;
        /// 需要日志恢复
        const RECOVER = 0x0004;
        /// 外部日志设备
        const JOURNAL_DEV = 0x0008;
        /// 元块组
        const META_BG = 0x0010;
        /// extent 树
        const EXTENTS = 0x0040;
        /// 64 位块号
        const BIT64 = 0x0080;
        /// 弹性块组
        const FLEX_BG = 0x0200;
    }
}

bitflags! {
    /// 只读兼容特性（`s_feature_ro_compat`）
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct RoCompatFeatures: u32 {
        /// 稀疏超级块
        const SPARSE_SUPER = 0x0001;
        /// 大文件
        const LARGE_FILE = 0x0002;
        /// B 树目录
        const BTREE_DIR = 0x0004;
        /// 巨型文件
        const HUGE_FILE = 0x0008;
        /// 组描述符校验和
        const GDT_CSUM = 0x0010;
        /// 目录链接数不受限
        const DIR_NLINK = 0x0020;
        /// 大 inode
        const EXTRA_ISIZE = 0x0040;
        /// 元数据校验和
        const METADATA_CSUM = 0x0400;
    }
}

/// 取出不属于任何已命名标志的位
pub fn unknown_bits<F: Flags<Bits = u32>>(flags: F) -> u32 {
    flags.bits() & !F::all().bits()
}

/// 列出已设置标志的名称，未知位以十六进制追加
pub fn describe<F: Flags<Bits = u32>>(flags: F) -> Vec<String> {
    let mut names: Vec<String> = flags.iter_names().map(|(name, _)| name.to_string()).collect();
    let unknown = unknown_bits(flags);
    if unknown != 0 {
        names.push(format!("{unknown:#x}"));
    }
    names
}
