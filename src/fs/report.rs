//! 检查报告
//!
//! 报告在所有读取完成后才整体生成，打印时不再访问设备。
//! 四个部分：文件系统概况、块组信息、根 inode、根目录项。

use super::InodeType;
use crate::{
    bitmap::{count_free, format_runs, BitRun},
    block_group::BlockGroup,
    dir::DirEntry,
    inode::Inode,
    superblock::{features, Superblock},
};
use core::fmt;

/// 文件系统概况
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneralReport {
    pub volume_name: String,
    pub rev_level: u32,
    pub block_size: u32,
    pub blocks_count: u32,
    pub disk_size: u64,
    pub blocks_per_group: u32,
    pub inode_size: u16,
    pub inodes_count: u32,
    pub inodes_per_group: u32,
    pub inode_blocks_per_group: u32,
    pub group_count: u32,
    pub first_data_block: u32,
    pub free_blocks_count: u32,
    pub free_inodes_count: u32,
    /// 已命名的特性标志
    pub features: Vec<String>,
}

impl GeneralReport {
    pub fn from_superblock(sb: &Superblock) -> Self {
        let mut features = features::describe(sb.compat_features());
        features.extend(features::describe(sb.incompat_features()));
        features.extend(features::describe(sb.ro_compat_features()));

        Self {
            volume_name: sb.volume_name(),
            rev_level: sb.rev_level(),
            block_size: sb.block_size(),
            blocks_count: sb.blocks_count(),
            disk_size: sb.disk_size(),
            blocks_per_group: sb.blocks_per_group(),
            inode_size: sb.inode_size(),
            inodes_count: sb.inodes_count(),
            inodes_per_group: sb.inodes_per_group(),
            inode_blocks_per_group: sb.inode_blocks_per_group(),
            group_count: sb.block_group_count(),
            first_data_block: sb.first_data_block(),
            free_blocks_count: sb.free_blocks_count(),
            free_inodes_count: sb.free_inodes_count(),
            features,
        }
    }
}

/// 单个块组的信息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupReport {
    pub group_num: u32,
    pub first_block: u64,
    pub last_block: u64,
    pub first_inode: u64,
    pub last_inode: u64,
    pub block_bitmap: u64,
    pub inode_bitmap: u64,
    pub inode_table: u64,
    pub free_blocks_count: u32,
    pub free_inodes_count: u32,
    pub used_dirs_count: u32,
    /// 块位图中的空闲块区间
    pub free_block_runs: Vec<BitRun>,
    /// inode 位图中的空闲 inode 区间
    pub free_inode_runs: Vec<BitRun>,
}

impl GroupReport {
    pub fn new(group: &BlockGroup, free_block_runs: Vec<BitRun>, free_inode_runs: Vec<BitRun>) -> Self {
        Self {
            group_num: group.group_num(),
            first_block: group.first_block(),
            last_block: group.last_block(),
            first_inode: group.first_inode(),
            last_inode: group.last_inode(),
            block_bitmap: group.block_bitmap(),
            inode_bitmap: group.inode_bitmap(),
            inode_table: group.inode_table(),
            free_blocks_count: group.free_blocks_count(),
            free_inodes_count: group.free_inodes_count(),
            used_dirs_count: group.used_dirs_count(),
            free_block_runs,
            free_inode_runs,
        }
    }

    /// 位图统计的空闲块数
    pub fn bitmap_free_blocks(&self) -> u64 {
        count_free(&self.free_block_runs)
    }

    /// 位图统计的空闲 inode 数
    pub fn bitmap_free_inodes(&self) -> u64 {
        count_free(&self.free_inode_runs)
    }

    /// 描述符计数与位图统计是否一致
    pub fn counts_match(&self) -> bool {
        self.bitmap_free_blocks() == self.free_blocks_count as u64
            && self.bitmap_free_inodes() == self.free_inodes_count as u64
    }
}

/// 根 inode 信息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootInodeReport {
    pub inode_num: u32,
    pub mode: u16,
    pub inode_type: InodeType,
    pub size: u64,
    pub links_count: u16,
    pub first_block: u32,
}

impl RootInodeReport {
    pub fn from_inode(inode: &Inode) -> Self {
        Self {
            inode_num: inode.inode_num(),
            mode: inode.mode(),
            inode_type: inode.inode_type(),
            size: inode.size(),
            links_count: inode.links_count(),
            first_block: inode.first_block(),
        }
    }
}

/// 完整报告
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FsReport {
    pub general: GeneralReport,
    pub groups: Vec<GroupReport>,
    pub root: RootInodeReport,
    pub entries: Vec<DirEntry>,
}

/// 描述符计数，位图统计不同时附加说明
fn write_count(f: &mut fmt::Formatter<'_>, label: &str, count: u32, bitmap: u64) -> fmt::Result {
    if count as u64 == bitmap {
        writeln!(f, "{label} : {count}")
    } else {
        writeln!(f, "{label} : {count} (bitmap says {bitmap})")
    }
}

impl fmt::Display for GeneralReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--General File System Information--")?;
        writeln!(f, "Volume Name : {}", self.volume_name)?;
        writeln!(f, "Revision Level : {}", self.rev_level)?;
        writeln!(f, "Block Size in Bytes : {}", self.block_size)?;
        writeln!(f, "Total Number of Blocks : {}", self.blocks_count)?;
        writeln!(f, "Disk Size in Bytes : {}", self.disk_size)?;
        writeln!(f, "Maximum Number of Blocks Per Group : {}", self.blocks_per_group)?;
        writeln!(f, "Inode Size in Bytes : {}", self.inode_size)?;
        writeln!(f, "Total Number of Inodes : {}", self.inodes_count)?;
        writeln!(f, "Number of Inodes Per Group : {}", self.inodes_per_group)?;
        writeln!(f, "Number of Inode Blocks Per Group : {}", self.inode_blocks_per_group)?;
        writeln!(f, "Number of Groups : {}", self.group_count)?;
        writeln!(f, "First Data Block ID : {}", self.first_data_block)?;
        writeln!(f, "Number of Free Blocks : {}", self.free_blocks_count)?;
        writeln!(f, "Number of Free Inodes : {}", self.free_inodes_count)?;
        if self.features.is_empty() {
            writeln!(f, "Features : none")
        } else {
            writeln!(f, "Features : {}", self.features.join(", "))
        }
    }
}

impl fmt::Display for GroupReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "-Group {} -", self.group_num)?;
        writeln!(f, "Block IDs : {}-{}", self.first_block, self.last_block)?;
        writeln!(f, "Inode IDs : {}-{}", self.first_inode, self.last_inode)?;
        writeln!(f, "Block Bitmap Block ID : {}", self.block_bitmap)?;
        writeln!(f, "Inode Bitmap Block ID : {}", self.inode_bitmap)?;
        writeln!(f, "Inode Table Block ID : {}", self.inode_table)?;
        write_count(f, "Number of Free Blocks", self.free_blocks_count, self.bitmap_free_blocks())?;
        write_count(f, "Number of Free Inodes", self.free_inodes_count, self.bitmap_free_inodes())?;
        writeln!(f, "Number of Directories : {}", self.used_dirs_count)?;
        writeln!(f, "Free Block IDs : {}", format_runs(&self.free_block_runs))?;
        writeln!(f, "Free Inode IDs : {}", format_runs(&self.free_inode_runs))
    }
}

impl fmt::Display for RootInodeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--Root Inode--")?;
        writeln!(f, "Inode : {}", self.inode_num)?;
        writeln!(f, "Mode : {:06o}", self.mode)?;
        writeln!(f, "Type : {}", self.inode_type)?;
        writeln!(f, "Size in Bytes : {}", self.size)?;
        writeln!(f, "Link Count : {}", self.links_count)?;
        writeln!(f, "First Block ID : {}", self.first_block)
    }
}

impl fmt::Display for FsReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.general)?;

        writeln!(f, "--Individual Group Information--")?;
        for group in &self.groups {
            writeln!(f, "{group}")?;
        }

        writeln!(f, "{}", self.root)?;

        writeln!(f, "--Root Directory Entries--")?;
        for entry in &self.entries {
            writeln!(f, "Inode: {}", entry.inode)?;
            writeln!(f, "Entry Length : {}", entry.rec_len)?;
            writeln!(f, "Name Length : {}", entry.name_len)?;
            writeln!(f, "File Type : {}", entry.file_type)?;
            writeln!(f, "Name : {}", entry.name_lossy())?;
            writeln!(f)?;
        }
        Ok(())
    }
}
