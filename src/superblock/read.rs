//! Superblock 读取和验证

use super::features::{CompatFeatures, IncompatFeatures, RoCompatFeatures};
use crate::{
    block::{BlockDev, BlockDevice},
    consts::*,
    error::{Error, Result},
    types::ext2_sblock,
};

/// 从块设备读取 superblock
///
/// 定位到字节 1024 并精确读取一个 superblock 记录。
///
/// # 返回
///
/// 成功返回 superblock 结构；镜像短于 superblock 记录时返回
/// [`ErrorKind::TruncatedRead`](crate::ErrorKind::TruncatedRead)
pub fn read_superblock<D: BlockDevice>(bdev: &mut BlockDev<D>) -> Result<ext2_sblock> {
    log::debug!(
        "[superblock] reading {} bytes at offset {}",
        EXT2_SUPERBLOCK_SIZE,
        EXT2_SUPERBLOCK_OFFSET
    );

    let mut sb_buf = [0u8; EXT2_SUPERBLOCK_SIZE];
    bdev.read_exact_at(EXT2_SUPERBLOCK_OFFSET, &mut sb_buf)?;

    ext2_sblock::from_bytes(&sb_buf)
}

/// Superblock 包装器，提供派生量和验证
///
/// 构造时保证派生量的算术前提成立（每组 inode 数、每组块数非零，
/// 块大小指数在范围内，inode 记录大小合法），因此所有访问器都不会除零或溢出。
#[derive(Debug, Clone)]
pub struct Superblock {
    pub(super) inner: ext2_sblock,
}

impl Superblock {
    /// 从 ext2_sblock 创建 Superblock
    pub fn new(inner: ext2_sblock) -> Result<Self> {
        if inner.inodes_per_group == 0 {
            return Err(Error::corrupted("superblock inodes_per_group is zero"));
        }
        if inner.blocks_per_group == 0 {
            return Err(Error::corrupted("superblock blocks_per_group is zero"));
        }
        if inner.log_block_size > EXT2_MAX_LOG_BLOCK_SIZE {
            return Err(Error::corrupted(format!(
                "superblock log_block_size {} exceeds {}",
                inner.log_block_size, EXT2_MAX_LOG_BLOCK_SIZE
            )));
        }

        let inode_size = inner.inode_record_size() as u32;
        let block_size = EXT2_MIN_BLOCK_SIZE << inner.log_block_size;
        if inode_size < EXT2_GOOD_OLD_INODE_SIZE as u32
            || !inode_size.is_power_of_two()
            || inode_size > block_size
        {
            return Err(Error::corrupted(format!(
                "superblock inode size {inode_size} is invalid for {block_size} byte blocks"
            )));
        }

        Ok(Self { inner })
    }

    /// 从块设备加载 superblock
    pub fn load<D: BlockDevice>(bdev: &mut BlockDev<D>) -> Result<Self> {
        let inner = read_superblock(bdev)?;
        Self::new(inner)
    }

    /// 获取内部 superblock 结构的引用
    pub fn inner(&self) -> &ext2_sblock {
        &self.inner
    }

    /// 获取块大小（1024 << log_block_size）
    pub fn block_size(&self) -> u32 {
        EXT2_MIN_BLOCK_SIZE << self.inner.log_block_size
    }

    /// 获取 inode 记录大小
    pub fn inode_size(&self) -> u16 {
        self.inner.inode_record_size()
    }

    /// 获取总块数
    pub fn blocks_count(&self) -> u32 {
        self.inner.blocks_count
    }

    /// 获取空闲块数
    pub fn free_blocks_count(&self) -> u32 {
        self.inner.free_blocks_count
    }

    /// 获取总 inode 数
    pub fn inodes_count(&self) -> u32 {
        self.inner.inodes_count
    }

    /// 获取空闲 inode 数
    pub fn free_inodes_count(&self) -> u32 {
        self.inner.free_inodes_count
    }

    /// 获取每组块数
    pub fn blocks_per_group(&self) -> u32 {
        self.inner.blocks_per_group
    }

    /// 获取每组 inode 数
    pub fn inodes_per_group(&self) -> u32 {
        self.inner.inodes_per_group
    }

    /// 获取第一个数据块
    pub fn first_data_block(&self) -> u32 {
        self.inner.first_data_block
    }

    /// 获取版本级别
    pub fn rev_level(&self) -> u32 {
        self.inner.rev_level
    }

    /// 磁盘大小（字节）= 总块数 × 块大小
    pub fn disk_size(&self) -> u64 {
        self.blocks_count() as u64 * self.block_size() as u64
    }

    /// 每组 inode 表占用的块数
    ///
    /// 每组 inode 数 ÷ (块大小 ÷ inode 大小)
    pub fn inode_blocks_per_group(&self) -> u32 {
        let inodes_per_block = self.block_size() / self.inode_size() as u32;
        self.inodes_per_group() / inodes_per_block
    }

    /// 获取块组数量
    ///
    /// 向上取整：块组必须覆盖全部 inode
    pub fn block_group_count(&self) -> u32 {
        self.inodes_count().div_ceil(self.inodes_per_group())
    }

    /// 块组描述符表所在的块号（紧随 superblock 所在块之后）
    pub fn group_desc_table_block(&self) -> u64 {
        self.first_data_block() as u64 + 1
    }

    /// 指定块组的第一个块号
    pub fn group_first_block(&self, bgid: u32) -> u64 {
        self.first_data_block() as u64 + bgid as u64 * self.blocks_per_group() as u64
    }

    /// 指定块组的最后一个块号
    ///
    /// 最后一个块组可能不足一个完整组，截断到文件系统末尾。
    /// 块组起点已在文件系统之外时返回 None。
    pub fn group_last_block(&self, bgid: u32) -> Option<u64> {
        let first = self.group_first_block(bgid);
        let end = (first + self.blocks_per_group() as u64).min(self.blocks_count() as u64);
        if end <= first {
            None
        } else {
            Some(end - 1)
        }
    }

    /// 指定块组的第一个 inode 号（inode 从 1 开始编号）
    pub fn group_first_inode(&self, bgid: u32) -> u64 {
        bgid as u64 * self.inodes_per_group() as u64 + 1
    }

    /// 指定块组的最后一个 inode 号
    ///
    /// 最后一个块组可能不足一个完整组，截断到总 inode 数
    pub fn group_last_inode(&self, bgid: u32) -> u64 {
        let end = (bgid as u64 + 1) * self.inodes_per_group() as u64;
        end.min(self.inodes_count() as u64)
    }

    /// 获取卷名称
    pub fn volume_name(&self) -> String {
        let len = self
            .inner
            .volume_name
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(self.inner.volume_name.len());
        String::from_utf8_lossy(&self.inner.volume_name[..len]).into_owned()
    }

    /// 兼容特性
    pub fn compat_features(&self) -> CompatFeatures {
        CompatFeatures::from_bits_retain(self.inner.feature_compat)
    }

    /// 不兼容特性
    pub fn incompat_features(&self) -> IncompatFeatures {
        IncompatFeatures::from_bits_retain(self.inner.feature_incompat)
    }

    /// 只读兼容特性
    pub fn ro_compat_features(&self) -> RoCompatFeatures {
        RoCompatFeatures::from_bits_retain(self.inner.feature_ro_compat)
    }

    /// 完整的 superblock 验证
    ///
    /// 检查：
    /// - 魔数
    /// - inodes_count / blocks_count 非零
    /// - first_data_block 位于文件系统内
    ///
    /// 使描述符布局假设失效的特性（META_BG、64 位）只记录警告。
    pub fn check(&self) -> Result<()> {
        if !self.inner.is_valid() {
            return Err(Error::corrupted(format!(
                "bad superblock magic {:#06x}, expected {:#06x}",
                self.inner.magic, EXT2_SUPERBLOCK_MAGIC
            )));
        }

        if self.inodes_count() == 0 {
            return Err(Error::corrupted("superblock inodes_count is zero"));
        }

        if self.blocks_count() == 0 {
            return Err(Error::corrupted("superblock blocks_count is zero"));
        }

        if self.first_data_block() >= self.blocks_count() {
            return Err(Error::corrupted(format!(
                "first data block {} lies outside {} blocks",
                self.first_data_block(),
                self.blocks_count()
            )));
        }

        let layout_breaking = IncompatFeatures::META_BG | IncompatFeatures::BIT64;
        if self.incompat_features().intersects(layout_breaking) {
            log::warn!(
                "[superblock] incompat features {:?} change the descriptor layout; group data may be misread",
                self.incompat_features() & layout_breaking
            );
        }

        Ok(())
    }
}
