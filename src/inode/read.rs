//! Inode 读取

use crate::{
    block::{BlockDev, BlockDevice},
    block_group::BlockGroup,
    consts::*,
    error::{Error, Result},
    fs::InodeType,
    superblock::Superblock,
    types::ext2_inode,
};

/// 计算 inode 记录的字节偏移
///
/// `inode_table × block_size + ((inode_num − 1) mod inodes_per_group) × inode_size`
///
/// # 参数
///
/// * `sb` - superblock 引用
/// * `groups` - 块组描述符表
/// * `inode_num` - inode 编号（从 1 开始）
pub fn inode_offset(sb: &Superblock, groups: &[BlockGroup], inode_num: u32) -> Result<u64> {
    if inode_num == 0 || inode_num > sb.inodes_count() {
        return Err(Error::corrupted(format!(
            "inode {} outside 1..={}",
            inode_num,
            sb.inodes_count()
        )));
    }

    let inodes_per_group = sb.inodes_per_group();
    let block_group = (inode_num - 1) / inodes_per_group;
    let index_in_group = (inode_num - 1) % inodes_per_group;

    let desc = groups.get(block_group as usize).ok_or_else(|| {
        Error::corrupted(format!(
            "inode {} belongs to group {} but only {} groups were read",
            inode_num,
            block_group,
            groups.len()
        ))
    })?;

    let block_size = sb.block_size() as u64;
    let inode_size = sb.inode_size() as u64;

    desc.inode_table()
        .checked_mul(block_size)
        .and_then(|base| base.checked_add(index_in_group as u64 * inode_size))
        .ok_or_else(|| {
            Error::corrupted(format!(
                "inode table block {} of group {} overflows",
                desc.inode_table(),
                block_group
            ))
        })
}

/// 从块设备读取 inode
///
/// 读取完整的 inode 记录（`inode_size` 字节），只解码经典的前 128 字节。
/// 不校验 mode，调用方自己清楚请求的是哪个 inode。
///
/// # 参数
///
/// * `bdev` - 块设备引用
/// * `sb` - superblock 引用
/// * `groups` - 块组描述符表
/// * `inode_num` - inode 编号（从 1 开始）
pub fn read_inode<D: BlockDevice>(
    bdev: &mut BlockDev<D>,
    sb: &Superblock,
    groups: &[BlockGroup],
    inode_num: u32,
) -> Result<ext2_inode> {
    let offset = inode_offset(sb, groups, inode_num)?;
    log::debug!(
        "[inode] reading inode {} ({} bytes) at offset {}",
        inode_num,
        sb.inode_size(),
        offset
    );

    let inode_buf = bdev.read_bytes(offset, sb.inode_size() as usize)?;
    ext2_inode::from_bytes(&inode_buf)
}

/// Inode 包装器
#[derive(Debug, Clone)]
pub struct Inode {
    pub(super) inner: ext2_inode,
    pub(super) inode_num: u32,
}

impl Inode {
    /// 从块设备加载 inode
    pub fn load<D: BlockDevice>(
        bdev: &mut BlockDev<D>,
        sb: &Superblock,
        groups: &[BlockGroup],
        inode_num: u32,
    ) -> Result<Self> {
        let inner = read_inode(bdev, sb, groups, inode_num)?;
        Ok(Self { inner, inode_num })
    }

    /// 加载根目录 inode
    pub fn load_root<D: BlockDevice>(
        bdev: &mut BlockDev<D>,
        sb: &Superblock,
        groups: &[BlockGroup],
    ) -> Result<Self> {
        Self::load(bdev, sb, groups, EXT2_ROOT_INODE)
    }

    /// 获取 inode 编号
    pub fn inode_num(&self) -> u32 {
        self.inode_num
    }

    /// 获取内部 inode 结构的引用
    pub fn inner(&self) -> &ext2_inode {
        &self.inner
    }

    /// 获取文件大小
    ///
    /// 普通文件的高 32 位在 size_high 中；目录的同一字段是 dir_acl，不参与计算
    pub fn size(&self) -> u64 {
        if self.inner.is_file() {
            (self.inner.size_high as u64) << 32 | self.inner.size as u64
        } else {
            self.inner.size as u64
        }
    }

    /// 获取 mode
    pub fn mode(&self) -> u16 {
        self.inner.mode
    }

    /// 权限位
    pub fn permissions(&self) -> u16 {
        self.inner.mode & EXT2_INODE_MODE_PERM_MASK
    }

    /// 获取 inode 类型
    pub fn inode_type(&self) -> InodeType {
        InodeType::from_mode(self.inner.mode)
    }

    /// 是否是目录
    pub fn is_dir(&self) -> bool {
        self.inner.is_dir()
    }

    /// 获取硬链接数
    pub fn links_count(&self) -> u16 {
        self.inner.links_count
    }

    /// 第一个直接块指针
    pub fn first_block(&self) -> u32 {
        self.inner.block[0]
    }

    /// 全部直接块指针
    pub fn direct_blocks(&self) -> &[u32] {
        &self.inner.block[..EXT2_NDIR_BLOCKS]
    }
}
