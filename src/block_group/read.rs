//! 块组描述符表读取和查询操作

use crate::{
    block::{BlockDev, BlockDevice},
    consts::*,
    error::{Error, Result},
    superblock::Superblock,
    types::ext2_group_desc,
};

/// 计算块组描述符表的位置和长度
///
/// # 返回
///
/// (字节偏移, 字节长度) 元组
pub fn get_group_desc_table_location(sb: &Superblock) -> Result<(u64, usize)> {
    let offset = sb.group_desc_table_block() * sb.block_size() as u64;
    let len = (sb.block_group_count() as usize)
        .checked_mul(EXT2_GROUP_DESC_SIZE)
        .ok_or_else(|| {
            Error::corrupted(format!(
                "group descriptor table for {} groups overflows",
                sb.block_group_count()
            ))
        })?;
    Ok((offset, len))
}

/// 读取整个块组描述符表
///
/// 描述符表作为一个连续区间一次读出，不逐组定位。
///
/// # 返回
///
/// 成功返回按块组编号排列的描述符；读取不足时返回
/// [`ErrorKind::TruncatedRead`](crate::ErrorKind::TruncatedRead)
pub fn read_group_desc_table<D: BlockDevice>(
    bdev: &mut BlockDev<D>,
    sb: &Superblock,
) -> Result<Vec<BlockGroup>> {
    let (offset, len) = get_group_desc_table_location(sb)?;
    log::debug!(
        "[block_group] reading {} descriptors ({} bytes) at offset {}",
        sb.block_group_count(),
        len,
        offset
    );

    let table = bdev.read_bytes(offset, len)?;

    let mut groups = Vec::new();
    groups.try_reserve_exact(sb.block_group_count() as usize)?;
    for (group_num, raw) in table.chunks_exact(EXT2_GROUP_DESC_SIZE).enumerate() {
        let inner = ext2_group_desc::from_bytes(raw)?;
        groups.push(BlockGroup::new(inner, group_num as u32, sb)?);
    }

    Ok(groups)
}

/// BlockGroup 包装器
///
/// 保存描述符本身以及该组的块号、inode 号范围
#[derive(Debug, Clone)]
pub struct BlockGroup {
    pub(super) inner: ext2_group_desc,
    pub(super) group_num: u32,
    first_block: u64,
    last_block: u64,
    first_inode: u64,
    last_inode: u64,
}

impl BlockGroup {
    /// 从描述符创建，并根据 superblock 计算范围
    ///
    /// 块组起点已经超出文件系统末尾时返回 Corrupted
    pub fn new(inner: ext2_group_desc, group_num: u32, sb: &Superblock) -> Result<Self> {
        let first_block = sb.group_first_block(group_num);
        let last_block = sb.group_last_block(group_num).ok_or_else(|| {
            Error::corrupted(format!(
                "group {} starts at block {} beyond the {} block filesystem",
                group_num,
                first_block,
                sb.blocks_count()
            ))
        })?;

        Ok(Self {
            inner,
            group_num,
            first_block,
            last_block,
            first_inode: sb.group_first_inode(group_num),
            last_inode: sb.group_last_inode(group_num),
        })
    }

    /// 获取块组编号
    pub fn group_num(&self) -> u32 {
        self.group_num
    }

    /// 获取内部块组描述符结构的引用
    pub fn inner(&self) -> &ext2_group_desc {
        &self.inner
    }

    /// 获取块位图块号
    pub fn block_bitmap(&self) -> u64 {
        self.inner.block_bitmap as u64
    }

    /// 获取 inode 位图块号
    pub fn inode_bitmap(&self) -> u64 {
        self.inner.inode_bitmap as u64
    }

    /// 获取 inode 表起始块号
    pub fn inode_table(&self) -> u64 {
        self.inner.inode_table as u64
    }

    /// 获取空闲块数
    pub fn free_blocks_count(&self) -> u32 {
        self.inner.free_blocks_count as u32
    }

    /// 获取空闲 inode 数
    pub fn free_inodes_count(&self) -> u32 {
        self.inner.free_inodes_count as u32
    }

    /// 获取目录数
    pub fn used_dirs_count(&self) -> u32 {
        self.inner.used_dirs_count as u32
    }

    /// 第一个块号
    pub fn first_block(&self) -> u64 {
        self.first_block
    }

    /// 最后一个块号
    pub fn last_block(&self) -> u64 {
        self.last_block
    }

    /// 第一个 inode 号
    pub fn first_inode(&self) -> u64 {
        self.first_inode
    }

    /// 最后一个 inode 号
    pub fn last_inode(&self) -> u64 {
        self.last_inode
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::MemDevice;
    use crate::error::ErrorKind;
    use crate::types::ext2_sblock;
    use byteorder::{ByteOrder, LittleEndian};

    fn superblock(inodes_count: u32, inodes_per_group: u32) -> Superblock {
        Superblock::new(ext2_sblock {
            inodes_count,
            blocks_count: 3 * 8192,
            first_data_block: 0,
            log_block_size: 2,
            blocks_per_group: 8192,
            inodes_per_group,
            magic: EXT2_SUPERBLOCK_MAGIC,
            rev_level: 1,
            inode_size: 128,
            ..Default::default()
        })
        .unwrap()
    }

    fn write_desc(image: &mut [u8], offset: usize, bitmap: u32, free_blocks: u16) {
        let d = &mut image[offset..offset + EXT2_GROUP_DESC_SIZE];
        LittleEndian::write_u32(&mut d[0..], bitmap);
        LittleEndian::write_u32(&mut d[4..], bitmap + 1);
        LittleEndian::write_u32(&mut d[8..], bitmap + 2);
        LittleEndian::write_u16(&mut d[12..], free_blocks);
        LittleEndian::write_u16(&mut d[14..], 7);
        LittleEndian::write_u16(&mut d[16..], 1);
    }

    #[test]
    fn test_read_table() {
        let sb = superblock(30, 10);
        let mut image = vec![0u8; 2 * 4096];
        write_desc(&mut image, 4096, 3, 100);
        write_desc(&mut image, 4096 + 32, 8195, 200);
        write_desc(&mut image, 4096 + 64, 16387, 300);

        let mut bdev = BlockDev::new(MemDevice::new(image)).unwrap();
        let groups = read_group_desc_table(&mut bdev, &sb).unwrap();
        assert_eq!(groups.len(), 3);
        // 一次连续读取
        assert_eq!(bdev.read_count(), 1);

        assert_eq!(groups[1].group_num(), 1);
        assert_eq!(groups[1].block_bitmap(), 8195);
        assert_eq!(groups[1].inode_bitmap(), 8196);
        assert_eq!(groups[1].inode_table(), 8197);
        assert_eq!(groups[1].free_blocks_count(), 200);
        assert_eq!(groups[1].free_inodes_count(), 7);
        assert_eq!(groups[1].used_dirs_count(), 1);
        assert_eq!(groups[1].first_block(), 8192);
        assert_eq!(groups[1].last_block(), 16383);
        assert_eq!(groups[1].first_inode(), 11);
        assert_eq!(groups[1].last_inode(), 20);
    }

    #[test]
    fn test_partial_last_group_is_read() {
        // 25 个 inode，每组 10 个，需要 3 个块组
        let sb = superblock(25, 10);
        let mut image = vec![0u8; 2 * 4096];
        write_desc(&mut image, 4096 + 64, 16387, 300);

        let mut bdev = BlockDev::new(MemDevice::new(image)).unwrap();
        let groups = read_group_desc_table(&mut bdev, &sb).unwrap();
        assert_eq!(groups.len(), 3);
        assert_eq!(groups[2].block_bitmap(), 16387);
        assert_eq!(groups[2].last_inode(), 25);
    }

    #[test]
    fn test_short_table() {
        let sb = superblock(30, 10);
        // 描述符表需要 96 字节，镜像只提供 50 字节
        let image = vec![0u8; 4096 + 50];
        let mut bdev = BlockDev::new(MemDevice::new(image)).unwrap();
        let err = read_group_desc_table(&mut bdev, &sb).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TruncatedRead);
    }

    #[test]
    fn test_group_past_end_is_corrupt() {
        // 4 个块组的 inode，但块只够 3 个块组
        let sb = superblock(40, 10);
        let image = vec![0u8; 2 * 4096];
        let mut bdev = BlockDev::new(MemDevice::new(image)).unwrap();
        let err = read_group_desc_table(&mut bdev, &sb).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Corrupted);
    }
}
