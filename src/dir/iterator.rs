//! 目录项遍历器
//!
//! 在单个数据块内逐项读取目录项。每一项的 `rec_len` 决定下一项的偏移，
//! 遍历器总是定位到 `当前偏移 + rec_len` 再读取，不假设固定步长。
//!
//! 终止条件：`当前偏移 − 块起点 ≥ 目录大小`。`rec_len` 小于目录项头部长度时
//! 返回 Corrupted，保证遍历总能前进。

use super::DirEntry;
use crate::{
    block::{BlockDev, BlockDevice},
    consts::*,
    error::{Error, Result},
    inode::Inode,
    superblock::Superblock,
    types::ext2_dir_entry,
};

/// 目录项遍历器
///
/// 惰性、有限、不可重启。出错后不再产生任何项。
pub struct DirWalker<'a, D: BlockDevice> {
    bdev: &'a mut BlockDev<D>,
    /// 数据块起始字节偏移
    start: u64,
    /// 当前目录项的字节偏移
    offset: u64,
    /// 需要遍历的字节数
    size: u64,
    finished: bool,
}

impl<'a, D: BlockDevice> DirWalker<'a, D> {
    /// 创建遍历器
    ///
    /// # 参数
    ///
    /// * `bdev` - 块设备
    /// * `start` - 第一个目录项的字节偏移
    /// * `size` - 遍历的字节数
    pub fn new(bdev: &'a mut BlockDev<D>, start: u64, size: u64) -> Self {
        Self {
            bdev,
            start,
            offset: start,
            size,
            finished: false,
        }
    }

    /// 遍历目录 inode 的第一个数据块
    ///
    /// 只支持单块目录：目录大小超过一个块时截断到块大小并记录警告。
    pub fn for_inode(bdev: &'a mut BlockDev<D>, sb: &Superblock, inode: &Inode) -> Result<Self> {
        if !inode.is_dir() {
            log::warn!(
                "[dir] inode {} has mode {:#o}, walking it as a directory anyway",
                inode.inode_num(),
                inode.mode()
            );
        }

        let block_size = sb.block_size() as u64;
        let start = (inode.first_block() as u64)
            .checked_mul(block_size)
            .ok_or_else(|| {
                Error::corrupted(format!(
                    "directory block {} overflows",
                    inode.first_block()
                ))
            })?;

        let size = if inode.size() > block_size {
            log::warn!(
                "[dir] directory inode {} is {} bytes, only the first {} byte block is walked",
                inode.inode_num(),
                inode.size(),
                block_size
            );
            block_size
        } else {
            inode.size()
        };

        log::debug!(
            "[dir] walking inode {} block {} ({} bytes)",
            inode.inode_num(),
            inode.first_block(),
            size
        );
        Ok(Self::new(bdev, start, size))
    }

    /// 当前偏移（相对块起点）
    pub fn position(&self) -> u64 {
        self.offset - self.start
    }

    /// 是否到达末尾
    pub fn is_at_end(&self) -> bool {
        self.finished || self.position() >= self.size
    }

    fn read_entry(&mut self) -> Result<DirEntry> {
        let header_buf = self.bdev.read_bytes(self.offset, EXT2_DIR_ENTRY_MIN_LEN)?;
        let header = ext2_dir_entry::from_bytes(&header_buf)?;

        let rec_len = header.rec_len as usize;
        if rec_len < EXT2_DIR_ENTRY_MIN_LEN {
            return Err(Error::corrupted(format!(
                "directory entry at offset {} has rec_len {} (minimum {})",
                self.offset, rec_len, EXT2_DIR_ENTRY_MIN_LEN
            )));
        }

        let name_len = header.name_len as usize;
        if name_len > rec_len - EXT2_DIR_ENTRY_MIN_LEN {
            return Err(Error::corrupted(format!(
                "directory entry at offset {} has name_len {} but rec_len {}",
                self.offset, name_len, rec_len
            )));
        }

        let name = if name_len == 0 {
            Vec::new()
        } else {
            self.bdev
                .read_bytes(self.offset + EXT2_DIR_ENTRY_MIN_LEN as u64, name_len)?
        };

        self.offset += rec_len as u64;
        Ok(DirEntry::from_header(header, name))
    }
}

impl<D: BlockDevice> Iterator for DirWalker<'_, D> {
    type Item = Result<DirEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.is_at_end() {
            self.finished = true;
            return None;
        }

        match self.read_entry() {
            Ok(entry) => Some(Ok(entry)),
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}

impl<D: BlockDevice> core::iter::FusedIterator for DirWalker<'_, D> {}

/// 读取目录 inode 第一个数据块中的全部目录项
pub fn read_dir<D: BlockDevice>(
    bdev: &mut BlockDev<D>,
    sb: &Superblock,
    inode: &Inode,
) -> Result<Vec<DirEntry>> {
    DirWalker::for_inode(bdev, sb, inode)?.collect()
}
