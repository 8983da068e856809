//! ext2 镜像检查会话

use super::{
    report::{FsReport, GeneralReport, GroupReport, RootInodeReport},
    InspectConfig,
};
use crate::{
    bitmap::read_free_runs,
    block::{BlockDev, BlockDevice},
    block_group::{read_group_desc_table, BlockGroup},
    dir::{read_dir, DirEntry},
    error::{Error, Result},
    inode::Inode,
    superblock::Superblock,
};

/// ext2 镜像检查会话
///
/// 拥有字节源、superblock 和块组描述符表。所有读取按固定顺序进行：
/// superblock → 描述符表 → 每个块组的块位图和 inode 位图 → 根 inode → 根目录项。
///
/// # 示例
///
/// ```rust,ignore
/// use ext2_inspect::{Ext2Inspector, FileDevice, InspectConfig};
///
/// let device = FileDevice::open("/tmp/disk.img")?;
/// let mut inspector = Ext2Inspector::open(device, InspectConfig::default())?;
/// let report = inspector.report()?;
/// print!("{report}");
/// ```
pub struct Ext2Inspector<D: BlockDevice> {
    bdev: BlockDev<D>,
    sb: Superblock,
    groups: Vec<BlockGroup>,
}

impl<D: BlockDevice> Ext2Inspector<D> {
    /// 打开镜像：读取 superblock 和块组描述符表
    ///
    /// # 错误
    ///
    /// - `ErrorKind::TruncatedRead` - 镜像短于 superblock 或描述符表
    /// - `ErrorKind::Corrupted` - superblock 字段不合法
    pub fn open(device: D, config: InspectConfig) -> Result<Self> {
        let mut bdev = BlockDev::new_with_cache(device, config.bcache_size as usize)?;

        let sb = Superblock::load(&mut bdev)?;
        if config.strict {
            sb.check()?;
        }
        bdev.set_block_size(sb.block_size())?;

        log::info!(
            "[inspect] {} byte blocks, {} blocks, {} inodes, {} groups",
            sb.block_size(),
            sb.blocks_count(),
            sb.inodes_count(),
            sb.block_group_count()
        );

        let groups = read_group_desc_table(&mut bdev, &sb)?;

        Ok(Self { bdev, sb, groups })
    }

    /// 获取 superblock 引用
    pub fn superblock(&self) -> &Superblock {
        &self.sb
    }

    /// 获取块组描述符表
    pub fn groups(&self) -> &[BlockGroup] {
        &self.groups
    }

    /// 获取块设备引用
    pub fn block_device(&self) -> &BlockDev<D> {
        &self.bdev
    }

    /// 扫描一个块组的两个位图
    ///
    /// 区间使用全局编号，不是组内位序号：
    /// - 块位图的第 0 位对应 `first_data_block + group_num * blocks_per_group`，
    ///   上界截到 `min(该值 + blocks_per_group, blocks_count) - 1`
    /// - inode 位图的第 0 位对应 `group_num * inodes_per_group + 1`，
    ///   上界截到 `min((group_num + 1) * inodes_per_group, inodes_count)`
    ///
    /// 1 KiB 块的镜像里第 0 组的块编号从 1 开始，超出上界的填充位不计入空闲区间。
    pub fn inspect_group(&mut self, group_num: u32) -> Result<GroupReport> {
        let group = self.groups.get(group_num as usize).ok_or_else(|| {
            Error::corrupted(format!(
                "group {} out of range (0..{})",
                group_num,
                self.groups.len()
            ))
        })?;

        let free_blocks = read_free_runs(
            &mut self.bdev,
            group.block_bitmap(),
            group.first_block(),
            group.last_block(),
        )?;
        let free_inodes = read_free_runs(
            &mut self.bdev,
            group.inode_bitmap(),
            group.first_inode(),
            group.last_inode(),
        )?;

        let report = GroupReport::new(group, free_blocks, free_inodes);
        if !report.counts_match() {
            log::warn!(
                "[inspect] group {}: descriptor says {} free blocks / {} free inodes, bitmaps say {} / {}",
                group_num,
                report.free_blocks_count,
                report.free_inodes_count,
                report.bitmap_free_blocks(),
                report.bitmap_free_inodes()
            );
        }
        Ok(report)
    }

    /// 读取根目录 inode
    pub fn root_inode(&mut self) -> Result<Inode> {
        Inode::load_root(&mut self.bdev, &self.sb, &self.groups)
    }

    /// 读取目录 inode 第一个数据块中的目录项
    pub fn dir_entries(&mut self, inode: &Inode) -> Result<Vec<DirEntry>> {
        read_dir(&mut self.bdev, &self.sb, inode)
    }

    /// 按固定顺序完成全部读取并生成报告
    ///
    /// 任何一步失败都直接返回错误，不产生部分报告。
    pub fn report(&mut self) -> Result<FsReport> {
        let general = GeneralReport::from_superblock(&self.sb);

        let mut groups = Vec::new();
        groups.try_reserve_exact(self.groups.len())?;
        for group_num in 0..self.groups.len() as u32 {
            groups.push(self.inspect_group(group_num)?);
        }

        let root = self.root_inode()?;
        let entries = self.dir_entries(&root)?;
        log::debug!("[inspect] root directory has {} entries", entries.len());

        Ok(FsReport {
            general,
            groups,
            root: RootInodeReport::from_inode(&root),
            entries,
        })
    }
}

impl<D: BlockDevice> Drop for Ext2Inspector<D> {
    fn drop(&mut self) {
        log::debug!(
            "[inspect] {} reads, {} bytes read",
            self.bdev.read_count(),
            self.bdev.bytes_read()
        );
        if let Some(stats) = self.bdev.cache_stats() {
            log::debug!(
                "[inspect] block cache: {} hits, {} misses, {} evictions ({:.1}% hit rate)",
                stats.hits,
                stats.misses,
                stats.evictions,
                stats.hit_rate() * 100.0
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::MemDevice;
    use crate::consts::*;
    use crate::error::ErrorKind;
    use crate::fs::InodeType;
    use byteorder::{ByteOrder, LittleEndian};

    const BS: usize = 1024;

    /// 64 块、32 个 inode 的单块组镜像
    ///
    /// 块 1 superblock，块 2 描述符表，块 3/4 位图，块 5..=8 inode 表，块 9 根目录
    fn build_image() -> Vec<u8> {
        let mut image = vec![0u8; 64 * BS];

        let sb = &mut image[EXT2_SUPERBLOCK_OFFSET as usize..];
        LittleEndian::write_u32(&mut sb[0..], 32);
        LittleEndian::write_u32(&mut sb[4..], 64);
        LittleEndian::write_u32(&mut sb[12..], 54);
        LittleEndian::write_u32(&mut sb[16..], 21);
        LittleEndian::write_u32(&mut sb[20..], 1);
        LittleEndian::write_u32(&mut sb[32..], 8192);
        LittleEndian::write_u32(&mut sb[40..], 32);
        LittleEndian::write_u16(&mut sb[56..], EXT2_SUPERBLOCK_MAGIC);
        LittleEndian::write_u32(&mut sb[76..], 1);
        LittleEndian::write_u16(&mut sb[88..], 128);
        sb[120..127].copy_from_slice(b"testvol");

        let gd = &mut image[2 * BS..];
        LittleEndian::write_u32(&mut gd[0..], 3);
        LittleEndian::write_u32(&mut gd[4..], 4);
        LittleEndian::write_u32(&mut gd[8..], 5);
        LittleEndian::write_u16(&mut gd[12..], 54);
        LittleEndian::write_u16(&mut gd[14..], 21);
        LittleEndian::write_u16(&mut gd[16..], 2);

        // 块 1..=9 已使用（位 0..=8），位图其余位保持 0
        image[3 * BS] = 0xFF;
        image[3 * BS + 1] = 0x01;
        // inode 1..=11 已使用
        image[4 * BS] = 0xFF;
        image[4 * BS + 1] = 0x07;

        let root = 5 * BS + 128;
        LittleEndian::write_u16(&mut image[root..], EXT2_INODE_MODE_DIRECTORY | 0o755);
        LittleEndian::write_u32(&mut image[root + 4..], BS as u32);
        LittleEndian::write_u16(&mut image[root + 26..], 3);
        LittleEndian::write_u32(&mut image[root + 40..], 9);

        let dir = &mut image[9 * BS..];
        let entries: [(u32, u16, &[u8]); 3] = [
            (2, 12, b"."),
            (2, 12, b".."),
            (11, 1000, b"lost+found"),
        ];
        let mut off = 0;
        for (ino, rec_len, name) in entries {
            LittleEndian::write_u32(&mut dir[off..], ino);
            LittleEndian::write_u16(&mut dir[off + 4..], rec_len);
            dir[off + 6] = name.len() as u8;
            dir[off + 7] = EXT2_DE_DIR;
            dir[off + 8..off + 8 + name.len()].copy_from_slice(name);
            off += rec_len as usize;
        }

        image
    }

    fn open(image: Vec<u8>) -> Result<Ext2Inspector<MemDevice>> {
        Ext2Inspector::open(MemDevice::new(image), InspectConfig::default())
    }

    #[test]
    fn test_full_report() {
        let mut inspector = open(build_image()).unwrap();
        assert_eq!(inspector.groups().len(), 1);
        assert_eq!(inspector.block_device().block_size(), 1024);

        let report = inspector.report().unwrap();
        assert_eq!(report.general.volume_name, "testvol");
        assert_eq!(report.general.group_count, 1);
        assert_eq!(report.general.inode_blocks_per_group, 4);

        let group = &report.groups[0];
        assert_eq!((group.first_block, group.last_block), (1, 63));
        assert_eq!((group.first_inode, group.last_inode), (1, 32));
        assert!(group.counts_match());

        assert_eq!(report.root.first_block, 9);
        assert_eq!(report.root.inode_type, InodeType::Directory);

        let names: Vec<String> = report
            .entries
            .iter()
            .map(|e| e.name_lossy().into_owned())
            .collect();
        assert_eq!(names, [".", "..", "lost+found"]);

        let text = report.to_string();
        assert!(text.starts_with("--General File System Information--\n"));
        assert!(text.contains("Block Size in Bytes : 1024\n"));
        assert!(text.contains("Disk Size in Bytes : 65536\n"));
        assert!(text.contains("Number of Groups : 1\n"));
        assert!(text.contains("Free Block IDs : 10-63\n"));
        assert!(text.contains("Free Inode IDs : 12-32\n"));
        assert!(text.contains("--Root Inode--\n"));
        assert!(text.contains("--Root Directory Entries--\n"));
        assert!(text.contains("Inode: 11\nEntry Length : 1000\nName Length : 10\nFile Type : 2\nName : lost+found\n"));
    }

    #[test]
    fn test_free_count_mismatch_is_reported_not_fatal() {
        let mut image = build_image();
        LittleEndian::write_u16(&mut image[2 * BS + 12..], 50);

        let report = open(image).unwrap().report().unwrap();
        assert!(!report.groups[0].counts_match());
        assert!(report
            .to_string()
            .contains("Number of Free Blocks : 50 (bitmap says 54)\n"));
    }

    #[test]
    fn test_repeated_group_scan_hits_cache() {
        let mut inspector = open(build_image()).unwrap();
        let first = inspector.inspect_group(0).unwrap();
        let bytes_after_first = inspector.block_device().bytes_read();

        let second = inspector.inspect_group(0).unwrap();
        assert_eq!(first, second);

        // 两个位图块第二次都来自缓存
        let stats = inspector.block_device().cache_stats().unwrap();
        assert_eq!(stats.hits, 2);
        assert_eq!(stats.misses, 2);
        assert_eq!(inspector.block_device().bytes_read(), bytes_after_first);
    }

    #[test]
    fn test_cache_disabled() {
        let config = InspectConfig {
            bcache_size: 0,
            ..Default::default()
        };
        let mut inspector = Ext2Inspector::open(MemDevice::new(build_image()), config).unwrap();
        assert!(!inspector.block_device().has_cache());
        assert!(inspector.report().is_ok());
    }

    #[test]
    fn test_image_shorter_than_superblock() {
        let mut image = build_image();
        image.truncate(1500);
        let err = open(image).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::TruncatedRead);

        let err = open(vec![0u8; 500]).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::TruncatedRead);
    }

    #[test]
    fn test_bad_magic_strict_and_lenient() {
        let mut image = build_image();
        LittleEndian::write_u16(&mut image[1024 + 56..], 0x1234);

        let err = open(image.clone()).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::Corrupted);

        let config = InspectConfig {
            strict: false,
            ..Default::default()
        };
        let mut inspector = Ext2Inspector::open(MemDevice::new(image), config).unwrap();
        assert!(inspector.report().is_ok());
    }

    #[test]
    fn test_corrupt_directory_fails_whole_report() {
        let mut image = build_image();
        LittleEndian::write_u16(&mut image[9 * BS + 12 + 4..], 0);

        let err = open(image).unwrap().report().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Corrupted);
    }

    #[test]
    fn test_truncated_bitmap_fails_whole_report() {
        let mut image = build_image();
        image.truncate(4 * BS + 10);

        let err = open(image).unwrap().report().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TruncatedRead);
    }

    #[test]
    fn test_group_out_of_range() {
        let mut inspector = open(build_image()).unwrap();
        let err = inspector.inspect_group(1).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Corrupted);
    }
}
