//! 块设备核心类型

use crate::{
    cache::{BlockCache, CacheStats},
    consts::EXT2_MIN_BLOCK_SIZE,
    error::{Error, ErrorKind, Result},
};

/// 只读的随机访问字节源
///
/// 实现此 trait 以提供镜像数据。字节源持有一个读游标：
/// `seek` 把游标移到绝对偏移，`read` 从游标处读取并推进游标。
///
/// # 示例
///
/// ```rust,ignore
/// use ext2_inspect::{BlockDevice, Result};
///
/// struct MyDevice {
///     // ...
/// }
///
/// impl BlockDevice for MyDevice {
///     fn size(&self) -> u64 {
///         1 << 20
///     }
///
///     fn seek(&mut self, offset: u64) -> Result<()> {
///         // 移动读游标
///         Ok(())
///     }
///
///     fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
///         // 实现读取，返回实际读取字节数，末尾返回 0
///         Ok(0)
///     }
/// }
/// ```
pub trait BlockDevice {
    /// 字节源总大小
    fn size(&self) -> u64;

    /// 移动读游标到绝对偏移
    ///
    /// 偏移超过 `size()` 时返回 [`ErrorKind::Seek`]
    fn seek(&mut self, offset: u64) -> Result<()>;

    /// 从游标处读取
    ///
    /// # 返回
    ///
    /// 成功返回实际读取的字节数，可能少于 `buf.len()`；到达末尾返回 0
    fn read(&mut self, buf: &mut [u8]) -> Result<usize>;

    /// 打开设备
    ///
    /// 在开始使用设备前调用，默认实现什么都不做。
    fn open(&mut self) -> Result<()> {
        Ok(())
    }

    /// 关闭设备
    ///
    /// 在停止使用设备后调用，用于清理设备资源。默认实现什么都不做。
    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

/// 块设备包装器
///
/// 为分析过程提供按字节和按块的访问，包含统计信息和可选的块缓存。
///
/// 块大小在读取 superblock 之前为 1024，解码后由调用方通过
/// [`BlockDev::set_block_size`] 更新为真实值。
///
/// `BlockDev` 被丢弃时调用设备的 `close()`，成功和失败路径都会释放字节源。
pub struct BlockDev<D: BlockDevice> {
    /// 底层设备
    device: D,
    /// 当前块大小（字节）
    block_size: u32,
    /// 读取次数
    read_count: u64,
    /// 读取的字节总数
    bytes_read: u64,
    /// 块缓存容量（块数），0 表示不缓存
    cache_blocks: usize,
    /// 块缓存（可选）
    pub(super) bcache: Option<BlockCache>,
}

impl<D: BlockDevice> BlockDev<D> {
    /// 创建新的块设备包装器（无缓存）
    pub fn new(device: D) -> Result<Self> {
        Self::new_with_cache(device, 0)
    }

    /// 创建带缓存的块设备包装器
    ///
    /// # 参数
    ///
    /// * `device` - 底层字节源
    /// * `cache_blocks` - 缓存块数量，0 表示不启用缓存
    pub fn new_with_cache(mut device: D, cache_blocks: usize) -> Result<Self> {
        device.open()?;
        let block_size = EXT2_MIN_BLOCK_SIZE;

        Ok(Self {
            device,
            block_size,
            read_count: 0,
            bytes_read: 0,
            cache_blocks,
            bcache: BlockCache::new(cache_blocks, block_size as usize),
        })
    }

    /// 获取底层设备的引用
    pub fn device(&self) -> &D {
        &self.device
    }

    /// 获取底层设备的可变引用
    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    /// 获取当前块大小
    pub fn block_size(&self) -> u32 {
        self.block_size
    }

    /// 设置块大小
    ///
    /// 块大小变化时清空缓存，旧块号在新块大小下没有意义。
    pub fn set_block_size(&mut self, block_size: u32) -> Result<()> {
        if block_size == 0 || !block_size.is_power_of_two() {
            return Err(Error::corrupted(format!(
                "block size {block_size} is not a power of two"
            )));
        }
        if block_size != self.block_size {
            self.block_size = block_size;
            self.bcache = BlockCache::new(self.cache_blocks, block_size as usize);
        }
        Ok(())
    }

    /// 获取字节源总大小
    pub fn size(&self) -> u64 {
        self.device.size()
    }

    /// 获取读取次数（包括缓存命中）
    pub fn read_count(&self) -> u64 {
        self.read_count
    }

    /// 获取从设备读取的字节总数
    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    /// 获取缓存统计信息
    ///
    /// 如果启用了缓存，返回 Some(CacheStats)，否则返回 None
    pub fn cache_stats(&self) -> Option<CacheStats> {
        self.bcache.as_ref().map(|cache| cache.stats())
    }

    /// 检查是否启用了缓存
    pub fn has_cache(&self) -> bool {
        self.bcache.is_some()
    }

    /// 将块号转换为字节偏移
    pub(super) fn block_offset(&self, lba: u64) -> Result<u64> {
        lba.checked_mul(self.block_size as u64).ok_or_else(|| {
            Error::new(
                ErrorKind::Seek,
                format!("block {lba} overflows the byte address space"),
            )
        })
    }

    pub(super) fn inc_read_count(&mut self) {
        self.read_count += 1;
    }

    pub(super) fn add_bytes_read(&mut self, n: usize) {
        self.bytes_read += n as u64;
    }
}

impl<D: BlockDevice> Drop for BlockDev<D> {
    fn drop(&mut self) {
        if let Err(err) = self.device.close() {
            log::warn!("[BlockDev] close failed: {}", err);
        }
    }
}
