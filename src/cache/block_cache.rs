//! 只读块缓存实现（基于 lru crate）
//!
//! 分析过程只读不写，因此缓存中没有脏块，也不需要写回：
//! 满时直接驱逐最久未使用的块。

use core::num::NonZeroUsize;
use lru::LruCache;

/// 默认缓存块数量
pub const DEFAULT_CACHE_SIZE: usize = 16;

/// 缓存统计信息
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// 总访问次数
    pub total_accesses: u64,
    /// 缓存命中次数
    pub hits: u64,
    /// 缓存未命中次数
    pub misses: u64,
    /// 驱逐次数
    pub evictions: u64,
}

impl CacheStats {
    /// 计算命中率
    pub fn hit_rate(&self) -> f64 {
        if self.total_accesses == 0 {
            0.0
        } else {
            self.hits as f64 / self.total_accesses as f64
        }
    }
}

/// 块缓存
///
/// 以块号为键保存整块数据，`get` 会把命中的块移到最近使用端。
pub struct BlockCache {
    cache: LruCache<u64, Vec<u8>>,
    block_size: usize,
    stats: CacheStats,
}

impl BlockCache {
    /// 创建缓存
    ///
    /// `capacity` 为 0 时返回 None（不启用缓存）
    pub fn new(capacity: usize, block_size: usize) -> Option<Self> {
        let capacity = NonZeroUsize::new(capacity)?;
        Some(Self {
            cache: LruCache::new(capacity),
            block_size,
            stats: CacheStats::default(),
        })
    }

    /// 查找块
    pub fn get(&mut self, lba: u64) -> Option<&[u8]> {
        self.stats.total_accesses += 1;
        match self.cache.get(&lba) {
            Some(data) => {
                self.stats.hits += 1;
                Some(data.as_slice())
            }
            None => {
                self.stats.misses += 1;
                None
            }
        }
    }

    /// 插入块数据，满时驱逐最久未使用的块
    pub fn insert(&mut self, lba: u64, data: Vec<u8>) {
        debug_assert_eq!(data.len(), self.block_size);
        if let Some((evicted, _)) = self.cache.push(lba, data) {
            if evicted != lba {
                self.stats.evictions += 1;
                log::trace!("[CACHE] evicted block {}", evicted);
            }
        }
    }

    /// 缓存的块大小
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// 当前缓存的块数
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// 缓存是否为空
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// 缓存容量（块数）
    pub fn capacity(&self) -> usize {
        self.cache.cap().get()
    }

    /// 获取统计信息
    pub fn stats(&self) -> CacheStats {
        self.stats.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_capacity_disables_cache() {
        assert!(BlockCache::new(0, 1024).is_none());
    }

    #[test]
    fn test_hit_and_miss() {
        let mut cache = BlockCache::new(2, 4).unwrap();
        assert!(cache.get(1).is_none());
        cache.insert(1, vec![1, 2, 3, 4]);
        assert_eq!(cache.get(1), Some(&[1u8, 2, 3, 4][..]));

        let stats = cache.stats();
        assert_eq!(stats.total_accesses, 2);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert!((stats.hit_rate() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_lru_eviction() {
        let mut cache = BlockCache::new(2, 1).unwrap();
        cache.insert(1, vec![1]);
        cache.insert(2, vec![2]);
        // 访问 1，使 2 成为最久未使用
        assert!(cache.get(1).is_some());
        cache.insert(3, vec![3]);

        assert_eq!(cache.len(), 2);
        assert!(cache.get(2).is_none());
        assert!(cache.get(1).is_some());
        assert!(cache.get(3).is_some());
        assert_eq!(cache.stats().evictions, 1);
    }

    #[test]
    fn test_reinsert_same_block_is_not_eviction() {
        let mut cache = BlockCache::new(1, 1).unwrap();
        cache.insert(7, vec![1]);
        cache.insert(7, vec![2]);
        assert_eq!(cache.get(7), Some(&[2u8][..]));
        assert_eq!(cache.stats().evictions, 0);
    }
}
