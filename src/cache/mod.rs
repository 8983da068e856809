//! 块缓存模块
//!
//! 镜像中的位图块和目录块按块号读取，这个模块为这些读取提供一个小的 LRU 缓存。
//!
//! # 主要组件
//!
//! - [`BlockCache`] - 块缓存管理器，使用 lru crate 提供 LRU 驱逐
//! - [`CacheStats`] - 缓存统计信息
//!
//! # 使用示例
//!
//! ```rust,ignore
//! use ext2_inspect::cache::{BlockCache, DEFAULT_CACHE_SIZE};
//!
//! let mut cache = BlockCache::new(DEFAULT_CACHE_SIZE, 4096).unwrap();
//! if cache.get(100).is_none() {
//!     let data = bdev.read_bytes(100 * 4096, 4096)?;
//!     cache.insert(100, data);
//! }
//! ```

mod block_cache;

pub use block_cache::{BlockCache, CacheStats, DEFAULT_CACHE_SIZE};
