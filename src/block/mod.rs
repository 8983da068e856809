//! 块设备抽象
//!
//! 提供只读字节源接口和块级 I/O 操作。
//! block/device.rs 定义 `BlockDevice` trait 和 `BlockDev` 包装器（统计信息、块大小、缓存管理）
//!
//! block/io.rs 提供按绝对偏移的精确读取和按块读取，按块读取会先查询缓存
//! block/file.rs、block/mem.rs 是文件镜像和内存镜像两种字节源

mod device;
mod file;
mod io;
mod mem;

pub use device::{BlockDev, BlockDevice};
pub use file::FileDevice;
pub use mem::MemDevice;
