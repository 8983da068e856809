//! 块 I/O 操作实现
//!
//! 所有读取都先以绝对偏移定位游标，再读取；短读是致命错误。

use super::{BlockDev, BlockDevice};
use crate::error::{zeroed_buffer, Error, Result};

impl<D: BlockDevice> BlockDev<D> {
    /// 从绝对偏移精确读取 `buf.len()` 字节
    ///
    /// # 错误
    ///
    /// - 可读字节不足（包括偏移已在字节源末尾之外）：[`ErrorKind::TruncatedRead`](crate::ErrorKind::TruncatedRead)
    /// - 设备定位失败：[`ErrorKind::Seek`](crate::ErrorKind::Seek)
    pub fn read_exact_at(&mut self, offset: u64, buf: &mut [u8]) -> Result<()> {
        if buf.is_empty() {
            return Ok(());
        }

        self.inc_read_count();
        if offset >= self.size() {
            return Err(Error::truncated(offset, buf.len(), 0));
        }
        self.device_mut().seek(offset)?;

        let mut filled = 0;
        while filled < buf.len() {
            let n = self.device_mut().read(&mut buf[filled..])?;
            if n == 0 {
                return Err(Error::truncated(offset, buf.len(), filled));
            }
            filled += n;
        }
        self.add_bytes_read(filled);

        Ok(())
    }

    /// 从绝对偏移读取 `len` 字节到新缓冲区
    pub fn read_bytes(&mut self, offset: u64, len: usize) -> Result<Vec<u8>> {
        let mut buf = zeroed_buffer(len)?;
        self.read_exact_at(offset, &mut buf)?;
        Ok(buf)
    }

    /// 读取单个逻辑块
    ///
    /// 如果启用了缓存，优先从缓存读取；缓存未命中则从设备读取并填充缓存。
    ///
    /// # 参数
    ///
    /// * `lba` - 块号
    ///
    /// # 返回
    ///
    /// 成功返回长度为 block_size 的块数据
    pub fn read_block(&mut self, lba: u64) -> Result<Vec<u8>> {
        if let Some(cache) = &mut self.bcache {
            if let Some(data) = cache.get(lba) {
                log::trace!("[BlockDev] block {} served from cache", lba);
                let data = data.to_vec();
                self.inc_read_count();
                return Ok(data);
            }
        }

        let offset = self.block_offset(lba)?;
        let data = self.read_bytes(offset, self.block_size() as usize)?;

        if let Some(cache) = &mut self.bcache {
            cache.insert(lba, data.clone());
        }

        Ok(data)
    }
}
