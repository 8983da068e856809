//! 内存中的字节源

use super::BlockDevice;
use crate::error::{Error, ErrorKind, Result};

/// 以 `Vec<u8>` 保存的镜像
///
/// 用于测试和已经整体读入内存的镜像。
#[derive(Debug, Clone, Default)]
pub struct MemDevice {
    data: Vec<u8>,
    pos: usize,
}

impl MemDevice {
    /// 从镜像字节创建
    pub fn new(data: Vec<u8>) -> Self {
        Self { data, pos: 0 }
    }

    /// 镜像字节
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

impl BlockDevice for MemDevice {
    fn size(&self) -> u64 {
        self.data.len() as u64
    }

    fn seek(&mut self, offset: u64) -> Result<()> {
        if offset > self.size() {
            return Err(Error::new(
                ErrorKind::Seek,
                format!("offset {offset} is past the end of a {} byte image", self.data.len()),
            ));
        }
        self.pos = offset as usize;
        Ok(())
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let remaining = &self.data[self.pos..];
        let n = remaining.len().min(buf.len());
        buf[..n].copy_from_slice(&remaining[..n]);
        self.pos += n;
        Ok(n)
    }
}
