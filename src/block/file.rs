//! 基于镜像文件的字节源

use super::BlockDevice;
use crate::error::{Error, ErrorKind, Result};
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

/// 以只读方式打开的磁盘镜像文件
pub struct FileDevice {
    path: PathBuf,
    file: File,
    size: u64,
}

impl FileDevice {
    /// 打开镜像文件
    ///
    /// 文件不存在、不可读或不是普通文件时返回 [`ErrorKind::Open`]
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let open_err = |err: io::Error| {
            Error::new(
                ErrorKind::Open,
                format!("cannot open {}: {}", path.display(), err),
            )
        };

        let file = File::open(&path).map_err(open_err)?;
        let metadata = file.metadata().map_err(open_err)?;
        if !metadata.is_file() {
            return Err(Error::new(
                ErrorKind::Open,
                format!("{} is not a regular file", path.display()),
            ));
        }

        log::debug!("[FileDevice] opened {} ({} bytes)", path.display(), metadata.len());
        Ok(Self {
            path,
            file,
            size: metadata.len(),
        })
    }

    /// 镜像路径
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl BlockDevice for FileDevice {
    fn size(&self) -> u64 {
        self.size
    }

    fn seek(&mut self, offset: u64) -> Result<()> {
        if offset > self.size {
            return Err(Error::new(
                ErrorKind::Seek,
                format!("offset {offset} is past the end of {}", self.path.display()),
            ));
        }
        let pos = self
            .file
            .seek(SeekFrom::Start(offset))
            .map_err(|err| Error::new(ErrorKind::Seek, err.to_string()))?;
        if pos != offset {
            return Err(Error::new(
                ErrorKind::Seek,
                format!("seek to {offset} landed at {pos}"),
            ));
        }
        Ok(())
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        loop {
            match self.file.read(buf) {
                Ok(n) => return Ok(n),
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => return Err(err.into()),
            }
        }
    }

    fn close(&mut self) -> Result<()> {
        log::trace!("[FileDevice] closing {}", self.path.display());
        Ok(())
    }
}
