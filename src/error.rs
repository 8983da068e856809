//! 错误类型定义
//!
//! 提供镜像分析过程中的错误类型。所有错误都是终止性的：
//! 调用方不做重试，也不输出部分报告。

use std::collections::TryReserveError;
use std::fmt;
use std::io;

/// 分析错误
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    kind: ErrorKind,
    message: String,
}

/// 错误类别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// 命令行参数个数错误
    Invocation,
    /// 镜像文件不存在或不可读
    Open,
    /// 内存分配失败
    Allocation,
    /// 可读字节数少于请求的字节数
    TruncatedRead,
    /// 请求的偏移不可达
    Seek,
    /// 解码出的字段违反结构不变量
    Corrupted,
    /// 其他 I/O 错误
    Io,
}

impl Error {
    /// 创建新错误
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// 短读错误
    pub fn truncated(offset: u64, wanted: usize, got: usize) -> Self {
        Self::new(
            ErrorKind::TruncatedRead,
            format!("wanted {wanted} bytes at offset {offset}, got {got}"),
        )
    }

    /// 结构损坏错误
    pub fn corrupted(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Corrupted, message)
    }

    /// 获取错误类型
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// 获取错误消息
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Invocation => "invocation error",
            ErrorKind::Open => "open error",
            ErrorKind::Allocation => "allocation error",
            ErrorKind::TruncatedRead => "truncated read",
            ErrorKind::Seek => "seek error",
            ErrorKind::Corrupted => "corrupt structure",
            ErrorKind::Io => "I/O error",
        };
        f.write_str(name)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for Error {}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::UnexpectedEof => Error::new(ErrorKind::TruncatedRead, err.to_string()),
            _ => Error::new(ErrorKind::Io, err.to_string()),
        }
    }
}

impl From<TryReserveError> for Error {
    fn from(err: TryReserveError) -> Self {
        Error::new(ErrorKind::Allocation, err.to_string())
    }
}

/// 分配一个长度为 `len` 的零填充缓冲区
///
/// 长度来自磁盘字段时使用此函数，分配失败映射为 [`ErrorKind::Allocation`]。
pub fn zeroed_buffer(len: usize) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)?;
    buf.resize(len, 0);
    Ok(buf)
}

/// Result 类型别名
pub type Result<T> = core::result::Result<T, Error>;
