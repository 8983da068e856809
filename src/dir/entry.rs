//! 目录项

use crate::{consts::*, fs::InodeType, types::ext2_dir_entry};
use std::borrow::Cow;

/// 目录项包装器
///
/// 保存头部字段和原始文件名字节
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    /// Inode 编号（0 表示未使用的目录项）
    pub inode: u32,
    /// 记录长度
    pub rec_len: u16,
    /// 名称长度
    pub name_len: u8,
    /// 文件类型代码
    pub file_type: u8,
    /// 文件名原始字节
    pub name: Vec<u8>,
}

impl DirEntry {
    pub(super) fn from_header(header: ext2_dir_entry, name: Vec<u8>) -> Self {
        Self {
            inode: header.inode,
            rec_len: header.rec_len,
            name_len: header.name_len,
            file_type: header.file_type,
            name,
        }
    }

    /// 文件名（非 UTF-8 字节以替换字符显示）
    pub fn name_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.name)
    }

    /// 文件类型
    pub fn inode_type(&self) -> InodeType {
        InodeType::from_de_type(self.file_type)
    }

    /// 检查是否是目录
    pub fn is_dir(&self) -> bool {
        self.file_type == EXT2_DE_DIR
    }

    /// 检查是否是普通文件
    pub fn is_file(&self) -> bool {
        self.file_type == EXT2_DE_REG_FILE
    }

    /// 是否是 "." 或 ".."
    pub fn is_dot(&self) -> bool {
        self.name == b"." || self.name == b".."
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_accessors() {
        let entry = DirEntry::from_header(
            ext2_dir_entry {
                inode: 11,
                rec_len: 20,
                name_len: 10,
                file_type: EXT2_DE_DIR,
            },
            b"lost+found".to_vec(),
        );
        assert_eq!(entry.name_lossy(), "lost+found");
        assert_eq!(entry.inode_type(), InodeType::Directory);
        assert!(entry.is_dir());
        assert!(!entry.is_dot());
    }

    #[test]
    fn test_non_utf8_name() {
        let entry = DirEntry {
            inode: 12,
            rec_len: 12,
            name_len: 2,
            file_type: 42,
            name: vec![b'a', 0xFF],
        };
        assert_eq!(entry.name_lossy(), "a\u{FFFD}");
        assert_eq!(entry.inode_type(), InodeType::Unknown);
    }
}
