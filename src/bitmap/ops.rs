//! Bitmap 单个位的测试
//!
//! ext2 位图中每一位对应一个块或 inode：0 表示空闲，1 表示已使用。
//! 字节内按最低有效位优先编号。

/// 测试位图中某一位是否被设置
///
/// # 参数
///
/// * `bitmap` - 位图数据
/// * `index` - 位索引（从 0 开始）
///
/// # 返回
///
/// 如果位被设置返回 true；索引超出位图时返回 false
pub fn test_bit(bitmap: &[u8], index: u32) -> bool {
    let byte_index = (index / 8) as usize;
    let bit_offset = (index % 8) as u8;

    if byte_index >= bitmap.len() {
        return false;
    }

    (bitmap[byte_index] & (1 << bit_offset)) != 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bit_order_lsb_first() {
        let bitmap = [0b0000_0101u8, 0b1000_0000];
        assert!(test_bit(&bitmap, 0));
        assert!(!test_bit(&bitmap, 1));
        assert!(test_bit(&bitmap, 2));
        assert!(test_bit(&bitmap, 15));
        assert!(!test_bit(&bitmap, 8));
        // 超出范围
        assert!(!test_bit(&bitmap, 16));
    }
}
