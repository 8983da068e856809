//! 空闲区间提取
//!
//! 把一个块大小的分配位图转换为升序排列的极大空闲闭区间。
//!
//! ## 状态机
//!
//! 扫描器只有两个状态：
//!
//! ```text
//!            bit=0 / 记下起点
//!   Outside ───────────────────▶ InRun
//!      ▲                           │
//!      └───────────────────────────┘
//!            bit=1 / 以前一位收尾
//! ```
//!
//! 位流耗尽时如果仍在 InRun，用调用方给出的上界收尾。
//! 编号超过上界的位（最后一个块组位图末尾的填充位）不参与输出。

use super::ops::test_bit;
use crate::{
    block::{BlockDev, BlockDevice},
    error::Result,
};
use core::fmt;

/// 空闲闭区间 [start, end]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitRun {
    /// 第一个空闲编号
    pub start: u64,
    /// 最后一个空闲编号（包含）
    pub end: u64,
}

// 闭区间至少含一个编号，没有空区间
#[allow(clippy::len_without_is_empty)]
impl BitRun {
    /// 区间包含的编号个数
    pub fn len(&self) -> u64 {
        self.end - self.start + 1
    }
}

impl fmt::Display for BitRun {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Outside,
    InRun { start: u64 },
}

/// 空闲区间扫描器
///
/// 按位序喂入位值，`finish` 返回所有极大空闲区间。
#[derive(Debug, Clone)]
pub struct RunScanner {
    state: ScanState,
    first_id: u64,
    last_id: u64,
    /// 已越过上界，后续位全部忽略
    exhausted: bool,
    runs: Vec<BitRun>,
}

impl RunScanner {
    /// 创建扫描器
    ///
    /// # 参数
    ///
    /// * `first_id` - 第 0 位对应的编号（块位图通常为块组首块号，inode 位图从 1 开始）
    /// * `last_id` - 本组最后一个有效编号
    pub fn new(first_id: u64, last_id: u64) -> Self {
        Self {
            state: ScanState::Outside,
            first_id,
            last_id,
            exhausted: false,
            runs: Vec::new(),
        }
    }

    /// 喂入第 `bit_index` 位
    ///
    /// 位必须按升序连续喂入。
    pub fn push(&mut self, bit_index: u64, used: bool) {
        if self.exhausted {
            return;
        }

        let id = self.first_id + bit_index;
        if id > self.last_id {
            self.exhausted = true;
            return;
        }

        match (self.state, used) {
            (ScanState::Outside, false) => {
                self.state = ScanState::InRun { start: id };
            }
            (ScanState::InRun { start }, true) => {
                self.runs.push(BitRun { start, end: id - 1 });
                self.state = ScanState::Outside;
            }
            _ => {}
        }
    }

    /// 结束扫描，返回全部空闲区间
    pub fn finish(mut self) -> Vec<BitRun> {
        if let ScanState::InRun { start } = self.state {
            self.runs.push(BitRun {
                start,
                end: self.last_id,
            });
        }
        self.runs
    }
}

/// 提取位图中的空闲区间
///
/// 扫描 `bitmap.len() * 8` 位，字节内最低位优先。
///
/// # 参数
///
/// * `bitmap` - 位图数据
/// * `first_id` - 第 0 位对应的编号
/// * `last_id` - 最后一个有效编号，末尾未闭合的区间以它收尾
pub fn free_runs(bitmap: &[u8], first_id: u64, last_id: u64) -> Vec<BitRun> {
    let mut scanner = RunScanner::new(first_id, last_id);
    let total_bits = bitmap.len() as u64 * 8;

    for bit in 0..total_bits {
        scanner.push(bit, test_bit(bitmap, bit as u32));
    }

    scanner.finish()
}

/// 把区间格式化为 `"a-b, c, d-e"`
pub fn format_runs(runs: &[BitRun]) -> String {
    runs.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// 区间内编号总数
pub fn count_free(runs: &[BitRun]) -> u64 {
    runs.iter().map(BitRun::len).sum()
}

/// 从设备读取一个位图块并提取空闲区间
///
/// # 参数
///
/// * `bdev` - 块设备
/// * `bitmap_block` - 位图所在块号
/// * `first_id` - 第 0 位对应的编号
/// * `last_id` - 最后一个有效编号
pub fn read_free_runs<D: BlockDevice>(
    bdev: &mut BlockDev<D>,
    bitmap_block: u64,
    first_id: u64,
    last_id: u64,
) -> Result<Vec<BitRun>> {
    log::debug!(
        "[bitmap] scanning block {} for ids {}..={}",
        bitmap_block,
        first_id,
        last_id
    );
    let bitmap = bdev.read_block(bitmap_block)?;
    Ok(free_runs(&bitmap, first_id, last_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::MemDevice;
    use crate::error::ErrorKind;
    use proptest::prelude::*;

    fn bitmap_with_free(bytes: usize, free: &[u64]) -> Vec<u8> {
        let mut bitmap = vec![0xFFu8; bytes];
        for &bit in free {
            bitmap[(bit / 8) as usize] &= !(1 << (bit % 8));
        }
        bitmap
    }

    #[test]
    fn test_single_free_bit_has_no_separator() {
        let bitmap = bitmap_with_free(128, &[37]);
        assert_eq!(format_runs(&free_runs(&bitmap, 0, 1023)), "37");
        assert_eq!(format_runs(&free_runs(&bitmap, 1, 1024)), "38");
    }

    #[test]
    fn test_all_free_is_one_run() {
        let bitmap = vec![0u8; 128];
        assert_eq!(format_runs(&free_runs(&bitmap, 0, 1023)), "0-1023");
        assert_eq!(format_runs(&free_runs(&bitmap, 1, 1024)), "1-1024");
    }

    #[test]
    fn test_all_used_is_empty() {
        let bitmap = vec![0xFFu8; 128];
        assert!(free_runs(&bitmap, 0, 1023).is_empty());
        assert_eq!(format_runs(&free_runs(&bitmap, 0, 1023)), "");
    }

    #[test]
    fn test_lsb_first_order() {
        // 0b1111_0001：位 1..=3 空闲
        let bitmap = [0b1111_0001u8];
        assert_eq!(
            free_runs(&bitmap, 0, 7),
            vec![BitRun { start: 1, end: 3 }]
        );
    }

    #[test]
    fn test_several_runs_comma_separated() {
        let bitmap = bitmap_with_free(4, &[0, 1, 2, 5, 9, 10, 31]);
        assert_eq!(format_runs(&free_runs(&bitmap, 0, 31)), "0-2, 5, 9-10, 31");
    }

    #[test]
    fn test_first_id_offsets_numbering() {
        let bitmap = bitmap_with_free(4, &[3, 4]);
        assert_eq!(format_runs(&free_runs(&bitmap, 8193, 8224)), "8196-8197");
    }

    #[test]
    fn test_trailing_bits_past_bound_are_ignored() {
        // 位图 32 位，但组内只有 20 个有效编号；位 20 之后的零位是填充
        let bitmap = bitmap_with_free(4, &[18, 19, 20, 21, 25]);
        assert_eq!(format_runs(&free_runs(&bitmap, 0, 19)), "18-19");
    }

    #[test]
    fn test_open_run_closes_at_bound() {
        // 位图只有 16 位，最后的空闲区间一直延续到扫描结束
        let bitmap = bitmap_with_free(2, &[14, 15]);
        assert_eq!(
            free_runs(&bitmap, 0, 40),
            vec![BitRun { start: 14, end: 40 }]
        );
    }

    #[test]
    fn test_empty_range() {
        let bitmap = vec![0u8; 4];
        assert!(free_runs(&bitmap, 10, 9).is_empty());
    }

    #[test]
    fn test_count_free() {
        let runs = vec![BitRun { start: 1, end: 3 }, BitRun { start: 7, end: 7 }];
        assert_eq!(count_free(&runs), 4);
        assert_eq!(runs[0].len(), 3);
    }

    #[test]
    fn test_read_free_runs_from_device() {
        let mut image = vec![0xFFu8; 3 * 1024];
        image[2048] = 0b1111_1100;
        let mut bdev = BlockDev::new(MemDevice::new(image)).unwrap();
        let runs = read_free_runs(&mut bdev, 2, 1, 8192).unwrap();
        assert_eq!(format_runs(&runs), "1-2");
    }

    #[test]
    fn test_read_free_runs_short_block() {
        let image = vec![0u8; 2 * 1024 + 100];
        let mut bdev = BlockDev::new(MemDevice::new(image)).unwrap();
        let err = read_free_runs(&mut bdev, 2, 0, 8191).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TruncatedRead);
    }

    /// 由严格递增的点生成互不相邻的区间 [p0, p1-1], [p2, p3-1], ...
    fn ranges_from_points(points: &[u64]) -> Vec<(u64, u64)> {
        points
            .chunks_exact(2)
            .map(|pair| (pair[0], pair[1] - 1))
            .collect()
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(128))]

        #[test]
        fn zeroed_ranges_round_trip(
            points in proptest::collection::btree_set(0u64..=256, 0..24),
            first_id in 0u64..10_000,
        ) {
            let points: Vec<u64> = points.into_iter().collect();
            let ranges = ranges_from_points(&points);

            let mut bitmap = vec![0xFFu8; 32];
            for &(start, end) in &ranges {
                for bit in start..=end {
                    bitmap[(bit / 8) as usize] &= !(1 << (bit % 8));
                }
            }

            let runs = free_runs(&bitmap, first_id, first_id + 255);
            let expected: Vec<BitRun> = ranges
                .iter()
                .map(|&(start, end)| BitRun { start: start + first_id, end: end + first_id })
                .collect();
            prop_assert_eq!(runs, expected);
        }
    }
}
