//! 检查会话
//!
//! 这个模块把各个解码步骤串成一次完整的镜像检查，并生成报告。

mod inspector;
mod report;
mod types;

pub use inspector::Ext2Inspector;
pub use report::{FsReport, GeneralReport, GroupReport, RootInodeReport};
pub use types::{InodeType, InspectConfig};
