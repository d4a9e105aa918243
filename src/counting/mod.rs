/// 过线计数核心 (Line-crossing counting core)
///
/// - zone:    中心点 + 参考线容差带判断
/// - counter: 按跟踪ID去重的计数状态机
/// - tally:   类别计数与最终报告
pub mod counter;
pub mod tally;
pub mod zone;

pub use counter::{CountEvent, LineCounter, SharedLineCounter};
pub use tally::{ClassTally, CountReport};
pub use zone::{centroid, CountingZone};
