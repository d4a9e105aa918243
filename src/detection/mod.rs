/// 检测数据 (Detection data)
///
/// 外部检测器/跟踪器的输出契约
/// - types:   检测框、单帧检测、视频流属性
/// - classes: 类别索引 → 名称
pub mod classes;
pub mod types;

pub use classes::ClassNames;
pub use types::{BBox, Detection, Frame, Point, StreamInfo, TrackId};
