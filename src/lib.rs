// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license
pub mod config; // 计数配置参数
pub mod counting; // 过线去重计数核心
pub mod detection; // 检测数据契约
pub mod error; // 错误类型
pub mod input; // 观测输入系统
pub mod pipeline; // 逐帧计数流水线
pub mod report; // 报告输出

pub use crate::config::{Args, CountingConfig};
pub use crate::counting::{
    centroid, ClassTally, CountEvent, CountReport, CountingZone, LineCounter, SharedLineCounter,
};
pub use crate::detection::{BBox, ClassNames, Detection, Frame, Point, StreamInfo, TrackId};
pub use crate::error::{ConfigError, DetectionError, ReportError, SourceError};
pub use crate::input::{ChannelSource, ObservationSource, ReplaySource};
pub use crate::pipeline::{CountingPipeline, PipelineStats, RunSummary, Termination};
pub use crate::report::{ConsoleSink, EventLog, JsonLinesSink, MultiSink, NullSink, ReportSink};
