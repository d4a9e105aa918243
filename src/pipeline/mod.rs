/// 计数流水线 (Counting pipeline)
///
/// 观测源 → 中心点 → 区域判断 → 去重计数 → 报告输出
/// 单线程逐帧处理, 一帧的全部检测处理完后才读取下一帧。
pub mod runner;

pub use runner::CountingPipeline;

use serde::Serialize;

use crate::counting::CountReport;

// ========== 运行统计 ==========

/// 运行统计 (被排除的帧与检测也在这里体现)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PipelineStats {
    /// 从观测源读取的帧数 (含无法解析的帧)
    pub frames_read: u64,
    /// 实际参与计数的帧数
    pub frames_processed: u64,
    /// 因 frame_skip 跳过的帧数
    pub frames_skipped: u64,
    /// 无法解析而丢弃的帧数
    pub bad_frames: u64,
    /// 已处理帧中的检测总数
    pub detections: u64,
    /// 没有跟踪ID的检测
    pub untracked: u64,
    /// 坐标非法的检测
    pub malformed: u64,
    /// 产生的计数事件
    pub events: u64,
}

/// 运行结束原因
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum Termination {
    /// 观测源正常结束
    Exhausted,
    /// 观测源出错, 已累计的计数即为最终结果
    SourceFailed(String),
}

/// 运行结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub report: CountReport,
    pub stats: PipelineStats,
    pub termination: Termination,
}
