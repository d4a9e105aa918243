//! 错误类型 (Error taxonomy)
//!
//! 所有错误都是局部的: 单个检测或单帧失败不会中断整个视频流。

use std::io;

use thiserror::Error;

use crate::detection::TrackId;

/// 单个检测框的错误 (仅影响该检测, 不影响其余帧)
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DetectionError {
    /// 跟踪器尚未确认ID
    #[error("detection has no confirmed track id")]
    MissingIdentifier,

    /// 坐标颠倒或非有限值
    #[error("malformed region ({x1}, {y1}, {x2}, {y2}) for track {track_id:?}")]
    MalformedRegion {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        track_id: Option<TrackId>,
    },
}

/// 观测源错误
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("I/O error while reading detections: {0}")]
    Io(#[from] io::Error),

    /// 单行无法解析, 跳过该帧继续
    #[error("malformed record on line {line}: {source}")]
    MalformedRecord {
        line: u64,
        #[source]
        source: serde_json::Error,
    },

    #[error("upstream source failed: {0}")]
    Upstream(String),
}

impl SourceError {
    /// 是否可跳过当前帧继续处理
    pub fn is_recoverable(&self) -> bool {
        matches!(self, SourceError::MalformedRecord { .. })
    }
}

/// 配置错误 (运行前报告)
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("frame_skip must be at least 1")]
    ZeroFrameSkip,

    #[error("line_ratio must be in (0, 1], got {0}")]
    LineRatioOutOfRange(f64),

    #[error("no line_position configured and frame height is unknown")]
    MissingFrameHeight,

    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to write config {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to serialize config: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("failed to read class names {path}: {source}")]
    ClassNames {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse class names {path}: {source}")]
    ClassNamesYaml {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
}

/// 报告输出错误
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("report I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error("report serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}
