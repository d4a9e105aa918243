//! 计数配置 - 命令行参数 + 可选JSON文件

use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use serde::{Deserialize, Serialize};

use crate::counting::CountingZone;
use crate::error::ConfigError;

/// 默认参考线位置: 画面高度的82%
pub const DEFAULT_LINE_RATIO: f64 = 0.82;
/// 默认容差带半宽 (像素)
pub const DEFAULT_OFFSET: u32 = 10;

/// 计数参数配置
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CountingConfig {
    /// 参考线纵坐标 (像素); 为空时按 line_ratio 计算
    pub line_position: Option<i32>,
    pub line_ratio: f64,
    /// 容差带半宽 (像素)
    pub offset: u32,
    /// 每N帧处理一帧, 1 = 不跳帧
    pub frame_skip: u64,
    /// 进度日志间隔 (帧), 0 = 关闭
    pub progress_interval: u64,
}

impl Default for CountingConfig {
    fn default() -> Self {
        Self {
            line_position: None,
            line_ratio: DEFAULT_LINE_RATIO,
            offset: DEFAULT_OFFSET,
            frame_skip: 1,
            progress_interval: 500,
        }
    }
}

impl CountingConfig {
    /// 从JSON文件加载配置, 缺失字段取默认值
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let config: Self = serde_json::from_str(&json).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })?;
        tracing::info!("config loaded from {}", path.display());
        Ok(config)
    }

    /// 保存配置到JSON文件
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self).map_err(ConfigError::Serialize)?;
        fs::write(path, json).map_err(|source| ConfigError::Write {
            path: path.display().to_string(),
            source,
        })?;
        tracing::info!("config saved to {}", path.display());
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.frame_skip == 0 {
            return Err(ConfigError::ZeroFrameSkip);
        }
        if !(self.line_ratio > 0.0 && self.line_ratio <= 1.0) {
            return Err(ConfigError::LineRatioOutOfRange(self.line_ratio));
        }
        Ok(())
    }

    /// 确定计数区域: 显式 line_position 优先, 否则需要画面高度
    pub fn zone(&self, frame_height: Option<u32>) -> Result<CountingZone, ConfigError> {
        self.validate()?;
        match (self.line_position, frame_height) {
            (Some(line_position), _) => Ok(CountingZone::new(line_position, self.offset)),
            (None, Some(height)) => Ok(CountingZone::from_ratio(
                height,
                self.line_ratio,
                self.offset,
            )),
            (None, None) => Err(ConfigError::MissingFrameHeight),
        }
    }
}

/// 过线计数参数
#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Count unique tracked objects crossing a virtual line", long_about = None)]
pub struct Args {
    /// 检测/跟踪结果回放文件 (JSON Lines)
    #[arg(short, long, value_name = "PATH")]
    pub detections: PathBuf,

    /// 类别名称: data.yaml / 每行一个名称的文件 / 逗号分隔列表 (默认COCO)
    #[arg(short, long, value_name = "PATH|LIST")]
    pub names: Option<String>,

    /// JSON配置文件, 命令行参数优先
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// 参考线纵坐标 (像素)
    #[arg(long)]
    pub line_position: Option<i32>,

    /// 参考线位置占画面高度的比例
    #[arg(long)]
    pub line_ratio: Option<f64>,

    /// 容差带半宽 (像素)
    #[arg(long)]
    pub offset: Option<u32>,

    /// 每N帧处理一帧
    #[arg(long)]
    pub frame_skip: Option<u64>,

    /// 画面高度 (回放文件没有头信息时使用)
    #[arg(long)]
    pub frame_height: Option<u32>,

    /// 最终计数报告输出路径 (JSON)
    #[arg(long, value_name = "PATH")]
    pub report: Option<PathBuf>,

    /// 计数事件日志输出路径 (JSON Lines)
    #[arg(long, value_name = "PATH")]
    pub events: Option<PathBuf>,

    /// 读取线程与计数线程之间的队列长度
    #[arg(long, default_value_t = 120)]
    pub queue: usize,

    /// 不打印逐个计数事件
    #[arg(short, long)]
    pub quiet: bool,

    /// 详细日志
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    /// 合并配置文件与命令行覆盖项
    pub fn counting_config(&self) -> Result<CountingConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => CountingConfig::load(path)?,
            None => CountingConfig::default(),
        };

        if let Some(line_position) = self.line_position {
            config.line_position = Some(line_position);
        }
        if let Some(line_ratio) = self.line_ratio {
            config.line_ratio = line_ratio;
        }
        if let Some(offset) = self.offset {
            config.offset = offset;
        }
        if let Some(frame_skip) = self.frame_skip {
            config.frame_skip = frame_skip;
        }

        config.validate()?;
        Ok(config)
    }
}
