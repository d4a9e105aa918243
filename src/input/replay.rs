//! 检测结果回放 (JSON Lines)
//!
//! 可选的首行头信息, 之后每行一帧:
//!
//! ```text
//! {"stream": {"width": 1920, "height": 1080, "fps": 30.0, "total_frames": 900}}
//! {"frame": 1, "detections": [{"bbox": [10, 20, 50, 80], "class_id": 2, "track_id": 7}]}
//! {"frame": 2, "detections": [{"bbox": [12, 30, 52, 90], "class_id": 2, "track_id": null}]}
//! ```

use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::Path;

use serde::Deserialize;

use super::ObservationSource;
use crate::detection::{BBox, ClassNames, Detection, Frame, StreamInfo, TrackId};
use crate::error::SourceError;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ReplayRecord {
    Header { stream: StreamInfo },
    Frame(FrameRecord),
}

#[derive(Debug, Deserialize)]
struct FrameRecord {
    #[serde(default)]
    frame: Option<u64>,
    #[serde(default)]
    detections: Vec<DetectionRecord>,
}

#[derive(Debug, Deserialize)]
struct DetectionRecord {
    bbox: [f32; 4],
    #[serde(default)]
    class_id: u32,
    /// 优先于 class_id 查表
    #[serde(default)]
    class_name: Option<String>,
    #[serde(default)]
    track_id: Option<TrackId>,
    #[serde(default = "default_confidence")]
    confidence: f32,
}

fn default_confidence() -> f32 {
    1.0
}

impl DetectionRecord {
    fn into_detection(self, names: &ClassNames) -> Detection {
        let [x1, y1, x2, y2] = self.bbox;
        let bbox = BBox::new(x1, y1, x2, y2)
            .with_class(self.class_id)
            .with_confidence(self.confidence);
        let class_name = self
            .class_name
            .unwrap_or_else(|| names.resolve(self.class_id));
        Detection::new(bbox, class_name, self.track_id)
    }
}

/// JSON Lines 回放源
pub struct ReplaySource<R> {
    lines: Lines<R>,
    names: ClassNames,
    info: Option<StreamInfo>,
    /// 读取头信息时预取的第一帧
    pending: Option<Result<Frame, SourceError>>,
    line_no: u64,
    frames_read: u64,
}

impl ReplaySource<BufReader<File>> {
    pub fn open(path: &Path, names: ClassNames) -> Result<Self, SourceError> {
        let file = File::open(path)?;
        Self::new(BufReader::new(file), names)
    }
}

impl<R: BufRead> ReplaySource<R> {
    /// 读取到第一条非空记录, 是头信息则保存, 否则作为第一帧缓存
    pub fn new(reader: R, names: ClassNames) -> Result<Self, SourceError> {
        let mut source = Self {
            lines: reader.lines(),
            names,
            info: None,
            pending: None,
            line_no: 0,
            frames_read: 0,
        };

        match source.next_record() {
            Some(Ok(ReplayRecord::Header { stream })) => source.info = Some(stream),
            Some(Ok(ReplayRecord::Frame(record))) => {
                source.pending = Some(Ok(source.build_frame(record)));
            }
            Some(Err(e)) if e.is_recoverable() => source.pending = Some(Err(e)),
            Some(Err(e)) => return Err(e),
            None => {}
        }

        Ok(source)
    }

    /// 覆盖头信息 (例如命令行给出画面高度)
    pub fn with_stream_info(mut self, info: StreamInfo) -> Self {
        self.info = Some(info);
        self
    }

    /// 没有头信息时使用给定的画面高度, 已有头信息则保持不变
    pub fn with_default_height(mut self, height: u32) -> Self {
        if self.info.is_none() {
            self.info = Some(StreamInfo {
                height,
                ..Default::default()
            });
        }
        self
    }

    pub fn frames_read(&self) -> u64 {
        self.frames_read
    }

    fn next_record(&mut self) -> Option<Result<ReplayRecord, SourceError>> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => return Some(Err(SourceError::Io(e))),
            };
            self.line_no += 1;

            if line.trim().is_empty() {
                continue;
            }

            return Some(serde_json::from_str(&line).map_err(|source| {
                SourceError::MalformedRecord {
                    line: self.line_no,
                    source,
                }
            }));
        }
    }

    fn build_frame(&mut self, record: FrameRecord) -> Frame {
        self.frames_read += 1;
        let index = record.frame.unwrap_or(self.frames_read);
        let detections = record
            .detections
            .into_iter()
            .map(|d| d.into_detection(&self.names))
            .collect();
        Frame::new(index, detections)
    }
}

impl<R: BufRead> ObservationSource for ReplaySource<R> {
    fn stream_info(&self) -> Option<StreamInfo> {
        self.info.clone()
    }

    fn next_frame(&mut self) -> Option<Result<Frame, SourceError>> {
        if let Some(pending) = self.pending.take() {
            return Some(pending);
        }

        loop {
            match self.next_record()? {
                Ok(ReplayRecord::Frame(record)) => return Some(Ok(self.build_frame(record))),
                Ok(ReplayRecord::Header { .. }) => {
                    tracing::warn!("ignoring stream header on line {}", self.line_no);
                }
                Err(e) => return Some(Err(e)),
            }
        }
    }
}
