//! 计数流水线主循环
//! 职责: 拉取帧 → 跳帧 → 逐个检测计数 → 发送计数事件

use std::time::Instant;

use tracing::{debug, info, warn};

use super::{PipelineStats, RunSummary, Termination};
use crate::config::CountingConfig;
use crate::counting::{centroid, CountEvent, CountingZone, LineCounter};
use crate::detection::{Detection, Frame, StreamInfo};
use crate::error::{ConfigError, DetectionError};
use crate::input::ObservationSource;
use crate::report::ReportSink;

pub struct CountingPipeline<S> {
    zone: CountingZone,
    frame_skip: u64,
    progress_interval: u64,
    counter: LineCounter,
    sink: S,
    stats: PipelineStats,
}

impl<S: ReportSink> CountingPipeline<S> {
    pub fn new(zone: CountingZone, frame_skip: u64, sink: S) -> Self {
        Self {
            zone,
            frame_skip: frame_skip.max(1),
            progress_interval: 0,
            counter: LineCounter::new(),
            sink,
            stats: PipelineStats::default(),
        }
    }

    /// 按配置与视频流属性创建 (未给 line_position 时需要画面高度)
    pub fn from_config(
        config: &CountingConfig,
        stream: Option<&StreamInfo>,
        sink: S,
    ) -> Result<Self, ConfigError> {
        let zone = config.zone(stream.map(|info| info.height))?;
        let mut pipeline = Self::new(zone, config.frame_skip, sink);
        pipeline.progress_interval = config.progress_interval;
        Ok(pipeline)
    }

    pub fn zone(&self) -> &CountingZone {
        &self.zone
    }

    pub fn counter(&self) -> &LineCounter {
        &self.counter
    }

    pub fn stats(&self) -> &PipelineStats {
        &self.stats
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// 单个检测: 无跟踪ID或坐标非法时返回错误, 不进入计数器
    pub fn observe_detection(
        &mut self,
        detection: &Detection,
    ) -> Result<Option<CountEvent>, DetectionError> {
        let track_id = detection.confirmed_id()?;
        let point = centroid(&detection.bbox).map_err(|e| match e {
            DetectionError::MalformedRegion { x1, y1, x2, y2, .. } => {
                DetectionError::MalformedRegion {
                    x1,
                    y1,
                    x2,
                    y2,
                    track_id: Some(track_id),
                }
            }
            other => other,
        })?;
        let in_zone = self.zone.contains_point(point);
        Ok(self
            .counter
            .observe(track_id, &detection.class_name, in_zone))
    }

    /// 处理一帧 (不做跳帧判断), 返回本帧产生的计数事件
    pub fn process_frame(&mut self, frame: &Frame) -> Vec<CountEvent> {
        self.stats.frames_processed += 1;
        let mut events = Vec::new();

        for detection in &frame.detections {
            self.stats.detections += 1;
            match self.observe_detection(detection) {
                Ok(Some(event)) => {
                    self.stats.events += 1;
                    debug!(
                        "frame {}: {}-{} counted, total={}",
                        frame.index, event.class_name, event.track_id, event.total
                    );
                    if let Err(e) = self.sink.on_count(frame.index, &event) {
                        warn!("report sink failed on count event: {}", e);
                    }
                    events.push(event);
                }
                Ok(None) => {}
                Err(DetectionError::MissingIdentifier) => self.stats.untracked += 1,
                Err(e @ DetectionError::MalformedRegion { .. }) => {
                    self.stats.malformed += 1;
                    warn!("frame {}: skipping detection: {}", frame.index, e);
                }
            }
        }

        events
    }

    /// 运行到观测源结束或出错, 返回最终计数
    pub fn run<O: ObservationSource + ?Sized>(&mut self, source: &mut O) -> RunSummary {
        let stream = source.stream_info();
        let total_frames = stream.as_ref().and_then(|info| info.total_frames);
        if let Err(e) = self.sink.on_start(&self.zone, stream.as_ref()) {
            warn!("report sink failed on start: {}", e);
        }
        info!(
            "counting line y={} offset={} frame_skip={}",
            self.zone.line_position(),
            self.zone.offset(),
            self.frame_skip
        );

        let start = Instant::now();
        let termination = loop {
            let frame = match source.next_frame() {
                None => break Termination::Exhausted,
                Some(Ok(frame)) => frame,
                Some(Err(e)) if e.is_recoverable() => {
                    // 坏帧同样计入帧号, 保持跳帧节奏
                    self.stats.frames_read += 1;
                    self.stats.bad_frames += 1;
                    warn!("skipping unreadable frame: {}", e);
                    self.log_progress(total_frames, start);
                    continue;
                }
                Some(Err(e)) => {
                    warn!("observation source failed, keeping counts so far: {}", e);
                    break Termination::SourceFailed(e.to_string());
                }
            };

            self.stats.frames_read += 1;
            if self.stats.frames_read % self.frame_skip == 0 {
                self.process_frame(&frame);
            } else {
                self.stats.frames_skipped += 1;
            }
            self.log_progress(total_frames, start);
        };

        let summary = RunSummary {
            report: self.counter.report(),
            stats: self.stats.clone(),
            termination,
        };

        info!(
            "finished: {} frames in {:.2}s, total={}",
            self.stats.frames_read,
            start.elapsed().as_secs_f64(),
            summary.report.total
        );
        if let Err(e) = self.sink.finish(&summary) {
            warn!("report sink failed on finish: {}", e);
        }

        summary
    }

    /// 按读取帧数判断是否输出进度 (与跳帧无关)
    fn progress_due(&self) -> bool {
        self.progress_interval > 0
            && self.stats.frames_read > 0
            && self.stats.frames_read % self.progress_interval == 0
    }

    fn log_progress(&self, total_frames: Option<u64>, start: Instant) {
        if !self.progress_due() {
            return;
        }
        let elapsed = start.elapsed().as_secs_f64();
        let fps = if elapsed > 0.0 {
            self.stats.frames_read as f64 / elapsed
        } else {
            0.0
        };
        match total_frames {
            Some(total) if total > 0 => info!(
                "frame {}/{} ({:.1}%), {:.1} fps, total={}",
                self.stats.frames_read,
                total,
                self.stats.frames_read as f64 * 100.0 / total as f64,
                fps,
                self.counter.total()
            ),
            _ => info!(
                "frame {}, {:.1} fps, total={}",
                self.stats.frames_read,
                fps,
                self.counter.total()
            ),
        }
    }
}
