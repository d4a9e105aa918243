//! JSON Lines 事件日志
//!
//! 每行一个事件: `session_start`, `count`, `summary`

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;

use super::ReportSink;
use crate::counting::{ClassTally, CountEvent, CountingZone};
use crate::detection::{StreamInfo, TrackId};
use crate::error::ReportError;
use crate::pipeline::{PipelineStats, RunSummary, Termination};

#[derive(Serialize)]
struct SessionLog<'a> {
    event: &'static str,
    timestamp: String,
    line_position: i32,
    offset: u32,
    stream: Option<&'a StreamInfo>,
}

#[derive(Serialize)]
struct CountLog<'a> {
    event: &'static str,
    timestamp: String,
    frame: u64,
    track_id: TrackId,
    class: &'a str,
    class_total: u64,
    total: u64,
}

#[derive(Serialize)]
struct SummaryLog<'a> {
    event: &'static str,
    timestamp: String,
    total: u64,
    per_class: &'a ClassTally,
    stats: &'a PipelineStats,
    termination: &'a Termination,
}

pub struct JsonLinesSink<W: Write> {
    writer: W,
}

impl JsonLinesSink<BufWriter<File>> {
    pub fn create(path: &Path) -> Result<Self, ReportError> {
        let file = File::create(path)?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_event<T: Serialize>(&mut self, event: &T) -> Result<(), ReportError> {
        serde_json::to_writer(&mut self.writer, event)?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }
}

impl<W: Write> ReportSink for JsonLinesSink<W> {
    fn on_start(
        &mut self,
        zone: &CountingZone,
        stream: Option<&StreamInfo>,
    ) -> Result<(), ReportError> {
        self.write_event(&SessionLog {
            event: "session_start",
            timestamp: timestamp_now(),
            line_position: zone.line_position(),
            offset: zone.offset(),
            stream,
        })?;
        self.writer.flush()?;
        Ok(())
    }

    fn on_count(&mut self, frame_index: u64, event: &CountEvent) -> Result<(), ReportError> {
        self.write_event(&CountLog {
            event: "count",
            timestamp: timestamp_now(),
            frame: frame_index,
            track_id: event.track_id,
            class: &event.class_name,
            class_total: event.class_total,
            total: event.total,
        })
    }

    fn finish(&mut self, summary: &RunSummary) -> Result<(), ReportError> {
        self.write_event(&SummaryLog {
            event: "summary",
            timestamp: timestamp_now(),
            total: summary.report.total,
            per_class: &summary.report.per_class,
            stats: &summary.stats,
            termination: &summary.termination,
        })?;
        self.writer.flush()?;
        Ok(())
    }
}

fn timestamp_now() -> String {
    chrono::Utc::now().to_rfc3339()
}
