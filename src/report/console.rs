//! 终端输出

use std::io::{self, Stdout, Write};

use super::ReportSink;
use crate::counting::{CountEvent, CountingZone};
use crate::detection::StreamInfo;
use crate::error::ReportError;
use crate::pipeline::{RunSummary, Termination};

pub struct ConsoleSink<W = Stdout> {
    out: W,
    /// 是否打印逐个计数事件
    live: bool,
}

impl ConsoleSink<Stdout> {
    pub fn stdout(live: bool) -> Self {
        Self::new(io::stdout(), live)
    }
}

impl<W: Write> ConsoleSink<W> {
    pub fn new(out: W, live: bool) -> Self {
        Self { out, live }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ReportSink for ConsoleSink<W> {
    fn on_start(
        &mut self,
        zone: &CountingZone,
        stream: Option<&StreamInfo>,
    ) -> Result<(), ReportError> {
        match stream.and_then(|info| info.total_frames) {
            Some(total) => writeln!(self.out, "🎬 Processing video... total frames: {}", total)?,
            None => writeln!(self.out, "🎬 Processing video...")?,
        }
        writeln!(
            self.out,
            "📏 Counting line y={} (zone {}..{})",
            zone.line_position(),
            zone.lower(),
            zone.upper()
        )?;
        Ok(())
    }

    fn on_count(&mut self, frame_index: u64, event: &CountEvent) -> Result<(), ReportError> {
        if self.live {
            writeln!(
                self.out,
                "🚗 [frame {}] {}-{} crossed → total {} ({}: {})",
                frame_index,
                event.class_name,
                event.track_id,
                event.total,
                event.class_name,
                event.class_total
            )?;
        }
        Ok(())
    }

    fn finish(&mut self, summary: &RunSummary) -> Result<(), ReportError> {
        let stats = &summary.stats;
        writeln!(self.out)?;
        match &summary.termination {
            Termination::Exhausted => writeln!(self.out, "✅ Processing finished!")?,
            Termination::SourceFailed(reason) => {
                writeln!(self.out, "⚠️  Source stopped early: {}", reason)?
            }
        }
        writeln!(self.out, "Total: {}", summary.report.total)?;
        writeln!(self.out, "Breakdown:")?;
        for (class_name, count) in summary.report.per_class.iter() {
            writeln!(self.out, "- {}: {}", class_name, count)?;
        }
        writeln!(
            self.out,
            "Frames: {} read, {} processed, {} skipped, {} unreadable",
            stats.frames_read, stats.frames_processed, stats.frames_skipped, stats.bad_frames
        )?;
        writeln!(
            self.out,
            "Detections: {} seen, {} without track id, {} malformed",
            stats.detections, stats.untracked, stats.malformed
        )?;
        self.out.flush()?;
        Ok(())
    }
}
