/// 报告输出 (Reporting sinks)
///
/// 计数核心只通过 `ReportSink` 输出结果, 即使输出为空操作计数也必须正确
/// - ConsoleSink:    终端打印
/// - JsonLinesSink:  JSON Lines 事件日志
/// - EventLog:       内存记录 (实时叠加显示 / 测试)
/// - MultiSink:      同时输出到多个目标
pub mod console;
pub mod json;

pub use console::ConsoleSink;
pub use json::JsonLinesSink;

use crate::counting::{CountEvent, CountReport, CountingZone};
use crate::detection::StreamInfo;
use crate::error::ReportError;
use crate::pipeline::RunSummary;

/// 报告输出接口
pub trait ReportSink {
    /// 运行开始 (默认忽略)
    fn on_start(
        &mut self,
        _zone: &CountingZone,
        _stream: Option<&StreamInfo>,
    ) -> Result<(), ReportError> {
        Ok(())
    }

    /// 新计数事件, 按观测顺序追加
    fn on_count(&mut self, frame_index: u64, event: &CountEvent) -> Result<(), ReportError>;

    /// 运行结束, 最终计数只读
    fn finish(&mut self, summary: &RunSummary) -> Result<(), ReportError>;
}

impl<S: ReportSink + ?Sized> ReportSink for Box<S> {
    fn on_start(
        &mut self,
        zone: &CountingZone,
        stream: Option<&StreamInfo>,
    ) -> Result<(), ReportError> {
        (**self).on_start(zone, stream)
    }

    fn on_count(&mut self, frame_index: u64, event: &CountEvent) -> Result<(), ReportError> {
        (**self).on_count(frame_index, event)
    }

    fn finish(&mut self, summary: &RunSummary) -> Result<(), ReportError> {
        (**self).finish(summary)
    }
}

/// 空输出
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl ReportSink for NullSink {
    fn on_count(&mut self, _frame_index: u64, _event: &CountEvent) -> Result<(), ReportError> {
        Ok(())
    }

    fn finish(&mut self, _summary: &RunSummary) -> Result<(), ReportError> {
        Ok(())
    }
}

/// 内存中的事件记录
#[derive(Debug, Default, Clone)]
pub struct EventLog {
    pub events: Vec<(u64, CountEvent)>,
    pub report: Option<CountReport>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ReportSink for EventLog {
    fn on_count(&mut self, frame_index: u64, event: &CountEvent) -> Result<(), ReportError> {
        self.events.push((frame_index, event.clone()));
        Ok(())
    }

    fn finish(&mut self, summary: &RunSummary) -> Result<(), ReportError> {
        self.report = Some(summary.report.clone());
        Ok(())
    }
}

/// 同时输出到多个目标; 某个目标失败不影响其余目标, 返回第一个错误
#[derive(Default)]
pub struct MultiSink {
    sinks: Vec<Box<dyn ReportSink + Send>>,
}

impl MultiSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, sink: impl ReportSink + Send + 'static) {
        self.sinks.push(Box::new(sink));
    }

    pub fn with(mut self, sink: impl ReportSink + Send + 'static) -> Self {
        self.push(sink);
        self
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    fn each<F>(&mut self, mut f: F) -> Result<(), ReportError>
    where
        F: FnMut(&mut dyn ReportSink) -> Result<(), ReportError>,
    {
        let mut first_error = None;
        for sink in self.sinks.iter_mut() {
            if let Err(e) = f(&mut **sink) {
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}

impl ReportSink for MultiSink {
    fn on_start(
        &mut self,
        zone: &CountingZone,
        stream: Option<&StreamInfo>,
    ) -> Result<(), ReportError> {
        self.each(|sink| sink.on_start(zone, stream))
    }

    fn on_count(&mut self, frame_index: u64, event: &CountEvent) -> Result<(), ReportError> {
        self.each(|sink| sink.on_count(frame_index, event))
    }

    fn finish(&mut self, summary: &RunSummary) -> Result<(), ReportError> {
        self.each(|sink| sink.finish(summary))
    }
}
