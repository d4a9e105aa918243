/// 观测输入系统 (Observation input)
///
/// 外部检测器/跟踪器逐帧给出检测结果, 计数核心只依赖 `ObservationSource`
/// - ReplaySource:  JSON Lines 检测记录回放
/// - ChannelSource: 独立读取线程 → 有界队列 → 计数线程
/// - IterSource:    内存中的帧序列
pub mod channel;
pub mod replay;

pub use channel::{spawn_reader, ChannelSource};
pub use replay::ReplaySource;

use crate::detection::{Frame, StreamInfo};
use crate::error::SourceError;

/// 观测源接口
///
/// 顺序拉取, 不重排。返回 `None` 表示流结束。
pub trait ObservationSource {
    /// 视频流属性 (未知时为 None)
    fn stream_info(&self) -> Option<StreamInfo>;

    /// 拉取下一帧
    fn next_frame(&mut self) -> Option<Result<Frame, SourceError>>;
}

impl<S: ObservationSource + ?Sized> ObservationSource for Box<S> {
    fn stream_info(&self) -> Option<StreamInfo> {
        (**self).stream_info()
    }

    fn next_frame(&mut self) -> Option<Result<Frame, SourceError>> {
        (**self).next_frame()
    }
}

/// 由迭代器提供帧
pub struct IterSource<I> {
    frames: I,
    info: Option<StreamInfo>,
}

impl<I: Iterator<Item = Frame>> IterSource<I> {
    pub fn new(frames: impl IntoIterator<IntoIter = I>) -> Self {
        Self {
            frames: frames.into_iter(),
            info: None,
        }
    }

    pub fn with_stream_info(mut self, info: StreamInfo) -> Self {
        self.info = Some(info);
        self
    }
}

impl<I: Iterator<Item = Frame>> ObservationSource for IterSource<I> {
    fn stream_info(&self) -> Option<StreamInfo> {
        self.info.clone()
    }

    fn next_frame(&mut self) -> Option<Result<Frame, SourceError>> {
        self.frames.next().map(Ok)
    }
}
