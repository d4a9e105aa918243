//! 读取线程 → 计数线程
//!
//! 单生产者保证帧顺序; 发送端关闭即视为流结束。

use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender};

use super::ObservationSource;
use crate::detection::{Frame, StreamInfo};
use crate::error::SourceError;

pub type FrameMessage = Result<Frame, SourceError>;

/// 从有界队列接收帧的观测源
pub struct ChannelSource {
    rx: Receiver<FrameMessage>,
    info: Option<StreamInfo>,
}

impl ChannelSource {
    pub fn new(rx: Receiver<FrameMessage>, info: Option<StreamInfo>) -> Self {
        Self { rx, info }
    }

    /// 创建有界队列, 返回发送端与观测源
    pub fn bounded(capacity: usize, info: Option<StreamInfo>) -> (Sender<FrameMessage>, Self) {
        let (tx, rx) = crossbeam_channel::bounded(capacity);
        (tx, Self::new(rx, info))
    }
}

impl ObservationSource for ChannelSource {
    fn stream_info(&self) -> Option<StreamInfo> {
        self.info.clone()
    }

    fn next_frame(&mut self) -> Option<Result<Frame, SourceError>> {
        // 发送端全部关闭 → 流结束
        self.rx.recv().ok()
    }
}

/// 在独立线程中驱动观测源, 通过有界队列转发
///
/// 队列满时读取线程阻塞 (背压)。不可恢复的错误转发后读取线程退出。
pub fn spawn_reader<S>(
    mut source: S,
    capacity: usize,
) -> Result<(ChannelSource, JoinHandle<()>), SourceError>
where
    S: ObservationSource + Send + 'static,
{
    let info = source.stream_info();
    let (tx, channel_source) = ChannelSource::bounded(capacity, info);

    let handle = thread::Builder::new()
        .name("observation-source".into())
        .spawn(move || {
            tracing::debug!("observation reader started");
            while let Some(message) = source.next_frame() {
                let fatal = matches!(&message, Err(e) if !e.is_recoverable());
                if tx.send(message).is_err() {
                    tracing::debug!("counting side hung up, stopping reader");
                    break;
                }
                if fatal {
                    break;
                }
            }
            tracing::debug!("observation reader finished");
        })?;

    Ok((channel_source, handle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::IterSource;

    #[test]
    fn test_channel_preserves_order_and_ends() {
        let frames: Vec<Frame> = (1..=50).map(|i| Frame::new(i, Vec::new())).collect();
        let info = StreamInfo {
            width: 640,
            height: 480,
            ..Default::default()
        };
        let source = IterSource::new(frames).with_stream_info(info.clone());

        let (mut channel, handle) = spawn_reader(source, 4).unwrap();
        assert_eq!(channel.stream_info(), Some(info));

        let mut indices = Vec::new();
        while let Some(frame) = channel.next_frame() {
            indices.push(frame.unwrap().index);
        }
        handle.join().unwrap();
        assert_eq!(indices, (1..=50).collect::<Vec<u64>>());
    }

    #[test]
    fn test_fatal_error_ends_stream() {
        let (tx, mut channel) = ChannelSource::bounded(8, None);
        tx.send(Ok(Frame::new(1, Vec::new()))).unwrap();
        tx.send(Err(SourceError::Upstream("decoder died".into())))
            .unwrap();
        drop(tx);

        assert!(channel.next_frame().unwrap().is_ok());
        let err = channel.next_frame().unwrap().unwrap_err();
        assert!(!err.is_recoverable());
        assert!(channel.next_frame().is_none());
    }
}
