// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

/// 过线计数数据结构定义
/// Data structures shared by the observation source and the counting core
use serde::{Deserialize, Serialize};

use crate::error::DetectionError;

// ========== 类型别名 ==========

/// 跟踪器分配的持久ID
pub type TrackId = u64;

// ========== 数据结构 ==========

/// 检测框 (Detection bounding box)
#[derive(Clone, Debug, PartialEq)]
pub struct BBox {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
    pub confidence: f32,
    pub class_id: u32,
}

impl BBox {
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self {
            x1,
            y1,
            x2,
            y2,
            confidence: 1.0,
            class_id: 0,
        }
    }

    pub fn with_class(mut self, class_id: u32) -> Self {
        self.class_id = class_id;
        self
    }

    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = confidence;
        self
    }

    pub fn width(&self) -> f32 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> f32 {
        self.y2 - self.y1
    }

    /// 坐标有限且 x1 ≤ x2, y1 ≤ y2
    pub fn is_well_formed(&self) -> bool {
        let finite = [self.x1, self.y1, self.x2, self.y2]
            .iter()
            .all(|v| v.is_finite());
        finite && self.x1 <= self.x2 && self.y1 <= self.y2
    }
}

/// 代表点 (整数像素坐标)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

/// 单帧中的一个观测
#[derive(Clone, Debug, PartialEq)]
pub struct Detection {
    pub bbox: BBox,
    pub class_name: String,
    /// 跟踪器未确认身份时为 None
    pub track_id: Option<TrackId>,
}

impl Detection {
    pub fn new(bbox: BBox, class_name: impl Into<String>, track_id: Option<TrackId>) -> Self {
        Self {
            bbox,
            class_name: class_name.into(),
            track_id,
        }
    }

    pub fn tracked(bbox: BBox, class_name: impl Into<String>, track_id: TrackId) -> Self {
        Self::new(bbox, class_name, Some(track_id))
    }

    /// 已确认的跟踪ID, 没有则返回 MissingIdentifier
    pub fn confirmed_id(&self) -> Result<TrackId, DetectionError> {
        self.track_id.ok_or(DetectionError::MissingIdentifier)
    }
}

/// 一帧的全部检测结果 (观测源 → 计数流水线)
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Frame {
    /// 观测源给出的帧序号
    pub index: u64,
    pub detections: Vec<Detection>,
}

impl Frame {
    pub fn new(index: u64, detections: Vec<Detection>) -> Self {
        Self { index, detections }
    }
}

/// 视频流属性 (宽, 高, 帧率, 总帧数)
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StreamInfo {
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub fps: f64,
    #[serde(default)]
    pub total_frames: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_well_formed_bbox() {
        assert!(BBox::new(0.0, 0.0, 10.0, 10.0).is_well_formed());
        // 零面积框仍然合法
        assert!(BBox::new(5.0, 5.0, 5.0, 5.0).is_well_formed());
        assert!(!BBox::new(10.0, 0.0, 0.0, 10.0).is_well_formed());
        assert!(!BBox::new(0.0, 10.0, 10.0, 0.0).is_well_formed());
        assert!(!BBox::new(f32::NAN, 0.0, 10.0, 10.0).is_well_formed());
        assert!(!BBox::new(0.0, 0.0, f32::INFINITY, 10.0).is_well_formed());
    }

    #[test]
    fn test_confirmed_id() {
        let bbox = BBox::new(0.0, 0.0, 1.0, 1.0);
        assert_eq!(Detection::tracked(bbox.clone(), "car", 7).confirmed_id(), Ok(7));
        assert_eq!(
            Detection::new(bbox, "car", None).confirmed_id(),
            Err(DetectionError::MissingIdentifier)
        );
    }
}
