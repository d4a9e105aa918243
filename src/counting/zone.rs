//! 计数区域 (Counting zone)
//!
//! 检测框 → 中心点 → 是否落在参考线的容差带内

use serde::{Deserialize, Serialize};

use crate::detection::{BBox, Point};
use crate::error::DetectionError;

/// 检测框中心点 (截断取整)
///
/// 颠倒或非有限坐标返回 MalformedRegion, 由调用方丢弃该检测。
pub fn centroid(bbox: &BBox) -> Result<Point, DetectionError> {
    if !bbox.is_well_formed() {
        return Err(DetectionError::MalformedRegion {
            x1: bbox.x1,
            y1: bbox.y1,
            x2: bbox.x2,
            y2: bbox.y2,
            track_id: None,
        });
    }

    let cx = (bbox.x1 + bbox.x2) / 2.0;
    let cy = (bbox.y1 + bbox.y2) / 2.0;
    Ok(Point {
        x: cx as i32,
        y: cy as i32,
    })
}

/// 水平参考线 + 容差带
///
/// 区域为开区间 `(line_position - offset, line_position + offset)`。
/// 不区分运动方向。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountingZone {
    line_position: i32,
    offset: u32,
}

impl CountingZone {
    pub fn new(line_position: i32, offset: u32) -> Self {
        Self {
            line_position,
            offset,
        }
    }

    /// 按画面高度比例放置参考线, 例如 0.82 → `int(h * 0.82)`
    pub fn from_ratio(frame_height: u32, ratio: f64, offset: u32) -> Self {
        let line_position = (frame_height as f64 * ratio) as i32;
        Self::new(line_position, offset)
    }

    pub fn line_position(&self) -> i32 {
        self.line_position
    }

    pub fn offset(&self) -> u32 {
        self.offset
    }

    /// 下边界 (不含)
    pub fn lower(&self) -> i64 {
        self.line_position as i64 - self.offset as i64
    }

    /// 上边界 (不含)
    pub fn upper(&self) -> i64 {
        self.line_position as i64 + self.offset as i64
    }

    pub fn contains(&self, cy: i32) -> bool {
        let cy = cy as i64;
        self.lower() < cy && cy < self.upper()
    }

    pub fn contains_point(&self, point: Point) -> bool {
        self.contains(point.y)
    }
}
