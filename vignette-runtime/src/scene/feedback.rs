//! # Feedback 模块
//!
//! 漂浮反馈标记：确认一次交互的短命文字/图标。
//! 按场景节拍衰减，到期即被移除；重开时整体清空。

use std::time::Duration;

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// 标记存活时长
pub const MARKER_TTL: Duration = Duration::from_secs(2);

/// 标记的语气/样式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeedbackTone {
    /// 萤火虫的鼓励（浅黄）
    Encourage,
    /// 发现碎片（琥珀）
    Discover,
    /// 归位肯定语（金色）
    Affirm,
    /// 结尾互动：爱心
    Heart,
    /// 结尾互动：星光
    Sparkle,
}

/// 一条漂浮标记
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackMarker {
    /// 标识符（会话内单调递增）
    pub id: u64,
    /// 出现位置
    pub pos: Vec2,
    /// 显示文本
    pub text: String,
    /// 语气
    pub tone: FeedbackTone,
    /// 剩余存活时长
    pub ttl: Duration,
}

impl FeedbackMarker {
    pub fn new(id: u64, pos: Vec2, text: impl Into<String>, tone: FeedbackTone) -> Self {
        Self {
            id,
            pos,
            text: text.into(),
            tone,
            ttl: MARKER_TTL,
        }
    }
}

/// 衰减一帧并移除到期标记
pub fn advance_markers(markers: &mut Vec<FeedbackMarker>, dt: Duration) {
    markers.retain_mut(|m| {
        if m.ttl > dt {
            m.ttl -= dt;
            true
        } else {
            false
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markers_expire_in_order() {
        let mut markers = vec![
            FeedbackMarker::new(0, Vec2::ZERO, "找到了!", FeedbackTone::Discover),
            FeedbackMarker::new(1, Vec2::ZERO, "抱抱你", FeedbackTone::Encourage),
        ];
        markers[1].ttl = Duration::from_millis(90);

        let dt = Duration::from_millis(30);

        advance_markers(&mut markers, dt);
        assert_eq!(markers.len(), 2);

        advance_markers(&mut markers, dt);
        advance_markers(&mut markers, dt);
        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].id, 0);

        // 2 秒 / 30ms = 66.7 帧，第 67 帧后全部消失
        for _ in 0..64 {
            advance_markers(&mut markers, dt);
        }
        assert!(markers.is_empty());
    }

    #[test]
    fn test_marker_serialization() {
        let m = FeedbackMarker::new(3, Vec2::new(10.0, 20.0), "✨ 温柔的灵魂", FeedbackTone::Affirm);
        let json = serde_json::to_string(&m).unwrap();
        let loaded: FeedbackMarker = serde_json::from_str(&json).unwrap();
        assert_eq!(m, loaded);
    }
}
