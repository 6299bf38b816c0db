//! # Input 模块
//!
//! 定义宿主向引擎传递的输入事件。
//!
//! ## 设计说明
//!
//! - 引擎不直接处理鼠标/触摸/键盘事件，只处理**语义化**的输入：
//!   原始事件到语义输入的翻译（命中了哪个物件、坐标换算）由宿主完成
//! - 定时完全由宿主驱动：`WaitForScene`/`WaitForTime` 到期时宿主回传 [`Tick`](VignetteInput::Tick)，
//!   引擎自身没有时钟

use serde::{Deserialize, Serialize};

use crate::story::ShardId;

/// 宿主向引擎传递的输入
///
/// 引擎通过 `tick(input)` 接收这些输入，并根据当前等待状态决定如何处理。
/// 不适用于当前阶段的输入按无害处理（静默忽略），
/// 只有语义矛盾的输入（例如非选择状态下收到选择）会报错。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum VignetteInput {
    /// 用户点击（推进旁白 / 跳过打字机）
    Click,

    /// 用户选择了某个选项（`index` 从 0 开始）
    ChoiceSelected { index: usize },

    /// 指针移动（手电、拖拽跟随）
    PointerMove { x: f32, y: f32 },

    /// 指针按下（收集碎片 / 结尾互动）
    PointerDown { x: f32, y: f32 },

    /// 指针抬起（拖拽落点判定）
    PointerUp { x: f32, y: f32 },

    /// 从修复清单抓起一块碎片（宿主对清单做命中判定后转译）
    GrabShard { id: ShardId, x: f32, y: f32 },

    /// 定时器到期（场景节拍或一次性延迟）
    Tick,

    /// 视口尺寸变化
    Resize { width: f32, height: f32 },

    /// 重新开始（仅结尾阶段有效）
    Restart,
}

impl VignetteInput {
    /// 创建点击输入
    pub fn click() -> Self {
        Self::Click
    }

    /// 创建选择输入
    pub fn choice(index: usize) -> Self {
        Self::ChoiceSelected { index }
    }

    /// 创建指针移动输入
    pub fn pointer_move(x: f32, y: f32) -> Self {
        Self::PointerMove { x, y }
    }

    /// 创建指针按下输入
    pub fn pointer_down(x: f32, y: f32) -> Self {
        Self::PointerDown { x, y }
    }

    /// 创建指针抬起输入
    pub fn pointer_up(x: f32, y: f32) -> Self {
        Self::PointerUp { x, y }
    }

    /// 创建抓取输入
    pub fn grab(id: ShardId, x: f32, y: f32) -> Self {
        Self::GrabShard { id, x, y }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_creation() {
        assert_eq!(VignetteInput::click(), VignetteInput::Click);
        assert_eq!(
            VignetteInput::choice(1),
            VignetteInput::ChoiceSelected { index: 1 }
        );
        assert_eq!(
            VignetteInput::grab(3, 10.0, 20.0),
            VignetteInput::GrabShard {
                id: 3,
                x: 10.0,
                y: 20.0
            }
        );
    }

    #[test]
    fn test_input_serialization() {
        let input = VignetteInput::pointer_down(320.5, 18.0);
        let json = serde_json::to_string(&input).unwrap();
        let loaded: VignetteInput = serde_json::from_str(&json).unwrap();
        assert_eq!(input, loaded);
    }
}
