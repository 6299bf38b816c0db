//! # Command 模块
//!
//! 定义引擎向宿主发出的所有指令。
//! Command 是引擎与宿主之间**唯一的事件通道**：状态快照描述"现在是什么"，
//! Command 描述"刚刚发生了什么"。
//!
//! ## 设计原则
//!
//! - **声明式**：Command 描述"做什么"，不描述"怎么做"
//! - **无副作用**：Command 本身不执行任何操作
//! - **引擎无关**：不包含任何渲染框架的类型

use serde::{Deserialize, Serialize};

use crate::scene::feedback::FeedbackMarker;
use crate::state::Phase;

/// 引擎向宿主发出的指令
///
/// 宿主接收 Command 后，将其转换为实际的界面切换、动画、音效等操作。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Command {
    /// 进入新阶段（宿主切换场景/背景）
    EnterScene {
        /// 新阶段
        phase: Phase,
    },

    /// 开始一行旁白（逐字进度从状态快照读取）
    ShowText {
        /// 完整文本
        content: String,
    },

    /// 展示派对对话与选项
    PresentChoices {
        /// 主文本
        prompt: String,
        /// 旁白回应（首个节点没有）
        response: Option<String>,
        /// 选项文本列表（按索引选择）
        options: Vec<String>,
    },

    /// 弹出一条漂浮反馈
    SpawnFeedback {
        /// 标记内容（位置、文本、语气、存活时长）
        marker: FeedbackMarker,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::feedback::FeedbackTone;
    use glam::Vec2;

    #[test]
    fn test_command_serialization() {
        let cmd = Command::ShowText {
            content: "看，天亮了。".to_string(),
        };
        let json = serde_json::to_string(&cmd).unwrap();
        let loaded: Command = serde_json::from_str(&json).unwrap();
        assert_eq!(cmd, loaded);

        let cmd = Command::SpawnFeedback {
            marker: FeedbackMarker::new(1, Vec2::new(5.0, 6.0), "找到了!", FeedbackTone::Discover),
        };
        let json = serde_json::to_string(&cmd).unwrap();
        let loaded: Command = serde_json::from_str(&json).unwrap();
        assert_eq!(cmd, loaded);
    }

    #[test]
    fn test_present_choices_shape() {
        let cmd = Command::PresentChoices {
            prompt: "我必须做点什么...".to_string(),
            response: None,
            options: vec!["讲个笑话".to_string(), "保持沉默".to_string()],
        };
        if let Command::PresentChoices { options, .. } = &cmd {
            assert_eq!(options.len(), 2);
        } else {
            panic!("wrong variant");
        }
    }
}
