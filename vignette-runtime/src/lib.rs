//! # Vignette Runtime
//!
//! 互动短篇《小熊饼干》的核心运行时库。
//!
//! ## 架构概述
//!
//! `vignette-runtime` 是纯逻辑核心，不依赖任何 IO 或渲染引擎。
//! 它通过 **命令驱动模式** 与宿主层（Host）通信：
//!
//! ```text
//! Host                          Runtime
//!   │                              │
//!   │──── VignetteInput ─────────►│
//!   │                              │ tick()
//!   │◄─── (Vec<Command>, WaitingReason) ──│
//!   │                              │
//! ```
//!
//! ## 核心类型
//!
//! - [`Command`]：Runtime 向 Host 发出的指令
//! - [`VignetteInput`]：Host 向 Runtime 传递的输入
//! - [`WaitingReason`]：Runtime 的等待状态
//! - [`VignetteState`]：可序列化的会话状态（宿主每帧读取以绘制）
//!
//! ## 使用示例
//!
//! ```ignore
//! use vignette_runtime::{Story, Viewport, VignetteRuntime, VignetteInput, WaitingReason};
//!
//! let mut runtime = VignetteRuntime::new(Story::builtin(), Viewport::new(1280.0, 720.0));
//!
//! // 主循环
//! let mut input = None;
//! loop {
//!     let (commands, waiting) = runtime.tick(input.take())?;
//!
//!     // Host 执行 commands
//!     for cmd in commands {
//!         host.execute(cmd);
//!     }
//!
//!     // 根据 waiting 状态采集输入
//!     input = match waiting {
//!         WaitingReason::None => None,
//!         WaitingReason::WaitForClick => wait_for_click(),
//!         WaitingReason::WaitForChoice { .. } => wait_for_choice(),
//!         WaitingReason::WaitForTime(duration) => {
//!             sleep(duration);
//!             Some(VignetteInput::Tick)
//!         }
//!         WaitingReason::WaitForScene { tick } => {
//!             // 活跃场景：按 tick 间隔回传 Tick，指针输入随到随转
//!             sleep(tick);
//!             Some(VignetteInput::Tick)
//!         }
//!     };
//! }
//! ```
//!
//! ## 模块结构
//!
//! - [`command`]：Command 定义
//! - [`input`]：VignetteInput 定义
//! - [`state`]：VignetteState 和 WaitingReason 定义
//! - [`error`]：错误类型定义
//! - [`story`]：剧本数据（旁白、对话图、碎片素材）
//! - [`scene`]：场景机制（打字机、萤火虫、碎片、漂浮反馈）
//! - [`runtime`]：执行引擎
//! - [`view`]：小熊渲染参数推导
//! - [`history`]：会话事件记录
//! - [`diagnostic`]：剧本静态检查

pub mod command;
pub mod diagnostic;
pub mod error;
pub mod history;
pub mod input;
pub mod runtime;
pub mod scene;
pub mod state;
pub mod story;
pub mod view;

// 重导出核心类型
pub use command::Command;
pub use diagnostic::{
    Diagnostic, DiagnosticLevel, DiagnosticResult, analyze_story, ensure_playable,
};
pub use error::{RuntimeError, StoryError, VignetteError, VignetteResult};
pub use history::{History, HistoryEvent};
pub use input::VignetteInput;
pub use runtime::VignetteRuntime;
pub use runtime::engine::{
    DEFAULT_SEED, ENDING_LINE_GAP, ENDING_TYPE_TICK, INTRO_TYPE_TICK, SCENE_TICK,
};
pub use scene::{FeedbackMarker, FeedbackTone, Firefly, Typewriter};
pub use state::{Phase, Viewport, VignetteState, WaitingReason};
pub use story::{PartyNode, PartyOption, PartyOutcome, ShardId, ShardSpec, Story};
pub use view::{BearEmotion, BearView, bear_view};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_api_accessible() {
        // 验证所有公共类型都可以正常使用
        let _cmd = Command::ShowText {
            content: "看，天亮了。".to_string(),
        };

        let _input = VignetteInput::Click;

        let _waiting = WaitingReason::WaitForClick;

        let runtime = VignetteRuntime::new(Story::builtin(), Viewport::new(1280.0, 720.0));
        let _view = bear_view(runtime.state());
    }
}
