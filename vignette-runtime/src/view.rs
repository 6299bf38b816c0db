//! # View 模块
//!
//! 渲染协作方的参数快照。
//!
//! 小熊插画对引擎而言是不透明的显示面：引擎只产出
//! `{情绪标签, 缩放, 已归位部件, 高亮部件}` 四元组，
//! 由宿主的纯渲染函数消费，不回流任何行为。

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::state::{Phase, VignetteState};
use crate::story::ShardId;

/// 派对阶段从"紧张"切换到"开裂"的尴尬值阈值
pub const CRACKED_THRESHOLD: u8 = 50;

/// 小熊情绪标签
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BearEmotion {
    /// 开心（开场）
    Happy,
    /// 紧张（派对前半）
    Nervous,
    /// 开裂（派对后半）
    Cracked,
    /// 碎裂（黑暗/修复）
    Shattered,
    /// 愈合（修复完成/结尾）
    Healed,
}

impl BearEmotion {
    /// 从字符串解析情绪（便捷方法）
    pub fn parse(s: &str) -> Option<Self> {
        Self::from_str(s).ok()
    }
}

impl FromStr for BearEmotion {
    type Err = ();

    /// 从字符串解析情绪（不区分大小写）
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "happy" => Ok(Self::Happy),
            "nervous" => Ok(Self::Nervous),
            "cracked" => Ok(Self::Cracked),
            "shattered" => Ok(Self::Shattered),
            "healed" => Ok(Self::Healed),
            _ => Err(()),
        }
    }
}

/// 小熊渲染参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BearView {
    /// 情绪标签
    pub emotion: BearEmotion,
    /// 缩放
    pub scale: f32,
    /// 已归位的部件 id（修复阶段逐块点亮）
    pub fixed_parts: Vec<ShardId>,
    /// 正在拖拽、应高亮的部件 id
    pub highlight: Option<ShardId>,
}

/// 由当前状态推导小熊渲染参数（纯函数）
pub fn bear_view(state: &VignetteState) -> BearView {
    match state.phase {
        Phase::Intro => BearView {
            emotion: BearEmotion::Happy,
            scale: 0.8,
            fixed_parts: Vec::new(),
            highlight: None,
        },
        Phase::Party => BearView {
            emotion: if state.party.awkwardness > CRACKED_THRESHOLD {
                BearEmotion::Cracked
            } else {
                BearEmotion::Nervous
            },
            scale: 1.0,
            fixed_parts: Vec::new(),
            highlight: None,
        },
        Phase::Shatter | Phase::Darkness => BearView {
            emotion: BearEmotion::Shattered,
            scale: 1.0,
            fixed_parts: Vec::new(),
            highlight: None,
        },
        Phase::Repair => BearView {
            emotion: if state.repair.healing {
                BearEmotion::Healed
            } else {
                BearEmotion::Shattered
            },
            scale: 1.2,
            fixed_parts: state.shards.placed_ids(),
            highlight: state.repair.drag.map(|d| d.shard_id),
        },
        Phase::Ending => BearView {
            emotion: BearEmotion::Healed,
            scale: 1.2,
            fixed_parts: Vec::new(),
            highlight: None,
        },
    }
}
