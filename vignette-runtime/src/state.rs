//! # State 模块
//!
//! 运行时状态与等待模型。
//!
//! ## 设计原则
//!
//! - 所有状态必须**显式建模**，不允许隐式全局状态
//! - 所有状态必须**可序列化**（宿主可随时导出检视）
//! - 每次进入黑暗/修复阶段都重新初始化对应批次，阶段之间不携带陈旧状态

use serde::{Deserialize, Serialize};
use std::time::Duration;

use glam::Vec2;
use rand::Rng;

use crate::scene::feedback::FeedbackMarker;
use crate::scene::fireflies::{Firefly, LIGHT_RADIUS_START};
use crate::scene::shards::{DragState, HeldShard, LooseShard};
use crate::scene::typewriter::Typewriter;

/// 体验阶段
///
/// 同一时刻恰有一个阶段处于激活状态。流转单向：
///
/// ```text
/// Intro -> Party -> Shatter -> Darkness -> Repair -> Ending
///   ^                                                  |
///   └────────────────── Restart ──────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// 开场旁白
    Intro,
    /// 派对：尴尬的对话
    Party,
    /// 碎裂转场
    Shatter,
    /// 黑暗：收集碎片
    Darkness,
    /// 修复：拖拽归位
    Repair,
    /// 日出结尾
    Ending,
}

impl Phase {
    /// 阶段名（用于日志）
    pub fn name(&self) -> &'static str {
        match self {
            Self::Intro => "intro",
            Self::Party => "party",
            Self::Shatter => "shatter",
            Self::Darkness => "darkness",
            Self::Repair => "repair",
            Self::Ending => "ending",
        }
    }
}

/// 等待原因
///
/// 引擎在每次 tick 后进入等待状态，宿主据此决定采集什么输入。
///
/// # 状态转换
///
/// ```text
/// None          -> 继续推进，不等待（仅在内部出现）
/// WaitForClick  -> 等待用户点击，收到 Click 后继续
/// WaitForChoice -> 等待用户选择，收到 ChoiceSelected 后继续
/// WaitForTime   -> 宿主等待指定时长后回传 Tick，引擎执行排定的转场
/// WaitForScene  -> 场景活跃：宿主按 tick 间隔回传 Tick，并随时转发指针输入
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WaitingReason {
    /// 不等待，继续推进
    None,

    /// 等待用户点击
    WaitForClick,

    /// 等待用户选择
    ///
    /// `choice_count` 记录选项数量，用于验证输入合法性
    WaitForChoice { choice_count: usize },

    /// 等待指定时长（一次性延迟，例如阶段转场）
    WaitForTime(Duration),

    /// 场景活跃：按 `tick` 间隔重复回传 Tick，指针输入随到随转
    WaitForScene { tick: Duration },
}

impl WaitingReason {
    /// 是否处于等待状态
    pub fn is_waiting(&self) -> bool {
        !matches!(self, Self::None)
    }

    /// 创建等待点击状态
    pub fn click() -> Self {
        Self::WaitForClick
    }

    /// 创建等待选择状态
    pub fn choice(count: usize) -> Self {
        Self::WaitForChoice {
            choice_count: count,
        }
    }

    /// 创建等待时间状态
    pub fn time(duration: Duration) -> Self {
        Self::WaitForTime(duration)
    }

    /// 创建场景活跃状态
    pub fn scene(tick: Duration) -> Self {
        Self::WaitForScene { tick }
    }
}

impl Default for WaitingReason {
    fn default() -> Self {
        Self::None
    }
}

/// 视口边界
///
/// 所有随机散布与反弹都以此为界。宿主可通过
/// [`crate::input::VignetteInput::Resize`] 更新。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// 视口中心
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }

    /// 点是否在视口内（闭区间）
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= 0.0 && p.x <= self.width && p.y >= 0.0 && p.y <= self.height
    }

    /// 把点压回视口内
    pub fn clamp(&self, p: Vec2) -> Vec2 {
        Vec2::new(p.x.clamp(0.0, self.width), p.y.clamp(0.0, self.height))
    }

    /// 视口内的随机点
    pub fn random_point<R: Rng>(&self, rng: &mut R) -> Vec2 {
        Vec2::new(
            rng.random_range(0.0..=self.width),
            rng.random_range(0.0..=self.height),
        )
    }
}

/// 开场阶段状态
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntroState {
    /// 当前行索引
    pub line_index: usize,
    /// 当前行的打字机
    pub typewriter: Typewriter,
}

/// 派对阶段状态
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartyState {
    /// 当前对话节点索引
    pub node_index: usize,
    /// 尴尬值（0..=100）
    pub awkwardness: u8,
}

/// 黑暗阶段状态
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DarknessState {
    /// 萤火虫群
    pub fireflies: Vec<Firefly>,
    /// 手电（指针）位置
    pub pointer: Vec2,
    /// 共享光照半径
    pub light_radius: f32,
}

/// 碎片集合：黑暗阶段收集，修复阶段归位
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShardsState {
    /// 仍散落在黑暗中的碎片
    pub loose: Vec<LooseShard>,
    /// 已收集的碎片（含归位标记）
    pub held: Vec<HeldShard>,
}

impl ShardsState {
    /// 已收集数量
    pub fn held_count(&self) -> usize {
        self.held.len()
    }

    /// 是否全部归位（空集不算）
    pub fn all_placed(&self) -> bool {
        !self.held.is_empty() && self.held.iter().all(|s| s.placed)
    }

    /// 已归位碎片的 id 列表
    pub fn placed_ids(&self) -> Vec<crate::story::ShardId> {
        self.held
            .iter()
            .filter(|s| s.placed)
            .map(|s| s.spec.id)
            .collect()
    }
}

/// 修复阶段状态
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RepairState {
    /// 当前拖拽（None 表示没有活跃拖拽）
    pub drag: Option<DragState>,
    /// 全部归位后进入"愈合中"展示
    pub healing: bool,
}

/// 结尾阶段的推进位置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EndingStage {
    /// 当前行逐字显示中
    Revealing,
    /// 行间停顿
    LineGap { remaining: Duration },
    /// 终卡：展示重开入口
    FinalCard,
}

/// 结尾阶段状态
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndingState {
    /// 当前行索引
    pub line_index: usize,
    /// 当前行的打字机
    pub typewriter: Typewriter,
    /// 推进位置
    pub stage: EndingStage,
}

/// 会话状态
///
/// 这是引擎的**唯一可变状态**，包含当前阶段与全部阶段局部数据。
/// 重开（Restart）用一份全新状态整体替换。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VignetteState {
    /// 构造时的随机种子（仅记录，便于复现）
    pub seed: u64,
    /// 当前阶段
    pub phase: Phase,
    /// 视口
    pub viewport: Viewport,
    /// 当前等待状态
    pub waiting: WaitingReason,
    /// 排定的下一个阶段（随 `WaitForTime` 一起生效）
    pub pending: Option<Phase>,
    /// 是否已执行过首次进场
    pub started: bool,
    /// 漂浮标记 id 分配器
    pub next_marker_id: u64,
    /// 活跃的漂浮标记
    pub markers: Vec<FeedbackMarker>,
    /// 开场状态
    pub intro: IntroState,
    /// 派对状态
    pub party: PartyState,
    /// 黑暗状态
    pub darkness: DarknessState,
    /// 碎片集合
    pub shards: ShardsState,
    /// 修复状态
    pub repair: RepairState,
    /// 结尾状态
    pub ending: EndingState,
}

impl VignetteState {
    /// 创建全新会话状态
    pub fn new(seed: u64, viewport: Viewport) -> Self {
        Self {
            seed,
            phase: Phase::Intro,
            viewport,
            waiting: WaitingReason::None,
            pending: None,
            started: false,
            next_marker_id: 0,
            markers: Vec::new(),
            intro: IntroState {
                line_index: 0,
                typewriter: Typewriter::new(""),
            },
            party: PartyState {
                node_index: 0,
                awkwardness: 0,
            },
            darkness: DarknessState {
                fireflies: Vec::new(),
                pointer: viewport.center(),
                light_radius: LIGHT_RADIUS_START,
            },
            shards: ShardsState::default(),
            repair: RepairState::default(),
            ending: EndingState {
                line_index: 0,
                typewriter: Typewriter::new(""),
                stage: EndingStage::Revealing,
            },
        }
    }

    /// 分配下一个漂浮标记 id
    pub fn alloc_marker_id(&mut self) -> u64 {
        let id = self.next_marker_id;
        self.next_marker_id += 1;
        id
    }

    /// 进入等待状态
    pub fn wait(&mut self, reason: WaitingReason) {
        self.waiting = reason;
    }

    /// 清除等待状态
    pub fn clear_wait(&mut self) {
        self.waiting = WaitingReason::None;
    }
}
