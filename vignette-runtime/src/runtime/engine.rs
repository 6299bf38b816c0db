//! # Engine 模块
//!
//! 小熊饼干体验的核心执行引擎。
//!
//! ## 执行模型
//!
//! ```text
//! tick(input) -> (Vec<Command>, WaitingReason)
//! ```
//!
//! 1. 处理输入：按当前等待状态解除等待或应用场景事件
//! 2. 若仍在等待，直接返回
//! 3. 否则推进：执行排定的阶段转场，或展示当前阶段的下一步
//! 4. 返回本次产生的 Command 和新的等待状态
//!
//! 引擎没有自己的时钟：`WaitForScene`/`WaitForTime` 到期由宿主回传
//! [`VignetteInput::Tick`]。因此"撤销定时器"是结构性的——新的等待
//! 状态整体替换旧的，不存在落到陈旧状态上的回调。

use std::time::Duration;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::command::Command;
use crate::error::RuntimeError;
use crate::history::{History, HistoryEvent};
use crate::input::VignetteInput;
use crate::scene::feedback::{self, FeedbackMarker, FeedbackTone};
use crate::scene::fireflies::{self, LIGHT_RADIUS_MAX, LIGHT_RADIUS_STEP};
use crate::scene::shards::{self, DragState, HeldShard};
use crate::scene::typewriter::Typewriter;
use crate::state::{EndingStage, Phase, Viewport, VignetteState, WaitingReason};
use crate::story::{PartyOutcome, ShardId, Story};

/// 默认随机种子
pub const DEFAULT_SEED: u64 = 0xB15C_011E;

/// 开场打字机节拍
pub const INTRO_TYPE_TICK: Duration = Duration::from_millis(40);

/// 结尾打字机节拍
pub const ENDING_TYPE_TICK: Duration = Duration::from_millis(50);

/// 黑暗/修复场景节拍
pub const SCENE_TICK: Duration = Duration::from_millis(30);

/// 终结选项到碎裂画面的延迟
pub const SHATTER_DELAY: Duration = Duration::from_millis(1500);

/// 碎裂画面停留时长
pub const SHATTER_HOLD: Duration = Duration::from_secs(3);

/// 收齐碎片到修复阶段的延迟
pub const REPAIR_DELAY: Duration = Duration::from_millis(1500);

/// 全部归位到结尾的延迟
pub const ENDING_DELAY: Duration = Duration::from_secs(2);

/// 结尾行间停顿
pub const ENDING_LINE_GAP: Duration = Duration::from_secs(2);

/// 收集碎片时的反馈文案
const DISCOVER_TEXT: &str = "找到了!";

/// 体验执行引擎
///
/// 这是 vignette-runtime 的核心类型，负责驱动六个阶段。
///
/// # 使用示例
///
/// ```ignore
/// let mut runtime = VignetteRuntime::new(Story::builtin(), Viewport::new(1280.0, 720.0));
///
/// loop {
///     let (commands, waiting) = runtime.tick(input)?;
///
///     // 宿主执行 commands...
///
///     // 根据 waiting 采集输入...
/// }
/// ```
pub struct VignetteRuntime {
    /// 剧本
    story: Story,
    /// 会话状态
    state: VignetteState,
    /// 历史记录
    history: History,
    /// 会话随机源（种子可复现）
    rng: Pcg32,
}

impl VignetteRuntime {
    /// 创建新的引擎实例（默认种子）
    pub fn new(story: Story, viewport: Viewport) -> Self {
        Self::with_seed(story, viewport, DEFAULT_SEED)
    }

    /// 以指定种子创建引擎实例
    ///
    /// 相同的剧本、视口、种子和输入序列会复现完全相同的会话。
    pub fn with_seed(story: Story, viewport: Viewport, seed: u64) -> Self {
        Self {
            story,
            state: VignetteState::new(seed, viewport),
            history: History::new(),
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// 核心驱动函数
    ///
    /// 根据输入推进体验，返回产生的 Command 和新的等待状态。
    pub fn tick(
        &mut self,
        input: Option<VignetteInput>,
    ) -> Result<(Vec<Command>, WaitingReason), RuntimeError> {
        let mut commands = Vec::new();

        // 1. 处理输入
        if let Some(input) = input {
            self.handle_input(input, &mut commands)?;
        }

        // 2. 如果仍在等待，直接返回
        if self.state.waiting.is_waiting() {
            return Ok((commands, self.state.waiting.clone()));
        }

        // 3. 推进到下一个等待点
        self.advance(&mut commands)?;

        Ok((commands, self.state.waiting.clone()))
    }

    /// 获取当前状态（宿主每帧读取以绘制）
    pub fn state(&self) -> &VignetteState {
        &self.state
    }

    /// 获取当前等待状态
    pub fn waiting(&self) -> &WaitingReason {
        &self.state.waiting
    }

    /// 获取剧本
    pub fn story(&self) -> &Story {
        &self.story
    }

    /// 获取历史记录
    pub fn history(&self) -> &History {
        &self.history
    }

    /// 处理输入
    fn handle_input(
        &mut self,
        input: VignetteInput,
        commands: &mut Vec<Command>,
    ) -> Result<(), RuntimeError> {
        // 与等待状态无关的输入先行处理
        match input {
            VignetteInput::Resize { width, height } => {
                self.apply_resize(width, height);
                return Ok(());
            }
            VignetteInput::Restart => {
                // 仅结尾阶段接受重开，其余阶段静默忽略
                if self.state.phase == Phase::Ending {
                    self.restart(commands)?;
                }
                return Ok(());
            }
            _ => {}
        }

        match (self.state.waiting.clone(), input) {
            // 点击（或按下）解除 WaitForClick
            (
                WaitingReason::WaitForClick,
                VignetteInput::Click | VignetteInput::PointerDown { .. },
            ) => {
                self.state.clear_wait();
                Ok(())
            }

            // 选择解除 WaitForChoice
            (
                WaitingReason::WaitForChoice { choice_count },
                VignetteInput::ChoiceSelected { index },
            ) => {
                if index >= choice_count {
                    return Err(RuntimeError::InvalidChoiceIndex {
                        index,
                        max: choice_count,
                    });
                }
                self.apply_choice(index)
            }

            // 一次性延迟到期
            (WaitingReason::WaitForTime(_), VignetteInput::Tick) => {
                self.state.clear_wait();
                Ok(())
            }

            // 延迟期间的其余输入不解除等待
            (WaitingReason::WaitForTime(_), _) => Ok(()),

            // 场景活跃：节拍与指针输入
            (WaitingReason::WaitForScene { tick }, VignetteInput::Tick) => {
                self.scene_tick(tick, commands)
            }
            (WaitingReason::WaitForScene { .. }, VignetteInput::Click) => {
                self.scene_click();
                Ok(())
            }
            (WaitingReason::WaitForScene { .. }, VignetteInput::PointerMove { x, y }) => {
                self.pointer_move(Vec2::new(x, y), commands);
                Ok(())
            }
            (WaitingReason::WaitForScene { .. }, VignetteInput::PointerDown { x, y }) => {
                self.pointer_down(Vec2::new(x, y), commands);
                Ok(())
            }
            (WaitingReason::WaitForScene { .. }, VignetteInput::PointerUp { x, y }) => {
                self.pointer_up(Vec2::new(x, y), commands);
                Ok(())
            }
            (WaitingReason::WaitForScene { .. }, VignetteInput::GrabShard { id, x, y }) => {
                self.grab_shard(id, Vec2::new(x, y));
                Ok(())
            }

            // 等待点击/选择期间的节拍与游离指针输入：无害，忽略
            (
                WaitingReason::WaitForClick,
                VignetteInput::Tick
                | VignetteInput::PointerMove { .. }
                | VignetteInput::PointerUp { .. },
            ) => Ok(()),
            (
                WaitingReason::WaitForChoice { .. },
                VignetteInput::Tick
                | VignetteInput::PointerMove { .. }
                | VignetteInput::PointerDown { .. }
                | VignetteInput::PointerUp { .. },
            ) => Ok(()),

            // 不等待时收到输入，忽略
            (WaitingReason::None, _) => Ok(()),

            // 语义矛盾
            (waiting, input) => Err(RuntimeError::StateMismatch {
                expected: format!("{:?}", waiting),
                actual: format!("{:?}", input),
            }),
        }
    }

    /// 推进到下一个等待点
    fn advance(&mut self, commands: &mut Vec<Command>) -> Result<(), RuntimeError> {
        // 首次进场
        if !self.state.started {
            self.state.started = true;
            return self.enter_intro(commands);
        }

        // 排定的阶段转场
        if let Some(next) = self.state.pending.take() {
            return match next {
                Phase::Shatter => self.enter_shatter(commands),
                Phase::Darkness => self.enter_darkness(commands),
                Phase::Repair => self.enter_repair(commands),
                Phase::Ending => self.enter_ending(commands),
                other => Err(RuntimeError::InvalidState {
                    message: format!("阶段 {} 不能作为排定转场的目标", other.name()),
                }),
            };
        }

        match self.state.phase {
            Phase::Intro => self.intro_advance(commands),
            Phase::Party => self.present_party_node(commands),
            other => Err(RuntimeError::InvalidState {
                message: format!("阶段 {} 不应出现空等待", other.name()),
            }),
        }
    }

    // ── 开场 ──────────────────────────────────────────────

    fn enter_intro(&mut self, commands: &mut Vec<Command>) -> Result<(), RuntimeError> {
        self.state.phase = Phase::Intro;
        self.state.intro.line_index = 0;
        commands.push(Command::EnterScene {
            phase: Phase::Intro,
        });
        self.start_intro_line(commands)
    }

    /// 开场旁白：点击推进，读完最后一行进派对
    fn intro_advance(&mut self, commands: &mut Vec<Command>) -> Result<(), RuntimeError> {
        let next = self.state.intro.line_index + 1;
        if next < self.story.intro_lines.len() {
            self.state.intro.line_index = next;
            self.start_intro_line(commands)
        } else {
            self.enter_party(commands)
        }
    }

    fn start_intro_line(&mut self, commands: &mut Vec<Command>) -> Result<(), RuntimeError> {
        let line = self
            .story
            .intro_lines
            .get(self.state.intro.line_index)
            .cloned()
            .ok_or_else(|| RuntimeError::InvalidState {
                message: format!("开场旁白缺少第 {} 行", self.state.intro.line_index),
            })?;

        self.state.intro.typewriter = Typewriter::new(&line);
        self.history.push(HistoryEvent::line_shown(line.clone()));
        commands.push(Command::ShowText { content: line });

        // 空行没有可显示的字符，直接等待点击
        if self.state.intro.typewriter.is_complete() {
            let _ = self.state.intro.typewriter.skip();
            self.state.wait(WaitingReason::click());
        } else {
            self.state.wait(WaitingReason::scene(INTRO_TYPE_TICK));
        }
        Ok(())
    }

    // ── 派对 ──────────────────────────────────────────────

    fn enter_party(&mut self, commands: &mut Vec<Command>) -> Result<(), RuntimeError> {
        self.state.phase = Phase::Party;
        self.state.party.node_index = 0;
        self.state.party.awkwardness = 0;
        commands.push(Command::EnterScene {
            phase: Phase::Party,
        });
        self.present_party_node(commands)
    }

    fn present_party_node(&mut self, commands: &mut Vec<Command>) -> Result<(), RuntimeError> {
        let node = self
            .story
            .party_nodes
            .get(self.state.party.node_index)
            .ok_or_else(|| RuntimeError::InvalidState {
                message: format!("对话图缺少节点 {}", self.state.party.node_index),
            })?;

        commands.push(Command::PresentChoices {
            prompt: node.text.clone(),
            response: node.response.clone(),
            options: node.options.iter().map(|o| o.text.clone()).collect(),
        });
        self.state.wait(WaitingReason::choice(node.options.len()));
        Ok(())
    }

    fn apply_choice(&mut self, index: usize) -> Result<(), RuntimeError> {
        let node = self
            .story
            .party_nodes
            .get(self.state.party.node_index)
            .ok_or_else(|| RuntimeError::InvalidState {
                message: format!("对话图缺少节点 {}", self.state.party.node_index),
            })?;
        let option = node
            .options
            .get(index)
            .ok_or(RuntimeError::InvalidChoiceIndex {
                index,
                max: node.options.len(),
            })?;

        self.history.push(HistoryEvent::choice_made(
            node.options.iter().map(|o| o.text.clone()).collect(),
            index,
        ));

        // 尴尬值饱和累加，上限 100
        let awkwardness = option.awkwardness;
        let outcome = option.outcome;
        self.state.party.awkwardness = self
            .state
            .party
            .awkwardness
            .saturating_add(awkwardness)
            .min(100);

        match outcome {
            PartyOutcome::Goto { node } => {
                self.state.party.node_index = node;
                self.state.clear_wait(); // advance() 会展示新节点
            }
            PartyOutcome::Shatter => {
                self.state.pending = Some(Phase::Shatter);
                self.state.wait(WaitingReason::time(SHATTER_DELAY));
            }
        }
        Ok(())
    }

    // ── 碎裂 ──────────────────────────────────────────────

    fn enter_shatter(&mut self, commands: &mut Vec<Command>) -> Result<(), RuntimeError> {
        self.state.phase = Phase::Shatter;
        self.history.push(HistoryEvent::shattered());
        commands.push(Command::EnterScene {
            phase: Phase::Shatter,
        });
        self.state.pending = Some(Phase::Darkness);
        self.state.wait(WaitingReason::time(SHATTER_HOLD));
        Ok(())
    }

    // ── 黑暗 ──────────────────────────────────────────────

    fn enter_darkness(&mut self, commands: &mut Vec<Command>) -> Result<(), RuntimeError> {
        let viewport = self.state.viewport;
        self.state.phase = Phase::Darkness;

        // 批次全新初始化：散落碎片、萤火虫、光照
        self.state.shards.loose = shards::scatter(&mut self.rng, viewport, &self.story.shards);
        self.state.shards.held.clear();
        self.state.darkness.fireflies =
            fireflies::spawn_swarm(&mut self.rng, viewport, &self.story.firefly_messages);
        self.state.darkness.light_radius = fireflies::LIGHT_RADIUS_START;
        self.state.darkness.pointer = viewport.center();

        commands.push(Command::EnterScene {
            phase: Phase::Darkness,
        });
        self.state.wait(WaitingReason::scene(SCENE_TICK));
        Ok(())
    }

    fn collect_shard_at(&mut self, p: Vec2, commands: &mut Vec<Command>) {
        let Some(index) = self.state.shards.loose.iter().position(|s| s.hit(p)) else {
            return;
        };

        let loose = self.state.shards.loose.remove(index);
        let pos = loose.pos;
        self.history.push(HistoryEvent::shard_collected(loose.spec.id));
        self.state.shards.held.push(HeldShard {
            spec: loose.spec,
            placed: false,
        });
        self.spawn_marker(pos, DISCOVER_TEXT, FeedbackTone::Discover, commands);

        // 收齐即排定进入修复
        if self.state.shards.held_count() == self.story.shard_count() {
            self.state.pending = Some(Phase::Repair);
            self.state.wait(WaitingReason::time(REPAIR_DELAY));
        }
    }

    fn capture_fireflies(&mut self, pointer: Vec2, commands: &mut Vec<Command>) {
        let viewport = self.state.viewport;
        let captured: Vec<usize> = self
            .state
            .darkness
            .fireflies
            .iter()
            .enumerate()
            .filter(|(_, f)| fireflies::captured_by(f, pointer))
            .map(|(i, _)| i)
            .collect();

        for index in captured {
            let message = self.state.darkness.fireflies[index].message.clone();
            fireflies::relocate(
                &mut self.state.darkness.fireflies[index],
                &mut self.rng,
                viewport,
            );
            self.state.darkness.light_radius =
                (self.state.darkness.light_radius + LIGHT_RADIUS_STEP).min(LIGHT_RADIUS_MAX);
            self.history.push(HistoryEvent::encouraged(message.clone()));
            self.spawn_marker(
                pointer - Vec2::new(0.0, 40.0),
                message,
                FeedbackTone::Encourage,
                commands,
            );
        }
    }

    // ── 修复 ──────────────────────────────────────────────

    fn enter_repair(&mut self, commands: &mut Vec<Command>) -> Result<(), RuntimeError> {
        self.state.phase = Phase::Repair;
        // 批次全新初始化：归位标记与拖拽状态清零
        for held in &mut self.state.shards.held {
            held.placed = false;
        }
        self.state.repair = Default::default();
        commands.push(Command::EnterScene {
            phase: Phase::Repair,
        });
        self.state.wait(WaitingReason::scene(SCENE_TICK));
        Ok(())
    }

    fn grab_shard(&mut self, id: ShardId, p: Vec2) {
        if self.state.phase != Phase::Repair {
            return;
        }
        // 状态守卫：只有已收集、未归位的碎片可以被抓起
        let grabbable = self
            .state
            .shards
            .held
            .iter()
            .any(|s| s.spec.id == id && !s.placed);
        if grabbable {
            self.state.repair.drag = Some(DragState { shard_id: id, pos: p });
        }
    }

    fn pointer_up(&mut self, p: Vec2, commands: &mut Vec<Command>) {
        if self.state.phase != Phase::Repair {
            return;
        }
        let Some(drag) = self.state.repair.drag.take() else {
            return;
        };

        // 落点在命中区域外：静默无效，拖拽已清除
        if !shards::drop_hits_bear(self.state.viewport, p) {
            return;
        }

        let Some(index) = self
            .state
            .shards
            .held
            .iter()
            .position(|s| s.spec.id == drag.shard_id && !s.placed)
        else {
            return;
        };

        self.state.shards.held[index].placed = true;
        let affirmation = self.state.shards.held[index].spec.affirmation.clone();
        let center = shards::bear_region(self.state.viewport).center();
        self.history.push(HistoryEvent::shard_placed(drag.shard_id));
        self.spawn_marker(
            center - Vec2::new(0.0, 50.0),
            format!("✨ {}", affirmation),
            FeedbackTone::Affirm,
            commands,
        );

        // 全部归位即排定进入结尾
        if self.state.shards.all_placed() {
            self.state.repair.healing = true;
            self.state.pending = Some(Phase::Ending);
            self.state.wait(WaitingReason::time(ENDING_DELAY));
        }
    }

    // ── 结尾 ──────────────────────────────────────────────

    fn enter_ending(&mut self, commands: &mut Vec<Command>) -> Result<(), RuntimeError> {
        self.state.phase = Phase::Ending;
        self.state.ending.line_index = 0;
        commands.push(Command::EnterScene {
            phase: Phase::Ending,
        });
        self.start_ending_line(commands)
    }

    fn start_ending_line(&mut self, commands: &mut Vec<Command>) -> Result<(), RuntimeError> {
        let line = self
            .story
            .ending_lines
            .get(self.state.ending.line_index)
            .cloned()
            .ok_or_else(|| RuntimeError::InvalidState {
                message: format!("结尾旁白缺少第 {} 行", self.state.ending.line_index),
            })?;

        self.state.ending.typewriter = Typewriter::new(&line);
        self.state.ending.stage = EndingStage::Revealing;
        self.history.push(HistoryEvent::line_shown(line.clone()));
        commands.push(Command::ShowText { content: line });
        self.state.wait(WaitingReason::scene(ENDING_TYPE_TICK));
        Ok(())
    }

    fn ending_tick(
        &mut self,
        tick: Duration,
        commands: &mut Vec<Command>,
    ) -> Result<(), RuntimeError> {
        match self.state.ending.stage.clone() {
            EndingStage::Revealing => {
                if self.state.ending.typewriter.tick() {
                    self.state.ending.stage = EndingStage::LineGap {
                        remaining: ENDING_LINE_GAP,
                    };
                }
                Ok(())
            }
            EndingStage::LineGap { remaining } => {
                let remaining = remaining.saturating_sub(tick);
                if !remaining.is_zero() {
                    self.state.ending.stage = EndingStage::LineGap { remaining };
                    return Ok(());
                }
                let next = self.state.ending.line_index + 1;
                if next < self.story.ending_lines.len() {
                    self.state.ending.line_index = next;
                    self.start_ending_line(commands)
                } else {
                    self.state.ending.stage = EndingStage::FinalCard;
                    Ok(())
                }
            }
            EndingStage::FinalCard => Ok(()),
        }
    }

    fn spawn_ending_particle(&mut self, p: Vec2, commands: &mut Vec<Command>) {
        if self.story.interactive_messages.is_empty() {
            return;
        }
        let index = self.rng.random_range(0..self.story.interactive_messages.len());
        let message = self.story.interactive_messages[index].clone();
        let tone = if self.rng.random_bool(0.5) {
            FeedbackTone::Heart
        } else {
            FeedbackTone::Sparkle
        };
        self.spawn_marker(p, message, tone, commands);
    }

    // ── 场景事件分发 ──────────────────────────────────────

    fn scene_tick(
        &mut self,
        tick: Duration,
        commands: &mut Vec<Command>,
    ) -> Result<(), RuntimeError> {
        match self.state.phase {
            Phase::Intro => {
                if self.state.intro.typewriter.tick() {
                    self.state.wait(WaitingReason::click());
                }
                Ok(())
            }
            Phase::Darkness => {
                fireflies::step_swarm(&mut self.state.darkness.fireflies, self.state.viewport);
                feedback::advance_markers(&mut self.state.markers, tick);
                Ok(())
            }
            Phase::Repair => {
                feedback::advance_markers(&mut self.state.markers, tick);
                Ok(())
            }
            Phase::Ending => {
                feedback::advance_markers(&mut self.state.markers, tick);
                self.ending_tick(tick, commands)
            }
            _ => Ok(()),
        }
    }

    fn scene_click(&mut self) {
        // 开场阶段点击文本可跳过打字机
        if self.state.phase == Phase::Intro && self.state.intro.typewriter.skip() {
            self.state.wait(WaitingReason::click());
        }
    }

    fn pointer_move(&mut self, p: Vec2, commands: &mut Vec<Command>) {
        match self.state.phase {
            Phase::Darkness => {
                self.state.darkness.pointer = p;
                self.capture_fireflies(p, commands);
            }
            Phase::Repair => {
                if let Some(drag) = &mut self.state.repair.drag {
                    drag.pos = p;
                }
            }
            _ => {}
        }
    }

    fn pointer_down(&mut self, p: Vec2, commands: &mut Vec<Command>) {
        match self.state.phase {
            Phase::Intro => self.scene_click(),
            Phase::Darkness => {
                self.state.darkness.pointer = p;
                self.collect_shard_at(p, commands);
            }
            Phase::Ending => {
                self.spawn_ending_particle(p, commands);
                // 逐字显示中，按下同时跳过当前行
                if matches!(self.state.ending.stage, EndingStage::Revealing)
                    && self.state.ending.typewriter.skip()
                {
                    self.state.ending.stage = EndingStage::LineGap {
                        remaining: ENDING_LINE_GAP,
                    };
                }
            }
            _ => {}
        }
    }

    // ── 全局输入 ──────────────────────────────────────────

    fn apply_resize(&mut self, width: f32, height: f32) {
        let viewport = Viewport::new(width.max(1.0), height.max(1.0));
        self.state.viewport = viewport;
        for f in &mut self.state.darkness.fireflies {
            f.pos = viewport.clamp(f.pos);
        }
        for s in &mut self.state.shards.loose {
            s.pos = viewport.clamp(s.pos);
        }
        self.state.darkness.pointer = viewport.clamp(self.state.darkness.pointer);
    }

    fn restart(&mut self, commands: &mut Vec<Command>) -> Result<(), RuntimeError> {
        self.state = VignetteState::new(self.state.seed, self.state.viewport);
        self.state.started = true;
        self.history.push(HistoryEvent::restarted());
        self.enter_intro(commands)
    }

    fn spawn_marker(
        &mut self,
        pos: Vec2,
        text: impl Into<String>,
        tone: FeedbackTone,
        commands: &mut Vec<Command>,
    ) {
        let id = self.state.alloc_marker_id();
        let marker = FeedbackMarker::new(id, pos, text, tone);
        self.state.markers.push(marker.clone());
        commands.push(Command::SpawnFeedback { marker });
    }
}
