//! # 终端宿主
//!
//! 把《小熊饼干》演成一场可以在终端里玩的互动短篇。
//!
//! 宿主的职责与引擎的约定：
//! - 执行引擎发来的 [`Command`]（打印场景标题、旁白、选项、漂浮反馈）
//! - 按 [`WaitingReason`] 采集输入：回车当点击、数字当选择、
//!   定时等待用真实 sleep 实现
//! - 指针阶段（黑暗/修复）自动代打：按固定策略合成语义指针输入

use std::io::{self, Write as _};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use vignette_runtime::state::EndingStage;
use vignette_runtime::{
    Command, DEFAULT_SEED, Phase, Story, Viewport, VignetteInput, VignetteRuntime, WaitingReason,
    bear_view, ensure_playable,
};

#[derive(Parser, Debug)]
#[command(name = "biscuit", about = "小熊饼干：一场关于碎掉与重圆的互动短篇")]
struct Args {
    /// 视口宽度（像素）
    #[arg(long, default_value_t = 1280.0)]
    width: f32,

    /// 视口高度（像素）
    #[arg(long, default_value_t = 720.0)]
    height: f32,

    /// 随机种子（相同种子复现相同会话）
    #[arg(long)]
    seed: Option<u64>,

    /// 时间倍速（0 表示完全不等待，适合快速通览）
    #[arg(long, default_value_t = 1.0)]
    speed: f32,

    /// 自动通关：所有提问都取默认答案
    #[arg(long)]
    auto: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let args = Args::parse();
    let story = Story::builtin();
    ensure_playable(&story).context("内置剧本未通过静态检查")?;

    let seed = args.seed.unwrap_or(DEFAULT_SEED);
    let viewport = Viewport::new(args.width, args.height);
    let mut runtime = VignetteRuntime::with_seed(story, viewport, seed);
    info!(seed, width = args.width, height = args.height, "会话开始");

    Host::new(args).run(&mut runtime)
}

/// 终端宿主状态
struct Host {
    args: Args,
    /// 自动代打的节拍计数
    step: u64,
    /// 当前行已打印的字符数（打字机增量输出用）
    printed_chars: usize,
    /// 终卡是否已经展示
    final_card_shown: bool,
}

impl Host {
    fn new(args: Args) -> Self {
        Self {
            args,
            step: 0,
            printed_chars: 0,
            final_card_shown: false,
        }
    }

    /// 主循环：tick -> 执行指令 -> 按等待状态采集下一个输入
    fn run(&mut self, runtime: &mut VignetteRuntime) -> Result<()> {
        let mut input: Option<VignetteInput> = None;
        loop {
            let (commands, waiting) = runtime.tick(input.take())?;
            for command in &commands {
                self.execute(command, runtime);
            }
            self.print_reveal(runtime);

            let next = match waiting {
                WaitingReason::None => None,
                WaitingReason::WaitForClick => self.prompt_click()?,
                WaitingReason::WaitForChoice { choice_count } => {
                    Some(self.prompt_choice(choice_count)?)
                }
                WaitingReason::WaitForTime(duration) => {
                    self.pause(duration);
                    Some(VignetteInput::Tick)
                }
                WaitingReason::WaitForScene { tick } => {
                    self.pause(tick);
                    self.scene_input(runtime)?
                }
            };

            match next {
                Some(i) => input = Some(i),
                None => break,
            }
        }

        info!(
            lines = runtime.history().line_count(),
            encouraged = runtime.history().encouraged_count(),
            "会话结束"
        );
        Ok(())
    }

    /// 执行一条引擎指令
    fn execute(&mut self, command: &Command, runtime: &VignetteRuntime) {
        match command {
            Command::EnterScene { phase } => {
                info!(phase = phase.name(), "进入新阶段");
                self.print_scene_header(*phase, runtime);
            }
            Command::ShowText { .. } => {
                // 正文由打字机增量输出
                self.printed_chars = 0;
                print!("  ");
                flush();
            }
            Command::PresentChoices {
                prompt,
                response,
                options,
            } => {
                println!();
                if let Some(response) = response {
                    println!("  （{response}）");
                }
                println!("  {prompt}");
                for (i, option) in options.iter().enumerate() {
                    println!("    {}. {option}", i + 1);
                }
            }
            Command::SpawnFeedback { marker } => {
                println!("      {} {}", tone_icon(marker), marker.text);
                if runtime.state().phase == Phase::Repair {
                    let placed = runtime.state().shards.placed_ids().len();
                    let total = runtime.story().shard_count();
                    println!("      🧩 已归位 {placed}/{total}");
                }
            }
        }
    }

    fn print_scene_header(&mut self, phase: Phase, runtime: &VignetteRuntime) {
        self.step = 0;
        self.printed_chars = 0;
        let title = match phase {
            Phase::Intro => {
                self.final_card_shown = false;
                "—— 第一幕 · 自白 ——"
            }
            Phase::Party => "—— 第二幕 · 派对 ——",
            Phase::Shatter => "—— 晚安... ——",
            Phase::Darkness => "—— 第三幕 · 黑暗 ——",
            Phase::Repair => "—— 第四幕 · 重塑自我 ——",
            Phase::Ending => "—— 终幕 · 日出 ——",
        };
        println!("\n{title}");

        let view = bear_view(runtime.state());
        debug!(emotion = ?view.emotion, scale = view.scale, "小熊状态");

        match phase {
            Phase::Darkness => {
                println!("  在这片迷雾中找回自己...");
                println!("  寻找发光的碎片 | 触碰游荡的光点来获得力量");
            }
            Phase::Repair => {
                println!("  拖动下方的【文字碎片】到小熊身上");
            }
            _ => {}
        }
    }

    /// 把打字机新增的字符补印到终端
    fn print_reveal(&mut self, runtime: &VignetteRuntime) {
        let state = runtime.state();
        let typewriter = match state.phase {
            Phase::Intro => &state.intro.typewriter,
            Phase::Ending => &state.ending.typewriter,
            _ => return,
        };

        let revealed = typewriter.revealed_chars();
        if revealed > self.printed_chars {
            let fresh: String = typewriter
                .displayed()
                .chars()
                .skip(self.printed_chars)
                .collect();
            print!("{fresh}");
            flush();
            self.printed_chars = revealed;
            if typewriter.is_complete() {
                println!();
            }
        }
    }

    /// 活跃场景的下一个输入（指针阶段自动代打）
    fn scene_input(&mut self, runtime: &VignetteRuntime) -> Result<Option<VignetteInput>> {
        self.step += 1;
        let state = runtime.state();
        match state.phase {
            Phase::Darkness => {
                // 偶尔去碰一只游荡的光点
                if self.step % 25 == 0 {
                    if let Some(firefly) = state.darkness.fireflies.first() {
                        return Ok(Some(VignetteInput::pointer_move(
                            firefly.pos.x,
                            firefly.pos.y,
                        )));
                    }
                }
                // 稳步收集碎片
                if self.step % 8 == 0 {
                    if let Some(shard) = state.shards.loose.first() {
                        debug!(id = shard.spec.id, "收集碎片");
                        return Ok(Some(VignetteInput::pointer_down(shard.pos.x, shard.pos.y)));
                    }
                }
                Ok(Some(VignetteInput::Tick))
            }
            Phase::Repair => {
                if self.step % 8 == 0 {
                    let center = state.viewport.center();
                    if state.repair.drag.is_some() {
                        return Ok(Some(VignetteInput::pointer_up(center.x, center.y)));
                    }
                    if let Some(next) = state.shards.held.iter().find(|s| !s.placed) {
                        debug!(id = next.spec.id, "抓起碎片");
                        return Ok(Some(VignetteInput::grab(next.spec.id, center.x, 700.0)));
                    }
                }
                Ok(Some(VignetteInput::Tick))
            }
            Phase::Ending => {
                if matches!(state.ending.stage, EndingStage::FinalCard) && !self.final_card_shown {
                    self.final_card_shown = true;
                    println!("\n  晚安，小熊饼干。❤");
                    return self.prompt_restart();
                }
                Ok(Some(VignetteInput::Tick))
            }
            _ => Ok(Some(VignetteInput::Tick)),
        }
    }

    fn prompt_click(&mut self) -> Result<Option<VignetteInput>> {
        if self.args.auto {
            return Ok(Some(VignetteInput::Click));
        }
        print!("  👉 按回车继续");
        flush();
        self.read_line()?;
        println!();
        Ok(Some(VignetteInput::Click))
    }

    fn prompt_choice(&mut self, choice_count: usize) -> Result<VignetteInput> {
        if self.args.auto {
            return Ok(VignetteInput::choice(0));
        }
        loop {
            print!("  请选择 (1-{choice_count})：");
            flush();
            let line = self.read_line()?;
            if let Ok(n) = line.parse::<usize>() {
                if (1..=choice_count).contains(&n) {
                    return Ok(VignetteInput::choice(n - 1));
                }
            }
            println!("  输入 1 到 {choice_count} 之间的数字");
        }
    }

    fn prompt_restart(&mut self) -> Result<Option<VignetteInput>> {
        if self.args.auto {
            return Ok(None);
        }
        print!("  再来一次吗？(y/N)：");
        flush();
        let line = self.read_line()?;
        if line.eq_ignore_ascii_case("y") {
            Ok(Some(VignetteInput::Restart))
        } else {
            Ok(None)
        }
    }

    fn read_line(&mut self) -> Result<String> {
        let mut line = String::new();
        let n = io::stdin().read_line(&mut line).context("读取输入失败")?;
        if n == 0 {
            anyhow::bail!("输入流已关闭");
        }
        Ok(line.trim().to_string())
    }

    fn pause(&self, duration: Duration) {
        if self.args.speed > 0.0 {
            thread::sleep(duration.div_f32(self.args.speed));
        }
    }
}

fn tone_icon(marker: &vignette_runtime::FeedbackMarker) -> &'static str {
    use vignette_runtime::FeedbackTone;
    match marker.tone {
        FeedbackTone::Encourage => "✨",
        FeedbackTone::Discover => "🔆",
        FeedbackTone::Affirm => "🌟",
        FeedbackTone::Heart => "❤",
        FeedbackTone::Sparkle => "✦",
    }
}

fn flush() {
    let _ = io::stdout().flush();
}
