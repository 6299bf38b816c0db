//! # Fireflies 模块
//!
//! 黑暗阶段的萤火虫群：在视口内游荡、碰壁反弹的鼓励光点。
//!
//! ## 设计说明
//!
//! - 固定节拍推进：`pos += vel`，越界轴的速度取反并把位置压回视口内
//! - 被指针"捕获"的萤火虫**不会消失**，只是随机换个位置——
//!   鼓励是取之不尽的
//! - 随机性全部经由调用方传入的 RNG，便于按种子复现

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::state::Viewport;

/// 萤火虫数量
pub const FIREFLY_COUNT: usize = 8;

/// 捕获半径（像素）
pub const CAPTURE_RADIUS: f32 = 40.0;

/// 每轴初速范围：[-0.75, 0.75] 像素/帧
pub const VELOCITY_RANGE: f32 = 0.75;

/// 光照半径初始值
pub const LIGHT_RADIUS_START: f32 = 120.0;

/// 每次捕获的光照增量
pub const LIGHT_RADIUS_STEP: f32 = 20.0;

/// 光照半径上限
pub const LIGHT_RADIUS_MAX: f32 = 300.0;

/// 一只萤火虫
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Firefly {
    /// 标识符
    pub id: u32,
    /// 当前位置
    pub pos: Vec2,
    /// 当前速度（像素/帧）
    pub vel: Vec2,
    /// 携带的鼓励语
    pub message: String,
}

/// 生成一批萤火虫
///
/// 位置均匀散布在视口内，鼓励语按索引循环取自 `messages`。
/// `messages` 为空时返回空批（由诊断层提前拦截）。
pub fn spawn_swarm<R: Rng>(rng: &mut R, viewport: Viewport, messages: &[String]) -> Vec<Firefly> {
    if messages.is_empty() {
        return Vec::new();
    }

    (0..FIREFLY_COUNT)
        .map(|i| Firefly {
            id: i as u32,
            pos: viewport.random_point(rng),
            vel: Vec2::new(
                rng.random_range(-VELOCITY_RANGE..=VELOCITY_RANGE),
                rng.random_range(-VELOCITY_RANGE..=VELOCITY_RANGE),
            ),
            message: messages[i % messages.len()].clone(),
        })
        .collect()
}

/// 推进一帧：位置叠加速度，越界轴反弹
pub fn step_swarm(swarm: &mut [Firefly], viewport: Viewport) {
    for f in swarm {
        let mut next = f.pos + f.vel;
        if next.x < 0.0 || next.x > viewport.width {
            f.vel.x = -f.vel.x;
            next.x = next.x.clamp(0.0, viewport.width);
        }
        if next.y < 0.0 || next.y > viewport.height {
            f.vel.y = -f.vel.y;
            next.y = next.y.clamp(0.0, viewport.height);
        }
        f.pos = next;
    }
}

/// 把一只萤火虫搬到视口内的新随机位置
pub fn relocate<R: Rng>(f: &mut Firefly, rng: &mut R, viewport: Viewport) {
    f.pos = viewport.random_point(rng);
}

/// 判断指针是否捕获了该萤火虫
pub fn captured_by(f: &Firefly, pointer: Vec2) -> bool {
    f.pos.distance(pointer) < CAPTURE_RADIUS
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn messages() -> Vec<String> {
        vec!["没关系的".to_string(), "抱抱你".to_string()]
    }

    fn viewport() -> Viewport {
        Viewport::new(800.0, 600.0)
    }

    #[test]
    fn test_spawn_in_bounds() {
        let mut rng = Pcg32::seed_from_u64(7);
        let swarm = spawn_swarm(&mut rng, viewport(), &messages());

        assert_eq!(swarm.len(), FIREFLY_COUNT);
        for f in &swarm {
            assert!(viewport().contains(f.pos));
            assert!(f.vel.x.abs() <= VELOCITY_RANGE);
            assert!(f.vel.y.abs() <= VELOCITY_RANGE);
        }

        // 鼓励语按索引循环
        assert_eq!(swarm[0].message, "没关系的");
        assert_eq!(swarm[1].message, "抱抱你");
        assert_eq!(swarm[2].message, "没关系的");
    }

    #[test]
    fn test_step_stays_in_bounds() {
        let mut rng = Pcg32::seed_from_u64(42);
        let vp = viewport();
        let mut swarm = spawn_swarm(&mut rng, vp, &messages());

        // 长时间推进后仍全部在视口内
        for _ in 0..10_000 {
            step_swarm(&mut swarm, vp);
            for f in &swarm {
                assert!(vp.contains(f.pos), "escaped at {:?}", f.pos);
            }
        }
    }

    #[test]
    fn test_bounce_flips_velocity() {
        let vp = viewport();
        let mut swarm = vec![Firefly {
            id: 0,
            pos: Vec2::new(vp.width - 0.1, 300.0),
            vel: Vec2::new(1.0, 0.0),
            message: "你很棒".to_string(),
        }];

        step_swarm(&mut swarm, vp);
        assert_eq!(swarm[0].vel.x, -1.0);
        assert!(swarm[0].pos.x <= vp.width);
    }

    #[test]
    fn test_capture_and_relocate() {
        let mut rng = Pcg32::seed_from_u64(3);
        let vp = viewport();
        let mut f = Firefly {
            id: 0,
            pos: Vec2::new(100.0, 100.0),
            vel: Vec2::ZERO,
            message: "我在听".to_string(),
        };

        assert!(captured_by(&f, Vec2::new(110.0, 120.0)));
        assert!(!captured_by(&f, Vec2::new(100.0, 141.0)));

        relocate(&mut f, &mut rng, vp);
        assert!(vp.contains(f.pos));
    }

    #[test]
    fn test_spawn_without_messages_is_empty() {
        let mut rng = Pcg32::seed_from_u64(1);
        let swarm = spawn_swarm(&mut rng, viewport(), &[]);
        assert!(swarm.is_empty());
    }
}
