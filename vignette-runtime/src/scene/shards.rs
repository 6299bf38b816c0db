//! # Shards 模块
//!
//! 碎片的两段生命周期：黑暗阶段散落待收集，修复阶段拖拽归位。
//!
//! ## 设计说明
//!
//! - 散落位置随机但不做重叠检查（素材各自发光，重叠无碍）
//! - 收集是**直接命中**：指针落点在碎片包围盒内即收集，与光照无关
//! - 修复目标是**单一共享区域**（小熊的外接矩形外扩一圈），
//!   不按碎片区分落点——放得够近就算归位

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::state::Viewport;
use crate::story::{ShardId, ShardSpec};

/// 散落时距视口左右边缘的留白
pub const SCATTER_MARGIN_X: f32 = 50.0;

/// 散落时距视口上下边缘的留白
pub const SCATTER_MARGIN_Y: f32 = 100.0;

/// 小熊命中区域宽度
pub const BEAR_REGION_WIDTH: f32 = 300.0;

/// 小熊命中区域高度
pub const BEAR_REGION_HEIGHT: f32 = 360.0;

/// 落点判定时命中区域向四周外扩的余量
pub const DROP_MARGIN: f32 = 60.0;

/// 轴对齐矩形
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    /// 由中心和尺寸构造
    pub fn centered(center: Vec2, width: f32, height: f32) -> Self {
        let half = Vec2::new(width / 2.0, height / 2.0);
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// 向四周外扩 `margin`
    pub fn expand(self, margin: f32) -> Self {
        Self {
            min: self.min - Vec2::splat(margin),
            max: self.max + Vec2::splat(margin),
        }
    }

    /// 点是否落在矩形内（闭区间）
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    /// 矩形中心
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) / 2.0
    }
}

/// 散落在黑暗中、尚未收集的碎片
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LooseShard {
    /// 素材（含 id、轮廓、肯定语）
    pub spec: ShardSpec,
    /// 当前位置（视口坐标）
    pub pos: Vec2,
    /// 随机旋转角（度）
    pub rotation: f32,
}

impl LooseShard {
    /// 指针落点是否命中该碎片
    pub fn hit(&self, p: Vec2) -> bool {
        Rect::centered(self.pos, self.spec.width, self.spec.height).contains(p)
    }
}

/// 已收集、待（或已）归位的碎片
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeldShard {
    /// 素材
    pub spec: ShardSpec,
    /// 是否已归位
    pub placed: bool,
}

/// 正在拖拽的碎片
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DragState {
    /// 被拖拽的碎片
    pub shard_id: ShardId,
    /// 指针当前位置
    pub pos: Vec2,
}

/// 把素材表散落到视口内
pub fn scatter<R: Rng>(rng: &mut R, viewport: Viewport, specs: &[ShardSpec]) -> Vec<LooseShard> {
    specs
        .iter()
        .map(|spec| LooseShard {
            spec: spec.clone(),
            pos: Vec2::new(
                random_in_band(rng, SCATTER_MARGIN_X, viewport.width),
                random_in_band(rng, SCATTER_MARGIN_Y, viewport.height),
            ),
            rotation: rng.random_range(0.0..360.0),
        })
        .collect()
}

/// 小熊的命中区域（视口居中）
pub fn bear_region(viewport: Viewport) -> Rect {
    Rect::centered(viewport.center(), BEAR_REGION_WIDTH, BEAR_REGION_HEIGHT)
}

/// 落点是否算作成功归位
pub fn drop_hits_bear(viewport: Viewport, p: Vec2) -> bool {
    bear_region(viewport).expand(DROP_MARGIN).contains(p)
}

/// 在 [margin, extent - margin] 内取随机值；视口太小时退化为中线
fn random_in_band<R: Rng>(rng: &mut R, margin: f32, extent: f32) -> f32 {
    let lo = margin;
    let hi = extent - margin;
    if hi > lo {
        rng.random_range(lo..hi)
    } else {
        extent / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::story::Story;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn viewport() -> Viewport {
        Viewport::new(1280.0, 720.0)
    }

    #[test]
    fn test_scatter_in_band() {
        let mut rng = Pcg32::seed_from_u64(9);
        let story = Story::builtin();
        let loose = scatter(&mut rng, viewport(), &story.shards);

        assert_eq!(loose.len(), 6);
        for s in &loose {
            assert!(s.pos.x >= SCATTER_MARGIN_X && s.pos.x <= 1280.0 - SCATTER_MARGIN_X);
            assert!(s.pos.y >= SCATTER_MARGIN_Y && s.pos.y <= 720.0 - SCATTER_MARGIN_Y);
            assert!((0.0..360.0).contains(&s.rotation));
        }
    }

    #[test]
    fn test_scatter_tiny_viewport_degrades_to_center() {
        let mut rng = Pcg32::seed_from_u64(9);
        let story = Story::builtin();
        let vp = Viewport::new(80.0, 120.0);
        let loose = scatter(&mut rng, vp, &story.shards);

        for s in &loose {
            assert_eq!(s.pos.x, 40.0);
            assert_eq!(s.pos.y, 60.0);
        }
    }

    #[test]
    fn test_loose_shard_hit() {
        let story = Story::builtin();
        let shard = LooseShard {
            spec: story.shards[0].clone(), // 50x50
            pos: Vec2::new(200.0, 200.0),
            rotation: 0.0,
        };

        assert!(shard.hit(Vec2::new(200.0, 200.0)));
        assert!(shard.hit(Vec2::new(224.0, 176.0)));
        assert!(!shard.hit(Vec2::new(226.0, 200.0)));
        assert!(!shard.hit(Vec2::new(200.0, 260.0)));
    }

    #[test]
    fn test_rect_expand_contains() {
        let r = Rect::centered(Vec2::new(0.0, 0.0), 100.0, 100.0);
        assert!(r.contains(Vec2::new(50.0, -50.0)));
        assert!(!r.contains(Vec2::new(51.0, 0.0)));

        let e = r.expand(10.0);
        assert!(e.contains(Vec2::new(60.0, 0.0)));
        assert!(!e.contains(Vec2::new(61.0, 0.0)));
        assert_eq!(e.center(), r.center());
    }

    #[test]
    fn test_drop_region_geometry() {
        let vp = viewport();
        let center = vp.center();

        // 区域中心必中
        assert!(drop_hits_bear(vp, center));

        // 外扩边缘内侧命中、外侧不命中
        let edge_x = center.x + BEAR_REGION_WIDTH / 2.0 + DROP_MARGIN;
        assert!(drop_hits_bear(vp, Vec2::new(edge_x, center.y)));
        assert!(!drop_hits_bear(vp, Vec2::new(edge_x + 1.0, center.y)));

        let edge_y = center.y - BEAR_REGION_HEIGHT / 2.0 - DROP_MARGIN;
        assert!(drop_hits_bear(vp, Vec2::new(center.x, edge_y)));
        assert!(!drop_hits_bear(vp, Vec2::new(center.x, edge_y - 1.0)));
    }
}
