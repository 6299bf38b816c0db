//! # Scene 模块
//!
//! 各阶段的纯逻辑件：打字机、萤火虫群、碎片、漂浮反馈。
//! 引擎（[`crate::runtime`]）负责编排，这里只提供可独立测试的机制。

pub mod feedback;
pub mod fireflies;
pub mod shards;
pub mod typewriter;

pub use feedback::{FeedbackMarker, FeedbackTone, MARKER_TTL, advance_markers};
pub use fireflies::{
    CAPTURE_RADIUS, FIREFLY_COUNT, Firefly, LIGHT_RADIUS_MAX, LIGHT_RADIUS_START,
    LIGHT_RADIUS_STEP, captured_by, relocate, spawn_swarm, step_swarm,
};
pub use shards::{
    DROP_MARGIN, DragState, HeldShard, LooseShard, Rect, bear_region, drop_hits_bear, scatter,
};
pub use typewriter::Typewriter;
