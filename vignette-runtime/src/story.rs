//! # Story 模块
//!
//! 小熊饼干的全部剧本数据：旁白、派对对话图、碎片与萤火虫素材。
//!
//! ## 设计说明
//!
//! - 剧本是**数据**，不是控制流：引擎只按 `Story` 中的表推进，
//!   不在代码里硬编码任何一句台词
//! - 所有表都可序列化，便于宿主调试或替换剧本
//! - 内容合法性由 [`crate::diagnostic`] 静态检查，引擎本身不校验

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// 碎片标识符
///
/// 与剧本中 `ShardSpec::id` 一一对应，从 1 开始。
pub type ShardId = u32;

/// 选项结果：选择后剧情去向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PartyOutcome {
    /// 跳转到指定对话节点（索引从 0 开始）
    Goto { node: usize },
    /// 终结选项：安排"碎裂"转场
    Shatter,
}

/// 派对场景中的一个选项
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartyOption {
    /// 选项显示文本
    pub text: String,
    /// 尴尬值增量（饱和累加，上限 100）
    pub awkwardness: u8,
    /// 选择后的去向
    pub outcome: PartyOutcome,
}

/// 派对对话图中的一个节点
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartyNode {
    /// 主文本（小熊的内心独白或台词）
    pub text: String,
    /// 旁白回应（首个节点没有）
    pub response: Option<String>,
    /// 可选项
    pub options: Vec<PartyOption>,
}

/// 碎片素材
///
/// 位置无关的静态描述：进入黑暗阶段时由引擎赋予随机位置，
/// `target` 是修复后相对小熊中心的偏移。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShardSpec {
    /// 碎片标识符
    pub id: ShardId,
    /// 修复目标位置（小熊坐标系内的偏移）
    pub target: Vec2,
    /// 包围盒宽度
    pub width: f32,
    /// 包围盒高度
    pub height: f32,
    /// SVG 轮廓路径（以碎片中心为原点）
    pub path: String,
    /// 收集/放置时展示的肯定语
    pub affirmation: String,
}

/// 完整剧本
///
/// 六个阶段所需的全部内容表。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Story {
    /// 开场旁白（逐行打字机展示）
    pub intro_lines: Vec<String>,
    /// 派对对话图
    pub party_nodes: Vec<PartyNode>,
    /// 碎片素材表
    pub shards: Vec<ShardSpec>,
    /// 萤火虫携带的鼓励语（按索引循环分配）
    pub firefly_messages: Vec<String>,
    /// 结尾旁白
    pub ending_lines: Vec<String>,
    /// 结尾互动时随机弹出的短语
    pub interactive_messages: Vec<String>,
}

impl Story {
    /// 内置剧本：小熊饼干
    pub fn builtin() -> Self {
        Self {
            intro_lines: vec![
                "在这个喧嚣的城市里，我大概是那个最不合时宜的“小丑”。".to_string(),
                "我常常觉得自己就像一块被遗忘在精美包装袋之外的小熊饼干...".to_string(),
                "用尽全力想要在这个坚硬的世界里，保持着酥脆的口感和甜蜜的形状。".to_string(),
            ],
            party_nodes: vec![
                PartyNode {
                    text: "大家都低着头看手机，空气凝固得让人难受。我必须做点什么...".to_string(),
                    response: None,
                    options: vec![
                        PartyOption {
                            text: "清清嗓子，讲个关于保安的笑话".to_string(),
                            awkwardness: 40,
                            outcome: PartyOutcome::Goto { node: 1 },
                        },
                        PartyOption {
                            text: "保持沉默，假装也在看手机".to_string(),
                            awkwardness: 30,
                            outcome: PartyOutcome::Goto { node: 1 },
                        },
                    ],
                },
                PartyNode {
                    text: "“嘿，其实我是小区保安，我最爱吃小熊饼干。”".to_string(),
                    response: Some("只有几道冰冷的目光扫过，然后大家又低下了头。".to_string()),
                    options: vec![
                        PartyOption {
                            text: "尴尬地笑笑，解释是开玩笑".to_string(),
                            awkwardness: 30,
                            outcome: PartyOutcome::Goto { node: 2 },
                        },
                        PartyOption {
                            text: "讲那个关于“碎掉”的故事".to_string(),
                            awkwardness: 40,
                            outcome: PartyOutcome::Goto { node: 2 },
                        },
                    ],
                },
                PartyNode {
                    text: "“我也许是一块小熊饼干...我不小心摔了下来...晚安，我睡(碎)了。”".to_string(),
                    response: Some("有人嗤笑了一声：“你有病吧？”".to_string()),
                    options: vec![PartyOption {
                        text: "......".to_string(),
                        awkwardness: 100,
                        outcome: PartyOutcome::Shatter,
                    }],
                },
            ],
            shards: vec![
                // 左耳
                ShardSpec {
                    id: 1,
                    target: Vec2::new(-60.0, -70.0),
                    width: 50.0,
                    height: 50.0,
                    path: "M -25,0 A 25,25 0 1,1 25,0 A 25,25 0 1,1 -25,0 Z".to_string(),
                    affirmation: "温柔的灵魂".to_string(),
                },
                // 右耳
                ShardSpec {
                    id: 2,
                    target: Vec2::new(60.0, -70.0),
                    width: 50.0,
                    height: 50.0,
                    path: "M -25,0 A 25,25 0 1,1 25,0 A 25,25 0 1,1 -25,0 Z".to_string(),
                    affirmation: "善良的心".to_string(),
                },
                // 脸
                ShardSpec {
                    id: 3,
                    target: Vec2::new(0.0, -20.0),
                    width: 140.0,
                    height: 140.0,
                    path: "M -70,0 A 70,70 0 1,1 70,0 A 70,70 0 1,1 -70,0 Z".to_string(),
                    affirmation: "努力的勇气".to_string(),
                },
                // 身体
                ShardSpec {
                    id: 4,
                    target: Vec2::new(0.0, 70.0),
                    width: 120.0,
                    height: 80.0,
                    path: "M -50,-30 Q -60,30 -30,40 L 30,40 Q 60,30 50,-30 Z".to_string(),
                    affirmation: "坚韧的背影".to_string(),
                },
                // 左手
                ShardSpec {
                    id: 5,
                    target: Vec2::new(-60.0, 30.0),
                    width: 40.0,
                    height: 40.0,
                    path: "M -15,0 A 15,15 0 1,1 15,0 A 15,15 0 1,1 -15,0 Z".to_string(),
                    affirmation: "温暖的手".to_string(),
                },
                // 右手
                ShardSpec {
                    id: 6,
                    target: Vec2::new(60.0, 30.0),
                    width: 40.0,
                    height: 40.0,
                    path: "M -15,0 A 15,15 0 1,1 15,0 A 15,15 0 1,1 -15,0 Z".to_string(),
                    affirmation: "给予的力量".to_string(),
                },
            ],
            firefly_messages: vec![
                "没关系的".to_string(),
                "抱抱你".to_string(),
                "我在听".to_string(),
                "不怪你".to_string(),
                "休息一下".to_string(),
                "你很棒".to_string(),
                "我们都在".to_string(),
            ],
            ending_lines: vec![
                "看，天亮了。".to_string(),
                "那些曾经让你碎掉的裂痕，现在变成了身上最闪耀的金线。".to_string(),
                "我们不要感谢孤独，要感谢那个在黑暗中依然坚持寻找光亮的自己。".to_string(),
                "你没有因为世界的冰冷而让自己变坏。".to_string(),
                "因为你本质上，就是一块很好的、用料上乘的、散发着奶香的小熊饼干。".to_string(),
                "早安，全世界最勇敢、最可爱的小熊饼干。".to_string(),
            ],
            interactive_messages: vec![
                "抱抱你".to_string(),
                "你做得很好".to_string(),
                "我在呢".to_string(),
                "要开心呀".to_string(),
                "温暖".to_string(),
                "爱自己".to_string(),
                "闪闪发光".to_string(),
                "不孤单了".to_string(),
                "摸摸头".to_string(),
                "最棒的你".to_string(),
                "甜甜的".to_string(),
                "早安".to_string(),
            ],
        }
    }

    /// 按 id 查找碎片素材
    pub fn shard(&self, id: ShardId) -> Option<&ShardSpec> {
        self.shards.iter().find(|s| s.id == id)
    }

    /// 碎片总数
    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_tables() {
        let story = Story::builtin();

        assert_eq!(story.intro_lines.len(), 3);
        assert_eq!(story.party_nodes.len(), 3);
        assert_eq!(story.shards.len(), 6);
        assert_eq!(story.firefly_messages.len(), 7);
        assert_eq!(story.ending_lines.len(), 6);
        assert_eq!(story.interactive_messages.len(), 12);
    }

    #[test]
    fn test_builtin_party_graph() {
        let story = Story::builtin();

        // 首节点没有旁白回应，后续节点都有
        assert!(story.party_nodes[0].response.is_none());
        assert!(story.party_nodes[1].response.is_some());
        assert!(story.party_nodes[2].response.is_some());

        // 终结选项在最后一个节点
        let last = story.party_nodes.last().unwrap();
        assert_eq!(last.options.len(), 1);
        assert_eq!(last.options[0].outcome, PartyOutcome::Shatter);

        // 所有跳转目标都在范围内
        for node in &story.party_nodes {
            for opt in &node.options {
                if let PartyOutcome::Goto { node: target } = opt.outcome {
                    assert!(target < story.party_nodes.len());
                }
            }
        }
    }

    #[test]
    fn test_shard_lookup() {
        let story = Story::builtin();

        let shard = story.shard(3).unwrap();
        assert_eq!(shard.affirmation, "努力的勇气");
        assert_eq!(shard.width, 140.0);

        assert!(story.shard(99).is_none());
    }

    #[test]
    fn test_shard_ids_unique() {
        let story = Story::builtin();
        let mut ids: Vec<_> = story.shards.iter().map(|s| s.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), story.shards.len());
    }

    #[test]
    fn test_story_serialization() {
        let story = Story::builtin();
        let json = serde_json::to_string(&story).unwrap();
        let loaded: Story = serde_json::from_str(&json).unwrap();
        assert_eq!(story, loaded);
    }
}
