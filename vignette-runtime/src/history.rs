//! # History 模块
//!
//! 会话事件记录，用于回看本次体验的足迹。
//!
//! ## 设计原则
//!
//! - 记录关键事件（旁白、选择、碎裂、收集、归位、鼓励、重开）
//! - 所有数据可序列化，宿主可导出
//! - 不记录临时状态（如漂浮标记的衰减）

use serde::{Deserialize, Serialize};

use crate::story::ShardId;

/// 历史事件
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum HistoryEvent {
    /// 展示了一行旁白
    LineShown {
        /// 旁白内容
        content: String,
        /// 时间戳（Unix 秒）
        timestamp: u64,
    },

    /// 做出了一次选择
    ChoiceMade {
        /// 选项列表（所有可选项）
        options: Vec<String>,
        /// 选择的索引
        selected_index: usize,
        /// 时间戳
        timestamp: u64,
    },

    /// 碎裂了
    Shattered {
        /// 时间戳
        timestamp: u64,
    },

    /// 收集到一块碎片
    ShardCollected {
        /// 碎片 id
        id: ShardId,
        /// 时间戳
        timestamp: u64,
    },

    /// 一块碎片归位
    ShardPlaced {
        /// 碎片 id
        id: ShardId,
        /// 时间戳
        timestamp: u64,
    },

    /// 收到一句鼓励（触到萤火虫）
    Encouraged {
        /// 鼓励语
        message: String,
        /// 时间戳
        timestamp: u64,
    },

    /// 重新开始
    Restarted {
        /// 时间戳
        timestamp: u64,
    },
}

impl HistoryEvent {
    /// 获取事件时间戳
    pub fn timestamp(&self) -> u64 {
        match self {
            HistoryEvent::LineShown { timestamp, .. } => *timestamp,
            HistoryEvent::ChoiceMade { timestamp, .. } => *timestamp,
            HistoryEvent::Shattered { timestamp } => *timestamp,
            HistoryEvent::ShardCollected { timestamp, .. } => *timestamp,
            HistoryEvent::ShardPlaced { timestamp, .. } => *timestamp,
            HistoryEvent::Encouraged { timestamp, .. } => *timestamp,
            HistoryEvent::Restarted { timestamp } => *timestamp,
        }
    }

    /// 创建旁白事件
    pub fn line_shown(content: String) -> Self {
        HistoryEvent::LineShown {
            content,
            timestamp: current_timestamp(),
        }
    }

    /// 创建选择事件
    pub fn choice_made(options: Vec<String>, selected_index: usize) -> Self {
        HistoryEvent::ChoiceMade {
            options,
            selected_index,
            timestamp: current_timestamp(),
        }
    }

    /// 创建碎裂事件
    pub fn shattered() -> Self {
        HistoryEvent::Shattered {
            timestamp: current_timestamp(),
        }
    }

    /// 创建收集事件
    pub fn shard_collected(id: ShardId) -> Self {
        HistoryEvent::ShardCollected {
            id,
            timestamp: current_timestamp(),
        }
    }

    /// 创建归位事件
    pub fn shard_placed(id: ShardId) -> Self {
        HistoryEvent::ShardPlaced {
            id,
            timestamp: current_timestamp(),
        }
    }

    /// 创建鼓励事件
    pub fn encouraged(message: String) -> Self {
        HistoryEvent::Encouraged {
            message,
            timestamp: current_timestamp(),
        }
    }

    /// 创建重开事件
    pub fn restarted() -> Self {
        HistoryEvent::Restarted {
            timestamp: current_timestamp(),
        }
    }
}

/// 历史记录容器
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct History {
    /// 事件列表（按时间顺序）
    events: Vec<HistoryEvent>,
    /// 最大记录数（防止内存无限增长）
    max_events: usize,
}

impl History {
    /// 创建新的历史记录
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
            max_events: 1000, // 默认最多记录 1000 条
        }
    }

    /// 设置最大记录数
    pub fn with_max_events(mut self, max: usize) -> Self {
        self.max_events = max;
        self
    }

    /// 添加事件
    pub fn push(&mut self, event: HistoryEvent) {
        self.events.push(event);

        // 如果超过最大数量，移除最早的事件
        while self.events.len() > self.max_events {
            self.events.remove(0);
        }
    }

    /// 获取所有事件
    pub fn events(&self) -> &[HistoryEvent] {
        &self.events
    }

    /// 旁白事件数量
    pub fn line_count(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, HistoryEvent::LineShown { .. }))
            .count()
    }

    /// 收集事件数量
    pub fn collected_count(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, HistoryEvent::ShardCollected { .. }))
            .count()
    }

    /// 归位事件数量
    pub fn placed_count(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, HistoryEvent::ShardPlaced { .. }))
            .count()
    }

    /// 鼓励事件数量
    pub fn encouraged_count(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, HistoryEvent::Encouraged { .. }))
            .count()
    }

    /// 清空历史
    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// 获取事件总数
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// 获取当前时间戳（Unix 秒）
fn current_timestamp() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};

    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_basic() {
        let mut history = History::new();
        assert!(history.is_empty());

        history.push(HistoryEvent::line_shown("看，天亮了。".to_string()));
        history.push(HistoryEvent::shard_collected(1));
        history.push(HistoryEvent::shard_placed(1));
        history.push(HistoryEvent::encouraged("没关系的".to_string()));

        assert_eq!(history.len(), 4);
        assert_eq!(history.line_count(), 1);
        assert_eq!(history.collected_count(), 1);
        assert_eq!(history.placed_count(), 1);
        assert_eq!(history.encouraged_count(), 1);
    }

    #[test]
    fn test_history_max_events() {
        let mut history = History::new().with_max_events(5);

        for i in 0..10 {
            history.push(HistoryEvent::line_shown(format!("旁白 {}", i)));
        }

        assert_eq!(history.len(), 5);
        // 应该保留最后 5 条
        if let HistoryEvent::LineShown { content, .. } = &history.events()[0] {
            assert_eq!(content, "旁白 5");
        } else {
            panic!("wrong event");
        }
    }

    #[test]
    fn test_history_serialization() {
        let mut history = History::new();
        history.push(HistoryEvent::choice_made(
            vec!["讲个笑话".to_string(), "保持沉默".to_string()],
            0,
        ));
        history.push(HistoryEvent::shattered());
        history.push(HistoryEvent::restarted());

        let json = serde_json::to_string(&history).unwrap();
        let loaded: History = serde_json::from_str(&json).unwrap();
        assert_eq!(loaded.len(), 3);
    }
}
