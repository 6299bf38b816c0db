//! # 诊断模块
//!
//! 剧本静态检查 API，不依赖 IO 或引擎。
//!
//! ## 设计原则
//!
//! - 纯函数 API，可在无 IO 环境下运行
//! - 诊断分级：Error（无法开场）、Warn（建议修复）、Info（信息提示）
//! - 检查的是**数据**：对话图的连通性、素材表的完整性

use crate::error::StoryError;
use crate::story::{PartyOutcome, Story};

/// 诊断级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DiagnosticLevel {
    /// 信息提示
    Info,
    /// 警告（建议修复）
    Warn,
    /// 错误（无法开场）
    Error,
}

impl std::fmt::Display for DiagnosticLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "INFO"),
            Self::Warn => write!(f, "WARN"),
            Self::Error => write!(f, "ERROR"),
        }
    }
}

/// 诊断条目
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// 诊断级别
    pub level: DiagnosticLevel,
    /// 出问题的表（如 `party_nodes`）
    pub table: String,
    /// 诊断消息
    pub message: String,
}

impl Diagnostic {
    /// 创建错误诊断
    pub fn error(table: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: DiagnosticLevel::Error,
            table: table.into(),
            message: message.into(),
        }
    }

    /// 创建警告诊断
    pub fn warn(table: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: DiagnosticLevel::Warn,
            table: table.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.level, self.table, self.message)
    }
}

/// 诊断结果
#[derive(Debug, Clone, Default)]
pub struct DiagnosticResult {
    /// 诊断条目列表
    pub diagnostics: Vec<Diagnostic>,
}

impl DiagnosticResult {
    /// 创建空结果
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加诊断
    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// 获取错误数量
    pub fn error_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.level == DiagnosticLevel::Error)
            .count()
    }

    /// 获取警告数量
    pub fn warn_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.level == DiagnosticLevel::Warn)
            .count()
    }

    /// 是否有错误
    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// 第一条错误消息（用于折叠成 [`StoryError`]）
    pub fn first_error(&self) -> Option<&Diagnostic> {
        self.diagnostics
            .iter()
            .find(|d| d.level == DiagnosticLevel::Error)
    }
}

/// 分析剧本，返回诊断结果
///
/// 执行以下检查：
/// - 各内容表非空（开场/结尾旁白、对话图、碎片、鼓励语）
/// - 对话图跳转目标在范围内、没有无选项的死节点
/// - 存在可达的终结（Shatter）选项
/// - 碎片 id 唯一、包围盒尺寸为正、肯定语非空
pub fn analyze_story(story: &Story) -> DiagnosticResult {
    let mut result = DiagnosticResult::new();

    if story.intro_lines.is_empty() {
        result.push(Diagnostic::error("intro_lines", "开场旁白为空"));
    }
    if story.ending_lines.is_empty() {
        result.push(Diagnostic::error("ending_lines", "结尾旁白为空"));
    }
    if story.firefly_messages.is_empty() {
        result.push(Diagnostic::error("firefly_messages", "萤火虫没有鼓励语可带"));
    }
    if story.interactive_messages.is_empty() {
        result.push(Diagnostic::error(
            "interactive_messages",
            "结尾互动没有短语可弹",
        ));
    }

    analyze_party_graph(story, &mut result);
    analyze_shards(story, &mut result);

    result
}

/// 确认剧本可以开场
///
/// 任何 Error 级诊断都会折叠成一个 [`StoryError::Unplayable`]。
pub fn ensure_playable(story: &Story) -> Result<(), StoryError> {
    let result = analyze_story(story);
    if result.has_errors() {
        return Err(StoryError::Unplayable {
            errors: result.error_count(),
            first: result
                .first_error()
                .map(|d| d.to_string())
                .unwrap_or_default(),
        });
    }
    Ok(())
}

fn analyze_party_graph(story: &Story, result: &mut DiagnosticResult) {
    if story.party_nodes.is_empty() {
        result.push(Diagnostic::error("party_nodes", "对话图为空"));
        return;
    }

    let mut has_terminal = false;
    for (i, node) in story.party_nodes.iter().enumerate() {
        if node.options.is_empty() {
            result.push(Diagnostic::error(
                "party_nodes",
                format!("节点 {} 没有任何选项，剧情会卡死", i),
            ));
        }
        for opt in &node.options {
            match opt.outcome {
                PartyOutcome::Goto { node: target } => {
                    if target >= story.party_nodes.len() {
                        result.push(Diagnostic::error(
                            "party_nodes",
                            format!(
                                "节点 {} 的选项“{}”跳向不存在的节点 {}",
                                i, opt.text, target
                            ),
                        ));
                    }
                }
                PartyOutcome::Shatter => has_terminal = true,
            }
        }
    }

    if !has_terminal {
        result.push(Diagnostic::error(
            "party_nodes",
            "对话图没有任何终结选项，派对永远散不了场",
        ));
    }
}

fn analyze_shards(story: &Story, result: &mut DiagnosticResult) {
    if story.shards.is_empty() {
        result.push(Diagnostic::error("shards", "碎片表为空，黑暗阶段无事可做"));
        return;
    }

    let mut seen = std::collections::HashSet::new();
    for spec in &story.shards {
        if !seen.insert(spec.id) {
            result.push(Diagnostic::error(
                "shards",
                format!("碎片 id {} 重复", spec.id),
            ));
        }
        if spec.width <= 0.0 || spec.height <= 0.0 {
            result.push(Diagnostic::error(
                "shards",
                format!("碎片 {} 的包围盒尺寸非正", spec.id),
            ));
        }
        if spec.affirmation.is_empty() {
            result.push(Diagnostic::warn(
                "shards",
                format!("碎片 {} 没有肯定语", spec.id),
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::story::{PartyNode, PartyOption};

    #[test]
    fn test_builtin_story_is_clean() {
        let result = analyze_story(&Story::builtin());
        insta::assert_debug_snapshot!(result.diagnostics, @"[]");
        assert!(ensure_playable(&Story::builtin()).is_ok());
    }

    #[test]
    fn test_empty_tables_are_errors() {
        let mut story = Story::builtin();
        story.intro_lines.clear();
        story.firefly_messages.clear();

        let result = analyze_story(&story);
        assert_eq!(result.error_count(), 2);
        assert!(ensure_playable(&story).is_err());
    }

    #[test]
    fn test_bad_jump_target() {
        let mut story = Story::builtin();
        story.party_nodes[0].options[0].outcome = crate::story::PartyOutcome::Goto { node: 99 };

        let result = analyze_story(&story);
        assert!(result.has_errors());
        assert!(result.diagnostics.iter().any(|d| d.message.contains("99")));
    }

    #[test]
    fn test_missing_terminal_option() {
        let mut story = Story::builtin();
        story.party_nodes = vec![PartyNode {
            text: "自说自话".to_string(),
            response: None,
            options: vec![PartyOption {
                text: "继续尬聊".to_string(),
                awkwardness: 10,
                outcome: PartyOutcome::Goto { node: 0 },
            }],
        }];

        let result = analyze_story(&story);
        assert!(result.has_errors());
    }

    #[test]
    fn test_duplicate_shard_id_and_empty_affirmation() {
        let mut story = Story::builtin();
        story.shards[1].id = 1;
        story.shards[2].affirmation.clear();

        let result = analyze_story(&story);
        assert_eq!(result.error_count(), 1);
        assert_eq!(result.warn_count(), 1);
    }

    #[test]
    fn test_diagnostic_display() {
        let d = Diagnostic::error("shards", "碎片表为空，黑暗阶段无事可做");
        assert_eq!(d.to_string(), "[ERROR] shards: 碎片表为空，黑暗阶段无事可做");
    }
}
