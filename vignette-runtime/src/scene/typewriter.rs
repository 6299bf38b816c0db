//! # Typewriter 模块
//!
//! 打字机逐字显示状态机。
//!
//! ## 设计说明
//!
//! - 引擎不持有定时器：宿主按 `WaitForScene { tick }` 的间隔回传
//!   [`crate::input::VignetteInput::Tick`]，每个 Tick 显示一个字符
//! - 按**字符**（而非字节）推进，中文与 emoji 都是一步一个
//! - 完成信号保证**恰好触发一次**：无论是逐字显示到尾，还是中途跳过
//! - 换一段新文本即从零开始重新显示，完成信号重新武装

use serde::{Deserialize, Serialize};

/// 打字机状态
///
/// `displayed()` 返回当前已显示的前缀。完成信号由 [`tick`](Typewriter::tick)
/// 或 [`skip`](Typewriter::skip) 的返回值传递：首次到达完整文本时返回 `true`，
/// 之后永远返回 `false`。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Typewriter {
    /// 完整文本
    text: String,
    /// 已显示的字符数
    revealed_chars: usize,
    /// 已显示前缀的字节长度（始终落在字符边界上）
    revealed_bytes: usize,
    /// 完成信号是否已触发
    completion_fired: bool,
}

impl Typewriter {
    /// 从一段新文本开始
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            revealed_chars: 0,
            revealed_bytes: 0,
            completion_fired: false,
        }
    }

    /// 推进一个字符
    ///
    /// 返回 `true` 当且仅当本次推进使文本**首次**完整显示。
    pub fn tick(&mut self) -> bool {
        if let Some(c) = self.text[self.revealed_bytes..].chars().next() {
            self.revealed_bytes += c.len_utf8();
            self.revealed_chars += 1;
        }
        self.poll_completion()
    }

    /// 立即显示剩余全部文本
    ///
    /// 返回 `true` 当且仅当完成信号由本次调用**首次**触发。
    pub fn skip(&mut self) -> bool {
        self.revealed_chars = self.text.chars().count();
        self.revealed_bytes = self.text.len();
        self.poll_completion()
    }

    /// 已显示的前缀
    pub fn displayed(&self) -> &str {
        &self.text[..self.revealed_bytes]
    }

    /// 完整文本
    pub fn text(&self) -> &str {
        &self.text
    }

    /// 已显示的字符数
    pub fn revealed_chars(&self) -> usize {
        self.revealed_chars
    }

    /// 是否已完整显示
    pub fn is_complete(&self) -> bool {
        self.revealed_bytes == self.text.len()
    }

    fn poll_completion(&mut self) -> bool {
        if self.is_complete() && !self.completion_fired {
            self.completion_fired = true;
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reveal_sequence_non_decreasing() {
        let mut tw = Typewriter::new("你好，小熊饼干");
        let total = "你好，小熊饼干".chars().count();

        let mut prev = 0;
        let mut completions = 0;
        for _ in 0..total + 5 {
            if tw.tick() {
                completions += 1;
            }
            let n = tw.revealed_chars();
            assert!(n >= prev);
            assert!(n <= total);
            prev = n;
        }

        assert_eq!(tw.revealed_chars(), total);
        assert_eq!(tw.displayed(), "你好，小熊饼干");
        assert_eq!(completions, 1);
    }

    #[test]
    fn test_skip_mid_reveal() {
        let mut tw = Typewriter::new("小熊饼干");
        tw.tick();
        assert_eq!(tw.displayed(), "小");
        assert!(!tw.is_complete());

        assert!(tw.skip());
        assert_eq!(tw.displayed(), "小熊饼干");
        assert!(tw.is_complete());

        // 再跳过、再推进都不会重复触发
        assert!(!tw.skip());
        assert!(!tw.tick());
    }

    #[test]
    fn test_restart_rearms_completion() {
        let mut tw = Typewriter::new("一");
        assert!(tw.tick());

        tw = Typewriter::new("二三");
        assert_eq!(tw.displayed(), "");
        assert!(!tw.tick());
        assert!(tw.tick());
    }

    #[test]
    fn test_empty_text_completes_on_first_tick() {
        let mut tw = Typewriter::new("");
        assert!(tw.is_complete());
        assert!(tw.tick());
        assert!(!tw.tick());
    }

    #[test]
    fn test_typewriter_serialization() {
        let mut tw = Typewriter::new("小熊");
        tw.tick();

        let json = serde_json::to_string(&tw).unwrap();
        let loaded: Typewriter = serde_json::from_str(&json).unwrap();
        assert_eq!(tw, loaded);
        assert_eq!(loaded.displayed(), "小");
    }
}
