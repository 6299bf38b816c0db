//! # Error 模块
//!
//! 定义 vignette-runtime 中使用的错误类型。
//!
//! 领域本身几乎没有可失败的操作：越界的落点是静默无效，
//! 非法拖拽被状态守卫挡住。仅剩两类真正的错误——
//! 语义矛盾的输入，以及无法开场的剧本。

use thiserror::Error;

/// 运行时错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RuntimeError {
    /// 无效的选择索引
    #[error("无效的选择索引 {index}，有效范围是 0..{max}")]
    InvalidChoiceIndex { index: usize, max: usize },

    /// 状态不匹配
    #[error("当前状态不允许此操作：期望 {expected}，实际 {actual}")]
    StateMismatch { expected: String, actual: String },

    /// 无效的状态操作
    #[error("无效的状态操作: {message}")]
    InvalidState { message: String },
}

/// 剧本错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoryError {
    /// 剧本未通过静态检查
    #[error("剧本无法开场（{errors} 处错误）：{first}")]
    Unplayable { errors: usize, first: String },
}

/// vignette-runtime 统一错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum VignetteError {
    /// 剧本错误
    #[error("剧本错误: {0}")]
    Story(#[from] StoryError),

    /// 运行时错误
    #[error("运行时错误: {0}")]
    Runtime(#[from] RuntimeError),
}

/// Result 类型别名
pub type VignetteResult<T> = Result<T, VignetteError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RuntimeError::InvalidChoiceIndex { index: 5, max: 2 };
        assert!(err.to_string().contains("0..2"));

        let err: VignetteError = StoryError::Unplayable {
            errors: 1,
            first: "开场旁白为空".to_string(),
        }
        .into();
        assert!(matches!(err, VignetteError::Story(_)));
    }
}
