//! Error taxonomy. None of these is fatal: callers turn them into a notice
//! and fall back to an empty/default state.

use thiserror::Error;

/// Failures while reading the bundled poem dataset.
#[derive(Error, Debug)]
pub enum LoadError {
  #[error("未找到数据文件！请确保 {path} 存在")]
  DataNotFound { path: String },

  #[error("数据文件格式错误！请检查JSON格式: {0}")]
  DataFormat(#[from] serde_json::Error),

  #[error("加载数据时发生未知错误: {0}")]
  Unknown(String),

  #[error("数据文件为空，请检查 {path}")]
  EmptyDataset { path: String },
}

/// Why a single record was rejected at load time.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidPoem {
  #[error("missing field: {0}")]
  MissingField(&'static str),

  #[error("field is not a string: {0}")]
  WrongType(&'static str),

  #[error("content too short: {0} chars")]
  ContentTooShort(usize),
}

/// Quiz state machine failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QuizError {
  /// Programming invariant: quiz operations require at least one poem.
  #[error("暂无诗歌数据，请检查数据文件")]
  EmptyPool,

  /// Blank input; blocks submission without touching counters.
  #[error("请先输入答案")]
  EmptyAnswer,

  #[error("请先开始挑战")]
  NoActiveChallenge,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CreationError {
  #[error("请至少选择一个主题！")]
  NoTheme,
}
