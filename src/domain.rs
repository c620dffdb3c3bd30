//! Domain models: poem records, quiz answers and session counters.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One entry of the bundled poem dataset. Immutable once loaded.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoemRecord {
  pub title: String,
  pub author: String,
  pub dynasty: String,
  /// Full text; sentences delimited by full-width punctuation.
  pub content: String,
  pub translation: String,
  pub explanation: String,
}

/// Raw shape of a dataset entry before validation. Fields keep whatever JSON
/// value the file had so a wrong type rejects one record, not the whole file.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct RawPoem {
  #[serde(default)] pub title: Option<Value>,
  #[serde(default)] pub author: Option<Value>,
  #[serde(default)] pub dynasty: Option<Value>,
  #[serde(default)] pub content: Option<Value>,
  #[serde(default)] pub translation: Option<Value>,
  #[serde(default)] pub explanation: Option<Value>,
}

impl RawPoem {
  /// Entries that are not JSON objects come out with every field absent.
  pub fn from_value(value: Value) -> Self {
    match value {
      Value::Object(_) => serde_json::from_value(value).unwrap_or_default(),
      _ => Self::default(),
    }
  }

  /// Title for reporting, if it is a string.
  pub fn title_str(&self) -> Option<&str> {
    self.title.as_ref().and_then(Value::as_str)
  }
}

/// Append-only log entry created on every graded submission.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerRecord {
  pub poem_title: String,
  pub user_answer: String,
  pub correct: bool,
  pub correct_answer: String,
}

/// Session counters. `score <= total_attempts` always holds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStats {
  pub score: u32,
  pub total_attempts: u32,
  pub creation_count: u32,
}

/// Screens of the single-page app.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Screen {
  #[default]
  Home,
  Appreciation,
  Challenge,
  Creation,
  Report,
}
