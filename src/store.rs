//! Poem store: loads the bundled dataset once, validates every record and
//! keeps the accepted ones for the lifetime of the process.
//!
//! Loading never fails outright. Any `LoadError` is kept as a warning and the
//! store is simply empty, so screens can show a "no data" message instead.

use std::{borrow::Borrow, collections::HashSet, io::ErrorKind, path::Path, sync::Arc};

use serde::Serialize;
use serde_json::Value;
use tracing::{info, instrument, warn};

use crate::domain::{PoemRecord, RawPoem};
use crate::error::{InvalidPoem, LoadError};

const MIN_CONTENT_CHARS: usize = 10;

/// A record that failed validation and was left out of the store.
#[derive(Clone, Debug, Serialize)]
pub struct Rejected {
  pub index: usize,
  pub title: Option<String>,
  pub reason: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PoemStats {
  pub total: usize,
  pub distinct_author_count: usize,
  pub average_content_length: f64,
}

#[derive(Debug, Default)]
pub struct PoemStore {
  records: Vec<Arc<PoemRecord>>,
  rejected: Vec<Rejected>,
  warning: Option<String>,
}

impl PoemStore {
  /// Load from `path`. Errors are logged and degrade to an empty store.
  #[instrument(level = "info", skip_all, fields(path = %path.as_ref().display()))]
  pub fn load(path: impl AsRef<Path>) -> Self {
    let path = path.as_ref();
    match read_raw(path) {
      Ok(raw) => Self::from_raw(raw),
      Err(e) => {
        warn!(target: "poems", path = %path.display(), error = %e, "Poem data unavailable; continuing with an empty store");
        Self { warning: Some(e.to_string()), ..Self::default() }
      }
    }
  }

  /// Validate raw entries, keeping the good ones and reporting the rest.
  pub fn from_raw(raw: Vec<RawPoem>) -> Self {
    let mut records = Vec::with_capacity(raw.len());
    let mut rejected = Vec::new();

    for (index, r) in raw.into_iter().enumerate() {
      match validate(&r) {
        Ok(poem) => records.push(Arc::new(poem)),
        Err(e) => {
          warn!(target: "poems", index, title = ?r.title_str(), reason = %e, "Skipping invalid poem record");
          rejected.push(Rejected { index, title: r.title_str().map(str::to_string), reason: e.to_string() });
        }
      }
    }

    let warning = match (records.is_empty(), rejected.is_empty()) {
      (true, false) => Some(format!("数据文件中没有有效的诗歌（{}条记录未通过校验）", rejected.len())),
      _ => None,
    };

    info!(target: "poems", accepted = records.len(), rejected = rejected.len(), "Poem store ready");
    Self { records, rejected, warning }
  }

  pub fn records(&self) -> &[Arc<PoemRecord>] {
    &self.records
  }

  pub fn get(&self, index: usize) -> Option<&Arc<PoemRecord>> {
    self.records.get(index)
  }

  pub fn position_by_title(&self, title: &str) -> Option<usize> {
    self.records.iter().position(|p| p.title == title)
  }

  pub fn is_empty(&self) -> bool {
    self.records.is_empty()
  }

  pub fn len(&self) -> usize {
    self.records.len()
  }

  pub fn rejected(&self) -> &[Rejected] {
    &self.rejected
  }

  /// User-visible message explaining why the store is empty (if it is).
  pub fn warning(&self) -> Option<&str> {
    self.warning.as_deref()
  }

  pub fn stats(&self) -> PoemStats {
    stats(&self.records)
  }
}

/// Read and parse the dataset file, mapping failures onto `LoadError`.
/// Only the outer array must be well formed; entries are checked one by one.
pub fn read_raw(path: &Path) -> Result<Vec<RawPoem>, LoadError> {
  let text = std::fs::read_to_string(path).map_err(|e| match e.kind() {
    ErrorKind::NotFound => LoadError::DataNotFound { path: path.display().to_string() },
    _ => LoadError::Unknown(e.to_string()),
  })?;
  let entries: Vec<Value> = serde_json::from_str(&text)?;
  if entries.is_empty() {
    return Err(LoadError::EmptyDataset { path: path.display().to_string() });
  }
  Ok(entries.into_iter().map(RawPoem::from_value).collect())
}

/// All six fields must be present strings and `content` at least 10 chars long.
pub fn validate(raw: &RawPoem) -> Result<PoemRecord, InvalidPoem> {
  fn field(v: &Option<Value>, name: &'static str) -> Result<String, InvalidPoem> {
    match v {
      None | Some(Value::Null) => Err(InvalidPoem::MissingField(name)),
      Some(Value::String(s)) => Ok(s.clone()),
      Some(_) => Err(InvalidPoem::WrongType(name)),
    }
  }

  let poem = PoemRecord {
    title: field(&raw.title, "title")?,
    author: field(&raw.author, "author")?,
    dynasty: field(&raw.dynasty, "dynasty")?,
    content: field(&raw.content, "content")?,
    translation: field(&raw.translation, "translation")?,
    explanation: field(&raw.explanation, "explanation")?,
  };

  let len = poem.content.chars().count();
  if len < MIN_CONTENT_CHARS {
    return Err(InvalidPoem::ContentTooShort(len));
  }
  Ok(poem)
}

pub fn stats<P: Borrow<PoemRecord>>(records: &[P]) -> PoemStats {
  if records.is_empty() {
    return PoemStats::default();
  }
  let poems: Vec<&PoemRecord> = records.iter().map(|p| p.borrow()).collect();
  let authors: HashSet<&str> = poems.iter().map(|p| p.author.as_str()).collect();
  let total_chars: usize = poems.iter().map(|p| p.content.chars().count()).sum();
  PoemStats {
    total: records.len(),
    distinct_author_count: authors.len(),
    average_content_length: total_chars as f64 / records.len() as f64,
  }
}

#[cfg(test)]
pub(crate) mod tests {
  use super::*;
  use std::io::Write;

  pub(crate) fn raw(title: &str, author: &str, content: &str) -> RawPoem {
    RawPoem {
      title: Some(title.into()),
      author: Some(author.into()),
      dynasty: Some("唐".into()),
      content: Some(content.into()),
      translation: Some("译文".into()),
      explanation: Some("赏析".into()),
    }
  }

  #[test]
  fn validate_reports_missing_translation() {
    let mut r = raw("静夜思", "李白", "床前明月光，疑是地上霜。");
    r.translation = None;
    let err = validate(&r).unwrap_err();
    assert_eq!(err, InvalidPoem::MissingField("translation"));
    assert_eq!(err.to_string(), "missing field: translation");
  }

  #[test]
  fn validate_rejects_short_content() {
    let r = raw("短", "佚名", "太短了。");
    assert_eq!(validate(&r).unwrap_err(), InvalidPoem::ContentTooShort(4));
  }

  #[test]
  fn validate_counts_chars_not_bytes() {
    // 10 CJK chars = 30 bytes; exactly at the threshold.
    let r = raw("十字", "佚名", "一二三四五六七八九十");
    assert!(validate(&r).is_ok());
  }

  #[test]
  fn invalid_records_are_filtered_and_reported() {
    let mut bad = raw("坏", "佚名", "床前明月光，疑是地上霜。");
    bad.author = None;
    let store = PoemStore::from_raw(vec![raw("静夜思", "李白", "床前明月光，疑是地上霜。"), bad]);
    assert_eq!(store.len(), 1);
    assert_eq!(store.rejected().len(), 1);
    assert_eq!(store.rejected()[0].index, 1);
    assert_eq!(store.rejected()[0].reason, "missing field: author");
    assert!(store.warning().is_none());
  }

  #[test]
  fn stats_of_empty_collection_is_zero() {
    let s = stats::<PoemRecord>(&[]);
    assert_eq!(s, PoemStats { total: 0, distinct_author_count: 0, average_content_length: 0.0 });
  }

  #[test]
  fn stats_counts_distinct_authors_and_average_length() {
    let store = PoemStore::from_raw(vec![
      raw("静夜思", "李白", "床前明月光，疑是地上霜。"),
      raw("望庐山瀑布", "李白", "日照香炉生紫烟，遥看瀑布挂前川。"),
      raw("春晓", "孟浩然", "春眠不觉晓，处处闻啼鸟。"),
    ]);
    let s = store.stats();
    assert_eq!(s.total, 3);
    assert_eq!(s.distinct_author_count, 2);
    assert!((s.average_content_length - (12.0 + 16.0 + 12.0) / 3.0).abs() < 1e-9);
  }

  #[test]
  fn missing_file_degrades_to_empty_store() {
    let store = PoemStore::load("/definitely/not/here/poems.json");
    assert!(store.is_empty());
    assert!(store.warning().unwrap_or_default().contains("未找到数据文件"));
  }

  #[test]
  fn malformed_file_is_a_format_error() {
    let mut f = tempfile::NamedTempFile::new().expect("tmp");
    write!(f, "[{{\"title\": ").expect("write");
    assert!(matches!(read_raw(f.path()), Err(LoadError::DataFormat(_))));
    let store = PoemStore::load(f.path());
    assert!(store.is_empty());
    assert!(store.warning().unwrap_or_default().contains("格式错误"));
  }

  #[test]
  fn wrong_typed_record_rejects_only_itself() {
    let mut f = tempfile::NamedTempFile::new().expect("tmp");
    write!(
      f,
      r#"[
        {{"title":"静夜思","author":"李白","dynasty":"唐","content":"床前明月光，疑是地上霜。","translation":"译文","explanation":"赏析"}},
        {{"title":"数字","author":"佚名","dynasty":"唐","content":12345,"translation":"译文","explanation":"赏析"}},
        "not a poem"
      ]"#
    )
    .expect("write");
    let store = PoemStore::load(f.path());
    assert_eq!(store.len(), 1);
    assert!(store.warning().is_none());
    assert_eq!(store.rejected().len(), 2);
    assert_eq!(store.rejected()[0].index, 1);
    assert_eq!(store.rejected()[0].title.as_deref(), Some("数字"));
    assert_eq!(store.rejected()[0].reason, "field is not a string: content");
    assert_eq!(store.rejected()[1].reason, "missing field: title");
  }

  #[test]
  fn null_field_counts_as_missing() {
    let mut r = raw("静夜思", "李白", "床前明月光，疑是地上霜。");
    r.dynasty = Some(Value::Null);
    assert_eq!(validate(&r).unwrap_err(), InvalidPoem::MissingField("dynasty"));
    r.dynasty = Some(serde_json::json!(["唐"]));
    assert_eq!(validate(&r).unwrap_err(), InvalidPoem::WrongType("dynasty"));
  }

  #[test]
  fn empty_array_is_reported() {
    let mut f = tempfile::NamedTempFile::new().expect("tmp");
    write!(f, "[]").expect("write");
    assert!(matches!(read_raw(f.path()), Err(LoadError::EmptyDataset { .. })));
  }

  #[test]
  fn bundled_dataset_loads_cleanly() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/data/poems.json");
    let store = PoemStore::load(path);
    assert!(store.len() >= 5);
    assert!(store.rejected().is_empty());
    assert!(store.position_by_title("静夜思").is_some());
  }
}
