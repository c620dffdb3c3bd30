//! Plain-text learning report export.

use chrono::{DateTime, TimeZone};

use crate::session::SessionState;
use crate::store::PoemStore;

pub const REPORT_FILE_NAME: &str = "唐诗学习报告.txt";
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const SUGGESTIONS: [&str; 4] = [
  "坚持每日学习一首新诗",
  "定期复习已学诗歌",
  "多参与对诗挑战",
  "尝试创作自己的诗歌",
];

/// Aggregate report: totals, accuracy, every poem in the store and the
/// generation time.
pub fn report_text<Tz: TimeZone>(store: &PoemStore, session: &SessionState, generated_at: &DateTime<Tz>) -> String
where
  Tz::Offset: std::fmt::Display,
{
  let stats = session.stats();
  let mut out = String::new();
  out.push_str("AI唐诗工坊学习报告\n");
  out.push_str("===================\n\n");
  out.push_str("学习概况：\n");
  out.push_str(&format!("- 学习诗歌：{}首\n", store.len()));
  out.push_str(&format!("- 挑战次数：{}次\n", stats.total_attempts));
  out.push_str(&format!("- 得分：{}分\n", stats.score));
  out.push_str(&format!("- 正确率：{:.1}%\n\n", session.accuracy()));

  out.push_str("已学习诗歌：\n");
  for p in store.records() {
    out.push_str(&format!("- {} ({})\n", p.title, p.author));
  }

  out.push_str("\n学习建议：\n");
  for (i, s) in SUGGESTIONS.iter().enumerate() {
    out.push_str(&format!("{}. {}\n", i + 1, s));
  }

  out.push_str(&format!("\n生成时间：{}\n", generated_at.format(TIMESTAMP_FORMAT)));
  out
}
