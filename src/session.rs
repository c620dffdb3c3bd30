//! Per-session counters and the append-only answer log.

use crate::domain::{AnswerRecord, SessionStats};

#[derive(Clone, Debug, Default)]
pub struct SessionState {
  stats: SessionStats,
  answers: Vec<AnswerRecord>,
}

impl SessionState {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn stats(&self) -> SessionStats {
    self.stats
  }

  /// Count one graded submission. Both counters move together so
  /// `score <= total_attempts` can never break.
  pub fn record_attempt(&mut self, correct: bool) {
    self.stats.total_attempts += 1;
    if correct {
      self.stats.score += 1;
    }
  }

  /// Count the attempt and append it to the log.
  pub fn record_answer(&mut self, record: AnswerRecord) {
    self.record_attempt(record.correct);
    self.answers.push(record);
  }

  pub fn record_creation(&mut self) {
    self.stats.creation_count += 1;
  }

  /// Percentage of correct answers rounded to one decimal; 0 with no attempts.
  pub fn accuracy(&self) -> f64 {
    if self.stats.total_attempts == 0 {
      return 0.0;
    }
    let pct = f64::from(self.stats.score) / f64::from(self.stats.total_attempts) * 100.0;
    (pct * 10.0).round() / 10.0
  }

  /// Last `n` answers, oldest first.
  pub fn recent_answers(&self, n: usize) -> &[AnswerRecord] {
    let start = self.answers.len().saturating_sub(n);
    &self.answers[start..]
  }
}
