//! Fill-in-the-blank quiz engine.
//!
//! States: `Idle -> ChallengeActive -> AnswerRevealed -> (ChallengeActive | Idle)`.
//!
//! A challenge picks one poem, one sentence of it, and hides up to three
//! distinct characters of that sentence behind `BLANK_TOKEN`. The learner must
//! type the whole hidden sentence back; grading is exact string equality after
//! trimming unless the lenient policy is configured.
//!
//! All randomness comes from the caller's `Rng`, so seeded tests are reproducible.

use std::sync::Arc;

use rand::{seq::SliceRandom, Rng};
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::domain::{AnswerRecord, PoemRecord};
use crate::error::QuizError;
use crate::session::SessionState;

pub const BLANK_TOKEN: &str = "___";
pub const MAX_BLANKS: usize = 3;

/// Characters that end a sentence or clause.
const SENTENCE_DELIMITERS: &[char] = &['。', '，', '！', '？', '；'];
/// Punctuation that can survive inside a sentence and is dropped before blanking.
const INNER_PUNCTUATION: &[char] = &['、', '：', '“', '”', '‘', '’', '《', '》', '，'];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
  #[default]
  Idle,
  ChallengeActive,
  AnswerRevealed,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum GradingPolicy {
  #[default]
  Exact,
  /// Ignores whitespace and trailing punctuation on both sides.
  Lenient,
}

impl GradingPolicy {
  pub fn from_lenient(lenient: bool) -> Self {
    if lenient { GradingPolicy::Lenient } else { GradingPolicy::Exact }
  }

  /// `answer` is already trimmed by the caller.
  pub fn matches(self, answer: &str, expected: &str) -> bool {
    match self {
      GradingPolicy::Exact => answer == expected,
      GradingPolicy::Lenient => normalize_loose(answer) == normalize_loose(expected),
    }
  }
}

fn normalize_loose(s: &str) -> String {
  let compact: String = s.chars().filter(|c| !c.is_whitespace()).collect();
  compact
    .trim_end_matches(|c: char| SENTENCE_DELIMITERS.contains(&c) || INNER_PUNCTUATION.contains(&c) || c.is_ascii_punctuation())
    .to_string()
}

/// One quiz round.
#[derive(Clone, Debug)]
pub struct QuizChallenge {
  pub poem: Arc<PoemRecord>,
  pub target_sentence: String,
  pub blanked_display: String,
  /// Indices (into the punctuation-stripped sentence) that were blanked, ascending.
  pub blank_positions: Vec<usize>,
  /// Extra difficulty stars, 1..=3.
  pub difficulty: u8,
  pub revealed: bool,
}

/// Result of a graded submission.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Graded {
  pub correct: bool,
  pub expected: String,
  pub record: AnswerRecord,
}

/// Split poem text into non-empty, whitespace-trimmed sentences.
/// Each returned slice is a verbatim substring of `content`.
pub fn split_sentences(content: &str) -> Vec<&str> {
  content
    .split(SENTENCE_DELIMITERS)
    .map(str::trim)
    .filter(|s| !s.is_empty())
    .collect()
}

/// Characters of the sentence with in-sentence punctuation and whitespace removed.
pub fn strip_punctuation(sentence: &str) -> Vec<char> {
  sentence
    .chars()
    .filter(|c| !c.is_whitespace() && !INNER_PUNCTUATION.contains(c) && !SENTENCE_DELIMITERS.contains(c))
    .collect()
}

/// Replace `min(MAX_BLANKS, len)` distinct positions with `BLANK_TOKEN`.
pub fn blank_out<R: Rng + ?Sized>(sentence: &str, rng: &mut R) -> (String, Vec<usize>) {
  let chars = strip_punctuation(sentence);
  if chars.is_empty() {
    return (String::new(), Vec::new());
  }

  let amount = MAX_BLANKS.min(chars.len());
  let mut positions = rand::seq::index::sample(rng, chars.len(), amount).into_vec();
  positions.sort_unstable();

  let mut out = String::with_capacity(sentence.len() + amount * BLANK_TOKEN.len());
  for (i, ch) in chars.iter().enumerate() {
    if positions.binary_search(&i).is_ok() {
      out.push_str(BLANK_TOKEN);
    } else {
      out.push(*ch);
    }
  }
  (out, positions)
}

/// Build a challenge from one poem, or `None` if it has no usable sentence.
pub fn build_challenge<R: Rng + ?Sized>(poem: Arc<PoemRecord>, rng: &mut R) -> Option<QuizChallenge> {
  let target = split_sentences(&poem.content).choose(rng)?.to_string();
  let (blanked_display, blank_positions) = blank_out(&target, rng);
  let difficulty = rng.gen_range(1..=3u8);
  Some(QuizChallenge {
    poem,
    target_sentence: target,
    blanked_display,
    blank_positions,
    difficulty,
    revealed: false,
  })
}

#[derive(Clone, Debug, Default)]
pub struct QuizEngine {
  challenge: Option<QuizChallenge>,
  phase: Phase,
  grading: GradingPolicy,
}

impl QuizEngine {
  pub fn new(grading: GradingPolicy) -> Self {
    Self { challenge: None, phase: Phase::Idle, grading }
  }

  pub fn phase(&self) -> Phase {
    self.phase
  }

  pub fn challenge(&self) -> Option<&QuizChallenge> {
    self.challenge.as_ref()
  }

  /// Pick a poem and sentence uniformly at random; valid from any state.
  /// Poems without any sentence are skipped.
  #[instrument(level = "debug", skip_all, fields(pool = poems.len()))]
  pub fn start_challenge<R: Rng + ?Sized>(
    &mut self,
    poems: &[Arc<PoemRecord>],
    rng: &mut R,
  ) -> Result<&QuizChallenge, QuizError> {
    let usable: Vec<&Arc<PoemRecord>> = poems
      .iter()
      .filter(|p| !split_sentences(&p.content).is_empty())
      .collect();
    let poem = usable.choose(rng).ok_or(QuizError::EmptyPool)?;
    let challenge = build_challenge(Arc::clone(poem), rng).ok_or(QuizError::EmptyPool)?;

    info!(target: "quiz", title = %challenge.poem.title, blanks = challenge.blank_positions.len(), "New challenge");
    debug!(target: "quiz", sentence = %challenge.target_sentence, display = %challenge.blanked_display, "Challenge detail");

    self.phase = Phase::ChallengeActive;
    Ok(&*self.challenge.insert(challenge))
  }

  /// Same effect as `start_challenge`; exists for the "change poem" control.
  pub fn change_poem<R: Rng + ?Sized>(
    &mut self,
    poems: &[Arc<PoemRecord>],
    rng: &mut R,
  ) -> Result<&QuizChallenge, QuizError> {
    self.start_challenge(poems, rng)
  }

  /// Grade `raw` against the hidden sentence. Blank input changes nothing.
  /// Re-submission after the answer is revealed is allowed and counted.
  #[instrument(level = "debug", skip_all, fields(answer_len = raw.len()))]
  pub fn submit_answer(&mut self, raw: &str, session: &mut SessionState) -> Result<Graded, QuizError> {
    let grading = self.grading;
    let challenge = self.challenge.as_mut().ok_or(QuizError::NoActiveChallenge)?;

    let answer = raw.trim();
    if answer.is_empty() {
      return Err(QuizError::EmptyAnswer);
    }

    let correct = grading.matches(answer, &challenge.target_sentence);
    let record = AnswerRecord {
      poem_title: challenge.poem.title.clone(),
      user_answer: raw.to_string(),
      correct,
      correct_answer: challenge.target_sentence.clone(),
    };
    session.record_answer(record.clone());

    challenge.revealed = true;
    self.phase = Phase::AnswerRevealed;

    let stats = session.stats();
    info!(target: "quiz", title = %record.poem_title, %correct, score = stats.score, attempts = stats.total_attempts, "Answer graded");
    Ok(Graded { correct, expected: record.correct_answer.clone(), record })
  }

  /// Show the answer without scoring.
  pub fn reveal_answer(&mut self) -> Result<&QuizChallenge, QuizError> {
    let challenge = self.challenge.as_mut().ok_or(QuizError::NoActiveChallenge)?;
    challenge.revealed = true;
    self.phase = Phase::AnswerRevealed;
    debug!(target: "quiz", title = %challenge.poem.title, "Answer revealed");
    Ok(&*challenge)
  }
}
