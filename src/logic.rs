//! Core behaviors shared by both HTTP and WebSocket handlers.
//!
//! `apply_action` is the only place session state changes. Handlers call it,
//! then re-render the whole view from the resulting state.
//! Errors never escape: each one becomes a `Notice` and the session keeps a
//! safe state.

use tracing::{debug, info, instrument, warn};

use crate::appreciation::draw_notes;
use crate::creation::{self, STYLES};
use crate::domain::Screen;
use crate::error::QuizError;
use crate::protocol::{Action, Notice};
use crate::state::Session;
use crate::store::PoemStore;

const MIN_RATING: u8 = 1;
const MAX_RATING: u8 = 5;

#[instrument(level = "info", skip_all, fields(session = %session.id))]
pub fn apply_action(store: &PoemStore, session: &mut Session, action: Action) -> Option<Notice> {
  match action {
    Action::Navigate { screen } => {
      session.screen = screen;
      if screen == Screen::Appreciation && session.notes.is_none() {
        let index = session.selected_poem;
        select_poem(store, session, index);
      }
      None
    }

    Action::SelectPoem { index } => {
      session.screen = Screen::Appreciation;
      if select_poem(store, session, index) {
        None
      } else {
        Some(Notice::warning("未找到该诗歌"))
      }
    }

    Action::StartChallenge => {
      session.screen = Screen::Challenge;
      start_challenge(store, session)
    }

    Action::ChangePoem => {
      session.screen = Screen::Challenge;
      // only meaningful once a challenge exists
      if session.quiz.challenge().is_some() {
        match session.quiz.change_poem(store.records(), &mut session.rng) {
          Ok(_) => None,
          Err(e) => Some(Notice::warning(e.to_string())),
        }
      } else {
        None
      }
    }

    Action::SubmitAnswer { answer } => {
      session.screen = Screen::Challenge;
      match session.quiz.submit_answer(&answer, &mut session.state) {
        Ok(g) if g.correct => Some(Notice::success("✅ 回答正确！")),
        Ok(_) => Some(Notice::error("❌ 回答错误")),
        Err(e) => {
          debug!(target: "quiz", session = %session.id, error = %e, "Submission rejected");
          Some(Notice::warning(e.to_string()))
        }
      }
    }

    Action::RevealAnswer => {
      session.screen = Screen::Challenge;
      match session.quiz.reveal_answer() {
        Ok(_) => None,
        Err(e) => Some(Notice::warning(e.to_string())),
      }
    }

    Action::ShowScore => {
      let stats = session.state.stats();
      Some(Notice::info(format!(
        "当前得分：{}分，挑战次数：{}，正确率：{:.1}%",
        stats.score,
        stats.total_attempts,
        session.state.accuracy()
      )))
    }

    Action::Create { themes, style, keywords } => {
      session.screen = Screen::Creation;
      create(session, themes, style, keywords)
    }

    Action::RateCreation { rating } => {
      if !(MIN_RATING..=MAX_RATING).contains(&rating) {
        return Some(Notice::warning(format!("评分需在{MIN_RATING}到{MAX_RATING}之间")));
      }
      session.last_rating = Some(rating);
      info!(target: "creation", session = %session.id, rating, "Creation rated");
      Some(Notice::success(format!("感谢评价！你给出了{rating}星评价。")))
    }

    Action::SubmitFeedback { text } => {
      if text.trim().is_empty() {
        return None;
      }
      info!(target: "creation", session = %session.id, feedback_len = text.chars().count(), "Creation feedback received");
      Some(Notice::success("感谢你的宝贵建议！"))
    }
  }
}

/// Select a poem for the appreciation screen and draw its notes.
fn select_poem(store: &PoemStore, session: &mut Session, index: usize) -> bool {
  let Some(poem) = store.get(index) else {
    return false;
  };
  session.selected_poem = index;
  session.notes = Some(draw_notes(index, poem, &mut session.rng));
  true
}

fn start_challenge(store: &PoemStore, session: &mut Session) -> Option<Notice> {
  match session.quiz.start_challenge(store.records(), &mut session.rng) {
    Ok(_) => None,
    Err(QuizError::EmptyPool) => {
      warn!(target: "quiz", session = %session.id, "Challenge requested with no poems loaded");
      Some(Notice::warning(store.warning().map(str::to_string).unwrap_or_else(|| QuizError::EmptyPool.to_string())))
    }
    Err(e) => Some(Notice::warning(e.to_string())),
  }
}

fn create(session: &mut Session, themes: Vec<String>, style: String, keywords: String) -> Option<Notice> {
  let mut unique: Vec<String> = Vec::with_capacity(themes.len());
  for t in themes.into_iter().map(|t| t.trim().to_string()).filter(|t| !t.is_empty()) {
    if !unique.contains(&t) {
      unique.push(t);
    }
  }
  let style = if style.trim().is_empty() { STYLES[0].to_string() } else { style.trim().to_string() };

  match creation::generate(&unique, &style, &keywords, &mut session.rng) {
    Ok(poem) => {
      session.state.record_creation();
      session.last_creation = Some(poem);
      session.last_rating = None;
      Some(Notice::success("🎉 创作完成！"))
    }
    Err(e) => Some(Notice::warning(e.to_string())),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::WorkshopConfig;
  use crate::protocol::NoticeLevel;
  use crate::quiz::Phase;
  use crate::store::tests::raw;
  use rand::{rngs::SmallRng, SeedableRng};

  fn one_poem_store() -> PoemStore {
    PoemStore::from_raw(vec![raw("静夜思", "李白", "床前明月光，疑是地上霜。")])
  }

  fn session(store: &PoemStore) -> Session {
    Session::new("t".into(), store, &WorkshopConfig::default(), SmallRng::seed_from_u64(21))
  }

  #[test]
  fn quiz_round_through_actions() {
    let store = one_poem_store();
    let mut s = session(&store);

    assert_eq!(apply_action(&store, &mut s, Action::StartChallenge), None);
    assert_eq!(s.screen, Screen::Challenge);
    let target = s.quiz.challenge().expect("challenge").target_sentence.clone();
    assert!(target == "床前明月光" || target == "疑是地上霜");

    let n = apply_action(&store, &mut s, Action::SubmitAnswer { answer: "   ".into() }).expect("notice");
    assert_eq!(n.level, NoticeLevel::Warning);
    assert_eq!(n.text, "请先输入答案");
    assert_eq!(s.state.stats().total_attempts, 0);

    let n = apply_action(&store, &mut s, Action::SubmitAnswer { answer: target }).expect("notice");
    assert_eq!(n.level, NoticeLevel::Success);
    assert_eq!(s.state.stats().score, 1);
    assert_eq!(s.state.stats().total_attempts, 1);
    assert_eq!(s.quiz.phase(), Phase::AnswerRevealed);
  }

  #[test]
  fn change_poem_without_challenge_is_noop() {
    let store = one_poem_store();
    let mut s = session(&store);
    assert_eq!(apply_action(&store, &mut s, Action::ChangePoem), None);
    assert!(s.quiz.challenge().is_none());
  }

  #[test]
  fn empty_store_degrades_to_notice() {
    let store = PoemStore::default();
    let mut s = session(&store);
    let n = apply_action(&store, &mut s, Action::StartChallenge).expect("notice");
    assert_eq!(n.level, NoticeLevel::Warning);
    assert_eq!(s.quiz.phase(), Phase::Idle);
  }

  #[test]
  fn select_poem_draws_notes() {
    let store = one_poem_store();
    let mut s = session(&store);
    assert_eq!(apply_action(&store, &mut s, Action::SelectPoem { index: 0 }), None);
    assert_eq!(s.screen, Screen::Appreciation);
    assert_eq!(s.notes.as_ref().map(|n| n.poem_index), Some(0));

    let n = apply_action(&store, &mut s, Action::SelectPoem { index: 9 }).expect("notice");
    assert_eq!(n.level, NoticeLevel::Warning);
    assert_eq!(s.selected_poem, 0);
  }

  #[test]
  fn creation_counts_only_successes() {
    let store = one_poem_store();
    let mut s = session(&store);
    let n = apply_action(
      &store,
      &mut s,
      Action::Create { themes: vec![], style: "清新自然".into(), keywords: String::new() },
    )
    .expect("notice");
    assert_eq!(n.text, "请至少选择一个主题！");
    assert_eq!(s.state.stats().creation_count, 0);

    let n = apply_action(
      &store,
      &mut s,
      Action::Create { themes: vec!["山水田园".into(), "山水田园".into()], style: String::new(), keywords: "明月".into() },
    )
    .expect("notice");
    assert_eq!(n.level, NoticeLevel::Success);
    assert_eq!(s.state.stats().creation_count, 1);
    let poem = s.last_creation.as_ref().expect("poem");
    assert_eq!(poem.themes, ["山水田园"]);
    assert_eq!(poem.style, STYLES[0]);
  }

  #[test]
  fn rating_bounds_and_feedback() {
    let store = one_poem_store();
    let mut s = session(&store);
    let n = apply_action(&store, &mut s, Action::RateCreation { rating: 6 }).expect("notice");
    assert_eq!(n.level, NoticeLevel::Warning);
    let n = apply_action(&store, &mut s, Action::RateCreation { rating: 4 }).expect("notice");
    assert_eq!(n.text, "感谢评价！你给出了4星评价。");
    assert_eq!(s.last_rating, Some(4));

    assert_eq!(apply_action(&store, &mut s, Action::SubmitFeedback { text: "  ".into() }), None);
    assert!(apply_action(&store, &mut s, Action::SubmitFeedback { text: "很好".into() }).is_some());
  }

  #[test]
  fn show_score_summarises() {
    let store = one_poem_store();
    let mut s = session(&store);
    let n = apply_action(&store, &mut s, Action::ShowScore).expect("notice");
    assert_eq!(n.text, "当前得分：0分，挑战次数：0，正确率：0.0%");
  }
}
