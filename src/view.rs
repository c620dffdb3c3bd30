//! View shell: turns the store and one session into the view model the page
//! paints. `render` is pure; every random decoration was drawn earlier by an
//! action and stored on the session.

use serde::Serialize;

use crate::appreciation::{related_poems, RelatedPoem, ThemeNote, POEM_FORM, STUDY_TIPS};
use crate::creation::{CreatedPoem, DEFAULT_KEYWORDS, DEFAULT_THEME, STYLES, THEMES};
use crate::domain::{AnswerRecord, Screen};
use crate::pinyin::line_pinyin;
use crate::quiz::Phase;
use crate::state::Session;
use crate::store::PoemStore;
use crate::util::{display_lines, preview};

const FEATURED_POEMS: usize = 3;
const AI_AUTHOR: &str = "AI诗人";

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "screen", rename_all = "snake_case")]
pub enum View {
  Home(HomeView),
  Appreciation(AppreciationView),
  Challenge(ChallengeView),
  Creation(CreationView),
  Report(ReportView),
  /// A data-backed screen was requested but the store is empty.
  NoData { requested: Screen, message: String },
}

#[derive(Clone, Debug, Serialize)]
pub struct FeatureCard {
  pub screen: Screen,
  pub title: &'static str,
  pub bullets: [&'static str; 3],
  pub button: &'static str,
}

#[derive(Clone, Debug, Serialize)]
pub struct PoemCard {
  pub index: usize,
  pub title: String,
  pub author: String,
  pub dynasty: String,
  pub teaser: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct HomeView {
  pub features: Vec<FeatureCard>,
  pub featured: Vec<PoemCard>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub warning: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct PoemLine {
  pub text: String,
  pub pinyin: String,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppreciationView {
  pub options: Vec<String>,
  pub selected: usize,
  pub title: String,
  pub author: String,
  pub dynasty: String,
  pub lines: Vec<PoemLine>,
  pub form: &'static str,
  pub background: Option<String>,
  pub translation: String,
  pub explanation: String,
  pub themes: Vec<ThemeNote>,
  pub art_features: Vec<String>,
  pub related: Vec<RelatedPoem>,
  pub study_tips: [&'static str; 4],
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevealCard {
  pub answer: String,
  pub content: String,
  pub explanation_teaser: String,
  /// Store index for the "full appreciation" link.
  pub poem_index: Option<usize>,
}

#[derive(Clone, Debug, Serialize)]
pub struct ChallengeCard {
  pub title: String,
  pub author: String,
  pub stars: String,
  pub blanked: String,
  pub phase: Phase,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub reveal: Option<RevealCard>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Scoreboard {
  pub score: u32,
  pub total_attempts: u32,
  /// Absent until the first graded attempt.
  pub accuracy: Option<f64>,
}

#[derive(Clone, Debug, Serialize)]
pub struct ChallengeView {
  pub challenge: Option<ChallengeCard>,
  pub scoreboard: Scoreboard,
  pub history: Vec<AnswerRecord>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreationView {
  pub themes: [&'static str; 8],
  pub styles: [&'static str; 5],
  pub default_themes: Vec<&'static str>,
  pub default_style: &'static str,
  pub default_keywords: &'static str,
  pub result: Option<CreationResult>,
  pub last_rating: Option<u8>,
}

#[derive(Clone, Debug, Serialize)]
pub struct CreationResult {
  pub author: &'static str,
  pub lines: Vec<String>,
  #[serde(flatten)]
  pub poem: CreatedPoem,
}

#[derive(Clone, Debug, Serialize)]
pub struct MasteryRow {
  pub title: String,
  pub author: String,
  pub percent: u8,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportView {
  pub learned: usize,
  pub accuracy: f64,
  pub creation_count: u32,
  pub total_attempts: u32,
  pub score: u32,
  pub mastery: Vec<MasteryRow>,
  pub recent: Vec<AnswerRecord>,
}

pub fn render(store: &PoemStore, session: &Session) -> View {
  match session.screen {
    Screen::Home => View::Home(home(store)),
    Screen::Creation => View::Creation(creation(session)),
    screen if store.is_empty() => View::NoData {
      requested: screen,
      message: store.warning().unwrap_or("暂无诗歌数据，请检查数据文件").to_string(),
    },
    Screen::Appreciation => View::Appreciation(appreciation(store, session)),
    Screen::Challenge => View::Challenge(challenge(store, session)),
    Screen::Report => View::Report(report(store, session)),
  }
}

fn home(store: &PoemStore) -> HomeView {
  let features = vec![
    FeatureCard {
      screen: Screen::Appreciation,
      title: "📖 智能赏析",
      bullets: ["深度解析唐诗内涵", "AI生成扩展解读", "多维度诗歌分析"],
      button: "开始赏析",
    },
    FeatureCard {
      screen: Screen::Challenge,
      title: "🏆 对诗挑战",
      bullets: ["诗句填空挑战", "实时评分系统", "错题回顾功能"],
      button: "开始挑战",
    },
    FeatureCard {
      screen: Screen::Creation,
      title: "✍️ AI创作",
      bullets: ["AI辅助诗歌创作", "自定义创作主题", "多风格选择"],
      button: "开始创作",
    },
  ];
  let featured = store
    .records()
    .iter()
    .take(FEATURED_POEMS)
    .enumerate()
    .map(|(index, p)| PoemCard {
      index,
      title: p.title.clone(),
      author: p.author.clone(),
      dynasty: p.dynasty.clone(),
      teaser: preview(&p.content, 15),
    })
    .collect();
  HomeView { features, featured, warning: store.warning().map(str::to_string) }
}

fn appreciation(store: &PoemStore, session: &Session) -> AppreciationView {
  let selected = if session.selected_poem < store.len() { session.selected_poem } else { 0 };
  // render() only gets here with a non-empty store
  let poem = &store.records()[selected];
  let notes = session.notes.as_ref().filter(|n| n.poem_index == selected);

  AppreciationView {
    options: store.records().iter().map(|p| format!("{} - {}", p.title, p.author)).collect(),
    selected,
    title: poem.title.clone(),
    author: poem.author.clone(),
    dynasty: poem.dynasty.clone(),
    lines: display_lines(&poem.content)
      .into_iter()
      .map(|text| {
        let pinyin = line_pinyin(&text);
        PoemLine { text, pinyin }
      })
      .collect(),
    form: POEM_FORM,
    background: notes.map(|n| n.background.clone()),
    translation: poem.translation.clone(),
    explanation: poem.explanation.clone(),
    themes: notes.map(|n| n.themes.clone()).unwrap_or_default(),
    art_features: notes.map(|n| n.art_features.clone()).unwrap_or_default(),
    related: related_poems(store, poem),
    study_tips: STUDY_TIPS,
  }
}

fn scoreboard(session: &Session) -> Scoreboard {
  let stats = session.state.stats();
  Scoreboard {
    score: stats.score,
    total_attempts: stats.total_attempts,
    accuracy: (stats.total_attempts > 0).then(|| session.state.accuracy()),
  }
}

fn challenge(store: &PoemStore, session: &Session) -> ChallengeView {
  let card = session.quiz.challenge().map(|ch| ChallengeCard {
    title: ch.poem.title.clone(),
    author: ch.poem.author.clone(),
    stars: "⭐".repeat(1 + usize::from(ch.difficulty)),
    blanked: ch.blanked_display.clone(),
    phase: session.quiz.phase(),
    reveal: ch.revealed.then(|| RevealCard {
      answer: ch.target_sentence.clone(),
      content: ch.poem.content.clone(),
      explanation_teaser: preview(&ch.poem.explanation, 100),
      poem_index: store.position_by_title(&ch.poem.title),
    }),
  });

  ChallengeView {
    challenge: card,
    scoreboard: scoreboard(session),
    history: session.state.recent_answers(session.history.challenge_recent).to_vec(),
  }
}

fn creation(session: &Session) -> CreationView {
  CreationView {
    themes: THEMES,
    styles: STYLES,
    default_themes: vec![DEFAULT_THEME],
    default_style: STYLES[0],
    default_keywords: DEFAULT_KEYWORDS,
    result: session.last_creation.as_ref().map(|poem| CreationResult {
      author: AI_AUTHOR,
      lines: poem.lines().into_iter().map(str::to_string).collect(),
      poem: poem.clone(),
    }),
    last_rating: session.last_rating,
  }
}

fn report(store: &PoemStore, session: &Session) -> ReportView {
  let stats = session.state.stats();
  ReportView {
    learned: store.len(),
    accuracy: session.state.accuracy(),
    creation_count: stats.creation_count,
    total_attempts: stats.total_attempts,
    score: stats.score,
    mastery: store
      .records()
      .iter()
      .zip(session.mastery.iter())
      .map(|(p, &percent)| MasteryRow { title: p.title.clone(), author: p.author.clone(), percent })
      .collect(),
    recent: session.state.recent_answers(session.history.report_recent).to_vec(),
  }
}
