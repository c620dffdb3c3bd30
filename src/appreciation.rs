//! Appreciation notes for one poem: fixed theme table plus randomly drawn
//! decorations. Drawn once when the poem is selected, then rendered as-is.

use rand::Rng;
use serde::Serialize;

use crate::creation::pick;
use crate::domain::PoemRecord;
use crate::store::PoemStore;
use crate::util::preview;

pub const POEM_FORM: &str = "五言绝句";
pub const STUDY_TIPS: [&str; 4] = [
  "尝试背诵全诗",
  "理解诗歌创作背景",
  "体会诗人情感表达",
  "学习诗歌的格律特点",
];

const BACKGROUNDS: [&str; 4] = ["山水田园", "思乡怀人", "边塞征战", "咏物言志"];
const THEME_ROLES: [&str; 3] = ["贯穿全诗", "点睛之笔", "情感核心"];
const LANGUAGE_STYLES: [&str; 3] = ["清新自然", "雄浑豪放", "婉约含蓄"];
const RHETORIC: [&str; 3] = ["比喻", "拟人", "对偶"];
const IMAGERY: [&str; 3] = ["自然意象", "人文意象", "情感意象"];
const DEFAULT_THEMES: [&str; 2] = ["古典之美", "诗意情怀"];
const MAX_RELATED: usize = 2;

fn core_themes(title: &str) -> &'static [&'static str] {
  match title {
    "静夜思" => &["思乡之情", "月光意象", "游子情怀"],
    "春晓" => &["惜春之感", "自然之美", "时光流逝"],
    "登鹳雀楼" => &["登高望远", "人生哲理", "进取精神"],
    "悯农" => &["民生关怀", "劳动价值", "节约意识"],
    "江雪" => &["孤寂之境", "坚韧品格", "冬日景象"],
    _ => &DEFAULT_THEMES,
  }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ThemeNote {
  pub theme: &'static str,
  pub role: &'static str,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppreciationNotes {
  pub poem_index: usize,
  pub background: String,
  pub themes: Vec<ThemeNote>,
  pub art_features: Vec<String>,
}

pub fn draw_notes<R: Rng + ?Sized>(poem_index: usize, poem: &PoemRecord, rng: &mut R) -> AppreciationNotes {
  let background = format!("{}诗", pick(&BACKGROUNDS, rng));
  let themes = core_themes(&poem.title)
    .iter()
    .map(|&theme| ThemeNote { theme, role: pick(&THEME_ROLES, rng) })
    .collect();
  let art_features = vec![
    format!("语言风格：{}", pick(&LANGUAGE_STYLES, rng)),
    format!("修辞手法：{}的巧妙运用", pick(&RHETORIC, rng)),
    format!("意象选择：{}的精准把握", pick(&IMAGERY, rng)),
  ];
  AppreciationNotes { poem_index, background, themes, art_features }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RelatedPoem {
  pub index: usize,
  pub title: String,
  pub teaser: String,
}

/// Up to two other poems by the same author.
pub fn related_poems(store: &PoemStore, poem: &PoemRecord) -> Vec<RelatedPoem> {
  store
    .records()
    .iter()
    .enumerate()
    .filter(|(_, p)| p.author == poem.author && p.title != poem.title)
    .take(MAX_RELATED)
    .map(|(index, p)| RelatedPoem { index, title: p.title.clone(), teaser: preview(&p.content, 10) })
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::store::tests::raw;
  use rand::{rngs::SmallRng, SeedableRng};

  #[test]
  fn known_title_uses_theme_table() {
    let store = PoemStore::from_raw(vec![raw("静夜思", "李白", "床前明月光，疑是地上霜。")]);
    let poem = store.get(0).expect("poem");
    let notes = draw_notes(0, poem, &mut SmallRng::seed_from_u64(1));
    let names: Vec<&str> = notes.themes.iter().map(|t| t.theme).collect();
    assert_eq!(names, ["思乡之情", "月光意象", "游子情怀"]);
    assert!(notes.background.ends_with('诗'));
    assert_eq!(notes.art_features.len(), 3);
  }

  #[test]
  fn unknown_title_falls_back() {
    let store = PoemStore::from_raw(vec![raw("无题", "李商隐", "相见时难别亦难，东风无力百花残。")]);
    let notes = draw_notes(0, store.get(0).expect("poem"), &mut SmallRng::seed_from_u64(2));
    let names: Vec<&str> = notes.themes.iter().map(|t| t.theme).collect();
    assert_eq!(names, DEFAULT_THEMES);
  }

  #[test]
  fn related_are_same_author_only_and_capped() {
    let store = PoemStore::from_raw(vec![
      raw("静夜思", "李白", "床前明月光，疑是地上霜。"),
      raw("春晓", "孟浩然", "春眠不觉晓，处处闻啼鸟。"),
      raw("望庐山瀑布", "李白", "日照香炉生紫烟，遥看瀑布挂前川。"),
      raw("早发白帝城", "李白", "朝辞白帝彩云间，千里江陵一日还。"),
      raw("赠汪伦", "李白", "李白乘舟将欲行，忽闻岸上踏歌声。"),
    ]);
    let related = related_poems(&store, store.get(0).expect("poem"));
    assert_eq!(related.len(), 2);
    assert_eq!(related[0].title, "望庐山瀑布");
    assert_eq!(related[0].index, 2);
    assert_eq!(related[0].teaser, "日照香炉生紫烟，遥看...");
    assert_eq!(related[1].title, "早发白帝城");
  }
}
