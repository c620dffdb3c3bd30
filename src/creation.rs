//! "AI creation": picks one of three pre-written poems, relabels the title
//! from the chosen themes and decorates it with canned highlights.
//! Nothing is generated from the keywords; they are only echoed back.

use rand::{seq::SliceRandom, Rng};
use serde::Serialize;
use tracing::{info, instrument};

use crate::error::CreationError;

pub const THEMES: [&str; 8] = [
  "山水田园", "思乡怀人", "边塞征战", "咏物言志", "送别友情", "爱情闺怨", "咏史怀古", "节日时令",
];
pub const STYLES: [&str; 5] = ["豪放飘逸", "沉郁顿挫", "清新自然", "婉约细腻", "雄浑壮阔"];
pub const DEFAULT_THEME: &str = "山水田园";
pub const DEFAULT_KEYWORDS: &str = "明月,青山,流水,秋风";
pub const ATTRIBUTION: &str = "——AI诗人创作";

struct Template {
  title: &'static str,
  content: &'static str,
  explanation: &'static str,
}

const TEMPLATES: [Template; 3] = [
  Template {
    title: "秋夜思",
    content: "明月照高楼，清辉洒九州。\n思君如满月，夜夜减清辉。\n秋风起天末，游子意如何？\n鸿雁几时到，江湖秋水多。",
    explanation: "此诗以秋夜为背景，通过明月、秋风、鸿雁等意象，表达了深切的思乡之情和游子情怀。",
  },
  Template {
    title: "山居春晓",
    content: "春山多胜事，赏玩夜忘归。\n掬水月在手，弄花香满衣。\n兴来无远近，欲去惜芳菲。\n南望鸣钟处，楼台深翠微。",
    explanation: "描绘春日山居的乐趣，展现人与自然和谐相处的意境。",
  },
  Template {
    title: "江畔送别",
    content: "杨柳渡头行客稀，罟师荡桨向临圻。\n唯有相思似春色，江南江北送君归。",
    explanation: "以春色喻相思，表达送别友人时的不舍之情。",
  },
];

const LANDSCAPE_TITLES: [&str; 3] = ["山水吟", "登高望远", "江山如画"];
const HOMESICK_TITLES: [&str; 3] = ["秋夜思", "乡愁", "月夜忆舍弟"];
const RHETORIC: [&str; 3] = ["对仗", "比喻", "拟人"];

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CreatedPoem {
  pub title: String,
  pub content: String,
  pub explanation: String,
  pub highlights: Vec<String>,
  pub themes: Vec<String>,
  pub style: String,
  pub keywords: String,
}

impl CreatedPoem {
  /// Plain-text download body.
  pub fn export_text(&self) -> String {
    format!("{}\n\n{}\n\n{}", self.title, self.content, ATTRIBUTION)
  }

  pub fn lines(&self) -> Vec<&str> {
    self.content.lines().collect()
  }
}

#[instrument(level = "info", skip_all, fields(themes = themes.len(), %style))]
pub fn generate<R: Rng + ?Sized>(
  themes: &[String],
  style: &str,
  keywords: &str,
  rng: &mut R,
) -> Result<CreatedPoem, CreationError> {
  let Some(highlight_theme) = themes.choose(rng) else {
    return Err(CreationError::NoTheme);
  };
  let highlight_theme = highlight_theme.clone();

  let template = TEMPLATES.choose(rng).unwrap_or(&TEMPLATES[0]);
  let joined = themes.concat();
  let title = if joined.contains("山水") {
    pick(&LANDSCAPE_TITLES, rng)
  } else if joined.contains("思乡") {
    pick(&HOMESICK_TITLES, rng)
  } else {
    template.title
  };

  let highlights = vec![
    format!("运用了{}修辞手法", pick(&RHETORIC, rng)),
    format!("体现了{}的诗歌风格", style),
    format!("融入了{}的典型意象", highlight_theme),
    "符合唐代诗歌的韵律要求".to_string(),
  ];

  info!(target: "creation", template = template.title, %title, %style, "Poem created");
  Ok(CreatedPoem {
    title: title.to_string(),
    content: template.content.to_string(),
    explanation: template.explanation.to_string(),
    highlights,
    themes: themes.to_vec(),
    style: style.to_string(),
    keywords: keywords.trim().to_string(),
  })
}

/// Status line for the simulated progress bar at `percent` (1..=100).
pub fn progress_stage(percent: u32) -> &'static str {
  match percent {
    0..=29 => "正在构思主题...",
    30..=59 => "正在推敲词句...",
    60..=89 => "正在调整韵律...",
    _ => "创作完成！",
  }
}

/// Percent reached after tick `i` of `steps`. Widened so huge step counts cannot overflow.
pub fn tick_percent(i: u32, steps: u32) -> u32 {
  let steps = steps.max(1);
  (u64::from(i.min(steps)) * 100 / u64::from(steps)) as u32
}

/// The `(percent, stage)` ticks of one creation run; always ends at 100.
pub fn progress_ticks(steps: u32) -> impl Iterator<Item = (u32, &'static str)> {
  let steps = steps.max(1);
  (1..=steps).map(move |i| {
    let percent = tick_percent(i, steps);
    (percent, progress_stage(percent))
  })
}

pub(crate) fn pick<R: Rng + ?Sized>(pool: &[&'static str], rng: &mut R) -> &'static str {
  pool.choose(rng).copied().unwrap_or_default()
}

#[cfg(test)]
mod tests {
  use super::*;
  use rand::{rngs::SmallRng, SeedableRng};

  fn themes(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
  }

  #[test]
  fn no_theme_is_rejected() {
    let mut rng = SmallRng::seed_from_u64(1);
    assert_eq!(generate(&[], "清新自然", "", &mut rng).unwrap_err(), CreationError::NoTheme);
  }

  #[test]
  fn landscape_theme_relabels_title() {
    for seed in 0..30 {
      let mut rng = SmallRng::seed_from_u64(seed);
      let p = generate(&themes(&["山水田园", "思乡怀人"]), "清新自然", "明月", &mut rng).expect("poem");
      assert!(LANDSCAPE_TITLES.contains(&p.title.as_str()), "title {}", p.title);
    }
  }

  #[test]
  fn homesick_theme_relabels_title() {
    let mut rng = SmallRng::seed_from_u64(8);
    let p = generate(&themes(&["思乡怀人"]), "婉约细腻", "", &mut rng).expect("poem");
    assert!(HOMESICK_TITLES.contains(&p.title.as_str()));
  }

  #[test]
  fn other_themes_keep_template_title_and_content() {
    for seed in 0..30 {
      let mut rng = SmallRng::seed_from_u64(seed);
      let p = generate(&themes(&["送别友情"]), "雄浑壮阔", "", &mut rng).expect("poem");
      let t = TEMPLATES.iter().find(|t| t.content == p.content).expect("template content unmodified");
      assert_eq!(p.title, t.title);
      assert_eq!(p.explanation, t.explanation);
    }
  }

  #[test]
  fn highlights_mention_style_and_a_chosen_theme() {
    let mut rng = SmallRng::seed_from_u64(3);
    let chosen = themes(&["咏物言志", "节日时令"]);
    let p = generate(&chosen, "豪放飘逸", "", &mut rng).expect("poem");
    assert_eq!(p.highlights.len(), 4);
    assert_eq!(p.highlights[1], "体现了豪放飘逸的诗歌风格");
    assert!(chosen.iter().any(|t| p.highlights[2].contains(t.as_str())));
  }

  #[test]
  fn export_text_layout() {
    let mut rng = SmallRng::seed_from_u64(0);
    let p = generate(&themes(&["送别友情"]), "清新自然", "", &mut rng).expect("poem");
    let text = p.export_text();
    assert!(text.starts_with(&format!("{}\n\n", p.title)));
    assert!(text.ends_with("\n\n——AI诗人创作"));
    assert!(text.contains(&p.content));
  }

  #[test]
  fn progress_stages() {
    assert_eq!(progress_stage(1), "正在构思主题...");
    assert_eq!(progress_stage(30), "正在推敲词句...");
    assert_eq!(progress_stage(89), "正在调整韵律...");
    assert_eq!(progress_stage(100), "创作完成！");
  }

  #[test]
  fn single_step_jumps_to_done() {
    let ticks: Vec<_> = progress_ticks(1).collect();
    assert_eq!(ticks, [(100, "创作完成！")]);
    assert_eq!(progress_ticks(0).collect::<Vec<_>>(), ticks);
  }

  #[test]
  fn three_steps_round_down() {
    let percents: Vec<u32> = progress_ticks(3).map(|(p, _)| p).collect();
    assert_eq!(percents, [33, 66, 100]);
  }

  #[test]
  fn hundred_steps_walk_every_percent() {
    let ticks: Vec<_> = progress_ticks(100).collect();
    assert_eq!(ticks.len(), 100);
    assert!(ticks.iter().enumerate().all(|(i, &(p, _))| p == i as u32 + 1));
    assert_eq!(ticks[0].1, "正在构思主题...");
    assert_eq!(ticks[99].1, "创作完成！");
  }

  #[test]
  fn tick_percent_survives_huge_step_counts() {
    assert_eq!(tick_percent(u32::MAX, u32::MAX), 100);
    assert_eq!(tick_percent(u32::MAX / 2, u32::MAX), 49);
    assert_eq!(tick_percent(1, u32::MAX), 0);
  }
}
