//! Hanzi → Hanyu Pinyin reading aids for the appreciation screen.
//!
//! Per-character conversion (no word segmentation), so polyphonic characters
//! use the default reading.
use pinyin::ToPinyin;

/// Tone-marked syllables for the Han characters of `line`, space-separated.
/// Punctuation and other non-Han characters are dropped.
///
///   "床前明月光，" -> "chuáng qián míng yuè guāng"
pub fn line_pinyin(line: &str) -> String {
  line
    .chars()
    .filter_map(|ch| ch.to_pinyin())
    .map(|py| py.with_tone())
    .collect::<Vec<_>>()
    .join(" ")
}
