//! Small text helpers shared by the view layer and exports.

/// First `max_chars` characters followed by "..." (always appended, as teaser text).
pub fn preview(s: &str, max_chars: usize) -> String {
  let head: String = s.chars().take(max_chars).collect();
  format!("{head}...")
}

/// Break poem text after every `。` and `，`, one display line per clause.
pub fn display_lines(content: &str) -> Vec<String> {
  let mut lines = Vec::new();
  let mut cur = String::new();
  for ch in content.chars() {
    cur.push(ch);
    if ch == '。' || ch == '，' || ch == '\n' {
      push_trimmed(&mut lines, &cur);
      cur.clear();
    }
  }
  push_trimmed(&mut lines, &cur);
  lines
}

/// RFC 5987 value for `Content-Disposition: attachment; filename*=`.
pub fn attachment_disposition(file_name: &str) -> String {
  let mut encoded = String::with_capacity(file_name.len() * 3);
  for b in file_name.bytes() {
    if b.is_ascii_alphanumeric() || matches!(b, b'.' | b'-' | b'_' | b'~') {
      encoded.push(b as char);
    } else {
      encoded.push_str(&format!("%{b:02X}"));
    }
  }
  format!("attachment; filename=\"download.txt\"; filename*=UTF-8''{encoded}")
}

fn push_trimmed(lines: &mut Vec<String>, s: &str) {
  let t = s.trim();
  if !t.is_empty() {
    lines.push(t.to_string());
  }
}
