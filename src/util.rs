//! Small utility helpers used across modules.

/// Log-safe truncation for large strings.
/// Avoids spamming logs with huge request/response payloads.
pub fn trunc_for_log(s: &str, max: usize) -> String {
  if s.len() <= max {
    s.to_string()
  } else {
    let cut = s.char_indices().take_while(|(i, _)| *i <= max).map(|(i, _)| i).last().unwrap_or(0);
    format!("{}… ({} bytes total)", &s[..cut], s.len())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn short_strings_pass_through() {
    assert_eq!(trunc_for_log("hello", 10), "hello");
  }

  #[test]
  fn long_strings_are_cut_on_char_boundaries() {
    let s = "한국어 텍스트가 아주 길다".repeat(10);
    let out = trunc_for_log(&s, 16);
    assert!(out.contains("bytes total"));
  }
}
