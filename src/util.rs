//! Small utility helpers used across modules.

/// Log-safe truncation for large strings.
/// Avoids spamming logs with huge request/response payloads.
/// Input may be arbitrary user text (e.g. upload filenames), so the cut
/// backs up to a char boundary rather than slicing mid-codepoint.
pub fn trunc_for_log(s: &str, max: usize) -> String {
  if s.len() <= max {
    return s.to_string();
  }
  let mut cut = max;
  while !s.is_char_boundary(cut) {
    cut -= 1;
  }
  format!("{}… ({} bytes total)", &s[..cut], s.len())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn short_strings_pass_through() {
    assert_eq!(trunc_for_log("hello", 10), "hello");
  }

  #[test]
  fn long_strings_are_cut_with_size_note() {
    let out = trunc_for_log("abcdefghij", 4);
    assert!(out.starts_with("abcd"));
    assert!(out.contains("10 bytes"));
  }

  #[test]
  fn multibyte_input_never_splits_a_codepoint() {
    // byte 6 lands inside the two-byte 'é'; the cut must back up, not panic
    let out = trunc_for_log("quizzé.docx", 6);
    assert!(out.starts_with("quizz"));
    assert!(out.contains("12 bytes"));

    let out = trunc_for_log("数学测验.docx", 4);
    assert!(out.starts_with("数"));
  }
}
