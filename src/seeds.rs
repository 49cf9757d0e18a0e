//! Built-in seed word bank.
//!
//! Inserted only when the catalog is empty, so a fresh checkout is playable
//! without an external word database or config bank.

use crate::domain::WordEntry;

pub const SEED_BOOK: &str = "Starter";

fn word(term: &str, meanings: &str, word_type: &str, chapter: i64) -> (String, WordEntry) {
  (
    SEED_BOOK.to_string(),
    WordEntry {
      term: term.into(),
      meaning_group: meanings.into(),
      word_type: word_type.into(),
      chapter,
    },
  )
}

/// Minimal three-chapter demo book. Enough distinct meanings per chapter
/// range that option generation rarely needs placeholders.
pub fn seed_word_bank() -> Vec<(String, WordEntry)> {
  vec![
    word("apple", "사과", "noun", 1),
    word("water", "물", "noun", 1),
    word("run", "달리다;뛰다", "verb", 1),
    word("eat", "먹다", "verb", 1),
    word("big", "큰;커다란", "adjective", 1),
    word("book", "책", "noun", 2),
    word("teacher", "선생님;교사", "noun", 2),
    word("study", "공부하다", "verb", 2),
    word("fast", "빠른", "adjective", 2),
    word("weather", "날씨", "noun", 2),
    word("promise", "약속;약속하다", "noun", 3),
    word("travel", "여행;여행하다", "noun", 3),
    word("remember", "기억하다;외우다", "verb", 3),
    word("quiet", "조용한", "adjective", 3),
    word("library", "도서관", "noun", 3),
  ]
}
