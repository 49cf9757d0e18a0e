//! Domain models used by the backend: catalog entries, questions, and ranking rows.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Chapter code for a result played over the book's full chapter range.
/// Records with this code form the "integrated champion" pool.
pub const FULL_RANGE_CHAPTER: i64 = 0;
/// Chapter code for a custom/partial range. Excluded from the champion view.
pub const CUSTOM_RANGE_CHAPTER: i64 = -1;

/// One catalog entry as stored in the `words` table.
/// `meaning_group` holds semicolon-delimited alternative meanings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WordEntry {
  pub term: String,
  pub meaning_group: String,
  pub word_type: String,
  pub chapter: i64,
}

/// A quiz question derived from a [`WordEntry`] at session-build time.
/// The correct meaning is resolved once and fixed for the session's lifetime.
#[derive(Clone, Debug, Serialize)]
pub struct Question {
  pub term: String,
  pub correct_meaning: String,
  pub word_type: String,
  pub chapter: i64,
}

impl WordEntry {
  /// Resolve the meaning group to one concrete meaning, chosen uniformly at
  /// random among the non-empty alternatives. Falls back to the raw text
  /// verbatim when no usable alternative remains.
  pub fn resolve_question<R: Rng>(&self, rng: &mut R) -> Question {
    let alternatives: Vec<&str> = self
      .meaning_group
      .split(';')
      .map(str::trim)
      .filter(|s| !s.is_empty())
      .collect();
    let correct_meaning = if alternatives.is_empty() {
      self.meaning_group.clone()
    } else {
      alternatives[rng.gen_range(0..alternatives.len())].to_string()
    };
    Question {
      term: self.term.clone(),
      correct_meaning,
      word_type: self.word_type.clone(),
      chapter: self.chapter,
    }
  }
}

/// Classify the chapter code for a played range.
///
/// Full-range play (book minimum through maximum) gets the integrated-champion
/// code `0`; a single chapter keeps its own number; anything else is a
/// custom range, `-1`.
pub fn classify_chapter_code(low: i64, high: i64, bounds: Option<(i64, i64)>) -> i64 {
  if let Some((min, max)) = bounds {
    if low == min && high == max {
      return FULL_RANGE_CHAPTER;
    }
  }
  if low == high {
    low
  } else {
    CUSTOM_RANGE_CHAPTER
  }
}

/// A leaderboard row with its computed rank. Standard RANK semantics:
/// equal `(score, time_taken)` share a rank, the next distinct key skips
/// ahead by the tie-group size.
#[derive(Clone, Debug, Serialize)]
pub struct RankedRow {
  pub rank: u32,
  pub player_name: String,
  pub score: i64,
  pub total_questions: i64,
  pub time_taken: f64,
  pub played_at: String,
}
