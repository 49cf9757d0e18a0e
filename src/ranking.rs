//! Leaderboard engine: best-score-per-category ledger over the `rankings` table.
//!
//! A category is the `(book_name, chapter, total_questions)` triple; chapter
//! carries the tri-state code from `domain` (specific chapter, 0 = full
//! range, -1 = custom range). Partitioning on total_questions keeps a
//! 10-question run from being compared against a 100-question run on raw
//! score. Each write runs inside one transaction so the lookup, the
//! improvement decision and the prune cannot interleave with another writer.

use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

use crate::domain::{RankedRow, FULL_RANGE_CHAPTER};

/// Records kept per `(book, chapter_code, total_questions)` group.
const TOP_N: i64 = 10;

/// Record a finished session for `player`. Returns whether the stored record
/// was created or improved.
///
/// An existing record for the same `(player, book, chapter_code, total)` key
/// is replaced iff the score is strictly better, or equal but faster. After
/// any write the group is pruned back to its top 10 by
/// `(score DESC, time ASC)`.
pub fn record_result(
  conn: &mut Connection,
  player: &str,
  book: &str,
  chapter_code: i64,
  score: i64,
  total_questions: i64,
  time_taken: f64,
) -> rusqlite::Result<bool> {
  // Defensive clamp before any comparison.
  let score = score.min(total_questions);

  let tx = conn.transaction()?;

  let existing: Option<(i64, i64, f64)> = tx
    .query_row(
      "SELECT id, score, time_taken FROM rankings \
       WHERE player_name = ?1 AND book_name = ?2 AND chapter = ?3 AND total_questions = ?4",
      params![player, book, chapter_code, total_questions],
      |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
    )
    .optional()?;

  let improved = match existing {
    None => {
      tx.execute(
        "INSERT INTO rankings (player_name, book_name, chapter, score, total_questions, time_taken, played_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, datetime('now', 'localtime'))",
        params![player, book, chapter_code, score, total_questions, time_taken],
      )?;
      true
    }
    Some((id, old_score, old_time)) => {
      // Tie-break favors speed.
      if score > old_score || (score == old_score && time_taken < old_time) {
        tx.execute(
          "UPDATE rankings SET score = ?1, time_taken = ?2, played_at = datetime('now', 'localtime') \
           WHERE id = ?3",
          params![score, time_taken, id],
        )?;
        true
      } else {
        false
      }
    }
  };

  // Top-N retention for this exact group.
  tx.execute(
    "DELETE FROM rankings \
     WHERE book_name = ?1 AND chapter = ?2 AND total_questions = ?3 AND id NOT IN ( \
       SELECT id FROM rankings \
       WHERE book_name = ?1 AND chapter = ?2 AND total_questions = ?3 \
       ORDER BY score DESC, time_taken ASC LIMIT ?4)",
    params![book, chapter_code, total_questions, TOP_N],
  )?;

  tx.commit()?;
  debug!(target: "leaderboard", player, book, chapter_code, score, total_questions, improved, "record_result");
  Ok(improved)
}

/// The single best full-range record of a book, if any.
pub fn champion(conn: &Connection, book: &str) -> rusqlite::Result<Option<(String, i64, i64)>> {
  conn
    .query_row(
      "SELECT player_name, score, total_questions FROM rankings \
       WHERE book_name = ?1 AND chapter = ?2 \
       ORDER BY score DESC, time_taken ASC LIMIT 1",
      params![book, FULL_RANGE_CHAPTER],
      |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
    )
    .optional()
}

/// Every question-count "weight class" with at least one record in the
/// group, descending.
pub fn question_counts(conn: &Connection, book: &str, chapter_code: i64) -> rusqlite::Result<Vec<i64>> {
  let mut stmt = conn.prepare(
    "SELECT DISTINCT total_questions FROM rankings \
     WHERE book_name = ?1 AND chapter = ?2 ORDER BY total_questions DESC",
  )?;
  let rows = stmt.query_map(params![book, chapter_code], |r| r.get(0))?;
  rows.collect()
}

/// Ranked view of one leaderboard group, ordered by `(score DESC, time ASC)`.
/// Ranks follow standard RANK semantics: ties share a rank and the next
/// distinct key skips ahead by the tie-group size.
pub fn ranking(
  conn: &Connection,
  book: &str,
  chapter_code: i64,
  total_questions: i64,
) -> rusqlite::Result<Vec<RankedRow>> {
  let mut stmt = conn.prepare(
    "SELECT player_name, score, total_questions, time_taken, played_at FROM rankings \
     WHERE book_name = ?1 AND chapter = ?2 AND total_questions = ?3 \
     ORDER BY score DESC, time_taken ASC",
  )?;
  let rows = stmt.query_map(params![book, chapter_code, total_questions], |r| {
    Ok((
      r.get::<_, String>(0)?,
      r.get::<_, i64>(1)?,
      r.get::<_, i64>(2)?,
      r.get::<_, f64>(3)?,
      r.get::<_, String>(4)?,
    ))
  })?;

  let mut out: Vec<RankedRow> = Vec::new();
  let mut prev_key: Option<(i64, f64)> = None;
  let mut rank = 0u32;
  for (pos, row) in rows.enumerate() {
    let (player_name, score, total, time_taken, played_at) = row?;
    let key = (score, time_taken);
    if prev_key != Some(key) {
      rank = pos as u32 + 1;
      prev_key = Some(key);
    }
    out.push(RankedRow {
      rank,
      player_name,
      score,
      total_questions: total,
      time_taken,
      played_at,
    });
  }
  Ok(out)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::store::Store;

  fn store() -> Store {
    Store::open_in_memory().expect("store")
  }

  #[test]
  fn first_result_inserts() {
    let store = store();
    let improved = store
      .with_conn(|c| record_result(c, "Kim", "Book1", 0, 18, 20, 45.2))
      .unwrap();
    assert!(improved);
    let rows = store.with_conn(|c| ranking(c, "Book1", 0, 20)).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].score, 18);
  }

  #[test]
  fn higher_score_replaces_despite_slower_time() {
    let store = store();
    store.with_conn(|c| record_result(c, "Kim", "Book1", 0, 18, 20, 45.2)).unwrap();
    let improved = store
      .with_conn(|c| record_result(c, "Kim", "Book1", 0, 19, 20, 50.0))
      .unwrap();
    assert!(improved);
    let rows = store.with_conn(|c| ranking(c, "Book1", 0, 20)).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].score, 19);
    assert!((rows[0].time_taken - 50.0).abs() < f64::EPSILON);
  }

  #[test]
  fn equal_score_faster_time_replaces() {
    let store = store();
    store.with_conn(|c| record_result(c, "Kim", "Book1", 0, 18, 20, 45.2)).unwrap();
    let improved = store
      .with_conn(|c| record_result(c, "Kim", "Book1", 0, 18, 20, 30.0))
      .unwrap();
    assert!(improved);
    let rows = store.with_conn(|c| ranking(c, "Book1", 0, 20)).unwrap();
    assert!((rows[0].time_taken - 30.0).abs() < f64::EPSILON);
  }

  #[test]
  fn worse_or_equal_but_slower_leaves_record_untouched() {
    let store = store();
    store.with_conn(|c| record_result(c, "Kim", "Book1", 0, 18, 20, 45.2)).unwrap();
    let same_slower = store
      .with_conn(|c| record_result(c, "Kim", "Book1", 0, 18, 20, 60.0))
      .unwrap();
    let lower = store
      .with_conn(|c| record_result(c, "Kim", "Book1", 0, 10, 20, 5.0))
      .unwrap();
    assert!(!same_slower);
    assert!(!lower);
    let rows = store.with_conn(|c| ranking(c, "Book1", 0, 20)).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].score, 18);
    assert!((rows[0].time_taken - 45.2).abs() < f64::EPSILON);
  }

  #[test]
  fn score_is_clamped_to_total() {
    let store = store();
    store.with_conn(|c| record_result(c, "Kim", "Book1", 3, 99, 10, 12.0)).unwrap();
    let rows = store.with_conn(|c| ranking(c, "Book1", 3, 10)).unwrap();
    assert_eq!(rows[0].score, 10);
  }

  #[test]
  fn group_never_exceeds_top_ten() {
    let store = store();
    for i in 0..25 {
      store
        .with_conn(|c| record_result(c, &format!("player{i}"), "Book1", 0, (i % 11) as i64, 10, 100.0 - i as f64))
        .unwrap();
    }
    let rows = store.with_conn(|c| ranking(c, "Book1", 0, 10)).unwrap();
    assert_eq!(rows.len(), 10);
  }

  #[test]
  fn pruning_is_scoped_to_the_exact_group() {
    let store = store();
    for i in 0..15 {
      store
        .with_conn(|c| record_result(c, &format!("p{i}"), "Book1", 0, 5, 10, i as f64))
        .unwrap();
    }
    store.with_conn(|c| record_result(c, "solo", "Book1", 2, 5, 10, 1.0)).unwrap();
    store.with_conn(|c| record_result(c, "solo", "Book1", 0, 5, 20, 1.0)).unwrap();
    assert_eq!(store.with_conn(|c| ranking(c, "Book1", 0, 10)).unwrap().len(), 10);
    assert_eq!(store.with_conn(|c| ranking(c, "Book1", 2, 10)).unwrap().len(), 1);
    assert_eq!(store.with_conn(|c| ranking(c, "Book1", 0, 20)).unwrap().len(), 1);
  }

  #[test]
  fn rank_ties_share_and_skip() {
    let store = store();
    store.with_conn(|c| record_result(c, "a", "Book1", 0, 9, 10, 30.0)).unwrap();
    store.with_conn(|c| record_result(c, "b", "Book1", 0, 9, 10, 30.0)).unwrap();
    store.with_conn(|c| record_result(c, "d", "Book1", 0, 8, 10, 10.0)).unwrap();
    let rows = store.with_conn(|c| ranking(c, "Book1", 0, 10)).unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].rank, 1);
    assert_eq!(rows[1].rank, 1);
    assert_eq!(rows[2].rank, 3);
  }

  #[test]
  fn champion_is_best_full_range_record_only() {
    let store = store();
    store.with_conn(|c| record_result(c, "partial", "Book1", -1, 10, 10, 1.0)).unwrap();
    store.with_conn(|c| record_result(c, "chapter", "Book1", 2, 10, 10, 1.0)).unwrap();
    assert_eq!(store.with_conn(|c| champion(c, "Book1")).unwrap(), None);

    store.with_conn(|c| record_result(c, "slow", "Book1", 0, 9, 10, 60.0)).unwrap();
    store.with_conn(|c| record_result(c, "fast", "Book1", 0, 9, 10, 20.0)).unwrap();
    let champ = store.with_conn(|c| champion(c, "Book1")).unwrap();
    assert_eq!(champ, Some(("fast".to_string(), 9, 10)));
  }

  #[test]
  fn question_counts_are_distinct_descending() {
    let store = store();
    store.with_conn(|c| record_result(c, "a", "Book1", 0, 5, 10, 1.0)).unwrap();
    store.with_conn(|c| record_result(c, "b", "Book1", 0, 5, 10, 2.0)).unwrap();
    store.with_conn(|c| record_result(c, "a", "Book1", 0, 15, 20, 3.0)).unwrap();
    store.with_conn(|c| record_result(c, "a", "Book1", 0, 30, 40, 4.0)).unwrap();
    assert_eq!(store.with_conn(|c| question_counts(c, "Book1", 0)).unwrap(), vec![40, 20, 10]);
  }
}
