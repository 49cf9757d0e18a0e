//! Sqlite-backed storage: the word catalog and the rankings ledger.
//!
//! The catalog is read-only from the game's point of view (populated
//! externally, or from the built-in seed bank when empty). All access goes
//! through a single `Mutex<Connection>`; rusqlite is synchronous and the
//! queries here are small, so holding the lock across one statement is fine.

use std::sync::Mutex;

use rusqlite::{params, Connection, OptionalExtension};

use crate::domain::{WordEntry, FULL_RANGE_CHAPTER};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS words (
  id         INTEGER PRIMARY KEY AUTOINCREMENT,
  book_name  TEXT NOT NULL,
  chapter    INTEGER NOT NULL DEFAULT 0,
  type       TEXT NOT NULL DEFAULT '',
  english    TEXT NOT NULL,
  korean     TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS rankings (
  id              INTEGER PRIMARY KEY AUTOINCREMENT,
  player_name     TEXT NOT NULL,
  book_name       TEXT NOT NULL,
  chapter         INTEGER NOT NULL,
  score           INTEGER NOT NULL,
  total_questions INTEGER NOT NULL,
  time_taken      REAL NOT NULL,
  played_at       TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_words_book_chapter ON words (book_name, chapter);
CREATE INDEX IF NOT EXISTS idx_rankings_group ON rankings (book_name, chapter, total_questions);
"#;

pub struct Store {
  conn: Mutex<Connection>,
}

impl Store {
  pub fn open(path: &str) -> rusqlite::Result<Self> {
    let conn = Connection::open(path)?;
    conn.execute_batch(SCHEMA)?;
    Ok(Self { conn: Mutex::new(conn) })
  }

  /// In-memory store, used by tests.
  pub fn open_in_memory() -> rusqlite::Result<Self> {
    let conn = Connection::open_in_memory()?;
    conn.execute_batch(SCHEMA)?;
    Ok(Self { conn: Mutex::new(conn) })
  }

  /// Run `f` with exclusive access to the connection. Leaderboard writes use
  /// this to wrap lookup + decide + write + prune in one transaction.
  pub fn with_conn<T>(&self, f: impl FnOnce(&mut Connection) -> rusqlite::Result<T>) -> rusqlite::Result<T> {
    let mut conn = self.conn.lock().expect("store mutex poisoned");
    f(&mut conn)
  }

  pub fn word_count(&self) -> rusqlite::Result<i64> {
    let conn = self.conn.lock().expect("store mutex poisoned");
    conn.query_row("SELECT COUNT(*) FROM words", [], |r| r.get(0))
  }

  /// Bulk-insert catalog rows, one `(book, entry)` pair each.
  pub fn insert_words(&self, rows: &[(String, WordEntry)]) -> rusqlite::Result<usize> {
    let conn = self.conn.lock().expect("store mutex poisoned");
    let mut stmt = conn.prepare(
      "INSERT INTO words (book_name, chapter, type, english, korean) VALUES (?1, ?2, ?3, ?4, ?5)",
    )?;
    for (book, entry) in rows {
      stmt.execute(params![book, entry.chapter, entry.word_type, entry.term, entry.meaning_group])?;
    }
    Ok(rows.len())
  }

  /// Distinct book names present in the catalog, sorted.
  pub fn list_books(&self) -> rusqlite::Result<Vec<String>> {
    let conn = self.conn.lock().expect("store mutex poisoned");
    let mut stmt = conn.prepare("SELECT DISTINCT book_name FROM words ORDER BY book_name")?;
    let rows = stmt.query_map([], |r| r.get::<_, String>(0))?;
    rows.collect()
  }

  /// Distinct chapter numbers for a book, ascending, excluding the sentinel
  /// chapter 0. The column is read as raw text so malformed catalog values
  /// can be skipped instead of failing the whole listing.
  pub fn list_chapters(&self, book: &str) -> rusqlite::Result<Vec<i64>> {
    let conn = self.conn.lock().expect("store mutex poisoned");
    let mut stmt =
      conn.prepare("SELECT DISTINCT CAST(chapter AS TEXT) FROM words WHERE book_name = ?1")?;
    let raw = stmt.query_map(params![book], |r| r.get::<_, String>(0))?;
    let mut chapters: Vec<i64> = raw
      .filter_map(|r| r.ok())
      .filter_map(|s| s.trim().parse::<i64>().ok())
      .filter(|c| *c != FULL_RANGE_CHAPTER)
      .collect();
    chapters.sort_unstable();
    chapters.dedup();
    Ok(chapters)
  }

  /// Distinct non-empty word types for a book, lexicographically sorted.
  pub fn list_types(&self, book: &str) -> rusqlite::Result<Vec<String>> {
    let conn = self.conn.lock().expect("store mutex poisoned");
    let mut stmt = conn
      .prepare("SELECT DISTINCT type FROM words WHERE book_name = ?1 AND type <> '' ORDER BY type")?;
    let rows = stmt.query_map(params![book], |r| r.get::<_, String>(0))?;
    rows.collect()
  }

  /// Smallest and largest non-sentinel chapter of a book, if it has any.
  pub fn chapter_bounds(&self, book: &str) -> rusqlite::Result<Option<(i64, i64)>> {
    let conn = self.conn.lock().expect("store mutex poisoned");
    conn
      .query_row(
        "SELECT MIN(chapter), MAX(chapter) FROM words WHERE book_name = ?1 AND chapter <> 0",
        params![book],
        |r| {
          let min: Option<i64> = r.get(0)?;
          let max: Option<i64> = r.get(1)?;
          Ok(min.zip(max))
        },
      )
      .optional()
      .map(|o| o.flatten())
  }

  /// Catalog entries of `book` with chapter in `lo..=hi`.
  ///
  /// `type_filter` of `None` or an empty slice means unrestricted; a
  /// non-empty slice restricts to those types exactly.
  pub fn fetch_words(
    &self,
    book: &str,
    lo: i64,
    hi: i64,
    type_filter: Option<&[String]>,
  ) -> rusqlite::Result<Vec<WordEntry>> {
    let conn = self.conn.lock().expect("store mutex poisoned");

    let mut sql = String::from(
      "SELECT english, korean, type, chapter FROM words \
       WHERE book_name = ?1 AND chapter BETWEEN ?2 AND ?3",
    );
    let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> =
      vec![Box::new(book.to_string()), Box::new(lo), Box::new(hi)];
    if let Some(types) = type_filter {
      if !types.is_empty() {
        let placeholders: Vec<String> =
          (0..types.len()).map(|i| format!("?{}", i + 4)).collect();
        sql.push_str(&format!(" AND type IN ({})", placeholders.join(", ")));
        for t in types {
          params_vec.push(Box::new(t.clone()));
        }
      }
    }

    let param_refs: Vec<&dyn rusqlite::ToSql> = params_vec.iter().map(|p| p.as_ref()).collect();
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(param_refs.as_slice(), |r| {
      Ok(WordEntry {
        term: r.get(0)?,
        meaning_group: r.get(1)?,
        word_type: r.get(2)?,
        chapter: r.get(3)?,
      })
    })?;
    rows.collect()
  }

  /// Per-book word counts, for the startup inventory log.
  pub fn book_counts(&self) -> rusqlite::Result<Vec<(String, i64)>> {
    let conn = self.conn.lock().expect("store mutex poisoned");
    let mut stmt =
      conn.prepare("SELECT book_name, COUNT(*) FROM words GROUP BY book_name ORDER BY book_name")?;
    let rows = stmt.query_map([], |r| Ok((r.get(0)?, r.get(1)?)))?;
    rows.collect()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn entry(term: &str, meaning: &str, word_type: &str, chapter: i64) -> WordEntry {
    WordEntry {
      term: term.into(),
      meaning_group: meaning.into(),
      word_type: word_type.into(),
      chapter,
    }
  }

  fn seeded_store() -> Store {
    let store = Store::open_in_memory().expect("store");
    store
      .insert_words(&[
        ("TestBook".into(), entry("apple", "사과", "noun", 1)),
        ("TestBook".into(), entry("run", "달리다;뛰다", "verb", 1)),
        ("TestBook".into(), entry("book", "책", "noun", 2)),
        ("TestBook".into(), entry("fast", "빠른", "adj", 2)),
        ("TestBook".into(), entry("sky", "하늘", "noun", 3)),
        ("TestBook".into(), entry("misc", "기타", "", 0)),
        ("Other".into(), entry("water", "물", "noun", 1)),
      ])
      .expect("insert");
    store
  }

  #[test]
  fn books_are_distinct_and_sorted() {
    let store = seeded_store();
    assert_eq!(store.list_books().unwrap(), vec!["Other".to_string(), "TestBook".to_string()]);
  }

  #[test]
  fn chapters_exclude_sentinel_and_malformed_values() {
    let store = seeded_store();
    // Sqlite's type affinity keeps a non-numeric chapter as text; the
    // listing must skip it rather than fail.
    store
      .with_conn(|conn| {
        conn.execute(
          "INSERT INTO words (book_name, chapter, type, english, korean) VALUES ('TestBook', 'oops', '', 'bad', 'x')",
          [],
        )?;
        Ok(())
      })
      .unwrap();
    assert_eq!(store.list_chapters("TestBook").unwrap(), vec![1, 2, 3]);
  }

  #[test]
  fn types_are_nonempty_and_sorted() {
    let store = seeded_store();
    assert_eq!(
      store.list_types("TestBook").unwrap(),
      vec!["adj".to_string(), "noun".to_string(), "verb".to_string()]
    );
  }

  #[test]
  fn fetch_respects_chapter_range_and_book() {
    let store = seeded_store();
    let words = store.fetch_words("TestBook", 1, 2, None).unwrap();
    assert_eq!(words.len(), 4);
    assert!(words.iter().all(|w| (1..=2).contains(&w.chapter)));
  }

  #[test]
  fn empty_type_filter_means_unrestricted() {
    let store = seeded_store();
    let none = store.fetch_words("TestBook", 1, 3, None).unwrap();
    let empty = store.fetch_words("TestBook", 1, 3, Some(&[])).unwrap();
    assert_eq!(none.len(), empty.len());
    assert_eq!(none.len(), 5);
  }

  #[test]
  fn type_filter_restricts() {
    let store = seeded_store();
    let filter = vec!["noun".to_string()];
    let nouns = store.fetch_words("TestBook", 1, 3, Some(&filter)).unwrap();
    assert_eq!(nouns.len(), 3);
    assert!(nouns.iter().all(|w| w.word_type == "noun"));
  }

  #[test]
  fn no_match_is_empty_not_error() {
    let store = seeded_store();
    assert!(store.fetch_words("Nope", 1, 9, None).unwrap().is_empty());
  }

  #[test]
  fn chapter_bounds_skip_sentinel() {
    let store = seeded_store();
    assert_eq!(store.chapter_bounds("TestBook").unwrap(), Some((1, 3)));
    assert_eq!(store.chapter_bounds("Nope").unwrap(), None);
  }
}
