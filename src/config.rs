//! Loading application configuration (database path, quiz defaults, and an
//! optional word bank) from TOML.
//!
//! See `AppConfig` for the expected schema.

use serde::Deserialize;
use tracing::{error, info};

use crate::domain::WordEntry;

#[derive(Clone, Debug, Deserialize, Default)]
pub struct AppConfig {
  #[serde(default)]
  pub database: DatabaseCfg,
  #[serde(default)]
  pub quiz: QuizCfg,
  #[serde(default)]
  pub words: Vec<WordCfg>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct DatabaseCfg {
  #[serde(default = "default_db_path")]
  pub path: String,
}

impl Default for DatabaseCfg {
  fn default() -> Self {
    Self { path: default_db_path() }
  }
}

#[derive(Clone, Debug, Deserialize)]
pub struct QuizCfg {
  /// Used when a start request does not name a question count.
  #[serde(default = "default_question_count")]
  pub default_question_count: usize,
}

impl Default for QuizCfg {
  fn default() -> Self {
    Self { default_question_count: default_question_count() }
  }
}

/// Word entry accepted in TOML configuration. `korean` holds
/// semicolon-delimited alternative meanings, matching the catalog column.
#[derive(Clone, Debug, Deserialize)]
pub struct WordCfg {
  pub book: String,
  #[serde(default)]
  pub chapter: i64,
  #[serde(default, rename = "type")]
  pub word_type: String,
  pub english: String,
  pub korean: String,
}

impl WordCfg {
  pub fn to_catalog_row(&self) -> (String, WordEntry) {
    (
      self.book.clone(),
      WordEntry {
        term: self.english.clone(),
        meaning_group: self.korean.clone(),
        word_type: self.word_type.clone(),
        chapter: self.chapter,
      },
    )
  }
}

fn default_db_path() -> String {
  "vocaquiz.db".into()
}

fn default_question_count() -> usize {
  10
}

/// Attempt to load `AppConfig` from APP_CONFIG_PATH. On any parsing/IO error,
/// returns None.
pub fn load_app_config_from_env() -> Option<AppConfig> {
  let path = std::env::var("APP_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match toml::from_str::<AppConfig>(&s) {
      Ok(cfg) => {
        info!(target: "vocaquiz_backend", %path, "Loaded app config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "vocaquiz_backend", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "vocaquiz_backend", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn defaults_apply_when_sections_are_missing() {
    let cfg: AppConfig = toml::from_str("").expect("empty config");
    assert_eq!(cfg.database.path, "vocaquiz.db");
    assert_eq!(cfg.quiz.default_question_count, 10);
    assert!(cfg.words.is_empty());
  }

  #[test]
  fn word_bank_entries_parse() {
    let cfg: AppConfig = toml::from_str(
      r#"
      [[words]]
      book = "Voca 1"
      chapter = 2
      type = "noun"
      english = "river"
      korean = "강;하천"
      "#,
    )
    .expect("config");
    assert_eq!(cfg.words.len(), 1);
    let (book, entry) = cfg.words[0].to_catalog_row();
    assert_eq!(book, "Voca 1");
    assert_eq!(entry.chapter, 2);
    assert_eq!(entry.meaning_group, "강;하천");
  }
}
