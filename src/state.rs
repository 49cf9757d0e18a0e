//! Application state: the sqlite store handle and the active quiz session.
//!
//! This module owns:
//!   - the `Store` (word catalog + rankings ledger)
//!   - the single session slot (one player per process run)
//!   - quiz defaults taken from config
//!
//! The session slot is `None` in the setup stage; starting a quiz fills it
//! and a reset clears it again.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{info, instrument};

use crate::config::{load_app_config_from_env, AppConfig};
use crate::seeds::seed_word_bank;
use crate::session::QuizSession;
use crate::store::Store;

#[derive(Clone)]
pub struct AppState {
  pub store: Arc<Store>,
  pub session: Arc<RwLock<Option<QuizSession>>>,
  pub default_question_count: usize,
}

impl AppState {
  /// Build state from env: load config, open the store, seed an empty
  /// catalog, log the startup inventory.
  #[instrument(level = "info", skip_all)]
  pub fn new() -> rusqlite::Result<Self> {
    let cfg = load_app_config_from_env().unwrap_or_default();
    let db_path = std::env::var("DB_PATH").unwrap_or_else(|_| cfg.database.path.clone());
    let store = Store::open(&db_path)?;
    info!(target: "vocaquiz_backend", %db_path, "Catalog store opened");

    Self::seed_if_empty(&store, &cfg)?;

    for (book, count) in store.book_counts()? {
      info!(target: "quiz", %book, words = count, "Startup catalog inventory");
    }

    Ok(Self {
      store: Arc::new(store),
      session: Arc::new(RwLock::new(None)),
      default_question_count: cfg.quiz.default_question_count,
    })
  }

  /// Populate an empty catalog: config-bank words first, built-in seed book
  /// as the last resort. A non-empty catalog is left untouched so repeated
  /// startups never duplicate rows.
  fn seed_if_empty(store: &Store, cfg: &AppConfig) -> rusqlite::Result<()> {
    if store.word_count()? > 0 {
      return Ok(());
    }
    let rows: Vec<_> = if cfg.words.is_empty() {
      seed_word_bank()
    } else {
      cfg.words.iter().map(|w| w.to_catalog_row()).collect()
    };
    let source = if cfg.words.is_empty() { "builtin_seed" } else { "config_bank" };
    let inserted = store.insert_words(&rows)?;
    info!(target: "vocaquiz_backend", inserted, source, "Seeded empty word catalog");
    Ok(())
  }

  #[cfg(test)]
  pub fn for_tests(store: Store) -> Self {
    Self {
      store: Arc::new(store),
      session: Arc::new(RwLock::new(None)),
      default_question_count: 10,
    }
  }
}
