//! Quiz session state machine.
//!
//! One session drives a finite set of questions from start to finish:
//! `Playing` while questions remain, `Finished` once the last answer lands,
//! `Ranking` after the result has been recorded. "Setup" is the empty
//! session slot in `AppState`; a reset simply clears the slot. All state
//! lives in this value and every mutation goes through these methods, never
//! through ambient globals.

use std::collections::{HashMap, HashSet};
use std::time::Instant;

use rand::seq::SliceRandom;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::{Question, WordEntry};
use crate::options::{generate_options, OPTION_COUNT};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
  Playing,
  Finished,
  Ranking,
}

/// Validated start parameters (range check happens before construction).
#[derive(Clone, Debug)]
pub struct StartParams {
  pub book: String,
  pub chapter_low: i64,
  pub chapter_high: i64,
  pub requested_count: usize,
}

/// Outcome of one answer submission, also reused as the unchanged view for
/// duplicate submissions (then `correct` is `None`).
#[derive(Clone, Debug)]
pub struct AnswerOutcome {
  pub correct: Option<bool>,
  pub correct_meaning: Option<String>,
  pub current_index: usize,
  pub score: u32,
  pub finished: bool,
}

pub struct QuizSession {
  pub id: Uuid,
  pub book: String,
  pub chapter_low: i64,
  pub chapter_high: i64,
  pub chapter_code: i64,
  /// Fewer words were available than requested.
  pub capped: bool,
  stage: Stage,
  questions: Vec<Question>,
  current_index: usize,
  score: u32,
  solved: HashSet<usize>,
  options_by_index: HashMap<usize, Vec<String>>,
  started_at: Instant,
  finished_at: Option<Instant>,
}

impl QuizSession {
  /// Build a playing session from the fetched word set: draw a uniform
  /// random sample of `requested_count` without replacement (all of them
  /// when fewer exist), then fix each question's correct meaning.
  pub fn start(params: StartParams, chapter_code: i64, mut words: Vec<WordEntry>) -> Self {
    let mut rng = rand::thread_rng();
    let capped = words.len() < params.requested_count;
    words.shuffle(&mut rng);
    words.truncate(params.requested_count.min(words.len()));
    let questions: Vec<Question> = words.iter().map(|w| w.resolve_question(&mut rng)).collect();

    Self {
      id: Uuid::new_v4(),
      book: params.book,
      chapter_low: params.chapter_low,
      chapter_high: params.chapter_high,
      chapter_code,
      capped,
      stage: Stage::Playing,
      questions,
      current_index: 0,
      score: 0,
      solved: HashSet::new(),
      options_by_index: HashMap::new(),
      started_at: Instant::now(),
      finished_at: None,
    }
  }

  pub fn stage(&self) -> Stage {
    self.stage
  }

  pub fn total_questions(&self) -> usize {
    self.questions.len()
  }

  pub fn current_index(&self) -> usize {
    self.current_index
  }

  pub fn score(&self) -> u32 {
    self.score
  }

  pub fn question(&self, index: usize) -> Option<&Question> {
    self.questions.get(index)
  }

  /// Option set for one question index, generated once and stable across
  /// repeated reads. Regenerating per read would let the options visibly
  /// reshuffle between renders of the same question.
  pub fn options_for(&mut self, index: usize) -> Option<Vec<String>> {
    if index >= self.questions.len() {
      return None;
    }
    if let Some(cached) = self.options_by_index.get(&index) {
      return Some(cached.clone());
    }
    let pool: Vec<String> = self.questions.iter().map(|q| q.correct_meaning.clone()).collect();
    let correct = self.questions[index].correct_meaning.clone();
    let opts = generate_options(&correct, &pool, OPTION_COUNT, &mut rand::thread_rng());
    self.options_by_index.insert(index, opts.clone());
    Some(opts)
  }

  /// Submit an answer for `index`. An already-solved index (or any
  /// submission once the session left the playing stage) is a no-op and
  /// returns the current view unchanged, so a double-dispatched click can
  /// never score twice. Returns `None` for an out-of-range index.
  pub fn submit_answer(&mut self, index: usize, selected: &str) -> Option<AnswerOutcome> {
    if index >= self.questions.len() {
      return None;
    }
    // Late submissions after the finish line and duplicate indexes are both
    // silent no-ops: the view comes back unchanged and nothing is scored.
    if self.stage != Stage::Playing || self.solved.contains(&index) {
      return Some(AnswerOutcome {
        correct: None,
        correct_meaning: None,
        current_index: self.current_index,
        score: self.score,
        finished: self.stage != Stage::Playing,
      });
    }

    self.solved.insert(index);
    let correct_meaning = self.questions[index].correct_meaning.clone();
    let correct = selected == correct_meaning;
    if correct {
      self.score += 1;
    }
    if self.current_index + 1 < self.questions.len() {
      self.current_index += 1;
    } else {
      self.finished_at = Some(Instant::now());
      self.stage = Stage::Finished;
    }

    Some(AnswerOutcome {
      correct: Some(correct),
      correct_meaning: Some(correct_meaning),
      current_index: self.current_index,
      score: self.score,
      finished: self.stage != Stage::Playing,
    })
  }

  /// Percentage score, floored. Zero questions yields zero.
  pub fn percent(&self) -> u32 {
    let total = self.questions.len() as u32;
    if total == 0 {
      0
    } else {
      self.score * 100 / total
    }
  }

  /// Seconds from start to finish, or to now while still playing.
  pub fn elapsed_seconds(&self) -> f64 {
    match self.finished_at {
      Some(end) => end.duration_since(self.started_at).as_secs_f64(),
      None => self.started_at.elapsed().as_secs_f64(),
    }
  }

  /// Finished → Ranking, after the result has been handed to the leaderboard.
  pub fn mark_ranked(&mut self) {
    self.stage = Stage::Ranking;
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn words(n: usize) -> Vec<WordEntry> {
    (0..n)
      .map(|i| WordEntry {
        term: format!("term{i}"),
        meaning_group: format!("meaning{i}"),
        word_type: "noun".into(),
        chapter: 1,
      })
      .collect()
  }

  fn playing_session(total: usize, requested: usize) -> QuizSession {
    QuizSession::start(
      StartParams {
        book: "TestBook".into(),
        chapter_low: 1,
        chapter_high: 1,
        requested_count: requested,
      },
      1,
      words(total),
    )
  }

  fn correct_answer(session: &QuizSession, index: usize) -> String {
    session.question(index).expect("question").correct_meaning.clone()
  }

  #[test]
  fn requesting_more_than_available_caps_without_repeats() {
    let session = playing_session(15, 40);
    assert_eq!(session.total_questions(), 15);
    assert!(session.capped);
    let mut terms: Vec<String> =
      (0..15).map(|i| session.question(i).unwrap().term.clone()).collect();
    terms.sort();
    terms.dedup();
    assert_eq!(terms.len(), 15);
  }

  #[test]
  fn sampling_draws_exactly_the_requested_count() {
    let session = playing_session(30, 10);
    assert_eq!(session.total_questions(), 10);
    assert!(!session.capped);
  }

  #[test]
  fn duplicate_submission_is_idempotent() {
    let mut session = playing_session(5, 5);
    let answer = correct_answer(&session, 0);
    let first = session.submit_answer(0, &answer).unwrap();
    assert_eq!(first.correct, Some(true));
    assert_eq!(first.score, 1);
    assert_eq!(first.current_index, 1);

    // Same index again, even with a wrong answer: no score change, no advance.
    let second = session.submit_answer(0, "garbage").unwrap();
    assert_eq!(second.correct, None);
    assert_eq!(second.score, 1);
    assert_eq!(second.current_index, 1);
  }

  #[test]
  fn wrong_answer_advances_without_scoring() {
    let mut session = playing_session(3, 3);
    let out = session.submit_answer(0, "definitely wrong").unwrap();
    assert_eq!(out.correct, Some(false));
    assert_eq!(out.score, 0);
    assert_eq!(out.current_index, 1);
  }

  #[test]
  fn score_stays_within_bounds_and_last_answer_finishes() {
    let mut session = playing_session(4, 4);
    for i in 0..4 {
      let answer = correct_answer(&session, i);
      let out = session.submit_answer(i, &answer).unwrap();
      assert!(out.score as usize <= session.total_questions());
    }
    assert_eq!(session.stage(), Stage::Finished);
    assert_eq!(session.score(), 4);
    assert_eq!(session.percent(), 100);
    assert!(session.elapsed_seconds() >= 0.0);
  }

  #[test]
  fn out_of_range_index_is_rejected() {
    let mut session = playing_session(2, 2);
    assert!(session.submit_answer(7, "x").is_none());
    assert_eq!(session.score(), 0);
  }

  #[test]
  fn options_are_memoized_per_index() {
    let mut session = playing_session(10, 10);
    let first = session.options_for(3).unwrap();
    for _ in 0..10 {
      assert_eq!(session.options_for(3).unwrap(), first);
    }
    assert_eq!(first.len(), OPTION_COUNT);
    let correct = correct_answer(&session, 3);
    assert_eq!(first.iter().filter(|o| **o == correct).count(), 1);
  }

  #[test]
  fn percent_floors_and_handles_zero_total() {
    let mut session = playing_session(3, 3);
    let answer = correct_answer(&session, 0);
    session.submit_answer(0, &answer);
    assert_eq!(session.percent(), 33);

    let empty = playing_session(0, 0);
    assert_eq!(empty.percent(), 0);
  }

  #[test]
  fn ranking_transition_keeps_result() {
    let mut session = playing_session(1, 1);
    let answer = correct_answer(&session, 0);
    session.submit_answer(0, &answer);
    assert_eq!(session.stage(), Stage::Finished);
    session.mark_ranked();
    assert_eq!(session.stage(), Stage::Ranking);
    assert_eq!(session.score(), 1);
  }
}
