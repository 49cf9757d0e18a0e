//! Core behaviors shared by both HTTP and WebSocket handlers.
//!
//! This includes:
//!   - Session lifecycle (start, answer, result, save, reset)
//!   - Catalog listings (books, chapters, types) with degrade-to-empty reads
//!   - Leaderboard queries (ranking, weight classes, champion)

use std::fmt;

use tracing::{error, info, instrument};

use crate::domain::classify_chapter_code;
use crate::protocol::{
    to_overview, to_row_out, AnswerSubmission, AnswerView, ChampionOut, QuestionView,
    RankingRowOut, ResultView, SaveScoreRequest, SaveScoreView, SessionOverview, StartRequest,
};
use crate::ranking;
use crate::session::{QuizSession, Stage, StartParams};
use crate::state::AppState;

#[derive(Debug)]
pub enum QuizError {
    InvalidChapterRange { low: i64, high: i64 },
    NoWordsMatched,
    NoActiveSession,
    SessionAlreadyFinished,
    SessionNotFinished,
    EmptyPlayerName,
    QuestionOutOfRange { index: usize, total: usize },
    Storage(rusqlite::Error),
}

impl fmt::Display for QuizError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidChapterRange { low, high } => {
                write!(f, "invalid chapter range: {low} > {high}")
            }
            Self::NoWordsMatched => write!(f, "no words match the requested selection"),
            Self::NoActiveSession => write!(f, "no active session"),
            Self::SessionAlreadyFinished => write!(f, "session is already finished"),
            Self::SessionNotFinished => write!(f, "session is not finished yet"),
            Self::EmptyPlayerName => write!(f, "player name must not be empty"),
            Self::QuestionOutOfRange { index, total } => {
                write!(f, "question index {index} out of range (total {total})")
            }
            Self::Storage(e) => write!(f, "storage error: {e}"),
        }
    }
}

impl std::error::Error for QuizError {}

impl From<rusqlite::Error> for QuizError {
    fn from(e: rusqlite::Error) -> Self {
        Self::Storage(e)
    }
}

impl QuizError {
    /// Validation failures are the caller's fault; storage failures are not.
    pub fn is_validation(&self) -> bool {
        !matches!(self, Self::Storage(_))
    }
}

//
// Catalog listings. Reads degrade to empty results rather than failing the
// session: a broken catalog should not take the UI down.
//

#[instrument(level = "info", skip(state))]
pub async fn list_books(state: &AppState) -> Vec<String> {
    state.store.list_books().unwrap_or_else(|e| {
        error!(target: "quiz", error = %e, "list_books failed; serving empty listing");
        Vec::new()
    })
}

#[instrument(level = "info", skip(state), fields(%book))]
pub async fn list_chapters(state: &AppState, book: &str) -> Vec<i64> {
    state.store.list_chapters(book).unwrap_or_else(|e| {
        error!(target: "quiz", %book, error = %e, "list_chapters failed; serving empty listing");
        Vec::new()
    })
}

#[instrument(level = "info", skip(state), fields(%book))]
pub async fn list_types(state: &AppState, book: &str) -> Vec<String> {
    state.store.list_types(book).unwrap_or_else(|e| {
        error!(target: "quiz", %book, error = %e, "list_types failed; serving empty listing");
        Vec::new()
    })
}

//
// Session lifecycle
//

#[instrument(level = "info", skip(state, req), fields(book = %req.book, low = req.chapter_low, high = req.chapter_high))]
pub async fn start_session(state: &AppState, req: StartRequest) -> Result<SessionOverview, QuizError> {
    if req.chapter_low > req.chapter_high {
        return Err(QuizError::InvalidChapterRange { low: req.chapter_low, high: req.chapter_high });
    }
    let requested = req.question_count.unwrap_or(state.default_question_count).max(1);

    let words =
        state.store.fetch_words(&req.book, req.chapter_low, req.chapter_high, req.types.as_deref())?;
    if words.is_empty() {
        return Err(QuizError::NoWordsMatched);
    }

    let bounds = state.store.chapter_bounds(&req.book)?;
    let chapter_code = classify_chapter_code(req.chapter_low, req.chapter_high, bounds);

    let session = QuizSession::start(
        StartParams {
            book: req.book,
            chapter_low: req.chapter_low,
            chapter_high: req.chapter_high,
            requested_count: requested,
        },
        chapter_code,
        words,
    );
    let overview = to_overview(&session);
    info!(
        target: "quiz",
        id = %session.id,
        total = overview.total_questions,
        chapter_code,
        capped = overview.capped,
        "Session started"
    );

    *state.session.write().await = Some(session);
    Ok(overview)
}

/// View of the question the player is currently on, options included.
/// Options come from the session's memo so repeated reads stay stable.
#[instrument(level = "info", skip(state))]
pub async fn current_question(state: &AppState) -> Result<QuestionView, QuizError> {
    let mut slot = state.session.write().await;
    let session = slot.as_mut().ok_or(QuizError::NoActiveSession)?;
    if session.stage() != Stage::Playing {
        return Err(QuizError::SessionAlreadyFinished);
    }

    let index = session.current_index();
    let total = session.total_questions();
    let options = session.options_for(index).ok_or(QuizError::QuestionOutOfRange { index, total })?;
    let question = session.question(index).ok_or(QuizError::QuestionOutOfRange { index, total })?;

    Ok(QuestionView {
        index,
        total,
        term: question.term.clone(),
        word_type: question.word_type.clone(),
        chapter: question.chapter,
        options,
    })
}

#[instrument(level = "info", skip(state, req), fields(index = req.question_index))]
pub async fn submit_answer(state: &AppState, req: AnswerSubmission) -> Result<AnswerView, QuizError> {
    let mut slot = state.session.write().await;
    let session = slot.as_mut().ok_or(QuizError::NoActiveSession)?;

    let total = session.total_questions();
    let outcome = session
        .submit_answer(req.question_index, &req.selected_option)
        .ok_or(QuizError::QuestionOutOfRange { index: req.question_index, total })?;

    if let Some(correct) = outcome.correct {
        info!(
            target: "quiz",
            id = %session.id,
            index = req.question_index,
            correct,
            score = outcome.score,
            finished = outcome.finished,
            "Answer evaluated"
        );
    } else {
        info!(target: "quiz", id = %session.id, index = req.question_index, "Duplicate submission ignored");
    }

    Ok(AnswerView {
        current_index: outcome.current_index,
        score: outcome.score,
        is_finished: outcome.finished,
        correct: outcome.correct,
        correct_meaning: outcome.correct_meaning,
    })
}

#[instrument(level = "info", skip(state))]
pub async fn session_result(state: &AppState) -> Result<ResultView, QuizError> {
    let slot = state.session.read().await;
    let session = slot.as_ref().ok_or(QuizError::NoActiveSession)?;
    if session.stage() == Stage::Playing {
        return Err(QuizError::SessionNotFinished);
    }
    Ok(ResultView {
        score: session.score(),
        total: session.total_questions(),
        percent: session.percent(),
        elapsed_seconds: session.elapsed_seconds(),
    })
}

/// Record the finished session under `player_name` and move to the ranking
/// stage. The transition happens whether or not the stored record improved;
/// the boolean in the reply is how the UI learns which it was.
#[instrument(level = "info", skip(state, req))]
pub async fn save_score(state: &AppState, req: SaveScoreRequest) -> Result<SaveScoreView, QuizError> {
    let name = req.player_name.trim().to_string();
    if name.is_empty() {
        return Err(QuizError::EmptyPlayerName);
    }

    let mut slot = state.session.write().await;
    let session = slot.as_mut().ok_or(QuizError::NoActiveSession)?;
    if session.stage() != Stage::Finished {
        return Err(QuizError::SessionNotFinished);
    }

    let book = session.book.clone();
    let chapter_code = session.chapter_code;
    let score = session.score() as i64;
    let total = session.total_questions() as i64;
    let elapsed = session.elapsed_seconds();
    let improved = state
        .store
        .with_conn(|conn| ranking::record_result(conn, &name, &book, chapter_code, score, total, elapsed))?;

    session.mark_ranked();
    info!(target: "leaderboard", player = %name, %book, chapter_code, score, total, improved, "Result recorded");
    Ok(SaveScoreView { saved: true, was_improvement: improved })
}

/// Unconditional return to setup.
#[instrument(level = "info", skip(state))]
pub async fn reset_session(state: &AppState) {
    let mut slot = state.session.write().await;
    if let Some(session) = slot.take() {
        info!(target: "quiz", id = %session.id, "Session reset");
    }
}

//
// Leaderboard queries
//

#[instrument(level = "info", skip(state), fields(%book, chapter_code, total_questions))]
pub async fn ranking_rows(
    state: &AppState,
    book: &str,
    chapter_code: i64,
    total_questions: i64,
) -> Result<Vec<RankingRowOut>, QuizError> {
    let rows =
        state.store.with_conn(|conn| ranking::ranking(conn, book, chapter_code, total_questions))?;
    Ok(rows.iter().map(to_row_out).collect())
}

#[instrument(level = "info", skip(state), fields(%book, chapter_code))]
pub async fn ranking_counts(
    state: &AppState,
    book: &str,
    chapter_code: i64,
) -> Result<Vec<i64>, QuizError> {
    Ok(state.store.with_conn(|conn| ranking::question_counts(conn, book, chapter_code))?)
}

#[instrument(level = "info", skip(state), fields(%book))]
pub async fn champion(state: &AppState, book: &str) -> Result<Option<ChampionOut>, QuizError> {
    let best = state.store.with_conn(|conn| ranking::champion(conn, book))?;
    Ok(best.map(|(player_name, score, total_questions)| ChampionOut {
        player_name,
        score,
        total_questions,
    }))
}
