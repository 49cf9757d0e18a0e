//! Public protocol structs for WebSocket and HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use serde::{Deserialize, Serialize};

use crate::domain::RankedRow;
use crate::session::{QuizSession, Stage};

/// Messages the client can send over WebSocket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientWsMessage {
    Ping,
    ListBooks,
    ListChapters {
        book: String,
    },
    ListTypes {
        book: String,
    },
    StartSession {
        book: String,
        #[serde(rename = "chapterLow")]
        chapter_low: i64,
        #[serde(rename = "chapterHigh")]
        chapter_high: i64,
        #[serde(default)]
        types: Option<Vec<String>>,
        #[serde(default, rename = "questionCount")]
        question_count: Option<usize>,
    },
    CurrentQuestion,
    SubmitAnswer {
        #[serde(rename = "questionIndex")]
        question_index: usize,
        #[serde(rename = "selectedOption")]
        selected_option: String,
    },
    SessionResult,
    SaveScore {
        #[serde(rename = "playerName")]
        player_name: String,
    },
    ResetSession,
    Ranking {
        book: String,
        chapter: i64,
        #[serde(rename = "totalQuestions")]
        total_questions: i64,
    },
    RankingCounts {
        book: String,
        chapter: i64,
    },
    Champion {
        book: String,
    },
}

/// Messages the server sends back over WebSocket.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerWsMessage {
    Pong,
    Books {
        books: Vec<String>,
    },
    Chapters {
        book: String,
        chapters: Vec<i64>,
    },
    Types {
        book: String,
        types: Vec<String>,
    },
    SessionStarted {
        session: SessionOverview,
    },
    Question {
        question: QuestionView,
    },
    AnswerResult {
        result: AnswerView,
    },
    SessionResult {
        result: ResultView,
    },
    ScoreSaved {
        result: SaveScoreView,
    },
    SessionReset,
    Ranking {
        rows: Vec<RankingRowOut>,
    },
    RankingCounts {
        counts: Vec<i64>,
    },
    Champion {
        champion: Option<ChampionOut>,
    },
    Error {
        message: String,
    },
}

//
// Session DTOs (shared by WS and HTTP)
//

#[derive(Debug, Clone, Deserialize)]
pub struct StartRequest {
    pub book: String,
    #[serde(rename = "chapterLow")]
    pub chapter_low: i64,
    #[serde(rename = "chapterHigh")]
    pub chapter_high: i64,
    /// `None` or `[]` both mean "all types".
    #[serde(default)]
    pub types: Option<Vec<String>>,
    #[serde(default, rename = "questionCount")]
    pub question_count: Option<usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionOverview {
    #[serde(rename = "sessionId")]
    pub session_id: String,
    pub stage: Stage,
    #[serde(rename = "totalQuestions")]
    pub total_questions: usize,
    #[serde(rename = "chapterCode")]
    pub chapter_code: i64,
    /// True when fewer words were available than requested.
    pub capped: bool,
}

pub fn to_overview(s: &QuizSession) -> SessionOverview {
    SessionOverview {
        session_id: s.id.to_string(),
        stage: s.stage(),
        total_questions: s.total_questions(),
        chapter_code: s.chapter_code,
        capped: s.capped,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct QuestionView {
    pub index: usize,
    pub total: usize,
    pub term: String,
    #[serde(rename = "wordType")]
    pub word_type: String,
    pub chapter: i64,
    pub options: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct AnswerSubmission {
    #[serde(rename = "questionIndex")]
    pub question_index: usize,
    #[serde(rename = "selectedOption")]
    pub selected_option: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnswerView {
    #[serde(rename = "currentIndex")]
    pub current_index: usize,
    pub score: u32,
    #[serde(rename = "isFinished")]
    pub is_finished: bool,
    /// `null` when the submission was a duplicate and got ignored.
    pub correct: Option<bool>,
    #[serde(rename = "correctMeaning")]
    pub correct_meaning: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResultView {
    pub score: u32,
    pub total: usize,
    pub percent: u32,
    #[serde(rename = "elapsedSeconds")]
    pub elapsed_seconds: f64,
}

#[derive(Debug, Deserialize)]
pub struct SaveScoreRequest {
    #[serde(rename = "playerName")]
    pub player_name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SaveScoreView {
    pub saved: bool,
    #[serde(rename = "wasImprovement")]
    pub was_improvement: bool,
}

//
// Leaderboard DTOs
//

#[derive(Debug, Deserialize)]
pub struct RankingQuery {
    pub book: String,
    pub chapter: i64,
    #[serde(rename = "total")]
    pub total_questions: i64,
}

#[derive(Debug, Deserialize)]
pub struct CountsQuery {
    pub book: String,
    pub chapter: i64,
}

#[derive(Debug, Deserialize)]
pub struct BookQuery {
    pub book: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RankingRowOut {
    pub rank: u32,
    #[serde(rename = "playerName")]
    pub player_name: String,
    pub score: i64,
    #[serde(rename = "totalQuestions")]
    pub total_questions: i64,
    #[serde(rename = "timeTaken")]
    pub time_taken: f64,
    #[serde(rename = "playedAt")]
    pub played_at: String,
}

/// Convert an internal ranked row to the public DTO.
pub fn to_row_out(r: &RankedRow) -> RankingRowOut {
    RankingRowOut {
        rank: r.rank,
        player_name: r.player_name.clone(),
        score: r.score,
        total_questions: r.total_questions,
        time_taken: r.time_taken,
        played_at: r.played_at.clone(),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChampionOut {
    #[serde(rename = "playerName")]
    pub player_name: String,
    pub score: i64,
    #[serde(rename = "totalQuestions")]
    pub total_questions: i64,
}

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
}

#[derive(Serialize)]
pub struct ErrorOut {
    pub error: String,
}
