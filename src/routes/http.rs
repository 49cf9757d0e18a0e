//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Validation failures map to 400, storage failures to 500.

use std::sync::Arc;

use axum::{
  extract::{Query, State},
  http::StatusCode,
  response::IntoResponse,
  Json,
};
use tracing::{info, instrument};

use crate::logic::{self, QuizError};
use crate::protocol::*;
use crate::state::AppState;

fn error_response(e: QuizError) -> (StatusCode, Json<ErrorOut>) {
  let status = if e.is_validation() { StatusCode::BAD_REQUEST } else { StatusCode::INTERNAL_SERVER_ERROR };
  (status, Json(ErrorOut { error: e.to_string() }))
}

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse {
  Json(HealthOut { ok: true })
}

#[instrument(level = "info", skip(state))]
pub async fn http_list_books(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(logic::list_books(&state).await)
}

#[instrument(level = "info", skip(state), fields(book = %q.book))]
pub async fn http_list_chapters(
  State(state): State<Arc<AppState>>,
  Query(q): Query<BookQuery>,
) -> impl IntoResponse {
  Json(logic::list_chapters(&state, &q.book).await)
}

#[instrument(level = "info", skip(state), fields(book = %q.book))]
pub async fn http_list_types(
  State(state): State<Arc<AppState>>,
  Query(q): Query<BookQuery>,
) -> impl IntoResponse {
  Json(logic::list_types(&state, &q.book).await)
}

#[instrument(level = "info", skip(state, body), fields(book = %body.book))]
pub async fn http_start_session(
  State(state): State<Arc<AppState>>,
  Json(body): Json<StartRequest>,
) -> Result<Json<SessionOverview>, (StatusCode, Json<ErrorOut>)> {
  let overview = logic::start_session(&state, body).await.map_err(error_response)?;
  info!(target: "quiz", session = %overview.session_id, total = overview.total_questions, "HTTP session started");
  Ok(Json(overview))
}

#[instrument(level = "info", skip(state))]
pub async fn http_current_question(
  State(state): State<Arc<AppState>>,
) -> Result<Json<QuestionView>, (StatusCode, Json<ErrorOut>)> {
  let view = logic::current_question(&state).await.map_err(error_response)?;
  Ok(Json(view))
}

#[instrument(level = "info", skip(state, body), fields(index = body.question_index))]
pub async fn http_submit_answer(
  State(state): State<Arc<AppState>>,
  Json(body): Json<AnswerSubmission>,
) -> Result<Json<AnswerView>, (StatusCode, Json<ErrorOut>)> {
  let view = logic::submit_answer(&state, body).await.map_err(error_response)?;
  Ok(Json(view))
}

#[instrument(level = "info", skip(state))]
pub async fn http_session_result(
  State(state): State<Arc<AppState>>,
) -> Result<Json<ResultView>, (StatusCode, Json<ErrorOut>)> {
  let view = logic::session_result(&state).await.map_err(error_response)?;
  Ok(Json(view))
}

#[instrument(level = "info", skip(state, body))]
pub async fn http_save_score(
  State(state): State<Arc<AppState>>,
  Json(body): Json<SaveScoreRequest>,
) -> Result<Json<SaveScoreView>, (StatusCode, Json<ErrorOut>)> {
  let view = logic::save_score(&state, body).await.map_err(error_response)?;
  Ok(Json(view))
}

#[instrument(level = "info", skip(state))]
pub async fn http_reset_session(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  logic::reset_session(&state).await;
  Json(HealthOut { ok: true })
}

#[instrument(level = "info", skip(state), fields(book = %q.book, chapter = q.chapter, total = q.total_questions))]
pub async fn http_ranking(
  State(state): State<Arc<AppState>>,
  Query(q): Query<RankingQuery>,
) -> Result<Json<Vec<RankingRowOut>>, (StatusCode, Json<ErrorOut>)> {
  let rows = logic::ranking_rows(&state, &q.book, q.chapter, q.total_questions)
    .await
    .map_err(error_response)?;
  Ok(Json(rows))
}

#[instrument(level = "info", skip(state), fields(book = %q.book, chapter = q.chapter))]
pub async fn http_ranking_counts(
  State(state): State<Arc<AppState>>,
  Query(q): Query<CountsQuery>,
) -> Result<Json<Vec<i64>>, (StatusCode, Json<ErrorOut>)> {
  let counts = logic::ranking_counts(&state, &q.book, q.chapter).await.map_err(error_response)?;
  Ok(Json(counts))
}

#[instrument(level = "info", skip(state), fields(book = %q.book))]
pub async fn http_champion(
  State(state): State<Arc<AppState>>,
  Query(q): Query<BookQuery>,
) -> Result<Json<Option<ChampionOut>>, (StatusCode, Json<ErrorOut>)> {
  let champ = logic::champion(&state, &q.book).await.map_err(error_response)?;
  Ok(Json(champ))
}
