//! WebSocket upgrade + message loop. Each client message is parsed as JSON and
//! forwarded to core logic. We reply with a single JSON message per request.

use std::sync::Arc;

use axum::{
  extract::{
    ws::{Message, WebSocket},
    State, WebSocketUpgrade,
  },
  response::IntoResponse,
};
use tracing::{debug, error, info, instrument};

use crate::logic::{self, QuizError};
use crate::protocol::{AnswerSubmission, ClientWsMessage, SaveScoreRequest, ServerWsMessage, StartRequest};
use crate::state::AppState;
use crate::util::trunc_for_log;

#[instrument(level = "info", skip(state))]
pub async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
  info!(target: "vocaquiz_backend", "WebSocket upgrade requested");
  ws.on_upgrade(move |socket| handle_ws(socket, state))
}

#[instrument(level = "info", skip(socket, state))]
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
  info!(target: "vocaquiz_backend", "WebSocket connected");
  while let Some(Ok(msg)) = socket.recv().await {
    match msg {
      Message::Text(txt) => {
        // Parse, dispatch, serialize response.
        let reply_msg = match serde_json::from_str::<ClientWsMessage>(&txt) {
          Ok(incoming) => {
            debug!(target: "vocaquiz_backend", "WS received: {}", trunc_for_log(&txt, 256));
            handle_client_ws(incoming, &state).await
          }
          Err(e) => ServerWsMessage::Error { message: format!("Invalid JSON: {}", e) },
        };

        let out = serde_json::to_string(&reply_msg).unwrap_or_else(|e| {
          serde_json::json!({ "type": "error", "message": format!("Serialization error: {}", e) }).to_string()
        });

        if let Err(e) = socket.send(Message::Text(out)).await {
          error!(target: "vocaquiz_backend", error = %e, "WS send error");
          break;
        }
      }
      Message::Ping(payload) => { let _ = socket.send(Message::Pong(payload)).await; }
      Message::Close(_) => break,
      _ => {}
    }
  }
  info!(target: "vocaquiz_backend", "WebSocket disconnected");
}

fn error_msg(e: QuizError) -> ServerWsMessage {
  ServerWsMessage::Error { message: e.to_string() }
}

#[instrument(level = "info", skip(state))]
async fn handle_client_ws(msg: ClientWsMessage, state: &AppState) -> ServerWsMessage {
  match msg {
    ClientWsMessage::Ping => ServerWsMessage::Pong,

    ClientWsMessage::ListBooks => ServerWsMessage::Books { books: logic::list_books(state).await },

    ClientWsMessage::ListChapters { book } => {
      let chapters = logic::list_chapters(state, &book).await;
      ServerWsMessage::Chapters { book, chapters }
    }

    ClientWsMessage::ListTypes { book } => {
      let types = logic::list_types(state, &book).await;
      ServerWsMessage::Types { book, types }
    }

    ClientWsMessage::StartSession { book, chapter_low, chapter_high, types, question_count } => {
      let req = StartRequest { book, chapter_low, chapter_high, types, question_count };
      match logic::start_session(state, req).await {
        Ok(session) => {
          tracing::info!(target: "quiz", id = %session.session_id, "WS session started");
          ServerWsMessage::SessionStarted { session }
        }
        Err(e) => error_msg(e),
      }
    }

    ClientWsMessage::CurrentQuestion => match logic::current_question(state).await {
      Ok(question) => ServerWsMessage::Question { question },
      Err(e) => error_msg(e),
    },

    ClientWsMessage::SubmitAnswer { question_index, selected_option } => {
      let req = AnswerSubmission { question_index, selected_option };
      match logic::submit_answer(state, req).await {
        Ok(result) => ServerWsMessage::AnswerResult { result },
        Err(e) => error_msg(e),
      }
    }

    ClientWsMessage::SessionResult => match logic::session_result(state).await {
      Ok(result) => ServerWsMessage::SessionResult { result },
      Err(e) => error_msg(e),
    },

    ClientWsMessage::SaveScore { player_name } => {
      match logic::save_score(state, SaveScoreRequest { player_name }).await {
        Ok(result) => ServerWsMessage::ScoreSaved { result },
        Err(e) => error_msg(e),
      }
    }

    ClientWsMessage::ResetSession => {
      logic::reset_session(state).await;
      ServerWsMessage::SessionReset
    }

    ClientWsMessage::Ranking { book, chapter, total_questions } => {
      match logic::ranking_rows(state, &book, chapter, total_questions).await {
        Ok(rows) => ServerWsMessage::Ranking { rows },
        Err(e) => error_msg(e),
      }
    }

    ClientWsMessage::RankingCounts { book, chapter } => {
      match logic::ranking_counts(state, &book, chapter).await {
        Ok(counts) => ServerWsMessage::RankingCounts { counts },
        Err(e) => error_msg(e),
      }
    }

    ClientWsMessage::Champion { book } => match logic::champion(state, &book).await {
      Ok(champion) => ServerWsMessage::Champion { champion },
      Err(e) => error_msg(e),
    },
  }
}
