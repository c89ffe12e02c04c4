//! HTTP endpoint handlers. These are thin wrappers that forward to the
//! extraction core and the quiz store; each handler is instrumented and
//! logs parameters plus basic result info.

use axum::extract::{Multipart, Path, State};
use axum::{Json, response::IntoResponse};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::domain::Draft;
use crate::error::ApiError;
use crate::extract::extract;
use crate::protocol::*;
use crate::reader::read_docx;
use crate::state::AppState;
use crate::util::trunc_for_log;

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse { Json(HealthOut { ok: true }) }

/// Accepts a `.docx` upload, extracts the quiz structure, and returns the
/// Draft JSON. Parsing failures are 400s; structural anomalies inside a
/// well-formed document come back as Draft warnings, not errors.
#[instrument(level = "info", skip(multipart))]
pub async fn http_upload_docx(mut multipart: Multipart) -> Result<Json<Draft>, ApiError> {
  let mut upload: Option<(String, Vec<u8>)> = None;
  while let Some(field) = multipart
    .next_field()
    .await
    .map_err(|e| ApiError::bad_request(format!("Invalid multipart body: {}", e)))?
  {
    let Some(filename) = field.file_name().map(str::to_string) else { continue };
    let data = field
      .bytes()
      .await
      .map_err(|e| ApiError::bad_request(format!("Invalid multipart body: {}", e)))?;
    upload = Some((filename, data.to_vec()));
    break;
  }

  let (filename, data) = upload.ok_or_else(|| ApiError::bad_request("Missing file upload."))?;
  if !filename.to_lowercase().ends_with(".docx") {
    return Err(ApiError::bad_request("Only .docx files are supported."));
  }
  if data.is_empty() {
    return Err(ApiError::bad_request("Uploaded file is empty."));
  }

  let paragraphs = read_docx(&data)?;
  let draft = extract(&paragraphs);
  info!(
    target: "quiz",
    filename = %trunc_for_log(&filename, 80),
    bytes = data.len(),
    questions = draft.questions.len(),
    warnings = draft.warnings.len(),
    "Upload extracted"
  );
  Ok(Json(draft))
}

#[instrument(level = "info", skip(state, body), fields(title = %body.title, questions = body.questions.len()))]
pub async fn http_create_quiz(
  State(state): State<AppState>,
  Json(body): Json<QuizCreate>,
) -> Json<QuizSummary> {
  let quiz = state.create_quiz(body).await;
  Json(to_summary(&quiz))
}

#[instrument(level = "info", skip(state), fields(%quiz_id))]
pub async fn http_get_quiz(
  State(state): State<AppState>,
  Path(quiz_id): Path<Uuid>,
) -> Result<Json<QuizSummary>, ApiError> {
  let quiz = state.get_quiz(quiz_id).await.ok_or_else(|| ApiError::not_found("Quiz not found"))?;
  Ok(Json(to_summary(&quiz)))
}

#[instrument(level = "info", skip(state, body), fields(%body.quiz_id))]
pub async fn http_start_play(
  State(state): State<AppState>,
  Json(body): Json<PlayStart>,
) -> Result<Json<PlaySessionOut>, ApiError> {
  let session = state.start_session(body.quiz_id, body.user_id).await?;
  info!(target: "quiz", id = %session.id, "HTTP play session started");
  Ok(Json(to_session_out(&session)))
}

#[instrument(level = "info", skip(state), fields(%session_id))]
pub async fn http_get_play(
  State(state): State<AppState>,
  Path(session_id): Path<Uuid>,
) -> Result<Json<PlaySessionOut>, ApiError> {
  let session = state
    .get_session(session_id)
    .await
    .ok_or_else(|| ApiError::not_found("Session not found"))?;
  Ok(Json(to_session_out(&session)))
}

#[instrument(level = "info", skip(state, body), fields(%session_id, %body.question_id))]
pub async fn http_submit_answer(
  State(state): State<AppState>,
  Path(session_id): Path<Uuid>,
  Json(body): Json<PlayAnswer>,
) -> Result<Json<PlaySessionOut>, ApiError> {
  let session = state
    .record_answer(session_id, body.question_id, body.selected_option_id)
    .await?;
  info!(target: "quiz", id = %session.id, answers = session.responses.len(), "Answer recorded");
  Ok(Json(to_session_out(&session)))
}

#[instrument(level = "info", skip(state), fields(%session_id))]
pub async fn http_pause_play(
  State(state): State<AppState>,
  Path(session_id): Path<Uuid>,
) -> Result<Json<PlaySessionOut>, ApiError> {
  let session = state.set_paused(session_id, true).await?;
  Ok(Json(to_session_out(&session)))
}

#[instrument(level = "info", skip(state), fields(%session_id))]
pub async fn http_resume_play(
  State(state): State<AppState>,
  Path(session_id): Path<Uuid>,
) -> Result<Json<PlaySessionOut>, ApiError> {
  let session = state.set_paused(session_id, false).await?;
  Ok(Json(to_session_out(&session)))
}
