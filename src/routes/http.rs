//! HTTP endpoint handlers. These are thin wrappers that forward to form state and core logic.
//! Each handler is instrumented and logs ids and basic result info.

use std::sync::Arc;
use axum::{
  extract::{rejection::JsonRejection, Multipart, Path, State},
  http::StatusCode,
  response::IntoResponse,
  Json,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::domain::GroupPatch;
use crate::error::AppError;
use crate::logic::{first_file, load_history, submit_form};
use crate::protocol::*;
use crate::state::AppState;

type FormResult = Result<Json<FormOut>, AppError>;

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse { Json(HealthOut { ok: true }) }

#[instrument(level = "info", skip(state))]
pub async fn http_get_catalog(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(catalog(&state.config.defaults))
}

#[instrument(level = "info", skip(state))]
pub async fn http_create_form(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  let (id, form) = state.create_form().await;
  info!(target: "quizcraft", form_id = %id, "Form created");
  (StatusCode::CREATED, Json(form_out(id, &form)))
}

#[instrument(level = "info", skip_all, fields(%id))]
pub async fn http_get_form(
  State(state): State<Arc<AppState>>,
  Path(id): Path<Uuid>,
) -> FormResult {
  let form = state.get_form(id).await?;
  Ok(Json(form_out(id, &form)))
}

#[instrument(level = "info", skip_all, fields(%id))]
pub async fn http_delete_form(
  State(state): State<Arc<AppState>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
  state.discard_form(id).await?;
  Ok(StatusCode::NO_CONTENT)
}

/// Append a group. Absent fields come from the configured append default.
#[instrument(level = "info", skip_all, fields(%id))]
pub async fn http_append_group(
  State(state): State<Arc<AppState>>,
  Path(id): Path<Uuid>,
  body: Result<Json<GroupPatch>, JsonRejection>,
) -> FormResult {
  let patch = match body {
    Ok(Json(p)) => p,
    // No body at all: plain "Add a new question group".
    Err(JsonRejection::MissingJsonContentType(_)) => GroupPatch::default(),
    Err(e) => return Err(AppError::BadRequest(e.body_text())),
  };
  let config = patch.over(state.config.defaults.appended_group);
  let (index, form) = state.with_form(id, |f| Ok(f.groups.append(config)?)).await?;
  info!(target: "quizcraft", form_id = %id, index, kind = %config.kind, difficulty = %config.difficulty, count = config.count, "Group appended");
  Ok(Json(form_out(id, &form)))
}

#[instrument(level = "info", skip_all, fields(%id, index))]
pub async fn http_update_group(
  State(state): State<Arc<AppState>>,
  Path((id, index)): Path<(Uuid, usize)>,
  Json(patch): Json<GroupPatch>,
) -> FormResult {
  if patch.is_empty() {
    return Err(AppError::BadRequest("expected at least one of type, difficulty, count".into()));
  }
  let (config, form) = state.with_form(id, |f| Ok(f.groups.update(index, patch)?)).await?;
  info!(target: "quizcraft", form_id = %id, index, kind = %config.kind, difficulty = %config.difficulty, count = config.count, "Group updated");
  Ok(Json(form_out(id, &form)))
}

#[instrument(level = "info", skip_all, fields(%id, index))]
pub async fn http_remove_group(
  State(state): State<Arc<AppState>>,
  Path((id, index)): Path<(Uuid, usize)>,
) -> FormResult {
  let (_, form) = state.with_form(id, |f| Ok(f.groups.remove(index)?)).await?;
  info!(target: "quizcraft", form_id = %id, index, remaining = form.groups.len(), "Group removed");
  Ok(Json(form_out(id, &form)))
}

/// Attach the first file of the upload to the form.
#[instrument(level = "info", skip_all, fields(%id))]
pub async fn http_add_file(
  State(state): State<Arc<AppState>>,
  Path(id): Path<Uuid>,
  mut multipart: Multipart,
) -> FormResult {
  // Reject unknown forms before reading the body.
  state.ensure_form(id).await?;
  let file = first_file(&mut multipart).await?;
  let (name, size) = (file.name.clone(), file.size());
  let (index, form) = state.with_form(id, |f| Ok(f.files.add(file))).await?;
  info!(target: "quizcraft", form_id = %id, index, %name, size, "File attached");
  Ok(Json(form_out(id, &form)))
}

#[instrument(level = "info", skip_all, fields(%id, index))]
pub async fn http_remove_file(
  State(state): State<Arc<AppState>>,
  Path((id, index)): Path<(Uuid, usize)>,
) -> FormResult {
  let (removed, form) = state.with_form(id, |f| Ok(f.files.remove(index)?)).await?;
  info!(target: "quizcraft", form_id = %id, index, name = %removed.name, "File removed");
  Ok(Json(form_out(id, &form)))
}

#[instrument(level = "info", skip_all, fields(%id))]
pub async fn http_submit_form(
  State(state): State<Arc<AppState>>,
  Path(id): Path<Uuid>,
) -> Result<Json<SubmitOut>, AppError> {
  let out = submit_form(&state, id).await?;
  Ok(Json(out))
}

#[instrument(level = "info", skip(state))]
pub async fn http_list_quizzes(
  State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<QuizSummaryOut>>, AppError> {
  let summaries = load_history(&state).await?;
  info!(target: "quizcraft", count = summaries.len(), "Quiz history served");
  Ok(Json(summaries.iter().map(summary_out).collect()))
}
