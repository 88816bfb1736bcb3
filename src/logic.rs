//! Core behaviors behind the HTTP handlers:
//!   - submitting a form to the generation backend (Idle -> Submitting -> Idle)
//!   - loading and summarizing earlier quizzes
//!   - taking one file out of a multipart upload

use axum::extract::Multipart;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::error::AppError;
use crate::form::{AttachedFile, SubmissionState};
use crate::history::{summarize_all, QuizSummary};
use crate::payload::SubmissionPayload;
use crate::protocol::SubmitOut;
use crate::state::AppState;

/// Submit the form. The payload is snapshotted under the lock and the form is
/// marked Submitting; a second submit in that window is refused. Success and
/// failure both return the form to Idle and leave its groups and files as they were.
#[instrument(level = "info", skip(state), fields(form_id = %id))]
pub async fn submit_form(state: &AppState, id: Uuid) -> Result<SubmitOut, AppError> {
  let ((payload, groups), _) = state
    .with_form(id, |form| {
      if form.is_submitting() {
        return Err(AppError::Conflict("a submission for this form is already in flight".into()));
      }
      let payload = SubmissionPayload::from_form(form)?;
      form.state = SubmissionState::Submitting;
      Ok((payload, form.groups.len()))
    })
    .await?;

  let files = payload.files.len();
  info!(target: "quizcraft", form_id = %id, groups, files, bytes = payload.total_bytes(), "Submitting quiz request");

  // The backend call and the return to Idle run detached from the request,
  // so a client that disconnects mid-submit cannot leave the form Submitting.
  let task_state = state.clone();
  let result = tokio::spawn(async move {
    let result = task_state.api.create_quiz(payload).await;
    task_state.finish_submission(id).await;
    result
  })
  .await
  .map_err(|e| AppError::Internal(format!("submission task failed: {e}")))?;

  match result {
    Ok(job) => {
      info!(target: "quizcraft", form_id = %id, "Quiz request accepted");
      Ok(SubmitOut { ok: true, groups, files, job })
    }
    Err(e) => {
      error!(target: "quizcraft", form_id = %id, error = %e, "Quiz request failed");
      Err(e.into())
    }
  }
}

/// Fetch the job list and summarize it in backend order. One malformed record fails the lot.
#[instrument(level = "info", skip(state))]
pub async fn load_history(state: &AppState) -> Result<Vec<QuizSummary>, AppError> {
  let records = state.api.list_quizzes().await?;
  let summaries = summarize_all(&records, state.config.display_zone()).map_err(|e| {
    error!(target: "quizcraft", error = %e, records = records.len(), "Quiz history transform failed");
    e
  })?;
  Ok(summaries)
}

/// Read the first file part of an upload. Further parts are drained and ignored.
#[instrument(level = "debug", skip(multipart))]
pub async fn first_file(multipart: &mut Multipart) -> Result<AttachedFile, AppError> {
  let mut picked: Option<AttachedFile> = None;
  let mut ignored = 0usize;

  while let Some(field) = multipart.next_field().await? {
    let Some(name) = field.file_name().map(str::to_string) else {
      continue;
    };
    if picked.is_some() {
      ignored += 1;
      continue;
    }
    let content_type = field.content_type().map(str::to_string);
    let bytes = field.bytes().await?;
    picked = Some(AttachedFile::new(name, content_type, bytes));
  }

  if ignored > 0 {
    warn!(target: "quizcraft", ignored, "Upload carried more than one file; only the first is attached");
  }
  picked.ok_or_else(|| AppError::BadRequest("no file part in upload".into()))
}
