//! Minimal client for the quiz generation backend.
//!
//! Two calls only: create a quiz job (multipart upload) and list earlier jobs.
//! Calls are instrumented and log counts, sizes and latencies (never file contents).

use std::time::{Duration, Instant};

use reqwest::header::{ACCEPT, USER_AGENT};
use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;
use tracing::{error, info, instrument};

use crate::history::QuizRecord;
use crate::payload::SubmissionPayload;

const JOBS_PATH: &str = "/quiz-craft/";
const AGENT: &str = concat!("quizcraft/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Error)]
pub enum ApiError {
  #[error("transport error: {0}")]
  Transport(#[from] reqwest::Error),
  #[error("HTTP {status}: {message}")]
  Status { status: StatusCode, message: String },
  #[error("could not decode response: {0}")]
  Decode(String),
}

#[derive(Clone)]
pub struct QuizCraftApi {
  pub client: reqwest::Client,
  pub base_url: String,
}

impl QuizCraftApi {
  pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
    let client = reqwest::Client::builder().timeout(timeout).build()?;
    Ok(Self { client, base_url: base_url.trim_end_matches('/').to_string() })
  }

  fn jobs_url(&self) -> String {
    format!("{}{}", self.base_url, JOBS_PATH)
  }

  /// POST the multipart body. The response body is opaque; it is handed back
  /// as JSON when it parses and dropped otherwise.
  #[instrument(level = "info", skip(self, payload), fields(files = payload.files.len(), bytes = payload.total_bytes()))]
  pub async fn create_quiz(&self, payload: SubmissionPayload) -> Result<Option<serde_json::Value>, ApiError> {
    let form = payload.into_multipart()?;
    let start = Instant::now();
    let res = self.client.post(self.jobs_url())
      .header(USER_AGENT, AGENT)
      .header(ACCEPT, "application/json")
      .multipart(form)
      .send().await
      .map_err(|e| {
        error!(target: "quizcraft", error = %e, "Quiz job request failed");
        ApiError::from(e)
      })?;

    let res = check_status(res).await?;
    let body = res.bytes().await?;
    info!(target: "quizcraft", elapsed = ?start.elapsed(), response_len = body.len(), "Quiz job created");
    Ok(serde_json::from_slice(&body).ok())
  }

  #[instrument(level = "info", skip(self))]
  pub async fn list_quizzes(&self) -> Result<Vec<QuizRecord>, ApiError> {
    let start = Instant::now();
    let res = self.client.get(self.jobs_url())
      .header(USER_AGENT, AGENT)
      .header(ACCEPT, "application/json")
      .send().await?;

    let res = check_status(res).await?;
    let body = res.bytes().await?;
    let records: Vec<QuizRecord> =
      serde_json::from_slice(&body).map_err(|e| ApiError::Decode(e.to_string()))?;
    info!(target: "quizcraft", elapsed = ?start.elapsed(), count = records.len(), "Quiz history fetched");
    Ok(records)
  }
}

async fn check_status(res: reqwest::Response) -> Result<reqwest::Response, ApiError> {
  let status = res.status();
  if status.is_success() {
    return Ok(res);
  }
  let body = res.text().await.unwrap_or_default();
  let message = extract_backend_error(&body).unwrap_or(body);
  error!(target: "quizcraft", %status, %message, "Backend returned an error");
  Err(ApiError::Status { status, message })
}

/// Pull a human message out of `{"detail": ..}` or `{"error": ..}` bodies.
fn extract_backend_error(body: &str) -> Option<String> {
  #[derive(Deserialize)]
  struct EWrap {
    #[serde(default)] detail: Option<String>,
    #[serde(default)] error: Option<String>,
  }
  let w = serde_json::from_str::<EWrap>(body).ok()?;
  w.detail.or(w.error)
}
