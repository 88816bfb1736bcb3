//! Prior-quiz history: turning the backend's job records into summaries and
//! the labels shown for each entry.
//!
//! The transformation is all-or-nothing. One record with a path that is not
//! `<prefix>-<prefix>-<name>` or an unreadable timestamp fails the whole list.

use std::sync::OnceLock;

use chrono::{DateTime, FixedOffset, Local, NaiveDateTime, TimeZone, Timelike};
use regex::Regex;
use serde::Deserialize;
use thiserror::Error;

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum HistoryError {
  #[error("stored path {path:?} is not <prefix>-<prefix>-<name>")]
  PathShape { path: String },
  #[error("timestamp {value:?} is not a date-time")]
  Timestamp { value: String },
}

/// Job record as listed by the backend. Unknown fields are ignored.
#[derive(Clone, Debug, Deserialize)]
pub struct QuizRecord {
  pub id: i64,
  pub timestamp: String,
  #[serde(default)]
  pub files: Vec<FileRecord>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct FileRecord {
  pub path: String,
}

/// Zone the hour/minute label is rendered in.
#[derive(Clone, Copy, Debug)]
pub enum DisplayZone {
  Local,
  Fixed(FixedOffset),
}

impl DisplayZone {
  /// `None` means the server's local zone; out-of-range offsets fall back to it too.
  pub fn from_offset_minutes(minutes: Option<i32>) -> Self {
    minutes
      .and_then(fixed_offset_minutes)
      .map(DisplayZone::Fixed)
      .unwrap_or(DisplayZone::Local)
  }

  fn convert(&self, dt: DateTime<FixedOffset>) -> DateTime<FixedOffset> {
    match self {
      DisplayZone::Local => dt.with_timezone(&Local).fixed_offset(),
      DisplayZone::Fixed(offset) => dt.with_timezone(offset),
    }
  }

  fn localize(&self, naive: &NaiveDateTime) -> Option<DateTime<FixedOffset>> {
    match self {
      DisplayZone::Local => Local.from_local_datetime(naive).earliest().map(|dt| dt.fixed_offset()),
      DisplayZone::Fixed(offset) => offset.from_local_datetime(naive).single(),
    }
  }
}

/// `None` when the offset is a day or more either way.
pub fn fixed_offset_minutes(minutes: i32) -> Option<FixedOffset> {
  FixedOffset::east_opt(minutes.saturating_mul(60))
}

#[derive(Clone, Debug, PartialEq)]
pub struct QuizSummary {
  pub id: i64,
  pub files: Vec<String>,
  pub timestamp: DateTime<FixedOffset>,
}

impl QuizSummary {
  pub fn from_record(record: &QuizRecord, zone: DisplayZone) -> Result<Self, HistoryError> {
    let files = record
      .files
      .iter()
      .map(|f| display_name(&f.path).map(str::to_string))
      .collect::<Result<Vec<_>, _>>()?;
    let timestamp = parse_timestamp(&record.timestamp, zone)?;
    Ok(Self { id: record.id, files, timestamp })
  }

  pub fn files_label(&self) -> String { files_label(&self.files) }

  pub fn time_label(&self) -> String { time_label(&self.timestamp) }

  pub fn href(&self) -> String { format!("/quiz/{}", self.id) }
}

fn stored_path_re() -> &'static Regex {
  static RE: OnceLock<Regex> = OnceLock::new();
  RE.get_or_init(|| Regex::new(r"[^-]*-[^-]*-(.*)").expect("static regex"))
}

/// Display name of an uploaded file: what follows the two hyphen-delimited
/// prefixes the backend puts in front of it.
pub fn display_name(path: &str) -> Result<&str, HistoryError> {
  stored_path_re()
    .captures(path)
    .and_then(|c| c.get(1))
    .map(|m| m.as_str())
    .ok_or_else(|| HistoryError::PathShape { path: path.to_string() })
}

/// RFC 3339 first; otherwise a naive date-time taken as wall time in `zone`.
pub fn parse_timestamp(value: &str, zone: DisplayZone) -> Result<DateTime<FixedOffset>, HistoryError> {
  let invalid = || HistoryError::Timestamp { value: value.to_string() };
  if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
    return Ok(zone.convert(dt));
  }
  NAIVE_FORMATS
    .iter()
    .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
    .and_then(|naive| zone.localize(&naive))
    .ok_or_else(invalid)
}

/// Transform the whole listing, in backend order.
pub fn summarize_all(records: &[QuizRecord], zone: DisplayZone) -> Result<Vec<QuizSummary>, HistoryError> {
  records.iter().map(|r| QuizSummary::from_record(r, zone)).collect()
}

/// First two names joined by ", ", then "& N more" for the rest.
pub fn files_label(files: &[String]) -> String {
  let mut label = files.iter().take(2).map(String::as_str).collect::<Vec<_>>().join(", ");
  if files.len() > 2 {
    label.push_str(&format!(" & {} more", files.len() - 2));
  }
  label
}

pub fn time_label<Tz: TimeZone>(dt: &DateTime<Tz>) -> String {
  format!("{:02}:{:02}", dt.hour(), dt.minute())
}
