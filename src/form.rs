//! Form state owned by one mounted page: the question groups, the attached
//! materials and whether a submission is in flight.
//!
//! `QuestionGroups` is never empty. The remove control is only offered while
//! more than one group exists, and `remove` refuses to drop the last one.

use axum::body::Bytes;
use thiserror::Error;

use crate::domain::{GroupPatch, QuestionGroupConfig, MAX_COUNT, MIN_COUNT};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GroupError {
  #[error("the last question group cannot be removed")]
  LastGroup,
  #[error("question group {index} does not exist ({len} groups)")]
  IndexOutOfRange { index: usize, len: usize },
  #[error("count {count} is outside {}..={}", MIN_COUNT, MAX_COUNT)]
  CountOutOfRange { count: u32 },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AttachmentError {
  #[error("file {index} does not exist ({len} files)")]
  IndexOutOfRange { index: usize, len: usize },
}

fn check_count(count: u32) -> Result<(), GroupError> {
  if (MIN_COUNT..=MAX_COUNT).contains(&count) {
    Ok(())
  } else {
    Err(GroupError::CountOutOfRange { count })
  }
}

/// Ordered question groups bound to the form fields.
#[derive(Clone, Debug)]
pub struct QuestionGroups {
  items: Vec<QuestionGroupConfig>,
}

impl QuestionGroups {
  pub fn new(initial: QuestionGroupConfig) -> Self {
    Self { items: vec![initial] }
  }

  pub fn len(&self) -> usize { self.items.len() }

  pub fn as_slice(&self) -> &[QuestionGroupConfig] { &self.items }

  /// Whether the remove control is shown for the groups.
  pub fn is_removable(&self) -> bool { self.items.len() > 1 }

  pub fn append(&mut self, config: QuestionGroupConfig) -> Result<usize, GroupError> {
    check_count(config.count)?;
    self.items.push(config);
    Ok(self.items.len() - 1)
  }

  pub fn remove(&mut self, index: usize) -> Result<QuestionGroupConfig, GroupError> {
    let len = self.items.len();
    if index >= len {
      return Err(GroupError::IndexOutOfRange { index, len });
    }
    if !self.is_removable() {
      return Err(GroupError::LastGroup);
    }
    Ok(self.items.remove(index))
  }

  pub fn update(&mut self, index: usize, patch: GroupPatch) -> Result<QuestionGroupConfig, GroupError> {
    let len = self.items.len();
    let slot = self
      .items
      .get_mut(index)
      .ok_or(GroupError::IndexOutOfRange { index, len })?;
    let next = patch.over(*slot);
    check_count(next.count)?;
    *slot = next;
    Ok(next)
  }
}

/// A study material picked by the user. Cloning shares the content.
#[derive(Clone, Debug)]
pub struct AttachedFile {
  pub name: String,
  pub content_type: Option<String>,
  pub bytes: Bytes,
}

impl AttachedFile {
  pub fn new(name: impl Into<String>, content_type: Option<String>, bytes: impl Into<Bytes>) -> Self {
    Self { name: name.into(), content_type, bytes: bytes.into() }
  }

  pub fn size(&self) -> usize { self.bytes.len() }
}

/// Ordered attachments. No deduplication, no type checks, no cap on count.
#[derive(Clone, Debug, Default)]
pub struct Attachments {
  items: Vec<AttachedFile>,
}

impl Attachments {
  pub fn len(&self) -> usize { self.items.len() }

  pub fn is_empty(&self) -> bool { self.items.is_empty() }

  pub fn iter(&self) -> impl Iterator<Item = &AttachedFile> { self.items.iter() }

  pub fn add(&mut self, file: AttachedFile) -> usize {
    self.items.push(file);
    self.items.len() - 1
  }

  pub fn remove(&mut self, index: usize) -> Result<AttachedFile, AttachmentError> {
    let len = self.items.len();
    if index >= len {
      return Err(AttachmentError::IndexOutOfRange { index, len });
    }
    Ok(self.items.remove(index))
  }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SubmissionState {
  #[default]
  Idle,
  Submitting,
}

#[derive(Clone, Debug)]
pub struct QuizForm {
  pub groups: QuestionGroups,
  pub files: Attachments,
  pub state: SubmissionState,
}

impl QuizForm {
  pub fn new(initial: QuestionGroupConfig) -> Self {
    Self {
      groups: QuestionGroups::new(initial),
      files: Attachments::default(),
      state: SubmissionState::Idle,
    }
  }

  pub fn is_submitting(&self) -> bool { self.state == SubmissionState::Submitting }
}
