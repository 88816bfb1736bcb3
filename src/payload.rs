//! Submission payload: a snapshot of the form, shaped as the multipart body
//! the generation backend expects (`groups` as JSON text, repeated `files`).

use reqwest::multipart::{Form, Part};
use reqwest::Body;

use crate::domain::QuestionGroupConfig;
use crate::form::{AttachedFile, QuizForm};

pub const GROUPS_FIELD: &str = "groups";
pub const FILES_FIELD: &str = "files";

#[derive(Clone, Debug)]
pub struct SubmissionPayload {
  pub groups_json: String,
  pub files: Vec<AttachedFile>,
}

impl SubmissionPayload {
  /// Snapshot the form. Counts are not re-validated here.
  pub fn from_form(form: &QuizForm) -> Result<Self, serde_json::Error> {
    Self::build(form.groups.as_slice(), form.files.iter().cloned().collect())
  }

  pub fn build(groups: &[QuestionGroupConfig], files: Vec<AttachedFile>) -> Result<Self, serde_json::Error> {
    let groups_json = serde_json::to_string(groups)?;
    Ok(Self { groups_json, files })
  }

  pub fn total_bytes(&self) -> usize {
    self.files.iter().map(AttachedFile::size).sum()
  }

  pub fn into_multipart(self) -> Result<Form, reqwest::Error> {
    let mut form = Form::new().text(GROUPS_FIELD, self.groups_json);
    for file in self.files {
      let len = file.bytes.len() as u64;
      let mut part = Part::stream_with_length(Body::from(file.bytes), len).file_name(file.name);
      if let Some(mime) = file.content_type.as_deref() {
        part = part.mime_str(mime)?;
      }
      form = form.part(FILES_FIELD, part);
    }
    Ok(form)
  }
}
