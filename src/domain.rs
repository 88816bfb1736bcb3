//! Domain models: question types, difficulty levels and the question-group configuration.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Smallest question count a group may ask for.
pub const MIN_COUNT: u32 = 1;
/// Largest question count a group may ask for.
pub const MAX_COUNT: u32 = 8;

/// Kind of question the backend should generate for a group.
/// Wire names are the labels shown on the page.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuestionType {
  #[serde(rename = "True or False")]
  TrueOrFalse,
  #[serde(rename = "Multiple choice")]
  MultipleChoice,
  #[serde(rename = "Single choice")]
  SingleChoice,
  #[serde(rename = "Short answer")]
  ShortAnswer,
  #[serde(rename = "Long answer")]
  LongAnswer,
}

impl QuestionType {
  pub const ALL: [QuestionType; 5] = [
    QuestionType::TrueOrFalse,
    QuestionType::MultipleChoice,
    QuestionType::SingleChoice,
    QuestionType::ShortAnswer,
    QuestionType::LongAnswer,
  ];

  pub fn label(self) -> &'static str {
    match self {
      QuestionType::TrueOrFalse => "True or False",
      QuestionType::MultipleChoice => "Multiple choice",
      QuestionType::SingleChoice => "Single choice",
      QuestionType::ShortAnswer => "Short answer",
      QuestionType::LongAnswer => "Long answer",
    }
  }
}

impl fmt::Display for QuestionType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.label()) }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Difficulty {
  Easy,
  Medium,
  Hard,
}

impl Difficulty {
  pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

  pub fn label(self) -> &'static str {
    match self {
      Difficulty::Easy => "Easy",
      Difficulty::Medium => "Medium",
      Difficulty::Hard => "Hard",
    }
  }

  /// Display colour used by the page for this level.
  pub fn color(self) -> &'static str {
    match self {
      Difficulty::Easy => "green",
      Difficulty::Medium => "yellow",
      Difficulty::Hard => "red",
    }
  }
}

impl fmt::Display for Difficulty {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.label()) }
}

/// One block of the quiz request: which kind of question, how hard, and how many.
/// Field order matches the JSON the backend receives under `groups`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionGroupConfig {
  #[serde(rename = "type")]
  pub kind: QuestionType,
  pub difficulty: Difficulty,
  pub count: u32,
}

impl QuestionGroupConfig {
  pub fn new(kind: QuestionType, difficulty: Difficulty, count: u32) -> Self {
    Self { kind, difficulty, count }
  }

  /// Group present when the page mounts.
  pub fn initial() -> Self {
    Self::new(QuestionType::TrueOrFalse, Difficulty::Medium, 1)
  }

  /// Group added by "Add a new question group".
  pub fn appended() -> Self {
    Self::new(QuestionType::MultipleChoice, Difficulty::Medium, 1)
  }
}

/// Partial edit of a group; absent fields are left untouched.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct GroupPatch {
  #[serde(default, rename = "type")]
  pub kind: Option<QuestionType>,
  #[serde(default)]
  pub difficulty: Option<Difficulty>,
  #[serde(default)]
  pub count: Option<u32>,
}

impl GroupPatch {
  pub fn is_empty(&self) -> bool {
    self.kind.is_none() && self.difficulty.is_none() && self.count.is_none()
  }

  /// Fill the absent fields from `base`.
  pub fn over(self, base: QuestionGroupConfig) -> QuestionGroupConfig {
    QuestionGroupConfig {
      kind: self.kind.unwrap_or(base.kind),
      difficulty: self.difficulty.unwrap_or(base.difficulty),
      count: self.count.unwrap_or(base.count),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn group_serializes_with_page_labels() {
    let g = QuestionGroupConfig::initial();
    let json = serde_json::to_string(&g).unwrap();
    assert_eq!(json, r#"{"type":"True or False","difficulty":"Medium","count":1}"#);
  }

  #[test]
  fn unknown_type_is_rejected() {
    let err = serde_json::from_str::<QuestionGroupConfig>(
      r#"{"type":"Essay","difficulty":"Easy","count":2}"#,
    );
    assert!(err.is_err());
  }

  #[test]
  fn patch_keeps_untouched_fields() {
    let patch = GroupPatch { count: Some(5), ..Default::default() };
    let g = patch.over(QuestionGroupConfig::appended());
    assert_eq!(g.kind, QuestionType::MultipleChoice);
    assert_eq!(g.difficulty, Difficulty::Medium);
    assert_eq!(g.count, 5);
    assert!(GroupPatch::default().is_empty());
  }

  #[test]
  fn labels_match_display() {
    for t in QuestionType::ALL {
      let quoted = serde_json::to_string(&t).unwrap();
      assert_eq!(quoted, format!("\"{}\"", t));
    }
    assert_eq!(Difficulty::Hard.color(), "red");
  }
}
