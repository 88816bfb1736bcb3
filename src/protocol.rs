//! Public protocol structs for the HTTP endpoints (serde ready).
//! Keep this small and stable to evolve the service and the page independently.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::GroupDefaults;
use crate::domain::{Difficulty, QuestionGroupConfig, QuestionType, MAX_COUNT, MIN_COUNT};
use crate::form::QuizForm;
use crate::history::QuizSummary;

#[derive(Debug, Serialize)]
pub struct HealthOut {
    pub ok: bool,
}

#[derive(Debug, Serialize)]
pub struct CatalogOut {
    pub question_types: Vec<&'static str>,
    pub difficulties: Vec<DifficultyOut>,
    pub min_count: u32,
    pub max_count: u32,
    pub initial_group: QuestionGroupConfig,
    pub appended_group: QuestionGroupConfig,
}

#[derive(Debug, Serialize)]
pub struct DifficultyOut {
    pub title: &'static str,
    pub color: &'static str,
}

pub fn catalog(defaults: &GroupDefaults) -> CatalogOut {
    CatalogOut {
        question_types: QuestionType::ALL.iter().map(|t| t.label()).collect(),
        difficulties: Difficulty::ALL
            .iter()
            .map(|d| DifficultyOut { title: d.label(), color: d.color() })
            .collect(),
        min_count: MIN_COUNT,
        max_count: MAX_COUNT,
        initial_group: defaults.initial_group,
        appended_group: defaults.appended_group,
    }
}

/// Current view of one form session.
#[derive(Debug, Serialize, Deserialize)]
pub struct FormOut {
    pub id: Uuid,
    pub groups: Vec<GroupOut>,
    /// Whether the per-group remove control is shown.
    pub removable: bool,
    pub files: Vec<FileOut>,
    pub submitting: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GroupOut {
    pub index: usize,
    #[serde(flatten)]
    pub config: QuestionGroupConfig,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FileOut {
    pub index: usize,
    pub name: String,
    pub size: usize,
}

pub fn form_out(id: Uuid, form: &QuizForm) -> FormOut {
    FormOut {
        id,
        groups: form
            .groups
            .as_slice()
            .iter()
            .enumerate()
            .map(|(index, config)| GroupOut { index, config: *config })
            .collect(),
        removable: form.groups.is_removable(),
        files: form
            .files
            .iter()
            .enumerate()
            .map(|(index, f)| FileOut { index, name: f.name.clone(), size: f.size() })
            .collect(),
        submitting: form.is_submitting(),
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitOut {
    pub ok: bool,
    pub groups: usize,
    pub files: usize,
    /// Backend response body when it was JSON.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job: Option<serde_json::Value>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct QuizSummaryOut {
    pub id: i64,
    pub files: Vec<String>,
    pub label: String,
    pub time: String,
    pub timestamp: String,
    pub href: String,
}

pub fn summary_out(s: &QuizSummary) -> QuizSummaryOut {
    QuizSummaryOut {
        id: s.id,
        files: s.files.clone(),
        label: s.files_label(),
        time: s.time_label(),
        timestamp: s.timestamp.to_rfc3339(),
        href: s.href(),
    }
}
