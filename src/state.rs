//! Application state: the in-memory form sessions, the backend client and config.
//!
//! One form session exists per mounted page. It is created with the default
//! group and dropped when the page goes away; nothing is persisted.

use std::{collections::HashMap, sync::Arc};

use tokio::sync::RwLock;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::client::QuizCraftApi;
use crate::config::AppConfig;
use crate::error::AppError;
use crate::form::{QuizForm, SubmissionState};

#[derive(Clone)]
pub struct AppState {
    pub forms: Arc<RwLock<HashMap<Uuid, QuizForm>>>,
    pub api: QuizCraftApi,
    pub config: AppConfig,
}

impl AppState {
    #[instrument(level = "info", skip_all, fields(api_base_url = %config.api_base_url))]
    pub fn new(config: AppConfig) -> Result<Self, AppError> {
        let api = QuizCraftApi::new(&config.api_base_url, config.request_timeout())?;
        info!(target: "quizcraft", base_url = %api.base_url, timeout_secs = config.request_timeout_secs, "Backend client ready");
        Ok(Self {
            forms: Arc::new(RwLock::new(HashMap::new())),
            api,
            config,
        })
    }

    /// Mount: a new form holding the configured initial group.
    #[instrument(level = "debug", skip(self))]
    pub async fn create_form(&self) -> (Uuid, QuizForm) {
        let id = Uuid::new_v4();
        let form = QuizForm::new(self.config.defaults.initial_group);
        self.forms.write().await.insert(id, form.clone());
        debug!(target: "quizcraft", form_id = %id, "Form mounted");
        (id, form)
    }

    #[instrument(level = "debug", skip(self), fields(%id))]
    pub async fn get_form(&self, id: Uuid) -> Result<QuizForm, AppError> {
        self.forms
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| unknown_form(id))
    }

    pub async fn ensure_form(&self, id: Uuid) -> Result<(), AppError> {
        if self.forms.read().await.contains_key(&id) {
            Ok(())
        } else {
            Err(unknown_form(id))
        }
    }

    /// Apply `f` to the form under the write lock and return the resulting form.
    pub async fn with_form<T, F>(&self, id: Uuid, f: F) -> Result<(T, QuizForm), AppError>
    where
        F: FnOnce(&mut QuizForm) -> Result<T, AppError>,
    {
        let mut forms = self.forms.write().await;
        let form = forms.get_mut(&id).ok_or_else(|| unknown_form(id))?;
        let out = f(form)?;
        Ok((out, form.clone()))
    }

    /// Return a form to Idle after its submission settled.
    pub async fn finish_submission(&self, id: Uuid) {
        match self.forms.write().await.get_mut(&id) {
            Some(form) => form.state = SubmissionState::Idle,
            None => debug!(target: "quizcraft", form_id = %id, "Form discarded while submitting"),
        }
    }

    /// Navigation away: discard the session.
    #[instrument(level = "debug", skip(self), fields(%id))]
    pub async fn discard_form(&self, id: Uuid) -> Result<(), AppError> {
        match self.forms.write().await.remove(&id) {
            Some(_) => {
                debug!(target: "quizcraft", form_id = %id, "Form discarded");
                Ok(())
            }
            None => Err(unknown_form(id)),
        }
    }
}

fn unknown_form(id: Uuid) -> AppError {
    AppError::NotFound(format!("unknown form {id}"))
}
