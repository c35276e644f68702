//! Boundary to the configuration service.
//!
//! Every call is awaited exactly once and either yields its result or a
//! [`ServiceError`]; nothing is retried.

mod file;

use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{
    app::FormSubmission,
    domain::{BuildConfiguration, NewConfigurationDefaults, ProjectViewRecord},
};

pub use file::{FileConfigurationService, FileServiceOptions};

/// Marker the service puts into a cron check answer when the expression is
/// not accepted.
pub const TRIGGER_ERROR_MARKER: &str = "ERROR";

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("configuration '{0}' not found")]
    NotFound(String),

    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("configuration service unavailable: {0}")]
    Unavailable(String),

    #[error("request refused: {0}")]
    Refused(String),
}

/// Ready-made markup returned by the service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fragment {
    pub html: String,
}

/// Markup for a new project view plus the credential ids it offers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewFragment {
    pub html: String,
    pub credentials: Vec<String>,
}

/// Pre-populated views of an existing configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoadedViews {
    pub html: String,
    pub credentials: Vec<String>,
    pub views: Vec<ProjectViewRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadedUsers {
    pub html: String,
    pub users: Vec<String>,
}

/// Typed view of a cron check answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerCheck {
    pub valid: bool,
    pub message: String,
}

impl TriggerCheck {
    /// The raw answer is human readable; it is invalid exactly when it
    /// contains [`TRIGGER_ERROR_MARKER`].
    pub fn from_response(message: String) -> Self {
        Self {
            valid: !message.contains(TRIGGER_ERROR_MARKER),
            message,
        }
    }
}

#[async_trait(?Send)]
pub trait ConfigurationService {
    async fn load_create_new_build_configuration(
        &self,
    ) -> Result<NewConfigurationDefaults, ServiceError>;

    async fn get_configuration(&self, name: &str) -> Result<BuildConfiguration, ServiceError>;

    /// Last approved version, if any.
    async fn get_diff_configuration(
        &self,
        name: &str,
    ) -> Result<Option<BuildConfiguration>, ServiceError>;

    async fn is_current_user_administrator(&self) -> Result<bool, ServiceError>;

    async fn get_full_name_creator(&self, user_id: &str) -> Result<String, ServiceError>;

    async fn load_views(&self, name: &str) -> Result<LoadedViews, ServiceError>;

    /// Views of the approved version that the draft no longer has.
    async fn load_deleted_views(&self, name: &str) -> Result<LoadedViews, ServiceError>;

    async fn load_user_access_view(&self, name: &str) -> Result<LoadedUsers, ServiceError>;

    async fn get_view(&self) -> Result<ViewFragment, ServiceError>;

    async fn get_builder_view(&self) -> Result<Fragment, ServiceError>;

    async fn get_user_access_view(&self) -> Result<Fragment, ServiceError>;

    async fn is_name_free(&self, name: &str) -> Result<bool, ServiceError>;

    async fn get_help_message(&self, field: &str) -> Result<String, ServiceError>;

    /// Raw, human readable verdict on a cron expression.
    async fn check_trigger(&self, expression: &str) -> Result<String, ServiceError>;

    async fn submit(&self, submission: &FormSubmission) -> Result<(), ServiceError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trigger_answers_are_judged_by_marker() {
        let bad = TriggerCheck::from_response("ERROR: expecting 5 fields".into());
        assert!(!bad.valid);
        let good = TriggerCheck::from_response("Would last have run at 12:00".into());
        assert!(good.valid);
        assert!(
            TriggerCheck::from_response("error in lowercase".into()).valid,
            "the marker is case sensitive"
        );
    }
}
