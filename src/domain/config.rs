use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Lifecycle state of a stored build configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConfigurationState {
    #[default]
    New,
    Updated,
    Approved,
    Rejected,
    ForDeletion,
}

/// Source-control flavour selected for the whole configuration.
///
/// The record keeps the raw label (diffing compares raw strings); this enum
/// is only used to derive per-view defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScmKind {
    None,
    Git,
    Subversion,
    Other(String),
}

impl ScmKind {
    pub fn from_label(label: &str) -> Self {
        match label {
            "" | "None" | "none" => ScmKind::None,
            "Git" => ScmKind::Git,
            "Subversion" => ScmKind::Subversion,
            other => ScmKind::Other(other.to_string()),
        }
    }

    /// Base of the default local checkout folder for a freshly added view.
    pub fn default_local_path(&self) -> &'static str {
        match self {
            ScmKind::Git => ".",
            ScmKind::Subversion => "Development",
            ScmKind::None | ScmKind::Other(_) => "",
        }
    }
}

impl fmt::Display for ScmKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScmKind::None => write!(f, "None"),
            ScmKind::Git => write!(f, "Git"),
            ScmKind::Subversion => write!(f, "Subversion"),
            ScmKind::Other(label) => write!(f, "{label}"),
        }
    }
}

/// A build configuration as exchanged with the configuration service.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BuildConfiguration {
    pub project_name: String,
    pub scm: Option<String>,
    pub script_type: Option<String>,
    pub pre_script: Option<String>,
    pub post_script: Option<String>,
    pub comments: Option<String>,
    pub reg_exp: Option<String>,
    #[serde(rename = "pollSCMTrigger")]
    pub poll_scm_trigger: Option<String>,
    pub build_periodically_trigger: Option<String>,
    pub build_on_commit_trigger: Option<bool>,
    pub email: Option<String>,
    pub config_email: Option<String>,
    pub clean_workspace: Option<bool>,
    pub build_machine_configuration: IndexMap<String, bool>,
    pub users_list: Vec<String>,
    pub project_to_build: Vec<ProjectViewRecord>,
    pub state: ConfigurationState,
    pub rejection_reason: String,
    pub creator: Option<String>,
}

impl BuildConfiguration {
    pub fn is_approved(&self) -> bool {
        self.state == ConfigurationState::Approved
    }
}

/// Serialized form of one "project to build" section.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectViewRecord {
    pub local_directory_path: String,
    pub project_url: String,
    pub branch_name: String,
    pub file_to_build: String,
    pub artifacts: Vec<String>,
    pub version_files: Vec<String>,
    pub credentials: Option<String>,
    pub builders: Vec<BuilderRecord>,
}

impl ProjectViewRecord {
    /// Identity used to match a view across draft and approved records.
    pub fn same_source(&self, other: &ProjectViewRecord) -> bool {
        self.project_url == other.project_url
            && self.local_directory_path == other.local_directory_path
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BuilderRecord {
    pub user_config: Option<String>,
}

/// Defaults handed out when a brand new configuration is started.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewConfigurationDefaults {
    pub scm: Option<String>,
    pub default_credentials: Option<String>,
    pub credentials: Vec<String>,
    pub nodes: Vec<String>,
}
