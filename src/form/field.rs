use crate::matcher::{self, FieldKind};

use super::views::{BuilderId, ViewId};

/// One text input on the page together with its live error indicator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldState {
    pub kind: FieldKind,
    pub value: String,
    pub enabled: bool,
    pub visible: bool,
    pub error: Option<String>,
}

impl FieldState {
    pub fn new(kind: FieldKind) -> Self {
        Self {
            kind,
            value: String::new(),
            enabled: true,
            visible: true,
            error: None,
        }
    }

    pub fn with_value(kind: FieldKind, value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            ..Self::new(kind)
        }
    }

    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }

    /// Re-run the field's rule as if it had just lost focus.
    pub fn blur(&mut self) -> bool {
        match matcher::check(self.kind, &self.value) {
            Ok(()) => {
                self.error = None;
                true
            }
            Err(message) => {
                self.error = Some(message.to_string());
                false
            }
        }
    }

    pub fn is_wrong(&self) -> bool {
        self.error.is_some()
    }

    pub fn clear(&mut self) {
        self.value.clear();
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }
}

/// Field names inside a project view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewField {
    LocalDirectoryPath,
    ProjectUrl,
    BranchName,
    FileToBuild,
    PathToArtifacts,
    VersionFilesPath,
    Credentials,
    UserConfig,
}

impl ViewField {
    const ALL: [ViewField; 8] = [
        ViewField::LocalDirectoryPath,
        ViewField::ProjectUrl,
        ViewField::BranchName,
        ViewField::FileToBuild,
        ViewField::PathToArtifacts,
        ViewField::VersionFilesPath,
        ViewField::Credentials,
        ViewField::UserConfig,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.name() == name)
    }

    pub fn name(self) -> &'static str {
        match self {
            ViewField::LocalDirectoryPath => "localDirectoryPath",
            ViewField::ProjectUrl => "projectUrl",
            ViewField::BranchName => "branchName",
            ViewField::FileToBuild => "fileToBuild",
            ViewField::PathToArtifacts => "pathToArtifacts",
            ViewField::VersionFilesPath => "versionFilesPath",
            ViewField::Credentials => "credentials",
            ViewField::UserConfig => "userConfig",
        }
    }
}

/// Addresses a focusable field anywhere on the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldRef {
    ProjectName,
    Email,
    ConfigEmail,
    PollScmTrigger,
    BuildPeriodicallyTrigger,
    RejectionReason,
    AddUser,
    View { view: ViewId, field: ViewField },
    Builder { view: ViewId, builder: BuilderId },
}

impl FieldRef {
    /// Element id (or name within a view) the rendering layer uses.
    pub fn element_name(&self) -> String {
        match self {
            FieldRef::ProjectName => "projectName".to_string(),
            FieldRef::Email => "email".to_string(),
            FieldRef::ConfigEmail => "configEmail".to_string(),
            FieldRef::PollScmTrigger => "pollSCMTrigger".to_string(),
            FieldRef::BuildPeriodicallyTrigger => "buildPeriodicallyTrigger".to_string(),
            FieldRef::RejectionReason => "textReject".to_string(),
            FieldRef::AddUser => "addUserField".to_string(),
            FieldRef::View { view, field } => format!("{}/{}", view.dom_id(), field.name()),
            FieldRef::Builder { view, builder } => {
                format!("{}/{}/userConfig", view.dom_id(), builder.dom_id())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown field '{0}'")]
pub struct UnknownField(pub String);

impl std::str::FromStr for FieldRef {
    type Err = UnknownField;

    /// Inverse of [`FieldRef::element_name`].
    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let unknown = || UnknownField(name.to_string());
        let simple = match name {
            "projectName" => Some(FieldRef::ProjectName),
            "email" => Some(FieldRef::Email),
            "configEmail" => Some(FieldRef::ConfigEmail),
            "pollSCMTrigger" => Some(FieldRef::PollScmTrigger),
            "buildPeriodicallyTrigger" => Some(FieldRef::BuildPeriodicallyTrigger),
            "textReject" => Some(FieldRef::RejectionReason),
            "addUserField" => Some(FieldRef::AddUser),
            _ => None,
        };
        if let Some(field) = simple {
            return Ok(field);
        }

        let mut parts = name.split('/');
        let view = parts
            .next()
            .and_then(|part| part.strip_prefix("projectToBuild_"))
            .and_then(|ordinal| ordinal.parse().ok())
            .map(ViewId::new)
            .ok_or_else(unknown)?;
        match (parts.next(), parts.next(), parts.next()) {
            (Some(field), None, None) => ViewField::from_name(field)
                .map(|field| FieldRef::View { view, field })
                .ok_or_else(unknown),
            (Some(builder), Some("userConfig"), None) => builder
                .strip_prefix("builders_")
                .and_then(|ordinal| ordinal.parse().ok())
                .map(|ordinal| FieldRef::Builder {
                    view,
                    builder: BuilderId::new(ordinal),
                })
                .ok_or_else(unknown),
            _ => Err(unknown()),
        }
    }
}

impl std::fmt::Display for FieldRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.element_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blur_sets_and_clears_errors() {
        let mut field = FieldState::with_value(FieldKind::Url, "not a url");
        assert!(!field.blur());
        assert_eq!(field.error.as_deref(), Some(FieldKind::Url.error_message()));
        field.set_value("https://example.com/repo.git");
        assert!(field.blur());
        assert!(!field.is_wrong());
    }

    #[test]
    fn field_refs_render_scoped_names() {
        let reference = FieldRef::View {
            view: ViewId::new(3),
            field: ViewField::ProjectUrl,
        };
        assert_eq!(reference.to_string(), "projectToBuild_3/projectUrl");
    }

    #[test]
    fn element_names_parse_back() {
        for name in [
            "projectName",
            "pollSCMTrigger",
            "projectToBuild_0/localDirectoryPath",
            "projectToBuild_2/builders_1/userConfig",
        ] {
            let parsed: FieldRef = name.parse().unwrap();
            assert_eq!(parsed.element_name(), name);
        }
        assert!("projectToBuild_x/projectUrl".parse::<FieldRef>().is_err());
        assert!("projectToBuild_0/builders_1/other".parse::<FieldRef>().is_err());
        assert!("scm".parse::<FieldRef>().is_err());
    }
}
