use crate::{
    domain::{BuilderRecord, ProjectViewRecord, ScmKind},
    matcher::FieldKind,
    service::{Fragment, LoadedViews, ViewFragment},
};

use super::{
    error::FormError,
    field::{FieldState, ViewField},
    selection::{SelectionBox, SelectionKind},
};

/// Stable identity of a "project to build" section. The ordinal is handed
/// out once per session and never reused, even after the view is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ViewId(u32);

impl ViewId {
    pub fn new(ordinal: u32) -> Self {
        Self(ordinal)
    }

    pub fn ordinal(self) -> u32 {
        self.0
    }

    pub fn dom_id(self) -> String {
        format!("projectToBuild_{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BuilderId(u32);

impl BuilderId {
    pub fn new(ordinal: u32) -> Self {
        Self(ordinal)
    }

    pub fn dom_id(self) -> String {
        format!("builders_{}", self.0)
    }
}

/// Project-scoped credentials drop-down.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CredentialsSelect {
    options: Vec<String>,
    selected: Option<usize>,
}

impl CredentialsSelect {
    pub fn new(options: Vec<String>) -> Self {
        let selected = if options.is_empty() { None } else { Some(0) };
        Self { options, selected }
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    pub fn value(&self) -> Option<&str> {
        self.selected
            .and_then(|idx| self.options.get(idx))
            .map(String::as_str)
    }

    /// Select the option equal to `value`; unknown values leave the
    /// selection untouched.
    pub fn select(&mut self, value: &str) -> bool {
        match self.options.iter().position(|option| option == value) {
            Some(idx) => {
                self.selected = Some(idx);
                true
            }
            None => false,
        }
    }
}

/// Service-rendered builder block with its optional configuration override.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Builder {
    id: BuilderId,
    pub html: String,
    pub other_config: bool,
    pub user_config: FieldState,
}

impl Builder {
    fn new(id: BuilderId, html: String) -> Self {
        let mut user_config = FieldState::new(FieldKind::UserConfig);
        user_config.visible = false;
        Self {
            id,
            html,
            other_config: false,
            user_config,
        }
    }

    pub fn id(&self) -> BuilderId {
        self.id
    }

    /// The "other config" checkbox: unchecking hides and clears the override.
    pub fn set_other_config(&mut self, checked: bool) {
        self.other_config = checked;
        self.user_config.visible = checked;
        if !checked {
            self.user_config.clear();
        }
    }

    fn to_record(&self) -> BuilderRecord {
        BuilderRecord {
            user_config: (self.other_config && !self.user_config.value.is_empty())
                .then(|| self.user_config.value.clone()),
        }
    }
}

/// One repeatable "project to build" section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectView {
    id: ViewId,
    pub html: String,
    pub local_directory_path: FieldState,
    pub project_url: FieldState,
    pub branch_name: FieldState,
    pub file_to_build: FieldState,
    pub path_to_artifacts: FieldState,
    pub artifacts: SelectionBox,
    pub version_files_enabled: bool,
    pub version_files_path: FieldState,
    pub version_files: SelectionBox,
    pub credentials: CredentialsSelect,
    builders: Vec<Builder>,
    next_builder: u32,
}

impl ProjectView {
    pub fn new(id: ViewId, html: String, credentials: Vec<String>) -> Self {
        let mut version_files_path = FieldState::new(FieldKind::VersionFile);
        version_files_path.visible = false;
        let mut version_files = SelectionBox::new(id, SelectionKind::VersionFiles);
        version_files.visible = false;
        Self {
            id,
            html,
            local_directory_path: FieldState::new(FieldKind::LocalDirectory),
            project_url: FieldState::new(FieldKind::Url),
            branch_name: FieldState::new(FieldKind::Free),
            file_to_build: FieldState::new(FieldKind::FileToBuild),
            path_to_artifacts: FieldState::new(FieldKind::Artifact),
            artifacts: SelectionBox::new(id, SelectionKind::Artifacts),
            version_files_enabled: false,
            version_files_path,
            version_files,
            credentials: CredentialsSelect::new(credentials),
            builders: Vec::new(),
            next_builder: 0,
        }
    }

    /// Rebuild a view from its stored record.
    pub fn from_record(
        id: ViewId,
        html: String,
        credentials: Vec<String>,
        record: &ProjectViewRecord,
    ) -> Self {
        let mut view = Self::new(id, html, credentials);
        view.local_directory_path
            .set_value(record.local_directory_path.clone());
        view.project_url.set_value(record.project_url.clone());
        view.branch_name.set_value(record.branch_name.clone());
        view.file_to_build.set_value(record.file_to_build.clone());
        view.artifacts = SelectionBox::from_entries(id, SelectionKind::Artifacts, &record.artifacts);
        if !record.version_files.is_empty() {
            view.version_files_enabled = true;
            view.version_files_path.visible = true;
            view.version_files = SelectionBox::from_entries(
                id,
                SelectionKind::VersionFiles,
                &record.version_files,
            );
        }
        if let Some(selected) = record.credentials.as_deref() {
            view.credentials.select(selected);
        }
        for stored in &record.builders {
            let builder_id = view.push_builder(String::new());
            if let Some(builder) = view.builder_mut(builder_id)
                && let Some(user_config) = stored.user_config.as_deref()
            {
                builder.set_other_config(true);
                builder.user_config.set_value(user_config);
            }
        }
        view
    }

    pub fn id(&self) -> ViewId {
        self.id
    }

    pub fn builders(&self) -> &[Builder] {
        &self.builders
    }

    pub fn builders_mut(&mut self) -> &mut [Builder] {
        &mut self.builders
    }

    pub fn builder_mut(&mut self, id: BuilderId) -> Option<&mut Builder> {
        self.builders.iter_mut().find(|builder| builder.id == id)
    }

    fn push_builder(&mut self, html: String) -> BuilderId {
        let id = BuilderId::new(self.next_builder);
        self.next_builder += 1;
        self.builders.push(Builder::new(id, html));
        id
    }

    pub fn remove_builder(&mut self, id: BuilderId) -> bool {
        let before = self.builders.len();
        self.builders.retain(|builder| builder.id != id);
        before != self.builders.len()
    }

    pub fn selection_mut(&mut self, kind: SelectionKind) -> &mut SelectionBox {
        match kind {
            SelectionKind::Artifacts => &mut self.artifacts,
            SelectionKind::VersionFiles => &mut self.version_files,
        }
    }

    /// Move the typed path into its selection box; the input is cleared only
    /// when the entry was accepted.
    pub fn add_path(&mut self, kind: SelectionKind) -> Result<(), FormError> {
        let candidate = match kind {
            SelectionKind::Artifacts => self.path_to_artifacts.value.clone(),
            SelectionKind::VersionFiles => self.version_files_path.value.clone(),
        };
        self.selection_mut(kind).add_entry(&candidate)?;
        match kind {
            SelectionKind::Artifacts => self.path_to_artifacts.clear(),
            SelectionKind::VersionFiles => self.version_files_path.clear(),
        }
        Ok(())
    }

    /// The version-files checkbox.
    pub fn set_version_files_enabled(&mut self, enabled: bool) {
        self.version_files_enabled = enabled;
        self.version_files_path.visible = enabled;
        self.version_files_path.clear();
        self.version_files_path.clear_error();
        self.version_files.set_enabled(enabled);
    }

    /// Text inputs that take part in path validation. Credentials and branch
    /// name are never path-checked.
    pub fn path_fields_mut(&mut self) -> [(ViewField, &mut FieldState); 5] {
        [
            (ViewField::LocalDirectoryPath, &mut self.local_directory_path),
            (ViewField::ProjectUrl, &mut self.project_url),
            (ViewField::FileToBuild, &mut self.file_to_build),
            (ViewField::PathToArtifacts, &mut self.path_to_artifacts),
            (ViewField::VersionFilesPath, &mut self.version_files_path),
        ]
    }

    pub fn field(&self, field: ViewField) -> Option<&FieldState> {
        match field {
            ViewField::LocalDirectoryPath => Some(&self.local_directory_path),
            ViewField::ProjectUrl => Some(&self.project_url),
            ViewField::BranchName => Some(&self.branch_name),
            ViewField::FileToBuild => Some(&self.file_to_build),
            ViewField::PathToArtifacts => Some(&self.path_to_artifacts),
            ViewField::VersionFilesPath => Some(&self.version_files_path),
            ViewField::Credentials | ViewField::UserConfig => None,
        }
    }

    pub fn field_mut(&mut self, field: ViewField) -> Option<&mut FieldState> {
        match field {
            ViewField::LocalDirectoryPath => Some(&mut self.local_directory_path),
            ViewField::ProjectUrl => Some(&mut self.project_url),
            ViewField::BranchName => Some(&mut self.branch_name),
            ViewField::FileToBuild => Some(&mut self.file_to_build),
            ViewField::PathToArtifacts => Some(&mut self.path_to_artifacts),
            ViewField::VersionFilesPath => Some(&mut self.version_files_path),
            ViewField::Credentials | ViewField::UserConfig => None,
        }
    }

    pub fn to_record(&self) -> ProjectViewRecord {
        ProjectViewRecord {
            local_directory_path: self.local_directory_path.value.clone(),
            project_url: self.project_url.value.clone(),
            branch_name: self.branch_name.value.clone(),
            file_to_build: self.file_to_build.value.clone(),
            artifacts: self.artifacts.options().to_vec(),
            version_files: self.version_files.options().to_vec(),
            credentials: self.credentials.value().map(str::to_string),
            builders: self.builders.iter().map(Builder::to_record).collect(),
        }
    }
}

/// Owns the ordered set of project views for one page session.
#[derive(Debug, Clone, Default)]
pub struct ProjectViewManager {
    views: Vec<ProjectView>,
    deleted: Vec<ProjectViewRecord>,
    deleted_html: String,
    project_number: u32,
    default_credentials: Option<String>,
}

impl ProjectViewManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next ordinal to hand out; only ever grows within a session.
    pub fn project_number(&self) -> u32 {
        self.project_number
    }

    pub fn reset(&mut self) {
        self.views.clear();
        self.deleted.clear();
        self.deleted_html.clear();
        self.project_number = 0;
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn views(&self) -> &[ProjectView] {
        &self.views
    }

    pub fn views_mut(&mut self) -> &mut [ProjectView] {
        &mut self.views
    }

    pub fn view(&self, id: ViewId) -> Option<&ProjectView> {
        self.views.iter().find(|view| view.id == id)
    }

    pub fn view_mut(&mut self, id: ViewId) -> Option<&mut ProjectView> {
        self.views.iter_mut().find(|view| view.id == id)
    }

    /// Insert a freshly rendered view: derive its local path from the SCM,
    /// apply the session default credentials and advance the ordinal.
    pub fn insert_view(&mut self, fragment: ViewFragment, scm: &ScmKind) -> ViewId {
        let id = ViewId::new(self.project_number);
        let mut view = ProjectView::new(id, fragment.html, fragment.credentials);
        let local_path = default_local_path(scm, self.project_number);
        view.local_directory_path.set_value(local_path.clone());
        self.views.push(view);
        self.set_default_credentials(id);
        self.project_number += 1;
        tracing::info!(
            view = %id.dom_id(),
            local_path = %local_path,
            project_number = self.project_number,
            "project view added"
        );
        id
    }

    /// Replace the views with the ones stored for an existing configuration.
    pub fn load_existing(&mut self, loaded: LoadedViews) {
        if loaded.html.is_empty() && loaded.views.is_empty() {
            return;
        }
        self.views = loaded
            .views
            .iter()
            .enumerate()
            .map(|(idx, record)| {
                ProjectView::from_record(
                    ViewId::new(idx as u32),
                    String::new(),
                    loaded.credentials.clone(),
                    record,
                )
            })
            .collect();
        if let Some(first) = self.views.first_mut() {
            first.html = loaded.html;
        }
        self.project_number = self.views.len() as u32;
        tracing::debug!(count = self.project_number, "existing project views loaded");
    }

    /// Views present in the approved configuration but gone from the draft.
    /// Shown read-only; they never take an ordinal.
    pub fn load_deleted(&mut self, html: String, records: Vec<ProjectViewRecord>) {
        self.deleted_html = html;
        self.deleted = records;
    }

    pub fn deleted(&self) -> &[ProjectViewRecord] {
        &self.deleted
    }

    /// Close a view. Remaining views keep their ordinals.
    pub fn remove_view(&mut self, id: ViewId) -> bool {
        let before = self.views.len();
        self.views.retain(|view| view.id != id);
        let removed = before != self.views.len();
        if removed {
            tracing::info!(view = %id.dom_id(), "project view closed");
        }
        removed
    }

    pub fn add_builder(&mut self, view: ViewId, fragment: Fragment) -> Option<BuilderId> {
        let view = self.view_mut(view)?;
        Some(view.push_builder(fragment.html))
    }

    pub fn remove_builder(&mut self, view: ViewId, builder: BuilderId) -> bool {
        self.view_mut(view)
            .map(|view| view.remove_builder(builder))
            .unwrap_or(false)
    }

    pub fn default_credentials(&self) -> Option<&str> {
        self.default_credentials.as_deref()
    }

    /// Seed the session default (e.g. from the service's new-configuration
    /// defaults).
    pub fn set_session_default_credentials(&mut self, credentials: Option<String>) {
        self.default_credentials = credentials;
    }

    /// Remember the credentials chosen in `id` for views added afterwards.
    pub fn set_current_credentials_as_default(&mut self, id: ViewId) -> Option<&str> {
        let value = self.view(id)?.credentials.value()?.to_string();
        tracing::debug!(view = %id.dom_id(), credentials = %value, "default credentials updated");
        self.default_credentials = Some(value);
        self.default_credentials.as_deref()
    }

    pub fn set_default_credentials(&mut self, id: ViewId) -> bool {
        let Some(default) = self.default_credentials.clone() else {
            return false;
        };
        self.view_mut(id)
            .map(|view| view.credentials.select(&default))
            .unwrap_or(false)
    }

    pub fn records(&self) -> Vec<ProjectViewRecord> {
        self.views.iter().map(ProjectView::to_record).collect()
    }
}

fn default_local_path(scm: &ScmKind, project_number: u32) -> String {
    let base = scm.default_local_path();
    if project_number > 0 {
        format!("{base}{project_number}")
    } else {
        base.to_string()
    }
}
