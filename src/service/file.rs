use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use async_trait::async_trait;
use indexmap::IndexMap;
use regex::Regex;
use serde::{Serialize, de::DeserializeOwned};

use crate::{
    app::FormSubmission,
    domain::{
        BuildConfiguration, ConfigurationState, FormType, NewConfigurationDefaults,
        ProjectViewRecord,
    },
    io::{DocumentFormat, input::parse_document_as, output::OutputOptions},
    matcher,
};

use super::{
    ConfigurationService, Fragment, LoadedUsers, LoadedViews, ServiceError, ViewFragment,
};

const CONFIG_STEM: &str = "config";
const DIFF_DIR: &str = "diff";

static CRON_ITEM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:\*|H(?:\((\d+)-(\d+)\))?|(\d+)(?:-(\d+))?)(?:/(\d+))?$").unwrap()
});

const CRON_ALIASES: [&str; 7] = [
    "@yearly",
    "@annually",
    "@monthly",
    "@weekly",
    "@daily",
    "@midnight",
    "@hourly",
];

/// Inclusive bounds of minute, hour, day of month, month and day of week.
const CRON_BOUNDS: [(u32, u32); 5] = [(0, 59), (0, 23), (1, 31), (1, 12), (0, 7)];

#[derive(Debug, Clone)]
pub struct FileServiceOptions {
    pub root: PathBuf,
    pub current_user: String,
    pub administrators: Vec<String>,
    /// Format used for records that do not exist yet.
    pub format: DocumentFormat,
}

impl FileServiceOptions {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            current_user: "anonymous".to_string(),
            administrators: Vec::new(),
            format: DocumentFormat::Json,
        }
    }

    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.current_user = user.into();
        self
    }

    pub fn with_administrators<I, S>(mut self, administrators: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.administrators = administrators.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_format(mut self, format: DocumentFormat) -> Self {
        self.format = format;
        self
    }
}

/// Configuration service backed by a directory tree:
///
/// ```text
/// <root>/defaults.<ext>            new-configuration defaults
/// <root>/users.<ext>               user id -> full name
/// <root>/help.<ext>                field name -> help text
/// <root>/<name>/config.<ext>       current draft
/// <root>/<name>/diff/config.<ext>  last approved copy
/// ```
#[derive(Debug, Clone)]
pub struct FileConfigurationService {
    options: FileServiceOptions,
}

impl FileConfigurationService {
    pub fn new(options: FileServiceOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &FileServiceOptions {
        &self.options
    }

    /// Directory of one configuration. Names that are not plain project names
    /// never reach the filesystem.
    fn project_dir(&self, name: &str) -> Result<PathBuf, ServiceError> {
        matcher::project_name(name)
            .map_err(|reason| ServiceError::Refused(format!("'{name}': {reason}")))?;
        Ok(self.options.root.join(name))
    }

    fn config_path(&self, name: &str) -> Result<Option<PathBuf>, ServiceError> {
        Ok(find_document(&self.project_dir(name)?, CONFIG_STEM))
    }

    fn approved_path(&self, name: &str) -> Result<Option<PathBuf>, ServiceError> {
        Ok(find_document(&self.project_dir(name)?.join(DIFF_DIR), CONFIG_STEM))
    }

    fn read_optional<T: DeserializeOwned + Default>(&self, stem: &str) -> Result<T, ServiceError> {
        match find_document(&self.options.root, stem) {
            Some(path) => read_record(&path),
            None => Ok(T::default()),
        }
    }

    fn load(&self, name: &str) -> Result<BuildConfiguration, ServiceError> {
        let path = self
            .config_path(name)?
            .ok_or_else(|| ServiceError::NotFound(name.to_string()))?;
        read_record(&path)
    }

    fn load_approved(&self, name: &str) -> Result<Option<BuildConfiguration>, ServiceError> {
        self.approved_path(name)?
            .map(|path| read_record(&path))
            .transpose()
    }

    fn credentials(&self) -> Result<Vec<String>, ServiceError> {
        let defaults: NewConfigurationDefaults = self.read_optional("defaults")?;
        Ok(defaults.credentials)
    }

    fn write(&self, dir: &Path, record: &BuildConfiguration) -> Result<PathBuf, ServiceError> {
        let path = find_document(dir, CONFIG_STEM).unwrap_or_else(|| {
            dir.join(format!("{CONFIG_STEM}.{}", self.options.format.extension()))
        });
        let format = DocumentFormat::from_path(&path).unwrap_or(self.options.format);
        write_record(&path, record, format)?;
        Ok(path)
    }
}

#[async_trait(?Send)]
impl ConfigurationService for FileConfigurationService {
    async fn load_create_new_build_configuration(
        &self,
    ) -> Result<NewConfigurationDefaults, ServiceError> {
        self.read_optional("defaults")
    }

    async fn get_configuration(&self, name: &str) -> Result<BuildConfiguration, ServiceError> {
        self.load(name)
    }

    async fn get_diff_configuration(
        &self,
        name: &str,
    ) -> Result<Option<BuildConfiguration>, ServiceError> {
        self.load_approved(name)
    }

    async fn is_current_user_administrator(&self) -> Result<bool, ServiceError> {
        Ok(self
            .options
            .administrators
            .iter()
            .any(|admin| *admin == self.options.current_user))
    }

    async fn get_full_name_creator(&self, user_id: &str) -> Result<String, ServiceError> {
        let users: IndexMap<String, String> = self.read_optional("users")?;
        Ok(users
            .get(user_id)
            .cloned()
            .unwrap_or_else(|| user_id.to_string()))
    }

    async fn load_views(&self, name: &str) -> Result<LoadedViews, ServiceError> {
        let config = self.load(name)?;
        Ok(LoadedViews {
            html: render_views("projectToBuild", config.project_to_build.len()),
            credentials: self.credentials()?,
            views: config.project_to_build,
        })
    }

    async fn load_deleted_views(&self, name: &str) -> Result<LoadedViews, ServiceError> {
        let draft = self.load(name)?;
        let Some(approved) = self.load_approved(name)? else {
            return Ok(LoadedViews::default());
        };
        let deleted: Vec<ProjectViewRecord> = approved
            .project_to_build
            .into_iter()
            .filter(|old| !draft.project_to_build.iter().any(|view| view.same_source(old)))
            .collect();
        Ok(LoadedViews {
            html: render_views("projectToBuildDeleted", deleted.len()),
            credentials: Vec::new(),
            views: deleted,
        })
    }

    async fn load_user_access_view(&self, name: &str) -> Result<LoadedUsers, ServiceError> {
        let config = self.load(name)?;
        let html = config
            .users_list
            .iter()
            .map(|user| {
                format!("<div class=\"userDiv\"><input name=\"userName\" value=\"{user}\"/></div>")
            })
            .collect::<String>();
        Ok(LoadedUsers {
            html,
            users: config.users_list,
        })
    }

    async fn get_view(&self) -> Result<ViewFragment, ServiceError> {
        Ok(ViewFragment {
            html: "<div name=\"projectToBuild\"></div>".to_string(),
            credentials: self.credentials()?,
        })
    }

    async fn get_builder_view(&self) -> Result<Fragment, ServiceError> {
        Ok(Fragment {
            html: "<div name=\"builders\"></div>".to_string(),
        })
    }

    async fn get_user_access_view(&self) -> Result<Fragment, ServiceError> {
        Ok(Fragment {
            html: "<div class=\"userDiv\"><input name=\"userName\"/></div>".to_string(),
        })
    }

    async fn is_name_free(&self, name: &str) -> Result<bool, ServiceError> {
        Ok(self.config_path(name)?.is_none())
    }

    async fn get_help_message(&self, field: &str) -> Result<String, ServiceError> {
        let help: IndexMap<String, String> = self.read_optional("help")?;
        Ok(help.get(field).cloned().unwrap_or_default())
    }

    async fn check_trigger(&self, expression: &str) -> Result<String, ServiceError> {
        Ok(describe_schedule(expression))
    }

    async fn submit(&self, submission: &FormSubmission) -> Result<(), ServiceError> {
        let mut record = submission.configuration.clone();
        let name = record.project_name.clone();
        if name.is_empty() {
            return Err(ServiceError::Refused("project name is empty".to_string()));
        }
        let dir = self.project_dir(&name)?;
        let previous = self
            .config_path(&name)?
            .map(|path| read_record::<BuildConfiguration>(&path))
            .transpose()?;
        match submission.form_type {
            FormType::Create => {
                if previous.is_some() {
                    return Err(ServiceError::Refused(format!(
                        "configuration '{name}' already exists"
                    )));
                }
                record.state = ConfigurationState::New;
                record.creator = Some(self.options.current_user.clone());
                record.rejection_reason.clear();
            }
            FormType::Edit => {
                let previous = previous.ok_or_else(|| ServiceError::NotFound(name.clone()))?;
                record.state = ConfigurationState::Updated;
                record.creator = previous.creator;
                record.rejection_reason.clear();
            }
            FormType::Approved => {
                if previous.is_none() {
                    return Err(ServiceError::NotFound(name));
                }
                record.state = ConfigurationState::Approved;
                record.rejection_reason.clear();
                self.write(&dir.join(DIFF_DIR), &record)?;
            }
            FormType::Reject => {
                let mut previous = previous.ok_or_else(|| ServiceError::NotFound(name.clone()))?;
                previous.state = ConfigurationState::Rejected;
                previous.rejection_reason = submission.rejection_reason.clone();
                record = previous;
            }
            FormType::View | FormType::ApproveReject => {
                return Err(ServiceError::Refused(format!(
                    "form type {} cannot be submitted",
                    submission.form_type
                )));
            }
        }
        let path = self.write(&dir, &record)?;
        tracing::info!(
            project = %name,
            form_type = %submission.form_type,
            state = ?record.state,
            path = %path.display(),
            "configuration stored"
        );
        Ok(())
    }
}

fn find_document(dir: &Path, stem: &str) -> Option<PathBuf> {
    DocumentFormat::available()
        .iter()
        .map(|format| dir.join(format!("{stem}.{}", format.extension())))
        .find(|path| path.is_file())
}

fn read_record<T: DeserializeOwned>(path: &Path) -> Result<T, ServiceError> {
    let format = DocumentFormat::from_path(path).ok_or_else(|| ServiceError::Parse {
        path: path.to_path_buf(),
        message: "unsupported document format".to_string(),
    })?;
    let contents = fs::read_to_string(path).map_err(|source| ServiceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), %format, "reading record");
    parse_document_as(&contents, format).map_err(|err| ServiceError::Parse {
        path: path.to_path_buf(),
        message: format!("{err:#}"),
    })
}

fn write_record<T: Serialize>(
    path: &Path,
    record: &T,
    format: DocumentFormat,
) -> Result<(), ServiceError> {
    let payload = OutputOptions::new(format)
        .render(record)
        .map_err(|err| ServiceError::Parse {
            path: path.to_path_buf(),
            message: format!("{err:#}"),
        })?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| ServiceError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    fs::write(path, payload).map_err(|source| ServiceError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn render_views(name: &str, count: usize) -> String {
    (0..count)
        .map(|idx| format!("<div name=\"{name}\" id=\"{name}_{idx}\"></div>"))
        .collect()
}

/// Human readable verdict on a cron schedule. Invalid schedules produce a
/// message containing `ERROR`.
pub fn describe_schedule(expression: &str) -> String {
    let lines: Vec<&str> = expression
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .collect();
    if lines.is_empty() {
        return "No schedules so will only run due to SCM changes if triggered by a post-commit hook"
            .to_string();
    }
    for line in &lines {
        if let Err(reason) = check_schedule_line(line) {
            return format!("ERROR: Invalid input: \"{line}\": {reason}");
        }
    }
    format!("Schedule accepted: {}", lines.join(" | "))
}

fn check_schedule_line(line: &str) -> Result<(), String> {
    if CRON_ALIASES.contains(&line) {
        return Ok(());
    }
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() != CRON_BOUNDS.len() {
        return Err(format!("expected 5 fields, found {}", fields.len()));
    }
    for (field, (min, max)) in fields.iter().zip(CRON_BOUNDS) {
        for item in field.split(',') {
            check_cron_item(item, min, max)?;
        }
    }
    Ok(())
}

fn check_cron_item(item: &str, min: u32, max: u32) -> Result<(), String> {
    let caps = CRON_ITEM
        .captures(item)
        .ok_or_else(|| format!("'{item}' is not a cron token"))?;
    let number = |idx: usize| -> Result<Option<u32>, String> {
        caps.get(idx)
            .map(|m| {
                m.as_str()
                    .parse::<u32>()
                    .map_err(|_| format!("'{}' is out of range", m.as_str()))
            })
            .transpose()
    };
    let bounds = [number(1)?, number(2)?, number(3)?, number(4)?];
    for value in bounds.into_iter().flatten() {
        if value < min || value > max {
            return Err(format!("{value} is not in {min}-{max}"));
        }
    }
    if let (Some(low), Some(high)) = (bounds[0].or(bounds[2]), bounds[1].or(bounds[3]))
        && low > high
    {
        return Err(format!("range {low}-{high} is reversed"));
    }
    if let Some(step) = number(5)?
        && step == 0
    {
        return Err("step must be positive".to_string());
    }
    Ok(())
}
