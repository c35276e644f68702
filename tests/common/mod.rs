#![allow(dead_code)]

use std::cell::RefCell;

use async_trait::async_trait;
use build_configurator::{
    FormSubmission,
    domain::{BuildConfiguration, ConfigurationState, NewConfigurationDefaults, ProjectViewRecord},
    service::{
        ConfigurationService, Fragment, LoadedUsers, LoadedViews, ServiceError, ViewFragment,
    },
};
use indexmap::IndexMap;

/// In-memory service that records every call it receives.
#[derive(Default)]
pub struct RecordingService {
    pub configuration: Option<BuildConfiguration>,
    pub approved: Option<BuildConfiguration>,
    pub views: Vec<ProjectViewRecord>,
    pub deleted: Vec<ProjectViewRecord>,
    pub users: Vec<String>,
    pub taken_names: Vec<String>,
    pub trigger_answer: String,
    pub fail_submit: bool,
    pub calls: RefCell<Vec<&'static str>>,
    pub submissions: RefCell<Vec<FormSubmission>>,
}

impl RecordingService {
    pub fn new() -> Self {
        Self {
            trigger_answer: "Would last have run at Monday 12:00".to_string(),
            ..Self::default()
        }
    }

    pub fn with_configuration(mut self, configuration: BuildConfiguration) -> Self {
        self.configuration = Some(configuration);
        self
    }

    pub fn with_approved(mut self, approved: BuildConfiguration) -> Self {
        self.approved = Some(approved);
        self
    }

    pub fn with_views(mut self, views: Vec<ProjectViewRecord>) -> Self {
        self.views = views;
        self
    }

    pub fn called(&self, name: &str) -> bool {
        self.calls.borrow().iter().any(|call| *call == name)
    }

    pub fn count(&self, name: &str) -> usize {
        self.calls.borrow().iter().filter(|call| **call == name).count()
    }

    fn record(&self, name: &'static str) {
        self.calls.borrow_mut().push(name);
    }

    fn stored(&self, name: &str) -> Result<BuildConfiguration, ServiceError> {
        self.configuration
            .clone()
            .filter(|config| config.project_name == name)
            .ok_or_else(|| ServiceError::NotFound(name.to_string()))
    }
}

pub fn configuration(name: &str, state: ConfigurationState) -> BuildConfiguration {
    let mut machines = IndexMap::new();
    machines.insert("linux-01".to_string(), true);
    machines.insert("win-01".to_string(), false);
    BuildConfiguration {
        project_name: name.to_string(),
        scm: Some("Git".to_string()),
        pre_script: Some("make deps".to_string()),
        poll_scm_trigger: Some("H * * * *".to_string()),
        clean_workspace: Some(true),
        build_on_commit_trigger: Some(true),
        build_machine_configuration: machines,
        state,
        creator: Some("jdoe".to_string()),
        ..BuildConfiguration::default()
    }
}

pub fn view_record(url: &str) -> ProjectViewRecord {
    ProjectViewRecord {
        local_directory_path: ".".to_string(),
        project_url: url.to_string(),
        ..ProjectViewRecord::default()
    }
}

#[async_trait(?Send)]
impl ConfigurationService for RecordingService {
    async fn load_create_new_build_configuration(
        &self,
    ) -> Result<NewConfigurationDefaults, ServiceError> {
        self.record("load_create_new_build_configuration");
        Ok(NewConfigurationDefaults {
            scm: Some("Git".to_string()),
            default_credentials: None,
            credentials: vec!["none".to_string(), "deploy-key".to_string()],
            nodes: vec!["linux-01".to_string(), "win-01".to_string()],
        })
    }

    async fn get_configuration(&self, name: &str) -> Result<BuildConfiguration, ServiceError> {
        self.record("get_configuration");
        self.stored(name)
    }

    async fn get_diff_configuration(
        &self,
        _name: &str,
    ) -> Result<Option<BuildConfiguration>, ServiceError> {
        self.record("get_diff_configuration");
        Ok(self.approved.clone())
    }

    async fn is_current_user_administrator(&self) -> Result<bool, ServiceError> {
        self.record("is_current_user_administrator");
        Ok(false)
    }

    async fn get_full_name_creator(&self, user_id: &str) -> Result<String, ServiceError> {
        self.record("get_full_name_creator");
        Ok(format!("Full name of {user_id}"))
    }

    async fn load_views(&self, _name: &str) -> Result<LoadedViews, ServiceError> {
        self.record("load_views");
        Ok(LoadedViews {
            html: "<div class=\"views\"/>".to_string(),
            credentials: vec!["none".to_string()],
            views: self.views.clone(),
        })
    }

    async fn load_deleted_views(&self, _name: &str) -> Result<LoadedViews, ServiceError> {
        self.record("load_deleted_views");
        Ok(LoadedViews {
            html: "<div class=\"deleted\"/>".to_string(),
            credentials: Vec::new(),
            views: self.deleted.clone(),
        })
    }

    async fn load_user_access_view(&self, _name: &str) -> Result<LoadedUsers, ServiceError> {
        self.record("load_user_access_view");
        Ok(LoadedUsers {
            html: if self.users.is_empty() {
                String::new()
            } else {
                "<tr/>".to_string()
            },
            users: self.users.clone(),
        })
    }

    async fn get_view(&self) -> Result<ViewFragment, ServiceError> {
        self.record("get_view");
        Ok(ViewFragment {
            html: "<div class=\"view\"/>".to_string(),
            credentials: vec!["none".to_string(), "deploy-key".to_string()],
        })
    }

    async fn get_builder_view(&self) -> Result<Fragment, ServiceError> {
        self.record("get_builder_view");
        Ok(Fragment {
            html: "<div class=\"builder\"/>".to_string(),
        })
    }

    async fn get_user_access_view(&self) -> Result<Fragment, ServiceError> {
        self.record("get_user_access_view");
        Ok(Fragment {
            html: "<tr/>".to_string(),
        })
    }

    async fn is_name_free(&self, name: &str) -> Result<bool, ServiceError> {
        self.record("is_name_free");
        Ok(!self.taken_names.iter().any(|taken| taken == name))
    }

    async fn get_help_message(&self, field: &str) -> Result<String, ServiceError> {
        self.record("get_help_message");
        Ok(format!("help for {field}"))
    }

    async fn check_trigger(&self, _expression: &str) -> Result<String, ServiceError> {
        self.record("check_trigger");
        Ok(self.trigger_answer.clone())
    }

    async fn submit(&self, submission: &FormSubmission) -> Result<(), ServiceError> {
        self.record("submit");
        if self.fail_submit {
            return Err(ServiceError::Unavailable("connection reset".to_string()));
        }
        self.submissions.borrow_mut().push(submission.clone());
        Ok(())
    }
}
