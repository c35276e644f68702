use std::collections::BTreeSet;

use indexmap::IndexMap;

use crate::{
    domain::{
        BuildConfiguration, ConfigurationState, FormResult, FormType, PageMode, ScmKind,
    },
    matcher::FieldKind,
    service::TriggerCheck,
};

use super::{
    diff::DiffReport,
    error::FormError,
    field::{FieldRef, FieldState},
    selection::MachineSelection,
    users::UserAccessList,
    views::ProjectViewManager,
};

pub const REJECTION_LABEL: &str = "Reason of rejection:  ";
pub const CREATOR_LABEL: &str = "Created by:  ";

/// A cron trigger input plus the last verdict the service gave for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerField {
    pub field: FieldState,
    pub check: Option<TriggerCheck>,
}

impl TriggerField {
    fn new() -> Self {
        Self {
            field: FieldState::new(FieldKind::Trigger),
            check: None,
        }
    }

    /// Whether the last service answer flagged the expression.
    pub fn is_error(&self) -> bool {
        self.check.as_ref().is_some_and(|check| !check.valid)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageChrome {
    pub title: String,
    pub save_label: String,
    pub save_visible: bool,
    pub reject_visible: bool,
    pub read_only_banner: bool,
}

impl PageChrome {
    pub fn for_mode(mode: PageMode) -> Self {
        let mut chrome = Self {
            title: "Build configuration".to_string(),
            save_label: "Save".to_string(),
            save_visible: true,
            reject_visible: false,
            read_only_banner: false,
        };
        match mode {
            PageMode::Create => chrome.title = "Create build configuration".to_string(),
            PageMode::Edit => chrome.title = "Edit build configuration".to_string(),
            PageMode::View => {
                chrome.save_visible = false;
                chrome.read_only_banner = true;
            }
            PageMode::ApproveReject => {
                chrome.title = "Approve/reject build configuration".to_string();
                chrome.save_label = "Approve".to_string();
                chrome.reject_visible = true;
            }
        }
        chrome
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectDialog {
    pub visible: bool,
    pub reason: FieldState,
}

impl Default for RejectDialog {
    fn default() -> Self {
        Self {
            visible: false,
            reason: FieldState::new(FieldKind::Free),
        }
    }
}

/// Help blocks that are currently expanded, keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HelpPanel {
    open: BTreeSet<String>,
    trigger: IndexMap<String, String>,
}

impl HelpPanel {
    /// Flip a static help block; returns whether it is now shown.
    pub fn toggle(&mut self, name: &str) -> bool {
        if self.open.remove(name) {
            false
        } else {
            self.open.insert(name.to_string());
            true
        }
    }

    pub fn is_open(&self, name: &str) -> bool {
        self.open.contains(name)
    }

    pub fn show_trigger(&mut self, name: &str, message: String) {
        self.trigger.insert(name.to_string(), message);
    }

    pub fn hide_trigger(&mut self, name: &str) -> bool {
        self.trigger.shift_remove(name).is_some()
    }

    pub fn trigger_text(&self, name: &str) -> Option<&str> {
        self.trigger.get(name).map(String::as_str)
    }
}

/// The whole page model. Validation, diffing and rendering read this, never
/// the rendered widgets.
#[derive(Debug, Clone)]
pub struct FormState {
    pub mode: PageMode,
    pub form_type: FormType,
    pub form_result: Option<FormResult>,
    pub project_name: FieldState,
    pub project_name_locked: bool,
    pub scm: String,
    pub script_type: Option<String>,
    pub pre_script: String,
    pub post_script: String,
    pub comments_enabled: bool,
    pub comments: String,
    pub reg_exp: String,
    pub poll_scm_trigger: TriggerField,
    pub build_periodically_trigger: TriggerField,
    pub build_on_commit_trigger: bool,
    pub email_enabled: bool,
    pub email: FieldState,
    pub config_email: FieldState,
    pub clean_workspace: bool,
    pub machines: MachineSelection,
    pub views: ProjectViewManager,
    pub users: UserAccessList,
    pub add_user: FieldState,
    pub rejection_reason: String,
    pub reject_dialog: RejectDialog,
    pub add_view_prompt: bool,
    pub form_message: Option<String>,
    pub reason_label: Option<String>,
    pub creator_label: Option<String>,
    pub creator: Option<String>,
    pub record_state: ConfigurationState,
    pub diff: DiffReport,
    pub chrome: PageChrome,
    pub help: HelpPanel,
    pub focus: Option<FieldRef>,
    pub is_admin: bool,
}

impl FormState {
    pub fn new(mode: PageMode) -> Self {
        let mut email = FieldState::new(FieldKind::Email);
        email.enabled = false;
        Self {
            mode,
            form_type: mode.initial_form_type(),
            form_result: None,
            project_name: FieldState::new(FieldKind::ProjectName),
            project_name_locked: mode != PageMode::Create,
            scm: String::new(),
            script_type: None,
            pre_script: String::new(),
            post_script: String::new(),
            comments_enabled: mode != PageMode::Create,
            comments: String::new(),
            reg_exp: String::new(),
            poll_scm_trigger: TriggerField::new(),
            build_periodically_trigger: TriggerField::new(),
            build_on_commit_trigger: true,
            email_enabled: false,
            email,
            config_email: FieldState::new(FieldKind::Email),
            clean_workspace: true,
            machines: MachineSelection::default(),
            views: ProjectViewManager::new(),
            users: UserAccessList::new(),
            add_user: FieldState::new(FieldKind::Free),
            rejection_reason: String::new(),
            reject_dialog: RejectDialog::default(),
            add_view_prompt: false,
            form_message: None,
            reason_label: None,
            creator_label: None,
            creator: None,
            record_state: ConfigurationState::default(),
            diff: DiffReport::default(),
            chrome: PageChrome::for_mode(mode),
            help: HelpPanel::default(),
            focus: None,
            is_admin: false,
        }
    }

    pub fn scm_kind(&self) -> ScmKind {
        ScmKind::from_label(&self.scm)
    }

    pub fn trigger(&self, field: &FieldRef) -> Option<&TriggerField> {
        match field {
            FieldRef::PollScmTrigger => Some(&self.poll_scm_trigger),
            FieldRef::BuildPeriodicallyTrigger => Some(&self.build_periodically_trigger),
            _ => None,
        }
    }

    pub fn trigger_mut(&mut self, field: &FieldRef) -> Option<&mut TriggerField> {
        match field {
            FieldRef::PollScmTrigger => Some(&mut self.poll_scm_trigger),
            FieldRef::BuildPeriodicallyTrigger => Some(&mut self.build_periodically_trigger),
            _ => None,
        }
    }

    pub fn field(&self, field: &FieldRef) -> Option<&FieldState> {
        match field {
            FieldRef::ProjectName => Some(&self.project_name),
            FieldRef::Email => Some(&self.email),
            FieldRef::ConfigEmail => Some(&self.config_email),
            FieldRef::PollScmTrigger => Some(&self.poll_scm_trigger.field),
            FieldRef::BuildPeriodicallyTrigger => Some(&self.build_periodically_trigger.field),
            FieldRef::RejectionReason => Some(&self.reject_dialog.reason),
            FieldRef::AddUser => Some(&self.add_user),
            FieldRef::View { view, field } => self.views.view(*view)?.field(*field),
            FieldRef::Builder { view, builder } => self
                .views
                .view(*view)?
                .builders()
                .iter()
                .find(|entry| entry.id() == *builder)
                .map(|entry| &entry.user_config),
        }
    }

    pub fn field_mut(&mut self, field: &FieldRef) -> Option<&mut FieldState> {
        match field {
            FieldRef::ProjectName => Some(&mut self.project_name),
            FieldRef::Email => Some(&mut self.email),
            FieldRef::ConfigEmail => Some(&mut self.config_email),
            FieldRef::PollScmTrigger => Some(&mut self.poll_scm_trigger.field),
            FieldRef::BuildPeriodicallyTrigger => {
                Some(&mut self.build_periodically_trigger.field)
            }
            FieldRef::RejectionReason => Some(&mut self.reject_dialog.reason),
            FieldRef::AddUser => Some(&mut self.add_user),
            FieldRef::View { view, field } => self.views.view_mut(*view)?.field_mut(*field),
            FieldRef::Builder { view, builder } => self
                .views
                .view_mut(*view)?
                .builder_mut(*builder)
                .map(|entry| &mut entry.user_config),
        }
    }

    /// Type into a field. With `validate` set, the field's rule runs as if it
    /// had lost focus; the returned flag is the verdict.
    pub fn edit(
        &mut self,
        field: &FieldRef,
        value: impl Into<String>,
        validate: bool,
    ) -> Result<bool, FormError> {
        let editable = match field {
            FieldRef::RejectionReason => self.mode == PageMode::ApproveReject,
            _ => self.mode.is_mutable(),
        };
        if !editable {
            return Err(FormError::ReadOnly);
        }
        if matches!(field, FieldRef::ProjectName) {
            if self.project_name_locked {
                return Err(FormError::ReadOnly);
            }
            self.form_message = None;
        }
        if let Some(trigger) = self.trigger_mut(field) {
            trigger.check = None;
        }
        let state = self
            .field_mut(field)
            .ok_or_else(|| FormError::validation(field.clone(), "no such field"))?;
        if !state.enabled {
            return Err(FormError::ReadOnly);
        }
        state.set_value(value);
        Ok(!validate || state.blur())
    }

    /// The e-mail checkbox. Unchecking disables the input, clears it and
    /// hides its error. Refused outside create and edit.
    pub fn set_email_enabled(&mut self, enabled: bool) -> bool {
        if !self.mode.is_mutable() {
            return false;
        }
        self.show_email(enabled);
        true
    }

    fn show_email(&mut self, enabled: bool) {
        self.email_enabled = enabled;
        self.email.enabled = enabled;
        if !enabled {
            self.email.clear();
            self.email.clear_error();
        }
    }

    pub fn set_comments_enabled(&mut self, enabled: bool) -> bool {
        if !self.mode.is_mutable() {
            return false;
        }
        self.comments_enabled = enabled;
        if !enabled {
            self.comments.clear();
        }
        true
    }

    pub fn toggle_machine(&mut self, node: &str, checked: bool) -> bool {
        if !self.mode.is_mutable() {
            return false;
        }
        self.machines.toggle(node, checked);
        true
    }

    /// Copy a stored configuration into the page. Views and user rows are
    /// loaded separately.
    pub fn apply_configuration(&mut self, config: &BuildConfiguration) {
        self.project_name.set_value(config.project_name.clone());
        self.scm = config.scm.clone().unwrap_or_default();
        self.script_type = config.script_type.clone();
        self.pre_script = config.pre_script.clone().unwrap_or_default();
        self.post_script = config.post_script.clone().unwrap_or_default();
        self.comments = config.comments.clone().unwrap_or_default();
        self.reg_exp = config.reg_exp.clone().unwrap_or_default();
        self.poll_scm_trigger
            .field
            .set_value(config.poll_scm_trigger.clone().unwrap_or_default());
        self.build_periodically_trigger
            .field
            .set_value(config.build_periodically_trigger.clone().unwrap_or_default());

        if !config.rejection_reason.is_empty() {
            self.reason_label = Some(format!("{REJECTION_LABEL}{}", config.rejection_reason));
        }

        self.machines.load(&config.build_machine_configuration);

        if let Some(email) = config.email.as_deref()
            && !email.is_empty()
        {
            self.show_email(true);
            self.email.set_value(email);
        }
        self.config_email
            .set_value(config.config_email.clone().unwrap_or_default());

        if config.clean_workspace == Some(false) {
            self.clean_workspace = false;
        }
        self.build_on_commit_trigger = config.build_on_commit_trigger.unwrap_or(true);

        self.creator = config.creator.clone();
        self.record_state = config.state;
        self.rejection_reason = config.rejection_reason.clone();
    }

    pub fn set_creator_name(&mut self, full_name: &str) {
        self.creator_label = Some(format!("{CREATOR_LABEL}{full_name}"));
    }

    /// Serialize the in-memory model back into a record.
    pub fn to_configuration(&self) -> BuildConfiguration {
        let optional = |value: &str| (!value.is_empty()).then(|| value.to_string());
        BuildConfiguration {
            project_name: self.project_name.value.clone(),
            scm: optional(&self.scm),
            script_type: self.script_type.clone(),
            pre_script: optional(&self.pre_script),
            post_script: optional(&self.post_script),
            comments: if self.comments_enabled {
                optional(&self.comments)
            } else {
                None
            },
            reg_exp: optional(&self.reg_exp),
            poll_scm_trigger: optional(&self.poll_scm_trigger.field.value),
            build_periodically_trigger: optional(&self.build_periodically_trigger.field.value),
            build_on_commit_trigger: Some(self.build_on_commit_trigger),
            email: Some(if self.email_enabled {
                self.email.value.clone()
            } else {
                String::new()
            }),
            config_email: optional(&self.config_email.value),
            clean_workspace: Some(self.clean_workspace),
            build_machine_configuration: self.machines.to_map(),
            users_list: self.users.names(),
            project_to_build: self.views.records(),
            state: self.record_state,
            rejection_reason: self.rejection_reason.clone(),
            creator: self.creator.clone(),
        }
    }

    pub fn focus_on(&mut self, field: FieldRef) {
        tracing::debug!(field = %field, "focus moved");
        self.focus = Some(field);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stored() -> BuildConfiguration {
        let mut machines = IndexMap::new();
        machines.insert("linux-01".to_string(), true);
        machines.insert("win-02".to_string(), false);
        BuildConfiguration {
            project_name: "core".into(),
            scm: Some("Git".into()),
            email: Some("dev@example.com".into()),
            rejection_reason: "missing tests".into(),
            clean_workspace: None,
            build_on_commit_trigger: Some(false),
            build_machine_configuration: machines,
            creator: Some("jdoe".into()),
            ..Default::default()
        }
    }

    #[test]
    fn applying_a_record_fills_the_page() {
        let mut form = FormState::new(PageMode::Edit);
        form.apply_configuration(&stored());
        assert_eq!(form.project_name.value, "core");
        assert_eq!(form.scm_kind(), ScmKind::Git);
        assert!(form.email_enabled);
        assert!(form.email.enabled);
        assert_eq!(
            form.reason_label.as_deref(),
            Some("Reason of rejection:  missing tests")
        );
        assert!(form.clean_workspace, "unset stays checked");
        assert!(!form.build_on_commit_trigger);
        assert_eq!(form.machines.hidden().as_str(), "linux-01;");
        assert_eq!(form.creator.as_deref(), Some("jdoe"));
    }

    #[test]
    fn build_on_commit_defaults_to_checked() {
        let mut form = FormState::new(PageMode::Edit);
        form.apply_configuration(&BuildConfiguration::default());
        assert!(form.build_on_commit_trigger);
        form.apply_configuration(&BuildConfiguration {
            build_on_commit_trigger: Some(true),
            ..Default::default()
        });
        assert!(form.build_on_commit_trigger);
    }

    #[test]
    fn unchecking_email_clears_and_disables() {
        let mut form = FormState::new(PageMode::Create);
        form.set_email_enabled(true);
        assert!(!form.edit(&FieldRef::Email, "nope", true).unwrap());
        assert!(form.email.is_wrong());
        form.set_email_enabled(false);
        assert!(form.email.value.is_empty());
        assert!(!form.email.is_wrong());
        assert!(matches!(
            form.edit(&FieldRef::Email, "dev@example.com", true),
            Err(FormError::ReadOnly)
        ));
    }

    #[test]
    fn locked_name_and_view_mode_refuse_edits() {
        let mut form = FormState::new(PageMode::Edit);
        assert!(matches!(
            form.edit(&FieldRef::ProjectName, "other", true),
            Err(FormError::ReadOnly)
        ));
        let mut view = FormState::new(PageMode::View);
        assert!(matches!(
            view.edit(&FieldRef::ConfigEmail, "dev@example.com", true),
            Err(FormError::ReadOnly)
        ));
        assert!(matches!(
            view.edit(&FieldRef::RejectionReason, "why", false),
            Err(FormError::ReadOnly)
        ));
        assert!(!view.set_email_enabled(true));
        assert!(!view.set_comments_enabled(false));
        let mut approve = FormState::new(PageMode::ApproveReject);
        approve.apply_configuration(&stored());
        assert!(approve.email_enabled, "stored address still shows");
        assert!(!approve.toggle_machine("win-02", true));
        assert_eq!(approve.machines.hidden().as_str(), "linux-01;");
        assert!(approve.edit(&FieldRef::RejectionReason, "why", false).unwrap());
    }

    #[test]
    fn chrome_follows_the_mode() {
        let approve = PageChrome::for_mode(PageMode::ApproveReject);
        assert_eq!(approve.title, "Approve/reject build configuration");
        assert_eq!(approve.save_label, "Approve");
        assert!(approve.reject_visible);
        let view = PageChrome::for_mode(PageMode::View);
        assert!(!view.save_visible);
        assert!(view.read_only_banner);
    }

    #[test]
    fn record_round_trips_through_the_page() {
        let mut form = FormState::new(PageMode::Edit);
        let record = stored();
        form.apply_configuration(&record);
        let back = form.to_configuration();
        assert_eq!(back.project_name, record.project_name);
        assert_eq!(back.email, record.email);
        assert_eq!(back.build_machine_configuration, record.build_machine_configuration);
        assert_eq!(back.build_on_commit_trigger, Some(false));
        assert_eq!(back.clean_workspace, Some(true));
    }

    #[test]
    fn help_blocks_toggle() {
        let mut help = HelpPanel::default();
        assert!(help.toggle("scm"));
        assert!(help.is_open("scm"));
        assert!(!help.toggle("scm"));
        help.show_trigger("pollSCMTrigger", "Schedule".into());
        assert_eq!(help.trigger_text("pollSCMTrigger"), Some("Schedule"));
        assert!(help.hide_trigger("pollSCMTrigger"));
        assert!(!help.hide_trigger("pollSCMTrigger"));
    }
}
