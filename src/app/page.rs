use crossterm::event::KeyEvent;

use crate::{
    domain::{BuildConfiguration, FormResult, FormType, PageMode},
    form::{
        BuilderId, FieldRef, FormCheck, FormError, FormState, MachineSelection, SelectionKind,
        ViewId, check_form, diff,
    },
    service::{ConfigurationService, TriggerCheck},
};

use super::{
    options::PageOptions, query::PageRequest, status::StatusLine, submission::FormSubmission,
};

/// Drives one page session: bootstraps the form from the request, runs user
/// actions against the model and talks to the configuration service.
///
/// Every failure is reported once to the [`StatusLine`] and returned to the
/// caller; the page stays usable afterwards.
pub struct PageController<S> {
    service: S,
    options: PageOptions,
    request: PageRequest,
    form: FormState,
    status: StatusLine,
    submitted: bool,
    redirect: Option<String>,
}

impl<S: ConfigurationService> PageController<S> {
    pub fn new(service: S, request: PageRequest, options: PageOptions) -> Self {
        let form = FormState::new(request.mode);
        Self {
            service,
            options,
            request,
            form,
            status: StatusLine::new(),
            submitted: false,
            redirect: None,
        }
    }

    pub fn form(&self) -> &FormState {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut FormState {
        &mut self.form
    }

    pub fn status(&self) -> &StatusLine {
        &self.status
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub fn options(&self) -> &PageOptions {
        &self.options
    }

    pub fn mode(&self) -> PageMode {
        self.request.mode
    }

    pub fn is_submitted(&self) -> bool {
        self.submitted
    }

    pub fn redirect(&self) -> Option<&str> {
        self.redirect.as_deref()
    }

    fn sink<T>(&mut self, result: Result<T, FormError>) -> Result<T, FormError> {
        if let Err(err) = &result {
            tracing::warn!(error = %err, "page action failed");
            self.status.error(err);
        }
        result
    }

    fn require_mutable(&self) -> Result<(), FormError> {
        if self.request.mode.is_mutable() {
            Ok(())
        } else {
            Err(FormError::ReadOnly)
        }
    }

    pub async fn init_page(&mut self) -> Result<(), FormError> {
        let result: Result<(), FormError> = async {
            match self.request.name.clone() {
                Some(name) => {
                    tracing::info!(
                        project = %name,
                        mode = ?self.request.mode,
                        user = ?self.options.user,
                        "opening configuration"
                    );
                    self.load_views(&name).await?;
                    self.load_users(&name).await?;
                    self.set_content(&name).await?;
                    self.form.project_name_locked = true;
                    self.form.comments_enabled = true;
                    self.status.loaded(&name);
                }
                None => {
                    tracing::info!(user = ?self.options.user, "starting a new configuration");
                    self.form.form_type = FormType::Create;
                    self.form.views.reset();
                    self.form.set_comments_enabled(false);
                    self.form
                        .poll_scm_trigger
                        .field
                        .set_value(self.options.default_poll_trigger.clone());
                    let defaults = self.service.load_create_new_build_configuration().await?;
                    if let Some(scm) = defaults.scm {
                        self.form.scm = scm;
                    }
                    self.form.machines = MachineSelection::new(defaults.nodes);
                    self.form
                        .views
                        .set_session_default_credentials(defaults.default_credentials);
                    self.add_view_inner().await?;
                    self.status.ready();
                }
            }
            self.form.is_admin = self.service.is_current_user_administrator().await?;
            Ok(())
        }
        .await;
        self.sink(result)
    }

    async fn load_views(&mut self, name: &str) -> Result<(), FormError> {
        let loaded = self.service.load_views(name).await?;
        self.form.views.load_existing(loaded);
        Ok(())
    }

    async fn load_users(&mut self, name: &str) -> Result<(), FormError> {
        let loaded = self.service.load_user_access_view(name).await?;
        self.form.users.load(loaded.html, loaded.users);
        Ok(())
    }

    async fn set_content(&mut self, name: &str) -> Result<(), FormError> {
        let config = self.service.get_configuration(name).await?;
        self.form.apply_configuration(&config);
        if let Some(creator) = config.creator.as_deref() {
            let full_name = self.service.get_full_name_creator(creator).await?;
            self.form.set_creator_name(&full_name);
        }
        if !config.is_approved() {
            self.set_diff_content(name, &config).await?;
        }
        Ok(())
    }

    async fn set_diff_content(
        &mut self,
        name: &str,
        current: &BuildConfiguration,
    ) -> Result<(), FormError> {
        let approved = self.service.get_diff_configuration(name).await?;
        let report = diff(current, approved.as_ref());
        if report.has_approved() {
            let deleted = self.service.load_deleted_views(name).await?;
            self.form.views.load_deleted(deleted.html, deleted.views);
        }
        tracing::info!(
            project = %name,
            changed_fields = report.changes().len(),
            changed_machines = report.changed_machines().len(),
            "pending changes compared"
        );
        self.form.diff = report;
        Ok(())
    }

    /// Request a fresh project view with one builder.
    pub async fn add_view(&mut self) -> Result<ViewId, FormError> {
        let result = self.add_view_inner().await;
        self.sink(result)
    }

    async fn add_view_inner(&mut self) -> Result<ViewId, FormError> {
        self.require_mutable()?;
        self.form.add_view_prompt = false;
        let fragment = self.service.get_view().await?;
        let scm = self.form.scm_kind();
        let view = self.form.views.insert_view(fragment, &scm);
        self.add_builder_inner(view).await?;
        self.status.view_added(self.form.views.len());
        Ok(view)
    }

    pub async fn add_builder(&mut self, view: ViewId) -> Result<BuilderId, FormError> {
        let result = self.add_builder_inner(view).await;
        self.sink(result)
    }

    async fn add_builder_inner(&mut self, view: ViewId) -> Result<BuilderId, FormError> {
        self.require_mutable()?;
        let fragment = self.service.get_builder_view().await?;
        self.form
            .views
            .add_builder(view, fragment)
            .ok_or(FormError::UnknownView(view))
    }

    pub fn remove_view(&mut self, view: ViewId) -> bool {
        self.request.mode.is_mutable() && self.form.views.remove_view(view)
    }

    pub fn remove_builder(&mut self, view: ViewId, builder: BuilderId) -> bool {
        self.request.mode.is_mutable() && self.form.views.remove_builder(view, builder)
    }

    pub fn select_credentials(&mut self, view: ViewId, value: &str) -> bool {
        self.request.mode.is_mutable()
            && self
                .form
                .views
                .view_mut(view)
                .is_some_and(|entry| entry.credentials.select(value))
    }

    pub fn set_current_credentials_as_default(&mut self, view: ViewId) -> Option<String> {
        if !self.request.mode.is_mutable() {
            return None;
        }
        self.form
            .views
            .set_current_credentials_as_default(view)
            .map(str::to_string)
    }

    /// Type into any page field; runs the field rule when auto validation is
    /// on.
    pub fn edit(&mut self, field: &FieldRef, value: impl Into<String>) -> Result<bool, FormError> {
        let result = self.form.edit(field, value, self.options.auto_validate);
        self.sink(result)
    }

    /// The "add" button next to an artifact or version-file input.
    pub fn add_path(&mut self, view: ViewId, kind: SelectionKind) -> Result<(), FormError> {
        let result = self.require_mutable().and_then(|()| {
            self.form
                .views
                .view_mut(view)
                .ok_or(FormError::UnknownView(view))?
                .add_path(kind)
        });
        self.sink(result)
    }

    /// Key press while a selection box has focus.
    pub fn selection_key(&mut self, view: ViewId, kind: SelectionKind, key: &KeyEvent) -> bool {
        if !self.request.mode.is_mutable() {
            return false;
        }
        let delete_key = self.options.delete_key;
        self.form
            .views
            .view_mut(view)
            .is_some_and(|entry| entry.selection_mut(kind).handle_key(key, delete_key))
    }

    pub fn set_version_files_enabled(&mut self, view: ViewId, enabled: bool) -> bool {
        if !self.request.mode.is_mutable() {
            return false;
        }
        match self.form.views.view_mut(view) {
            Some(entry) => {
                entry.set_version_files_enabled(enabled);
                true
            }
            None => false,
        }
    }

    pub fn set_other_config(&mut self, view: ViewId, builder: BuilderId, checked: bool) -> bool {
        if !self.request.mode.is_mutable() {
            return false;
        }
        match self
            .form
            .views
            .view_mut(view)
            .and_then(|entry| entry.builder_mut(builder))
        {
            Some(entry) => {
                entry.set_other_config(checked);
                true
            }
            None => false,
        }
    }

    /// Ask the service to judge the cron text of a trigger field and keep
    /// the typed verdict on the field.
    pub async fn check_trigger(&mut self, field: FieldRef) -> Result<TriggerCheck, FormError> {
        let result = self.check_trigger_inner(field).await;
        self.sink(result)
    }

    async fn check_trigger_inner(&mut self, field: FieldRef) -> Result<TriggerCheck, FormError> {
        let expression = self
            .form
            .trigger(&field)
            .map(|trigger| trigger.field.value.clone())
            .ok_or_else(|| FormError::validation(field.clone(), "not a trigger field"))?;
        let raw = self.service.check_trigger(&expression).await?;
        let check = TriggerCheck::from_response(raw);
        tracing::debug!(field = %field, valid = check.valid, "trigger checked");
        if let Some(trigger) = self.form.trigger_mut(&field) {
            trigger.check = Some(check.clone());
        }
        Ok(check)
    }

    /// Triggers typed into since their last verdict are sent to the service
    /// again before the form check reads the verdicts.
    async fn recheck_triggers(&mut self) -> Result<(), FormError> {
        for field in [FieldRef::PollScmTrigger, FieldRef::BuildPeriodicallyTrigger] {
            let stale = self.form.trigger(&field).is_some_and(|trigger| {
                trigger.check.is_none() && !trigger.field.value.is_empty()
            });
            if stale {
                self.check_trigger_inner(field).await?;
            }
        }
        Ok(())
    }

    /// Static help block next to a field.
    pub fn toggle_help(&mut self, name: &str) -> bool {
        self.form.help.toggle(name)
    }

    /// Trigger help is fetched on every reveal and hidden on the next toggle.
    pub async fn toggle_trigger_help(&mut self, name: &str) -> Result<bool, FormError> {
        if self.form.help.hide_trigger(name) {
            return Ok(false);
        }
        let result = self.service.get_help_message(name).await.map_err(FormError::from);
        let message = self.sink(result)?;
        self.form.help.show_trigger(name, message);
        Ok(true)
    }

    /// Append a user access row from the "add user" input. An empty input
    /// does nothing.
    pub async fn add_user(&mut self) -> Result<Option<u32>, FormError> {
        if let Err(err) = self.require_mutable() {
            return self.sink(Err(err));
        }
        let user = std::mem::take(&mut self.form.add_user.value);
        if user.is_empty() {
            return Ok(None);
        }
        let result = self.service.get_user_access_view().await.map_err(FormError::from);
        let fragment = self.sink(result)?;
        Ok(Some(self.form.users.push(user, fragment)))
    }

    pub fn delete_user(&mut self, row: u32) -> bool {
        self.request.mode.is_mutable() && self.form.users.remove(row).is_some()
    }

    /// Save, or approve in approve-reject mode. In create mode the project
    /// name is first confirmed free; a taken name blocks the submit.
    pub async fn submit(&mut self) -> Result<FormSubmission, FormError> {
        let result: Result<FormSubmission, FormError> = async {
            if self.submitted {
                return Err(FormError::AlreadySubmitted);
            }
            if self.request.mode.is_mutable() {
                self.recheck_triggers().await?;
            }
            match check_form(&mut self.form) {
                FormCheck::Blocked(err) => Err(err),
                FormCheck::Ready => {
                    self.form.form_result = Some(FormResult::Other);
                    self.send().await
                }
                FormCheck::NameCheckRequired => {
                    let name = self.form.project_name.value.clone();
                    if self.service.is_name_free(&name).await? {
                        self.form.form_message = None;
                        self.form.form_result = Some(FormResult::Create);
                        self.send().await
                    } else {
                        let err = FormError::NameConflict { name };
                        self.form.form_message = Some(err.to_string());
                        Err(err)
                    }
                }
            }
        }
        .await;
        self.sink(result)
    }

    async fn send(&mut self) -> Result<FormSubmission, FormError> {
        self.submitted = true;
        let submission = FormSubmission::from_form(&self.form);
        if let Err(err) = self.service.submit(&submission).await {
            self.submitted = false;
            return Err(err.into());
        }
        let name = submission.configuration.project_name.clone();
        tracing::info!(
            project = %name,
            form_type = %submission.form_type,
            "configuration submitted"
        );
        self.status.submitted(&name);
        Ok(submission)
    }

    pub fn open_reject(&mut self) -> Result<(), FormError> {
        if self.request.mode != PageMode::ApproveReject {
            return self.sink(Err(FormError::ReadOnly));
        }
        self.form.reject_dialog.visible = true;
        self.form.focus_on(FieldRef::RejectionReason);
        Ok(())
    }

    /// Confirm the rejection. An empty reason only moves focus back to the
    /// reason box; otherwise the form is submitted without validation.
    pub async fn ok_reject(&mut self) -> Result<Option<FormSubmission>, FormError> {
        if self.request.mode != PageMode::ApproveReject {
            return self.sink(Err(FormError::ReadOnly));
        }
        let reason = self.form.reject_dialog.reason.value.clone();
        if reason.is_empty() {
            self.form.focus_on(FieldRef::RejectionReason);
            return Ok(None);
        }
        let result: Result<FormSubmission, FormError> = async {
            if self.submitted {
                return Err(FormError::AlreadySubmitted);
            }
            self.form.rejection_reason = reason;
            self.form.form_type = FormType::Reject;
            self.send().await
        }
        .await;
        self.sink(result).map(Some)
    }

    pub fn cancel_reject(&mut self) {
        self.form.reject_dialog.visible = false;
        self.form.reject_dialog.reason.clear();
    }

    pub fn cancel(&mut self) -> &str {
        let target = self.options.cancel_target.clone();
        self.status.cancelled(&target);
        self.redirect.insert(target).as_str()
    }
}
