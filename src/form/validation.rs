use crate::{
    domain::{FormType, PageMode},
    matcher,
};

use super::{
    error::FormError,
    field::{FieldRef, ViewField},
    state::FormState,
};

/// Outcome of the pre-submit gate.
#[derive(Debug)]
pub enum FormCheck {
    /// Every local check passed; the form may be submitted.
    Ready,
    /// Local checks passed in create mode; the project name must still be
    /// confirmed free by the configuration service.
    NameCheckRequired,
    Blocked(FormError),
}

impl FormCheck {
    pub fn is_ready(&self) -> bool {
        matches!(self, FormCheck::Ready)
    }
}

/// Order in which path groups are re-checked; inside a group views are
/// visited in page order.
const PATH_GROUPS: [ViewField; 5] = [
    ViewField::ProjectUrl,
    ViewField::LocalDirectoryPath,
    ViewField::PathToArtifacts,
    ViewField::VersionFilesPath,
    ViewField::FileToBuild,
];

/// Run the full pre-submit validation. Errors are recorded on the fields and
/// focus moves to the first offender.
pub fn check_form(form: &mut FormState) -> FormCheck {
    if form.mode == PageMode::View {
        return FormCheck::Blocked(FormError::ReadOnly);
    }

    form.form_message = None;
    if let Err(message) = matcher::project_name(&form.project_name.value) {
        form.project_name.set_error(message);
        return block(form, FieldRef::ProjectName, message.to_string());
    }
    form.project_name.clear_error();

    if form.views.is_empty() {
        form.add_view_prompt = true;
        tracing::debug!("validation stopped: no project view");
        return FormCheck::Blocked(FormError::MissingView);
    }
    form.add_view_prompt = false;

    for field in [FieldRef::Email, FieldRef::ConfigEmail] {
        if let Some(message) = form.field(&field).and_then(|state| state.error.clone()) {
            return block(form, field, message);
        }
    }
    for field in [FieldRef::PollScmTrigger, FieldRef::BuildPeriodicallyTrigger] {
        let failed = form
            .trigger(&field)
            .filter(|trigger| trigger.is_error())
            .and_then(|trigger| trigger.check.as_ref())
            .map(|check| check.message.clone());
        if let Some(message) = failed {
            return block(form, field, message);
        }
    }

    revalidate_views(form);

    for group in PATH_GROUPS {
        let wrong = form.views.views().iter().find_map(|view| {
            view.field(group)
                .and_then(|state| state.error.clone())
                .map(|message| (view.id(), message))
        });
        if let Some((view, message)) = wrong {
            return block(form, FieldRef::View { view, field: group }, message);
        }
    }
    let wrong_builder = form.views.views().iter().find_map(|view| {
        view.builders().iter().find_map(|builder| {
            builder.user_config.error.clone().map(|message| {
                (
                    FieldRef::Builder {
                        view: view.id(),
                        builder: builder.id(),
                    },
                    message,
                )
            })
        })
    });
    if let Some((field, message)) = wrong_builder {
        return block(form, field, message);
    }

    match form.mode {
        PageMode::Edit => FormCheck::Ready,
        PageMode::ApproveReject => {
            form.form_type = FormType::Approved;
            FormCheck::Ready
        }
        PageMode::Create => FormCheck::NameCheckRequired,
        PageMode::View => FormCheck::Blocked(FormError::ReadOnly),
    }
}

/// Boolean form of [`check_form`]. Always false in create mode, where the
/// outcome depends on the asynchronous name check.
pub fn is_valid_form(form: &mut FormState) -> bool {
    check_form(form).is_ready()
}

/// Re-run every path rule and builder override rule, including fields the
/// user never touched.
fn revalidate_views(form: &mut FormState) {
    for view in form.views.views_mut() {
        for (_, state) in view.path_fields_mut() {
            state.blur();
        }
        for builder in view.builders_mut() {
            builder.user_config.blur();
        }
    }
}

fn block(form: &mut FormState, field: FieldRef, message: String) -> FormCheck {
    tracing::debug!(field = %field, message = %message, "validation stopped");
    form.focus_on(field.clone());
    FormCheck::Blocked(FormError::validation(field, message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::ScmKind,
        form::views::ViewId,
        service::{Fragment, TriggerCheck, ViewFragment},
    };

    fn form_with_view(mode: PageMode) -> (FormState, ViewId) {
        let mut form = FormState::new(mode);
        form.project_name.set_value("core");
        form.scm = "Git".into();
        let view = form.views.insert_view(ViewFragment::default(), &ScmKind::Git);
        form.views
            .view_mut(view)
            .unwrap()
            .project_url
            .set_value("https://git.example.com/core.git");
        (form, view)
    }

    #[test]
    fn bad_project_name_focuses_the_name() {
        let (mut form, _) = form_with_view(PageMode::Create);
        form.project_name.set_value("");
        let FormCheck::Blocked(FormError::Validation { field, message }) = check_form(&mut form)
        else {
            panic!("expected a validation error");
        };
        assert_eq!(field, FieldRef::ProjectName);
        assert_eq!(message, matcher::EMPTY_PROJECT_NAME);
        assert_eq!(form.focus, Some(FieldRef::ProjectName));
    }

    #[test]
    fn missing_view_reveals_the_prompt() {
        let mut form = FormState::new(PageMode::Edit);
        form.project_name.set_value("core");
        assert!(matches!(
            check_form(&mut form),
            FormCheck::Blocked(FormError::MissingView)
        ));
        assert!(form.add_view_prompt);
    }

    #[test]
    fn trigger_error_blocks_submission() {
        let (mut form, _) = form_with_view(PageMode::Edit);
        form.poll_scm_trigger.check = Some(TriggerCheck::from_response(
            "ERROR: Invalid input: \"not-a-cron\"".into(),
        ));
        assert!(!is_valid_form(&mut form));
        assert_eq!(form.focus, Some(FieldRef::PollScmTrigger));

        form.poll_scm_trigger.check =
            Some(TriggerCheck::from_response("Would last have run at ...".into()));
        assert!(is_valid_form(&mut form));
    }

    #[test]
    fn untouched_fields_are_revalidated() {
        let (mut form, view) = form_with_view(PageMode::Edit);
        form.views
            .view_mut(view)
            .unwrap()
            .project_url
            .set_value("not a url");
        let FormCheck::Blocked(FormError::Validation { field, .. }) = check_form(&mut form) else {
            panic!("expected a validation error");
        };
        assert_eq!(
            field,
            FieldRef::View {
                view,
                field: ViewField::ProjectUrl
            }
        );
        assert!(form.views.view(view).unwrap().project_url.is_wrong());
    }

    #[test]
    fn url_group_is_checked_before_later_groups() {
        let (mut form, first) = form_with_view(PageMode::Edit);
        let second = form.views.insert_view(ViewFragment::default(), &ScmKind::Git);
        form.views
            .view_mut(first)
            .unwrap()
            .file_to_build
            .set_value("Makefile");
        // second view has no URL at all
        let FormCheck::Blocked(FormError::Validation { field, .. }) = check_form(&mut form) else {
            panic!("expected a validation error");
        };
        assert_eq!(
            field,
            FieldRef::View {
                view: second,
                field: ViewField::ProjectUrl
            }
        );
    }

    #[test]
    fn builder_override_is_checked_last() {
        let (mut form, view) = form_with_view(PageMode::Edit);
        let builder = form
            .views
            .add_builder(view, Fragment::default())
            .unwrap();
        let entry = form.views.view_mut(view).unwrap().builder_mut(builder).unwrap();
        entry.set_other_config(true);
        entry.user_config.set_value("Release x64");
        let FormCheck::Blocked(FormError::Validation { field, .. }) = check_form(&mut form) else {
            panic!("expected a validation error");
        };
        assert_eq!(field, FieldRef::Builder { view, builder });
    }

    #[test]
    fn mode_decides_the_final_step() {
        let (mut edit, _) = form_with_view(PageMode::Edit);
        assert!(matches!(check_form(&mut edit), FormCheck::Ready));

        let (mut approve, _) = form_with_view(PageMode::ApproveReject);
        assert!(is_valid_form(&mut approve));
        assert_eq!(approve.form_type, FormType::Approved);

        let (mut create, _) = form_with_view(PageMode::Create);
        assert!(matches!(
            check_form(&mut create),
            FormCheck::NameCheckRequired
        ));
        assert!(!is_valid_form(&mut create));

        let mut view = FormState::new(PageMode::View);
        assert!(matches!(
            check_form(&mut view),
            FormCheck::Blocked(FormError::ReadOnly)
        ));
    }
}
