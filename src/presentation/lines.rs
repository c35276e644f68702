use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};
use textwrap::wrap;

use crate::{
    domain::ProjectViewRecord,
    form::{DiffField, FieldRef, FieldState, FormState, ProjectView},
};

const BROWN: Color = Color::Rgb(165, 42, 42);
const INDENT: &str = "    ";

fn label_style() -> Style {
    Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD)
}

fn error_style() -> Style {
    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
}

fn checkbox(checked: bool) -> &'static str {
    if checked { "[x]" } else { "[ ]" }
}

/// Render the whole page model as text lines, top to bottom.
pub fn form_lines(form: &FormState, width: u16) -> Vec<Line<'static>> {
    let width = width.max(20) as usize;
    let mut lines = Vec::new();

    lines.push(Line::from(Span::styled(
        form.chrome.title.clone(),
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD),
    )));
    if form.chrome.read_only_banner {
        lines.push(Line::from(Span::styled(
            "Read-only view",
            Style::default().fg(Color::Yellow),
        )));
    }
    for label in [&form.reason_label, &form.creator_label].into_iter().flatten() {
        lines.push(Line::from(Span::raw(label.clone())));
    }
    if let Some(message) = &form.form_message {
        lines.push(Line::from(Span::styled(message.clone(), error_style())));
    }
    lines.push(Line::default());

    push_field(&mut lines, "", "Project name", &form.project_name, None);
    push_plain(&mut lines, "SCM", &form.scm, form.diff.old_text(DiffField::Scm));
    if let Some(script_type) = &form.script_type {
        push_plain(&mut lines, "Script type", script_type, None);
    }
    push_wrapped(
        &mut lines,
        "Pre-build script",
        &form.pre_script,
        form.diff.old_text(DiffField::PreScript),
        width,
    );
    push_wrapped(
        &mut lines,
        "Post-build script",
        &form.post_script,
        form.diff.old_text(DiffField::PostScript),
        width,
    );
    if form.comments_enabled {
        push_wrapped(&mut lines, "Comments", &form.comments, None, width);
    }
    push_plain(
        &mut lines,
        "Version tag pattern",
        &form.reg_exp,
        form.diff.old_text(DiffField::RegExp),
    );

    for (label, trigger, field, target) in [
        (
            "Poll SCM",
            &form.poll_scm_trigger,
            DiffField::PollScmTrigger,
            FieldRef::PollScmTrigger,
        ),
        (
            "Build periodically",
            &form.build_periodically_trigger,
            DiffField::BuildPeriodicallyTrigger,
            FieldRef::BuildPeriodicallyTrigger,
        ),
    ] {
        push_plain(&mut lines, label, &trigger.field.value, form.diff.old_text(field));
        if let Some(check) = &trigger.check {
            let style = if check.valid {
                Style::default().fg(Color::Gray)
            } else {
                error_style()
            };
            lines.push(Line::from(Span::styled(
                format!("  {}", check.message),
                style,
            )));
        }
        if let Some(help) = form.help.trigger_text(&target.element_name()) {
            lines.push(Line::from(Span::styled(
                format!("  {help}"),
                Style::default().fg(Color::DarkGray),
            )));
        }
    }
    push_checkbox(
        &mut lines,
        "Build on commit",
        form.build_on_commit_trigger,
        form.diff.old_text(DiffField::BuildOnCommitTrigger),
    );
    push_checkbox(
        &mut lines,
        "Clean workspace",
        form.clean_workspace,
        form.diff.old_text(DiffField::CleanWorkspace),
    );

    lines.push(Line::from(vec![
        Span::styled("E-mail ", label_style()),
        Span::raw(checkbox(form.email_enabled)),
    ]));
    push_field(
        &mut lines,
        "",
        "Recipients",
        &form.email,
        form.diff.old_text(DiffField::Email),
    );
    push_field(
        &mut lines,
        "",
        "Configuration e-mail",
        &form.config_email,
        form.diff.old_text(DiffField::ConfigEmail),
    );

    lines.push(Line::from(Span::styled("Build machines", label_style())));
    for (node, checked) in form.machines.nodes() {
        let style = if form.diff.machine_changed(node) {
            Style::default().fg(BROWN)
        } else {
            Style::default()
        };
        lines.push(Line::from(Span::styled(
            format!("  {} {node}", checkbox(checked)),
            style,
        )));
    }

    lines.push(Line::default());
    if form.add_view_prompt {
        lines.push(Line::from(Span::styled(
            "Add at least one project to build",
            error_style(),
        )));
    }
    for view in form.views.views() {
        push_view(&mut lines, view);
    }
    for record in form.views.deleted() {
        push_deleted(&mut lines, record);
    }

    if !form.users.is_empty() {
        lines.push(Line::from(Span::styled("User access", label_style())));
        for row in form.users.rows() {
            lines.push(Line::from(format!("  {}", row.user_name)));
        }
    }

    if form.reject_dialog.visible {
        lines.push(Line::default());
        push_field(
            &mut lines,
            "",
            "Reason of rejection",
            &form.reject_dialog.reason,
            None,
        );
    }
    lines
}

fn was(old: Option<&str>) -> Option<Span<'static>> {
    old.map(|old| Span::styled(format!("  was: {old}"), Style::default().fg(Color::Yellow)))
}

fn push_plain(lines: &mut Vec<Line<'static>>, label: &str, value: &str, old: Option<&str>) {
    let mut spans = vec![
        Span::styled(format!("{label}: "), label_style()),
        Span::raw(value.to_string()),
    ];
    spans.extend(was(old));
    lines.push(Line::from(spans));
}

fn push_checkbox(lines: &mut Vec<Line<'static>>, label: &str, checked: bool, old: Option<&str>) {
    let mut spans = vec![
        Span::styled(format!("{label} "), label_style()),
        Span::raw(checkbox(checked)),
    ];
    spans.extend(was(old));
    lines.push(Line::from(spans));
}

fn push_wrapped(
    lines: &mut Vec<Line<'static>>,
    label: &str,
    value: &str,
    old: Option<&str>,
    width: usize,
) {
    let mut head = vec![Span::styled(format!("{label}:"), label_style())];
    head.extend(was(old));
    lines.push(Line::from(head));
    for segment in wrap(value, width.saturating_sub(2)) {
        lines.push(Line::from(format!("  {segment}")));
    }
}

fn push_field(
    lines: &mut Vec<Line<'static>>,
    indent: &str,
    label: &str,
    field: &FieldState,
    old: Option<&str>,
) {
    if !field.visible {
        return;
    }
    let value_style = if field.enabled {
        Style::default()
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let mut spans = vec![
        Span::raw(indent.to_string()),
        Span::styled(format!("{label}: "), label_style()),
        Span::styled(field.value.clone(), value_style),
    ];
    spans.extend(was(old));
    lines.push(Line::from(spans));
    if let Some(error) = &field.error {
        lines.push(Line::from(Span::styled(
            format!("{indent} {}", error.trim_start()),
            error_style(),
        )));
    }
}

fn push_view(lines: &mut Vec<Line<'static>>, view: &ProjectView) {
    lines.push(Line::from(Span::styled(
        format!("Project to build ({})", view.id().dom_id()),
        Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::BOLD),
    )));
    push_field(lines, "  ", "Local directory", &view.local_directory_path, None);
    push_field(lines, "  ", "Repository URL", &view.project_url, None);
    push_field(lines, "  ", "Branch", &view.branch_name, None);
    push_field(lines, "  ", "File to build", &view.file_to_build, None);
    push_field(lines, "  ", "Artifact path", &view.path_to_artifacts, None);
    for selection in [&view.artifacts, &view.version_files] {
        if !selection.visible {
            continue;
        }
        lines.push(Line::from(format!(
            "  {}: {}",
            selection.kind().hidden_name(),
            selection.options().join(", ")
        )));
        if let Some(error) = &selection.error {
            lines.push(Line::from(Span::styled(
                format!("   {}", error.trim_start()),
                error_style(),
            )));
        }
    }
    if view.version_files_enabled {
        push_field(lines, "  ", "Version file path", &view.version_files_path, None);
    }
    if let Some(credentials) = view.credentials.value() {
        lines.push(Line::from(format!("  Credentials: {credentials}")));
    }
    for builder in view.builders() {
        lines.push(Line::from(format!(
            "{INDENT}Builder {} other config {}",
            builder.id().dom_id(),
            checkbox(builder.other_config)
        )));
        push_field(lines, "      ", "Configuration", &builder.user_config, None);
    }
}

fn push_deleted(lines: &mut Vec<Line<'static>>, record: &ProjectViewRecord) {
    let dimmed = Style::default()
        .fg(Color::DarkGray)
        .add_modifier(Modifier::CROSSED_OUT);
    lines.push(Line::from(Span::styled(
        format!(
            "Removed project: {} ({})",
            record.project_url, record.local_directory_path
        ),
        dimmed,
    )));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{BuildConfiguration, PageMode, ScmKind},
        form::diff,
        service::ViewFragment,
    };

    fn text(lines: &[Line<'_>]) -> Vec<String> {
        lines
            .iter()
            .map(|line| line.spans.iter().map(|span| span.content.as_ref()).collect())
            .collect()
    }

    #[test]
    fn changed_fields_show_their_approved_value() {
        let mut form = FormState::new(PageMode::ApproveReject);
        form.scm = "Subversion".into();
        let approved = BuildConfiguration {
            project_name: "core".into(),
            scm: Some("Git".into()),
            ..Default::default()
        };
        let draft = BuildConfiguration {
            project_name: "core".into(),
            scm: Some("Subversion".into()),
            ..Default::default()
        };
        form.diff = diff(&draft, Some(&approved));
        let rendered = text(&form_lines(&form, 80));
        assert!(rendered.iter().any(|line| line == "SCM: Subversion  was: \"Git\""));
        assert_eq!(rendered[0], "Approve/reject build configuration");
    }

    #[test]
    fn views_and_errors_are_listed() {
        let mut form = FormState::new(PageMode::Create);
        let view = form.views.insert_view(ViewFragment::default(), &ScmKind::Git);
        let entry = form.views.view_mut(view).unwrap();
        entry.project_url.set_value("nope");
        entry.project_url.blur();
        let rendered = text(&form_lines(&form, 80));
        assert!(rendered.iter().any(|line| line == "Project to build (projectToBuild_0)"));
        assert!(rendered.iter().any(|line| line == "  Local directory: ."));
        assert!(rendered.iter().any(|line| line.contains("Invalid repository URL")));
    }
}
