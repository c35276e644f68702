//! Draft versus last-approved comparison.
//!
//! Each compared field has an "old value" element that is revealed only when
//! the approved value differs from the draft. Machine nodes have no such
//! element; their label is recoloured instead.

use crate::domain::BuildConfiguration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiffField {
    Scm,
    Email,
    ConfigEmail,
    PreScript,
    PostScript,
    RegExp,
    CleanWorkspace,
    BuildOnCommitTrigger,
    PollScmTrigger,
    BuildPeriodicallyTrigger,
}

impl DiffField {
    /// Id of the element that shows the approved value.
    pub fn element_id(self) -> &'static str {
        match self {
            DiffField::Scm => "typeSCM_old",
            DiffField::Email => "isEmail_old",
            DiffField::ConfigEmail => "configEmail_old",
            DiffField::PreScript => "preScript_old",
            DiffField::PostScript => "postScript_old",
            DiffField::RegExp => "regExp_old",
            DiffField::CleanWorkspace => "cleanWorkspace_old",
            DiffField::BuildOnCommitTrigger => "buildOnCommitTrigger_old",
            DiffField::PollScmTrigger => "pollSCMTrigger_old",
            DiffField::BuildPeriodicallyTrigger => "buildPeriodicallyTrigger_old",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldChange {
    pub field: DiffField,
    pub old_text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffReport {
    changes: Vec<FieldChange>,
    changed_machines: Vec<String>,
    approved: bool,
}

impl DiffReport {
    /// Whether an approved configuration existed to compare against.
    pub fn has_approved(&self) -> bool {
        self.approved
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty() && self.changed_machines.is_empty()
    }

    pub fn changes(&self) -> &[FieldChange] {
        &self.changes
    }

    pub fn old_text(&self, field: DiffField) -> Option<&str> {
        self.changes
            .iter()
            .find(|change| change.field == field)
            .map(|change| change.old_text.as_str())
    }

    pub fn changed_machines(&self) -> &[String] {
        &self.changed_machines
    }

    pub fn machine_changed(&self, node: &str) -> bool {
        self.changed_machines.iter().any(|changed| changed == node)
    }

    fn flag(&mut self, field: DiffField, old_text: String) {
        self.changes.push(FieldChange { field, old_text });
    }
}

fn quoted(value: &str) -> String {
    format!("\"{value}\"")
}

fn checked(value: bool) -> String {
    if value { "checked" } else { "unchecked" }.to_string()
}

/// Compare `draft` with the last approved record. A missing approved record,
/// or one without a project name, yields an empty report.
pub fn diff(draft: &BuildConfiguration, approved: Option<&BuildConfiguration>) -> DiffReport {
    let mut report = DiffReport::default();
    let Some(approved) = approved.filter(|record| !record.project_name.is_empty()) else {
        return report;
    };
    report.approved = true;

    for (node, selected) in &approved.build_machine_configuration {
        if Some(selected) != draft.build_machine_configuration.get(node) {
            report.changed_machines.push(node.clone());
        }
    }

    let text_fields = [
        (DiffField::Scm, &approved.scm, &draft.scm, true),
        (DiffField::Email, &approved.email, &draft.email, true),
        (DiffField::ConfigEmail, &approved.config_email, &draft.config_email, true),
        (DiffField::PreScript, &approved.pre_script, &draft.pre_script, false),
        (DiffField::PostScript, &approved.post_script, &draft.post_script, false),
        (DiffField::RegExp, &approved.reg_exp, &draft.reg_exp, true),
    ];
    for (field, old, new, quote) in text_fields {
        if let Some(old) = old
            && Some(old) != new.as_ref()
        {
            report.flag(field, if quote { quoted(old) } else { old.clone() });
        }
    }

    // Only a truthy approved value is compared.
    if approved.clean_workspace == Some(true) && draft.clean_workspace != Some(true) {
        report.flag(DiffField::CleanWorkspace, checked(true));
    }
    if let Some(old) = approved.build_on_commit_trigger
        && Some(old) != draft.build_on_commit_trigger
    {
        report.flag(DiffField::BuildOnCommitTrigger, checked(old));
    }

    let triggers = [
        (
            DiffField::PollScmTrigger,
            &approved.poll_scm_trigger,
            &draft.poll_scm_trigger,
        ),
        (
            DiffField::BuildPeriodicallyTrigger,
            &approved.build_periodically_trigger,
            &draft.build_periodically_trigger,
        ),
    ];
    for (field, old, new) in triggers {
        if let Some(old) = old
            && Some(old) != new.as_ref()
        {
            report.flag(field, old.clone());
        }
    }

    tracing::debug!(
        fields = report.changes.len(),
        machines = report.changed_machines.len(),
        "diff against approved configuration"
    );
    report
}
