use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{
    domain::{BuildConfiguration, FormResult, FormType},
    form::{FormState, SelectionKind},
};

/// Everything the page hands to the service on submit, reject or approve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormSubmission {
    pub form_type: FormType,
    pub rejection_reason: String,
    pub form_result_hidden: Option<FormResult>,
    pub configuration: BuildConfiguration,
    /// Raw `;`-joined hidden inputs, keyed by element name.
    pub hidden_fields: IndexMap<String, String>,
}

impl FormSubmission {
    pub fn from_form(form: &FormState) -> Self {
        let mut hidden_fields = IndexMap::new();
        hidden_fields.insert(
            "build_machine_configuration".to_string(),
            form.machines.hidden().as_str().to_string(),
        );
        for view in form.views.views() {
            for (kind, selection) in [
                (SelectionKind::Artifacts, &view.artifacts),
                (SelectionKind::VersionFiles, &view.version_files),
            ] {
                hidden_fields.insert(
                    format!("{}/{}", view.id().dom_id(), kind.hidden_name()),
                    selection.hidden().as_str().to_string(),
                );
            }
        }
        Self {
            form_type: form.form_type,
            rejection_reason: form.rejection_reason.clone(),
            form_result_hidden: form.form_result,
            configuration: form.to_configuration(),
            hidden_fields,
        }
    }
}
