use std::fmt;

use serde::{Deserialize, Serialize};

/// Which of the four page flavours is active for this page load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageMode {
    Create,
    Edit,
    View,
    ApproveReject,
}

impl PageMode {
    /// Parse the `type` query parameter. Matching ignores ASCII case.
    pub fn from_query_type(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        [
            ("create", PageMode::Create),
            ("edit", PageMode::Edit),
            ("view", PageMode::View),
            ("approvereject", PageMode::ApproveReject),
        ]
        .into_iter()
        .find(|(label, _)| raw.eq_ignore_ascii_case(label))
        .map(|(_, mode)| mode)
    }

    /// Whether the configuration fields may be edited by the user.
    pub fn is_mutable(self) -> bool {
        matches!(self, PageMode::Create | PageMode::Edit)
    }

    pub fn initial_form_type(self) -> FormType {
        match self {
            PageMode::Create => FormType::Create,
            PageMode::Edit => FormType::Edit,
            PageMode::View => FormType::View,
            PageMode::ApproveReject => FormType::ApproveReject,
        }
    }
}

/// Value of the persisted `formType` field read by the submission layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FormType {
    Create,
    Edit,
    View,
    #[serde(rename = "APPROVEREJECT")]
    ApproveReject,
    Approved,
    Reject,
}

impl fmt::Display for FormType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FormType::Create => "CREATE",
            FormType::Edit => "EDIT",
            FormType::View => "VIEW",
            FormType::ApproveReject => "APPROVEREJECT",
            FormType::Approved => "APPROVED",
            FormType::Reject => "REJECT",
        };
        f.write_str(label)
    }
}

/// Value of `formResultHidden`; drives post-submit routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormResult {
    Create,
    Other,
}
