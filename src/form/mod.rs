mod diff;
mod error;
mod field;
pub mod hidden_list;
mod selection;
mod state;
mod users;
mod validation;
mod views;

pub use diff::{DiffField, DiffReport, FieldChange, diff};
pub use error::FormError;
pub use field::{FieldRef, FieldState, UnknownField, ViewField};
pub use hidden_list::HiddenList;
pub use selection::{DUPLICATE_PATH, MachineSelection, SelectionBox, SelectionKind};
pub use state::{
    CREATOR_LABEL, FormState, HelpPanel, PageChrome, REJECTION_LABEL, RejectDialog, TriggerField,
};
pub use users::{UserAccessList, UserAccessRow};
pub use validation::{FormCheck, check_form, is_valid_form};
pub use views::{
    Builder, BuilderId, CredentialsSelect, ProjectView, ProjectViewManager, ViewId,
};
