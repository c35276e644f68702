mod options;
mod page;
mod query;
mod status;
mod submission;
#[cfg(feature = "tui")]
mod terminal;

pub use options::{CANCEL_TARGET, DEFAULT_POLL_TRIGGER, PageOptions};
pub use page::PageController;
pub use query::PageRequest;
pub use status::{READY_STATUS, StatusLine};
pub use submission::FormSubmission;
#[cfg(feature = "tui")]
pub use terminal::{TerminalGuard, review};
