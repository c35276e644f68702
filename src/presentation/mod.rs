//! Read-only terminal rendering of the page model.

mod footer;
mod lines;
mod view;

pub use lines::form_lines;
pub use view::{ReviewContext, draw};
