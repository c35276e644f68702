use crate::form::FormError;

#[derive(Debug, Clone)]
pub struct StatusLine {
    message: String,
    is_error: bool,
}

pub const READY_STATUS: &str = "Ready.";

impl Default for StatusLine {
    fn default() -> Self {
        Self {
            message: READY_STATUS.to_string(),
            is_error: false,
        }
    }
}

impl StatusLine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_raw(&mut self, msg: impl Into<String>) {
        self.message = msg.into();
        self.is_error = false;
    }

    pub fn ready(&mut self) {
        self.set_raw(READY_STATUS);
    }

    pub fn loaded(&mut self, name: &str) {
        self.set_raw(format!("Loaded configuration '{name}'"));
    }

    pub fn view_added(&mut self, count: usize) {
        self.set_raw(format!("{count} project(s) to build"));
    }

    pub fn submitted(&mut self, name: &str) {
        self.set_raw(format!("Configuration '{name}' submitted"));
    }

    pub fn cancelled(&mut self, target: &str) {
        self.set_raw(format!("Cancelled, returning to {target}"));
    }

    /// Single sink for every failure surfaced to the user.
    pub fn error(&mut self, err: &FormError) {
        self.message = err.to_string();
        self.is_error = true;
    }

    pub fn is_error(&self) -> bool {
        self.is_error
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}
