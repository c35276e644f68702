use crossterm::event::KeyCode;

pub const DEFAULT_POLL_TRIGGER: &str = "H * * * *";
pub const CANCEL_TARGET: &str = "./";

#[derive(Debug, Clone)]
pub struct PageOptions {
    /// Seeded into the SCM poll trigger of a new configuration.
    pub default_poll_trigger: String,
    /// Where "cancel" sends the user.
    pub cancel_target: String,
    /// The only key that removes a highlighted selection box entry.
    pub delete_key: KeyCode,
    pub auto_validate: bool,
    pub user: Option<String>,
}

impl Default for PageOptions {
    fn default() -> Self {
        Self {
            default_poll_trigger: DEFAULT_POLL_TRIGGER.to_string(),
            cancel_target: CANCEL_TARGET.to_string(),
            delete_key: KeyCode::Delete,
            auto_validate: true,
            user: None,
        }
    }
}

impl PageOptions {
    pub fn with_default_poll_trigger(mut self, trigger: impl Into<String>) -> Self {
        self.default_poll_trigger = trigger.into();
        self
    }

    pub fn with_cancel_target(mut self, target: impl Into<String>) -> Self {
        self.cancel_target = target.into();
        self
    }

    pub fn with_delete_key(mut self, key: KeyCode) -> Self {
        self.delete_key = key;
        self
    }

    pub fn with_auto_validate(mut self, enabled: bool) -> Self {
        self.auto_validate = enabled;
        self
    }

    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builders_override_defaults() {
        let options = PageOptions::default()
            .with_default_poll_trigger("H/5 * * * *")
            .with_cancel_target("../list")
            .with_delete_key(KeyCode::Backspace)
            .with_auto_validate(false)
            .with_user("jdoe");
        assert_eq!(options.default_poll_trigger, "H/5 * * * *");
        assert_eq!(options.cancel_target, "../list");
        assert_eq!(options.delete_key, KeyCode::Backspace);
        assert!(!options.auto_validate);
        assert_eq!(options.user.as_deref(), Some("jdoe"));

        let defaults = PageOptions::default();
        assert_eq!(defaults.delete_key, KeyCode::Delete);
        assert!(defaults.auto_validate);
    }
}
