use anyhow::{Result, anyhow, bail};
use percent_encoding::percent_decode_str;

use crate::domain::PageMode;

/// Mode and project selected by the page's query string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub mode: PageMode,
    pub name: Option<String>,
}

impl PageRequest {
    pub fn create() -> Self {
        Self {
            mode: PageMode::Create,
            name: None,
        }
    }

    pub fn open(mode: PageMode, name: impl Into<String>) -> Self {
        Self {
            mode,
            name: Some(name.into()),
        }
    }

    /// Parse `name=<project>&type=<mode>`. An empty query starts a new
    /// configuration.
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.strip_prefix('?').unwrap_or(raw);
        if raw.is_empty() {
            return Ok(Self::create());
        }
        let decoded = percent_decode_str(raw).decode_utf8_lossy().replace("%20", " ");
        let pairs: Vec<&str> = decoded.split('&').collect();
        let name = parameter_value(&pairs, "name")
            .ok_or_else(|| anyhow!("query '{raw}' does not name a configuration"))?;
        let Some(kind) = parameter_value(&pairs, "type") else {
            bail!("query '{raw}' has no page type");
        };
        let mode = PageMode::from_query_type(&kind)
            .ok_or_else(|| anyhow!("unknown page type '{kind}'"))?;
        if mode == PageMode::Create {
            return Ok(Self::create());
        }
        Ok(Self::open(mode, name))
    }
}

/// Only the first two pairs are inspected, and a pair matches when it
/// contains the parameter name anywhere.
fn parameter_value(pairs: &[&str], parameter: &str) -> Option<String> {
    pairs
        .iter()
        .take(2)
        .find(|pair| pair.contains(parameter))
        .and_then(|pair| pair.split('=').nth(1))
        .map(str::to_string)
}
