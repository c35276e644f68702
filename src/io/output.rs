use std::io::{self, Write};

use anyhow::{Context, Result};
use serde::Serialize;

use super::DocumentFormat;

/// Serialization settings shared by the CLI report and stored records.
#[derive(Debug, Clone, Copy)]
pub struct OutputOptions {
    pub format: DocumentFormat,
    pub pretty: bool,
}

impl OutputOptions {
    pub fn new(format: DocumentFormat) -> Self {
        Self {
            format,
            pretty: true,
        }
    }

    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn render<T: Serialize>(&self, value: &T) -> Result<String> {
        match self.format {
            DocumentFormat::Json if self.pretty => {
                serde_json::to_string_pretty(value).context("failed to serialize JSON")
            }
            DocumentFormat::Json => serde_json::to_string(value).context("failed to serialize JSON"),
            #[cfg(feature = "yaml")]
            DocumentFormat::Yaml => serde_yaml::to_string(value).context("failed to serialize YAML"),
            #[cfg(feature = "toml")]
            DocumentFormat::Toml if self.pretty => {
                toml::to_string_pretty(value).context("failed to serialize TOML")
            }
            #[cfg(feature = "toml")]
            DocumentFormat::Toml => toml::to_string(value).context("failed to serialize TOML"),
        }
    }
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self::new(DocumentFormat::Json)
    }
}

/// Write one document followed by a newline.
pub fn write_document<T: Serialize, W: Write>(
    value: &T,
    options: &OutputOptions,
    mut writer: W,
) -> Result<()> {
    let payload = options.render(value)?;
    writeln!(writer, "{payload}").context("failed to write report")?;
    writer.flush().context("failed to flush report")
}

/// Print a report on stdout.
pub fn emit<T: Serialize>(value: &T, options: &OutputOptions) -> Result<()> {
    write_document(value, options, io::stdout().lock())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn compact_report_is_one_line() {
        let mut out = Vec::new();
        let options = OutputOptions::default().with_pretty(false);
        write_document(&json!({"formType": "CREATE"}), &options, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "{\"formType\":\"CREATE\"}\n");
    }

    #[test]
    fn pretty_report_is_indented() {
        let rendered = OutputOptions::default()
            .render(&json!({"status": "ready"}))
            .unwrap();
        assert_eq!(rendered, "{\n  \"status\": \"ready\"\n}");
    }
}
