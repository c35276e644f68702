use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::DocumentFormat;

/// Parse structured data in any supported format into a `serde_json::Value`.
pub fn parse_document_str(contents: &str, format: DocumentFormat) -> Result<Value> {
    match format {
        DocumentFormat::Json => {
            serde_json::from_str::<Value>(contents).with_context(|| "failed to parse JSON document")
        }
        #[cfg(feature = "yaml")]
        DocumentFormat::Yaml => {
            serde_yaml::from_str::<Value>(contents).with_context(|| "failed to parse YAML document")
        }
        #[cfg(feature = "toml")]
        DocumentFormat::Toml => contents
            .parse::<toml::Value>()
            .with_context(|| "failed to parse TOML document")
            .and_then(|value| {
                serde_json::to_value(value).context("failed to convert TOML to JSON")
            }),
    }
}

/// Parse a document straight into a typed record.
pub fn parse_document_as<T: DeserializeOwned>(contents: &str, format: DocumentFormat) -> Result<T> {
    let value = parse_document_str(contents, format)?;
    serde_json::from_value(value).with_context(|| format!("unexpected {format} document shape"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::BuildConfiguration;
    use serde_json::json;

    #[test]
    fn parse_json_documents() {
        let raw = "{\"cleanWorkspace\":true}";
        let parsed = parse_document_str(raw, DocumentFormat::Json).unwrap();
        assert_eq!(parsed["cleanWorkspace"], Value::Bool(true));
    }

    #[test]
    fn typed_parse_reads_service_records() {
        let raw = json!({"projectName": "core", "usersList": ["alice"]}).to_string();
        let config: BuildConfiguration = parse_document_as(&raw, DocumentFormat::Json).unwrap();
        assert_eq!(config.project_name, "core");
        assert_eq!(config.users_list, ["alice"]);
        assert!(parse_document_as::<BuildConfiguration>("[1,2]", DocumentFormat::Json).is_err());
    }

    #[cfg(feature = "yaml")]
    #[test]
    fn parse_yaml_documents() {
        let raw = "projectName: core\nscm: Git";
        let parsed = parse_document_str(raw, DocumentFormat::Yaml).unwrap();
        assert_eq!(parsed["scm"], json!("Git"));
    }

    #[cfg(feature = "toml")]
    #[test]
    fn parse_toml_documents() {
        let raw = "projectName = \"core\"\ncleanWorkspace = false";
        let parsed = parse_document_str(raw, DocumentFormat::Toml).unwrap();
        assert_eq!(parsed["cleanWorkspace"], Value::Bool(false));
    }
}
