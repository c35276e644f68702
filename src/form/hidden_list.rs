//! `;`-joined multi-value strings stored in a single persisted field.
//!
//! The encoding is a wire contract with the configuration service, so the
//! functions here reproduce it byte for byte, including the textual (not
//! token-aware) removal.

pub const SEPARATOR: char = ';';

/// Append `value` and a trailing separator, adding a joining separator only
/// when `existing` is non-empty and does not already end with one.
///
/// Duplicate suppression is the caller's job.
pub fn encode(existing: &str, value: &str) -> String {
    let mut encoded = String::with_capacity(existing.len() + value.len() + 2);
    encoded.push_str(existing);
    if !existing.is_empty() && !existing.ends_with(SEPARATOR) {
        encoded.push(SEPARATOR);
    }
    encoded.push_str(value);
    encoded.push(SEPARATOR);
    encoded
}

/// Remove the first textual occurrence of `value`, collapse the first `;;`,
/// then drop one leading and one trailing separator.
///
/// Removing `a` from `ab;a` yields `b;a`: a value that is a substring of an
/// earlier entry corrupts that entry instead.
pub fn remove(existing: &str, value: &str) -> String {
    let without = existing.replacen(value, "", 1);
    let collapsed = without.replacen(";;", ";", 1);
    let trimmed = collapsed.strip_prefix(SEPARATOR).unwrap_or(&collapsed);
    let trimmed = trimmed.strip_suffix(SEPARATOR).unwrap_or(trimmed);
    trimmed.to_string()
}

/// Split into entries, skipping empty segments.
pub fn decode(encoded: &str) -> Vec<&str> {
    encoded
        .split(SEPARATOR)
        .filter(|entry| !entry.is_empty())
        .collect()
}

/// Owned hidden field value with the codec operations attached.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HiddenList {
    raw: String,
}

impl HiddenList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }

    pub fn from_entries<'a>(entries: impl IntoIterator<Item = &'a str>) -> Self {
        let mut list = Self::new();
        for entry in entries {
            list.push(entry);
        }
        list
    }

    pub fn push(&mut self, value: &str) {
        self.raw = encode(&self.raw, value);
    }

    pub fn remove(&mut self, value: &str) {
        self.raw = remove(&self.raw, value);
    }

    pub fn clear(&mut self) {
        self.raw.clear();
    }

    pub fn contains(&self, value: &str) -> bool {
        decode(&self.raw).contains(&value)
    }

    pub fn entries(&self) -> Vec<&str> {
        decode(&self.raw)
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn well_formed(raw: &str) -> bool {
        !raw.starts_with(SEPARATOR) && !raw.contains(";;") && !raw.ends_with(";;")
    }

    #[test]
    fn encode_joins_without_doubling_separators() {
        assert_eq!(encode("", "bin"), "bin;");
        assert_eq!(encode("bin;", "obj"), "bin;obj;");
        assert_eq!(encode("bin", "obj"), "bin;obj;");
    }

    #[test]
    fn encoded_value_decodes_exactly_once() {
        let samples = ["", "a", "a;", "a;b", "a;b;", "dist/*.zip;out/**/x.dll"];
        for existing in samples {
            let encoded = encode(existing, "fresh/path");
            assert!(well_formed(&encoded), "{existing:?} -> {encoded:?}");
            let hits = decode(&encoded)
                .into_iter()
                .filter(|entry| *entry == "fresh/path")
                .count();
            assert_eq!(hits, 1, "{existing:?}");
        }
    }

    #[test]
    fn remove_leaves_no_stray_separators() {
        let list = "alpha;beta;gamma;";
        for value in ["alpha", "beta", "gamma"] {
            let removed = remove(list, value);
            assert!(!removed.starts_with(SEPARATOR), "{removed:?}");
            assert!(!removed.ends_with(SEPARATOR), "{removed:?}");
            assert!(!removed.contains(";;"), "{removed:?}");
            assert!(!decode(&removed).contains(&value));
        }
        assert_eq!(remove("alpha;beta;gamma", "beta"), "alpha;gamma");
        assert_eq!(remove("only;", "only"), "");
        assert_eq!(remove("only", "only"), "");
    }

    #[test]
    fn remove_is_textual_not_token_aware() {
        // The first textual hit wins, even inside a longer entry.
        assert_eq!(remove("ab;a;", "a"), "b;a");
        assert_eq!(remove("lib/a.dll;a.dll", "a.dll"), "lib/;a.dll");
    }

    #[test]
    fn hidden_list_round_trip_preserves_order() {
        let mut list = HiddenList::from_entries(["one", "two", "three"]);
        assert_eq!(list.as_str(), "one;two;three;");
        list.remove("two");
        assert_eq!(list.entries(), ["one", "three"]);
        list.push("four");
        assert_eq!(list.as_str(), "one;three;four;");
        assert!(list.contains("four"));
        assert!(!list.contains("fou"));
        list.clear();
        assert!(list.is_empty());
    }
}
