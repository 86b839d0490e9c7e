use std::collections::HashMap;
use std::str::FromStr;
use std::sync::RwLock;

use crate::error::{CatalogError, CatalogResult};
use crate::models::Rating;

/// A flat key-to-rating mapping for one classification domain.
pub type RateTable = HashMap<String, Rating>;

/// Fuzzy classifier mapping resource-type names to qualitative ratings.
///
/// A table can loosely classify thousands of type names with a handful of
/// rules: keys are probed from most to least specific and the first hit
/// wins. The cache is owned by the classifier instance; loading a table
/// under an existing name overwrites the cached entry (tests, hot-reload).
pub struct RateClassifier {
    tables: RwLock<HashMap<String, RateTable>>,
}

impl RateClassifier {
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(HashMap::new()),
        }
    }

    /// A classifier preloaded with the built-in tables shipped with the
    /// crate, one per resource kind.
    pub fn builtin() -> Self {
        let classifier = Self::new();
        for (name, raw) in [
            ("instance", include_str!("../resources/instance.json")),
            ("database", include_str!("../resources/database.json")),
            ("container", include_str!("../resources/container.json")),
            ("function", include_str!("../resources/function.json")),
            ("storage", include_str!("../resources/storage.json")),
            ("support", include_str!("../resources/support.json")),
        ] {
            classifier
                .load_table(name, raw)
                .unwrap_or_else(|e| panic!("built-in rating table '{}' is invalid: {}", name, e));
        }
        classifier
    }

    /// Parse a raw JSON table (`{"key": "RATING", ...}`) and cache it under
    /// `name`, replacing any previous table of that name.
    pub fn load_table(&self, name: &str, raw: &str) -> CatalogResult<()> {
        let parsed: HashMap<String, String> =
            serde_json::from_str(raw).map_err(|e| CatalogError::InvalidRatingTable {
                name: name.to_string(),
                details: e.to_string(),
            })?;

        let mut table = RateTable::with_capacity(parsed.len());
        for (key, value) in parsed {
            let rating =
                Rating::from_str(&value).map_err(|_| CatalogError::InvalidRatingTable {
                    name: name.to_string(),
                    details: format!("unknown rating '{}' for key '{}'", value, key),
                })?;
            table.insert(key.to_lowercase(), rating);
        }

        self.tables
            .write()
            .expect("rating table cache poisoned")
            .insert(name.to_string(), table);
        Ok(())
    }

    /// Classify a type name against the named table.
    ///
    /// Key priority: exact name, size token (first fragment when split on
    /// `.`/`-`), 2-char model (size token right-padded with `_`), first char
    /// of the model, then the literal `"default"` key. Falls back to
    /// [`Rating::Medium`] when nothing matches or the table is unknown.
    pub fn classify(&self, table: &str, type_name: &str) -> Rating {
        let tables = self.tables.read().expect("rating table cache poisoned");
        let Some(table) = tables.get(table) else {
            return Rating::default();
        };

        let name = type_name.trim().to_lowercase();
        let size = size_token(&name);
        let model = model_token(size);
        let initial: String = model.chars().take(1).collect();

        let keys = [name.as_str(), size, model.as_str(), initial.as_str(), "default"];

        for key in keys {
            if let Some(rating) = table.get(key) {
                return *rating;
            }
        }
        Rating::default()
    }
}

impl Default for RateClassifier {
    fn default() -> Self {
        Self::builtin()
    }
}

/// First fragment of a type name when split on `.` or `-`.
fn size_token(name: &str) -> &str {
    name.split(['.', '-']).next().unwrap_or(name)
}

/// Normalized 2-character model: the size token right-padded with `_` to
/// length 2, then truncated to 2 chars. An empty token becomes `"__"`.
fn model_token(size: &str) -> String {
    let mut model: String = size.chars().take(2).collect();
    while model.len() < 2 {
        model.push('_');
    }
    model
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier_with(table: &str) -> RateClassifier {
        let classifier = RateClassifier::new();
        classifier.load_table("test", table).unwrap();
        classifier
    }

    #[test]
    fn test_exact_match_wins() {
        let c = classifier_with(r#"{"b1.large": "BEST", "b1": "LOW", "default": "WORST"}"#);
        assert_eq!(c.classify("test", "b1.large"), Rating::Best);
    }

    #[test]
    fn test_size_token_match() {
        let c = classifier_with(r#"{"b1": "LOW", "default": "WORST"}"#);
        assert_eq!(c.classify("test", "b1.large"), Rating::Low);
        // Stability: same size token, same rating
        assert_eq!(c.classify("test", "b1"), c.classify("test", "b1.large"));
        // `-` separates the size token too
        assert_eq!(c.classify("test", "b1-xlarge"), Rating::Low);
    }

    #[test]
    fn test_model_token_match() {
        let c = classifier_with(r#"{"m5": "GOOD", "default": "WORST"}"#);
        // "m5zq.large" and its size token "m5zq" are absent, but the
        // 2-char model "m5" is present
        assert_eq!(c.classify("test", "m5zq.large"), Rating::Good);
        assert_eq!(c.classify("test", "c5.large"), Rating::Worst);
    }

    #[test]
    fn test_first_char_match() {
        let c = classifier_with(r#"{"t": "LOW", "default": "GOOD"}"#);
        assert_eq!(c.classify("test", "t3.micro"), Rating::Low);
        assert_eq!(c.classify("test", "m5.large"), Rating::Good);
    }

    #[test]
    fn test_default_key_then_fixed_fallback() {
        let c = classifier_with(r#"{"default": "GOOD"}"#);
        assert_eq!(c.classify("test", "anything.at.all"), Rating::Good);

        let empty = classifier_with(r#"{}"#);
        assert_eq!(empty.classify("test", "anything"), Rating::Medium);
        // Unknown table name also falls back
        assert_eq!(empty.classify("missing", "anything"), Rating::Medium);
    }

    #[test]
    fn test_single_char_name_pads_model() {
        // Size token "a" pads to model "a_"; neither is present, the first
        // char "a" is
        let c = classifier_with(r#"{"a": "BEST", "default": "WORST"}"#);
        assert_eq!(c.classify("test", "a"), Rating::Best);

        // Model key "a_" is probed before the first char
        let c2 = classifier_with(r#"{"a_": "LOW", "a": "BEST"}"#);
        assert_eq!(c2.classify("test", "a"), Rating::Low);
        assert_eq!(c2.classify("test", "a1.small"), Rating::Best);
    }

    #[test]
    fn test_classification_is_case_insensitive() {
        let c = classifier_with(r#"{"b1": "LOW"}"#);
        assert_eq!(c.classify("test", "B1.Large"), Rating::Low);
    }

    #[test]
    fn test_reload_overwrites_cache() {
        let c = classifier_with(r#"{"b1": "LOW"}"#);
        assert_eq!(c.classify("test", "b1"), Rating::Low);

        c.load_table("test", r#"{"b1": "BEST"}"#).unwrap();
        assert_eq!(c.classify("test", "b1"), Rating::Best);
    }

    #[test]
    fn test_invalid_table_rejected() {
        let c = RateClassifier::new();
        assert!(c.load_table("bad", r#"{"b1": "AMAZING"}"#).is_err());
        assert!(c.load_table("bad", "not json").is_err());
    }

    #[test]
    fn test_builtin_tables_load() {
        let c = RateClassifier::builtin();
        // The shipped tables all carry a "default" key
        assert_ne!(c.classify("instance", "zz99.mega"), Rating::Worst);
    }
}
