//! Label-to-category normalization
//!
//! Labels are ranked by confidence, lower-cased and matched against a fixed
//! clothing vocabulary (exact or substring). A match is canonicalized through
//! the alias map. When no label matches, a non-generic top label is used as-is,
//! and failing that the default category.

use std::collections::BTreeMap;

use async_trait::async_trait;
use image::RgbImage;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{CategoryConfig, LabelPrecedence};

/// One guess from the external image labeler
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelGuess {
    pub text: String,
    /// Confidence in [0, 1]
    pub confidence: f64,
}

impl LabelGuess {
    pub fn new(text: impl Into<String>, confidence: f64) -> Self {
        Self {
            text: text.into(),
            confidence,
        }
    }
}

/// External multi-label image classifier
///
/// Implementations never fail: internal errors are reported as an empty
/// collection, which the category classifier turns into its default.
#[async_trait]
pub trait LabelClassifier: Send + Sync {
    async fn classify_labels(&self, image: &RgbImage) -> Vec<LabelGuess>;
}

/// Rule that produced a category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryRule {
    /// A label matched the vocabulary
    Vocabulary,
    /// The top label was used verbatim
    TopLabel,
    /// Nothing usable; default category
    Default,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryMatch {
    pub category: String,
    pub rule: CategoryRule,
}

/// Normalizes classifier labels into one clothing category
#[derive(Debug, Clone)]
pub struct CategoryClassifier {
    allowed: Vec<String>,
    aliases: BTreeMap<String, String>,
    generic: Vec<String>,
    default_category: String,
    precedence: LabelPrecedence,
}

impl Default for CategoryClassifier {
    fn default() -> Self {
        Self::new(&CategoryConfig::default())
    }
}

impl CategoryClassifier {
    pub fn new(config: &CategoryConfig) -> Self {
        let lower = |terms: &[String]| terms.iter().map(|t| t.to_lowercase()).collect();
        Self {
            allowed: lower(&config.allowed),
            aliases: config
                .aliases
                .iter()
                .map(|(from, to)| (from.to_lowercase(), to.to_lowercase()))
                .collect(),
            generic: lower(&config.generic),
            default_category: config.default_category.clone(),
            precedence: config.precedence,
        }
    }

    /// Whether `label` equals or contains a vocabulary term
    pub fn is_allowed(&self, label: &str) -> bool {
        self.allowed.iter().any(|term| label.contains(term.as_str()))
    }

    pub fn is_generic(&self, label: &str) -> bool {
        self.generic.iter().any(|term| term == label)
    }

    /// Alias target for `label`, or `label` itself
    pub fn canonicalize(&self, label: &str) -> String {
        self.aliases
            .get(label)
            .cloned()
            .unwrap_or_else(|| label.to_string())
    }

    /// Normalize `labels` into a category
    pub fn classify(&self, labels: &[LabelGuess]) -> String {
        self.classify_detailed(labels).category
    }

    /// Normalize `labels` and report which rule decided
    pub fn classify_detailed(&self, labels: &[LabelGuess]) -> CategoryMatch {
        let mut ranked: Vec<&LabelGuess> = labels.iter().collect();
        // Stable: equal confidences keep input order
        ranked.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
        let texts: Vec<String> = ranked.iter().map(|l| l.text.to_lowercase()).collect();

        let vocabulary_hit = || {
            texts
                .iter()
                .find(|t| self.is_allowed(t))
                .map(|t| CategoryMatch {
                    category: self.canonicalize(t),
                    rule: CategoryRule::Vocabulary,
                })
        };
        let top_label = texts
            .first()
            .filter(|t| !t.trim().is_empty() && !self.is_generic(t))
            .map(|t| CategoryMatch {
                category: t.clone(),
                rule: CategoryRule::TopLabel,
            });

        let decided = match self.precedence {
            LabelPrecedence::TopLabelFirst => top_label
                .filter(|m| !self.is_allowed(&m.category))
                .or_else(vocabulary_hit),
            LabelPrecedence::VocabularyFirst => vocabulary_hit().or(top_label),
        };

        let result = decided.unwrap_or_else(|| CategoryMatch {
            category: self.default_category.clone(),
            rule: CategoryRule::Default,
        });
        debug!(
            labels = labels.len(),
            category = %result.category,
            rule = ?result.rule,
            "Category resolved"
        );
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(items: &[(&str, f64)]) -> Vec<LabelGuess> {
        items.iter().map(|(t, c)| LabelGuess::new(*t, *c)).collect()
    }

    fn vocabulary_first() -> CategoryClassifier {
        CategoryClassifier::new(&CategoryConfig {
            precedence: LabelPrecedence::VocabularyFirst,
            ..CategoryConfig::default()
        })
    }

    #[test]
    fn test_empty_is_default() {
        let classifier = CategoryClassifier::default();
        let result = classifier.classify_detailed(&[]);
        assert_eq!(result.category, "shirt");
        assert_eq!(result.rule, CategoryRule::Default);
        assert_eq!(vocabulary_first().classify(&[]), "shirt");
    }

    #[test]
    fn test_alias_applied_to_top_match() {
        let classifier = CategoryClassifier::default();
        assert_eq!(classifier.classify(&labels(&[("Tee", 0.9), ("Hat", 0.5)])), "t-shirt");
        assert_eq!(vocabulary_first().classify(&labels(&[("Tee", 0.9), ("Hat", 0.5)])), "t-shirt");
    }

    #[test]
    fn test_confidence_order_not_input_order() {
        let classifier = CategoryClassifier::default();
        assert_eq!(classifier.classify(&labels(&[("Hat", 0.5), ("Jumper", 0.8)])), "sweater");
    }

    #[test]
    fn test_generic_top_label_falls_to_default() {
        let classifier = CategoryClassifier::default();
        let result = classifier.classify_detailed(&labels(&[("Clothing", 0.99)]));
        assert_eq!(result.category, "shirt");
        assert_eq!(result.rule, CategoryRule::Default);
    }

    #[test]
    fn test_generic_top_label_skipped_for_vocabulary() {
        let classifier = CategoryClassifier::default();
        let input = labels(&[("Apparel", 0.97), ("Denim", 0.9), ("Jeans", 0.6)]);
        // Top label is generic, so "denim" is never considered verbatim
        assert_eq!(classifier.classify(&input), "jeans");
    }

    #[test]
    fn test_unknown_top_label_wins_by_default() {
        let classifier = CategoryClassifier::default();
        let result = classifier.classify_detailed(&labels(&[("Backpack", 0.95), ("Jeans", 0.40)]));
        assert_eq!(result.category, "backpack");
        assert_eq!(result.rule, CategoryRule::TopLabel);
    }

    #[test]
    fn test_vocabulary_first_prefers_lower_ranked_match() {
        let result = vocabulary_first()
            .classify_detailed(&labels(&[("Backpack", 0.95), ("Jeans", 0.40)]));
        assert_eq!(result.category, "jeans");
        assert_eq!(result.rule, CategoryRule::Vocabulary);
    }

    #[test]
    fn test_precedence_from_config_file_section() {
        let config: CategoryConfig =
            serde_json::from_str(r#"{ "precedence": "vocabulary_first" }"#).unwrap();
        let input = labels(&[("Backpack", 0.95), ("Jeans", 0.40)]);
        assert_eq!(CategoryClassifier::new(&config).classify(&input), "jeans");

        let config: CategoryConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(CategoryClassifier::new(&config).classify(&input), "backpack");
    }

    #[test]
    fn test_unknown_only_label_used_verbatim() {
        let input = labels(&[("Scarf", 0.7)]);
        assert_eq!(CategoryClassifier::default().classify(&input), "scarf");
        assert_eq!(vocabulary_first().classify(&input), "scarf");
    }

    #[test]
    fn test_substring_match_keeps_full_label() {
        let classifier = CategoryClassifier::default();
        // "denim jacket" contains "jacket"; no alias for the full label
        assert_eq!(classifier.classify(&labels(&[("Denim Jacket", 0.8)])), "denim jacket");
        assert_eq!(classifier.classify(&labels(&[("T Shirt", 0.8)])), "t-shirt");
    }

    #[test]
    fn test_ties_keep_input_order() {
        let classifier = CategoryClassifier::default();
        assert_eq!(classifier.classify(&labels(&[("Coat", 0.6), ("Dress", 0.6)])), "coat");
        assert_eq!(classifier.classify(&labels(&[("Dress", 0.6), ("Coat", 0.6)])), "dress");
    }

    #[test]
    fn test_blank_top_label_is_not_used() {
        let classifier = CategoryClassifier::default();
        assert_eq!(classifier.classify(&labels(&[("  ", 0.9)])), "shirt");
    }

    #[test]
    fn test_custom_vocabulary() {
        let config = CategoryConfig {
            allowed: vec!["Scarf".into()],
            aliases: BTreeMap::from([("scarf".to_string(), "Scarves".to_string())]),
            generic: vec!["accessory".into()],
            default_category: "scarf".into(),
            precedence: LabelPrecedence::TopLabelFirst,
        };
        let classifier = CategoryClassifier::new(&config);
        assert_eq!(classifier.classify(&labels(&[("Scarf", 0.8)])), "scarves");
        assert_eq!(classifier.classify(&labels(&[("Accessory", 0.9)])), "scarf");
    }
}
