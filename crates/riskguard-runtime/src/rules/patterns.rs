//! Fraud pattern definitions loaded from YAML
//!
//! ```yaml
//! patterns:
//!   - id: card_testing
//!     name: Card testing
//!     pattern_type: velocity
//!     conditions:
//!       - type: amount_range
//!         max: 5
//!       - type: merchant_categories
//!         categories: [online]
//! ```

use crate::error::{Result, RuntimeError};
use riskguard_core::FraudPattern;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

#[derive(Deserialize)]
struct PatternDocument {
    #[serde(default)]
    patterns: Vec<FraudPattern>,
}

/// Parse and validate a pattern document
pub fn parse_patterns(content: &str) -> Result<Vec<FraudPattern>> {
    let document: PatternDocument = serde_yaml::from_str(content)
        .map_err(|e| RuntimeError::PatternConfig(format!("invalid YAML: {}", e)))?;

    let mut seen = HashSet::new();
    for pattern in &document.patterns {
        pattern
            .validate()
            .map_err(|e| RuntimeError::PatternConfig(e.to_string()))?;
        if !seen.insert(pattern.id.as_str()) {
            return Err(RuntimeError::PatternConfig(format!(
                "duplicate pattern id: {}",
                pattern.id
            )));
        }
    }

    Ok(document.patterns)
}

/// Read and parse a pattern file
pub async fn load_patterns_file(path: impl AsRef<Path>) -> Result<Vec<FraudPattern>> {
    let content = tokio::fs::read_to_string(path.as_ref()).await?;
    let patterns = parse_patterns(&content)?;
    tracing::info!(
        path = %path.as_ref().display(),
        count = patterns.len(),
        "loaded fraud patterns"
    );
    Ok(patterns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use riskguard_core::PatternCondition;

    const DOC: &str = r#"
patterns:
  - id: card_testing
    name: Card testing
    pattern_type: velocity
    conditions:
      - type: amount_range
        max: 5
      - type: merchant_categories
        categories: [online]
  - id: risky_corridor
    name: Risky corridor
    is_active: false
    conditions:
      - type: countries
        countries: [NG, RU]
"#;

    #[test]
    fn test_parse_patterns() {
        let patterns = parse_patterns(DOC).unwrap();
        assert_eq!(patterns.len(), 2);
        assert_eq!(patterns[0].id, "card_testing");
        assert!(matches!(
            patterns[0].conditions[0],
            PatternCondition::AmountRange { min: None, .. }
        ));
        assert!(!patterns[1].is_active);
    }

    #[test]
    fn test_empty_document() {
        assert!(parse_patterns("patterns: []").unwrap().is_empty());
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let doc = r#"
patterns:
  - id: a
    name: A
    conditions: [{type: countries, countries: [US]}]
  - id: a
    name: A again
    conditions: [{type: countries, countries: [FR]}]
"#;
        let err = parse_patterns(doc).unwrap_err();
        assert!(err.to_string().contains("duplicate pattern id: a"));
    }

    #[test]
    fn test_unknown_condition_rejected() {
        let doc = r#"
patterns:
  - id: a
    name: A
    conditions: [{type: ip_range, cidr: 10.0.0.0/8}]
"#;
        assert!(matches!(
            parse_patterns(doc),
            Err(RuntimeError::PatternConfig(_))
        ));
    }

    #[test]
    fn test_pattern_without_conditions_rejected() {
        let doc = r#"
patterns:
  - id: a
    name: A
    conditions: []
"#;
        assert!(parse_patterns(doc).is_err());
    }

    #[tokio::test]
    async fn test_load_patterns_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("patterns.yaml");
        tokio::fs::write(&path, DOC).await.unwrap();

        let patterns = load_patterns_file(&path).await.unwrap();
        assert_eq!(patterns.len(), 2);

        let missing = load_patterns_file(dir.path().join("missing.yaml")).await;
        assert!(matches!(missing, Err(RuntimeError::Io(_))));
    }
}
