//! Bundled default dataset compiled into the binary.

use std::sync::OnceLock;

use crate::PortfolioDocument;

pub const DEFAULT_DATASET_JSON: &str = include_str!("../data/portfolio.json");

static DEFAULTS: OnceLock<PortfolioDocument> = OnceLock::new();

/// Parsed copy of the bundled dataset. Every call returns a fresh clone.
pub fn bundled_defaults() -> PortfolioDocument {
    DEFAULTS
        .get_or_init(|| {
            serde_json::from_str(DEFAULT_DATASET_JSON)
                .expect("bundled portfolio dataset matches the document schema")
        })
        .clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn bundled_dataset_parses() {
        let doc = bundled_defaults();
        assert!(!doc.personal.name.is_empty());
        for category in ["frontend", "backend", "tools"] {
            assert!(
                doc.skills.get(category).is_some_and(|s| !s.is_empty()),
                "missing default skills for {category}"
            );
        }
        assert!(!doc.navigation.is_empty());
    }

    #[test]
    fn bundled_ids_are_unique_per_collection() {
        let doc = bundled_defaults();
        fn unique<'a>(ids: impl Iterator<Item = &'a str>) -> bool {
            let mut seen = HashSet::new();
            ids.into_iter().all(|id| seen.insert(id))
        }
        assert!(unique(doc.projects.iter().map(|p| p.id.as_str())));
        assert!(unique(doc.experience.iter().map(|e| e.id.as_str())));
        assert!(unique(doc.education.iter().map(|e| e.id.as_str())));
        assert!(unique(doc.research.iter().map(|r| r.id.as_str())));
        assert!(unique(doc.certificates.iter().map(|c| c.id.as_str())));
    }

    #[test]
    fn bundled_dataset_round_trips_losslessly() {
        let doc = bundled_defaults();
        let json = serde_json::to_string(&doc).unwrap();
        let back: PortfolioDocument = serde_json::from_str(&json).unwrap();
        assert_eq!(doc, back);
    }
}
