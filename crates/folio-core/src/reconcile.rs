//! Per-section reconciliation of persisted state over the bundled defaults.
//!
//! Precedence is per top-level key: a persisted section that deserializes into
//! its typed shape replaces the default section wholesale; a malformed one is
//! rejected and the default is kept.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::PortfolioDocument;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedSection {
    pub key: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Reconciled {
    pub document: PortfolioDocument,
    pub applied: Vec<String>,
    pub rejected: Vec<RejectedSection>,
    pub ignored: Vec<String>,
}

impl Reconciled {
    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty()
    }
}

pub fn reconcile(defaults: PortfolioDocument, persisted: &Map<String, Value>) -> Reconciled {
    let mut document = defaults;
    let mut applied = Vec::new();
    let mut rejected = Vec::new();
    let mut ignored = Vec::new();

    for (key, value) in persisted {
        let outcome = match key.as_str() {
            "personal" => replace_section(&mut document.personal, value),
            "skills" => replace_section(&mut document.skills, value),
            "education" => replace_section(&mut document.education, value),
            "certificates" => replace_section(&mut document.certificates, value),
            "experience" => replace_section(&mut document.experience, value),
            "projects" => replace_section(&mut document.projects, value),
            "research" => replace_section(&mut document.research, value),
            "social" => replace_section(&mut document.social, value),
            "navigation" => replace_section(&mut document.navigation, value),
            _ => {
                ignored.push(key.clone());
                continue;
            }
        };
        match outcome {
            Ok(()) => applied.push(key.clone()),
            Err(err) => rejected.push(RejectedSection {
                key: key.clone(),
                reason: err.to_string(),
            }),
        }
    }

    Reconciled {
        document,
        applied,
        rejected,
        ignored,
    }
}

/// Serialize the document into its top-level sections.
pub fn to_sections(document: &PortfolioDocument) -> Result<Map<String, Value>, serde_json::Error> {
    match serde_json::to_value(document)? {
        Value::Object(map) => Ok(map),
        other => Err(serde::ser::Error::custom(format!(
            "document serialized to non-object {other}"
        ))),
    }
}

fn replace_section<T: DeserializeOwned>(
    slot: &mut T,
    value: &Value,
) -> Result<(), serde_json::Error> {
    *slot = T::deserialize(value)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{bundled_defaults, SECTION_KEYS};
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn persisted_section_wins_over_default() {
        let persisted = object(json!({
            "social": {
                "github": "https://github.com/someone",
                "linkedin": "",
                "twitter": "",
                "email": ""
            }
        }));
        let out = reconcile(bundled_defaults(), &persisted);
        assert!(out.is_clean());
        assert_eq!(out.applied, vec!["social"]);
        assert_eq!(out.document.social.github, "https://github.com/someone");
        assert_eq!(out.document.projects, bundled_defaults().projects);
    }

    #[test]
    fn malformed_section_keeps_default_and_is_reported() {
        let persisted = object(json!({
            "projects": [{"id": "9", "title": 42}],
            "personal": {
                "name": "Sam",
                "title": "Dev",
                "bio": "b",
                "email": "s@example.com",
                "location": "Oslo"
            }
        }));
        let out = reconcile(bundled_defaults(), &persisted);
        assert_eq!(out.document.projects, bundled_defaults().projects);
        assert_eq!(out.document.personal.name, "Sam");
        assert_eq!(out.rejected.len(), 1);
        assert_eq!(out.rejected[0].key, "projects");
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let persisted = object(json!({"volunteer": []}));
        let out = reconcile(bundled_defaults(), &persisted);
        assert!(out.is_clean());
        assert_eq!(out.ignored, vec!["volunteer"]);
        assert_eq!(out.document, bundled_defaults());
    }

    #[test]
    fn sections_cover_every_top_level_key() {
        let sections = to_sections(&bundled_defaults()).unwrap();
        let keys = sections.keys().map(String::as_str).collect::<Vec<_>>();
        let mut expected = SECTION_KEYS.to_vec();
        expected.sort_unstable();
        assert_eq!(keys, expected);
    }
}
