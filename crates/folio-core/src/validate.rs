//! Field-level validation shared by the onboarding and contact forms.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;
use thiserror::Error;
use url::Url;

/// Field path (`name`, `projects[0].title`, ...) mapped to the first failing
/// rule's message for that field.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keeps the first message recorded for a field.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_insert_with(|| message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn into_result(self) -> Result<(), ValidationFailed> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(ValidationFailed(self))
        }
    }

    pub fn min_chars(&mut self, field: &str, value: &str, min: usize, message: &str) {
        if char_len(value) < min {
            self.add(field, message);
        }
    }

    pub fn max_chars(&mut self, field: &str, value: &str, max: usize, message: &str) {
        if char_len(value) > max {
            self.add(field, message);
        }
    }

    pub fn email(&mut self, field: &str, value: &str, message: &str) {
        if !is_valid_email(value) {
            self.add(field, message);
        }
    }

    /// Empty is accepted; anything else must be an absolute URL.
    pub fn optional_url(&mut self, field: &str, value: &str, message: &str) {
        if !value.is_empty() && !is_valid_url(value) {
            self.add(field, message);
        }
    }

    pub fn non_empty_list<T>(&mut self, field: &str, values: &[T], message: &str) {
        if values.is_empty() {
            self.add(field, message);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{} field(s) failed validation", .0.len())]
pub struct ValidationFailed(pub FieldErrors);

pub fn char_len(value: &str) -> usize {
    value.chars().count()
}

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        Regex::new(concat!(
            r"^[A-Za-z0-9._%+'-]+@",
            r"[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?",
            r"(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?)*",
            r"\.[A-Za-z]{2,}$",
        ))
        .expect("email pattern compiles")
    })
}

pub fn is_valid_email(value: &str) -> bool {
    !value.contains("..") && email_regex().is_match(value)
}

/// Absolute URL with a scheme and, for hierarchical schemes, a host.
pub fn is_valid_url(value: &str) -> bool {
    match Url::parse(value) {
        Ok(url) => url.cannot_be_a_base() || url.host_str().is_some_and(|h| !h.is_empty()),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_shapes() {
        assert!(is_valid_email("alex@example.com"));
        assert!(is_valid_email("first.last+tag@sub.example.co"));
        assert!(!is_valid_email("alex@"));
        assert!(!is_valid_email("alex.example.com"));
        assert!(!is_valid_email("alex@example"));
        assert!(!is_valid_email("a..b@example.com"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn url_shapes() {
        assert!(is_valid_url("https://github.com/example"));
        assert!(is_valid_url("mailto:alex@example.com"));
        assert!(!is_valid_url("github.com/example"));
        assert!(!is_valid_url("not a url"));
        assert!(!is_valid_url(""));
    }

    #[test]
    fn first_message_per_field_wins() {
        let mut errors = FieldErrors::new();
        errors.min_chars("bio", "short", 50, "Bio must be at least 50 characters");
        errors.max_chars("bio", "short", 2, "Bio must be less than 500 characters");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.get("bio"), Some("Bio must be at least 50 characters"));
        assert!(errors.into_result().is_err());
    }

    #[test]
    fn lengths_count_characters_not_bytes() {
        let mut errors = FieldErrors::new();
        errors.min_chars("name", "Zoë", 3, "too short");
        assert!(errors.is_empty());
        errors.optional_url("github", "", "bad url");
        assert!(errors.into_result().is_ok());
    }
}
