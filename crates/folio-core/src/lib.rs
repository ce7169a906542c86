//! Core document model for the Folio portfolio site.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod dates;
pub mod defaults;
pub mod patch;
pub mod reconcile;
pub mod validate;

pub use defaults::bundled_defaults;
pub use patch::{
    NewProject, NewProjectLinks, PersonalInfoPatch, ProjectPatch, SkillsPatch, SocialPatch,
};
pub use reconcile::{reconcile, Reconciled, RejectedSection};
pub use validate::{FieldErrors, ValidationFailed};

pub const CRATE_NAME: &str = "folio-core";

/// Top-level keys of a persisted document, in document order.
pub const SECTION_KEYS: [&str; 9] = [
    "personal",
    "skills",
    "education",
    "certificates",
    "experience",
    "projects",
    "research",
    "social",
    "navigation",
];

/// Skill category name mapped to the ordered skill names in that category.
pub type SkillMap = BTreeMap<String, Vec<String>>;

/// The single aggregate rendered by every page of the site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortfolioDocument {
    pub personal: PersonalInfo,
    pub skills: SkillMap,
    #[serde(default)]
    pub education: Vec<Education>,
    #[serde(default)]
    pub certificates: Vec<Certificate>,
    #[serde(default)]
    pub experience: Vec<Experience>,
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub research: Vec<Research>,
    #[serde(default)]
    pub social: Social,
    #[serde(default)]
    pub navigation: Vec<NavigationItem>,
}

impl PortfolioDocument {
    pub fn project(&self, id: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }

    pub fn research_entry(&self, id: &str) -> Option<&Research> {
        self.research.iter().find(|r| r.id == id)
    }

    /// Ordered, de-duplicated technologies across all projects.
    pub fn project_technologies(&self) -> Vec<String> {
        let mut seen = Vec::<String>::new();
        for tech in self.projects.iter().flat_map(|p| p.technologies.iter()) {
            if !seen.iter().any(|s| s == tech) {
                seen.push(tech.clone());
            }
        }
        seen
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PersonalInfo {
    pub name: String,
    pub title: String,
    pub bio: String,
    pub email: String,
    pub location: String,
    #[serde(default)]
    pub avatar: String,
    #[serde(default)]
    pub accent_color: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Education {
    pub id: String,
    pub institution: String,
    pub degree: String,
    pub field: String,
    pub start_date: String,
    pub end_date: String,
    #[serde(default)]
    pub gpa: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub coursework: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Certificate {
    pub id: String,
    pub name: String,
    pub issuer: String,
    pub issue_date: String,
    #[serde(default)]
    pub expiry_date: String,
    #[serde(default)]
    pub credential_id: String,
    #[serde(default)]
    pub image: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Experience {
    pub id: String,
    pub company: String,
    pub position: String,
    pub start_date: String,
    /// `None` or `"present"` marks the current role.
    pub end_date: Option<String>,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub responsibilities: Vec<String>,
    #[serde(default)]
    pub technologies: Vec<String>,
    #[serde(default)]
    pub achievements: Vec<String>,
}

impl Experience {
    pub fn is_ongoing(&self) -> bool {
        dates::is_ongoing(self.end_date.as_deref())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectStatus {
    Completed,
    InProgress,
    Planned,
}

impl ProjectStatus {
    pub const ALL: [ProjectStatus; 3] = [Self::Completed, Self::InProgress, Self::Planned];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::InProgress => "in-progress",
            Self::Planned => "planned",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Completed => "Completed",
            Self::InProgress => "In progress",
            Self::Planned => "Planned",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ProjectLinks {
    #[serde(default)]
    pub github: String,
    #[serde(default)]
    pub live: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub technologies: Vec<String>,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub links: ProjectLinks,
    pub status: ProjectStatus,
    pub start_date: String,
    pub end_date: Option<String>,
}

impl Project {
    pub fn is_ongoing(&self) -> bool {
        dates::is_ongoing(self.end_date.as_deref())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResearchStatus {
    Published,
    InProgress,
    Submitted,
}

impl ResearchStatus {
    pub const ALL: [ResearchStatus; 3] = [Self::Published, Self::InProgress, Self::Submitted];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Published => "published",
            Self::InProgress => "in-progress",
            Self::Submitted => "submitted",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Published => "Published",
            Self::InProgress => "In progress",
            Self::Submitted => "Submitted",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ResearchLinks {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paper: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Research {
    pub id: String,
    pub title: String,
    pub description: String,
    pub status: ResearchStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publish_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub journal: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_completion: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authors: Option<Vec<String>>,
    #[serde(rename = "abstract", default)]
    pub abstract_text: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub links: ResearchLinks,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Social {
    #[serde(default)]
    pub github: String,
    #[serde(default)]
    pub linkedin: String,
    #[serde(default)]
    pub twitter: String,
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationItem {
    pub id: String,
    pub label: String,
    pub href: String,
}

/// Opaque, never-reused identifier for a newly created record.
pub fn new_record_id() -> String {
    Uuid::new_v4().simple().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_status_uses_kebab_case_on_the_wire() {
        let json = serde_json::to_string(&ProjectStatus::InProgress).unwrap();
        assert_eq!(json, "\"in-progress\"");
        assert_eq!(ProjectStatus::parse("planned"), Some(ProjectStatus::Planned));
        assert_eq!(ProjectStatus::parse("archived"), None);
    }

    #[test]
    fn research_abstract_keeps_its_json_name() {
        let defaults = bundled_defaults();
        let value = serde_json::to_value(&defaults.research[0]).unwrap();
        assert!(value.get("abstract").is_some());
        assert!(value.get("abstractText").is_none());
    }

    #[test]
    fn technologies_are_deduplicated_in_first_seen_order() {
        let mut doc = bundled_defaults();
        doc.projects.truncate(2);
        doc.projects[0].technologies = vec!["Rust".into(), "Axum".into()];
        doc.projects[1].technologies = vec!["Axum".into(), "SQLite".into()];
        assert_eq!(doc.project_technologies(), vec!["Rust", "Axum", "SQLite"]);
    }

    #[test]
    fn record_ids_are_unique() {
        let a = new_record_id();
        let b = new_record_id();
        assert_ne!(a, b);
        assert_eq!(a.len(), 32);
    }
}
