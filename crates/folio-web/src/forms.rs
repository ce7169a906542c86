//! Decoding of submitted HTML forms.

use std::collections::BTreeMap;

use folio_core::FieldErrors;
use folio_onboarding::{
    PersonalForm, ProjectDraft, ProjectsForm, SkillsForm, SocialForm, Step, StepInput,
};
use serde::Deserialize;

pub type FormPairs = Vec<(String, String)>;

/// What the user asked for on the onboarding page besides plain submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectRowAction {
    Add,
    Remove(usize),
}

fn field<'a>(pairs: &'a FormPairs, name: &str) -> &'a str {
    pairs
        .iter()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.as_str())
        .unwrap_or_default()
}

/// Comma or newline separated list, trimmed, blanks dropped.
pub fn split_list(value: &str) -> Vec<String> {
    value
        .split([',', '\n'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .collect()
}

pub fn join_list(values: &[String]) -> String {
    values.join(", ")
}

pub fn row_action(pairs: &FormPairs) -> Option<ProjectRowAction> {
    match field(pairs, "action") {
        "add-project" => Some(ProjectRowAction::Add),
        other => other
            .strip_prefix("remove-project-")
            .and_then(|i| i.parse().ok())
            .map(ProjectRowAction::Remove),
    }
}

/// Project rows arrive as `projects[<i>][<field>]`; rows are ordered by index.
pub fn parse_projects(pairs: &FormPairs) -> ProjectsForm {
    let mut rows = BTreeMap::<usize, ProjectDraft>::new();
    for (key, value) in pairs {
        let Some(rest) = key.strip_prefix("projects[") else {
            continue;
        };
        let Some((index, rest)) = rest.split_once("][") else {
            continue;
        };
        let Ok(index) = index.parse::<usize>() else {
            continue;
        };
        let row = rows.entry(index).or_default();
        match rest.trim_end_matches(']') {
            "title" => row.title = value.clone(),
            "description" => row.description = value.clone(),
            "technologies" => row.technologies = split_list(value),
            "githubUrl" => row.github_url = value.trim().to_string(),
            "liveUrl" => row.live_url = value.trim().to_string(),
            _ => {}
        }
    }
    ProjectsForm {
        projects: rows.into_values().collect(),
    }
}

pub fn parse_step_input(step: Step, pairs: &FormPairs) -> Option<StepInput> {
    let input = match step {
        Step::PersonalInfo => StepInput::Personal(PersonalForm {
            name: field(pairs, "name").to_string(),
            title: field(pairs, "title").to_string(),
            bio: field(pairs, "bio").to_string(),
            email: field(pairs, "email").trim().to_string(),
            location: field(pairs, "location").to_string(),
        }),
        Step::Skills => StepInput::Skills(SkillsForm {
            frontend: split_list(field(pairs, "frontend")),
            backend: split_list(field(pairs, "backend")),
            tools: split_list(field(pairs, "tools")),
        }),
        Step::Projects => StepInput::Projects(parse_projects(pairs)),
        Step::Social => StepInput::Social(SocialForm {
            github: field(pairs, "github").trim().to_string(),
            linkedin: field(pairs, "linkedin").trim().to_string(),
            twitter: field(pairs, "twitter").trim().to_string(),
        }),
        Step::Complete => return None,
    };
    Some(input)
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

impl ContactForm {
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        if self.name.trim().is_empty() {
            errors.add("name", "Name is required");
        }
        if self.email.trim().is_empty() {
            errors.add("email", "Email is required");
        } else {
            errors.email("email", self.email.trim(), "Invalid email address");
        }
        if self.subject.trim().is_empty() {
            errors.add("subject", "Subject is required");
        }
        if self.message.is_empty() {
            errors.add("message", "Message is required");
        } else {
            errors.min_chars(
                "message",
                &self.message,
                10,
                "Message must be at least 10 characters",
            );
        }
        errors
    }
}
