//! Partial updates accepted by the store's section operations.
//!
//! Each patch overwrites exactly the fields it carries and leaves the rest of
//! the section alone. Applying the same patch twice is the same as applying it
//! once.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{PersonalInfo, Project, ProjectLinks, ProjectStatus, SkillMap, Social};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PersonalInfoPatch {
    pub name: Option<String>,
    pub title: Option<String>,
    pub bio: Option<String>,
    pub email: Option<String>,
    pub location: Option<String>,
    pub avatar: Option<String>,
    pub accent_color: Option<String>,
}

impl PersonalInfoPatch {
    pub fn apply_to(self, personal: &mut PersonalInfo) {
        overwrite(&mut personal.name, self.name);
        overwrite(&mut personal.title, self.title);
        overwrite(&mut personal.bio, self.bio);
        overwrite(&mut personal.email, self.email);
        overwrite(&mut personal.location, self.location);
        overwrite(&mut personal.avatar, self.avatar);
        overwrite(&mut personal.accent_color, self.accent_color);
    }
}

/// Named skill categories to replace wholesale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct SkillsPatch(pub BTreeMap<String, Vec<String>>);

impl SkillsPatch {
    pub fn category(mut self, name: impl Into<String>, skills: Vec<String>) -> Self {
        self.0.insert(name.into(), skills);
        self
    }

    pub fn apply_to(self, skills: &mut SkillMap) {
        for (category, list) in self.0 {
            skills.insert(category, list);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SocialPatch {
    pub github: Option<String>,
    pub linkedin: Option<String>,
    pub twitter: Option<String>,
    pub email: Option<String>,
}

impl SocialPatch {
    pub fn apply_to(self, social: &mut Social) {
        overwrite(&mut social.github, self.github);
        overwrite(&mut social.linkedin, self.linkedin);
        overwrite(&mut social.twitter, self.twitter);
        overwrite(&mut social.email, self.email);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct NewProjectLinks {
    pub github: Option<String>,
    pub live: Option<String>,
}

/// A project as submitted for creation; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProject {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub technologies: Vec<String>,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub links: Option<NewProjectLinks>,
    pub status: ProjectStatus,
    pub start_date: String,
    pub end_date: Option<String>,
}

impl NewProject {
    /// Missing links become empty strings.
    pub fn into_project(self, id: String) -> Project {
        let links = self.links.unwrap_or_default();
        Project {
            id,
            title: self.title,
            description: self.description,
            image: self.image,
            technologies: self.technologies,
            features: self.features,
            links: ProjectLinks {
                github: links.github.unwrap_or_default(),
                live: links.live.unwrap_or_default(),
            },
            status: self.status,
            start_date: self.start_date,
            end_date: self.end_date,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProjectPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub technologies: Option<Vec<String>>,
    pub features: Option<Vec<String>>,
    pub links: Option<ProjectLinks>,
    pub status: Option<ProjectStatus>,
    pub start_date: Option<String>,
    /// `Some(None)` marks the project as ongoing again.
    pub end_date: Option<Option<String>>,
}

impl ProjectPatch {
    pub fn apply_to(self, project: &mut Project) {
        overwrite(&mut project.title, self.title);
        overwrite(&mut project.description, self.description);
        overwrite(&mut project.image, self.image);
        overwrite(&mut project.technologies, self.technologies);
        overwrite(&mut project.features, self.features);
        overwrite(&mut project.links, self.links);
        overwrite(&mut project.status, self.status);
        overwrite(&mut project.start_date, self.start_date);
        overwrite(&mut project.end_date, self.end_date);
    }
}

fn overwrite<T>(slot: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *slot = value;
    }
}
