//! Four-step onboarding wizard that populates the portfolio document.
//!
//! The flow is strictly linear: `PersonalInfo -> Skills -> Projects -> Social
//! -> Complete`. A step only advances when its form validates, and each
//! successful step issues exactly one kind of store update. Going back never
//! validates or persists anything.

use chrono::{NaiveDate, Utc};
use folio_core::{
    FieldErrors, NewProject, NewProjectLinks, PersonalInfoPatch, PortfolioDocument,
    ProjectStatus, SkillsPatch, SocialPatch,
};
use folio_storage::{DurableStorage, PortfolioStore};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

pub const CRATE_NAME: &str = "folio-onboarding";

pub const PROJECT_PLACEHOLDER_IMAGE: &str = "/images/project-placeholder.jpg";

/// Store operations the wizard needs. Implemented by [`PortfolioStore`]; tests
/// may substitute a recorder.
pub trait PortfolioEditor {
    fn document(&self) -> &PortfolioDocument;
    fn update_personal_info(&mut self, patch: PersonalInfoPatch);
    fn update_skills(&mut self, patch: SkillsPatch);
    fn add_project(&mut self, project: NewProject) -> String;
    fn update_social(&mut self, patch: SocialPatch);
}

impl<S: DurableStorage> PortfolioEditor for PortfolioStore<S> {
    fn document(&self) -> &PortfolioDocument {
        PortfolioStore::document(self)
    }

    fn update_personal_info(&mut self, patch: PersonalInfoPatch) {
        PortfolioStore::update_personal_info(self, patch)
    }

    fn update_skills(&mut self, patch: SkillsPatch) {
        PortfolioStore::update_skills(self, patch)
    }

    fn add_project(&mut self, project: NewProject) -> String {
        PortfolioStore::add_project(self, project)
    }

    fn update_social(&mut self, patch: SocialPatch) {
        PortfolioStore::update_social(self, patch)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Step {
    PersonalInfo,
    Skills,
    Projects,
    Social,
    Complete,
}

impl Step {
    /// Steps that carry a form, in order.
    pub const FORM_STEPS: [Step; 4] = [
        Self::PersonalInfo,
        Self::Skills,
        Self::Projects,
        Self::Social,
    ];

    pub fn index(&self) -> usize {
        match self {
            Self::PersonalInfo => 0,
            Self::Skills => 1,
            Self::Projects => 2,
            Self::Social => 3,
            Self::Complete => 4,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::PersonalInfo => "Personal Info",
            Self::Skills => "Skills",
            Self::Projects => "Projects",
            Self::Social => "Social Links",
            Self::Complete => "Complete",
        }
    }

    pub fn next(&self) -> Step {
        match self {
            Self::PersonalInfo => Self::Skills,
            Self::Skills => Self::Projects,
            Self::Projects => Self::Social,
            Self::Social | Self::Complete => Self::Complete,
        }
    }

    pub fn previous(&self) -> Step {
        match self {
            Self::PersonalInfo | Self::Skills => Self::PersonalInfo,
            Self::Projects => Self::Skills,
            Self::Social => Self::Projects,
            Self::Complete => Self::Complete,
        }
    }

    pub fn is_last_form(&self) -> bool {
        *self == Self::Social
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PersonalForm {
    pub name: String,
    pub title: String,
    pub bio: String,
    pub email: String,
    pub location: String,
}

impl PersonalForm {
    pub fn from_document(document: &PortfolioDocument) -> Self {
        let p = &document.personal;
        Self {
            name: p.name.clone(),
            title: p.title.clone(),
            bio: p.bio.clone(),
            email: p.email.clone(),
            location: p.location.clone(),
        }
    }

    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        errors.min_chars("name", &self.name, 2, "Name must be at least 2 characters");
        errors.min_chars("title", &self.title, 2, "Title must be at least 2 characters");
        errors.min_chars("bio", &self.bio, 50, "Bio must be at least 50 characters");
        errors.max_chars("bio", &self.bio, 500, "Bio must be less than 500 characters");
        errors.email("email", &self.email, "Invalid email address");
        errors.min_chars("location", &self.location, 2, "Location must be at least 2 characters");
        errors
    }

    fn into_patch(self) -> PersonalInfoPatch {
        PersonalInfoPatch {
            name: Some(self.name),
            title: Some(self.title),
            bio: Some(self.bio),
            email: Some(self.email),
            location: Some(self.location),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SkillsForm {
    pub frontend: Vec<String>,
    pub backend: Vec<String>,
    pub tools: Vec<String>,
}

impl SkillsForm {
    pub fn from_document(document: &PortfolioDocument) -> Self {
        let category = |name: &str| document.skills.get(name).cloned().unwrap_or_default();
        Self {
            frontend: category("frontend"),
            backend: category("backend"),
            tools: category("tools"),
        }
    }

    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        errors.non_empty_list("frontend", &self.frontend, "Add at least one frontend skill");
        errors.non_empty_list("backend", &self.backend, "Add at least one backend skill");
        errors.non_empty_list("tools", &self.tools, "Add at least one tool");
        errors
    }

    fn into_patch(self) -> SkillsPatch {
        SkillsPatch::default()
            .category("frontend", self.frontend)
            .category("backend", self.backend)
            .category("tools", self.tools)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProjectDraft {
    pub title: String,
    pub description: String,
    pub technologies: Vec<String>,
    pub github_url: String,
    pub live_url: String,
}

impl ProjectDraft {
    fn into_new_project(self, today: NaiveDate) -> NewProject {
        let date = today.format("%Y-%m-%d").to_string();
        NewProject {
            title: self.title,
            description: self.description,
            image: PROJECT_PLACEHOLDER_IMAGE.to_string(),
            technologies: self.technologies,
            features: Vec::new(),
            links: Some(NewProjectLinks {
                github: non_empty(self.github_url),
                live: non_empty(self.live_url),
            }),
            status: ProjectStatus::Completed,
            start_date: date.clone(),
            end_date: Some(date),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectsForm {
    pub projects: Vec<ProjectDraft>,
}

impl Default for ProjectsForm {
    /// One blank row to fill in.
    fn default() -> Self {
        Self {
            projects: vec![ProjectDraft::default()],
        }
    }
}

impl ProjectsForm {
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        errors.non_empty_list("projects", &self.projects, "Add at least one project");
        for (i, project) in self.projects.iter().enumerate() {
            let field = |name: &str| format!("projects[{i}].{name}");
            errors.min_chars(&field("title"), &project.title, 2, "Title is required");
            errors.min_chars(
                &field("description"),
                &project.description,
                20,
                "Description must be at least 20 characters",
            );
            errors.non_empty_list(
                &field("technologies"),
                &project.technologies,
                "Add at least one technology",
            );
            errors.optional_url(&field("githubUrl"), &project.github_url, "Invalid GitHub URL");
            errors.optional_url(&field("liveUrl"), &project.live_url, "Invalid live URL");
        }
        errors
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SocialForm {
    pub github: String,
    pub linkedin: String,
    pub twitter: String,
}

impl SocialForm {
    pub fn from_document(document: &PortfolioDocument) -> Self {
        let s = &document.social;
        Self {
            github: s.github.clone(),
            linkedin: s.linkedin.clone(),
            twitter: s.twitter.clone(),
        }
    }

    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        errors.optional_url("github", &self.github, "Invalid GitHub URL");
        errors.optional_url("linkedin", &self.linkedin, "Invalid LinkedIn URL");
        errors.optional_url("twitter", &self.twitter, "Invalid Twitter URL");
        errors
    }

    /// The contact email always follows the personal email.
    fn into_patch(self, personal_email: String) -> SocialPatch {
        SocialPatch {
            github: Some(self.github),
            linkedin: Some(self.linkedin),
            twitter: Some(self.twitter),
            email: Some(personal_email),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepInput {
    Personal(PersonalForm),
    Skills(SkillsForm),
    Projects(ProjectsForm),
    Social(SocialForm),
}

impl StepInput {
    pub fn step(&self) -> Step {
        match self {
            Self::Personal(_) => Step::PersonalInfo,
            Self::Skills(_) => Step::Skills,
            Self::Projects(_) => Step::Projects,
            Self::Social(_) => Step::Social,
        }
    }

    fn validate(&self) -> FieldErrors {
        match self {
            Self::Personal(form) => form.validate(),
            Self::Skills(form) => form.validate(),
            Self::Projects(form) => form.validate(),
            Self::Social(form) => form.validate(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Validation passed, the store was updated and the flow moved on.
    Advanced { to: Step, notice: &'static str },
    /// The last step passed and the completion callback ran.
    Completed { notice: &'static str },
    /// Validation failed; nothing was saved and the step is unchanged.
    Rejected(FieldErrors),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlowError {
    #[error("submitted {got:?} input while on the {expected:?} step")]
    StepMismatch { expected: Step, got: Step },
    #[error("onboarding is already complete")]
    AlreadyComplete,
}

/// Last values submitted per step, so moving back shows what was entered.
#[derive(Debug, Clone, Default)]
struct Drafts {
    personal: Option<PersonalForm>,
    skills: Option<SkillsForm>,
    projects: Option<ProjectsForm>,
    social: Option<SocialForm>,
}

#[derive(Debug, Clone)]
pub struct OnboardingFlow {
    step: Step,
    notice: Option<&'static str>,
    drafts: Drafts,
    fixed_date: Option<NaiveDate>,
}

impl Default for OnboardingFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl OnboardingFlow {
    pub fn new() -> Self {
        Self {
            step: Step::PersonalInfo,
            notice: None,
            drafts: Drafts::default(),
            fixed_date: None,
        }
    }

    /// Stamp created projects with `date` instead of today.
    pub fn with_fixed_date(mut self, date: NaiveDate) -> Self {
        self.fixed_date = Some(date);
        self
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn is_complete(&self) -> bool {
        self.step == Step::Complete
    }

    /// Transient success message from the last accepted step, consumed on read.
    pub fn take_notice(&mut self) -> Option<&'static str> {
        self.notice.take()
    }

    /// Progress through the four form steps, `1..=4`.
    pub fn progress(&self) -> usize {
        (self.step.index() + 1).min(Step::FORM_STEPS.len())
    }

    pub fn personal_form(&self, document: &PortfolioDocument) -> PersonalForm {
        self.drafts
            .personal
            .clone()
            .unwrap_or_else(|| PersonalForm::from_document(document))
    }

    pub fn skills_form(&self, document: &PortfolioDocument) -> SkillsForm {
        self.drafts
            .skills
            .clone()
            .unwrap_or_else(|| SkillsForm::from_document(document))
    }

    pub fn projects_form(&self) -> ProjectsForm {
        self.drafts.projects.clone().unwrap_or_default()
    }

    pub fn social_form(&self, document: &PortfolioDocument) -> SocialForm {
        self.drafts
            .social
            .clone()
            .unwrap_or_else(|| SocialForm::from_document(document))
    }

    /// Unconditional step back; a no-op on the first step and once complete.
    pub fn previous(&mut self) {
        self.notice = None;
        self.step = self.step.previous();
    }

    /// Validate `input` for the current step and, when it passes, apply it to
    /// `editor`. On the last step `on_complete` runs instead of advancing to
    /// another form.
    pub fn submit<E, F>(
        &mut self,
        input: StepInput,
        editor: &mut E,
        on_complete: F,
    ) -> Result<Outcome, FlowError>
    where
        E: PortfolioEditor + ?Sized,
        F: FnOnce(),
    {
        if self.is_complete() {
            return Err(FlowError::AlreadyComplete);
        }
        if input.step() != self.step {
            return Err(FlowError::StepMismatch {
                expected: self.step,
                got: input.step(),
            });
        }

        self.notice = None;
        let errors = input.validate();
        self.keep_draft(input.clone());
        if !errors.is_empty() {
            debug!(step = ?self.step, failures = errors.len(), "onboarding step rejected");
            return Ok(Outcome::Rejected(errors));
        }

        let notice = match input {
            StepInput::Personal(form) => {
                editor.update_personal_info(form.into_patch());
                "Personal info saved!"
            }
            StepInput::Skills(form) => {
                editor.update_skills(form.into_patch());
                "Skills saved!"
            }
            StepInput::Projects(form) => {
                let today = self.today();
                for draft in form.projects {
                    editor.add_project(draft.into_new_project(today));
                }
                "Projects saved!"
            }
            StepInput::Social(form) => {
                let email = editor.document().personal.email.clone();
                editor.update_social(form.into_patch(email));
                "Social links saved!"
            }
        };
        self.notice = Some(notice);

        if self.step.is_last_form() {
            self.step = Step::Complete;
            info!("onboarding complete");
            on_complete();
            return Ok(Outcome::Completed { notice });
        }

        self.step = self.step.next();
        debug!(step = ?self.step, "onboarding advanced");
        Ok(Outcome::Advanced { to: self.step, notice })
    }

    /// Hold on to form values without validating or saving them, e.g. while
    /// rows are added to or removed from the projects form.
    pub fn keep_draft(&mut self, input: StepInput) {
        match input {
            StepInput::Personal(form) => self.drafts.personal = Some(form),
            StepInput::Skills(form) => self.drafts.skills = Some(form),
            StepInput::Projects(form) => self.drafts.projects = Some(form),
            StepInput::Social(form) => self.drafts.social = Some(form),
        }
    }

    fn today(&self) -> NaiveDate {
        self.fixed_date.unwrap_or_else(|| Utc::now().date_naive())
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}
