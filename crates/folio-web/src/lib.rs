//! Axum + Askama site for the Folio portfolio.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use askama::Template;
use axum::{
    extract::{Form, Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Json, Router,
};
use folio_core::{FieldErrors, PortfolioDocument};
use folio_onboarding::{
    FlowError, OnboardingFlow, Outcome, PersonalForm, ProjectDraft, SocialForm, Step, StepInput,
};
use folio_storage::{BoxedStorage, FileStorage, PortfolioStore, StoreOptions, DEFAULT_STORAGE_KEY};
use serde::Deserialize;
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tracing::info;

pub mod forms;
pub mod views;

use forms::{
    join_list, parse_projects, parse_step_input, row_action, ContactForm, FormPairs,
    ProjectRowAction,
};
use views::{
    certificate_cards, education_cards, experience_timeline, first_name, projects_by_status,
    projects_by_technology, research_cards, research_detail, research_stats, skill_groups,
    social_links, status_chips, technology_chips, CertificateCard, Chrome, EducationCard,
    ExperienceCard, FilterChip, NavLink, ProjectCard, ResearchCard, ResearchStats, SkillGroup,
    SocialLink,
};

pub const CRATE_NAME: &str = "folio-web";

const APP_CSS: &str = include_str!("../assets/app.css");

#[derive(Debug, Clone)]
pub struct WebConfig {
    pub port: u16,
    pub data_dir: PathBuf,
    pub storage_key: String,
    pub contact_delay: Duration,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            port: 8000,
            data_dir: PathBuf::from("./.folio"),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            contact_delay: Duration::from_millis(2000),
        }
    }
}

impl WebConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            port: std::env::var("FOLIO_WEB_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.port),
            data_dir: std::env::var("FOLIO_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            storage_key: std::env::var("FOLIO_STORAGE_KEY").unwrap_or(defaults.storage_key),
            contact_delay: std::env::var("FOLIO_CONTACT_DELAY_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(defaults.contact_delay),
        }
    }

    pub fn open_store(&self) -> PortfolioStore<BoxedStorage> {
        let storage: BoxedStorage = Box::new(FileStorage::new(&self.data_dir));
        PortfolioStore::load_with(
            storage,
            StoreOptions {
                key: self.storage_key.clone(),
                ..StoreOptions::default()
            },
        )
    }
}

/// Shared request state. The store and the onboarding flow are each behind one
/// lock; when both are needed the store is locked first.
pub struct AppState {
    pub store: Mutex<PortfolioStore<BoxedStorage>>,
    pub onboarding: Mutex<OnboardingFlow>,
    pub contact_delay: Duration,
}

impl AppState {
    pub fn new(store: PortfolioStore<BoxedStorage>, contact_delay: Duration) -> Self {
        Self {
            store: Mutex::new(store),
            onboarding: Mutex::new(OnboardingFlow::new()),
            contact_delay,
        }
    }

    pub fn from_config(config: &WebConfig) -> Self {
        Self::new(config.open_store(), config.contact_delay)
    }
}

#[derive(Template)]
#[template(path = "home.html")]
struct HomeTemplate {
    chrome: Chrome,
    first_name: String,
    name: String,
    title: String,
    bio: String,
    location: String,
    avatar: String,
    socials: Vec<SocialLink>,
    sections: Vec<NavLink>,
}

#[derive(Template)]
#[template(path = "education.html")]
struct EducationTemplate {
    chrome: Chrome,
    education: Vec<EducationCard>,
    certificates: Vec<CertificateCard>,
    skills: Vec<SkillGroup>,
}

#[derive(Template)]
#[template(path = "experience.html")]
struct ExperienceTemplate {
    chrome: Chrome,
    experience: Vec<ExperienceCard>,
}

#[derive(Template)]
#[template(path = "projects.html")]
struct ProjectsTemplate {
    chrome: Chrome,
    chips: Vec<FilterChip>,
    projects: Vec<ProjectCard>,
}

#[derive(Template)]
#[template(path = "portfolio.html")]
struct PortfolioTemplate {
    chrome: Chrome,
    name: String,
    title: String,
    bio: String,
    welcome: bool,
    chips: Vec<FilterChip>,
    projects: Vec<ProjectCard>,
    socials: Vec<SocialLink>,
}

#[derive(Template)]
#[template(path = "research.html")]
struct ResearchTemplate {
    chrome: Chrome,
    stats: ResearchStats,
    research: Vec<ResearchCard>,
    detail: Option<ResearchCard>,
}

#[derive(Template)]
#[template(path = "contact.html")]
struct ContactTemplate {
    chrome: Chrome,
    email: String,
    location: String,
    socials: Vec<SocialLink>,
    form: ContactForm,
    errors: FieldErrors,
    notice: Option<String>,
}

impl ContactTemplate {
    fn err(&self, field: &str) -> String {
        self.errors.get(field).unwrap_or_default().to_string()
    }
}

#[derive(Debug, Clone)]
struct StepBadge {
    title: &'static str,
    reached: bool,
}

#[derive(Debug, Clone)]
struct ProjectRow {
    index: usize,
    title: String,
    description: String,
    technologies: String,
    github_url: String,
    live_url: String,
}

#[derive(Template)]
#[template(path = "onboarding.html")]
struct OnboardingTemplate {
    chrome: Chrome,
    steps: Vec<StepBadge>,
    progress_percent: usize,
    current: &'static str,
    is_first: bool,
    is_last: bool,
    notice: Option<String>,
    errors: FieldErrors,
    personal: PersonalForm,
    bio_len: usize,
    frontend: String,
    backend: String,
    tools: String,
    projects: Vec<ProjectRow>,
    can_remove_rows: bool,
    social: SocialForm,
}

impl OnboardingTemplate {
    fn err(&self, field: &str) -> String {
        self.errors.get(field).unwrap_or_default().to_string()
    }

    fn row_err(&self, index: &usize, field: &str) -> String {
        self.err(&format!("projects[{index}].{field}"))
    }
}

#[derive(Debug, Deserialize, Default)]
struct ProjectsQuery {
    tech: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct PortfolioQuery {
    status: Option<String>,
    welcome: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct ResearchQuery {
    id: Option<String>,
}

type SharedState = Arc<AppState>;

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(home_handler))
        .route("/education", get(education_handler))
        .route("/experience", get(experience_handler))
        .route("/projects", get(projects_handler))
        .route("/portfolio", get(portfolio_handler))
        .route("/research", get(research_handler))
        .route("/contact", get(contact_page_handler).post(contact_submit_handler))
        .route("/onboarding", get(onboarding_page_handler))
        .route("/onboarding/next", post(onboarding_next_handler))
        .route("/onboarding/previous", post(onboarding_previous_handler))
        .route("/onboarding/restart", post(onboarding_restart_handler))
        .route("/reset", post(reset_handler))
        .route("/api/portfolio", get(api_portfolio_handler))
        .route("/assets/app.css", get(app_css_handler))
        .with_state(Arc::new(state))
}

pub async fn serve(config: WebConfig) -> anyhow::Result<()> {
    let state = AppState::from_config(&config);
    let listener = TcpListener::bind(("0.0.0.0", config.port)).await?;
    info!(
        port = config.port,
        data_dir = %config.data_dir.display(),
        "serving portfolio"
    );
    axum::serve(listener, app(state)).await?;
    Ok(())
}

pub async fn serve_from_env() -> anyhow::Result<()> {
    serve(WebConfig::from_env()).await
}

fn store_error(store: &PortfolioStore<BoxedStorage>) -> Option<String> {
    store.error().map(ToString::to_string)
}

async fn home_handler(State(state): State<SharedState>) -> Response {
    let store = state.store.lock().await;
    let doc = store.document();
    let p = &doc.personal;
    render_html(HomeTemplate {
        chrome: Chrome::new(doc, "home", &p.title, store_error(&store)),
        first_name: first_name(&p.name),
        name: p.name.clone(),
        title: p.title.clone(),
        bio: p.bio.clone(),
        location: p.location.clone(),
        avatar: p.avatar.clone(),
        socials: social_links(doc),
        sections: views::nav_links(doc, "home")
            .into_iter()
            .filter(|l| !l.active)
            .collect(),
    })
}

async fn education_handler(State(state): State<SharedState>) -> Response {
    let store = state.store.lock().await;
    let doc = store.document();
    render_html(EducationTemplate {
        chrome: Chrome::new(doc, "education", "Education", store_error(&store)),
        education: education_cards(doc),
        certificates: certificate_cards(doc),
        skills: skill_groups(doc),
    })
}

async fn experience_handler(State(state): State<SharedState>) -> Response {
    let store = state.store.lock().await;
    let doc = store.document();
    render_html(ExperienceTemplate {
        chrome: Chrome::new(doc, "experience", "Experience", store_error(&store)),
        experience: experience_timeline(doc),
    })
}

async fn projects_handler(
    State(state): State<SharedState>,
    Query(query): Query<ProjectsQuery>,
) -> Response {
    let store = state.store.lock().await;
    let doc = store.document();
    let tech = query.tech.as_deref();
    render_html(ProjectsTemplate {
        chrome: Chrome::new(doc, "projects", "Projects", store_error(&store)),
        chips: technology_chips(doc, tech),
        projects: projects_by_technology(doc, tech),
    })
}

async fn portfolio_handler(
    State(state): State<SharedState>,
    Query(query): Query<PortfolioQuery>,
) -> Response {
    let store = state.store.lock().await;
    let doc = store.document();
    let status = query.status.as_deref();
    render_html(PortfolioTemplate {
        chrome: Chrome::new(doc, "portfolio", "Portfolio", store_error(&store)),
        name: doc.personal.name.clone(),
        title: doc.personal.title.clone(),
        bio: doc.personal.bio.clone(),
        welcome: query.welcome.is_some(),
        chips: status_chips(status),
        projects: projects_by_status(doc, status),
        socials: social_links(doc),
    })
}

async fn research_handler(
    State(state): State<SharedState>,
    Query(query): Query<ResearchQuery>,
) -> Response {
    let store = state.store.lock().await;
    let doc = store.document();
    render_html(ResearchTemplate {
        chrome: Chrome::new(doc, "research", "Research", store_error(&store)),
        stats: research_stats(doc),
        research: research_cards(doc),
        detail: research_detail(doc, query.id.as_deref()),
    })
}

fn contact_page(
    doc: &PortfolioDocument,
    store_error: Option<String>,
    form: ContactForm,
    errors: FieldErrors,
    notice: Option<String>,
) -> ContactTemplate {
    ContactTemplate {
        chrome: Chrome::new(doc, "contact", "Contact", store_error),
        email: doc.personal.email.clone(),
        location: doc.personal.location.clone(),
        socials: social_links(doc),
        form,
        errors,
        notice,
    }
}

async fn contact_page_handler(State(state): State<SharedState>) -> Response {
    let store = state.store.lock().await;
    render_html(contact_page(
        store.document(),
        store_error(&store),
        ContactForm::default(),
        FieldErrors::new(),
        None,
    ))
}

/// Validates the message, then simulates delivery. Nothing is sent or stored.
async fn contact_submit_handler(
    State(state): State<SharedState>,
    Form(form): Form<ContactForm>,
) -> Response {
    let errors = form.validate();
    if !errors.is_empty() {
        let store = state.store.lock().await;
        let page = contact_page(store.document(), store_error(&store), form, errors, None);
        return render_html_with_status(StatusCode::UNPROCESSABLE_ENTITY, page);
    }

    tokio::time::sleep(state.contact_delay).await;
    info!(subject = %form.subject, "contact message accepted");

    let store = state.store.lock().await;
    render_html(contact_page(
        store.document(),
        store_error(&store),
        ContactForm::default(),
        FieldErrors::new(),
        Some("Message sent successfully! I'll get back to you soon.".to_string()),
    ))
}

fn onboarding_page(
    store: &PortfolioStore<BoxedStorage>,
    flow: &mut OnboardingFlow,
    errors: FieldErrors,
) -> OnboardingTemplate {
    let doc = store.document();
    let step = flow.step();
    let personal = flow.personal_form(doc);
    let skills = flow.skills_form(doc);
    let projects = flow.projects_form().projects;
    OnboardingTemplate {
        chrome: Chrome::new(doc, "onboarding", "Build your portfolio", store_error(store)),
        steps: Step::FORM_STEPS
            .iter()
            .map(|s| StepBadge {
                title: s.title(),
                reached: s.index() <= step.index(),
            })
            .collect(),
        progress_percent: flow.progress() * 100 / Step::FORM_STEPS.len(),
        current: match step {
            Step::PersonalInfo => "personal-info",
            Step::Skills => "skills",
            Step::Projects => "projects",
            Step::Social => "social",
            Step::Complete => "complete",
        },
        is_first: step == Step::PersonalInfo,
        is_last: step.is_last_form(),
        notice: flow.take_notice().map(ToString::to_string),
        errors,
        bio_len: personal.bio.chars().count(),
        personal,
        frontend: join_list(&skills.frontend),
        backend: join_list(&skills.backend),
        tools: join_list(&skills.tools),
        can_remove_rows: projects.len() > 1,
        projects: projects
            .into_iter()
            .enumerate()
            .map(|(index, p)| ProjectRow {
                index,
                title: p.title,
                description: p.description,
                technologies: join_list(&p.technologies),
                github_url: p.github_url,
                live_url: p.live_url,
            })
            .collect(),
        social: flow.social_form(doc),
    }
}

async fn onboarding_page_handler(State(state): State<SharedState>) -> Response {
    let store = state.store.lock().await;
    let mut flow = state.onboarding.lock().await;
    render_html(onboarding_page(&store, &mut flow, FieldErrors::new()))
}

async fn onboarding_next_handler(
    State(state): State<SharedState>,
    Form(pairs): Form<FormPairs>,
) -> Response {
    let mut store = state.store.lock().await;
    let mut flow = state.onboarding.lock().await;
    let step = flow.step();

    if step == Step::Projects {
        if let Some(action) = row_action(&pairs) {
            let mut form = parse_projects(&pairs);
            match action {
                ProjectRowAction::Add => form.projects.push(ProjectDraft::default()),
                ProjectRowAction::Remove(index)
                    if index < form.projects.len() && form.projects.len() > 1 =>
                {
                    form.projects.remove(index);
                }
                ProjectRowAction::Remove(_) => {}
            }
            flow.keep_draft(StepInput::Projects(form));
            return render_html(onboarding_page(&store, &mut flow, FieldErrors::new()));
        }
    }

    let Some(input) = parse_step_input(step, &pairs) else {
        return flow_conflict(FlowError::AlreadyComplete);
    };
    match flow.submit(input, &mut *store, || info!("portfolio onboarding finished")) {
        Ok(Outcome::Completed { .. }) => Redirect::to("/portfolio?welcome=1").into_response(),
        Ok(Outcome::Advanced { .. }) => {
            render_html(onboarding_page(&store, &mut flow, FieldErrors::new()))
        }
        Ok(Outcome::Rejected(errors)) => render_html_with_status(
            StatusCode::UNPROCESSABLE_ENTITY,
            onboarding_page(&store, &mut flow, errors),
        ),
        Err(err) => flow_conflict(err),
    }
}

fn flow_conflict(err: FlowError) -> Response {
    (StatusCode::CONFLICT, Html(err.to_string())).into_response()
}

async fn onboarding_previous_handler(State(state): State<SharedState>) -> Response {
    let store = state.store.lock().await;
    let mut flow = state.onboarding.lock().await;
    flow.previous();
    render_html(onboarding_page(&store, &mut flow, FieldErrors::new()))
}

async fn onboarding_restart_handler(State(state): State<SharedState>) -> Response {
    let mut flow = state.onboarding.lock().await;
    *flow = OnboardingFlow::new();
    Redirect::to("/onboarding").into_response()
}

async fn reset_handler(State(state): State<SharedState>) -> Response {
    let mut store = state.store.lock().await;
    store.reset_data();
    info!("portfolio data reset to defaults");
    Redirect::to("/").into_response()
}

async fn api_portfolio_handler(State(state): State<SharedState>) -> Response {
    let store = state.store.lock().await;
    Json(store.document().clone()).into_response()
}

async fn app_css_handler() -> Response {
    ([(header::CONTENT_TYPE, "text/css; charset=utf-8")], APP_CSS).into_response()
}

fn render_html<T: Template>(tpl: T) -> Response {
    render_html_with_status(StatusCode::OK, tpl)
}

fn render_html_with_status<T: Template>(status: StatusCode, tpl: T) -> Response {
    match tpl.render() {
        Ok(html) => (status, Html(html)).into_response(),
        Err(err) => server_error(anyhow::anyhow!(err.to_string())),
    }
}

fn server_error(err: anyhow::Error) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Html(format!("Server error: {}", err)),
    )
        .into_response()
}
