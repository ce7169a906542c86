//! Read-only view models built from the portfolio document.
//!
//! Nothing here mutates the document; filters and selections come from query
//! parameters and only shape what is rendered.

use std::cmp::Reverse;

use folio_core::dates::{format_month_long, format_month_short, format_range, recency_key};
use folio_core::{PortfolioDocument, ProjectStatus, ResearchStatus};

pub const ALL_FILTER: &str = "all";

#[derive(Debug, Clone)]
pub struct NavLink {
    pub label: String,
    pub href: String,
    pub active: bool,
}

pub fn nav_links(document: &PortfolioDocument, active_id: &str) -> Vec<NavLink> {
    document
        .navigation
        .iter()
        .map(|item| NavLink {
            label: item.label.clone(),
            href: item.href.clone(),
            active: item.id == active_id,
        })
        .collect()
}

/// Shared page frame: title, navigation and the store's error banner.
#[derive(Debug, Clone)]
pub struct Chrome {
    pub page_title: String,
    pub site_name: String,
    pub nav: Vec<NavLink>,
    pub store_error: Option<String>,
}

impl Chrome {
    pub fn new(
        document: &PortfolioDocument,
        active_id: &str,
        page_title: &str,
        store_error: Option<String>,
    ) -> Self {
        Self {
            page_title: page_title.to_string(),
            site_name: document.personal.name.clone(),
            nav: nav_links(document, active_id),
            store_error,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SocialLink {
    pub label: &'static str,
    pub href: String,
}

/// Non-empty social links in display order. Email renders as a mailto link.
pub fn social_links(document: &PortfolioDocument) -> Vec<SocialLink> {
    let s = &document.social;
    let mut links = Vec::new();
    let profiles = [
        ("GitHub", &s.github),
        ("LinkedIn", &s.linkedin),
        ("Twitter", &s.twitter),
    ];
    for (label, href) in profiles {
        if !href.is_empty() {
            links.push(SocialLink {
                label,
                href: href.clone(),
            });
        }
    }
    let email = if s.email.is_empty() { &document.personal.email } else { &s.email };
    if !email.is_empty() {
        links.push(SocialLink {
            label: "Email",
            href: format!("mailto:{email}"),
        });
    }
    links
}

pub fn first_name(full_name: &str) -> String {
    full_name.split_whitespace().next().unwrap_or_default().to_string()
}

#[derive(Debug, Clone)]
pub struct FilterChip {
    pub value: String,
    pub label: String,
    pub active: bool,
}

#[derive(Debug, Clone)]
pub struct ProjectCard {
    pub id: String,
    pub title: String,
    pub description: String,
    pub image: String,
    pub technologies: Vec<String>,
    pub features: Vec<String>,
    pub github: String,
    pub live: String,
    pub status: &'static str,
    pub status_label: &'static str,
    pub date_range: String,
}

fn selected(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty() && *v != ALL_FILTER)
}

/// `all` followed by each distinct project technology.
pub fn technology_chips(document: &PortfolioDocument, tech: Option<&str>) -> Vec<FilterChip> {
    let tech = selected(tech);
    let mut chips = vec![FilterChip {
        value: ALL_FILTER.to_string(),
        label: "All Projects".to_string(),
        active: tech.is_none(),
    }];
    chips.extend(document.project_technologies().into_iter().map(|t| FilterChip {
        active: tech == Some(t.as_str()),
        label: t.clone(),
        value: t,
    }));
    chips
}

/// Projects that list `tech` among their technologies, in document order.
pub fn projects_by_technology(
    document: &PortfolioDocument,
    tech: Option<&str>,
) -> Vec<ProjectCard> {
    let tech = selected(tech);
    document
        .projects
        .iter()
        .filter(|p| tech.map_or(true, |t| p.technologies.iter().any(|pt| pt == t)))
        .map(project_card)
        .collect()
}

pub fn status_chips(status: Option<&str>) -> Vec<FilterChip> {
    let status = selected(status).and_then(ProjectStatus::parse);
    let mut chips = vec![FilterChip {
        value: ALL_FILTER.to_string(),
        label: "All".to_string(),
        active: status.is_none(),
    }];
    chips.extend(ProjectStatus::ALL.into_iter().map(|s| FilterChip {
        value: s.as_str().to_string(),
        label: s.label().to_string(),
        active: status == Some(s),
    }));
    chips
}

/// Unknown status values fall back to showing everything.
pub fn projects_by_status(document: &PortfolioDocument, status: Option<&str>) -> Vec<ProjectCard> {
    let status = selected(status).and_then(ProjectStatus::parse);
    document
        .projects
        .iter()
        .filter(|p| status.map_or(true, |s| p.status == s))
        .map(project_card)
        .collect()
}

fn project_card(project: &folio_core::Project) -> ProjectCard {
    ProjectCard {
        id: project.id.clone(),
        title: project.title.clone(),
        description: project.description.clone(),
        image: project.image.clone(),
        technologies: project.technologies.clone(),
        features: project.features.clone(),
        github: project.links.github.clone(),
        live: project.links.live.clone(),
        status: project.status.as_str(),
        status_label: project.status.label(),
        date_range: format_range(&project.start_date, project.end_date.as_deref()),
    }
}

#[derive(Debug, Clone)]
pub struct ExperienceCard {
    pub company: String,
    pub position: String,
    pub location: String,
    pub description: String,
    pub date_range: String,
    pub current: bool,
    pub responsibilities: Vec<String>,
    pub technologies: Vec<String>,
    pub achievements: Vec<String>,
}

/// Newest first; current roles lead.
pub fn experience_timeline(document: &PortfolioDocument) -> Vec<ExperienceCard> {
    let mut entries = document.experience.iter().collect::<Vec<_>>();
    entries.sort_by_key(|e| Reverse(recency_key(&e.start_date, e.end_date.as_deref())));
    entries
        .into_iter()
        .map(|e| ExperienceCard {
            company: e.company.clone(),
            position: e.position.clone(),
            location: e.location.clone(),
            description: e.description.clone(),
            date_range: format_range(&e.start_date, e.end_date.as_deref()),
            current: e.is_ongoing(),
            responsibilities: e.responsibilities.clone(),
            technologies: e.technologies.clone(),
            achievements: e.achievements.clone(),
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct EducationCard {
    pub institution: String,
    pub degree: String,
    pub field: String,
    pub date_range: String,
    pub gpa: String,
    pub description: String,
    pub coursework: Vec<String>,
}

pub fn education_cards(document: &PortfolioDocument) -> Vec<EducationCard> {
    document
        .education
        .iter()
        .map(|e| EducationCard {
            institution: e.institution.clone(),
            degree: e.degree.clone(),
            field: e.field.clone(),
            date_range: format!(
                "{} - {}",
                format_month_short(&e.start_date),
                format_month_short(&e.end_date)
            ),
            gpa: e.gpa.clone(),
            description: e.description.clone(),
            coursework: e.coursework.clone(),
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct CertificateCard {
    pub name: String,
    pub issuer: String,
    pub issued: String,
    pub validity: String,
    pub credential_id: String,
}

pub fn certificate_cards(document: &PortfolioDocument) -> Vec<CertificateCard> {
    document
        .certificates
        .iter()
        .map(|c| CertificateCard {
            name: c.name.clone(),
            issuer: c.issuer.clone(),
            issued: format_month_short(&c.issue_date),
            validity: c.expiry_date.clone(),
            credential_id: c.credential_id.clone(),
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct SkillGroup {
    pub category: String,
    pub skills: Vec<String>,
}

pub fn skill_groups(document: &PortfolioDocument) -> Vec<SkillGroup> {
    document
        .skills
        .iter()
        .map(|(category, skills)| SkillGroup {
            category: capitalize(category),
            skills: skills.clone(),
        })
        .collect()
}

fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResearchStats {
    pub total: usize,
    pub published: usize,
    pub in_progress: usize,
    pub submitted: usize,
}

pub fn research_stats(document: &PortfolioDocument) -> ResearchStats {
    let count = |status: ResearchStatus| {
        document
            .research
            .iter()
            .filter(|r| r.status == status)
            .count()
    };
    ResearchStats {
        total: document.research.len(),
        published: count(ResearchStatus::Published),
        in_progress: count(ResearchStatus::InProgress),
        submitted: count(ResearchStatus::Submitted),
    }
}

#[derive(Debug, Clone)]
pub struct ResearchCard {
    pub id: String,
    pub title: String,
    pub description: String,
    pub status: &'static str,
    pub status_label: &'static str,
    pub when: String,
    pub journal: String,
    pub authors: String,
    pub abstract_text: String,
    pub keywords: Vec<String>,
    pub paper: String,
    pub code: String,
}

pub fn research_cards(document: &PortfolioDocument) -> Vec<ResearchCard> {
    document.research.iter().map(research_card).collect()
}

/// Entry shown in the detail panel; unknown ids select nothing.
pub fn research_detail(document: &PortfolioDocument, id: Option<&str>) -> Option<ResearchCard> {
    id.and_then(|id| document.research_entry(id)).map(research_card)
}

fn research_card(r: &folio_core::Research) -> ResearchCard {
    let when = match (&r.publish_date, &r.expected_completion) {
        (Some(date), _) => format_month_long(date),
        (None, Some(expected)) => format!("Expected: {expected}"),
        (None, None) => String::new(),
    };
    ResearchCard {
        id: r.id.clone(),
        title: r.title.clone(),
        description: r.description.clone(),
        status: r.status.as_str(),
        status_label: r.status.label(),
        when,
        journal: r.journal.clone().unwrap_or_default(),
        authors: r.authors.as_ref().map(|a| a.join(", ")).unwrap_or_default(),
        abstract_text: r.abstract_text.clone(),
        keywords: r.keywords.clone(),
        paper: r.links.paper.clone().unwrap_or_default(),
        code: r.links.code.clone().unwrap_or_default(),
    }
}
