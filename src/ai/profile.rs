//! Who the assistant speaks for and which parts of the site it can
//! send visitors to. Rendered into the system prompt.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Contact {
    pub linkedin: String,
    pub email: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Section {
    pub id: String,
    pub title: String,
    pub description: String,
    /// Phrases that should send the visitor to this section.
    pub triggers: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SiteProfile {
    pub name: String,
    pub role: String,
    pub experience: String,
    pub expertise: Vec<String>,
    pub current_role: String,
    pub previous_roles: Vec<String>,
    pub projects: Vec<String>,
    pub skills: Vec<String>,
    pub location: String,
    pub contact: Contact,
    pub sections: Vec<Section>,
}

impl SiteProfile {
    /// Read a profile from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read profile {}", path.display()))?;
        let profile = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse profile {}", path.display()))?;
        Ok(profile)
    }

    /// The profile at `path`, or the built in one when there is none.
    pub fn load_or_default(path: Option<&str>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn section(id: &str, title: &str, description: &str, triggers: &[&str]) -> Section {
    Section {
        id: id.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        triggers: strings(triggers),
    }
}

impl Default for SiteProfile {
    fn default() -> Self {
        Self {
            name: "Israel Teneda".to_string(),
            role: "Frontend Developer specializing in e-commerce platforms".to_string(),
            experience: "5+ years as a Software Engineer".to_string(),
            expertise: strings(&["Shopify Plus", "React", "TypeScript", "Python", "E-commerce"]),
            current_role: "Shopify Developer at Lyra Collective".to_string(),
            previous_roles: strings(&[
                "Frontend Engineer at Brandable",
                "React/Python Developer at Ioet (contractor for Pair Eyewear and Warby Parker)",
                "Software Consultant (Freelance)",
                "Software Developer at Mivilsoft",
            ]),
            projects: strings(&[
                "Lyra Collective Brand Storefronts (Ever, Lola)",
                "Brandable Analytics Platform",
                "Pair Eyewear E-commerce",
                "Warby Parker Finance Integration",
                "Electronic Invoicing System 'Verónica'",
            ]),
            skills: strings(&[
                "Shopify Plus",
                "React",
                "TypeScript",
                "Python",
                "GraphQL",
                "Liquid",
                "Material UI",
                "Django",
                "Flutter",
            ]),
            location: "Remote".to_string(),
            contact: Contact {
                linkedin: "https://linkedin.com/in/israteneda".to_string(),
                email: "Available through contact form".to_string(),
            },
            sections: vec![
                section(
                    "about",
                    "About Me",
                    "Background and expertise",
                    &["about you", "who are you", "background"],
                ),
                section(
                    "experience",
                    "Professional Experience",
                    "Work history and roles",
                    &["experience", "work history", "previous jobs", "career"],
                ),
                section(
                    "projects",
                    "Projects",
                    "Portfolio of work",
                    &["projects", "portfolio", "what have you built", "show me your work"],
                ),
                section(
                    "testimonials",
                    "Testimonials",
                    "What colleagues say",
                    &["testimonials", "what people say", "recommendations", "feedback"],
                ),
                section(
                    "clients",
                    "Clients",
                    "Companies worked with",
                    &["clients", "companies", "who have you worked with"],
                ),
                section(
                    "contact",
                    "Contact",
                    "Ways to get in touch",
                    &["contact", "get in touch", "how to reach", "send email"],
                ),
            ],
        }
    }
}
