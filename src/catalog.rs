//! Static career template catalog.
//!
//! Templates are shipped configuration: they never change at runtime. The
//! catalog is an owned value injected into the service at construction so
//! tests can run against alternate catalogs.

use serde::Serialize;

pub const SOFTWARE_ENGINEER: &str = "Software Engineer";
pub const DATA_SCIENTIST: &str = "Data Scientist";
pub const PRODUCT_MANAGER: &str = "Product Manager";
pub const UX_DESIGNER: &str = "UX Designer";

#[derive(Clone, Debug, Serialize)]
pub struct StepTemplate {
    pub title: String,
    pub description: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct CareerTemplate {
    /// Stable career key, e.g. "Data Scientist".
    pub key: String,
    pub title: String,
    pub description: String,
    pub steps: Vec<StepTemplate>,
    pub skills: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct TemplateCatalog {
    templates: Vec<CareerTemplate>,
}

impl TemplateCatalog {
    pub fn new(templates: Vec<CareerTemplate>) -> Self {
        Self { templates }
    }

    /// The catalog shipped with the application.
    pub fn builtin() -> Self {
        Self::new(vec![
            template(
                SOFTWARE_ENGINEER,
                "Software Engineer Path",
                "Master the art of building software applications.",
                &[
                    ("Learn HTML/CSS/JS", "The building blocks of the web."),
                    ("Master React", "Build dynamic user interfaces."),
                    ("Learn Backend (Node/Convex)", "Handle data and server logic."),
                    ("Build a Portfolio", "Showcase your projects."),
                    ("Apply for Jobs", "Start your career."),
                ],
                &["JavaScript", "React", "Node.js", "Databases"],
            ),
            template(
                DATA_SCIENTIST,
                "Data Scientist Path",
                "Extract insights from data to drive decisions.",
                &[
                    ("Learn Python", "The primary language for data science."),
                    ("Master SQL", "Query and manage databases."),
                    ("Learn Pandas & NumPy", "Data manipulation libraries."),
                    ("Machine Learning Basics", "Understand algorithms and models."),
                    ("Build Data Projects", "Analyze real-world datasets."),
                ],
                &["Python", "SQL", "Machine Learning", "Statistics"],
            ),
            template(
                PRODUCT_MANAGER,
                "Product Manager Path",
                "Lead product development and strategy.",
                &[
                    ("Understand Agile", "Learn software development methodologies."),
                    ("User Research", "Understand user needs and pain points."),
                    ("Roadmapping", "Plan product features and timelines."),
                    ("Data Analysis", "Make data-driven decisions."),
                    ("Stakeholder Management", "Communicate effectively with teams."),
                ],
                &["Agile", "User Research", "Roadmapping", "Stakeholder Management"],
            ),
            template(
                UX_DESIGNER,
                "UX Designer Path",
                "Design intuitive and user-friendly experiences.",
                &[
                    ("Learn Design Principles", "Color, typography, and layout."),
                    ("Master Figma", "The industry standard design tool."),
                    ("User Research", "Understand user behaviors."),
                    ("Prototyping", "Create interactive mockups."),
                    ("Build a Portfolio", "Showcase your design process."),
                ],
                &["Design Systems", "User Research", "Prototyping", "Figma"],
            ),
        ])
    }

    pub fn get(&self, key: &str) -> Option<&CareerTemplate> {
        self.templates.iter().find(|t| t.key == key)
    }

    /// Templates in declaration order.
    pub fn templates(&self) -> &[CareerTemplate] {
        &self.templates
    }

    /// Case-insensitive substring search over title/description, narrowed to
    /// templates carrying every requested skill.
    pub fn filter(&self, search: Option<&str>, required_skills: &[String]) -> Vec<&CareerTemplate> {
        let needle = search.map(|s| s.trim().to_lowercase()).unwrap_or_default();
        self.templates
            .iter()
            .filter(|t| {
                let matches_search = needle.is_empty()
                    || t.title.to_lowercase().contains(&needle)
                    || t.description.to_lowercase().contains(&needle);
                let matches_skills = required_skills
                    .iter()
                    .all(|skill| t.skills.iter().any(|s| s == skill));
                matches_search && matches_skills
            })
            .collect()
    }

    /// Union of all template skills, deduplicated, in first-seen order.
    pub fn skills(&self) -> Vec<String> {
        let mut seen = Vec::new();
        for t in &self.templates {
            for skill in &t.skills {
                if !seen.contains(skill) {
                    seen.push(skill.clone());
                }
            }
        }
        seen
    }
}

impl Default for TemplateCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

fn template(
    key: &str,
    title: &str,
    description: &str,
    steps: &[(&str, &str)],
    skills: &[&str],
) -> CareerTemplate {
    CareerTemplate {
        key: key.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        steps: steps
            .iter()
            .map(|(title, description)| StepTemplate {
                title: title.to_string(),
                description: description.to_string(),
            })
            .collect(),
        skills: skills.iter().map(|s| s.to_string()).collect(),
    }
}
