//! Portfolio content
//!
//! Records for every content section of the page, and providers that load
//! them. Content is authored as a TOML or JSON document:
//!
//! ```toml
//! [profile]
//! name = "Ada Example"
//! headline = "Data Engineer"
//!
//! [[experiences]]
//! id = 1
//! role = "Data Engineer"
//! company = "Acme"
//! date_range = "2023 - Present"
//! bullets = ["Built pipelines"]
//! sort_order = 1
//!
//! [[skill_categories]]
//! id = 1
//! title = "Languages"
//! sort_order = 1
//!
//! [[skills]]
//! id = 1
//! category_id = 1
//! name = "Rust"
//! sort_order = 1
//! ```
//!
//! Skill categories can list their skills inline, or skills can be given as
//! separate rows pointing at a category; both are merged. Every list comes
//! out sorted by `sort_order`, ties in document order.

use std::fs;
use std::path::{Path, PathBuf};

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use crate::error::{ContentError, Result};

/// Record identifier
pub type RecordId = u32;

// ============================================================================
// Records
// ============================================================================

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Experience {
    pub id: RecordId,
    pub role: String,
    pub company: String,
    pub date_range: String,
    #[serde(default)]
    pub bullets: Vec<String>,
    #[serde(default)]
    pub sort_order: i32,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: RecordId,
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    #[serde(default)]
    pub meta: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub has_link: bool,
    #[serde(default)]
    pub link_url: Option<String>,
    #[serde(default)]
    pub sort_order: i32,
}

impl Project {
    /// The link to show, if the project has one
    pub fn link(&self) -> Option<&str> {
        if self.has_link {
            self.link_url.as_deref().filter(|url| !url.is_empty())
        } else {
            None
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillCategory {
    pub id: RecordId,
    pub title: String,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub sort_order: i32,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Publication {
    pub id: RecordId,
    pub title: String,
    pub venue: String,
    #[serde(default)]
    pub link: String,
    #[serde(rename = "abstract", default)]
    pub summary: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub sort_order: i32,
}

/// A skill given as its own row
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillRow {
    pub id: RecordId,
    pub category_id: RecordId,
    pub name: String,
    #[serde(default)]
    pub sort_order: i32,
}

/// One labelled line of the technical stack
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackGroup {
    pub label: String,
    pub items: Vec<String>,
}

/// Who the portfolio is about
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Profile {
    pub name: String,
    pub headline: String,
    pub summary: String,
    pub location: String,
    pub website: Option<String>,
    pub github: Option<String>,
    pub email: Option<String>,
    pub stack: Vec<StackGroup>,
}

/// Everything the page renders
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PortfolioContent {
    pub profile: Profile,
    pub experiences: Vec<Experience>,
    pub projects: Vec<Project>,
    pub skill_categories: Vec<SkillCategory>,
    pub publications: Vec<Publication>,
}

/// On-disk document shape
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ContentDocument {
    profile: Profile,
    experiences: Vec<Experience>,
    projects: Vec<Project>,
    skill_categories: Vec<SkillCategory>,
    skills: Vec<SkillRow>,
    publications: Vec<Publication>,
}

impl PortfolioContent {
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let document: ContentDocument = toml::from_str(source)?;
        Self::from_document(document)
    }

    pub fn from_json_str(source: &str) -> Result<Self> {
        let document: ContentDocument = serde_json::from_str(source)?;
        Self::from_document(document)
    }

    fn from_document(document: ContentDocument) -> Result<Self> {
        let ContentDocument {
            profile,
            mut experiences,
            mut projects,
            skill_categories,
            skills,
            mut publications,
        } = document;

        check_unique("experience", experiences.iter().map(|e| e.id))?;
        check_unique("project", projects.iter().map(|p| p.id))?;
        check_unique("skill category", skill_categories.iter().map(|c| c.id))?;
        check_unique("publication", publications.iter().map(|p| p.id))?;

        experiences.sort_by_key(|e| e.sort_order);
        projects.sort_by_key(|p| p.sort_order);
        publications.sort_by_key(|p| p.sort_order);

        Ok(Self {
            profile,
            experiences,
            projects,
            skill_categories: group_skills(skill_categories, skills),
            publications,
        })
    }

    /// Total number of records across every section
    pub fn record_count(&self) -> usize {
        self.experiences.len()
            + self.projects.len()
            + self.skill_categories.len()
            + self.publications.len()
    }
}

fn check_unique(kind: &'static str, ids: impl Iterator<Item = RecordId>) -> Result<()> {
    let mut seen = FxHashSet::default();
    for id in ids {
        if !seen.insert(id) {
            return Err(ContentError::DuplicateId { kind, id });
        }
    }
    Ok(())
}

/// Merge skill rows into their categories in one pass
///
/// Rows are ordered by their own `sort_order` and appended after any inline
/// skills. Rows pointing at an unknown category are dropped.
pub fn group_skills(mut categories: Vec<SkillCategory>, mut rows: Vec<SkillRow>) -> Vec<SkillCategory> {
    categories.sort_by_key(|c| c.sort_order);
    rows.sort_by_key(|r| r.sort_order);

    let mut by_category: FxHashMap<RecordId, Vec<String>> = FxHashMap::default();
    for row in rows {
        by_category.entry(row.category_id).or_default().push(row.name);
    }

    for category in &mut categories {
        if let Some(skills) = by_category.remove(&category.id) {
            category.skills.extend(skills);
        }
    }

    for (category_id, skills) in by_category {
        tracing::warn!(category_id, count = skills.len(), "skills reference an unknown category");
    }
    categories
}

// ============================================================================
// Providers
// ============================================================================

/// Source of portfolio content
pub trait ContentProvider: Send + Sync {
    fn load(&self) -> Result<PortfolioContent>;
}

/// Content format, picked by file extension
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContentFormat {
    Toml,
    Json,
}

impl ContentFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()?.to_ascii_lowercase().as_str() {
            "toml" => Some(ContentFormat::Toml),
            "json" => Some(ContentFormat::Json),
            _ => None,
        }
    }
}

/// Loads content from a TOML or JSON file
#[derive(Clone, Debug)]
pub struct FileContentProvider {
    path: PathBuf,
}

impl FileContentProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ContentProvider for FileContentProvider {
    fn load(&self) -> Result<PortfolioContent> {
        let format = ContentFormat::from_path(&self.path)
            .ok_or_else(|| ContentError::UnsupportedFormat(self.path.clone()))?;
        let source = fs::read_to_string(&self.path).map_err(|source| ContentError::Io {
            path: self.path.clone(),
            source,
        })?;

        let content = match format {
            ContentFormat::Toml => PortfolioContent::from_toml_str(&source)?,
            ContentFormat::Json => PortfolioContent::from_json_str(&source)?,
        };
        tracing::debug!(
            path = %self.path.display(),
            records = content.record_count(),
            "content loaded"
        );
        Ok(content)
    }
}

/// Content held in memory
#[derive(Clone, Debug, Default)]
pub struct StaticContent {
    content: PortfolioContent,
}

impl StaticContent {
    pub fn new(content: PortfolioContent) -> Self {
        Self { content }
    }

    pub fn content(&self) -> &PortfolioContent {
        &self.content
    }

    /// The bundled demo portfolio
    pub fn sample() -> Result<Self> {
        PortfolioContent::from_toml_str(include_str!("../content/sample.toml")).map(Self::new)
    }
}

impl ContentProvider for StaticContent {
    fn load(&self) -> Result<PortfolioContent> {
        Ok(self.content.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"
[profile]
name = "Ada Example"
headline = "Data Engineer"
location = "Lisbon"

[[experiences]]
id = 1
role = "Intern"
company = "Beta"
date_range = "2021"
sort_order = 2

[[experiences]]
id = 2
role = "Engineer"
company = "Acme"
date_range = "2022 - Present"
bullets = ["Pipelines"]
sort_order = 1

[[skill_categories]]
id = 10
title = "Tools"
sort_order = 2

[[skill_categories]]
id = 11
title = "Languages"
skills = ["SQL"]
sort_order = 1

[[skills]]
id = 1
category_id = 11
name = "Python"
sort_order = 2

[[skills]]
id = 2
category_id = 11
name = "Rust"
sort_order = 1

[[skills]]
id = 3
category_id = 10
name = "Docker"

[[skills]]
id = 4
category_id = 99
name = "Orphan"

[[projects]]
id = 1
title = "Search"
has_link = true
link_url = "https://example.com"

[[publications]]
id = 1
title = "Paper"
venue = "Journal"
abstract = "We study things."
"#;

    #[test]
    fn test_sorted_by_sort_order() {
        let content = PortfolioContent::from_toml_str(DOC).unwrap();
        let roles: Vec<_> = content.experiences.iter().map(|e| e.role.as_str()).collect();
        assert_eq!(roles, ["Engineer", "Intern"]);
    }

    #[test]
    fn test_skill_rows_grouped() {
        let content = PortfolioContent::from_toml_str(DOC).unwrap();
        let titles: Vec<_> = content
            .skill_categories
            .iter()
            .map(|c| c.title.as_str())
            .collect();
        assert_eq!(titles, ["Languages", "Tools"]);
        assert_eq!(content.skill_categories[0].skills, ["SQL", "Rust", "Python"]);
        assert_eq!(content.skill_categories[1].skills, ["Docker"]);
    }

    #[test]
    fn test_publication_abstract_field() {
        let content = PortfolioContent::from_toml_str(DOC).unwrap();
        assert_eq!(content.publications[0].summary, "We study things.");
        assert_eq!(content.projects[0].link(), Some("https://example.com"));
    }

    #[test]
    fn test_json_matches_toml() {
        let json = r#"{
            "profile": {"name": "Ada Example"},
            "projects": [
                {"id": 2, "title": "B", "sort_order": 2},
                {"id": 1, "title": "A", "sort_order": 1}
            ]
        }"#;
        let content = PortfolioContent::from_json_str(json).unwrap();
        assert_eq!(content.projects[0].title, "A");
        assert_eq!(content.profile.name, "Ada Example");
        assert!(content.projects[0].link().is_none());
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let doc = r#"
[[projects]]
id = 1
title = "A"

[[projects]]
id = 1
title = "B"
"#;
        assert!(matches!(
            PortfolioContent::from_toml_str(doc),
            Err(ContentError::DuplicateId { kind: "project", id: 1 })
        ));
    }

    #[test]
    fn test_unsupported_extension() {
        let provider = FileContentProvider::new("content.yaml");
        assert!(matches!(
            provider.load(),
            Err(ContentError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let provider = FileContentProvider::new("/nonexistent/folio/content.toml");
        assert!(matches!(provider.load(), Err(ContentError::Io { .. })));
    }

    #[test]
    fn test_file_provider_reads_toml() {
        let path = std::env::temp_dir().join(format!("folio-content-{}.toml", std::process::id()));
        fs::write(&path, DOC).unwrap();
        let content = FileContentProvider::new(&path).load().unwrap();
        fs::remove_file(&path).ok();
        assert_eq!(content.experiences.len(), 2);
    }

    #[test]
    fn test_sample_content_loads() {
        let content = StaticContent::sample().unwrap().load().unwrap();
        assert!(!content.profile.name.is_empty());
        assert!(!content.projects.is_empty());
        assert!(!content.experiences.is_empty());
        assert!(!content.skill_categories.is_empty());
        assert!(!content.publications.is_empty());
    }
}
