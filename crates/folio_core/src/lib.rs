//! Folio Core
//!
//! Portfolio content: the records each page section renders, providers that
//! load them from TOML or JSON, and the `llms.txt` summary.

pub mod content;
pub mod error;
pub mod llms;

pub use content::{
    group_skills, ContentFormat, ContentProvider, Experience, FileContentProvider,
    PortfolioContent, Profile, Project, Publication, RecordId, SkillCategory, SkillRow,
    StackGroup, StaticContent,
};
pub use error::{ContentError, Result};
pub use llms::render_llms_txt;
