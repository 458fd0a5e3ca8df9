//! `llms.txt` rendering
//!
//! A plain Markdown summary of the portfolio for language-model crawlers.

use std::fmt::Write;

use crate::content::PortfolioContent;

/// Render `llms.txt` for `content`
pub fn render_llms_txt(content: &PortfolioContent) -> String {
    let profile = &content.profile;
    let mut out = String::new();

    // Writing to a String cannot fail
    let _ = writeln!(out, "# {} - {}", profile.name, profile.headline);
    out.push('\n');
    if !profile.summary.is_empty() {
        let _ = writeln!(out, "{}", profile.summary);
        out.push('\n');
    }

    out.push_str("## Roles\n");
    for exp in &content.experiences {
        let _ = writeln!(out, "- **{}** at **{}** ({})", exp.role, exp.company, exp.date_range);
    }

    out.push_str("\n## Technical Stack\n");
    for group in &profile.stack {
        let _ = writeln!(out, "- **{}**: {}", group.label, group.items.join(", "));
    }

    out.push_str("\n## Key Projects\n");
    for project in &content.projects {
        let _ = writeln!(
            out,
            "- **{}**: {}. {}",
            project.title, project.subtitle, project.description
        );
    }

    out.push_str("\n## Selected Publications\n");
    for publication in &content.publications {
        let _ = writeln!(
            out,
            "- **{}**: Published in *{}*. {}",
            publication.title, publication.venue, publication.summary
        );
    }

    out.push_str("\n## Contact\n");
    if let Some(website) = &profile.website {
        let _ = writeln!(out, "- **Website**: {website}");
    }
    if let Some(github) = &profile.github {
        let _ = writeln!(out, "- **GitHub**: {github}");
    }
    if let Some(email) = &profile.email {
        let _ = writeln!(out, "- **Email**: {email}");
    }
    if !profile.location.is_empty() {
        let _ = writeln!(out, "- **Location**: {}", profile.location);
    }

    out
}
