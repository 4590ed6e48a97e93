//! The Chicago section layout, shared by the prompt and the post-generation check.

use tracing::warn;

/// A required resume section and the heading keyword that identifies it.
#[derive(Debug, Clone, Copy)]
pub struct Section {
    pub title: &'static str,
    /// Lowercase keyword searched for in heading lines. `None` for the header block,
    /// which carries the candidate's name rather than a fixed title.
    pub keyword: Option<&'static str>,
}

/// Chicago-style section order. The prompt enumerates these in this exact order.
pub const CHICAGO_SECTIONS: [Section; 5] = [
    Section {
        title: "Header",
        keyword: None,
    },
    Section {
        title: "Professional Summary",
        keyword: Some("summary"),
    },
    Section {
        title: "Professional Experience",
        keyword: Some("experience"),
    },
    Section {
        title: "Education",
        keyword: Some("education"),
    },
    Section {
        title: "Skills",
        keyword: Some("skills"),
    },
];

/// Returns the titles of Chicago sections that have no matching heading.
///
/// Advisory only; never fails a request.
pub fn missing_sections(markdown: &str) -> Vec<&'static str> {
    let headings: Vec<String> = markdown
        .lines()
        .map(str::trim)
        .filter(|line| looks_like_heading(line))
        .map(str::to_lowercase)
        .collect();

    let missing: Vec<&'static str> = CHICAGO_SECTIONS
        .iter()
        .filter_map(|section| {
            let keyword = section.keyword?;
            let found = headings.iter().any(|h| h.contains(keyword));
            (!found).then_some(section.title)
        })
        .collect();

    if !missing.is_empty() {
        warn!("Generated resume is missing sections: {}", missing.join(", "));
    }
    missing
}

fn looks_like_heading(line: &str) -> bool {
    if line.is_empty() {
        return false;
    }
    if line.starts_with('#') || line.ends_with(':') {
        return true;
    }
    if line.starts_with("**") && line.ends_with("**") {
        return true;
    }
    let mut letters = line.chars().filter(|c| c.is_alphabetic()).peekable();
    letters.peek().is_some() && letters.all(char::is_uppercase)
}
