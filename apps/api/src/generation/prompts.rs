// Prompt constants for resume generation.
// The system prompt lives in llm_client::prompts; this file owns the user-turn template.

use crate::generation::sections::CHICAGO_SECTIONS;

/// Chicago resume prompt. Replace: {sections}, then {user_input}.
pub const CHICAGO_PROMPT_TEMPLATE: &str = r#"Act as an expert career coach and professional resume writer. Take the raw, unstructured career information below and transform it into a polished resume that follows the Chicago template: a single-column, conservative layout with clear section headings.

The sections MUST appear in exactly this order:
{sections}

Formatting rules:
- Header: full name on the first line as a level-1 heading, then target job title, then one contact line formatted as Phone | Email | LinkedIn | Location (omit fields that are not provided).
- Professional Summary: 2-3 sentences highlighting key experience and skills.
- Professional Experience: for each role give the company, the job title, location and dates on one line, then 3-4 bullet points. Start every bullet with an action verb and quantify achievements with numbers where the input supports it.
- Education: degree, institution, location, graduation date, and GPA only if it is high.
- Skills: bullet points grouping technical and soft skills.
- Use level-2 headings for section titles and "-" for bullets.

HARD RULES:
1. Use ONLY facts present in the input. Do not invent employers, dates, degrees or metrics.
2. Output Markdown only. Do NOT include any introductory text, explanations, or comments.
3. Do NOT wrap the output in code fences.

RAW INPUT:
---
{user_input}
---"#;

/// Builds the generation prompt for one resume.
///
/// Pure: the same input always yields the same prompt. `raw_text` is embedded verbatim.
pub fn compose(raw_text: &str) -> String {
    let sections = CHICAGO_SECTIONS
        .iter()
        .enumerate()
        .map(|(i, section)| format!("{}. {}", i + 1, section.title))
        .collect::<Vec<_>>()
        .join("\n");

    // Substitute the user text last so placeholders inside it are left untouched.
    CHICAGO_PROMPT_TEMPLATE
        .replace("{sections}", &sections)
        .replace("{user_input}", raw_text)
}
