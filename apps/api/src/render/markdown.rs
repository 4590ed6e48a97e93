//! Line-oriented markdown reader for generated resumes.
//!
//! Only the subset the model is asked to produce is recognised. Anything else
//! falls through as a plain paragraph, so no input is ever rejected here.

/// Longest line still considered a heading by the caps/colon heuristics.
const MAX_IMPLICIT_HEADING_CHARS: usize = 60;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    /// `#` headings and implicit headings. Level 1 is the candidate's name,
    /// level 2 a resume section, 3 and deeper a role or sub-heading.
    Heading { level: u8, text: String },
    Bullet(String),
    Paragraph(String),
    Rule,
    Blank,
}

impl Block {
    pub fn is_blank(&self) -> bool {
        matches!(self, Block::Blank)
    }
}

pub fn parse(markdown: &str) -> Vec<Block> {
    let mut blocks: Vec<Block> = Vec::new();

    for raw in markdown.lines() {
        let line = raw.trim();
        let block = classify(line);

        // Runs of blank lines collapse into one.
        if block.is_blank() && blocks.last().map_or(true, Block::is_blank) {
            continue;
        }
        blocks.push(block);
    }

    while blocks.last().is_some_and(Block::is_blank) {
        blocks.pop();
    }
    blocks
}

fn classify(line: &str) -> Block {
    match classify_line(line) {
        // Lines made only of markup strip down to nothing.
        Block::Heading { text, .. } | Block::Bullet(text) | Block::Paragraph(text)
            if text.is_empty() =>
        {
            Block::Blank
        }
        block => block,
    }
}

fn classify_line(line: &str) -> Block {
    if line.is_empty() {
        return Block::Blank;
    }
    if is_rule(line) {
        return Block::Rule;
    }
    if let Some((level, text)) = atx_heading(line) {
        return Block::Heading {
            level,
            text: strip_inline(text),
        };
    }
    if let Some(item) = bullet_item(line) {
        return Block::Bullet(strip_inline(item));
    }
    if let Some(inner) = bold_only(line) {
        return Block::Heading {
            level: 3,
            text: strip_inline(inner),
        };
    }

    let text = strip_inline(line);
    if is_caps_heading(&text) {
        return Block::Heading { level: 2, text };
    }
    if text.ends_with(':') && text.chars().count() <= MAX_IMPLICIT_HEADING_CHARS {
        return Block::Heading { level: 3, text };
    }
    Block::Paragraph(text)
}

fn is_rule(line: &str) -> bool {
    let compact: String = line.chars().filter(|c| !c.is_whitespace()).collect();
    compact.len() >= 3
        && ['-', '*', '_']
            .iter()
            .any(|&marker| compact.chars().all(|c| c == marker))
}

fn atx_heading(line: &str) -> Option<(u8, &str)> {
    let hashes = line.chars().take_while(|&c| c == '#').count();
    if hashes == 0 || hashes > 6 {
        return None;
    }
    let rest = &line[hashes..];
    if !rest.is_empty() && !rest.starts_with(' ') {
        return None;
    }
    let text = rest.trim().trim_end_matches('#').trim_end();
    if text.is_empty() {
        return None;
    }
    Some((hashes as u8, text))
}

fn bullet_item(line: &str) -> Option<&str> {
    for marker in ["- ", "* ", "+ ", "• "] {
        if let Some(rest) = line.strip_prefix(marker) {
            let rest = rest.trim();
            if !rest.is_empty() {
                return Some(rest);
            }
        }
    }
    None
}

fn bold_only(line: &str) -> Option<&str> {
    for fence in ["**", "__"] {
        if let Some(inner) = line
            .strip_prefix(fence)
            .and_then(|rest| rest.strip_suffix(fence))
        {
            if !inner.is_empty() && !inner.contains(fence) {
                return Some(inner.trim());
            }
        }
    }
    None
}

fn is_caps_heading(text: &str) -> bool {
    let mut letters = text.chars().filter(|c| c.is_alphabetic()).peekable();
    letters.peek().is_some()
        && text.chars().count() <= MAX_IMPLICIT_HEADING_CHARS
        && letters.all(|c| !c.is_lowercase())
}

/// Removes emphasis and code markers and flattens `[text](url)` links.
pub fn strip_inline(text: &str) -> String {
    let linked = flatten_links(text);
    let mut out = linked.replace("**", "").replace("__", "").replace('`', "");

    // Single `*` is emphasis once bullets are gone; single `_` is left alone
    // because it shows up in handles and email addresses.
    out.retain(|c| c != '*');
    out.trim().to_string()
}

fn flatten_links(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(open) = rest.find('[') {
        let after_open = &rest[open + 1..];
        let Some(close) = after_open.find("](") else {
            break;
        };
        let after_label = &after_open[close + 2..];
        let Some(end) = after_label.find(')') else {
            break;
        };

        let label = &after_open[..close];
        let url = &after_label[..end];
        out.push_str(&rest[..open]);
        if label.is_empty() || label == url {
            out.push_str(url);
        } else {
            out.push_str(label);
            out.push_str(" (");
            out.push_str(url);
            out.push(')');
        }
        rest = &after_label[end + 1..];
    }

    out.push_str(rest);
    out
}
