//! Layout: places parsed blocks onto fixed-size pages.
//!
//! Works top-down with a single vertical cursor. Each text line reserves
//! `size × leading` points; when the next line would cross the bottom margin a new
//! page starts. Section headings are kept together with at least one line of body.

use crate::render::encoding::encode;
use crate::render::markdown::Block;
use crate::render::metrics::{Font, PageConfig};

/// WinAnsi code for the bullet glyph.
pub const BULLET_GLYPH: u8 = 0x95;

// ────────────────────────────────────────────────────────────────────────────
// Types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum PlacedItem {
    /// One line of WinAnsi text; `(x, y)` is the baseline origin.
    Text {
        font: Font,
        size: f32,
        x: f32,
        y: f32,
        bytes: Vec<u8>,
    },
    Rule {
        x1: f32,
        x2: f32,
        y: f32,
        thickness: f32,
    },
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PageLayout {
    pub items: Vec<PlacedItem>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct LayoutPlan {
    pub pages: Vec<PageLayout>,
    /// Characters that could not be set as written.
    pub substitutions: usize,
}

impl LayoutPlan {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Text lines in reading order across all pages.
    pub fn text_lines(&self) -> impl Iterator<Item = &[u8]> {
        self.pages.iter().flat_map(|page| {
            page.items.iter().filter_map(|item| match item {
                PlacedItem::Text { bytes, .. } => Some(bytes.as_slice()),
                PlacedItem::Rule { .. } => None,
            })
        })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Line wrapping
// ────────────────────────────────────────────────────────────────────────────

/// Greedy word wrap of encoded text into lines no wider than `max_width_pt`.
/// A single word wider than the line is broken between characters.
pub fn wrap(text: &[u8], font: Font, size_pt: f32, max_width_pt: f32) -> Vec<Vec<u8>> {
    let metrics = font.metrics();
    let space = metrics.space_width * size_pt;
    let mut lines: Vec<Vec<u8>> = Vec::new();
    let mut current: Vec<u8> = Vec::new();
    let mut current_width = 0.0_f32;

    for word in text.split(|&b| b == b' ').filter(|w| !w.is_empty()) {
        let word_width = metrics.measure_pt(word, size_pt);

        if !current.is_empty() && current_width + space + word_width <= max_width_pt {
            current.push(b' ');
            current.extend_from_slice(word);
            current_width += space + word_width;
            continue;
        }

        if !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }

        if word_width <= max_width_pt {
            current.extend_from_slice(word);
            current_width = word_width;
            continue;
        }

        // Overlong token (URLs mostly): hard-break it.
        current_width = 0.0;
        for &byte in word {
            let w = metrics.measure_pt(&[byte], size_pt);
            if !current.is_empty() && current_width + w > max_width_pt {
                lines.push(std::mem::take(&mut current));
                current_width = 0.0;
            }
            current.push(byte);
            current_width += w;
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

// ────────────────────────────────────────────────────────────────────────────
// Page builder
// ────────────────────────────────────────────────────────────────────────────

struct PageBuilder<'a> {
    config: &'a PageConfig,
    pages: Vec<PageLayout>,
    current: PageLayout,
    /// Top of the next line, in points from the page bottom.
    cursor: f32,
}

impl<'a> PageBuilder<'a> {
    fn new(config: &'a PageConfig) -> Self {
        Self {
            config,
            pages: Vec::new(),
            current: PageLayout::default(),
            cursor: config.height_pt - config.margin_top_pt,
        }
    }

    fn at_page_top(&self) -> bool {
        self.current.items.is_empty()
    }

    fn remaining(&self) -> f32 {
        self.cursor - self.config.margin_bottom_pt
    }

    fn break_page(&mut self) {
        let finished = std::mem::take(&mut self.current);
        self.pages.push(finished);
        self.cursor = self.config.height_pt - self.config.margin_top_pt;
    }

    /// Starts a new page unless `height` points still fit on this one.
    fn reserve(&mut self, height: f32) {
        if !self.at_page_top() && self.remaining() < height {
            self.break_page();
        }
    }

    /// Vertical gap; swallowed at the top of a page.
    fn space(&mut self, height: f32) {
        if !self.at_page_top() {
            self.cursor -= height;
        }
    }

    fn line(&mut self, font: Font, size: f32, x: f32, bytes: Vec<u8>) -> f32 {
        let height = size * self.config.leading;
        self.reserve(height);
        let baseline = self.cursor - size;
        self.current.items.push(PlacedItem::Text {
            font,
            size,
            x,
            y: baseline,
            bytes,
        });
        self.cursor -= height;
        baseline
    }

    fn rule(&mut self, y: f32, thickness: f32) {
        self.current.items.push(PlacedItem::Rule {
            x1: self.config.margin_left_pt,
            x2: self.config.width_pt - self.config.margin_right_pt,
            y,
            thickness,
        });
    }

    fn finish(mut self) -> Vec<PageLayout> {
        if !self.at_page_top() || self.pages.is_empty() {
            self.break_page();
        }
        self.pages
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Core function
// ────────────────────────────────────────────────────────────────────────────

/// Lays out parsed blocks. Deterministic: the same blocks and config always
/// produce the same plan.
pub fn layout(blocks: &[Block], config: &PageConfig) -> LayoutPlan {
    let mut builder = PageBuilder::new(config);
    let mut substitutions = 0;
    let left = config.margin_left_pt;
    let text_width = config.text_width_pt();
    let body = config.body_size_pt;
    let body_line = body * config.leading;

    for block in blocks {
        match block {
            Block::Heading { level: 1, text } => {
                let encoded = encode(text);
                substitutions += encoded.substitutions;
                let size = config.name_size_pt;
                for line in wrap(&encoded.bytes, Font::Bold, size, text_width) {
                    let width = Font::Bold.metrics().measure_pt(&line, size);
                    let x = left + ((text_width - width) / 2.0).max(0.0);
                    builder.line(Font::Bold, size, x, line);
                }
                builder.space(body * 0.4);
            }
            Block::Heading { level: 2, text } => {
                let encoded = encode(text);
                substitutions += encoded.substitutions;
                let size = config.section_size_pt;
                builder.space(body * 0.8);
                builder.reserve(size * config.leading + body * 0.3 + body_line);
                let mut baseline = None;
                for line in wrap(&encoded.bytes, Font::Bold, size, text_width) {
                    baseline = Some(builder.line(Font::Bold, size, left, line));
                }
                if let Some(baseline) = baseline {
                    builder.rule(baseline - 3.0, 0.75);
                }
                builder.space(body * 0.3);
            }
            Block::Heading { text, .. } => {
                let encoded = encode(text);
                substitutions += encoded.substitutions;
                let size = config.subheading_size_pt;
                builder.space(body * 0.4);
                builder.reserve(size * config.leading + body_line);
                for line in wrap(&encoded.bytes, Font::Bold, size, text_width) {
                    builder.line(Font::Bold, size, left, line);
                }
            }
            Block::Bullet(text) => {
                let encoded = encode(text);
                substitutions += encoded.substitutions;
                let indent = config.bullet_indent_pt;
                let lines = wrap(&encoded.bytes, Font::Regular, body, text_width - indent);
                for (i, line) in lines.into_iter().enumerate() {
                    let baseline = builder.line(Font::Regular, body, left + indent, line);
                    if i == 0 {
                        builder.current.items.push(PlacedItem::Text {
                            font: Font::Regular,
                            size: body,
                            x: left + indent * 0.3,
                            y: baseline,
                            bytes: vec![BULLET_GLYPH],
                        });
                    }
                }
            }
            Block::Paragraph(text) => {
                let encoded = encode(text);
                substitutions += encoded.substitutions;
                for line in wrap(&encoded.bytes, Font::Regular, body, text_width) {
                    builder.line(Font::Regular, body, left, line);
                }
            }
            Block::Rule => {
                builder.space(body * 0.4);
                builder.reserve(body);
                let y = builder.cursor - body * 0.5;
                builder.rule(y, 0.5);
                builder.cursor -= body;
            }
            Block::Blank => builder.space(body * 0.5),
        }
    }

    LayoutPlan {
        pages: builder.finish(),
        substitutions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::markdown::parse;
    use crate::render::metrics::default_page_config;

    fn lines_of(plan: &LayoutPlan) -> Vec<String> {
        plan.text_lines()
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
            .collect()
    }

    #[test]
    fn test_wrap_respects_width() {
        let text = b"Designed and shipped a multi-region event pipeline handling forty thousand messages per second";
        let lines = wrap(text, Font::Regular, 10.5, 200.0);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(Font::Regular.metrics().measure_pt(line, 10.5) <= 200.0);
        }
        let rejoined = lines
            .iter()
            .map(|l| String::from_utf8_lossy(l).into_owned())
            .collect::<Vec<_>>()
            .join(" ");
        assert_eq!(rejoined.as_bytes(), text);
    }

    #[test]
    fn test_wrap_breaks_overlong_word() {
        let url = b"https://example.com/a/really/long/path/that/cannot/fit/on/one/line";
        let lines = wrap(url, Font::Regular, 10.5, 100.0);
        assert!(lines.len() > 1);
        assert_eq!(lines.concat(), url.to_vec());
    }

    #[test]
    fn test_items_stay_inside_margins() {
        let config = default_page_config();
        let markdown = "# Jane Doe\n## Experience\n- ".to_string() + &"word ".repeat(400);
        let plan = layout(&parse(&markdown), &config);

        for page in &plan.pages {
            for item in &page.items {
                if let PlacedItem::Text { y, x, .. } = item {
                    assert!(*y >= config.margin_bottom_pt);
                    assert!(*y <= config.height_pt - config.margin_top_pt);
                    assert!(*x >= config.margin_left_pt);
                }
            }
        }
    }

    #[test]
    fn test_empty_section_heading_draws_no_rule() {
        let blocks = vec![
            Block::Paragraph("Jane Doe".into()),
            Block::Heading {
                level: 2,
                text: String::new(),
            },
        ];
        let plan = layout(&blocks, &default_page_config());
        let rules = plan.pages[0]
            .items
            .iter()
            .filter(|item| matches!(item, PlacedItem::Rule { .. }))
            .count();
        assert_eq!(rules, 0);
    }

    #[test]
    fn test_long_document_paginates() {
        let config = default_page_config();
        let mut markdown = String::from("# Jane Doe\n");
        for i in 0..12 {
            markdown.push_str(&format!("## Section {i}\n"));
            for j in 0..8 {
                markdown.push_str(&format!("- Bullet {j} of section {i} with enough words to matter\n"));
            }
        }
        let plan = layout(&parse(&markdown), &config);
        assert!(plan.page_count() >= 2);
        assert!(plan.pages.iter().all(|p| !p.items.is_empty()));
    }

    #[test]
    fn test_section_heading_not_orphaned_at_page_bottom() {
        let config = default_page_config();
        let mut markdown = String::new();
        for i in 0..200 {
            markdown.push_str(&format!("Line {i}\n"));
            if i % 37 == 36 {
                markdown.push_str("## Heading\n");
            }
        }
        let plan = layout(&parse(&markdown), &config);
        for page in &plan.pages {
            if let Some(PlacedItem::Rule { .. }) = page.items.last() {
                panic!("page ends with a section heading");
            }
        }
    }

    #[test]
    fn test_order_preserved() {
        let plan = layout(
            &parse("# Jane\n## Summary\nText\n## Experience\n- Did things\n## Education\nBSc"),
            &default_page_config(),
        );
        let lines = lines_of(&plan);
        let position = |needle: &str| lines.iter().position(|l| l == needle).unwrap();
        assert!(position("Jane") < position("Summary"));
        assert!(position("Summary") < position("Experience"));
        assert!(position("Experience") < position("Education"));
    }

    #[test]
    fn test_bullet_glyph_emitted_once_per_item() {
        let plan = layout(&parse(&format!("- {}", "long ".repeat(60))), &default_page_config());
        let glyphs = plan
            .text_lines()
            .filter(|bytes| *bytes == [BULLET_GLYPH].as_slice())
            .count();
        assert_eq!(glyphs, 1);
    }

    #[test]
    fn test_substitutions_counted() {
        let plan = layout(&parse("Shipped 🚀 fast"), &default_page_config());
        assert_eq!(plan.substitutions, 1);
        assert_eq!(lines_of(&plan), vec!["Shipped ? fast"]);
    }
}
