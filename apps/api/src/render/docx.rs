//! Word export. Reads the same parsed blocks as the PDF path, so heading
//! detection is identical; Word does its own wrapping and pagination.

use std::io::Cursor;

use docx_rs::{AlignmentType, Docx, Paragraph, Run};

use crate::render::markdown::Block;
use crate::render::metrics::PageConfig;
use crate::render::RenderError;

/// Points to twentieths of a point (page geometry units in WordprocessingML).
const TWIPS_PER_PT: f32 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordStyle {
    Name,
    Section,
    Subheading,
    Bullet,
    Body,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordParagraph {
    pub style: WordStyle,
    pub text: String,
}

/// Maps parsed blocks to Word paragraphs. Blank lines and rules are dropped;
/// paragraph spacing comes from the document itself.
pub fn paragraphs(blocks: &[Block]) -> Vec<WordParagraph> {
    blocks
        .iter()
        .filter_map(|block| {
            let (style, text) = match block {
                Block::Heading { level: 1, text } => (WordStyle::Name, text),
                Block::Heading { level: 2, text } => (WordStyle::Section, text),
                Block::Heading { text, .. } => (WordStyle::Subheading, text),
                Block::Bullet(text) => (WordStyle::Bullet, text),
                Block::Paragraph(text) => (WordStyle::Body, text),
                Block::Rule | Block::Blank => return None,
            };
            let text = xml_safe(text);
            (!text.is_empty()).then_some(WordParagraph { style, text })
        })
        .collect()
}

/// Serializes paragraphs into a .docx package on a US Letter page.
pub fn write_docx(
    paragraphs: &[WordParagraph],
    config: &PageConfig,
) -> Result<Vec<u8>, RenderError> {
    let mut docx = Docx::new().page_size(
        (config.width_pt * TWIPS_PER_PT) as u32,
        (config.height_pt * TWIPS_PER_PT) as u32,
    );
    for paragraph in paragraphs {
        docx = docx.add_paragraph(to_docx(paragraph, config));
    }

    let mut buffer = Cursor::new(Vec::new());
    docx.build()
        .pack(&mut buffer)
        .map_err(|e| RenderError::Encode(e.to_string()))?;
    Ok(buffer.into_inner())
}

fn to_docx(paragraph: &WordParagraph, config: &PageConfig) -> Paragraph {
    let (size_pt, bold) = match paragraph.style {
        WordStyle::Name => (config.name_size_pt, true),
        WordStyle::Section => (config.section_size_pt, true),
        WordStyle::Subheading => (config.subheading_size_pt, true),
        WordStyle::Bullet | WordStyle::Body => (config.body_size_pt, false),
    };

    let text = match paragraph.style {
        WordStyle::Bullet => format!("\u{2022} {}", paragraph.text),
        _ => paragraph.text.clone(),
    };

    let mut run = Run::new().add_text(text).size(half_points(size_pt));
    if bold {
        run = run.bold();
    }

    let docx_paragraph = Paragraph::new().add_run(run);
    match paragraph.style {
        WordStyle::Name => docx_paragraph.align(AlignmentType::Center),
        _ => docx_paragraph,
    }
}

fn half_points(size_pt: f32) -> usize {
    (size_pt * 2.0).round() as usize
}

/// Drops characters XML 1.0 cannot carry. Tabs become spaces.
fn xml_safe(text: &str) -> String {
    text.chars()
        .filter_map(|c| match c {
            '\t' => Some(' '),
            '\u{FFFE}' | '\u{FFFF}' => None,
            c if c.is_control() => None,
            c => Some(c),
        })
        .collect::<String>()
        .trim()
        .to_string()
}
