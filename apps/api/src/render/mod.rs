//! Document rendering: resume markdown → paginated PDF or Word document.
//!
//! Pipeline: `markdown::parse` → `layout::layout` (metrics + encoding) → `pdf::write_pdf`.
//! The Word path shares the parser: `markdown::parse` → `docx::paragraphs` → `docx::write_docx`.
//! Everything here is synchronous and CPU-bound; callers on the async runtime should
//! run it on the blocking pool.

pub mod docx;
pub mod encoding;
pub mod layout;
pub mod markdown;
pub mod metrics;
pub mod pdf;

use bytes::Bytes;
use thiserror::Error;
use tracing::{debug, warn};

use layout::LayoutPlan;
use metrics::{default_page_config, PageConfig};

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("resume has no renderable content")]
    Empty,

    #[error("failed to serialize document: {0}")]
    Encode(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Pdf,
    Docx,
}

impl DocumentFormat {
    pub fn content_type(self) -> &'static str {
        match self {
            DocumentFormat::Pdf => "application/pdf",
            DocumentFormat::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
        }
    }

    pub fn content_disposition(self) -> &'static str {
        match self {
            DocumentFormat::Pdf => "attachment; filename=\"resume.pdf\"",
            DocumentFormat::Docx => "attachment; filename=\"resume.docx\"",
        }
    }
}

/// A finished document ready to hand to the client.
#[derive(Debug, Clone)]
pub struct RenderedDocument {
    bytes: Bytes,
    /// Known for PDF only; Word paginates on open.
    page_count: Option<usize>,
}

impl RenderedDocument {
    pub fn page_count(&self) -> Option<usize> {
        self.page_count
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn into_bytes(self) -> Bytes {
        self.bytes
    }
}

#[derive(Debug, Clone)]
pub struct DocumentRenderer {
    config: PageConfig,
}

impl Default for DocumentRenderer {
    fn default() -> Self {
        Self::new(default_page_config())
    }
}

impl DocumentRenderer {
    pub fn new(config: PageConfig) -> Self {
        Self { config }
    }

    /// Parses and lays out `markdown` without serializing.
    pub fn plan(&self, markdown: &str) -> Result<LayoutPlan, RenderError> {
        let blocks = markdown::parse(markdown);
        if blocks.is_empty() {
            return Err(RenderError::Empty);
        }

        let plan = layout::layout(&blocks, &self.config);
        if plan.text_lines().all(|line| line.is_empty()) {
            return Err(RenderError::Empty);
        }
        if plan.substitutions > 0 {
            warn!(
                "Replaced {} character(s) the PDF fonts cannot display",
                plan.substitutions
            );
        }
        Ok(plan)
    }

    pub fn render(&self, markdown: &str) -> Result<RenderedDocument, RenderError> {
        let plan = self.plan(markdown)?;
        let bytes = pdf::write_pdf(&plan, &self.config)?;
        debug!(
            "Rendered {} page(s), {} bytes",
            plan.page_count(),
            bytes.len()
        );

        Ok(RenderedDocument {
            page_count: Some(plan.page_count()),
            bytes: Bytes::from(bytes),
        })
    }

    pub fn render_docx(&self, markdown: &str) -> Result<RenderedDocument, RenderError> {
        let paragraphs = docx::paragraphs(&markdown::parse(markdown));
        if paragraphs.is_empty() {
            return Err(RenderError::Empty);
        }
        let bytes = docx::write_docx(&paragraphs, &self.config)?;
        debug!("Rendered Word document, {} bytes", bytes.len());

        Ok(RenderedDocument {
            page_count: None,
            bytes: Bytes::from(bytes),
        })
    }

    pub fn render_as(
        &self,
        format: DocumentFormat,
        markdown: &str,
    ) -> Result<RenderedDocument, RenderError> {
        match format {
            DocumentFormat::Pdf => self.render(markdown),
            DocumentFormat::Docx => self.render_docx(markdown),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::test_support::SAMPLE_RESUME;

    #[test]
    fn test_sample_resume_renders() {
        let doc = DocumentRenderer::default().render(SAMPLE_RESUME).unwrap();
        assert!(!doc.is_empty());
        assert_eq!(doc.page_count(), Some(1));
    }

    #[test]
    fn test_rendering_is_deterministic() {
        let renderer = DocumentRenderer::default();
        assert_eq!(
            renderer.plan(SAMPLE_RESUME).unwrap(),
            renderer.plan(SAMPLE_RESUME).unwrap()
        );
        assert_eq!(
            renderer.render(SAMPLE_RESUME).unwrap().into_bytes(),
            renderer.render(SAMPLE_RESUME).unwrap().into_bytes()
        );
    }

    #[test]
    fn test_emoji_do_not_fail_rendering() {
        let markdown = format!("{SAMPLE_RESUME}\n- Shipped 🚀 on time ✅ and under budget 💯");
        let doc = DocumentRenderer::default().render(&markdown).unwrap();
        assert!(doc.len() > 0);
    }

    #[test]
    fn test_blank_input_is_empty_error() {
        let renderer = DocumentRenderer::default();
        assert!(matches!(renderer.render(""), Err(RenderError::Empty)));
        assert!(matches!(renderer.render("  \n\n\t"), Err(RenderError::Empty)));
    }

    #[test]
    fn test_markup_only_input_is_empty_error() {
        // Emphasis markers with nothing inside strip down to nothing.
        let result = DocumentRenderer::default().render("****\n``");
        assert!(matches!(result, Err(RenderError::Empty)));
    }

    #[test]
    fn test_docx_renders_and_rejects_blank() {
        let renderer = DocumentRenderer::default();
        let doc = renderer.render_as(DocumentFormat::Docx, SAMPLE_RESUME).unwrap();
        assert_eq!(doc.page_count(), None);
        assert!(doc.into_bytes().starts_with(b"PK"));
        assert!(matches!(
            renderer.render_as(DocumentFormat::Docx, " \n## **\n"),
            Err(RenderError::Empty)
        ));
    }

    #[test]
    fn test_section_order_preserved() {
        let plan = DocumentRenderer::default().plan(SAMPLE_RESUME).unwrap();
        let lines: Vec<String> = plan
            .text_lines()
            .map(|l| String::from_utf8_lossy(l).into_owned())
            .collect();
        let at = |title: &str| lines.iter().position(|l| l == title).unwrap();

        assert!(at("Professional Summary") < at("Professional Experience"));
        assert!(at("Professional Experience") < at("Education"));
        assert!(at("Education") < at("Skills"));
    }
}
