//! Serializes a `LayoutPlan` into PDF bytes with lopdf.
//!
//! Streams are left uncompressed and no creation dates or document IDs are written,
//! so identical plans serialize to identical bytes.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream, StringFormat};

use crate::render::layout::{LayoutPlan, PageLayout, PlacedItem};
use crate::render::metrics::{Font, PageConfig};
use crate::render::RenderError;

pub fn write_pdf(plan: &LayoutPlan, config: &PageConfig) -> Result<Vec<u8>, RenderError> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_regular = add_font(&mut doc, Font::Regular);
    let font_bold = add_font(&mut doc, Font::Bold);
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            Font::Regular.resource_name() => font_regular,
            Font::Bold.resource_name() => font_bold,
        },
    });

    let mut kids: Vec<Object> = Vec::with_capacity(plan.pages.len());
    for page in &plan.pages {
        let content = page_content(page)
            .encode()
            .map_err(|e| RenderError::Encode(e.to_string()))?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, content));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let page_count = kids.len() as i64;
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => page_count,
        "Resources" => resources_id,
        "MediaBox" => vec![
            0.into(),
            0.into(),
            Object::Real(config.width_pt),
            Object::Real(config.height_pt),
        ],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)
        .map_err(|e| RenderError::Encode(e.to_string()))?;
    Ok(bytes)
}

fn add_font(doc: &mut Document, font: Font) -> ObjectId {
    doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => font.base_font(),
        "Encoding" => "WinAnsiEncoding",
    })
}

fn page_content(page: &PageLayout) -> Content {
    let mut operations = Vec::new();

    for item in &page.items {
        match item {
            PlacedItem::Text {
                font,
                size,
                x,
                y,
                bytes,
            } => {
                operations.push(Operation::new("BT", vec![]));
                operations.push(Operation::new(
                    "Tf",
                    vec![font.resource_name().into(), Object::Real(*size)],
                ));
                operations.push(Operation::new(
                    "Td",
                    vec![Object::Real(*x), Object::Real(*y)],
                ));
                operations.push(Operation::new(
                    "Tj",
                    vec![Object::String(bytes.clone(), StringFormat::Literal)],
                ));
                operations.push(Operation::new("ET", vec![]));
            }
            PlacedItem::Rule {
                x1,
                x2,
                y,
                thickness,
            } => {
                operations.push(Operation::new("w", vec![Object::Real(*thickness)]));
                operations.push(Operation::new(
                    "m",
                    vec![Object::Real(*x1), Object::Real(*y)],
                ));
                operations.push(Operation::new(
                    "l",
                    vec![Object::Real(*x2), Object::Real(*y)],
                ));
                operations.push(Operation::new("S", vec![]));
            }
        }
    }

    Content { operations }
}
