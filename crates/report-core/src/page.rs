//! Single-page document construction
//!
//! Every composed piece of the report (detail page, captioned image page,
//! placeholder page) is built as its own one-page document and later
//! concatenated by [`crate::assemble`]. Pages are A4 with text set in the
//! standard Helvetica font.

use crate::error::ReportError;
use crate::images::ImageXObject;
use lopdf::{dictionary, Document, Object, Stream};

/// A4 page size in PDF points.
pub const A4_WIDTH: f32 = 595.28;
pub const A4_HEIGHT: f32 = 841.89;

/// Bounding box images are fitted into, centered on the page.
pub const IMAGE_MAX_WIDTH: f32 = 480.0;
pub const IMAGE_MAX_HEIGHT: f32 = 640.0;

/// One line of text at an absolute page position.
#[derive(Debug, Clone)]
pub struct TextLine {
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub text: String,
}

pub fn line(x: f32, y: f32, size: f32, text: impl Into<String>) -> TextLine {
    TextLine {
        x,
        y,
        size,
        text: text.into(),
    }
}

/// Build a one-page document containing only text.
pub fn build_text_page(lines: &[TextLine]) -> Result<Vec<u8>, ReportError> {
    build_page(lines, None)
}

/// Build a one-page document with a caption and a centered, aspect-fit image.
pub fn build_image_page(lines: &[TextLine], image: ImageXObject) -> Result<Vec<u8>, ReportError> {
    build_page(lines, Some(image))
}

fn build_page(lines: &[TextLine], image: Option<ImageXObject>) -> Result<Vec<u8>, ReportError> {
    let mut doc = Document::with_version("1.7");

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });

    let mut content = String::new();
    for text_line in lines {
        content.push_str(&text_op(text_line));
    }

    let mut resources = dictionary! {
        "Font" => dictionary! { "F1" => Object::Reference(font_id) },
    };

    if let Some(image) = image {
        content.push_str(&image_op(&image));
        let image_id = doc.add_object(Object::Stream(image.stream));
        resources.set(
            "XObject",
            dictionary! { "Im1" => Object::Reference(image_id) },
        );
    }

    let content_id = doc.add_object(Object::Stream(Stream::new(
        dictionary! {},
        content.into_bytes(),
    )));

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "MediaBox" => vec![
            0.into(),
            0.into(),
            Object::Real(A4_WIDTH),
            Object::Real(A4_HEIGHT),
        ],
        "Resources" => resources,
        "Contents" => Object::Reference(content_id),
    });

    let pages_id = doc.add_object(dictionary! {
        "Type" => "Pages",
        "Kids" => vec![Object::Reference(page_id)],
        "Count" => 1,
    });

    if let Ok(page) = doc.get_object_mut(page_id) {
        if let Ok(dict) = page.as_dict_mut() {
            dict.set("Parent", Object::Reference(pages_id));
        }
    }

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => Object::Reference(pages_id),
    });
    doc.trailer.set("Root", Object::Reference(catalog_id));

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)
        .map_err(|e| ReportError::ComposeError(format!("Failed to save page: {}", e)))?;
    Ok(buffer)
}

fn text_op(line: &TextLine) -> String {
    format!(
        "BT /F1 {size:.1} Tf {x:.2} {y:.2} Td ({text}) Tj ET\n",
        size = line.size,
        x = line.x,
        y = line.y,
        text = escape_pdf_text(&line.text),
    )
}

fn image_op(image: &ImageXObject) -> String {
    let (width, height) = (image.width as f32, image.height as f32);
    let scale = (IMAGE_MAX_WIDTH / width)
        .min(IMAGE_MAX_HEIGHT / height)
        .min(1.0);
    let draw_width = width * scale;
    let draw_height = height * scale;
    let x = (A4_WIDTH - draw_width) / 2.0;
    let y = (A4_HEIGHT - draw_height) / 2.0;

    format!("q {draw_width:.2} 0 0 {draw_height:.2} {x:.2} {y:.2} cm /Im1 Do Q\n")
}

/// Escape the characters with meaning inside a PDF literal string.
fn escape_pdf_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '(' => escaped.push_str("\\("),
            ')' => escaped.push_str("\\)"),
            '\n' | '\r' => escaped.push(' '),
            other => escaped.push(other),
        }
    }
    escaped
}

#[cfg(test)]
pub mod test_fixtures {
    use super::*;

    /// One-page PDF with a single line of identifiable text.
    pub fn single_text_page_pdf(text: &str) -> Vec<u8> {
        build_text_page(&[line(50.0, 700.0, 12.0, text)]).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::Document;

    #[test]
    fn test_text_page_is_a_valid_single_page_pdf() {
        let bytes = build_text_page(&[line(40.0, 780.0, 18.0, "Expense 1")]).unwrap();
        assert!(bytes.starts_with(b"%PDF-"));
        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }

    #[test]
    fn test_text_with_parentheses_survives() {
        let bytes = build_text_page(&[line(40.0, 700.0, 12.0, "(category) \\ test")]).unwrap();
        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }

    #[test]
    fn test_escape_pdf_text() {
        assert_eq!(escape_pdf_text("a(b)c"), "a\\(b\\)c");
        assert_eq!(escape_pdf_text("back\\slash"), "back\\\\slash");
        assert_eq!(escape_pdf_text("multi\nline"), "multi line");
    }

    #[test]
    fn test_image_op_centers_and_fits() {
        // 960x1280 scales by 0.5 to 480x640, centered on A4.
        let op = image_op(&ImageXObject {
            width: 960,
            height: 1280,
            stream: Stream::new(dictionary! {}, Vec::new()),
        });
        assert!(op.contains("480.00 0 0 640.00"));
        assert!(op.contains(" 57.64 "));
    }

    #[test]
    fn test_small_images_are_not_upscaled() {
        let op = image_op(&ImageXObject {
            width: 100,
            height: 50,
            stream: Stream::new(dictionary! {}, Vec::new()),
        });
        assert!(op.contains("100.00 0 0 50.00"));
    }
}
