//! PDF annotation compositing
//!
//! Burns editor-placed annotation fields (text, date, signature) into PDF
//! page content, and inserts blank pages into existing documents.
//!
//! - [`composite_document`]: draw every annotation onto its page
//! - [`insert_blank_page`]: splice a blank page in before/after a page
//! - [`document_info`]: page count and page sizes, for upload validation

pub mod annotation;
pub mod assemble;
pub mod border;
pub mod color;
pub mod compositor;
pub mod error;
pub mod fonts;
pub mod overlay;
pub mod page;

pub use annotation::{Annotation, AnnotationKind};
pub use assemble::{composite_document, insert_blank_page, insertion_index, InsertPosition};
pub use border::BorderStroke;
pub use color::{parse_color, Rgb};
pub use compositor::{place_annotation, AnnotationCompositor, Placement};
pub use error::AnnotateError;
pub use fonts::{resolve_font, FontRegistry, FontStyle, StandardFont};
pub use page::PageBox;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageSize {
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentInfo {
    pub page_count: usize,
    pub pages: Vec<PageSize>,
}

fn load(bytes: &[u8]) -> Result<lopdf::Document, AnnotateError> {
    lopdf::Document::load_mem(bytes).map_err(|e| AnnotateError::ParseError(e.to_string()))
}

/// Parse PDF bytes and return page count
pub fn get_page_count(bytes: &[u8]) -> Result<u32, AnnotateError> {
    Ok(load(bytes)?.get_pages().len() as u32)
}

/// Page count and media box size of every page
pub fn document_info(bytes: &[u8]) -> Result<DocumentInfo, AnnotateError> {
    let doc = load(bytes)?;
    let pages: Vec<PageSize> = doc
        .get_pages()
        .into_values()
        .map(|page_id| {
            let page_box = page::page_box(&doc, page_id);
            PageSize {
                width: page_box.width,
                height: page_box.height,
            }
        })
        .collect();
    Ok(DocumentInfo {
        page_count: pages.len(),
        pages,
    })
}
