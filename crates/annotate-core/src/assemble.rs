//! Whole-document operations: the compositing pass and blank-page insertion
//!
//! Both take document bytes and return new document bytes; the input is
//! never modified.

use std::fmt;
use std::str::FromStr;

use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};
use serde::{Deserialize, Serialize};

use crate::annotation::Annotation;
use crate::compositor::AnnotationCompositor;
use crate::error::AnnotateError;
use crate::fonts::FontRegistry;
use crate::page::{page_box, PageBox, INHERITABLE_KEYS, MAX_TREE_DEPTH};

/// Burn `annotations` into the pages of a document.
///
/// Annotations address pages by zero-based index; ones pointing past the
/// last page are ignored. The output always has the input's page count.
pub fn composite_document(
    bytes: &[u8],
    annotations: &[Annotation],
    registry: &FontRegistry,
) -> Result<Vec<u8>, AnnotateError> {
    let mut doc =
        Document::load_mem(bytes).map_err(|e| AnnotateError::ParseError(e.to_string()))?;
    let pages: Vec<ObjectId> = doc.get_pages().into_values().collect();

    let mut per_page: Vec<Vec<&Annotation>> = vec![Vec::new(); pages.len()];
    for ann in annotations {
        match usize::try_from(ann.page).ok().filter(|&idx| idx < pages.len()) {
            Some(idx) => per_page[idx].push(ann),
            None => tracing::debug!(
                "Ignoring annotation '{}' for page {} (document has {} pages)",
                ann.id,
                ann.page,
                pages.len()
            ),
        }
    }

    let mut compositor = AnnotationCompositor::new(registry);
    let mut drawn = 0;
    for (page_id, page_annotations) in pages.iter().zip(&per_page) {
        if page_annotations.is_empty() {
            continue;
        }
        drawn += compositor.composite_page(&mut doc, *page_id, page_annotations)?;
    }
    tracing::info!(
        "Composited {} of {} annotations onto {} pages",
        drawn,
        annotations.len(),
        pages.len()
    );

    save(&mut doc)
}

/// Where a blank page goes relative to the reference page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsertPosition {
    Before,
    After,
}

impl FromStr for InsertPosition {
    type Err = AnnotateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "before" => Ok(InsertPosition::Before),
            "after" => Ok(InsertPosition::After),
            other => Err(AnnotateError::InvalidArgument(format!(
                "position must be 'before' or 'after', got '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for InsertPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InsertPosition::Before => write!(f, "before"),
            InsertPosition::After => write!(f, "after"),
        }
    }
}

/// Slot the new page takes, clamped to `[0, page_count]`
pub fn insertion_index(page_index: i64, position: InsertPosition, page_count: usize) -> usize {
    let slot = match position {
        InsertPosition::Before => page_index,
        InsertPosition::After => page_index.saturating_add(1),
    };
    slot.clamp(0, page_count as i64) as usize
}

/// Insert one blank page before or after the zero-based `page_index`.
///
/// The blank page takes the first page's size (Letter for an empty
/// document). The page tree is flattened into the root node; every
/// existing page object and content stream is kept as-is.
pub fn insert_blank_page(
    bytes: &[u8],
    page_index: i64,
    position: InsertPosition,
) -> Result<Vec<u8>, AnnotateError> {
    let mut doc =
        Document::load_mem(bytes).map_err(|e| AnnotateError::ParseError(e.to_string()))?;
    let mut kids: Vec<ObjectId> = doc.get_pages().into_values().collect();
    let index = insertion_index(page_index, position, kids.len());
    let size = kids
        .first()
        .map(|&first| page_box(&doc, first))
        .unwrap_or(PageBox::LETTER);

    let root_id = root_pages_id(&doc)?;
    for &page_id in &kids {
        detach_from_tree(&mut doc, page_id, root_id)?;
    }

    let blank_box = PageBox {
        origin_x: 0.0,
        origin_y: 0.0,
        width: size.width,
        height: size.height,
    };
    let content_id = doc.add_object(Stream::new(Dictionary::new(), Vec::new()));
    let blank_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => root_id,
        "MediaBox" => blank_box.to_rect(),
        "CropBox" => blank_box.to_rect(),
        "Rotate" => 0,
        "Resources" => Dictionary::new(),
        "Contents" => content_id,
    });
    kids.insert(index, blank_id);

    let root = doc
        .get_object_mut(root_id)
        .and_then(Object::as_dict_mut)
        .map_err(|_| AnnotateError::OperationError("Invalid pages dictionary".into()))?;
    root.set(
        "Kids",
        Object::Array(kids.iter().map(|&id| Object::Reference(id)).collect()),
    );
    root.set("Count", Object::Integer(kids.len() as i64));

    // Intermediate page tree nodes are now unreachable
    doc.prune_objects();

    tracing::info!(
        "Inserted blank {}x{} page at index {} ({} {}), now {} pages",
        blank_box.width,
        blank_box.height,
        index,
        position,
        page_index,
        kids.len()
    );
    save(&mut doc)
}

/// Object id of the catalog's root `Pages` node
fn root_pages_id(doc: &Document) -> Result<ObjectId, AnnotateError> {
    let catalog_id = doc
        .trailer
        .get(b"Root")
        .and_then(Object::as_reference)
        .map_err(|_| AnnotateError::OperationError("No Root in trailer".into()))?;
    doc.get_dictionary(catalog_id)
        .map_err(|_| AnnotateError::OperationError("Catalog not found".into()))?
        .get(b"Pages")
        .and_then(Object::as_reference)
        .map_err(|_| AnnotateError::OperationError("No Pages in catalog".into()))
}

/// Copy inherited attributes onto the page and hang it directly off `root_id`
fn detach_from_tree(
    doc: &mut Document,
    page_id: ObjectId,
    root_id: ObjectId,
) -> Result<(), AnnotateError> {
    let mut inherited = Vec::new();
    for key in INHERITABLE_KEYS {
        if let Some(value) = ancestor_attribute(doc, page_id, key, root_id) {
            inherited.push((key, value));
        }
    }

    let page = doc
        .get_object_mut(page_id)
        .and_then(Object::as_dict_mut)
        .map_err(|e| AnnotateError::OperationError(e.to_string()))?;
    for (key, value) in inherited {
        page.set(key.to_vec(), value);
    }
    page.set("Parent", Object::Reference(root_id));
    Ok(())
}

/// The raw value of `key` from the nearest ancestor that will not remain
/// above the page, unless the page defines it itself
fn ancestor_attribute(
    doc: &Document,
    page_id: ObjectId,
    key: &[u8],
    root_id: ObjectId,
) -> Option<Object> {
    let page = doc.get_dictionary(page_id).ok()?;
    if page.has(key) {
        return None;
    }
    let mut parent = page.get(b"Parent").and_then(Object::as_reference).ok()?;
    for _ in 0..MAX_TREE_DEPTH {
        let node = doc.get_dictionary(parent).ok()?;
        if let Ok(value) = node.get(key) {
            // Still inherited once the page hangs off the root
            if parent == root_id {
                return None;
            }
            return Some(value.clone());
        }
        if parent == root_id {
            return None;
        }
        parent = node.get(b"Parent").and_then(Object::as_reference).ok()?;
    }
    None
}

fn save(doc: &mut Document) -> Result<Vec<u8>, AnnotateError> {
    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)
        .map_err(|e| AnnotateError::OperationError(format!("Failed to save PDF: {}", e)))?;
    Ok(buffer)
}
