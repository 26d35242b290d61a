//! Page geometry and inherited page attributes

use lopdf::{Dictionary, Document, Object, ObjectId};
use serde::{Deserialize, Serialize};

/// Page tree attributes a page may inherit from its ancestors
pub const INHERITABLE_KEYS: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Parent chains deeper than this are treated as cyclic
pub const MAX_TREE_DEPTH: usize = 64;

/// A page's media box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageBox {
    pub origin_x: f64,
    pub origin_y: f64,
    pub width: f64,
    pub height: f64,
}

impl PageBox {
    /// US Letter, used when a page declares no usable media box
    pub const LETTER: PageBox = PageBox {
        origin_x: 0.0,
        origin_y: 0.0,
        width: 612.0,
        height: 792.0,
    };

    /// Parse a `[llx lly urx ury]` rectangle; corners may be given in any order
    pub fn from_rect(rect: &Object) -> Option<Self> {
        let values = rect.as_array().ok()?;
        if values.len() != 4 {
            return None;
        }
        let mut nums = [0.0f64; 4];
        for (slot, value) in nums.iter_mut().zip(values) {
            *slot = number(value)?;
        }
        let [x1, y1, x2, y2] = nums;
        let page_box = PageBox {
            origin_x: x1.min(x2),
            origin_y: y1.min(y2),
            width: (x2 - x1).abs(),
            height: (y2 - y1).abs(),
        };
        (page_box.width > 0.0 && page_box.height > 0.0).then_some(page_box)
    }

    pub fn to_rect(&self) -> Vec<Object> {
        vec![
            Object::Real(self.origin_x as f32),
            Object::Real(self.origin_y as f32),
            Object::Real((self.origin_x + self.width) as f32),
            Object::Real((self.origin_y + self.height) as f32),
        ]
    }
}

/// Numeric value of an Integer or Real object
pub fn number(obj: &Object) -> Option<f64> {
    match obj {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(r) => Some(*r as f64),
        _ => None,
    }
}

/// Follow a reference to the object it names
pub fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> Option<&'a Object> {
    match obj {
        Object::Reference(id) => doc.get_object(*id).ok(),
        other => Some(other),
    }
}

/// Look up `key` on the page, walking up the `Parent` chain
pub fn inherited_attribute<'a>(
    doc: &'a Document,
    page_id: ObjectId,
    key: &[u8],
) -> Option<&'a Object> {
    let mut node: &Dictionary = doc.get_dictionary(page_id).ok()?;
    for _ in 0..MAX_TREE_DEPTH {
        if let Ok(value) = node.get(key) {
            return resolve(doc, value);
        }
        let parent = node.get(b"Parent").ok()?.as_reference().ok()?;
        node = doc.get_dictionary(parent).ok()?;
    }
    None
}

/// The page's media box, inherited if necessary, Letter if absent or invalid
pub fn page_box(doc: &Document, page_id: ObjectId) -> PageBox {
    inherited_attribute(doc, page_id, b"MediaBox")
        .and_then(PageBox::from_rect)
        .unwrap_or_else(|| {
            tracing::debug!("Page {:?} has no usable MediaBox, assuming Letter", page_id);
            PageBox::LETTER
        })
}
