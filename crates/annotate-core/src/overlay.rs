//! The rendered annotation layer for one page, and its merge onto the page
//!
//! Marks are in render coordinates (bottom-left origin). The original
//! content streams are left untouched: the page's `Contents` becomes
//! `[q, original..., Q overlay]` so nothing in the original graphics state
//! leaks into the overlay.

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, StringFormat};

use crate::color::Rgb;
use crate::error::AnnotateError;
use crate::fonts::PreparedFont;
use crate::page::{inherited_attribute, resolve};

const FONT_NAME_PREFIX: &str = "AnnF";

#[derive(Debug, Clone, PartialEq)]
pub struct RectStroke {
    pub color: Rgb,
    pub width: f64,
    /// Empty for a solid line
    pub dash: &'static [f32],
}

/// One drawing primitive
#[derive(Debug, Clone, PartialEq)]
pub enum Mark {
    Rect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        fill: Option<Rgb>,
        stroke: Option<RectStroke>,
    },
    /// A single line of WinAnsi-encoded text starting at its baseline
    Text {
        x: f64,
        y: f64,
        font: usize,
        size: f64,
        color: Rgb,
        text: Vec<u8>,
    },
    /// A 1-unit solid horizontal line
    Rule { x1: f64, x2: f64, y: f64, color: Rgb },
}

#[derive(Debug, Default)]
pub struct PageOverlay {
    marks: Vec<Mark>,
    fonts: Vec<PreparedFont>,
}

fn real(v: f64) -> Object {
    Object::Real(v as f32)
}

fn color_operands(color: Rgb) -> Vec<Object> {
    color.to_pdf().into_iter().map(Object::Real).collect()
}

impl PageOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index used by [`Mark::Text`] to refer to `font`
    pub fn font_slot(&mut self, font: &PreparedFont) -> usize {
        if let Some(idx) = self
            .fonts
            .iter()
            .position(|f| f.object_id == font.object_id)
        {
            return idx;
        }
        self.fonts.push(font.clone());
        self.fonts.len() - 1
    }

    pub fn push(&mut self, mark: Mark) {
        self.marks.push(mark);
    }

    pub fn marks(&self) -> &[Mark] {
        &self.marks
    }

    pub fn fonts(&self) -> &[PreparedFont] {
        &self.fonts
    }

    pub fn is_empty(&self) -> bool {
        self.marks.is_empty()
    }

    /// Content stream operations, with fonts addressed by resource name
    fn operations(&self, font_names: &[String]) -> Vec<Operation> {
        let mut ops = Vec::new();
        for mark in &self.marks {
            match mark {
                Mark::Rect {
                    x,
                    y,
                    width,
                    height,
                    fill,
                    stroke,
                } => {
                    ops.push(Operation::new("q", vec![]));
                    if let Some(stroke) = stroke {
                        ops.push(Operation::new("RG", color_operands(stroke.color)));
                        ops.push(Operation::new("w", vec![real(stroke.width)]));
                        let dash = stroke.dash.iter().map(|&d| Object::Real(d)).collect();
                        ops.push(Operation::new("d", vec![Object::Array(dash), 0.into()]));
                    }
                    if let Some(fill) = fill {
                        ops.push(Operation::new("rg", color_operands(*fill)));
                    }
                    ops.push(Operation::new(
                        "re",
                        vec![real(*x), real(*y), real(*width), real(*height)],
                    ));
                    let paint = match (fill.is_some(), stroke.is_some()) {
                        (true, true) => "B",
                        (false, true) => "S",
                        (true, false) => "f",
                        (false, false) => "n",
                    };
                    ops.push(Operation::new(paint, vec![]));
                    ops.push(Operation::new("Q", vec![]));
                }
                Mark::Text {
                    x,
                    y,
                    font,
                    size,
                    color,
                    text,
                } => {
                    let Some(name) = font_names.get(*font) else {
                        continue;
                    };
                    ops.push(Operation::new("BT", vec![]));
                    ops.push(Operation::new(
                        "Tf",
                        vec![Object::Name(name.clone().into_bytes()), real(*size)],
                    ));
                    ops.push(Operation::new("rg", color_operands(*color)));
                    ops.push(Operation::new("Td", vec![real(*x), real(*y)]));
                    ops.push(Operation::new(
                        "Tj",
                        vec![Object::String(text.clone(), StringFormat::Literal)],
                    ));
                    ops.push(Operation::new("ET", vec![]));
                }
                Mark::Rule { x1, x2, y, color } => {
                    ops.push(Operation::new("q", vec![]));
                    ops.push(Operation::new("RG", color_operands(*color)));
                    ops.push(Operation::new("w", vec![1.into()]));
                    ops.push(Operation::new("d", vec![Object::Array(vec![]), 0.into()]));
                    ops.push(Operation::new("m", vec![real(*x1), real(*y)]));
                    ops.push(Operation::new("l", vec![real(*x2), real(*y)]));
                    ops.push(Operation::new("S", vec![]));
                    ops.push(Operation::new("Q", vec![]));
                }
            }
        }
        ops
    }

    /// Layer the overlay over the page's existing content.
    ///
    /// An empty overlay leaves the page untouched.
    pub fn merge_onto(&self, doc: &mut Document, page_id: ObjectId) -> Result<(), AnnotateError> {
        if self.is_empty() {
            return Ok(());
        }

        let mut resources = effective_resources(doc, page_id);
        let mut font_dict = match resources.get(b"Font").ok().and_then(|f| resolve(doc, f)) {
            Some(Object::Dictionary(dict)) => dict.clone(),
            _ => Dictionary::new(),
        };

        let mut font_names = Vec::with_capacity(self.fonts.len());
        let mut counter = 0;
        for font in &self.fonts {
            let name = loop {
                counter += 1;
                let candidate = format!("{}{}", FONT_NAME_PREFIX, counter);
                if !font_dict.has(candidate.as_bytes()) {
                    break candidate;
                }
            };
            font_dict.set(name.clone(), Object::Reference(font.object_id));
            font_names.push(name);
        }
        resources.set("Font", Object::Dictionary(font_dict));

        let existing: Vec<Object> = match doc.get_dictionary(page_id) {
            Ok(page) => match page.get(b"Contents") {
                Ok(Object::Array(items)) => items.clone(),
                Ok(Object::Reference(id)) => match doc.get_object(*id) {
                    // An indirect array of streams
                    Ok(Object::Array(items)) => items.clone(),
                    _ => vec![Object::Reference(*id)],
                },
                _ => Vec::new(),
            },
            Err(e) => return Err(AnnotateError::OperationError(e.to_string())),
        };

        let overlay = Content {
            operations: self.operations(&font_names),
        }
        .encode()
        .map_err(|e| AnnotateError::OperationError(e.to_string()))?;
        let mut overlay_bytes = b"\nQ\n".to_vec();
        overlay_bytes.extend_from_slice(&overlay);

        let save_id = doc.add_object(Stream::new(Dictionary::new(), b"q\n".to_vec()));
        let overlay_id = doc.add_object(Stream::new(Dictionary::new(), overlay_bytes));

        let mut contents = Vec::with_capacity(existing.len() + 2);
        contents.push(Object::Reference(save_id));
        contents.extend(existing);
        contents.push(Object::Reference(overlay_id));

        let page = doc
            .get_object_mut(page_id)
            .and_then(Object::as_dict_mut)
            .map_err(|e| AnnotateError::OperationError(e.to_string()))?;
        page.set("Resources", Object::Dictionary(resources));
        page.set("Contents", Object::Array(contents));
        Ok(())
    }
}

/// The page's resource dictionary (own or inherited) as an owned copy
fn effective_resources(doc: &Document, page_id: ObjectId) -> Dictionary {
    match inherited_attribute(doc, page_id, b"Resources") {
        Some(Object::Dictionary(dict)) => dict.clone(),
        _ => Dictionary::new(),
    }
}
