//! Font objects written into an output document
//!
//! Each output document gets its own [`DocumentFonts`] so a font used by
//! several annotations (or pages) is written once.

use std::collections::{HashMap, HashSet};
use std::io::Write;
use std::sync::Arc;

use flate2::write::ZlibEncoder;
use flate2::Compression;
use lopdf::{dictionary, Document, Object, ObjectId, Stream};
use ttf_parser::Face;

use super::metrics::{FIRST_CHAR, LAST_CHAR};
use super::{FontFace, FontRef, GlyphWidths, ResolvedFont, StandardFont};
use crate::error::AnnotateError;

/// A font dictionary already added to the output document
#[derive(Debug, Clone)]
pub struct PreparedFont {
    pub base_font: String,
    pub object_id: ObjectId,
    pub widths: Arc<GlyphWidths>,
}

/// Cache key. Registered faces are identified by allocation, which the
/// registry keeps alive for longer than any output document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum FontKey {
    Standard(StandardFont),
    Registered(usize),
}

#[derive(Debug, Default)]
pub struct DocumentFonts {
    prepared: HashMap<FontKey, PreparedFont>,
    /// Registered faces that failed to embed
    failed: HashSet<FontKey>,
}

impl DocumentFonts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get (or write) the font object for a resolved font.
    ///
    /// A registered face that fails to parse is logged once and replaced by
    /// `fallback` wherever it is requested in this document.
    pub fn prepare(
        &mut self,
        doc: &mut Document,
        resolved: &ResolvedFont,
        fallback: StandardFont,
    ) -> PreparedFont {
        let face = match &resolved.font {
            FontRef::Standard(font) => return self.standard(doc, *font),
            FontRef::Registered(face) => face,
        };
        let key = FontKey::Registered(Arc::as_ptr(face) as usize);
        if let Some(prepared) = self.prepared.get(&key) {
            return prepared.clone();
        }
        if self.failed.contains(&key) {
            return self.standard(doc, fallback);
        }

        match embed_true_type(doc, face) {
            Ok(prepared) => {
                self.prepared.insert(key, prepared.clone());
                prepared
            }
            Err(e) => {
                tracing::warn!(
                    "Font {} from {} failed to load, using {}: {}",
                    face.display_name(),
                    face.source,
                    fallback.base_font(),
                    e
                );
                self.failed.insert(key);
                self.standard(doc, fallback)
            }
        }
    }

    fn standard(&mut self, doc: &mut Document, font: StandardFont) -> PreparedFont {
        let key = FontKey::Standard(font);
        if let Some(prepared) = self.prepared.get(&key) {
            return prepared.clone();
        }
        let object_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => font.base_font(),
            "Encoding" => "WinAnsiEncoding",
        });
        let prepared = PreparedFont {
            base_font: font.base_font().to_string(),
            object_id,
            widths: Arc::new(GlyphWidths::for_standard(font)),
        };
        self.prepared.insert(key, prepared.clone());
        prepared
    }

    /// Number of font objects written so far
    pub fn len(&self) -> usize {
        self.prepared.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prepared.is_empty()
    }
}

/// Embed a TrueType face as a simple WinAnsi font
fn embed_true_type(doc: &mut Document, face: &FontFace) -> Result<PreparedFont, AnnotateError> {
    let parsed = Face::parse(&face.data, 0).map_err(|e| AnnotateError::FontError(e.to_string()))?;
    let scale = 1000.0 / parsed.units_per_em().max(1) as f32;
    let widths = GlyphWidths::from_face(&parsed);
    let bbox = parsed.global_bounding_box();
    let cap_height = parsed.capital_height().unwrap_or(parsed.ascender());
    let italic = parsed.is_italic() || face.style.italic;
    let base_font: String = face
        .display_name()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();

    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(&face.data)
        .map_err(|e| AnnotateError::FontError(e.to_string()))?;
    let compressed = encoder
        .finish()
        .map_err(|e| AnnotateError::FontError(e.to_string()))?;

    let font_file = Stream::new(
        dictionary! {
            "Filter" => "FlateDecode",
            "Length1" => face.data.len() as i64,
        },
        compressed,
    );
    let font_file_id = doc.add_object(font_file);

    let scaled = |v: i16| Object::Integer((v as f32 * scale).round() as i64);
    // Nonsymbolic, plus Italic when slanted
    let flags = if italic { 32 + 64 } else { 32 };
    let descriptor_id = doc.add_object(dictionary! {
        "Type" => "FontDescriptor",
        "FontName" => Object::Name(base_font.clone().into_bytes()),
        "Flags" => flags,
        "FontBBox" => vec![
            scaled(bbox.x_min),
            scaled(bbox.y_min),
            scaled(bbox.x_max),
            scaled(bbox.y_max),
        ],
        "ItalicAngle" => if italic { -12 } else { 0 },
        "Ascent" => scaled(parsed.ascender()),
        "Descent" => scaled(parsed.descender()),
        "CapHeight" => scaled(cap_height),
        "StemV" => 80,
        "FontFile2" => font_file_id,
    });

    let width_array: Vec<Object> = widths
        .as_slice()
        .iter()
        .map(|&w| Object::Integer(w as i64))
        .collect();
    let object_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "TrueType",
        "BaseFont" => Object::Name(base_font.clone().into_bytes()),
        "FirstChar" => FIRST_CHAR as i64,
        "LastChar" => LAST_CHAR as i64,
        "Widths" => width_array,
        "FontDescriptor" => descriptor_id,
        "Encoding" => "WinAnsiEncoding",
    });

    tracing::debug!("Embedded font {} ({} bytes)", base_font, face.data.len());
    Ok(PreparedFont {
        base_font,
        object_id,
        widths: Arc::new(widths),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fonts::{resolve_font, FontRegistry, FontStyle};

    #[test]
    fn test_standard_font_written_once() {
        let mut doc = Document::with_version("1.7");
        let registry = FontRegistry::new();
        let mut fonts = DocumentFonts::new();
        let resolved = resolve_font(&registry, "Arial", false, false);

        let first = fonts.prepare(&mut doc, &resolved, StandardFont::Helvetica);
        let second = fonts.prepare(&mut doc, &resolved, StandardFont::Helvetica);

        assert_eq!(first.object_id, second.object_id);
        assert_eq!(first.base_font, "Helvetica");
        assert_eq!(doc.objects.len(), 1);

        let dict = doc.get_object(first.object_id).unwrap().as_dict().unwrap();
        assert_eq!(dict.get(b"Subtype").unwrap().as_name().unwrap(), b"Type1");
        assert_eq!(
            dict.get(b"BaseFont").unwrap().as_name().unwrap(),
            b"Helvetica"
        );
    }

    #[test]
    fn test_unparseable_face_falls_back() {
        let mut doc = Document::with_version("1.7");
        let mut registry = FontRegistry::new();
        registry.register("Caveat", FontStyle::REGULAR, b"not a font".to_vec(), "memory");
        let mut fonts = DocumentFonts::new();
        let resolved = resolve_font(&registry, "Caveat", false, false);
        assert!(matches!(resolved.font, FontRef::Registered(_)));

        let prepared = fonts.prepare(&mut doc, &resolved, StandardFont::HelveticaOblique);
        assert_eq!(prepared.base_font, "Helvetica-Oblique");

        let again = fonts.prepare(&mut doc, &resolved, StandardFont::HelveticaOblique);
        assert_eq!(again.object_id, prepared.object_id);
        assert_eq!(doc.objects.len(), 1);
        assert_eq!(fonts.len(), 1);
    }

    #[test]
    fn test_failed_face_honours_each_fallback() {
        let mut doc = Document::with_version("1.7");
        let mut registry = FontRegistry::new();
        registry.register("Caveat", FontStyle::REGULAR, b"not a font".to_vec(), "memory");
        let mut fonts = DocumentFonts::new();
        let resolved = resolve_font(&registry, "Caveat", false, false);

        let text = fonts.prepare(&mut doc, &resolved, StandardFont::Helvetica);
        let signature = fonts.prepare(&mut doc, &resolved, StandardFont::HelveticaOblique);

        assert_eq!(text.base_font, "Helvetica");
        assert_eq!(signature.base_font, "Helvetica-Oblique");
        assert_ne!(text.object_id, signature.object_id);
    }

    #[test]
    fn test_registered_face_not_shadowed_by_builtin_of_same_name() {
        let mut doc = Document::with_version("1.7");
        let mut registry = FontRegistry::new();
        registry.register("Broken", FontStyle::REGULAR, b"not a font".to_vec(), "memory");
        registry.register(
            "Helvetica",
            FontStyle::REGULAR,
            crate::test_support::minimal_true_type(),
            "memory",
        );
        let mut fonts = DocumentFonts::new();

        let broken = resolve_font(&registry, "Broken", false, false);
        let builtin = fonts.prepare(&mut doc, &broken, StandardFont::Helvetica);
        assert_eq!(builtin.base_font, "Helvetica");

        let registered = resolve_font(&registry, "Helvetica", false, false);
        assert!(matches!(registered.font, FontRef::Registered(_)));
        let embedded = fonts.prepare(&mut doc, &registered, StandardFont::Helvetica);

        assert_ne!(embedded.object_id, builtin.object_id);
        let dict = doc.get_object(embedded.object_id).unwrap().as_dict().unwrap();
        assert_eq!(dict.get(b"Subtype").unwrap().as_name().unwrap(), b"TrueType");
        assert!(dict.get(b"FontDescriptor").is_ok());
        assert_eq!(fonts.len(), 2);
    }
}
