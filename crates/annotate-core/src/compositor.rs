//! Turn a page's annotations into overlay marks
//!
//! Per annotation: visibility test, clipping to the page, conversion from
//! web to render coordinates, background and border, then one text run per
//! line with optional strikethrough.

use lopdf::{Document, ObjectId};

use crate::annotation::Annotation;
use crate::error::AnnotateError;
use crate::fonts::{encode_win_ansi, resolve_font, DocumentFonts, FontRegistry};
use crate::overlay::{Mark, PageOverlay, RectStroke};
use crate::page::{page_box, PageBox};

/// Line advance as a multiple of the font size
pub const LINE_HEIGHT: f64 = 1.2;
/// Left inset of text inside its box
pub const TEXT_PADDING: f64 = 2.0;

/// A clipped annotation box in render coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Clip an annotation to the page and convert it to render coordinates.
///
/// Returns `None` for annotations lying entirely off the page, or whose
/// geometry is not a finite box with positive extents.
pub fn place_annotation(ann: &Annotation, page: &PageBox) -> Option<Placement> {
    let (x, y, w, h) = (ann.x, ann.y, ann.width, ann.height);
    if ![x, y, w, h].iter().all(|v| v.is_finite()) || w <= 0.0 || h <= 0.0 {
        return None;
    }
    if x >= page.width || y >= page.height || x + w <= 0.0 || y + h <= 0.0 {
        return None;
    }

    let cx = x.clamp(0.0, (page.width - 1.0).max(0.0));
    let cy = y.clamp(0.0, (page.height - 1.0).max(0.0));
    let cw = w.min(page.width - cx);
    let ch = h.min(page.height - cy);

    Some(Placement {
        x: page.origin_x + cx,
        y: page.origin_y + page.height - cy - ch,
        width: cw,
        height: ch,
    })
}

/// Renders annotations for the pages of one output document.
///
/// Holds the document's font cache, so one compositor should be used per
/// output document.
pub struct AnnotationCompositor<'a> {
    registry: &'a FontRegistry,
    fonts: DocumentFonts,
}

impl<'a> AnnotationCompositor<'a> {
    pub fn new(registry: &'a FontRegistry) -> Self {
        Self {
            registry,
            fonts: DocumentFonts::new(),
        }
    }

    /// Build the overlay for one page. Font objects are added to `doc` as
    /// they are first used.
    pub fn build_overlay(
        &mut self,
        doc: &mut Document,
        page: &PageBox,
        annotations: &[&Annotation],
    ) -> PageOverlay {
        let mut overlay = PageOverlay::new();
        for ann in annotations {
            let Some(placement) = place_annotation(ann, page) else {
                tracing::debug!(
                    "Skipping annotation '{}' outside page bounds ({}, {}, {}x{})",
                    ann.id,
                    ann.x,
                    ann.y,
                    ann.width,
                    ann.height
                );
                continue;
            };
            Self::draw_box(&mut overlay, ann, &placement);
            self.draw_text(doc, &mut overlay, ann, &placement);
        }
        overlay
    }

    fn draw_box(overlay: &mut PageOverlay, ann: &Annotation, at: &Placement) {
        let stroke = ann.border_stroke().dash_pattern().map(|dash| RectStroke {
            color: ann.border_color(),
            width: ann.border_width(),
            dash,
        });
        overlay.push(Mark::Rect {
            x: at.x,
            y: at.y,
            width: at.width,
            height: at.height,
            fill: ann.background_fill(),
            stroke,
        });
    }

    fn draw_text(
        &mut self,
        doc: &mut Document,
        overlay: &mut PageOverlay,
        ann: &Annotation,
        at: &Placement,
    ) {
        if ann.value.is_empty() {
            return;
        }

        let resolved = resolve_font(
            self.registry,
            ann.font_family(),
            ann.font_bold,
            ann.font_italic,
        );
        let font = self.fonts.prepare(doc, &resolved, ann.kind.fallback_font());
        let slot = overlay.font_slot(&font);

        let size = ann.font_size();
        let color = ann.font_color();
        let line_height = size * LINE_HEIGHT;
        let x = at.x + TEXT_PADDING;
        let first_baseline = at.y + at.height - line_height + size / 3.0;

        for (i, line) in ann.lines().into_iter().enumerate() {
            let baseline = first_baseline - i as f64 * line_height;
            let encoded = encode_win_ansi(line);
            if ann.font_strikethrough && !encoded.is_empty() {
                let width = font.widths.measure(&encoded, size);
                overlay.push(Mark::Rule {
                    x1: x,
                    x2: x + width,
                    y: baseline + size / 3.0,
                    color,
                });
            }
            if !encoded.is_empty() {
                overlay.push(Mark::Text {
                    x,
                    y: baseline,
                    font: slot,
                    size,
                    color,
                    text: encoded,
                });
            }
        }
    }

    /// Draw `annotations` onto a page of `doc`. Returns the number of
    /// annotations that landed on the page.
    pub fn composite_page(
        &mut self,
        doc: &mut Document,
        page_id: ObjectId,
        annotations: &[&Annotation],
    ) -> Result<usize, AnnotateError> {
        let page = page_box(doc, page_id);
        let overlay = self.build_overlay(doc, &page, annotations);
        let drawn = overlay
            .marks()
            .iter()
            .filter(|mark| matches!(mark, Mark::Rect { .. }))
            .count();
        overlay.merge_onto(doc, page_id)?;
        Ok(drawn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgb;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn text_marks(overlay: &PageOverlay) -> Vec<(f64, f64, Vec<u8>)> {
        overlay
            .marks()
            .iter()
            .filter_map(|mark| match mark {
                Mark::Text { x, y, text, .. } => Some((*x, *y, text.clone())),
                _ => None,
            })
            .collect()
    }

    fn build(annotations: &[Annotation], page: &PageBox) -> PageOverlay {
        let registry = FontRegistry::new();
        let mut doc = Document::with_version("1.7");
        let mut compositor = AnnotationCompositor::new(&registry);
        let refs: Vec<&Annotation> = annotations.iter().collect();
        compositor.build_overlay(&mut doc, page, &refs)
    }

    #[test]
    fn test_top_left_box_renders_at_page_top() {
        let ann = Annotation::text(0, 0.0, 0.0, 50.0, 20.0, "");
        let placement = place_annotation(&ann, &PageBox::LETTER).unwrap();
        assert_eq!(
            placement,
            Placement {
                x: 0.0,
                y: 772.0,
                width: 50.0,
                height: 20.0
            }
        );
    }

    #[test]
    fn test_partially_outside_is_clipped() {
        let ann = Annotation::text(0, 580.0, -10.0, 100.0, 30.0, "");
        let placement = place_annotation(&ann, &PageBox::LETTER).unwrap();
        assert_eq!(placement.x, 580.0);
        assert_eq!(placement.width, 32.0);
        assert_eq!(placement.height, 30.0);
        assert_eq!(placement.y, 762.0);
    }

    #[test]
    fn test_fully_outside_is_discarded() {
        let page = PageBox::LETTER;
        for (x, y, w, h) in [
            (612.0, 10.0, 10.0, 10.0),
            (10.0, 792.0, 10.0, 10.0),
            (-20.0, 10.0, 20.0, 10.0),
            (10.0, -30.0, 10.0, 30.0),
            (10.0, 10.0, 0.0, 10.0),
            (f64::NAN, 10.0, 10.0, 10.0),
        ] {
            let ann = Annotation::text(0, x, y, w, h, "x");
            assert_eq!(place_annotation(&ann, &page), None, "({x}, {y}, {w}, {h})");
        }
        let overlay = build(&[Annotation::text(0, 700.0, 10.0, 50.0, 10.0, "x")], &page);
        assert!(overlay.is_empty());
    }

    #[test]
    fn test_media_box_origin_offsets_render_coordinates() {
        let page = PageBox {
            origin_x: 10.0,
            origin_y: 20.0,
            width: 300.0,
            height: 400.0,
        };
        let ann = Annotation::text(0, 0.0, 0.0, 100.0, 50.0, "");
        let placement = place_annotation(&ann, &page).unwrap();
        assert_eq!((placement.x, placement.y), (10.0, 370.0));
    }

    #[test]
    fn test_text_layout() {
        let mut ann = Annotation::text(0, 100.0, 100.0, 120.0, 60.0, "one\ntwo");
        ann.font_size = Some(10.0);
        let overlay = build(&[ann], &PageBox::LETTER);
        let lines = text_marks(&overlay);

        assert_eq!(lines.len(), 2);
        // Box spans 632..692; first baseline = 692 - 12 + 10/3
        let first = 692.0 - 12.0 + 10.0 / 3.0;
        assert_eq!(lines[0].0, 102.0);
        assert!((lines[0].1 - first).abs() < 1e-9);
        assert!((lines[1].1 - (first - 12.0)).abs() < 1e-9);
        assert_eq!(lines[1].2, b"two".to_vec());
    }

    #[test]
    fn test_box_style() {
        let mut ann = Annotation::text(0, 10.0, 10.0, 50.0, 20.0, "");
        ann.border_style = Some("none".into());
        ann.background_color = Some("transparent".into());
        let overlay = build(&[ann.clone()], &PageBox::LETTER);
        assert_eq!(overlay.marks().len(), 1);
        assert!(matches!(
            overlay.marks()[0],
            Mark::Rect {
                fill: None,
                stroke: None,
                ..
            }
        ));

        ann.border_style = Some("dotted".into());
        ann.border_color = Some("red".into());
        ann.background_color = None;
        let overlay = build(&[ann], &PageBox::LETTER);
        match &overlay.marks()[0] {
            Mark::Rect {
                fill: Some(fill),
                stroke: Some(stroke),
                ..
            } => {
                assert_eq!(*fill, Rgb::WHITE);
                assert_eq!(stroke.color, Rgb::new(255, 0, 0));
                assert_eq!(stroke.dash, &[1.0f32, 2.0][..]);
                assert_eq!(stroke.width, 1.0);
            }
            other => panic!("unexpected mark {:?}", other),
        }
    }

    #[test]
    fn test_strikethrough_spans_measured_width() {
        let mut ann = Annotation::text(0, 100.0, 100.0, 120.0, 30.0, "Hello");
        ann.font_strikethrough = true;
        ann.font_color = Some("blue".into());
        ann.border_style = Some("dashed".into());
        let overlay = build(&[ann], &PageBox::LETTER);

        let rule = overlay
            .marks()
            .iter()
            .find_map(|mark| match mark {
                Mark::Rule { x1, x2, y, color } => Some((*x1, *x2, *y, *color)),
                _ => None,
            })
            .unwrap();
        let (_, baseline, _) = text_marks(&overlay)[0].clone();
        assert_eq!(rule.0, 102.0);
        assert!((rule.1 - (102.0 + 27.336)).abs() < 1e-9);
        assert!((rule.2 - (baseline + 4.0)).abs() < 1e-9);
        assert_eq!(rule.3, Rgb::new(0, 0, 255));
    }

    #[test]
    fn test_signature_uses_oblique_fallback() {
        let mut ann = Annotation::text(0, 10.0, 10.0, 100.0, 30.0, "J. Doe");
        ann.kind = crate::annotation::AnnotationKind::Signature;
        let registry = FontRegistry::new();
        let mut doc = Document::with_version("1.7");
        let mut compositor = AnnotationCompositor::new(&registry);
        let overlay = compositor.build_overlay(&mut doc, &PageBox::LETTER, &[&ann]);
        assert_eq!(overlay.fonts()[0].base_font, "Helvetica-Oblique");
    }

    #[test]
    fn test_broken_face_falls_back_per_annotation_kind() {
        let mut registry = FontRegistry::new();
        registry.register(
            "Caveat",
            crate::fonts::FontStyle::REGULAR,
            b"not a font".to_vec(),
            "memory",
        );
        let mut text = Annotation::text(0, 10.0, 10.0, 100.0, 30.0, "Name");
        text.font_family = Some("Caveat".into());
        let mut signature = Annotation::text(0, 10.0, 60.0, 100.0, 30.0, "J. Doe");
        signature.kind = crate::annotation::AnnotationKind::Signature;
        signature.font_family = Some("Caveat".into());

        let mut doc = Document::with_version("1.7");
        let mut compositor = AnnotationCompositor::new(&registry);
        let overlay = compositor.build_overlay(&mut doc, &PageBox::LETTER, &[&text, &signature]);

        let used: Vec<&str> = overlay.fonts().iter().map(|f| f.base_font.as_str()).collect();
        assert_eq!(used, vec!["Helvetica", "Helvetica-Oblique"]);
    }

    proptest! {
        #[test]
        fn clipped_box_stays_on_page(
            x in -1000.0f64..1000.0,
            y in -1000.0f64..1000.0,
            w in 0.5f64..1500.0,
            h in 0.5f64..1500.0,
        ) {
            let page = PageBox::LETTER;
            let ann = Annotation::text(0, x, y, w, h, "");
            let outside = x >= page.width || y >= page.height || x + w <= 0.0 || y + h <= 0.0;
            match place_annotation(&ann, &page) {
                None => prop_assert!(outside),
                Some(p) => {
                    prop_assert!(!outside);
                    prop_assert!(p.width > 0.0 && p.width <= page.width);
                    prop_assert!(p.height > 0.0 && p.height <= page.height);
                    prop_assert!(p.x >= 0.0 && p.x + p.width <= page.width + 1e-9);
                    prop_assert!(p.y >= 0.0 && p.y + p.height <= page.height + 1e-9);
                }
            }
        }
    }
}
