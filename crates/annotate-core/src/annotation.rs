//! Annotation records as authored by the editor
//!
//! Geometry is in web coordinates: origin at the page's top-left corner,
//! y growing downward, in the same unit as the page's media box.

use serde::{Deserialize, Serialize};

use crate::border::BorderStroke;
use crate::color::{parse_color, Rgb};
use crate::fonts::StandardFont;

pub const DEFAULT_FONT_SIZE: f64 = 12.0;

/// Field kind. All kinds render identically; they differ in font defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnotationKind {
    #[default]
    Text,
    Date,
    Signature,
}

impl AnnotationKind {
    pub fn default_font_family(&self) -> &'static str {
        match self {
            AnnotationKind::Text | AnnotationKind::Date => "Arial",
            AnnotationKind::Signature => "Brush Script MT",
        }
    }

    /// Built-in font used when the resolved font cannot be loaded
    pub fn fallback_font(&self) -> StandardFont {
        match self {
            AnnotationKind::Text | AnnotationKind::Date => StandardFont::Helvetica,
            AnnotationKind::Signature => StandardFont::HelveticaOblique,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Annotation {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: AnnotationKind,
    /// Zero-based page index
    #[serde(default)]
    pub page: i64,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default = "default_width")]
    pub width: f64,
    #[serde(default = "default_height")]
    pub height: f64,
    #[serde(default)]
    pub value: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(default)]
    pub font_bold: bool,
    #[serde(default)]
    pub font_italic: bool,
    #[serde(default)]
    pub font_strikethrough: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_color: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_style: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_width: Option<f64>,

    /// `transparent`, `white` or any color expression
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    /// Legacy flag, consulted only when `background_color` is absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transparent: Option<bool>,

    // Editor bookkeeping, persisted but never rendered
    #[serde(
        default,
        rename = "created_at",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multiline: Option<bool>,
}

fn default_width() -> f64 {
    100.0
}

fn default_height() -> f64 {
    20.0
}

impl Annotation {
    /// A text annotation with every styling field left at its default
    pub fn text(page: i64, x: f64, y: f64, width: f64, height: f64, value: &str) -> Self {
        Self {
            id: String::new(),
            kind: AnnotationKind::Text,
            page,
            x,
            y,
            width,
            height,
            value: value.to_string(),
            font_family: None,
            font_bold: false,
            font_italic: false,
            font_strikethrough: false,
            font_size: None,
            font_color: None,
            border_color: None,
            border_style: None,
            border_width: None,
            background_color: None,
            transparent: None,
            created_at: None,
            multiline: None,
        }
    }

    pub fn font_family(&self) -> &str {
        match self.font_family.as_deref().map(str::trim) {
            Some(family) if !family.is_empty() => family,
            _ => self.kind.default_font_family(),
        }
    }

    pub fn font_size(&self) -> f64 {
        match self.font_size {
            Some(size) if size.is_finite() && size > 0.0 => size,
            _ => DEFAULT_FONT_SIZE,
        }
    }

    pub fn font_color(&self) -> Rgb {
        parse_color(self.font_color.as_deref())
    }

    pub fn border_color(&self) -> Rgb {
        parse_color(self.border_color.as_deref())
    }

    pub fn border_width(&self) -> f64 {
        match self.border_width {
            Some(width) if width.is_finite() && width >= 0.0 => width,
            Some(_) => 0.0,
            None => 1.0,
        }
    }

    pub fn border_stroke(&self) -> BorderStroke {
        BorderStroke::from_style(self.border_style.as_deref())
    }

    /// Resolve the box fill: `None` means the background is left unpainted.
    ///
    /// `backgroundColor` wins when present. Otherwise the legacy
    /// `transparent` flag applies, and an absent flag means a white fill.
    pub fn background_fill(&self) -> Option<Rgb> {
        match self.background_color.as_deref().map(str::trim) {
            None => {
                if self.transparent.unwrap_or(false) {
                    None
                } else {
                    Some(Rgb::WHITE)
                }
            }
            Some(bg) if bg.eq_ignore_ascii_case("transparent") => None,
            Some(bg) if bg.eq_ignore_ascii_case("white") => Some(Rgb::WHITE),
            Some(bg) => Some(parse_color(Some(bg))),
        }
    }

    /// Lines of `value`, one per embedded line break
    pub fn lines(&self) -> Vec<&str> {
        self.value
            .split('\n')
            .map(|line| line.strip_suffix('\r').unwrap_or(line))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_deserializes_editor_payload() {
        let json = r##"{
            "id": "a1",
            "type": "signature",
            "page": 0,
            "x": 100, "y": 100, "width": 120, "height": 30,
            "value": "John Doe",
            "fontBold": true,
            "fontSize": 18,
            "borderStyle": "dashed",
            "backgroundColor": "#FFFF00",
            "created_at": "2025-09-20T10:00:00Z"
        }"##;
        let ann: Annotation = serde_json::from_str(json).unwrap();
        assert_eq!(ann.kind, AnnotationKind::Signature);
        assert_eq!(ann.font_family(), "Brush Script MT");
        assert!(ann.font_bold);
        assert_eq!(ann.font_size(), 18.0);
        assert_eq!(ann.background_fill(), Some(Rgb::new(255, 255, 0)));
        assert_eq!(ann.created_at.as_deref(), Some("2025-09-20T10:00:00Z"));
    }

    #[test]
    fn test_defaults_for_minimal_payload() {
        let ann: Annotation = serde_json::from_str(r#"{"id":"x"}"#).unwrap();
        assert_eq!(ann.kind, AnnotationKind::Text);
        assert_eq!(ann.page, 0);
        assert_eq!((ann.width, ann.height), (100.0, 20.0));
        assert_eq!(ann.font_family(), "Arial");
        assert_eq!(ann.font_size(), 12.0);
        assert_eq!(ann.font_color(), Rgb::BLACK);
        assert_eq!(ann.border_color(), Rgb::BLACK);
        assert_eq!(ann.border_width(), 1.0);
        assert_eq!(ann.border_stroke(), BorderStroke::SOLID);
        assert_eq!(ann.background_fill(), Some(Rgb::WHITE));
    }

    #[test]
    fn test_background_precedence() {
        let mut ann = Annotation::text(0, 0.0, 0.0, 10.0, 10.0, "");

        ann.transparent = Some(true);
        assert_eq!(ann.background_fill(), None);

        ann.transparent = Some(false);
        assert_eq!(ann.background_fill(), Some(Rgb::WHITE));

        // backgroundColor supersedes the legacy flag in both directions
        ann.transparent = Some(true);
        ann.background_color = Some("white".into());
        assert_eq!(ann.background_fill(), Some(Rgb::WHITE));

        ann.transparent = Some(false);
        ann.background_color = Some("transparent".into());
        assert_eq!(ann.background_fill(), None);

        ann.background_color = Some("rgb(0,0,255)".into());
        assert_eq!(ann.background_fill(), Some(Rgb::new(0, 0, 255)));

        ann.background_color = Some("bogus".into());
        assert_eq!(ann.background_fill(), Some(Rgb::BLACK));
    }

    #[test]
    fn test_invalid_numeric_styles_are_sanitised() {
        let mut ann = Annotation::text(0, 0.0, 0.0, 10.0, 10.0, "");
        ann.font_size = Some(-4.0);
        assert_eq!(ann.font_size(), DEFAULT_FONT_SIZE);
        ann.font_size = Some(f64::NAN);
        assert_eq!(ann.font_size(), DEFAULT_FONT_SIZE);
        ann.border_width = Some(-2.0);
        assert_eq!(ann.border_width(), 0.0);
    }

    #[test]
    fn test_blank_family_uses_kind_default() {
        let mut ann = Annotation::text(0, 0.0, 0.0, 10.0, 10.0, "");
        ann.font_family = Some("   ".into());
        assert_eq!(ann.font_family(), "Arial");
        ann.kind = AnnotationKind::Date;
        assert_eq!(ann.font_family(), "Arial");
        assert_eq!(ann.kind.fallback_font(), StandardFont::Helvetica);
        assert_eq!(
            AnnotationKind::Signature.fallback_font().base_font(),
            "Helvetica-Oblique"
        );
    }

    #[test]
    fn test_lines_split_on_breaks() {
        let ann = Annotation::text(0, 0.0, 0.0, 10.0, 10.0, "one\r\ntwo\nthree");
        assert_eq!(ann.lines(), vec!["one", "two", "three"]);
        let empty = Annotation::text(0, 0.0, 0.0, 10.0, 10.0, "");
        assert_eq!(empty.lines(), vec![""]);
    }

    #[test]
    fn test_serialization_keeps_wire_names() {
        let mut ann = Annotation::text(2, 1.0, 2.0, 3.0, 4.0, "hi");
        ann.font_family = Some("Georgia".into());
        let value = serde_json::to_value(&ann).unwrap();
        assert_eq!(value["type"], "text");
        assert_eq!(value["fontFamily"], "Georgia");
        assert_eq!(value["fontStrikethrough"], false);
        assert!(value.get("backgroundColor").is_none());
    }
}
