//! Border style resolution

/// How an annotation box outline is stroked.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BorderStroke {
    /// `none`: the outline is not stroked at all
    NoBorder,
    /// Stroke with the given dash array; empty means a solid line
    Dash(&'static [f32]),
}

const SOLID: &[f32] = &[];
const DASHED: &[f32] = &[3.0, 3.0];
const DOTTED: &[f32] = &[1.0, 2.0];

impl BorderStroke {
    pub const SOLID: BorderStroke = BorderStroke::Dash(SOLID);

    /// Map a CSS border style name. Unknown or missing names are solid.
    pub fn from_style(style: Option<&str>) -> Self {
        let Some(style) = style else {
            return Self::SOLID;
        };
        match style.trim().to_lowercase().as_str() {
            "none" => BorderStroke::NoBorder,
            "dashed" => BorderStroke::Dash(DASHED),
            "dotted" => BorderStroke::Dash(DOTTED),
            _ => Self::SOLID,
        }
    }

    pub fn should_stroke(&self) -> bool {
        !matches!(self, BorderStroke::NoBorder)
    }

    pub fn dash_pattern(&self) -> Option<&'static [f32]> {
        match self {
            BorderStroke::NoBorder => None,
            BorderStroke::Dash(pattern) => Some(pattern),
        }
    }
}
