//! Registered font files, keyed by family
//!
//! Built once at process start and shared read-only between requests.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use super::FontStyle;
use crate::error::AnnotateError;

/// Trailing file-stem tokens that name a style rather than a family
const STYLE_TOKENS: &[&str] = &[
    "regular",
    "bold",
    "italic",
    "bolditalic",
    "oblique",
    "boldoblique",
];

const FONT_EXTENSIONS: &[&str] = &["ttf", "otf"];

/// Metric-compatible substitutes registered under the Liberation names
pub const DEFAULT_ALIASES: &[(&str, &str)] = &[
    ("Arial", "LiberationSans"),
    ("Times New Roman", "LiberationSerif"),
    ("Courier New", "LiberationMono"),
];

/// One registered font file
#[derive(Debug)]
pub struct FontFace {
    pub family: String,
    pub style: FontStyle,
    /// Where the bytes came from, for diagnostics
    pub source: String,
    pub data: Arc<[u8]>,
}

impl FontFace {
    pub fn display_name(&self) -> String {
        let suffix = match (self.style.bold, self.style.italic) {
            (true, true) => "-BoldItalic",
            (true, false) => "-Bold",
            (false, true) => "-Italic",
            (false, false) => "",
        };
        format!("{}{}", self.family, suffix)
    }
}

#[derive(Debug, Default)]
pub struct FontRegistry {
    families: HashMap<String, Vec<Arc<FontFace>>>,
    aliases: HashMap<String, String>,
}

fn family_key(family: &str) -> String {
    family.trim().to_lowercase()
}

impl FontRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register font bytes for a family with an explicitly declared style
    pub fn register(
        &mut self,
        family: &str,
        style: FontStyle,
        data: impl Into<Arc<[u8]>>,
        source: impl Into<String>,
    ) {
        let face = FontFace {
            family: family.trim().to_string(),
            style,
            source: source.into(),
            data: data.into(),
        };
        self.families
            .entry(family_key(family))
            .or_default()
            .push(Arc::new(face));
    }

    /// Register a font file, inferring its style from the file name
    pub fn register_file(&mut self, family: &str, path: &Path) -> Result<(), AnnotateError> {
        let data = std::fs::read(path)
            .map_err(|e| AnnotateError::FontError(format!("{}: {}", path.display(), e)))?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let style = FontStyle::from_file_name(&file_name);
        tracing::debug!(
            "Registered font file {} as {} (bold={}, italic={})",
            path.display(),
            family,
            style.bold,
            style.italic
        );
        self.register(family, style, data, path.display().to_string());
        Ok(())
    }

    /// Register every font file in a directory, deriving families from file stems.
    ///
    /// Unreadable files are skipped with a warning. Returns the number of
    /// files registered.
    pub fn load_dir(&mut self, dir: &Path) -> Result<usize, AnnotateError> {
        let entries = std::fs::read_dir(dir)
            .map_err(|e| AnnotateError::FontError(format!("{}: {}", dir.display(), e)))?;

        let mut paths: Vec<_> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.extension()
                    .and_then(|ext| ext.to_str())
                    .map(|ext| FONT_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
                    .unwrap_or(false)
            })
            .collect();
        // Regular files first so they become each family's fallback face
        paths.sort_by_key(|path| {
            let name = path.file_name().map(|n| n.to_string_lossy().into_owned());
            let style = FontStyle::from_file_name(name.as_deref().unwrap_or_default());
            (style != FontStyle::REGULAR, path.clone())
        });

        let mut count = 0;
        for path in paths {
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let family = family_from_stem(stem);
            match self.register_file(&family, &path) {
                Ok(()) => count += 1,
                Err(e) => tracing::warn!("Skipping font file: {}", e),
            }
        }
        Ok(count)
    }

    /// Route requests for `alias` to the registered `family`
    pub fn alias(&mut self, alias: &str, family: &str) {
        self.aliases.insert(family_key(alias), family_key(family));
    }

    pub fn add_default_aliases(&mut self) {
        for (alias, family) in DEFAULT_ALIASES {
            self.alias(alias, family);
        }
    }

    /// All faces registered for a family, following an alias when the family
    /// itself has no faces
    pub fn faces(&self, family: &str) -> Option<&[Arc<FontFace>]> {
        let key = family_key(family);
        if let Some(faces) = self.families.get(&key) {
            return Some(faces.as_slice());
        }
        self.aliases
            .get(&key)
            .and_then(|target| self.families.get(target))
            .map(Vec::as_slice)
    }

    pub fn contains(&self, family: &str) -> bool {
        self.faces(family).is_some()
    }

    /// Pick the face matching the requested style, else the family's first face
    pub fn find(&self, family: &str, bold: bool, italic: bool) -> Option<Arc<FontFace>> {
        let faces = self.faces(family)?;
        let wanted = FontStyle::new(bold, italic);
        faces
            .iter()
            .find(|face| face.style == wanted)
            .or_else(|| faces.first())
            .cloned()
    }

    pub fn family_count(&self) -> usize {
        self.families.len()
    }

    pub fn face_count(&self) -> usize {
        self.families.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.families.is_empty()
    }
}

/// `LiberationSans-BoldItalic` -> `LiberationSans`; stems without a style
/// suffix are used whole.
fn family_from_stem(stem: &str) -> String {
    if let Some((family, suffix)) = stem.rsplit_once('-') {
        if !family.is_empty() && STYLE_TOKENS.contains(&suffix.to_lowercase().as_str()) {
            return family.to_string();
        }
    }
    stem.to_string()
}
