//! TrueType font engine using `ttf-parser`.
//!
//! Loads a TTF/OTF face once, then lays a string out along a baseline into a
//! flattened [`Path`] (advances plus `kern` table pairs), which the
//! rasterizer turns into coverage.

use std::fmt;
use std::sync::Arc;

use crate::error::RenderError;
use crate::path::{Path, PathBuilder};

/// Shared, immutable font face.
///
/// Cloning is cheap: the font bytes are reference counted, so one parsed
/// asset can back any number of generators.
#[derive(Clone)]
pub struct Font {
    data: Arc<Vec<u8>>,
    face_index: u32,
}

impl fmt::Debug for Font {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Font")
            .field("bytes", &self.data.len())
            .field("face_index", &self.face_index)
            .finish()
    }
}

impl Font {
    /// Create a font from raw TTF/OTF data (face 0).
    pub fn from_data(data: Vec<u8>) -> Result<Self, RenderError> {
        Self::from_data_index(data, 0)
    }

    /// Create a font from raw data, selecting `face_index` in a collection.
    ///
    /// Validates that the data contains a parseable font face.
    pub fn from_data_index(data: Vec<u8>, face_index: u32) -> Result<Self, RenderError> {
        ttf_parser::Face::parse(&data, face_index)
            .map_err(|e| RenderError::FontParse(e.to_string()))?;
        Ok(Self {
            data: Arc::new(data),
            face_index,
        })
    }

    /// Parse the stored face. Parsing is zero-copy and cheap.
    fn face(&self) -> Result<ttf_parser::Face<'_>, RenderError> {
        ttf_parser::Face::parse(&self.data, self.face_index)
            .map_err(|_| RenderError::FaceUnavailable)
    }

    pub fn units_per_em(&self) -> Result<u16, RenderError> {
        Ok(self.face()?.units_per_em())
    }

    /// True if the face maps `ch` to a glyph.
    pub fn has_glyph(&self, ch: char) -> bool {
        self.face()
            .map(|f| f.glyph_index(ch).is_some())
            .unwrap_or(false)
    }

    /// Pixel em-size for a point size at a given DPI.
    #[inline]
    pub fn pixel_size(size: f64, dpi: f64) -> f64 {
        size * dpi / 72.0
    }

    /// Horizontal advance of `text` at `px` pixels per em.
    pub fn text_advance(&self, text: &str, px: f64) -> Result<f64, RenderError> {
        let face = self.face()?;
        let scale = px / face.units_per_em() as f64;
        let mut pen = 0.0;
        let mut prev: Option<ttf_parser::GlyphId> = None;
        for ch in text.chars() {
            let gid = glyph_or_notdef(&face, ch);
            if let Some(p) = prev {
                pen += kerning(&face, p, gid) * scale;
            }
            pen += face.glyph_hor_advance(gid).unwrap_or(0) as f64 * scale;
            prev = Some(gid);
        }
        Ok(pen)
    }

    /// Outline `text` with the pen starting at `(x, baseline_y)`.
    ///
    /// Characters the face cannot map are drawn with the `.notdef` glyph.
    pub fn outline_text(
        &self,
        text: &str,
        px: f64,
        x: f64,
        baseline_y: f64,
    ) -> Result<Path, RenderError> {
        let face = self.face()?;
        let scale = px / face.units_per_em() as f64;
        let mut builder = PathBuilder::new(scale, x, baseline_y);
        let mut pen = x;
        let mut prev: Option<ttf_parser::GlyphId> = None;

        for ch in text.chars() {
            let gid = glyph_or_notdef(&face, ch);
            if let Some(p) = prev {
                pen += kerning(&face, p, gid) * scale;
            }
            builder.set_origin(pen, baseline_y);
            // Glyphs without an outline (spaces) still advance the pen.
            let _ = face.outline_glyph(gid, &mut builder);
            pen += face.glyph_hor_advance(gid).unwrap_or(0) as f64 * scale;
            prev = Some(gid);
        }

        Ok(builder.finish())
    }
}

fn glyph_or_notdef(face: &ttf_parser::Face<'_>, ch: char) -> ttf_parser::GlyphId {
    face.glyph_index(ch).unwrap_or_else(|| {
        log::warn!("glyph for {ch:?} missing, drawing .notdef");
        ttf_parser::GlyphId(0)
    })
}

/// Horizontal kerning between two glyphs in font units, 0 without data.
fn kerning(face: &ttf_parser::Face<'_>, first: ttf_parser::GlyphId, second: ttf_parser::GlyphId) -> f64 {
    if let Some(kern) = face.tables().kern {
        for subtable in kern.subtables {
            if subtable.horizontal && !subtable.has_cross_stream {
                if let Some(value) = subtable.glyphs_kerning(first, second) {
                    return value as f64;
                }
            }
        }
    }
    0.0
}

/// Locate a TrueType font installed on the system.
pub fn find_system_font() -> Option<Vec<u8>> {
    const CANDIDATES: &[&str] = &[
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/TTF/DejaVuSans.ttf",
        "/usr/share/fonts/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
        "/Library/Fonts/Arial.ttf",
        "C:\\Windows\\Fonts\\arial.ttf",
    ];
    CANDIDATES.iter().find_map(|p| std::fs::read(p).ok())
}

// ============================================================================
// Tests
// ============================================================================
