//! Bitmap font descriptor model
//!
//! An immutable, parsed BMFont description: common line metrics, the atlas
//! page size, one [`Glyph`] per character code and the kerning table.
//! Lookups never fail; characters without a glyph resolve to the font's
//! missing-glyph entry.

use std::collections::HashMap;

use super::fnt_parser::FntParser;

/// Character code of the tab character
const TAB_ID: u32 = '\t' as u32;

/// Tabs advance this many missing-glyph widths
const TAB_SIZE: f32 = 4.0;

/// Errors that can occur while parsing a font descriptor
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FontParseError {
    /// Malformed line in a text descriptor
    #[error("line {line}: {message}")]
    Syntax {
        /// 1-based line number
        line: usize,
        /// What was wrong
        message: String,
    },

    /// Malformed binary descriptor
    #[error("binary descriptor: {0}")]
    Binary(String),

    /// Text descriptor is not UTF-8
    #[error("descriptor is not valid UTF-8")]
    Encoding,

    /// No `common` block, so no line metrics
    #[error("descriptor has no common block")]
    MissingCommon,

    /// No glyphs at all
    #[error("descriptor defines no glyphs")]
    NoGlyphs,

    /// `scaleW`/`scaleH` are not positive, so UVs cannot be normalised
    #[error("atlas page size {0} is not positive")]
    PageSize(String),
}

/// A single glyph: atlas rectangle plus placement metrics, in font pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Glyph {
    /// Character code
    pub id: u32,
    /// Atlas rectangle left edge
    pub x: f32,
    /// Atlas rectangle top edge
    pub y: f32,
    /// Atlas rectangle width
    pub width: f32,
    /// Atlas rectangle height
    pub height: f32,
    /// Horizontal bearing from the pen to the quad's left edge
    pub xoffset: f32,
    /// Vertical offset from the line top to the quad's top edge
    pub yoffset: f32,
    /// Pen advance after this glyph
    pub xadvance: f32,
    /// Atlas page index
    pub page: u32,
}

impl Glyph {
    /// True when the atlas rectangle has no area (e.g. the space character)
    pub fn is_degenerate(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Copy of this glyph with its atlas rectangle and bearing zeroed
    fn blanked(&self, id: u32, xadvance: f32) -> Self {
        Self {
            id,
            x: 0.0,
            y: 0.0,
            width: 0.0,
            height: 0.0,
            xoffset: 0.0,
            yoffset: 0.0,
            xadvance,
            page: self.page,
        }
    }
}

/// `info` block
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FontInfo {
    /// Face name
    pub face: String,
    /// Pixel size the atlas was rasterized at
    pub size: f32,
}

/// `common` block
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CommonMetrics {
    /// Distance between baselines
    pub line_height: f32,
    /// Distance from the line top to the baseline
    pub base: f32,
    /// Atlas page width
    pub scale_w: f32,
    /// Atlas page height
    pub scale_h: f32,
    /// Number of atlas pages
    pub pages: u32,
}

/// Kerning adjustment between an ordered pair of characters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Kerning {
    /// Left character code
    pub first: u32,
    /// Right character code
    pub second: u32,
    /// Horizontal adjustment in font pixels
    pub amount: f32,
}

/// Parsed bitmap font
#[derive(Debug, Clone)]
pub struct FontDescriptor {
    info: FontInfo,
    common: CommonMetrics,
    pages: Vec<String>,
    glyphs: HashMap<u32, Glyph>,
    kernings: HashMap<(u32, u32), f32>,
    missing: Glyph,
    tab: Glyph,
}

impl FontDescriptor {
    /// Assemble a descriptor from parsed blocks
    pub fn new(
        info: FontInfo,
        common: CommonMetrics,
        pages: Vec<String>,
        glyphs: Vec<Glyph>,
        kernings: Vec<Kerning>,
    ) -> Result<Self, FontParseError> {
        // Prefer space, then 'm', then whatever comes first in the file.
        let template = glyphs
            .iter()
            .find(|g| g.id == u32::from(' '))
            .or_else(|| glyphs.iter().find(|g| g.id == u32::from('m')))
            .or_else(|| glyphs.first())
            .copied()
            .ok_or(FontParseError::NoGlyphs)?;

        let (w, h) = (common.scale_w, common.scale_h);
        if !(w > 0.0 && h > 0.0 && w.is_finite() && h.is_finite()) {
            return Err(FontParseError::PageSize(format!("{}x{}", w, h)));
        }

        let missing = template.blanked(template.id, template.xadvance);
        let tab = template.blanked(TAB_ID, template.xadvance * TAB_SIZE);

        Ok(Self {
            info,
            common,
            pages,
            glyphs: glyphs.into_iter().map(|g| (g.id, g)).collect(),
            kernings: kernings
                .into_iter()
                .map(|k| ((k.first, k.second), k.amount))
                .collect(),
            missing,
            tab,
        })
    }

    /// Parse descriptor bytes, detecting binary (`BMF`) or text format
    pub fn parse(bytes: &[u8]) -> Result<Self, FontParseError> {
        if bytes.starts_with(b"BMF") {
            FntParser::parse_binary(bytes)
        } else {
            let text = std::str::from_utf8(bytes).map_err(|_| FontParseError::Encoding)?;
            FntParser::parse_text(text)
        }
    }

    /// Face name
    pub fn face(&self) -> &str {
        &self.info.face
    }

    /// Pixel size used for rasterization
    pub fn size(&self) -> f32 {
        self.info.size
    }

    /// Default distance between baselines
    pub fn line_height(&self) -> f32 {
        self.common.line_height
    }

    /// Distance from line top to baseline
    pub fn base(&self) -> f32 {
        self.common.base
    }

    /// Atlas page dimensions in pixels
    pub fn atlas_size(&self) -> (f32, f32) {
        (self.common.scale_w, self.common.scale_h)
    }

    /// Atlas page file names, in page order
    pub fn pages(&self) -> &[String] {
        &self.pages
    }

    /// Number of real glyphs in the table
    pub fn glyph_count(&self) -> usize {
        self.glyphs.len()
    }

    /// Exact glyph lookup
    pub fn glyph(&self, id: u32) -> Option<&Glyph> {
        self.glyphs.get(&id)
    }

    /// Glyph lookup with fallback; never partial
    pub fn glyph_or_missing(&self, ch: char) -> &Glyph {
        let id = u32::from(ch);
        match self.glyphs.get(&id) {
            Some(glyph) => glyph,
            None if id == TAB_ID => &self.tab,
            None => {
                log::trace!("Glyph U+{:04X} missing from '{}', using fallback", id, self.info.face);
                &self.missing
            }
        }
    }

    /// The fallback glyph used for unknown characters
    pub fn missing_glyph(&self) -> &Glyph {
        &self.missing
    }

    /// Kerning between two consecutive characters (0 when unlisted)
    pub fn kerning(&self, first: u32, second: u32) -> f32 {
        self.kernings.get(&(first, second)).copied().unwrap_or(0.0)
    }

    /// Average advance used to convert a character count into pixels
    ///
    /// Digits are preferred because they share a width in most fonts.
    pub fn width_factor(&self) -> f32 {
        let digits: Vec<f32> = self
            .glyphs
            .values()
            .filter(|g| (u32::from('0')..=u32::from('9')).contains(&g.id))
            .map(|g| g.xadvance)
            .collect();

        if digits.is_empty() {
            let total: f32 = self.glyphs.values().map(|g| g.xadvance).sum();
            total / self.glyphs.len() as f32
        } else {
            digits.iter().sum::<f32>() / digits.len() as f32
        }
    }
}
