//! Text layout engine
//!
//! Breaks a string into lines and positions one glyph per character in font
//! pixel space. The layout is a pure function of (font, text, params); it is
//! recomputed from scratch on every change.
//!
//! # Layout Coordinate System
//!
//! - Font pixels, +X right, +Y down (the BMFont convention)
//! - The block occupies `y ∈ [-height, 0]`; line `i` has its top edge at
//!   `-height + i * line_height`
//! - Once the node transform flips Y, the block sits above its origin with
//!   the first line on top

use std::ops::Range;

use super::font_descriptor::{FontDescriptor, Glyph};
use super::text_material::RenderMode;
use crate::foundation::math::Vec2;

/// Horizontal line alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlign {
    /// Lines start at x = 0
    #[default]
    Left,
    /// Lines are centered on the widest line
    Center,
    /// Lines end at the widest line's right edge
    Right,
}

impl TextAlign {
    /// Parse `left`, `center` or `right` (case-insensitive)
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "left" => Some(Self::Left),
            "center" | "centre" => Some(Self::Center),
            "right" => Some(Self::Right),
            _ => None,
        }
    }

    /// Fraction of a line's slack used as its offset
    fn slack_factor(self) -> f32 {
        match self {
            Self::Left => 0.0,
            Self::Center => 0.5,
            Self::Right => 1.0,
        }
    }
}

/// Parameters for one layout pass
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutParams {
    /// Maximum line width in font pixels; non-positive disables wrapping
    pub wrap_width: f32,
    /// Line alignment
    pub align: TextAlign,
    /// Extra pixels between consecutive glyphs
    pub letter_spacing: f32,
    /// Baseline-to-baseline distance; `None` uses the font's
    pub line_height: Option<f32>,
    /// Shading variant, carried for the material stage only
    pub mode: RenderMode,
}

impl Default for LayoutParams {
    fn default() -> Self {
        Self {
            wrap_width: 0.0,
            align: TextAlign::Left,
            letter_spacing: 0.0,
            line_height: None,
            mode: RenderMode::Normal,
        }
    }
}

/// A glyph positioned by the layout
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacedGlyph {
    /// Source character
    pub ch: char,
    /// Character index in the input string
    pub index: usize,
    /// Line this glyph sits on
    pub line: usize,
    /// Pen position: x after alignment, y at the line's top edge
    pub position: Vec2,
    /// Glyph metrics and atlas rectangle (fallback entry for unknown characters)
    pub glyph: Glyph,
}

/// Per-line metrics
#[derive(Debug, Clone, PartialEq)]
pub struct LineMetrics {
    /// Range into [`TextLayout::glyphs`]
    pub glyphs: Range<usize>,
    /// Pen width of the line
    pub width: f32,
    /// Horizontal alignment offset applied to every glyph on the line
    pub offset: f32,
}

/// Result of laying out a string
#[derive(Debug, Clone, PartialEq)]
pub struct TextLayout {
    glyphs: Vec<PlacedGlyph>,
    lines: Vec<LineMetrics>,
    width: f32,
    height: f32,
    line_height: f32,
    base: f32,
    wrap_width: f32,
    atlas_size: (f32, f32),
}

impl TextLayout {
    /// Lay out `text` with `font`
    pub fn compute(font: &FontDescriptor, text: &str, params: &LayoutParams) -> Self {
        let chars: Vec<char> = text.chars().collect();
        let wrap_width = if params.wrap_width > 0.0 && params.wrap_width.is_finite() {
            params.wrap_width
        } else {
            f32::INFINITY
        };
        let line_height = params.line_height.unwrap_or_else(|| font.line_height());
        let measurer = Measurer {
            font,
            chars: &chars,
            letter_spacing: params.letter_spacing,
        };

        let ranges: Vec<Range<usize>> = if chars.is_empty() {
            Vec::new()
        } else {
            hard_lines(&chars)
                .into_iter()
                .flat_map(|hard| wrap_line(&measurer, hard, wrap_width))
                .collect()
        };

        let widths: Vec<f32> = ranges.iter().map(|r| measurer.width(r.clone())).collect();
        let width = widths.iter().copied().fold(0.0f32, f32::max);
        let height = ranges.len() as f32 * line_height;

        let mut glyphs = Vec::with_capacity(chars.len());
        let mut lines = Vec::with_capacity(ranges.len());

        for (line_index, (range, line_width)) in ranges.into_iter().zip(widths).enumerate() {
            let offset = (width - line_width) * params.align.slack_factor();
            let top = -height + line_index as f32 * line_height;
            let first = glyphs.len();

            let mut pen_x = 0.0f32;
            let mut previous: Option<char> = None;

            for index in range {
                let ch = chars[index];
                let glyph = *font.glyph_or_missing(ch);
                if let Some(prev) = previous {
                    pen_x += font.kerning(u32::from(prev), u32::from(ch)) + params.letter_spacing;
                }

                glyphs.push(PlacedGlyph {
                    ch,
                    index,
                    line: line_index,
                    position: Vec2::new(pen_x + offset, top),
                    glyph,
                });

                pen_x += glyph.xadvance;
                previous = Some(ch);
            }

            lines.push(LineMetrics {
                glyphs: first..glyphs.len(),
                width: line_width,
                offset,
            });
        }

        Self {
            glyphs,
            lines,
            width,
            height,
            line_height,
            base: font.base(),
            wrap_width,
            atlas_size: font.atlas_size(),
        }
    }

    /// Placed glyphs in reading order
    pub fn glyphs(&self) -> &[PlacedGlyph] {
        &self.glyphs
    }

    /// Line metrics in top-to-bottom order
    pub fn lines(&self) -> &[LineMetrics] {
        &self.lines
    }

    /// Number of lines
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Width of the widest line
    pub fn width(&self) -> f32 {
        self.width
    }

    /// Total height: line count times line height
    pub fn height(&self) -> f32 {
        self.height
    }

    /// Baseline-to-baseline distance used
    pub fn line_height(&self) -> f32 {
        self.line_height
    }

    /// Distance from a line's top to its baseline
    pub fn base(&self) -> f32 {
        self.base
    }

    /// Space below the last baseline
    pub fn descender(&self) -> f32 {
        self.line_height - self.base
    }

    /// Pixel width that maps onto the node's world width
    ///
    /// This is the wrap width, widened when a line overflows it. Without
    /// wrapping it is the widest line.
    pub fn box_width(&self) -> f32 {
        if self.wrap_width.is_finite() {
            self.wrap_width.max(self.width)
        } else {
            self.width
        }
    }

    /// Atlas page size of the font this layout was computed with
    pub fn atlas_size(&self) -> (f32, f32) {
        self.atlas_size
    }

    /// True when there is nothing to draw
    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    /// Characters of one line, for debugging and tests
    pub fn line_text(&self, line: usize) -> String {
        self.lines
            .get(line)
            .map(|metrics| self.glyphs[metrics.glyphs.clone()].iter().map(|g| g.ch).collect())
            .unwrap_or_default()
    }
}

/// Pen-width measurement over a character buffer
struct Measurer<'a> {
    font: &'a FontDescriptor,
    chars: &'a [char],
    letter_spacing: f32,
}

impl Measurer<'_> {
    /// Advances plus kerning and letter spacing between consecutive glyphs
    fn width(&self, range: Range<usize>) -> f32 {
        let mut width = 0.0f32;
        let mut previous: Option<char> = None;

        for &ch in &self.chars[range] {
            if let Some(prev) = previous {
                width += self.font.kerning(u32::from(prev), u32::from(ch)) + self.letter_spacing;
            }
            width += self.font.glyph_or_missing(ch).xadvance;
            previous = Some(ch);
        }

        width
    }

    /// Width of `range` appended to a non-empty run ending just before it
    fn extend(&self, run_width: f32, range: Range<usize>) -> f32 {
        if range.is_empty() {
            return run_width;
        }
        run_width + self.gap(range.start - 1, range.start) + self.width(range)
    }

    /// Kerning plus letter spacing between the glyphs at `prev` and `next`
    fn gap(&self, prev: usize, next: usize) -> f32 {
        self.font.kerning(u32::from(self.chars[prev]), u32::from(self.chars[next])) + self.letter_spacing
    }

    fn advance(&self, index: usize) -> f32 {
        self.font.glyph_or_missing(self.chars[index]).xadvance
    }
}

/// Split on `\n`, `\r\n` and lone `\r`, returning ranges without the breaks
fn hard_lines(chars: &[char]) -> Vec<Range<usize>> {
    let mut lines = Vec::new();
    let mut start = 0;
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            '\n' => {
                lines.push(start..i);
                start = i + 1;
            }
            '\r' => {
                lines.push(start..i);
                if chars.get(i + 1) == Some(&'\n') {
                    i += 1;
                }
                start = i + 1;
            }
            _ => {}
        }
        i += 1;
    }
    lines.push(start..chars.len());

    lines
}

/// Words (maximal non-whitespace runs) inside a hard line
fn words(chars: &[char], line: Range<usize>) -> Vec<Range<usize>> {
    let mut words = Vec::new();
    let mut word_start = None;

    for i in line.clone() {
        match (chars[i].is_whitespace(), word_start) {
            (false, None) => word_start = Some(i),
            (true, Some(start)) => {
                words.push(start..i);
                word_start = None;
            }
            _ => {}
        }
    }
    if let Some(start) = word_start {
        words.push(start..line.end);
    }

    words
}

/// Greedy word wrap of one hard line
///
/// Whitespace at a soft break is dropped. A word that cannot fit on a line of
/// its own is split between glyphs; only a single glyph wider than the wrap
/// width overflows.
fn wrap_line(measurer: &Measurer<'_>, hard: Range<usize>, wrap_width: f32) -> Vec<Range<usize>> {
    let words = words(measurer.chars, hard.clone());
    if words.is_empty() {
        return vec![hard.start..hard.start];
    }

    let mut lines = Vec::new();
    // Open line and its pen width, extended one word at a time
    let mut current: Option<(Range<usize>, f32)> = None;

    for (i, word) in words.iter().enumerate() {
        if let Some((line, line_width)) = current.take() {
            let candidate_width = measurer.extend(line_width, line.end..word.end);
            if candidate_width <= wrap_width {
                current = Some((line.start..word.end, candidate_width));
                continue;
            }
            lines.push(line);
        }

        // The first word keeps the indentation that follows a hard break
        let start = if i == 0 { hard.start } else { word.start };
        let candidate = start..word.end;
        let candidate_width = measurer.width(candidate.clone());
        if candidate_width <= wrap_width {
            current = Some((candidate, candidate_width));
        } else {
            let mut pieces = split_word(measurer, candidate, wrap_width);
            current = pieces.pop();
            lines.extend(pieces.into_iter().map(|(piece, _)| piece));
        }
    }

    lines.extend(current.map(|(line, _)| line));
    lines
}

/// Split an over-long word into pieces that each fit, at least one glyph apiece
///
/// Returns each piece with its pen width.
fn split_word(measurer: &Measurer<'_>, word: Range<usize>, wrap_width: f32) -> Vec<(Range<usize>, f32)> {
    let mut pieces = Vec::new();
    let mut start = word.start;

    while start < word.end {
        let mut end = start + 1;
        let mut width = measurer.advance(start);
        while end < word.end {
            let next = width + measurer.gap(end - 1, end) + measurer.advance(end);
            if next > wrap_width {
                break;
            }
            width = next;
            end += 1;
        }
        pieces.push((start..end, width));
        start = end;
    }

    pieces
}
