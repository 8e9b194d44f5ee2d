//! Text node configuration
//!
//! Hosts hand over loosely typed [`TextAttributes`]. [`TextConfig::resolve`]
//! turns them into a fully valid snapshot, replacing anything unusable with
//! the deployment [`TextDefaults`] and logging what it replaced.

use serde::{Deserialize, Serialize};

use super::font_descriptor::FontDescriptor;
use super::placement::AnchorSpec;
use super::text_layout::{LayoutParams, TextAlign};
use super::text_material::RenderMode;
use crate::config::Config;
use crate::foundation::math::Vec3;

/// Raw attributes as delivered by the host
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TextAttributes {
    /// Content to render
    pub text: String,
    /// Target world-space width
    pub width: Option<f32>,
    /// `left`, `center` or `right`
    pub align: Option<String>,
    /// Extra pixels between glyphs
    pub letter_spacing: Option<f32>,
    /// Pixels between baselines
    pub line_height: Option<f32>,
    /// Font descriptor URL
    pub fnt: Option<String>,
    /// Atlas image URL
    pub fnt_image: Option<String>,
    /// `normal` or `pre`
    pub mode: Option<String>,
    /// CSS-style color
    pub color: Option<String>,
    /// 0.0-1.0
    pub opacity: Option<f32>,
    /// Anchor value
    pub anchor: Option<String>,
    /// Wrap width in font pixels, wins over `wrap_count`
    pub wrap_pixels: Option<f32>,
    /// Wrap width in average characters
    pub wrap_count: Option<f32>,
}

impl TextAttributes {
    /// Attributes for the text primitive, which anchors on its alignment
    pub fn primitive() -> Self {
        Self {
            anchor: Some("align".to_string()),
            ..Default::default()
        }
    }

    /// Attributes holding only `text`
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    /// Set one attribute from its string form
    ///
    /// Accepts the component names (`letterSpacing`) and the lowercase
    /// primitive names (`letterspacing`). Returns `false` for unknown names.
    /// An unparseable number clears the attribute so the default applies.
    pub fn set_attribute(&mut self, name: &str, value: &str) -> bool {
        let string = || Some(value.to_string());
        match name.to_ascii_lowercase().as_str() {
            "text" | "value" => self.text = value.to_string(),
            "width" => self.width = parse_number(name, value),
            "align" => self.align = string(),
            "letterspacing" => self.letter_spacing = parse_number(name, value),
            "lineheight" => self.line_height = parse_number(name, value),
            "fnt" => self.fnt = string(),
            "fntimage" => self.fnt_image = string(),
            "mode" => self.mode = string(),
            "color" => self.color = string(),
            "opacity" => self.opacity = parse_number(name, value),
            "anchor" => self.anchor = string(),
            "wrappixels" => self.wrap_pixels = parse_number(name, value),
            "wrapcount" => self.wrap_count = parse_number(name, value),
            _ => {
                log::debug!("Ignoring unknown text attribute '{}'", name);
                return false;
            }
        }
        true
    }
}

fn parse_number(name: &str, value: &str) -> Option<f32> {
    match value.trim().parse::<f32>() {
        Ok(number) => Some(number),
        Err(_) => {
            log::warn!("Attribute {}: '{}' is not a number, using default", name, value);
            None
        }
    }
}

/// Deployment defaults for text nodes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextDefaults {
    /// Font used when a node names none
    pub font_url: String,
    /// World width when neither the node nor a sibling geometry gives one
    pub width: f32,
    /// Wrap width in average characters
    pub wrap_count: f32,
    /// Anchor when none is given
    pub anchor: String,
    /// Fill color when none is given
    pub color: String,
}

impl Default for TextDefaults {
    fn default() -> Self {
        Self {
            font_url: "fonts/DejaVu-sdf.fnt".to_string(),
            width: 5.0,
            wrap_count: 40.0,
            anchor: "center".to_string(),
            color: "#000".to_string(),
        }
    }
}

impl Config for TextDefaults {}

/// Wrap threshold before the font is known
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Wrap {
    /// Explicit font pixels
    Pixels(f32),
    /// Average character count, converted with the font's width factor
    Count(f32),
}

impl Wrap {
    /// Wrap width in font pixels
    pub fn pixels(self, font: &FontDescriptor) -> f32 {
        match self {
            Self::Pixels(px) => px,
            Self::Count(count) => (0.5 + count) * font.width_factor(),
        }
    }
}

/// Resolved, fully valid configuration snapshot for one node
#[derive(Debug, Clone, PartialEq)]
pub struct TextConfig {
    /// Content to render
    pub text: String,
    /// Explicit world width; `None` defers to sibling geometry
    pub width: Option<f32>,
    /// World width when nothing else provides one
    pub fallback_width: f32,
    /// Line alignment
    pub align: TextAlign,
    /// Extra pixels between glyphs
    pub letter_spacing: f32,
    /// Baseline distance override
    pub line_height: Option<f32>,
    /// Font descriptor URL
    pub font_url: String,
    /// Atlas image URL
    pub image_url: String,
    /// Shading variant
    pub mode: RenderMode,
    /// Fill color
    pub color: Vec3,
    /// Mesh opacity
    pub opacity: f32,
    /// Anchor value
    pub anchor: AnchorSpec,
    /// Wrap threshold
    pub wrap: Wrap,
}

impl TextConfig {
    /// Normalize raw attributes against deployment defaults
    pub fn resolve(attrs: &TextAttributes, defaults: &TextDefaults) -> Self {
        let font_url = non_empty(attrs.fnt.as_deref()).unwrap_or(defaults.font_url.as_str()).to_string();
        let image_url = non_empty(attrs.fnt_image.as_deref())
            .map(str::to_string)
            .unwrap_or_else(|| derive_image_url(&font_url));

        let fallback_width = if defaults.width.is_finite() && defaults.width > 0.0 {
            defaults.width
        } else {
            log::warn!("Default width {} is invalid, using 1", defaults.width);
            1.0
        };

        let default_color = parse_color(&defaults.color).unwrap_or_else(Vec3::zeros);
        let default_anchor = AnchorSpec::parse(&defaults.anchor).unwrap_or_default();

        Self {
            text: attrs.text.clone(),
            width: attrs.width.and_then(|w| positive("width", w)),
            fallback_width,
            align: parsed("align", attrs.align.as_deref(), TextAlign::parse).unwrap_or_default(),
            letter_spacing: attrs
                .letter_spacing
                .and_then(|s| finite("letterSpacing", s))
                .unwrap_or(0.0),
            line_height: attrs.line_height.and_then(|h| positive("lineHeight", h)),
            font_url,
            image_url,
            mode: parsed("mode", attrs.mode.as_deref(), RenderMode::parse).unwrap_or_default(),
            color: parsed("color", attrs.color.as_deref(), parse_color).unwrap_or(default_color),
            opacity: attrs
                .opacity
                .and_then(|o| finite("opacity", o))
                .map_or(1.0, |o| o.clamp(0.0, 1.0)),
            anchor: parsed("anchor", attrs.anchor.as_deref(), AnchorSpec::parse).unwrap_or(default_anchor),
            wrap: resolve_wrap(attrs, defaults),
        }
    }

    /// Layout parameters for `font`
    pub fn layout_params(&self, font: &FontDescriptor) -> LayoutParams {
        LayoutParams {
            wrap_width: self.wrap.pixels(font),
            align: self.align,
            letter_spacing: self.letter_spacing,
            line_height: self.line_height,
            mode: self.mode,
        }
    }
}

fn resolve_wrap(attrs: &TextAttributes, defaults: &TextDefaults) -> Wrap {
    if let Some(px) = attrs.wrap_pixels.and_then(|px| positive("wrapPixels", px)) {
        return Wrap::Pixels(px);
    }
    let count = attrs
        .wrap_count
        .and_then(|c| positive("wrapCount", c))
        .or_else(|| positive("default wrapCount", defaults.wrap_count))
        .unwrap_or(40.0);
    Wrap::Count(count)
}

/// `font.fnt` -> `font.png`
fn derive_image_url(font_url: &str) -> String {
    match font_url.strip_suffix(".fnt") {
        Some(stem) => format!("{}.png", stem),
        None => format!("{}.png", font_url),
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn parsed<T>(name: &str, value: Option<&str>, parse: impl Fn(&str) -> Option<T>) -> Option<T> {
    let value = non_empty(value)?;
    let result = parse(value);
    if result.is_none() {
        log::warn!("Attribute {}: unrecognized value '{}', using default", name, value);
    }
    result
}

fn finite(name: &str, value: f32) -> Option<f32> {
    if value.is_finite() {
        Some(value)
    } else {
        log::warn!("Attribute {}: {} is not finite, using default", name, value);
        None
    }
}

fn positive(name: &str, value: f32) -> Option<f32> {
    let value = finite(name, value)?;
    if value > 0.0 {
        Some(value)
    } else {
        log::warn!("Attribute {}: {} must be positive, using default", name, value);
        None
    }
}

/// Parse `#rgb`, `#rrggbb` or a basic CSS color name into linear 0-1 RGB
pub fn parse_color(value: &str) -> Option<Vec3> {
    let value = value.trim().to_ascii_lowercase();

    if let Some(hex) = value.strip_prefix('#') {
        if !hex.is_ascii() {
            return None;
        }
        let channel = |s: &str| u8::from_str_radix(s, 16).ok().map(|c| f32::from(c) / 255.0);
        return match hex.len() {
            3 => {
                let expand = |i: usize| channel(&hex[i..i + 1].repeat(2));
                Some(Vec3::new(expand(0)?, expand(1)?, expand(2)?))
            }
            6 => Some(Vec3::new(channel(&hex[0..2])?, channel(&hex[2..4])?, channel(&hex[4..6])?)),
            _ => None,
        };
    }

    let rgb = match value.as_str() {
        "black" => [0.0, 0.0, 0.0],
        "white" => [1.0, 1.0, 1.0],
        "red" => [1.0, 0.0, 0.0],
        "green" => [0.0, 128.0 / 255.0, 0.0],
        "blue" => [0.0, 0.0, 1.0],
        "yellow" => [1.0, 1.0, 0.0],
        "cyan" => [0.0, 1.0, 1.0],
        "magenta" => [1.0, 0.0, 1.0],
        "gray" | "grey" => [128.0 / 255.0; 3],
        _ => return None,
    };
    Some(Vec3::new(rgb[0], rgb[1], rgb[2]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigFormat;
    use crate::text::placement::Anchor;
    use crate::text::test_fonts::monospace_font;

    #[test]
    fn test_defaults_fill_everything() {
        let config = TextConfig::resolve(&TextAttributes::default(), &TextDefaults::default());

        assert_eq!(config.font_url, "fonts/DejaVu-sdf.fnt");
        assert_eq!(config.image_url, "fonts/DejaVu-sdf.png");
        assert_eq!(config.width, None);
        assert_eq!(config.fallback_width, 5.0);
        assert_eq!(config.align, TextAlign::Left);
        assert_eq!(config.mode, RenderMode::Normal);
        assert_eq!(config.color, Vec3::zeros());
        assert_eq!(config.opacity, 1.0);
        assert_eq!(config.anchor, AnchorSpec::Edges(Anchor::empty()));
        assert_eq!(config.wrap, Wrap::Count(40.0));
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let attrs = TextAttributes {
            width: Some(-2.0),
            align: Some("justify".into()),
            letter_spacing: Some(f32::NAN),
            line_height: Some(0.0),
            mode: Some("fancy".into()),
            color: Some("#12".into()),
            opacity: Some(7.0),
            anchor: Some("sideways".into()),
            wrap_pixels: Some(-10.0),
            wrap_count: Some(0.0),
            ..Default::default()
        };
        let config = TextConfig::resolve(&attrs, &TextDefaults::default());

        assert_eq!(config.width, None);
        assert_eq!(config.align, TextAlign::Left);
        assert_eq!(config.letter_spacing, 0.0);
        assert_eq!(config.line_height, None);
        assert_eq!(config.mode, RenderMode::Normal);
        assert_eq!(config.color, Vec3::zeros());
        assert_eq!(config.opacity, 1.0);
        assert_eq!(config.anchor, AnchorSpec::Edges(Anchor::empty()));
        assert_eq!(config.wrap, Wrap::Count(40.0));
    }

    #[test]
    fn test_explicit_image_url_wins() {
        let attrs = TextAttributes {
            fnt: Some("a/b.fnt".into()),
            fnt_image: Some("c.png".into()),
            ..Default::default()
        };
        assert_eq!(TextConfig::resolve(&attrs, &TextDefaults::default()).image_url, "c.png");

        let attrs = TextAttributes {
            fnt: Some("a/b.fnt".into()),
            fnt_image: Some("".into()),
            ..Default::default()
        };
        assert_eq!(TextConfig::resolve(&attrs, &TextDefaults::default()).image_url, "a/b.png");
    }

    #[test]
    fn test_wrap_pixels_wins_over_count() {
        let font = monospace_font();
        let mut attrs = TextAttributes {
            wrap_count: Some(9.5),
            ..Default::default()
        };
        let config = TextConfig::resolve(&attrs, &TextDefaults::default());
        assert_eq!(config.layout_params(&font).wrap_width, 100.0);

        attrs.wrap_pixels = Some(250.0);
        let config = TextConfig::resolve(&attrs, &TextDefaults::default());
        assert_eq!(config.layout_params(&font).wrap_width, 250.0);
    }

    #[test]
    fn test_set_attribute_accepts_both_spellings() {
        let mut attrs = TextAttributes::primitive();
        assert!(attrs.set_attribute("letterSpacing", "2"));
        assert!(attrs.set_attribute("lineheight", "30"));
        assert!(attrs.set_attribute("fntImage", "x.png"));
        assert!(attrs.set_attribute("wrapcount", "abc"));
        assert!(!attrs.set_attribute("font-size", "12"));

        assert_eq!(attrs.letter_spacing, Some(2.0));
        assert_eq!(attrs.line_height, Some(30.0));
        assert_eq!(attrs.fnt_image.as_deref(), Some("x.png"));
        assert_eq!(attrs.wrap_count, None);
        assert_eq!(attrs.anchor.as_deref(), Some("align"));
    }

    #[test]
    fn test_attributes_deserialize_camel_case() {
        let attrs: TextAttributes =
            ron::from_str(r#"(text: "hi", letterSpacing: Some(1.5), fntImage: Some("a.png"))"#).unwrap();
        assert_eq!(attrs.text, "hi");
        assert_eq!(attrs.letter_spacing, Some(1.5));
        assert_eq!(attrs.fnt_image.as_deref(), Some("a.png"));
    }

    #[test]
    fn test_parse_color() {
        assert_eq!(parse_color("#fff"), Some(Vec3::new(1.0, 1.0, 1.0)));
        assert_eq!(parse_color("#FF0000"), Some(Vec3::new(1.0, 0.0, 0.0)));
        assert_eq!(parse_color("Blue"), Some(Vec3::new(0.0, 0.0, 1.0)));
        assert_eq!(parse_color("#ggg"), None);
        assert_eq!(parse_color("chartreuse"), None);
    }

    #[test]
    fn test_defaults_round_trip_through_toml() {
        let defaults = TextDefaults {
            font_url: "fonts/Roboto-msdf.fnt".into(),
            width: 2.0,
            ..Default::default()
        };
        let text = defaults.to_string_as(ConfigFormat::Toml).unwrap();
        assert_eq!(TextDefaults::from_str_as(&text, ConfigFormat::Toml).unwrap(), defaults);

        let partial = TextDefaults::from_str_as("wrap_count = 20.0", ConfigFormat::Toml).unwrap();
        assert_eq!(partial.wrap_count, 20.0);
        assert_eq!(partial.width, 5.0);
    }
}
