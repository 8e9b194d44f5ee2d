//! Synthetic fonts shared by the text tests

use std::fmt::Write;
use std::io::Cursor;

use super::font_descriptor::{CommonMetrics, FontDescriptor, FontInfo, Glyph, Kerning};

/// Every printable ASCII character advances 10px; lines are 20px
pub fn monospace_font() -> FontDescriptor {
    let glyphs = (32u32..=126).map(monospace_glyph).collect();

    FontDescriptor::new(
        FontInfo {
            face: "Mono".into(),
            size: 16.0,
        },
        CommonMetrics {
            line_height: 20.0,
            base: 16.0,
            scale_w: 256.0,
            scale_h: 256.0,
            pages: 1,
        },
        vec!["mono.png".into()],
        glyphs,
        vec![Kerning {
            first: u32::from('A'),
            second: u32::from('V'),
            amount: -3.0,
        }],
    )
    .unwrap()
}

/// Only 'A': advance 20, rect (0,0,20,20) on a 100x50 page; lines are 24px
pub fn single_glyph_font() -> FontDescriptor {
    FontDescriptor::new(
        FontInfo {
            face: "Single".into(),
            size: 20.0,
        },
        CommonMetrics {
            line_height: 24.0,
            base: 20.0,
            scale_w: 100.0,
            scale_h: 50.0,
            pages: 1,
        },
        vec!["single.png".into()],
        vec![Glyph {
            id: u32::from('A'),
            x: 0.0,
            y: 0.0,
            width: 20.0,
            height: 20.0,
            xoffset: 0.0,
            yoffset: 0.0,
            xadvance: 20.0,
            page: 0,
        }],
        Vec::new(),
    )
    .unwrap()
}

fn monospace_glyph(id: u32) -> Glyph {
    let cell = id - 32;
    let blank = id == u32::from(' ');
    Glyph {
        id,
        x: (cell % 16 * 16) as f32,
        y: (cell / 16 * 16) as f32,
        width: if blank { 0.0 } else { 8.0 },
        height: if blank { 0.0 } else { 12.0 },
        xoffset: if blank { 0.0 } else { 1.0 },
        yoffset: if blank { 0.0 } else { 4.0 },
        xadvance: 10.0,
        page: 0,
    }
}

/// [`monospace_font`] as a text `.fnt` file
pub fn monospace_fnt() -> Vec<u8> {
    let mut out = String::from(
        "info face=\"Mono\" size=16\n\
         common lineHeight=20 base=16 scaleW=256 scaleH=256 pages=1\n\
         page id=0 file=\"mono.png\"\n",
    );
    for id in 32u32..=126 {
        let g = monospace_glyph(id);
        writeln!(
            out,
            "char id={} x={} y={} width={} height={} xoffset={} yoffset={} xadvance={} page=0",
            g.id, g.x, g.y, g.width, g.height, g.xoffset, g.yoffset, g.xadvance
        )
        .unwrap();
    }
    out.push_str("kerning first=65 second=86 amount=-3\n");
    out.into_bytes()
}

/// A small PNG standing in for an atlas page
pub fn atlas_png() -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(8, 8, image::Rgba([255, 255, 255, 255]));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png).unwrap();
    out.into_inner()
}

#[test]
fn test_monospace_fnt_matches_descriptor() {
    let parsed = FontDescriptor::parse(&monospace_fnt()).unwrap();
    let built = monospace_font();

    assert_eq!(parsed.glyph_count(), built.glyph_count());
    assert_eq!(parsed.glyph(u32::from('q')), built.glyph(u32::from('q')));
    assert_eq!(parsed.kerning(65, 86), -3.0);
    assert_eq!(parsed.line_height(), 20.0);
}
