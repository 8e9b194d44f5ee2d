//! BMFont descriptor parser
//!
//! Handles the AngelCode text format (`info`, `common`, `page`, `char`,
//! `kerning` lines of `key=value` pairs) and the version 3 binary format.

use std::collections::HashMap;

use super::font_descriptor::{CommonMetrics, FontDescriptor, FontInfo, FontParseError, Glyph, Kerning};

/// BMFont file parser
pub struct FntParser;

impl FntParser {
    /// Parse a text-format descriptor
    pub fn parse_text(contents: &str) -> Result<FontDescriptor, FontParseError> {
        let mut info = FontInfo::default();
        let mut common = None;
        let mut pages: Vec<(u32, String)> = Vec::new();
        let mut glyphs = Vec::new();
        let mut kernings = Vec::new();

        for (line_num, line) in contents.lines().enumerate() {
            let line_no = line_num + 1;
            let mut tokens = Self::tokenize(line.trim()).into_iter();
            let tag = match tokens.next() {
                Some(tag) => tag,
                None => continue,
            };
            let fields = Self::fields(tokens, line_no)?;

            match tag.as_str() {
                "info" => {
                    info = FontInfo {
                        face: fields.get("face").cloned().unwrap_or_default(),
                        // BMFont writes a negative size when "match char height" is set
                        size: Self::optional(&fields, "size", line_no)?.unwrap_or(0.0).abs(),
                    };
                }

                "common" => {
                    common = Some(CommonMetrics {
                        line_height: Self::number(&fields, "lineHeight", line_no)?,
                        base: Self::number(&fields, "base", line_no)?,
                        scale_w: Self::number(&fields, "scaleW", line_no)?,
                        scale_h: Self::number(&fields, "scaleH", line_no)?,
                        pages: Self::optional(&fields, "pages", line_no)?.unwrap_or(1.0) as u32,
                    });
                }

                "page" => {
                    let id = Self::number(&fields, "id", line_no)? as u32;
                    let file = fields.get("file").cloned().ok_or_else(|| FontParseError::Syntax {
                        line: line_no,
                        message: "page missing file".to_string(),
                    })?;
                    pages.push((id, file));
                }

                "char" => {
                    glyphs.push(Glyph {
                        id: Self::number(&fields, "id", line_no)? as u32,
                        x: Self::number(&fields, "x", line_no)?,
                        y: Self::number(&fields, "y", line_no)?,
                        width: Self::number(&fields, "width", line_no)?,
                        height: Self::number(&fields, "height", line_no)?,
                        xoffset: Self::optional(&fields, "xoffset", line_no)?.unwrap_or(0.0),
                        yoffset: Self::optional(&fields, "yoffset", line_no)?.unwrap_or(0.0),
                        xadvance: Self::number(&fields, "xadvance", line_no)?,
                        page: Self::optional(&fields, "page", line_no)?.unwrap_or(0.0) as u32,
                    });
                }

                "kerning" => {
                    kernings.push(Kerning {
                        first: Self::number(&fields, "first", line_no)? as u32,
                        second: Self::number(&fields, "second", line_no)? as u32,
                        amount: Self::number(&fields, "amount", line_no)?,
                    });
                }

                // `chars count=` and `kernings count=` are informational
                _ => {}
            }
        }

        let common = common.ok_or(FontParseError::MissingCommon)?;
        pages.sort_by_key(|(id, _)| *id);

        log::debug!(
            "Parsed text font '{}': {} glyphs, {} kerning pairs",
            info.face,
            glyphs.len(),
            kernings.len()
        );

        FontDescriptor::new(info, common, pages.into_iter().map(|(_, file)| file).collect(), glyphs, kernings)
    }

    /// Parse a version 3 binary descriptor
    pub fn parse_binary(bytes: &[u8]) -> Result<FontDescriptor, FontParseError> {
        let mut reader = ByteReader::new(bytes);
        if reader.take(3)? != b"BMF" {
            return Err(FontParseError::Binary("missing BMF magic".to_string()));
        }
        let version = reader.u8()?;
        if version != 3 {
            return Err(FontParseError::Binary(format!("unsupported version {}", version)));
        }

        let mut info = FontInfo::default();
        let mut common = None;
        let mut pages = Vec::new();
        let mut glyphs = Vec::new();
        let mut kernings = Vec::new();

        while !reader.is_empty() {
            let block_type = reader.u8()?;
            let size = reader.u32()? as usize;
            let mut block = ByteReader::new(reader.take(size)?);

            match block_type {
                1 => {
                    let size = block.i16()?;
                    block.take(12)?;
                    info = FontInfo {
                        face: block.cstr()?,
                        size: f32::from(size).abs(),
                    };
                }
                2 => {
                    common = Some(CommonMetrics {
                        line_height: f32::from(block.u16()?),
                        base: f32::from(block.u16()?),
                        scale_w: f32::from(block.u16()?),
                        scale_h: f32::from(block.u16()?),
                        pages: u32::from(block.u16()?),
                    });
                }
                3 => {
                    while !block.is_empty() {
                        pages.push(block.cstr()?);
                    }
                }
                4 => {
                    while !block.is_empty() {
                        glyphs.push(Glyph {
                            id: block.u32()?,
                            x: f32::from(block.u16()?),
                            y: f32::from(block.u16()?),
                            width: f32::from(block.u16()?),
                            height: f32::from(block.u16()?),
                            xoffset: f32::from(block.i16()?),
                            yoffset: f32::from(block.i16()?),
                            xadvance: f32::from(block.i16()?),
                            page: u32::from(block.u8()?),
                        });
                        // channel
                        block.u8()?;
                    }
                }
                5 => {
                    while !block.is_empty() {
                        kernings.push(Kerning {
                            first: block.u32()?,
                            second: block.u32()?,
                            amount: f32::from(block.i16()?),
                        });
                    }
                }
                other => {
                    log::debug!("Skipping unknown BMF block type {}", other);
                }
            }
        }

        let common = common.ok_or(FontParseError::MissingCommon)?;
        log::debug!("Parsed binary font '{}': {} glyphs", info.face, glyphs.len());

        FontDescriptor::new(info, common, pages, glyphs, kernings)
    }

    /// Split a line on whitespace, keeping quoted values intact
    fn tokenize(line: &str) -> Vec<String> {
        let mut tokens = Vec::new();
        let mut current = String::new();
        let mut quoted = false;

        for ch in line.chars() {
            match ch {
                '"' => quoted = !quoted,
                c if c.is_whitespace() && !quoted => {
                    if !current.is_empty() {
                        tokens.push(std::mem::take(&mut current));
                    }
                }
                c => current.push(c),
            }
        }
        if !current.is_empty() {
            tokens.push(current);
        }

        tokens
    }

    fn fields(
        tokens: impl Iterator<Item = String>,
        line: usize,
    ) -> Result<HashMap<String, String>, FontParseError> {
        tokens
            .map(|token| {
                token
                    .split_once('=')
                    .map(|(key, value)| (key.to_string(), value.to_string()))
                    .ok_or_else(|| FontParseError::Syntax {
                        line,
                        message: format!("expected key=value, found '{}'", token),
                    })
            })
            .collect()
    }

    fn optional(fields: &HashMap<String, String>, key: &str, line: usize) -> Result<Option<f32>, FontParseError> {
        fields
            .get(key)
            .map(|raw| {
                raw.parse::<f32>().map_err(|_| FontParseError::Syntax {
                    line,
                    message: format!("{} is not a number: '{}'", key, raw),
                })
            })
            .transpose()
    }

    fn number(fields: &HashMap<String, String>, key: &str, line: usize) -> Result<f32, FontParseError> {
        Self::optional(fields, key, line)?.ok_or_else(|| FontParseError::Syntax {
            line,
            message: format!("missing {}", key),
        })
    }
}

/// Little-endian cursor over a binary descriptor
struct ByteReader<'a> {
    bytes: &'a [u8],
}

impl<'a> ByteReader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], FontParseError> {
        if self.bytes.len() < n {
            return Err(FontParseError::Binary(format!(
                "truncated: wanted {} bytes, {} left",
                n,
                self.bytes.len()
            )));
        }
        let (head, tail) = self.bytes.split_at(n);
        self.bytes = tail;
        Ok(head)
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N], FontParseError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    fn u8(&mut self) -> Result<u8, FontParseError> {
        Ok(self.take(1)?[0])
    }

    fn u16(&mut self) -> Result<u16, FontParseError> {
        Ok(u16::from_le_bytes(self.array()?))
    }

    fn i16(&mut self) -> Result<i16, FontParseError> {
        Ok(i16::from_le_bytes(self.array()?))
    }

    fn u32(&mut self) -> Result<u32, FontParseError> {
        Ok(u32::from_le_bytes(self.array()?))
    }

    fn cstr(&mut self) -> Result<String, FontParseError> {
        let end = self
            .bytes
            .iter()
            .position(|&b| b == 0)
            .ok_or_else(|| FontParseError::Binary("unterminated string".to_string()))?;
        let text = String::from_utf8_lossy(self.take(end)?).into_owned();
        self.take(1)?;
        Ok(text)
    }
}
