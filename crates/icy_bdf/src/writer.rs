use crate::{bitmap_to_hex_rows, BdfError, CodepointOrder, Font, Glyph, Result};

/// Properties that hold integers and are written without quotes.
const INTEGER_PROPERTIES: [&str; 12] = [
    "pixel_size",
    "point_size",
    "resolution_x",
    "resolution_y",
    "average_width",
    "underline_position",
    "underline_thickness",
    "cap_height",
    "x_height",
    "font_ascent",
    "font_descent",
    "default_char",
];

/// Options for [`serialize_to_bdf_with_options`].
#[derive(Debug, Clone, Default)]
pub struct SaveOptions {
    /// Order the glyphs are written in. `None` keeps the order of [`Font::glyphs`].
    pub glyph_order: Option<CodepointOrder>,
}

/// Serializes the font as BDF text with glyphs in insertion order.
///
/// # Errors
///
/// This function will return an error if the font has no headers.
pub fn serialize_to_bdf(font: &Font) -> Result<String> {
    serialize_to_bdf_with_options(font, &SaveOptions::default())
}

/// Serializes the font as BDF text.
///
/// # Errors
///
/// This function will return an error if the font has no headers.
pub fn serialize_to_bdf_with_options(font: &Font, options: &SaveOptions) -> Result<String> {
    let Some(h) = &font.headers else {
        return Err(BdfError::MissingHeaders);
    };
    let mut lines = Vec::new();

    lines.push(format!("STARTFONT {}", h.bdf_version));
    lines.push(format!("FONT {}", h.font_name));
    lines.push(format!("SIZE {} {} {}", h.point_size, h.x_res, h.y_res));
    lines.push(format!("FONTBOUNDINGBOX {} {} {} {}", h.fbbx, h.fbby, h.fbbxoff, h.fbbyoff));
    push_pair(&mut lines, "SWIDTH", h.swidth);
    push_pair(&mut lines, "DWIDTH", h.dwidth);
    push_pair(&mut lines, "SWIDTH1", h.swidth1);
    push_pair(&mut lines, "DWIDTH1", h.dwidth1);
    push_pair(&mut lines, "VVECTOR", h.vvector);
    if let Some(metrics_set) = h.metrics_set {
        lines.push(format!("METRICSSET {metrics_set}"));
    }
    if let Some(content_version) = h.content_version {
        lines.push(format!("CONTENTVERSION {content_version}"));
    }
    for comment in &h.comments {
        lines.push(format!("COMMENT \"{comment}\""));
    }

    lines.push(format!("STARTPROPERTIES {}", font.properties.len()));
    for (key, value) in &font.properties {
        let name = key.to_ascii_uppercase();
        match value {
            None => lines.push(name),
            // an empty value is quoted, a bare keyword reads back as a flag
            Some(value) if !value.is_empty() && INTEGER_PROPERTIES.contains(&key.to_ascii_lowercase().as_str()) => lines.push(format!("{name} {value}")),
            Some(value) => lines.push(format!("{name} \"{value}\"")),
        }
    }
    for comment in &font.property_comments {
        lines.push(format!("COMMENT \"{comment}\""));
    }
    lines.push("ENDPROPERTIES".to_string());

    lines.push(format!("CHARS {}", font.glyphs.len()));
    match options.glyph_order {
        None => font.glyphs.values().for_each(|glyph| push_glyph(&mut lines, glyph)),
        Some(order) => font.iter_glyphs(order, None).for_each(|glyph| push_glyph(&mut lines, glyph)),
    }

    lines.push("ENDFONT".to_string());
    lines.push(String::new());
    Ok(lines.join("\n"))
}

fn push_pair(lines: &mut Vec<String>, keyword: &str, pair: Option<(i32, i32)>) {
    if let Some((x, y)) = pair {
        lines.push(format!("{keyword} {x} {y}"));
    }
}

fn push_glyph(lines: &mut Vec<String>, glyph: &Glyph) {
    lines.push(format!("STARTCHAR {}", glyph.name));
    lines.push(format!("ENCODING {}", glyph.codepoint));
    push_pair(lines, "SWIDTH", glyph.swidth);
    push_pair(lines, "DWIDTH", glyph.dwidth);
    lines.push(format!("BBX {} {} {} {}", glyph.bbw, glyph.bbh, glyph.bbxoff, glyph.bbyoff));
    push_pair(lines, "SWIDTH1", glyph.swidth1);
    push_pair(lines, "DWIDTH1", glyph.dwidth1);
    push_pair(lines, "VVECTOR", glyph.vvector);
    lines.push("BITMAP".to_string());
    lines.extend(bitmap_to_hex_rows(&glyph.bitmap));
    lines.push("ENDCHAR".to_string());
}

impl Font {
    /// Serializes the font as BDF text, see [`serialize_to_bdf`].
    ///
    /// # Errors
    ///
    /// This function will return an error if the font has no headers.
    pub fn to_bdf_string(&self) -> Result<String> {
        serialize_to_bdf(self)
    }
}
