use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

use indexmap::IndexMap;

use crate::{glyph_name_for, load_font_from_reader, serialize_to_bdf, BdfError, Glyph, Result};

/// Global font information from the header block of a BDF file.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Headers {
    /// Format version given after `STARTFONT`.
    pub bdf_version: f64,
    /// Font name given after `FONT`.
    pub font_name: String,

    pub point_size: i32,
    pub x_res: i32,
    pub y_res: i32,

    /// Font bounding box width.
    pub fbbx: i32,
    /// Font bounding box height.
    pub fbby: i32,
    pub fbbxoff: i32,
    pub fbbyoff: i32,

    pub swidth: Option<(i32, i32)>,
    pub dwidth: Option<(i32, i32)>,
    pub swidth1: Option<(i32, i32)>,
    pub dwidth1: Option<(i32, i32)>,
    pub vvector: Option<(i32, i32)>,
    pub metrics_set: Option<i32>,
    pub content_version: Option<i32>,

    /// `COMMENT` lines of the header block, without surrounding quotes.
    pub comments: Vec<String>,
}

/// Free-form font properties. Keys are lower case; `None` marks a flag property without a value.
pub type Properties = IndexMap<String, Option<String>>;

/// A BDF font.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Font {
    /// `None` only for fonts that were never parsed or filled in.
    pub headers: Option<Headers>,
    pub properties: Properties,
    /// `COMMENT` lines inside the properties block.
    pub property_comments: Vec<String>,
    /// Glyphs by codepoint, in insertion order.
    pub glyphs: IndexMap<u32, Glyph>,
}

impl Font {
    pub fn new(headers: Headers) -> Self {
        Self {
            headers: Some(headers),
            ..Default::default()
        }
    }

    /// Reads a BDF font from a file.
    ///
    /// # Errors
    ///
    /// This function will return an error if the file can't be read or contains a fatally malformed glyph.
    pub fn load(file_name: &Path) -> Result<Self> {
        let file = File::open(file_name)?;
        load_font_from_reader(BufReader::new(file))
    }

    /// Writes the font as BDF text to a file.
    ///
    /// # Errors
    ///
    /// This function will return an error if the font has no headers or the file can't be written.
    pub fn save(&self, file_name: &Path) -> Result<()> {
        let text = serialize_to_bdf(self)?;
        let mut f = File::create(file_name)?;
        f.write_all(text.as_bytes())?;
        Ok(())
    }

    pub fn property(&self, name: &str) -> Option<&Option<String>> {
        self.properties.get(&name.to_ascii_lowercase())
    }

    pub fn set_property(&mut self, name: &str, value: Option<String>) {
        self.properties.insert(name.to_ascii_lowercase(), value);
    }

    /// Inserts a glyph under its codepoint.
    /// A glyph already stored for that codepoint is replaced in place and returned.
    pub fn insert_glyph(&mut self, glyph: Glyph) -> Option<Glyph> {
        self.glyphs.insert(glyph.codepoint, glyph)
    }

    /// Adds a glyph for `codepoint` that copies metrics and bitmap of the `template` glyph.
    ///
    /// # Errors
    ///
    /// This function will return an error if `codepoint` is already used or `template` doesn't exist.
    pub fn add_glyph_from_template(&mut self, codepoint: u32, template: u32) -> Result<&mut Glyph> {
        if self.glyphs.contains_key(&codepoint) {
            return Err(BdfError::GlyphExists(codepoint));
        }
        let Some(template_glyph) = self.glyphs.get(&template) else {
            return Err(BdfError::GlyphNotFound(template));
        };
        let glyph = Glyph {
            name: glyph_name_for(codepoint),
            codepoint,
            ..template_glyph.clone()
        };
        let (index, _) = self.glyphs.insert_full(codepoint, glyph);
        Ok(&mut self.glyphs[index])
    }
}
