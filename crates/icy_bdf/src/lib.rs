//! Reader and writer for the Glyph Bitmap Distribution Format (BDF).
//!
//! A BDF file is parsed line by line into a [`Font`]: global [`Headers`],
//! free-form [`Properties`] and an insertion ordered map of [`Glyph`] records.
//! The font can be edited in place and written back with [`serialize_to_bdf`].
//!
//! ```
//! let text = "STARTFONT 2.1\nFONT test\nSIZE 8 75 75\nFONTBOUNDINGBOX 8 8 0 0\n\
//!             STARTPROPERTIES 0\nENDPROPERTIES\nCHARS 0\nENDFONT\n";
//! let font = icy_bdf::load_font(text.lines()).unwrap();
//! assert_eq!(font.glyphs.len(), 0);
//! ```

use std::fmt::Display;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, BdfError>;

pub mod bitmap;
pub use bitmap::*;

pub mod font;
pub use font::*;

pub mod glyph;
pub use glyph::*;

pub mod iter;
pub use iter::*;

pub mod parser;
pub use parser::*;

pub mod writer;
pub use writer::*;

/// File extension used for BDF fonts.
pub const BDF_EXTENSION: &str = "bdf";

/// MIME type used when saving BDF fonts.
pub const BDF_MIME_TYPE: &str = "application/x-font-bdf";

/// The section of a BDF file the parser was in when an error occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseStage {
    Header,
    Properties,
    GlyphCount,
    Glyphs,
}

impl Display for ParseStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ParseStage::Header => "header",
            ParseStage::Properties => "properties",
            ParseStage::GlyphCount => "glyph count",
            ParseStage::Glyphs => "glyph",
        };
        write!(f, "{s}")
    }
}

#[derive(Error, Debug)]
pub enum BdfError {
    #[error("Error in {stage} parsing: glyph '{name}' (encoding {codepoint:?}) reached ENDCHAR before its width was defined")]
    MissingGlyphWidth {
        stage: ParseStage,
        name: String,
        codepoint: Option<u32>,
    },

    #[error("Error in {stage} parsing: glyph '{name}' has an invalid bitmap row '{row}'")]
    InvalidHexRow { stage: ParseStage, name: String, row: String },

    #[error("Error in serialization: font has no headers")]
    MissingHeaders,

    #[error("Glyph not found: {0:#X}")]
    GlyphNotFound(u32),

    #[error("Glyph already exists: {0:#X}")]
    GlyphExists(u32),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Strips surrounding whitespace and quote characters the way BDF string values are written.
pub(crate) fn trim_quotes(value: &str) -> &str {
    value.trim_matches(|c: char| c.is_whitespace() || c == '"' || c == '\'')
}
