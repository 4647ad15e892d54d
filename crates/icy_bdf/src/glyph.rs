use std::fmt::Display;

/// A single character record of a BDF font.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Glyph {
    /// Name given after `STARTCHAR`.
    pub name: String,
    /// Encoding of the glyph, the key in [`crate::Font::glyphs`].
    pub codepoint: u32,

    /// Bounding box width in pixels.
    pub bbw: u32,
    /// Bounding box height in pixels.
    pub bbh: u32,
    /// Bounding box x offset.
    pub bbxoff: i32,
    /// Bounding box y offset.
    pub bbyoff: i32,

    /// Scalable width (`SWIDTH`).
    pub swidth: Option<(i32, i32)>,
    /// Device width (`DWIDTH`).
    pub dwidth: Option<(i32, i32)>,
    /// Scalable width for writing direction 1 (`SWIDTH1`).
    pub swidth1: Option<(i32, i32)>,
    /// Device width for writing direction 1 (`DWIDTH1`).
    pub dwidth1: Option<(i32, i32)>,
    /// Vertical vector (`VVECTOR`).
    pub vvector: Option<(i32, i32)>,

    /// `bbh` rows of `bbw` pixels, top row first.
    pub bitmap: Vec<Vec<bool>>,
}

impl Display for Glyph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut s = String::new();
        for (y, row) in self.bitmap.iter().enumerate() {
            s.push_str(&format!("{y:2}"));
            for pixel in row {
                s.push(if *pixel { '#' } else { '-' });
            }
            s.push('\n');
        }
        write!(f, "{s}---")
    }
}

/// Builds the `U+XXXXXXXX` glyph name used for glyphs added by the editor.
pub fn glyph_name_for(codepoint: u32) -> String {
    format!("U+{codepoint:08X}")
}

impl Glyph {
    /// Creates a blank glyph with a `width` x `height` bitmap.
    pub fn new(name: impl Into<String>, codepoint: u32, width: u32, height: u32) -> Self {
        Self {
            name: name.into(),
            codepoint,
            bbw: width,
            bbh: height,
            bitmap: vec![vec![false; width as usize]; height as usize],
            ..Default::default()
        }
    }

    pub fn width(&self) -> usize {
        self.bbw as usize
    }

    pub fn height(&self) -> usize {
        self.bbh as usize
    }

    /// Get a pixel value at the given position.
    ///
    /// Returns `false` if coordinates are out of bounds.
    pub fn get_pixel(&self, x: usize, y: usize) -> bool {
        self.bitmap.get(y).and_then(|row| row.get(x)).copied().unwrap_or(false)
    }

    /// Set a pixel value at the given position.
    ///
    /// Does nothing if coordinates are out of bounds.
    pub fn set_pixel(&mut self, x: usize, y: usize, value: bool) {
        if let Some(pixel) = self.bitmap.get_mut(y).and_then(|row| row.get_mut(x)) {
            *pixel = value;
        }
    }

    /// Changes the bounding box width, adding blank columns or dropping columns on the right.
    pub fn set_width(&mut self, width: u32) {
        self.bbw = width;
        for row in &mut self.bitmap {
            row.resize(width as usize, false);
        }
    }

    /// Changes the bounding box height, adding blank rows or dropping rows at the bottom.
    pub fn set_height(&mut self, height: u32) {
        self.bbh = height;
        self.bitmap.resize(height as usize, vec![false; self.bbw as usize]);
    }

    /// Check if the glyph is empty (all pixels off).
    pub fn is_empty(&self) -> bool {
        self.bitmap.iter().flatten().all(|p| !*p)
    }

    /// Pads or truncates the bitmap so it has exactly `bbh` rows of `bbw` pixels.
    /// Returns `true` if the bitmap had to be changed.
    pub(crate) fn normalize_bitmap(&mut self) -> bool {
        let w = self.bbw as usize;
        let h = self.bbh as usize;
        let mut changed = self.bitmap.len() != h;
        self.bitmap.resize(h, vec![false; w]);
        for row in &mut self.bitmap {
            if row.len() != w {
                changed = true;
                row.resize(w, false);
            }
        }
        changed
    }
}
