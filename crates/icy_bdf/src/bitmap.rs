//! Conversion between BDF hex rows and boolean bitmaps.
//!
//! Each BDF bitmap row is a hex string, MSB first, right padded with zero bits
//! to a byte boundary. The decoded form is one `Vec<bool>` per row, trimmed to
//! the glyph width. Rows are handled digit by digit, so there is no limit on
//! the glyph width.

use std::fmt::Write;

use thiserror::Error;

/// A bitmap row containing a character that is not a hex digit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid hex digit in bitmap row '{row}'")]
pub struct HexRowError {
    pub row: String,
}

/// Decodes hex rows into a bitmap with rows of at most `width` pixels.
///
/// Every hex digit contributes four pixels; the row is truncated (never padded)
/// to `width`. An empty string yields an empty row.
///
/// # Errors
///
/// Returns a [`HexRowError`] naming the first row that contains a character that is not a hex digit.
pub fn hex_rows_to_bitmap<S: AsRef<str>>(rows: &[S], width: usize) -> std::result::Result<Vec<Vec<bool>>, HexRowError> {
    let mut bitmap = Vec::with_capacity(rows.len());
    for row in rows {
        let row = row.as_ref();
        let mut bits = Vec::with_capacity(row.len() * 4);
        for ch in row.chars() {
            let Some(nibble) = ch.to_digit(16) else {
                return Err(HexRowError { row: row.to_string() });
            };
            for i in (0..4).rev() {
                bits.push(nibble & (1 << i) != 0);
            }
        }
        bits.truncate(width);
        bitmap.push(bits);
    }
    Ok(bitmap)
}

/// Encodes a bitmap into uppercase hex rows, right padding each row to a byte boundary.
pub fn bitmap_to_hex_rows(bitmap: &[Vec<bool>]) -> Vec<String> {
    bitmap.iter().map(|row| encode_row(row)).collect()
}

fn encode_row(row: &[bool]) -> String {
    let mut s = String::with_capacity(row.len().div_ceil(8) * 2);
    for chunk in row.chunks(8) {
        let mut byte = 0u8;
        for (i, &bit) in chunk.iter().enumerate() {
            if bit {
                byte |= 0x80 >> i;
            }
        }
        // writing into a String can't fail
        let _ = write!(s, "{byte:02X}");
    }
    s
}
