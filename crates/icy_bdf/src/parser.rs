//! Line based BDF parser.
//!
//! The parser walks through the sections of a BDF file in a fixed order:
//!
//! - `Header` - `STARTFONT`, `FONT`, `SIZE`, `FONTBOUNDINGBOX`, optional metrics and `COMMENT` lines
//! - `Properties` - everything between `STARTPROPERTIES` and `ENDPROPERTIES`
//! - `GlyphCount` - the `CHARS <n>` line
//! - `Glyphs` - `STARTCHAR` ... `ENDCHAR` records until `ENDFONT`
//!
//! Unknown keywords are ignored. Files that skip the properties block or the
//! `CHARS` line are accepted; the line that ended the previous section is fed
//! again to the next one. Recoverable problems are reported as [`ParseWarning`]s
//! and logged, only a glyph without a bounding box or with a malformed bitmap
//! row aborts parsing.

use std::{fmt::Display, io::BufRead, str::FromStr};

use crate::{hex_rows_to_bitmap, trim_quotes, BdfError, Font, Glyph, Headers, ParseStage, Result};

/// A recoverable problem found while parsing.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseWarning {
    /// The file has no `STARTPROPERTIES` block.
    MissingPropertiesBlock,
    /// The glyphs are not preceded by a `CHARS` line.
    MissingCharsLine,
    /// `ENDFONT` came before any glyph section.
    NoGlyphs,
    /// The input ended without `ENDFONT`.
    MissingEndFont,
    /// The `CHARS` count doesn't match the number of parsed glyphs.
    GlyphCountMismatch { expected: usize, actual: usize },
    /// There was no `CHARS` count to check the glyphs against.
    MissingGlyphCount,
    /// A numeric field couldn't be parsed and was left unset.
    InvalidNumber { stage: ParseStage, keyword: String, value: String },
    /// A glyph without a usable `ENCODING` was skipped.
    UnencodedGlyph { name: String },
    /// The bitmap rows didn't match the `BBX` size and were padded or truncated.
    BitmapShapeMismatch { name: String, codepoint: u32 },
    /// A glyph whose `BBX` exceeds [`MAX_GLYPH_PIXELS`] was skipped.
    OversizedGlyph { name: String, width: u32, height: u32 },
}

/// Upper bound for `BBX` width times height. Larger glyphs are skipped instead of allocated.
pub const MAX_GLYPH_PIXELS: u64 = 1 << 24;

impl Display for ParseWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseWarning::MissingPropertiesBlock => {
                write!(f, "It looks like the font does not have property block beginning with 'STARTPROPERTIES' keyword")
            }
            ParseWarning::MissingCharsLine => write!(f, "Cannot find 'CHARS' line"),
            ParseWarning::NoGlyphs => write!(f, "This font does not have any glyphs"),
            ParseWarning::MissingEndFont => write!(f, "This font does not have 'ENDFONT' keyword"),
            ParseWarning::GlyphCountMismatch { expected, actual } => write!(
                f,
                "The glyph count next to 'CHARS' keyword is {expected}, which does not match the actual glyph count {actual}"
            ),
            ParseWarning::MissingGlyphCount => write!(f, "The glyph count next to 'CHARS' keyword does not exist"),
            ParseWarning::InvalidNumber { stage, keyword, value } => {
                write!(f, "Invalid number '{value}' for '{keyword}' in {stage} section")
            }
            ParseWarning::UnencodedGlyph { name } => write!(f, "Glyph '{name}' has no usable encoding and was skipped"),
            ParseWarning::BitmapShapeMismatch { name, codepoint } => {
                write!(f, "Bitmap of glyph '{name}' (encoding {codepoint}) does not match its bounding box")
            }
            ParseWarning::OversizedGlyph { name, width, height } => {
                write!(f, "Glyph '{name}' with a {width}x{height} bounding box is too large and was skipped")
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseState {
    Header,
    Properties,
    GlyphCount,
    Glyphs,
    Done,
}

/// The glyph record between `STARTCHAR` and `ENDCHAR`.
#[derive(Debug, Default)]
struct PendingGlyph {
    name: String,
    codepoint: Option<u32>,
    bbx: Option<(u32, u32, i32, i32)>,
    swidth: Option<(i32, i32)>,
    dwidth: Option<(i32, i32)>,
    swidth1: Option<(i32, i32)>,
    dwidth1: Option<(i32, i32)>,
    vvector: Option<(i32, i32)>,
    rows: Vec<String>,
    in_bitmap: bool,
}

/// Splits a line into its keyword and the trimmed rest. The rest is `None` for one token lines.
fn split_line(line: &str) -> (&str, Option<&str>) {
    let line = line.trim_end_matches(['\r', '\n']);
    match line.split_once([' ', '\t']) {
        Some((key, value)) if !value.trim().is_empty() => (key, Some(value.trim())),
        _ => (line.trim(), None),
    }
}

/// Incremental BDF parser, fed one line at a time.
///
/// ```
/// use icy_bdf::BdfParser;
///
/// let mut parser = BdfParser::new();
/// for line in ["STARTFONT 2.1", "FONT test", "ENDFONT"] {
///     if parser.feed_line(line).unwrap() {
///         break;
///     }
/// }
/// let (font, warnings) = parser.finish().unwrap();
/// assert_eq!(font.headers.unwrap().font_name, "test");
/// assert_eq!(warnings.len(), 2);
/// ```
pub struct BdfParser {
    state: ParseState,
    headers: Headers,
    font: Font,
    glyph_count: Option<usize>,
    glyph: PendingGlyph,
    glyph_end: bool,
    warnings: Vec<ParseWarning>,
}

impl Default for BdfParser {
    fn default() -> Self {
        Self::new()
    }
}

impl BdfParser {
    pub fn new() -> Self {
        Self {
            state: ParseState::Header,
            headers: Headers::default(),
            font: Font::default(),
            glyph_count: None,
            glyph: PendingGlyph::default(),
            glyph_end: true,
            warnings: Vec::new(),
        }
    }

    /// `true` once `ENDFONT` has been seen; further lines are ignored.
    pub fn is_done(&self) -> bool {
        self.state == ParseState::Done
    }

    pub fn warnings(&self) -> &[ParseWarning] {
        &self.warnings
    }

    /// Consumes one line of input. Returns `true` once the font is complete.
    ///
    /// # Errors
    ///
    /// This function will return an error if a glyph reaches `ENDCHAR` without a
    /// bounding box or contains a bitmap row that isn't hexadecimal.
    pub fn feed_line(&mut self, line: &str) -> Result<bool> {
        let (key, value) = split_line(line);
        if key.is_empty() {
            return Ok(self.is_done());
        }
        match self.state {
            ParseState::Header => self.parse_header(line, key, value)?,
            ParseState::Properties => self.parse_property(key, value)?,
            ParseState::GlyphCount => self.parse_glyph_count(line, key, value)?,
            ParseState::Glyphs => self.parse_glyph_line(key, value)?,
            ParseState::Done => {}
        }
        Ok(self.is_done())
    }

    /// Finishes parsing and returns the font together with all warnings.
    ///
    /// Input that stopped before `ENDFONT` still yields a font with every glyph
    /// completed so far.
    pub fn finish(mut self) -> Result<(Font, Vec<ParseWarning>)> {
        match self.state {
            ParseState::Done => {}
            ParseState::Glyphs => {
                self.warn(ParseWarning::MissingEndFont);
                self.check_glyph_count();
            }
            ParseState::Header | ParseState::Properties | ParseState::GlyphCount => {
                self.warn(ParseWarning::MissingEndFont);
                self.finalize_headers();
            }
        }
        Ok((self.font, self.warnings))
    }

    fn warn(&mut self, warning: ParseWarning) {
        log::warn!("{warning}");
        self.warnings.push(warning);
    }

    fn finalize_headers(&mut self) {
        if self.font.headers.is_none() {
            self.font.headers = Some(std::mem::take(&mut self.headers));
        }
    }

    fn parse_number<T: FromStr>(&mut self, stage: ParseStage, keyword: &str, value: &str) -> Option<T> {
        match value.parse::<T>() {
            Ok(n) => Some(n),
            Err(_) => {
                self.warn(ParseWarning::InvalidNumber {
                    stage,
                    keyword: keyword.to_string(),
                    value: value.to_string(),
                });
                None
            }
        }
    }

    /// Parses the first `N` whitespace separated integers of `value`.
    fn parse_numbers<const N: usize>(&mut self, stage: ParseStage, keyword: &str, value: &str) -> Option<[i32; N]> {
        let mut result = [0; N];
        let mut parts = value.split_whitespace();
        for slot in &mut result {
            *slot = self.parse_number(stage, keyword, parts.next().unwrap_or_default())?;
        }
        Some(result)
    }

    fn parse_pair(&mut self, stage: ParseStage, keyword: &str, value: &str) -> Option<(i32, i32)> {
        self.parse_numbers::<2>(stage, keyword, value).map(|[x, y]| (x, y))
    }

    fn parse_header(&mut self, line: &str, key: &str, value: Option<&str>) -> Result<()> {
        const STAGE: ParseStage = ParseStage::Header;
        let Some(value) = value else {
            match key {
                "ENDFONT" => {
                    self.warn(ParseWarning::MissingPropertiesBlock);
                    self.warn(ParseWarning::NoGlyphs);
                    self.finalize_headers();
                    self.state = ParseState::Done;
                }
                "STARTPROPERTIES" => {
                    self.finalize_headers();
                    self.state = ParseState::Properties;
                }
                "COMMENT" => self.headers.comments.push(String::new()),
                _ => {}
            }
            return Ok(());
        };

        match key {
            "STARTFONT" => {
                if let Some(version) = self.parse_number(STAGE, key, value) {
                    self.headers.bdf_version = version;
                }
            }
            "FONT" => self.headers.font_name = value.to_string(),
            "SIZE" => {
                if let Some([point_size, x_res, y_res]) = self.parse_numbers::<3>(STAGE, key, value) {
                    self.headers.point_size = point_size;
                    self.headers.x_res = x_res;
                    self.headers.y_res = y_res;
                }
            }
            "FONTBOUNDINGBOX" => {
                if let Some([w, h, xoff, yoff]) = self.parse_numbers::<4>(STAGE, key, value) {
                    self.headers.fbbx = w;
                    self.headers.fbby = h;
                    self.headers.fbbxoff = xoff;
                    self.headers.fbbyoff = yoff;
                }
            }
            "STARTPROPERTIES" => {
                self.finalize_headers();
                self.state = ParseState::Properties;
            }
            "COMMENT" => self.headers.comments.push(trim_quotes(value).to_string()),
            "SWIDTH" => self.headers.swidth = self.parse_pair(STAGE, key, value),
            "DWIDTH" => self.headers.dwidth = self.parse_pair(STAGE, key, value),
            "SWIDTH1" => self.headers.swidth1 = self.parse_pair(STAGE, key, value),
            "DWIDTH1" => self.headers.dwidth1 = self.parse_pair(STAGE, key, value),
            "VVECTOR" => self.headers.vvector = self.parse_pair(STAGE, key, value),
            "METRICSSET" => self.headers.metrics_set = self.parse_number(STAGE, key, value),
            "CONTENTVERSION" => self.headers.content_version = self.parse_number(STAGE, key, value),
            "CHARS" => {
                self.warn(ParseWarning::MissingPropertiesBlock);
                self.finalize_headers();
                self.state = ParseState::GlyphCount;
                return self.feed_line(line).map(|_| ());
            }
            "STARTCHAR" => {
                self.warn(ParseWarning::MissingPropertiesBlock);
                self.warn(ParseWarning::MissingCharsLine);
                self.finalize_headers();
                self.state = ParseState::Glyphs;
                return self.feed_line(line).map(|_| ());
            }
            _ => {}
        }
        Ok(())
    }

    fn parse_property(&mut self, key: &str, value: Option<&str>) -> Result<()> {
        match (key, value) {
            ("COMMENT", value) => self.font.property_comments.push(value.map(trim_quotes).unwrap_or_default().to_string()),
            ("ENDPROPERTIES", None) => self.state = ParseState::GlyphCount,
            ("ENDFONT", None) => {
                self.warn(ParseWarning::NoGlyphs);
                self.state = ParseState::Done;
            }
            (key, value) => {
                self.font
                    .properties
                    .insert(key.to_ascii_lowercase(), value.map(|v| trim_quotes(v).to_string()));
            }
        }
        Ok(())
    }

    fn parse_glyph_count(&mut self, line: &str, key: &str, value: Option<&str>) -> Result<()> {
        match (key, value) {
            ("ENDFONT", None) => {
                self.warn(ParseWarning::NoGlyphs);
                self.state = ParseState::Done;
                Ok(())
            }
            ("CHARS", Some(value)) => {
                self.glyph_count = self.parse_number(ParseStage::GlyphCount, key, value);
                self.state = ParseState::Glyphs;
                Ok(())
            }
            _ => {
                self.warn(ParseWarning::MissingCharsLine);
                self.state = ParseState::Glyphs;
                self.feed_line(line).map(|_| ())
            }
        }
    }

    fn parse_encoding(&mut self, value: &str) -> Option<u32> {
        let mut parts = value.split_whitespace();
        let encoding: i64 = self.parse_number(ParseStage::Glyphs, "ENCODING", parts.next().unwrap_or_default())?;
        if let Ok(cp) = u32::try_from(encoding) {
            return Some(cp);
        }
        // `ENCODING -1 <n>` carries a non standard encoding
        let alternate = parts.next()?;
        self.parse_number(ParseStage::Glyphs, "ENCODING", alternate)
    }

    fn parse_glyph_line(&mut self, key: &str, value: Option<&str>) -> Result<()> {
        const STAGE: ParseStage = ParseStage::Glyphs;
        if let Some(value) = value {
            match key {
                "STARTCHAR" => {
                    self.glyph = PendingGlyph {
                        name: value.to_string(),
                        ..Default::default()
                    };
                    self.glyph_end = false;
                }
                "ENCODING" => self.glyph.codepoint = self.parse_encoding(value),
                "BBX" => {
                    if let Some([w, h, xoff, yoff]) = self.parse_numbers::<4>(STAGE, key, value) {
                        match (u32::try_from(w), u32::try_from(h)) {
                            (Ok(w), Ok(h)) => self.glyph.bbx = Some((w, h, xoff, yoff)),
                            _ => self.warn(ParseWarning::InvalidNumber {
                                stage: STAGE,
                                keyword: key.to_string(),
                                value: value.to_string(),
                            }),
                        }
                    }
                }
                "SWIDTH" => self.glyph.swidth = self.parse_pair(STAGE, key, value),
                "DWIDTH" => self.glyph.dwidth = self.parse_pair(STAGE, key, value),
                "SWIDTH1" => self.glyph.swidth1 = self.parse_pair(STAGE, key, value),
                "DWIDTH1" => self.glyph.dwidth1 = self.parse_pair(STAGE, key, value),
                "VVECTOR" => self.glyph.vvector = self.parse_pair(STAGE, key, value),
                _ => {}
            }
            return Ok(());
        }

        match key {
            "STARTCHAR" => {
                self.glyph = PendingGlyph::default();
                self.glyph_end = false;
            }
            "BITMAP" => {
                self.glyph.rows.clear();
                self.glyph.in_bitmap = true;
            }
            "ENDCHAR" => self.end_glyph()?,
            "ENDFONT" if self.glyph_end => {
                self.check_glyph_count();
                self.state = ParseState::Done;
            }
            _ => {
                if self.glyph.in_bitmap {
                    self.glyph.rows.push(key.to_string());
                }
            }
        }
        Ok(())
    }

    fn end_glyph(&mut self) -> Result<()> {
        let pending = std::mem::take(&mut self.glyph);
        let Some((bbw, bbh, bbxoff, bbyoff)) = pending.bbx else {
            return Err(BdfError::MissingGlyphWidth {
                stage: ParseStage::Glyphs,
                name: pending.name,
                codepoint: pending.codepoint,
            });
        };
        if u64::from(bbw) * u64::from(bbh) > MAX_GLYPH_PIXELS {
            self.glyph_end = true;
            self.warn(ParseWarning::OversizedGlyph {
                name: pending.name,
                width: bbw,
                height: bbh,
            });
            return Ok(());
        }
        let bitmap = hex_rows_to_bitmap(pending.rows.as_slice(), bbw as usize).map_err(|err| BdfError::InvalidHexRow {
            stage: ParseStage::Glyphs,
            name: pending.name.clone(),
            row: err.row,
        })?;
        self.glyph_end = true;

        let Some(codepoint) = pending.codepoint else {
            self.warn(ParseWarning::UnencodedGlyph { name: pending.name });
            return Ok(());
        };
        let mut glyph = Glyph {
            name: pending.name,
            codepoint,
            bbw,
            bbh,
            bbxoff,
            bbyoff,
            swidth: pending.swidth,
            dwidth: pending.dwidth,
            swidth1: pending.swidth1,
            dwidth1: pending.dwidth1,
            vvector: pending.vvector,
            bitmap,
        };
        if glyph.normalize_bitmap() {
            self.warn(ParseWarning::BitmapShapeMismatch {
                name: glyph.name.clone(),
                codepoint,
            });
        }
        self.font.insert_glyph(glyph);
        Ok(())
    }

    fn check_glyph_count(&mut self) {
        let actual = self.font.glyphs.len();
        match self.glyph_count {
            Some(expected) if expected == actual => {}
            Some(expected) => self.warn(ParseWarning::GlyphCountMismatch { expected, actual }),
            None => self.warn(ParseWarning::MissingGlyphCount),
        }
    }
}

/// Parses a font from a sequence of lines and returns it together with the recoverable problems found.
///
/// # Errors
///
/// This function will return an error if a glyph is fatally malformed.
pub fn load_font_with_warnings<I, S>(lines: I) -> Result<(Font, Vec<ParseWarning>)>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut parser = BdfParser::new();
    for line in lines {
        if parser.feed_line(line.as_ref())? {
            break;
        }
    }
    parser.finish()
}

/// Parses a font from a sequence of lines.
///
/// # Errors
///
/// This function will return an error if a glyph is fatally malformed.
pub fn load_font<I, S>(lines: I) -> Result<Font>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    load_font_with_warnings(lines).map(|(font, _)| font)
}

/// Parses a font from a buffered reader, reading one line at a time.
///
/// Lines are decoded lossily, bytes that aren't valid UTF-8 (a Latin-1 `©` in a
/// copyright notice for example) become U+FFFD.
///
/// # Errors
///
/// This function will return an error if reading fails or a glyph is fatally malformed.
pub fn load_font_from_reader<R: BufRead>(mut reader: R) -> Result<Font> {
    let mut parser = BdfParser::new();
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        if parser.feed_line(&String::from_utf8_lossy(&buf))? {
            break;
        }
    }
    parser.finish().map(|(font, _)| font)
}

/// Parses a font from an async reader, awaiting each line. Lines are decoded
/// lossily like in [`load_font_from_reader`].
///
/// # Errors
///
/// This function will return an error if reading fails or a glyph is fatally malformed.
#[cfg(feature = "tokio")]
pub async fn load_font_async<R>(mut reader: R) -> Result<Font>
where
    R: tokio::io::AsyncBufRead + Unpin,
{
    use tokio::io::AsyncBufReadExt;

    let mut parser = BdfParser::new();
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }
        if parser.feed_line(&String::from_utf8_lossy(&buf))? {
            break;
        }
    }
    parser.finish().map(|(font, _)| font)
}

impl FromStr for Font {
    type Err = BdfError;

    fn from_str(s: &str) -> Result<Self> {
        load_font(s.lines())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const HEADER: &str = "STARTFONT 2.1
FONT -Test-Fixed-Medium-R-Normal--8-80-75-75-C-50-ISO10646-1
SIZE 8 75 75
FONTBOUNDINGBOX 5 8 0 -1
";

    fn parse(text: &str) -> Result<(Font, Vec<ParseWarning>)> {
        let _ = env_logger::builder().is_test(true).try_init();
        load_font_with_warnings(text.lines())
    }

    #[test]
    fn test_split_line() {
        assert_eq!(split_line("FONT a b c"), ("FONT", Some("a b c")));
        assert_eq!(split_line("ENDCHAR\r"), ("ENDCHAR", None));
        assert_eq!(split_line("ENDFONT "), ("ENDFONT", None));
        assert_eq!(split_line("BBX\t5 8 0 -1"), ("BBX", Some("5 8 0 -1")));
        assert_eq!(split_line(""), ("", None));
    }

    #[test]
    fn test_headers() {
        let text = format!("{HEADER}SWIDTH 500 0\nDWIDTH 5 0\nVVECTOR 2   4\nMETRICSSET 2\nCONTENTVERSION 7\nCOMMENT \"hello world\"\nCOMMENT  plain \nSTARTPROPERTIES 0\nENDPROPERTIES\nCHARS 0\nENDFONT\n");
        let (font, warnings) = parse(&text).unwrap();
        let headers = font.headers.unwrap();
        assert_eq!(headers.bdf_version, 2.1);
        assert_eq!(headers.font_name, "-Test-Fixed-Medium-R-Normal--8-80-75-75-C-50-ISO10646-1");
        assert_eq!((headers.point_size, headers.x_res, headers.y_res), (8, 75, 75));
        assert_eq!((headers.fbbx, headers.fbby, headers.fbbxoff, headers.fbbyoff), (5, 8, 0, -1));
        assert_eq!(headers.swidth, Some((500, 0)));
        assert_eq!(headers.dwidth, Some((5, 0)));
        assert_eq!(headers.swidth1, None);
        assert_eq!(headers.vvector, Some((2, 4)));
        assert_eq!(headers.metrics_set, Some(2));
        assert_eq!(headers.content_version, Some(7));
        assert_eq!(headers.comments, vec!["hello world".to_string(), "plain".to_string()]);
        assert_eq!(warnings, vec![]);
    }

    #[test]
    fn test_properties() {
        let text = format!(
            "{HEADER}STARTPROPERTIES 4\nFONT_ASCENT 7\nCOPYRIGHT \"Public domain\"\nCOMMENT 'prop comment'\nSOME_FLAG\nFACE_NAME  'Fixed' \nENDPROPERTIES\nCHARS 0\nENDFONT\n"
        );
        let (font, _) = parse(&text).unwrap();
        let props: Vec<_> = font.properties.iter().map(|(k, v)| (k.as_str(), v.as_deref())).collect();
        assert_eq!(
            props,
            vec![
                ("font_ascent", Some("7")),
                ("copyright", Some("Public domain")),
                ("some_flag", None),
                ("face_name", Some("Fixed")),
            ]
        );
        assert_eq!(font.property_comments, vec!["prop comment".to_string()]);
        assert!(font.glyphs.is_empty());
    }

    #[test]
    fn test_glyph() {
        let text = format!(
            "{HEADER}STARTPROPERTIES 0\nENDPROPERTIES\nCHARS 1\nSTARTCHAR A\nENCODING 65\nSWIDTH 500 0\nDWIDTH 5 0\nBBX 5 3 0 -1\nSWIDTH1 1 2\nDWIDTH1 3 4\nVVECTOR 5 6\nBITMAP\n70\n88\nf8\nENDCHAR\nENDFONT\n"
        );
        let (font, warnings) = parse(&text).unwrap();
        assert_eq!(warnings, vec![]);
        let glyph = font.glyph('A').unwrap();
        assert_eq!(glyph.name, "A");
        assert_eq!((glyph.bbw, glyph.bbh, glyph.bbxoff, glyph.bbyoff), (5, 3, 0, -1));
        assert_eq!(glyph.swidth, Some((500, 0)));
        assert_eq!(glyph.dwidth, Some((5, 0)));
        assert_eq!(glyph.swidth1, Some((1, 2)));
        assert_eq!(glyph.dwidth1, Some((3, 4)));
        assert_eq!(glyph.vvector, Some((5, 6)));
        assert_eq!(glyph.to_string(), " 0-###-\n 1#---#\n 2#####\n---");
    }

    #[test]
    fn test_empty_font_without_properties() {
        let text = format!("{HEADER}ENDFONT\n");
        let (font, warnings) = parse(&text).unwrap();
        assert_eq!(warnings, vec![ParseWarning::MissingPropertiesBlock, ParseWarning::NoGlyphs]);
        assert_eq!(font.headers.unwrap().font_name, "-Test-Fixed-Medium-R-Normal--8-80-75-75-C-50-ISO10646-1");
        assert!(font.properties.is_empty());
        assert!(font.glyphs.is_empty());
    }

    #[test]
    fn test_empty_font_after_properties() {
        let text = format!("{HEADER}STARTPROPERTIES 1\nFOUNDRY \"Test\"\nENDFONT\n");
        let (font, warnings) = parse(&text).unwrap();
        assert_eq!(warnings, vec![ParseWarning::NoGlyphs]);
        assert_eq!(font.properties.len(), 1);

        let text = format!("{HEADER}STARTPROPERTIES 0\nENDPROPERTIES\nENDFONT\n");
        let (font, warnings) = parse(&text).unwrap();
        assert_eq!(warnings, vec![ParseWarning::NoGlyphs]);
        assert!(font.glyphs.is_empty());
    }

    #[test]
    fn test_chars_without_properties() {
        let text = format!("{HEADER}CHARS 1\nSTARTCHAR space\nENCODING 32\nBBX 1 1 0 0\nBITMAP\n00\nENDCHAR\nENDFONT\n");
        let (font, warnings) = parse(&text).unwrap();
        assert_eq!(warnings, vec![ParseWarning::MissingPropertiesBlock]);
        assert_eq!(font.codepoints(Default::default(), None), vec![32]);
    }

    #[test]
    fn test_startchar_without_properties() {
        let text = format!("{HEADER}STARTCHAR space\nENCODING 32\nBBX 1 1 0 0\nBITMAP\n00\nENDCHAR\nENDFONT\n");
        let (font, warnings) = parse(&text).unwrap();
        assert_eq!(
            warnings,
            vec![
                ParseWarning::MissingPropertiesBlock,
                ParseWarning::MissingCharsLine,
                ParseWarning::MissingGlyphCount
            ]
        );
        assert_eq!(font.glyphs[&32].name, "space");
    }

    #[test]
    fn test_missing_chars_line() {
        let text = format!("{HEADER}STARTPROPERTIES 0\nENDPROPERTIES\nSTARTCHAR space\nENCODING 32\nBBX 1 1 0 0\nBITMAP\n00\nENDCHAR\nENDFONT\n");
        let (font, warnings) = parse(&text).unwrap();
        assert_eq!(warnings, vec![ParseWarning::MissingCharsLine, ParseWarning::MissingGlyphCount]);
        assert_eq!(font.glyphs.len(), 1);
    }

    #[test]
    fn test_glyph_count_mismatch() {
        let text = format!("{HEADER}STARTPROPERTIES 0\nENDPROPERTIES\nCHARS 3\nSTARTCHAR space\nENCODING 32\nBBX 1 1 0 0\nBITMAP\n00\nENDCHAR\nENDFONT\n");
        let (font, warnings) = parse(&text).unwrap();
        assert_eq!(warnings, vec![ParseWarning::GlyphCountMismatch { expected: 3, actual: 1 }]);
        assert_eq!(font.glyphs.len(), 1);
    }

    #[test]
    fn test_premature_end() {
        let text = format!("{HEADER}STARTPROPERTIES 0\nENDPROPERTIES\nCHARS 2\nSTARTCHAR space\nENCODING 32\nBBX 1 1 0 0\nBITMAP\n00\nENDCHAR\nSTARTCHAR A\nENCODING 65\nBBX 1 1 0 0\nBITMAP\n80\n");
        let (font, warnings) = parse(&text).unwrap();
        assert_eq!(
            warnings,
            vec![ParseWarning::MissingEndFont, ParseWarning::GlyphCountMismatch { expected: 2, actual: 1 }]
        );
        assert_eq!(font.codepoints(Default::default(), None), vec![32]);
    }

    #[test]
    fn test_premature_end_in_header() {
        let (font, warnings) = parse(HEADER).unwrap();
        assert_eq!(warnings, vec![ParseWarning::MissingEndFont]);
        assert_eq!(font.headers.unwrap().fbby, 8);
    }

    #[test]
    fn test_endfont_inside_open_glyph_is_ignored() {
        let text = format!("{HEADER}STARTPROPERTIES 0\nENDPROPERTIES\nCHARS 1\nSTARTCHAR space\nENCODING 32\nBBX 1 1 0 0\nENDFONT\nBITMAP\n00\nENDCHAR\nENDFONT\n");
        let (font, warnings) = parse(&text).unwrap();
        assert_eq!(warnings, vec![]);
        assert_eq!(font.glyphs.len(), 1);
    }

    #[test]
    fn test_missing_bbx_is_fatal() {
        let text = format!("{HEADER}STARTPROPERTIES 0\nENDPROPERTIES\nCHARS 1\nSTARTCHAR broken\nENCODING 66\nBITMAP\n80\nENDCHAR\nENDFONT\n");
        match parse(&text) {
            Err(BdfError::MissingGlyphWidth { stage, name, codepoint }) => {
                assert_eq!(stage, ParseStage::Glyphs);
                assert_eq!(name, "broken");
                assert_eq!(codepoint, Some(66));
            }
            other => panic!("expected missing width error, got {other:?}"),
        }
    }

    #[test]
    fn test_invalid_hex_row_is_fatal() {
        let text = format!("{HEADER}CHARS 1\nSTARTCHAR bad\nENCODING 66\nBBX 8 1 0 0\nBITMAP\nZZ\nENDCHAR\nENDFONT\n");
        assert!(matches!(parse(&text), Err(BdfError::InvalidHexRow { row, .. }) if row == "ZZ"));
    }

    #[test]
    fn test_zero_width_glyph() {
        let text = format!("{HEADER}CHARS 1\nSTARTCHAR space\nENCODING 32\nBBX 0 0 0 0\nBITMAP\nENDCHAR\nENDFONT\n");
        let (font, _) = parse(&text).unwrap();
        assert_eq!(font.glyphs[&32].bitmap, Vec::<Vec<bool>>::new());
    }

    #[test]
    fn test_alternate_encoding() {
        let text = format!(
            "{HEADER}CHARS 2\nSTARTCHAR private\nENCODING -1 200\nBBX 1 1 0 0\nBITMAP\n80\nENDCHAR\nSTARTCHAR unencoded\nENCODING -1\nBBX 1 1 0 0\nBITMAP\n80\nENDCHAR\nENDFONT\n"
        );
        let (font, warnings) = parse(&text).unwrap();
        assert_eq!(font.codepoints(Default::default(), None), vec![200]);
        assert_eq!(
            warnings,
            vec![
                ParseWarning::MissingPropertiesBlock,
                ParseWarning::UnencodedGlyph { name: "unencoded".to_string() },
                ParseWarning::GlyphCountMismatch { expected: 2, actual: 1 }
            ]
        );
    }

    #[test]
    fn test_bitmap_shape_mismatch() {
        let text = format!("{HEADER}CHARS 1\nSTARTCHAR short\nENCODING 65\nBBX 12 3 0 0\nBITMAP\nFF\nFFF0\nENDCHAR\nENDFONT\n");
        let (font, warnings) = parse(&text).unwrap();
        let glyph = &font.glyphs[&65];
        assert_eq!(glyph.bitmap.len(), 3);
        assert!(glyph.bitmap.iter().all(|row| row.len() == 12));
        assert_eq!(glyph.bitmap[0][8..], [false; 4]);
        assert!(glyph.bitmap[1].iter().all(|p| *p));
        assert!(warnings.contains(&ParseWarning::BitmapShapeMismatch {
            name: "short".to_string(),
            codepoint: 65
        }));
    }

    #[test]
    fn test_invalid_number_is_a_warning() {
        let text = format!("{HEADER}METRICSSET x\nSTARTPROPERTIES 0\nENDPROPERTIES\nCHARS 0\nENDFONT\n");
        let (font, warnings) = parse(&text).unwrap();
        assert_eq!(font.headers.unwrap().metrics_set, None);
        assert_eq!(
            warnings,
            vec![ParseWarning::InvalidNumber {
                stage: ParseStage::Header,
                keyword: "METRICSSET".to_string(),
                value: "x".to_string()
            }]
        );
    }

    #[test]
    fn test_duplicate_encoding_replaces() {
        let text = format!(
            "{HEADER}CHARS 2\nSTARTCHAR first\nENCODING 65\nBBX 1 1 0 0\nBITMAP\n00\nENDCHAR\nSTARTCHAR second\nENCODING 65\nBBX 1 1 0 0\nBITMAP\n80\nENDCHAR\nENDFONT\n"
        );
        let (font, _) = parse(&text).unwrap();
        assert_eq!(font.glyphs.len(), 1);
        assert_eq!(font.glyphs[&65].name, "second");
    }

    #[test]
    fn test_crlf_and_blank_lines() {
        let text = format!("{HEADER}STARTPROPERTIES 0\r\n\r\nENDPROPERTIES\r\nCHARS 0\r\nENDFONT\r\n").replace('\n', "\r\n").replace("\r\r", "\r");
        let (font, warnings) = parse(&text).unwrap();
        assert!(font.properties.is_empty());
        assert_eq!(warnings, vec![]);
    }

    #[test]
    fn test_lines_after_endfont_are_ignored() {
        let mut parser = BdfParser::new();
        for line in format!("{HEADER}ENDFONT\nSTARTCHAR late\n").lines() {
            parser.feed_line(line).unwrap();
        }
        assert!(parser.is_done());
        let (font, _) = parser.finish().unwrap();
        assert!(font.glyphs.is_empty());
    }

    #[test]
    fn test_oversized_glyph_is_skipped() {
        let text = format!(
            "{HEADER}CHARS 2\nSTARTCHAR huge\nENCODING 66\nBBX 8 2000000000 0 0\nBITMAP\nFF\nENDCHAR\nSTARTCHAR space\nENCODING 32\nBBX 1 1 0 0\nBITMAP\n00\nENDCHAR\nENDFONT\n"
        );
        let (font, warnings) = parse(&text).unwrap();
        assert_eq!(font.codepoints(Default::default(), None), vec![32]);
        assert_eq!(
            warnings,
            vec![
                ParseWarning::MissingPropertiesBlock,
                ParseWarning::OversizedGlyph {
                    name: "huge".to_string(),
                    width: 8,
                    height: 2_000_000_000
                },
                ParseWarning::GlyphCountMismatch { expected: 2, actual: 1 }
            ]
        );
    }

    #[test]
    fn test_reader_accepts_latin1_bytes() {
        let mut bytes = format!("{HEADER}STARTPROPERTIES 1\n").into_bytes();
        bytes.extend_from_slice(b"COPYRIGHT \"\xA9 1990\"\r\nENDPROPERTIES\nCHARS 1\nSTARTCHAR space\nENCODING 32\nBBX 1 1 0 0\nBITMAP\n00\nENDCHAR\nENDFONT");
        let font = load_font_from_reader(std::io::Cursor::new(bytes)).unwrap();
        assert_eq!(font.property("copyright"), Some(&Some("\u{FFFD} 1990".to_string())));
        assert_eq!(font.glyphs.len(), 1);
    }

    #[test]
    fn test_parser_warnings_so_far() {
        let mut parser = BdfParser::new();
        for line in HEADER.lines() {
            parser.feed_line(line).unwrap();
        }
        assert!(parser.warnings().is_empty());
        parser.feed_line("CHARS 0").unwrap();
        assert_eq!(parser.warnings(), [ParseWarning::MissingPropertiesBlock].as_slice());
        parser.feed_line("ENDFONT").unwrap();
        assert!(parser.is_done());
        let (_, warnings) = parser.finish().unwrap();
        assert_eq!(warnings, vec![ParseWarning::MissingPropertiesBlock]);
    }

    #[test]
    fn test_from_str() {
        let font: Font = format!("{HEADER}CHARS 0\nENDFONT\n").parse().unwrap();
        assert_eq!(font.headers.unwrap().point_size, 8);
    }
}
