//! Ordered and filtered views over the glyphs of a font.

use crate::{Font, Glyph};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CodepointOrder {
    /// Ascending codepoints.
    #[default]
    Ascending,
    /// Descending codepoints.
    Descending,
    /// The order glyphs were inserted into the font.
    Insertion,
    /// Reversed insertion order.
    ReverseInsertion,
}

/// Restricts which codepoints an iteration yields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodepointRange {
    /// Codepoints strictly below the bound.
    Below(u32),
    /// Codepoints within the inclusive pair.
    Between(u32, u32),
    /// Codepoints within at least one of the inclusive pairs.
    AnyOf(Vec<(u32, u32)>),
}

impl CodepointRange {
    pub fn contains(&self, cp: u32) -> bool {
        match self {
            CodepointRange::Below(bound) => cp < *bound,
            CodepointRange::Between(low, high) => (*low..=*high).contains(&cp),
            CodepointRange::AnyOf(ranges) => ranges.iter().any(|(low, high)| (*low..=*high).contains(&cp)),
        }
    }
}

impl Font {
    /// Returns the codepoints of the font in `order`, keeping only those inside `range`.
    pub fn codepoints(&self, order: CodepointOrder, range: Option<&CodepointRange>) -> Vec<u32> {
        let mut cps: Vec<u32> = self.glyphs.keys().copied().collect();
        match order {
            CodepointOrder::Ascending => cps.sort_unstable(),
            CodepointOrder::Descending => cps.sort_unstable_by(|a, b| b.cmp(a)),
            CodepointOrder::Insertion => {}
            CodepointOrder::ReverseInsertion => cps.reverse(),
        }
        if let Some(range) = range {
            cps.retain(|cp| range.contains(*cp));
        }
        cps
    }

    /// Iterates the glyphs in the order given by [`Font::codepoints`].
    pub fn iter_glyphs<'a>(&'a self, order: CodepointOrder, range: Option<&CodepointRange>) -> impl Iterator<Item = &'a Glyph> + 'a {
        self.codepoints(order, range).into_iter().filter_map(move |cp| self.glyphs.get(&cp))
    }

    pub fn glyph_by_codepoint(&self, codepoint: u32) -> Option<&Glyph> {
        let glyph = self.glyphs.get(&codepoint);
        if glyph.is_none() {
            log::debug!(
                "Glyph '{}' (codepoint {codepoint}) does not exist in the font",
                char::from_u32(codepoint).unwrap_or(char::REPLACEMENT_CHARACTER)
            );
        }
        glyph
    }

    pub fn glyph_by_codepoint_mut(&mut self, codepoint: u32) -> Option<&mut Glyph> {
        self.glyphs.get_mut(&codepoint)
    }

    /// Looks up the glyph of a character.
    pub fn glyph(&self, ch: char) -> Option<&Glyph> {
        self.glyph_by_codepoint(ch as u32)
    }
}
