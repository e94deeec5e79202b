/// Symbol: one tile of a level's alphabet row.
/// Properties are queried via methods, so tile semantics stay centralized here.

use crate::domain::curriculum::{example_for, Level};

/// Language tag used for every spoken announcement.
pub const SPEECH_LANG: &str = "hi-IN";

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Symbol {
    /// `"{level_id}-{glyph}"`, unique within a level.
    pub id: String,
    pub glyph: &'static str,
    /// Position this symbol occupies in the canonical order.
    pub correct_index: usize,
    /// Romanised example word, e.g. "Kabutar".
    pub example: &'static str,
    /// Devanagari example word, e.g. "कबूतर".
    pub example_native: &'static str,
}

impl Symbol {
    pub fn new(level: &Level, glyph: &'static str, correct_index: usize) -> Self {
        let ex = example_for(glyph);
        Symbol {
            id: format!("{}-{}", level.id, glyph),
            glyph,
            correct_index,
            example: ex.english,
            example_native: ex.hindi,
        }
    }

    /// Does this symbol belong at `pos`?
    pub fn belongs_at(&self, pos: usize) -> bool {
        self.correct_index == pos
    }

    /// Text spoken by the tile's audio affordance: "क से कबूतर".
    pub fn pronunciation(&self) -> String {
        if self.example_native.is_empty() {
            self.glyph.to_string()
        } else {
            format!("{} से {}", self.glyph, self.example_native)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::curriculum::level_by_id;

    #[test]
    fn symbol_carries_example_words() {
        let level = level_by_id("k-varga").unwrap();
        let s = Symbol::new(level, "क", 0);
        assert_eq!(s.id, "k-varga-क");
        assert_eq!(s.example, "Kabutar");
        assert_eq!(s.example_native, "कबूतर");
        assert_eq!(s.pronunciation(), "क से कबूतर");
        assert!(s.belongs_at(0));
        assert!(!s.belongs_at(1));
    }

    #[test]
    fn unknown_glyph_speaks_only_itself() {
        let level = level_by_id("k-varga").unwrap();
        let s = Symbol::new(level, "ॐ", 4);
        assert_eq!(s.example, "");
        assert_eq!(s.example_native, "");
        assert_eq!(s.pronunciation(), "ॐ");
    }
}
