/// Curriculum store: the built-in level table and example words.
///
/// Levels are defined once at compile time and never mutated.
/// Lookups cannot fail: a glyph without an example word maps to
/// an empty `Example`.

use crate::domain::symbol::Symbol;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Category {
    Vowels,
    Consonants,
    Combined,
}

impl Category {
    pub fn label(self) -> &'static str {
        match self {
            Category::Vowels => "Vowels",
            Category::Consonants => "Consonants",
            Category::Combined => "Combined",
        }
    }
}

#[derive(Debug)]
pub struct Level {
    pub id: &'static str,
    pub title: &'static str,
    pub category: Category,
    pub description: &'static str,
    /// Glyphs in canonical order.
    pub letters: &'static [&'static str],
}

impl Level {
    /// Build the level's symbols in canonical order.
    pub fn symbols(&self) -> Vec<Symbol> {
        self.letters
            .iter()
            .enumerate()
            .map(|(i, &glyph)| Symbol::new(self, glyph, i))
            .collect()
    }
}

/// Example word pair for a glyph.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Example {
    pub hindi: &'static str,
    pub english: &'static str,
}

// ── Public API ──

pub fn levels() -> &'static [Level] {
    &LEVELS
}

pub fn level_by_id(id: &str) -> Option<&'static Level> {
    LEVELS.iter().find(|l| l.id == id)
}

pub fn level_index(id: &str) -> Option<usize> {
    LEVELS.iter().position(|l| l.id == id)
}

pub fn example_for(glyph: &str) -> Example {
    EXAMPLES
        .iter()
        .find(|(g, _, _)| *g == glyph)
        .map(|&(_, hindi, english)| Example { hindi, english })
        .unwrap_or_default()
}

// ── Level table ──

static LEVELS: [Level; 9] = [
    Level {
        id: "swar",
        title: "Swar (Vowels)",
        category: Category::Vowels,
        description: "Arrange the vowels from अ to अः",
        letters: &["अ", "आ", "इ", "ई", "उ", "ऊ", "ऋ", "ए", "ऐ", "ओ", "औ", "अं", "अः"],
    },
    Level {
        id: "k-varga",
        title: "K-Varga (Gutturals)",
        category: Category::Consonants,
        description: "Throat sounds: क to ङ",
        letters: &["क", "ख", "ग", "घ", "ङ"],
    },
    Level {
        id: "ch-varga",
        title: "Ch-Varga (Palatals)",
        category: Category::Consonants,
        description: "Palate sounds: च to ञ",
        letters: &["च", "छ", "ज", "झ", "ञ"],
    },
    Level {
        id: "t-varga-retro",
        title: "T-Varga (Retroflex)",
        category: Category::Consonants,
        description: "Roof of mouth: ट to ण",
        letters: &["ट", "ठ", "ड", "ढ", "ण"],
    },
    Level {
        id: "t-varga-dental",
        title: "T-Varga (Dental)",
        category: Category::Consonants,
        description: "Teeth sounds: त to न",
        letters: &["त", "थ", "द", "ध", "न"],
    },
    Level {
        id: "p-varga",
        title: "P-Varga (Labials)",
        category: Category::Consonants,
        description: "Lip sounds: प to म",
        letters: &["प", "फ", "ब", "भ", "म"],
    },
    Level {
        id: "anthastha",
        title: "Anthastha (Semi-vowels)",
        category: Category::Consonants,
        description: "Inner sounds: य to व",
        letters: &["य", "र", "ल", "व"],
    },
    Level {
        id: "usm",
        title: "Usm (Sibilants)",
        category: Category::Consonants,
        description: "Warm breath sounds: श to ह",
        letters: &["श", "ष", "स", "ह"],
    },
    Level {
        id: "sanyukt",
        title: "Sanyukt (Conjuncts)",
        category: Category::Combined,
        description: "Combined letters: क्ष to श्र",
        letters: &["क्ष", "त्र", "ज्ञ", "श्र"],
    },
];

// ── Example words: (glyph, hindi, english) ──

static EXAMPLES: &[(&str, &str, &str)] = &[
    // Vowels
    ("अ", "अनार", "Anar"),
    ("आ", "आम", "Aam"),
    ("इ", "इमली", "Imli"),
    ("ई", "ईख", "Eekh"),
    ("उ", "उल्लू", "Ullu"),
    ("ऊ", "ऊन", "Oon"),
    ("ऋ", "ऋषि", "Rishi"),
    ("ए", "एड़ी", "Edi"),
    ("ऐ", "ऐनक", "Ainak"),
    ("ओ", "ओखली", "Okhli"),
    ("औ", "औरत", "Aurat"),
    ("अं", "अंगूर", "Angoor"),
    ("अः", "खाली", "Khali"),
    // Gutturals
    ("क", "कबूतर", "Kabutar"),
    ("ख", "खरगोश", "Khargosh"),
    ("ग", "गमला", "Gamla"),
    ("घ", "घड़ी", "Ghadi"),
    ("ङ", "खाली", "Khali"),
    // Palatals
    ("च", "चम्मच", "Chamach"),
    ("छ", "छतरी", "Chatri"),
    ("ज", "जहाज", "Jahaj"),
    ("झ", "झंडा", "Jhanda"),
    ("ञ", "खाली", "Khali"),
    // Retroflex
    ("ट", "टमाटर", "Tamatar"),
    ("ठ", "ठठेरा", "Thathera"),
    ("ड", "डमरू", "Damru"),
    ("ढ", "ढक्कन", "Dhakkan"),
    ("ण", "खाली", "Khali"),
    // Dental
    ("त", "तरबूज", "Tarbooj"),
    ("थ", "थर्मस", "Thermos"),
    ("द", "दवात", "Davaat"),
    ("ध", "धनुष", "Dhanush"),
    ("न", "नल", "Nal"),
    // Labials
    ("प", "पतंग", "Patang"),
    ("फ", "फल", "Phal"),
    ("ब", "बतख", "Batakh"),
    ("भ", "भालू", "Bhalu"),
    ("म", "मछली", "Machli"),
    // Semi-vowels
    ("य", "यज्ञ", "Yagya"),
    ("र", "रथ", "Rath"),
    ("ल", "लट्टू", "Lattoo"),
    ("व", "वक", "Vak"),
    // Sibilants
    ("श", "शलजम", "Shaljam"),
    ("ष", "षट्कोण", "Shatkon"),
    ("स", "सपेरा", "Sapera"),
    ("ह", "हल", "Hal"),
    // Conjuncts
    ("क्ष", "क्षत्रिय", "Kshatriya"),
    ("त्र", "त्रिशूल", "Trishul"),
    ("ज्ञ", "ज्ञानी", "Gyani"),
    ("श्र", "श्रमिक", "Shramik"),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_order_is_fixed() {
        let ids: Vec<&str> = levels().iter().map(|l| l.id).collect();
        assert_eq!(ids, [
            "swar", "k-varga", "ch-varga", "t-varga-retro", "t-varga-dental",
            "p-varga", "anthastha", "usm", "sanyukt",
        ]);
    }

    #[test]
    fn k_varga_canonical_order() {
        let level = level_by_id("k-varga").unwrap();
        assert_eq!(level.letters, &["क", "ख", "ग", "घ", "ङ"]);
        assert_eq!(level.category, Category::Consonants);
        assert_eq!(level_index("k-varga"), Some(1));
    }

    #[test]
    fn every_letter_has_an_example() {
        for level in levels() {
            for glyph in level.letters {
                let ex = example_for(glyph);
                assert!(!ex.hindi.is_empty(), "{} in {} has no example", glyph, level.id);
                assert!(!ex.english.is_empty());
            }
        }
    }

    #[test]
    fn example_lookup_matches_glyph() {
        assert_eq!(example_for("क"), Example { hindi: "कबूतर", english: "Kabutar" });
        assert_eq!(example_for("ख").hindi, "खरगोश");
    }

    #[test]
    fn missing_example_falls_back_to_empty() {
        assert_eq!(example_for("Z"), Example::default());
        assert!(level_by_id("nope").is_none());
    }

    #[test]
    fn symbols_are_in_canonical_order() {
        for level in levels() {
            let syms = level.symbols();
            assert_eq!(syms.len(), level.letters.len());
            for (i, s) in syms.iter().enumerate() {
                assert_eq!(s.correct_index, i);
                assert_eq!(s.glyph, level.letters[i]);
            }
        }
    }
}
