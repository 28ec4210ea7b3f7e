// Chord model: one stenographic keystroke as a set of keys.
//
// The steno keyboard has a fixed, totally ordered key alphabet split into
// three zones:
// - left consonants: `S T K P W H R`
// - the vowel cluster: `A O * E U` (the `*` modifier sits in the middle)
// - right consonants: `F R P B L G T S D Z`
//
// A `Chord` stores its keys as a bitset in that order, so set algebra is a
// handful of integer operations and `Chord` is a small `Copy` value type.
// Text follows the usual steno convention: keys are written in alphabet
// order, and a `-` separates the zones only when no vowel-cluster key is
// present to disambiguate left `T` from right `-T`. A trailing `-` is
// dropped, so `TKPW-` renders as `TKPW`.
//
// Number keys and the number bar are not modelled; chord text using them is
// rejected as a format error.
//
// See also: `search.rs`, which claims chord keys fragment by fragment, and
// `vop.rs`, which strips vowel keys from whole chords.

use std::fmt;
use std::iter::Peekable;
use std::str::{Chars, FromStr};
use thiserror::Error;

/// Left-hand consonant keys, in steno order.
const LEFT_KEYS: [char; 7] = ['S', 'T', 'K', 'P', 'W', 'H', 'R'];
/// Vowel-cluster keys (including the `*` modifier), in steno order.
const VOWEL_KEYS: [char; 5] = ['A', 'O', '*', 'E', 'U'];
/// Right-hand consonant keys, in steno order.
const RIGHT_KEYS: [char; 10] = ['F', 'R', 'P', 'B', 'L', 'G', 'T', 'S', 'D', 'Z'];

const VOWEL_SHIFT: u32 = LEFT_KEYS.len() as u32;
const RIGHT_SHIFT: u32 = VOWEL_SHIFT + VOWEL_KEYS.len() as u32;

/// Total number of keys in the alphabet.
pub const KEY_COUNT: usize = LEFT_KEYS.len() + VOWEL_KEYS.len() + RIGHT_KEYS.len();

const ALL_KEYS_MASK: u32 = (1 << KEY_COUNT) - 1;
const VOWEL_ZONE_MASK: u32 = 0b1_1111 << VOWEL_SHIFT;
const RIGHT_ZONE_MASK: u32 = 0b11_1111_1111 << RIGHT_SHIFT;
const STAR_MASK: u32 = 1 << (VOWEL_SHIFT + 2);

/// Errors from parsing chord text or from chord algebra preconditions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChordError {
    /// The text does not follow the left / vowel / right key grammar.
    #[error("chord {text:?} is not in steno order")]
    Format { text: String },
    /// `subtract` was asked to remove keys the chord does not have.
    #[error("cannot remove '{removed}' from '{chord}': not all keys are present")]
    NotSubset { chord: Chord, removed: Chord },
    /// `union` was asked to merge chords that share keys.
    #[error("cannot merge '{chord}' and '{added}': keys overlap")]
    Overlap { chord: Chord, added: Chord },
}

/// One stenographic keystroke: a set of keys from the fixed alphabet.
///
/// Equality is set equality. There is deliberately no `Ord` impl: the only
/// ordering that means anything is the partial `left_of` relation.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Chord {
    keys: u32,
}

impl Chord {
    /// The chord with no keys at all.
    pub const BLANK: Chord = Chord { keys: 0 };
    /// Just the `*` modifier key.
    pub const STAR: Chord = Chord { keys: STAR_MASK };
    /// The four vowel keys `A O E U` (without the modifier).
    pub const VOWELS: Chord = Chord {
        keys: VOWEL_ZONE_MASK & !STAR_MASK,
    };

    /// Parse chord text such as `TKPW-PB`, `EUPB`, `S*` or `-BG`.
    pub fn parse(text: &str) -> Result<Chord, ChordError> {
        let mut chars = text.chars().peekable();
        let mut keys = take_zone(&mut chars, &LEFT_KEYS, 0);
        chars.next_if_eq(&'-');
        keys |= take_zone(&mut chars, &VOWEL_KEYS, VOWEL_SHIFT);
        keys |= take_zone(&mut chars, &RIGHT_KEYS, RIGHT_SHIFT);

        if chars.next().is_some() {
            return Err(ChordError::Format {
                text: text.to_string(),
            });
        }
        Ok(Chord { keys })
    }

    /// Build a chord from raw key bits (bit 0 is `S-`, bit 21 is `-Z`).
    /// Bits outside the alphabet are ignored.
    pub fn from_bits(bits: u32) -> Chord {
        Chord {
            keys: bits & ALL_KEYS_MASK,
        }
    }

    /// Raw key bits, in alphabet order from the least significant bit.
    pub fn bits(self) -> u32 {
        self.keys
    }

    /// Number of keys pressed.
    pub fn len(self) -> usize {
        self.keys.count_ones() as usize
    }

    /// True if no keys at all are pressed.
    pub fn is_blank(self) -> bool {
        self.keys == 0
    }

    /// True if the chord has no keys, or only the `*` modifier.
    pub fn is_empty(self) -> bool {
        self.keys & !STAR_MASK == 0
    }

    /// True if the chord has keys and all of them are in the vowel cluster
    /// (`A O * E U`).
    pub fn is_vowel_only(self) -> bool {
        !self.is_blank() && self.keys & !VOWEL_ZONE_MASK == 0
    }

    pub fn has_star(self) -> bool {
        self.keys & STAR_MASK != 0
    }

    /// Superset test: every key of `other` is also in `self`.
    pub fn contains(self, other: Chord) -> bool {
        self.keys & other.keys == other.keys
    }

    /// Keys present in both chords.
    pub fn intersection(self, other: Chord) -> Chord {
        Chord {
            keys: self.keys & other.keys,
        }
    }

    /// Remove `other`'s keys. All of them must be present.
    pub fn subtract(self, other: Chord) -> Result<Chord, ChordError> {
        if !self.contains(other) {
            return Err(ChordError::NotSubset {
                chord: self,
                removed: other,
            });
        }
        Ok(Chord {
            keys: self.keys & !other.keys,
        })
    }

    /// Merge two chords. They must not share any key.
    pub fn union(self, other: Chord) -> Result<Chord, ChordError> {
        if self.keys & other.keys != 0 {
            return Err(ChordError::Overlap {
                chord: self,
                added: other,
            });
        }
        Ok(Chord {
            keys: self.keys | other.keys,
        })
    }

    /// True if every key of `self` (ignoring `*`) lies strictly left of every
    /// key of `other` in steno order, and the two chords share no key.
    ///
    /// An empty chord (no keys, or only `*`) is left of any non-empty chord,
    /// and nothing is left of an empty chord.
    pub fn left_of(self, other: Chord) -> bool {
        if self.is_empty() {
            return !other.is_empty();
        }
        if other.is_empty() || self.keys & other.keys != 0 {
            return false;
        }
        let ours = self.keys & !STAR_MASK;
        let theirs = other.keys & !STAR_MASK;
        let rightmost = u32::BITS - 1 - ours.leading_zeros();
        let leftmost = theirs.trailing_zeros();
        rightmost < leftmost
    }

    /// Canonical text for this chord.
    pub fn render(self) -> String {
        let mut text = String::with_capacity(self.len() + 1);
        for (i, key) in LEFT_KEYS.iter().chain(&VOWEL_KEYS).enumerate() {
            if self.keys & (1 << i) != 0 {
                text.push(*key);
            }
        }
        if self.keys & RIGHT_ZONE_MASK != 0 && self.keys & VOWEL_ZONE_MASK == 0 {
            text.push('-');
        }
        for (i, key) in RIGHT_KEYS.iter().enumerate() {
            if self.keys & (1 << (RIGHT_SHIFT as usize + i)) != 0 {
                text.push(*key);
            }
        }
        text
    }
}

/// Consume the keys of one zone, in order, from the front of `chars`.
fn take_zone(chars: &mut Peekable<Chars<'_>>, zone: &[char], shift: u32) -> u32 {
    let mut bits = 0;
    for (i, key) in zone.iter().enumerate() {
        if chars.next_if_eq(key).is_some() {
            bits |= 1 << (shift as usize + i);
        }
    }
    bits
}

impl FromStr for Chord {
    type Err = ChordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Chord::parse(s)
    }
}

impl fmt::Display for Chord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl fmt::Debug for Chord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}'", self.render())
    }
}

/// Parse a brief: chord texts separated by `/`, e.g. `PHAPBLG/-BG`.
pub fn parse_brief(brief: &str) -> Result<Vec<Chord>, ChordError> {
    brief.split('/').map(Chord::parse).collect()
}

/// Render chords back into brief notation.
pub fn render_brief(chords: &[Chord]) -> String {
    chords
        .iter()
        .map(|c| c.render())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(text: &str) -> Chord {
        Chord::parse(text).unwrap()
    }

    #[test]
    fn test_render_canonical_forms() {
        assert_eq!(c("TKPW-PB").render(), "TKPW-PB");
        assert_eq!(c("-PB").render(), "-PB");
        assert_eq!(c("TKPWEUPB").render(), "TKPWEUPB");
        assert_eq!(c("TKPW-").render(), "TKPW");
        assert_eq!(c("TKPW*PB").render(), "TKPW*PB");
        assert_eq!(c("AOE").render(), "AOE");
        assert_eq!(c("-ER").render(), "ER");
        assert_eq!(c("").render(), "");
        assert_eq!(c("-").render(), "");
    }

    #[test]
    fn test_left_and_right_keys_are_distinct() {
        // Left T and right -T are different keys.
        assert_ne!(c("T"), c("-T"));
        assert_eq!(c("TS").render(), "T-S");
        assert_eq!(c("ST").render(), "ST");
        assert_eq!(c("R-R").len(), 2);
    }

    #[test]
    fn test_parse_rejects_out_of_order_keys() {
        // A right-zone key before a vowel-zone key.
        assert!(matches!(
            Chord::parse("-PBA"),
            Err(ChordError::Format { .. })
        ));
        assert!(Chord::parse("FA").is_err());
        // The dash may only open the vowel cluster.
        assert!(Chord::parse("A-F").is_err());
        // Keys outside the alphabet.
        assert!(Chord::parse("SX").is_err());
        assert!(Chord::parse("1S").is_err());
        // Repeated key.
        assert!(Chord::parse("SS-SS").is_err());
    }

    #[test]
    fn test_from_str() {
        let chord: Chord = "SAO*PL".parse().unwrap();
        assert_eq!(chord.to_string(), "SAO*PL");
        assert_eq!(format!("{chord:?}"), "'SAO*PL'");
    }

    #[test]
    fn test_contains() {
        assert!(c("SAO*PL").contains(c("S*")));
        assert!(c("SAO*PL").contains(c("*PL")));
        assert!(!c("SAO*PL").contains(c("-S")));
        assert!(c("SAO*PL").contains(Chord::BLANK));
    }

    #[test]
    fn test_subtract() {
        assert_eq!(c("SAO*PL").subtract(c("S")).unwrap().render(), "AO*PL");
        assert_eq!(c("WAO").subtract(c("AO")).unwrap().render(), "W");
        assert_eq!(
            c("WAO").subtract(c("-S")),
            Err(ChordError::NotSubset {
                chord: c("WAO"),
                removed: c("-S"),
            })
        );
    }

    #[test]
    fn test_union() {
        assert_eq!(c("SAOPL").union(Chord::STAR).unwrap().render(), "SAO*PL");
        assert!(matches!(
            c("SAOPL").union(c("S")),
            Err(ChordError::Overlap { .. })
        ));
    }

    #[test]
    fn test_left_of() {
        assert!(c("TW-").left_of(c("AR")));
        assert!(c("S*").left_of(c("T-")));
        assert!(c("PH").left_of(c("-S")));
        assert!(!c("AR").left_of(c("TW-")));
        // Shared keys are never ordered.
        assert!(!c("S*").left_of(c("*T")));
        // Vowels are left of an all-right chord only.
        assert!(Chord::VOWELS.left_of(c("-PB")));
        assert!(!Chord::VOWELS.left_of(c("TPH")));
    }

    #[test]
    fn test_left_of_empty_chords() {
        assert!(Chord::BLANK.left_of(c("PW")));
        assert!(Chord::STAR.left_of(c("-PB")));
        assert!(!Chord::BLANK.left_of(Chord::BLANK));
        assert!(!c("PW").left_of(Chord::BLANK));
        assert!(!c("PW").left_of(Chord::STAR));
    }

    #[test]
    fn test_is_empty() {
        assert!(c("").is_empty());
        assert!(c("*").is_empty());
        assert!(!c("S-").is_empty());
        assert!(c("").is_blank());
        assert!(!c("*").is_blank());
    }

    #[test]
    fn test_is_vowel_only() {
        assert!(c("AOEU").is_vowel_only());
        assert!(c("*").is_vowel_only());
        assert!(c("A*").is_vowel_only());
        assert!(!c("").is_vowel_only());
        assert!(!c("AR").is_vowel_only());
        assert!(!c("TPHU").is_vowel_only());
    }

    #[test]
    fn test_from_bits_masks_unknown_keys() {
        let chord = Chord::from_bits(u32::MAX);
        assert_eq!(chord.len(), KEY_COUNT);
        assert_eq!(chord.render(), "STKPWHRAO*EUFRPBLGTSDZ");
        assert_eq!(Chord::from_bits(chord.bits()), chord);
    }

    #[test]
    fn test_parse_brief() {
        let chords = parse_brief("PHAPBLG/-BG").unwrap();
        assert_eq!(chords, vec![c("PHAPBLG"), c("-BG")]);
        assert_eq!(render_brief(&chords), "PHAPBLG/-BG");
        assert!(parse_brief("PHAPBLG/BG-A").is_err());
    }
}
