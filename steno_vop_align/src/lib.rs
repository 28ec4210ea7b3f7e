// Phoneme-to-chord alignment for stenographic dictionaries.
//
// Given a word's IPA pronunciation and the chords of a steno brief, works out
// which key fragment of which chord writes each sound. Dictionary-authoring
// rules consume the per-chord groupings; the one shipped here is the
// short-vowel elision rule in `vop.rs`.
//
// Architecture:
// - `chord.rs`: `Chord` bitset over the steno key alphabet, brief parsing
// - `ipa.rs`: IPA inventory, greedy tokenizer, syllable predicates
// - `knowledge.rs`: `KnowledgeBase`, the flattened theory table, loaded from
//   JSON via `KnowledgeBase::from_json()`; the Plover and Phoenix tables in
//   `data/` are embedded with `include_str!`
// - `search.rs`: `Aligner`, the best-first search over chord claims
// - `tokens.rs`: `PhonemeKeyToken`, the boundary-repair pass, per-chord grouping
// - `vop.rs`: short-vowel elision and its parallel batch driver
//
// Everything is synchronous and deterministic. A `KnowledgeBase` is read-only
// after loading, so one table and one `Aligner` can serve many threads.

pub mod chord;
pub mod ipa;
pub mod knowledge;
pub mod search;
pub mod tokens;
pub mod vop;

// Re-export key types at crate root for convenience.
pub use chord::{Chord, ChordError, parse_brief, render_brief};
pub use ipa::{TokenizeError, is_short_unstressed_syllable, tokenize};
pub use knowledge::{KnowledgeBase, KnowledgeBaseError, Theory};
pub use search::{AlignConfig, AlignError, Aligner, Alignment};
pub use tokens::{PhonemeKeyToken, group_phonemes, group_tokens, normalize};
pub use vop::{BatchOutcome, BriefEntry, VopError, elide_batch, elide_short_vowels};
