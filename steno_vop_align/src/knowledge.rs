// Phoneme-to-chord knowledge base.
//
// A steno theory says which key fragments can write which sounds: `n` is
// `TPH` on the left bank or `-PB` on the right, `s` is `S`, `-S`, `-F` or
// `-Z`, and so on. Theories are authored as JSON rules mapping a set of
// phoneme spellings to a set of fragments:
//
//   {"name": "plover", "rules": [{"phonemes": ["n", "n̩"], "fragments": ["TPH", "-PB"]}]}
//
// `KnowledgeBase::from_json()` flattens the rules into one ordered list of
// (phoneme, fragment) pairs: rule order, then phoneme order, then fragment
// order. That order is load-bearing. The search in `search.rs` tries pairs
// in this order and breaks metric ties by insertion, so earlier rules win
// ties against later ones.
//
// Two theories ship embedded via `include_str!`: `data/plover_theory.json`
// and `data/phoenix_theory.json`. A `KnowledgeBase` is immutable after
// loading and safe to share across threads.

use crate::chord::{Chord, ChordError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// One authored rule: any of `phonemes` may be written by any of `fragments`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TheoryRule {
    pub phonemes: Vec<String>,
    pub fragments: Vec<String>,
}

/// The top-level JSON structure of a theory file.
#[derive(Debug, Deserialize)]
struct TheoryFile {
    name: String,
    rules: Vec<TheoryRule>,
}

/// A single flattened (phoneme, fragment) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhonemeFragment {
    pub phoneme: String,
    pub fragment: Chord,
}

#[derive(Debug, Error)]
pub enum KnowledgeBaseError {
    #[error("malformed theory JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("bad fragment {fragment:?} for phonemes {phonemes:?}: {source}")]
    Fragment {
        fragment: String,
        phonemes: Vec<String>,
        source: ChordError,
    },
}

/// The embedded steno theories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theory {
    /// Plover's default theory.
    #[default]
    Plover,
    /// Phoenix theory, which also carries vowel and stress fragments.
    Phoenix,
}

impl Theory {
    pub fn name(self) -> &'static str {
        match self {
            Theory::Plover => "plover",
            Theory::Phoenix => "phoenix",
        }
    }
}

impl fmt::Display for Theory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Theory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "plover" => Ok(Theory::Plover),
            "phoenix" => Ok(Theory::Phoenix),
            other => Err(format!("unknown theory '{other}' (expected plover or phoenix)")),
        }
    }
}

/// A loaded theory: an ordered, read-only table of (phoneme, fragment) pairs.
#[derive(Debug, Clone)]
pub struct KnowledgeBase {
    name: String,
    entries: Vec<PhonemeFragment>,
}

impl KnowledgeBase {
    /// Parse a theory from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, KnowledgeBaseError> {
        let file: TheoryFile = serde_json::from_str(json)?;
        Self::from_rules(file.name, &file.rules)
    }

    /// Flatten authored rules, preserving declaration order.
    pub fn from_rules(
        name: impl Into<String>,
        rules: &[TheoryRule],
    ) -> Result<Self, KnowledgeBaseError> {
        let mut entries = Vec::new();
        for rule in rules {
            let fragments = rule
                .fragments
                .iter()
                .map(|text| {
                    Chord::parse(text).map_err(|source| KnowledgeBaseError::Fragment {
                        fragment: text.clone(),
                        phonemes: rule.phonemes.clone(),
                        source,
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;

            for phoneme in &rule.phonemes {
                entries.extend(fragments.iter().map(|&fragment| PhonemeFragment {
                    phoneme: phoneme.clone(),
                    fragment,
                }));
            }
        }

        Ok(KnowledgeBase {
            name: name.into(),
            entries,
        })
    }

    /// Load one of the embedded theories.
    ///
    /// Panics if the embedded JSON is malformed (should never happen in a
    /// released build).
    pub fn for_theory(theory: Theory) -> Self {
        let json = match theory {
            Theory::Plover => include_str!("../../data/plover_theory.json"),
            Theory::Phoenix => include_str!("../../data/phoenix_theory.json"),
        };
        Self::from_json(json).expect("embedded theory JSON is malformed")
    }

    pub fn plover() -> Self {
        Self::for_theory(Theory::Plover)
    }

    pub fn phoenix() -> Self {
        Self::for_theory(Theory::Phoenix)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// All pairs, in declaration order.
    pub fn entries(&self) -> &[PhonemeFragment] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Fragments that can write `phoneme`, in declaration order. Duplicates
    /// are kept.
    pub fn fragments_for<'a>(&'a self, phoneme: &'a str) -> impl Iterator<Item = Chord> + 'a {
        self.entries
            .iter()
            .filter(move |e| e.phoneme == phoneme)
            .map(|e| e.fragment)
    }
}
