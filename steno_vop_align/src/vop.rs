// Short-vowel elision ("vowel omission") for multi-chord briefs.
//
// Steno theories commonly let a writer drop the vowel keys of a trailing
// chord whose syllable is a short, unstressed vowel: `PHAOEU/TPHUS` (minus)
// can be written `PHAOEU/TPH-S`. Deciding which chords qualify needs to know
// which sounds each chord writes, so the rule aligns the brief against the
// word's pronunciation and inspects the per-chord phoneme groups.
//
// For every chord after the first whose group passes
// `ipa::is_short_unstressed_syllable`:
// - the `A O E U` keys are removed;
// - `*` is removed too, unless one of the chord's tokens pairs `*` with
//   phonemes (there it changes the sound, as in `S*` for `z`).
// Chords left with no keys vanish from the brief.
//
// `elide_batch` runs the rule over many entries on the rayon thread pool. An
// entry that cannot be aligned is flagged for review and the batch carries
// on.

use crate::chord::{Chord, ChordError, parse_brief, render_brief};
use crate::ipa::is_short_unstressed_syllable;
use crate::knowledge::KnowledgeBase;
use crate::search::{AlignConfig, AlignError, Aligner};
use crate::tokens::PhonemeKeyToken;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VopError {
    #[error(transparent)]
    Chord(#[from] ChordError),
    #[error("cannot align {brief:?} with {pronunciation:?}: {source}")]
    Align {
        brief: String,
        pronunciation: String,
        source: AlignError,
    },
}

/// A dictionary entry to rewrite: a brief and the pronunciation of its word.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BriefEntry {
    pub brief: String,
    pub pronunciation: String,
}

/// What the batch driver did with one entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum BatchOutcome {
    Rewritten { brief: String },
    Unchanged,
    /// The entry could not be processed and needs a human look.
    Flagged { reason: String },
}

/// Drop the vowel keys of trailing chords that write short unstressed
/// syllables.
pub fn elide_short_vowels(
    brief: &str,
    pronunciation: &str,
    aligner: &Aligner<'_>,
) -> Result<String, VopError> {
    let chords = parse_brief(brief)?;
    let alignment = aligner
        .align(pronunciation, &chords)
        .map_err(|source| VopError::Align {
            brief: brief.to_string(),
            pronunciation: pronunciation.to_string(),
            source,
        })?;

    let mut shortened = Vec::with_capacity(chords.len());
    let groups = alignment.syllables().into_iter().zip(alignment.chord_groups());
    for (i, (&chord, (syllable, tokens))) in chords.iter().zip(groups).enumerate() {
        let chord = if i > 0 && is_short_unstressed_syllable(&syllable) {
            strip_vowels(chord, tokens)?
        } else {
            chord
        };
        if !chord.is_blank() {
            shortened.push(chord);
        }
    }

    Ok(render_brief(&shortened))
}

fn strip_vowels(chord: Chord, tokens: &[PhonemeKeyToken]) -> Result<Chord, ChordError> {
    let stripped = chord.subtract(chord.intersection(Chord::VOWELS))?;
    let star_sounds = tokens
        .iter()
        .any(|t| t.keys.has_star() && t.has_phonemes());
    if stripped.has_star() && !star_sounds {
        return stripped.subtract(Chord::STAR);
    }
    Ok(stripped)
}

/// Apply `elide_short_vowels` to every entry in parallel. Outcomes come back
/// in input order.
pub fn elide_batch(
    entries: &[BriefEntry],
    kb: &KnowledgeBase,
    config: &AlignConfig,
) -> Vec<BatchOutcome> {
    let aligner = Aligner::with_config(kb, *config);
    entries
        .par_iter()
        .map(
            |entry| match elide_short_vowels(&entry.brief, &entry.pronunciation, &aligner) {
                Ok(brief) if brief == entry.brief => BatchOutcome::Unchanged,
                Ok(brief) => BatchOutcome::Rewritten { brief },
                Err(err) => {
                    warn!(brief = %entry.brief, pronunciation = %entry.pronunciation, %err, "flagging entry");
                    BatchOutcome::Flagged {
                        reason: err.to_string(),
                    }
                }
            },
        )
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn elide(brief: &str, pronunciation: &str) -> Result<String, VopError> {
        let kb = KnowledgeBase::plover();
        elide_short_vowels(brief, pronunciation, &Aligner::new(&kb))
    }

    #[test]
    fn test_elide_trailing_schwa() {
        assert_eq!(elide("PHAOEU/TPHUS", "mˈaɪnəs").unwrap(), "PHAOEU/TPH-S");
    }

    #[test]
    fn test_elide_silent_star() {
        assert_eq!(elide("PHAOEU/TPH*US", "mˈaɪnəs").unwrap(), "PHAOEU/TPH-S");
    }

    #[test]
    fn test_elide_keeps_sounding_star() {
        // `S*` writes the `z`, so the star stays.
        assert_eq!(elide("PWA/S*EUS", "bˈæzɪs").unwrap(), "PWA/S*S");
    }

    #[test]
    fn test_elide_only_reduced_chords() {
        assert_eq!(
            elide("ABG/SEL/RAPBT", "ɐksˈɛləɹənt").unwrap(),
            "ABG/SEL/R-PBT"
        );
    }

    #[test]
    fn test_elide_drops_emptied_chords() {
        assert_eq!(elide("PHAOEU/TPH/U/-S", "mˈaɪnəs").unwrap(), "PHAOEU/TPH/-S");
        assert_eq!(elide("PHAOEU/TPHUS/A*", "mˈaɪnəs").unwrap(), "PHAOEU/TPH-S");
    }

    #[test]
    fn test_elide_leaves_first_chord_alone() {
        assert_eq!(elide("KAT", "kˈæt").unwrap(), "KAT");
        assert_eq!(elide("PWAR/TKPW-PB", "bˈɑːɡɪn").unwrap(), "PWAR/TKPW-PB");
    }

    #[test]
    fn test_elide_unalignable() {
        match elide("PHAOEU/U", "mˈaɪə") {
            Err(VopError::Align { source, brief, .. }) => {
                assert_eq!(source, AlignError::NotFound);
                assert_eq!(brief, "PHAOEU/U");
            }
            other => panic!("expected alignment failure, got {other:?}"),
        }
        assert!(matches!(
            elide("PHAOEU/-PBA", "mˈaɪnə"),
            Err(VopError::Chord(_))
        ));
    }

    #[test]
    fn test_elide_batch_preserves_order() {
        let entries: Vec<BriefEntry> = [
            ("PHAOEU/TPHUS", "mˈaɪnəs"),
            ("KAT", "kˈæt"),
            ("PWAR/TPHU", "bˈɑːnə"),
            ("PWA/S*EUS", "bˈæzɪs"),
        ]
        .into_iter()
        .map(|(brief, pronunciation)| BriefEntry {
            brief: brief.to_string(),
            pronunciation: pronunciation.to_string(),
        })
        .collect();

        let outcomes = elide_batch(&entries, &KnowledgeBase::plover(), &AlignConfig::default());
        assert_eq!(outcomes.len(), 4);
        assert_eq!(
            outcomes[0],
            BatchOutcome::Rewritten {
                brief: "PHAOEU/TPH-S".to_string()
            }
        );
        assert_eq!(outcomes[1], BatchOutcome::Unchanged);
        assert!(matches!(outcomes[2], BatchOutcome::Flagged { .. }));
        assert_eq!(
            outcomes[3],
            BatchOutcome::Rewritten {
                brief: "PWA/S*S".to_string()
            }
        );
    }

    #[test]
    fn test_batch_outcome_json() {
        let json = serde_json::to_string(&BatchOutcome::Rewritten {
            brief: "TPH-S".to_string(),
        })
        .unwrap();
        assert_eq!(json, r#"{"outcome":"rewritten","brief":"TPH-S"}"#);
        let entry: BriefEntry =
            serde_json::from_str(r#"{"brief": "KAT", "pronunciation": "kˈæt"}"#).unwrap();
        assert_eq!(entry.brief, "KAT");
    }
}
