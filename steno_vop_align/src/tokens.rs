// Alignment tokens, the boundary-repair pass, and per-chord grouping.
//
// The search (`search.rs`) emits a flat stream of `PhonemeKeyToken`s: each
// pairs a fragment of chord keys with the phonemes it writes. Either side may
// be empty. A token with both sides empty is a boundary sentinel marking the
// end of a chord.
//
// The raw stream has one systematic artifact. When a chord's vowel keys are
// claimed before the next chord's consonant, stress/vowel material can
// surface as a separate phonemes-only token after the boundary instead of on
// the vowel token:
//
//   ('PH'=>'m') ('AOEU'=>'') (/) (''=>'ˈaɪ') ('TPH'=>'n') ...
//
// `normalize` moves such material back onto the earliest keys-only token:
//
//   ('PH'=>'m') ('AOEU'=>'ˈaɪ') (/) ('TPH'=>'n') ...
//
// After normalization, `group_phonemes` and `group_tokens` split the stream
// at the sentinels into one group per chord. No search is involved.

use crate::chord::Chord;
use std::collections::VecDeque;
use std::fmt;
use tracing::debug;

/// A chord-key fragment paired with the phonemes it writes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct PhonemeKeyToken {
    pub keys: Chord,
    pub phonemes: String,
}

impl PhonemeKeyToken {
    pub fn new(keys: Chord, phonemes: impl Into<String>) -> Self {
        PhonemeKeyToken {
            keys,
            phonemes: phonemes.into(),
        }
    }

    /// The chord-transition sentinel: no keys, no phonemes.
    pub fn boundary() -> Self {
        Self::default()
    }

    pub fn is_boundary(&self) -> bool {
        self.keys.is_blank() && self.phonemes.is_empty()
    }

    pub fn has_keys(&self) -> bool {
        !self.keys.is_blank()
    }

    pub fn has_phonemes(&self) -> bool {
        !self.phonemes.is_empty()
    }

    fn is_keys_only(&self) -> bool {
        self.has_keys() && !self.has_phonemes()
    }

    fn is_phonemes_only(&self) -> bool {
        self.has_phonemes() && !self.has_keys()
    }
}

impl fmt::Display for PhonemeKeyToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_boundary() {
            f.write_str("(/)")
        } else {
            write!(f, "('{}'=>'{}')", self.keys, self.phonemes)
        }
    }
}

/// Display adapter for a token stream: `[('PW'=>'b'), (/)]`.
pub struct TokenList<'a>(pub &'a [PhonemeKeyToken]);

impl fmt::Display for TokenList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, token) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{token}")?;
        }
        f.write_str("]")
    }
}

/// Propagate phonemes to the earliest fragment of each chord.
///
/// For every keys-only token, the first phonemes-only token found before
/// the next key-bearing token donates its phonemes and is removed. Full
/// tokens, boundaries and the final token pass through untouched.
pub fn normalize(tokens: Vec<PhonemeKeyToken>) -> Vec<PhonemeKeyToken> {
    debug!(tokens = %TokenList(&tokens), "normalizing token stream");

    let mut pending: VecDeque<PhonemeKeyToken> = tokens.into();
    let mut normalized = Vec::with_capacity(pending.len());

    while let Some(current) = pending.pop_front() {
        if pending.is_empty() || !current.is_keys_only() {
            normalized.push(current);
            continue;
        }

        let donor = pending
            .iter()
            .take_while(|t| !t.has_keys())
            .position(PhonemeKeyToken::is_phonemes_only);
        let phonemes = donor
            .and_then(|i| pending.remove(i))
            .map(|t| t.phonemes)
            .unwrap_or_default();

        normalized.push(PhonemeKeyToken::new(current.keys, phonemes));
    }

    debug!(tokens = %TokenList(&normalized), "normalized token stream");
    normalized
}

/// Split a token stream at its boundary sentinels.
///
/// Anything after the last sentinel does not belong to a finished chord and
/// is dropped. A normalized alignment always ends with a sentinel, so this
/// yields exactly one group per chord.
pub fn group_tokens(tokens: &[PhonemeKeyToken]) -> Vec<&[PhonemeKeyToken]> {
    let mut groups: Vec<&[PhonemeKeyToken]> =
        tokens.split(PhonemeKeyToken::is_boundary).collect();
    groups.pop();
    groups
}

/// The phonemes written by each chord, in chord order.
pub fn group_phonemes(tokens: &[PhonemeKeyToken]) -> Vec<String> {
    group_tokens(tokens)
        .into_iter()
        .map(|group| group.iter().map(|t| t.phonemes.as_str()).collect())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(keys: &str, phonemes: &str) -> PhonemeKeyToken {
        PhonemeKeyToken::new(Chord::parse(keys).unwrap(), phonemes)
    }

    fn boundary() -> PhonemeKeyToken {
        PhonemeKeyToken::boundary()
    }

    fn minus_tokens() -> Vec<PhonemeKeyToken> {
        vec![
            t("PH", "m"),
            t("AOEU", "ˈaɪ"),
            boundary(),
            t("TPH", "n"),
            t("U", "ə"),
            t("-S", "s"),
            boundary(),
        ]
    }

    #[test]
    fn test_token_display() {
        assert_eq!(t("-PB", "n").to_string(), "('-PB'=>'n')");
        assert_eq!(t("", "ɪ").to_string(), "(''=>'ɪ')");
        assert_eq!(boundary().to_string(), "(/)");
        assert_eq!(
            TokenList(&[t("PW", "b"), boundary()]).to_string(),
            "[('PW'=>'b'), (/)]"
        );
    }

    #[test]
    fn test_boundary_predicates() {
        assert!(boundary().is_boundary());
        assert!(!t("*", "").is_boundary());
        assert!(!t("", "ə").is_boundary());
        assert!(t("*", "").has_keys());
    }

    #[test]
    fn test_normalize_pulls_vowels_across_boundary() {
        let raw = vec![
            t("PH", "m"),
            t("AOEU", ""),
            boundary(),
            t("", "ˈaɪ"),
            t("TPH", "n"),
            t("U", "ə"),
            t("-S", "s"),
            boundary(),
        ];
        assert_eq!(normalize(raw), minus_tokens());
    }

    #[test]
    fn test_normalize_stops_at_next_key_bearing_token() {
        let raw = vec![
            t("AOEU", ""),
            boundary(),
            t("TPH", "n"),
            t("", "ə"),
            boundary(),
        ];
        let expected = vec![
            t("AOEU", ""),
            boundary(),
            t("TPH", "n"),
            t("", "ə"),
            boundary(),
        ];
        assert_eq!(normalize(raw), expected);
    }

    #[test]
    fn test_normalize_leaves_full_tokens_alone() {
        assert_eq!(normalize(minus_tokens()), minus_tokens());
    }

    #[test]
    fn test_normalize_keeps_final_token() {
        let raw = vec![t("PW", "b"), t("*", "")];
        assert_eq!(normalize(raw.clone()), raw);
        assert!(normalize(Vec::new()).is_empty());
    }

    #[test]
    fn test_group_phonemes() {
        assert_eq!(
            group_phonemes(&minus_tokens()),
            vec!["mˈaɪ".to_string(), "nəs".to_string()]
        );
    }

    #[test]
    fn test_group_phonemes_silent_chord() {
        let tokens = vec![t("PW", "b"), boundary(), t("AOEU", ""), boundary()];
        assert_eq!(
            group_phonemes(&tokens),
            vec!["b".to_string(), String::new()]
        );
    }

    #[test]
    fn test_group_tokens() {
        let tokens = minus_tokens();
        let groups = group_tokens(&tokens);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0], &[t("PH", "m"), t("AOEU", "ˈaɪ")]);
        assert_eq!(groups[1].len(), 3);
        assert_eq!(groups[1][2], t("-S", "s"));
    }

    #[test]
    fn test_group_tokens_drops_unterminated_tail() {
        let tokens = vec![t("PW", "b"), boundary(), t("", "ə")];
        let groups = group_tokens(&tokens);
        assert_eq!(groups.len(), 1);
        assert!(group_tokens(&[]).is_empty());
    }
}
