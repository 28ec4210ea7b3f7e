// Phonetic tokenizer over an IPA symbol inventory.
//
// Pronunciations arrive as IPA strings from an external phonemizer (espeak
// style: `dˈɪkʃənəɹɪ`). Many phonemes are several code points long
// (affricates like `ts`, nasalized vowels like `ɑ̃`, symbols carrying
// combining diacritics), so segmentation is a greedy longest match: at each
// position the longest prefix that is a known symbol wins.
//
// A prefix counts as a symbol if, after dropping at most one leading stress
// mark and at most one trailing length or palatalization mark, what remains
// is exactly one entry of `VOWELS` or `CONSONANTS`. A bare stress mark and
// the word separator (a space) are also accepted as tokens of their own.
//
// Also hosts `is_short_unstressed_syllable`, the test the vowel-elision rule
// in `vop.rs` applies to each chord's phoneme group.

use thiserror::Error;

/// Primary and secondary stress marks.
pub const STRESS_MARKS: &[&str] = &["ˈ", "ˌ"];
/// Vowel length mark.
pub const LENGTH_MARK: char = 'ː';
/// Palatalization mark.
pub const PALATAL_MARK: char = 'ʲ';
/// Separator between words of a multi-word pronunciation.
pub const WORD_SEPARATOR: &str = " ";

#[rustfmt::skip]
pub const VOWELS: &[&str] = &[
    "i", "y", "ɨ", "ʉ", "ɯ", "u", "ɪ", "ʏ", "ʊ", "e",
    "ø", "ɘ", "ɵ", "ɤ", "o", "ø̞", "ə", "o̞", "ɛ", "œ",
    "ɜ", "ɞ", "ʌ", "ɔ", "æ", "ɐ", "a", "ɶ", "ä", "ɑ",
    "ɒ", "ɑ̃", "ɔ̃",
];

#[rustfmt::skip]
pub const CONSONANTS: &[&str] = &[
    "m̥", "m", "ɱ", "n̼", "n̥", "n", "ɳ̊", "ɳ", "ɲ̊", "ɲ",
    "ŋ̊", "ŋ", "ɴ", "p", "b", "p̪", "b̪", "t̼", "d̼", "t",
    "d", "ʈ", "ɖ", "c", "ɟ", "k", "ɡ", "q", "ɢ", "ʡ",
    "ʔ", "ts", "dz", "t̠ʃ", "d̠ʒ", "ʈʂ", "ɖʐ", "tɕ", "dʑ", "pɸ",
    "bβ", "p̪f", "b̪v", "t̪θ", "d̪ð", "tɹ̝̊", "dɹ̝", "t̠ɹ̠̊˔", "d̠ɹ̠˔", "cç",
    "ɟʝ", "kx", "ɡɣ", "qχ", "ɢʁ", "ʡʢ", "ʔh", "s", "z", "ʃ",
    "ʒ", "ʂ", "ʐ", "ɕ", "ʑ", "ɸ", "β", "f", "v", "θ̼",
    "ð̼", "θ", "ð", "θ̠", "ð̠", "ɹ̠̊˔", "ɹ̠˔", "ɻ˔", "ç", "ʝ",
    "x", "ɣ", "χ", "ʁ", "ħ", "ʕ", "h", "ʋ̥", "ʋ", "ɹ̥",
    "ɹ", "ɻ̊", "ɻ", "j̊", "j", "ɰ̊", "ɰ", "ⱱ̟", "ⱱ", "ɾ̼",
    "ɾ̥", "ɾ", "ɽ̊", "ɽ", "ɢ̆", "ʡ̆", "ʙ̥", "ʙ", "r̥", "r",
    "ɽ̊r̥", "ɽr", "ʀ̥", "ʀ", "ʜ", "ʢ", "tɬ", "dɮ", "ʈɭ̊˔", "cʎ̝̊",
    "kʟ̝̊", "ɡʟ̝", "ɬ", "ɮ", "ɭ̊˔", "ɭ˔", "ʎ̝̊", "ʎ̝", "ʟ̝̊", "ʟ̝",
    "l̥", "l", "ɭ̊", "ɭ", "ʎ̥", "ʎ", "ʟ̥", "ʟ", "ʟ̠", "ɺ",
    "ɭ̆", "ʎ̆", "ʟ̆", "w",
];

/// Reduced vowels: a syllable whose vowels all come from this set is a
/// candidate for elision.
pub const SCHWA_LIKE: &[&str] = &["ə", "ɚ", "ɛ", "ĕ", "e", "ɪ", "ĭ", "ɐ", "u"];

/// Longest candidate token in code points: the longest inventory symbol
/// (6) plus a stress mark and a length mark.
const MAX_TOKEN_CHARS: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenizeError {
    /// No prefix starting at `position` (a byte offset) is a known symbol.
    #[error("unknown phonetic symbol at byte {position} of {input:?}")]
    UnknownSymbol { position: usize, input: String },
}

/// True if `tok` is exactly one inventory symbol, optionally carrying one
/// leading stress mark and one trailing length or palatalization mark. A
/// bare stress mark also counts.
pub fn is_ipa_token(tok: &str) -> bool {
    if STRESS_MARKS.contains(&tok) {
        return true;
    }
    let tok = STRESS_MARKS
        .iter()
        .find_map(|mark| tok.strip_prefix(*mark))
        .unwrap_or(tok);
    let tok = tok
        .strip_suffix(LENGTH_MARK)
        .or_else(|| tok.strip_suffix(PALATAL_MARK))
        .unwrap_or(tok);
    VOWELS.contains(&tok) || CONSONANTS.contains(&tok)
}

/// Split a pronunciation into phoneme tokens by greedy longest match.
///
/// The tokens are contiguous slices of `input`, so concatenating them gives
/// back the input.
pub fn tokenize(input: &str) -> Result<Vec<&str>, TokenizeError> {
    let mut tokens = Vec::new();
    let mut rest = input;

    while !rest.is_empty() {
        let token = rest
            .char_indices()
            .take(MAX_TOKEN_CHARS)
            .map(|(i, c)| &rest[..i + c.len_utf8()])
            .filter(|cand| *cand == WORD_SEPARATOR || is_ipa_token(cand))
            .last()
            .ok_or_else(|| TokenizeError::UnknownSymbol {
                position: input.len() - rest.len(),
                input: input.to_string(),
            })?;
        tokens.push(token);
        rest = &rest[token.len()..];
    }

    Ok(tokens)
}

/// Number of tokens of `pronunciation` that are plain consonant symbols.
pub fn count_consonants(pronunciation: &str) -> Result<usize, TokenizeError> {
    Ok(tokenize(pronunciation)?
        .into_iter()
        .filter(|tok| CONSONANTS.contains(tok))
        .count())
}

/// True if any consonant symbol occurs anywhere in `phonemes`.
pub fn contains_consonant(phonemes: &str) -> bool {
    CONSONANTS.iter().any(|c| phonemes.contains(*c))
}

/// True if every vowel in `sound` is a reduced (schwa-like) vowel and the
/// sound carries no stress mark.
///
/// Vowels are checked code point by code point, so a diphthong like `ɔɪ`
/// fails on its `ɔ`.
pub fn is_short_unstressed_syllable(sound: &str) -> bool {
    let all_reduced = sound
        .chars()
        .filter(|&c| char_in(VOWELS, c))
        .all(|c| char_in(SCHWA_LIKE, c));
    all_reduced && !STRESS_MARKS.iter().any(|mark| sound.contains(*mark))
}

fn char_in(symbols: &[&str], c: char) -> bool {
    let mut buf = [0u8; 4];
    let s: &str = c.encode_utf8(&mut buf);
    symbols.contains(&s)
}
