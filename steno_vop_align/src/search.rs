// Best-first alignment of a pronunciation against a chord sequence.
//
// The search walks the chords left to right, claiming key fragments from the
// current ("head") chord and the phonemes each fragment writes from the
// unconsumed pronunciation tail. A state records the tokens committed so far,
// which chord is the head, the head's unclaimed keys, and a byte offset into
// the pronunciation.
//
// Expanding a state pushes:
// - a boundary sentinel and advance to the next chord, if the head is blank;
// - the head as a silent filler token plus a sentinel, if the head is
//   non-empty and vowel-cluster only;
// - one successor per knowledge-base pair whose fragment is still in the head,
//   lies right of the last committed fragment (claims go left to right across
//   the keyboard), and whose phoneme occurs in the tail. Any tail
//   material before that phoneme's first occurrence is committed first, on
//   the head's vowel keys if the fragment sits entirely right of the vowel
//   cluster, else on no keys.
//
// The frontier is a `BinaryHeap` min-heap (via reversed ordering) keyed on
// `(metric, sequence)`. The metric is the
// consonant deficit: consonants in the pronunciation minus committed tokens
// that house at least one consonant. Ties pop in insertion order, and
// insertion follows knowledge-base declaration order, so earlier rules win.
// The filler branch is pushed before the knowledge-base branches and wins
// its ties too.
//
// With `memoize` on, a closed set keyed on (chord index, head keys, offset,
// last fragment) skips states already expanded. The last fragment is in the
// key because it gates future claims through `left_of`. `max_expansions`
// bounds the work per call.
//
// The first state popped with every chord and every phoneme consumed is the
// answer; its tokens go through `tokens::normalize` before being returned.

use crate::chord::{Chord, ChordError, parse_brief};
use crate::ipa::{TokenizeError, contains_consonant, count_consonants};
use crate::knowledge::KnowledgeBase;
use crate::tokens::{PhonemeKeyToken, group_phonemes, group_tokens, normalize};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use thiserror::Error;
use tracing::{debug, trace};

/// Search limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlignConfig {
    /// Expansions allowed per `align` call before giving up.
    pub max_expansions: usize,
    /// Skip states whose (chord, keys, offset, last fragment) was already
    /// expanded.
    pub memoize: bool,
}

impl Default for AlignConfig {
    fn default() -> Self {
        AlignConfig {
            max_expansions: 100_000,
            memoize: true,
        }
    }
}

impl AlignConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AlignError {
    /// The frontier emptied without reaching an accepting state.
    #[error("no alignment exists")]
    NotFound,
    #[error("gave up after {limit} expansions")]
    ExpansionLimit { limit: usize },
    #[error(transparent)]
    Tokenize(#[from] TokenizeError),
    #[error(transparent)]
    Chord(#[from] ChordError),
}

/// A successful, normalized alignment.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Alignment {
    tokens: Vec<PhonemeKeyToken>,
    expansions: usize,
}

impl Alignment {
    pub fn tokens(&self) -> &[PhonemeKeyToken] {
        &self.tokens
    }

    pub fn into_tokens(self) -> Vec<PhonemeKeyToken> {
        self.tokens
    }

    /// The phonemes each chord writes, one string per chord.
    pub fn syllables(&self) -> Vec<String> {
        group_phonemes(&self.tokens)
    }

    /// The tokens of each chord, boundary sentinels excluded.
    pub fn chord_groups(&self) -> Vec<&[PhonemeKeyToken]> {
        group_tokens(&self.tokens)
    }

    /// States expanded before this alignment was accepted.
    pub fn expansions(&self) -> usize {
        self.expansions
    }
}

#[derive(Debug, Clone)]
struct SearchState {
    tokens: Vec<PhonemeKeyToken>,
    chord_index: usize,
    /// Unclaimed keys of `chords[chord_index]` (blank past the last chord).
    head: Chord,
    /// Byte offset of the unconsumed pronunciation tail.
    offset: usize,
    /// Committed tokens whose phonemes contain a consonant.
    housed: usize,
}

type MemoKey = (usize, Chord, usize, Chord);

impl SearchState {
    fn start(chords: &[Chord]) -> Self {
        SearchState {
            tokens: Vec::new(),
            chord_index: 0,
            head: chords.first().copied().unwrap_or_default(),
            offset: 0,
            housed: 0,
        }
    }

    fn last_fragment(&self) -> Chord {
        self.tokens.last().map(|t| t.keys).unwrap_or_default()
    }

    fn memo_key(&self) -> MemoKey {
        (self.chord_index, self.head, self.offset, self.last_fragment())
    }

    fn commit(&mut self, token: PhonemeKeyToken) {
        if contains_consonant(&token.phonemes) {
            self.housed += 1;
        }
        self.tokens.push(token);
    }

    /// Successor that closes the head chord with `tokens` and moves on.
    fn advance(&self, chords: &[Chord], tokens: impl IntoIterator<Item = PhonemeKeyToken>) -> Self {
        let mut next = self.clone();
        for token in tokens {
            next.commit(token);
        }
        next.chord_index += 1;
        next.head = chords.get(next.chord_index).copied().unwrap_or_default();
        next
    }
}

/// The frontier ordering: consonants not yet housed by a committed token.
///
/// Committed tokens plus the tail always spell the whole pronunciation, so
/// the consonant total is fixed per call and only the housed count varies.
/// Goes negative when fragments split a pronunciation-level consonant.
struct ConsonantDeficit {
    consonants: i64,
}

impl ConsonantDeficit {
    fn new(pronunciation: &str) -> Result<Self, TokenizeError> {
        Ok(ConsonantDeficit {
            consonants: count_consonants(pronunciation)? as i64,
        })
    }

    fn score(&self, state: &SearchState) -> i64 {
        self.consonants - state.housed as i64
    }
}

/// Entry in the frontier (min-heap via reversed ordering).
struct FrontierEntry {
    metric: i64,
    sequence: u64,
    state: SearchState,
}

impl PartialEq for FrontierEntry {
    fn eq(&self, other: &Self) -> bool {
        self.metric == other.metric && self.sequence == other.sequence
    }
}

impl Eq for FrontierEntry {}

impl PartialOrd for FrontierEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FrontierEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse: smallest (metric, sequence) should be "greatest" for the max-heap.
        other
            .metric
            .cmp(&self.metric)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

struct Frontier<'d> {
    heap: BinaryHeap<FrontierEntry>,
    next_sequence: u64,
    deficit: &'d ConsonantDeficit,
}

impl<'d> Frontier<'d> {
    fn new(deficit: &'d ConsonantDeficit) -> Self {
        Frontier {
            heap: BinaryHeap::new(),
            next_sequence: 0,
            deficit,
        }
    }

    fn push(&mut self, state: SearchState) {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.heap.push(FrontierEntry {
            metric: self.deficit.score(&state),
            sequence,
            state,
        });
    }

    fn pop(&mut self) -> Option<FrontierEntry> {
        self.heap.pop()
    }
}

/// Aligns pronunciations against chords using one knowledge base.
///
/// Holds no per-call state; one `Aligner` can serve any number of threads.
#[derive(Debug, Clone, Copy)]
pub struct Aligner<'kb> {
    kb: &'kb KnowledgeBase,
    config: AlignConfig,
}

impl<'kb> Aligner<'kb> {
    pub fn new(kb: &'kb KnowledgeBase) -> Self {
        Self::with_config(kb, AlignConfig::default())
    }

    pub fn with_config(kb: &'kb KnowledgeBase, config: AlignConfig) -> Self {
        Aligner { kb, config }
    }

    pub fn knowledge_base(&self) -> &'kb KnowledgeBase {
        self.kb
    }

    pub fn config(&self) -> AlignConfig {
        self.config
    }

    /// Align `pronunciation` against a `/`-separated brief.
    pub fn align_brief(&self, pronunciation: &str, brief: &str) -> Result<Alignment, AlignError> {
        let chords = parse_brief(brief)?;
        self.align(pronunciation, &chords)
    }

    /// Attribute every phoneme of `pronunciation` to a fragment of `chords`.
    pub fn align(&self, pronunciation: &str, chords: &[Chord]) -> Result<Alignment, AlignError> {
        let deficit = ConsonantDeficit::new(pronunciation)?;
        let mut frontier = Frontier::new(&deficit);
        let mut closed: FxHashSet<MemoKey> = FxHashSet::default();
        let mut expansions = 0;

        frontier.push(SearchState::start(chords));

        while let Some(FrontierEntry { metric, state, .. }) = frontier.pop() {
            let rest = &pronunciation[state.offset..];

            if state.chord_index == chords.len() {
                if rest.is_empty() {
                    debug!(pronunciation, expansions, metric, "alignment found");
                    return Ok(Alignment {
                        tokens: normalize(state.tokens),
                        expansions,
                    });
                }
                // Chords exhausted with phonemes left over.
                continue;
            }

            if self.config.memoize && !closed.insert(state.memo_key()) {
                continue;
            }
            if expansions == self.config.max_expansions {
                debug!(pronunciation, limit = expansions, "expansion limit reached");
                return Err(AlignError::ExpansionLimit { limit: expansions });
            }
            expansions += 1;

            trace!(
                metric,
                chord = state.chord_index,
                head = %state.head,
                rest,
                "expanding"
            );
            self.expand(&state, chords, rest, &mut frontier)?;
        }

        debug!(pronunciation, expansions, "frontier exhausted");
        Err(AlignError::NotFound)
    }

    fn expand(
        &self,
        state: &SearchState,
        chords: &[Chord],
        rest: &str,
        frontier: &mut Frontier<'_>,
    ) -> Result<(), ChordError> {
        let head = state.head;

        if head.is_blank() {
            frontier.push(state.advance(chords, [PhonemeKeyToken::boundary()]));
        } else if head.is_vowel_only() {
            let filler = PhonemeKeyToken::new(head, "");
            frontier.push(state.advance(chords, [filler, PhonemeKeyToken::boundary()]));
        }

        let last = state.last_fragment();
        for entry in self.kb.entries() {
            let fragment = entry.fragment;
            if !head.contains(fragment) || !last.left_of(fragment) {
                continue;
            }
            let Some(at) = rest.find(entry.phoneme.as_str()) else {
                continue;
            };

            let mut next = state.clone();
            let mut remaining = head;
            let prefix = &rest[..at];
            if !prefix.is_empty() {
                let vowels = if Chord::VOWELS.left_of(fragment) {
                    head.intersection(Chord::VOWELS)
                } else {
                    Chord::BLANK
                };
                remaining = remaining.subtract(vowels)?;
                next.commit(PhonemeKeyToken::new(vowels, prefix));
            }
            next.head = remaining.subtract(fragment)?;
            next.offset += at + entry.phoneme.len();
            next.commit(PhonemeKeyToken::new(fragment, entry.phoneme.as_str()));
            frontier.push(next);
        }
        Ok(())
    }
}
