use fxhash::FxHashSet;
use std::fmt::{self, Debug, Display, Formatter};
use std::str::FromStr;

/// The fixed reference alphabet every substitution alphabet is positioned against.
pub const REFERENCE: &[u8; 26] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Why a string was rejected as a substitution alphabet.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum InvalidAlphabet {
    #[error("a substitution alphabet has 26 letters, got {0}")]
    Length(usize),
    #[error("{0:?} is not a letter from A to Z")]
    Symbol(char),
    #[error("{0:?} appears more than once")]
    Repeated(char),
}

/// Splits on runs of ASCII whitespace, vertical tab included.
pub(crate) fn split_words(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| matches!(c, ' ' | '\t' | '\n' | '\x0B' | '\x0C' | '\r'))
        .filter(|word| !word.is_empty())
}

fn reference_index(c: char) -> Option<usize> {
    if c.is_ascii_uppercase() {
        Some(c as usize - 'A' as usize)
    } else {
        None
    }
}

/// A monoalphabetic substitution key.
///
/// Position `i` holds the letter the `i`-th reference letter is substituted with. Values of this
/// type are always a permutation of `A`-`Z`; the only way to build one from outside the crate is
/// `Alphabet::identity` or parsing, which validates.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Alphabet([u8; 26]);

impl Alphabet {
    pub fn identity() -> Self {
        Alphabet(*REFERENCE)
    }

    /// The letter `letter` is substituted with, or `None` for anything outside `A`-`Z`.
    pub fn get(&self, letter: char) -> Option<char> {
        reference_index(letter).map(|idx| self.0[idx] as char)
    }

    /// The alphabet undoing this one: encoding keys become decoding keys and vice versa.
    pub fn inverse(&self) -> Alphabet {
        let mut inverse = [0; 26];
        for (idx, &u) in self.0.iter().enumerate() {
            inverse[(u - b'A') as usize] = REFERENCE[idx];
        }
        Alphabet(inverse)
    }

    /// Substitutes every reference letter of `text`. Whitespace runs collapse to single spaces
    /// and the result is trimmed; everything else passes through untouched.
    pub fn apply(&self, text: &str) -> String {
        split_words(text)
            .map(|word| self.apply_word(word))
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub(crate) fn apply_word(&self, word: &str) -> String {
        word.chars().map(|c| self.get(c).unwrap_or(c)).collect()
    }

    /// Proposes an alphabet under which `observed` reads as `candidate`.
    ///
    /// Both words are expected to have the same length. Each position claims the candidate
    /// letter for the observed letter's slot, swapping it out of whichever slot held it before.
    /// A letter claimed once is not moved again by a later position of the same call, and
    /// apostrophes, hyphens and letters outside `A`-`Z` are never claimed.
    pub fn update(&self, observed: &str, candidate: &str) -> Alphabet {
        if self.apply_word(observed) == candidate {
            return *self;
        }

        let mut working = self.0;
        let mut moved = FxHashSet::default();

        for (seen, wanted) in observed.chars().zip(candidate.chars()) {
            let (idx, wanted) = match (reference_index(seen), reference_index(wanted)) {
                (Some(idx), Some(_)) => (idx, wanted as u8),
                _ => continue,
            };
            if !moved.insert(wanted) {
                continue;
            }

            let displaced = working[idx];
            working[idx] = wanted;
            if let Some(other) = (0..26).find(|&j| j != idx && working[j] == wanted) {
                working[other] = displaced;
            }
        }

        Alphabet(working)
    }

    /// A 26-character report with `x` where `other` differs from `self` and a space where they
    /// agree.
    pub fn differences(&self, other: &Alphabet) -> String {
        self.0
            .iter()
            .zip(other.0.iter())
            .map(|(a, b)| if a == b { ' ' } else { 'x' })
            .collect()
    }
}

impl Default for Alphabet {
    fn default() -> Self {
        Alphabet::identity()
    }
}

impl FromStr for Alphabet {
    type Err = InvalidAlphabet;

    /// Parses a 26-letter permutation of `A`-`Z`, ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let len = s.chars().count();
        if len != 26 {
            return Err(InvalidAlphabet::Length(len));
        }

        let mut letters = [0; 26];
        let mut seen = 0u32;
        for (slot, c) in letters.iter_mut().zip(s.chars()) {
            let upper = c.to_ascii_uppercase();
            let idx = reference_index(upper).ok_or(InvalidAlphabet::Symbol(c))?;
            if seen & (1 << idx) != 0 {
                return Err(InvalidAlphabet::Repeated(upper));
            }
            seen |= 1 << idx;
            *slot = upper as u8;
        }

        Ok(Alphabet(letters))
    }
}

impl Display for Alphabet {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for &u in &self.0 {
            write!(f, "{}", u as char)?;
        }
        Ok(())
    }
}

impl Debug for Alphabet {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Alphabet({})", self)
    }
}

/// Applies `alphabet`, given as a 26-letter string, to `text`.
pub fn apply_substitution(text: &str, alphabet: &str) -> Result<String, InvalidAlphabet> {
    let alphabet: Alphabet = alphabet.parse()?;
    Ok(alphabet.apply(text))
}

/// Free-function form of `Alphabet::update`.
pub fn update_alphabet(current: &Alphabet, observed: &str, candidate: &str) -> Alphabet {
    current.update(observed, candidate)
}
