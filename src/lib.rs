//! Dictionary attack on monoalphabetic substitution ciphers.
//!
//! A [`WordIndex`] holds the vocabulary; an [`Analysis`] tokenizes a cryptogram and climbs
//! towards the decoding [`Alphabet`] under which the most tokens read as dictionary words.
//!
//! ```
//! use monoalpha::{Alphabet, Analysis, WordIndex};
//!
//! let dictionary: WordIndex = vec!["CONSCIENCIEUSEMENT"].into_iter().collect();
//! let analysis = Analysis::new("SJBCSFMBSFMLCMOMBD", &dictionary);
//! let alphabet = analysis.guess_approximated_alphabet(&Alphabet::identity());
//! assert_eq!("CONSCIENCIEUSEMENT", alphabet.apply("SJBCSFMBSFMLCMOMBD"));
//! ```

pub mod alphabet;
pub mod analysis;
pub mod index;

pub use alphabet::{apply_substitution, update_alphabet, Alphabet, InvalidAlphabet};
pub use analysis::{Analysis, Outcome, Signature, Token};
pub use index::WordIndex;
