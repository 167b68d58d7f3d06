use crate::alphabet::{split_words, Alphabet, InvalidAlphabet};
use crate::index::WordIndex;
use fxhash::{FxHashMap, FxHashSet};

/// Which earlier position each character repeats.
///
/// Position `i` holds the 1-based position of the first occurrence of the character found at
/// `i`: `LETTER` gives `1 2 3 3 2 6`. A cipher token and a dictionary word can only be the same
/// word under some substitution when their signatures are equal.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Signature(Vec<usize>);

impl Signature {
    pub fn of(word: &str) -> Self {
        let mut first_seen = FxHashMap::default();
        Signature(
            word.chars()
                .enumerate()
                .map(|(idx, c)| *first_seen.entry(c).or_insert(idx + 1))
                .collect(),
        )
    }

    fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether any character occurs more than once.
    pub fn has_repeats(&self) -> bool {
        self.0.iter().enumerate().any(|(idx, &first)| first != idx + 1)
    }
}

/// A word of the cryptogram, as written.
#[derive(Clone, Debug)]
pub struct Token {
    text: String,
    signature: Signature,
}

impl Token {
    fn new(text: &str) -> Self {
        Token {
            text: text.to_owned(),
            signature: Signature::of(text),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Length in characters.
    fn len(&self) -> usize {
        self.signature.len()
    }
}

/// Splits a cryptogram into the tokens worth analysing: at least three characters, first
/// occurrence only, longest first. Tokens of equal length keep their order of appearance.
pub fn tokenize(cryptogram: &str) -> Vec<Token> {
    let mut seen = FxHashSet::default();
    let mut tokens: Vec<_> = split_words(cryptogram)
        .filter(|word| word.chars().count() >= 3 && seen.insert(*word))
        .map(Token::new)
        .collect();
    tokens.sort_by(|a, b| b.len().cmp(&a.len()));
    tokens
}

/// Result of one analysis run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Outcome {
    /// Best decoding alphabet found.
    pub alphabet: Alphabet,
    /// How many tokens decode to a dictionary word under `alphabet`. Zero when no proposal
    /// improved on the starting alphabet.
    pub score: usize,
    /// Number of tokens the analysis worked with.
    pub tokens: usize,
}

/// Mutable state of a single analysis run.
struct SolverState {
    best: Alphabet,
    score: usize,
    resolved: FxHashSet<usize>,
}

/// Dictionary words of one length with their signatures, kept while tokens of that length are
/// examined.
#[derive(Default)]
struct Candidates {
    length: usize,
    words: Vec<(String, Signature)>,
}

impl Candidates {
    fn of_length(dictionary: &WordIndex, length: usize) -> Self {
        let words = dictionary
            .words_of_length(length)
            .into_iter()
            .map(|word| {
                let signature = Signature::of(&word);
                (word, signature)
            })
            .collect();
        Candidates { length, words }
    }

    /// First word, in alphabetical order, shaped like `signature`.
    fn first_matching(&self, signature: &Signature) -> Option<&str> {
        self.words
            .iter()
            .find(|(_, candidate)| candidate == signature)
            .map(|(word, _)| word.as_str())
    }
}

/// Dictionary attack on a monoalphabetic substitution cryptogram.
///
/// The analysis is a greedy hill climb: tokens are visited longest first, each one proposes an
/// alphabet from the first dictionary word with the same shape, and a proposal is kept only if
/// it decodes more tokens into dictionary words than the best alphabet so far. An adopted
/// alphabet is never rolled back.
pub struct Analysis<'dict> {
    dictionary: &'dict WordIndex,
    tokens: Vec<Token>,
}

impl<'dict> Analysis<'dict> {
    pub fn new(cryptogram: &str, dictionary: &'dict WordIndex) -> Self {
        Analysis {
            dictionary,
            tokens: tokenize(cryptogram),
        }
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Runs the analysis from `alphabet`, given as a 26-letter string.
    pub fn guess_from_str(&self, alphabet: &str) -> Result<Alphabet, InvalidAlphabet> {
        let start: Alphabet = alphabet.parse()?;
        Ok(self.guess_approximated_alphabet(&start))
    }

    /// Runs the analysis from `start` and returns the best decoding alphabet found, which is
    /// `start` itself when nothing improved on it.
    pub fn guess_approximated_alphabet(&self, start: &Alphabet) -> Alphabet {
        self.analyse(start).alphabet
    }

    pub fn analyse(&self, start: &Alphabet) -> Outcome {
        let mut state = SolverState {
            best: *start,
            score: 0,
            resolved: FxHashSet::default(),
        };
        let mut candidates = Candidates::default();

        for (idx, token) in self.tokens.iter().enumerate() {
            if state.resolved.contains(&idx) || !token.signature.has_repeats() {
                continue;
            }
            if self.is_word(&state.best.apply_word(&token.text)) {
                tracing::trace!(token = %token.text, "already decoded");
                continue;
            }

            // Tokens come longest first, so a length change always means a shorter one.
            if candidates.length != token.len() {
                candidates = Candidates::of_length(self.dictionary, token.len());
            }

            let matching = match candidates.first_matching(&token.signature) {
                Some(word) => word,
                None => {
                    tracing::trace!(token = %token.text, "no candidate with the same shape");
                    continue;
                }
            };

            let proposal = state.best.update(&token.text.to_uppercase(), matching);
            if proposal == state.best {
                continue;
            }

            let decoded = self.decoded_tokens(&proposal);
            if decoded.len() > state.score {
                tracing::debug!(
                    token = %token.text,
                    candidate = %matching,
                    score = decoded.len(),
                    alphabet = %proposal,
                    "alphabet adopted"
                );
                state.best = proposal;
                state.score = decoded.len();
                state.resolved.extend(decoded);
            }
        }

        Outcome {
            alphabet: state.best,
            score: state.score,
            tokens: self.tokens.len(),
        }
    }

    /// Positions of the tokens `alphabet` turns into dictionary words.
    fn decoded_tokens(&self, alphabet: &Alphabet) -> Vec<usize> {
        self.tokens
            .iter()
            .enumerate()
            .filter(|(_, token)| self.is_word(&alphabet.apply_word(&token.text)))
            .map(|(idx, _)| idx)
            .collect()
    }

    fn is_word(&self, word: &str) -> bool {
        self.dictionary.contains_word(word)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(tokens: &[Token]) -> Vec<&str> {
        tokens.iter().map(Token::text).collect()
    }

    #[test]
    fn signature_marks_first_occurrence() {
        assert_eq!(Signature(vec![1, 2, 3, 3, 2, 6]), Signature::of("LETTER"));
        assert_eq!(Signature::of("LETTER"), Signature::of("BANNAS"));
        assert_ne!(Signature::of("LETTER"), Signature::of("BATTLE"));
        assert_ne!(Signature::of("ABC"), Signature::of("ABCD"));
    }

    #[test]
    fn signature_repeats() {
        assert!(Signature::of("LETTER").has_repeats());
        assert!(Signature::of("AXA").has_repeats());
        assert!(!Signature::of("WORD").has_repeats());
        assert!(!Signature::of("").has_repeats());
    }

    #[test]
    fn tokenize_filters_and_orders() {
        let tokens = tokenize("  UN  mot DE TROP,\tun MOT trop  longtemps\nMOT  ");
        assert_eq!(
            vec!["longtemps", "TROP,", "trop", "mot", "MOT"],
            texts(&tokens)
        );
    }

    #[test]
    fn tokenize_counts_characters() {
        let tokens = tokenize("été ÉTÉ ou");
        assert_eq!(vec!["été", "ÉTÉ"], texts(&tokens));
    }

    #[test]
    fn single_word_cryptogram() {
        let dictionary: WordIndex = vec!["CONSCIENCIEUSEMENT"].into_iter().collect();
        let analysis = Analysis::new("SJBCSFMBSFMLCMOMBD", &dictionary);
        let outcome = analysis.analyse(&Alphabet::identity());
        assert_eq!(
            "ANSTJIGHFOKUEBMPQRCDLVWXYZ".parse::<Alphabet>().unwrap(),
            outcome.alphabet
        );
        assert_eq!(1, outcome.score);
        assert_eq!(1, outcome.tokens);
    }

    #[test]
    fn first_matching_candidate_wins() {
        // BALLE and COLLE share a shape; BALLE sorts first and is the only one tried.
        let dictionary: WordIndex = vec!["COLLE", "BALLE"].into_iter().collect();
        let analysis = Analysis::new("QRSSX", &dictionary);
        let alphabet = analysis.guess_approximated_alphabet(&Alphabet::identity());
        assert_eq!("BALLE", alphabet.apply("QRSSX"));
    }

    #[test]
    fn rejects_proposals_that_do_not_improve() {
        // QZZQ is read as ABBA first. Reading QWQ as ERE would lose ABBA, so the score would
        // not go up and that proposal is dropped.
        let dictionary: WordIndex = vec!["ABBA", "ERE"].into_iter().collect();
        let analysis = Analysis::new("QZZQ QWQ", &dictionary);
        let outcome = analysis.analyse(&Alphabet::identity());
        assert_eq!(1, outcome.score);
        assert_eq!(2, outcome.tokens);
        assert_eq!("ABBA AWA", outcome.alphabet.apply("QZZQ QWQ"));
    }

    #[test]
    fn tokenize_splits_on_vertical_tab() {
        let tokens = tokenize("MOT\x0BDEUX\u{a0}MOTS");
        assert_eq!(vec!["DEUX\u{a0}MOTS", "MOT"], texts(&tokens));
    }

    #[test]
    fn skips_tokens_that_already_read_as_words() {
        // ACCA is a word as it stands. Trying it against ABBA would swap B and C for a score
        // of one.
        let dictionary: WordIndex = vec!["ABBA", "ACCA"].into_iter().collect();
        let analysis = Analysis::new("ACCA", &dictionary);
        let outcome = analysis.analyse(&Alphabet::identity());
        assert_eq!(Alphabet::identity(), outcome.alphabet);
        assert_eq!(0, outcome.score);
    }

    #[test]
    fn resolved_tokens_are_not_revisited() {
        // KZZKW -> ABBAC resolves RSR as well. GHHG -> RSSR then wins a better score but turns
        // RSR into GHG. RSR stays resolved, so it is not retried against PQP, which would have
        // scored four.
        let dictionary: WordIndex = vec!["ABBAC", "RSSR", "RSR", "PQP", "RSI"]
            .into_iter()
            .collect();
        let analysis = Analysis::new("KZZKW GHHG RSR GHI", &dictionary);
        let outcome = analysis.analyse(&Alphabet::identity());
        assert_eq!(3, outcome.score);
        assert_eq!("KZWDEFRSIJALMNOPQGHTUVCXYB", outcome.alphabet.to_string());
        assert_eq!(
            "ABBAC RSSR GHG RSI",
            outcome.alphabet.apply("KZZKW GHHG RSR GHI")
        );
    }

    #[test]
    fn tokens_without_repeats_leave_start_alphabet() {
        let dictionary: WordIndex = vec!["ABC", "DEF", "WORD"].into_iter().collect();
        let analysis = Analysis::new("XYZ QRS TUVW", &dictionary);
        let start: Alphabet = "QWERTYUIOPASDFGHJKLZXCVBNM".parse().unwrap();
        assert_eq!(start, analysis.guess_approximated_alphabet(&start));
        assert_eq!(0, analysis.analyse(&start).score);
    }

    #[test]
    fn empty_dictionary_leaves_start_alphabet() {
        let dictionary = WordIndex::new();
        let analysis = Analysis::new("SJBCSFMBSFMLCMOMBD XAAX", &dictionary);
        let start = Alphabet::identity();
        assert_eq!(start, analysis.guess_approximated_alphabet(&start));
    }

    #[test]
    fn invalid_start_alphabet() {
        let dictionary: WordIndex = vec!["CONSCIENCIEUSEMENT"].into_iter().collect();
        let analysis = Analysis::new("SJBCSFMBSFMLCMOMBD", &dictionary);
        assert_eq!(
            Err(InvalidAlphabet::Length(10)),
            analysis.guess_from_str("AZERTYUIOP")
        );
        assert_eq!(
            Err(InvalidAlphabet::Symbol('^')),
            analysis.guess_from_str("ABCDEFGHIJKLMNOPQRST^^158Z")
        );
        // Nothing is carried over from the failed calls.
        let expected: Alphabet = "ANSTJIGHFOKUEBMPQRCDLVWXYZ".parse().unwrap();
        assert_eq!(
            Ok(expected),
            analysis.guess_from_str("abcdefghijklmnopqrstuvwxyz")
        );
    }
}
