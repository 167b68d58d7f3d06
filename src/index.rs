use std::fs::File;
use std::io::{BufRead, BufReader};
use std::iter::FromIterator;
use std::path::Path;

/// Number of directly addressable children per node: `A`-`Z`, apostrophe and hyphen.
const SLOTS: usize = 28;

fn slot(letter: char) -> Option<usize> {
    match letter {
        'A'..='Z' => Some(letter as usize - 'A' as usize),
        '\'' => Some(26),
        '-' => Some(27),
        _ => None,
    }
}

fn fold_accent(c: char) -> char {
    match c {
        'à' | 'â' | 'ä' | 'á' | 'ã' | 'å' => 'a',
        'ç' => 'c',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'î' | 'ï' | 'í' | 'ì' => 'i',
        'ô' | 'ö' | 'ó' | 'ò' | 'õ' => 'o',
        'ù' | 'û' | 'ü' | 'ú' => 'u',
        'ÿ' | 'ý' => 'y',
        _ => c,
    }
}

/// Case- and accent-folds a string into the alphabet the index is keyed on.
///
/// Nothing is dropped here; queries containing characters the index never stores simply fail
/// to match.
fn fold(s: &str) -> impl Iterator<Item = char> + '_ {
    s.chars()
        .flat_map(char::to_lowercase)
        .map(fold_accent)
        .flat_map(char::to_uppercase)
}

fn is_word_char(c: char) -> bool {
    c == '\'' || c == '-' || c.is_alphabetic()
}

#[derive(Debug, Default)]
struct Children {
    slots: [Option<Box<Node>>; SLOTS],
    // Letters outside A-Z (œ, æ, ñ...), rare enough for a linear scan.
    extra: Vec<Node>,
}

#[derive(Debug, Default)]
struct Node {
    letter: Option<char>,
    end_of_word: bool,
    children: Option<Box<Children>>,
}

impl Node {
    fn new(letter: char) -> Self {
        Node {
            letter: Some(letter),
            ..Node::default()
        }
    }

    fn child(&self, letter: char) -> Option<&Node> {
        let children = self.children.as_ref()?;
        match slot(letter) {
            Some(idx) => children.slots[idx].as_deref(),
            None => children.extra.iter().find(|n| n.letter == Some(letter)),
        }
    }

    fn child_or_insert(&mut self, letter: char) -> &mut Node {
        let children = self.children.get_or_insert_with(Default::default);
        match slot(letter) {
            Some(idx) => {
                &mut **children.slots[idx].get_or_insert_with(|| Box::new(Node::new(letter)))
            }
            None => {
                let idx = match children.extra.iter().position(|n| n.letter == Some(letter)) {
                    Some(idx) => idx,
                    None => {
                        children.extra.push(Node::new(letter));
                        children.extra.len() - 1
                    }
                };
                &mut children.extra[idx]
            }
        }
    }

    fn children(&self) -> impl Iterator<Item = &Node> + '_ {
        self.children.iter().flat_map(|children| {
            children
                .slots
                .iter()
                .filter_map(|slot| slot.as_deref())
                .chain(children.extra.iter())
        })
    }

    /// Collects every word at or below this node's children. `buf` holds the path so far and
    /// is restored before returning.
    fn collect_words(&self, buf: &mut String, words: &mut Vec<String>) {
        for child in self.children() {
            buf.extend(child.letter);
            if child.end_of_word {
                words.push(buf.clone());
            }
            child.collect_words(buf, words);
            buf.pop();
        }
    }

    fn collect_words_of_length(
        &self,
        depth: usize,
        length: usize,
        buf: &mut String,
        words: &mut Vec<String>,
    ) {
        for child in self.children() {
            buf.extend(child.letter);
            if depth + 1 == length {
                if child.end_of_word {
                    words.push(buf.clone());
                }
            } else {
                child.collect_words_of_length(depth + 1, length, buf, words);
            }
            buf.pop();
        }
    }
}

/// A prefix tree over a normalized vocabulary.
///
/// Words are stored upper-cased with French diacritics folded to their base letter, so `été`,
/// `ETE` and `Été` are the same entry. Only letters, apostrophes and hyphens survive insertion.
#[derive(Debug, Default)]
pub struct WordIndex {
    root: Node,
    len: usize,
}

impl WordIndex {
    pub fn new() -> Self {
        WordIndex::default()
    }

    /// Builds an index from a newline-delimited word list.
    ///
    /// A missing or unreadable file yields an empty index; check `len()` rather than expecting
    /// an error.
    pub fn from_file(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match File::open(path) {
            Ok(file) => {
                let index = WordIndex::from_reader(BufReader::new(file));
                tracing::info!(words = index.len(), path = %path.display(), "dictionary loaded");
                index
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "dictionary unavailable, using an empty index"
                );
                WordIndex::new()
            }
        }
    }

    /// Builds an index from a reader, one word per line. Lines that are not valid UTF-8 are
    /// decoded lossily. A read error stops loading and keeps what was read so far.
    pub fn from_reader(mut reader: impl BufRead) -> Self {
        let mut index = WordIndex::new();
        let mut line = Vec::new();

        loop {
            line.clear();
            match reader.read_until(b'\n', &mut line) {
                Ok(0) => break,
                Ok(_) => {
                    while line.last().map_or(false, |&b| b == b'\n' || b == b'\r') {
                        line.pop();
                    }
                    index.insert_word(&String::from_utf8_lossy(&line));
                }
                Err(e) => {
                    tracing::warn!(error = %e, words = index.len(), "dictionary read interrupted");
                    break;
                }
            }
        }

        index
    }

    /// Number of distinct words in the index.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Inserts a word if not already present.
    ///
    /// The empty string is itself a word and marks the root. A non-empty input with no letter,
    /// apostrophe or hyphen left after normalization is ignored.
    pub fn insert_word(&mut self, word: &str) {
        let mut node = &mut self.root;
        let mut kept = 0;

        for letter in fold(word.trim()).filter(|&c| is_word_char(c)) {
            node = node.child_or_insert(letter);
            kept += 1;
        }

        if kept == 0 && !word.is_empty() {
            return;
        }

        if !node.end_of_word {
            node.end_of_word = true;
            self.len += 1;
        }
    }

    pub fn contains_word(&self, word: &str) -> bool {
        self.find(word).map_or(false, |node| node.end_of_word)
    }

    /// Whether any stored word starts with `prefix`.
    ///
    /// The empty prefix only counts when the empty word itself has been inserted, mirroring
    /// `contains_word("")`.
    pub fn contains_prefix(&self, prefix: &str) -> bool {
        if prefix.is_empty() {
            return self.root.end_of_word;
        }
        self.find(prefix).is_some()
    }

    /// All stored words, sorted.
    pub fn words(&self) -> Vec<String> {
        self.words_with_prefix("")
    }

    /// Sorted list of the words starting with `prefix`, the prefix itself included when it is a
    /// word. The empty prefix lists everything.
    pub fn words_with_prefix(&self, prefix: &str) -> Vec<String> {
        let mut buf: String = fold(prefix).collect();
        let mut words = Vec::new();

        if let Some(node) = self.find(prefix) {
            if node.end_of_word {
                words.push(buf.clone());
            }
            node.collect_words(&mut buf, &mut words);
        }

        words.sort();
        words
    }

    /// Sorted list of the words of exactly `length` characters. Zero yields nothing.
    pub fn words_of_length(&self, length: usize) -> Vec<String> {
        let mut words = Vec::new();
        if length > 0 {
            let mut buf = String::with_capacity(length);
            self.root
                .collect_words_of_length(0, length, &mut buf, &mut words);
        }
        words.sort();
        words
    }

    fn find(&self, prefix: &str) -> Option<&Node> {
        fold(prefix).try_fold(&self.root, |node, letter| node.child(letter))
    }
}

impl<S: AsRef<str>> Extend<S> for WordIndex {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        for word in iter {
            self.insert_word(word.as_ref());
        }
    }
}

impl<S: AsRef<str>> FromIterator<S> for WordIndex {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut index = WordIndex::new();
        index.extend(iter);
        index
    }
}
