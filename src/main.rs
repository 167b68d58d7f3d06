extern crate monoalpha;
extern crate stopwatch;

use anyhow::{Context, Result};
use monoalpha::{Alphabet, Analysis, WordIndex};
use std::{env, fs};
use tracing_subscriber::EnvFilter;

macro_rules! time {
    ($e:expr) => {{
        let mut time = stopwatch::Stopwatch::start_new();
        let result = $e;
        time.stop();
        (time.elapsed(), result)
    }};
}

const USAGE: &str =
    "usage: monoalpha <dictionary> <cryptogram-file> [starting-alphabet] [reference-alphabet]";

/// Characters of decoded text shown after the analysis.
const PREVIEW: usize = 200;

#[derive(Debug)]
struct Options {
    dictionary: String,
    cryptogram: String,
    start: Alphabet,
    /// The known decoding alphabet, if any, to report how close the analysis got.
    reference: Option<Alphabet>,
}

impl Options {
    fn from_args(mut args: impl Iterator<Item = String>) -> Result<Self> {
        let dictionary = args.next().context(USAGE)?;
        let cryptogram = args.next().context(USAGE)?;
        let start = match args.next() {
            Some(s) => parse_alphabet(&s, "starting")?,
            None => Alphabet::identity(),
        };
        let reference = match args.next() {
            Some(s) => Some(parse_alphabet(&s, "reference")?),
            None => None,
        };

        Ok(Options {
            dictionary,
            cryptogram,
            start,
            reference,
        })
    }
}

fn parse_alphabet(s: &str, role: &str) -> Result<Alphabet> {
    s.parse::<Alphabet>()
        .with_context(|| format!("invalid {} alphabet {:?}", role, s))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let options = Options::from_args(env::args().skip(1))?;

    // A missing dictionary is not an error: the analysis then has nothing to match against and
    // returns the starting alphabet.
    let (elapsed, dictionary) = time!(WordIndex::from_file(&options.dictionary));
    println!("Loading time: {:?}", elapsed);
    println!("Number of words: {}", dictionary.len());
    if dictionary.is_empty() {
        tracing::warn!(path = %options.dictionary, "dictionary is empty");
    }

    let cryptogram = fs::read_to_string(&options.cryptogram)
        .with_context(|| format!("unable to read cryptogram {}", options.cryptogram))?;

    let analysis = Analysis::new(&cryptogram, &dictionary);
    let (elapsed, outcome) = time!(analysis.analyse(&options.start));

    println!();
    println!("Starting     alphabet: {}", options.start);
    if let Some(reference) = &options.reference {
        println!("Decoding     alphabet: {}", reference);
    }
    println!("Approximated alphabet: {}", outcome.alphabet);
    if let Some(reference) = &options.reference {
        println!(
            "Differences          : {}",
            reference.differences(&outcome.alphabet)
        );
    }
    println!("Dictionary hits: {}/{}", outcome.score, outcome.tokens);
    println!("Elapsed: {:?}", elapsed);

    let decoded: String = outcome
        .alphabet
        .apply(&cryptogram)
        .chars()
        .take(PREVIEW)
        .collect();
    println!();
    println!("{}", decoded);

    Ok(())
}
