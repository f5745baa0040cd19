use lazy_static::lazy_static;
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use unicode_normalization::UnicodeNormalization;
use std::collections::HashSet;

lazy_static! {
    static ref RE: Regex = Regex::new(r"(?u)\p{L}[\p{L}\p{N}_']*").expect("valid regex");
    // dot leaders / underscores, quotes, "a)"-style and leading "1."-style list markers
    static ref LEADERS: Regex = Regex::new(r"[_.]{2,}").expect("valid regex");
    static ref QUOTES: Regex = Regex::new(r#"""#).expect("valid regex");
    static ref PAREN_MARKER: Regex = Regex::new(r"\w *\)").expect("valid regex");
    static ref NUMBER_MARKER: Regex = Regex::new(r"^\d *\.").expect("valid regex");
    static ref STEMMER: Stemmer = Stemmer::create(Algorithm::English);
    static ref STOPWORDS: HashSet<&'static str> = {
        let words: &[&str] = &[
            "a","about","above","after","again","against","all","am","an","and","any","are","aren't","as","at",
            "be","because","been","before","being","below","between","both","but","by",
            "can","can't","cannot","could","couldn't",
            "did","didn't","do","does","doesn't","doing","don't","down","during",
            "each","few","for","from","further",
            "had","hadn't","has","hasn't","have","haven't","having","he","he'd","he'll","he's","her","here","here's","hers","herself","him","himself","his","how","how's",
            "i","i'd","i'll","i'm","i've","if","in","into","is","isn't","it","it's","its","itself",
            "let's","me","more","most","mustn't","my","myself",
            "no","nor","not","of","off","on","once","only","or","other","ought","our","ours","ourselves","out","over","own",
            "same","she","she'd","she'll","she's","should","shouldn't","so","some","such",
            "than","that","that's","the","their","theirs","them","themselves","then","there","there's","these","they","they'd","they'll","they're","they've","this","those","through","to","too",
            "under","until","up","very",
            "was","wasn't","we","we'd","we'll","we're","we've","were","weren't","what","what's","when","when's","where","where's","which","while","who","who's","whom","why","why's","with","won't","would","wouldn't",
            "you","you'd","you'll","you're","you've","your","yours","yourself","yourselves"
        ];
        words.iter().copied().collect()
    };
}

/// Turns raw query text into the ordered term sequence the engine consumes.
pub trait Normalizer: Send + Sync {
    fn normalize(&self, raw: &str) -> Vec<String>;
}

/// English pipeline: marker cleanup, NFKC, lowercase, stop-word removal, stemming.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnglishNormalizer;

impl Normalizer for EnglishNormalizer {
    fn normalize(&self, raw: &str) -> Vec<String> {
        tokenize(raw).into_iter().map(|(term, _)| term).collect()
    }
}

fn is_stopword(token: &str) -> bool { STOPWORDS.contains(token) }

/// Strip listing markers, leader dots and quotes before tokenizing.
pub fn clean_line(line: &str) -> String {
    let line = LEADERS.replace_all(line, "");
    let line = QUOTES.replace_all(&line, "");
    let line = PAREN_MARKER.replace_all(&line, "");
    NUMBER_MARKER.replace(&line, "").into_owned()
}

/// Tokenize text into (term, position) using NFKC normalization, lowercase, stopword removal, and stemming.
pub fn tokenize(text: &str) -> Vec<(String, usize)> {
    let normalized = clean_line(text).nfkc().collect::<String>().to_lowercase();
    let mut tokens = Vec::new();
    for (pos, mat) in RE.find_iter(&normalized).enumerate() {
        let token = mat.as_str();
        if is_stopword(token) { continue; }
        let stem = STEMMER.stem(token).to_string();
        tokens.push((stem, pos));
    }
    tokens
}
