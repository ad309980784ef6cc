//! Comment text normalization ahead of sentiment scoring.

use once_cell::sync::Lazy;
use regex::Regex;

static URL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"http\S+|www\S+").unwrap());
static NON_ALPHA_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z\s]").unwrap());
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Reduce raw comment text to lowercase letters and single spaces.
///
/// Steps, in order: lowercase, drop URL tokens, drop everything outside
/// `[a-z]` and whitespace (digits, punctuation, emoji), collapse whitespace
/// runs, trim. The character-class reduction intentionally loses numeric and
/// punctuation sentiment cues ("10/10", "!!!"); scoring and keyword counts
/// operate on alphabetic tokens only.
pub fn clean_text(text: &str) -> String {
    let lowered = text.to_lowercase();
    let without_urls = URL_RE.replace_all(&lowered, "");
    let letters_only = NON_ALPHA_RE.replace_all(&without_urls, "");
    WHITESPACE_RE
        .replace_all(&letters_only, " ")
        .trim()
        .to_owned()
}
