//! Video reference parsing.
//!
//! Users paste anything from full watch URLs to bare ids; everything must
//! normalize to one canonical identifier before it reaches the comment API.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

// Canonical YouTube video ids: exactly 11 URL-safe base64 characters.
static VIDEO_ID_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]{11}$").unwrap());

/// A validated 11-character video identifier.
///
/// Construction goes through [`VideoId::parse`]; an unresolvable reference
/// yields `None` rather than a truncated or guessed value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VideoId(String);

impl VideoId {
    /// Parse a raw reference in any of the supported shapes:
    /// - `https://www.youtube.com/watch?v=<id>&...` (id from the `v` parameter)
    /// - `https://youtu.be/<id>` (id from the path segment)
    /// - a bare 11-character id
    pub fn parse(reference: &str) -> Option<Self> {
        let reference = reference.trim();
        if reference.is_empty() {
            return None;
        }

        if VIDEO_ID_RE.is_match(reference) {
            return Some(Self(reference.to_owned()));
        }

        // Short-link form: the id is the first path segment after the host.
        if let Some(rest) = reference.split("youtu.be/").nth(1) {
            let candidate = rest
                .split(['?', '&', '/', '#'])
                .next()
                .unwrap_or_default();
            return Self::validated(candidate);
        }

        // Watch form: the id lives in the `v` query parameter, nowhere else.
        if reference.contains("youtube.com/watch") {
            if let Some((_, query)) = reference.split_once('?') {
                let query = query.split('#').next().unwrap_or(query);
                for pair in query.split('&') {
                    if let Some(value) = pair.strip_prefix("v=") {
                        return Self::validated(value);
                    }
                }
            }
        }

        None
    }

    fn validated(candidate: &str) -> Option<Self> {
        if VIDEO_ID_RE.is_match(candidate) {
            Some(Self(candidate.to_owned()))
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
