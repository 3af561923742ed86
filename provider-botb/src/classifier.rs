//! Identifier classification
//!
//! Decides, without any I/O, what kind of identifier the resolver was given.

use once_cell::sync::Lazy;
use regex::Regex;

/// Prefix marking a free-text search.
pub const SEARCH_PREFIX: &str = "botb ";

// Scheme, `www.` and host are case-tolerant; the path and id are not.
static ENTRY_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?i:(?:https?://)?(?:www\.)?battleofthebits\.org)/arena/Entry/([^/?#]+)")
        .expect("entry URL pattern is valid")
});

static PLAYER_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?i:(?:https?://)?(?:www\.)?battleofthebits\.org)/player/EntryPlay/([^/?#]+)")
        .expect("player URL pattern is valid")
});

/// What an identifier refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// A catalog entry id, from an entry page or player page URL
    DirectEntry(String),
    /// Query text after the search prefix, possibly empty
    Search(String),
    /// Not handled by this source
    Unrecognized,
}

/// Classify an identifier. First matching rule wins.
pub fn classify(identifier: &str) -> Classification {
    if let Some(query) = identifier.strip_prefix(SEARCH_PREFIX) {
        return Classification::Search(query.to_string());
    }

    for pattern in [&*ENTRY_URL, &*PLAYER_URL] {
        if let Some(captures) = pattern.captures(identifier) {
            return Classification::DirectEntry(captures[1].to_string());
        }
    }

    Classification::Unrecognized
}
