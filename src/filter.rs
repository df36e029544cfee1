use std::collections::BTreeSet;

/// Case-insensitive banned-word matcher.
///
/// Built once at startup and shared read-only by every session, so it needs
/// no locking. Words are kept lowercase and sorted for `/bannedwords`.
#[derive(Debug, Clone, Default)]
pub struct ContentFilter {
    words: BTreeSet<String>,
}

/// What the filter decided about a piece of text.
#[derive(Debug, PartialEq, Eq)]
pub enum FilterAction {
    Allow,
    /// Blocked; carries the banned word that matched.
    Block(String),
}

impl ContentFilter {
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words = words
            .into_iter()
            .map(|w| w.as_ref().trim().to_lowercase())
            // An empty word is a substring of everything.
            .filter(|w| !w.is_empty())
            .collect();
        Self { words }
    }

    pub fn check(&self, text: &str) -> FilterAction {
        let lowered = text.to_lowercase();
        match self.words.iter().find(|w| lowered.contains(w.as_str())) {
            Some(word) => FilterAction::Block(word.clone()),
            None => FilterAction::Allow,
        }
    }

    pub fn is_blacklisted(&self, text: &str) -> bool {
        matches!(self.check(text), FilterAction::Block(_))
    }

    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.words.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}
