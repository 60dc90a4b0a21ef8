use std::collections::{HashMap, HashSet};

use crate::model::mode::SessionKey;

/// Last-viewed question index per session key. Missing keys read as `0`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgressMap {
    entries: HashMap<SessionKey, usize>,
}

impl ProgressMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, key: &SessionKey) -> usize {
        self.entries.get(key).copied().unwrap_or(0)
    }

    pub fn set(&mut self, key: SessionKey, index: usize) {
        self.entries.insert(key, index);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SessionKey, usize)> {
        self.entries.iter().map(|(k, v)| (k, *v))
    }
}

impl FromIterator<(SessionKey, usize)> for ProgressMap {
    fn from_iter<T: IntoIterator<Item = (SessionKey, usize)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Category titles whose standard quiz has been finished.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompletionMap {
    titles: HashSet<String>,
}

impl CompletionMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_completed(&self, title: &str) -> bool {
        self.titles.contains(title)
    }

    pub fn mark(&mut self, title: impl Into<String>) {
        self.titles.insert(title.into());
    }

    pub fn clear(&mut self, title: &str) {
        self.titles.remove(title);
    }

    pub fn titles(&self) -> impl Iterator<Item = &str> {
        self.titles.iter().map(String::as_str)
    }
}

impl FromIterator<String> for CompletionMap {
    fn from_iter<T: IntoIterator<Item = String>>(iter: T) -> Self {
        Self {
            titles: iter.into_iter().collect(),
        }
    }
}
