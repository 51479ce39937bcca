//! MQTT-style path patterns.
//!
//! - `notif/badge` matches only itself.
//! - `notif/+` matches exactly one level below `notif`.
//! - `notif/#` matches `notif` and everything below it.
//! - `#` matches every path.

/// Whether a concrete `path` is covered by `pattern`.
pub fn matches(pattern: &str, path: &str) -> bool {
    let mut pat = pattern.split('/');
    let mut segs = path.split('/');

    loop {
        match (pat.next(), segs.next()) {
            (Some("#"), _) => return true,
            (Some("+"), Some(_)) => continue,
            (Some(p), Some(s)) if p == s => continue,
            (None, None) => return true,
            _ => return false,
        }
    }
}

/// Patterns paired with values, matched by linear scan.
///
/// Subscriber counts in a page session are small, so a flat list keeps
/// registration order stable, which handlers rely on.
pub struct TopicTable<T> {
    entries: Vec<(String, T)>,
}

impl<T: Clone> TopicTable<T> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn insert(&mut self, pattern: &str, value: T) {
        self.entries.push((pattern.to_string(), value));
    }

    /// Values whose pattern covers `path`, in insertion order.
    pub fn lookup(&self, path: &str) -> Vec<T> {
        self.entries
            .iter()
            .filter(|(pattern, _)| matches(pattern, path))
            .map(|(_, v)| v.clone())
            .collect()
    }

    /// Remove entries for which `predicate` holds. Returns true if any were removed.
    pub fn retain_not<F: Fn(&T) -> bool>(&mut self, predicate: F) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(_, v)| !predicate(v));
        self.entries.len() < before
    }

    pub fn has_pattern(&self, pattern: &str) -> bool {
        self.entries.iter().any(|(p, _)| p == pattern)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T: Clone> Default for TopicTable<T> {
    fn default() -> Self {
        Self::new()
    }
}
