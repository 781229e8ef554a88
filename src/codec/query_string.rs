//! Ordered query-string model.
//!
//! Keeps parameters in their original order so rewriting one key does not
//! reshuffle the rest of a shared URL. Values are stored already encoded
//! (the per-field codecs decide how each value is escaped), keys are stored
//! decoded.

use std::fmt;

/// Ordered list of `key=value` pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryString {
    pairs: Vec<(String, String)>,
}

impl QueryString {
    /// Empty query string.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `?a=1&b=2` (leading `?` optional, `#fragment` ignored).
    ///
    /// Never fails: empty segments are skipped, a key without `=` gets an
    /// empty value, and for duplicate keys the first occurrence wins.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.split('#').next().unwrap_or_default();
        let raw = raw.strip_prefix('?').unwrap_or(raw);

        let mut out = Self::new();
        for segment in raw.split('&').filter(|s| !s.is_empty()) {
            let (key, value) = segment.split_once('=').unwrap_or((segment, ""));
            let key = decode_component(key);
            if key.is_empty() || out.contains(&key) {
                continue;
            }
            out.pairs.push((key, value.to_string()));
        }
        out
    }

    /// Raw (still encoded) value for `key`.
    pub fn get_raw(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Decoded value for `key`.
    pub fn get(&self, key: &str) -> Option<String> {
        self.get_raw(key).map(decode_component)
    }

    /// Whether `key` is present.
    pub fn contains(&self, key: &str) -> bool {
        self.pairs.iter().any(|(k, _)| k == key)
    }

    /// Set an already-encoded value, replacing in place or appending.
    pub fn set_raw(&mut self, key: &str, encoded: String) {
        match self.pairs.iter_mut().find(|(k, _)| k == key) {
            Some((_, v)) => *v = encoded,
            None => self.pairs.push((key.to_string(), encoded)),
        }
    }

    /// Remove `key`; returns whether it was present.
    pub fn remove(&mut self, key: &str) -> bool {
        let before = self.pairs.len();
        self.pairs.retain(|(k, _)| k != key);
        self.pairs.len() != before
    }

    /// True when there are no params.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Number of params.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Iterate `(key, encoded value)` pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Render as `?a=1&b=2`, or the empty string when there are no params.
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for QueryString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (key, value)) in self.pairs.iter().enumerate() {
            let sep = if i == 0 { '?' } else { '&' };
            write!(f, "{sep}{}={value}", urlencoding::encode(key))?;
        }
        Ok(())
    }
}

/// Percent-decode one component, treating `+` as a space.
///
/// Invalid UTF-8 sequences decode lossily rather than failing.
pub fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => String::from_utf8_lossy(&urlencoding::decode_binary(spaced.as_bytes())).into_owned(),
    }
}

/// Percent-encode one component.
pub fn encode_component(raw: &str) -> String {
    urlencoding::encode(raw).into_owned()
}

// ===== Tests =====
