// src/context.rs

use indexmap::IndexMap;
use std::fmt;

/// The mutable key/value property bag that carries CLI-supplied and
/// runtime-computed values through a whole invocation.
///
/// Keys are case-sensitive option names. Insertion order is preserved so that
/// help output, unknown-option warnings and failure attribution are
/// deterministic. Presence of a key is the test for "has a value"; a key is
/// never mapped to nothing.
#[derive(Debug, Clone, Default)]
pub struct Context {
    values: IndexMap<String, String>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a value, replacing any previous one for the same key.
    pub fn put(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    /// Copies every entry of `other` into this context, overwriting on clash.
    pub fn put_all(&mut self, other: &Self) {
        for (key, value) in other.iter() {
            self.put(key, value);
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Presence of the key is the test for "has a value".
    pub fn has_value_for_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Renders the context as `key=value` pairs in insertion order. Used to
/// attribute per-run failure logs to the run that produced them.
impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (key, value) in self.iter() {
            if !first {
                write!(f, ", ")?;
            }
            write!(f, "{}={}", key, value)?;
            first = false;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preserves_insertion_order() {
        let mut ctx = Context::new();
        ctx.put("zeta", "1");
        ctx.put("alpha", "2");
        ctx.put("mid", "3");
        let keys: Vec<_> = ctx.keys().collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn put_overwrites_in_place() {
        let mut ctx = Context::new();
        ctx.put("user", "alice");
        ctx.put("release", "1.0");
        ctx.put("user", "bob");
        assert_eq!(ctx.get("user"), Some("bob"));
        // Overwriting must not move the key to the back.
        let keys: Vec<_> = ctx.keys().collect();
        assert_eq!(keys, vec!["user", "release"]);
    }

    #[test]
    fn presence_is_the_has_value_test() {
        let mut ctx = Context::new();
        assert!(!ctx.has_value_for_key("user"));
        ctx.put("user", "");
        assert!(ctx.has_value_for_key("user"));
    }

    #[test]
    fn display_lists_pairs_in_order() {
        let mut ctx = Context::new();
        ctx.put("release", "1.0");
        ctx.put("user", "alice");
        assert_eq!(ctx.to_string(), "release=1.0, user=alice");
    }

    #[test]
    fn put_all_merges_and_overwrites() {
        let mut base = Context::new();
        base.put("user", "alice");
        let mut extra = Context::new();
        extra.put("user", "bob");
        extra.put("release", "2.0");
        base.put_all(&extra);
        assert_eq!(base.get("user"), Some("bob"));
        assert_eq!(base.get("release"), Some("2.0"));
    }
}
