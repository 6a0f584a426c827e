//! Original asset name → fingerprinted name.

use aho_corasick::{AhoCorasick, BuildError, MatchKind};
use std::collections::BTreeMap;

/// Mapping built by the fingerprint stage and consumed by cache busting.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AssetManifest {
    entries: BTreeMap<String, String>,
}

impl AssetManifest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, original: impl Into<String>, hashed: impl Into<String>) {
        self.entries.insert(original.into(), hashed.into());
    }

    #[cfg(test)]
    pub fn get(&self, original: &str) -> Option<&str> {
        self.entries.get(original).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Build a [`Rewriter`] for every entry.
    ///
    /// Hashed names are matched too and map to themselves, so text that was
    /// already rewritten passes through unchanged.
    pub fn rewriter(&self) -> Result<Rewriter<'_>, BuildError> {
        let mut patterns = Vec::with_capacity(self.entries.len() * 2);
        let mut replacements = Vec::with_capacity(self.entries.len() * 2);
        for (original, hashed) in self.iter() {
            patterns.extend([original, hashed]);
            replacements.extend([hashed, hashed]);
        }

        let matcher = AhoCorasick::builder()
            .match_kind(MatchKind::LeftmostLongest)
            .build(&patterns)?;
        Ok(Rewriter {
            matcher,
            replacements,
        })
    }
}

/// Replaces asset names in one leftmost-longest pass.
///
/// Replacement output is never rescanned, so a short name can't match
/// inside a hashed name produced for a longer one.
#[derive(Debug, Clone)]
pub struct Rewriter<'a> {
    matcher: AhoCorasick,
    replacements: Vec<&'a str>,
}

impl Rewriter<'_> {
    pub fn rewrite(&self, text: &str) -> String {
        self.matcher.replace_all(text, &self.replacements)
    }
}
