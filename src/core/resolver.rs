use std::collections::HashSet;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::trace;

use crate::core::field_key::{NormalizedKey, normalize_key};
use crate::core::row::RawRow;

/// Configured header candidates per canonical key.
///
/// `field_aliases` take priority over `keys`; both are keyed by the
/// normalized canonical key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasSet {
    #[serde(default)]
    pub field_aliases: IndexMap<String, Vec<String>>,
    #[serde(default)]
    pub keys: IndexMap<String, Vec<String>>,
}

impl AliasSet {
    #[must_use]
    pub fn new(
        field_aliases: IndexMap<String, Vec<String>>,
        keys: IndexMap<String, Vec<String>>,
    ) -> Self {
        Self {
            field_aliases,
            keys,
        }
    }

    #[must_use]
    pub fn with_alias<I, S>(mut self, canonical: &str, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.field_aliases.insert(
            normalize_key(canonical).into_string(),
            aliases.into_iter().map(Into::into).collect(),
        );
        self
    }

    #[must_use]
    pub fn with_keys<I, S>(mut self, canonical: &str, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keys.insert(
            normalize_key(canonical).into_string(),
            keys.into_iter().map(Into::into).collect(),
        );
        self
    }

    /// Ordered header candidates for a canonical key.
    ///
    /// Explicit aliases come first, then `keys` entries. When neither map
    /// has an entry the literal key and its space-separated form are used.
    /// Blank entries are dropped and duplicates removed case-insensitively.
    #[must_use]
    pub fn candidates_for(&self, canonical: &str) -> Vec<String> {
        let normalized = normalize_key(canonical);
        let readable = canonical.replace('_', " ");
        let mut raw: Vec<&str> = Vec::new();
        if let Some(aliases) = self.field_aliases.get(normalized.as_str()) {
            raw.extend(aliases.iter().map(String::as_str));
        }
        if let Some(keys) = self.keys.get(normalized.as_str()) {
            raw.extend(keys.iter().map(String::as_str));
        }

        if raw.is_empty() {
            raw.push(canonical);
            raw.push(&readable);
        }

        let mut seen = HashSet::new();
        raw.into_iter()
            .map(str::trim)
            .filter(|candidate| !candidate.is_empty())
            .filter(|candidate| seen.insert(candidate.to_lowercase()))
            .map(str::to_owned)
            .collect()
    }
}

/// Confidence-tagged outcome of a field pick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldMatch<'a> {
    /// A header normalized to exactly one of the candidates.
    Exact { header: &'a str, value: &'a Value },
    /// A header and a candidate contained one another after normalization.
    Fallback { header: &'a str, value: &'a Value },
    NoMatch,
}

impl<'a> FieldMatch<'a> {
    #[must_use]
    pub fn value(&self) -> Option<&'a Value> {
        match *self {
            Self::Exact { value, .. } | Self::Fallback { value, .. } => Some(value),
            Self::NoMatch => None,
        }
    }

    #[must_use]
    pub fn header(&self) -> Option<&'a str> {
        match *self {
            Self::Exact { header, .. } | Self::Fallback { header, .. } => Some(header),
            Self::NoMatch => None,
        }
    }

    #[must_use]
    pub fn is_exact(&self) -> bool {
        matches!(self, Self::Exact { .. })
    }

    #[must_use]
    pub fn is_match(&self) -> bool {
        !matches!(self, Self::NoMatch)
    }
}

/// Two-phase header resolver.
///
/// Phase one looks for a normalized-equal header, trying candidates in
/// order. Phase two walks the row's headers in order and accepts the first
/// one whose normalized form contains, or is contained by, any normalized
/// candidate.
///
/// Headers and candidates that normalize to an empty key (`#`, `(unit)`)
/// never match in either phase. A plain "either contains the other" test
/// would let such a header swallow every lookup, since the empty string is
/// contained in any candidate; this resolver deliberately departs from that
/// rule.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldResolver {
    aliases: AliasSet,
    fallback_min_len: usize,
}

impl FieldResolver {
    #[must_use]
    pub fn new(aliases: AliasSet) -> Self {
        Self {
            aliases,
            fallback_min_len: 0,
        }
    }

    /// Skips substring matching for normalized candidates shorter than `min_len`.
    ///
    /// `0` keeps every candidate eligible.
    #[must_use]
    pub fn with_fallback_min_len(mut self, min_len: usize) -> Self {
        self.fallback_min_len = min_len;
        self
    }

    #[must_use]
    pub fn aliases(&self) -> &AliasSet {
        &self.aliases
    }

    #[must_use]
    pub fn candidates_for(&self, canonical: &str) -> Vec<String> {
        self.aliases.candidates_for(canonical)
    }

    pub fn pick<'a, S: AsRef<str>>(&self, row: &'a RawRow, candidates: &[S]) -> FieldMatch<'a> {
        let normalized: Vec<NormalizedKey> = candidates
            .iter()
            .map(|c| normalize_key(c.as_ref()))
            .collect();
        if normalized.iter().all(NormalizedKey::is_empty) {
            return FieldMatch::NoMatch;
        }

        let headers: Vec<(NormalizedKey, &'a str, &'a Value)> = row.normalized().collect();

        for candidate in normalized.iter().filter(|c| !c.is_empty()) {
            if let Some((_, header, value)) = headers.iter().find(|(key, _, _)| key == candidate) {
                trace!(header = *header, candidate = %candidate, "exact field match");
                return FieldMatch::Exact {
                    header: *header,
                    value: *value,
                };
            }
        }

        for (key, header, value) in headers.iter().filter(|(key, _, _)| !key.is_empty()) {
            let hit = normalized
                .iter()
                .filter(|c| !c.is_empty() && c.as_str().len() >= self.fallback_min_len)
                .any(|c| key.overlaps(c));
            if hit {
                trace!(header = *header, "fallback field match");
                return FieldMatch::Fallback {
                    header: *header,
                    value: *value,
                };
            }
        }

        FieldMatch::NoMatch
    }

    /// Picks a canonical field using the configured alias set.
    pub fn pick_canonical<'a>(&self, row: &'a RawRow, canonical: &str) -> FieldMatch<'a> {
        let candidates = self.candidates_for(canonical);
        self.pick(row, &candidates)
    }
}
