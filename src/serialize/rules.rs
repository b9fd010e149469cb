//! Path-keyed exclusion rules.
//!
//! A rule such as `-reviews.customer` removes the `customer` key from every
//! element of `reviews`. Rules are relative to the entity they are applied
//! on; [`ExclusionRules::prefixed`] rebases them onto a nested path.

use std::collections::BTreeSet;

use crate::db::schema::EntityKind;
use crate::db::{DbError, DbResult};

/// A set of excluded dotted paths.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionRules {
    paths: BTreeSet<String>,
}

impl ExclusionRules {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse rule strings of the form `-a.b.c`.
    pub fn parse<I, S>(rules: I) -> DbResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut parsed = Self::new();
        for rule in rules {
            parsed.paths.insert(parse_rule(rule.as_ref())?);
        }
        Ok(parsed)
    }

    /// Exclude `path` (given without the leading `-`).
    pub fn exclude(&mut self, path: impl Into<String>) {
        self.paths.insert(path.into());
    }

    /// Whether `path`, or any ancestor of it, is excluded.
    pub fn excludes(&self, path: &str) -> bool {
        if self.paths.contains(path) {
            return true;
        }
        path.match_indices('.')
            .any(|(idx, _)| self.paths.contains(&path[..idx]))
    }

    /// The same rules rooted at `prefix`.
    pub fn prefixed(&self, prefix: &str) -> Self {
        if prefix.is_empty() {
            return self.clone();
        }
        Self {
            paths: self
                .paths
                .iter()
                .map(|p| format!("{}.{}", prefix, p))
                .collect(),
        }
    }

    pub fn extend(&mut self, other: &ExclusionRules) {
        self.paths.extend(other.paths.iter().cloned());
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.paths.iter().map(String::as_str)
    }
}

/// The rules each entity declares for itself.
///
/// Nested reviews never repeat the parent they hang from, and a review
/// never re-expands the review lists of its customer or item.
pub fn default_rules(kind: EntityKind) -> ExclusionRules {
    let paths: &[&str] = match kind {
        EntityKind::Customer => &["reviews.customer"],
        EntityKind::Item => &["reviews.item"],
        EntityKind::Review => &["customer.reviews", "item.reviews"],
    };
    let mut rules = ExclusionRules::new();
    for path in paths {
        rules.exclude(*path);
    }
    rules
}

/// Join a parent path and a key.
pub(crate) fn join_path(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", parent, key)
    }
}

fn parse_rule(rule: &str) -> DbResult<String> {
    let rule = rule.trim();
    let Some(path) = rule.strip_prefix('-') else {
        return Err(DbError::Validation {
            message: format!("serialization rule '{}' must start with '-'", rule),
        });
    };

    let valid = !path.is_empty()
        && path.split('.').all(|segment| {
            !segment.is_empty() && segment.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        });

    if !valid {
        return Err(DbError::Validation {
            message: format!("serialization rule '{}' is not a dotted field path", rule),
        });
    }

    Ok(path.to_string())
}
