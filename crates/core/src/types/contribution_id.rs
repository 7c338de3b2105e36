//! Human-readable contribution identifiers.
//!
//! A contribution is keyed by a slug of the submitter's name. Slugs are not
//! unique on their own; [`resolve_unique_id`] probes the store for the first
//! free `base`, `base-2`, `base-3`, ... candidate.

use core::fmt;
use std::future::Future;

use serde::{Deserialize, Serialize};

/// Errors that can occur when deriving a [`ContributionId`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ContributionIdError {
    /// The name is empty or only whitespace.
    #[error("contribution id cannot be empty")]
    Empty,
}

/// Document key of a contribution.
///
/// ## Examples
///
/// ```
/// use patron_core::ContributionId;
///
/// let id = ContributionId::from_name("  Bo  Jones ").unwrap();
/// assert_eq!(id.as_str(), "Bo_Jones");
/// assert_eq!(id.with_suffix(2).as_str(), "Bo_Jones-2");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct ContributionId(String);

impl ContributionId {
    /// Derive the base identifier from a display name.
    ///
    /// Leading and trailing whitespace is dropped and every internal run of
    /// whitespace becomes a single `_`. Whitespace here is the set browsers
    /// use for `\s` (see [`is_name_separator`]).
    ///
    /// # Errors
    ///
    /// Returns [`ContributionIdError::Empty`] if nothing is left after trimming.
    pub fn from_name(name: &str) -> Result<Self, ContributionIdError> {
        let slug = name
            .split(is_name_separator)
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join("_");
        if slug.is_empty() {
            return Err(ContributionIdError::Empty);
        }
        Ok(Self(slug))
    }

    /// Wrap an identifier that already exists in the store.
    #[must_use]
    pub const fn from_existing(id: String) -> Self {
        Self(id)
    }

    /// The `base-N` candidate for this base identifier.
    #[must_use]
    pub fn with_suffix(&self, counter: u64) -> Self {
        Self(format!("{}-{counter}", self.0))
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the identifier and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ContributionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ContributionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Whether `c` separates words in a display name.
///
/// Unicode `White_Space` plus the byte-order mark U+FEFF, minus NEL U+0085.
/// This matches the `\s` class of ECMAScript regular expressions, which is
/// what browser-side name handling uses.
#[must_use]
pub fn is_name_separator(c: char) -> bool {
    match c {
        '\u{feff}' => true,
        '\u{85}' => false,
        _ => c.is_whitespace(),
    }
}

/// Find the first identifier derived from `base` for which `exists` is false.
///
/// Candidates are probed strictly in order: `base`, `base-2`, `base-3`, ...
/// The scan is unbounded and stops at the first free slot or the first error
/// from `exists`.
///
/// Probing and the later write are separate store calls, so two concurrent
/// callers with the same base can both be handed the same identifier. Callers
/// that need a hard guarantee must pair this with a conditional write.
///
/// # Errors
///
/// Propagates the first error returned by `exists`.
pub async fn resolve_unique_id<F, Fut, E>(
    base: &ContributionId,
    mut exists: F,
) -> Result<ContributionId, E>
where
    F: FnMut(ContributionId) -> Fut,
    Fut: Future<Output = Result<bool, E>>,
{
    let mut candidate = base.clone();
    let mut counter: u64 = 2;

    while exists(candidate.clone()).await? {
        candidate = base.with_suffix(counter);
        counter += 1;
    }

    Ok(candidate)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::cell::RefCell;
    use std::collections::HashSet;
    use std::convert::Infallible;

    use super::*;

    fn taken(ids: &[&str]) -> HashSet<String> {
        ids.iter().map(|s| (*s).to_owned()).collect()
    }

    #[test]
    fn test_from_name_collapses_whitespace() {
        assert_eq!(
            ContributionId::from_name("  Bo  Jones ").unwrap().as_str(),
            "Bo_Jones"
        );
        assert_eq!(
            ContributionId::from_name("Ann\tMarie\n Lee").unwrap().as_str(),
            "Ann_Marie_Lee"
        );
        assert_eq!(ContributionId::from_name("Alice").unwrap().as_str(), "Alice");
    }

    #[test]
    fn test_from_name_splits_on_bom_but_not_nel() {
        assert_eq!(
            ContributionId::from_name("\u{feff}Bo\u{feff}Jones").unwrap().as_str(),
            "Bo_Jones"
        );
        assert_eq!(
            ContributionId::from_name("Bo\u{a0}\u{3000}Jones").unwrap().as_str(),
            "Bo_Jones"
        );
        assert_eq!(
            ContributionId::from_name("Bo\u{85}Jones").unwrap().as_str(),
            "Bo\u{85}Jones"
        );
        assert_eq!(
            ContributionId::from_name("\u{feff} "),
            Err(ContributionIdError::Empty)
        );
    }

    #[test]
    fn test_from_name_rejects_blank() {
        assert_eq!(ContributionId::from_name(""), Err(ContributionIdError::Empty));
        assert_eq!(
            ContributionId::from_name(" \t "),
            Err(ContributionIdError::Empty)
        );
    }

    #[tokio::test]
    async fn test_free_base_is_used_as_is() {
        let store = taken(&["Bob"]);
        let base = ContributionId::from_name("Alice").unwrap();

        let id = resolve_unique_id(&base, |c| {
            let hit = store.contains(c.as_str());
            async move { Ok::<_, Infallible>(hit) }
        })
        .await
        .unwrap();

        assert_eq!(id.as_str(), "Alice");
    }

    #[tokio::test]
    async fn test_suffix_starts_at_two() {
        let store = taken(&["Alice"]);
        let base = ContributionId::from_name("Alice").unwrap();

        let id = resolve_unique_id(&base, |c| {
            let hit = store.contains(c.as_str());
            async move { Ok::<_, Infallible>(hit) }
        })
        .await
        .unwrap();

        assert_eq!(id.as_str(), "Alice-2");
    }

    #[tokio::test]
    async fn test_suffix_skips_taken_slots() {
        let store = taken(&["Alice", "Alice-2"]);
        let base = ContributionId::from_name("Alice").unwrap();

        let id = resolve_unique_id(&base, |c| {
            let hit = store.contains(c.as_str());
            async move { Ok::<_, Infallible>(hit) }
        })
        .await
        .unwrap();

        assert_eq!(id.as_str(), "Alice-3");
    }

    #[tokio::test]
    async fn test_probes_in_order() {
        let store = taken(&["Alice", "Alice-2", "Alice-3"]);
        let probes = RefCell::new(Vec::new());
        let base = ContributionId::from_name("Alice").unwrap();

        let id = resolve_unique_id(&base, |c| {
            probes.borrow_mut().push(c.as_str().to_owned());
            let hit = store.contains(c.as_str());
            async move { Ok::<_, Infallible>(hit) }
        })
        .await
        .unwrap();

        assert_eq!(id.as_str(), "Alice-4");
        assert_eq!(
            probes.into_inner(),
            vec!["Alice", "Alice-2", "Alice-3", "Alice-4"]
        );
    }

    #[tokio::test]
    async fn test_first_error_stops_the_scan() {
        let base = ContributionId::from_name("Alice").unwrap();
        let mut calls = 0;

        let result = resolve_unique_id(&base, |_| {
            calls += 1;
            async { Err::<bool, _>("store unavailable") }
        })
        .await;

        assert_eq!(result, Err("store unavailable"));
        assert_eq!(calls, 1);
    }
}
