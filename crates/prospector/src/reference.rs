//! Repository references.
//!
//! A reference is anything resolvable to `(owner, name)`: the `owner/name`
//! shorthand or a full `https://github.com/owner/name` URL. Normalization
//! strips one trailing slash and a `.git` suffix before splitting.

use std::fmt;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReferenceError {
    #[error("invalid repository reference: {0:?}")]
    Invalid(String),
}

/// A parsed repository reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoReference {
    owner: String,
    name: String,
}

impl RepoReference {
    /// Parse and normalize a reference.
    ///
    /// Rejection happens here, before any network call is made.
    pub fn parse(input: &str) -> Result<Self, ReferenceError> {
        let trimmed = input.trim();
        let normalized = trimmed.strip_suffix('/').unwrap_or(trimmed);

        // For URL forms, drop the scheme and host so only path segments
        // remain; the shorthand form is already a bare path.
        let path = match normalized.split_once("://") {
            Some((_, rest)) => rest.split_once('/').map(|(_, p)| p).unwrap_or_default(),
            None => normalized,
        };

        let mut segments = path.rsplit('/');
        let name = segments.next().unwrap_or_default();
        let owner = segments.next().unwrap_or_default();
        let name = name.strip_suffix(".git").unwrap_or(name);

        if !is_valid_segment(owner) || !is_valid_segment(name) {
            return Err(ReferenceError::Invalid(input.to_string()));
        }

        Ok(Self {
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }

    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    #[must_use]
    pub fn owner(&self) -> &str {
        &self.owner
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Canonical browse URL, used as the store key for repository records.
    #[must_use]
    pub fn html_url(&self) -> String {
        format!("https://github.com/{}/{}", self.owner, self.name)
    }
}

impl fmt::Display for RepoReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Owner and repository segments: the character set GitHub accepts for
/// logins and repository names.
fn is_valid_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_shorthand() {
        let reference = RepoReference::parse("acme/widget").unwrap();
        assert_eq!(reference.owner(), "acme");
        assert_eq!(reference.name(), "widget");
        assert_eq!(reference.to_string(), "acme/widget");
    }

    #[test]
    fn parses_full_url() {
        let reference = RepoReference::parse("https://github.com/rust-lang/cargo").unwrap();
        assert_eq!(reference.owner(), "rust-lang");
        assert_eq!(reference.name(), "cargo");
        assert_eq!(reference.html_url(), "https://github.com/rust-lang/cargo");
    }

    #[test]
    fn strips_trailing_slash_and_git_suffix() {
        let reference = RepoReference::parse("https://github.com/acme/widget.git/").unwrap();
        assert_eq!(reference.owner(), "acme");
        assert_eq!(reference.name(), "widget");

        let reference = RepoReference::parse("acme/widget.git").unwrap();
        assert_eq!(reference.name(), "widget");
    }

    #[test]
    fn rejects_garbage_without_io() {
        for input in ["", "widget", "not a url", "a b/c", "acme//", "/widget"] {
            let err = RepoReference::parse(input).unwrap_err();
            assert!(matches!(err, ReferenceError::Invalid(_)), "input: {input:?}");
        }
    }

    #[test]
    fn url_scheme_remnant_is_not_a_valid_owner() {
        // Only one path segment after the host is missing the owner.
        assert!(RepoReference::parse("https://github.com/widget").is_err());
    }
}
