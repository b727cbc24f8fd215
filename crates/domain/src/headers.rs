//! Ordered, case-insensitive header multimap.

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Request headers as the synchronous caller supplied them.
///
/// Lookups ignore ASCII case; iteration yields pairs in insertion order with
/// the caller's original spelling. Duplicate names are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Headers {
    entries: Vec<(String, String)>,
}

impl Headers {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a header, keeping any existing value with the same name.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidHeaderName`] if `name` is not an HTTP token.
    pub fn append(
        &mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), DomainError> {
        let name = name.into();
        validate_name(&name)?;
        self.entries.push((name, value.into()));
        Ok(())
    }

    /// Replace every value for `name` with a single value.
    ///
    /// The new pair takes the position of the first removed one, or goes
    /// last when the name was absent.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidHeaderName`] if `name` is not an HTTP token.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), DomainError> {
        let name = name.into();
        validate_name(&name)?;
        let position = self
            .entries
            .iter()
            .position(|(existing, _)| existing.eq_ignore_ascii_case(&name));
        self.remove(&name);
        let at = position.unwrap_or(self.entries.len());
        self.entries.insert(at, (name, value.into()));
        Ok(())
    }

    /// First value for `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Every value for `name`, in insertion order.
    pub fn get_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.entries
            .iter()
            .filter(move |(existing, _)| existing.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Remove every value for `name`, returning how many were dropped.
    pub fn remove(&mut self, name: &str) -> usize {
        let before = self.entries.len();
        self.entries
            .retain(|(existing, _)| !existing.eq_ignore_ascii_case(name));
        before - self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// RFC 9110 token characters.
fn is_token_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b)
}

fn validate_name(name: &str) -> Result<(), DomainError> {
    if name.is_empty() || !name.bytes().all(is_token_byte) {
        return Err(DomainError::InvalidHeaderName(name.to_string()));
    }
    Ok(())
}
