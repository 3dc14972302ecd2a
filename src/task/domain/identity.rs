//! Normalized participant identities.
//!
//! Chat gateways address people by phone-like strings that arrive in many
//! shapes: `+91 98765-43210`, `919876543210@c.us`, `(555) 010 2233`. Every
//! comparison and every stored value uses the canonical digits-only form.

use super::TaskDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Separator that introduces a gateway routing suffix.
const ROUTING_SEPARATOR: char = '@';

/// Canonical, digits-only participant identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(String);

impl Identity {
    /// Normalizes a raw identity and rejects values with no digits.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidIdentity`] when nothing remains after
    /// normalization.
    pub fn parse(raw: &str) -> Result<Self, TaskDomainError> {
        let identity = Self::normalize(raw);
        if identity.is_empty() {
            return Err(TaskDomainError::InvalidIdentity(raw.to_owned()));
        }
        Ok(identity)
    }

    /// Normalizes a raw identity without validating the result.
    ///
    /// Everything after the first routing separator is discarded, then every
    /// non-digit character is removed. The result may be empty; an empty
    /// identity never matches a stored participant.
    #[must_use]
    pub fn normalize(raw: &str) -> Self {
        let address = raw
            .split_once(ROUTING_SEPARATOR)
            .map_or(raw, |(address, _)| address);
        Self(address.chars().filter(char::is_ascii_digit).collect())
    }

    /// Returns `true` when normalization left no digits.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the canonical identity as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Identity {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Normalizes a list of raw identities, dropping repeats after the first.
///
/// # Errors
///
/// Returns [`TaskDomainError::InvalidIdentity`] for the first entry that has
/// no digits.
pub fn parse_identities<I, S>(raw: I) -> Result<Vec<Identity>, TaskDomainError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut identities: Vec<Identity> = Vec::new();
    for value in raw {
        let identity = Identity::parse(value.as_ref())?;
        if !identities.contains(&identity) {
            identities.push(identity);
        }
    }
    Ok(identities)
}
