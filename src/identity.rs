//! Verified user identity and stable storage keys.
//!
//! Token verification happens upstream; this service only ever sees an
//! already-verified email address.

use serde::{Deserialize, Serialize};

use crate::rollup::StatsError;

/// An email identity already verified by the upstream auth collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifiedUser {
    email: String,
}

impl VerifiedUser {
    /// Accept a verified email. Rejects anything without a non-empty local
    /// part and domain; no further effects happen before this check.
    pub fn parse(email: &str) -> Result<Self, StatsError> {
        let email = email.trim();
        match email.split_once('@') {
            Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(Self {
                email: email.to_string(),
            }),
            _ => Err(StatsError::Validation(format!(
                "malformed email address '{email}'"
            ))),
        }
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    /// Stable identifier used as the document-key prefix.
    ///
    /// This is the email local-part, kept for compatibility with existing
    /// keyed data. Local parts collide across domains: bob@gmail.com and
    /// bob@yahoo.com share a prefix. The store also persists the full email
    /// so a future migration to full-identity keys has what it needs.
    pub fn local_part(&self) -> &str {
        self.email.split('@').next().unwrap_or(&self.email)
    }
}
