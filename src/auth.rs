//! Identity boundary: maps bearer credentials to caller identities.
//!
//! The core never validates tokens itself; it takes a verified email-like
//! identity and compares it for equality against stored owner or buyer
//! identities. Deployments plug a real token service in behind the trait.

use crate::error::MarketError;
use std::collections::HashMap;

pub trait IdentityVerifier {
    /// Resolve a bearer credential to the caller's email identity.
    fn verify(&self, bearer: &str) -> Result<String, MarketError>;
}

/// In-memory token table, enough for tests and demos.
#[derive(Debug, Default)]
pub struct TokenRegistry {
    tokens: HashMap<String, String>,
}

impl TokenRegistry {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn register(&mut self, token: impl Into<String>, email: impl Into<String>) {
        self.tokens.insert(token.into(), email.into());
    }
}

impl IdentityVerifier for TokenRegistry {
    fn verify(&self, bearer: &str) -> Result<String, MarketError> {
        self.tokens
            .get(bearer)
            .cloned()
            .ok_or_else(|| MarketError::Forbidden("unrecognized bearer credential".into()))
    }
}
