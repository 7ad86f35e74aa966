//! Admin elevation against a shared secret.
//!
//! The secret itself sits behind [`CredentialVerifier`] so the backing
//! store can change without touching routing logic.

use std::fmt;
use std::sync::Arc;

use crate::domain::Client;
use crate::error::RelayError;

/// Decides whether a presented token is the admin credential.
pub trait CredentialVerifier: Send + Sync + fmt::Debug {
    /// Returns `true` if `token` grants admin rights.
    fn verify(&self, token: &str) -> bool;
}

/// Verifier backed by one static secret loaded at startup.
#[derive(Clone)]
pub struct StaticTokenVerifier {
    token: String,
}

impl StaticTokenVerifier {
    /// Creates a verifier for the given secret.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

impl CredentialVerifier for StaticTokenVerifier {
    fn verify(&self, token: &str) -> bool {
        constant_time_eq(self.token.as_bytes(), token.as_bytes())
    }
}

impl fmt::Debug for StaticTokenVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticTokenVerifier")
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Constant-time byte comparison. Length is not hidden.
#[must_use]
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut result: u8 = 0;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}

/// Elevates clients to admin status.
#[derive(Debug, Clone)]
pub struct AdminAuthenticator {
    verifier: Arc<dyn CredentialVerifier>,
}

impl AdminAuthenticator {
    /// Creates an authenticator over the given verifier.
    #[must_use]
    pub fn new(verifier: Arc<dyn CredentialVerifier>) -> Self {
        Self { verifier }
    }

    /// Checks a token without touching any client.
    #[must_use]
    pub fn verify(&self, token: &str) -> bool {
        self.verifier.verify(token)
    }

    /// Grants admin to `client` if `token` verifies.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Unauthorized`] on a mismatch; the client is
    /// left unchanged.
    pub fn elevate(&self, client: &Client, token: &str) -> Result<(), RelayError> {
        if !self.verify(token) {
            return Err(RelayError::Unauthorized("admin token mismatch"));
        }
        client.grant_admin();
        tracing::info!(client_id = %client.id(), "client elevated to admin");
        Ok(())
    }
}
