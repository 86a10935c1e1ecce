use crate::error::RequestError;
use secrecy::{ExposeSecret, Secret};
use subtle::ConstantTimeEq;

/// Checks caller-supplied API keys against the configured access key.
///
/// The expected key is injected at construction and never mutated, so a
/// verifier can be cloned freely into request handlers.
#[derive(Clone)]
pub struct ApiKeyVerifier {
    expected: Secret<String>,
}

impl ApiKeyVerifier {
    pub fn new(expected: Secret<String>) -> Self {
        Self { expected }
    }

    pub fn verify(&self, presented: &str) -> Result<(), RequestError> {
        if presented.is_empty() {
            return Err(RequestError::MissingCredential);
        }

        let expected = self.expected.expose_secret().as_bytes();
        // An unset access key rejects everything.
        if expected.is_empty() || !bool::from(expected.ct_eq(presented.as_bytes())) {
            return Err(RequestError::InvalidCredential);
        }

        Ok(())
    }
}
