//! Shared-secret authentication
//!
//! Writers present a secret in `Authorization: Bearer <secret>`. Only the
//! SHA-256 digest of that secret is configured, so the raw secret never
//! lives in configuration or logs.

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::error::{Error, Result};

const BEARER_PREFIX: &[u8] = b"Bearer ";

/// Why a credential was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    Missing,
    Mismatch,
}

/// Outcome of checking a presented credential
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Accepted,
    Rejected(Rejection),
}

impl Verdict {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Verdict::Accepted)
    }
}

/// Lowercase hex SHA-256 of a secret, the format expected in `auth.secret_sha256`
pub fn digest_hex(secret: impl AsRef<[u8]>) -> String {
    hex::encode(Sha256::digest(secret.as_ref()))
}

/// Strip the bearer scheme from a raw authorization header value.
///
/// A value without the prefix is taken verbatim. Bytes are not required to
/// be ASCII; the secret is hashed exactly as sent.
pub fn bearer_token(header: &[u8]) -> &[u8] {
    header.strip_prefix(BEARER_PREFIX).unwrap_or(header)
}

/// Verifies presented secrets against the configured reference digest
#[derive(Clone)]
pub struct CredentialVerifier {
    reference: [u8; 32],
}

impl CredentialVerifier {
    /// Build a verifier from a hex-encoded SHA-256 digest
    pub fn from_hex(reference: &str) -> Result<Self> {
        let bytes = hex::decode(reference.trim())
            .map_err(|e| Error::Config(format!("auth.secret_sha256 is not valid hex: {}", e)))?;
        let reference: [u8; 32] = bytes.try_into().map_err(|b: Vec<u8>| {
            Error::Config(format!(
                "auth.secret_sha256 must be a SHA-256 digest (32 bytes), got {} bytes",
                b.len()
            ))
        })?;
        Ok(Self { reference })
    }

    /// Hex form of the reference digest
    pub fn reference_hex(&self) -> String {
        hex::encode(self.reference)
    }

    /// Check a presented secret (bearer prefix already stripped)
    pub fn verify(&self, presented: Option<&[u8]>) -> Verdict {
        let Some(secret) = presented else {
            return Verdict::Rejected(Rejection::Missing);
        };

        let digest = Sha256::digest(secret);
        if bool::from(digest.as_slice().ct_eq(&self.reference)) {
            Verdict::Accepted
        } else {
            tracing::warn!(
                got = %hex::encode(digest),
                wanted = %self.reference_hex(),
                "credential digest mismatch"
            );
            Verdict::Rejected(Rejection::Mismatch)
        }
    }
}

impl std::fmt::Debug for CredentialVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialVerifier")
            .field("reference", &self.reference_hex())
            .finish()
    }
}
