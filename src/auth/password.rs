use argon2::{password_hash::Output, Argon2};
use base64ct::{Base64, Encoding};
use rand::{rngs::OsRng, RngCore};
use thiserror::Error;
use tracing::error;

pub const SALT_LEN: usize = 16;
pub const KEY_LEN: usize = 32;

#[derive(Debug, Error)]
pub enum HashError {
    #[error("entropy source unavailable: {0}")]
    Entropy(String),
    #[error("key derivation failed: {0}")]
    Derive(String),
}

/// Argon2id over a per-call random salt. The stored digest is
/// `base64(salt || key)`.
#[derive(Clone, Default)]
pub struct CredentialHasher {
    argon2: Argon2<'static>,
}

impl CredentialHasher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hash(&self, plain: &str) -> Result<String, HashError> {
        let mut salt = [0u8; SALT_LEN];
        OsRng.try_fill_bytes(&mut salt).map_err(|e| {
            error!(error = %e, "salt generation failed");
            HashError::Entropy(e.to_string())
        })?;

        let key = self.derive(plain, &salt)?;

        let mut digest = Vec::with_capacity(SALT_LEN + KEY_LEN);
        digest.extend_from_slice(&salt);
        digest.extend_from_slice(&key);
        Ok(Base64::encode_string(&digest))
    }

    /// Never errors: anything that fails to decode is a mismatch.
    pub fn verify(&self, plain: &str, digest: &str) -> bool {
        let Ok(raw) = Base64::decode_vec(digest) else {
            return false;
        };
        if raw.len() != SALT_LEN + KEY_LEN {
            return false;
        }
        let (salt, stored) = raw.split_at(SALT_LEN);

        let Ok(candidate) = self.derive(plain, salt) else {
            return false;
        };

        // Output's PartialEq is constant-time.
        match (Output::new(&candidate), Output::new(stored)) {
            (Ok(candidate), Ok(stored)) => candidate == stored,
            _ => false,
        }
    }

    fn derive(&self, plain: &str, salt: &[u8]) -> Result<[u8; KEY_LEN], HashError> {
        let mut key = [0u8; KEY_LEN];
        self.argon2
            .hash_password_into(plain.as_bytes(), salt, &mut key)
            .map_err(|e| {
                error!(error = %e, "argon2 hash_password_into error");
                HashError::Derive(e.to_string())
            })?;
        Ok(key)
    }
}
