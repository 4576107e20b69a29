//! Credential hashing - Domain layer password handling.
//!
//! Passwords are stored as Argon2id PHC strings. Each digest embeds its own
//! random salt and cost parameters, so verification never needs external
//! state and the work factor can be raised without invalidating old digests.

use argon2::{
    password_hash::{
        rand_core::OsRng, Error as PasswordHashError, PasswordHash, PasswordHasher,
        PasswordVerifier, SaltString,
    },
    Algorithm, Argon2, Params, Version,
};

use crate::config::HashCost;
use crate::errors::{AppError, AppResult};

/// Plaintext hashed once at startup so unknown users still pay for a verification.
const DUMMY_PLAINTEXT: &str = "petpals-dummy-credential";

/// Opaque, salted password digest. Safe to persist, never shown outward.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordDigest(String);

// Don't expose hash in debug output (security)
impl std::fmt::Debug for PasswordDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("PasswordDigest").field(&"[REDACTED]").finish()
    }
}

impl PasswordDigest {
    /// Wrap a digest loaded from storage.
    pub fn from_stored(digest: impl Into<String>) -> Self {
        Self(digest.into())
    }

    /// Get the digest string for storage.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume and return the digest string.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl From<PasswordDigest> for String {
    fn from(digest: PasswordDigest) -> Self {
        digest.0
    }
}

/// Hashes plaintext passwords and verifies attempts against stored digests.
#[derive(Clone)]
pub struct CredentialHasher {
    argon2: Argon2<'static>,
    dummy: PasswordDigest,
}

impl std::fmt::Debug for CredentialHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialHasher")
            .field("params", self.argon2.params())
            .finish()
    }
}

impl CredentialHasher {
    /// Build a hasher with the given Argon2id cost.
    ///
    /// # Errors
    /// Returns an internal error when the cost parameters are out of range.
    pub fn new(cost: HashCost) -> AppResult<Self> {
        let params = Params::new(cost.memory_kib, cost.iterations, cost.parallelism, None)
            .map_err(|e| AppError::internal(format!("Invalid hash parameters: {}", e)))?;
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

        let dummy = Self::hash_with(&argon2, DUMMY_PLAINTEXT)?;
        Ok(Self { argon2, dummy })
    }

    /// Hash a plaintext password with a freshly generated salt.
    ///
    /// # Errors
    /// Returns a validation error for an empty password.
    pub fn hash(&self, plain_text: &str) -> AppResult<PasswordDigest> {
        if plain_text.is_empty() {
            return Err(AppError::validation("Password is required."));
        }
        Self::hash_with(&self.argon2, plain_text)
    }

    /// Verify a plaintext attempt against a stored digest.
    ///
    /// Uses the salt and parameters embedded in `digest`; the comparison is
    /// constant time. A mismatch is `Ok(false)`.
    ///
    /// # Errors
    /// Returns [`AppError::MalformedDigest`] when `digest` cannot be parsed.
    pub fn verify(&self, plain_text: &str, digest: &PasswordDigest) -> AppResult<bool> {
        let parsed = PasswordHash::new(digest.as_str()).map_err(|_| AppError::MalformedDigest)?;

        match self.argon2.verify_password(plain_text.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(PasswordHashError::Password) => Ok(false),
            Err(_) => Err(AppError::MalformedDigest),
        }
    }

    /// Burn one verification against a throwaway digest.
    ///
    /// Called when the user does not exist so that the response time does
    /// not reveal whether the username is registered.
    pub fn verify_dummy(&self, plain_text: &str) {
        let _ = self.verify(plain_text, &self.dummy);
    }

    fn hash_with(argon2: &Argon2<'static>, plain_text: &str) -> AppResult<PasswordDigest> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = argon2
            .hash_password(plain_text.as_bytes(), &salt)
            .map_err(|e| AppError::internal(format!("Password hash failed: {}", e)))?;
        Ok(PasswordDigest(hash.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Cheap parameters keep the unit tests fast.
    fn hasher() -> CredentialHasher {
        CredentialHasher::new(HashCost {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        })
        .unwrap()
    }

    #[test]
    fn test_hash_and_verify() {
        let hasher = hasher();
        let digest = hasher.hash("secret123").unwrap();

        assert!(hasher.verify("secret123", &digest).unwrap());
        assert!(!hasher.verify("wrongpass", &digest).unwrap());
    }

    #[test]
    fn test_same_password_different_salts() {
        let hasher = hasher();
        let first = hasher.hash("SamePassword123").unwrap();
        let second = hasher.hash("SamePassword123").unwrap();

        assert_ne!(first, second);
        assert!(hasher.verify("SamePassword123", &first).unwrap());
        assert!(hasher.verify("SamePassword123", &second).unwrap());
    }

    #[test]
    fn test_digest_embeds_algorithm_and_cost() {
        let digest = hasher().hash("secret123").unwrap();

        assert!(digest.as_str().starts_with("$argon2id$v=19$m=1024,t=1,p=1$"));
        assert!(!digest.as_str().contains("secret123"));
    }

    #[test]
    fn test_verify_uses_embedded_parameters() {
        let weak = hasher();
        let strong = CredentialHasher::new(HashCost {
            memory_kib: 2048,
            iterations: 2,
            parallelism: 1,
        })
        .unwrap();

        let digest = weak.hash("secret123").unwrap();
        assert!(strong.verify("secret123", &digest).unwrap());
    }

    #[test]
    fn test_empty_password_rejected() {
        let result = hasher().hash("");
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn test_malformed_digest() {
        let hasher = hasher();
        let corrupted = PasswordDigest::from_stored("not-a-phc-string");

        let result = hasher.verify("secret123", &corrupted);
        assert!(matches!(result, Err(AppError::MalformedDigest)));
    }

    #[test]
    fn test_digest_debug_is_redacted() {
        let digest = hasher().hash("secret123").unwrap();
        let rendered = format!("{:?}", digest);

        assert!(rendered.contains("[REDACTED]"));
        assert!(!rendered.contains("argon2"));
    }

    #[test]
    fn test_invalid_cost_rejected() {
        let result = CredentialHasher::new(HashCost {
            memory_kib: 1,
            iterations: 0,
            parallelism: 0,
        });
        assert!(matches!(result, Err(AppError::Internal(_))));
    }
}
