//! The admin secret guarding the subscription API.
//!
//! Only an argon2 PHC string is ever kept in memory or on disk. Operators
//! may write a plaintext secret into the config file; the loader replaces
//! it with [`AdminConfig::from_plaintext`] on first start.

use argon2::password_hash::{self, SaltString, rand_core::OsRng};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};

/// Prefix shared by every argon2 PHC string.
const ARGON2_PREFIX: &str = "$argon2";

#[derive(Debug, Clone)]
pub struct AdminConfig {
    /// Argon2 PHC string of the admin secret.
    pub secret_hash: String,
}

impl AdminConfig {
    /// Wrap an already hashed secret.
    pub fn new(secret_hash: String) -> Self {
        Self { secret_hash }
    }

    /// Hash a plaintext secret with a fresh salt.
    pub fn from_plaintext(plaintext: &str) -> Result<Self, password_hash::Error> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default().hash_password(plaintext.as_bytes(), &salt)?;
        Ok(Self::new(hash.to_string()))
    }

    /// Whether a stored config value is a hash rather than plaintext.
    pub fn is_hashed(value: &str) -> bool {
        value.starts_with(ARGON2_PREFIX)
    }

    /// Check the value of the `Relay-Admin-Authorization` header.
    ///
    /// Empty secrets and unparsable stored hashes never verify.
    pub fn verify_secret(&self, plaintext: &str) -> bool {
        if plaintext.is_empty() {
            return false;
        }
        PasswordHash::new(&self.secret_hash).is_ok_and(|hash| {
            Argon2::default()
                .verify_password(plaintext.as_bytes(), &hash)
                .is_ok()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plaintext_round_trips_through_hash() {
        let admin = AdminConfig::from_plaintext("relay-admin").unwrap();
        assert!(AdminConfig::is_hashed(&admin.secret_hash));
        assert!(admin.verify_secret("relay-admin"));
        assert!(!admin.verify_secret("relay-admin "));
    }

    #[test]
    fn test_each_hash_gets_its_own_salt() {
        let first = AdminConfig::from_plaintext("same").unwrap();
        let second = AdminConfig::from_plaintext("same").unwrap();
        assert_ne!(first.secret_hash, second.secret_hash);
        assert!(second.verify_secret("same"));
    }

    #[test]
    fn test_unhashed_or_empty_never_verifies() {
        assert!(!AdminConfig::is_hashed("plaintext"));
        assert!(!AdminConfig::new("plaintext".to_owned()).verify_secret("plaintext"));
        assert!(!AdminConfig::new(String::new()).verify_secret(""));
    }
}
