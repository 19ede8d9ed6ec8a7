//! Password hashing service and digest value object.
//!
//! Plain text passwords are only ever handed to [`PasswordHasher`]; what gets
//! stored is a [`PasswordDigest`] (an argon2 PHC string). Verification goes
//! through argon2's own verifier using the parameters embedded in the digest,
//! so a digest created under one cost profile verifies under any other.

use std::str::FromStr;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};

use crate::error::{DomainError, DomainResult};

/// Argon2 cost profile used when creating new digests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HashCost {
    /// Smallest parameters argon2 accepts. For tests and local development.
    Minimum,
    /// argon2 crate defaults (19 MiB, 2 iterations, 1 lane).
    #[default]
    Default,
    /// Explicit parameters
    Custom {
        memory_kib: u32,
        iterations: u32,
        parallelism: u32,
    },
}

impl HashCost {
    /// Build argon2 parameters for this profile.
    pub fn params(&self) -> DomainResult<Params> {
        let (m_cost, t_cost, p_cost) = match *self {
            HashCost::Minimum => (Params::MIN_M_COST, Params::MIN_T_COST, Params::MIN_P_COST),
            HashCost::Default => (
                Params::DEFAULT_M_COST,
                Params::DEFAULT_T_COST,
                Params::DEFAULT_P_COST,
            ),
            HashCost::Custom {
                memory_kib,
                iterations,
                parallelism,
            } => (memory_kib, iterations, parallelism),
        };

        Params::new(m_cost, t_cost, p_cost, None)
            .map_err(|e| DomainError::password(format!("Invalid hash cost: {}", e)))
    }
}

impl FromStr for HashCost {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "min" | "minimum" => Ok(HashCost::Minimum),
            "default" => Ok(HashCost::Default),
            other => Err(DomainError::password(format!(
                "Unknown hash cost '{}', expected 'min' or 'default'",
                other
            ))),
        }
    }
}

/// One-way hashing service with a tunable cost.
#[derive(Clone)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
    cost: HashCost,
}

impl std::fmt::Debug for PasswordHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordHasher")
            .field("cost", &self.cost)
            .finish()
    }
}

impl PasswordHasher {
    /// Create a hasher for the given cost profile.
    ///
    /// # Errors
    /// Returns a password error if the profile's parameters are rejected by argon2.
    pub fn new(cost: HashCost) -> DomainResult<Self> {
        let params = cost.params()?;
        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
            cost,
        })
    }

    /// Cheapest hasher; what the test suites use.
    pub fn minimum() -> Self {
        Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, minimum_params()),
            cost: HashCost::Minimum,
        }
    }

    /// Active cost profile
    pub fn cost(&self) -> HashCost {
        self.cost
    }

    /// Hash a plain text string with a fresh random salt.
    pub fn hash(&self, plain_text: &str) -> DomainResult<PasswordDigest> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2
            .hash_password(plain_text.as_bytes(), &salt)
            .map_err(|e| DomainError::internal(format!("Password hash failed: {}", e)))?;
        Ok(PasswordDigest(hash.to_string()))
    }

    /// Check a plain text string against a stored digest.
    ///
    /// Malformed digests never verify.
    pub fn verify(&self, plain_text: &str, digest: &PasswordDigest) -> bool {
        match PasswordHash::new(digest.as_str()) {
            Ok(parsed) => self
                .argon2
                .verify_password(plain_text.as_bytes(), &parsed)
                .is_ok(),
            Err(_) => false,
        }
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self {
            argon2: Argon2::default(),
            cost: HashCost::Default,
        }
    }
}

fn minimum_params() -> Params {
    Params::new(Params::MIN_M_COST, Params::MIN_T_COST, Params::MIN_P_COST, None)
        .unwrap_or_default()
}

/// Stored, salted one-way hash of a password.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordDigest(String);

// Don't expose hash in debug output
impl std::fmt::Debug for PasswordDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("PasswordDigest([REDACTED])")
    }
}

impl PasswordDigest {
    /// Wrap a digest loaded from storage.
    pub fn from_hash(hash: String) -> Self {
        Self(hash)
    }

    /// Get the hash string for storage.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume and return the hash string.
    pub fn into_string(self) -> String {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<PasswordDigest> for String {
    fn from(digest: PasswordDigest) -> Self {
        digest.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hasher = PasswordHasher::minimum();
        let digest = hasher.hash("foobar").unwrap();

        assert!(hasher.verify("foobar", &digest));
        assert!(!hasher.verify("foobaz", &digest));
    }

    #[test]
    fn test_digest_is_not_plain_text() {
        let hasher = PasswordHasher::minimum();
        let digest = hasher.hash("foobar").unwrap();

        assert!(!digest.is_empty());
        assert_ne!(digest.as_str(), "foobar");
        assert!(digest.as_str().starts_with("$argon2id$"));
    }

    #[test]
    fn test_same_password_different_salts() {
        let hasher = PasswordHasher::minimum();
        let first = hasher.hash("foobar").unwrap();
        let second = hasher.hash("foobar").unwrap();

        // Different salts produce different hashes
        assert_ne!(first, second);
        assert!(hasher.verify("foobar", &first));
        assert!(hasher.verify("foobar", &second));
    }

    #[test]
    fn test_digest_verifies_across_cost_profiles() {
        let cheap = PasswordHasher::minimum();
        let digest = cheap.hash("foobar").unwrap();

        assert!(PasswordHasher::default().verify("foobar", &digest));
    }

    #[test]
    fn test_restored_digest_verifies() {
        let hasher = PasswordHasher::minimum();
        let stored = hasher.hash("foobar").unwrap().into_string();

        let restored = PasswordDigest::from_hash(stored);
        assert!(hasher.verify("foobar", &restored));
    }

    #[test]
    fn test_malformed_digest_never_verifies() {
        let hasher = PasswordHasher::minimum();
        assert!(!hasher.verify("foobar", &PasswordDigest::from_hash("foobar".into())));
        assert!(!hasher.verify("", &PasswordDigest::from_hash(String::new())));
    }

    #[test]
    fn test_custom_cost_is_validated() {
        let too_small = HashCost::Custom {
            memory_kib: 1,
            iterations: 1,
            parallelism: 1,
        };
        assert!(PasswordHasher::new(too_small).is_err());

        let custom = HashCost::Custom {
            memory_kib: 64,
            iterations: 1,
            parallelism: 1,
        };
        let hasher = PasswordHasher::new(custom).unwrap();
        let digest = hasher.hash("foobar").unwrap();
        assert!(digest.as_str().contains("m=64,t=1,p=1"));
    }

    #[test]
    fn test_hash_cost_from_str() {
        assert_eq!("min".parse::<HashCost>().unwrap(), HashCost::Minimum);
        assert_eq!(" Default ".parse::<HashCost>().unwrap(), HashCost::Default);
        assert!("cheap".parse::<HashCost>().is_err());
    }

    #[test]
    fn test_debug_redacts_digest() {
        let digest = PasswordHasher::minimum().hash("foobar").unwrap();
        assert_eq!(format!("{:?}", digest), "PasswordDigest([REDACTED])");
    }
}
