use argon2::password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use rand::RngCore;

use super::CredentialError;

const SALT_BYTES: usize = 16;

/// Argon2id hasher producing self-describing PHC strings.
///
/// The default parameters follow the OWASP recommendation (19 MiB, two passes, one lane).
/// Verification reads the parameters back from the stored hash, so lowering the cost for
/// tests never weakens hashes produced by a default-configured service.
#[derive(Debug, Clone)]
pub struct CredentialHasher {
    params: Params,
}

impl Default for CredentialHasher {
    fn default() -> Self {
        Self {
            params: Params::DEFAULT,
        }
    }
}

impl CredentialHasher {
    pub fn with_params(params: Params) -> Self {
        Self { params }
    }

    pub fn hash(&self, password: &str) -> Result<String, CredentialError> {
        if password.is_empty() {
            return Err(CredentialError::EmptyPassword);
        }

        let mut salt_bytes = [0u8; SALT_BYTES];
        rand::thread_rng().fill_bytes(&mut salt_bytes);
        let salt = SaltString::encode_b64(&salt_bytes)
            .map_err(|err| CredentialError::Hashing(err.to_string()))?;

        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|err| CredentialError::Hashing(err.to_string()))
    }

    /// Returns `false` for empty input, malformed hashes and mismatches. Never fails.
    pub fn verify(&self, password: &str, hash: &str) -> bool {
        if password.is_empty() || hash.is_empty() {
            return false;
        }

        let Ok(parsed) = PasswordHash::new(hash) else {
            return false;
        };

        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }
}

pub fn hash_password(password: &str) -> Result<String, CredentialError> {
    CredentialHasher::default().hash(password)
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    CredentialHasher::default().verify(password, hash)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_hasher() -> CredentialHasher {
        CredentialHasher::with_params(Params::new(256, 1, 1, None).expect("valid params"))
    }

    #[test]
    fn hash_then_verify_round_trips() {
        let hasher = fast_hasher();
        for password in ["Secret1!", "correct horse battery staple", "pässwörd9?"] {
            let hash = hasher.hash(password).expect("hash");
            assert!(hasher.verify(password, &hash), "{password} should verify");
        }
    }

    #[test]
    fn different_password_does_not_verify() {
        let hasher = fast_hasher();
        let hash = hasher.hash("Secret1!").expect("hash");
        assert!(!hasher.verify("Secret1?", &hash));
        assert!(!hasher.verify("secret1!", &hash));
    }

    #[test]
    fn hashing_is_salted() {
        let hasher = fast_hasher();
        let first = hasher.hash("Secret1!").expect("hash");
        let second = hasher.hash("Secret1!").expect("hash");
        assert_ne!(first, second);
        assert!(first.starts_with("$argon2id$"));
    }

    #[test]
    fn empty_password_is_rejected() {
        assert_eq!(
            fast_hasher().hash(""),
            Err(CredentialError::EmptyPassword)
        );
        assert_eq!(hash_password(""), Err(CredentialError::EmptyPassword));
    }

    #[test]
    fn malformed_input_verifies_false() {
        let hasher = fast_hasher();
        let hash = hasher.hash("Secret1!").expect("hash");
        assert!(!hasher.verify("", &hash));
        assert!(!hasher.verify("Secret1!", ""));
        assert!(!hasher.verify("Secret1!", "not-a-phc-string"));
        assert!(!hasher.verify("Secret1!", "pbkdf2:sha256:600000$salt$deadbeef"));
    }

    #[test]
    fn default_hasher_verifies_reduced_cost_hashes() {
        let hash = fast_hasher().hash("Secret1!").expect("hash");
        assert!(verify_password("Secret1!", &hash));
    }
}
