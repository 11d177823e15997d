use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use rand::rngs::OsRng;
use rand::RngCore;

pub const DEFAULT_TOKEN_BYTES: usize = 32;
const MIN_TOKEN_BYTES: usize = 16;

/// URL-safe token built from `bytes` bytes of OS randomness (at least 16).
pub fn generate_secure_token(bytes: usize) -> String {
    let mut buffer = vec![0u8; bytes.max(MIN_TOKEN_BYTES)];
    OsRng.fill_bytes(&mut buffer);
    URL_SAFE_NO_PAD.encode(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn tokens_are_url_safe() {
        let token = generate_secure_token(DEFAULT_TOKEN_BYTES);
        assert_eq!(token.len(), 43);
        assert!(token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn short_requests_are_raised_to_minimum() {
        assert_eq!(generate_secure_token(0).len(), 22);
    }

    #[test]
    fn tokens_do_not_repeat() {
        let tokens: HashSet<_> = (0..64).map(|_| generate_secure_token(16)).collect();
        assert_eq!(tokens.len(), 64);
    }
}
