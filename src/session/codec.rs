//! AEAD codec for session cookie values.
//!
//! Tokens are AES-256-GCM encrypted with the cookie name as associated data,
//! so a token minted for one cookie cannot be replayed under another name.
//! The key is generated at process start and lives only in memory;
//! restarting the server invalidates every outstanding session.

use aes_gcm::{
    Aes256Gcm, KeyInit, Nonce,
    aead::{Aead, Payload},
};
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::{RngCore, rngs::OsRng};

const NONCE_LEN: usize = 12; // 96-bit nonce for GCM

/// Decode failure. Deliberately opaque: a tampered token, a truncated token
/// and a token from a previous process all look the same to the caller.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("invalid session token")]
pub struct CodecError;

pub struct SessionCodec {
    cipher: Aes256Gcm,
}

impl SessionCodec {
    /// Create a codec with a fresh random key.
    pub fn new() -> Self {
        let key = Aes256Gcm::generate_key(&mut OsRng);
        Self {
            cipher: Aes256Gcm::new(&key),
        }
    }

    /// Encrypt `value` into an opaque token bound to `name`.
    ///
    /// Token layout: url-safe base64 of `nonce || ciphertext`.
    pub fn encode(&self, name: &str, value: &str) -> Result<String, CodecError> {
        let mut nonce_bytes = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = self
            .cipher
            .encrypt(
                nonce,
                Payload {
                    msg: value.as_bytes(),
                    aad: name.as_bytes(),
                },
            )
            .map_err(|_| CodecError)?;

        let mut raw = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        raw.extend_from_slice(&nonce_bytes);
        raw.extend_from_slice(&ciphertext);
        Ok(URL_SAFE_NO_PAD.encode(raw))
    }

    /// Recover the value from a token minted by [`encode`](Self::encode)
    /// under the same `name` and key.
    ///
    /// Fails closed: any tampering, truncation or key mismatch yields
    /// [`CodecError`], never a partially trusted value.
    pub fn decode(&self, name: &str, token: &str) -> Result<String, CodecError> {
        let raw = URL_SAFE_NO_PAD.decode(token).map_err(|_| CodecError)?;
        if raw.len() <= NONCE_LEN {
            return Err(CodecError);
        }

        let (nonce_bytes, ciphertext) = raw.split_at(NONCE_LEN);
        let nonce = Nonce::from_slice(nonce_bytes);

        let plaintext = self
            .cipher
            .decrypt(
                nonce,
                Payload {
                    msg: ciphertext,
                    aad: name.as_bytes(),
                },
            )
            .map_err(|_| CodecError)?;

        String::from_utf8(plaintext).map_err(|_| CodecError)
    }
}

impl Default for SessionCodec {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_decode_roundtrip() {
        let codec = SessionCodec::new();
        let token = codec.encode("auth", "alice").unwrap();
        assert_eq!(codec.decode("auth", &token).unwrap(), "alice");
    }

    #[test]
    fn test_tokens_are_opaque_and_unique() {
        let codec = SessionCodec::new();
        let t1 = codec.encode("auth", "alice").unwrap();
        let t2 = codec.encode("auth", "alice").unwrap();
        // fresh nonce every time, so identical values yield distinct tokens
        assert_ne!(t1, t2);
        assert!(!t1.contains("alice"));
    }

    #[test]
    fn test_name_acts_as_associated_data() {
        let codec = SessionCodec::new();
        let token = codec.encode("auth", "alice").unwrap();
        assert_eq!(codec.decode("other", &token), Err(CodecError));
    }

    #[test]
    fn test_single_bit_flip_fails_closed() {
        let codec = SessionCodec::new();
        let token = codec.encode("auth", "alice").unwrap();

        let raw = URL_SAFE_NO_PAD.decode(&token).unwrap();
        for i in 0..raw.len() {
            let mut corrupted = raw.clone();
            corrupted[i] ^= 0x01;
            let corrupted_token = URL_SAFE_NO_PAD.encode(&corrupted);
            assert_eq!(
                codec.decode("auth", &corrupted_token),
                Err(CodecError),
                "flip at byte {} must not decode",
                i
            );
        }
        // untouched token still decodes
        assert!(codec.decode("auth", &token).is_ok());
    }

    #[test]
    fn test_truncated_token_fails() {
        let codec = SessionCodec::new();
        let token = codec.encode("auth", "alice").unwrap();
        assert_eq!(codec.decode("auth", &token[..token.len() / 2]), Err(CodecError));
        assert_eq!(codec.decode("auth", ""), Err(CodecError));
    }

    #[test]
    fn test_garbage_input_fails() {
        let codec = SessionCodec::new();
        assert_eq!(codec.decode("auth", "not base64 !!!"), Err(CodecError));
        assert_eq!(codec.decode("auth", "AAAA"), Err(CodecError));
    }

    #[test]
    fn test_key_mismatch_fails() {
        let token = SessionCodec::new().encode("auth", "alice").unwrap();
        let other = SessionCodec::new();
        assert_eq!(other.decode("auth", &token), Err(CodecError));
    }
}
