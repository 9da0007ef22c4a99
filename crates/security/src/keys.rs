//! Encrypted-key provider — fetches the encrypted-key JSON and recovers the
//! bearer token with AES-GCM authenticated decryption (128-bit tag).
//!
//! The key resource bundles the decryption key alongside the ciphertext it
//! decrypts, so this is obfuscation, not confidentiality: anyone who can
//! read the resource can recover the token. That is the documented contract
//! of the upstream key format and is preserved here as-is.

use aes_gcm::aead::Aead;
use aes_gcm::{Aes128Gcm, Aes256Gcm, KeyInit, Nonce};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use emberchat_core::endpoint::TokenSource;
use emberchat_core::error::KeyError;
use serde::{Deserialize, Serialize};
use tracing::debug;

const NONCE_LEN: usize = 12;
const TAG_LEN: usize = 16;

/// Wire shape of the encrypted-key resource. All fields are base64.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncryptedKeyFile {
    /// Initialization vector (12 bytes).
    pub iv: String,
    /// Ciphertext without the authentication tag.
    pub content: String,
    /// Authentication tag (16 bytes).
    pub tag: String,
    /// Raw AES key material (16 or 32 bytes).
    pub key: String,
}

/// Fetches and decrypts the bearer token for one inference attempt.
pub struct KeyProvider {
    source: String,
    client: reqwest::Client,
}

impl KeyProvider {
    /// `source` is either an http(s) URL or a local file path.
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            client: reqwest::Client::new(),
        }
    }

    async fn fetch(&self) -> Result<EncryptedKeyFile, KeyError> {
        let body = if self.source.starts_with("http://") || self.source.starts_with("https://") {
            let response = self
                .client
                .get(&self.source)
                .send()
                .await
                .map_err(|e| KeyError::Load(e.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                return Err(KeyError::Load(format!("status {status}")));
            }

            response
                .text()
                .await
                .map_err(|e| KeyError::Load(e.to_string()))?
        } else {
            tokio::fs::read_to_string(&self.source)
                .await
                .map_err(|e| KeyError::Load(e.to_string()))?
        };

        serde_json::from_str(&body).map_err(|e| KeyError::Load(e.to_string()))
    }
}

#[async_trait]
impl TokenSource for KeyProvider {
    async fn obtain_token(&self) -> Result<String, KeyError> {
        let file = self.fetch().await?;
        debug!(source = %self.source, "Encrypted key fetched, decrypting");
        decrypt_token(&file)
    }
}

/// Decode and decrypt an encrypted-key file into the plaintext token.
pub fn decrypt_token(file: &EncryptedKeyFile) -> Result<String, KeyError> {
    let iv = decode_field("iv", &file.iv)?;
    let content = decode_field("content", &file.content)?;
    let tag = decode_field("tag", &file.tag)?;
    let key = decode_field("key", &file.key)?;

    if iv.len() != NONCE_LEN {
        return Err(KeyError::Decrypt(format!(
            "initialization vector must be {NONCE_LEN} bytes, got {}",
            iv.len()
        )));
    }
    if tag.len() != TAG_LEN {
        return Err(KeyError::Decrypt(format!(
            "authentication tag must be {TAG_LEN} bytes, got {}",
            tag.len()
        )));
    }

    // AES-GCM implementations expect ciphertext || tag
    let mut sealed = content;
    sealed.extend_from_slice(&tag);

    let nonce = Nonce::from_slice(&iv);
    let plaintext = match key.len() {
        16 => Aes128Gcm::new_from_slice(&key)
            .map_err(|_| KeyError::Decrypt("invalid key length".into()))?
            .decrypt(nonce, sealed.as_ref()),
        32 => Aes256Gcm::new_from_slice(&key)
            .map_err(|_| KeyError::Decrypt("invalid key length".into()))?
            .decrypt(nonce, sealed.as_ref()),
        other => {
            return Err(KeyError::Decrypt(format!(
                "unsupported key length {other}, expected 16 or 32 bytes"
            )))
        }
    }
    .map_err(|_| KeyError::Decrypt("authentication tag mismatch".into()))?;

    String::from_utf8(plaintext)
        .map_err(|_| KeyError::Decrypt("plaintext is not valid UTF-8".into()))
}

/// Encrypt a plaintext token into the encrypted-key wire format.
///
/// Generates a fresh random 256-bit key and 12-byte IV; the offline
/// counterpart of [`decrypt_token`], used by `emberchat seal-key`.
pub fn seal_token(token: &str) -> Result<EncryptedKeyFile, KeyError> {
    use rand::Rng;

    let mut rng = rand::rng();
    let mut key = [0u8; 32];
    let mut iv = [0u8; NONCE_LEN];
    rng.fill(&mut key[..]);
    rng.fill(&mut iv[..]);

    let cipher = Aes256Gcm::new_from_slice(&key)
        .map_err(|_| KeyError::Decrypt("invalid key length".into()))?;
    let sealed = cipher
        .encrypt(Nonce::from_slice(&iv), token.as_bytes())
        .map_err(|e| KeyError::Decrypt(format!("encryption failed: {e}")))?;

    // Split ciphertext || tag back into the separate wire fields
    let (content, tag) = sealed.split_at(sealed.len() - TAG_LEN);

    Ok(EncryptedKeyFile {
        iv: BASE64.encode(iv),
        content: BASE64.encode(content),
        tag: BASE64.encode(tag),
        key: BASE64.encode(key),
    })
}

fn decode_field(name: &str, value: &str) -> Result<Vec<u8>, KeyError> {
    BASE64
        .decode(value)
        .map_err(|e| KeyError::Decrypt(format!("invalid base64 in {name}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seal_and_decrypt_roundtrip() {
        let sealed = seal_token("hf_abc123secrettoken").unwrap();
        let token = decrypt_token(&sealed).unwrap();
        assert_eq!(token, "hf_abc123secrettoken");
    }

    #[test]
    fn sealing_twice_differs() {
        let a = seal_token("same-token").unwrap();
        let b = seal_token("same-token").unwrap();
        assert_ne!(a.content, b.content);
        assert_ne!(a.key, b.key);
    }

    #[test]
    fn tampered_ciphertext_fails_authentication() {
        let sealed = seal_token("hf_token").unwrap();
        let mut content = BASE64.decode(&sealed.content).unwrap();
        content[0] ^= 0x01;

        let tampered = EncryptedKeyFile {
            content: BASE64.encode(content),
            ..sealed
        };

        let err = decrypt_token(&tampered).unwrap_err();
        assert!(matches!(err, KeyError::Decrypt(ref m) if m.contains("tag mismatch")));
    }

    #[test]
    fn tampered_tag_fails_authentication() {
        let sealed = seal_token("hf_token").unwrap();
        let mut tag = BASE64.decode(&sealed.tag).unwrap();
        tag[TAG_LEN - 1] ^= 0x80;

        let tampered = EncryptedKeyFile {
            tag: BASE64.encode(tag),
            ..sealed
        };

        assert!(decrypt_token(&tampered).is_err());
    }

    #[test]
    fn wrong_iv_length_rejected() {
        let mut sealed = seal_token("hf_token").unwrap();
        sealed.iv = BASE64.encode([0u8; 8]);
        let err = decrypt_token(&sealed).unwrap_err();
        assert!(matches!(err, KeyError::Decrypt(ref m) if m.contains("initialization vector")));
    }

    #[test]
    fn unsupported_key_length_rejected() {
        let mut sealed = seal_token("hf_token").unwrap();
        sealed.key = BASE64.encode([0u8; 24]);
        let err = decrypt_token(&sealed).unwrap_err();
        assert!(matches!(err, KeyError::Decrypt(ref m) if m.contains("unsupported key length")));
    }

    #[test]
    fn malformed_base64_rejected() {
        let mut sealed = seal_token("hf_token").unwrap();
        sealed.content = "not base64 !!!".into();
        let err = decrypt_token(&sealed).unwrap_err();
        assert!(matches!(err, KeyError::Decrypt(ref m) if m.contains("content")));
    }

    #[tokio::test]
    async fn obtain_token_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("encrypted_key.json");
        let sealed = seal_token("hf_live_token").unwrap();
        std::fs::write(&path, serde_json::to_string(&sealed).unwrap()).unwrap();

        let provider = KeyProvider::new(path.to_string_lossy().into_owned());
        let token = provider.obtain_token().await.unwrap();
        assert_eq!(token, "hf_live_token");
    }

    #[tokio::test]
    async fn missing_key_file_is_load_error() {
        let provider = KeyProvider::new("/nonexistent/encrypted_key.json");
        let err = provider.obtain_token().await.unwrap_err();
        assert!(matches!(err, KeyError::Load(_)));
    }
}
