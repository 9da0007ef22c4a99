//! Security module for emberchat — encrypted-key loading and decryption.

pub mod keys;

pub use keys::{decrypt_token, seal_token, EncryptedKeyFile, KeyProvider};
