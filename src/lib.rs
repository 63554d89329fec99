//! sshcrypt - SSH transport ciphers and OpenSSH private key containers
//!
//! This crate provides:
//! - A registry of the SSH transport ciphers (AES CBC/CTR, 3DES-CBC,
//!   AES-GCM and ChaCha20-Poly1305 as specified by OpenSSH)
//! - Per-direction cipher contexts for packet encryption and decryption
//! - Import and export of `openssh-key-v1` private keys, optionally
//!   protected by a bcrypt-pbkdf derived passphrase key

pub mod crypto;
pub mod error;
pub mod pki;

pub use crypto::{CipherContext, CryptoContext, Direction, Passphrase};
pub use error::{ErrorKind, Result, SshCryptError};
pub use pki::{export_private_key, import_private_key, import_public_key, ExportOptions};
