//! Cryptographic primitives for sshcrypt
//!
//! This module provides:
//! - the cipher registry and per-direction cipher contexts
//! - CBC/CTR block modes, AES-GCM and OpenSSH ChaCha20-Poly1305
//! - bcrypt-pbkdf passphrase key derivation
//! - the process-wide random generator and secure memory handling

mod bcrypt;
mod block;
mod chacha;
mod cipher;
mod context;
mod gcm;
pub mod registry;
mod secure_bytes;

pub use bcrypt::{
    derive_key, AuthCallback, Passphrase, KDF_BCRYPT, KDF_NONE, KEY_MATERIAL_MAX, PASSPHRASE_MAX,
};
pub use cipher::{CipherContext, Direction};
pub use context::CryptoContext;
pub use registry::{lookup, CipherDescriptor, CipherKind};
pub use secure_bytes::SecureBytes;
