//! OpenSSH key formats
//!
//! Ed25519 key blobs and the `openssh-key-v1` private key container,
//! with bcrypt-pbkdf passphrase protection.

mod container;
mod keys;
mod wire;

pub use container::{
    export_private_key, import_private_key, import_public_key, ExportOptions, KdfOptions,
    PrivateKeyContainer, AUTH_MAGIC, CIPHER_NONE, DEFAULT_CIPHER, DEFAULT_ROUNDS,
    OPENSSH_HEADER_BEGIN, OPENSSH_HEADER_END, SALT_LEN,
};
pub use keys::{PrivateKey, PublicKey, ED25519_KEY_TYPE};
