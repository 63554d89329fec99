//! Cipher registry
//!
//! Immutable table of the symmetric algorithms this crate can drive,
//! looked up by their exact SSH wire name.

use std::collections::HashMap;
use std::sync::OnceLock;

use crate::error::{Result, SshCryptError};

/// Length of the packet length field authenticated by the AEAD modes.
pub const AEAD_LENGTH_FIELD: usize = 4;

/// AES-GCM and Poly1305 tag length.
pub const AEAD_TAG_LEN: usize = 16;

/// Underlying block primitive of a CBC/CTR descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockAlgorithm {
    Aes128,
    Aes192,
    Aes256,
    TripleDes,
    #[cfg(feature = "blowfish")]
    Blowfish,
}

/// Operation family of a descriptor. Block kinds expose
/// `encrypt`/`decrypt`; AEAD kinds expose the `aead_*` triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CipherKind {
    Cbc(BlockAlgorithm),
    Ctr(BlockAlgorithm),
    Gcm,
    ChaCha20Poly1305,
    #[cfg(feature = "insecure-none")]
    None,
}

#[derive(Debug, PartialEq, Eq)]
pub struct CipherDescriptor {
    pub name: &'static str,
    pub block_size: usize,
    pub key_size_bits: usize,
    pub iv_size: usize,
    pub tag_size: usize,
    pub aad_field_size: usize,
    pub kind: CipherKind,
}

impl CipherDescriptor {
    /// Key length in bytes.
    pub fn key_len(&self) -> usize {
        self.key_size_bits / 8
    }

    pub fn is_aead(&self) -> bool {
        matches!(self.kind, CipherKind::Gcm | CipherKind::ChaCha20Poly1305)
    }
}

const fn block(
    name: &'static str,
    block_size: usize,
    key_size_bits: usize,
    kind: CipherKind,
) -> CipherDescriptor {
    CipherDescriptor {
        name,
        block_size,
        key_size_bits,
        iv_size: block_size,
        tag_size: 0,
        aad_field_size: 0,
        kind,
    }
}

static CIPHERS: &[CipherDescriptor] = &[
    CipherDescriptor {
        name: "chacha20-poly1305@openssh.com",
        block_size: 8,
        key_size_bits: 512,
        iv_size: 0,
        tag_size: AEAD_TAG_LEN,
        aad_field_size: AEAD_LENGTH_FIELD,
        kind: CipherKind::ChaCha20Poly1305,
    },
    CipherDescriptor {
        name: "aes256-gcm@openssh.com",
        block_size: 16,
        key_size_bits: 256,
        iv_size: 12,
        tag_size: AEAD_TAG_LEN,
        aad_field_size: AEAD_LENGTH_FIELD,
        kind: CipherKind::Gcm,
    },
    CipherDescriptor {
        name: "aes128-gcm@openssh.com",
        block_size: 16,
        key_size_bits: 128,
        iv_size: 12,
        tag_size: AEAD_TAG_LEN,
        aad_field_size: AEAD_LENGTH_FIELD,
        kind: CipherKind::Gcm,
    },
    block("aes256-ctr", 16, 256, CipherKind::Ctr(BlockAlgorithm::Aes256)),
    block("aes192-ctr", 16, 192, CipherKind::Ctr(BlockAlgorithm::Aes192)),
    block("aes128-ctr", 16, 128, CipherKind::Ctr(BlockAlgorithm::Aes128)),
    block("aes256-cbc", 16, 256, CipherKind::Cbc(BlockAlgorithm::Aes256)),
    block("aes192-cbc", 16, 192, CipherKind::Cbc(BlockAlgorithm::Aes192)),
    block("aes128-cbc", 16, 128, CipherKind::Cbc(BlockAlgorithm::Aes128)),
    block("3des-cbc", 8, 192, CipherKind::Cbc(BlockAlgorithm::TripleDes)),
    #[cfg(feature = "blowfish")]
    block("blowfish-cbc", 8, 128, CipherKind::Cbc(BlockAlgorithm::Blowfish)),
    #[cfg(feature = "insecure-none")]
    CipherDescriptor {
        name: "none",
        block_size: 8,
        key_size_bits: 0,
        iv_size: 0,
        tag_size: 0,
        aad_field_size: 0,
        kind: CipherKind::None,
    },
];

fn index() -> &'static HashMap<&'static str, &'static CipherDescriptor> {
    static INDEX: OnceLock<HashMap<&'static str, &'static CipherDescriptor>> = OnceLock::new();
    INDEX.get_or_init(|| CIPHERS.iter().map(|d| (d.name, d)).collect())
}

/// Find a descriptor by exact name.
pub fn lookup(name: &str) -> Option<&'static CipherDescriptor> {
    index().get(name).copied()
}

/// Like [`lookup`], but unknown names become a configuration error.
pub fn descriptor_for(name: &str) -> Result<&'static CipherDescriptor> {
    lookup(name).ok_or_else(|| SshCryptError::UnknownCipher(name.to_string()))
}

/// All registered descriptors, strongest first.
pub fn all() -> &'static [CipherDescriptor] {
    CIPHERS
}
