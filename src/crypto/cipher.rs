//! Per-direction cipher state
//!
//! A [`CipherContext`] is created from a registry descriptor and raw key
//! material, used for one direction of one connection, and dropped (or
//! handed to [`CipherContext::cleanup`]) when the keys are replaced.

use tracing::debug;

use super::block::{BlockEngine, BlockMode};
use super::chacha::ChaChaPolyEngine;
use super::gcm::GcmEngine;
use super::registry::{CipherDescriptor, CipherKind, AEAD_LENGTH_FIELD};
use super::CryptoContext;
use crate::error::{Result, SshCryptError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Encrypt,
    Decrypt,
}

enum CipherState {
    Block(BlockEngine),
    Gcm(GcmEngine),
    ChaChaPoly(ChaChaPolyEngine),
    #[cfg(feature = "insecure-none")]
    None,
}

pub struct CipherContext {
    descriptor: &'static CipherDescriptor,
    direction: Direction,
    state: CipherState,
}

impl CipherContext {
    pub fn set_encrypt_key(
        ctx: &CryptoContext,
        descriptor: &'static CipherDescriptor,
        key: &[u8],
        iv: &[u8],
    ) -> Result<Self> {
        Self::new(ctx, descriptor, Direction::Encrypt, key, iv)
    }

    pub fn set_decrypt_key(
        ctx: &CryptoContext,
        descriptor: &'static CipherDescriptor,
        key: &[u8],
        iv: &[u8],
    ) -> Result<Self> {
        Self::new(ctx, descriptor, Direction::Decrypt, key, iv)
    }

    /// Key and IV may be longer than the descriptor requires; only the
    /// leading bytes are used.
    pub fn new(
        ctx: &CryptoContext,
        descriptor: &'static CipherDescriptor,
        direction: Direction,
        key: &[u8],
        iv: &[u8],
    ) -> Result<Self> {
        ctx.ensure_initialized()?;

        let key = leading(key, descriptor.key_len(), "key")?;
        let iv = leading(iv, descriptor.iv_size, "IV")?;

        let state = match descriptor.kind {
            CipherKind::Cbc(algorithm) => {
                CipherState::Block(BlockEngine::new(algorithm, BlockMode::Cbc, direction, key, iv)?)
            }
            CipherKind::Ctr(algorithm) => {
                CipherState::Block(BlockEngine::new(algorithm, BlockMode::Ctr, direction, key, iv)?)
            }
            CipherKind::Gcm => CipherState::Gcm(GcmEngine::new(key, iv)?),
            CipherKind::ChaCha20Poly1305 => CipherState::ChaChaPoly(ChaChaPolyEngine::new(key)?),
            #[cfg(feature = "insecure-none")]
            CipherKind::None => CipherState::None,
        };

        debug!(cipher = descriptor.name, ?direction, "cipher keyed");

        Ok(Self {
            descriptor,
            direction,
            state,
        })
    }

    pub fn descriptor(&self) -> &'static CipherDescriptor {
        self.descriptor
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Encrypt `buf` in place. Block ciphers only.
    pub fn encrypt(&mut self, buf: &mut [u8]) -> Result<()> {
        self.expect_direction(Direction::Encrypt)?;
        self.block_process(buf, "encryption")
    }

    /// Decrypt `buf` in place. Block ciphers only.
    pub fn decrypt(&mut self, buf: &mut [u8]) -> Result<()> {
        self.expect_direction(Direction::Decrypt)?;
        self.block_process(buf, "decryption")
    }

    fn block_process(&mut self, buf: &mut [u8], operation: &'static str) -> Result<()> {
        match &mut self.state {
            CipherState::Block(engine) => engine.process(buf),
            #[cfg(feature = "insecure-none")]
            CipherState::None => Ok(()),
            _ => Err(self.unsupported(operation)),
        }
    }

    /// Seal one packet. `packet` is `length || payload`; `out` receives
    /// the wire form followed by the tag and must be
    /// `packet.len() + tag_size` bytes.
    pub fn aead_encrypt(&mut self, packet: &[u8], out: &mut [u8], seq: u64) -> Result<()> {
        self.expect_direction(Direction::Encrypt)?;
        match &mut self.state {
            CipherState::Gcm(engine) => engine.encrypt(packet, out),
            CipherState::ChaChaPoly(engine) => engine.encrypt(packet, out, seq),
            _ => Err(self.unsupported("AEAD encryption")),
        }
    }

    /// Recover the plaintext packet length from the first bytes on the wire.
    pub fn aead_decrypt_length(
        &mut self,
        header: &[u8],
        seq: u64,
    ) -> Result<[u8; AEAD_LENGTH_FIELD]> {
        self.expect_direction(Direction::Decrypt)?;
        match &mut self.state {
            CipherState::Gcm(engine) => engine.decrypt_length(header),
            CipherState::ChaChaPoly(engine) => engine.decrypt_length(header, seq),
            _ => Err(self.unsupported("AEAD length decryption")),
        }
    }

    /// Authenticate and decrypt one packet. `packet` is
    /// `length || ciphertext || tag`; `out.len()` is the ciphertext size.
    /// On any error `out` holds no plaintext.
    pub fn aead_decrypt(&mut self, packet: &[u8], out: &mut [u8], seq: u64) -> Result<()> {
        self.expect_direction(Direction::Decrypt)?;
        match &mut self.state {
            CipherState::Gcm(engine) => engine.decrypt(packet, out),
            CipherState::ChaChaPoly(engine) => engine.decrypt(packet, out, seq),
            _ => Err(self.unsupported("AEAD decryption")),
        }
    }

    /// Release the key schedule. Dropping the context has the same effect;
    /// every engine wipes its key material on drop.
    pub fn cleanup(self) {
        debug!(cipher = self.descriptor.name, direction = ?self.direction, "cipher released");
    }

    fn expect_direction(&self, expected: Direction) -> Result<()> {
        if self.direction == expected {
            return Ok(());
        }
        Err(SshCryptError::UnsupportedOperation {
            cipher: self.descriptor.name,
            operation: match self.direction {
                Direction::Encrypt => "decryption with an encryption context",
                Direction::Decrypt => "encryption with a decryption context",
            },
        })
    }

    fn unsupported(&self, operation: &'static str) -> SshCryptError {
        SshCryptError::UnsupportedOperation {
            cipher: self.descriptor.name,
            operation,
        }
    }
}

impl std::fmt::Debug for CipherContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CipherContext")
            .field("cipher", &self.descriptor.name)
            .field("direction", &self.direction)
            .finish_non_exhaustive()
    }
}

fn leading<'a>(material: &'a [u8], len: usize, what: &'static str) -> Result<&'a [u8]> {
    material.get(..len).ok_or(SshCryptError::InvalidKeyLength {
        what,
        expected: len,
        got: material.len(),
    })
}
