//! CBC and CTR modes over AES and 3DES
//!
//! The engine never pads: SSH packets are always a whole number of
//! blocks and padding belongs to the packet layer. CBC chaining state
//! carries over from one call to the next, and the decryptor never holds
//! back a trailing block, so every call returns its full output.

use aes::{Aes128, Aes192, Aes256};
use cbc::cipher::generic_array::GenericArray;
use cbc::cipher::consts::U16;
use cbc::cipher::{
    BlockCipher, BlockDecryptMut, BlockEncryptMut, BlockSizeUser, InvalidLength, KeyInit,
    KeyIvInit, StreamCipher,
};
use des::TdesEde3;
use tracing::trace;

use super::cipher::Direction;
use super::registry::BlockAlgorithm;
use crate::error::{Result, SshCryptError};

/// One keyed mode instance. Implementations are infallible once keyed.
trait Transform: Send {
    fn apply(&mut self, buf: &mut [u8]);
}

impl<C> Transform for cbc::Encryptor<C>
where
    C: BlockEncryptMut + BlockCipher + Send,
{
    fn apply(&mut self, buf: &mut [u8]) {
        for block in buf.chunks_exact_mut(C::block_size()) {
            self.encrypt_block_mut(GenericArray::from_mut_slice(block));
        }
    }
}

impl<C> Transform for cbc::Decryptor<C>
where
    C: BlockDecryptMut + BlockCipher + Send,
{
    fn apply(&mut self, buf: &mut [u8]) {
        for block in buf.chunks_exact_mut(C::block_size()) {
            self.decrypt_block_mut(GenericArray::from_mut_slice(block));
        }
    }
}

impl<C> Transform for ctr::Ctr128BE<C>
where
    C: BlockEncryptMut + BlockCipher + BlockSizeUser<BlockSize = U16> + Send,
{
    fn apply(&mut self, buf: &mut [u8]) {
        self.apply_keystream(buf);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BlockMode {
    Cbc,
    Ctr,
}

pub(crate) struct BlockEngine {
    transform: Box<dyn Transform>,
    mode: BlockMode,
    block_size: usize,
}

impl BlockEngine {
    /// Schedule `key`/`iv` for one direction. Both slices must already be
    /// trimmed to the algorithm's exact key and IV lengths.
    pub(crate) fn new(
        algorithm: BlockAlgorithm,
        mode: BlockMode,
        direction: Direction,
        key: &[u8],
        iv: &[u8],
    ) -> Result<Self> {
        let transform: Box<dyn Transform> = match (mode, algorithm) {
            (BlockMode::Cbc, BlockAlgorithm::Aes128) => cbc_mode::<Aes128>(direction, key, iv)?,
            (BlockMode::Cbc, BlockAlgorithm::Aes192) => cbc_mode::<Aes192>(direction, key, iv)?,
            (BlockMode::Cbc, BlockAlgorithm::Aes256) => cbc_mode::<Aes256>(direction, key, iv)?,
            (BlockMode::Cbc, BlockAlgorithm::TripleDes) => {
                cbc_mode::<TdesEde3>(direction, key, iv)?
            }
            #[cfg(feature = "blowfish")]
            (BlockMode::Cbc, BlockAlgorithm::Blowfish) => {
                cbc_mode::<blowfish::Blowfish>(direction, key, iv)?
            }
            (BlockMode::Ctr, BlockAlgorithm::Aes128) => ctr_mode::<Aes128>(key, iv)?,
            (BlockMode::Ctr, BlockAlgorithm::Aes192) => ctr_mode::<Aes192>(key, iv)?,
            (BlockMode::Ctr, BlockAlgorithm::Aes256) => ctr_mode::<Aes256>(key, iv)?,
            (BlockMode::Ctr, BlockAlgorithm::TripleDes) => {
                return Err(SshCryptError::Primitive("3DES counter mode setup".into()))
            }
            #[cfg(feature = "blowfish")]
            (BlockMode::Ctr, BlockAlgorithm::Blowfish) => {
                return Err(SshCryptError::Primitive("Blowfish counter mode setup".into()))
            }
        };

        let block_size = match algorithm {
            BlockAlgorithm::Aes128 | BlockAlgorithm::Aes192 | BlockAlgorithm::Aes256 => 16,
            _ => 8,
        };

        Ok(Self {
            transform,
            mode,
            block_size,
        })
    }

    /// Encrypt or decrypt `buf` in place, depending on how the engine was keyed.
    pub(crate) fn process(&mut self, buf: &mut [u8]) -> Result<()> {
        if self.mode == BlockMode::Cbc && buf.len() % self.block_size != 0 {
            trace!(
                len = buf.len(),
                block_size = self.block_size,
                "CBC input is not block aligned"
            );
            return Err(SshCryptError::NotBlockAligned {
                len: buf.len(),
                block_size: self.block_size,
            });
        }
        self.transform.apply(buf);
        Ok(())
    }
}

fn cbc_mode<C>(direction: Direction, key: &[u8], iv: &[u8]) -> Result<Box<dyn Transform>>
where
    C: BlockEncryptMut + BlockDecryptMut + BlockCipher + KeyInit + Send + 'static,
{
    let setup_failed = |e: InvalidLength| SshCryptError::Primitive(format!("CBC key setup ({e})"));
    Ok(match direction {
        Direction::Encrypt => {
            Box::new(cbc::Encryptor::<C>::new_from_slices(key, iv).map_err(setup_failed)?)
        }
        Direction::Decrypt => {
            Box::new(cbc::Decryptor::<C>::new_from_slices(key, iv).map_err(setup_failed)?)
        }
    })
}

fn ctr_mode<C>(key: &[u8], iv: &[u8]) -> Result<Box<dyn Transform>>
where
    C: BlockEncryptMut + BlockCipher + BlockSizeUser<BlockSize = U16> + KeyInit + Send + 'static,
{
    let ctr = ctr::Ctr128BE::<C>::new_from_slices(key, iv)
        .map_err(|e: InvalidLength| SshCryptError::Primitive(format!("CTR key setup ({e})")))?;
    Ok(Box::new(ctr))
}
