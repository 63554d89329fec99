//! AES-GCM as used by `aes128-gcm@openssh.com` / `aes256-gcm@openssh.com`
//!
//! The packet length field travels in clear and is authenticated as
//! associated data. The 12-byte IV is a 4-byte fixed field followed by a
//! 64-bit big-endian invocation counter, bumped after every packet.

use aes_gcm::aead::generic_array::GenericArray;
use aes_gcm::aead::{AeadInPlace, KeyInit};
use aes_gcm::{Aes128Gcm, Aes256Gcm};
use tracing::{trace, warn};
use zeroize::Zeroize;

use super::registry::{AEAD_LENGTH_FIELD, AEAD_TAG_LEN};
use crate::error::{Result, SshCryptError};

pub const GCM_IV_LEN: usize = 12;

enum GcmKey {
    Aes128(Aes128Gcm),
    Aes256(Aes256Gcm),
}

pub(crate) struct GcmEngine {
    key: GcmKey,
    last_iv: [u8; GCM_IV_LEN],
}

impl GcmEngine {
    pub(crate) fn new(key: &[u8], iv: &[u8]) -> Result<Self> {
        let setup_failed = |_| SshCryptError::Primitive("GCM key setup".into());
        let key = match key.len() {
            16 => GcmKey::Aes128(Aes128Gcm::new_from_slice(key).map_err(setup_failed)?),
            32 => GcmKey::Aes256(Aes256Gcm::new_from_slice(key).map_err(setup_failed)?),
            got => {
                return Err(SshCryptError::InvalidKeyLength {
                    what: "GCM key",
                    expected: 16,
                    got,
                })
            }
        };

        let last_iv: [u8; GCM_IV_LEN] =
            iv.try_into().map_err(|_| SshCryptError::InvalidKeyLength {
                what: "GCM IV",
                expected: GCM_IV_LEN,
                got: iv.len(),
            })?;

        Ok(Self { key, last_iv })
    }

    /// The length field is not encrypted, only authenticated.
    pub(crate) fn decrypt_length(&self, header: &[u8]) -> Result<[u8; AEAD_LENGTH_FIELD]> {
        length_field(header)
    }

    /// `packet` is `length || plaintext`; `out` receives
    /// `length || ciphertext || tag` and must be exactly `packet.len() + 16`.
    pub(crate) fn encrypt(&mut self, packet: &[u8], out: &mut [u8]) -> Result<()> {
        let result = self.seal(packet, out);
        self.increment_iv();
        if result.is_err() {
            out.zeroize();
        }
        result
    }

    /// `packet` is `length || ciphertext || tag`; `out` receives the
    /// plaintext payload and its length selects the ciphertext size.
    pub(crate) fn decrypt(&mut self, packet: &[u8], out: &mut [u8]) -> Result<()> {
        let result = self.open(packet, out);
        self.increment_iv();
        if result.is_err() {
            out.zeroize();
        }
        result
    }

    fn seal(&self, packet: &[u8], out: &mut [u8]) -> Result<()> {
        if packet.len() < AEAD_LENGTH_FIELD || out.len() != packet.len() + AEAD_TAG_LEN {
            return Err(SshCryptError::format("GCM packet buffer size mismatch"));
        }
        let (aad, plaintext) = packet.split_at(AEAD_LENGTH_FIELD);
        let (body, tag_out) = out.split_at_mut(packet.len());
        body.copy_from_slice(packet);

        let nonce = GenericArray::from_slice(&self.last_iv);
        let payload = &mut body[AEAD_LENGTH_FIELD..];
        debug_assert_eq!(payload.len(), plaintext.len());
        let tag = match &self.key {
            GcmKey::Aes128(c) => c.encrypt_in_place_detached(nonce, aad, payload),
            GcmKey::Aes256(c) => c.encrypt_in_place_detached(nonce, aad, payload),
        }
        .map_err(|_| {
            trace!("AES-GCM encryption failed");
            SshCryptError::Primitive("AES-GCM encryption".into())
        })?;
        tag_out.copy_from_slice(&tag);
        Ok(())
    }

    fn open(&self, packet: &[u8], out: &mut [u8]) -> Result<()> {
        let encrypted_size = out.len();
        if packet.len() < AEAD_LENGTH_FIELD + encrypted_size + AEAD_TAG_LEN {
            return Err(SshCryptError::format("GCM packet shorter than declared size"));
        }
        let aad = &packet[..AEAD_LENGTH_FIELD];
        let ciphertext = &packet[AEAD_LENGTH_FIELD..AEAD_LENGTH_FIELD + encrypted_size];
        let tag_start = AEAD_LENGTH_FIELD + encrypted_size;
        let tag = GenericArray::from_slice(&packet[tag_start..tag_start + AEAD_TAG_LEN]);

        out.copy_from_slice(ciphertext);
        let nonce = GenericArray::from_slice(&self.last_iv);
        match &self.key {
            GcmKey::Aes128(c) => c.decrypt_in_place_detached(nonce, aad, out, tag),
            GcmKey::Aes256(c) => c.decrypt_in_place_detached(nonce, aad, out, tag),
        }
        .map_err(|_| {
            warn!("AES-GCM authentication failed");
            SshCryptError::MacMismatch
        })
    }

    fn increment_iv(&mut self) {
        let mut counter = [0u8; 8];
        counter.copy_from_slice(&self.last_iv[4..]);
        let next = u64::from_be_bytes(counter).wrapping_add(1);
        self.last_iv[4..].copy_from_slice(&next.to_be_bytes());
    }

    #[cfg(test)]
    fn last_iv(&self) -> [u8; GCM_IV_LEN] {
        self.last_iv
    }
}

impl Drop for GcmEngine {
    fn drop(&mut self) {
        self.last_iv.zeroize();
    }
}

pub(crate) fn length_field(header: &[u8]) -> Result<[u8; AEAD_LENGTH_FIELD]> {
    header
        .get(..AEAD_LENGTH_FIELD)
        .and_then(|field| field.try_into().ok())
        .ok_or_else(|| SshCryptError::format("packet shorter than the length field"))
}
