//! ChaCha20-Poly1305 as defined for `chacha20-poly1305@openssh.com`
//!
//! This is not the RFC 8439 AEAD. The 64-byte key is split in two:
//! - the main key (first half) encrypts the payload and yields the
//!   one-time Poly1305 key from keystream block 0;
//! - the header key (second half) encrypts only the 4-byte length field.
//!
//! Both ciphers use the packet sequence number as nonce, so nothing but
//! the keys survives from one packet to the next.

use chacha20::cipher::{KeyIvInit, StreamCipher};
use chacha20::{ChaCha20, Key, Nonce};
use poly1305::universal_hash::KeyInit;
use poly1305::Poly1305;
use subtle::ConstantTimeEq;
use tracing::{trace, warn};
use zeroize::Zeroizing;

use super::registry::{AEAD_LENGTH_FIELD, AEAD_TAG_LEN};
use crate::error::{Result, SshCryptError};

/// Length of each ChaCha20 sub-key
pub const CHACHA20_KEY_LEN: usize = 32;

/// ChaCha20 keystream block size
const CHACHA20_BLOCK_LEN: usize = 64;

/// Poly1305 one-time key length
const POLY1305_KEY_LEN: usize = 32;

/// Main cipher positioned for one packet, kept between
/// `decrypt_length` and `decrypt`.
struct PendingPacket {
    seq: u64,
    main: ChaCha20,
}

pub(crate) struct ChaChaPolyEngine {
    main_key: Zeroizing<[u8; CHACHA20_KEY_LEN]>,
    header_key: Zeroizing<[u8; CHACHA20_KEY_LEN]>,
    pending: Option<PendingPacket>,
}

impl ChaChaPolyEngine {
    pub(crate) fn new(key: &[u8]) -> Result<Self> {
        if key.len() != 2 * CHACHA20_KEY_LEN {
            return Err(SshCryptError::InvalidKeyLength {
                what: "chacha20-poly1305 key",
                expected: 2 * CHACHA20_KEY_LEN,
                got: key.len(),
            });
        }

        let mut main_key = Zeroizing::new([0u8; CHACHA20_KEY_LEN]);
        let mut header_key = Zeroizing::new([0u8; CHACHA20_KEY_LEN]);
        main_key.copy_from_slice(&key[..CHACHA20_KEY_LEN]);
        header_key.copy_from_slice(&key[CHACHA20_KEY_LEN..]);

        Ok(Self {
            main_key,
            header_key,
            pending: None,
        })
    }

    /// Header and main ciphers keyed for packet `seq`, both at block 0.
    fn start_packet(&self, seq: u64) -> (ChaCha20, ChaCha20) {
        let nonce = sequence_nonce(seq);
        let nonce = Nonce::from_slice(&nonce);
        let header = ChaCha20::new(Key::from_slice(&self.header_key[..]), nonce);
        let main = ChaCha20::new(Key::from_slice(&self.main_key[..]), nonce);
        (header, main)
    }

    /// `packet` is `length || payload`; `out` receives
    /// `enc_length || ciphertext || tag` and must be `packet.len() + 16`.
    pub(crate) fn encrypt(&mut self, packet: &[u8], out: &mut [u8], seq: u64) -> Result<()> {
        if packet.len() < AEAD_LENGTH_FIELD || out.len() != packet.len() + AEAD_TAG_LEN {
            return Err(SshCryptError::format(
                "chacha20-poly1305 packet buffer size mismatch",
            ));
        }

        let (mut header, mut main) = self.start_packet(seq);
        let poly = one_time_mac(&mut main)?;

        let (body, tag_out) = out.split_at_mut(packet.len());
        body.copy_from_slice(packet);

        let (length, payload) = body.split_at_mut(AEAD_LENGTH_FIELD);
        header.apply_keystream(length);
        // main is at block 1 after deriving the Poly1305 key
        main.apply_keystream(payload);

        let tag = poly.compute_unpadded(body);
        tag_out.copy_from_slice(&tag);
        Ok(())
    }

    /// Decrypt the length field of packet `seq` and keep the main cipher
    /// for the [`decrypt`](Self::decrypt) call that follows.
    pub(crate) fn decrypt_length(
        &mut self,
        header_in: &[u8],
        seq: u64,
    ) -> Result<[u8; AEAD_LENGTH_FIELD]> {
        let mut length = super::gcm::length_field(header_in)?;
        let (mut header, main) = self.start_packet(seq);
        header.apply_keystream(&mut length);
        self.pending = Some(PendingPacket { seq, main });
        Ok(length)
    }

    /// `packet` is `enc_length || ciphertext || tag`; `out.len()` is the
    /// ciphertext size. The tag is checked before anything is decrypted.
    pub(crate) fn decrypt(&mut self, packet: &[u8], out: &mut [u8], seq: u64) -> Result<()> {
        let mut pending = self.pending.take().ok_or(SshCryptError::UnsupportedOperation {
            cipher: "chacha20-poly1305@openssh.com",
            operation: "decryption before the length field is decrypted",
        })?;
        if pending.seq != seq {
            return Err(SshCryptError::OutOfSequence {
                expected: pending.seq,
                got: seq,
            });
        }

        let encrypted_size = out.len();
        let mac_start = AEAD_LENGTH_FIELD + encrypted_size;
        if packet.len() < mac_start + AEAD_TAG_LEN {
            return Err(SshCryptError::format(
                "chacha20-poly1305 packet shorter than declared size",
            ));
        }

        let poly = one_time_mac(&mut pending.main)?;
        let tag = poly.compute_unpadded(&packet[..mac_start]);
        let received = &packet[mac_start..mac_start + AEAD_TAG_LEN];
        if !bool::from(tag.as_slice().ct_eq(received)) {
            warn!(seq, "poly1305 verify error");
            return Err(SshCryptError::MacMismatch);
        }

        out.copy_from_slice(&packet[AEAD_LENGTH_FIELD..mac_start]);
        pending.main.apply_keystream(out);
        Ok(())
    }
}

/// 96-bit nonce: four zero bytes followed by the big-endian sequence number.
fn sequence_nonce(seq: u64) -> [u8; 12] {
    let mut nonce = [0u8; 12];
    nonce[4..].copy_from_slice(&seq.to_be_bytes());
    nonce
}

/// Consume keystream block 0 of `main` and key Poly1305 with its first 32 bytes.
fn one_time_mac(main: &mut ChaCha20) -> Result<Poly1305> {
    let mut block = Zeroizing::new([0u8; CHACHA20_BLOCK_LEN]);
    main.apply_keystream(&mut block[..]);
    Poly1305::new_from_slice(&block[..POLY1305_KEY_LEN]).map_err(|_| {
        trace!("poly1305 key setup failed");
        SshCryptError::Primitive("Poly1305 key setup".into())
    })
}
