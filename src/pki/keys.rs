//! Ed25519 keys and their OpenSSH blob encoding
//!
//! Public blob:  `string "ssh-ed25519"`, `string pk[32]`
//! Private blob: `string "ssh-ed25519"`, `string pk[32]`, `string seed[32] || pk[32]`

use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD};
use base64::Engine as _;
use ed25519_dalek::{SigningKey, VerifyingKey, PUBLIC_KEY_LENGTH, SECRET_KEY_LENGTH};
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use super::wire::{Reader, Writer};
use crate::error::{Result, SshCryptError};

pub const ED25519_KEY_TYPE: &str = "ssh-ed25519";

/// An Ed25519 private key. The signing key wipes itself on drop.
pub struct PrivateKey {
    signing_key: SigningKey,
}

impl PrivateKey {
    pub fn from_seed(seed: &[u8; SECRET_KEY_LENGTH]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(seed),
        }
    }

    pub fn key_type(&self) -> &'static str {
        ED25519_KEY_TYPE
    }

    pub fn public_key(&self) -> PublicKey {
        PublicKey {
            verifying_key: self.signing_key.verifying_key(),
        }
    }

    /// Append the private blob to `w`.
    pub(crate) fn write_private_blob(&self, w: &mut Writer) {
        let keypair = Zeroizing::new(self.signing_key.to_keypair_bytes());
        w.put_string(ED25519_KEY_TYPE.as_bytes())
            .put_string(self.signing_key.verifying_key().as_bytes())
            .put_string(&keypair[..]);
    }

    /// Read a private blob. The embedded public key must match the one
    /// derived from the seed.
    pub(crate) fn read_private_blob(r: &mut Reader<'_>) -> Result<Self> {
        let key_type = r.read_str()?;
        if key_type != ED25519_KEY_TYPE {
            return Err(SshCryptError::format(format!(
                "unsupported private key type {key_type:?}"
            )));
        }
        let public = r.read_string()?;
        let keypair = r.read_string()?;
        if public.len() != PUBLIC_KEY_LENGTH || keypair.len() != SECRET_KEY_LENGTH + PUBLIC_KEY_LENGTH
        {
            return Err(SshCryptError::format("malformed ssh-ed25519 private key"));
        }

        let mut seed = Zeroizing::new([0u8; SECRET_KEY_LENGTH]);
        seed.copy_from_slice(&keypair[..SECRET_KEY_LENGTH]);
        let key = Self::from_seed(&seed);

        let derived = key.signing_key.verifying_key();
        if derived.as_bytes()[..] != public[..] || keypair[SECRET_KEY_LENGTH..] != public[..] {
            return Err(SshCryptError::format(
                "ssh-ed25519 private key does not match its public key",
            ));
        }
        Ok(key)
    }
}

impl std::fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrivateKey")
            .field("type", &ED25519_KEY_TYPE)
            .field("public", &self.public_key().fingerprint())
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKey {
    verifying_key: VerifyingKey,
}

impl PublicKey {
    pub fn key_type(&self) -> &'static str {
        ED25519_KEY_TYPE
    }

    pub fn as_bytes(&self) -> &[u8; PUBLIC_KEY_LENGTH] {
        self.verifying_key.as_bytes()
    }

    pub fn from_blob(blob: &[u8]) -> Result<Self> {
        let mut r = Reader::new(blob, "public key blob");
        let key_type = r.read_str()?;
        if key_type != ED25519_KEY_TYPE {
            return Err(SshCryptError::format(format!(
                "unsupported public key type {key_type:?}"
            )));
        }
        let raw: [u8; PUBLIC_KEY_LENGTH] = r
            .read_string()?
            .try_into()
            .map_err(|_| SshCryptError::format("malformed ssh-ed25519 public key"))?;
        r.finish()?;

        let verifying_key = VerifyingKey::from_bytes(&raw)
            .map_err(|_| SshCryptError::format("ssh-ed25519 public key is not a curve point"))?;
        Ok(Self { verifying_key })
    }

    pub fn to_blob(&self) -> Vec<u8> {
        let mut w = Writer::new();
        w.put_string(ED25519_KEY_TYPE.as_bytes())
            .put_string(self.verifying_key.as_bytes());
        w.into_vec()
    }

    /// `authorized_keys` form: `ssh-ed25519 <base64> [comment]`
    pub fn to_openssh(&self, comment: &str) -> String {
        let encoded = STANDARD.encode(self.to_blob());
        if comment.is_empty() {
            format!("{ED25519_KEY_TYPE} {encoded}")
        } else {
            format!("{ED25519_KEY_TYPE} {encoded} {comment}")
        }
    }

    /// `SHA256:` fingerprint as printed by `ssh-keygen -l`.
    pub fn fingerprint(&self) -> String {
        let digest = Sha256::digest(self.to_blob());
        format!("SHA256:{}", STANDARD_NO_PAD.encode(digest))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> PrivateKey {
        PrivateKey::from_seed(&[0x24u8; 32])
    }

    #[test]
    fn test_private_blob_roundtrip() {
        let original = key();
        let mut w = Writer::new();
        original.write_private_blob(&mut w);

        let mut r = Reader::new(w.as_slice(), "test");
        let restored = PrivateKey::read_private_blob(&mut r).unwrap();
        assert_eq!(r.remaining(), 0);
        assert_eq!(restored.public_key(), original.public_key());
    }

    #[test]
    fn test_mismatched_public_half_rejected() {
        let mut w = Writer::new();
        key().write_private_blob(&mut w);
        let mut blob = w.into_vec();
        // last byte of the embedded public key inside the keypair string
        let last = blob.len() - 1;
        blob[last] ^= 1;

        let mut r = Reader::new(&blob, "test");
        assert!(matches!(
            PrivateKey::read_private_blob(&mut r),
            Err(SshCryptError::Format(_))
        ));
    }

    #[test]
    fn test_unknown_key_type_rejected() {
        let mut w = Writer::new();
        w.put_string(b"ssh-rsa").put_string(&[1, 0, 1]);
        assert!(PublicKey::from_blob(w.as_slice()).is_err());
    }

    #[test]
    fn test_public_blob_roundtrip() {
        let public = key().public_key();
        let blob = public.to_blob();
        assert_eq!(blob.len(), 4 + 11 + 4 + 32);
        assert_eq!(PublicKey::from_blob(&blob).unwrap(), public);
    }

    #[test]
    fn test_openssh_line_and_fingerprint() {
        let public = key().public_key();
        let line = public.to_openssh("user@host");
        assert!(line.starts_with("ssh-ed25519 AAAAC3NzaC1lZDI1NTE5AAAAI"));
        assert!(line.ends_with(" user@host"));
        assert_eq!(public.to_openssh("").split(' ').count(), 2);

        let fp = public.fingerprint();
        assert!(fp.starts_with("SHA256:"));
        assert_eq!(fp.len(), "SHA256:".len() + 43);
    }
}
