//! bcrypt-pbkdf passphrase key derivation
//!
//! Turns a passphrase, salt and round count into `key || iv` material
//! for the cipher that wraps an OpenSSH private key section.

use tracing::debug;
use zeroize::Zeroizing;

use super::{CryptoContext, SecureBytes};
use crate::error::{Result, SshCryptError};

/// Upper bound on derived key + IV material
pub const KEY_MATERIAL_MAX: usize = 128;

/// Size of the buffer handed to an interactive passphrase callback
pub const PASSPHRASE_MAX: usize = 128;

pub const KDF_BCRYPT: &str = "bcrypt";
pub const KDF_NONE: &str = "none";

/// Supplies a passphrase on demand, e.g. by prompting on a terminal.
pub trait AuthCallback {
    /// Write the passphrase into `buf` and return its length.
    fn passphrase(&mut self, prompt: &str, buf: &mut [u8]) -> Result<usize>;
}

impl<F> AuthCallback for F
where
    F: FnMut(&str, &mut [u8]) -> Result<usize>,
{
    fn passphrase(&mut self, prompt: &str, buf: &mut [u8]) -> Result<usize> {
        self(prompt, buf)
    }
}

/// Where the passphrase comes from. A literal wins over a prompt.
pub enum Passphrase<'a> {
    None,
    Literal(&'a [u8]),
    Prompt(&'a mut dyn AuthCallback),
}

impl Passphrase<'_> {
    pub fn is_none(&self) -> bool {
        matches!(self, Passphrase::None)
    }
}

impl<'a> From<&'a str> for Passphrase<'a> {
    fn from(passphrase: &'a str) -> Self {
        Passphrase::Literal(passphrase.as_bytes())
    }
}

impl<'a> From<&'a [u8]> for Passphrase<'a> {
    fn from(passphrase: &'a [u8]) -> Self {
        Passphrase::Literal(passphrase)
    }
}

impl<'a> From<Option<&'a str>> for Passphrase<'a> {
    fn from(passphrase: Option<&'a str>) -> Self {
        passphrase.map_or(Passphrase::None, Passphrase::from)
    }
}

impl std::fmt::Debug for Passphrase<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self {
            Passphrase::None => "None",
            Passphrase::Literal(_) => "Literal([REDACTED])",
            Passphrase::Prompt(_) => "Prompt",
        };
        f.write_str(kind)
    }
}

/// Derive `out_len` bytes of key material.
///
/// # Errors
/// - `UnsupportedKdf` unless `kdf_name` is `"bcrypt"`
/// - `KeyMaterialTooLarge` if `out_len` exceeds [`KEY_MATERIAL_MAX`]
/// - `NoPassphrase` if neither a literal nor a prompt is available
/// - `Format` for zero rounds or an empty salt
pub fn derive_key(
    ctx: &CryptoContext,
    kdf_name: &str,
    passphrase: &mut Passphrase<'_>,
    salt: &[u8],
    rounds: u32,
    out_len: usize,
) -> Result<SecureBytes> {
    ctx.ensure_initialized()?;

    if kdf_name != KDF_BCRYPT {
        return Err(SshCryptError::UnsupportedKdf(kdf_name.to_string()));
    }
    if out_len > KEY_MATERIAL_MAX {
        return Err(SshCryptError::KeyMaterialTooLarge {
            needed: out_len,
            max: KEY_MATERIAL_MAX,
        });
    }
    if rounds == 0 {
        return Err(SshCryptError::format("bcrypt rounds must be positive"));
    }
    if salt.is_empty() {
        return Err(SshCryptError::format("empty bcrypt salt"));
    }

    debug!(out_len, rounds, salt_len = salt.len(), "deriving key material");

    // Wiped on drop, whichever way this function returns.
    let mut prompt_buf = Zeroizing::new([0u8; PASSPHRASE_MAX]);
    let secret: &[u8] = match passphrase {
        Passphrase::Literal(p) => *p,
        Passphrase::Prompt(callback) => {
            let len = callback.passphrase("Passphrase", &mut prompt_buf[..])?;
            if len > PASSPHRASE_MAX {
                return Err(SshCryptError::PassphraseTooLong(PASSPHRASE_MAX));
            }
            &prompt_buf[..len]
        }
        Passphrase::None => return Err(SshCryptError::NoPassphrase),
    };
    if secret.is_empty() {
        return Err(SshCryptError::NoPassphrase);
    }

    let mut output = SecureBytes::zeroed(out_len);
    bcrypt_pbkdf::bcrypt_pbkdf(secret, salt, rounds, &mut output)
        .map_err(|e| SshCryptError::Primitive(format!("bcrypt_pbkdf ({e})")))?;

    Ok(output)
}
