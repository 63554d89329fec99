//! CLI command implementations

pub mod change_pass;
pub mod ciphers;
pub mod inspect;
pub mod pubkey;

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use colored::Colorize;
use secrecy::{ExposeSecret, SecretString};
use zeroize::Zeroizing;

use sshcrypt::crypto::{AuthCallback, CryptoContext};
use sshcrypt::SshCryptError;

/// Passphrase for the key being opened, read instead of prompting when set.
pub const PASSPHRASE_ENV: &str = "SSHCRYPT_PASSPHRASE";

/// New passphrase for `passwd`, read instead of prompting when set.
pub const NEW_PASSPHRASE_ENV: &str = "SSHCRYPT_NEW_PASSPHRASE";

pub fn crypto_context() -> anyhow::Result<CryptoContext> {
    CryptoContext::initialized().context("cannot initialize the random generator")
}

pub fn read_key_file(path: &Path) -> anyhow::Result<Zeroizing<String>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("cannot read {}", path.display()))?;
    Ok(Zeroizing::new(text))
}

/// Write an armored private key readable only by the owner.
pub fn write_key_file(path: &Path, armored: &str) -> anyhow::Result<()> {
    let tmp = PathBuf::from(format!("{}.tmp", path.display()));
    {
        let mut file = File::create(&tmp)
            .with_context(|| format!("cannot create {}", tmp.display()))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&tmp, fs::Permissions::from_mode(0o600))?;
        }

        file.write_all(armored.as_bytes())?;
        file.sync_all()?;
    }
    fs::rename(&tmp, path).with_context(|| format!("cannot replace {}", path.display()))?;
    Ok(())
}

/// Asks for the passphrase of an existing key file, only when the key
/// turns out to be encrypted.
pub struct TerminalPrompt {
    label: String,
}

impl TerminalPrompt {
    pub fn for_file(path: &Path) -> Self {
        Self {
            label: path.display().to_string(),
        }
    }
}

impl AuthCallback for TerminalPrompt {
    fn passphrase(&mut self, prompt: &str, buf: &mut [u8]) -> sshcrypt::Result<usize> {
        let secret = match std::env::var(PASSPHRASE_ENV) {
            Ok(value) => SecretString::new(value),
            Err(_) => SecretString::new(rpassword::prompt_password(format!(
                "{prompt} for {}: ",
                self.label
            ))?),
        };

        let bytes = secret.expose_secret().as_bytes();
        if bytes.len() > buf.len() {
            return Err(SshCryptError::PassphraseTooLong(buf.len()));
        }
        buf[..bytes.len()].copy_from_slice(bytes);
        Ok(bytes.len())
    }
}

/// Ask for a new passphrase with confirmation. An empty answer means
/// the key is stored unencrypted.
pub fn prompt_new_passphrase() -> anyhow::Result<Option<SecretString>> {
    if let Ok(value) = std::env::var(NEW_PASSPHRASE_ENV) {
        return Ok((!value.is_empty()).then(|| SecretString::new(value)));
    }

    loop {
        let passphrase =
            SecretString::new(rpassword::prompt_password("New passphrase (empty for none): ")?);
        let confirm = SecretString::new(rpassword::prompt_password("Confirm new passphrase: ")?);

        if passphrase.expose_secret() != confirm.expose_secret() {
            println!("{} Passphrases do not match", "Error:".red());
            continue;
        }
        if passphrase.expose_secret().is_empty() {
            return Ok(None);
        }
        if passphrase.expose_secret().len() > sshcrypt::crypto::PASSPHRASE_MAX {
            bail!(
                "passphrase longer than {} bytes",
                sshcrypt::crypto::PASSPHRASE_MAX
            );
        }
        return Ok(Some(passphrase));
    }
}
