//! Show the container parameters of a private key file

use std::path::Path;

use anyhow::Context;
use colored::Colorize;
use serde::Serialize;

use sshcrypt::pki::PrivateKeyContainer;

use super::read_key_file;

#[derive(Debug, Serialize)]
struct KeyInfo {
    file: String,
    cipher: String,
    kdf: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    rounds: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    salt: Option<String>,
    key_type: String,
    fingerprint: String,
}

pub fn run(path: &Path, json: bool) -> anyhow::Result<()> {
    let text = read_key_file(path)?;
    let container = PrivateKeyContainer::from_armored(&text)
        .with_context(|| format!("cannot parse {}", path.display()))?;
    let public = container.public_key()?;
    let kdf = container.kdf_options()?;

    let info = KeyInfo {
        file: path.display().to_string(),
        cipher: container.cipher_name().to_string(),
        kdf: container.kdf_name().to_string(),
        rounds: kdf.as_ref().map(|k| k.rounds),
        salt: kdf.as_ref().map(|k| hex::encode(&k.salt)),
        key_type: public.key_type().to_string(),
        fingerprint: public.fingerprint(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    println!("{}", info.file.cyan().bold());
    println!("  key type:    {}", info.key_type);
    println!("  fingerprint: {}", info.fingerprint);
    if container.is_encrypted() {
        println!("  cipher:      {}", info.cipher.green());
    } else {
        println!("  cipher:      {}", info.cipher.yellow());
    }
    println!("  kdf:         {}", info.kdf);
    if let (Some(rounds), Some(salt)) = (&info.rounds, &info.salt) {
        println!("  rounds:      {rounds}");
        println!("  salt:        {}", salt.dimmed());
    }
    Ok(())
}
