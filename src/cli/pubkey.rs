//! Print the public key of a private key file

use std::path::Path;

use anyhow::Context;

use sshcrypt::import_public_key;

use super::read_key_file;

pub fn run(path: &Path, comment: &str) -> anyhow::Result<()> {
    let text = read_key_file(path)?;
    let public = import_public_key(&text)
        .with_context(|| format!("cannot read the public key in {}", path.display()))?;

    // Plain output so it can be appended to authorized_keys directly.
    println!("{}", public.to_openssh(comment));
    Ok(())
}
