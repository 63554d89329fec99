//! Change the passphrase of a private key file

use std::io::Write;
use std::path::Path;

use anyhow::Context;
use colored::Colorize;
use secrecy::ExposeSecret;

use sshcrypt::{export_private_key, import_private_key, ExportOptions, Passphrase};

use super::{crypto_context, prompt_new_passphrase, read_key_file, write_key_file, TerminalPrompt};

pub fn run(path: &Path, cipher: String, rounds: u32, no_passphrase: bool) -> anyhow::Result<()> {
    let options = ExportOptions { cipher, rounds };
    if !no_passphrase {
        // Fail on a bad cipher before asking for anything.
        options.cipher_descriptor()?;
    }

    let ctx = crypto_context()?;
    let text = read_key_file(path)?;

    println!("{}", "=== Change passphrase ===".cyan().bold());

    let mut prompt = TerminalPrompt::for_file(path);
    let key = import_private_key(&ctx, &text, Passphrase::Prompt(&mut prompt))
        .with_context(|| format!("cannot open {}", path.display()))?;

    let new_passphrase = if no_passphrase {
        None
    } else {
        prompt_new_passphrase()?
    };
    let passphrase = match &new_passphrase {
        Some(secret) => Passphrase::Literal(secret.expose_secret().as_bytes()),
        None => Passphrase::None,
    };

    print!("{}", "Re-encrypting key... ".cyan());
    std::io::stdout().flush()?;
    let armored = export_private_key(&ctx, &key, passphrase, &options)?;
    write_key_file(path, &armored)?;
    println!("{}", "done".green());

    if new_passphrase.is_none() {
        println!("{}", "Key is now stored without a passphrase.".yellow());
    } else {
        println!(
            "{} ({}, {} rounds)",
            "Passphrase changed.".green().bold(),
            options.cipher,
            options.rounds
        );
    }

    ctx.finalize();
    Ok(())
}
