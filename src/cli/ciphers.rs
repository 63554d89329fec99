//! List the registered transport ciphers

use colored::Colorize;

use sshcrypt::crypto::registry;

pub fn run() -> anyhow::Result<()> {
    println!(
        "{:<32} {:>5} {:>8} {:>4} {:>4}",
        "NAME".bold(),
        "BLOCK".bold(),
        "KEY".bold(),
        "IV".bold(),
        "TAG".bold()
    );
    for descriptor in registry::all() {
        let name = if descriptor.is_aead() {
            descriptor.name.cyan()
        } else {
            descriptor.name.normal()
        };
        println!(
            "{:<32} {:>5} {:>8} {:>4} {:>4}",
            name,
            descriptor.block_size,
            descriptor.key_size_bits,
            descriptor.iv_size,
            descriptor.tag_size
        );
    }
    Ok(())
}
