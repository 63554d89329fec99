use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};
use colored::Colorize;

use sshcrypt::pki::{DEFAULT_CIPHER, DEFAULT_ROUNDS};

mod cli;

#[derive(Parser)]
#[command(name = "sshcrypt")]
#[command(author = "Oleg")]
#[command(version)]
#[command(about = "Inspect and re-wrap OpenSSH private keys", long_about = None)]
struct Cli {
    /// More log output on stderr (-v debug, -vv trace). RUST_LOG overrides.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the supported transport ciphers
    Ciphers,

    /// Show how a private key file is protected
    Inspect {
        file: PathBuf,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Print the public key in authorized_keys format
    Pubkey {
        file: PathBuf,

        /// Comment appended to the key line
        #[arg(short, long, default_value = "")]
        comment: String,
    },

    /// Change the passphrase of a private key file
    Passwd {
        file: PathBuf,

        /// Cipher that wraps the private section
        #[arg(long, default_value = DEFAULT_CIPHER)]
        cipher: String,

        /// bcrypt-pbkdf rounds
        #[arg(long, default_value_t = DEFAULT_ROUNDS)]
        rounds: u32,

        /// Store the key without a passphrase
        #[arg(long)]
        no_passphrase: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Ciphers => cli::ciphers::run(),
        Commands::Inspect { file, json } => cli::inspect::run(&file, json),
        Commands::Pubkey { file, comment } => cli::pubkey::run(&file, &comment),
        Commands::Passwd {
            file,
            cipher,
            rounds,
            no_passphrase,
        } => cli::change_pass::run(&file, cipher, rounds, no_passphrase),
    }
}

fn init_logging(verbose: u8) {
    use tracing_subscriber::EnvFilter;

    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
