use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ntrs::{Codec, Config};
use std::{path::PathBuf, process::ExitCode};

/// Hide a text message in a circular dot image
#[derive(Parser)]
#[command(name = "ntrs", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Hide a message in a new image
    Encrypt {
        /// Text to hide
        #[arg(long)]
        text: Option<String>,
        /// Path of the image to create
        #[arg(long)]
        image: PathBuf,
        /// Password the hidden bits are scrambled with
        #[arg(long)]
        password: String,
        /// Reed-Solomon parity bytes per block
        #[arg(long, default_value_t = Config::default().ecc_len)]
        ecc: usize,
        /// zlib compression level
        #[arg(long, default_value_t = Config::default().compression_level)]
        level: u32,
    },
    /// Recover the message hidden in an image
    Decrypt {
        /// Path of the image to read
        #[arg(long)]
        image: PathBuf,
        /// Password used when the image was created
        #[arg(long)]
        password: String,
        /// Reed-Solomon parity bytes per block
        #[arg(long, default_value_t = Config::default().ecc_len)]
        ecc: usize,
    },
}

fn main() -> Result<ExitCode> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Encrypt {
            text,
            image,
            password,
            ecc,
            level,
        } => {
            let Some(text) = text else {
                println!("Error: --text is required.");
                return Ok(ExitCode::FAILURE);
            };
            let config = Config {
                ecc_len: ecc,
                compression_level: level,
            };
            let codec = Codec::with_config(&password, config)?;
            codec
                .encode(&text, &image)
                .with_context(|| format!("failed to write {}", image.display()))?;
            println!("SUCCESS: Saved to {}", image.display());
        }
        Command::Decrypt {
            image,
            password,
            ecc,
        } => {
            if !image.exists() {
                println!("Error: File {} not found.", image.display());
                return Ok(ExitCode::FAILURE);
            }
            let config = Config {
                ecc_len: ecc,
                ..Config::default()
            };
            let codec = Codec::with_config(&password, config)?;
            println!("DECRYPTED MESSAGE: {}", codec.decode_message(&image));
        }
    }

    Ok(ExitCode::SUCCESS)
}
