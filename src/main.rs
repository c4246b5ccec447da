//! # Dist Compress - Main Entry Point
//!
//! Punto di ingresso dell'applicazione.
//!
//! ## Responsabilità:
//! - Parsing degli argomenti della command line con `clap`
//! - Inizializzazione del sistema di logging con `tracing` (su stderr)
//! - Caricamento della configurazione e avvio del compressore
//!
//! ## Flusso di esecuzione:
//! 1. Parsa gli argomenti CLI (tutti opzionali)
//! 2. Configura il logging (`RUST_LOG`, oppure INFO/DEBUG con `--verbose`)
//! 3. Carica `--config` se presente e applica gli override da CLI
//! 4. Esegue il compressore; un task fallito rende l'exit code non zero
//!
//! ## Esempio di utilizzo:
//! ```bash
//! dist-compress                 # comprime ./dist
//! dist-compress build --workers 8 --json
//! ```

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use dist_compress::{Compressor, Config};

#[derive(Parser)]
#[command(name = "dist-compress")]
#[command(about = "Pre-compress build output with gzip, brotli and zstd")]
struct Args {
    /// Directory tree to compress (default: dist)
    root: Option<PathBuf>,

    /// Maximum number of compressions running at once (default: CPU cores)
    #[arg(short, long)]
    workers: Option<usize>,

    /// Emit one JSON object per event instead of colored lines
    #[arg(long)]
    json: bool,

    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut config = match args.config {
        Some(ref path) => Config::from_file(path).await?,
        None => Config::default(),
    };
    if let Some(root) = args.root {
        config.root_dir = root;
    }
    if let Some(workers) = args.workers {
        config.workers = workers;
    }
    if args.json {
        config.json_output = true;
    }

    let compressor = Compressor::new(config)?;
    compressor.run().await?;

    Ok(())
}
