//! # Dist Compress Library
//!
//! Questo è il modulo principale della libreria che espone tutte le API pubbliche.
//!
//! ## Architettura dei moduli:
//! - `config`: Gestione configurazione e validazione parametri
//! - `error`: Tipi di errore custom
//! - `codec`: Registro fisso dei codec esterni (gzip, brotli, zstd)
//! - `file_manager`: Discovery dei file e lettura dimensioni
//! - `runner`: Esecuzione dei tool esterni come capability iniettabile
//! - `tool_resolver`: Ricerca dei tool nel `PATH`
//! - `orchestrator`: Pianificazione ed esecuzione concorrente dei task
//! - `progress`: Barra di avanzamento e statistiche
//! - `json_output`: Eventi JSON per uso programmatico
//!
//! ## Utilizzo:
//! ```rust,ignore
//! use dist_compress::{Compressor, Config};
//!
//! let compressor = Compressor::new(Config::default())?;
//! let stats = compressor.run().await?;
//! ```

pub mod codec;
pub mod config;
pub mod error;
pub mod file_manager;
pub mod json_output;
pub mod orchestrator;
pub mod progress;
pub mod runner;
pub mod tool_resolver;
pub mod utils;

pub use codec::{CodecRegistry, CodecSpec};
pub use config::Config;
pub use error::CompressError;
pub use orchestrator::{CompressionResult, CompressionTask, Compressor, RunOutcome};
pub use progress::RunStats;
pub use runner::{CodecRunner, ProcessRunner};
