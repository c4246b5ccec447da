//! # Orchestrator Module
//!
//! Separa le responsabilità in sottomoduli:
//! - `compressor`: Orchestratore principale (pianificazione, fan-out, barriera finale)
//! - `task`: Esecuzione e misura di una singola coppia (file, codec)
//! - `reporter`: Righe di report colorate o JSON

pub mod compressor;
pub mod reporter;
pub mod task;

pub use compressor::{Compressor, RunOutcome};
pub use reporter::{ReportSink, Reporter};
pub use task::{CompressionResult, CompressionTask};
