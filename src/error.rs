//! # Error Types Module
//!
//! Questo modulo definisce tutti i tipi di errore custom dell'applicazione.
//!
//! ## Categorie di errori:
//! - `Traversal`: la directory radice non esiste o non è leggibile (fatale, prima di ogni task)
//! - `Launch`: il tool esterno non esiste o non può essere avviato
//! - `ProcessFailed`: il tool esterno termina con exit code non zero
//! - `Stat`: impossibile leggere la dimensione dell'originale o del file compresso
//! - `Task`: un task concorrente è andato in panic o non ha potuto partire
//! - `Validation`: configurazione non valida
//!
//! Gli errori di task non vengono mai ritentati: il compressore li conta,
//! li riporta e restituisce il primo alla fine del batch.

use std::path::PathBuf;
use std::process::ExitStatus;

/// Custom error types for dist compression
#[derive(thiserror::Error, Debug)]
pub enum CompressError {
    #[error("Cannot traverse {}: {source}", .root.display())]
    Traversal {
        root: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("Failed to launch {program}: {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} failed on {} ({status}){}", .file.display(), stderr_suffix(.stderr))]
    ProcessFailed {
        program: String,
        file: PathBuf,
        status: ExitStatus,
        stderr: Option<String>,
    },

    #[error("Cannot stat {}: {source}", .path.display())]
    Stat {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Compression task aborted: {0}")]
    Task(String),

    #[error("Invalid configuration: {0}")]
    Validation(String),
}

fn stderr_suffix(stderr: &Option<String>) -> String {
    match stderr {
        Some(line) => format!(": {}", line),
        None => String::new(),
    }
}
