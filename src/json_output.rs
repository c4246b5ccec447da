//! # JSON Output Module
//!
//! Questo modulo gestisce l'output strutturato in JSON per l'integrazione
//! con script di build e pipeline CI.
//!
//! ## Tipi di messaggi:
//! - `start`: Inizio esecuzione (radice, file selezionati, task pianificati)
//! - `task_complete`: Un task (file, codec) completato con dimensioni e tempi
//! - `task_failed`: Un task fallito con il messaggio di errore
//! - `complete`: Fine esecuzione con statistiche aggregate
//!
//! Un oggetto JSON per riga su stdout, nell'ordine di completamento.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::orchestrator::task::CompressionResult;
use crate::progress::RunStats;

/// Tipo di messaggio JSON
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum JsonMessage {
    /// Inizio dell'esecuzione
    #[serde(rename = "start")]
    Start {
        root_dir: PathBuf,
        files_selected: usize,
        tasks_planned: usize,
        workers: usize,
    },

    /// Task completato
    #[serde(rename = "task_complete")]
    TaskComplete {
        program: String,
        extension: String,
        path: PathBuf,
        original_size: u64,
        compressed_size: u64,
        ratio_percent: Option<f64>,
        elapsed_ms: f64,
    },

    /// Task fallito
    #[serde(rename = "task_failed")]
    TaskFailed {
        program: String,
        extension: String,
        path: PathBuf,
        error: String,
    },

    /// Esecuzione completata
    #[serde(rename = "complete")]
    Complete {
        files_selected: usize,
        pairs_skipped: usize,
        tasks_completed: usize,
        tasks_failed: usize,
        total_original_size: u64,
        total_compressed_size: u64,
        duration_seconds: f64,
    },
}

impl JsonMessage {
    /// Serializza il messaggio su una riga
    pub fn to_line(&self) -> Option<String> {
        serde_json::to_string(self).ok()
    }

    pub fn start(root_dir: PathBuf, files_selected: usize, tasks_planned: usize, workers: usize) -> Self {
        Self::Start {
            root_dir,
            files_selected,
            tasks_planned,
            workers,
        }
    }

    pub fn task_complete(result: &CompressionResult) -> Self {
        Self::TaskComplete {
            program: result.codec.program.clone(),
            extension: result.codec.extension.clone(),
            path: result.source_file.clone(),
            original_size: result.original_size_bytes,
            compressed_size: result.compressed_size_bytes,
            ratio_percent: result.ratio_percent(),
            elapsed_ms: result.elapsed_ms(),
        }
    }

    pub fn task_failed(program: &str, extension: &str, path: PathBuf, error: String) -> Self {
        Self::TaskFailed {
            program: program.to_string(),
            extension: extension.to_string(),
            path,
            error,
        }
    }

    pub fn complete(stats: &RunStats, duration_seconds: f64) -> Self {
        Self::Complete {
            files_selected: stats.files_selected,
            pairs_skipped: stats.pairs_skipped,
            tasks_completed: stats.tasks_completed,
            tasks_failed: stats.tasks_failed,
            total_original_size: stats.total_original_size,
            total_compressed_size: stats.total_compressed_size,
            duration_seconds,
        }
    }
}
