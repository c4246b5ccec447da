//! # Progress Tracking and Statistics Module
//!
//! Questo modulo gestisce la barra di avanzamento e le statistiche aggregate
//! di una esecuzione.
//!
//! ## Componenti principali:
//! - `ProgressManager`: barra `indicatif` sui task completati (solo su terminale)
//! - `RunStats`: contatori cumulativi di task completati/falliti e byte
//!
//! ## Visual feedback:
//! ```text
//! ⠋ [00:00:02] [========>-------------------------------] 12/54 (22%) zstd: dist/app.js
//! ```
//!
//! Le righe di report vengono stampate tramite `ProgressManager::println`,
//! che sospende la barra per non mescolare l'output.

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use crate::file_manager::FileManager;

/// Manages progress reporting for a compression run
#[derive(Clone)]
pub struct ProgressManager {
    bar: ProgressBar,
}

impl ProgressManager {
    /// Progress bar on stderr over `total_tasks` tasks
    pub fn new(total_tasks: u64) -> Self {
        let bar = ProgressBar::new(total_tasks);

        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
        {
            bar.set_style(style.progress_chars("=>-"));
        }

        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar }
    }

    /// A manager that never draws (JSON mode, tests)
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }

    /// Advance by one finished task
    pub fn update(&self, message: &str) {
        self.bar.inc(1);
        self.bar.set_message(message.to_string());
    }

    /// Print a line to stdout without tearing the bar
    pub fn println(&self, line: &str) {
        self.bar.suspend(|| println!("{}", line));
    }

    /// Print a line to stderr without tearing the bar
    pub fn eprintln(&self, line: &str) {
        self.bar.suspend(|| eprintln!("{}", line));
    }

    /// Remove the bar from the terminal
    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

/// Aggregated statistics for one run
#[derive(Debug, Default, Clone)]
pub struct RunStats {
    pub files_selected: usize,
    pub pairs_skipped: usize,
    pub tasks_planned: usize,
    pub tasks_completed: usize,
    pub tasks_failed: usize,
    pub total_original_size: u64,
    pub total_compressed_size: u64,
}

impl RunStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_completed(&mut self, original_size: u64, compressed_size: u64) {
        self.tasks_completed += 1;
        self.total_original_size += original_size;
        self.total_compressed_size += compressed_size;
    }

    pub fn add_failed(&mut self) {
        self.tasks_failed += 1;
    }

    /// Every planned task has reported back
    pub fn is_finished(&self) -> bool {
        self.tasks_completed + self.tasks_failed == self.tasks_planned
    }

    /// Compressed bytes over original bytes, across all completed tasks
    pub fn overall_ratio_percent(&self) -> f64 {
        if self.total_original_size > 0 {
            (self.total_compressed_size as f64 / self.total_original_size as f64) * 100.0
        } else {
            0.0
        }
    }

    pub fn format_summary(&self) -> String {
        format!(
            "Files: {} | Tasks: {} completed, {} failed, {} already compressed | {}KiB -> {}KiB ({:.1}%)",
            self.files_selected,
            self.tasks_completed,
            self.tasks_failed,
            self.pairs_skipped,
            FileManager::format_kib(self.total_original_size),
            FileManager::format_kib(self.total_compressed_size),
            self.overall_ratio_percent()
        )
    }
}
