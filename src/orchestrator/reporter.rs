//! # Reporter Module
//!
//! Formatta ed emette una riga per ogni task appena completato,
//! nell'ordine di completamento (nessun batching).
//!
//! Formato testo:
//! `<program>: <source> <ratio>% (<original>KiB -> <compressed>KiB) <elapsed>ms`

use console::style;
use std::path::Path;
#[cfg(test)]
use std::sync::{Arc, Mutex};

use crate::{
    error::CompressError,
    file_manager::FileManager,
    json_output::JsonMessage,
    orchestrator::task::CompressionResult,
    progress::ProgressManager,
};

/// Where report lines end up
#[derive(Clone, Default)]
pub enum ReportSink {
    /// stdout for results, stderr for failures, through the progress bar
    #[default]
    Terminal,
    /// Every line, in emission order
    #[cfg(test)]
    Captured(Arc<Mutex<Vec<String>>>),
}

/// Streams per-task outcomes to the terminal or as JSON lines
#[derive(Clone)]
pub struct Reporter {
    json_output: bool,
    progress: ProgressManager,
    sink: ReportSink,
}

impl Reporter {
    pub fn new(json_output: bool, progress: ProgressManager, sink: ReportSink) -> Self {
        Self {
            json_output,
            progress,
            sink,
        }
    }

    pub fn progress(&self) -> &ProgressManager {
        &self.progress
    }

    pub fn emit(&self, message: &JsonMessage) {
        if let Some(line) = message.to_line() {
            self.out(&line);
        }
    }

    fn out(&self, line: &str) {
        match &self.sink {
            ReportSink::Terminal => self.progress.println(line),
            #[cfg(test)]
            ReportSink::Captured(lines) => capture(lines, line),
        }
    }

    fn err(&self, line: &str) {
        match &self.sink {
            ReportSink::Terminal => self.progress.eprintln(line),
            #[cfg(test)]
            ReportSink::Captured(lines) => capture(lines, line),
        }
    }

    pub fn report_success(&self, result: &CompressionResult) {
        if self.json_output {
            self.emit(&JsonMessage::task_complete(result));
        } else {
            self.out(&format_result_line(result));
        }
        self.progress.update(&format!(
            "{}: {}",
            result.codec.program,
            result.source_file.display()
        ));
    }

    pub fn report_failure(&self, program: &str, extension: &str, source: &Path, error: &CompressError) {
        if self.json_output {
            self.emit(&JsonMessage::task_failed(
                program,
                extension,
                source.to_path_buf(),
                error.to_string(),
            ));
        } else {
            self.err(&format_failure_line(program, source, error));
        }
        self.progress.update(&format!("{}: {} failed", program, source.display()));
    }
}

#[cfg(test)]
fn capture(lines: &Mutex<Vec<String>>, line: &str) {
    if let Ok(mut lines) = lines.lock() {
        lines.push(console::strip_ansi_codes(line).into_owned());
    }
}

/// Colorized stats line for one completed task
pub fn format_result_line(result: &CompressionResult) -> String {
    let ratio = match result.ratio_percent() {
        Some(ratio) => format!("{:.1}%", ratio),
        None => "n/a%".to_string(),
    };
    let details = format!(
        "({}KiB -> {}KiB) {:.1}ms",
        FileManager::format_kib(result.original_size_bytes),
        FileManager::format_kib(result.compressed_size_bytes),
        result.elapsed_ms()
    );

    format!(
        "{} {} {} {}",
        style(format!("{}:", result.codec.program)).yellow(),
        result.source_file.display(),
        style(ratio).green().bright(),
        style(details).white()
    )
}

pub fn format_failure_line(program: &str, source: &Path, error: &CompressError) -> String {
    format!(
        "{} {}: {}: {}",
        style("error:").red().bold(),
        program,
        source.display(),
        error
    )
}
