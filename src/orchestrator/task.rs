//! # Compression Task Module
//!
//! Unità di lavoro per una singola coppia (file, codec).
//! Separata dall'orchestratore per poterla testare con un runner finto.

use crate::{
    codec::CodecSpec,
    error::CompressError,
    file_manager::FileManager,
    runner::CodecRunner,
};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::debug;

/// One (source file, codec) pair whose output is missing
#[derive(Debug, Clone)]
pub struct CompressionTask {
    pub source_file: PathBuf,
    pub codec: CodecSpec,
}

/// Outcome of a completed task
#[derive(Debug, Clone)]
pub struct CompressionResult {
    pub source_file: PathBuf,
    pub codec: CodecSpec,
    pub original_size_bytes: u64,
    pub compressed_size_bytes: u64,
    pub elapsed: Duration,
}

impl CompressionResult {
    /// `compressed / original * 100`; `None` for an empty original
    pub fn ratio_percent(&self) -> Option<f64> {
        if self.original_size_bytes == 0 {
            None
        } else {
            Some(self.compressed_size_bytes as f64 / self.original_size_bytes as f64 * 100.0)
        }
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed.as_nanos() as f64 / 1_000_000.0
    }
}

impl CompressionTask {
    pub fn new(source_file: PathBuf, codec: CodecSpec) -> Self {
        Self { source_file, codec }
    }

    pub fn output_path(&self) -> PathBuf {
        self.codec.output_path(&self.source_file)
    }

    /// Run the codec and measure the result
    pub async fn execute<R: CodecRunner>(self, runner: &R) -> Result<CompressionResult, CompressError> {
        let start = Instant::now();
        runner.run(&self.codec, &self.source_file).await?;
        let elapsed = start.elapsed();

        let original_size_bytes = FileManager::file_size(&self.source_file).await?;
        let compressed_size_bytes = FileManager::file_size(&self.output_path()).await?;

        debug!(
            "{} finished {} in {:?}",
            self.codec.program,
            self.source_file.display(),
            elapsed
        );

        Ok(CompressionResult {
            source_file: self.source_file,
            codec: self.codec,
            original_size_bytes,
            compressed_size_bytes,
            elapsed,
        })
    }
}
