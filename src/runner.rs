//! # Codec Runner Module
//!
//! Astrae l'esecuzione di un tool di compressione esterno come capability
//! iniettabile: "esegui questo programma con questi argomenti su questo
//! file e attendi la terminazione".
//!
//! ## Implementazioni:
//! - `ProcessRunner`: avvia il processo con `tokio::process::Command`,
//!   cattura e scarta stdout/stderr
//! - nei test: runner finti che scrivono output deterministici all'istante
//!
//! ## Contratto:
//! Il tool scrive `<input>.<estensione>` accanto all'input. Un exit code
//! non zero diventa `CompressError::ProcessFailed`; se il tool termina con
//! successo senza produrre l'output, l'errore emerge alla lettura delle dimensioni.

use crate::codec::CodecSpec;
use crate::error::CompressError;
use std::future::Future;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Runs one codec against one input file to completion
pub trait CodecRunner: Send + Sync + 'static {
    fn run(
        &self,
        codec: &CodecSpec,
        input: &Path,
    ) -> impl Future<Output = Result<(), CompressError>> + Send;
}

/// Spawns the codec program as a child process
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner;

impl ProcessRunner {
    pub fn new() -> Self {
        Self
    }
}

impl CodecRunner for ProcessRunner {
    async fn run(&self, codec: &CodecSpec, input: &Path) -> Result<(), CompressError> {
        let args = codec.command_args(input);
        debug!("Running {} {:?}", codec.program, args);

        let output = Command::new(&codec.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|source| CompressError::Launch {
                program: codec.program.clone(),
                source,
            })?;

        if output.status.success() {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr)
            .lines()
            .rev()
            .find(|line| !line.trim().is_empty())
            .map(|line| line.trim().to_string());

        Err(CompressError::ProcessFailed {
            program: codec.program.clone(),
            file: input.to_path_buf(),
            status: output.status,
            stderr,
        })
    }
}
