//! # Codec Registry Module
//!
//! Registro fisso dei codec esterni usati per la pre-compressione.
//!
//! ## Codec supportati (ordine di inserimento, stabile):
//! - `gz`: `gzip -k`
//! - `br`: `brotli`
//! - `zst`: `zstd`
//!
//! Ogni tool, dato un file di input, scrive un file fratello
//! `<input>.<estensione>` e lascia intatto l'originale.

use std::path::{Path, PathBuf};

use crate::args;

/// One external compression tool with its fixed argument list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodecSpec {
    /// Extension appended to the source path (without the dot)
    pub extension: String,
    /// Program name, resolved through `PATH`
    pub program: String,
    /// Fixed arguments placed before the source path
    pub args: Vec<String>,
}

impl CodecSpec {
    pub fn new(extension: &str, program: &str, args: Vec<String>) -> Self {
        Self {
            extension: extension.to_string(),
            program: program.to_string(),
            args,
        }
    }

    /// Expected output path: `<source>.<extension>`
    pub fn output_path(&self, source: &Path) -> PathBuf {
        let mut name = source.as_os_str().to_owned();
        name.push(".");
        name.push(&self.extension);
        PathBuf::from(name)
    }

    /// Full argument list for one invocation, source path last
    pub fn command_args(&self, source: &Path) -> Vec<String> {
        let mut args = self.args.clone();
        args.push(source.to_string_lossy().into_owned());
        args
    }
}

/// Ordered, immutable set of codecs
#[derive(Debug, Clone)]
pub struct CodecRegistry {
    codecs: Vec<CodecSpec>,
}

impl CodecRegistry {
    /// Build a registry from an explicit list, keeping its order
    pub fn new(codecs: Vec<CodecSpec>) -> Self {
        Self { codecs }
    }

    pub fn iter(&self) -> impl Iterator<Item = &CodecSpec> {
        self.codecs.iter()
    }

    /// Look a codec up by its extension identifier
    #[cfg(test)]
    pub fn get(&self, extension: &str) -> Option<&CodecSpec> {
        self.codecs.iter().find(|c| c.extension == extension)
    }
}

impl Default for CodecRegistry {
    fn default() -> Self {
        Self::new(vec![
            CodecSpec::new("gz", "gzip", args!["-k"]),
            CodecSpec::new("br", "brotli", Vec::new()),
            CodecSpec::new("zst", "zstd", Vec::new()),
        ])
    }
}
