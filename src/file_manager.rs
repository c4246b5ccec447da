//! # File Management Module
//!
//! Questo modulo gestisce la discovery dei file da comprimere e le
//! operazioni di stat sui file.
//!
//! ## Responsabilità:
//! - Traversal ricorsivo e lazy della directory radice (`walk()`), seguendo i symlink
//! - Filtro per estensione: solo `js`, `css`, `html`, `svg`, `txt` (`candidates()`)
//! - File e directory nascosti (nome che inizia con `.`) sotto la radice vengono ignorati
//! - Lettura dimensioni di originale e file compresso
//! - Formattazione KiB per il report
//!
//! ## Gestione errori:
//! Directory e file non supportati vengono saltati in silenzio. Un errore
//! sulla radice stessa (mancante, illeggibile) è fatale per l'intera
//! esecuzione: nessun task viene schedulato. Errori più in profondità
//! (sottodirectory illeggibile, loop di symlink) producono un `warn!` e
//! quel ramo viene saltato.
//!
//! ## Esempio:
//! ```rust,ignore
//! for entry in FileManager::candidates(Path::new("dist")) {
//!     let path = entry?;
//!     // plan compression tasks
//! }
//! ```

use crate::error::CompressError;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::warn;
use walkdir::WalkDir;

/// Extensions eligible for pre-compression
pub const SELECTED_EXTENSIONS: &[&str] = &["js", "css", "html", "svg", "txt"];

/// Manages file discovery and size lookups
pub struct FileManager;

impl FileManager {
    /// Lazily walk every regular file under `root`, following symlinks.
    ///
    /// Each call starts a fresh traversal. Hidden entries below the root are
    /// not visited. An error on the root itself is yielded as `Err` and
    /// callers are expected to stop there; errors deeper in the tree are
    /// logged and the affected branch is skipped.
    pub fn walk(root: &Path) -> impl Iterator<Item = Result<PathBuf, CompressError>> {
        let root_buf = root.to_path_buf();
        WalkDir::new(root)
            .follow_links(true)
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !Self::is_hidden(e.file_name()))
            .filter_map(move |entry| match entry {
                Ok(e) if e.file_type().is_file() => Some(Ok(e.into_path())),
                Ok(_) => None,
                Err(source) if source.depth() > 0 => {
                    warn!("Skipping unreadable entry under {}: {}", root_buf.display(), source);
                    None
                }
                Err(source) => Some(Err(CompressError::Traversal {
                    root: root_buf.clone(),
                    source,
                })),
            })
    }

    /// Files under `root` whose extension is in the allow-set
    pub fn candidates(root: &Path) -> impl Iterator<Item = Result<PathBuf, CompressError>> {
        Self::walk(root).filter(|entry| match entry {
            Ok(path) => Self::is_selected(path),
            Err(_) => true,
        })
    }

    fn is_hidden(name: &OsStr) -> bool {
        name.to_str().map(|n| n.starts_with('.')).unwrap_or(false)
    }

    /// Real location of an output path: the parent directory is resolved
    /// through symlinks so two routes to the same directory compare equal
    pub async fn resolved_output(output: &Path) -> PathBuf {
        let (Some(parent), Some(name)) = (output.parent(), output.file_name()) else {
            return output.to_path_buf();
        };
        match fs::canonicalize(parent).await {
            Ok(real_parent) => real_parent.join(name),
            Err(_) => output.to_path_buf(),
        }
    }

    /// Check if a file extension belongs to the allow-set
    pub fn is_selected(path: &Path) -> bool {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) => SELECTED_EXTENSIONS.contains(&ext),
            None => false,
        }
    }

    /// Size in bytes of a file
    pub async fn file_size(path: &Path) -> Result<u64, CompressError> {
        let metadata = fs::metadata(path).await.map_err(|source| CompressError::Stat {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(metadata.len())
    }

    /// Whether a path exists; errors other than "not found" count as existing
    /// so that a pair is never recompressed over an output we cannot inspect.
    pub async fn output_exists(path: &Path) -> bool {
        fs::try_exists(path).await.unwrap_or(true)
    }

    /// Bytes as KiB with one decimal, e.g. `12.3`
    pub fn format_kib(size: u64) -> String {
        format!("{:.1}", size as f64 / 1024.0)
    }
}
