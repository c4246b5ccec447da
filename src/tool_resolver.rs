//! # Tool Path Resolver
//!
//! Finds codec programs on the system `PATH` so that missing tools can be
//! announced before the run starts. A missing tool never aborts the run:
//! its tasks fail one by one and are reported like any other failure.

use std::env;
use std::ffi::OsStr;
use std::path::PathBuf;
use tracing::{debug, warn};

use crate::codec::CodecRegistry;

/// Resolves program names against a search path
pub struct ToolResolver {
    search_path: Option<std::ffi::OsString>,
}

impl ToolResolver {
    /// Resolver over the current process `PATH`
    pub fn new() -> Self {
        Self {
            search_path: env::var_os("PATH"),
        }
    }

    /// Resolver over an explicit search path (same syntax as `PATH`)
    pub fn with_search_path(search_path: impl AsRef<OsStr>) -> Self {
        Self {
            search_path: Some(search_path.as_ref().to_os_string()),
        }
    }

    /// Find tool in the search path
    pub fn find_in_path(&self, tool_name: &str) -> Option<PathBuf> {
        let extension = if cfg!(windows) { ".exe" } else { "" };
        let tool_with_ext = format!("{}{}", tool_name, extension);

        let search_path = self.search_path.as_ref()?;
        env::split_paths(search_path)
            .map(|dir| dir.join(&tool_with_ext))
            .find(|path| path.is_file())
    }

    /// Check if a specific tool is available
    pub fn is_tool_available(&self, tool_name: &str) -> bool {
        self.find_in_path(tool_name).is_some()
    }

    /// Warn once for every registry program that cannot be found.
    /// Returns the missing program names.
    pub fn report_missing(&self, registry: &CodecRegistry) -> Vec<String> {
        let mut missing = Vec::new();
        for codec in registry.iter() {
            match self.find_in_path(&codec.program) {
                Some(path) => debug!("Using {} -> {}", codec.program, path.display()),
                None => {
                    warn!(
                        "{} not found in PATH; .{} outputs will fail",
                        codec.program, codec.extension
                    );
                    missing.push(codec.program.clone());
                }
            }
        }
        missing
    }
}

impl Default for ToolResolver {
    fn default() -> Self {
        Self::new()
    }
}
