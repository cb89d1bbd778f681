//! Per-session record of which source files have been parsed, and the warnings each produced.

use crate::compiler_frontend::compiler_warnings::CompilerWarning;
use crate::session_log;
use rustc_hash::{FxHashMap, FxHashSet};
use std::path::{Path, PathBuf};

#[derive(Default)]
pub struct CompilerLog {
    parsed: FxHashSet<PathBuf>,
    diagnostics: FxHashMap<PathBuf, Vec<CompilerWarning>>,
}

impl CompilerLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false if the path was already parsed in this session
    pub fn mark_parsed(&mut self, path: &Path) -> bool {
        self.parsed.insert(path.to_path_buf())
    }

    pub fn was_parsed(&self, path: &Path) -> bool {
        self.parsed.contains(path)
    }

    pub fn report(&mut self, warning: CompilerWarning) {
        self.diagnostics
            .entry(warning.location.scope.clone())
            .or_default()
            .push(warning);
    }

    pub fn diagnostics_for(&self, path: &Path) -> &[CompilerWarning] {
        self.diagnostics
            .get(path)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn all_warnings(&self) -> Vec<CompilerWarning> {
        let mut paths: Vec<&PathBuf> = self.diagnostics.keys().collect();
        paths.sort();
        paths
            .into_iter()
            .flat_map(|path| self.diagnostics[path].iter().cloned())
            .collect()
    }

    pub fn parsed_count(&self) -> usize {
        self.parsed.len()
    }

    /// Forget the given paths so they can be parsed again
    pub fn forget(&mut self, paths: &[PathBuf]) {
        for path in paths {
            self.parsed.remove(path);
            self.diagnostics.remove(path);
        }
        session_log!("Compiler log forgot ", {paths.len()}, " locations");
    }

    pub fn clear(&mut self) {
        self.parsed.clear();
        self.diagnostics.clear();
    }
}

#[cfg(test)]
#[path = "tests/compiler_log_tests.rs"]
mod tests;
