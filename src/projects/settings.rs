use crate::compiler_frontend::compiler_errors::CompilerError;
use crate::{return_config_error, return_file_error};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const SOURCE_FILE_EXTENSION: &str = "java";
pub const CONFIG_FILE_NAME: &str = "typegraph.toml";

// Well-known names the toolchain and mapper treat specially
pub const OBJECT_FQN: &str = "java.lang.Object";
pub const STRING_FQN: &str = "java.lang.String";
pub const ENUM_FQN: &str = "java.lang.Enum";
pub const RECORD_FQN: &str = "java.lang.Record";
pub const ANNOTATION_FQN: &str = "java.lang.annotation.Annotation";
pub const IMPLICIT_IMPORT_PACKAGE: &str = "java.lang";

/// Name the mapper gives every constructor
pub const CONSTRUCTOR_NAME: &str = "<constructor>";
/// Internal name of constructors in the symbol table
pub const INIT_NAME: &str = "<init>";
pub const STATIC_INIT_NAME: &str = "<clinit>";
/// Instance initializer blocks are entered as BLOCK-flagged methods with this name
pub const INSTANCE_INIT_NAME: &str = "<instinit>";
/// Legacy serialization field on java.lang.String that is never surfaced as a member
pub const SERIAL_PERSISTENT_FIELDS: &str = "serialPersistentFields";
pub const ENUM_VALUES_FIELD: &str = "$VALUES";

// Rough guesses to avoid early reallocations.
// Based on small declaration-heavy test inputs, recalculate when real corpora are measured.
pub const SRC_TO_TOKEN_RATIO: usize = 5;
pub const MINIMUM_STRING_TABLE_CAPACITY: usize = 64;
pub const TYPE_CACHE_INITIAL_CAPACITY: usize = 256;
pub const LIKELY_MEMBERS_PER_CLASS: usize = 8;

/// How the mapper recovers method symbols the attribution pass replaced with an error placeholder
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecoveryMode {
    #[default]
    Candidate,
    None,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Directories or stub files that are searched for classes not declared in the batch
    pub classpath: Vec<PathBuf>,

    /// Sources that are entered before every batch but never attributed or surfaced
    pub depends_on: Vec<PathBuf>,

    /// Output paths are reported relative to this directory
    pub relative_to: Option<PathBuf>,

    pub sources: Vec<PathBuf>,
    pub recovery: RecoveryMode,
    pub log_attribution_faults: bool,
}

impl Config {
    pub fn new() -> Self {
        Config::default()
    }

    /// Parse a config from TOML text. Paths are left as written.
    pub fn from_toml_str(source: &str, origin: &Path) -> Result<Config, CompilerError> {
        match toml::from_str::<Config>(source) {
            Ok(config) => Ok(config),
            Err(e) => return_config_error!(e.to_string(), origin),
        }
    }

    /// Load a config file. Relative paths inside it are resolved against the file's directory.
    pub fn load(path: &Path) -> Result<Config, CompilerError> {
        let source = match fs::read_to_string(path) {
            Ok(source) => source,
            Err(e) => return_file_error!(path, format!("Could not read config file: {e}")),
        };

        let mut config = Config::from_toml_str(&source, path)?;
        let base = path.parent().unwrap_or(Path::new(""));
        config.resolve_paths(base);
        Ok(config)
    }

    /// Look for `typegraph.toml` in a directory. A missing file gives the default config.
    pub fn find_in_dir(dir: &Path) -> Result<Config, CompilerError> {
        let candidate = dir.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            Config::load(&candidate)
        } else {
            Ok(Config::default())
        }
    }

    fn resolve_paths(&mut self, base: &Path) {
        let rebase = |path: &mut PathBuf| {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        };

        self.classpath.iter_mut().for_each(rebase);
        self.depends_on.iter_mut().for_each(rebase);
        self.sources.iter_mut().for_each(rebase);
        if let Some(relative_to) = self.relative_to.as_mut() {
            rebase(relative_to);
        }
    }
}

#[cfg(test)]
#[path = "tests/settings_tests.rs"]
mod tests;
