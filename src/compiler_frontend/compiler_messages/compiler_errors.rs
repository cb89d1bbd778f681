use crate::compiler_frontend::compiler_warnings::CompilerWarning;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

// The final set of errors and warnings emitted by one submission
#[derive(Debug, Default)]
pub struct CompilerMessages {
    pub errors: Vec<CompilerError>,
    pub warnings: Vec<CompilerWarning>,
}

impl CompilerMessages {
    pub fn new() -> Self {
        CompilerMessages {
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize)]
pub struct CharPosition {
    pub line_number: i32,
    pub char_column: i32,
}

/// A resolved location for reporting. The scope is the real path of the input.
#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize)]
pub struct ErrorLocation {
    pub scope: PathBuf,
    pub start_pos: CharPosition,
    pub end_pos: CharPosition,
}

impl ErrorLocation {
    pub fn new(scope: PathBuf, start_pos: CharPosition, end_pos: CharPosition) -> Self {
        Self {
            scope,
            start_pos,
            end_pos,
        }
    }

    pub fn for_file(scope: &Path) -> Self {
        Self {
            scope: scope.to_path_buf(),
            ..Default::default()
        }
    }
}

impl fmt::Display for ErrorLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}",
            self.scope.display(),
            self.start_pos.line_number + 1,
            self.start_pos.char_column + 1
        )
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize)]
pub enum ErrorMetaDataKey {
    CompilationStage,
    SymbolName,
    SourceLocation,

    // Optional suggestions
    PrimarySuggestion,
    AlternativeSuggestion,
    SuggestedInsertion,
    SuggestedReplacement,

    // Data type information
    ExpectedType,
    FoundType,
}

#[derive(Clone, Debug, Serialize)]
pub struct CompilerError {
    pub msg: String,
    pub location: ErrorLocation,
    pub error_type: ErrorType,

    // Structured detail for tooling that consumes the fault
    pub metadata: HashMap<ErrorMetaDataKey, &'static str>,
}

impl CompilerError {
    pub fn new(msg: impl Into<String>, location: ErrorLocation, error_type: ErrorType) -> Self {
        CompilerError {
            msg: msg.into(),
            location,
            error_type,
            metadata: HashMap::new(),
        }
    }

    pub fn with_file_path(mut self, file_path: PathBuf) -> Self {
        self.location.scope = file_path;
        self
    }

    pub fn with_error_type(mut self, error_type: ErrorType) -> Self {
        self.error_type = error_type;
        self
    }

    pub fn with_metadata(mut self, key: ErrorMetaDataKey, value: &'static str) -> Self {
        self.metadata.insert(key, value);
        self
    }

    pub fn new_metadata_entry(&mut self, key: ErrorMetaDataKey, value: &'static str) {
        self.metadata.insert(key, value);
    }

    pub fn new_syntax_error(msg: impl Into<String>, location: ErrorLocation) -> Self {
        Self::new(msg, location, ErrorType::Syntax)
    }

    pub fn new_resolution_error(msg: impl Into<String>, location: ErrorLocation) -> Self {
        Self::new(msg, location, ErrorType::Resolution)
    }

    pub fn new_attribution_error(msg: impl Into<String>, location: ErrorLocation) -> Self {
        Self::new(msg, location, ErrorType::Attribution)
    }

    pub fn new_completion_error(msg: impl Into<String>, location: ErrorLocation) -> Self {
        Self::new(msg, location, ErrorType::Completion)
    }

    /// Misuse of the session lifecycle. Never recoverable.
    pub fn new_session_misuse(msg: impl Into<String>, location: ErrorLocation) -> Self {
        Self::new(msg, location, ErrorType::SessionMisuse)
    }

    pub fn new_config_error(msg: impl Into<String>, path: &Path) -> Self {
        Self::new(msg, ErrorLocation::for_file(path), ErrorType::Config)
    }

    pub fn file_error(path: &Path, msg: impl Into<String>) -> Self {
        Self::new(msg, ErrorLocation::for_file(path), ErrorType::File)
    }

    /// Internal bug, not the user's fault
    pub fn compiler_error(msg: impl Into<String>) -> Self {
        Self::new(msg, ErrorLocation::default(), ErrorType::Compiler)
    }

    pub fn is_fatal(&self) -> bool {
        self.error_type == ErrorType::SessionMisuse
    }
}

impl fmt::Display for CompilerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} ({})",
            error_type_to_str(&self.error_type),
            self.msg,
            self.location
        )
    }
}

impl std::error::Error for CompilerError {}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize)]
pub enum ErrorType {
    Syntax,
    Type,
    Resolution,
    Completion,
    Attribution,
    File,
    Config,
    SessionMisuse,
    Compiler,
}

pub fn error_type_to_str(e_type: &ErrorType) -> &'static str {
    match e_type {
        ErrorType::Syntax => "Syntax Error",
        ErrorType::Type => "Type Error",
        ErrorType::Resolution => "Unresolved Symbol",
        ErrorType::Completion => "Symbol Completion Failure",
        ErrorType::Attribution => "Attribution Failure",
        ErrorType::File => "File Error",
        ErrorType::Config => "Malformed Config",
        ErrorType::SessionMisuse => "Session Misuse",
        ErrorType::Compiler => "Compiler Bug",
    }
}

/// Returns a new CompilerError for syntax violations.
///
/// Usage:
/// `return_syntax_error!("message", location, {
///     CompilationStage => "Parsing",
///     PrimarySuggestion => "Add a ';'",
/// })`;
#[macro_export]
macro_rules! return_syntax_error {
    ($msg:expr, $loc:expr, { $( $key:ident => $value:expr ),* $(,)? }) => {
        return Err($crate::compiler_frontend::compiler_errors::CompilerError {
            msg: $msg.into(),
            location: $loc,
            error_type: $crate::compiler_frontend::compiler_errors::ErrorType::Syntax,
            metadata: {
                let mut map = std::collections::HashMap::new();
                $( map.insert($crate::compiler_frontend::compiler_errors::ErrorMetaDataKey::$key, $value); )*
                map
            },
        })
    };
    ($msg:expr, $loc:expr) => {
        return Err($crate::compiler_frontend::compiler_errors::CompilerError::new_syntax_error(
            $msg, $loc,
        ))
    };
}

/// Returns a new CompilerError for a failed attribution work unit.
///
/// Usage: `return_attribution_error!("Cyclic inheritance", location, { SymbolName => "A" })`;
#[macro_export]
macro_rules! return_attribution_error {
    ($msg:expr, $loc:expr, { $( $key:ident => $value:expr ),* $(,)? }) => {
        return Err($crate::compiler_frontend::compiler_errors::CompilerError {
            msg: $msg.into(),
            location: $loc,
            error_type: $crate::compiler_frontend::compiler_errors::ErrorType::Attribution,
            metadata: {
                let mut map = std::collections::HashMap::new();
                $( map.insert($crate::compiler_frontend::compiler_errors::ErrorMetaDataKey::$key, $value); )*
                map
            },
        })
    };
    ($msg:expr, $loc:expr) => {
        return Err($crate::compiler_frontend::compiler_errors::CompilerError::new_attribution_error(
            $msg, $loc,
        ))
    };
}

/// Returns a new session misuse error. These are surfaced straight to the caller.
#[macro_export]
macro_rules! return_session_misuse {
    ($msg:expr, $loc:expr, { $( $key:ident => $value:expr ),* $(,)? }) => {
        return Err($crate::compiler_frontend::compiler_errors::CompilerError {
            msg: $msg.into(),
            location: $loc,
            error_type: $crate::compiler_frontend::compiler_errors::ErrorType::SessionMisuse,
            metadata: {
                let mut map = std::collections::HashMap::new();
                $( map.insert($crate::compiler_frontend::compiler_errors::ErrorMetaDataKey::$key, $value); )*
                map
            },
        })
    };
}

/// Returns a config error for the given file.
#[macro_export]
macro_rules! return_config_error {
    ($msg:expr, $path:expr) => {
        return Err($crate::compiler_frontend::compiler_errors::CompilerError::new_config_error(
            $msg, $path,
        ))
    };
}

/// Returns a file error for the given path.
#[macro_export]
macro_rules! return_file_error {
    ($path:expr, $msg:expr) => {
        return Err($crate::compiler_frontend::compiler_errors::CompilerError::file_error(
            $path, $msg,
        ))
    };
}
