use crate::compiler_frontend::compiler_errors::ErrorLocation;
use saying::say;
use serde::Serialize;

#[derive(Clone, Debug, Serialize)]
pub struct CompilerWarning {
    pub msg: String,
    pub location: ErrorLocation,
    pub warning_kind: WarningKind,
}

impl CompilerWarning {
    pub fn new(msg: impl Into<String>, location: ErrorLocation, warning_kind: WarningKind) -> Self {
        CompilerWarning {
            msg: msg.into(),
            location,
            warning_kind,
        }
    }

    pub fn file_path_string(&self) -> String {
        self.location.scope.to_string_lossy().to_string()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum WarningKind {
    MissingClasspathEntry,
    DuplicateClass,
    UnresolvedImport,
    UnresolvedSymbol,
    AnnotationProcessorOutput,
}

pub fn print_formatted_warning(w: CompilerWarning) {
    let file = w.file_path_string();
    say!(Yellow Bold "WARNING: ", Dark Yellow file);
    match w.warning_kind {
        WarningKind::MissingClasspathEntry => {
            say!("Classpath entry could not be read: ", w.msg);
        }
        WarningKind::DuplicateClass => {
            say!("Duplicate class '", w.msg, "' (first declaration kept)");
        }
        WarningKind::UnresolvedImport => {
            say!("Import could not be resolved: ", w.msg);
        }
        WarningKind::UnresolvedSymbol => {
            say!("Cannot find symbol: ", w.msg);
        }
        WarningKind::AnnotationProcessorOutput => {
            say!("Annotation processor: ", w.msg);
        }
    }
}
