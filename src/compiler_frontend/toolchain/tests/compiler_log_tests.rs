use super::*;
use crate::compiler_frontend::compiler_errors::ErrorLocation;
use crate::compiler_frontend::compiler_warnings::WarningKind;

fn warning(path: &str) -> CompilerWarning {
    CompilerWarning::new(
        "Missing",
        ErrorLocation::for_file(Path::new(path)),
        WarningKind::UnresolvedSymbol,
    )
}

#[test]
fn paths_are_parsed_once() {
    let mut log = CompilerLog::new();
    assert!(log.mark_parsed(Path::new("A.java")));
    assert!(!log.mark_parsed(Path::new("A.java")));
    assert!(log.was_parsed(Path::new("A.java")));
    assert_eq!(log.parsed_count(), 1);
}

#[test]
fn diagnostics_are_grouped_by_file() {
    let mut log = CompilerLog::new();
    log.report(warning("B.java"));
    log.report(warning("A.java"));
    log.report(warning("B.java"));

    assert_eq!(log.diagnostics_for(Path::new("B.java")).len(), 2);
    assert!(log.diagnostics_for(Path::new("C.java")).is_empty());

    let all = log.all_warnings();
    assert_eq!(all.len(), 3);
    assert_eq!(all[0].location.scope, PathBuf::from("A.java"));
}

#[test]
fn forget_only_touches_the_given_paths() {
    let mut log = CompilerLog::new();
    log.mark_parsed(Path::new("A.java"));
    log.mark_parsed(Path::new("B.java"));
    log.report(warning("A.java"));

    log.forget(&[PathBuf::from("A.java")]);
    assert!(!log.was_parsed(Path::new("A.java")));
    assert!(log.was_parsed(Path::new("B.java")));
    assert!(log.diagnostics_for(Path::new("A.java")).is_empty());

    log.clear();
    assert_eq!(log.parsed_count(), 0);
}
