use super::*;
use crate::compiler_frontend::toolchain::enter::EnterMode;
use crate::compiler_frontend::toolchain::{Toolchain, UnitId};
use std::path::Path;

fn attributed(source: &str) -> (Toolchain, UnitId) {
    let mut toolchain = Toolchain::new(Vec::new());
    let id = toolchain
        .parse(source, Path::new("Calls.java"))
        .expect("source should parse");
    toolchain.init_modules(&[id]);
    toolchain
        .enter_all(&[id], EnterMode::Source)
        .expect("entry should succeed");
    toolchain.unblock_annotations().expect("annotations flush");
    while let Some(work) = toolchain.next_work() {
        toolchain.attribute(work).expect("attribution should succeed");
    }
    (toolchain, id)
}

fn error_symbol(toolchain: &Toolchain, id: UnitId) -> SymbolId {
    toolchain
        .tables(id)
        .expr_symbols
        .values()
        .copied()
        .find(|symbol| matches!(toolchain.symbols.get(*symbol).data, SymbolData::Error(_)))
        .expect("an inapplicable call should leave an error symbol")
}

#[test]
fn the_only_candidate_with_matching_arity_is_recovered() {
    let (toolchain, id) = attributed(
        "class Calls {
             void f(int x) {}
             void f(int x, int y) {}
             void g() { f(\"one\"); }
         }",
    );
    let placeholder = error_symbol(&toolchain, id);

    let recovered = CandidateRecovery
        .recover_method(&toolchain.symbols, placeholder)
        .expect("one candidate takes one argument");
    assert_eq!(toolchain.symbols.name(recovered), "f");
    assert_eq!(
        toolchain.symbols.method(recovered).expect("method").params.len(),
        1
    );
}

#[test]
fn ambiguous_candidates_are_not_recovered() {
    let (toolchain, id) = attributed(
        "class Calls {
             void f(int x) {}
             void f(boolean x) {}
             void g() { f(\"one\"); }
         }",
    );
    let placeholder = error_symbol(&toolchain, id);

    assert_eq!(
        CandidateRecovery.recover_method(&toolchain.symbols, placeholder),
        None
    );
}

#[test]
fn disabled_recovery_returns_nothing() {
    let (toolchain, id) = attributed("class Calls { void f(int x) {} void g() { f(\"one\"); } }");
    let placeholder = error_symbol(&toolchain, id);

    assert_eq!(
        recovery_for(RecoveryMode::None).recover_method(&toolchain.symbols, placeholder),
        None
    );
    assert!(
        recovery_for(RecoveryMode::Candidate)
            .recover_method(&toolchain.symbols, placeholder)
            .is_some()
    );
}

#[test]
fn non_error_symbols_are_left_alone() {
    let (toolchain, _) = attributed("class Calls {}");
    let class = toolchain.symbols.entered_class("Calls").expect("entered");

    assert_eq!(CandidateRecovery.recover_method(&toolchain.symbols, class), None);
}
