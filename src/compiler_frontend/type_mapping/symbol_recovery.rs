//! Best-effort recovery of the method an erroneous invocation meant.
//!
//! When no overload applies, attribution records an error symbol instead of a method. A
//! recovery hook may map that placeholder back to one of the candidates it remembers.
//! Whatever it cannot recover resolves to nothing.

use crate::compiler_frontend::toolchain::symbols::{SymbolData, SymbolId, SymbolTable};
use crate::projects::settings::RecoveryMode;

pub trait SymbolRecovery {
    /// The method `placeholder` most likely stands for, if one can be picked
    fn recover_method(&self, symbols: &SymbolTable, placeholder: SymbolId) -> Option<SymbolId>;
}

/// Picks the only candidate whose parameter count matches the call
#[derive(Default, Clone, Copy)]
pub struct CandidateRecovery;

impl SymbolRecovery for CandidateRecovery {
    fn recover_method(&self, symbols: &SymbolTable, placeholder: SymbolId) -> Option<SymbolId> {
        let SymbolData::Error(error) = &symbols.get(placeholder).data else {
            return None;
        };

        let mut matching = error.candidates.iter().copied().filter(|candidate| {
            symbols
                .method(*candidate)
                .is_some_and(|method| method.params.len() == error.arity)
        });

        match (matching.next(), matching.next()) {
            (Some(candidate), None) => Some(candidate),
            _ => None,
        }
    }
}

#[derive(Default, Clone, Copy)]
pub struct NoRecovery;

impl SymbolRecovery for NoRecovery {
    fn recover_method(&self, _: &SymbolTable, _: SymbolId) -> Option<SymbolId> {
        None
    }
}

pub fn recovery_for(mode: RecoveryMode) -> Box<dyn SymbolRecovery> {
    match mode {
        RecoveryMode::Candidate => Box::new(CandidateRecovery),
        RecoveryMode::None => Box::new(NoRecovery),
    }
}

#[cfg(test)]
#[path = "tests/symbol_recovery_tests.rs"]
mod tests;
