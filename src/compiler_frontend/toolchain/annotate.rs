//! Deferred annotations and the annotation processor hook.
//!
//! Source annotations can name classes declared anywhere in the batch, so entry only queues
//! them. Each queued top-level class also holds a block; attribution refuses to run until
//! the queue has been flushed and every block released.

use crate::compiler_frontend::compiler_errors::CompilerError;
use crate::compiler_frontend::toolchain::UnitId;
use crate::compiler_frontend::toolchain::UnitTables;
use crate::compiler_frontend::toolchain::enter::Resolver;
use crate::compiler_frontend::toolchain::symbols::{SymbolId, SymbolTable};
use crate::compiler_frontend::toolchain::syntax::{
    AnnotationSyntax, CompilationUnit, ElementValueSyntax,
};
use crate::symbol_log;
use std::path::PathBuf;

#[derive(Clone, Debug)]
pub enum PendingKind {
    Declaration(AnnotationSyntax),

    /// The `default` value of an annotation type element
    DefaultValue(ElementValueSyntax),
}

#[derive(Clone, Debug)]
pub struct PendingAnnotation {
    pub unit: UnitId,

    /// Class whose scope the annotation is resolved in
    pub scope: Option<SymbolId>,
    pub target: SymbolId,
    pub kind: PendingKind,
}

#[derive(Default)]
pub struct Annotate {
    blocks: usize,
    pub(crate) pending: Vec<PendingAnnotation>,
}

impl Annotate {
    pub fn block(&mut self) {
        self.blocks += 1;
    }

    pub fn blocks(&self) -> usize {
        self.blocks
    }

    pub fn unblock_all(&mut self) -> usize {
        std::mem::take(&mut self.blocks)
    }

    pub fn new_round(&mut self) {
        self.blocks = 0;
        self.pending.clear();
    }
}

pub fn resolve_pending(
    symbols: &mut SymbolTable,
    unit: &CompilationUnit,
    tables: &mut UnitTables,
    pending: &PendingAnnotation,
) -> Result<(), CompilerError> {
    let mut resolver = Resolver::new(symbols, unit, pending.scope, Some(tables));

    match &pending.kind {
        PendingKind::Declaration(syntax) => {
            let annotation = resolver.resolve_annotation(syntax)?;
            resolver
                .symbols
                .get_mut(pending.target)
                .annotations
                .push(annotation);
        }
        PendingKind::DefaultValue(syntax) => {
            let value = resolver.resolve_element_value(syntax)?;
            if let Some(method) = resolver.symbols.method_mut(pending.target) {
                method.default_value = Some(value);
            }
        }
    }

    Ok(())
}

/// -----------------------------
/// PROCESSORS
/// -----------------------------
/// An annotated declaration as processors see it
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnnotatedElement {
    /// Flat name of the annotation type
    pub annotation: String,

    /// Flat name of the class, or `Class#member` for members
    pub element: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratedSource {
    pub path: PathBuf,
    pub source: String,
}

/// Runs once per batch, after annotations are flushed. Generated sources are parsed and
/// entered like depended-on sources and are never surfaced as outputs.
pub trait AnnotationProcessor {
    /// Flat names of the annotation types this processor handles, `*` for all of them
    fn supported_annotations(&self) -> Vec<String>;

    fn process(&mut self, elements: &[AnnotatedElement]) -> Vec<GeneratedSource>;
}

/// Annotations on the given classes, their members and their nested classes
pub fn annotated_elements(symbols: &SymbolTable, classes: &[SymbolId]) -> Vec<AnnotatedElement> {
    let mut elements = Vec::new();
    let mut stack: Vec<SymbolId> = classes.iter().rev().copied().collect();

    while let Some(class) = stack.pop() {
        let Some(info) = symbols.class(class) else {
            continue;
        };
        let class_name = info.flat_name.as_str();

        push_annotations(symbols, class, class_name.to_owned(), &mut elements);

        for member in &info.members {
            if symbols.class(*member).is_some() {
                stack.push(*member);
                continue;
            }

            let element = format!("{class_name}#{}", symbols.name(*member));
            push_annotations(symbols, *member, element, &mut elements);
        }
    }

    symbol_log!("Found ", {elements.len()}, " annotated elements");
    elements
}

fn push_annotations(
    symbols: &SymbolTable,
    target: SymbolId,
    element: String,
    elements: &mut Vec<AnnotatedElement>,
) {
    for annotation in &symbols.get(target).annotations {
        if let Some(annotation_type) = annotation.annotation_type.class_symbol() {
            elements.push(AnnotatedElement {
                annotation: symbols.flat_name(annotation_type).to_owned(),
                element: element.clone(),
            });
        }
    }
}

#[cfg(test)]
#[path = "tests/annotate_tests.rs"]
mod tests;
