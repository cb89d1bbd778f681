//! The reference compiler toolchain.
//!
//! A classic multi-pass compiler with long-lived mutable state: sources are parsed into
//! units, entered jointly into one symbol table, their annotations are flushed, then a todo
//! queue of work units (one per top-level class) is attributed. The symbol graph it builds is
//! mutable and cyclic; the type mapper translates it into the immutable type graph.

pub mod annotate;
pub mod attribute;
pub mod classpath;
pub mod compiler_log;
pub mod enter;
pub mod parser;
pub mod symbols;
pub mod syntax;
pub mod tokenizer {
    pub mod tokenizer;
    pub mod tokens;
}

use crate::compiler_frontend::compiler_errors::{CompilerError, ErrorLocation};
use crate::compiler_frontend::compiler_warnings::CompilerWarning;
use crate::compiler_frontend::toolchain::annotate::{
    AnnotatedElement, Annotate, AnnotationProcessor, GeneratedSource, annotated_elements,
    resolve_pending,
};
use crate::compiler_frontend::toolchain::classpath::{ClasspathEntry, FileManager};
use crate::compiler_frontend::toolchain::compiler_log::CompilerLog;
use crate::compiler_frontend::toolchain::enter::{
    AnnotationQueue, EnterMode, EntryBatch, Resolver, add_bridges, check_imports,
    declare_classes, enter_header, enter_members,
};
use crate::compiler_frontend::toolchain::parser::parse_source;
use crate::compiler_frontend::toolchain::symbols::{InternalAnnotation, InternalType, SymbolId, SymbolTable};
use crate::compiler_frontend::toolchain::syntax::{CompilationUnit, NodeId};
use crate::{attribution_log, return_attribution_error, return_session_misuse, session_log};
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::rc::Rc;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UnitId(pub u32);

impl UnitId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Everything entry and attribution learned about one unit, keyed by syntax node
#[derive(Default)]
pub struct UnitTables {
    /// Declarations (classes, members, parameters, locals, type parameters) to their symbols
    pub decl_symbols: FxHashMap<NodeId, SymbolId>,

    /// Attributed expression types
    pub expr_types: FxHashMap<NodeId, InternalType>,

    /// Selected symbol of names, field accesses, invocations and instance creations.
    /// Inapplicable invocations point at an error symbol holding the candidates.
    pub expr_symbols: FxHashMap<NodeId, SymbolId>,

    /// Method type of invocations and instance creations after inference
    pub invocation_types: FxHashMap<NodeId, InternalType>,

    /// Resolved type syntax
    pub type_trees: FxHashMap<NodeId, InternalType>,

    /// Annotations written on array dimensions
    pub type_annotations: FxHashMap<NodeId, Vec<InternalAnnotation>>,

    pub diagnostics: Vec<CompilerWarning>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WorkUnit {
    pub unit: UnitId,
    pub class: SymbolId,
}

/// Round counters of the stateful subsystems. A new round drops per-round scratch state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Rounds {
    pub checker: u32,
    pub annotate: u32,
    pub enter: u32,
    pub modules: u32,
}

pub struct Toolchain {
    pub symbols: SymbolTable,
    pub log: CompilerLog,

    units: Vec<Rc<CompilationUnit>>,
    tables: Vec<UnitTables>,

    todo: VecDeque<WorkUnit>,
    annotate: Annotate,

    // Checker scratch state for the current round
    attributed: FxHashSet<SymbolId>,
    rounds: Rounds,
}

impl Toolchain {
    pub fn new(classpath: Vec<ClasspathEntry>) -> Self {
        Toolchain {
            symbols: SymbolTable::new(FileManager::new(classpath)),
            log: CompilerLog::new(),
            units: Vec::new(),
            tables: Vec::new(),
            todo: VecDeque::new(),
            annotate: Annotate::default(),
            attributed: FxHashSet::default(),
            rounds: Rounds::default(),
        }
    }

    /// -----------------------------
    /// PARSE
    /// -----------------------------
    pub fn parse(&mut self, source: &str, path: &Path) -> Result<UnitId, CompilerError> {
        if !self.log.mark_parsed(path) {
            return_session_misuse!(
                format!("{} was already parsed in this session", path.display()),
                ErrorLocation::for_file(path),
                {
                    CompilationStage => "Parsing",
                    PrimarySuggestion => "Call reset() or reset_locations() before parsing it again",
                }
            );
        }

        let unit = parse_source(source, path, &mut self.symbols.names)?;

        let id = UnitId(self.units.len() as u32);
        self.units.push(Rc::new(unit));
        self.tables.push(UnitTables::default());
        Ok(id)
    }

    pub fn unit(&self, id: UnitId) -> &Rc<CompilationUnit> {
        &self.units[id.index()]
    }

    pub fn tables(&self, id: UnitId) -> &UnitTables {
        &self.tables[id.index()]
    }

    /// Split borrow for building output: the mapper needs the symbol table mutably while the
    /// builder reads the unit's syntax and tables
    pub fn output_parts(
        &mut self,
        id: UnitId,
    ) -> (&mut SymbolTable, Rc<CompilationUnit>, &UnitTables) {
        (
            &mut self.symbols,
            Rc::clone(&self.units[id.index()]),
            &self.tables[id.index()],
        )
    }

    /// -----------------------------
    /// MODULES
    /// -----------------------------
    pub fn init_modules(&mut self, ids: &[UnitId]) {
        for id in ids {
            let package = self.units[id.index()].package_name(&self.symbols.names);
            self.symbols.enter_package(&package);
        }
    }

    /// -----------------------------
    /// ENTER
    /// -----------------------------
    /// Joint symbol entry for a batch. Source units queue their top-level classes for
    /// attribution, dependency units only become visible.
    pub fn enter_all(&mut self, ids: &[UnitId], mode: EnterMode) -> Result<(), CompilerError> {
        let units: Vec<Rc<CompilationUnit>> = ids
            .iter()
            .map(|id| Rc::clone(&self.units[id.index()]))
            .collect();
        let mut batch = EntryBatch::new(units.iter().map(|unit| &unit.source_path));

        let mut declared = Vec::with_capacity(units.len());
        for (id, unit) in ids.iter().zip(&units) {
            declared.push(declare_classes(
                &mut self.symbols,
                unit,
                &mut self.tables[id.index()],
                &mut batch,
                &self.log,
            )?);
        }

        for ((id, unit), classes) in ids.iter().zip(&units).zip(&declared) {
            let tables = &mut self.tables[id.index()];
            check_imports(&mut Resolver::new(&mut self.symbols, unit, None, Some(&mut *tables)));

            for (class, path) in classes {
                let Some(decl) = unit.class_at(path) else {
                    continue;
                };
                let mut resolver =
                    Resolver::new(&mut self.symbols, unit, Some(*class), Some(&mut *tables));
                enter_header(&mut resolver, *class, decl)?;
            }
        }

        for ((id, unit), classes) in ids.iter().zip(&units).zip(&declared) {
            let tables = &mut self.tables[id.index()];
            let mut queue = AnnotationQueue::Deferred {
                unit: *id,
                pending: &mut self.annotate.pending,
            };

            for (class, path) in classes {
                let Some(decl) = unit.class_at(path) else {
                    continue;
                };
                let mut resolver =
                    Resolver::new(&mut self.symbols, unit, Some(*class), Some(&mut *tables));
                enter_members(&mut resolver, *class, decl, &mut queue)?;
            }
        }

        for classes in &declared {
            for (class, _) in classes {
                add_bridges(&mut self.symbols, *class);
            }
        }

        if mode == EnterMode::Source {
            for (id, classes) in ids.iter().zip(&declared) {
                for (class, path) in classes {
                    if path.len() == 1 {
                        self.todo.push_back(WorkUnit {
                            unit: *id,
                            class: *class,
                        });
                        self.annotate.block();
                    }
                }
            }
        }

        Ok(())
    }

    /// -----------------------------
    /// ANNOTATIONS
    /// -----------------------------
    pub fn annotation_blocks(&self) -> usize {
        self.annotate.blocks()
    }

    /// Resolves every queued annotation and drains the block counter to zero.
    /// Returns how many blocks were released.
    pub fn unblock_annotations(&mut self) -> Result<usize, CompilerError> {
        let pending = std::mem::take(&mut self.annotate.pending);
        let mut result = Ok(());

        for annotation in &pending {
            let unit = Rc::clone(&self.units[annotation.unit.index()]);
            let tables = &mut self.tables[annotation.unit.index()];
            if let Err(e) = resolve_pending(&mut self.symbols, &unit, tables, annotation) {
                // Later annotations are still resolved
                result = Err(e);
            }
        }

        let released = self.annotate.unblock_all();
        result.map(|_| released)
    }

    pub fn annotated_elements(&self) -> Vec<AnnotatedElement> {
        let queued: Vec<SymbolId> = self.todo.iter().map(|work| work.class).collect();
        annotated_elements(&self.symbols, &queued)
    }

    /// Runs every processor once over the queued classes and collects what they generate
    pub fn process_annotations(
        &mut self,
        processors: &mut [Box<dyn AnnotationProcessor>],
    ) -> Vec<GeneratedSource> {
        let elements = self.annotated_elements();
        let mut generated = Vec::new();

        for processor in processors.iter_mut() {
            let supported = processor.supported_annotations();
            let relevant: Vec<AnnotatedElement> = elements
                .iter()
                .filter(|element| {
                    supported
                        .iter()
                        .any(|name| name == "*" || *name == element.annotation)
                })
                .cloned()
                .collect();

            if relevant.is_empty() {
                continue;
            }

            generated.extend(processor.process(&relevant));
        }

        generated
    }

    /// -----------------------------
    /// ATTRIBUTE
    /// -----------------------------
    pub fn next_work(&mut self) -> Option<WorkUnit> {
        self.todo.pop_front()
    }

    pub fn pending_work(&self) -> usize {
        self.todo.len()
    }

    pub fn attribute(&mut self, work: WorkUnit) -> Result<(), CompilerError> {
        let unit = Rc::clone(&self.units[work.unit.index()]);

        if self.annotate.blocks() > 0 {
            return_attribution_error!(
                format!(
                    "Attribution started while {} annotation blocks remain",
                    self.annotate.blocks()
                ),
                ErrorLocation::for_file(&unit.source_path),
                {
                    CompilationStage => "Attribution",
                    PrimarySuggestion => "Unblock annotations before attributing",
                }
            );
        }

        if !self.attributed.insert(work.class) {
            return Ok(());
        }

        attribution_log!("Attributing ", Blue {self.symbols.flat_name(work.class)});
        attribute::attribute_class(
            &mut self.symbols,
            &unit,
            &mut self.tables[work.unit.index()],
            work.class,
        )
    }

    /// Moves a unit's warnings, and anything the classpath reported, into the log
    pub fn record_diagnostics(&mut self, id: UnitId) {
        for warning in self.symbols.file_manager.take_warnings() {
            self.log.report(warning);
        }
        for warning in &self.tables[id.index()].diagnostics {
            self.log.report(warning.clone());
        }
    }

    /// -----------------------------
    /// SESSION
    /// -----------------------------
    pub fn rounds(&self) -> Rounds {
        self.rounds
    }

    pub fn new_round(&mut self) {
        self.rounds.checker += 1;
        self.rounds.annotate += 1;
        self.rounds.enter += 1;
        self.rounds.modules += 1;

        self.todo.clear();
        self.attributed.clear();
        self.annotate.new_round();
    }

    /// Forgets everything this session parsed and entered. Classpath entries are kept.
    pub fn reset(&mut self) {
        self.log.clear();
        self.symbols.clear();
        self.symbols.file_manager.flush();
        self.units.clear();
        self.tables.clear();
        self.new_round();
        session_log!(Yellow "Toolchain reset, round ", {self.rounds.checker});
    }

    /// Lets the given locations be parsed again. Symbols already entered from them stay
    /// until a later entry replaces them.
    pub fn reset_locations(&mut self, paths: &[PathBuf]) {
        self.log.forget(paths);
        self.symbols.file_manager.flush();
        self.new_round();
    }

    pub fn set_classpath(&mut self, entries: Vec<ClasspathEntry>) {
        self.symbols.file_manager.set_entries(entries);
    }
}

#[cfg(test)]
#[path = "tests/toolchain_tests.rs"]
mod tests;
