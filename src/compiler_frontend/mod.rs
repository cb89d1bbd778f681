pub mod compiler_messages {
    pub mod compiler_dev_logging;
    pub mod compiler_errors;
    pub mod compiler_warnings;
    pub mod display_messages;
}
pub use compiler_messages::compiler_errors;
pub use compiler_messages::compiler_warnings;
pub use compiler_messages::display_messages;

pub mod error_sink;
pub mod session;
pub mod string_interning;
pub mod toolchain;
pub mod tree_builder;
pub mod type_mapping;

use crate::compiler_frontend::compiler_errors::{CompilerError, ErrorLocation};
use crate::compiler_frontend::compiler_warnings::{CompilerWarning, WarningKind};
use crate::compiler_frontend::error_sink::{
    AttributionFault, ErrorSink, IgnoringSink, LoggingSink, Stage,
};
use crate::compiler_frontend::toolchain::annotate::{AnnotationProcessor, GeneratedSource};
use crate::compiler_frontend::toolchain::classpath::ClasspathEntry;
use crate::compiler_frontend::toolchain::enter::EnterMode;
use crate::compiler_frontend::toolchain::{Toolchain, UnitId};
use crate::compiler_frontend::tree_builder::attributed_tree::{AttributedUnit, ParseErrorUnit};
use crate::compiler_frontend::tree_builder::{DeclarationTreeBuilder, TreeBuilder, TreeInput};
use crate::compiler_frontend::type_mapping::signatures::{DefaultSignatureBuilder, SignatureBuilder};
use crate::compiler_frontend::type_mapping::symbol_recovery::{
    CandidateRecovery, SymbolRecovery, recovery_for,
};
use crate::compiler_frontend::type_mapping::type_cache::TypeCache;
use crate::compiler_frontend::type_mapping::type_mapper::TypeMapper;
use crate::projects::settings::Config;
use crate::{return_file_error, session_log, timer_log};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Flags change the behavior of the CLI around a session.
/// Builders embedding the frontend can decide how to choose them.
#[derive(PartialEq, Debug, Clone)]
pub enum Flag {
    DisableTimers,
    Json,
    ShowDiagnostics,
}

/// How far the current batch has got. `Attributed` is terminal for a batch,
/// the next submission starts again from `Idle`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Phase {
    Idle,
    Parsed,
    ModulesInitialized,
    SymbolsEntered,
    AnnotationsUnblocked,
    AnnotationsProcessed,
    Attributed,
}

#[derive(Clone, Debug)]
pub struct InputFile {
    pub source_code: String,
    pub source_path: PathBuf,
}

impl InputFile {
    pub fn new(source_path: impl Into<PathBuf>, source_code: impl Into<String>) -> Self {
        InputFile {
            source_code: source_code.into(),
            source_path: source_path.into(),
        }
    }

    pub fn read(path: &Path) -> Result<InputFile, CompilerError> {
        match fs::read_to_string(path) {
            Ok(source_code) => Ok(InputFile::new(path, source_code)),
            Err(e) => return_file_error!(path, format!("Could not read source file: {e}")),
        }
    }
}

/// The result of one input, in input order
#[derive(Debug, Clone)]
pub enum SourceOutcome {
    Attributed(AttributedUnit),
    ParseError(ParseErrorUnit),
}

impl SourceOutcome {
    pub fn source_path(&self) -> &Path {
        match self {
            SourceOutcome::Attributed(unit) => &unit.source_path,
            SourceOutcome::ParseError(unit) => &unit.source_path,
        }
    }

    pub fn attributed(&self) -> Option<&AttributedUnit> {
        match self {
            SourceOutcome::Attributed(unit) => Some(unit),
            SourceOutcome::ParseError(_) => None,
        }
    }
}

/// One attribution session.
///
/// Owns the toolchain's long-lived symbol table and the type cache, so it must only ever be
/// driven from one thread at a time. Several sessions are independent of each other.
pub struct CompilerFrontend {
    toolchain: Toolchain,
    type_cache: TypeCache,

    signatures: Box<dyn SignatureBuilder>,
    recovery: Box<dyn SymbolRecovery>,
    tree_builder: Box<dyn TreeBuilder>,
    sink: Box<dyn ErrorSink>,
    processors: Vec<Box<dyn AnnotationProcessor>>,

    depends_on: Vec<InputFile>,
    dependencies_loaded: bool,
    phase: Phase,
}

impl CompilerFrontend {
    pub fn new(classpath: Vec<ClasspathEntry>) -> Self {
        CompilerFrontend {
            toolchain: Toolchain::new(classpath),
            type_cache: TypeCache::new(),
            signatures: Box::new(DefaultSignatureBuilder),
            recovery: Box::new(CandidateRecovery),
            tree_builder: Box::new(DeclarationTreeBuilder),
            sink: Box::new(IgnoringSink),
            processors: Vec::new(),
            depends_on: Vec::new(),
            dependencies_loaded: false,
            phase: Phase::Idle,
        }
    }

    /// Classpath, depended-on sources, recovery and fault logging all come from the config.
    /// Depended-on sources are read here and parsed before the first submission.
    pub fn from_config(config: &Config) -> Result<Self, CompilerError> {
        let classpath = config
            .classpath
            .iter()
            .cloned()
            .map(ClasspathEntry::Path)
            .collect();

        let mut depends_on = Vec::with_capacity(config.depends_on.len());
        for path in &config.depends_on {
            depends_on.push(InputFile::read(path)?);
        }

        let mut frontend = CompilerFrontend::new(classpath).with_depends_on(depends_on);
        frontend.recovery = recovery_for(config.recovery);
        if config.log_attribution_faults {
            frontend.sink = Box::new(LoggingSink);
        }

        Ok(frontend)
    }

    pub fn with_sink(mut self, sink: impl ErrorSink + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    pub fn with_tree_builder(mut self, tree_builder: impl TreeBuilder + 'static) -> Self {
        self.tree_builder = Box::new(tree_builder);
        self
    }

    pub fn with_signature_builder(mut self, signatures: impl SignatureBuilder + 'static) -> Self {
        self.signatures = Box::new(signatures);
        self
    }

    pub fn with_recovery(mut self, recovery: impl SymbolRecovery + 'static) -> Self {
        self.recovery = Box::new(recovery);
        self
    }

    pub fn with_processor(mut self, processor: impl AnnotationProcessor + 'static) -> Self {
        self.processors.push(Box::new(processor));
        self
    }

    pub fn with_depends_on(mut self, depends_on: Vec<InputFile>) -> Self {
        self.depends_on = depends_on;
        self.dependencies_loaded = false;
        self
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn type_cache(&self) -> &TypeCache {
        &self.type_cache
    }

    pub fn toolchain(&self) -> &Toolchain {
        &self.toolchain
    }

    /// Every warning the toolchain logged in this session
    pub fn warnings(&self) -> Vec<CompilerWarning> {
        self.toolchain.log.all_warnings()
    }

    /// A mapper over this session's symbols and cache, for resolving types outside a submission
    pub fn type_mapper(&mut self) -> TypeMapper<'_> {
        TypeMapper::new(
            &mut self.toolchain.symbols,
            &mut self.type_cache,
            self.signatures.as_ref(),
            self.recovery.as_ref(),
        )
    }

    /// -----------------------------
    /// SUBMISSION
    /// -----------------------------
    /// Parses, enters and attributes a batch of inputs jointly, then builds one outcome per
    /// input in input order. Only session misuse is returned as an `Err`. Every other fault is
    /// reported to the sink and the batch carries on.
    pub fn submit(
        &mut self,
        inputs: &[InputFile],
        relative_to: Option<&Path>,
    ) -> Result<Vec<SourceOutcome>, CompilerError> {
        if !self.dependencies_loaded {
            self.load_dependencies()?;
        }
        self.phase = Phase::Idle;

        let time = Instant::now();

        // ----------------------------------
        //              Parse
        // ----------------------------------
        let mut parsed: Vec<Result<UnitId, CompilerError>> = Vec::with_capacity(inputs.len());
        for input in inputs {
            match self.toolchain.parse(&input.source_code, &input.source_path) {
                Ok(id) => parsed.push(Ok(id)),
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    self.sink.report(AttributionFault::new(Stage::Parse, e.clone()));
                    parsed.push(Err(e));
                }
            }
        }

        let ids: Vec<UnitId> = parsed
            .iter()
            .filter_map(|result| result.as_ref().ok().copied())
            .collect();
        self.phase = Phase::Parsed;

        timer_log!(time, "Parsed in: ");

        // ----------------------------------
        //       Modules and symbol entry
        // ----------------------------------
        // Joint over the whole batch so references across inputs resolve in any order
        let time = Instant::now();

        self.toolchain.init_modules(&ids);
        self.phase = Phase::ModulesInitialized;

        if let Err(e) = self.toolchain.enter_all(&ids, EnterMode::Source) {
            if e.is_fatal() {
                return Err(e);
            }
            self.sink.report(AttributionFault::new(Stage::Enter, e));
        }
        self.phase = Phase::SymbolsEntered;

        timer_log!(time, "Symbols entered in: ");

        // ----------------------------------
        //            Annotations
        // ----------------------------------
        // The block counter must reach zero even with no processors configured
        let time = Instant::now();

        if let Err(e) = self.toolchain.unblock_annotations() {
            self.sink.report(AttributionFault::new(Stage::Annotate, e));
        }
        self.phase = Phase::AnnotationsUnblocked;

        if !self.processors.is_empty() {
            let generated = self.toolchain.process_annotations(&mut self.processors);
            self.enter_generated(generated)?;
            self.phase = Phase::AnnotationsProcessed;
        }

        timer_log!(time, "Annotations flushed in: ");

        // ----------------------------------
        //            Attribution
        // ----------------------------------
        let time = Instant::now();

        while let Some(work) = self.toolchain.next_work() {
            if let Err(e) = self.toolchain.attribute(work) {
                self.sink.report(AttributionFault::new(Stage::Attribute, e));
            }
        }
        for id in &ids {
            self.toolchain.record_diagnostics(*id);
        }
        self.phase = Phase::Attributed;

        timer_log!(time, "Attributed in: ");

        // ----------------------------------
        //          Output building
        // ----------------------------------
        let time = Instant::now();

        let mut outcomes = Vec::with_capacity(inputs.len());
        for (input, result) in inputs.iter().zip(parsed) {
            let source_path = relative_path(&input.source_path, relative_to);
            let outcome = match result {
                Ok(id) => self.build_output(id, source_path),
                Err(fault) => SourceOutcome::ParseError(ParseErrorUnit { source_path, fault }),
            };
            outcomes.push(outcome);
        }

        timer_log!(time, "Output built in: ");

        Ok(outcomes)
    }

    fn build_output(&mut self, id: UnitId, source_path: PathBuf) -> SourceOutcome {
        let (symbols, unit, tables) = self.toolchain.output_parts(id);
        let mut mapper = TypeMapper::new(
            symbols,
            &mut self.type_cache,
            self.signatures.as_ref(),
            self.recovery.as_ref(),
        );

        let input = TreeInput {
            unit: &unit,
            tables,
            source_path: source_path.clone(),
        };

        match self.tree_builder.build(&input, &mut mapper) {
            Ok(attributed) => SourceOutcome::Attributed(attributed),
            Err(fault) => {
                let fault = fault.with_file_path(unit.source_path.clone());
                self.sink
                    .report(AttributionFault::new(Stage::BuildTree, fault.clone()));
                SourceOutcome::ParseError(ParseErrorUnit { source_path, fault })
            }
        }
    }

    /// Generated sources are entered like depended-on sources and never surfaced
    fn enter_generated(&mut self, generated: Vec<GeneratedSource>) -> Result<(), CompilerError> {
        let mut ids = Vec::with_capacity(generated.len());
        for source in generated {
            session_log!("Generated ", Blue {source.path.display()});
            self.toolchain.log.report(CompilerWarning::new(
                format!("generated {}", source.path.display()),
                ErrorLocation::for_file(&source.path),
                WarningKind::AnnotationProcessorOutput,
            ));

            match self.toolchain.parse(&source.source, &source.path) {
                Ok(id) => ids.push(id),
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => self.sink.report(AttributionFault::new(Stage::Annotate, e)),
            }
        }

        self.enter_dependencies(&ids, Stage::Annotate)
    }

    /// Module init, entry and annotation flush for sources that are never attributed
    fn enter_dependencies(&mut self, ids: &[UnitId], stage: Stage) -> Result<(), CompilerError> {
        if ids.is_empty() {
            return Ok(());
        }

        self.toolchain.init_modules(ids);
        if let Err(e) = self.toolchain.enter_all(ids, EnterMode::Dependency) {
            if e.is_fatal() {
                return Err(e);
            }
            self.sink.report(AttributionFault::new(stage, e));
        }
        if let Err(e) = self.toolchain.unblock_annotations() {
            self.sink.report(AttributionFault::new(stage, e));
        }

        Ok(())
    }
}

fn relative_path(path: &Path, relative_to: Option<&Path>) -> PathBuf {
    match relative_to.and_then(|base| path.strip_prefix(base).ok()) {
        Some(relative) => relative.to_path_buf(),
        None => path.to_path_buf(),
    }
}

#[cfg(test)]
#[path = "tests/frontend_tests.rs"]
mod tests;
