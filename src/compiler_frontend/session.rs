//! Session lifecycle of a `CompilerFrontend`.
//!
//! A session keeps its symbols and type nodes across submissions. Sources that declare classes
//! already entered from another location need a reset first, otherwise the next submission
//! fails with a session misuse error.

use crate::compiler_frontend::compiler_errors::CompilerError;
use crate::compiler_frontend::error_sink::{AttributionFault, Stage};
use crate::compiler_frontend::toolchain::classpath::ClasspathEntry;
use crate::compiler_frontend::{CompilerFrontend, Phase};
use crate::{session_log, timer_log};
use std::path::PathBuf;
use std::time::Instant;

impl CompilerFrontend {
    /// Starts the session over. The type cache moves to a new generation, so no node id from
    /// before the reset is handed out again. Depended-on sources are loaded again before the
    /// next submission.
    pub fn reset(&mut self) {
        self.type_cache.clear();
        self.toolchain.reset();
        self.dependencies_loaded = false;
        self.phase = Phase::Idle;

        session_log!(
            Yellow "Session reset, type cache generation ",
            {self.type_cache.generation()}
        );
    }

    /// Lets the given locations be parsed again without dropping anything else. Classes they
    /// declared are replaced in place when they are entered again.
    ///
    /// The type cache is kept, so a `Class` node built before this call stays as it was. After
    /// the next submission, `AttributedClass::type_id` of a reparsed class still points at that
    /// node and its old members, while the attributed class lists the new ones. Call `reset`
    /// when the nodes have to follow the new declarations.
    pub fn reset_locations(&mut self, locations: &[PathBuf]) {
        self.toolchain.reset_locations(locations);
        self.phase = Phase::Idle;

        session_log!(Yellow "Reset ", {locations.len()}, " locations");
    }

    /// Used for symbol resolution from the next submission on
    pub fn set_classpath(&mut self, entries: Vec<ClasspathEntry>) {
        session_log!("Classpath now has ", {entries.len()}, " entries");
        self.toolchain.set_classpath(entries);
    }

    /// Parses and enters the depended-on sources so the next batch can see their classes.
    /// They share the session's symbol table but are never attributed or surfaced.
    pub fn load_dependencies(&mut self) -> Result<(), CompilerError> {
        self.dependencies_loaded = true;
        if self.depends_on.is_empty() {
            return Ok(());
        }

        let time = Instant::now();
        let sources = std::mem::take(&mut self.depends_on);

        let mut ids = Vec::with_capacity(sources.len());
        let mut result = Ok(());
        for source in &sources {
            match self.toolchain.parse(&source.source_code, &source.source_path) {
                Ok(id) => ids.push(id),
                Err(e) if e.is_fatal() => {
                    result = Err(e);
                    break;
                }
                Err(e) => self.sink.report(AttributionFault::new(Stage::Parse, e)),
            }
        }

        if result.is_ok() {
            result = self.enter_dependencies(&ids, Stage::Enter);
        }
        self.depends_on = sources;

        timer_log!(time, "Dependencies loaded in: ");
        result
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
