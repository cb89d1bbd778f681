//! Where non-fatal faults of a batch go.
//!
//! Entry, attribution and output-building faults never abort a submission. They are reported
//! here and the batch carries on. Session misuse is not a fault of this kind and is returned
//! as an `Err` instead.

use crate::compiler_frontend::compiler_errors::CompilerError;
use crate::compiler_frontend::display_messages::print_formatted_error;
use saying::say;
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Stage {
    Parse,
    Enter,
    Annotate,
    Attribute,
    BuildTree,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Parse => "parse",
            Stage::Enter => "enter",
            Stage::Annotate => "annotate",
            Stage::Attribute => "attribute",
            Stage::BuildTree => "build tree",
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct AttributionFault {
    pub stage: Stage,
    pub cause: CompilerError,
}

impl AttributionFault {
    pub fn new(stage: Stage, cause: CompilerError) -> Self {
        AttributionFault { stage, cause }
    }
}

pub trait ErrorSink {
    fn report(&mut self, fault: AttributionFault);
}

/// Keeps every fault for the caller to inspect after the batch
#[derive(Default, Debug)]
pub struct CollectingSink {
    pub faults: Vec<AttributionFault>,
}

impl CollectingSink {
    pub fn new() -> Self {
        CollectingSink::default()
    }

    pub fn take(&mut self) -> Vec<AttributionFault> {
        std::mem::take(&mut self.faults)
    }

    pub fn in_stage(&self, stage: Stage) -> impl Iterator<Item = &AttributionFault> + '_ {
        self.faults.iter().filter(move |fault| fault.stage == stage)
    }
}

impl ErrorSink for CollectingSink {
    fn report(&mut self, fault: AttributionFault) {
        self.faults.push(fault);
    }
}

/// Prints each fault as it arrives
#[derive(Default, Clone, Copy)]
pub struct LoggingSink;

impl ErrorSink for LoggingSink {
    fn report(&mut self, fault: AttributionFault) {
        say!(Yellow "Fault during ", Bold {fault.stage.as_str()}, Reset ":");
        print_formatted_error(fault.cause);
    }
}

#[derive(Default, Clone, Copy)]
pub struct IgnoringSink;

impl ErrorSink for IgnoringSink {
    fn report(&mut self, _: AttributionFault) {}
}

impl<F: FnMut(AttributionFault)> ErrorSink for F {
    fn report(&mut self, fault: AttributionFault) {
        self(fault)
    }
}

#[cfg(test)]
#[path = "tests/error_sink_tests.rs"]
mod tests;
