use super::*;
use crate::compiler_frontend::compiler_errors::{ErrorLocation, ErrorType};
use std::path::Path;

fn fault(stage: Stage, msg: &str) -> AttributionFault {
    AttributionFault::new(
        stage,
        CompilerError::new(msg, ErrorLocation::for_file(Path::new("A.java")), ErrorType::Attribution),
    )
}

#[test]
fn collecting_sink_keeps_faults_in_order() {
    let mut sink = CollectingSink::new();
    sink.report(fault(Stage::Enter, "first"));
    sink.report(fault(Stage::Attribute, "second"));
    sink.report(fault(Stage::Attribute, "third"));

    assert_eq!(sink.in_stage(Stage::Attribute).count(), 2);
    let taken = sink.take();
    assert_eq!(
        taken.iter().map(|fault| fault.cause.msg.as_str()).collect::<Vec<_>>(),
        vec!["first", "second", "third"]
    );
    assert!(sink.faults.is_empty());
}

#[test]
fn closures_are_sinks() {
    let mut stages = Vec::new();
    {
        let mut sink = |fault: AttributionFault| stages.push(fault.stage);
        let sink: &mut dyn ErrorSink = &mut sink;
        sink.report(fault(Stage::BuildTree, "tree"));
        sink.report(fault(Stage::Parse, "parse"));
    }

    assert_eq!(stages, vec![Stage::BuildTree, Stage::Parse]);
}

#[test]
fn ignoring_sink_drops_everything() {
    let mut sink = IgnoringSink;
    sink.report(fault(Stage::Enter, "gone"));
}
