use super::*;
use crate::compiler_frontend::compiler_errors::ErrorType;
use crate::compiler_frontend::compiler_warnings::WarningKind;
use crate::compiler_frontend::toolchain::enter::EnterMode;

fn entered(toolchain: &mut Toolchain, path: &str, source: &str) -> UnitId {
    let id = toolchain
        .parse(source, Path::new(path))
        .expect("source should parse");
    toolchain.init_modules(&[id]);
    toolchain
        .enter_all(&[id], EnterMode::Source)
        .expect("entry should succeed");
    id
}

struct Recorder {
    seen: Vec<AnnotatedElement>,
}

impl AnnotationProcessor for Recorder {
    fn supported_annotations(&self) -> Vec<String> {
        vec!["Generate".to_owned()]
    }

    fn process(&mut self, elements: &[AnnotatedElement]) -> Vec<GeneratedSource> {
        self.seen.extend_from_slice(elements);
        elements
            .iter()
            .map(|element| GeneratedSource {
                path: PathBuf::from(format!("{}Helper.java", element.element)),
                source: format!("class {}Helper {{}}", element.element),
            })
            .collect()
    }
}

#[test]
fn parsing_the_same_path_twice_is_misuse() {
    let mut toolchain = Toolchain::new(Vec::new());
    toolchain
        .parse("class A {}", Path::new("A.java"))
        .expect("first parse");

    let Err(e) = toolchain.parse("class A {}", Path::new("A.java")) else {
        panic!("the second parse should be refused");
    };
    assert_eq!(e.error_type, ErrorType::SessionMisuse);
}

#[test]
fn failed_parses_still_count_as_parsed() {
    let mut toolchain = Toolchain::new(Vec::new());
    assert!(toolchain.parse("class {", Path::new("Broken.java")).is_err());
    assert!(toolchain.log.was_parsed(Path::new("Broken.java")));
}

#[test]
fn source_entry_queues_one_work_unit_per_top_level_class() {
    let mut toolchain = Toolchain::new(Vec::new());
    entered(
        &mut toolchain,
        "Two.java",
        "class A { class Nested {} } class B {}",
    );

    assert_eq!(toolchain.pending_work(), 2);
    assert_eq!(toolchain.annotation_blocks(), 2);
}

#[test]
fn dependency_entry_queues_nothing() {
    let mut toolchain = Toolchain::new(Vec::new());
    let id = toolchain
        .parse("class Dep {}", Path::new("Dep.java"))
        .expect("parsed");
    toolchain
        .enter_all(&[id], EnterMode::Dependency)
        .expect("entered");

    assert_eq!(toolchain.pending_work(), 0);
    assert!(toolchain.symbols.entered_class("Dep").is_some());
}

#[test]
fn attribution_is_refused_while_annotations_block() {
    let mut toolchain = Toolchain::new(Vec::new());
    entered(&mut toolchain, "A.java", "class A {}");

    let work = toolchain.next_work().expect("queued");
    let Err(e) = toolchain.attribute(work) else {
        panic!("attribution should wait for annotations");
    };
    assert_eq!(e.error_type, ErrorType::Attribution);

    toolchain.unblock_annotations().expect("flushed");
    toolchain.attribute(work).expect("now allowed");
}

#[test]
fn diagnostics_move_into_the_log() {
    let mut toolchain = Toolchain::new(Vec::new());
    let id = entered(
        &mut toolchain,
        "Imports.java",
        "import missing.Thing; class Imports {}",
    );
    toolchain.record_diagnostics(id);

    let warnings = toolchain.log.diagnostics_for(Path::new("Imports.java"));
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].warning_kind, WarningKind::UnresolvedImport);
}

#[test]
fn new_rounds_advance_every_counter_and_drop_the_queue() {
    let mut toolchain = Toolchain::new(Vec::new());
    entered(&mut toolchain, "A.java", "class A {}");

    toolchain.new_round();
    let rounds = toolchain.rounds();
    assert_eq!(rounds.checker, 1);
    assert_eq!(rounds.annotate, 1);
    assert_eq!(rounds.enter, 1);
    assert_eq!(rounds.modules, 1);

    assert_eq!(toolchain.pending_work(), 0);
    assert_eq!(toolchain.annotation_blocks(), 0);
}

#[test]
fn reset_forgets_sources_but_keeps_the_classpath() {
    let classpath = vec![ClasspathEntry::in_memory(
        "lib/Lib.java",
        "package lib; public class Lib {}",
    )];
    let mut toolchain = Toolchain::new(classpath.clone());
    entered(&mut toolchain, "A.java", "class A extends lib.Lib {}");

    toolchain.reset();
    assert!(toolchain.symbols.entered_class("A").is_none());
    assert_eq!(toolchain.log.parsed_count(), 0);
    assert_eq!(toolchain.symbols.file_manager.entries(), classpath.as_slice());

    entered(&mut toolchain, "A.java", "class A extends lib.Lib {}");
    assert!(toolchain.symbols.entered_class("lib.Lib").is_some());
}

#[test]
fn reset_locations_allows_reparsing_only_those_paths() {
    let mut toolchain = Toolchain::new(Vec::new());
    entered(&mut toolchain, "A.java", "class A {}");
    entered(&mut toolchain, "B.java", "class B {}");

    toolchain.reset_locations(&[PathBuf::from("A.java")]);
    assert!(toolchain.parse("class A {}", Path::new("A.java")).is_ok());
    assert!(toolchain.parse("class B {}", Path::new("B.java")).is_err());
}

#[test]
fn set_classpath_replaces_entries_and_drops_cached_reads() {
    let mut toolchain = Toolchain::new(Vec::new());
    assert!(toolchain.symbols.lookup_class("lib.Lib").is_none());
    assert!(toolchain.symbols.file_manager.is_loaded());

    toolchain.set_classpath(vec![ClasspathEntry::in_memory(
        "lib/Lib.java",
        "package lib; public class Lib {}",
    )]);
    assert!(!toolchain.symbols.file_manager.is_loaded());
    assert!(toolchain.symbols.lookup_class("lib.Lib").is_some());
}

#[test]
fn processors_see_only_their_annotations() {
    let mut toolchain = Toolchain::new(Vec::new());
    entered(
        &mut toolchain,
        "Gen.java",
        "@interface Generate {}
         @Generate class Model {}
         @Deprecated class Old {}",
    );
    toolchain.unblock_annotations().expect("flushed");

    let mut processors: Vec<Box<dyn AnnotationProcessor>> =
        vec![Box::new(Recorder { seen: Vec::new() })];
    let generated = toolchain.process_annotations(&mut processors);

    assert_eq!(
        generated,
        vec![GeneratedSource {
            path: PathBuf::from("ModelHelper.java"),
            source: "class ModelHelper {}".to_owned(),
        }]
    );
}
