use super::*;
use crate::compiler_frontend::compiler_errors::ErrorType;
use crate::compiler_frontend::toolchain::annotate::AnnotatedElement;
use crate::compiler_frontend::tree_builder::attributed_tree::ReferenceKind;
use crate::compiler_frontend::type_mapping::java_types::TypeId;
use std::cell::RefCell;
use std::rc::Rc;

fn collecting_frontend() -> (CompilerFrontend, Rc<RefCell<Vec<AttributionFault>>>) {
    let faults = Rc::new(RefCell::new(Vec::new()));
    let seen = Rc::clone(&faults);
    let frontend = CompilerFrontend::new(Vec::new())
        .with_sink(move |fault: AttributionFault| seen.borrow_mut().push(fault));
    (frontend, faults)
}

fn stages(faults: &Rc<RefCell<Vec<AttributionFault>>>) -> Vec<Stage> {
    faults.borrow().iter().map(|fault| fault.stage).collect()
}

#[test]
fn outcomes_follow_input_order() {
    let mut frontend = CompilerFrontend::new(Vec::new());
    assert_eq!(frontend.phase(), Phase::Idle);

    let outcomes = frontend
        .submit(
            &[
                InputFile::new("B.java", "class B { A owner; }"),
                InputFile::new("A.java", "class A { B makeB() { return null; } }"),
            ],
            None,
        )
        .expect("no misuse");

    let paths: Vec<&Path> = outcomes.iter().map(SourceOutcome::source_path).collect();
    assert_eq!(paths, vec![Path::new("B.java"), Path::new("A.java")]);
    assert!(outcomes.iter().all(|outcome| outcome.attributed().is_some()));
    assert_eq!(frontend.phase(), Phase::Attributed);
}

#[test]
fn syntax_errors_only_affect_their_own_input() {
    let (mut frontend, faults) = collecting_frontend();

    let outcomes = frontend
        .submit(
            &[
                InputFile::new("Broken.java", "class {"),
                InputFile::new("Good.java", "class Good { int size; }"),
            ],
            None,
        )
        .expect("no misuse");

    let SourceOutcome::ParseError(broken) = &outcomes[0] else {
        panic!("the broken input should be a parse error");
    };
    assert_eq!(broken.fault.error_type, ErrorType::Syntax);
    assert_eq!(broken.source_path, Path::new("Broken.java"));

    let good = outcomes[1].attributed().expect("the good input is attributed");
    assert!(good.class_named("Good").is_some());
    assert_eq!(stages(&faults), vec![Stage::Parse]);
}

#[test]
fn attribution_faults_are_reported_and_the_batch_continues() {
    let (mut frontend, faults) = collecting_frontend();

    let outcomes = frontend
        .submit(
            &[
                InputFile::new("Cycle.java", "class A extends B {} class B extends A {}"),
                InputFile::new("Fine.java", "class Fine { int one() { return 1; } }"),
            ],
            None,
        )
        .expect("no misuse");

    assert!(stages(&faults).contains(&Stage::Attribute));

    let fine = outcomes[1].attributed().expect("Fine is attributed");
    let fine = fine.class_named("Fine").expect("Fine is surfaced");
    let literal = fine
        .references_of(ReferenceKind::Expression)
        .next()
        .expect("the literal is typed");
    assert_eq!(literal.type_id, TypeId::INT);
}

#[test]
fn output_paths_are_relative_to_the_base() {
    let mut frontend = CompilerFrontend::new(Vec::new());
    let outcomes = frontend
        .submit(
            &[
                InputFile::new("src/shapes/Square.java", "package shapes; class Square {}"),
                InputFile::new("elsewhere/Other.java", "class Other {}"),
            ],
            Some(Path::new("src")),
        )
        .expect("no misuse");

    assert_eq!(outcomes[0].source_path(), Path::new("shapes/Square.java"));
    assert_eq!(outcomes[1].source_path(), Path::new("elsewhere/Other.java"));
}

#[test]
fn resubmitting_a_location_without_reset_is_misuse() {
    let mut frontend = CompilerFrontend::new(Vec::new());
    frontend
        .submit(&[InputFile::new("A.java", "class A {}")], None)
        .expect("first submission");

    let error = frontend
        .submit(&[InputFile::new("A.java", "class A {}")], None)
        .expect_err("the second submission should be refused");
    assert_eq!(error.error_type, ErrorType::SessionMisuse);
}

#[test]
fn builder_failures_become_parse_errors() {
    struct Failing;

    impl TreeBuilder for Failing {
        fn build(
            &self,
            input: &TreeInput<'_>,
            _: &mut TypeMapper<'_>,
        ) -> Result<AttributedUnit, CompilerError> {
            Err(CompilerError::compiler_error(format!(
                "cannot build {}",
                input.source_path.display()
            )))
        }
    }

    let faults = Rc::new(RefCell::new(Vec::new()));
    let seen = Rc::clone(&faults);
    let mut frontend = CompilerFrontend::new(Vec::new())
        .with_tree_builder(Failing)
        .with_sink(move |fault: AttributionFault| seen.borrow_mut().push(fault));

    let outcomes = frontend
        .submit(&[InputFile::new("A.java", "class A {}")], None)
        .expect("no misuse");

    let SourceOutcome::ParseError(failed) = &outcomes[0] else {
        panic!("a failed build should be a parse error");
    };
    assert_eq!(failed.fault.msg, "cannot build A.java");
    assert_eq!(stages(&faults), vec![Stage::BuildTree]);
}

#[test]
fn generated_sources_are_visible_but_not_surfaced() {
    struct Helpers;

    impl AnnotationProcessor for Helpers {
        fn supported_annotations(&self) -> Vec<String> {
            vec!["Generate".to_owned()]
        }

        fn process(&mut self, elements: &[AnnotatedElement]) -> Vec<GeneratedSource> {
            elements
                .iter()
                .map(|element| GeneratedSource {
                    path: PathBuf::from(format!("generated/{}Helper.java", element.element)),
                    source: format!("class {}Helper {{ int help; }}", element.element),
                })
                .collect()
        }
    }

    let mut frontend = CompilerFrontend::new(Vec::new()).with_processor(Helpers);
    let outcomes = frontend
        .submit(
            &[InputFile::new(
                "Model.java",
                "@interface Generate {} @Generate class Model {}",
            )],
            None,
        )
        .expect("no misuse");

    assert_eq!(outcomes.len(), 1);
    assert_eq!(frontend.phase(), Phase::Attributed);
    assert!(
        frontend
            .toolchain()
            .symbols
            .entered_class("ModelHelper")
            .is_some()
    );
    assert!(
        frontend
            .warnings()
            .iter()
            .any(|warning| warning.warning_kind == WarningKind::AnnotationProcessorOutput)
    );
}
