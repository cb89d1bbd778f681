use super::*;
use crate::compiler_frontend::compiler_errors::ErrorType;
use crate::compiler_frontend::toolchain::classpath::ClasspathEntry;
use crate::compiler_frontend::toolchain::enter::EnterMode;
use crate::compiler_frontend::toolchain::{Toolchain, UnitId};
use std::path::Path;

fn prepared(classpath: Vec<ClasspathEntry>, path: &str, source: &str) -> (Toolchain, UnitId) {
    let mut toolchain = Toolchain::new(classpath);
    let id = toolchain
        .parse(source, Path::new(path))
        .expect("source should parse");
    toolchain.init_modules(&[id]);
    toolchain
        .enter_all(&[id], EnterMode::Source)
        .expect("entry should succeed");
    toolchain.unblock_annotations().expect("annotations flush");
    (toolchain, id)
}

fn attributed(path: &str, source: &str) -> (Toolchain, UnitId) {
    let (mut toolchain, id) = prepared(Vec::new(), path, source);
    while let Some(work) = toolchain.next_work() {
        toolchain.attribute(work).expect("attribution should succeed");
    }
    (toolchain, id)
}

/// Symbols selected for expressions whose symbol has the given name
fn selected(toolchain: &Toolchain, id: UnitId, name: &str) -> Vec<SymbolId> {
    let mut found: Vec<(NodeId, SymbolId)> = toolchain
        .tables(id)
        .expr_symbols
        .iter()
        .filter(|(_, symbol)| toolchain.symbols.name(**symbol) == name)
        .map(|(node, symbol)| (*node, *symbol))
        .collect();
    found.sort();
    found.into_iter().map(|(_, symbol)| symbol).collect()
}

fn invocation_types(toolchain: &Toolchain, id: UnitId, name: &str) -> Vec<MethodSignature> {
    let tables = toolchain.tables(id);
    let mut nodes: Vec<NodeId> = tables
        .expr_symbols
        .iter()
        .filter(|(_, symbol)| toolchain.symbols.name(**symbol) == name)
        .map(|(node, _)| *node)
        .collect();
    nodes.sort();

    nodes
        .into_iter()
        .filter_map(|node| match tables.invocation_types.get(&node) {
            Some(InternalType::Method(signature)) => Some((**signature).clone()),
            _ => None,
        })
        .collect()
}

fn string(toolchain: &Toolchain) -> InternalType {
    InternalType::class(
        toolchain
            .symbols
            .entered_class("java.lang.String")
            .expect("String entered"),
    )
}

#[test]
fn method_bodies_record_expression_types() {
    let (toolchain, id) = attributed(
        "Use.java",
        "import java.util.List;
         class Use {
             int count(List<String> items) {
                 String first = items.get(0);
                 return items.size();
             }
         }",
    );

    let get = invocation_types(&toolchain, id, "get");
    assert_eq!(get.len(), 1);
    assert_eq!(get[0].return_type, string(&toolchain));

    let size = selected(&toolchain, id, "size");
    assert_eq!(size.len(), 1);
    let owner = toolchain.symbols.get(size[0]).owner.expect("owned");
    assert_eq!(toolchain.symbols.flat_name(owner), "java.util.Collection");

    let types = &toolchain.tables(id).expr_types;
    assert!(types.values().any(|ty| *ty == InternalType::Primitive(PrimitiveTag::Int)));
}

#[test]
fn overloads_are_selected_by_argument_types() {
    let (toolchain, id) = attributed(
        "Over.java",
        "class Over {
             void f(int x) {}
             void f(String s) {}
             void g() { f(\"a\"); f(1); }
         }",
    );

    let calls = selected(&toolchain, id, "f");
    assert_eq!(calls.len(), 2);
    assert_ne!(calls[0], calls[1]);

    let first = toolchain.symbols.method(calls[0]).expect("method").signature(&toolchain.symbols);
    assert_eq!(first.params, vec![string(&toolchain)]);
}

#[test]
fn generic_method_calls_are_inferred() {
    let (toolchain, id) = attributed(
        "Gen.java",
        "class Gen {
             <T> T id(T value) { return value; }
             String use() { return id(\"x\"); }
         }",
    );

    let calls = invocation_types(&toolchain, id, "id");
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].return_type, string(&toolchain));
    assert!(calls[0].type_params.is_empty());
}

#[test]
fn diamonds_take_arguments_from_the_declared_type() {
    let (toolchain, id) = attributed(
        "Dia.java",
        "import java.util.*;
         class Dia { List<String> items = new ArrayList<>(); }",
    );

    let array_list = toolchain
        .symbols
        .entered_class("java.util.ArrayList")
        .expect("ArrayList entered");
    let expected = InternalType::Class {
        symbol: array_list,
        type_args: vec![string(&toolchain)],
    };
    assert!(toolchain.tables(id).expr_types.values().any(|ty| *ty == expected));
}

#[test]
fn inapplicable_calls_leave_an_error_symbol_with_candidates() {
    let (toolchain, id) = attributed(
        "Bad.java",
        "class Bad { void f(int x) {} void g() { f(\"no\"); } }",
    );

    let calls = selected(&toolchain, id, "f");
    assert_eq!(calls.len(), 1);
    let SymbolData::Error(error) = &toolchain.symbols.get(calls[0]).data else {
        panic!("an error symbol should be recorded");
    };
    assert_eq!(error.arity, 1);
    assert_eq!(error.candidates.len(), 1);

    assert!(toolchain.tables(id).expr_types.values().any(InternalType::is_error));
    assert!(!toolchain.tables(id).diagnostics.is_empty());
}

#[test]
fn unknown_names_degrade_to_the_error_type() {
    let (toolchain, id) = attributed(
        "Unknown.java",
        "class Unknown { void g() { missing(); nothing.here(); } }",
    );

    let tables = toolchain.tables(id);
    assert!(tables.expr_types.values().all(InternalType::is_error));
    assert_eq!(
        tables
            .diagnostics
            .iter()
            .filter(|warning| warning.warning_kind == WarningKind::UnresolvedSymbol)
            .count(),
        2
    );
}

#[test]
fn static_and_qualified_access_resolve_through_classes_and_packages() {
    let (toolchain, id) = attributed(
        "Statics.java",
        "class Statics {
             int limit = Integer.MAX_VALUE;
             int bigger = java.lang.Math.max(1, 2);
         }",
    );

    let max_value = selected(&toolchain, id, "MAX_VALUE");
    assert_eq!(max_value.len(), 1);
    assert_eq!(selected(&toolchain, id, "max").len(), 1);
    assert!(toolchain.tables(id).diagnostics.is_empty());
}

#[test]
fn cyclic_hierarchies_fail_the_work_unit() {
    let (mut toolchain, _) = prepared(
        Vec::new(),
        "Cycle.java",
        "class A extends B {} class B extends A {}",
    );

    let work = toolchain.next_work().expect("queued");
    let Err(e) = toolchain.attribute(work) else {
        panic!("a cyclic hierarchy should fail");
    };
    assert_eq!(e.error_type, ErrorType::Attribution);
    assert!(e.msg.contains("Cyclic inheritance"));
}

#[test]
fn broken_classpath_parents_fail_the_work_unit() {
    let (mut toolchain, _) = prepared(
        vec![ClasspathEntry::in_memory(
            "lib/Broken.java",
            "package lib; public class Broken { public Missing lost; }",
        )],
        "Use.java",
        "class Use extends lib.Broken {}",
    );

    let work = toolchain.next_work().expect("queued");
    let Err(e) = toolchain.attribute(work) else {
        panic!("completing the broken parent should fail");
    };
    assert_eq!(e.error_type, ErrorType::Attribution);
}

#[test]
fn dimension_annotations_are_resolved() {
    let (toolchain, id) = attributed(
        "Arr.java",
        "@interface A {} @interface B {}
         class Arr { String @A [] @B [] names; }",
    );

    let annotations = &toolchain.tables(id).type_annotations;
    assert_eq!(annotations.len(), 2);
    assert!(annotations.values().all(|resolved| resolved.len() == 1));
}
