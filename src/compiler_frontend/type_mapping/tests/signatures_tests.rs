use super::*;
use crate::compiler_frontend::toolchain::Toolchain;
use crate::compiler_frontend::toolchain::enter::EnterMode;
use std::path::Path;

fn entered(path: &str, source: &str) -> Toolchain {
    let mut toolchain = Toolchain::new(Vec::new());
    let id = toolchain
        .parse(source, Path::new(path))
        .expect("source should parse");
    toolchain.init_modules(&[id]);
    toolchain
        .enter_all(&[id], EnterMode::Source)
        .expect("entry should succeed");
    toolchain.unblock_annotations().expect("annotations flush");
    toolchain
}

fn member(toolchain: &Toolchain, class: &str, name: &str) -> SymbolId {
    let class = toolchain
        .symbols
        .entered_class(class)
        .unwrap_or_else(|| panic!("{class} should be entered"));
    let name = toolchain.symbols.names.get_existing(name).expect("interned");
    toolchain.symbols.members_named(class, name)[0]
}

fn field_signature(toolchain: &Toolchain, class: &str, field: &str) -> String {
    let ty = toolchain.symbols.variable_type(member(toolchain, class, field));
    DefaultSignatureBuilder.signature(&toolchain.symbols, &ty)
}

#[test]
fn instantiations_of_one_class_have_distinct_keys() {
    let toolchain = entered(
        "p/Fields.java",
        "package p;
         import java.util.List;
         class Fields {
             List<String> names;
             List<Integer> numbers;
             List<String> aliases;
             int[][] grid;
         }",
    );

    let names = field_signature(&toolchain, "p.Fields", "names");
    assert_eq!(names, "java.util.List<java.lang.String>");
    assert_eq!(names, field_signature(&toolchain, "p.Fields", "aliases"));
    assert_ne!(names, field_signature(&toolchain, "p.Fields", "numbers"));
    assert_eq!(field_signature(&toolchain, "p.Fields", "grid"), "int[][]");
}

#[test]
fn type_variables_are_keyed_by_name_and_bounds() {
    let toolchain = entered(
        "Vars.java",
        "class Vars<T, N extends Number & Comparable<N>> {
             T plain;
             N bounded;
         }",
    );

    assert_eq!(field_signature(&toolchain, "Vars", "plain"), "Generic{T}");
    assert_eq!(
        field_signature(&toolchain, "Vars", "bounded"),
        "Generic{N extends java.lang.Number & java.lang.Comparable<Generic{N}>}"
    );
}

#[test]
fn wildcard_bounds_are_written_verbatim() {
    let toolchain = entered(
        "Wild.java",
        "import java.util.List;
         class Wild {
             List<?> any;
             List<? extends Object> objects;
             List<? super Integer> sinks;
         }",
    );

    assert_eq!(field_signature(&toolchain, "Wild", "any"), "java.util.List<Generic{?}>");
    assert_eq!(
        field_signature(&toolchain, "Wild", "objects"),
        "java.util.List<Generic{? extends java.lang.Object}>"
    );
    assert_eq!(
        field_signature(&toolchain, "Wild", "sinks"),
        "java.util.List<Generic{? super java.lang.Integer}>"
    );
}

#[test]
fn members_are_keyed_under_their_owner() {
    let toolchain = entered(
        "p/Owner.java",
        "package p;
         class Owner {
             int count;
             Owner(int start) {}
             String label(int width) { return null; }
         }",
    );
    let symbols = &toolchain.symbols;
    let builder = DefaultSignatureBuilder;

    assert_eq!(
        builder.variable_signature(symbols, member(&toolchain, "p.Owner", "count")),
        "p.Owner{name=count,type=int}"
    );

    let constructor = member(&toolchain, "p.Owner", INIT_NAME);
    let declared = symbols.method(constructor).expect("method").signature(symbols);
    assert_eq!(
        builder.method_signature(symbols, constructor, &declared),
        "p.Owner{name=<constructor>,return=void,parameters=[int]}"
    );

    let label = member(&toolchain, "p.Owner", "label");
    let declared = symbols.method(label).expect("method").signature(symbols);
    let method_key = builder.method_signature(symbols, label, &declared);
    assert_eq!(
        method_key,
        "p.Owner{name=label,return=java.lang.String,parameters=[int]}"
    );

    let width = symbols.method(label).expect("method").params[0];
    assert_eq!(
        builder.variable_signature(symbols, width),
        format!("{method_key}{{name=width,type=int}}")
    );
}

#[test]
fn annotation_keys_include_their_values() {
    let toolchain = entered(
        "Tagged.java",
        "@interface Tag { int level(); String[] names(); }
         class Tagged {
             @Tag(level = 2, names = {\"a\", \"b\"}) int first;
             @Tag(level = 3, names = {}) int second;
         }",
    );
    let symbols = &toolchain.symbols;

    let first = &symbols.get(member(&toolchain, "Tagged", "first")).annotations[0];
    let second = &symbols.get(member(&toolchain, "Tagged", "second")).annotations[0];
    let first_key = DefaultSignatureBuilder.annotation_signature(symbols, first);

    assert!(first_key.starts_with("@Tag(level="));
    assert!(first_key.contains("names={"));
    assert_ne!(
        first_key,
        DefaultSignatureBuilder.annotation_signature(symbols, second)
    );
}

#[test]
fn object_bounds_are_dropped_and_intersections_split() {
    let mut toolchain = entered("Empty.java", "class Empty {}");
    let object = InternalType::class(toolchain.symbols.object_class().expect("Object"));
    let number = InternalType::class(
        toolchain
            .symbols
            .lookup_class("java.lang.Number")
            .expect("Number"),
    );
    let symbols = &toolchain.symbols;

    assert!(type_var_bounds(symbols, &object).is_empty());
    assert!(type_var_bounds(symbols, &InternalType::Unknown).is_empty());
    assert_eq!(
        type_var_bounds(
            symbols,
            &InternalType::Intersection(vec![object.clone(), number.clone()])
        ),
        vec![number]
    );
}
