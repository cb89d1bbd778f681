use super::*;
use crate::compiler_frontend::compiler_errors::ErrorType;
use crate::compiler_frontend::toolchain::classpath::ClasspathEntry;
use crate::compiler_frontend::toolchain::{Toolchain, UnitId};
use std::path::Path;

fn enter_sources(toolchain: &mut Toolchain, sources: &[(&str, &str)]) -> Vec<UnitId> {
    let ids: Vec<UnitId> = sources
        .iter()
        .map(|(path, source)| {
            toolchain
                .parse(source, Path::new(path))
                .expect("source should parse")
        })
        .collect();
    toolchain.init_modules(&ids);
    toolchain
        .enter_all(&ids, EnterMode::Source)
        .expect("entry should succeed");
    ids
}

fn entered(sources: &[(&str, &str)]) -> Toolchain {
    let mut toolchain = Toolchain::new(Vec::new());
    enter_sources(&mut toolchain, sources);
    toolchain
}

fn class(toolchain: &Toolchain, flat_name: &str) -> SymbolId {
    toolchain
        .symbols
        .entered_class(flat_name)
        .unwrap_or_else(|| panic!("{flat_name} should be entered"))
}

fn member(toolchain: &Toolchain, class: SymbolId, name: &str) -> Vec<SymbolId> {
    let Some(name) = toolchain.symbols.names.get_existing(name) else {
        return Vec::new();
    };
    toolchain.symbols.members_named(class, name)
}

fn supertype_name(toolchain: &Toolchain, class: SymbolId) -> String {
    let supertype = toolchain
        .symbols
        .class(class)
        .and_then(|info| info.supertype.clone())
        .and_then(|ty| ty.class_symbol())
        .expect("class supertype");
    toolchain.symbols.flat_name(supertype).to_owned()
}

#[test]
fn references_resolve_regardless_of_input_order() {
    let toolchain = entered(&[
        ("p/B.java", "package p; public class B extends A { A partner; }"),
        ("p/A.java", "package p; public class A { B partner; }"),
    ]);

    let a = class(&toolchain, "p.A");
    let b = class(&toolchain, "p.B");
    assert_eq!(supertype_name(&toolchain, b), "p.A");

    let field = member(&toolchain, a, "partner")[0];
    assert_eq!(toolchain.symbols.variable_type(field), InternalType::class(b));
}

#[test]
fn classes_default_to_object_and_object_has_no_supertype() {
    let mut toolchain = entered(&[("Plain.java", "class Plain {}")]);
    let plain = class(&toolchain, "Plain");
    assert_eq!(supertype_name(&toolchain, plain), OBJECT_FQN);

    let object = toolchain.symbols.object_class().expect("platform Object");
    complete_class(&mut toolchain.symbols, object).expect("Object completes");
    assert!(toolchain.symbols.class(object).expect("class").supertype.is_none());
}

#[test]
fn type_parameter_bounds_are_normalized() {
    let toolchain = entered(&[(
        "Bounds.java",
        "interface I {} interface J {} class Base {}
         class Bounds<A, B extends I, C extends Base & I & J, D extends I & J, E extends Comparable<E>> {}",
    )]);

    let bounds = class(&toolchain, "Bounds");
    let params = toolchain.symbols.class(bounds).expect("class").type_params.clone();
    let bound = |index: usize| {
        toolchain
            .symbols
            .type_var(params[index])
            .expect("type variable")
            .bound
            .clone()
    };
    let object = toolchain.symbols.entered_class(OBJECT_FQN).expect("Object");
    let i = class(&toolchain, "I");
    let j = class(&toolchain, "J");
    let base = class(&toolchain, "Base");

    assert_eq!(bound(0), InternalType::class(object));
    assert_eq!(bound(1), InternalType::class(i));
    assert_eq!(
        bound(2),
        InternalType::Intersection(vec![
            InternalType::class(base),
            InternalType::class(i),
            InternalType::class(j),
        ])
    );
    // Interfaces only: Object stands in for the class bound
    assert_eq!(
        bound(3),
        InternalType::Intersection(vec![
            InternalType::class(object),
            InternalType::class(i),
            InternalType::class(j),
        ])
    );

    // Self referencing bound resolves to the variable being declared
    let InternalType::Class { type_args, .. } = bound(4) else {
        panic!("Comparable<E> expected");
    };
    assert_eq!(type_args, vec![InternalType::TypeVar(params[4])]);
}

#[test]
fn unresolved_names_become_error_types_with_warnings() {
    let mut toolchain = Toolchain::new(Vec::new());
    let ids = enter_sources(
        &mut toolchain,
        &[("Lost.java", "import com.gone.Thing; class Lost { Missing field; }")],
    );

    let lost = class(&toolchain, "Lost");
    let field = member(&toolchain, lost, "field")[0];
    assert_eq!(toolchain.symbols.variable_type(field), InternalType::Error);

    let kinds: Vec<WarningKind> = toolchain
        .tables(ids[0])
        .diagnostics
        .iter()
        .map(|warning| warning.warning_kind)
        .collect();
    assert!(kinds.contains(&WarningKind::UnresolvedImport));
    assert!(kinds.contains(&WarningKind::UnresolvedSymbol));
}

#[test]
fn members_get_implicit_flags_and_synthesized_members() {
    let toolchain = entered(&[(
        "Shapes.java",
        "public class Shape { static { } { } }
         interface Named { String NAME = \"n\"; String name(); default String describe() { return name(); } }
         class Explicit { Explicit(int x) {} }",
    )]);

    let shape = class(&toolchain, "Shape");
    let constructor = member(&toolchain, shape, INIT_NAME)[0];
    let flags = toolchain.symbols.get(constructor).flags;
    assert!(flags.contains(Flags::GENERATED_CONSTR | Flags::PUBLIC));

    let static_init = member(&toolchain, shape, STATIC_INIT_NAME)[0];
    assert!(toolchain.symbols.get(static_init).flags.contains(Flags::BLOCK | Flags::STATIC));
    assert_eq!(member(&toolchain, shape, INSTANCE_INIT_NAME).len(), 1);

    let named = class(&toolchain, "Named");
    let constant = member(&toolchain, named, "NAME")[0];
    assert!(toolchain.symbols.get(constant).flags.contains(Flags::PUBLIC | Flags::STATIC | Flags::FINAL));
    let abstract_method = member(&toolchain, named, "name")[0];
    assert!(toolchain.symbols.get(abstract_method).flags.contains(Flags::PUBLIC | Flags::ABSTRACT));
    let default_method = member(&toolchain, named, "describe")[0];
    assert!(!toolchain.symbols.get(default_method).flags.contains(Flags::ABSTRACT));

    // A declared constructor suppresses the default one
    let explicit = class(&toolchain, "Explicit");
    let constructors = member(&toolchain, explicit, INIT_NAME);
    assert_eq!(constructors.len(), 1);
    assert!(!toolchain.symbols.get(constructors[0]).flags.contains(Flags::GENERATED_CONSTR));
}

#[test]
fn records_get_fields_accessors_and_a_canonical_constructor() {
    let toolchain = entered(&[("Point.java", "record Point(int x, int y) { public int x() { return x; } }")]);
    let point = class(&toolchain, "Point");

    let x = member(&toolchain, point, "x");
    // The field and the declared accessor, no second accessor
    assert_eq!(x.len(), 2);
    assert!(toolchain.symbols.get(x[0]).flags.contains(Flags::PRIVATE | Flags::FINAL));
    assert_eq!(member(&toolchain, point, "y").len(), 2);

    let constructor = member(&toolchain, point, INIT_NAME)[0];
    assert_eq!(toolchain.symbols.method(constructor).expect("method").params.len(), 2);
    assert_eq!(supertype_name(&toolchain, point), RECORD_FQN);
}

#[test]
fn enums_get_constants_and_synthetic_members() {
    let toolchain = entered(&[("Kind.java", "enum Kind { A, B; }")]);
    let kind = class(&toolchain, "Kind");

    let a = member(&toolchain, kind, "A")[0];
    assert!(toolchain.symbols.get(a).flags.contains(Flags::ENUM | Flags::STATIC));
    assert_eq!(toolchain.symbols.variable_type(a), InternalType::class(kind));

    let values_field = member(&toolchain, kind, ENUM_VALUES_FIELD)[0];
    assert!(toolchain.symbols.get(values_field).flags.contains(Flags::SYNTHETIC));
    assert_eq!(member(&toolchain, kind, "values").len(), 1);
    assert_eq!(member(&toolchain, kind, "valueOf").len(), 1);

    let Some(InternalType::Class { symbol, type_args }) =
        toolchain.symbols.class(kind).and_then(|info| info.supertype.clone())
    else {
        panic!("enums extend Enum");
    };
    assert_eq!(toolchain.symbols.flat_name(symbol), ENUM_FQN);
    assert_eq!(type_args, vec![InternalType::class(kind)]);
}

#[test]
fn nested_classes_are_declared_with_flat_names() {
    let toolchain = entered(&[(
        "p/Outer.java",
        "package p; class Outer<T> { class Inner { T value; } static class Nested { Inner inner; } }",
    )]);

    let outer = class(&toolchain, "p.Outer");
    let inner = class(&toolchain, "p.Outer$Inner");
    let nested = class(&toolchain, "p.Outer$Nested");
    assert_eq!(toolchain.symbols.get(inner).owner, Some(outer));
    assert!(toolchain.symbols.class(outer).expect("class").members.contains(&nested));

    // Outer type variables are visible inside inner classes
    let value = member(&toolchain, inner, "value")[0];
    let t = toolchain.symbols.class(outer).expect("class").type_params[0];
    assert_eq!(toolchain.symbols.variable_type(value), InternalType::TypeVar(t));

    let field = member(&toolchain, nested, "inner")[0];
    assert_eq!(toolchain.symbols.variable_type(field), InternalType::class(inner));
}

#[test]
fn duplicate_classes_in_one_batch_warn_and_keep_the_first() {
    let mut toolchain = Toolchain::new(Vec::new());
    let ids = enter_sources(
        &mut toolchain,
        &[
            ("one/Dup.java", "class Dup { int first; }"),
            ("two/Dup.java", "class Dup { int second; }"),
        ],
    );

    let dup = class(&toolchain, "Dup");
    assert_eq!(member(&toolchain, dup, "first").len(), 1);
    assert!(member(&toolchain, dup, "second").is_empty());
    assert_eq!(
        toolchain.tables(ids[1]).diagnostics[0].warning_kind,
        WarningKind::DuplicateClass
    );
}

#[test]
fn reentering_a_class_from_another_live_file_is_misuse() {
    let mut toolchain = Toolchain::new(Vec::new());
    enter_sources(&mut toolchain, &[("first/Same.java", "class Same {}")]);

    let id = toolchain
        .parse("class Same {}", Path::new("second/Same.java"))
        .expect("parses");
    let Err(e) = toolchain.enter_all(&[id], EnterMode::Source) else {
        panic!("entering the same class again should fail");
    };
    assert_eq!(e.error_type, ErrorType::SessionMisuse);
}

#[test]
fn forgotten_locations_are_reentered_in_place() {
    let mut toolchain = Toolchain::new(Vec::new());
    enter_sources(&mut toolchain, &[("Same.java", "class Same { int before; }")]);
    let before = class(&toolchain, "Same");

    toolchain.reset_locations(&[PathBuf::from("Same.java")]);
    enter_sources(&mut toolchain, &[("Same.java", "class Same { int after; }")]);

    let after = class(&toolchain, "Same");
    assert_eq!(before, after);
    assert_eq!(member(&toolchain, after, "after").len(), 1);
    assert!(member(&toolchain, after, "before").is_empty());
}

#[test]
fn bridges_are_added_for_generic_overrides() {
    let toolchain = entered(&[(
        "Name.java",
        "class Name implements Comparable<Name> { public int compareTo(Name other) { return 0; } }",
    )]);
    let name = class(&toolchain, "Name");

    let compare_to = member(&toolchain, name, "compareTo");
    assert_eq!(compare_to.len(), 2);

    let bridge = compare_to[1];
    assert!(toolchain.symbols.get(bridge).flags.contains(Flags::BRIDGE | Flags::SYNTHETIC));
    let object = toolchain.symbols.entered_class(OBJECT_FQN).expect("Object");
    let signature = toolchain
        .symbols
        .method(bridge)
        .expect("method")
        .signature(&toolchain.symbols);
    assert_eq!(signature.params, vec![InternalType::class(object)]);
}

#[test]
fn classpath_classes_complete_lazily() {
    let mut toolchain = Toolchain::new(vec![ClasspathEntry::in_memory(
        "lib/Pair.java",
        "package lib; public class Pair<A, B> { public A first; public B second(); }",
    )]);
    enter_sources(&mut toolchain, &[("Use.java", "import lib.Pair; class Use { Pair<String, Integer> pair; }")]);

    let pair = toolchain.symbols.entered_class("lib.Pair").expect("entered by the import");
    assert!(!toolchain.symbols.is_complete(pair));

    complete_class(&mut toolchain.symbols, pair).expect("completes");
    assert!(toolchain.symbols.is_complete(pair));
    assert_eq!(member(&toolchain, pair, "first").len(), 1);
    // The stub has no constructor, so a default one is synthesized
    assert_eq!(member(&toolchain, pair, INIT_NAME).len(), 1);
}

#[test]
fn broken_classpath_classes_keep_partial_members() {
    let mut toolchain = Toolchain::new(vec![ClasspathEntry::in_memory(
        "lib/Broken.java",
        "package lib; public class Broken { public int kept; public Missing lost; public int after; }",
    )]);
    let broken = toolchain.symbols.lookup_class("lib.Broken").expect("indexed");

    let Err(e) = complete_class(&mut toolchain.symbols, broken) else {
        panic!("an unresolvable stub member should fail completion");
    };
    assert_eq!(e.error_type, ErrorType::Completion);

    assert_eq!(member(&toolchain, broken, "kept").len(), 1);
    assert!(member(&toolchain, broken, "after").is_empty());
    assert!(matches!(
        toolchain.symbols.class(broken).expect("class").completion,
        Completion::Failed(_)
    ));

    // Later attempts report the same failure without re-reading
    assert!(complete_class(&mut toolchain.symbols, broken).is_err());
}
