use super::*;
use crate::compiler_frontend::compiler_errors::ErrorType;
use crate::compiler_frontend::toolchain::enter::EnterMode;
use crate::compiler_frontend::toolchain::{Toolchain, UnitId};
use crate::compiler_frontend::type_mapping::signatures::DefaultSignatureBuilder;
use crate::compiler_frontend::type_mapping::symbol_recovery::CandidateRecovery;
use crate::compiler_frontend::type_mapping::type_cache::TypeCache;
use std::path::Path;

fn attributed(path: &str, source: &str) -> (Toolchain, UnitId) {
    let mut toolchain = Toolchain::new(Vec::new());
    let id = toolchain
        .parse(source, Path::new(path))
        .expect("source should parse");
    toolchain.init_modules(&[id]);
    toolchain
        .enter_all(&[id], EnterMode::Source)
        .expect("entry should succeed");
    toolchain.unblock_annotations().expect("annotations flush");
    while let Some(work) = toolchain.next_work() {
        toolchain.attribute(work).expect("attribution should succeed");
    }
    (toolchain, id)
}

fn build(
    toolchain: &mut Toolchain,
    cache: &mut TypeCache,
    id: UnitId,
) -> Result<AttributedUnit, CompilerError> {
    let (symbols, unit, tables) = toolchain.output_parts(id);
    let mut mapper = TypeMapper::new(symbols, cache, &DefaultSignatureBuilder, &CandidateRecovery);
    let input = TreeInput {
        source_path: unit.source_path.clone(),
        unit: &unit,
        tables,
    };
    DeclarationTreeBuilder.build(&input, &mut mapper)
}

const SHAPES: &str = "package shapes;
     class Shape {
         int sides;
         String label = \"square\";
         int area(int width) { int total = width; return total; }
         int labelLength() { return label.length(); }
         Shape copy() { return new Shape(); }
     }";

#[test]
fn declarations_carry_their_members() {
    let (mut toolchain, id) = attributed("shapes/Shape.java", SHAPES);
    let mut cache = TypeCache::new();
    let unit = build(&mut toolchain, &mut cache, id).expect("output builds");

    assert_eq!(unit.package, "shapes");
    assert_eq!(unit.source_path, Path::new("shapes/Shape.java"));

    let shape = unit.class_named("shapes.Shape").expect("Shape is surfaced");
    assert_eq!(
        cache
            .get(shape.type_id)
            .as_class()
            .expect("class node")
            .fully_qualified_name,
        "shapes.Shape"
    );

    let fields: Vec<&str> = shape.fields.iter().map(|field| field.name.as_str()).collect();
    assert_eq!(fields, vec!["sides", "label"]);
    let methods: Vec<&str> = shape.methods.iter().map(|method| method.name.as_str()).collect();
    assert_eq!(methods, vec!["area", "labelLength", "copy"]);

    // Declared members are the same nodes the class node lists
    let class_node = cache.get(shape.type_id).as_class().expect("class node");
    for field in &shape.fields {
        assert!(class_node.fields.contains(&field.type_id));
    }
    for method in &shape.methods {
        assert!(class_node.methods.contains(&method.type_id));
    }
}

#[test]
fn expressions_reference_their_types_and_members() {
    let (mut toolchain, id) = attributed("shapes/Shape.java", SHAPES);
    let mut cache = TypeCache::new();
    let unit = build(&mut toolchain, &mut cache, id).expect("output builds");
    let shape = unit.class_named("shapes.Shape").expect("Shape is surfaced");

    let length = shape
        .references_of(ReferenceKind::Invocation)
        .next()
        .expect("label.length() is referenced");
    assert_eq!(length.type_id, TypeId::INT);
    let invoked = length.method.expect("invoked method");
    assert_eq!(cache.get(invoked).as_method().expect("method").name, "length");

    let label = shape.field("label").expect("label field");
    assert!(
        shape
            .references_of(ReferenceKind::Identifier)
            .any(|reference| reference.variable == Some(label.type_id))
    );

    let created = shape
        .references_of(ReferenceKind::NewClass)
        .next()
        .expect("new Shape() is referenced");
    assert_eq!(created.type_id, shape.type_id);
    let constructor = created.method.expect("selected constructor");
    assert_eq!(
        cache.get(constructor).as_method().expect("method").name,
        "<constructor>"
    );

    let local = shape
        .references_of(ReferenceKind::TypeTree)
        .filter_map(|reference| reference.variable)
        .filter_map(|variable| cache.get(variable).as_variable())
        .find(|variable| variable.name == "total")
        .expect("the local's type tree is referenced");
    assert_eq!(local.declared_type, TypeId::INT);
}

#[test]
fn nested_classes_keep_their_own_references() {
    let (mut toolchain, id) = attributed(
        "Outer.java",
        "class Outer {
             int count;
             class Inner {
                 String name;
                 int size() { return name.length(); }
             }
         }",
    );
    let mut cache = TypeCache::new();
    let unit = build(&mut toolchain, &mut cache, id).expect("output builds");

    assert_eq!(unit.classes.len(), 1);
    let outer = &unit.classes[0];
    assert_eq!(outer.nested.len(), 1);
    assert_eq!(outer.references_of(ReferenceKind::Invocation).count(), 0);

    let inner = &outer.nested[0];
    assert!(inner.field("name").is_some());
    assert_eq!(inner.references_of(ReferenceKind::Invocation).count(), 1);
}

#[test]
fn enum_constants_are_fields_with_constructor_references() {
    let (mut toolchain, id) = attributed(
        "Level.java",
        "enum Level { LOW(1), HIGH(9); Level(int weight) {} }",
    );
    let mut cache = TypeCache::new();
    let unit = build(&mut toolchain, &mut cache, id).expect("output builds");
    let level = &unit.classes[0];

    assert!(level.field("LOW").is_some());
    assert!(level.field("HIGH").is_some());

    let constructors: Vec<&TypeReference> = level.references_of(ReferenceKind::NewClass).collect();
    assert_eq!(constructors.len(), 2);
    assert!(constructors.iter().all(|reference| reference.method.is_some()));
}

#[test]
fn annotated_dimensions_reach_the_type_tree() {
    let (mut toolchain, id) = attributed(
        "Grid.java",
        "@interface A {} @interface B {}
         class Grid { String @A [] @B [] cells; }",
    );
    let mut cache = TypeCache::new();
    let unit = build(&mut toolchain, &mut cache, id).expect("output builds");
    let grid = unit.class_named("Grid").expect("Grid is surfaced");

    let tree = grid
        .references_of(ReferenceKind::TypeTree)
        .next()
        .expect("the field type is referenced");
    let JavaType::Array(outer) = cache.get(tree.type_id) else {
        panic!("expected an array");
    };
    assert_eq!(outer.annotations.len(), 1);

    // The declared type of the field itself is the plain array
    let cells = grid.field("cells").expect("cells field");
    let declared = cache.get(cells.type_id).as_variable().expect("variable").declared_type;
    assert_ne!(declared, tree.type_id);
}

#[test]
fn duplicate_classes_are_left_out() {
    let (mut toolchain, id) = attributed("Twice.java", "class Twice {} class Twice { int x; }");
    let mut cache = TypeCache::new();
    let unit = build(&mut toolchain, &mut cache, id).expect("output builds");

    assert_eq!(unit.classes.len(), 1);
    assert!(unit.classes[0].fields.is_empty());
    assert_eq!(unit.diagnostics.len(), 1);
}

#[test]
fn calls_that_never_resolved_invoke_the_unknown_method() {
    let (mut toolchain, id) = attributed(
        "Calls.java",
        "class Calls {
             void twice(int a, int b) {}
             void run() { missing(); twice(1); twice(1, 2); }
         }",
    );
    let mut cache = TypeCache::new();
    let unit = build(&mut toolchain, &mut cache, id).expect("output builds");
    let calls = unit.class_named("Calls").expect("Calls is surfaced");

    let invoked: Vec<Option<TypeId>> = calls
        .references_of(ReferenceKind::Invocation)
        .map(|reference| reference.method)
        .collect();
    assert_eq!(invoked.len(), 3);
    assert_eq!(invoked[0], Some(TypeId::UNKNOWN));
    assert!(invoked.iter().all(Option::is_some));

    let resolved = invoked[2].expect("twice(1, 2) resolves");
    assert_eq!(cache.get(resolved).as_method().expect("method").name, "twice");

    // Only invocations and instance creations carry a method
    assert!(
        calls
            .references_of(ReferenceKind::Identifier)
            .all(|reference| reference.method.is_none())
    );
}

#[test]
fn units_that_were_never_entered_fail_to_build() {
    let mut toolchain = Toolchain::new(Vec::new());
    let id = toolchain
        .parse("class Lonely {}", Path::new("Lonely.java"))
        .expect("source should parse");

    let mut cache = TypeCache::new();
    let error = build(&mut toolchain, &mut cache, id).expect_err("nothing was entered");
    assert_eq!(error.error_type, ErrorType::Attribution);
    assert!(error.msg.contains("Lonely"));
}

#[test]
fn json_output_renders_types_as_source() {
    let (mut toolchain, id) = attributed("shapes/Shape.java", SHAPES);
    let mut cache = TypeCache::new();
    let unit = build(&mut toolchain, &mut cache, id).expect("output builds");
    let json = unit.to_json(&cache);

    assert_eq!(json["package"], "shapes");
    let class = &json["classes"][0];
    assert_eq!(class["name"], "shapes.Shape");
    assert_eq!(class["fields"][0], "sides: int");
    assert_eq!(class["fields"][1], "label: java.lang.String");
    assert_eq!(class["methods"][0], "area(int width) -> int");
}
