use super::*;
use crate::compiler_frontend::compiler_errors::ErrorType;
use crate::compiler_frontend::toolchain::syntax::PrimitiveTag;

fn parse(source: &str) -> (CompilationUnit, StringTable) {
    let mut names = StringTable::new();
    let unit = parse_source(source, Path::new("Test.java"), &mut names)
        .expect("source should parse");
    (unit, names)
}

#[test]
fn package_imports_and_classes() {
    let (unit, names) = parse(
        "package a.b;\nimport java.util.List;\nimport java.util.*;\nimport static java.lang.Math.max;\nclass A {}\ninterface B {}",
    );

    assert_eq!(unit.package_name(&names), "a.b");
    assert_eq!(unit.imports.len(), 2);
    assert_eq!(unit.imports[0].name.to_dotted(&names), "java.util.List");
    assert!(!unit.imports[0].on_demand);
    assert_eq!(unit.imports[1].name.to_dotted(&names), "java.util");
    assert!(unit.imports[1].on_demand);
    assert_eq!(unit.types.len(), 2);
    assert_eq!(unit.types[1].kind, ClassKind::Interface);
}

#[test]
fn generic_header_with_bounds_and_supertypes() {
    let (unit, names) = parse(
        "class Box<T extends Number & Comparable<T>, U> extends Base<T> implements I, J<U> {}",
    );
    let class = &unit.types[0];

    assert_eq!(class.type_params.len(), 2);
    assert_eq!(class.type_params[0].bounds.len(), 2);
    assert!(class.type_params[1].bounds.is_empty());
    assert_eq!(class.extends.len(), 1);
    assert_eq!(class.implements.len(), 2);

    let TypeSyntax::Named { name, type_args, .. } = &class.implements[1] else {
        panic!("expected a named type");
    };
    assert_eq!(name.to_dotted(&names), "J");
    assert_eq!(type_args.as_ref().map(Vec::len), Some(1));
}

#[test]
fn members_constructors_and_stub_methods() {
    let (unit, names) = parse(
        r#"
class A {
    private int x, y = 2;
    A(int x) { }
    static <E> java.util.List<E> of();
    String name() { return "a"; }
    static { }
    { }
}
"#,
    );
    let members = &unit.types[0].members;

    let fields = members
        .iter()
        .filter(|member| matches!(member, MemberDecl::Field(_)))
        .count();
    assert_eq!(fields, 2);

    let methods: Vec<&MethodDecl> = members
        .iter()
        .filter_map(|member| match member {
            MemberDecl::Method(method) => Some(method),
            _ => None,
        })
        .collect();
    assert_eq!(methods.len(), 3);
    assert!(methods[0].is_constructor());
    assert!(methods[1].body.is_none());
    assert_eq!(methods[1].type_params.len(), 1);
    assert_eq!(names.resolve(methods[2].name), "name");

    let initializers: Vec<bool> = members
        .iter()
        .filter_map(|member| match member {
            MemberDecl::Initializer(init) => Some(init.is_static),
            _ => None,
        })
        .collect();
    assert_eq!(initializers, vec![true, false]);
}

#[test]
fn enum_constants_come_before_members() {
    let (unit, names) = parse("enum Color { RED, GREEN(1), ; int code() { return 1; } }");
    let class = &unit.types[0];

    assert_eq!(class.kind, ClassKind::Enum);
    assert_eq!(class.enum_constants.len(), 2);
    assert_eq!(names.resolve(class.enum_constants[1].name), "GREEN");
    assert_eq!(class.enum_constants[1].args.len(), 1);
    assert_eq!(class.members.len(), 1);
}

#[test]
fn enum_without_member_section() {
    let (unit, _) = parse("enum E { A, B }");
    assert_eq!(unit.types[0].enum_constants.len(), 2);
    assert!(unit.types[0].members.is_empty());
}

#[test]
fn records_and_record_as_identifier() {
    let (unit, names) = parse("record Point(int x, int y) implements I {}\nclass A { int record; }");

    assert_eq!(unit.types[0].kind, ClassKind::Record);
    assert_eq!(unit.types[0].record_components.len(), 2);
    assert_eq!(names.resolve(unit.types[0].record_components[1].name), "y");

    let MemberDecl::Field(field) = &unit.types[1].members[0] else {
        panic!("expected a field named record");
    };
    assert_eq!(names.resolve(field.name), "record");
}

#[test]
fn annotation_type_with_defaults() {
    let (unit, _) = parse("@interface Tag { String name() default \"\"; int[] ids() default {1, -2}; }");
    let class = &unit.types[0];
    assert_eq!(class.kind, ClassKind::Annotation);

    let MemberDecl::Method(ids) = &class.members[1] else {
        panic!("expected an element");
    };
    let Some(ElementValueSyntax::Array(values)) = &ids.default_value else {
        panic!("expected an array default");
    };
    assert!(matches!(values[1], ElementValueSyntax::Literal(Literal::Int(-2))));
}

#[test]
fn annotation_arguments() {
    let (unit, names) = parse(
        "@Target({ElementType.TYPE, ElementType.FIELD}) @Retention(value = RetentionPolicy.RUNTIME) @Marker @Ref(String[].class) class A {}",
    );
    let annotations = &unit.types[0].annotations;
    assert_eq!(annotations.len(), 4);

    assert!(annotations[0].arguments[0].name.is_none());
    assert!(matches!(&annotations[0].arguments[0].value, ElementValueSyntax::Array(values) if values.len() == 2));

    assert_eq!(annotations[1].arguments[0].name.map(|name| names.resolve(name)), Some("value"));
    assert!(matches!(&annotations[1].arguments[0].value, ElementValueSyntax::Name(name) if name.to_dotted(&names) == "RetentionPolicy.RUNTIME"));

    assert!(annotations[2].arguments.is_empty());
    assert!(matches!(
        &annotations[3].arguments[0].value,
        ElementValueSyntax::ClassLiteral(TypeSyntax::Array { .. })
    ));
}

#[test]
fn first_written_dimension_is_outermost() {
    let (unit, names) = parse("class A { String @X [] @Y [] f; }");
    let MemberDecl::Field(field) = &unit.types[0].members[0] else {
        panic!("expected a field");
    };

    let TypeSyntax::Array { element, annotations, .. } = &field.ty else {
        panic!("expected an array");
    };
    assert_eq!(annotations[0].name.to_dotted(&names), "X");

    let TypeSyntax::Array { element, annotations, .. } = element.as_ref() else {
        panic!("expected a nested array");
    };
    assert_eq!(annotations[0].name.to_dotted(&names), "Y");
    assert!(matches!(element.as_ref(), TypeSyntax::Named { .. }));
    assert!(field.ty.has_dimension_annotations());
}

#[test]
fn wildcards_and_diamond() {
    let (unit, _) = parse(
        "class A { java.util.Map<? extends Number, ? super Integer> m; java.util.List<?> l; void f() { java.util.List<String> x = new java.util.ArrayList<>(); } }",
    );
    let MemberDecl::Field(map) = &unit.types[0].members[0] else {
        panic!("expected a field");
    };
    let TypeSyntax::Named { type_args: Some(args), .. } = &map.ty else {
        panic!("expected type arguments");
    };
    assert!(matches!(args[0], TypeSyntax::Wildcard { kind: WildcardKind::Extends, .. }));
    assert!(matches!(args[1], TypeSyntax::Wildcard { kind: WildcardKind::Super, .. }));

    let MemberDecl::Method(method) = &unit.types[0].members[2] else {
        panic!("expected a method");
    };
    let body = method.body.as_ref().expect("method has a body");
    let Statement::Local(local) = &body.statements[0] else {
        panic!("expected a local");
    };
    let Some(Expr { kind: ExprKind::New { class, .. }, .. }) = &local.initializer else {
        panic!("expected an instance creation");
    };
    assert!(matches!(class, TypeSyntax::Named { type_args: Some(args), .. } if args.is_empty()));
}

#[test]
fn statements_and_expression_chains() {
    let (unit, names) = parse(
        "class A { int f() { int x = -1; System.out.println(\"hi\"); return this.g(x, null); } }",
    );
    let MemberDecl::Method(method) = &unit.types[0].members[0] else {
        panic!("expected a method");
    };
    let statements = &method.body.as_ref().expect("body").statements;
    assert_eq!(statements.len(), 3);

    let Statement::Local(local) = &statements[0] else {
        panic!("expected a local");
    };
    assert!(matches!(local.ty, TypeSyntax::Primitive { tag: PrimitiveTag::Int, .. }));
    assert!(matches!(
        local.initializer,
        Some(Expr { kind: ExprKind::Literal(Literal::Int(-1)), .. })
    ));

    let Statement::Expression(call) = &statements[1] else {
        panic!("expected an expression statement");
    };
    let ExprKind::Invoke { target: Some(target), name, args } = &call.kind else {
        panic!("expected an invocation");
    };
    assert_eq!(names.resolve(*name), "println");
    assert_eq!(args.len(), 1);
    assert!(matches!(target.kind, ExprKind::FieldAccess { .. }));

    let Statement::Return { value: Some(value), .. } = &statements[2] else {
        panic!("expected a return");
    };
    assert!(matches!(&value.kind, ExprKind::Invoke { args, .. } if args.len() == 2));
}

#[test]
fn nested_classes_are_members() {
    let (unit, names) = parse("class Outer { static class Inner { class Deep {} } }");
    let paths = unit.class_paths();

    assert_eq!(paths.len(), 3);
    assert_eq!(paths[0].0, vec![0]);
    assert_eq!(paths[2].0, vec![0, 0, 0]);
    assert_eq!(names.resolve(paths[2].1.name), "Deep");
}

#[test]
fn node_ids_are_unique_within_a_unit() {
    let (unit, _) = parse("class A { int x; int y; void f(int a) { } }");
    let mut ids = vec![unit.types[0].id];
    for member in &unit.types[0].members {
        match member {
            MemberDecl::Field(field) => {
                ids.push(field.id);
                ids.push(field.ty.id());
            }
            MemberDecl::Method(method) => {
                ids.push(method.id);
                ids.extend(method.params.iter().map(|param| param.id));
            }
            _ => {}
        }
    }

    let count = ids.len();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), count);
}

#[test]
fn syntax_errors_carry_the_path() {
    let mut names = StringTable::new();
    let error = parse_source("class A { int }", Path::new("Broken.java"), &mut names)
        .expect_err("missing field name");

    assert_eq!(error.error_type, ErrorType::Syntax);
    assert_eq!(error.location.scope, Path::new("Broken.java"));
}

#[test]
fn stray_tokens_at_top_level_fail() {
    let mut names = StringTable::new();
    assert!(parse_source("int x;", Path::new("Top.java"), &mut names).is_err());
}
