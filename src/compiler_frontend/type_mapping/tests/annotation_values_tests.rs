use super::*;
use crate::compiler_frontend::toolchain::Toolchain;
use crate::compiler_frontend::toolchain::enter::EnterMode;
use crate::compiler_frontend::toolchain::symbols::{InternalType, SymbolId};
use crate::compiler_frontend::type_mapping::signatures::DefaultSignatureBuilder;
use crate::compiler_frontend::type_mapping::symbol_recovery::CandidateRecovery;
use crate::compiler_frontend::type_mapping::type_cache::TypeCache;
use std::path::Path;

const SOURCE: &str = "import java.lang.annotation.ElementType;
     @interface Tag {
         int level() default 7;
         String[] names() default {};
         ElementType kind() default ElementType.TYPE;
         Class<?>[] types() default {};
     }
     class Tagged {
         @Tag(level = 2, names = {\"a\", \"b\"}, kind = ElementType.FIELD, types = {String.class, Integer.class})
         int first;
         @Tag(level = 2, names = {\"a\", \"b\"}, kind = ElementType.FIELD, types = {String.class, Integer.class})
         int second;
         @Tag int third;
     }";

fn entered() -> Toolchain {
    let mut toolchain = Toolchain::new(Vec::new());
    let id = toolchain
        .parse(SOURCE, Path::new("Tagged.java"))
        .expect("source should parse");
    toolchain.init_modules(&[id]);
    toolchain
        .enter_all(&[id], EnterMode::Source)
        .expect("entry should succeed");
    toolchain.unblock_annotations().expect("annotations flush");
    toolchain
}

fn member(toolchain: &Toolchain, class: &str, name: &str) -> SymbolId {
    let class = toolchain.symbols.entered_class(class).expect("entered");
    let name = toolchain.symbols.names.get_existing(name).expect("interned");
    toolchain.symbols.members_named(class, name)[0]
}

fn annotation_on(toolchain: &mut Toolchain, cache: &mut TypeCache, field: &str) -> TypeId {
    let symbol = member(toolchain, "Tagged", field);
    let annotation = toolchain.symbols.get(symbol).annotations[0].clone();
    let mut mapper = TypeMapper::new(
        &mut toolchain.symbols,
        cache,
        &DefaultSignatureBuilder,
        &CandidateRecovery,
    );
    mapper.resolve_annotation(&annotation)
}

fn value<'a>(cache: &'a TypeCache, annotation: TypeId, name: &str) -> &'a ElementValue {
    let JavaType::Annotation(annotation) = cache.get(annotation) else {
        panic!("expected an annotation node");
    };
    annotation
        .values
        .iter()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value)
        .unwrap_or_else(|| panic!("{name} should be set"))
}

#[test]
fn element_values_are_decoded_by_kind() {
    let mut toolchain = entered();
    let mut cache = TypeCache::new();
    let tag = annotation_on(&mut toolchain, &mut cache, "first");

    assert_eq!(
        value(&cache, tag, "level"),
        &ElementValue::Literal(LiteralValue::Int(2))
    );
    assert_eq!(
        value(&cache, tag, "names"),
        &ElementValue::LiteralArray(vec![
            LiteralValue::String("a".to_owned()),
            LiteralValue::String("b".to_owned()),
        ])
    );

    let ElementValue::Enum(kind) = value(&cache, tag, "kind") else {
        panic!("kind should be an enum constant");
    };
    let constant = cache.get(*kind).as_variable().expect("variable node");
    assert_eq!(constant.name, "FIELD");

    let ElementValue::TypeArray(types) = value(&cache, tag, "types") else {
        panic!("types should be a type array");
    };
    let names: Vec<&str> = types
        .iter()
        .map(|id| {
            cache
                .get(*id)
                .as_class()
                .expect("class node")
                .fully_qualified_name
                .as_str()
        })
        .collect();
    assert_eq!(names, vec!["java.lang.String", "java.lang.Integer"]);
}

#[test]
fn equal_annotations_share_one_node() {
    let mut toolchain = entered();
    let mut cache = TypeCache::new();

    let first = annotation_on(&mut toolchain, &mut cache, "first");
    let second = annotation_on(&mut toolchain, &mut cache, "second");
    let third = annotation_on(&mut toolchain, &mut cache, "third");

    assert_eq!(first, second);
    assert_ne!(first, third);

    let JavaType::Annotation(bare) = cache.get(third) else {
        panic!("expected an annotation node");
    };
    assert!(bare.values.is_empty());
}

#[test]
fn element_defaults_are_kept_on_the_method_node() {
    let mut toolchain = entered();
    let level = member(&toolchain, "Tag", "level");
    let kind = member(&toolchain, "Tag", "kind");

    let mut cache = TypeCache::new();
    let mut mapper = TypeMapper::new(
        &mut toolchain.symbols,
        &mut cache,
        &DefaultSignatureBuilder,
        &CandidateRecovery,
    );
    let level = mapper.resolve_as_declared_method(level, None).expect("method");
    let kind = mapper.resolve_as_declared_method(kind, None).expect("method");

    let level = cache.get(level).as_method().expect("method node");
    assert_eq!(
        level.default_value,
        Some(ElementValue::Literal(LiteralValue::Int(7)))
    );

    let kind = cache.get(kind).as_method().expect("method node");
    let Some(ElementValue::Enum(constant)) = &kind.default_value else {
        panic!("kind should default to an enum constant");
    };
    assert_eq!(cache.get(*constant).as_variable().expect("variable").name, "TYPE");
}

#[test]
fn mixed_arrays_keep_only_their_type_elements() {
    let mut toolchain = entered();
    let string = toolchain
        .symbols
        .lookup_class("java.lang.String")
        .expect("String");

    let mut cache = TypeCache::new();
    let mut mapper = TypeMapper::new(
        &mut toolchain.symbols,
        &mut cache,
        &DefaultSignatureBuilder,
        &CandidateRecovery,
    );
    let value = mapper.element_value(&InternalElementValue::Array(vec![
        InternalElementValue::Constant(ConstantValue::Int(1)),
        InternalElementValue::ClassLiteral(InternalType::class(string)),
        InternalElementValue::Error,
    ]));

    let ElementValue::TypeArray(ids) = value else {
        panic!("a mixed array should be a type array");
    };
    assert_eq!(ids.len(), 2);
    assert_eq!(ids[1], TypeId::UNKNOWN);
}
