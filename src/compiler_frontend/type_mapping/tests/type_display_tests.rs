use super::*;
use crate::compiler_frontend::toolchain::Toolchain;
use crate::compiler_frontend::toolchain::enter::EnterMode;
use crate::compiler_frontend::toolchain::symbols::InternalType;
use crate::compiler_frontend::type_mapping::java_types::{IntersectionType, JavaTypeKind, TypeVariable};
use crate::compiler_frontend::type_mapping::signatures::DefaultSignatureBuilder;
use crate::compiler_frontend::type_mapping::symbol_recovery::CandidateRecovery;
use crate::compiler_frontend::type_mapping::type_mapper::TypeMapper;
use std::path::Path;

fn rendered_fields(source: &str, class: &str) -> Vec<String> {
    let mut toolchain = Toolchain::new(Vec::new());
    let id = toolchain
        .parse(source, Path::new("Shown.java"))
        .expect("source should parse");
    toolchain.init_modules(&[id]);
    toolchain
        .enter_all(&[id], EnterMode::Source)
        .expect("entry should succeed");
    toolchain.unblock_annotations().expect("annotations flush");

    let symbol = toolchain.symbols.entered_class(class).expect("entered");
    let mut cache = TypeCache::new();
    let mut mapper = TypeMapper::new(
        &mut toolchain.symbols,
        &mut cache,
        &DefaultSignatureBuilder,
        &CandidateRecovery,
    );
    let class = mapper.resolve(&InternalType::class(symbol));

    let fields = cache.get(class).as_class().expect("class node").fields.clone();
    fields
        .into_iter()
        .map(|field| display_type(&cache, field))
        .collect()
}

#[test]
fn nodes_render_as_source_types() {
    let fields = rendered_fields(
        "import java.util.Map;
         class Shown<T extends Comparable<T>> {
             Map<String, ? super Integer> lookup;
             T[] values;
             int count;
         }",
        "Shown",
    );

    assert_eq!(
        fields,
        vec![
            "lookup: java.util.Map<java.lang.String, ? super java.lang.Integer>".to_owned(),
            "values: T[]".to_owned(),
            "count: int".to_owned(),
        ]
    );
}

#[test]
fn top_level_variables_show_their_bounds() {
    let mut cache = TypeCache::new();
    let id = cache.reserve("Generic{T extends Both}", JavaTypeKind::GenericTypeVariable);
    let both = cache.reserve("int & long", JavaTypeKind::Intersection);
    cache.complete(
        both,
        JavaType::Intersection(IntersectionType {
            bounds: vec![TypeId::INT, TypeId::LONG],
        }),
    );
    cache.complete(
        id,
        JavaType::GenericTypeVariable(TypeVariable {
            name: "T".to_owned(),
            variance: Variance::Covariant,
            bounds: vec![both],
        }),
    );

    assert_eq!(display_type(&cache, id), "T extends int & long");
}

#[test]
fn pending_and_unknown_nodes_have_placeholders() {
    let mut cache = TypeCache::new();
    let pending = cache.reserve("Half", JavaTypeKind::Class);

    assert_eq!(display_type(&cache, pending), "{pending}");
    assert_eq!(display_type(&cache, TypeId::UNKNOWN), "{unknown}");
    assert_eq!(display_method(&cache, TypeId::VOID), "void");
}
