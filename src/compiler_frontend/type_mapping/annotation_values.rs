//! Annotation nodes and the recursive decoding of their element values.

use crate::compiler_frontend::toolchain::symbols::{
    ConstantValue, InternalAnnotation, InternalElementValue,
};
use crate::compiler_frontend::type_mapping::java_types::{
    AnnotationType, ElementValue, JavaType, JavaTypeKind, LiteralValue, TypeId,
};
use crate::compiler_frontend::type_mapping::type_mapper::TypeMapper;

impl TypeMapper<'_> {
    pub fn resolve_annotation(&mut self, annotation: &InternalAnnotation) -> TypeId {
        let signature = self.signatures.annotation_signature(self.symbols, annotation);
        if let Some(id) = self.cache.lookup(&signature) {
            return id;
        }
        let id = self.cache.reserve(&signature, JavaTypeKind::Annotation);

        let annotation_type = self.resolve(&annotation.annotation_type);
        let mut values = Vec::with_capacity(annotation.values.len());
        for (name, value) in &annotation.values {
            let name = self.symbols.names.resolve(*name).to_owned();
            values.push((name, self.element_value(value)));
        }

        self.cache.complete(
            id,
            JavaType::Annotation(AnnotationType {
                annotation_type,
                values,
            }),
        );
        id
    }

    /// Arrays holding only constants become literal arrays. Anything else is a type array of
    /// the enum constants, class literals and annotations it holds.
    pub fn element_value(&mut self, value: &InternalElementValue) -> ElementValue {
        match value {
            InternalElementValue::Constant(constant) => ElementValue::Literal(literal(constant)),
            InternalElementValue::Array(values) => {
                let literals: Option<Vec<LiteralValue>> = values
                    .iter()
                    .map(|value| match value {
                        InternalElementValue::Constant(constant) => Some(literal(constant)),
                        _ => None,
                    })
                    .collect();

                match literals {
                    Some(literals) => ElementValue::LiteralArray(literals),
                    None => ElementValue::TypeArray(
                        values
                            .iter()
                            .filter_map(|value| self.element_id(value))
                            .collect(),
                    ),
                }
            }
            other => match self.element_id(other) {
                Some(id) => match other {
                    InternalElementValue::EnumConstant(_) => ElementValue::Enum(id),
                    InternalElementValue::Annotation(_) => ElementValue::Annotation(id),
                    _ => ElementValue::Type(id),
                },
                None => ElementValue::Type(TypeId::UNKNOWN),
            },
        }
    }

    /// The node a non-literal element value points at
    fn element_id(&mut self, value: &InternalElementValue) -> Option<TypeId> {
        match value {
            InternalElementValue::EnumConstant(constant) => Some(
                self.resolve_as_variable(*constant, None)
                    .unwrap_or(TypeId::UNKNOWN),
            ),
            InternalElementValue::ClassLiteral(ty) => Some(self.resolve(ty)),
            InternalElementValue::Annotation(annotation) => {
                Some(self.resolve_annotation(annotation))
            }
            InternalElementValue::Error => Some(TypeId::UNKNOWN),
            InternalElementValue::Constant(_) | InternalElementValue::Array(_) => None,
        }
    }
}

fn literal(constant: &ConstantValue) -> LiteralValue {
    match constant {
        ConstantValue::Int(value) => LiteralValue::Int(*value),
        ConstantValue::Long(value) => LiteralValue::Long(*value),
        ConstantValue::Float(value) => LiteralValue::Float(*value),
        ConstantValue::Double(value) => LiteralValue::Double(*value),
        ConstantValue::Boolean(value) => LiteralValue::Boolean(*value),
        ConstantValue::Char(value) => LiteralValue::Char(*value),
        ConstantValue::String(value) => LiteralValue::String(value.clone()),
    }
}

#[cfg(test)]
#[path = "tests/annotation_values_tests.rs"]
mod tests;
