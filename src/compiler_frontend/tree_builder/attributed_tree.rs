// ============================================================
// Attributed Output
// ============================================================
//
// What a submission hands back for each input. Declarations and
// typed expressions point into the session's TypeCache, so the
// output is only meaningful next to the cache that built it.
//
// ============================================================

use crate::compiler_frontend::compiler_errors::CompilerError;
use crate::compiler_frontend::compiler_warnings::CompilerWarning;
use crate::compiler_frontend::toolchain::syntax::NodeId;
use crate::compiler_frontend::type_mapping::java_types::TypeId;
use crate::compiler_frontend::type_mapping::type_cache::TypeCache;
use crate::compiler_frontend::type_mapping::type_display::{display_method, display_type};
use serde::Serialize;
use serde_json::{Value, json};
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct AttributedUnit {
    /// Relative to the submission's base path when one was given
    pub source_path: PathBuf,
    pub package: String,
    pub classes: Vec<AttributedClass>,
    pub diagnostics: Vec<CompilerWarning>,
}

#[derive(Debug, Clone)]
pub struct AttributedClass {
    pub node: NodeId,
    pub name: String,
    pub type_id: TypeId,
    /// Fields, enum constants and record components in declaration order
    pub fields: Vec<AttributedMember>,
    pub methods: Vec<AttributedMember>,
    pub nested: Vec<AttributedClass>,
    pub type_references: Vec<TypeReference>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributedMember {
    pub node: NodeId,
    pub name: String,
    pub type_id: TypeId,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum ReferenceKind {
    Identifier,
    FieldAccess,
    Invocation,
    NewClass,
    Expression,
    /// Written type syntax: local and parameter types, created classes
    TypeTree,
}

/// One syntax node that carries type information
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeReference {
    pub node: NodeId,
    pub kind: ReferenceKind,
    pub type_id: TypeId,

    /// Invoked method type of invocations and instance creations, `TypeId::UNKNOWN` when the
    /// call could not be mapped. Always None for other references.
    pub method: Option<TypeId>,

    /// Variable a name, field access, local or parameter refers to
    pub variable: Option<TypeId>,
}

impl TypeReference {
    pub fn new(node: NodeId, kind: ReferenceKind, type_id: TypeId) -> Self {
        TypeReference {
            node,
            kind,
            type_id,
            method: None,
            variable: None,
        }
    }
}

/// Stands in for an input whose output could not be built
#[derive(Debug, Clone, Serialize)]
pub struct ParseErrorUnit {
    pub source_path: PathBuf,
    pub fault: CompilerError,
}

impl AttributedUnit {
    pub fn class_named(&self, name: &str) -> Option<&AttributedClass> {
        fn find<'a>(classes: &'a [AttributedClass], name: &str) -> Option<&'a AttributedClass> {
            for class in classes {
                if class.name == name {
                    return Some(class);
                }
                if let Some(found) = find(&class.nested, name) {
                    return Some(found);
                }
            }
            None
        }

        find(&self.classes, name)
    }

    pub fn to_json(&self, cache: &TypeCache) -> Value {
        json!({
            "source": self.source_path.to_string_lossy(),
            "package": self.package,
            "classes": self.classes.iter().map(|class| class.to_json(cache)).collect::<Vec<_>>(),
            "diagnostics": self.diagnostics,
        })
    }
}

impl AttributedClass {
    pub fn field(&self, name: &str) -> Option<&AttributedMember> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn method(&self, name: &str) -> Option<&AttributedMember> {
        self.methods.iter().find(|method| method.name == name)
    }

    pub fn references_of(&self, kind: ReferenceKind) -> impl Iterator<Item = &TypeReference> + '_ {
        self.type_references
            .iter()
            .filter(move |reference| reference.kind == kind)
    }

    fn to_json(&self, cache: &TypeCache) -> Value {
        json!({
            "name": self.name,
            "type": display_type(cache, self.type_id),
            "fields": self.fields.iter().map(|field| display_type(cache, field.type_id)).collect::<Vec<_>>(),
            "methods": self.methods.iter().map(|method| display_method(cache, method.type_id)).collect::<Vec<_>>(),
            "references": self.type_references.iter().map(|reference| reference.to_json(cache)).collect::<Vec<_>>(),
            "nested": self.nested.iter().map(|class| class.to_json(cache)).collect::<Vec<_>>(),
        })
    }
}

impl TypeReference {
    fn to_json(&self, cache: &TypeCache) -> Value {
        let mut value = json!({
            "node": self.node,
            "kind": self.kind,
            "type": display_type(cache, self.type_id),
        });

        if let Some(method) = self.method {
            value["method"] = Value::String(display_method(cache, method));
        }
        if let Some(variable) = self.variable {
            value["variable"] = Value::String(display_type(cache, variable));
        }
        value
    }
}

impl ParseErrorUnit {
    pub fn to_json(&self) -> Value {
        json!({
            "source": self.source_path.to_string_lossy(),
            "error": self.fault,
        })
    }
}
