//! Translates the toolchain's mutable, cyclic symbols into semantic type graph nodes.
//!
//! Every composite node goes through the cache twice: `reserve` before any dependent is
//! resolved and `complete` once they all are. A class that reaches itself through a
//! supertype, member or bound gets its own pending id back and recursion stops.

use crate::compiler_frontend::toolchain::enter::complete_class;
use crate::compiler_frontend::toolchain::symbols::{
    Flags, InternalAnnotation, InternalType, MethodSignature, SymbolData, SymbolId, SymbolTable,
    VarKind,
};
use crate::compiler_frontend::toolchain::syntax::{
    ClassKind, NodeId, PrimitiveTag, TypeSyntax, WildcardKind,
};
use crate::compiler_frontend::type_mapping::java_types::{
    ArrayType, ClassType, IntersectionType, JavaType, JavaTypeKind, MethodType,
    ParameterizedType, TypeId, TypeVariable, Variance, VariableType,
};
use crate::compiler_frontend::type_mapping::signatures::{SignatureBuilder, type_var_bounds};
use crate::compiler_frontend::type_mapping::symbol_recovery::SymbolRecovery;
use crate::compiler_frontend::type_mapping::type_cache::TypeCache;
use crate::projects::settings::{
    CONSTRUCTOR_NAME, INIT_NAME, INSTANCE_INIT_NAME, LIKELY_MEMBERS_PER_CLASS,
    SERIAL_PERSISTENT_FIELDS, STATIC_INIT_NAME, STRING_FQN,
};
use crate::type_log;
use rustc_hash::FxHashMap;

pub struct TypeMapper<'a> {
    pub(super) symbols: &'a mut SymbolTable,
    pub(super) cache: &'a mut TypeCache,
    pub(super) signatures: &'a dyn SignatureBuilder,
    recovery: &'a dyn SymbolRecovery,
}

impl<'a> TypeMapper<'a> {
    pub fn new(
        symbols: &'a mut SymbolTable,
        cache: &'a mut TypeCache,
        signatures: &'a dyn SignatureBuilder,
        recovery: &'a dyn SymbolRecovery,
    ) -> Self {
        TypeMapper {
            symbols,
            cache,
            signatures,
            recovery,
        }
    }

    pub fn cache(&self) -> &TypeCache {
        self.cache
    }

    pub fn symbols(&self) -> &SymbolTable {
        self.symbols
    }

    /// -----------------------------
    /// TYPES
    /// -----------------------------
    pub fn resolve(&mut self, ty: &InternalType) -> TypeId {
        match ty {
            InternalType::Primitive(tag) => primitive_id(*tag),
            InternalType::Class { symbol, type_args } if type_args.is_empty() => {
                self.class_type(*symbol)
            }
            InternalType::Class { symbol, type_args } => {
                self.parameterized(ty, *symbol, type_args)
            }
            InternalType::Array(element) => self.array(ty, element),
            InternalType::TypeVar(symbol) => self.type_variable(ty, *symbol),
            InternalType::Wildcard { kind, bound } => self.wildcard(ty, *kind, bound.as_deref()),
            InternalType::Intersection(bounds) => self.intersection(ty, bounds),

            // A method type on its own has no member to describe
            InternalType::Method(_)
            | InternalType::Package(_)
            | InternalType::Null
            | InternalType::Error
            | InternalType::Unknown => TypeId::UNKNOWN,
        }
    }

    pub fn resolve_all(&mut self, types: &[InternalType]) -> Vec<TypeId> {
        types.iter().map(|ty| self.resolve(ty)).collect()
    }

    fn class_type(&mut self, symbol: SymbolId) -> TypeId {
        if self.symbols.class(symbol).is_none() {
            return TypeId::UNKNOWN;
        }

        let signature = self.signatures.class_signature(self.symbols, symbol);
        if let Some(id) = self.cache.lookup(&signature) {
            return id;
        }
        let id = self.cache.reserve(&signature, JavaTypeKind::Class);

        // Partial member lists are fine
        if let Err(e) = complete_class(self.symbols, symbol) {
            type_log!(Yellow "Keeping partial members of ", Blue signature, ": ", {e.msg});
        }

        let flags = self.symbols.get(symbol).flags;
        let owner = self.symbols.get(symbol).owner;
        let annotations = self.symbols.get(symbol).annotations.clone();
        let (kind, supertype, interfaces, type_params, members) = match self.symbols.class(symbol)
        {
            Some(info) => (
                info.kind,
                info.supertype.clone(),
                info.interfaces.clone(),
                info.type_params.clone(),
                info.members.clone(),
            ),
            None => (ClassKind::Class, None, Vec::new(), Vec::new(), Vec::new()),
        };

        let owning_class = match owner {
            Some(owner) if self.symbols.class(owner).is_some() => Some(self.class_type(owner)),
            _ => None,
        };
        let supertype = supertype.map(|supertype| self.resolve(&supertype));
        let interfaces = self.resolve_all(&interfaces);
        let type_parameters = type_params
            .iter()
            .map(|param| self.resolve(&InternalType::TypeVar(*param)))
            .collect();

        let mut fields = Vec::with_capacity(LIKELY_MEMBERS_PER_CLASS);
        let mut methods = Vec::with_capacity(LIKELY_MEMBERS_PER_CLASS);
        for member in members {
            if !self.is_surfaced(symbol, member) {
                continue;
            }

            if self.symbols.variable(member).is_some() {
                fields.extend(self.resolve_as_variable(member, Some(id)));
            } else if self.symbols.method(member).is_some() {
                methods.extend(self.resolve_as_declared_method(member, Some(id)));
            }
        }

        let annotations = annotations
            .iter()
            .map(|annotation| self.resolve_annotation(annotation))
            .collect();

        self.cache.complete(
            id,
            JavaType::Class(ClassType {
                flags,
                fully_qualified_name: signature,
                kind,
                supertype,
                owning_class,
                interfaces,
                fields,
                methods,
                type_parameters,
                annotations,
            }),
        );
        id
    }

    /// Compiler artifacts, initializer blocks and the legacy String serialization field
    /// never become members
    fn is_surfaced(&self, class: SymbolId, member: SymbolId) -> bool {
        let symbol = self.symbols.get(member);
        if symbol.flags.intersects(Flags::NOT_SURFACED | Flags::BLOCK) {
            return false;
        }

        let name = self.symbols.name(member);
        if name == STATIC_INIT_NAME || name == INSTANCE_INIT_NAME {
            return false;
        }

        !(name == SERIAL_PERSISTENT_FIELDS && self.symbols.flat_name(class) == STRING_FQN)
    }

    fn parameterized(
        &mut self,
        ty: &InternalType,
        symbol: SymbolId,
        type_args: &[InternalType],
    ) -> TypeId {
        if self.symbols.class(symbol).is_none() {
            return TypeId::UNKNOWN;
        }

        let signature = self.signatures.signature(self.symbols, ty);
        if let Some(id) = self.cache.lookup(&signature) {
            return id;
        }
        let id = self.cache.reserve(&signature, JavaTypeKind::Parameterized);

        let class = self.class_type(symbol);
        let type_arguments = self.resolve_all(type_args);

        self.cache.complete(
            id,
            JavaType::Parameterized(ParameterizedType {
                class,
                type_arguments,
            }),
        );
        id
    }

    fn array(&mut self, ty: &InternalType, element: &InternalType) -> TypeId {
        let signature = self.signatures.signature(self.symbols, ty);
        if let Some(id) = self.cache.lookup(&signature) {
            return id;
        }
        let id = self.cache.reserve(&signature, JavaTypeKind::Array);

        let element = self.resolve(element);
        self.cache.complete(
            id,
            JavaType::Array(ArrayType {
                element,
                annotations: Vec::new(),
            }),
        );
        id
    }

    /// Bounds equal to java.lang.Object are dropped. A variable with bounds left is covariant.
    fn type_variable(&mut self, ty: &InternalType, symbol: SymbolId) -> TypeId {
        let Some(info) = self.symbols.type_var(symbol) else {
            return TypeId::UNKNOWN;
        };
        let bound = info.bound.clone();

        let signature = self.signatures.signature(self.symbols, ty);
        if let Some(id) = self.cache.lookup(&signature) {
            return id;
        }
        let id = self
            .cache
            .reserve(&signature, JavaTypeKind::GenericTypeVariable);

        let bounds = type_var_bounds(self.symbols, &bound);
        let bounds = self.resolve_all(&bounds);
        let variance = if bounds.is_empty() {
            Variance::Invariant
        } else {
            Variance::Covariant
        };

        self.cache.complete(
            id,
            JavaType::GenericTypeVariable(TypeVariable {
                name: self.symbols.name(symbol).to_owned(),
                variance,
                bounds,
            }),
        );
        id
    }

    /// Variance always follows the wildcard kind. Only an `extends java.lang.Object` bound
    /// is dropped, a `super` bound is kept whatever it is.
    fn wildcard(
        &mut self,
        ty: &InternalType,
        kind: WildcardKind,
        bound: Option<&InternalType>,
    ) -> TypeId {
        let signature = self.signatures.signature(self.symbols, ty);
        if let Some(id) = self.cache.lookup(&signature) {
            return id;
        }
        let id = self
            .cache
            .reserve(&signature, JavaTypeKind::GenericTypeVariable);

        let (variance, bounds) = match (kind, bound) {
            (WildcardKind::Extends, Some(bound)) if self.symbols.is_object(bound) => {
                (Variance::Covariant, Vec::new())
            }
            (WildcardKind::Extends, Some(bound)) => (Variance::Covariant, vec![self.resolve(bound)]),
            (WildcardKind::Super, Some(bound)) => {
                (Variance::Contravariant, vec![self.resolve(bound)])
            }
            _ => (Variance::Invariant, Vec::new()),
        };

        self.cache.complete(
            id,
            JavaType::GenericTypeVariable(TypeVariable {
                name: "?".to_owned(),
                variance,
                bounds,
            }),
        );
        id
    }

    fn intersection(&mut self, ty: &InternalType, bounds: &[InternalType]) -> TypeId {
        let signature = self.signatures.signature(self.symbols, ty);
        if let Some(id) = self.cache.lookup(&signature) {
            return id;
        }
        let id = self.cache.reserve(&signature, JavaTypeKind::Intersection);

        let bounds = self.resolve_all(bounds);
        self.cache
            .complete(id, JavaType::Intersection(IntersectionType { bounds }));
        id
    }

    /// Builds an array type with the annotations written on each dimension. The syntax is
    /// walked alongside the resolved type, and nodes are built outward from the innermost
    /// element type.
    pub fn resolve_annotated_array(
        &mut self,
        syntax: &TypeSyntax,
        resolved: &InternalType,
        dimension_annotations: &FxHashMap<NodeId, Vec<InternalAnnotation>>,
    ) -> TypeId {
        let (TypeSyntax::Array { id, element, .. }, InternalType::Array(inner)) = (syntax, resolved)
        else {
            return self.resolve(resolved);
        };

        let element_id = self.resolve_annotated_array(element, inner, dimension_annotations);
        let annotations: Vec<TypeId> = match dimension_annotations.get(id) {
            Some(written) => written
                .iter()
                .map(|annotation| self.resolve_annotation(annotation))
                .collect(),
            None => Vec::new(),
        };

        let mut signature = self.cache.signature(element_id).to_owned();
        for annotation in &annotations {
            signature.push(' ');
            signature.push_str(self.cache.signature(*annotation));
        }
        signature.push_str("[]");

        if let Some(existing) = self.cache.lookup(&signature) {
            return existing;
        }
        let array = self.cache.reserve(&signature, JavaTypeKind::Array);
        self.cache.complete(
            array,
            JavaType::Array(ArrayType {
                element: element_id,
                annotations,
            }),
        );
        array
    }

    /// -----------------------------
    /// MEMBERS
    /// -----------------------------
    /// A field, enum constant, parameter or local. `None` if the symbol is not a variable.
    pub fn resolve_as_variable(&mut self, symbol: SymbolId, owner: Option<TypeId>) -> Option<TypeId> {
        let variable = self.symbols.variable(symbol)?;
        let declared = variable.ty.clone();
        let kind = variable.kind;

        let signature = self.signatures.variable_signature(self.symbols, symbol);
        if let Some(id) = self.cache.lookup(&signature) {
            return Some(id);
        }
        let id = self.cache.reserve(&signature, JavaTypeKind::Variable);

        let owner = match owner {
            Some(owner) => Some(owner),
            None => self.owner_of(symbol),
        };
        let declared_type = self.resolve(&declared);

        let mut flags = self.symbols.get(symbol).flags;
        if kind == VarKind::EnumConstant {
            flags.insert(Flags::ENUM);
        }
        let annotations = self.symbols.get(symbol).annotations.clone();
        let annotations = annotations
            .iter()
            .map(|annotation| self.resolve_annotation(annotation))
            .collect();

        self.cache.complete(
            id,
            JavaType::Variable(VariableType {
                flags,
                owner,
                name: self.symbols.name(symbol).to_owned(),
                declared_type,
                annotations,
            }),
        );
        Some(id)
    }

    /// The method type at a call site: generics substituted as the call resolved them.
    /// An error placeholder goes through the recovery hook first.
    pub fn resolve_as_invoked_method(
        &mut self,
        method_type: &InternalType,
        symbol: SymbolId,
    ) -> Option<TypeId> {
        if matches!(self.symbols.get(symbol).data, SymbolData::Error(_)) {
            let recovered = self.recovery.recover_method(self.symbols, symbol);
            type_log!("Recovered invocation symbol: ", {recovered.is_some()});
            return self.resolve_as_declared_method(recovered?, None);
        }

        let declared = self.symbols.method(symbol)?.signature(self.symbols);
        let invoked = match method_type {
            InternalType::Method(signature) => signature.as_ref(),
            _ => &declared,
        };
        self.method_type(symbol, invoked, None)
    }

    /// The method type as declared, generic signature unresolved
    pub fn resolve_as_declared_method(
        &mut self,
        symbol: SymbolId,
        owner: Option<TypeId>,
    ) -> Option<TypeId> {
        let declared = self.symbols.method(symbol)?.signature(self.symbols);
        self.method_type(symbol, &declared, owner)
    }

    fn method_type(
        &mut self,
        symbol: SymbolId,
        signature: &MethodSignature,
        owner: Option<TypeId>,
    ) -> Option<TypeId> {
        let method = self.symbols.method(symbol)?;
        let params = method.params.clone();
        let type_params = method.type_params.clone();
        let default_value = method.default_value.clone();

        let key = self
            .signatures
            .method_signature(self.symbols, symbol, signature);
        if let Some(id) = self.cache.lookup(&key) {
            return Some(id);
        }
        let id = self.cache.reserve(&key, JavaTypeKind::Method);

        let declaring_type = match owner {
            Some(owner) => Some(owner),
            None => self.owner_of(symbol),
        };

        let name = match self.symbols.name(symbol) {
            INIT_NAME => CONSTRUCTOR_NAME.to_owned(),
            name => name.to_owned(),
        };
        let return_type = self.resolve(&signature.return_type);
        let parameter_types = self.resolve_all(&signature.params);
        let thrown_exceptions = self.resolve_all(&signature.thrown);
        let parameter_names = params
            .iter()
            .map(|param| self.symbols.name(*param).to_owned())
            .collect();
        let declared_formal_type_names = type_params
            .iter()
            .map(|param| self.symbols.name(*param).to_owned())
            .collect();

        let flags = self.symbols.get(symbol).flags;
        let annotations = self.symbols.get(symbol).annotations.clone();
        let annotations = annotations
            .iter()
            .map(|annotation| self.resolve_annotation(annotation))
            .collect();
        let default_value = default_value.map(|value| self.element_value(&value));

        self.cache.complete(
            id,
            JavaType::Method(MethodType {
                flags,
                declaring_type,
                name,
                return_type,
                parameter_names,
                parameter_types,
                thrown_exceptions,
                annotations,
                default_value,
                declared_formal_type_names,
            }),
        );
        Some(id)
    }

    /// Declaring class of a member, or declaring method of a parameter or local
    fn owner_of(&mut self, symbol: SymbolId) -> Option<TypeId> {
        let owner = self.symbols.get(symbol).owner?;
        if self.symbols.class(owner).is_some() {
            Some(self.class_type(owner))
        } else {
            self.resolve_as_declared_method(owner, None)
        }
    }
}

fn primitive_id(tag: PrimitiveTag) -> TypeId {
    match tag {
        PrimitiveTag::Boolean => TypeId::BOOLEAN,
        PrimitiveTag::Byte => TypeId::BYTE,
        PrimitiveTag::Char => TypeId::CHAR,
        PrimitiveTag::Double => TypeId::DOUBLE,
        PrimitiveTag::Float => TypeId::FLOAT,
        PrimitiveTag::Int => TypeId::INT,
        PrimitiveTag::Long => TypeId::LONG,
        PrimitiveTag::Short => TypeId::SHORT,
        PrimitiveTag::Void => TypeId::VOID,
    }
}

#[cfg(test)]
#[path = "tests/type_mapper_tests.rs"]
mod tests;
