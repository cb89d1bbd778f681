//! Symbol entry.
//!
//! Entry runs in phases over a whole batch so cross-file references resolve regardless of
//! input order: every class is declared first, then headers (type parameters, supertypes,
//! interfaces) are resolved, then members are entered, then bridge methods are added.
//!
//! Classpath stubs go through the same header and member code lazily, one class at a time,
//! through `complete_class`. The only difference is strictness: an unresolvable name in a
//! source file degrades to the error type with a warning, while in a stub it stops completion.

use crate::compiler_frontend::compiler_errors::{CompilerError, ErrorLocation};
use crate::compiler_frontend::compiler_warnings::{CompilerWarning, WarningKind};
use crate::compiler_frontend::string_interning::StringId;
use crate::compiler_frontend::toolchain::annotate::{PendingAnnotation, PendingKind};
use crate::compiler_frontend::toolchain::classpath::flat_name_of;
use crate::compiler_frontend::toolchain::compiler_log::CompilerLog;
use crate::compiler_frontend::toolchain::symbols::{
    ClassOrigin, ClassSymbol, Completion, ConstantValue, DeclRef, Flags, InternalAnnotation,
    InternalElementValue, InternalType, MethodSymbol, Symbol, SymbolData, SymbolId, SymbolTable,
    TypeVarSymbol, VarKind, VarSymbol, class_kind_flags, substitute,
};
use crate::compiler_frontend::toolchain::syntax::{
    AnnotationSyntax, ClassDecl, ClassKind, CompilationUnit, ElementValueSyntax, Literal,
    MemberDecl, MethodDecl, NodeId, PrimitiveTag, QualifiedName, TextLocation, TypeParamSyntax,
    TypeSyntax,
};
use crate::compiler_frontend::toolchain::{UnitId, UnitTables};
use crate::projects::settings::{
    ANNOTATION_FQN, ENUM_FQN, ENUM_VALUES_FIELD, IMPLICIT_IMPORT_PACKAGE, INIT_NAME,
    INSTANCE_INIT_NAME, OBJECT_FQN, RECORD_FQN, STATIC_INIT_NAME, STRING_FQN,
};
use crate::{return_session_misuse, symbol_log};
use rustc_hash::FxHashSet;
use std::path::PathBuf;
use std::rc::Rc;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnterMode {
    /// Entered and queued for attribution
    Source,
    /// Entered for symbol visibility only
    Dependency,
}

/// Bookkeeping for one call to the joint entry pass
#[derive(Default)]
pub struct EntryBatch {
    paths: FxHashSet<PathBuf>,
    declared: FxHashSet<SymbolId>,
}

impl EntryBatch {
    pub fn new<'p>(paths: impl IntoIterator<Item = &'p PathBuf>) -> Self {
        EntryBatch {
            paths: paths.into_iter().cloned().collect(),
            declared: FxHashSet::default(),
        }
    }
}

/// How declaration annotations reach their symbols
pub enum AnnotationQueue<'q> {
    /// Classpath stubs resolve their annotations on the spot
    Immediate,
    /// Source annotations wait until the batch unblocks annotations
    Deferred {
        unit: UnitId,
        pending: &'q mut Vec<PendingAnnotation>,
    },
}

impl AnnotationQueue<'_> {
    fn annotations(
        &mut self,
        resolver: &mut Resolver,
        target: SymbolId,
        syntax: &[AnnotationSyntax],
    ) -> Result<(), CompilerError> {
        match self {
            AnnotationQueue::Immediate => {
                for annotation in syntax {
                    let resolved = resolver.resolve_annotation(annotation)?;
                    resolver.symbols.get_mut(target).annotations.push(resolved);
                }
            }
            AnnotationQueue::Deferred { unit, pending } => {
                for annotation in syntax {
                    pending.push(PendingAnnotation {
                        unit: *unit,
                        scope: resolver.class,
                        target,
                        kind: PendingKind::Declaration(annotation.clone()),
                    });
                }
            }
        }
        Ok(())
    }

    fn default_value(
        &mut self,
        resolver: &mut Resolver,
        target: SymbolId,
        syntax: &ElementValueSyntax,
    ) -> Result<(), CompilerError> {
        match self {
            AnnotationQueue::Immediate => {
                let value = resolver.resolve_element_value(syntax)?;
                if let Some(method) = resolver.symbols.method_mut(target) {
                    method.default_value = Some(value);
                }
            }
            AnnotationQueue::Deferred { unit, pending } => pending.push(PendingAnnotation {
                unit: *unit,
                scope: resolver.class,
                target,
                kind: PendingKind::DefaultValue(syntax.clone()),
            }),
        }
        Ok(())
    }
}

/// Name resolution scope for one class body
pub struct Resolver<'a> {
    pub symbols: &'a mut SymbolTable,
    unit: &'a CompilationUnit,
    package: String,
    pub class: Option<SymbolId>,
    type_vars: Vec<(StringId, SymbolId)>,

    /// None while completing classpath stubs
    pub tables: Option<&'a mut UnitTables>,
}

impl<'a> Resolver<'a> {
    pub fn new(
        symbols: &'a mut SymbolTable,
        unit: &'a CompilationUnit,
        class: Option<SymbolId>,
        tables: Option<&'a mut UnitTables>,
    ) -> Self {
        let package = unit.package_name(&symbols.names);

        // Outer type variables are visible to inner classes, inner ones shadow them
        let mut chain = Vec::new();
        let mut current = class;
        while let Some(class) = current {
            chain.push(class);
            current = symbols
                .get(class)
                .owner
                .and_then(|owner| symbols.enclosing_class(owner));
        }

        let mut type_vars = Vec::new();
        for class in chain.iter().rev() {
            if let Some(info) = symbols.class(*class) {
                for var in &info.type_params {
                    type_vars.push((symbols.get(*var).name, *var));
                }
            }
        }

        Resolver {
            symbols,
            unit,
            package,
            class,
            type_vars,
            tables,
        }
    }

    pub fn unit(&self) -> &'a CompilationUnit {
        self.unit
    }

    pub fn is_strict(&self) -> bool {
        self.tables.is_none()
    }

    pub fn error_location(&self, location: TextLocation) -> ErrorLocation {
        location.to_error_location(&self.unit.source_path)
    }

    pub fn record_decl(&mut self, node: NodeId, symbol: SymbolId) {
        if let Some(tables) = self.tables.as_deref_mut() {
            tables.decl_symbols.insert(node, symbol);
        }
    }

    pub fn decl_symbol(&self, node: NodeId) -> Option<SymbolId> {
        self.tables
            .as_deref()
            .and_then(|tables| tables.decl_symbols.get(&node).copied())
    }

    pub fn warn(&mut self, msg: String, location: TextLocation, kind: WarningKind) {
        let location = self.error_location(location);
        if let Some(tables) = self.tables.as_deref_mut() {
            tables
                .diagnostics
                .push(CompilerWarning::new(msg, location, kind));
        }
    }

    /// The error type with a warning in source files, a completion failure in stubs
    pub fn unresolved(
        &mut self,
        msg: String,
        location: TextLocation,
    ) -> Result<InternalType, CompilerError> {
        if self.is_strict() {
            return Err(CompilerError::new_completion_error(
                msg,
                self.error_location(location),
            ));
        }

        self.warn(msg, location, WarningKind::UnresolvedSymbol);
        Ok(InternalType::Error)
    }

    pub fn type_var_depth(&self) -> usize {
        self.type_vars.len()
    }

    pub fn truncate_type_vars(&mut self, depth: usize) {
        self.type_vars.truncate(depth);
    }

    pub fn push_type_vars(&mut self, vars: &[SymbolId]) {
        for var in vars {
            self.type_vars.push((self.symbols.get(*var).name, *var));
        }
    }

    fn type_var(&self, name: StringId) -> Option<SymbolId> {
        self.type_vars
            .iter()
            .rev()
            .find(|(var_name, _)| *var_name == name)
            .map(|(_, var)| *var)
    }

    pub fn object_type(&mut self) -> Option<InternalType> {
        self.well_known(OBJECT_FQN)
    }

    pub fn string_type(&mut self) -> InternalType {
        self.well_known(STRING_FQN).unwrap_or(InternalType::Error)
    }

    pub fn well_known(&mut self, flat_name: &str) -> Option<InternalType> {
        self.symbols.lookup_class(flat_name).map(InternalType::class)
    }

    fn is_interface(&self, ty: &InternalType) -> bool {
        ty.class_symbol()
            .is_some_and(|symbol| self.symbols.get(symbol).flags.contains(Flags::INTERFACE))
    }

    /// -----------------------------
    /// CLASS NAMES
    /// -----------------------------
    /// Simple class name lookup in scope order: member classes of this and enclosing classes
    /// (inherited ones included), single-type imports, the same package, on-demand imports,
    /// then the implicitly imported package.
    pub fn lookup_simple_class(&mut self, name: StringId) -> Option<SymbolId> {
        let simple = self.symbols.names.resolve(name).to_owned();

        let mut current = self.class;
        while let Some(class) = current {
            let mut visited = FxHashSet::default();
            if let Some(found) = self.member_class(class, &simple, &mut visited) {
                return Some(found);
            }
            current = self
                .symbols
                .get(class)
                .owner
                .and_then(|owner| self.symbols.enclosing_class(owner));
        }

        let unit = self.unit;
        for import in &unit.imports {
            if !import.on_demand && import.name.last() == Some(name) {
                return self.resolve_fully_qualified(&import.name);
            }
        }

        let same_package = if self.package.is_empty() {
            simple.clone()
        } else {
            format!("{}.{}", self.package, simple)
        };
        if let Some(found) = self.symbols.lookup_class(&same_package) {
            return Some(found);
        }

        for import in &unit.imports {
            if !import.on_demand {
                continue;
            }

            let dotted = import.name.to_dotted(&self.symbols.names);
            if let Some(found) = self.symbols.lookup_class(&format!("{dotted}.{simple}")) {
                return Some(found);
            }

            // `import a.Outer.*` brings in member classes
            if let Some(outer) = self.resolve_fully_qualified(&import.name) {
                let mut visited = FxHashSet::default();
                if let Some(found) = self.member_class(outer, &simple, &mut visited) {
                    return Some(found);
                }
            }
        }

        self.symbols
            .lookup_class(&format!("{IMPLICIT_IMPORT_PACKAGE}.{simple}"))
    }

    fn member_class(
        &mut self,
        class: SymbolId,
        simple: &str,
        visited: &mut FxHashSet<SymbolId>,
    ) -> Option<SymbolId> {
        if !visited.insert(class) {
            return None;
        }

        let flat_name = format!("{}${}", self.symbols.flat_name(class), simple);
        if let Some(found) = self.symbols.lookup_class(&flat_name) {
            return Some(found);
        }

        let parents: Vec<SymbolId> = match self.symbols.class(class) {
            Some(info) => info
                .supertype
                .iter()
                .chain(info.interfaces.iter())
                .filter_map(InternalType::class_symbol)
                .collect(),
            None => Vec::new(),
        };

        parents
            .into_iter()
            .find_map(|parent| self.member_class(parent, simple, visited))
    }

    /// `a.b.C.D` read as the longest known class prefix followed by member classes
    pub fn resolve_fully_qualified(&mut self, name: &QualifiedName) -> Option<SymbolId> {
        let segments: Vec<String> = name
            .segments
            .iter()
            .map(|segment| self.symbols.names.resolve(*segment).to_owned())
            .collect();

        for split in 1..=segments.len() {
            let candidate = segments[..split].join(".");
            if let Some(class) = self.symbols.lookup_class(&candidate) {
                return self.nested_path(class, &segments[split..]);
            }
        }

        None
    }

    fn nested_path(&mut self, class: SymbolId, rest: &[String]) -> Option<SymbolId> {
        let mut current = class;
        for segment in rest {
            let mut visited = FxHashSet::default();
            current = self.member_class(current, segment, &mut visited)?;
        }
        Some(current)
    }

    /// A simple name in scope, or a qualified name whose first segment may itself be a class in scope
    pub fn resolve_class_name(&mut self, name: &QualifiedName) -> Option<SymbolId> {
        let (first, rest) = name.segments.split_first()?;

        if let Some(class) = self.lookup_simple_class(*first) {
            let rest: Vec<String> = rest
                .iter()
                .map(|segment| self.symbols.names.resolve(*segment).to_owned())
                .collect();
            if let Some(found) = self.nested_path(class, &rest) {
                return Some(found);
            }
        }

        if rest.is_empty() {
            return None;
        }

        self.resolve_fully_qualified(name)
    }

    /// -----------------------------
    /// TYPES
    /// -----------------------------
    pub fn resolve_type(&mut self, syntax: &TypeSyntax) -> Result<InternalType, CompilerError> {
        let ty = match syntax {
            TypeSyntax::Primitive { tag, .. } => InternalType::Primitive(*tag),

            TypeSyntax::Named {
                name, type_args, ..
            } => {
                let var = match name.segments.as_slice() {
                    [single] => self.type_var(*single),
                    _ => None,
                };

                match var {
                    Some(var) => InternalType::TypeVar(var),
                    None => match self.resolve_class_name(name) {
                        Some(symbol) => {
                            let mut resolved_args = Vec::new();
                            for arg in type_args.iter().flatten() {
                                resolved_args.push(self.resolve_type(arg)?);
                            }
                            InternalType::Class {
                                symbol,
                                type_args: resolved_args,
                            }
                        }
                        None => {
                            let msg = format!(
                                "Cannot find class '{}'",
                                name.to_dotted(&self.symbols.names)
                            );
                            self.unresolved(msg, name.location)?
                        }
                    },
                }
            }

            TypeSyntax::Array { element, .. } => {
                InternalType::Array(Box::new(self.resolve_type(element)?))
            }

            TypeSyntax::Wildcard { kind, bound, .. } => {
                let bound = match bound {
                    Some(bound) => Some(Box::new(self.resolve_type(bound)?)),
                    None => None,
                };
                InternalType::Wildcard { kind: *kind, bound }
            }
        };

        if let Some(tables) = self.tables.as_deref_mut() {
            tables.type_trees.insert(syntax.id(), ty.clone());
        }

        Ok(ty)
    }

    pub fn resolve_types(&mut self, syntax: &[TypeSyntax]) -> Result<Vec<InternalType>, CompilerError> {
        let mut resolved = Vec::with_capacity(syntax.len());
        for ty in syntax {
            resolved.push(self.resolve_type(ty)?);
        }
        Ok(resolved)
    }

    /// Object when nothing is written, a single bound as is, several bounds as an
    /// intersection with the class bound (or Object) first
    fn resolve_bound(&mut self, bounds: &[TypeSyntax]) -> Result<InternalType, CompilerError> {
        let mut resolved = self.resolve_types(bounds)?;

        match resolved.len() {
            0 => Ok(self.object_type().unwrap_or(InternalType::Unknown)),
            1 => Ok(resolved.remove(0)),
            _ => {
                let class_bound = match resolved.iter().position(|ty| !self.is_interface(ty)) {
                    Some(index) => resolved.remove(index),
                    None => self.object_type().unwrap_or(InternalType::Unknown),
                };

                let mut ordered = Vec::with_capacity(resolved.len() + 1);
                ordered.push(class_bound);
                ordered.extend(resolved);
                Ok(InternalType::Intersection(ordered))
            }
        }
    }

    /// Allocates the variables before resolving any bound so bounds can refer to later parameters
    pub fn enter_type_params(
        &mut self,
        owner: SymbolId,
        params: &[TypeParamSyntax],
    ) -> Result<Vec<SymbolId>, CompilerError> {
        let mut ids = Vec::with_capacity(params.len());
        for param in params {
            let id = self.symbols.alloc(Symbol::new(
                param.name,
                Flags::NONE,
                Some(owner),
                SymbolData::TypeVariable(TypeVarSymbol {
                    bound: InternalType::Unknown,
                }),
            ));
            self.record_decl(param.id, id);
            self.type_vars.push((param.name, id));
            ids.push(id);
        }

        for (param, id) in params.iter().zip(&ids) {
            let bound = self.resolve_bound(&param.bounds)?;
            if let SymbolData::TypeVariable(var) = &mut self.symbols.get_mut(*id).data {
                var.bound = bound;
            }
        }

        Ok(ids)
    }

    /// -----------------------------
    /// ANNOTATIONS
    /// -----------------------------
    pub fn resolve_annotation(
        &mut self,
        syntax: &AnnotationSyntax,
    ) -> Result<InternalAnnotation, CompilerError> {
        let annotation_type = match self.resolve_class_name(&syntax.name) {
            Some(symbol) => InternalType::class(symbol),
            None => {
                let msg = format!(
                    "Cannot find annotation type '{}'",
                    syntax.name.to_dotted(&self.symbols.names)
                );
                self.unresolved(msg, syntax.name.location)?
            }
        };

        let mut values = Vec::with_capacity(syntax.arguments.len());
        for pair in &syntax.arguments {
            let name = match pair.name {
                Some(name) => name,
                None => self.symbols.names.intern("value"),
            };
            values.push((name, self.resolve_element_value(&pair.value)?));
        }

        Ok(InternalAnnotation {
            annotation_type,
            values,
        })
    }

    pub fn resolve_element_value(
        &mut self,
        syntax: &ElementValueSyntax,
    ) -> Result<InternalElementValue, CompilerError> {
        let value = match syntax {
            ElementValueSyntax::Literal(literal) => match literal {
                Literal::Int(value) => InternalElementValue::Constant(ConstantValue::Int(*value)),
                Literal::Long(value) => {
                    InternalElementValue::Constant(ConstantValue::Long(*value))
                }
                Literal::Float(value) => {
                    InternalElementValue::Constant(ConstantValue::Float(*value))
                }
                Literal::Double(value) => {
                    InternalElementValue::Constant(ConstantValue::Double(*value))
                }
                Literal::Boolean(value) => {
                    InternalElementValue::Constant(ConstantValue::Boolean(*value))
                }
                Literal::Char(value) => {
                    InternalElementValue::Constant(ConstantValue::Char(*value))
                }
                Literal::String(value) => InternalElementValue::Constant(ConstantValue::String(
                    self.symbols.names.resolve(*value).to_owned(),
                )),
                Literal::Null => InternalElementValue::Error,
            },

            ElementValueSyntax::Name(name) => self.resolve_constant_name(name)?,

            ElementValueSyntax::ClassLiteral(ty) => {
                InternalElementValue::ClassLiteral(self.resolve_type(ty)?)
            }

            ElementValueSyntax::Annotation(annotation) => {
                InternalElementValue::Annotation(Box::new(self.resolve_annotation(annotation)?))
            }

            ElementValueSyntax::Array(values) => {
                let mut resolved = Vec::with_capacity(values.len());
                for value in values {
                    resolved.push(self.resolve_element_value(value)?);
                }
                InternalElementValue::Array(resolved)
            }
        };

        Ok(value)
    }

    /// `Kind.A` or a bare `A` declared in the current class
    fn resolve_constant_name(
        &mut self,
        name: &QualifiedName,
    ) -> Result<InternalElementValue, CompilerError> {
        let Some((last, prefix)) = name.segments.split_last() else {
            return Ok(InternalElementValue::Error);
        };

        let owner = if prefix.is_empty() {
            self.class
        } else {
            let prefix = QualifiedName {
                segments: prefix.to_vec(),
                location: name.location,
            };
            self.resolve_class_name(&prefix)
        };

        if let Some(owner) = owner {
            // Constants of a broken stub are simply not found
            let completed = complete_class(self.symbols, owner);
            if self.is_strict() {
                completed?;
            }

            let field = self
                .symbols
                .members_named(owner, *last)
                .into_iter()
                .find(|member| self.symbols.variable(*member).is_some());

            if let Some(field) = field {
                if self.symbols.get(field).flags.contains(Flags::ENUM) {
                    return Ok(InternalElementValue::EnumConstant(field));
                }
                // Constant folding of ordinary fields isn't modelled
                return Ok(InternalElementValue::Error);
            }
        }

        let msg = format!(
            "Cannot find constant '{}'",
            name.to_dotted(&self.symbols.names)
        );
        self.unresolved(msg, name.location)?;
        Ok(InternalElementValue::Error)
    }
}

/// The type of `this` inside a class: the class applied to its own type variables
pub fn this_type(symbols: &SymbolTable, class: SymbolId) -> InternalType {
    InternalType::Class {
        symbol: class,
        type_args: symbols
            .class(class)
            .map(|info| {
                info.type_params
                    .iter()
                    .map(|var| InternalType::TypeVar(*var))
                    .collect()
            })
            .unwrap_or_default(),
    }
}

pub fn erasure(symbols: &SymbolTable, ty: &InternalType) -> InternalType {
    erasure_at_depth(symbols, ty, 0)
}

fn erasure_at_depth(symbols: &SymbolTable, ty: &InternalType, depth: usize) -> InternalType {
    // Type variables bounded by each other in a loop have no meaningful erasure
    if depth > 32 {
        return InternalType::Error;
    }

    match ty {
        InternalType::Class { symbol, .. } => InternalType::class(*symbol),
        InternalType::Array(element) => {
            InternalType::Array(Box::new(erasure_at_depth(symbols, element, depth + 1)))
        }
        InternalType::TypeVar(var) => match symbols.type_var(*var) {
            Some(var) => erasure_at_depth(symbols, &var.bound, depth + 1),
            None => InternalType::Error,
        },
        InternalType::Intersection(bounds) => match bounds.first() {
            Some(first) => erasure_at_depth(symbols, first, depth + 1),
            None => InternalType::Error,
        },
        InternalType::Wildcard {
            bound: Some(bound), ..
        } => erasure_at_depth(symbols, bound, depth + 1),
        other => other.clone(),
    }
}

fn push_member(symbols: &mut SymbolTable, class: SymbolId, member: SymbolId) {
    if let Some(info) = symbols.class_mut(class) {
        info.members.push(member);
    }
}

fn add_variable(
    resolver: &mut Resolver,
    owner: SymbolId,
    name: StringId,
    flags: Flags,
    kind: VarKind,
    ty: InternalType,
) -> SymbolId {
    resolver.symbols.alloc(Symbol::new(
        name,
        flags,
        Some(owner),
        SymbolData::Variable(VarSymbol { kind, ty }),
    ))
}

/// Synthesized members: parameters are named and typed, nothing else is declared
fn add_method(
    resolver: &mut Resolver,
    class: SymbolId,
    name: StringId,
    flags: Flags,
    params: Vec<(StringId, InternalType)>,
    return_type: InternalType,
) -> SymbolId {
    let method = resolver.symbols.alloc(Symbol::new(
        name,
        flags,
        Some(class),
        SymbolData::Method(MethodSymbol {
            type_params: Vec::new(),
            params: Vec::new(),
            return_type,
            thrown: Vec::new(),
            default_value: None,
            decl_id: None,
        }),
    ));

    let param_ids: Vec<SymbolId> = params
        .into_iter()
        .map(|(param_name, ty)| {
            add_variable(resolver, method, param_name, Flags::NONE, VarKind::Parameter, ty)
        })
        .collect();

    if let Some(info) = resolver.symbols.method_mut(method) {
        info.params = param_ids;
    }

    push_member(resolver.symbols, class, method);
    method
}

/// -----------------------------
/// PHASE 1: DECLARE CLASSES
/// -----------------------------
/// Declares every class in the unit, nested ones included, and returns them with their
/// declaration paths, outer classes first.
pub fn declare_classes(
    symbols: &mut SymbolTable,
    unit: &Rc<CompilationUnit>,
    tables: &mut UnitTables,
    batch: &mut EntryBatch,
    log: &CompilerLog,
) -> Result<Vec<(SymbolId, Vec<usize>)>, CompilerError> {
    let package = unit.package_name(&symbols.names);
    let package_symbol = symbols.enter_package(&package);
    let mut declared = Vec::new();

    for (path, class) in unit.class_paths() {
        let owner = if path.len() == 1 {
            package_symbol
        } else {
            let parent = unit
                .class_at(&path[..path.len() - 1])
                .and_then(|parent| tables.decl_symbols.get(&parent.id).copied());

            // The enclosing class was a duplicate and has been skipped
            let Some(parent) = parent else {
                continue;
            };
            parent
        };

        let flat_name = flat_name_of(unit, &path, &symbols.names);
        let location = class.location.to_error_location(&unit.source_path);

        let mut flags = class.modifiers | class_kind_flags(class.kind);
        if path.len() > 1 && class.kind != ClassKind::Class {
            flags.insert(Flags::STATIC);
        }

        let symbol = Symbol::new(
            class.name,
            flags,
            Some(owner),
            SymbolData::Class(ClassSymbol {
                flat_name: flat_name.clone(),
                kind: class.kind,
                type_params: Vec::new(),
                supertype: None,
                interfaces: Vec::new(),
                members: Vec::new(),
                completion: Completion::Complete,
                origin: ClassOrigin::Source(unit.source_path.clone()),
                decl: Some(DeclRef {
                    unit: Rc::clone(unit),
                    path: path.clone(),
                }),
            }),
        );

        let id = match symbols.entered_class(&flat_name) {
            Some(existing) if batch.declared.contains(&existing) => {
                tables.diagnostics.push(CompilerWarning::new(
                    flat_name,
                    location,
                    WarningKind::DuplicateClass,
                ));
                continue;
            }

            Some(existing) => {
                let stale_origin = symbols
                    .class(existing)
                    .map(|info| info.origin.clone());

                if let Some(ClassOrigin::Source(previous)) = stale_origin
                    && !batch.paths.contains(&previous)
                    && log.was_parsed(&previous)
                {
                    return_session_misuse!(
                        format!(
                            "Class '{flat_name}' was already entered from {} in this session. Reset the session (or the location) before submitting it again",
                            previous.display()
                        ),
                        location,
                        {
                            CompilationStage => "Symbol Entry",
                            PrimarySuggestion => "Call reset() or reset_locations() with the previous location first",
                        }
                    );
                }

                // Forgotten or classpath declarations are replaced in place so existing
                // references keep pointing at the class
                symbol_log!(Yellow "Re-entering ", Blue {flat_name});
                *symbols.get_mut(existing) = symbol;
                existing
            }

            None => {
                let id = symbols.alloc(symbol);
                symbols.register_class(flat_name.clone(), id);
                id
            }
        };

        symbol_log!("Declared ", Blue {flat_name});
        batch.declared.insert(id);
        tables.decl_symbols.insert(class.id, id);
        declared.push((id, path));
    }

    Ok(declared)
}

/// Warns about single-type imports that name nothing
pub fn check_imports(resolver: &mut Resolver) {
    let unit = resolver.unit();
    for import in &unit.imports {
        if import.on_demand {
            continue;
        }

        if resolver.resolve_fully_qualified(&import.name).is_none() {
            let msg = import.name.to_dotted(&resolver.symbols.names);
            resolver.warn(msg, import.name.location, WarningKind::UnresolvedImport);
        }
    }
}

/// -----------------------------
/// PHASE 2: HEADERS
/// -----------------------------
pub fn enter_header(
    resolver: &mut Resolver,
    class: SymbolId,
    decl: &ClassDecl,
) -> Result<(), CompilerError> {
    let type_params = resolver.enter_type_params(class, &decl.type_params)?;
    if let Some(info) = resolver.symbols.class_mut(class) {
        info.type_params = type_params;
    }

    let is_object = resolver.symbols.flat_name(class) == OBJECT_FQN;

    let (supertype, interfaces) = match decl.kind {
        ClassKind::Class => {
            let supertype = match decl.extends.first() {
                Some(extends) => Some(resolver.resolve_type(extends)?),
                None if is_object => None,
                None => resolver.object_type(),
            };
            (supertype, resolver.resolve_types(&decl.implements)?)
        }

        ClassKind::Interface => (None, resolver.resolve_types(&decl.extends)?),

        ClassKind::Annotation => (
            None,
            resolver.well_known(ANNOTATION_FQN).into_iter().collect(),
        ),

        ClassKind::Enum => {
            let this = this_type(resolver.symbols, class);
            let supertype = resolver
                .symbols
                .lookup_class(ENUM_FQN)
                .map(|symbol| InternalType::Class {
                    symbol,
                    type_args: vec![this],
                });
            (supertype, resolver.resolve_types(&decl.implements)?)
        }

        ClassKind::Record => (
            resolver.well_known(RECORD_FQN),
            resolver.resolve_types(&decl.implements)?,
        ),
    };

    if let Some(info) = resolver.symbols.class_mut(class) {
        info.supertype = supertype;
        info.interfaces = interfaces;
    }

    Ok(())
}

/// -----------------------------
/// PHASE 3: MEMBERS
/// -----------------------------
pub fn enter_members(
    resolver: &mut Resolver,
    class: SymbolId,
    decl: &ClassDecl,
    queue: &mut AnnotationQueue,
) -> Result<(), CompilerError> {
    let class_flags = resolver.symbols.get(class).flags;
    let is_interface = class_flags.contains(Flags::INTERFACE);
    let this = this_type(resolver.symbols, class);

    queue.annotations(resolver, class, &decl.annotations)?;

    for constant in &decl.enum_constants {
        let id = add_variable(
            resolver,
            class,
            constant.name,
            Flags::PUBLIC | Flags::STATIC | Flags::FINAL | Flags::ENUM,
            VarKind::EnumConstant,
            this.clone(),
        );
        resolver.record_decl(constant.id, id);
        push_member(resolver.symbols, class, id);
        queue.annotations(resolver, id, &constant.annotations)?;
    }

    let mut components = Vec::with_capacity(decl.record_components.len());
    for component in &decl.record_components {
        let ty = resolver.resolve_type(&component.ty)?;
        let id = add_variable(
            resolver,
            class,
            component.name,
            Flags::PRIVATE | Flags::FINAL,
            VarKind::Field,
            ty.clone(),
        );
        resolver.record_decl(component.id, id);
        push_member(resolver.symbols, class, id);
        queue.annotations(resolver, id, &component.annotations)?;
        components.push((component.name, ty));
    }

    let mut has_constructor = false;
    for member in &decl.members {
        match member {
            MemberDecl::Field(field) => {
                let ty = resolver.resolve_type(&field.ty)?;
                let mut flags = field.modifiers;
                if is_interface {
                    flags.insert(Flags::PUBLIC | Flags::STATIC | Flags::FINAL);
                }

                let id = add_variable(resolver, class, field.name, flags, VarKind::Field, ty);
                resolver.record_decl(field.id, id);
                push_member(resolver.symbols, class, id);
                queue.annotations(resolver, id, &field.annotations)?;
            }

            MemberDecl::Method(method) => {
                has_constructor |= method.is_constructor();
                enter_method(resolver, class, method, is_interface, queue)?;
            }

            MemberDecl::Initializer(init) => {
                let (name, flags) = if init.is_static {
                    (STATIC_INIT_NAME, Flags::BLOCK | Flags::STATIC)
                } else {
                    (INSTANCE_INIT_NAME, Flags::BLOCK)
                };
                let name = resolver.symbols.names.intern(name);
                let id = add_method(
                    resolver,
                    class,
                    name,
                    flags,
                    Vec::new(),
                    InternalType::Primitive(PrimitiveTag::Void),
                );
                resolver.record_decl(init.id, id);
            }

            MemberDecl::Class(nested) => {
                let flat_name = format!(
                    "{}${}",
                    resolver.symbols.flat_name(class),
                    resolver.symbols.names.resolve(nested.name)
                );
                if let Some(id) = resolver.symbols.lookup_class(&flat_name) {
                    push_member(resolver.symbols, class, id);
                }
            }
        }
    }

    let init_name = resolver.symbols.names.intern(INIT_NAME);
    let void = InternalType::Primitive(PrimitiveTag::Void);

    match decl.kind {
        ClassKind::Record => {
            for (name, ty) in &components {
                let declared = resolver
                    .symbols
                    .members_named(class, *name)
                    .into_iter()
                    .any(|member| {
                        resolver
                            .symbols
                            .method(member)
                            .is_some_and(|method| method.params.is_empty())
                    });
                if !declared {
                    add_method(resolver, class, *name, Flags::PUBLIC, Vec::new(), ty.clone());
                }
            }

            if !has_constructor {
                add_method(resolver, class, init_name, Flags::PUBLIC, components, void);
            }
        }

        ClassKind::Enum => {
            let values_field = resolver.symbols.names.intern(ENUM_VALUES_FIELD);
            let array = InternalType::Array(Box::new(this.clone()));
            let id = add_variable(
                resolver,
                class,
                values_field,
                Flags::PRIVATE | Flags::STATIC | Flags::FINAL | Flags::SYNTHETIC,
                VarKind::Field,
                array.clone(),
            );
            push_member(resolver.symbols, class, id);

            let values = resolver.symbols.names.intern("values");
            add_method(
                resolver,
                class,
                values,
                Flags::PUBLIC | Flags::STATIC,
                Vec::new(),
                array,
            );

            let value_of = resolver.symbols.names.intern("valueOf");
            let name_param = resolver.symbols.names.intern("name");
            let string = resolver.string_type();
            add_method(
                resolver,
                class,
                value_of,
                Flags::PUBLIC | Flags::STATIC,
                vec![(name_param, string)],
                this.clone(),
            );

            if !has_constructor {
                add_method(
                    resolver,
                    class,
                    init_name,
                    Flags::PRIVATE | Flags::GENERATED_CONSTR,
                    Vec::new(),
                    void,
                );
            }
        }

        ClassKind::Class if !has_constructor => {
            let access = Flags::PUBLIC | Flags::PROTECTED | Flags::PRIVATE;
            let flags = Flags::GENERATED_CONSTR | class_flags.intersection(access);
            add_method(resolver, class, init_name, flags, Vec::new(), void);
        }

        _ => {}
    }

    Ok(())
}

fn enter_method(
    resolver: &mut Resolver,
    class: SymbolId,
    decl: &MethodDecl,
    is_interface: bool,
    queue: &mut AnnotationQueue,
) -> Result<SymbolId, CompilerError> {
    let name = if decl.is_constructor() {
        resolver.symbols.names.intern(INIT_NAME)
    } else {
        decl.name
    };

    let mut flags = decl.modifiers;
    if is_interface {
        if decl.body.is_none() && !flags.intersects(Flags::STATIC | Flags::DEFAULT | Flags::PRIVATE)
        {
            flags.insert(Flags::PUBLIC | Flags::ABSTRACT);
        } else if !flags.contains(Flags::PRIVATE) {
            flags.insert(Flags::PUBLIC);
        }
    }

    let method = resolver.symbols.alloc(Symbol::new(
        name,
        flags,
        Some(class),
        SymbolData::Method(MethodSymbol {
            type_params: Vec::new(),
            params: Vec::new(),
            return_type: InternalType::Unknown,
            thrown: Vec::new(),
            default_value: None,
            decl_id: Some(decl.id),
        }),
    ));
    resolver.record_decl(decl.id, method);

    let depth = resolver.type_var_depth();
    let type_params = resolver.enter_type_params(method, &decl.type_params)?;

    let mut params = Vec::with_capacity(decl.params.len());
    for param in &decl.params {
        let ty = resolver.resolve_type(&param.ty)?;
        let id = add_variable(
            resolver,
            method,
            param.name,
            param.modifiers,
            VarKind::Parameter,
            ty,
        );
        resolver.record_decl(param.id, id);
        queue.annotations(resolver, id, &param.annotations)?;
        params.push(id);
    }

    let return_type = match &decl.return_type {
        Some(return_type) => resolver.resolve_type(return_type)?,
        None => InternalType::Primitive(PrimitiveTag::Void),
    };
    let thrown = resolver.resolve_types(&decl.throws)?;
    resolver.truncate_type_vars(depth);

    if let Some(info) = resolver.symbols.method_mut(method) {
        info.type_params = type_params;
        info.params = params;
        info.return_type = return_type;
        info.thrown = thrown;
    }
    push_member(resolver.symbols, class, method);

    queue.annotations(resolver, method, &decl.annotations)?;
    if let Some(default_value) = &decl.default_value {
        queue.default_value(resolver, method, default_value)?;
    }

    Ok(method)
}

/// -----------------------------
/// PHASE 4: BRIDGES
/// -----------------------------
/// A method overriding one of a parameterized supertype whose erased parameters differ
/// gets a synthetic bridge with the supertype's erased signature.
pub fn add_bridges(symbols: &mut SymbolTable, class: SymbolId) {
    let Some(info) = symbols.class(class) else {
        return;
    };

    let parents: Vec<InternalType> = info
        .supertype
        .iter()
        .chain(info.interfaces.iter())
        .filter(|parent| matches!(parent, InternalType::Class { type_args, .. } if !type_args.is_empty()))
        .cloned()
        .collect();
    let own_methods: Vec<SymbolId> = info
        .members
        .iter()
        .copied()
        .filter(|member| {
            symbols.method(*member).is_some()
                && !symbols.get(*member).flags.intersects(Flags::STATIC | Flags::BLOCK)
        })
        .collect();

    let init_name = symbols.names.get_existing(INIT_NAME);
    let mut bridged: Vec<(StringId, Vec<InternalType>)> = Vec::new();

    for parent in parents {
        let Some(parent_class) = parent.class_symbol() else {
            continue;
        };

        // Whatever members a broken stub did produce are still usable
        let _ = complete_class(symbols, parent_class);

        let substitution = symbols.substitution_for(&parent);
        let inherited: Vec<SymbolId> = symbols
            .class(parent_class)
            .map(|info| info.members.clone())
            .unwrap_or_default();

        for inherited_method in inherited {
            let inherited_symbol = symbols.get(inherited_method);
            if inherited_symbol
                .flags
                .intersects(Flags::STATIC | Flags::BLOCK | Flags::PRIVATE)
                || Some(inherited_symbol.name) == init_name
            {
                continue;
            }
            let name = inherited_symbol.name;
            let Some(inherited_signature) = symbols
                .method(inherited_method)
                .map(|method| method.signature(symbols))
            else {
                continue;
            };

            for own in &own_methods {
                let own_symbol = symbols.get(*own);
                if own_symbol.name != name {
                    continue;
                }
                let own_flags = own_symbol.flags;
                let Some(own_signature) = symbols.method(*own).map(|method| method.signature(symbols))
                else {
                    continue;
                };

                if own_signature.params.len() != inherited_signature.params.len() {
                    continue;
                }

                let overrides = inherited_signature
                    .params
                    .iter()
                    .zip(&own_signature.params)
                    .all(|(inherited, own)| substitute(inherited, &substitution) == *own);
                if !overrides {
                    continue;
                }

                let erased_inherited: Vec<InternalType> = inherited_signature
                    .params
                    .iter()
                    .map(|param| erasure(symbols, param))
                    .collect();
                let erased_own: Vec<InternalType> = own_signature
                    .params
                    .iter()
                    .map(|param| erasure(symbols, param))
                    .collect();

                if erased_inherited == erased_own
                    || bridged.contains(&(name, erased_inherited.clone()))
                {
                    continue;
                }

                let access = own_flags.intersection(Flags::PUBLIC | Flags::PROTECTED);
                let return_type = erasure(symbols, &inherited_signature.return_type);
                let bridge = symbols.alloc(Symbol::new(
                    name,
                    access | Flags::SYNTHETIC | Flags::BRIDGE,
                    Some(class),
                    SymbolData::Method(MethodSymbol {
                        type_params: Vec::new(),
                        params: Vec::new(),
                        return_type,
                        thrown: Vec::new(),
                        default_value: None,
                        decl_id: None,
                    }),
                ));

                let arg_name = symbols.names.intern("arg");
                let params: Vec<SymbolId> = erased_inherited
                    .iter()
                    .map(|ty| {
                        symbols.alloc(Symbol::new(
                            arg_name,
                            Flags::SYNTHETIC,
                            Some(bridge),
                            SymbolData::Variable(VarSymbol {
                                kind: VarKind::Parameter,
                                ty: ty.clone(),
                            }),
                        ))
                    })
                    .collect();
                if let Some(method) = symbols.method_mut(bridge) {
                    method.params = params;
                }
                push_member(symbols, class, bridge);

                symbol_log!("Bridge ", Dark Magenta {symbols.names.resolve(name)}, " added to ", Blue {symbols.flat_name(class)});
                bridged.push((name, erased_inherited));
            }
        }
    }
}

/// -----------------------------
/// CLASSPATH COMPLETION
/// -----------------------------
/// Reads the header and members of a classpath class. On failure the members read so far
/// are kept and the class is marked as failed, so later completions report the same fault.
pub fn complete_class(symbols: &mut SymbolTable, class: SymbolId) -> Result<(), CompilerError> {
    let Some(info) = symbols.class(class) else {
        return Ok(());
    };

    let decl_ref = match &info.completion {
        Completion::Complete => return Ok(()),
        Completion::Failed(msg) => {
            let scope = info
                .decl
                .as_ref()
                .map(|decl| decl.unit.source_path.clone())
                .unwrap_or_default();
            return Err(CompilerError::new_completion_error(
                msg.clone(),
                ErrorLocation::for_file(&scope),
            ));
        }
        Completion::Incomplete => info.decl.clone(),
    };

    // Marked complete up front: self references during completion must not recurse
    if let Some(info) = symbols.class_mut(class) {
        info.completion = Completion::Complete;
    }

    let Some(decl_ref) = decl_ref else {
        return Ok(());
    };

    // Outer type variables have to exist before the nested header refers to them
    if let Some(outer) = symbols
        .get(class)
        .owner
        .filter(|owner| symbols.class(*owner).is_some())
    {
        let _ = complete_class(symbols, outer);
    }

    let unit = Rc::clone(&decl_ref.unit);
    let Some(decl) = unit.class_at(&decl_ref.path) else {
        return Ok(());
    };

    symbol_log!("Completing ", Blue {symbols.flat_name(class)});

    let result = {
        let mut resolver = Resolver::new(symbols, &unit, Some(class), None);
        enter_header(&mut resolver, class, decl).and_then(|_| {
            enter_members(&mut resolver, class, decl, &mut AnnotationQueue::Immediate)
        })
    };

    if let Err(e) = &result {
        symbol_log!(Red "Completion failed for ", Blue {symbols.flat_name(class)}, ": ", {e.msg});
        if let Some(info) = symbols.class_mut(class) {
            info.completion = Completion::Failed(e.msg.clone());
        }
    }

    result
}

#[cfg(test)]
#[path = "tests/enter_tests.rs"]
mod tests;
