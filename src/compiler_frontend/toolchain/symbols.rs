//! The toolchain's own symbol table.
//!
//! Symbols reference each other by `SymbolId`, so a class can point at itself through its
//! supertype, members or type parameters. Entry and attribution mutate symbols in place
//! as passes run. This is the representation the type mapper translates into the
//! immutable semantic type graph.

use crate::compiler_frontend::string_interning::{StringId, StringTable};
use crate::compiler_frontend::toolchain::classpath::FileManager;
use crate::compiler_frontend::toolchain::syntax::{
    ClassDecl, ClassKind, CompilationUnit, NodeId, PrimitiveTag, WildcardKind,
};
use crate::projects::settings::OBJECT_FQN;
use crate::symbol_log;
use rustc_hash::FxHashMap;
use serde::Serialize;
use std::ops::BitOr;
use std::path::PathBuf;
use std::rc::Rc;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize)]
pub struct Flags(u32);

impl Flags {
    pub const NONE: Flags = Flags(0);
    pub const PUBLIC: Flags = Flags(1);
    pub const PRIVATE: Flags = Flags(1 << 1);
    pub const PROTECTED: Flags = Flags(1 << 2);
    pub const STATIC: Flags = Flags(1 << 3);
    pub const FINAL: Flags = Flags(1 << 4);
    pub const ABSTRACT: Flags = Flags(1 << 5);
    pub const DEFAULT: Flags = Flags(1 << 6);
    pub const INTERFACE: Flags = Flags(1 << 9);
    pub const SYNTHETIC: Flags = Flags(1 << 12);
    pub const ANNOTATION: Flags = Flags(1 << 13);
    pub const ENUM: Flags = Flags(1 << 14);
    pub const RECORD: Flags = Flags(1 << 15);
    pub const BRIDGE: Flags = Flags(1 << 16);
    pub const HYPOTHETICAL: Flags = Flags(1 << 17);
    pub const GENERATED_CONSTR: Flags = Flags(1 << 18);
    pub const ANON_CONSTR: Flags = Flags(1 << 19);
    /// Initializer block pseudo-methods
    pub const BLOCK: Flags = Flags(1 << 20);

    /// Members with any of these are compiler artifacts and never reach the type graph
    pub const NOT_SURFACED: Flags = Flags(
        Flags::SYNTHETIC.0
            | Flags::BRIDGE.0
            | Flags::HYPOTHETICAL.0
            | Flags::GENERATED_CONSTR.0
            | Flags::ANON_CONSTR.0,
    );

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn contains(self, other: Flags) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn intersects(self, other: Flags) -> bool {
        self.0 & other.0 != 0
    }

    pub fn insert(&mut self, other: Flags) {
        self.0 |= other.0;
    }

    pub const fn intersection(self, other: Flags) -> Flags {
        Flags(self.0 & other.0)
    }
}

impl BitOr for Flags {
    type Output = Flags;

    fn bitor(self, rhs: Flags) -> Flags {
        Flags(self.0 | rhs.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolId(u32);

impl SymbolId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A type as the toolchain sees it. Class and type variable types point back into the symbol table.
#[derive(Clone, Debug, PartialEq)]
pub enum InternalType {
    Primitive(PrimitiveTag),
    Class {
        symbol: SymbolId,
        type_args: Vec<InternalType>,
    },
    Array(Box<InternalType>),
    TypeVar(SymbolId),
    Wildcard {
        kind: WildcardKind,
        bound: Option<Box<InternalType>>,
    },
    /// Class component first, then interfaces in declaration order
    Intersection(Vec<InternalType>),
    Method(Box<MethodSignature>),
    Package(SymbolId),
    /// The type of the null literal
    Null,
    /// Substituted by attribution when something could not be resolved
    Error,
    /// No type at all
    Unknown,
}

impl InternalType {
    pub fn class(symbol: SymbolId) -> InternalType {
        InternalType::Class {
            symbol,
            type_args: Vec::new(),
        }
    }

    pub fn class_symbol(&self) -> Option<SymbolId> {
        match self {
            InternalType::Class { symbol, .. } => Some(*symbol),
            _ => None,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, InternalType::Error)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct MethodSignature {
    pub type_params: Vec<SymbolId>,
    pub params: Vec<InternalType>,
    pub return_type: InternalType,
    pub thrown: Vec<InternalType>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ConstantValue {
    Int(i64),
    Long(i64),
    Float(f64),
    Double(f64),
    Boolean(bool),
    Char(char),
    String(String),
}

#[derive(Clone, Debug, PartialEq)]
pub enum InternalElementValue {
    Constant(ConstantValue),
    EnumConstant(SymbolId),
    ClassLiteral(InternalType),
    Annotation(Box<InternalAnnotation>),
    Array(Vec<InternalElementValue>),
    Error,
}

#[derive(Clone, Debug, PartialEq)]
pub struct InternalAnnotation {
    pub annotation_type: InternalType,
    pub values: Vec<(StringId, InternalElementValue)>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Completion {
    Complete,
    /// Entered from the classpath, header and members not read yet
    Incomplete,
    /// Completion stopped part way. Members read before the failure are kept.
    Failed(String),
}

#[derive(Clone, Debug, PartialEq)]
pub enum ClassOrigin {
    Source(PathBuf),
    Classpath,
}

/// Where the declaration of a class lives
#[derive(Clone, Debug)]
pub struct DeclRef {
    pub unit: Rc<CompilationUnit>,
    pub path: Vec<usize>,
}

impl DeclRef {
    pub fn decl(&self) -> Option<&ClassDecl> {
        self.unit.class_at(&self.path)
    }
}

#[derive(Debug)]
pub struct ClassSymbol {
    /// Fully qualified, with `$` between nested class names
    pub flat_name: String,
    pub kind: ClassKind,
    pub type_params: Vec<SymbolId>,
    pub supertype: Option<InternalType>,
    pub interfaces: Vec<InternalType>,
    pub members: Vec<SymbolId>,
    pub completion: Completion,
    pub origin: ClassOrigin,
    pub decl: Option<DeclRef>,
}

#[derive(Debug)]
pub struct MethodSymbol {
    pub type_params: Vec<SymbolId>,
    pub params: Vec<SymbolId>,
    pub return_type: InternalType,
    pub thrown: Vec<InternalType>,
    pub default_value: Option<InternalElementValue>,
    pub decl_id: Option<NodeId>,
}

impl MethodSymbol {
    pub fn signature(&self, symbols: &SymbolTable) -> MethodSignature {
        MethodSignature {
            type_params: self.type_params.clone(),
            params: self
                .params
                .iter()
                .map(|param| symbols.variable_type(*param))
                .collect(),
            return_type: self.return_type.clone(),
            thrown: self.thrown.clone(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VarKind {
    Field,
    Parameter,
    Local,
    EnumConstant,
}

#[derive(Debug)]
pub struct VarSymbol {
    pub kind: VarKind,
    pub ty: InternalType,
}

#[derive(Debug)]
pub struct TypeVarSymbol {
    /// java.lang.Object when nothing was written
    pub bound: InternalType,
}

/// Placeholder left behind by attribution when no applicable method was found.
/// The candidates are only reachable through a SymbolRecovery.
#[derive(Debug)]
pub struct ErrorSymbol {
    pub candidates: Vec<SymbolId>,
    pub arity: usize,
}

#[derive(Debug)]
pub enum SymbolData {
    Package { full_name: String },
    Class(ClassSymbol),
    Method(MethodSymbol),
    Variable(VarSymbol),
    TypeVariable(TypeVarSymbol),
    Error(ErrorSymbol),
}

#[derive(Debug)]
pub struct Symbol {
    pub name: StringId,
    pub flags: Flags,
    pub owner: Option<SymbolId>,
    pub annotations: Vec<InternalAnnotation>,
    pub data: SymbolData,
}

impl Symbol {
    pub fn new(name: StringId, flags: Flags, owner: Option<SymbolId>, data: SymbolData) -> Self {
        Symbol {
            name,
            flags,
            owner,
            annotations: Vec::new(),
            data,
        }
    }
}

pub struct SymbolTable {
    symbols: Vec<Symbol>,
    pub names: StringTable,
    classes: FxHashMap<String, SymbolId>,
    packages: FxHashMap<String, SymbolId>,
    pub file_manager: FileManager,
}

impl SymbolTable {
    pub fn new(file_manager: FileManager) -> Self {
        SymbolTable {
            symbols: Vec::new(),
            names: StringTable::new(),
            classes: FxHashMap::default(),
            packages: FxHashMap::default(),
            file_manager,
        }
    }

    /// Forget every entered symbol. Names stay interned.
    pub fn clear(&mut self) {
        symbol_log!(Yellow "Clearing ", {self.symbols.len()}, " symbols");
        self.symbols.clear();
        self.classes.clear();
        self.packages.clear();
    }

    pub fn alloc(&mut self, symbol: Symbol) -> SymbolId {
        let id = SymbolId(self.symbols.len() as u32);
        self.symbols.push(symbol);
        id
    }

    pub fn get(&self, id: SymbolId) -> &Symbol {
        &self.symbols[id.index()]
    }

    pub fn get_mut(&mut self, id: SymbolId) -> &mut Symbol {
        &mut self.symbols[id.index()]
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn name(&self, id: SymbolId) -> &str {
        self.names.resolve(self.get(id).name)
    }

    pub fn class(&self, id: SymbolId) -> Option<&ClassSymbol> {
        match &self.get(id).data {
            SymbolData::Class(class) => Some(class),
            _ => None,
        }
    }

    pub fn class_mut(&mut self, id: SymbolId) -> Option<&mut ClassSymbol> {
        match &mut self.get_mut(id).data {
            SymbolData::Class(class) => Some(class),
            _ => None,
        }
    }

    pub fn method(&self, id: SymbolId) -> Option<&MethodSymbol> {
        match &self.get(id).data {
            SymbolData::Method(method) => Some(method),
            _ => None,
        }
    }

    pub fn method_mut(&mut self, id: SymbolId) -> Option<&mut MethodSymbol> {
        match &mut self.get_mut(id).data {
            SymbolData::Method(method) => Some(method),
            _ => None,
        }
    }

    pub fn variable(&self, id: SymbolId) -> Option<&VarSymbol> {
        match &self.get(id).data {
            SymbolData::Variable(variable) => Some(variable),
            _ => None,
        }
    }

    pub fn type_var(&self, id: SymbolId) -> Option<&TypeVarSymbol> {
        match &self.get(id).data {
            SymbolData::TypeVariable(type_var) => Some(type_var),
            _ => None,
        }
    }

    pub fn variable_type(&self, id: SymbolId) -> InternalType {
        match self.variable(id) {
            Some(variable) => variable.ty.clone(),
            None => InternalType::Error,
        }
    }

    pub fn flat_name(&self, id: SymbolId) -> &str {
        match self.class(id) {
            Some(class) => &class.flat_name,
            None => self.name(id),
        }
    }

    pub fn is_complete(&self, id: SymbolId) -> bool {
        self.class(id)
            .is_some_and(|class| class.completion != Completion::Incomplete)
    }

    /// The innermost enclosing class of a symbol, or the symbol itself if it is a class
    pub fn enclosing_class(&self, id: SymbolId) -> Option<SymbolId> {
        let mut current = Some(id);
        while let Some(symbol) = current {
            if self.class(symbol).is_some() {
                return Some(symbol);
            }
            current = self.get(symbol).owner;
        }
        None
    }

    pub fn entered_class(&self, flat_name: &str) -> Option<SymbolId> {
        self.classes.get(flat_name).copied()
    }

    pub fn register_class(&mut self, flat_name: String, id: SymbolId) {
        self.classes.insert(flat_name, id);
    }

    pub fn entered_classes(&self) -> impl Iterator<Item = SymbolId> + '_ {
        self.classes.values().copied()
    }

    /// Find a class by flat name, entering it lazily from the classpath if needed.
    /// Classes found this way are incomplete until `enter::complete_class` runs.
    pub fn lookup_class(&mut self, flat_name: &str) -> Option<SymbolId> {
        if let Some(id) = self.entered_class(flat_name) {
            return Some(id);
        }

        let stub = self.file_manager.find_class(flat_name, &mut self.names)?;
        let decl = stub.decl()?;
        let name = decl.name;
        let kind = decl.kind;
        let modifiers = decl.modifiers;

        let owner = match flat_name.rfind('$') {
            Some(split) => self.lookup_class(&flat_name[..split]),
            None => {
                let package = match flat_name.rfind('.') {
                    Some(split) => &flat_name[..split],
                    None => "",
                };
                Some(self.enter_package(package))
            }
        };

        // The outer lookup may have entered this class already
        if let Some(id) = self.entered_class(flat_name) {
            return Some(id);
        }

        let id = self.alloc(Symbol::new(
            name,
            modifiers | class_kind_flags(kind),
            owner,
            SymbolData::Class(ClassSymbol {
                flat_name: flat_name.to_owned(),
                kind,
                type_params: Vec::new(),
                supertype: None,
                interfaces: Vec::new(),
                members: Vec::new(),
                completion: Completion::Incomplete,
                origin: ClassOrigin::Classpath,
                decl: Some(stub),
            }),
        ));

        symbol_log!("Entered classpath class ", Blue flat_name);
        self.register_class(flat_name.to_owned(), id);
        Some(id)
    }

    pub fn enter_package(&mut self, full_name: &str) -> SymbolId {
        if let Some(id) = self.packages.get(full_name) {
            return *id;
        }

        let simple_name = full_name.rsplit('.').next().unwrap_or(full_name);
        let name = self.names.intern(simple_name);
        let id = self.alloc(Symbol::new(
            name,
            Flags::NONE,
            None,
            SymbolData::Package {
                full_name: full_name.to_owned(),
            },
        ));
        self.packages.insert(full_name.to_owned(), id);
        id
    }

    pub fn package_exists(&self, full_name: &str) -> bool {
        self.packages.contains_key(full_name)
    }

    /// True for entered packages, their parents, and packages holding classpath classes
    pub fn is_known_package(&mut self, full_name: &str) -> bool {
        if full_name.is_empty() {
            return false;
        }
        let parent_of_entered = self.packages.keys().any(|package| {
            package
                .strip_prefix(full_name)
                .is_some_and(|rest| rest.is_empty() || rest.starts_with('.'))
        });

        parent_of_entered || self.file_manager.has_package(full_name, &mut self.names)
    }

    pub fn object_class(&mut self) -> Option<SymbolId> {
        self.lookup_class(OBJECT_FQN)
    }

    pub fn is_object(&self, ty: &InternalType) -> bool {
        match ty {
            InternalType::Class { symbol, type_args } => {
                type_args.is_empty() && self.flat_name(*symbol) == OBJECT_FQN
            }
            _ => false,
        }
    }

    /// Members of a class with the given name, in declaration order
    pub fn members_named(&self, class: SymbolId, name: StringId) -> Vec<SymbolId> {
        match self.class(class) {
            Some(class) => class
                .members
                .iter()
                .copied()
                .filter(|member| self.get(*member).name == name)
                .collect(),
            None => Vec::new(),
        }
    }

    /// Type variables substituted by the type arguments of a parameterized class type
    pub fn substitution_for(&self, ty: &InternalType) -> Vec<(SymbolId, InternalType)> {
        let InternalType::Class { symbol, type_args } = ty else {
            return Vec::new();
        };
        let Some(class) = self.class(*symbol) else {
            return Vec::new();
        };

        class
            .type_params
            .iter()
            .copied()
            .zip(type_args.iter().cloned())
            .collect()
    }
}

pub fn class_kind_flags(kind: ClassKind) -> Flags {
    match kind {
        ClassKind::Class => Flags::NONE,
        ClassKind::Interface => Flags::INTERFACE | Flags::ABSTRACT,
        ClassKind::Enum => Flags::ENUM,
        ClassKind::Annotation => Flags::ANNOTATION | Flags::INTERFACE | Flags::ABSTRACT,
        ClassKind::Record => Flags::RECORD | Flags::FINAL,
    }
}

/// Replace type variables in `ty` following `substitution`
pub fn substitute(ty: &InternalType, substitution: &[(SymbolId, InternalType)]) -> InternalType {
    if substitution.is_empty() {
        return ty.clone();
    }

    match ty {
        InternalType::TypeVar(symbol) => substitution
            .iter()
            .find(|(var, _)| var == symbol)
            .map(|(_, replacement)| replacement.clone())
            .unwrap_or_else(|| ty.clone()),
        InternalType::Class { symbol, type_args } => InternalType::Class {
            symbol: *symbol,
            type_args: type_args
                .iter()
                .map(|arg| substitute(arg, substitution))
                .collect(),
        },
        InternalType::Array(element) => {
            InternalType::Array(Box::new(substitute(element, substitution)))
        }
        InternalType::Wildcard { kind, bound } => InternalType::Wildcard {
            kind: *kind,
            bound: bound
                .as_ref()
                .map(|bound| Box::new(substitute(bound, substitution))),
        },
        InternalType::Intersection(bounds) => InternalType::Intersection(
            bounds
                .iter()
                .map(|bound| substitute(bound, substitution))
                .collect(),
        ),
        InternalType::Method(method) => InternalType::Method(Box::new(MethodSignature {
            type_params: method.type_params.clone(),
            params: method
                .params
                .iter()
                .map(|param| substitute(param, substitution))
                .collect(),
            return_type: substitute(&method.return_type, substitution),
            thrown: method
                .thrown
                .iter()
                .map(|thrown| substitute(thrown, substitution))
                .collect(),
        })),
        _ => ty.clone(),
    }
}

#[cfg(test)]
#[path = "tests/symbols_tests.rs"]
mod tests;
