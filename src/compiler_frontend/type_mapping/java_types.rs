// ============================================================
// Semantic Type Graph
// ============================================================
//
// The immutable types handed to consumers. Every reference to
// another type is a TypeId into the owning TypeCache, so the
// graph can be cyclic without any node owning another.
//
// ============================================================

use crate::compiler_frontend::toolchain::symbols::Flags;
use crate::compiler_frontend::toolchain::syntax::ClassKind;

/// Handle to a node in a `TypeCache`.
///
/// Primitive and unknown ids are reserved and shared by every cache and generation.
/// Every other id carries the generation of the cache that allocated it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId {
    index: u32,
    generation: u32,
}

impl TypeId {
    pub const RESERVED_GENERATION: u32 = 0;

    pub const BOOLEAN: TypeId = TypeId::reserved(0);
    pub const BYTE: TypeId = TypeId::reserved(1);
    pub const CHAR: TypeId = TypeId::reserved(2);
    pub const DOUBLE: TypeId = TypeId::reserved(3);
    pub const FLOAT: TypeId = TypeId::reserved(4);
    pub const INT: TypeId = TypeId::reserved(5);
    pub const LONG: TypeId = TypeId::reserved(6);
    pub const SHORT: TypeId = TypeId::reserved(7);
    pub const VOID: TypeId = TypeId::reserved(8);
    pub const STRING: TypeId = TypeId::reserved(9);
    pub const NULL: TypeId = TypeId::reserved(10);
    pub const NONE: TypeId = TypeId::reserved(11);
    pub const UNKNOWN: TypeId = TypeId::reserved(12);

    /// First index handed out to constructed nodes
    pub const FIRST_DYNAMIC: u32 = 13;

    const fn reserved(index: u32) -> TypeId {
        TypeId {
            index,
            generation: Self::RESERVED_GENERATION,
        }
    }

    pub(crate) const fn new(index: u32, generation: u32) -> TypeId {
        TypeId { index, generation }
    }

    pub fn index(self) -> usize {
        self.index as usize
    }

    pub fn generation(self) -> u32 {
        self.generation
    }

    pub fn is_reserved(self) -> bool {
        self.generation == Self::RESERVED_GENERATION
    }

    pub fn is_unknown(self) -> bool {
        self == Self::UNKNOWN
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Boolean,
    Byte,
    Char,
    Double,
    Float,
    Int,
    Long,
    Short,
    Void,
    String,
    Null,
    /// Placeholder for a missing type
    None,
}

impl PrimitiveKind {
    pub const ALL: [PrimitiveKind; 12] = [
        PrimitiveKind::Boolean,
        PrimitiveKind::Byte,
        PrimitiveKind::Char,
        PrimitiveKind::Double,
        PrimitiveKind::Float,
        PrimitiveKind::Int,
        PrimitiveKind::Long,
        PrimitiveKind::Short,
        PrimitiveKind::Void,
        PrimitiveKind::String,
        PrimitiveKind::Null,
        PrimitiveKind::None,
    ];

    /// The reserved id of this primitive, in the same order as `ALL`
    pub fn type_id(self) -> TypeId {
        match self {
            PrimitiveKind::Boolean => TypeId::BOOLEAN,
            PrimitiveKind::Byte => TypeId::BYTE,
            PrimitiveKind::Char => TypeId::CHAR,
            PrimitiveKind::Double => TypeId::DOUBLE,
            PrimitiveKind::Float => TypeId::FLOAT,
            PrimitiveKind::Int => TypeId::INT,
            PrimitiveKind::Long => TypeId::LONG,
            PrimitiveKind::Short => TypeId::SHORT,
            PrimitiveKind::Void => TypeId::VOID,
            PrimitiveKind::String => TypeId::STRING,
            PrimitiveKind::Null => TypeId::NULL,
            PrimitiveKind::None => TypeId::NONE,
        }
    }

    pub fn keyword(self) -> &'static str {
        match self {
            PrimitiveKind::Boolean => "boolean",
            PrimitiveKind::Byte => "byte",
            PrimitiveKind::Char => "char",
            PrimitiveKind::Double => "double",
            PrimitiveKind::Float => "float",
            PrimitiveKind::Int => "int",
            PrimitiveKind::Long => "long",
            PrimitiveKind::Short => "short",
            PrimitiveKind::Void => "void",
            PrimitiveKind::String => "String",
            PrimitiveKind::Null => "null",
            PrimitiveKind::None => "",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variance {
    Invariant,
    Covariant,
    Contravariant,
}

// ============================================================
// Nodes
// ============================================================

#[derive(Debug, Clone, PartialEq)]
pub struct ClassType {
    pub flags: Flags,
    pub fully_qualified_name: String,
    pub kind: ClassKind,
    pub supertype: Option<TypeId>,

    /// The enclosing class of a nested class
    pub owning_class: Option<TypeId>,
    pub interfaces: Vec<TypeId>,
    pub fields: Vec<TypeId>,
    pub methods: Vec<TypeId>,
    pub type_parameters: Vec<TypeId>,
    pub annotations: Vec<TypeId>,
}

impl ClassType {
    pub fn simple_name(&self) -> &str {
        let after_package = self
            .fully_qualified_name
            .rsplit('.')
            .next()
            .unwrap_or(&self.fully_qualified_name);
        after_package.rsplit('$').next().unwrap_or(after_package)
    }
}

/// A class instantiated with type arguments. Always a separate node from its class.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterizedType {
    pub class: TypeId,
    pub type_arguments: Vec<TypeId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArrayType {
    pub element: TypeId,

    /// Annotations written on this dimension
    pub annotations: Vec<TypeId>,
}

/// A type variable or a wildcard (`?` is its name)
#[derive(Debug, Clone, PartialEq)]
pub struct TypeVariable {
    pub name: String,
    pub variance: Variance,

    /// Empty when the only bound is java.lang.Object
    pub bounds: Vec<TypeId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IntersectionType {
    /// Class bound first, then interface bounds in declaration order
    pub bounds: Vec<TypeId>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    Int(i64),
    Long(i64),
    Float(f64),
    Double(f64),
    Boolean(bool),
    Char(char),
    String(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ElementValue {
    Literal(LiteralValue),

    /// An enum constant, as its Variable node
    Enum(TypeId),

    /// A class literal
    Type(TypeId),
    Annotation(TypeId),
    LiteralArray(Vec<LiteralValue>),

    /// Array of enum constants, class literals or annotations
    TypeArray(Vec<TypeId>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationType {
    pub annotation_type: TypeId,
    pub values: Vec<(String, ElementValue)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodType {
    pub flags: Flags,
    pub declaring_type: Option<TypeId>,

    /// `<constructor>` for constructors
    pub name: String,
    pub return_type: TypeId,
    pub parameter_names: Vec<String>,
    pub parameter_types: Vec<TypeId>,
    pub thrown_exceptions: Vec<TypeId>,
    pub annotations: Vec<TypeId>,

    /// The `default` value of an annotation type element
    pub default_value: Option<ElementValue>,
    pub declared_formal_type_names: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariableType {
    pub flags: Flags,

    /// The declaring class of a field, the declaring method of a parameter or local
    pub owner: Option<TypeId>,
    pub name: String,
    pub declared_type: TypeId,
    pub annotations: Vec<TypeId>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum JavaType {
    Primitive(PrimitiveKind),
    Class(ClassType),
    Parameterized(ParameterizedType),
    Array(ArrayType),
    GenericTypeVariable(TypeVariable),
    Intersection(IntersectionType),
    Annotation(AnnotationType),
    Method(MethodType),
    Variable(VariableType),
    Unknown,
}

/// The variant of a node, known before the node itself is built
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JavaTypeKind {
    Primitive,
    Class,
    Parameterized,
    Array,
    GenericTypeVariable,
    Intersection,
    Annotation,
    Method,
    Variable,
    Unknown,
}

impl JavaType {
    pub fn kind(&self) -> JavaTypeKind {
        match self {
            JavaType::Primitive(_) => JavaTypeKind::Primitive,
            JavaType::Class(_) => JavaTypeKind::Class,
            JavaType::Parameterized(_) => JavaTypeKind::Parameterized,
            JavaType::Array(_) => JavaTypeKind::Array,
            JavaType::GenericTypeVariable(_) => JavaTypeKind::GenericTypeVariable,
            JavaType::Intersection(_) => JavaTypeKind::Intersection,
            JavaType::Annotation(_) => JavaTypeKind::Annotation,
            JavaType::Method(_) => JavaTypeKind::Method,
            JavaType::Variable(_) => JavaTypeKind::Variable,
            JavaType::Unknown => JavaTypeKind::Unknown,
        }
    }

    pub fn as_class(&self) -> Option<&ClassType> {
        match self {
            JavaType::Class(class) => Some(class),
            _ => None,
        }
    }

    pub fn as_method(&self) -> Option<&MethodType> {
        match self {
            JavaType::Method(method) => Some(method),
            _ => None,
        }
    }

    pub fn as_variable(&self) -> Option<&VariableType> {
        match self {
            JavaType::Variable(variable) => Some(variable),
            _ => None,
        }
    }
}
