//! The parser's output: one `CompilationUnit` per input.
//!
//! Every node that the attribution pass can attach information to carries a `NodeId`.
//! Ids are unique within one unit only, so side tables are always kept per unit.

use crate::compiler_frontend::compiler_errors::{CharPosition, ErrorLocation};
use crate::compiler_frontend::string_interning::{StringId, StringTable};
use crate::compiler_frontend::toolchain::symbols::Flags;
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct TextLocation {
    pub start_pos: CharPosition,
    pub end_pos: CharPosition,
}

impl TextLocation {
    pub fn new(start_pos: CharPosition, end_pos: CharPosition) -> Self {
        Self { start_pos, end_pos }
    }

    /// Span from the start of self to the end of other
    pub fn to(self, other: TextLocation) -> Self {
        Self {
            start_pos: self.start_pos,
            end_pos: other.end_pos,
        }
    }

    pub fn to_error_location(&self, scope: &Path) -> ErrorLocation {
        ErrorLocation::new(scope.to_path_buf(), self.start_pos, self.end_pos)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PrimitiveTag {
    Boolean,
    Byte,
    Char,
    Double,
    Float,
    Int,
    Long,
    Short,
    Void,
}

impl PrimitiveTag {
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        let tag = match keyword {
            "boolean" => PrimitiveTag::Boolean,
            "byte" => PrimitiveTag::Byte,
            "char" => PrimitiveTag::Char,
            "double" => PrimitiveTag::Double,
            "float" => PrimitiveTag::Float,
            "int" => PrimitiveTag::Int,
            "long" => PrimitiveTag::Long,
            "short" => PrimitiveTag::Short,
            "void" => PrimitiveTag::Void,
            _ => return None,
        };
        Some(tag)
    }

    pub fn keyword(self) -> &'static str {
        match self {
            PrimitiveTag::Boolean => "boolean",
            PrimitiveTag::Byte => "byte",
            PrimitiveTag::Char => "char",
            PrimitiveTag::Double => "double",
            PrimitiveTag::Float => "float",
            PrimitiveTag::Int => "int",
            PrimitiveTag::Long => "long",
            PrimitiveTag::Short => "short",
            PrimitiveTag::Void => "void",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum ClassKind {
    Class,
    Interface,
    Enum,
    Annotation,
    Record,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WildcardKind {
    Unbound,
    Extends,
    Super,
}

#[derive(Debug)]
pub struct CompilationUnit {
    pub source_path: PathBuf,
    pub package: Option<QualifiedName>,
    pub imports: Vec<ImportDecl>,
    pub types: Vec<ClassDecl>,
}

impl CompilationUnit {
    /// Follows a path of member indexes from a top-level type down to a nested class
    pub fn class_at(&self, path: &[usize]) -> Option<&ClassDecl> {
        let (first, rest) = path.split_first()?;
        let mut class = self.types.get(*first)?;

        for index in rest {
            class = match class.members.get(*index)? {
                MemberDecl::Class(nested) => nested,
                _ => return None,
            };
        }

        Some(class)
    }

    /// Every class declared in the unit with its path, outer classes before nested ones
    pub fn class_paths(&self) -> Vec<(Vec<usize>, &ClassDecl)> {
        let mut found = Vec::new();
        for (index, class) in self.types.iter().enumerate() {
            collect_class_paths(vec![index], class, &mut found);
        }
        found
    }

    pub fn package_name(&self, names: &StringTable) -> String {
        match &self.package {
            Some(package) => package.to_dotted(names),
            None => String::new(),
        }
    }
}

fn collect_class_paths<'a>(
    path: Vec<usize>,
    class: &'a ClassDecl,
    found: &mut Vec<(Vec<usize>, &'a ClassDecl)>,
) {
    found.push((path.clone(), class));
    for (index, member) in class.members.iter().enumerate() {
        if let MemberDecl::Class(nested) = member {
            let mut nested_path = path.clone();
            nested_path.push(index);
            collect_class_paths(nested_path, nested, found);
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct QualifiedName {
    pub segments: Vec<StringId>,
    pub location: TextLocation,
}

impl QualifiedName {
    pub fn to_dotted(&self, names: &StringTable) -> String {
        let mut dotted = String::new();
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                dotted.push('.');
            }
            dotted.push_str(names.resolve(*segment));
        }
        dotted
    }

    pub fn last(&self) -> Option<StringId> {
        self.segments.last().copied()
    }
}

#[derive(Clone, Debug)]
pub struct ImportDecl {
    pub name: QualifiedName,
    pub on_demand: bool,
}

#[derive(Clone, Debug)]
pub struct ClassDecl {
    pub id: NodeId,
    pub name: StringId,
    pub kind: ClassKind,
    pub modifiers: Flags,
    pub annotations: Vec<AnnotationSyntax>,
    pub type_params: Vec<TypeParamSyntax>,
    pub extends: Vec<TypeSyntax>,
    pub implements: Vec<TypeSyntax>,
    pub record_components: Vec<ParamSyntax>,
    pub enum_constants: Vec<EnumConstantDecl>,
    pub members: Vec<MemberDecl>,
    pub location: TextLocation,
}

#[derive(Clone, Debug)]
pub struct EnumConstantDecl {
    pub id: NodeId,
    pub name: StringId,
    pub annotations: Vec<AnnotationSyntax>,
    pub args: Vec<Expr>,
    pub location: TextLocation,
}

#[derive(Clone, Debug)]
pub enum MemberDecl {
    Field(FieldDecl),
    Method(MethodDecl),
    Initializer(InitializerDecl),
    Class(ClassDecl),
}

#[derive(Clone, Debug)]
pub struct FieldDecl {
    pub id: NodeId,
    pub modifiers: Flags,
    pub annotations: Vec<AnnotationSyntax>,
    pub ty: TypeSyntax,
    pub name: StringId,
    pub initializer: Option<Expr>,
    pub location: TextLocation,
}

#[derive(Clone, Debug)]
pub struct MethodDecl {
    pub id: NodeId,
    pub modifiers: Flags,
    pub annotations: Vec<AnnotationSyntax>,
    pub type_params: Vec<TypeParamSyntax>,
    /// None for constructors
    pub return_type: Option<TypeSyntax>,
    pub name: StringId,
    pub params: Vec<ParamSyntax>,
    pub throws: Vec<TypeSyntax>,
    pub body: Option<Block>,
    /// Only annotation type elements have one
    pub default_value: Option<ElementValueSyntax>,
    pub location: TextLocation,
}

impl MethodDecl {
    pub fn is_constructor(&self) -> bool {
        self.return_type.is_none()
    }
}

#[derive(Clone, Debug)]
pub struct InitializerDecl {
    pub id: NodeId,
    pub is_static: bool,
    pub body: Block,
    pub location: TextLocation,
}

#[derive(Clone, Debug)]
pub struct ParamSyntax {
    pub id: NodeId,
    pub modifiers: Flags,
    pub annotations: Vec<AnnotationSyntax>,
    pub ty: TypeSyntax,
    pub name: StringId,
    pub location: TextLocation,
}

#[derive(Clone, Debug)]
pub struct TypeParamSyntax {
    pub id: NodeId,
    pub name: StringId,
    pub bounds: Vec<TypeSyntax>,
    pub location: TextLocation,
}

#[derive(Clone, Debug)]
pub enum TypeSyntax {
    Primitive {
        id: NodeId,
        tag: PrimitiveTag,
        location: TextLocation,
    },

    /// `a.b.C<Args>`. Some(empty) type args is the diamond `<>`.
    Named {
        id: NodeId,
        name: QualifiedName,
        type_args: Option<Vec<TypeSyntax>>,
        annotations: Vec<AnnotationSyntax>,
    },

    /// One dimension. The annotations are the ones written before this dimension's `[]`.
    Array {
        id: NodeId,
        element: Box<TypeSyntax>,
        annotations: Vec<AnnotationSyntax>,
        location: TextLocation,
    },

    Wildcard {
        id: NodeId,
        kind: WildcardKind,
        bound: Option<Box<TypeSyntax>>,
        location: TextLocation,
    },
}

impl TypeSyntax {
    pub fn id(&self) -> NodeId {
        match self {
            TypeSyntax::Primitive { id, .. }
            | TypeSyntax::Named { id, .. }
            | TypeSyntax::Array { id, .. }
            | TypeSyntax::Wildcard { id, .. } => *id,
        }
    }

    pub fn location(&self) -> TextLocation {
        match self {
            TypeSyntax::Primitive { location, .. }
            | TypeSyntax::Array { location, .. }
            | TypeSyntax::Wildcard { location, .. } => *location,
            TypeSyntax::Named { name, .. } => name.location,
        }
    }

    pub fn has_dimension_annotations(&self) -> bool {
        match self {
            TypeSyntax::Array {
                element,
                annotations,
                ..
            } => !annotations.is_empty() || element.has_dimension_annotations(),
            _ => false,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct Block {
    pub statements: Vec<Statement>,
}

#[derive(Clone, Debug)]
pub enum Statement {
    Local(LocalDecl),
    Return {
        id: NodeId,
        value: Option<Expr>,
        location: TextLocation,
    },
    Expression(Expr),
}

#[derive(Clone, Debug)]
pub struct LocalDecl {
    pub id: NodeId,
    pub ty: TypeSyntax,
    pub name: StringId,
    pub initializer: Option<Expr>,
    pub location: TextLocation,
}

#[derive(Clone, Debug)]
pub struct Expr {
    pub id: NodeId,
    pub kind: ExprKind,
    pub location: TextLocation,
}

#[derive(Clone, Debug)]
pub enum ExprKind {
    Literal(Literal),
    This,
    Name(StringId),
    FieldAccess {
        target: Box<Expr>,
        name: StringId,
    },
    Invoke {
        target: Option<Box<Expr>>,
        name: StringId,
        args: Vec<Expr>,
    },
    New {
        class: TypeSyntax,
        args: Vec<Expr>,
    },
    Parenthesized(Box<Expr>),
}

#[derive(Clone, Debug, PartialEq)]
pub enum Literal {
    Int(i64),
    Long(i64),
    Float(f64),
    Double(f64),
    Boolean(bool),
    Char(char),
    String(StringId),
    Null,
}

#[derive(Clone, Debug)]
pub struct AnnotationSyntax {
    pub id: NodeId,
    pub name: QualifiedName,
    pub arguments: Vec<ElementPairSyntax>,
    pub location: TextLocation,
}

/// `name = value`. A lone value has no name and targets the `value` element.
#[derive(Clone, Debug)]
pub struct ElementPairSyntax {
    pub name: Option<StringId>,
    pub value: ElementValueSyntax,
}

#[derive(Clone, Debug)]
pub enum ElementValueSyntax {
    Literal(Literal),
    /// An enum constant or a constant field, possibly qualified
    Name(QualifiedName),
    ClassLiteral(TypeSyntax),
    Annotation(AnnotationSyntax),
    Array(Vec<ElementValueSyntax>),
}
