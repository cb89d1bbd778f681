//! Builds the attributed output of one parsed and attributed unit.
//!
//! The builder walks the unit's syntax alongside the side tables entry and attribution filled
//! in, and asks the type mapper for a node wherever a declaration or expression carries type
//! information. It is the only consumer of the mapper during a submission.

pub mod attributed_tree;

use crate::compiler_frontend::compiler_errors::{CompilerError, ErrorMetaDataKey};
use crate::compiler_frontend::compiler_warnings::WarningKind;
use crate::compiler_frontend::toolchain::UnitTables;
use crate::compiler_frontend::toolchain::symbols::InternalType;
use crate::compiler_frontend::toolchain::syntax::{
    Block, ClassDecl, CompilationUnit, Expr, ExprKind, MemberDecl, NodeId, Statement, TypeSyntax,
};
use crate::compiler_frontend::tree_builder::attributed_tree::{
    AttributedClass, AttributedMember, AttributedUnit, ReferenceKind, TypeReference,
};
use crate::compiler_frontend::type_mapping::java_types::{JavaType, TypeId};
use crate::compiler_frontend::type_mapping::type_mapper::TypeMapper;
use crate::tree_log;
use std::path::PathBuf;

pub struct TreeInput<'a> {
    pub unit: &'a CompilationUnit,
    pub tables: &'a UnitTables,

    /// Path reported in the output
    pub source_path: PathBuf,
}

pub trait TreeBuilder {
    fn build(
        &self,
        input: &TreeInput<'_>,
        mapper: &mut TypeMapper<'_>,
    ) -> Result<AttributedUnit, CompilerError>;
}

/// Declarations with their members, plus one reference per typed expression and type tree
#[derive(Default, Clone, Copy)]
pub struct DeclarationTreeBuilder;

impl TreeBuilder for DeclarationTreeBuilder {
    fn build(
        &self,
        input: &TreeInput<'_>,
        mapper: &mut TypeMapper<'_>,
    ) -> Result<AttributedUnit, CompilerError> {
        let mut walker = UnitWalker {
            mapper,
            unit: input.unit,
            tables: input.tables,
            references: Vec::new(),
        };

        let mut classes = Vec::with_capacity(input.unit.types.len());
        for decl in &input.unit.types {
            if let Some(class) = walker.class(decl)? {
                classes.push(class);
            }
        }

        tree_log!(
            "Built ", Green {classes.len()}, " classes for ",
            Blue {input.source_path.display()}
        );

        Ok(AttributedUnit {
            source_path: input.source_path.clone(),
            package: input.unit.package_name(&walker.mapper.symbols().names),
            classes,
            diagnostics: input.tables.diagnostics.clone(),
        })
    }
}

struct UnitWalker<'w, 'a> {
    mapper: &'w mut TypeMapper<'a>,
    unit: &'w CompilationUnit,
    tables: &'w UnitTables,

    // References of the class currently being walked
    references: Vec<TypeReference>,
}

impl UnitWalker<'_, '_> {
    /// -----------------------------
    /// DECLARATIONS
    /// -----------------------------
    fn class(&mut self, decl: &ClassDecl) -> Result<Option<AttributedClass>, CompilerError> {
        let Some(&symbol) = self.tables.decl_symbols.get(&decl.id) else {
            // Duplicates were reported during entry and are left out with their nested classes
            if self.is_duplicate(decl) {
                return Ok(None);
            }

            let name = self.mapper.symbols().names.resolve(decl.name).to_owned();
            return Err(CompilerError::new_attribution_error(
                format!("Class '{name}' was never entered, so it has no attributed output"),
                decl.location.to_error_location(&self.unit.source_path),
            )
            .with_metadata(ErrorMetaDataKey::CompilationStage, "Tree Building"));
        };

        let type_id = self.mapper.resolve(&InternalType::class(symbol));
        let name = self.mapper.symbols().flat_name(symbol).to_owned();
        let outer_references = std::mem::take(&mut self.references);

        let mut fields = Vec::new();
        let mut methods = Vec::new();
        let mut nested = Vec::new();

        for constant in &decl.enum_constants {
            if let Some(member) = self.variable_member(constant.id, type_id) {
                fields.push(member);
            }
            self.exprs(&constant.args);

            let mut reference = TypeReference::new(constant.id, ReferenceKind::NewClass, type_id);
            reference.method = Some(self.invoked_method(constant.id));
            self.references.push(reference);
        }

        for component in &decl.record_components {
            if let Some(member) = self.variable_member(component.id, type_id) {
                fields.push(member);
            }
        }

        for member in &decl.members {
            match member {
                MemberDecl::Field(field) => {
                    let member = self.variable_member(field.id, type_id);
                    self.type_tree(&field.ty, member.as_ref().map(|member| member.type_id));
                    if let Some(member) = member {
                        fields.push(member);
                    }

                    if let Some(initializer) = &field.initializer {
                        self.expr(initializer);
                    }
                }

                MemberDecl::Method(method) => {
                    let Some(&method_symbol) = self.tables.decl_symbols.get(&method.id) else {
                        continue;
                    };
                    if let Some(method_id) = self
                        .mapper
                        .resolve_as_declared_method(method_symbol, Some(type_id))
                    {
                        methods.push(AttributedMember {
                            node: method.id,
                            name: self.node_name(method_id),
                            type_id: method_id,
                        });
                    }

                    if let Some(return_type) = &method.return_type {
                        self.type_tree(return_type, None);
                    }
                    for param in &method.params {
                        let variable = self.variable_at_decl(param.id);
                        self.type_tree(&param.ty, variable);
                    }
                    if let Some(body) = &method.body {
                        self.block(body);
                    }
                }

                MemberDecl::Initializer(init) => self.block(&init.body),

                MemberDecl::Class(inner) => {
                    if let Some(inner) = self.class(inner)? {
                        nested.push(inner);
                    }
                }
            }
        }

        let type_references = std::mem::replace(&mut self.references, outer_references);
        Ok(Some(AttributedClass {
            node: decl.id,
            name,
            type_id,
            fields,
            methods,
            nested,
            type_references,
        }))
    }

    fn is_duplicate(&self, decl: &ClassDecl) -> bool {
        self.tables.diagnostics.iter().any(|warning| {
            warning.warning_kind == WarningKind::DuplicateClass
                && warning.location.start_pos == decl.location.start_pos
        })
    }

    fn variable_member(&mut self, node: NodeId, owner: TypeId) -> Option<AttributedMember> {
        let symbol = *self.tables.decl_symbols.get(&node)?;
        let type_id = self.mapper.resolve_as_variable(symbol, Some(owner))?;
        Some(AttributedMember {
            node,
            name: self.node_name(type_id),
            type_id,
        })
    }

    fn variable_at_decl(&mut self, node: NodeId) -> Option<TypeId> {
        let symbol = *self.tables.decl_symbols.get(&node)?;
        self.mapper.resolve_as_variable(symbol, None)
    }

    fn node_name(&self, id: TypeId) -> String {
        match self.mapper.cache().try_get(id) {
            Some(JavaType::Method(method)) => method.name.clone(),
            Some(JavaType::Variable(variable)) => variable.name.clone(),
            _ => String::new(),
        }
    }

    /// Written type syntax. Annotated array dimensions are rebuilt from the syntax.
    fn type_tree(&mut self, syntax: &TypeSyntax, variable: Option<TypeId>) {
        let Some(resolved) = self.tables.type_trees.get(&syntax.id()) else {
            return;
        };

        let type_id = if syntax.has_dimension_annotations() {
            self.mapper
                .resolve_annotated_array(syntax, resolved, &self.tables.type_annotations)
        } else {
            self.mapper.resolve(resolved)
        };

        let mut reference = TypeReference::new(syntax.id(), ReferenceKind::TypeTree, type_id);
        reference.variable = variable;
        self.references.push(reference);
    }

    /// -----------------------------
    /// BODIES
    /// -----------------------------
    fn block(&mut self, block: &Block) {
        for statement in &block.statements {
            match statement {
                Statement::Local(local) => {
                    let variable = self.variable_at_decl(local.id);
                    self.type_tree(&local.ty, variable);
                    if let Some(initializer) = &local.initializer {
                        self.expr(initializer);
                    }
                }

                Statement::Return { value, .. } => {
                    if let Some(value) = value {
                        self.expr(value);
                    }
                }

                Statement::Expression(expr) => self.expr(expr),
            }
        }
    }

    fn exprs(&mut self, exprs: &[Expr]) {
        for expr in exprs {
            self.expr(expr);
        }
    }

    fn expr(&mut self, expr: &Expr) {
        // Expressions attribution gave up on before reaching have no type
        if let Some(ty) = self.tables.expr_types.get(&expr.id) {
            let type_id = self.mapper.resolve(ty);
            let mut reference = TypeReference::new(expr.id, reference_kind(&expr.kind), type_id);

            match &expr.kind {
                ExprKind::Invoke { .. } | ExprKind::New { .. } => {
                    reference.method = Some(self.invoked_method(expr.id));
                }
                ExprKind::Name(_) | ExprKind::FieldAccess { .. } => {
                    reference.variable = self
                        .tables
                        .expr_symbols
                        .get(&expr.id)
                        .and_then(|symbol| self.mapper.resolve_as_variable(*symbol, None));
                }
                _ => {}
            }

            self.references.push(reference);
        }

        match &expr.kind {
            ExprKind::FieldAccess { target, .. } => self.expr(target),
            ExprKind::Invoke { target, args, .. } => {
                if let Some(target) = target {
                    self.expr(target);
                }
                self.exprs(args);
            }
            ExprKind::New { class, args } => {
                self.type_tree(class, None);
                self.exprs(args);
            }
            ExprKind::Parenthesized(inner) => self.expr(inner),
            ExprKind::Literal(_) | ExprKind::This | ExprKind::Name(_) => {}
        }
    }

    /// Unknown when the call never resolved or its method cannot be mapped
    fn invoked_method(&mut self, node: NodeId) -> TypeId {
        let Some(&symbol) = self.tables.expr_symbols.get(&node) else {
            return TypeId::UNKNOWN;
        };
        let method_type = self
            .tables
            .invocation_types
            .get(&node)
            .cloned()
            .unwrap_or(InternalType::Unknown);
        self.mapper
            .resolve_as_invoked_method(&method_type, symbol)
            .unwrap_or(TypeId::UNKNOWN)
    }
}

fn reference_kind(kind: &ExprKind) -> ReferenceKind {
    match kind {
        ExprKind::Name(_) => ReferenceKind::Identifier,
        ExprKind::FieldAccess { .. } => ReferenceKind::FieldAccess,
        ExprKind::Invoke { .. } => ReferenceKind::Invocation,
        ExprKind::New { .. } => ReferenceKind::NewClass,
        ExprKind::Literal(_) | ExprKind::This | ExprKind::Parenthesized(_) => {
            ReferenceKind::Expression
        }
    }
}

#[cfg(test)]
#[path = "tests/tree_builder_tests.rs"]
mod tests;
