//! Attribution of one top-level class and its nested classes.
//!
//! Field initializers, method bodies, initializer blocks and enum constant arguments are
//! typed, and the results are recorded in the unit's side tables. Unresolvable names degrade
//! to the error type with a warning. A cyclic hierarchy, or a classpath class that cannot be
//! completed, fails the whole work unit.

use crate::compiler_frontend::compiler_errors::{CompilerError, ErrorLocation};
use crate::compiler_frontend::compiler_warnings::WarningKind;
use crate::compiler_frontend::string_interning::StringId;
use crate::compiler_frontend::toolchain::UnitTables;
use crate::compiler_frontend::toolchain::enter::{Resolver, complete_class, this_type};
use crate::compiler_frontend::toolchain::symbols::{
    ErrorSymbol, Flags, InternalType, MethodSignature, Symbol, SymbolData, SymbolId, SymbolTable,
    VarKind, VarSymbol, substitute,
};
use crate::compiler_frontend::toolchain::syntax::{
    Block, ClassDecl, CompilationUnit, Expr, ExprKind, Literal, MemberDecl, NodeId,
    PrimitiveTag, Statement, TextLocation, TypeSyntax,
};
use crate::projects::settings::{INIT_NAME, OBJECT_FQN};
use crate::{attribution_log, return_attribution_error};
use rustc_hash::FxHashSet;

pub fn attribute_class(
    symbols: &mut SymbolTable,
    unit: &CompilationUnit,
    tables: &mut UnitTables,
    class: SymbolId,
) -> Result<(), CompilerError> {
    let path = symbols
        .class(class)
        .and_then(|info| info.decl.as_ref())
        .map(|decl| decl.path.clone());
    let Some(decl) = path.and_then(|path| unit.class_at(&path)) else {
        return Ok(());
    };

    attribute_nest(symbols, unit, tables, class, decl)
}

fn attribute_nest(
    symbols: &mut SymbolTable,
    unit: &CompilationUnit,
    tables: &mut UnitTables,
    class: SymbolId,
    decl: &ClassDecl,
) -> Result<(), CompilerError> {
    let location = decl.location.to_error_location(&unit.source_path);
    check_hierarchy(symbols, class, &location)?;

    {
        let resolver = Resolver::new(symbols, unit, Some(class), Some(&mut *tables));
        let mut attr = Attr::new(resolver, class, location);
        attr.class_body(decl)?;
    }

    for member in &decl.members {
        if let MemberDecl::Class(nested) = member
            && let Some(nested_symbol) = tables.decl_symbols.get(&nested.id).copied()
        {
            attribute_nest(symbols, unit, tables, nested_symbol, nested)?;
        }
    }

    Ok(())
}

fn parents(symbols: &SymbolTable, class: SymbolId) -> Vec<SymbolId> {
    match symbols.class(class) {
        Some(info) => info
            .supertype
            .iter()
            .chain(info.interfaces.iter())
            .filter_map(InternalType::class_symbol)
            .collect(),
        None => Vec::new(),
    }
}

fn completion_fault(e: CompilerError, location: &ErrorLocation) -> CompilerError {
    CompilerError::new_attribution_error(
        format!("A classpath class could not be completed: {}", e.msg),
        location.clone(),
    )
}

/// Fails if any class reachable through supertypes inherits from itself
pub fn check_hierarchy(
    symbols: &mut SymbolTable,
    class: SymbolId,
    location: &ErrorLocation,
) -> Result<(), CompilerError> {
    let mut path = Vec::new();
    let mut done = FxHashSet::default();

    if let Some(cyclic) = find_cycle(symbols, class, &mut path, &mut done, location)? {
        return_attribution_error!(
            format!("Cyclic inheritance involving '{}'", symbols.flat_name(cyclic)),
            location.clone(),
            {
                CompilationStage => "Attribution",
                PrimarySuggestion => "Break the cycle in the extends/implements clauses",
            }
        );
    }

    Ok(())
}

fn find_cycle(
    symbols: &mut SymbolTable,
    class: SymbolId,
    path: &mut Vec<SymbolId>,
    done: &mut FxHashSet<SymbolId>,
    location: &ErrorLocation,
) -> Result<Option<SymbolId>, CompilerError> {
    if path.contains(&class) {
        return Ok(Some(class));
    }
    if done.contains(&class) {
        return Ok(None);
    }

    complete_class(symbols, class).map_err(|e| completion_fault(e, location))?;

    path.push(class);
    for parent in parents(symbols, class) {
        if let Some(cyclic) = find_cycle(symbols, parent, path, done, location)? {
            return Ok(Some(cyclic));
        }
    }
    path.pop();
    done.insert(class);

    Ok(None)
}

/// A method found on a receiver, with the substitution of the class that declared it
struct Candidate {
    method: SymbolId,
    substitution: Vec<(SymbolId, InternalType)>,
}

fn substitute_signature(
    signature: &MethodSignature,
    substitution: &[(SymbolId, InternalType)],
) -> MethodSignature {
    MethodSignature {
        type_params: signature.type_params.clone(),
        params: signature
            .params
            .iter()
            .map(|param| substitute(param, substitution))
            .collect(),
        return_type: substitute(&signature.return_type, substitution),
        thrown: signature
            .thrown
            .iter()
            .map(|thrown| substitute(thrown, substitution))
            .collect(),
    }
}

fn boxed_name(tag: PrimitiveTag) -> &'static str {
    match tag {
        PrimitiveTag::Boolean => "java.lang.Boolean",
        PrimitiveTag::Byte => "java.lang.Byte",
        PrimitiveTag::Char => "java.lang.Character",
        PrimitiveTag::Double => "java.lang.Double",
        PrimitiveTag::Float => "java.lang.Float",
        PrimitiveTag::Int => "java.lang.Integer",
        PrimitiveTag::Long => "java.lang.Long",
        PrimitiveTag::Short => "java.lang.Short",
        PrimitiveTag::Void => "java.lang.Void",
    }
}

fn widens(from: PrimitiveTag, to: PrimitiveTag) -> bool {
    use PrimitiveTag::*;
    matches!(
        (from, to),
        (Byte, Short | Int | Long | Float | Double)
            | (Short, Int | Long | Float | Double)
            | (Char, Int | Long | Float | Double)
            | (Int, Long | Float | Double)
            | (Long, Float | Double)
            | (Float, Double)
    )
}

struct Attr<'a> {
    r: Resolver<'a>,
    class: SymbolId,
    this: InternalType,
    location: ErrorLocation,

    locals: Vec<(StringId, SymbolId)>,
    method: Option<SymbolId>,
    return_type: Option<InternalType>,

    /// Name and field access expressions that denote a class rather than a value
    static_refs: FxHashSet<NodeId>,
}

impl<'a> Attr<'a> {
    fn new(r: Resolver<'a>, class: SymbolId, location: ErrorLocation) -> Self {
        let this = this_type(r.symbols, class);
        Attr {
            r,
            class,
            this,
            location,
            locals: Vec::new(),
            method: None,
            return_type: None,
            static_refs: FxHashSet::default(),
        }
    }

    fn tables(&mut self) -> Option<&mut UnitTables> {
        self.r.tables.as_deref_mut()
    }

    fn record_symbol(&mut self, node: NodeId, symbol: SymbolId) {
        if let Some(tables) = self.tables() {
            tables.expr_symbols.insert(node, symbol);
        }
    }

    fn record_invocation(&mut self, node: NodeId, signature: MethodSignature) {
        if let Some(tables) = self.tables() {
            tables
                .invocation_types
                .insert(node, InternalType::Method(Box::new(signature)));
        }
    }

    fn complete(&mut self, class: SymbolId) -> Result<(), CompilerError> {
        complete_class(self.r.symbols, class).map_err(|e| completion_fault(e, &self.location))
    }

    /// -----------------------------
    /// DECLARATIONS
    /// -----------------------------
    fn class_body(&mut self, decl: &ClassDecl) -> Result<(), CompilerError> {
        for constant in &decl.enum_constants {
            let arg_types = self.exprs(&constant.args)?;
            let enum_type = self.this.clone();
            self.select_constructor(constant.id, &enum_type, &arg_types, constant.location)?;
        }

        for member in &decl.members {
            match member {
                MemberDecl::Field(field) => {
                    self.dimension_annotations(&field.ty)?;
                    if let Some(initializer) = &field.initializer {
                        let field_type = self
                            .r
                            .decl_symbol(field.id)
                            .map(|symbol| self.r.symbols.variable_type(symbol));
                        self.expr(initializer, field_type.as_ref())?;
                    }
                }

                MemberDecl::Method(method) => {
                    for param in &method.params {
                        self.dimension_annotations(&param.ty)?;
                    }
                    if let Some(return_type) = &method.return_type {
                        self.dimension_annotations(return_type)?;
                    }

                    if let Some(body) = &method.body
                        && let Some(symbol) = self.r.decl_symbol(method.id)
                    {
                        self.method_body(symbol, body)?;
                    }
                }

                MemberDecl::Initializer(init) => {
                    if let Some(symbol) = self.r.decl_symbol(init.id) {
                        self.method_body(symbol, &init.body)?;
                    }
                }

                // Attributed as their own nest
                MemberDecl::Class(_) => {}
            }
        }

        Ok(())
    }

    fn method_body(&mut self, method: SymbolId, body: &Block) -> Result<(), CompilerError> {
        let Some(info) = self.r.symbols.method(method) else {
            return Ok(());
        };
        let type_params = info.type_params.clone();
        let params = info.params.clone();
        let return_type = info.return_type.clone();

        let depth = self.r.type_var_depth();
        self.r.push_type_vars(&type_params);
        self.locals = params
            .iter()
            .map(|param| (self.r.symbols.get(*param).name, *param))
            .collect();
        self.method = Some(method);
        self.return_type = Some(return_type);

        let result = self.block(body);

        self.r.truncate_type_vars(depth);
        self.locals.clear();
        self.method = None;
        self.return_type = None;
        result
    }

    fn block(&mut self, block: &Block) -> Result<(), CompilerError> {
        for statement in &block.statements {
            match statement {
                Statement::Local(local) => {
                    let ty = self.r.resolve_type(&local.ty)?;
                    self.dimension_annotations(&local.ty)?;

                    if let Some(initializer) = &local.initializer {
                        self.expr(initializer, Some(&ty))?;
                    }

                    let owner = self.method.unwrap_or(self.class);
                    let variable = self.r.symbols.alloc(Symbol::new(
                        local.name,
                        Flags::NONE,
                        Some(owner),
                        SymbolData::Variable(VarSymbol {
                            kind: VarKind::Local,
                            ty,
                        }),
                    ));
                    self.r.record_decl(local.id, variable);
                    self.locals.push((local.name, variable));
                }

                Statement::Return { value, .. } => {
                    if let Some(value) = value {
                        let expected = self.return_type.clone();
                        self.expr(value, expected.as_ref())?;
                    }
                }

                Statement::Expression(expr) => {
                    self.expr(expr, None)?;
                }
            }
        }

        Ok(())
    }

    fn dimension_annotations(&mut self, syntax: &TypeSyntax) -> Result<(), CompilerError> {
        if !syntax.has_dimension_annotations() {
            return Ok(());
        }

        let mut current = syntax;
        while let TypeSyntax::Array {
            id,
            element,
            annotations,
            ..
        } = current
        {
            if !annotations.is_empty() {
                let mut resolved = Vec::with_capacity(annotations.len());
                for annotation in annotations {
                    resolved.push(self.r.resolve_annotation(annotation)?);
                }
                if let Some(tables) = self.tables() {
                    tables.type_annotations.insert(*id, resolved);
                }
            }
            current = element;
        }

        Ok(())
    }

    /// -----------------------------
    /// EXPRESSIONS
    /// -----------------------------
    fn exprs(&mut self, exprs: &[Expr]) -> Result<Vec<InternalType>, CompilerError> {
        let mut types = Vec::with_capacity(exprs.len());
        for expr in exprs {
            types.push(self.expr(expr, None)?);
        }
        Ok(types)
    }

    fn expr(
        &mut self,
        expr: &Expr,
        expected: Option<&InternalType>,
    ) -> Result<InternalType, CompilerError> {
        let ty = match &expr.kind {
            ExprKind::Literal(literal) => self.literal(literal),
            ExprKind::This => self.this.clone(),
            ExprKind::Name(name) => self.name(expr, *name)?,
            ExprKind::FieldAccess { target, name } => self.field_access(expr, target, *name)?,
            ExprKind::Invoke { target, name, args } => {
                self.invoke(expr, target.as_deref(), *name, args)?
            }
            ExprKind::New { class, args } => self.new_class(expr, class, args, expected)?,
            ExprKind::Parenthesized(inner) => self.expr(inner, expected)?,
        };

        if let Some(tables) = self.tables() {
            tables.expr_types.insert(expr.id, ty.clone());
        }
        Ok(ty)
    }

    fn literal(&mut self, literal: &Literal) -> InternalType {
        match literal {
            Literal::Int(_) => InternalType::Primitive(PrimitiveTag::Int),
            Literal::Long(_) => InternalType::Primitive(PrimitiveTag::Long),
            Literal::Float(_) => InternalType::Primitive(PrimitiveTag::Float),
            Literal::Double(_) => InternalType::Primitive(PrimitiveTag::Double),
            Literal::Boolean(_) => InternalType::Primitive(PrimitiveTag::Boolean),
            Literal::Char(_) => InternalType::Primitive(PrimitiveTag::Char),
            Literal::String(_) => self.r.string_type(),
            Literal::Null => InternalType::Null,
        }
    }

    fn enclosing_this_types(&self) -> Vec<InternalType> {
        let mut types = Vec::new();
        let mut current = Some(self.class);
        while let Some(class) = current {
            types.push(this_type(self.r.symbols, class));
            current = self
                .r
                .symbols
                .get(class)
                .owner
                .and_then(|owner| self.r.symbols.enclosing_class(owner));
        }
        types
    }

    fn name(&mut self, expr: &Expr, name: StringId) -> Result<InternalType, CompilerError> {
        let local = self
            .locals
            .iter()
            .rev()
            .find(|(local_name, _)| *local_name == name)
            .map(|(_, symbol)| *symbol);
        if let Some(local) = local {
            self.record_symbol(expr.id, local);
            return Ok(self.r.symbols.variable_type(local));
        }

        for receiver in self.enclosing_this_types() {
            if let Some((field, ty)) = self.find_field(&receiver, name)? {
                self.record_symbol(expr.id, field);
                return Ok(ty);
            }
        }

        if let Some(class) = self.r.lookup_simple_class(name) {
            self.record_symbol(expr.id, class);
            self.static_refs.insert(expr.id);
            return Ok(InternalType::class(class));
        }

        let simple = self.r.symbols.names.resolve(name).to_owned();
        if self.r.symbols.is_known_package(&simple) {
            return Ok(InternalType::Package(self.r.symbols.enter_package(&simple)));
        }

        self.r
            .unresolved(format!("Cannot find symbol '{simple}'"), expr.location)
    }

    fn field_access(
        &mut self,
        expr: &Expr,
        target: &Expr,
        name: StringId,
    ) -> Result<InternalType, CompilerError> {
        let target_type = self.expr(target, None)?;
        let simple = self.r.symbols.names.resolve(name).to_owned();

        match &target_type {
            InternalType::Error => return Ok(InternalType::Error),

            InternalType::Package(package) => {
                let prefix = match &self.r.symbols.get(*package).data {
                    SymbolData::Package { full_name } => full_name.clone(),
                    _ => String::new(),
                };
                let full_name = format!("{prefix}.{simple}");

                if let Some(class) = self.r.symbols.lookup_class(&full_name) {
                    self.record_symbol(expr.id, class);
                    self.static_refs.insert(expr.id);
                    return Ok(InternalType::class(class));
                }
                if self.r.symbols.is_known_package(&full_name) {
                    return Ok(InternalType::Package(
                        self.r.symbols.enter_package(&full_name),
                    ));
                }
                return self
                    .r
                    .unresolved(format!("Cannot find symbol '{full_name}'"), expr.location);
            }

            InternalType::Array(_) if simple == "length" => {
                return Ok(InternalType::Primitive(PrimitiveTag::Int));
            }

            _ => {}
        }

        if let Some((field, ty)) = self.find_field(&target_type, name)? {
            self.record_symbol(expr.id, field);
            return Ok(ty);
        }

        if self.static_refs.contains(&target.id)
            && let Some(outer) = target_type.class_symbol()
        {
            let flat_name = format!("{}${}", self.r.symbols.flat_name(outer), simple);
            if let Some(nested) = self.r.symbols.lookup_class(&flat_name) {
                self.record_symbol(expr.id, nested);
                self.static_refs.insert(expr.id);
                return Ok(InternalType::class(nested));
            }
        }

        self.r
            .unresolved(format!("Cannot find field '{simple}'"), expr.location)
    }

    fn invoke(
        &mut self,
        expr: &Expr,
        target: Option<&Expr>,
        name: StringId,
        args: &[Expr],
    ) -> Result<InternalType, CompilerError> {
        let receiver = match target {
            Some(target) => Some(self.expr(target, None)?),
            None => None,
        };
        let arg_types = self.exprs(args)?;

        let receivers = match receiver {
            Some(receiver) if receiver.is_error() => return Ok(InternalType::Error),
            Some(receiver) => vec![receiver],
            None => self.enclosing_this_types(),
        };

        for receiver in &receivers {
            let candidates = self.collect_methods(receiver, name)?;
            if candidates.is_empty() {
                continue;
            }

            return match self.select(&candidates, &arg_types) {
                Some((method, signature)) => {
                    let return_type = signature.return_type.clone();
                    self.record_symbol(expr.id, method);
                    self.record_invocation(expr.id, signature);
                    Ok(return_type)
                }
                None => {
                    let owner = receiver.class_symbol().unwrap_or(self.class);
                    self.inapplicable(expr, name, owner, &candidates, arg_types.len());
                    Ok(InternalType::Error)
                }
            };
        }

        let simple = self.r.symbols.names.resolve(name).to_owned();
        self.r
            .unresolved(format!("Cannot find method '{simple}'"), expr.location)
    }

    fn new_class(
        &mut self,
        expr: &Expr,
        class_syntax: &TypeSyntax,
        args: &[Expr],
        expected: Option<&InternalType>,
    ) -> Result<InternalType, CompilerError> {
        let mut ty = self.r.resolve_type(class_syntax)?;
        let arg_types = self.exprs(args)?;

        let is_diamond = matches!(
            class_syntax,
            TypeSyntax::Named { type_args: Some(type_args), .. } if type_args.is_empty()
        );
        if is_diamond && let Some(class) = ty.class_symbol() {
            ty = self.infer_diamond(class, expected);
        }

        let Some(class) = ty.class_symbol() else {
            return Ok(InternalType::Error);
        };

        self.select_constructor(expr.id, &ty, &arg_types, expr.location)?;
        if let Some(tables) = self.tables() {
            tables.type_trees.insert(class_syntax.id(), ty.clone());
        }

        attribution_log!("new ", Blue {self.r.symbols.flat_name(class)});
        Ok(ty)
    }

    fn select_constructor(
        &mut self,
        node: NodeId,
        class_type: &InternalType,
        arg_types: &[InternalType],
        location: TextLocation,
    ) -> Result<(), CompilerError> {
        let Some(class) = class_type.class_symbol() else {
            return Ok(());
        };
        self.complete(class)?;

        let init = self.r.symbols.names.intern(INIT_NAME);
        let substitution = self.r.symbols.substitution_for(class_type);
        let candidates: Vec<Candidate> = self
            .r
            .symbols
            .members_named(class, init)
            .into_iter()
            .map(|method| Candidate {
                method,
                substitution: substitution.clone(),
            })
            .collect();

        if candidates.is_empty() {
            return Ok(());
        }

        match self.select(&candidates, arg_types) {
            Some((constructor, signature)) => {
                self.record_symbol(node, constructor);
                self.record_invocation(node, signature);
            }
            None => {
                let expr = Expr {
                    id: node,
                    kind: ExprKind::This,
                    location,
                };
                self.inapplicable(&expr, init, class, &candidates, arg_types.len());
            }
        }

        Ok(())
    }

    /// Leaves an error symbol behind that remembers what could have been meant
    fn inapplicable(
        &mut self,
        expr: &Expr,
        name: StringId,
        owner: SymbolId,
        candidates: &[Candidate],
        arity: usize,
    ) {
        let error = self.r.symbols.alloc(Symbol::new(
            name,
            Flags::NONE,
            Some(owner),
            SymbolData::Error(ErrorSymbol {
                candidates: candidates.iter().map(|candidate| candidate.method).collect(),
                arity,
            }),
        ));
        self.record_symbol(expr.id, error);

        let msg = format!(
            "No applicable overload of '{}' for {arity} arguments",
            self.r.symbols.names.resolve(name)
        );
        self.r.warn(msg, expr.location, WarningKind::UnresolvedSymbol);
    }

    /// -----------------------------
    /// MEMBER LOOKUP
    /// -----------------------------
    fn find_field(
        &mut self,
        receiver: &InternalType,
        name: StringId,
    ) -> Result<Option<(SymbolId, InternalType)>, CompilerError> {
        let mut visited = FxHashSet::default();
        self.find_field_in(receiver, name, &[], &mut visited)
    }

    fn find_field_in(
        &mut self,
        ty: &InternalType,
        name: StringId,
        outer: &[(SymbolId, InternalType)],
        visited: &mut FxHashSet<SymbolId>,
    ) -> Result<Option<(SymbolId, InternalType)>, CompilerError> {
        match ty {
            InternalType::Class { symbol, .. } => {
                if !visited.insert(*symbol) {
                    return Ok(None);
                }
                self.complete(*symbol)?;

                let ty = substitute(ty, outer);
                let substitution = self.r.symbols.substitution_for(&ty);

                let field = self
                    .r
                    .symbols
                    .members_named(*symbol, name)
                    .into_iter()
                    .find(|member| self.r.symbols.variable(*member).is_some());
                if let Some(field) = field {
                    let field_type = substitute(&self.r.symbols.variable_type(field), &substitution);
                    return Ok(Some((field, field_type)));
                }

                for parent in parents_of(self.r.symbols, *symbol) {
                    if let Some(found) = self.find_field_in(&parent, name, &substitution, visited)? {
                        return Ok(Some(found));
                    }
                }
                Ok(None)
            }

            InternalType::TypeVar(var) => {
                let bound = self.r.symbols.type_var(*var).map(|var| var.bound.clone());
                match bound {
                    Some(bound) => self.find_field_in(&bound, name, outer, visited),
                    None => Ok(None),
                }
            }

            InternalType::Intersection(bounds) => {
                for bound in bounds {
                    if let Some(found) = self.find_field_in(bound, name, outer, visited)? {
                        return Ok(Some(found));
                    }
                }
                Ok(None)
            }

            _ => Ok(None),
        }
    }

    fn collect_methods(
        &mut self,
        receiver: &InternalType,
        name: StringId,
    ) -> Result<Vec<Candidate>, CompilerError> {
        let mut candidates = Vec::new();
        let mut visited = FxHashSet::default();

        let receiver = match receiver {
            InternalType::Array(_) => self.r.object_type().unwrap_or(InternalType::Unknown),
            other => other.clone(),
        };

        self.collect_methods_in(&receiver, name, &[], &mut visited, &mut candidates)?;
        Ok(candidates)
    }

    fn collect_methods_in(
        &mut self,
        ty: &InternalType,
        name: StringId,
        outer: &[(SymbolId, InternalType)],
        visited: &mut FxHashSet<SymbolId>,
        candidates: &mut Vec<Candidate>,
    ) -> Result<(), CompilerError> {
        match ty {
            InternalType::Class { symbol, .. } => {
                if !visited.insert(*symbol) {
                    return Ok(());
                }
                self.complete(*symbol)?;

                let ty = substitute(ty, outer);
                let substitution = self.r.symbols.substitution_for(&ty);

                for method in self.r.symbols.members_named(*symbol, name) {
                    let flags = self.r.symbols.get(method).flags;
                    let Some(info) = self.r.symbols.method(method) else {
                        continue;
                    };
                    if flags.intersects(Flags::BLOCK | Flags::BRIDGE) {
                        continue;
                    }

                    // Overridden further down the hierarchy
                    let params: Vec<InternalType> = info
                        .signature(self.r.symbols)
                        .params
                        .iter()
                        .map(|param| substitute(param, &substitution))
                        .collect();
                    let overridden = candidates.iter().any(|candidate| {
                        self.r.symbols.method(candidate.method).is_some_and(|existing| {
                            let existing_params: Vec<InternalType> = existing
                                .signature(self.r.symbols)
                                .params
                                .iter()
                                .map(|param| substitute(param, &candidate.substitution))
                                .collect();
                            existing_params == params
                        })
                    });
                    if overridden {
                        continue;
                    }

                    candidates.push(Candidate {
                        method,
                        substitution: substitution.clone(),
                    });
                }

                for parent in parents_of(self.r.symbols, *symbol) {
                    self.collect_methods_in(&parent, name, &substitution, visited, candidates)?;
                }
                Ok(())
            }

            InternalType::TypeVar(var) => {
                let bound = self.r.symbols.type_var(*var).map(|var| var.bound.clone());
                match bound {
                    Some(bound) => self.collect_methods_in(&bound, name, outer, visited, candidates),
                    None => Ok(()),
                }
            }

            InternalType::Intersection(bounds) => {
                for bound in bounds {
                    self.collect_methods_in(bound, name, outer, visited, candidates)?;
                }
                Ok(())
            }

            _ => Ok(()),
        }
    }

    /// -----------------------------
    /// OVERLOAD SELECTION
    /// -----------------------------
    /// Applicable candidates after inferring method type arguments, most specific first
    fn select(
        &mut self,
        candidates: &[Candidate],
        arg_types: &[InternalType],
    ) -> Option<(SymbolId, MethodSignature)> {
        let mut applicable = Vec::new();

        for candidate in candidates {
            let Some(info) = self.r.symbols.method(candidate.method) else {
                continue;
            };
            let declared = info.signature(self.r.symbols);
            if declared.params.len() != arg_types.len() {
                continue;
            }

            let signature = substitute_signature(&declared, &candidate.substitution);
            let mut bindings = Vec::new();
            for (param, arg) in signature.params.iter().zip(arg_types) {
                self.infer(param, arg, &signature.type_params, &mut bindings);
            }

            let mut inferred = substitute_signature(&signature, &bindings);
            inferred.type_params = signature
                .type_params
                .iter()
                .copied()
                .filter(|var| !bindings.iter().any(|(bound, _)| bound == var))
                .collect();

            let fits = arg_types
                .iter()
                .zip(&inferred.params)
                .all(|(arg, param)| self.assignable(arg, param));
            if fits {
                applicable.push((candidate.method, inferred));
            }
        }

        let most_specific = (0..applicable.len()).find(|&index| {
            applicable.iter().all(|(_, other)| {
                applicable[index]
                    .1
                    .params
                    .iter()
                    .zip(&other.params)
                    .all(|(mine, theirs)| self.assignable(mine, theirs))
            })
        });

        match most_specific {
            Some(index) => Some(applicable.swap_remove(index)),
            None if applicable.is_empty() => None,
            None => Some(applicable.swap_remove(0)),
        }
    }

    fn infer(
        &mut self,
        param: &InternalType,
        arg: &InternalType,
        vars: &[SymbolId],
        bindings: &mut Vec<(SymbolId, InternalType)>,
    ) {
        match (param, arg) {
            (_, InternalType::Null | InternalType::Error | InternalType::Unknown) => {}

            (InternalType::TypeVar(var), arg) if vars.contains(var) => {
                if !bindings.iter().any(|(bound, _)| bound == var) {
                    let arg = self.boxed(arg);
                    bindings.push((*var, arg));
                }
            }

            (
                InternalType::Class {
                    symbol: param_class,
                    type_args: param_args,
                },
                InternalType::Class {
                    symbol: arg_class,
                    type_args: arg_args,
                },
            ) if param_class == arg_class => {
                for (param, arg) in param_args.iter().zip(arg_args) {
                    self.infer(param, arg, vars, bindings);
                }
            }

            (InternalType::Array(param), InternalType::Array(arg)) => {
                self.infer(param, arg, vars, bindings)
            }

            (
                InternalType::Wildcard {
                    bound: Some(bound), ..
                },
                arg,
            ) => self.infer(bound, arg, vars, bindings),

            _ => {}
        }
    }

    fn boxed(&mut self, ty: &InternalType) -> InternalType {
        match ty {
            InternalType::Primitive(tag) => self
                .r
                .well_known(boxed_name(*tag))
                .unwrap_or_else(|| ty.clone()),
            other => other.clone(),
        }
    }

    fn assignable(&mut self, from: &InternalType, to: &InternalType) -> bool {
        match (from, to) {
            (InternalType::Error | InternalType::Unknown, _)
            | (_, InternalType::Error | InternalType::Unknown)
            | (_, InternalType::TypeVar(_) | InternalType::Wildcard { .. }) => true,

            (InternalType::Null, to) => !matches!(to, InternalType::Primitive(_)),

            (InternalType::Primitive(from), InternalType::Primitive(to)) => {
                from == to || widens(*from, *to)
            }

            (InternalType::Primitive(_), InternalType::Class { symbol, .. }) => {
                match self.boxed(from).class_symbol() {
                    Some(boxed) => self.is_subclass(boxed, *symbol),
                    None => false,
                }
            }

            (InternalType::Class { symbol, .. }, InternalType::Primitive(tag)) => {
                self.r.symbols.flat_name(*symbol) == boxed_name(*tag)
            }

            (InternalType::Class { symbol: from, .. }, InternalType::Class { symbol: to, .. }) => {
                self.is_subclass(*from, *to)
            }

            (_, InternalType::Intersection(bounds)) => {
                bounds.iter().all(|bound| self.assignable(from, bound))
            }

            (InternalType::Array(from), InternalType::Array(to)) => match (&**from, &**to) {
                (InternalType::Primitive(from), InternalType::Primitive(to)) => from == to,
                (from, to) => self.assignable(from, to),
            },

            (InternalType::Array(_), to) => self.r.symbols.is_object(to),

            (InternalType::TypeVar(var), to) => {
                let bound = self.r.symbols.type_var(*var).map(|var| var.bound.clone());
                match bound {
                    Some(bound) => self.assignable(&bound, to),
                    None => false,
                }
            }

            (InternalType::Intersection(bounds), to) => {
                bounds.iter().any(|bound| self.assignable(bound, to))
            }

            _ => false,
        }
    }

    fn is_subclass(&mut self, class: SymbolId, target: SymbolId) -> bool {
        let mut visited = FxHashSet::default();
        let mut stack = vec![class];

        while let Some(current) = stack.pop() {
            if current == target {
                return true;
            }
            if !visited.insert(current) {
                continue;
            }
            // A broken parent only hides what lies above it
            let _ = complete_class(self.r.symbols, current);
            stack.extend(parents(self.r.symbols, current));
        }

        // Interfaces are still Objects
        self.r.symbols.flat_name(target) == OBJECT_FQN
    }

    /// `new C<>(..)` takes its type arguments from the expected type where it can
    fn infer_diamond(&mut self, class: SymbolId, expected: Option<&InternalType>) -> InternalType {
        let raw = InternalType::class(class);
        let Some(expected @ InternalType::Class { symbol: target, .. }) = expected else {
            return raw;
        };

        let generic = this_type(self.r.symbols, class);
        let mut visited = FxHashSet::default();
        let Some(view) = self.as_super(&generic, *target, &mut visited) else {
            return raw;
        };

        let vars = self
            .r
            .symbols
            .class(class)
            .map(|info| info.type_params.clone())
            .unwrap_or_default();
        let mut bindings = Vec::new();
        self.infer(&view, expected, &vars, &mut bindings);

        let mut type_args = Vec::with_capacity(vars.len());
        for var in &vars {
            match bindings.iter().find(|(bound, _)| bound == var) {
                Some((_, ty)) => type_args.push(ty.clone()),
                None => return raw,
            }
        }

        InternalType::Class {
            symbol: class,
            type_args,
        }
    }

    /// `ty` viewed as its supertype `target`, type arguments carried along
    fn as_super(
        &mut self,
        ty: &InternalType,
        target: SymbolId,
        visited: &mut FxHashSet<SymbolId>,
    ) -> Option<InternalType> {
        let symbol = ty.class_symbol()?;
        if symbol == target {
            return Some(ty.clone());
        }
        if !visited.insert(symbol) {
            return None;
        }

        let _ = complete_class(self.r.symbols, symbol);
        let substitution = self.r.symbols.substitution_for(ty);
        for parent in parents_of(self.r.symbols, symbol) {
            let parent = substitute(&parent, &substitution);
            if let Some(found) = self.as_super(&parent, target, visited) {
                return Some(found);
            }
        }

        None
    }
}

fn parents_of(symbols: &SymbolTable, class: SymbolId) -> Vec<InternalType> {
    match symbols.class(class) {
        Some(info) => info
            .supertype
            .iter()
            .chain(info.interfaces.iter())
            .cloned()
            .collect(),
        None => Vec::new(),
    }
}

#[cfg(test)]
#[path = "tests/attribute_tests.rs"]
mod tests;
