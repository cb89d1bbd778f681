use crate::compiler_frontend::compiler_errors::{CompilerError, ErrorMetaDataKey};
use crate::compiler_frontend::string_interning::{StringId, StringTable};
use crate::compiler_frontend::toolchain::symbols::Flags;
use crate::compiler_frontend::toolchain::syntax::{
    AnnotationSyntax, Block, ClassDecl, ClassKind, CompilationUnit, ElementPairSyntax,
    ElementValueSyntax, EnumConstantDecl, Expr, ExprKind, FieldDecl, ImportDecl,
    InitializerDecl, Literal, LocalDecl, MemberDecl, MethodDecl, NodeId, ParamSyntax,
    QualifiedName, Statement, TextLocation, TypeParamSyntax, TypeSyntax, WildcardKind,
};
use crate::compiler_frontend::toolchain::tokenizer::tokenizer::tokenize;
use crate::compiler_frontend::toolchain::tokenizer::tokens::{FileTokens, TokenKind};
use crate::ast_log;
use std::path::Path;

/// Tokenize and parse one input
pub fn parse_source(
    source_code: &str,
    src_path: &Path,
    string_table: &mut StringTable,
) -> Result<CompilationUnit, CompilerError> {
    let tokens = tokenize(source_code, src_path, string_table)?;
    let unit = Parser::new(tokens, string_table).parse_unit()?;
    ast_log!("Parsed ", Blue {src_path.display()}, " into ", {unit.types.len()}, " top level types");
    Ok(unit)
}

struct Parser<'a> {
    tokens: FileTokens,
    names: &'a mut StringTable,
    next_node: u32,
}

impl<'a> Parser<'a> {
    fn new(tokens: FileTokens, names: &'a mut StringTable) -> Self {
        Parser {
            tokens,
            names,
            next_node: 0,
        }
    }

    fn next_id(&mut self) -> NodeId {
        let id = NodeId(self.next_node);
        self.next_node += 1;
        id
    }

    fn kind(&self) -> &TokenKind {
        self.tokens.current_token_kind()
    }

    fn peek(&self, offset: usize) -> &TokenKind {
        self.tokens.peek_kind(offset)
    }

    fn location(&self) -> TextLocation {
        self.tokens.current_location()
    }

    fn unexpected(&self, expected: &str) -> CompilerError {
        let found = self.kind().get_name(self.names);
        CompilerError::new_syntax_error(
            format!("Expected {expected}, found '{found}'"),
            self.location().to_error_location(self.tokens.path()),
        )
        .with_metadata(ErrorMetaDataKey::CompilationStage, "Parsing")
    }

    fn expect(&mut self, kind: TokenKind, expected: &str) -> Result<TextLocation, CompilerError> {
        if *self.kind() == kind {
            let location = self.location();
            self.tokens.advance();
            Ok(location)
        } else {
            Err(self.unexpected(expected))
        }
    }

    fn expect_identifier(&mut self) -> Result<(StringId, TextLocation), CompilerError> {
        match self.kind() {
            TokenKind::Identifier(id) => {
                let id = *id;
                let location = self.location();
                self.tokens.advance();
                Ok((id, location))
            }
            _ => Err(self.unexpected("an identifier")),
        }
    }

    fn is_identifier(&self, text: &str) -> bool {
        matches!(self.kind(), TokenKind::Identifier(id) if self.names.resolve(*id) == text)
    }

    /// -----------------------------
    /// COMPILATION UNIT
    /// -----------------------------
    fn parse_unit(mut self) -> Result<CompilationUnit, CompilerError> {
        let mut package = None;
        let mut imports = Vec::new();
        let mut types = Vec::new();

        if *self.kind() == TokenKind::Package {
            self.tokens.advance();
            package = Some(self.parse_qualified_name()?);
            self.expect(TokenKind::Semicolon, "';' after the package declaration")?;
        }

        while *self.kind() == TokenKind::Import {
            self.tokens.advance();

            // Static imports only bring members into scope, the declaration model has no use for them
            let is_static = self.tokens.eat(&TokenKind::Static);

            let mut name = self.parse_qualified_name()?;
            let mut on_demand = false;
            if *self.kind() == TokenKind::Dot && *self.peek(1) == TokenKind::Star {
                self.tokens.advance();
                self.tokens.advance();
                on_demand = true;
            }
            name.location = name.location.to(self.tokens.previous_location());
            self.expect(TokenKind::Semicolon, "';' after the import")?;

            if !is_static {
                imports.push(ImportDecl { name, on_demand });
            }
        }

        while *self.kind() != TokenKind::Eof {
            if self.tokens.eat(&TokenKind::Semicolon) {
                continue;
            }

            let (modifiers, annotations) = self.parse_modifiers()?;
            let start = self.location();
            match self.try_parse_type_declaration(modifiers, annotations, start)? {
                Some(class) => types.push(class),
                None => return Err(self.unexpected("a class, interface, enum, record or annotation declaration")),
            }
        }

        Ok(CompilationUnit {
            source_path: self.tokens.src_path.clone(),
            package,
            imports,
            types,
        })
    }

    fn parse_qualified_name(&mut self) -> Result<QualifiedName, CompilerError> {
        let (first, start) = self.expect_identifier()?;
        let mut segments = vec![first];
        let mut end = start;

        while *self.kind() == TokenKind::Dot {
            let TokenKind::Identifier(next) = *self.peek(1) else {
                break;
            };
            self.tokens.advance();
            end = self.location();
            self.tokens.advance();
            segments.push(next);
        }

        Ok(QualifiedName {
            segments,
            location: start.to(end),
        })
    }

    /// Modifiers and declaration annotations in any order
    fn parse_modifiers(&mut self) -> Result<(Flags, Vec<AnnotationSyntax>), CompilerError> {
        let mut flags = Flags::NONE;
        let mut annotations = Vec::new();

        loop {
            let flag = match self.kind() {
                TokenKind::Public => Flags::PUBLIC,
                TokenKind::Protected => Flags::PROTECTED,
                TokenKind::Private => Flags::PRIVATE,
                TokenKind::Static => Flags::STATIC,
                TokenKind::Final => Flags::FINAL,
                TokenKind::Abstract => Flags::ABSTRACT,
                TokenKind::Default => Flags::DEFAULT,
                TokenKind::At if *self.peek(1) != TokenKind::Interface => {
                    annotations.push(self.parse_annotation()?);
                    continue;
                }
                _ => break,
            };
            flags.insert(flag);
            self.tokens.advance();
        }

        Ok((flags, annotations))
    }

    /// -----------------------------
    /// TYPE DECLARATIONS
    /// -----------------------------
    fn try_parse_type_declaration(
        &mut self,
        modifiers: Flags,
        annotations: Vec<AnnotationSyntax>,
        start: TextLocation,
    ) -> Result<Option<ClassDecl>, CompilerError> {
        let kind = match self.kind() {
            TokenKind::Class => ClassKind::Class,
            TokenKind::Interface => ClassKind::Interface,
            TokenKind::Enum => ClassKind::Enum,
            TokenKind::At if *self.peek(1) == TokenKind::Interface => {
                self.tokens.advance();
                ClassKind::Annotation
            }
            // `record` is only a keyword in front of a declaration
            TokenKind::Identifier(_)
                if self.is_identifier("record")
                    && matches!(self.peek(1), TokenKind::Identifier(_)) =>
            {
                ClassKind::Record
            }
            _ => return Ok(None),
        };
        self.tokens.advance();

        let id = self.next_id();
        let (name, _) = self.expect_identifier()?;
        ast_log!("Class declaration ", Green {self.names.resolve(name)});

        let type_params = if *self.kind() == TokenKind::LessThan {
            self.parse_type_params()?
        } else {
            Vec::new()
        };

        let mut record_components = Vec::new();
        if kind == ClassKind::Record {
            self.expect(TokenKind::OpenParenthesis, "'(' to start the record components")?;
            record_components = self.parse_params()?;
        }

        let mut extends = Vec::new();
        let mut implements = Vec::new();
        if self.tokens.eat(&TokenKind::Extends) {
            extends = self.parse_type_list()?;
        }
        if self.tokens.eat(&TokenKind::Implements) {
            implements = self.parse_type_list()?;
        }

        self.expect(TokenKind::OpenCurly, "'{' to start the class body")?;

        let mut enum_constants = Vec::new();
        if kind == ClassKind::Enum {
            enum_constants = self.parse_enum_constants()?;
        }

        let members = self.parse_class_body(name)?;
        let end = self.expect(TokenKind::CloseCurly, "'}' to close the class body")?;

        Ok(Some(ClassDecl {
            id,
            name,
            kind,
            modifiers,
            annotations,
            type_params,
            extends,
            implements,
            record_components,
            enum_constants,
            members,
            location: start.to(end),
        }))
    }

    fn parse_enum_constants(&mut self) -> Result<Vec<EnumConstantDecl>, CompilerError> {
        let mut constants = Vec::new();

        loop {
            match self.kind() {
                TokenKind::Semicolon => {
                    self.tokens.advance();
                    break;
                }
                TokenKind::CloseCurly => break,
                _ => {}
            }

            let (_, annotations) = self.parse_modifiers()?;
            let id = self.next_id();
            let (name, start) = self.expect_identifier()?;
            let args = if *self.kind() == TokenKind::OpenParenthesis {
                self.parse_arguments()?
            } else {
                Vec::new()
            };

            constants.push(EnumConstantDecl {
                id,
                name,
                annotations,
                args,
                location: start.to(self.tokens.previous_location()),
            });

            if !self.tokens.eat(&TokenKind::Comma) {
                // The constant list ends with ';' or the closing brace
                if !self.tokens.eat(&TokenKind::Semicolon) && *self.kind() != TokenKind::CloseCurly {
                    return Err(self.unexpected("',' or ';' after the enum constant"));
                }
                break;
            }
        }

        Ok(constants)
    }

    fn parse_class_body(&mut self, class_name: StringId) -> Result<Vec<MemberDecl>, CompilerError> {
        let mut members = Vec::new();

        while !matches!(self.kind(), TokenKind::CloseCurly | TokenKind::Eof) {
            if self.tokens.eat(&TokenKind::Semicolon) {
                continue;
            }

            let start = self.location();

            // Initializer blocks
            if *self.kind() == TokenKind::OpenCurly
                || (*self.kind() == TokenKind::Static && *self.peek(1) == TokenKind::OpenCurly)
            {
                let is_static = self.tokens.eat(&TokenKind::Static);
                let id = self.next_id();
                let body = self.parse_block()?;
                members.push(MemberDecl::Initializer(InitializerDecl {
                    id,
                    is_static,
                    body,
                    location: start.to(self.tokens.previous_location()),
                }));
                continue;
            }

            let (modifiers, annotations) = self.parse_modifiers()?;

            if let Some(nested) =
                self.try_parse_type_declaration(modifiers, annotations.clone(), start)?
            {
                members.push(MemberDecl::Class(nested));
                continue;
            }

            let type_params = if *self.kind() == TokenKind::LessThan {
                self.parse_type_params()?
            } else {
                Vec::new()
            };

            // Constructor
            if matches!(self.kind(), TokenKind::Identifier(id) if *id == class_name)
                && *self.peek(1) == TokenKind::OpenParenthesis
            {
                let (name, _) = self.expect_identifier()?;
                let method =
                    self.parse_method_rest(start, modifiers, annotations, type_params, None, name)?;
                members.push(MemberDecl::Method(method));
                continue;
            }

            let ty = self.parse_type()?;
            let (name, _) = self.expect_identifier()?;

            if *self.kind() == TokenKind::OpenParenthesis {
                let method = self.parse_method_rest(
                    start,
                    modifiers,
                    annotations,
                    type_params,
                    Some(ty),
                    name,
                )?;
                members.push(MemberDecl::Method(method));
                continue;
            }

            // Fields, possibly several sharing one type
            let mut name = name;
            loop {
                let id = self.next_id();
                let initializer = if self.tokens.eat(&TokenKind::Assign) {
                    Some(self.parse_expression()?)
                } else {
                    None
                };

                members.push(MemberDecl::Field(FieldDecl {
                    id,
                    modifiers,
                    annotations: annotations.clone(),
                    ty: ty.clone(),
                    name,
                    initializer,
                    location: start.to(self.tokens.previous_location()),
                }));

                if !self.tokens.eat(&TokenKind::Comma) {
                    break;
                }
                name = self.expect_identifier()?.0;
            }
            self.expect(TokenKind::Semicolon, "';' after the field declaration")?;
        }

        Ok(members)
    }

    fn parse_method_rest(
        &mut self,
        start: TextLocation,
        modifiers: Flags,
        annotations: Vec<AnnotationSyntax>,
        type_params: Vec<TypeParamSyntax>,
        return_type: Option<TypeSyntax>,
        name: StringId,
    ) -> Result<MethodDecl, CompilerError> {
        let id = self.next_id();
        self.expect(TokenKind::OpenParenthesis, "'(' to start the parameter list")?;
        let params = self.parse_params()?;

        let throws = if self.tokens.eat(&TokenKind::Throws) {
            self.parse_type_list()?
        } else {
            Vec::new()
        };

        let default_value = if self.tokens.eat(&TokenKind::Default) {
            Some(self.parse_element_value()?)
        } else {
            None
        };

        let body = if self.tokens.eat(&TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_block()?)
        };

        Ok(MethodDecl {
            id,
            modifiers,
            annotations,
            type_params,
            return_type,
            name,
            params,
            throws,
            body,
            default_value,
            location: start.to(self.tokens.previous_location()),
        })
    }

    /// Parameters up to and including the closing ')'
    fn parse_params(&mut self) -> Result<Vec<ParamSyntax>, CompilerError> {
        let mut params = Vec::new();
        if self.tokens.eat(&TokenKind::CloseParenthesis) {
            return Ok(params);
        }

        loop {
            let start = self.location();
            let (modifiers, annotations) = self.parse_modifiers()?;
            let id = self.next_id();
            let ty = self.parse_type()?;
            let (name, end) = self.expect_identifier()?;
            params.push(ParamSyntax {
                id,
                modifiers,
                annotations,
                ty,
                name,
                location: start.to(end),
            });

            if !self.tokens.eat(&TokenKind::Comma) {
                break;
            }
        }

        self.expect(TokenKind::CloseParenthesis, "')' to close the parameter list")?;
        Ok(params)
    }

    fn parse_type_params(&mut self) -> Result<Vec<TypeParamSyntax>, CompilerError> {
        self.expect(TokenKind::LessThan, "'<'")?;
        let mut params = Vec::new();

        loop {
            let id = self.next_id();
            let (name, start) = self.expect_identifier()?;
            let mut bounds = Vec::new();
            if self.tokens.eat(&TokenKind::Extends) {
                bounds.push(self.parse_type()?);
                while self.tokens.eat(&TokenKind::Ampersand) {
                    bounds.push(self.parse_type()?);
                }
            }
            params.push(TypeParamSyntax {
                id,
                name,
                bounds,
                location: start.to(self.tokens.previous_location()),
            });

            if !self.tokens.eat(&TokenKind::Comma) {
                break;
            }
        }

        self.expect(TokenKind::GreaterThan, "'>' to close the type parameters")?;
        Ok(params)
    }

    fn parse_type_list(&mut self) -> Result<Vec<TypeSyntax>, CompilerError> {
        let mut types = vec![self.parse_type()?];
        while self.tokens.eat(&TokenKind::Comma) {
            types.push(self.parse_type()?);
        }
        Ok(types)
    }

    /// -----------------------------
    /// TYPES
    /// -----------------------------
    fn parse_type(&mut self) -> Result<TypeSyntax, CompilerError> {
        let mut leading_annotations = Vec::new();
        while *self.kind() == TokenKind::At {
            leading_annotations.push(self.parse_annotation()?);
        }

        let element = match self.kind().clone() {
            TokenKind::Primitive(tag) => {
                let location = self.location();
                self.tokens.advance();
                TypeSyntax::Primitive {
                    id: self.next_id(),
                    tag,
                    location,
                }
            }
            TokenKind::Identifier(_) => {
                let name = self.parse_qualified_name()?;
                let type_args = if *self.kind() == TokenKind::LessThan {
                    Some(self.parse_type_args()?)
                } else {
                    None
                };
                TypeSyntax::Named {
                    id: self.next_id(),
                    name,
                    type_args,
                    annotations: leading_annotations,
                }
            }
            _ => return Err(self.unexpected("a type")),
        };

        self.parse_dimensions(element)
    }

    /// `T @A [] @B []`. The first dimension written is the outermost array.
    fn parse_dimensions(&mut self, element: TypeSyntax) -> Result<TypeSyntax, CompilerError> {
        let mut dimensions = Vec::new();

        loop {
            let checkpoint = self.tokens.index;
            let mut annotations = Vec::new();
            while *self.kind() == TokenKind::At {
                annotations.push(self.parse_annotation()?);
            }

            if *self.kind() == TokenKind::OpenBracket && *self.peek(1) == TokenKind::CloseBracket {
                let start = self.location();
                self.tokens.advance();
                let end = self.location();
                self.tokens.advance();
                dimensions.push((annotations, start.to(end)));
            } else {
                // Annotations that don't precede a dimension belong to whatever follows
                self.tokens.index = checkpoint;
                break;
            }
        }

        let element_location = element.location();
        let mut ty = element;
        for (annotations, location) in dimensions.into_iter().rev() {
            ty = TypeSyntax::Array {
                id: self.next_id(),
                element: Box::new(ty),
                annotations,
                location: element_location.to(location),
            };
        }

        Ok(ty)
    }

    fn parse_type_args(&mut self) -> Result<Vec<TypeSyntax>, CompilerError> {
        self.expect(TokenKind::LessThan, "'<'")?;
        let mut args = Vec::new();

        // Diamond
        if self.tokens.eat(&TokenKind::GreaterThan) {
            return Ok(args);
        }

        loop {
            if *self.kind() == TokenKind::QuestionMark {
                let start = self.location();
                self.tokens.advance();
                let (kind, bound) = if self.tokens.eat(&TokenKind::Extends) {
                    (WildcardKind::Extends, Some(Box::new(self.parse_type()?)))
                } else if self.tokens.eat(&TokenKind::Super) {
                    (WildcardKind::Super, Some(Box::new(self.parse_type()?)))
                } else {
                    (WildcardKind::Unbound, None)
                };
                args.push(TypeSyntax::Wildcard {
                    id: self.next_id(),
                    kind,
                    bound,
                    location: start.to(self.tokens.previous_location()),
                });
            } else {
                args.push(self.parse_type()?);
            }

            if !self.tokens.eat(&TokenKind::Comma) {
                break;
            }
        }

        self.expect(TokenKind::GreaterThan, "'>' to close the type arguments")?;
        Ok(args)
    }

    /// -----------------------------
    /// ANNOTATIONS
    /// -----------------------------
    fn parse_annotation(&mut self) -> Result<AnnotationSyntax, CompilerError> {
        let start = self.expect(TokenKind::At, "'@'")?;
        let id = self.next_id();
        let name = self.parse_qualified_name()?;
        let mut arguments = Vec::new();

        if self.tokens.eat(&TokenKind::OpenParenthesis) {
            if !self.tokens.eat(&TokenKind::CloseParenthesis) {
                loop {
                    let named = matches!(self.kind(), TokenKind::Identifier(_))
                        && *self.peek(1) == TokenKind::Assign;
                    let element_name = if named {
                        let (element_name, _) = self.expect_identifier()?;
                        self.tokens.advance();
                        Some(element_name)
                    } else {
                        None
                    };

                    let value = self.parse_element_value()?;
                    arguments.push(ElementPairSyntax {
                        name: element_name,
                        value,
                    });

                    if !self.tokens.eat(&TokenKind::Comma) {
                        break;
                    }
                }
                self.expect(TokenKind::CloseParenthesis, "')' to close the annotation")?;
            }
        }

        Ok(AnnotationSyntax {
            id,
            name,
            arguments,
            location: start.to(self.tokens.previous_location()),
        })
    }

    fn parse_element_value(&mut self) -> Result<ElementValueSyntax, CompilerError> {
        match self.kind() {
            TokenKind::At => Ok(ElementValueSyntax::Annotation(self.parse_annotation()?)),

            TokenKind::OpenCurly => {
                self.tokens.advance();
                let mut values = Vec::new();
                while *self.kind() != TokenKind::CloseCurly {
                    values.push(self.parse_element_value()?);
                    if !self.tokens.eat(&TokenKind::Comma) {
                        break;
                    }
                }
                self.expect(TokenKind::CloseCurly, "'}' to close the element value array")?;
                Ok(ElementValueSyntax::Array(values))
            }

            TokenKind::Primitive(_) | TokenKind::Identifier(_) => {
                // Either a class literal or a constant name
                let checkpoint = self.tokens.index;
                let checkpoint_node = self.next_node;
                if let Ok(ty) = self.parse_type()
                    && *self.kind() == TokenKind::Dot
                    && *self.peek(1) == TokenKind::Class
                {
                    self.tokens.advance();
                    self.tokens.advance();
                    return Ok(ElementValueSyntax::ClassLiteral(ty));
                }

                self.tokens.index = checkpoint;
                self.next_node = checkpoint_node;
                Ok(ElementValueSyntax::Name(self.parse_qualified_name()?))
            }

            _ => Ok(ElementValueSyntax::Literal(self.parse_literal()?)),
        }
    }

    fn parse_literal(&mut self) -> Result<Literal, CompilerError> {
        let negative = self.tokens.eat(&TokenKind::Minus);
        let literal = match self.kind().clone() {
            TokenKind::IntLiteral(value) => Literal::Int(if negative { -value } else { value }),
            TokenKind::LongLiteral(value) => Literal::Long(if negative { -value } else { value }),
            TokenKind::FloatLiteral(value) => Literal::Float(if negative { -value } else { value }),
            TokenKind::DoubleLiteral(value) => {
                Literal::Double(if negative { -value } else { value })
            }
            _ if negative => return Err(self.unexpected("a numeric literal after '-'")),
            TokenKind::BoolLiteral(value) => Literal::Boolean(value),
            TokenKind::CharLiteral(value) => Literal::Char(value),
            TokenKind::StringLiteral(value) => Literal::String(value),
            TokenKind::Null => Literal::Null,
            _ => return Err(self.unexpected("a literal")),
        };
        self.tokens.advance();
        Ok(literal)
    }

    /// -----------------------------
    /// STATEMENTS
    /// -----------------------------
    fn parse_block(&mut self) -> Result<Block, CompilerError> {
        self.expect(TokenKind::OpenCurly, "'{' to start a block")?;
        let mut statements = Vec::new();

        while !matches!(self.kind(), TokenKind::CloseCurly | TokenKind::Eof) {
            if self.tokens.eat(&TokenKind::Semicolon) {
                continue;
            }
            statements.push(self.parse_statement()?);
        }

        self.expect(TokenKind::CloseCurly, "'}' to close the block")?;
        Ok(Block { statements })
    }

    fn parse_statement(&mut self) -> Result<Statement, CompilerError> {
        let start = self.location();

        if self.tokens.eat(&TokenKind::Return) {
            let id = self.next_id();
            let value = if *self.kind() == TokenKind::Semicolon {
                None
            } else {
                Some(self.parse_expression()?)
            };
            self.expect(TokenKind::Semicolon, "';' after the return statement")?;
            return Ok(Statement::Return {
                id,
                value,
                location: start.to(self.tokens.previous_location()),
            });
        }

        if let Some(local) = self.try_parse_local()? {
            return Ok(Statement::Local(local));
        }

        let expression = self.parse_expression()?;
        self.expect(TokenKind::Semicolon, "';' after the expression")?;
        Ok(Statement::Expression(expression))
    }

    /// `Type name [= expr];`, or nothing if the statement turns out to be an expression
    fn try_parse_local(&mut self) -> Result<Option<LocalDecl>, CompilerError> {
        let start = self.location();
        self.tokens.eat(&TokenKind::Final);

        if !matches!(self.kind(), TokenKind::Primitive(_) | TokenKind::Identifier(_)) {
            return Ok(None);
        }

        let checkpoint = self.tokens.index;
        let checkpoint_node = self.next_node;
        let is_local = match self.parse_type() {
            Ok(_) => {
                matches!(self.kind(), TokenKind::Identifier(_))
                    && matches!(self.peek(1), TokenKind::Assign | TokenKind::Semicolon)
            }
            Err(_) => false,
        };
        self.tokens.index = checkpoint;
        self.next_node = checkpoint_node;

        if !is_local {
            return Ok(None);
        }

        let id = self.next_id();
        let ty = self.parse_type()?;
        let (name, _) = self.expect_identifier()?;
        let initializer = if self.tokens.eat(&TokenKind::Assign) {
            Some(self.parse_expression()?)
        } else {
            None
        };
        self.expect(TokenKind::Semicolon, "';' after the local variable")?;

        Ok(Some(LocalDecl {
            id,
            ty,
            name,
            initializer,
            location: start.to(self.tokens.previous_location()),
        }))
    }

    /// -----------------------------
    /// EXPRESSIONS
    /// -----------------------------
    fn parse_expression(&mut self) -> Result<Expr, CompilerError> {
        let mut expression = self.parse_primary()?;

        while *self.kind() == TokenKind::Dot {
            self.tokens.advance();
            let (name, _) = self.expect_identifier()?;

            let start = expression.location;
            let target = Box::new(expression);
            let kind = if *self.kind() == TokenKind::OpenParenthesis {
                ExprKind::Invoke {
                    target: Some(target),
                    name,
                    args: self.parse_arguments()?,
                }
            } else {
                ExprKind::FieldAccess { target, name }
            };

            let location = start.to(self.tokens.previous_location());
            expression = Expr {
                id: self.next_id(),
                kind,
                location,
            };
        }

        Ok(expression)
    }

    fn parse_primary(&mut self) -> Result<Expr, CompilerError> {
        let start = self.location();

        let kind = match self.kind().clone() {
            TokenKind::This => {
                self.tokens.advance();
                ExprKind::This
            }

            TokenKind::New => {
                self.tokens.advance();
                let class = self.parse_type()?;
                let args = self.parse_arguments()?;
                ExprKind::New { class, args }
            }

            TokenKind::OpenParenthesis => {
                self.tokens.advance();
                let inner = self.parse_expression()?;
                self.expect(TokenKind::CloseParenthesis, "')' to close the expression")?;
                ExprKind::Parenthesized(Box::new(inner))
            }

            TokenKind::Identifier(name) => {
                self.tokens.advance();
                if *self.kind() == TokenKind::OpenParenthesis {
                    let args = self.parse_arguments()?;
                    ExprKind::Invoke {
                        target: None,
                        name,
                        args,
                    }
                } else {
                    ExprKind::Name(name)
                }
            }

            _ => ExprKind::Literal(self.parse_literal()?),
        };

        Ok(Expr {
            id: self.next_id(),
            kind,
            location: start.to(self.tokens.previous_location()),
        })
    }

    fn parse_arguments(&mut self) -> Result<Vec<Expr>, CompilerError> {
        self.expect(TokenKind::OpenParenthesis, "'(' to start the arguments")?;
        let mut args = Vec::new();
        if self.tokens.eat(&TokenKind::CloseParenthesis) {
            return Ok(args);
        }

        loop {
            args.push(self.parse_expression()?);
            if !self.tokens.eat(&TokenKind::Comma) {
                break;
            }
        }

        self.expect(TokenKind::CloseParenthesis, "')' to close the arguments")?;
        Ok(args)
    }
}

#[cfg(test)]
#[path = "tests/parser_tests.rs"]
mod tests;
