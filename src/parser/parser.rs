//! Recursive descent parser for Java compilation units
//!
//! Converts the token stream into AST nodes. Parsing is all-or-nothing: the
//! first syntax error aborts the parse, since the transformation must never
//! emit output for input it could not fully understand.

use super::error::ParseError;
use super::lexer::{Lexer, LexicalToken, Token};
use crate::ast::*;
use crate::error::{Error, Result};

/// Parser for Java source
pub struct Parser {
    tokens: Vec<LexicalToken>,
    current: usize,
}

impl Parser {
    /// Create a new parser from source code
    pub fn new(source: &str) -> Result<Self> {
        let lexer = Lexer::new(source);
        let tokens = lexer.tokenize().map_err(|message| ParseError::LexicalError {
            message,
            location: Location::new(0, 0, 0),
        })?;

        Ok(Self { tokens, current: 0 })
    }

    /// Parse the source code into an AST
    pub fn parse(mut self) -> Result<Ast> {
        if self.tokens.is_empty() {
            let location = Location::new(1, 1, 0);
            return Ok(Ast {
                package_decl: None,
                imports: Vec::new(),
                type_decls: Vec::new(),
                span: Span::new(location, location),
            });
        }

        let start = self.current_span();

        let package_decl = if self.check(&Token::Package) {
            Some(self.parse_package_decl()?)
        } else {
            None
        };

        let mut imports = Vec::new();
        while self.check(&Token::Import) {
            imports.push(self.parse_import_decl()?);
        }

        let mut type_decls = Vec::new();
        while !self.is_at_end() {
            if self.match_token(&Token::Semicolon) {
                continue;
            }
            type_decls.push(self.parse_type_decl()?);
        }

        let span = self.span_from(start);

        Ok(Ast {
            package_decl,
            imports,
            type_decls,
            span,
        })
    }

    // Helper methods

    fn is_at_end(&self) -> bool {
        self.current >= self.tokens.len()
    }

    fn check(&self, token_type: &Token) -> bool {
        self.tokens
            .get(self.current)
            .map_or(false, |t| t.token_type() == token_type)
    }

    fn advance(&mut self) -> &LexicalToken {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous()
    }

    fn previous(&self) -> &LexicalToken {
        let idx = self.current.saturating_sub(1).min(self.tokens.len() - 1);
        &self.tokens[idx]
    }

    fn peek_token_type(&self, idx: usize) -> Option<&Token> {
        self.tokens.get(idx).map(|t| t.token_type())
    }

    fn eof_location(&self) -> Location {
        self.tokens
            .last()
            .map(|t| t.location())
            .unwrap_or_else(|| Location::new(1, 1, 0))
    }

    fn current_span(&self) -> Span {
        let location = if self.is_at_end() {
            self.eof_location()
        } else {
            self.tokens[self.current].location()
        };
        Span::new(location, location)
    }

    fn previous_span(&self) -> Span {
        if self.tokens.is_empty() {
            let location = Location::new(1, 1, 0);
            return Span::new(location, location);
        }
        let idx = self.current.saturating_sub(1).min(self.tokens.len() - 1);
        let location = self.tokens[idx].location();
        Span::new(location, location)
    }

    fn span_from(&self, start: Span) -> Span {
        Span::new(start.start, self.previous_span().end)
    }

    fn unexpected(&self, expected: &str) -> Error {
        if self.is_at_end() {
            ParseError::unexpected_end_of_input(expected, self.eof_location()).into()
        } else {
            let token = &self.tokens[self.current];
            ParseError::unexpected_token(
                expected,
                &format!("{:?}", token.token_type()),
                token.location(),
            )
            .into()
        }
    }

    fn consume(&mut self, token_type: &Token, expected: &str) -> Result<()> {
        if self.check(token_type) {
            self.advance();
            Ok(())
        } else {
            Err(self.unexpected(expected))
        }
    }

    fn match_token(&mut self, token_type: &Token) -> bool {
        if self.check(token_type) {
            self.advance();
            true
        } else {
            false
        }
    }

    // Names

    fn parse_identifier(&mut self) -> Result<String> {
        if self.check(&Token::Identifier) {
            let token = self.advance();
            Ok(token.lexeme().to_string())
        } else {
            Err(self.unexpected("identifier"))
        }
    }

    fn parse_qualified_name(&mut self) -> Result<String> {
        let mut name = self.parse_identifier()?;
        while self.check(&Token::Dot)
            && self.peek_token_type(self.current + 1) == Some(&Token::Identifier)
        {
            self.advance();
            name.push('.');
            name.push_str(&self.parse_identifier()?);
        }
        Ok(name)
    }

    // Package and import declarations

    fn parse_package_decl(&mut self) -> Result<PackageDecl> {
        let start = self.current_span();
        self.consume(&Token::Package, "'package'")?;
        let name = self.parse_qualified_name()?;
        self.consume(&Token::Semicolon, "';' after package declaration")?;
        Ok(PackageDecl {
            name,
            span: self.span_from(start),
        })
    }

    fn parse_import_decl(&mut self) -> Result<ImportDecl> {
        let start = self.current_span();
        self.consume(&Token::Import, "'import'")?;
        let is_static = self.match_token(&Token::Static);
        let mut name = self.parse_identifier()?;
        let mut is_wildcard = false;
        while self.match_token(&Token::Dot) {
            if self.match_token(&Token::Star) {
                is_wildcard = true;
                break;
            }
            name.push('.');
            name.push_str(&self.parse_identifier()?);
        }
        self.consume(&Token::Semicolon, "';' after import")?;
        Ok(ImportDecl {
            name,
            is_static,
            is_wildcard,
            span: self.span_from(start),
        })
    }

    // Modifiers and annotations

    fn peek_modifier(&self) -> Option<Modifier> {
        match self.peek_token_type(self.current)? {
            Token::Public => Some(Modifier::Public),
            Token::Protected => Some(Modifier::Protected),
            Token::Private => Some(Modifier::Private),
            Token::Abstract => Some(Modifier::Abstract),
            Token::Static => Some(Modifier::Static),
            Token::Final => Some(Modifier::Final),
            Token::Native => Some(Modifier::Native),
            Token::Synchronized => Some(Modifier::Synchronized),
            Token::Transient => Some(Modifier::Transient),
            Token::Volatile => Some(Modifier::Volatile),
            Token::Strictfp => Some(Modifier::Strictfp),
            Token::Default => Some(Modifier::Default),
            _ => None,
        }
    }

    fn parse_modifiers_and_annotations(&mut self) -> Result<(Vec<Modifier>, Vec<Annotation>)> {
        let mut modifiers = Vec::new();
        let mut annotations = Vec::new();
        loop {
            if self.check(&Token::At)
                && self.peek_token_type(self.current + 1) != Some(&Token::Interface)
            {
                annotations.push(self.parse_annotation()?);
                continue;
            }
            if let Some(modifier) = self.peek_modifier() {
                modifiers.push(modifier);
                self.advance();
                continue;
            }
            break;
        }
        Ok((modifiers, annotations))
    }

    fn parse_annotation(&mut self) -> Result<Annotation> {
        let start = self.current_span();
        self.consume(&Token::At, "'@'")?;
        let name = self.parse_qualified_name()?;
        let mut arguments = Vec::new();
        if self.match_token(&Token::LParen) {
            if !self.check(&Token::RParen) {
                loop {
                    arguments.push(self.parse_annotation_arg()?);
                    if !self.match_token(&Token::Comma) {
                        break;
                    }
                }
            }
            self.consume(&Token::RParen, "')' after annotation arguments")?;
        }
        Ok(Annotation {
            name,
            arguments,
            span: self.span_from(start),
        })
    }

    fn parse_annotation_arg(&mut self) -> Result<AnnotationArg> {
        if self.check(&Token::Identifier)
            && self.peek_token_type(self.current + 1) == Some(&Token::Assign)
        {
            let name = self.parse_identifier()?;
            self.advance();
            let value = self.parse_annotation_value()?;
            Ok(AnnotationArg::Named(name, value))
        } else {
            Ok(AnnotationArg::Value(self.parse_annotation_value()?))
        }
    }

    fn parse_annotation_value(&mut self) -> Result<Expr> {
        if self.check(&Token::LBrace) {
            self.parse_array_initializer()
        } else {
            self.parse_conditional_expr()
        }
    }

    // Type declarations

    fn parse_type_decl(&mut self) -> Result<TypeDecl> {
        let (modifiers, annotations) = self.parse_modifiers_and_annotations()?;
        self.parse_type_decl_after_modifiers(modifiers, annotations)
    }

    fn parse_type_decl_after_modifiers(
        &mut self,
        modifiers: Vec<Modifier>,
        annotations: Vec<Annotation>,
    ) -> Result<TypeDecl> {
        if self.check(&Token::Class) {
            Ok(TypeDecl::Class(self.parse_class_decl(modifiers, annotations)?))
        } else if self.check(&Token::Interface) {
            Ok(TypeDecl::Interface(
                self.parse_interface_decl(modifiers, annotations)?,
            ))
        } else if self.check(&Token::Enum) {
            Ok(TypeDecl::Enum(self.parse_enum_decl(modifiers, annotations)?))
        } else if self.check(&Token::At) {
            Ok(TypeDecl::Annotation(
                self.parse_annotation_decl(modifiers, annotations)?,
            ))
        } else {
            Err(self.unexpected("type declaration"))
        }
    }

    fn parse_class_decl(
        &mut self,
        modifiers: Vec<Modifier>,
        annotations: Vec<Annotation>,
    ) -> Result<ClassDecl> {
        let start = self.current_span();
        self.consume(&Token::Class, "'class'")?;
        let name = self.parse_identifier()?;
        let type_params = if self.check(&Token::Lt) {
            self.parse_type_params()?
        } else {
            Vec::new()
        };
        let extends = if self.match_token(&Token::Extends) {
            Some(self.parse_type_ref()?)
        } else {
            None
        };
        let implements = if self.match_token(&Token::Implements) {
            self.parse_type_list()?
        } else {
            Vec::new()
        };
        let body = self.parse_class_body()?;
        Ok(ClassDecl {
            modifiers,
            annotations,
            name,
            type_params,
            extends,
            implements,
            body,
            span: self.span_from(start),
        })
    }

    fn parse_interface_decl(
        &mut self,
        modifiers: Vec<Modifier>,
        annotations: Vec<Annotation>,
    ) -> Result<InterfaceDecl> {
        let start = self.current_span();
        self.consume(&Token::Interface, "'interface'")?;
        let name = self.parse_identifier()?;
        let type_params = if self.check(&Token::Lt) {
            self.parse_type_params()?
        } else {
            Vec::new()
        };
        let extends = if self.match_token(&Token::Extends) {
            self.parse_type_list()?
        } else {
            Vec::new()
        };
        self.consume(&Token::LBrace, "'{' to open interface body")?;
        let mut body = Vec::new();
        while !self.check(&Token::RBrace) && !self.is_at_end() {
            if self.match_token(&Token::Semicolon) {
                continue;
            }
            body.push(self.parse_interface_member()?);
        }
        self.consume(&Token::RBrace, "'}' to close interface body")?;
        Ok(InterfaceDecl {
            modifiers,
            annotations,
            name,
            type_params,
            extends,
            body,
            span: self.span_from(start),
        })
    }

    fn parse_enum_decl(
        &mut self,
        modifiers: Vec<Modifier>,
        annotations: Vec<Annotation>,
    ) -> Result<EnumDecl> {
        let start = self.current_span();
        self.consume(&Token::Enum, "'enum'")?;
        let name = self.parse_identifier()?;
        let implements = if self.match_token(&Token::Implements) {
            self.parse_type_list()?
        } else {
            Vec::new()
        };
        self.consume(&Token::LBrace, "'{' to open enum body")?;

        let mut constants = Vec::new();
        if !self.check(&Token::RBrace) && !self.check(&Token::Semicolon) {
            loop {
                constants.push(self.parse_enum_constant()?);
                if !self.match_token(&Token::Comma) {
                    break;
                }
                // trailing comma before ';' or '}'
                if self.check(&Token::Semicolon) || self.check(&Token::RBrace) {
                    break;
                }
            }
        }

        let mut body = Vec::new();
        if self.match_token(&Token::Semicolon) {
            while !self.check(&Token::RBrace) && !self.is_at_end() {
                if self.match_token(&Token::Semicolon) {
                    continue;
                }
                body.push(self.parse_class_member()?);
            }
        }
        self.consume(&Token::RBrace, "'}' to close enum body")?;
        Ok(EnumDecl {
            modifiers,
            annotations,
            name,
            implements,
            constants,
            body,
            span: self.span_from(start),
        })
    }

    fn parse_enum_constant(&mut self) -> Result<EnumConstant> {
        let start = self.current_span();
        let name = self.parse_identifier()?;
        let arguments = if self.match_token(&Token::LParen) {
            let args = if !self.check(&Token::RParen) {
                self.parse_argument_list()?
            } else {
                Vec::new()
            };
            self.consume(&Token::RParen, "')' after enum constant arguments")?;
            args
        } else {
            Vec::new()
        };
        let body = if self.check(&Token::LBrace) {
            Some(self.parse_class_body()?)
        } else {
            None
        };
        Ok(EnumConstant {
            name,
            arguments,
            body,
            span: self.span_from(start),
        })
    }

    fn parse_annotation_decl(
        &mut self,
        modifiers: Vec<Modifier>,
        annotations: Vec<Annotation>,
    ) -> Result<AnnotationDecl> {
        let start = self.current_span();
        self.consume(&Token::At, "'@'")?;
        self.consume(&Token::Interface, "'interface'")?;
        let name = self.parse_identifier()?;
        self.consume(&Token::LBrace, "'{' to open annotation body")?;
        let mut body = Vec::new();
        while !self.check(&Token::RBrace) && !self.is_at_end() {
            if self.match_token(&Token::Semicolon) {
                continue;
            }
            body.push(self.parse_annotation_member()?);
        }
        self.consume(&Token::RBrace, "'}' to close annotation body")?;
        Ok(AnnotationDecl {
            modifiers,
            annotations,
            name,
            body,
            span: self.span_from(start),
        })
    }

    fn parse_annotation_member(&mut self) -> Result<AnnotationMember> {
        let start = self.current_span();
        let _ = self.parse_modifiers_and_annotations()?;
        let type_ref = self.parse_type_ref()?;
        let name = self.parse_identifier()?;
        self.consume(&Token::LParen, "'(' after annotation member name")?;
        self.consume(&Token::RParen, "')' after annotation member name")?;
        let default_value = if self.match_token(&Token::Default) {
            Some(self.parse_annotation_value()?)
        } else {
            None
        };
        self.consume(&Token::Semicolon, "';' after annotation member")?;
        Ok(AnnotationMember {
            type_ref,
            name,
            default_value,
            span: self.span_from(start),
        })
    }

    // Class and interface members

    fn parse_class_body(&mut self) -> Result<Vec<ClassMember>> {
        self.consume(&Token::LBrace, "'{' to open class body")?;
        let mut members = Vec::new();
        while !self.check(&Token::RBrace) && !self.is_at_end() {
            if self.match_token(&Token::Semicolon) {
                continue;
            }
            members.push(self.parse_class_member()?);
        }
        self.consume(&Token::RBrace, "'}' to close class body")?;
        Ok(members)
    }

    fn parse_class_member(&mut self) -> Result<ClassMember> {
        let start = self.current_span();
        let (modifiers, annotations) = self.parse_modifiers_and_annotations()?;

        // Initializer block: static { ... } or { ... }
        if self.check(&Token::LBrace) {
            let body = self.parse_block()?;
            return Ok(ClassMember::Initializer(InitializerBlock {
                modifiers,
                body,
                span: self.span_from(start),
            }));
        }

        // Nested type declaration
        if self.check(&Token::Class)
            || self.check(&Token::Interface)
            || self.check(&Token::Enum)
            || self.check(&Token::At)
        {
            let type_decl = self.parse_type_decl_after_modifiers(modifiers, annotations)?;
            return Ok(ClassMember::Type(type_decl));
        }

        // Generic method: <T> T foo(...)
        if self.check(&Token::Lt) {
            let type_params = self.parse_type_params()?;
            let return_type = if self.match_token(&Token::Void) {
                None
            } else {
                Some(self.parse_type_ref()?)
            };
            let name = self.parse_identifier()?;
            let method =
                self.parse_method_rest(modifiers, annotations, type_params, return_type, name, start)?;
            return Ok(ClassMember::Method(method));
        }

        // Constructor: Identifier '('
        if self.check(&Token::Identifier)
            && self.peek_token_type(self.current + 1) == Some(&Token::LParen)
        {
            let name = self.parse_identifier()?;
            let parameters = self.parse_parameter_list()?;
            let throws = if self.match_token(&Token::Throws) {
                self.parse_type_list()?
            } else {
                Vec::new()
            };
            let body = self.parse_block()?;
            return Ok(ClassMember::Constructor(ConstructorDecl {
                modifiers,
                annotations,
                name,
                parameters,
                throws,
                body,
                span: self.span_from(start),
            }));
        }

        // void method
        if self.match_token(&Token::Void) {
            let name = self.parse_identifier()?;
            let method =
                self.parse_method_rest(modifiers, annotations, Vec::new(), None, name, start)?;
            return Ok(ClassMember::Method(method));
        }

        // Typed method or field
        let type_ref = self.parse_type_ref()?;
        let name = self.parse_identifier()?;
        if self.check(&Token::LParen) {
            let method = self.parse_method_rest(
                modifiers,
                annotations,
                Vec::new(),
                Some(type_ref),
                name,
                start,
            )?;
            Ok(ClassMember::Method(method))
        } else {
            let field = self.parse_field_rest(modifiers, annotations, type_ref, name, start)?;
            Ok(ClassMember::Field(field))
        }
    }

    fn parse_interface_member(&mut self) -> Result<InterfaceMember> {
        let start = self.current_span();
        let (modifiers, annotations) = self.parse_modifiers_and_annotations()?;

        if self.check(&Token::Class)
            || self.check(&Token::Interface)
            || self.check(&Token::Enum)
            || self.check(&Token::At)
        {
            let type_decl = self.parse_type_decl_after_modifiers(modifiers, annotations)?;
            return Ok(InterfaceMember::Type(type_decl));
        }

        if self.check(&Token::Lt) {
            let type_params = self.parse_type_params()?;
            let return_type = if self.match_token(&Token::Void) {
                None
            } else {
                Some(self.parse_type_ref()?)
            };
            let name = self.parse_identifier()?;
            let method =
                self.parse_method_rest(modifiers, annotations, type_params, return_type, name, start)?;
            return Ok(InterfaceMember::Method(method));
        }

        if self.match_token(&Token::Void) {
            let name = self.parse_identifier()?;
            let method =
                self.parse_method_rest(modifiers, annotations, Vec::new(), None, name, start)?;
            return Ok(InterfaceMember::Method(method));
        }

        let type_ref = self.parse_type_ref()?;
        let name = self.parse_identifier()?;
        if self.check(&Token::LParen) {
            let method = self.parse_method_rest(
                modifiers,
                annotations,
                Vec::new(),
                Some(type_ref),
                name,
                start,
            )?;
            Ok(InterfaceMember::Method(method))
        } else {
            let field = self.parse_field_rest(modifiers, annotations, type_ref, name, start)?;
            Ok(InterfaceMember::Field(field))
        }
    }

    fn parse_method_rest(
        &mut self,
        modifiers: Vec<Modifier>,
        annotations: Vec<Annotation>,
        type_params: Vec<TypeParam>,
        return_type: Option<TypeRef>,
        name: String,
        start: Span,
    ) -> Result<MethodDecl> {
        let parameters = self.parse_parameter_list()?;
        let throws = if self.match_token(&Token::Throws) {
            self.parse_type_list()?
        } else {
            Vec::new()
        };
        let body = if self.check(&Token::LBrace) {
            Some(self.parse_block()?)
        } else {
            self.consume(&Token::Semicolon, "';' or method body")?;
            None
        };
        Ok(MethodDecl {
            modifiers,
            annotations,
            type_params,
            return_type,
            name,
            parameters,
            throws,
            body,
            span: self.span_from(start),
        })
    }

    fn parse_field_rest(
        &mut self,
        modifiers: Vec<Modifier>,
        annotations: Vec<Annotation>,
        type_ref: TypeRef,
        first_name: String,
        start: Span,
    ) -> Result<FieldDecl> {
        let mut variables = vec![self.parse_declarator_rest(first_name)?];
        while self.match_token(&Token::Comma) {
            let name = self.parse_identifier()?;
            variables.push(self.parse_declarator_rest(name)?);
        }
        self.consume(&Token::Semicolon, "';' after field declaration")?;
        Ok(FieldDecl {
            modifiers,
            annotations,
            type_ref,
            variables,
            span: self.span_from(start),
        })
    }

    /// Parse the rest of one declarator after its name: array dims and an
    /// optional initializer.
    fn parse_declarator_rest(&mut self, name: String) -> Result<VariableDeclarator> {
        let start = self.previous_span();
        let mut array_dims = 0;
        while self.match_token(&Token::LBracket) {
            self.consume(&Token::RBracket, "']' after array dimension")?;
            array_dims += 1;
        }
        let initializer = if self.match_token(&Token::Assign) {
            Some(self.parse_variable_initializer()?)
        } else {
            None
        };
        Ok(VariableDeclarator {
            name,
            array_dims,
            initializer,
            span: self.span_from(start),
        })
    }

    fn parse_variable_initializer(&mut self) -> Result<Expr> {
        if self.check(&Token::LBrace) {
            self.parse_array_initializer()
        } else {
            self.parse_expression()
        }
    }

    fn parse_array_initializer(&mut self) -> Result<Expr> {
        let start = self.current_span();
        self.consume(&Token::LBrace, "'{' to open array initializer")?;
        let mut values = Vec::new();
        while !self.check(&Token::RBrace) {
            values.push(self.parse_variable_initializer()?);
            if !self.match_token(&Token::Comma) {
                break;
            }
        }
        self.consume(&Token::RBrace, "'}' to close array initializer")?;
        Ok(Expr::ArrayInitializer(values, self.span_from(start)))
    }

    fn parse_parameter_list(&mut self) -> Result<Vec<Parameter>> {
        self.consume(&Token::LParen, "'(' to open parameter list")?;
        let mut parameters = Vec::new();
        if !self.check(&Token::RParen) {
            loop {
                parameters.push(self.parse_parameter()?);
                if !self.match_token(&Token::Comma) {
                    break;
                }
            }
        }
        self.consume(&Token::RParen, "')' to close parameter list")?;
        Ok(parameters)
    }

    fn parse_parameter(&mut self) -> Result<Parameter> {
        let start = self.current_span();
        let (modifiers, annotations) = self.parse_modifiers_and_annotations()?;
        let mut type_ref = self.parse_type_ref()?;
        let varargs = self.match_token(&Token::Ellipsis);
        let name = self.parse_identifier()?;
        while self.match_token(&Token::LBracket) {
            self.consume(&Token::RBracket, "']' after array dimension")?;
            type_ref.array_dims += 1;
        }
        Ok(Parameter {
            modifiers,
            annotations,
            type_ref,
            name,
            varargs,
            span: self.span_from(start),
        })
    }

    // Types

    fn parse_type_params(&mut self) -> Result<Vec<TypeParam>> {
        self.consume(&Token::Lt, "'<' to open type parameters")?;
        let mut params = Vec::new();
        loop {
            let start = self.current_span();
            let name = self.parse_identifier()?;
            let bounds = if self.match_token(&Token::Extends) {
                let mut bounds = vec![self.parse_type_ref()?];
                while self.match_token(&Token::Amp) {
                    bounds.push(self.parse_type_ref()?);
                }
                bounds
            } else {
                Vec::new()
            };
            params.push(TypeParam {
                name,
                bounds,
                span: self.span_from(start),
            });
            if !self.match_token(&Token::Comma) {
                break;
            }
        }
        self.consume_generic_close("'>' after type parameters")?;
        Ok(params)
    }

    fn parse_type_ref(&mut self) -> Result<TypeRef> {
        let start = self.current_span();
        let name = {
            let token_type = self.peek_token_type(self.current).cloned();
            match token_type {
                Some(t) if t.is_primitive_type() => {
                    let token = self.advance();
                    token.lexeme().to_string()
                }
                Some(Token::Identifier) => self.parse_qualified_name()?,
                _ => return Err(self.unexpected("type")),
            }
        };

        let type_args = if self.check(&Token::Lt) {
            Some(self.parse_type_args()?)
        } else {
            None
        };

        let mut array_dims = 0;
        while self.check(&Token::LBracket)
            && self.peek_token_type(self.current + 1) == Some(&Token::RBracket)
        {
            self.advance();
            self.advance();
            array_dims += 1;
        }

        Ok(TypeRef {
            name,
            type_args,
            array_dims,
            span: self.span_from(start),
        })
    }

    fn parse_type_args(&mut self) -> Result<Vec<TypeArg>> {
        self.consume(&Token::Lt, "'<' to open type arguments")?;
        let mut args = Vec::new();

        // Diamond: <>
        if self.is_generic_close() {
            self.consume_generic_close("'>' to close type arguments")?;
            return Ok(args);
        }

        loop {
            if self.check(&Token::Question) {
                let start = self.current_span();
                self.advance();
                let bound = if self.match_token(&Token::Extends) {
                    Some((BoundKind::Extends, self.parse_type_ref()?))
                } else if self.match_token(&Token::Super) {
                    Some((BoundKind::Super, self.parse_type_ref()?))
                } else {
                    None
                };
                args.push(TypeArg::Wildcard(WildcardType {
                    bound,
                    span: self.span_from(start),
                }));
            } else {
                args.push(TypeArg::Type(self.parse_type_ref()?));
            }
            if !self.match_token(&Token::Comma) {
                break;
            }
        }
        self.consume_generic_close("'>' to close type arguments")?;
        Ok(args)
    }

    fn is_generic_close(&self) -> bool {
        matches!(
            self.peek_token_type(self.current),
            Some(Token::Gt) | Some(Token::RShift) | Some(Token::URShift)
        )
    }

    /// Consume one level of `>` closing a type-argument list. The lexer
    /// produces `>>` and `>>>` as shift tokens; closing nested generics
    /// peels them one `>` at a time by shrinking the token in place.
    fn consume_generic_close(&mut self, expected: &str) -> Result<()> {
        let token_type = self.peek_token_type(self.current).cloned();
        match token_type {
            Some(Token::Gt) => {
                self.advance();
                Ok(())
            }
            Some(Token::RShift) => {
                let location = self.tokens[self.current].location();
                self.tokens[self.current] =
                    LexicalToken::new(Token::Gt, ">".to_string(), location);
                Ok(())
            }
            Some(Token::URShift) => {
                let location = self.tokens[self.current].location();
                self.tokens[self.current] =
                    LexicalToken::new(Token::RShift, ">>".to_string(), location);
                Ok(())
            }
            _ => Err(self.unexpected(expected)),
        }
    }

    fn parse_type_list(&mut self) -> Result<Vec<TypeRef>> {
        let mut types = vec![self.parse_type_ref()?];
        while self.match_token(&Token::Comma) {
            types.push(self.parse_type_ref()?);
        }
        Ok(types)
    }

    // Statements

    fn parse_block(&mut self) -> Result<Block> {
        let start = self.current_span();
        self.consume(&Token::LBrace, "'{' to open block")?;
        let mut statements = Vec::new();
        while !self.check(&Token::RBrace) && !self.is_at_end() {
            statements.push(self.parse_statement()?);
        }
        self.consume(&Token::RBrace, "'}' to close block")?;
        Ok(Block {
            statements,
            span: self.span_from(start),
        })
    }

    fn parse_statement(&mut self) -> Result<Stmt> {
        if self.is_at_end() {
            return Err(self.unexpected("statement"));
        }

        if self.check(&Token::LBrace) {
            return Ok(Stmt::Block(self.parse_block()?));
        }
        if self.match_token(&Token::Semicolon) {
            return Ok(Stmt::Empty);
        }
        if self.check(&Token::If) {
            return self.parse_if_stmt();
        }
        if self.check(&Token::While) {
            return self.parse_while_stmt();
        }
        if self.check(&Token::Do) {
            return self.parse_do_while_stmt();
        }
        if self.check(&Token::For) {
            return self.parse_for_stmt();
        }
        if self.check(&Token::Switch) {
            return self.parse_switch_stmt();
        }
        if self.check(&Token::Try) {
            return self.parse_try_stmt();
        }
        if self.check(&Token::Return) {
            let start = self.current_span();
            self.advance();
            let value = if !self.check(&Token::Semicolon) {
                Some(self.parse_expression()?)
            } else {
                None
            };
            self.consume(&Token::Semicolon, "';' after return")?;
            return Ok(Stmt::Return(ReturnStmt {
                value,
                span: self.span_from(start),
            }));
        }
        if self.check(&Token::Break) {
            let start = self.current_span();
            self.advance();
            let label = if self.check(&Token::Identifier) {
                Some(self.parse_identifier()?)
            } else {
                None
            };
            self.consume(&Token::Semicolon, "';' after break")?;
            return Ok(Stmt::Break(BreakStmt {
                label,
                span: self.span_from(start),
            }));
        }
        if self.check(&Token::Continue) {
            let start = self.current_span();
            self.advance();
            let label = if self.check(&Token::Identifier) {
                Some(self.parse_identifier()?)
            } else {
                None
            };
            self.consume(&Token::Semicolon, "';' after continue")?;
            return Ok(Stmt::Continue(ContinueStmt {
                label,
                span: self.span_from(start),
            }));
        }
        if self.check(&Token::Throw) {
            let start = self.current_span();
            self.advance();
            let expr = self.parse_expression()?;
            self.consume(&Token::Semicolon, "';' after throw")?;
            return Ok(Stmt::Throw(ThrowStmt {
                expr,
                span: self.span_from(start),
            }));
        }
        if self.check(&Token::Assert) {
            let start = self.current_span();
            self.advance();
            let condition = self.parse_expression()?;
            let message = if self.match_token(&Token::Colon) {
                Some(self.parse_expression()?)
            } else {
                None
            };
            self.consume(&Token::Semicolon, "';' after assert")?;
            return Ok(Stmt::Assert(AssertStmt {
                condition,
                message,
                span: self.span_from(start),
            }));
        }
        if self.check(&Token::Synchronized) {
            let start = self.current_span();
            self.advance();
            self.consume(&Token::LParen, "'(' after 'synchronized'")?;
            let lock = self.parse_expression()?;
            self.consume(&Token::RParen, "')' after lock expression")?;
            let body = self.parse_block()?;
            return Ok(Stmt::Synchronized(SynchronizedStmt {
                lock,
                body,
                span: self.span_from(start),
            }));
        }

        // Labeled statement: name ':' statement
        if self.check(&Token::Identifier)
            && self.peek_token_type(self.current + 1) == Some(&Token::Colon)
        {
            let start = self.current_span();
            let label = self.parse_identifier()?;
            self.advance();
            let statement = Box::new(self.parse_statement()?);
            return Ok(Stmt::Labeled(LabeledStmt {
                label,
                statement,
                span: self.span_from(start),
            }));
        }

        // Local class/interface/enum declaration
        if self.looks_like_local_type_decl() {
            return Ok(Stmt::TypeDecl(self.parse_type_decl()?));
        }

        // Local variable declaration
        if self.looks_like_local_var_decl() {
            let declaration = self.parse_var_decl()?;
            self.consume(&Token::Semicolon, "';' after variable declaration")?;
            return Ok(Stmt::Declaration(declaration));
        }

        // Expression statement
        let start = self.current_span();
        let expr = self.parse_expression()?;
        self.consume(&Token::Semicolon, "';' after expression")?;
        Ok(Stmt::Expression(ExprStmt {
            expr,
            span: self.span_from(start),
        }))
    }

    fn parse_var_decl(&mut self) -> Result<VarDeclStmt> {
        let start = self.current_span();
        let (modifiers, annotations) = self.parse_modifiers_and_annotations()?;
        let type_ref = self.parse_type_ref()?;
        let mut variables = Vec::new();
        loop {
            let name = self.parse_identifier()?;
            variables.push(self.parse_declarator_rest(name)?);
            if !self.match_token(&Token::Comma) {
                break;
            }
        }
        Ok(VarDeclStmt {
            modifiers,
            annotations,
            type_ref,
            variables,
            span: self.span_from(start),
        })
    }

    fn parse_if_stmt(&mut self) -> Result<Stmt> {
        let start = self.current_span();
        self.consume(&Token::If, "'if'")?;
        self.consume(&Token::LParen, "'(' after 'if'")?;
        let condition = self.parse_expression()?;
        self.consume(&Token::RParen, "')' after condition")?;
        let then_branch = Box::new(self.parse_statement()?);
        let else_branch = if self.match_token(&Token::Else) {
            Some(Box::new(self.parse_statement()?))
        } else {
            None
        };
        Ok(Stmt::If(IfStmt {
            condition,
            then_branch,
            else_branch,
            span: self.span_from(start),
        }))
    }

    fn parse_while_stmt(&mut self) -> Result<Stmt> {
        let start = self.current_span();
        self.consume(&Token::While, "'while'")?;
        self.consume(&Token::LParen, "'(' after 'while'")?;
        let condition = self.parse_expression()?;
        self.consume(&Token::RParen, "')' after condition")?;
        let body = Box::new(self.parse_statement()?);
        Ok(Stmt::While(WhileStmt {
            condition,
            body,
            span: self.span_from(start),
        }))
    }

    fn parse_do_while_stmt(&mut self) -> Result<Stmt> {
        let start = self.current_span();
        self.consume(&Token::Do, "'do'")?;
        let body = Box::new(self.parse_statement()?);
        self.consume(&Token::While, "'while' after do body")?;
        self.consume(&Token::LParen, "'(' after 'while'")?;
        let condition = self.parse_expression()?;
        self.consume(&Token::RParen, "')' after condition")?;
        self.consume(&Token::Semicolon, "';' after do-while")?;
        Ok(Stmt::DoWhile(DoWhileStmt {
            body,
            condition,
            span: self.span_from(start),
        }))
    }

    fn parse_for_stmt(&mut self) -> Result<Stmt> {
        let start = self.current_span();
        self.consume(&Token::For, "'for'")?;
        self.consume(&Token::LParen, "'(' after 'for'")?;

        if self.looks_like_for_each() {
            let (modifiers, annotations) = self.parse_modifiers_and_annotations()?;
            let type_ref = self.parse_type_ref()?;
            let name = self.parse_identifier()?;
            self.consume(&Token::Colon, "':' in enhanced for")?;
            let iterable = self.parse_expression()?;
            self.consume(&Token::RParen, "')' after enhanced for header")?;
            let body = Box::new(self.parse_statement()?);
            return Ok(Stmt::ForEach(ForEachStmt {
                modifiers,
                annotations,
                type_ref,
                name,
                iterable,
                body,
                span: self.span_from(start),
            }));
        }

        let mut init = Vec::new();
        if !self.check(&Token::Semicolon) {
            if self.looks_like_local_var_decl() {
                init.push(Stmt::Declaration(self.parse_var_decl()?));
            } else {
                loop {
                    let expr_start = self.current_span();
                    let expr = self.parse_expression()?;
                    init.push(Stmt::Expression(ExprStmt {
                        expr,
                        span: self.span_from(expr_start),
                    }));
                    if !self.match_token(&Token::Comma) {
                        break;
                    }
                }
            }
        }
        self.consume(&Token::Semicolon, "';' after for initializer")?;

        let condition = if !self.check(&Token::Semicolon) {
            Some(self.parse_expression()?)
        } else {
            None
        };
        self.consume(&Token::Semicolon, "';' after for condition")?;

        let mut update = Vec::new();
        if !self.check(&Token::RParen) {
            loop {
                let expr_start = self.current_span();
                let expr = self.parse_expression()?;
                update.push(ExprStmt {
                    expr,
                    span: self.span_from(expr_start),
                });
                if !self.match_token(&Token::Comma) {
                    break;
                }
            }
        }
        self.consume(&Token::RParen, "')' after for header")?;
        let body = Box::new(self.parse_statement()?);
        Ok(Stmt::For(ForStmt {
            init,
            condition,
            update,
            body,
            span: self.span_from(start),
        }))
    }

    fn parse_switch_stmt(&mut self) -> Result<Stmt> {
        let start = self.current_span();
        self.consume(&Token::Switch, "'switch'")?;
        self.consume(&Token::LParen, "'(' after 'switch'")?;
        let expression = self.parse_expression()?;
        self.consume(&Token::RParen, "')' after switch expression")?;
        self.consume(&Token::LBrace, "'{' to open switch body")?;

        let mut cases = Vec::new();
        while !self.check(&Token::RBrace) && !self.is_at_end() {
            let case_start = self.current_span();
            let mut labels = Vec::new();
            let mut is_default = false;
            loop {
                if self.match_token(&Token::Case) {
                    labels.push(self.parse_expression()?);
                    self.consume(&Token::Colon, "':' after case label")?;
                } else if self.match_token(&Token::Default) {
                    is_default = true;
                    self.consume(&Token::Colon, "':' after 'default'")?;
                } else {
                    break;
                }
            }
            if labels.is_empty() && !is_default {
                return Err(self.unexpected("'case' or 'default'"));
            }

            let mut statements = Vec::new();
            while !self.check(&Token::Case)
                && !self.check(&Token::Default)
                && !self.check(&Token::RBrace)
                && !self.is_at_end()
            {
                statements.push(self.parse_statement()?);
            }

            let span = self.span_from(case_start);
            if is_default {
                // default shares the group: keep any explicit labels as an
                // empty fall-through case, then the default itself
                if !labels.is_empty() {
                    cases.push(SwitchCase {
                        labels,
                        statements: Vec::new(),
                        span,
                    });
                }
                cases.push(SwitchCase {
                    labels: Vec::new(),
                    statements,
                    span,
                });
            } else {
                cases.push(SwitchCase {
                    labels,
                    statements,
                    span,
                });
            }
        }
        self.consume(&Token::RBrace, "'}' to close switch body")?;
        Ok(Stmt::Switch(SwitchStmt {
            expression,
            cases,
            span: self.span_from(start),
        }))
    }

    fn parse_try_stmt(&mut self) -> Result<Stmt> {
        let start = self.current_span();
        self.consume(&Token::Try, "'try'")?;

        let mut resources = Vec::new();
        if self.match_token(&Token::LParen) {
            loop {
                if self.check(&Token::RParen) {
                    break;
                }
                resources.push(self.parse_try_resource()?);
                if !self.match_token(&Token::Semicolon) {
                    break;
                }
            }
            self.consume(&Token::RParen, "')' after resources")?;
        }

        let try_block = self.parse_block()?;

        let mut catch_clauses = Vec::new();
        while self.check(&Token::Catch) {
            catch_clauses.push(self.parse_catch_clause()?);
        }

        let finally_block = if self.match_token(&Token::Finally) {
            Some(self.parse_block()?)
        } else {
            None
        };

        if resources.is_empty() && catch_clauses.is_empty() && finally_block.is_none() {
            return Err(ParseError::invalid_syntax(
                "try statement requires catch, finally, or resources",
                start.start,
            )
            .into());
        }

        Ok(Stmt::Try(TryStmt {
            resources,
            try_block,
            catch_clauses,
            finally_block,
            span: self.span_from(start),
        }))
    }

    fn parse_try_resource(&mut self) -> Result<TryResource> {
        let start = self.current_span();
        if self.looks_like_local_var_decl() {
            let (modifiers, _annotations) = self.parse_modifiers_and_annotations()?;
            let type_ref = self.parse_type_ref()?;
            let name = self.parse_identifier()?;
            self.consume(&Token::Assign, "'=' in resource declaration")?;
            let initializer = self.parse_expression()?;
            Ok(TryResource::Var {
                modifiers,
                type_ref,
                name,
                initializer,
                span: self.span_from(start),
            })
        } else {
            let expr = self.parse_expression()?;
            Ok(TryResource::Expr {
                expr,
                span: self.span_from(start),
            })
        }
    }

    fn parse_catch_clause(&mut self) -> Result<CatchClause> {
        let start = self.current_span();
        self.consume(&Token::Catch, "'catch'")?;
        self.consume(&Token::LParen, "'(' after 'catch'")?;
        let param_start = self.current_span();
        let (modifiers, annotations) = self.parse_modifiers_and_annotations()?;
        let type_ref = self.parse_type_ref()?;
        let mut alt_types = Vec::new();
        while self.match_token(&Token::Pipe) {
            alt_types.push(self.parse_type_ref()?);
        }
        let name = self.parse_identifier()?;
        let parameter = Parameter {
            modifiers,
            annotations,
            type_ref,
            name,
            varargs: false,
            span: self.span_from(param_start),
        };
        self.consume(&Token::RParen, "')' after catch parameter")?;
        let block = self.parse_block()?;
        Ok(CatchClause {
            parameter,
            alt_types,
            block,
            span: self.span_from(start),
        })
    }

    // Statement lookahead

    /// Skip annotations and modifier keywords starting at token index `i`,
    /// without consuming. Returns the index after them, or `None` when the
    /// shape cannot be a declaration prefix.
    fn skip_annotations_and_modifiers(&self, mut i: usize) -> Option<usize> {
        loop {
            match self.peek_token_type(i) {
                Some(Token::At) => {
                    if self.peek_token_type(i + 1) == Some(&Token::Interface) {
                        return Some(i);
                    }
                    if self.peek_token_type(i + 1) != Some(&Token::Identifier) {
                        return None;
                    }
                    i += 2;
                    while self.peek_token_type(i) == Some(&Token::Dot) {
                        if self.peek_token_type(i + 1) != Some(&Token::Identifier) {
                            return None;
                        }
                        i += 2;
                    }
                    if self.peek_token_type(i) == Some(&Token::LParen) {
                        let mut depth = 0usize;
                        loop {
                            match self.peek_token_type(i) {
                                Some(Token::LParen) => {
                                    depth += 1;
                                    i += 1;
                                }
                                Some(Token::RParen) => {
                                    depth -= 1;
                                    i += 1;
                                    if depth == 0 {
                                        break;
                                    }
                                }
                                Some(_) => {
                                    i += 1;
                                }
                                None => return None,
                            }
                        }
                    }
                }
                Some(t) if t.is_modifier() => {
                    i += 1;
                }
                _ => return Some(i),
            }
        }
    }

    /// Lookahead: match a type reference starting at `*i` without consuming
    /// tokens, advancing `*i` past it on success.
    fn lookahead_type_ref(&self, i: &mut usize) -> bool {
        match self.peek_token_type(*i) {
            Some(t) if t.is_primitive_type() => {
                *i += 1;
            }
            Some(Token::Identifier) => {
                *i += 1;
                while self.peek_token_type(*i) == Some(&Token::Dot) {
                    if self.peek_token_type(*i + 1) != Some(&Token::Identifier) {
                        return false;
                    }
                    *i += 2;
                }
            }
            _ => return false,
        }

        // Type arguments: only accept tokens that can occur inside them, so
        // that comparison chains like `a < b && c > d` fall back to
        // expression parsing.
        if self.peek_token_type(*i) == Some(&Token::Lt) {
            let mut depth: isize = 0;
            loop {
                match self.peek_token_type(*i) {
                    Some(Token::Lt) => depth += 1,
                    Some(Token::Gt) => depth -= 1,
                    Some(Token::RShift) => depth -= 2,
                    Some(Token::URShift) => depth -= 3,
                    Some(Token::Identifier)
                    | Some(Token::Dot)
                    | Some(Token::Comma)
                    | Some(Token::Question)
                    | Some(Token::Extends)
                    | Some(Token::Super)
                    | Some(Token::LBracket)
                    | Some(Token::RBracket) => {}
                    Some(t) if t.is_primitive_type() => {}
                    _ => return false,
                }
                *i += 1;
                if depth <= 0 {
                    break;
                }
            }
        }

        while self.peek_token_type(*i) == Some(&Token::LBracket) {
            if self.peek_token_type(*i + 1) != Some(&Token::RBracket) {
                return false;
            }
            *i += 2;
        }
        true
    }

    fn looks_like_local_type_decl(&self) -> bool {
        match self.skip_annotations_and_modifiers(self.current) {
            Some(i) => matches!(
                self.peek_token_type(i),
                Some(Token::Class) | Some(Token::Interface) | Some(Token::Enum)
            ),
            None => false,
        }
    }

    fn looks_like_local_var_decl(&self) -> bool {
        let mut i = match self.skip_annotations_and_modifiers(self.current) {
            Some(i) => i,
            None => return false,
        };
        if !self.lookahead_type_ref(&mut i) {
            return false;
        }
        self.peek_token_type(i) == Some(&Token::Identifier)
    }

    fn looks_like_for_each(&self) -> bool {
        let mut i = match self.skip_annotations_and_modifiers(self.current) {
            Some(i) => i,
            None => return false,
        };
        if !self.lookahead_type_ref(&mut i) {
            return false;
        }
        if self.peek_token_type(i) != Some(&Token::Identifier) {
            return false;
        }
        self.peek_token_type(i + 1) == Some(&Token::Colon)
    }

    // Expressions

    fn parse_expression(&mut self) -> Result<Expr> {
        self.parse_assignment_expr()
    }

    fn parse_assignment_expr(&mut self) -> Result<Expr> {
        if let Some(lambda) = self.try_parse_lambda()? {
            return Ok(lambda);
        }
        let start = self.current_span();
        let left = self.parse_conditional_expr()?;
        if let Some(operator) = self.peek_assignment_op() {
            self.advance();
            let value = self.parse_assignment_expr()?;
            return Ok(Expr::Assignment(AssignmentExpr {
                target: Box::new(left),
                operator,
                value: Box::new(value),
                span: self.span_from(start),
            }));
        }
        Ok(left)
    }

    fn peek_assignment_op(&self) -> Option<AssignmentOp> {
        match self.peek_token_type(self.current)? {
            Token::Assign => Some(AssignmentOp::Assign),
            Token::AddAssign => Some(AssignmentOp::AddAssign),
            Token::SubAssign => Some(AssignmentOp::SubAssign),
            Token::MulAssign => Some(AssignmentOp::MulAssign),
            Token::DivAssign => Some(AssignmentOp::DivAssign),
            Token::ModAssign => Some(AssignmentOp::ModAssign),
            Token::AndAssign => Some(AssignmentOp::AndAssign),
            Token::OrAssign => Some(AssignmentOp::OrAssign),
            Token::XorAssign => Some(AssignmentOp::XorAssign),
            Token::LShiftAssign => Some(AssignmentOp::LShiftAssign),
            Token::RShiftAssign => Some(AssignmentOp::RShiftAssign),
            Token::URShiftAssign => Some(AssignmentOp::URShiftAssign),
            _ => None,
        }
    }

    fn try_parse_lambda(&mut self) -> Result<Option<Expr>> {
        // Single untyped parameter: x -> ...
        if self.check(&Token::Identifier)
            && self.peek_token_type(self.current + 1) == Some(&Token::Arrow)
        {
            let start = self.current_span();
            let name = self.parse_identifier()?;
            let param_span = self.previous_span();
            self.consume(&Token::Arrow, "'->'")?;
            let body = self.parse_lambda_body()?;
            return Ok(Some(Expr::Lambda(LambdaExpr {
                parameters: vec![LambdaParameter {
                    type_ref: None,
                    name,
                    span: param_span,
                }],
                body,
                span: self.span_from(start),
            })));
        }
        // Parenthesized parameter list: (...) -> ...
        if self.check(&Token::LParen) {
            if let Some(after) = self.scan_matching_paren(self.current) {
                if self.peek_token_type(after) == Some(&Token::Arrow) {
                    return Ok(Some(self.parse_paren_lambda()?));
                }
            }
        }
        Ok(None)
    }

    fn scan_matching_paren(&self, open: usize) -> Option<usize> {
        let mut depth = 0usize;
        let mut i = open;
        loop {
            match self.peek_token_type(i) {
                Some(Token::LParen) => depth += 1,
                Some(Token::RParen) => {
                    depth = depth.checked_sub(1)?;
                    if depth == 0 {
                        return Some(i + 1);
                    }
                }
                None => return None,
                Some(_) => {}
            }
            i += 1;
        }
    }

    fn parse_paren_lambda(&mut self) -> Result<Expr> {
        let start = self.current_span();
        self.consume(&Token::LParen, "'(' to open lambda parameters")?;
        let mut parameters = Vec::new();
        if !self.check(&Token::RParen) {
            loop {
                let param_start = self.current_span();
                if self.check(&Token::Identifier)
                    && matches!(
                        self.peek_token_type(self.current + 1),
                        Some(&Token::Comma) | Some(&Token::RParen)
                    )
                {
                    let name = self.parse_identifier()?;
                    parameters.push(LambdaParameter {
                        type_ref: None,
                        name,
                        span: self.span_from(param_start),
                    });
                } else {
                    let _ = self.parse_modifiers_and_annotations()?;
                    let type_ref = self.parse_type_ref()?;
                    let name = self.parse_identifier()?;
                    parameters.push(LambdaParameter {
                        type_ref: Some(type_ref),
                        name,
                        span: self.span_from(param_start),
                    });
                }
                if !self.match_token(&Token::Comma) {
                    break;
                }
            }
        }
        self.consume(&Token::RParen, "')' after lambda parameters")?;
        self.consume(&Token::Arrow, "'->'")?;
        let body = self.parse_lambda_body()?;
        Ok(Expr::Lambda(LambdaExpr {
            parameters,
            body,
            span: self.span_from(start),
        }))
    }

    fn parse_lambda_body(&mut self) -> Result<LambdaBody> {
        if self.check(&Token::LBrace) {
            Ok(LambdaBody::Block(self.parse_block()?))
        } else {
            Ok(LambdaBody::Expression(Box::new(self.parse_expression()?)))
        }
    }

    fn parse_conditional_expr(&mut self) -> Result<Expr> {
        let start = self.current_span();
        let condition = self.parse_logical_or_expr()?;
        if self.match_token(&Token::Question) {
            let then_expr = self.parse_expression()?;
            self.consume(&Token::Colon, "':' in conditional expression")?;
            let else_expr = self.parse_assignment_expr()?;
            return Ok(Expr::Conditional(ConditionalExpr {
                condition: Box::new(condition),
                then_expr: Box::new(then_expr),
                else_expr: Box::new(else_expr),
                span: self.span_from(start),
            }));
        }
        Ok(condition)
    }

    fn binary(&self, left: Expr, operator: BinaryOp, right: Expr, start: Span) -> Expr {
        Expr::Binary(BinaryExpr {
            left: Box::new(left),
            operator,
            right: Box::new(right),
            span: self.span_from(start),
        })
    }

    fn parse_logical_or_expr(&mut self) -> Result<Expr> {
        let start = self.current_span();
        let mut expr = self.parse_logical_and_expr()?;
        while self.match_token(&Token::PipePipe) {
            let right = self.parse_logical_and_expr()?;
            expr = self.binary(expr, BinaryOp::LogicalOr, right, start);
        }
        Ok(expr)
    }

    fn parse_logical_and_expr(&mut self) -> Result<Expr> {
        let start = self.current_span();
        let mut expr = self.parse_bit_or_expr()?;
        while self.match_token(&Token::AndAnd) {
            let right = self.parse_bit_or_expr()?;
            expr = self.binary(expr, BinaryOp::LogicalAnd, right, start);
        }
        Ok(expr)
    }

    fn parse_bit_or_expr(&mut self) -> Result<Expr> {
        let start = self.current_span();
        let mut expr = self.parse_bit_xor_expr()?;
        while self.match_token(&Token::Pipe) {
            let right = self.parse_bit_xor_expr()?;
            expr = self.binary(expr, BinaryOp::Or, right, start);
        }
        Ok(expr)
    }

    fn parse_bit_xor_expr(&mut self) -> Result<Expr> {
        let start = self.current_span();
        let mut expr = self.parse_bit_and_expr()?;
        while self.match_token(&Token::Caret) {
            let right = self.parse_bit_and_expr()?;
            expr = self.binary(expr, BinaryOp::Xor, right, start);
        }
        Ok(expr)
    }

    fn parse_bit_and_expr(&mut self) -> Result<Expr> {
        let start = self.current_span();
        let mut expr = self.parse_equality_expr()?;
        while self.match_token(&Token::Amp) {
            let right = self.parse_equality_expr()?;
            expr = self.binary(expr, BinaryOp::And, right, start);
        }
        Ok(expr)
    }

    fn parse_equality_expr(&mut self) -> Result<Expr> {
        let start = self.current_span();
        let mut expr = self.parse_relational_expr()?;
        loop {
            let operator = match self.peek_token_type(self.current) {
                Some(Token::Eq) => BinaryOp::Eq,
                Some(Token::Ne) => BinaryOp::Ne,
                _ => break,
            };
            self.advance();
            let right = self.parse_relational_expr()?;
            expr = self.binary(expr, operator, right, start);
        }
        Ok(expr)
    }

    fn parse_relational_expr(&mut self) -> Result<Expr> {
        let start = self.current_span();
        let mut expr = self.parse_shift_expr()?;
        loop {
            let operator = match self.peek_token_type(self.current) {
                Some(Token::Lt) => Some(BinaryOp::Lt),
                Some(Token::Le) => Some(BinaryOp::Le),
                Some(Token::Gt) => Some(BinaryOp::Gt),
                Some(Token::Ge) => Some(BinaryOp::Ge),
                _ => None,
            };
            if let Some(operator) = operator {
                self.advance();
                let right = self.parse_shift_expr()?;
                expr = self.binary(expr, operator, right, start);
            } else if self.match_token(&Token::InstanceOf) {
                let target_type = self.parse_type_ref()?;
                expr = Expr::InstanceOf(InstanceOfExpr {
                    expr: Box::new(expr),
                    target_type,
                    span: self.span_from(start),
                });
            } else {
                break;
            }
        }
        Ok(expr)
    }

    fn parse_shift_expr(&mut self) -> Result<Expr> {
        let start = self.current_span();
        let mut expr = self.parse_additive_expr()?;
        loop {
            let operator = match self.peek_token_type(self.current) {
                Some(Token::LShift) => BinaryOp::LShift,
                Some(Token::RShift) => BinaryOp::RShift,
                Some(Token::URShift) => BinaryOp::URShift,
                _ => break,
            };
            self.advance();
            let right = self.parse_additive_expr()?;
            expr = self.binary(expr, operator, right, start);
        }
        Ok(expr)
    }

    fn parse_additive_expr(&mut self) -> Result<Expr> {
        let start = self.current_span();
        let mut expr = self.parse_multiplicative_expr()?;
        loop {
            let operator = match self.peek_token_type(self.current) {
                Some(Token::Plus) => BinaryOp::Add,
                Some(Token::Minus) => BinaryOp::Sub,
                _ => break,
            };
            self.advance();
            let right = self.parse_multiplicative_expr()?;
            expr = self.binary(expr, operator, right, start);
        }
        Ok(expr)
    }

    fn parse_multiplicative_expr(&mut self) -> Result<Expr> {
        let start = self.current_span();
        let mut expr = self.parse_unary_expr()?;
        loop {
            let operator = match self.peek_token_type(self.current) {
                Some(Token::Star) => BinaryOp::Mul,
                Some(Token::Slash) => BinaryOp::Div,
                Some(Token::Percent) => BinaryOp::Mod,
                _ => break,
            };
            self.advance();
            let right = self.parse_unary_expr()?;
            expr = self.binary(expr, operator, right, start);
        }
        Ok(expr)
    }

    fn parse_unary_expr(&mut self) -> Result<Expr> {
        // A cast operand can itself be a lambda: (Runnable) () -> {}
        if let Some(lambda) = self.try_parse_lambda()? {
            return Ok(lambda);
        }

        let start = self.current_span();
        let prefix = match self.peek_token_type(self.current) {
            Some(Token::Inc) => Some(UnaryOp::PreInc),
            Some(Token::Dec) => Some(UnaryOp::PreDec),
            Some(Token::Plus) => Some(UnaryOp::Plus),
            Some(Token::Minus) => Some(UnaryOp::Minus),
            Some(Token::Bang) => Some(UnaryOp::Not),
            Some(Token::Tilde) => Some(UnaryOp::BitNot),
            _ => None,
        };
        if let Some(operator) = prefix {
            self.advance();
            let operand = self.parse_unary_expr()?;
            return Ok(Expr::Unary(UnaryExpr {
                operator,
                operand: Box::new(operand),
                span: self.span_from(start),
            }));
        }

        if self.check(&Token::LParen) {
            if let Some(cast) = self.try_parse_cast()? {
                return Ok(cast);
            }
        }

        self.parse_postfix_expr()
    }

    /// Disambiguate `(T) x` from `(x)`: speculatively parse a type between
    /// the parentheses, then require a token that can start a cast operand.
    /// A reference cast followed by `+`/`-` is really arithmetic on a
    /// parenthesized expression, so those only pass for primitive casts.
    fn try_parse_cast(&mut self) -> Result<Option<Expr>> {
        let saved = self.current;
        let start = self.current_span();
        self.advance();

        let target_type = match self.parse_type_ref() {
            Ok(type_ref) => type_ref,
            Err(_) => {
                self.current = saved;
                return Ok(None);
            }
        };
        if !self.match_token(&Token::RParen) {
            self.current = saved;
            return Ok(None);
        }

        let primitive =
            crate::consts::is_primitive(&target_type.name) && target_type.array_dims == 0;
        if !self.cast_operand_follows(primitive) {
            self.current = saved;
            return Ok(None);
        }

        let operand = self.parse_unary_expr()?;
        Ok(Some(Expr::Cast(CastExpr {
            target_type,
            expr: Box::new(operand),
            span: self.span_from(start),
        })))
    }

    fn cast_operand_follows(&self, primitive: bool) -> bool {
        let token_type = match self.peek_token_type(self.current) {
            Some(t) => t,
            None => return false,
        };
        if token_type.is_literal()
            || matches!(
                token_type,
                Token::Identifier
                    | Token::This
                    | Token::Super
                    | Token::New
                    | Token::LParen
                    | Token::Bang
                    | Token::Tilde
            )
        {
            return true;
        }
        primitive
            && matches!(
                token_type,
                Token::Plus | Token::Minus | Token::Inc | Token::Dec
            )
    }

    fn parse_postfix_expr(&mut self) -> Result<Expr> {
        let start = self.current_span();
        let mut expr = self.parse_primary_expr()?;
        loop {
            if self.check(&Token::LParen) {
                // Bare call: foo(...) — only an identifier can be the name
                match expr {
                    Expr::Identifier(identifier) => {
                        self.advance();
                        let arguments = if !self.check(&Token::RParen) {
                            self.parse_argument_list()?
                        } else {
                            Vec::new()
                        };
                        self.consume(&Token::RParen, "')' after arguments")?;
                        expr = Expr::MethodCall(MethodCallExpr {
                            target: None,
                            name: identifier.name,
                            arguments,
                            span: Span::new(identifier.span.start, self.previous_span().end),
                        });
                        continue;
                    }
                    other => {
                        expr = other;
                        break;
                    }
                }
            }
            if self.match_token(&Token::Dot) {
                if self.match_token(&Token::Class) {
                    expr = Expr::FieldAccess(FieldAccessExpr {
                        target: Some(Box::new(expr)),
                        name: "class".to_string(),
                        span: self.span_from(start),
                    });
                    continue;
                }
                if self.match_token(&Token::This) {
                    expr = Expr::FieldAccess(FieldAccessExpr {
                        target: Some(Box::new(expr)),
                        name: "this".to_string(),
                        span: self.span_from(start),
                    });
                    continue;
                }
                let name = self.parse_identifier()?;
                if self.check(&Token::LParen) {
                    self.advance();
                    let arguments = if !self.check(&Token::RParen) {
                        self.parse_argument_list()?
                    } else {
                        Vec::new()
                    };
                    self.consume(&Token::RParen, "')' after method call")?;
                    expr = Expr::MethodCall(MethodCallExpr {
                        target: Some(Box::new(expr)),
                        name,
                        arguments,
                        span: self.span_from(start),
                    });
                } else {
                    expr = Expr::FieldAccess(FieldAccessExpr {
                        target: Some(Box::new(expr)),
                        name,
                        span: self.span_from(start),
                    });
                }
                continue;
            }
            if self.check(&Token::LBracket) {
                self.advance();
                let index = self.parse_expression()?;
                self.consume(&Token::RBracket, "']' after array index")?;
                expr = Expr::ArrayAccess(ArrayAccessExpr {
                    array: Box::new(expr),
                    index: Box::new(index),
                    span: self.span_from(start),
                });
                continue;
            }
            if self.match_token(&Token::DoubleColon) {
                let (method_name, is_constructor) = if self.match_token(&Token::New) {
                    ("new".to_string(), true)
                } else {
                    (self.parse_identifier()?, false)
                };
                expr = Expr::MethodReference(MethodReferenceExpr {
                    target: Box::new(expr),
                    method_name,
                    is_constructor,
                    span: self.span_from(start),
                });
                continue;
            }
            if self.check(&Token::Inc) || self.check(&Token::Dec) {
                let operator = if self.check(&Token::Inc) {
                    UnaryOp::PostInc
                } else {
                    UnaryOp::PostDec
                };
                self.advance();
                expr = Expr::Unary(UnaryExpr {
                    operator,
                    operand: Box::new(expr),
                    span: self.span_from(start),
                });
                continue;
            }
            break;
        }
        Ok(expr)
    }

    fn parse_primary_expr(&mut self) -> Result<Expr> {
        let token_type = match self.peek_token_type(self.current) {
            Some(t) => t.clone(),
            None => return Err(self.unexpected("expression")),
        };

        match token_type {
            Token::LParen => {
                let start = self.current_span();
                self.advance();
                let inner = self.parse_expression()?;
                self.consume(&Token::RParen, "')' after expression")?;
                Ok(Expr::Parenthesized(Box::new(inner), self.span_from(start)))
            }
            Token::New => self.parse_new_expr(),
            Token::This => {
                let location = self.advance().location();
                Ok(Expr::Identifier(IdentifierExpr {
                    name: "this".to_string(),
                    span: Span::new(location, location),
                }))
            }
            Token::Super => {
                let location = self.advance().location();
                Ok(Expr::Identifier(IdentifierExpr {
                    name: "super".to_string(),
                    span: Span::new(location, location),
                }))
            }
            Token::Identifier => {
                let token = self.advance();
                let name = token.lexeme().to_string();
                let location = token.location();
                Ok(Expr::Identifier(IdentifierExpr {
                    name,
                    span: Span::new(location, location),
                }))
            }
            Token::True | Token::False => {
                let value = token_type == Token::True;
                let location = self.advance().location();
                Ok(Expr::Literal(LiteralExpr {
                    value: Literal::Boolean(value),
                    span: Span::new(location, location),
                }))
            }
            Token::Null => {
                let location = self.advance().location();
                Ok(Expr::Literal(LiteralExpr {
                    value: Literal::Null,
                    span: Span::new(location, location),
                }))
            }
            Token::StringLiteral => {
                let token = self.advance();
                let lexeme = token.lexeme();
                let value = lexeme[1..lexeme.len() - 1].to_string();
                let location = token.location();
                Ok(Expr::Literal(LiteralExpr {
                    value: Literal::String(value),
                    span: Span::new(location, location),
                }))
            }
            Token::CharLiteral => {
                let token = self.advance();
                let lexeme = token.lexeme();
                let value = lexeme[1..lexeme.len() - 1].to_string();
                let location = token.location();
                Ok(Expr::Literal(LiteralExpr {
                    value: Literal::Char(value),
                    span: Span::new(location, location),
                }))
            }
            Token::IntLiteral => {
                let token = self.advance();
                let value = parse_int_literal(token.lexeme());
                let location = token.location();
                Ok(Expr::Literal(LiteralExpr {
                    value,
                    span: Span::new(location, location),
                }))
            }
            Token::HexLiteral => {
                let token = self.advance();
                let value = parse_radix_literal(token.lexeme(), 16);
                let location = token.location();
                Ok(Expr::Literal(LiteralExpr {
                    value,
                    span: Span::new(location, location),
                }))
            }
            Token::BinaryLiteral => {
                let token = self.advance();
                let value = parse_radix_literal(token.lexeme(), 2);
                let location = token.location();
                Ok(Expr::Literal(LiteralExpr {
                    value,
                    span: Span::new(location, location),
                }))
            }
            Token::NumberLiteral => {
                let token = self.advance();
                let value = parse_number_literal(token.lexeme());
                let location = token.location();
                Ok(Expr::Literal(LiteralExpr {
                    value,
                    span: Span::new(location, location),
                }))
            }
            _ => Err(self.unexpected("expression")),
        }
    }

    fn parse_new_expr(&mut self) -> Result<Expr> {
        let start = self.current_span();
        self.consume(&Token::New, "'new'")?;

        let type_start = self.current_span();
        let name = {
            let token_type = self.peek_token_type(self.current).cloned();
            match token_type {
                Some(t) if t.is_primitive_type() => {
                    let token = self.advance();
                    token.lexeme().to_string()
                }
                Some(Token::Identifier) => self.parse_qualified_name()?,
                _ => return Err(self.unexpected("type after 'new'")),
            }
        };
        let type_args = if self.check(&Token::Lt) {
            Some(self.parse_type_args()?)
        } else {
            None
        };
        let target_type = TypeRef {
            name,
            type_args,
            array_dims: 0,
            span: self.span_from(type_start),
        };

        if self.check(&Token::LBracket) {
            // Array creation: sized dims first, then empty dims, then an
            // optional initializer when every dim is empty
            let mut dim_exprs = Vec::new();
            let mut extra_dims = 0usize;
            while self.match_token(&Token::LBracket) {
                if self.check(&Token::RBracket) {
                    extra_dims += 1;
                    self.advance();
                } else if extra_dims == 0 {
                    dim_exprs.push(self.parse_expression()?);
                    self.consume(&Token::RBracket, "']' after array dimension")?;
                } else {
                    return Err(self.unexpected("']'"));
                }
            }
            let initializer = if self.check(&Token::LBrace) {
                match self.parse_array_initializer()? {
                    Expr::ArrayInitializer(values, _) => Some(values),
                    _ => None,
                }
            } else {
                None
            };
            return Ok(Expr::NewArray(NewArrayExpr {
                element_type: target_type,
                dim_exprs,
                extra_dims,
                initializer,
                span: self.span_from(start),
            }));
        }

        self.consume(&Token::LParen, "'(' after type in 'new'")?;
        let arguments = if !self.check(&Token::RParen) {
            self.parse_argument_list()?
        } else {
            Vec::new()
        };
        self.consume(&Token::RParen, "')' after constructor arguments")?;
        let anonymous_body = if self.check(&Token::LBrace) {
            Some(self.parse_class_body()?)
        } else {
            None
        };
        Ok(Expr::New(NewExpr {
            target_type,
            arguments,
            anonymous_body,
            span: self.span_from(start),
        }))
    }

    fn parse_argument_list(&mut self) -> Result<Vec<Expr>> {
        let mut arguments = vec![self.parse_expression()?];
        while self.match_token(&Token::Comma) {
            arguments.push(self.parse_expression()?);
        }
        Ok(arguments)
    }
}

// Literal conversion helpers

fn parse_int_literal(lexeme: &str) -> Literal {
    let cleaned = lexeme.replace('_', "");
    let (digits, long) = match cleaned.chars().last() {
        Some('l') | Some('L') => (&cleaned[..cleaned.len() - 1], true),
        _ => (cleaned.as_str(), false),
    };
    let value = if digits.len() > 1 && digits.starts_with('0') {
        u64::from_str_radix(&digits[1..], 8).unwrap_or(0) as i64
    } else {
        digits.parse::<u64>().unwrap_or(0) as i64
    };
    if long {
        Literal::Long(value)
    } else {
        Literal::Integer(value)
    }
}

fn parse_radix_literal(lexeme: &str, radix: u32) -> Literal {
    let cleaned = lexeme.replace('_', "");
    let (body, long) = match cleaned.chars().last() {
        Some('l') | Some('L') => (&cleaned[..cleaned.len() - 1], true),
        _ => (cleaned.as_str(), false),
    };
    let value = u64::from_str_radix(&body[2..], radix).unwrap_or(0) as i64;
    if long {
        Literal::Long(value)
    } else {
        Literal::Integer(value)
    }
}

fn parse_number_literal(lexeme: &str) -> Literal {
    let cleaned = lexeme.replace('_', "");
    match cleaned.chars().last() {
        Some('f') | Some('F') => {
            Literal::Float(cleaned[..cleaned.len() - 1].parse().unwrap_or(0.0))
        }
        Some('d') | Some('D') => {
            Literal::Double(cleaned[..cleaned.len() - 1].parse().unwrap_or(0.0))
        }
        _ => Literal::Double(cleaned.parse().unwrap_or(0.0)),
    }
}
