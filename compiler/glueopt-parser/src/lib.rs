// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell

//! Hand-written recursive descent parser for the ECMAScript subset the wasm
//! toolchain emits.
//!
//! The parser builds the arena AST of `glueopt-ast` directly. It is a
//! script/module parser with automatic semicolon insertion, arrow-function
//! lookahead, and binding-position destructuring. `await` is accepted
//! everywhere, including at top level.
//!
//! Constructs the glue generator never emits (classes, generators, optional
//! chaining, `with`, assignment-position destructuring) are rejected with a
//! parse error rather than silently mis-parsed.

mod error;
mod expr;

use glueopt_ast::span::Span;
use glueopt_ast::{Ast, DeclKind, LiteralValue, Node, NodeId, NodeKind, PropertyKind};
use glueopt_lexer::{tokenize, Token, TokenKind};
use la_arena::Arena;
use smol_str::SmolStr;

pub use error::{ParseError, ParseResult};

/// Parse a complete source text.
///
/// `module` selects module mode, which enables `export`/`import`
/// declarations at top level.
pub fn parse(source: &str, module: bool) -> Result<Ast, ParseError> {
    let (tokens, comments) = tokenize(source);
    let mut parser = Parser {
        source,
        tokens,
        pos: 0,
        nodes: Arena::new(),
        no_in: false,
        module,
    };
    let start = parser.peek().span;
    let body = parser.parse_statement_list(TokenKind::Eof, true)?;
    let end = parser.peek().span;
    let root = parser.alloc(start.merge(end), NodeKind::Program { body });
    Ok(Ast {
        nodes: parser.nodes,
        root,
        comments,
        module,
    })
}

pub(crate) struct Parser<'src> {
    source: &'src str,
    tokens: Vec<Token>,
    pos: usize,
    nodes: Arena<Node>,
    /// Suppress the `in` operator (for-statement heads).
    pub(crate) no_in: bool,
    module: bool,
}

impl<'src> Parser<'src> {
    // === Token plumbing ===

    pub(crate) fn peek(&self) -> &Token {
        &self.tokens[self.pos]
    }

    pub(crate) fn peek_at(&self, n: usize) -> &Token {
        let idx = (self.pos + n).min(self.tokens.len() - 1);
        &self.tokens[idx]
    }

    pub(crate) fn advance(&mut self) -> Token {
        let token = self.tokens[self.pos].clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    pub(crate) fn check(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    pub(crate) fn eat(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn expect(&mut self, kind: TokenKind) -> ParseResult<Token> {
        if self.check(kind.clone()) {
            Ok(self.advance())
        } else {
            Err(ParseError::unexpected(
                self.peek(),
                &format!("{kind:?}"),
            ))
        }
    }

    pub(crate) fn is_eof(&self) -> bool {
        matches!(self.peek().kind, TokenKind::Eof)
    }

    pub(crate) fn prev_span(&self) -> Span {
        if self.pos == 0 {
            self.peek().span
        } else {
            self.tokens[self.pos - 1].span
        }
    }

    /// The raw source slice of a span.
    pub(crate) fn slice(&self, span: Span) -> &'src str {
        &self.source[span.as_range()]
    }

    /// Whether the current token is the identifier `name`.
    pub(crate) fn is_ident(&self, name: &str) -> bool {
        matches!(&self.peek().kind, TokenKind::Ident(n) if n == name)
    }

    pub(crate) fn alloc(&mut self, span: Span, kind: NodeKind) -> NodeId {
        self.nodes.alloc(Node { span, kind })
    }

    /// Consume a statement terminator, applying automatic semicolon
    /// insertion: `;`, `}`, end of input, or a preceding line terminator all
    /// terminate a statement.
    pub(crate) fn semicolon(&mut self) -> ParseResult<()> {
        if self.eat(TokenKind::Semi) {
            return Ok(());
        }
        let token = self.peek();
        if matches!(token.kind, TokenKind::RBrace | TokenKind::Eof) || token.newline_before {
            return Ok(());
        }
        Err(ParseError::unexpected(token, "`;`"))
    }

    /// An identifier token, or a keyword usable as a property name.
    pub(crate) fn expect_name(&mut self) -> ParseResult<(SmolStr, Span)> {
        let token = self.peek().clone();
        if let TokenKind::Ident(name) = &token.kind {
            self.advance();
            return Ok((name.clone(), token.span));
        }
        if let Some(word) = keyword_name(&token.kind) {
            self.advance();
            return Ok((SmolStr::new(word), token.span));
        }
        Err(ParseError::unexpected(&token, "identifier"))
    }

    /// A plain identifier (keywords rejected).
    pub(crate) fn expect_ident(&mut self) -> ParseResult<NodeId> {
        let token = self.peek().clone();
        if let TokenKind::Ident(name) = &token.kind {
            self.advance();
            return Ok(self.alloc(token.span, NodeKind::Identifier { name: name.clone() }));
        }
        Err(ParseError::unexpected(&token, "identifier"))
    }

    // === Statements ===

    /// Parse statements until `end`, marking directive-prologue strings when
    /// `directives` is set.
    pub(crate) fn parse_statement_list(
        &mut self,
        end: TokenKind,
        directives: bool,
    ) -> ParseResult<Vec<NodeId>> {
        let mut body = Vec::new();
        let mut in_prologue = directives;
        while !self.check(end.clone()) {
            if self.is_eof() && end != TokenKind::Eof {
                return Err(ParseError::unexpected(self.peek(), &format!("{end:?}")));
            }
            let from_string = matches!(self.peek().kind, TokenKind::Str(_));
            let stmt = self.parse_statement()?;
            if in_prologue {
                let is_directive = from_string
                    && matches!(
                        self.nodes[stmt].kind,
                        NodeKind::ExpressionStatement { expression, .. }
                            if matches!(
                                self.nodes[expression].kind,
                                NodeKind::Literal { value: LiteralValue::Str(_), .. }
                            )
                    );
                if is_directive {
                    if let NodeKind::ExpressionStatement { directive, .. } =
                        &mut self.nodes[stmt].kind
                    {
                        *directive = true;
                    }
                } else {
                    in_prologue = false;
                }
            }
            body.push(stmt);
        }
        Ok(body)
    }

    pub(crate) fn parse_statement(&mut self) -> ParseResult<NodeId> {
        let token = self.peek().clone();
        match &token.kind {
            TokenKind::LBrace => self.parse_block(),
            TokenKind::Semi => {
                self.advance();
                Ok(self.alloc(token.span, NodeKind::EmptyStatement))
            }
            TokenKind::Var | TokenKind::Let | TokenKind::Const => {
                let decl = self.parse_variable_declaration()?;
                self.semicolon()?;
                Ok(decl)
            }
            TokenKind::Function => self.parse_function_declaration(false),
            TokenKind::Ident(name)
                if name == "async" && matches!(self.peek_at(1).kind, TokenKind::Function) =>
            {
                self.advance();
                self.parse_function_declaration(true)
            }
            TokenKind::If => self.parse_if(),
            TokenKind::For => self.parse_for(),
            TokenKind::While => self.parse_while(),
            TokenKind::Do => self.parse_do_while(),
            TokenKind::Return => self.parse_return(),
            TokenKind::Break | TokenKind::Continue => self.parse_break_continue(),
            TokenKind::Switch => self.parse_switch(),
            TokenKind::Throw => self.parse_throw(),
            TokenKind::Try => self.parse_try(),
            TokenKind::Export => {
                if !self.module {
                    return Err(ParseError::unsupported(
                        token.span,
                        "`export` requires module mode",
                    ));
                }
                self.parse_export()
            }
            TokenKind::Import => {
                if !self.module {
                    return Err(ParseError::unsupported(
                        token.span,
                        "`import` requires module mode",
                    ));
                }
                self.parse_import()
            }
            TokenKind::Ident(_) if matches!(self.peek_at(1).kind, TokenKind::Colon) => {
                self.parse_labeled()
            }
            _ => {
                let expression = self.parse_expression()?;
                self.semicolon()?;
                let span = token.span.merge(self.prev_span());
                Ok(self.alloc(
                    span,
                    NodeKind::ExpressionStatement {
                        expression,
                        directive: false,
                    },
                ))
            }
        }
    }

    fn parse_block(&mut self) -> ParseResult<NodeId> {
        let start = self.expect(TokenKind::LBrace)?.span;
        // leading string statements are marked as directives; over-marking
        // non-prologue blocks only makes the side-effect oracle conservative
        let body = self.parse_statement_list(TokenKind::RBrace, true)?;
        let end = self.expect(TokenKind::RBrace)?.span;
        Ok(self.alloc(start.merge(end), NodeKind::BlockStatement { body }))
    }

    /// Parse a `var`/`let`/`const` declaration without the terminating
    /// semicolon (the for-statement head also calls this).
    fn parse_variable_declaration(&mut self) -> ParseResult<NodeId> {
        let token = self.advance();
        let kind = match token.kind {
            TokenKind::Var => DeclKind::Var,
            TokenKind::Let => DeclKind::Let,
            TokenKind::Const => DeclKind::Const,
            _ => unreachable!("caller checked the keyword"),
        };
        let mut declarations = Vec::new();
        loop {
            let id = self.parse_binding_target()?;
            let init = if self.eat(TokenKind::Eq) {
                Some(self.parse_assignment()?)
            } else {
                None
            };
            let span = self.nodes[id]
                .span
                .merge(init.map(|i| self.nodes[i].span).unwrap_or(self.nodes[id].span));
            declarations.push(self.alloc(span, NodeKind::VariableDeclarator { id, init }));
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        let span = token.span.merge(self.prev_span());
        Ok(self.alloc(
            span,
            NodeKind::VariableDeclaration {
                kind,
                declarations,
            },
        ))
    }

    fn parse_function_declaration(&mut self, is_async: bool) -> ParseResult<NodeId> {
        let start = self.expect(TokenKind::Function)?.span;
        let id = self.expect_ident()?;
        let params = self.parse_params()?;
        let body = self.parse_block()?;
        let span = start.merge(self.nodes[body].span);
        Ok(self.alloc(
            span,
            NodeKind::FunctionDeclaration {
                id,
                params,
                body,
                is_async,
            },
        ))
    }

    /// Parse a parenthesized parameter list.
    pub(crate) fn parse_params(&mut self) -> ParseResult<Vec<NodeId>> {
        self.expect(TokenKind::LParen)?;
        let mut params = Vec::new();
        while !self.check(TokenKind::RParen) {
            params.push(self.parse_param()?);
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RParen)?;
        Ok(params)
    }

    fn parse_param(&mut self) -> ParseResult<NodeId> {
        if self.check(TokenKind::DotDotDot) {
            let start = self.advance().span;
            let argument = self.parse_binding_target()?;
            let span = start.merge(self.nodes[argument].span);
            return Ok(self.alloc(span, NodeKind::RestElement { argument }));
        }
        let target = self.parse_binding_target()?;
        if self.eat(TokenKind::Eq) {
            let right = self.parse_assignment()?;
            let span = self.nodes[target].span.merge(self.nodes[right].span);
            return Ok(self.alloc(
                span,
                NodeKind::AssignmentPattern {
                    left: target,
                    right,
                },
            ));
        }
        Ok(target)
    }

    /// Parse a binding target: identifier, object pattern, or array pattern.
    fn parse_binding_target(&mut self) -> ParseResult<NodeId> {
        let token = self.peek().clone();
        match &token.kind {
            TokenKind::Ident(_) => self.expect_ident(),
            TokenKind::LBrace => self.parse_object_pattern(),
            TokenKind::LBracket => self.parse_array_pattern(),
            _ => Err(ParseError::unexpected(&token, "binding target")),
        }
    }

    fn parse_object_pattern(&mut self) -> ParseResult<NodeId> {
        let start = self.expect(TokenKind::LBrace)?.span;
        let mut properties = Vec::new();
        while !self.check(TokenKind::RBrace) {
            if self.check(TokenKind::DotDotDot) {
                let rest_start = self.advance().span;
                let argument = self.parse_binding_target()?;
                let span = rest_start.merge(self.nodes[argument].span);
                properties.push(self.alloc(span, NodeKind::RestElement { argument }));
            } else {
                properties.push(self.parse_pattern_property()?);
            }
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        let end = self.expect(TokenKind::RBrace)?.span;
        Ok(self.alloc(start.merge(end), NodeKind::ObjectPattern { properties }))
    }

    fn parse_pattern_property(&mut self) -> ParseResult<NodeId> {
        let (key, computed) = self.parse_property_key()?;
        let key_span = self.nodes[key].span;

        let (value, shorthand) = if self.eat(TokenKind::Colon) {
            let mut value = self.parse_binding_target()?;
            if self.eat(TokenKind::Eq) {
                let right = self.parse_assignment()?;
                let span = self.nodes[value].span.merge(self.nodes[right].span);
                value = self.alloc(span, NodeKind::AssignmentPattern { left: value, right });
            }
            (value, false)
        } else {
            // shorthand: the key identifier is also the binding
            let name = match &self.nodes[key].kind {
                NodeKind::Identifier { name } => name.clone(),
                _ => return Err(ParseError::unsupported(key_span, "invalid shorthand pattern")),
            };
            let mut value = self.alloc(key_span, NodeKind::Identifier { name });
            if self.eat(TokenKind::Eq) {
                let right = self.parse_assignment()?;
                let span = key_span.merge(self.nodes[right].span);
                value = self.alloc(span, NodeKind::AssignmentPattern { left: value, right });
            }
            (value, true)
        };
        let span = key_span.merge(self.nodes[value].span);
        Ok(self.alloc(
            span,
            NodeKind::Property {
                key,
                value,
                kind: PropertyKind::Init,
                computed,
                shorthand,
                method: false,
            },
        ))
    }

    fn parse_array_pattern(&mut self) -> ParseResult<NodeId> {
        let start = self.expect(TokenKind::LBracket)?.span;
        let mut elements = Vec::new();
        while !self.check(TokenKind::RBracket) {
            if self.check(TokenKind::Comma) {
                self.advance();
                elements.push(None);
                continue;
            }
            let element = if self.check(TokenKind::DotDotDot) {
                let rest_start = self.advance().span;
                let argument = self.parse_binding_target()?;
                let span = rest_start.merge(self.nodes[argument].span);
                self.alloc(span, NodeKind::RestElement { argument })
            } else {
                let mut target = self.parse_binding_target()?;
                if self.eat(TokenKind::Eq) {
                    let right = self.parse_assignment()?;
                    let span = self.nodes[target].span.merge(self.nodes[right].span);
                    target =
                        self.alloc(span, NodeKind::AssignmentPattern { left: target, right });
                }
                target
            };
            elements.push(Some(element));
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        let end = self.expect(TokenKind::RBracket)?.span;
        Ok(self.alloc(start.merge(end), NodeKind::ArrayPattern { elements }))
    }

    fn parse_if(&mut self) -> ParseResult<NodeId> {
        let start = self.expect(TokenKind::If)?.span;
        self.expect(TokenKind::LParen)?;
        let test = self.parse_expression()?;
        self.expect(TokenKind::RParen)?;
        let consequent = self.parse_statement()?;
        let alternate = if self.eat(TokenKind::Else) {
            Some(self.parse_statement()?)
        } else {
            None
        };
        let span = start.merge(self.prev_span());
        Ok(self.alloc(
            span,
            NodeKind::IfStatement {
                test,
                consequent,
                alternate,
            },
        ))
    }

    fn parse_for(&mut self) -> ParseResult<NodeId> {
        let start = self.expect(TokenKind::For)?.span;
        self.expect(TokenKind::LParen)?;

        // empty init
        if self.eat(TokenKind::Semi) {
            return self.parse_for_rest(start, None);
        }

        if matches!(
            self.peek().kind,
            TokenKind::Var | TokenKind::Let | TokenKind::Const
        ) {
            let saved = self.no_in;
            self.no_in = true;
            let decl = self.parse_variable_declaration()?;
            self.no_in = saved;
            if self.check(TokenKind::In) || self.is_ident("of") {
                return self.parse_for_in_of(start, decl);
            }
            self.expect(TokenKind::Semi)?;
            return self.parse_for_rest(start, Some(decl));
        }

        let saved = self.no_in;
        self.no_in = true;
        let init = self.parse_expression()?;
        self.no_in = saved;
        if self.check(TokenKind::In) || self.is_ident("of") {
            return self.parse_for_in_of(start, init);
        }
        self.expect(TokenKind::Semi)?;
        let init_span = self.nodes[init].span;
        let init_stmt = self.alloc(
            init_span,
            NodeKind::ExpressionStatement {
                expression: init,
                directive: false,
            },
        );
        self.parse_for_rest(start, Some(init_stmt))
    }

    fn parse_for_in_of(&mut self, start: Span, left: NodeId) -> ParseResult<NodeId> {
        let is_in = self.check(TokenKind::In);
        self.advance(); // `in` or `of`
        let right = self.parse_expression()?;
        self.expect(TokenKind::RParen)?;
        let body = self.parse_statement()?;
        let span = start.merge(self.nodes[body].span);
        let kind = if is_in {
            NodeKind::ForInStatement { left, right, body }
        } else {
            NodeKind::ForOfStatement { left, right, body }
        };
        Ok(self.alloc(span, kind))
    }

    fn parse_for_rest(&mut self, start: Span, init: Option<NodeId>) -> ParseResult<NodeId> {
        let test = if self.check(TokenKind::Semi) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect(TokenKind::Semi)?;
        let update = if self.check(TokenKind::RParen) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect(TokenKind::RParen)?;
        let body = self.parse_statement()?;
        let span = start.merge(self.nodes[body].span);
        Ok(self.alloc(
            span,
            NodeKind::ForStatement {
                init,
                test,
                update,
                body,
            },
        ))
    }

    fn parse_while(&mut self) -> ParseResult<NodeId> {
        let start = self.expect(TokenKind::While)?.span;
        self.expect(TokenKind::LParen)?;
        let test = self.parse_expression()?;
        self.expect(TokenKind::RParen)?;
        let body = self.parse_statement()?;
        let span = start.merge(self.nodes[body].span);
        Ok(self.alloc(span, NodeKind::WhileStatement { test, body }))
    }

    fn parse_do_while(&mut self) -> ParseResult<NodeId> {
        let start = self.expect(TokenKind::Do)?.span;
        let body = self.parse_statement()?;
        self.expect(TokenKind::While)?;
        self.expect(TokenKind::LParen)?;
        let test = self.parse_expression()?;
        let end = self.expect(TokenKind::RParen)?.span;
        self.eat(TokenKind::Semi);
        Ok(self.alloc(start.merge(end), NodeKind::DoWhileStatement { body, test }))
    }

    fn parse_return(&mut self) -> ParseResult<NodeId> {
        let start = self.expect(TokenKind::Return)?.span;
        // restricted production: no argument after a line terminator
        let argument = if self.check(TokenKind::Semi)
            || self.check(TokenKind::RBrace)
            || self.is_eof()
            || self.peek().newline_before
        {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.semicolon()?;
        let span = start.merge(self.prev_span());
        Ok(self.alloc(span, NodeKind::ReturnStatement { argument }))
    }

    fn parse_break_continue(&mut self) -> ParseResult<NodeId> {
        let token = self.advance();
        let is_break = matches!(token.kind, TokenKind::Break);
        let label = if matches!(self.peek().kind, TokenKind::Ident(_)) && !self.peek().newline_before
        {
            Some(self.expect_ident()?)
        } else {
            None
        };
        self.semicolon()?;
        let span = token.span.merge(self.prev_span());
        let kind = if is_break {
            NodeKind::BreakStatement { label }
        } else {
            NodeKind::ContinueStatement { label }
        };
        Ok(self.alloc(span, kind))
    }

    fn parse_switch(&mut self) -> ParseResult<NodeId> {
        let start = self.expect(TokenKind::Switch)?.span;
        self.expect(TokenKind::LParen)?;
        let discriminant = self.parse_expression()?;
        self.expect(TokenKind::RParen)?;
        self.expect(TokenKind::LBrace)?;
        let mut cases = Vec::new();
        while !self.check(TokenKind::RBrace) {
            let case_start = self.peek().span;
            let test = if self.eat(TokenKind::Case) {
                Some(self.parse_expression()?)
            } else {
                self.expect(TokenKind::Default)?;
                None
            };
            self.expect(TokenKind::Colon)?;
            let mut consequent = Vec::new();
            while !matches!(
                self.peek().kind,
                TokenKind::Case | TokenKind::Default | TokenKind::RBrace
            ) {
                consequent.push(self.parse_statement()?);
            }
            let span = case_start.merge(self.prev_span());
            cases.push(self.alloc(span, NodeKind::SwitchCase { test, consequent }));
        }
        let end = self.expect(TokenKind::RBrace)?.span;
        Ok(self.alloc(
            start.merge(end),
            NodeKind::SwitchStatement {
                discriminant,
                cases,
            },
        ))
    }

    fn parse_throw(&mut self) -> ParseResult<NodeId> {
        let start = self.expect(TokenKind::Throw)?.span;
        let argument = self.parse_expression()?;
        self.semicolon()?;
        let span = start.merge(self.prev_span());
        Ok(self.alloc(span, NodeKind::ThrowStatement { argument }))
    }

    fn parse_try(&mut self) -> ParseResult<NodeId> {
        let start = self.expect(TokenKind::Try)?.span;
        let block = self.parse_block()?;
        let handler = if self.eat(TokenKind::Catch) {
            let catch_start = self.prev_span();
            let param = if self.eat(TokenKind::LParen) {
                let param = self.parse_binding_target()?;
                self.expect(TokenKind::RParen)?;
                Some(param)
            } else {
                None
            };
            let body = self.parse_block()?;
            let span = catch_start.merge(self.nodes[body].span);
            Some(self.alloc(span, NodeKind::CatchClause { param, body }))
        } else {
            None
        };
        let finalizer = if self.eat(TokenKind::Finally) {
            Some(self.parse_block()?)
        } else {
            None
        };
        if handler.is_none() && finalizer.is_none() {
            return Err(ParseError::unexpected(self.peek(), "`catch` or `finally`"));
        }
        let span = start.merge(self.prev_span());
        Ok(self.alloc(
            span,
            NodeKind::TryStatement {
                block,
                handler,
                finalizer,
            },
        ))
    }

    fn parse_labeled(&mut self) -> ParseResult<NodeId> {
        let label = self.expect_ident()?;
        self.expect(TokenKind::Colon)?;
        let body = self.parse_statement()?;
        let span = self.nodes[label].span.merge(self.nodes[body].span);
        Ok(self.alloc(span, NodeKind::LabeledStatement { label, body }))
    }

    fn parse_export(&mut self) -> ParseResult<NodeId> {
        let start = self.expect(TokenKind::Export)?.span;

        if self.eat(TokenKind::Default) {
            let declaration = if self.check(TokenKind::Function) {
                self.parse_function_declaration(false)?
            } else {
                let expr = self.parse_assignment()?;
                self.semicolon()?;
                expr
            };
            let span = start.merge(self.prev_span());
            return Ok(self.alloc(span, NodeKind::ExportDefaultDeclaration { declaration }));
        }

        if self.check(TokenKind::LBrace) {
            self.advance();
            let mut specifiers = Vec::new();
            while !self.check(TokenKind::RBrace) {
                let local = self.expect_ident()?;
                let exported = if self.is_ident("as") {
                    self.advance();
                    let (name, span) = self.expect_name()?;
                    self.alloc(span, NodeKind::Identifier { name })
                } else {
                    local
                };
                let span = self.nodes[local].span.merge(self.nodes[exported].span);
                specifiers.push(self.alloc(span, NodeKind::ExportSpecifier { local, exported }));
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
            self.expect(TokenKind::RBrace)?;
            self.semicolon()?;
            let span = start.merge(self.prev_span());
            return Ok(self.alloc(
                span,
                NodeKind::ExportNamedDeclaration {
                    declaration: None,
                    specifiers,
                },
            ));
        }

        let declaration = match self.peek().kind {
            TokenKind::Var | TokenKind::Let | TokenKind::Const => {
                let decl = self.parse_variable_declaration()?;
                self.semicolon()?;
                decl
            }
            TokenKind::Function => self.parse_function_declaration(false)?,
            _ => return Err(ParseError::unexpected(self.peek(), "export declaration")),
        };
        let span = start.merge(self.prev_span());
        Ok(self.alloc(
            span,
            NodeKind::ExportNamedDeclaration {
                declaration: Some(declaration),
                specifiers: Vec::new(),
            },
        ))
    }

    fn parse_import(&mut self) -> ParseResult<NodeId> {
        let start = self.expect(TokenKind::Import)?.span;
        let mut specifiers = Vec::new();

        if !matches!(self.peek().kind, TokenKind::Str(_)) {
            loop {
                match self.peek().kind.clone() {
                    TokenKind::Ident(_) => {
                        let local = self.expect_ident()?;
                        let span = self.nodes[local].span;
                        specifiers.push(self.alloc(span, NodeKind::ImportDefaultSpecifier { local }));
                    }
                    TokenKind::Star => {
                        let star = self.advance().span;
                        if !self.is_ident("as") {
                            return Err(ParseError::unexpected(self.peek(), "`as`"));
                        }
                        self.advance();
                        let local = self.expect_ident()?;
                        let span = star.merge(self.nodes[local].span);
                        specifiers
                            .push(self.alloc(span, NodeKind::ImportNamespaceSpecifier { local }));
                    }
                    TokenKind::LBrace => {
                        self.advance();
                        while !self.check(TokenKind::RBrace) {
                            let (name, span) = self.expect_name()?;
                            let imported = self.alloc(span, NodeKind::Identifier { name });
                            let local = if self.is_ident("as") {
                                self.advance();
                                self.expect_ident()?
                            } else {
                                imported
                            };
                            let span = self.nodes[imported].span.merge(self.nodes[local].span);
                            specifiers
                                .push(self.alloc(span, NodeKind::ImportSpecifier { local, imported }));
                            if !self.eat(TokenKind::Comma) {
                                break;
                            }
                        }
                        self.expect(TokenKind::RBrace)?;
                    }
                    _ => return Err(ParseError::unexpected(self.peek(), "import specifier")),
                }
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
            if !self.is_ident("from") {
                return Err(ParseError::unexpected(self.peek(), "`from`"));
            }
            self.advance();
        }

        let source_token = self.peek().clone();
        let TokenKind::Str(value) = &source_token.kind else {
            return Err(ParseError::unexpected(&source_token, "module source string"));
        };
        self.advance();
        let raw = SmolStr::new(self.slice(source_token.span));
        let source = self.alloc(
            source_token.span,
            NodeKind::Literal {
                value: LiteralValue::Str(value.clone()),
                raw: Some(raw),
            },
        );
        self.semicolon()?;
        let span = start.merge(self.prev_span());
        Ok(self.alloc(span, NodeKind::ImportDeclaration { specifiers, source }))
    }
}

/// The source text of keyword tokens that may double as property names.
pub(crate) fn keyword_name(kind: &TokenKind) -> Option<&'static str> {
    Some(match kind {
        TokenKind::Var => "var",
        TokenKind::Let => "let",
        TokenKind::Const => "const",
        TokenKind::Function => "function",
        TokenKind::Return => "return",
        TokenKind::If => "if",
        TokenKind::Else => "else",
        TokenKind::For => "for",
        TokenKind::While => "while",
        TokenKind::Do => "do",
        TokenKind::Break => "break",
        TokenKind::Continue => "continue",
        TokenKind::New => "new",
        TokenKind::Typeof => "typeof",
        TokenKind::Void => "void",
        TokenKind::Delete => "delete",
        TokenKind::In => "in",
        TokenKind::Instanceof => "instanceof",
        TokenKind::This => "this",
        TokenKind::Null => "null",
        TokenKind::True => "true",
        TokenKind::False => "false",
        TokenKind::Switch => "switch",
        TokenKind::Case => "case",
        TokenKind::Default => "default",
        TokenKind::Throw => "throw",
        TokenKind::Try => "try",
        TokenKind::Catch => "catch",
        TokenKind::Finally => "finally",
        TokenKind::Export => "export",
        TokenKind::Import => "import",
        TokenKind::Await => "await",
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use glueopt_ast::json::to_json;

    fn parse_ok(source: &str) -> Ast {
        match parse(source, false) {
            Ok(ast) => ast,
            Err(e) => panic!("parse failed:\n{}", e.format_with_source(source)),
        }
    }

    fn first_stmt(ast: &Ast) -> NodeId {
        match &ast.nodes[ast.root].kind {
            NodeKind::Program { body } => body[0],
            _ => panic!("program expected"),
        }
    }

    #[test]
    fn test_var_declaration() {
        let ast = parse_ok("var x = 1, y;");
        let stmt = first_stmt(&ast);
        match &ast.nodes[stmt].kind {
            NodeKind::VariableDeclaration {
                kind,
                declarations,
            } => {
                assert_eq!(*kind, DeclKind::Var);
                assert_eq!(declarations.len(), 2);
            }
            other => panic!("expected declaration, got {other:?}"),
        }
    }

    #[test]
    fn test_function_declaration() {
        let ast = parse_ok("function f(a, b = 1, ...rest) { return a; }");
        let stmt = first_stmt(&ast);
        match &ast.nodes[stmt].kind {
            NodeKind::FunctionDeclaration { id, params, .. } => {
                assert_eq!(ast.ident_name(*id).unwrap(), "f");
                assert_eq!(params.len(), 3);
                assert!(matches!(
                    ast.nodes[params[1]].kind,
                    NodeKind::AssignmentPattern { .. }
                ));
                assert!(matches!(
                    ast.nodes[params[2]].kind,
                    NodeKind::RestElement { .. }
                ));
            }
            other => panic!("expected function, got {other:?}"),
        }
    }

    #[test]
    fn test_destructuring_declaration() {
        let ast = parse_ok("var {a, b: [c]} = obj;");
        let json = to_json(&ast, ast.root);
        let pattern = &json["body"][0]["declarations"][0]["id"];
        assert_eq!(pattern["type"], "ObjectPattern");
        assert_eq!(pattern["properties"][0]["shorthand"], true);
        assert_eq!(pattern["properties"][1]["value"]["type"], "ArrayPattern");
    }

    #[test]
    fn test_for_in_and_of() {
        let ast = parse_ok("for (var k in obj) {} for (var v of list) {}");
        match &ast.nodes[ast.root].kind {
            NodeKind::Program { body } => {
                assert!(matches!(
                    ast.nodes[body[0]].kind,
                    NodeKind::ForInStatement { .. }
                ));
                assert!(matches!(
                    ast.nodes[body[1]].kind,
                    NodeKind::ForOfStatement { .. }
                ));
            }
            _ => panic!(),
        }
    }

    #[test]
    fn test_in_operator_inside_for_parens() {
        // `in` must still work as an operator outside for-heads
        let ast = parse_ok("if ('x' in obj) f();");
        let json = to_json(&ast, ast.root);
        assert_eq!(json["body"][0]["test"]["operator"], "in");
    }

    #[test]
    fn test_labeled_break() {
        let ast = parse_ok("outer: for (;;) { break outer; }");
        let stmt = first_stmt(&ast);
        assert!(matches!(
            ast.nodes[stmt].kind,
            NodeKind::LabeledStatement { .. }
        ));
    }

    #[test]
    fn test_directive_prologue() {
        let ast = parse_ok("'use strict'; var x = 'not a directive';");
        let json = to_json(&ast, ast.root);
        assert_eq!(json["body"][0]["directive"], true);
    }

    #[test]
    fn test_asi() {
        let ast = parse_ok("var x = 1\nvar y = 2\nreturn_like()");
        match &ast.nodes[ast.root].kind {
            NodeKind::Program { body } => assert_eq!(body.len(), 3),
            _ => panic!(),
        }
    }

    #[test]
    fn test_switch() {
        let ast = parse_ok("switch (x) { case 1: f(); break; default: g(); }");
        let json = to_json(&ast, ast.root);
        assert_eq!(json["body"][0]["cases"][0]["test"]["value"], 1.0);
        assert!(json["body"][0]["cases"][1]["test"].is_null());
    }

    #[test]
    fn test_try_catch_finally() {
        let ast = parse_ok("try { f(); } catch (e) { g(e); } finally { h(); }");
        let stmt = first_stmt(&ast);
        match &ast.nodes[stmt].kind {
            NodeKind::TryStatement {
                handler, finalizer, ..
            } => {
                assert!(handler.is_some());
                assert!(finalizer.is_some());
            }
            _ => panic!(),
        }
    }

    #[test]
    fn test_export_forms() {
        let ast = parse(
            "export var x = 1; export { a, b as c }; export default f;",
            true,
        )
        .expect("module parse");
        let json = to_json(&ast, ast.root);
        assert_eq!(json["body"][0]["type"], "ExportNamedDeclaration");
        assert_eq!(
            json["body"][1]["specifiers"][1]["exported"]["name"],
            "c"
        );
        assert_eq!(json["body"][2]["type"], "ExportDefaultDeclaration");
    }

    #[test]
    fn test_import_forms() {
        let ast = parse(
            "import d from 'm'; import * as ns from 'm'; import { a as b } from 'm';",
            true,
        )
        .expect("module parse");
        let json = to_json(&ast, ast.root);
        assert_eq!(json["body"][0]["specifiers"][0]["type"], "ImportDefaultSpecifier");
        assert_eq!(json["body"][1]["specifiers"][0]["type"], "ImportNamespaceSpecifier");
        assert_eq!(json["body"][2]["specifiers"][0]["local"]["name"], "b");
    }

    #[test]
    fn test_export_outside_module_fails() {
        assert!(parse("export var x = 1;", false).is_err());
    }

    #[test]
    fn test_parse_error_has_location() {
        let err = parse("var x = ;", false).unwrap_err();
        let text = err.format_with_source("var x = ;");
        assert!(text.contains('^'));
    }

    #[test]
    fn test_keyword_as_property_name() {
        let ast = parse_ok("p.catch(f); var o = { default: 1 };");
        let json = to_json(&ast, ast.root);
        assert_eq!(json["body"][0]["expression"]["callee"]["property"]["name"], "catch");
        assert_eq!(json["body"][1]["declarations"][0]["init"]["properties"][0]["key"]["name"], "default");
    }
}
