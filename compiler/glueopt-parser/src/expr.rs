// SPDX-License-Identifier: PMPL-1.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell

//! Expression parsing: precedence climbing for binary operators, explicit
//! layers for sequence/assignment/conditional, and arrow-function lookahead.

use glueopt_ast::{
    AssignOp, BinaryOp, LiteralValue, LogicalOp, NodeId, NodeKind, PropertyKind, UnaryOp,
    UpdateOp,
};
use glueopt_lexer::TokenKind;
use smol_str::SmolStr;

use crate::{ParseError, ParseResult, Parser};

/// Binary operator precedence levels, lowest first. `**` is right
/// associative; everything else is left associative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
enum Prec {
    Nullish = 1,
    Or,
    And,
    BitOr,
    BitXor,
    BitAnd,
    Equality,
    Relational,
    Shift,
    Additive,
    Multiplicative,
    Exponent,
}

enum BinKind {
    Binary(BinaryOp),
    Logical(LogicalOp),
}

fn binary_op(kind: &TokenKind, no_in: bool) -> Option<(Prec, BinKind)> {
    use BinKind::*;
    let entry = match kind {
        TokenKind::QuestionQuestion => (Prec::Nullish, Logical(LogicalOp::Nullish)),
        TokenKind::PipePipe => (Prec::Or, Logical(LogicalOp::Or)),
        TokenKind::AmpAmp => (Prec::And, Logical(LogicalOp::And)),
        TokenKind::Pipe => (Prec::BitOr, Binary(BinaryOp::BitOr)),
        TokenKind::Caret => (Prec::BitXor, Binary(BinaryOp::BitXor)),
        TokenKind::Amp => (Prec::BitAnd, Binary(BinaryOp::BitAnd)),
        TokenKind::EqEq => (Prec::Equality, Binary(BinaryOp::EqEq)),
        TokenKind::NotEq => (Prec::Equality, Binary(BinaryOp::NotEq)),
        TokenKind::StrictEq => (Prec::Equality, Binary(BinaryOp::StrictEq)),
        TokenKind::StrictNotEq => (Prec::Equality, Binary(BinaryOp::StrictNotEq)),
        TokenKind::Lt => (Prec::Relational, Binary(BinaryOp::Lt)),
        TokenKind::Le => (Prec::Relational, Binary(BinaryOp::Le)),
        TokenKind::Gt => (Prec::Relational, Binary(BinaryOp::Gt)),
        TokenKind::Ge => (Prec::Relational, Binary(BinaryOp::Ge)),
        TokenKind::Instanceof => (Prec::Relational, Binary(BinaryOp::Instanceof)),
        TokenKind::In => {
            if no_in {
                return None;
            }
            (Prec::Relational, Binary(BinaryOp::In))
        }
        TokenKind::Shl => (Prec::Shift, Binary(BinaryOp::Shl)),
        TokenKind::Shr => (Prec::Shift, Binary(BinaryOp::Shr)),
        TokenKind::UShr => (Prec::Shift, Binary(BinaryOp::UShr)),
        TokenKind::Plus => (Prec::Additive, Binary(BinaryOp::Add)),
        TokenKind::Minus => (Prec::Additive, Binary(BinaryOp::Sub)),
        TokenKind::Star => (Prec::Multiplicative, Binary(BinaryOp::Mul)),
        TokenKind::Slash => (Prec::Multiplicative, Binary(BinaryOp::Div)),
        TokenKind::Percent => (Prec::Multiplicative, Binary(BinaryOp::Rem)),
        TokenKind::StarStar => (Prec::Exponent, Binary(BinaryOp::Pow)),
        _ => return None,
    };
    Some(entry)
}

fn assign_op(kind: &TokenKind) -> Option<AssignOp> {
    Some(match kind {
        TokenKind::Eq => AssignOp::Assign,
        TokenKind::PlusEq => AssignOp::AddAssign,
        TokenKind::MinusEq => AssignOp::SubAssign,
        TokenKind::StarEq => AssignOp::MulAssign,
        TokenKind::SlashEq => AssignOp::DivAssign,
        TokenKind::PercentEq => AssignOp::RemAssign,
        TokenKind::StarStarEq => AssignOp::PowAssign,
        TokenKind::ShlEq => AssignOp::ShlAssign,
        TokenKind::ShrEq => AssignOp::ShrAssign,
        TokenKind::UShrEq => AssignOp::UShrAssign,
        TokenKind::AmpEq => AssignOp::BitAndAssign,
        TokenKind::PipeEq => AssignOp::BitOrAssign,
        TokenKind::CaretEq => AssignOp::BitXorAssign,
        TokenKind::AmpAmpEq => AssignOp::AndAssign,
        TokenKind::PipePipeEq => AssignOp::OrAssign,
        TokenKind::QuestionQuestionEq => AssignOp::NullishAssign,
        _ => return None,
    })
}

impl<'src> Parser<'src> {
    /// Full expression, comma sequences included.
    pub(crate) fn parse_expression(&mut self) -> ParseResult<NodeId> {
        let first = self.parse_assignment()?;
        if !self.check(TokenKind::Comma) {
            return Ok(first);
        }
        let mut expressions = vec![first];
        while self.eat(TokenKind::Comma) {
            expressions.push(self.parse_assignment()?);
        }
        let span = self.nodes[expressions[0]]
            .span
            .merge(self.nodes[*expressions.last().unwrap()].span);
        Ok(self.alloc(span, NodeKind::SequenceExpression { expressions }))
    }

    /// Assignment expression, including arrow functions.
    pub(crate) fn parse_assignment(&mut self) -> ParseResult<NodeId> {
        if let Some(arrow) = self.try_parse_arrow()? {
            return Ok(arrow);
        }
        let left = self.parse_conditional()?;
        let Some(operator) = assign_op(&self.peek().kind) else {
            return Ok(left);
        };
        match self.nodes[left].kind {
            NodeKind::Identifier { .. } | NodeKind::MemberExpression { .. } => {}
            _ => {
                return Err(ParseError::unsupported(
                    self.nodes[left].span,
                    "assignment target must be an identifier or member expression",
                ));
            }
        }
        self.advance();
        let right = self.parse_assignment()?;
        let span = self.nodes[left].span.merge(self.nodes[right].span);
        Ok(self.alloc(
            span,
            NodeKind::AssignmentExpression {
                operator,
                left,
                right,
            },
        ))
    }

    /// If the tokens ahead form an arrow function, parse it.
    fn try_parse_arrow(&mut self) -> ParseResult<Option<NodeId>> {
        let (is_async, offset) = if self.is_ident("async")
            && !self.peek_at(1).newline_before
            && matches!(
                self.peek_at(1).kind,
                TokenKind::Ident(_) | TokenKind::LParen
            ) {
            (true, 1)
        } else {
            (false, 0)
        };

        let starts_arrow = match &self.peek_at(offset).kind {
            TokenKind::Ident(_) => {
                matches!(self.peek_at(offset + 1).kind, TokenKind::Arrow)
            }
            TokenKind::LParen => self.paren_ends_with_arrow(offset),
            _ => false,
        };
        if !starts_arrow {
            return Ok(None);
        }

        let start = self.peek().span;
        if is_async {
            self.advance();
        }
        let params = if matches!(self.peek().kind, TokenKind::Ident(_)) {
            vec![self.expect_ident()?]
        } else {
            self.parse_params()?
        };
        self.expect(TokenKind::Arrow)?;
        let (body, expression) = if self.check(TokenKind::LBrace) {
            (self.parse_statement()?, false)
        } else {
            (self.parse_assignment()?, true)
        };
        let span = start.merge(self.nodes[body].span);
        Ok(Some(self.alloc(
            span,
            NodeKind::ArrowFunctionExpression {
                params,
                body,
                expression,
                is_async,
            },
        )))
    }

    /// Scan from a `(` at `offset` tokens ahead to its matching `)` and
    /// report whether `=>` follows.
    fn paren_ends_with_arrow(&self, offset: usize) -> bool {
        let mut depth = 0usize;
        let mut i = offset;
        loop {
            let token = self.peek_at(i);
            match token.kind {
                TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace => depth += 1,
                TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 && matches!(token.kind, TokenKind::RParen) {
                        return matches!(self.peek_at(i + 1).kind, TokenKind::Arrow);
                    }
                }
                TokenKind::Eof => return false,
                _ => {}
            }
            i += 1;
        }
    }

    fn parse_conditional(&mut self) -> ParseResult<NodeId> {
        let test = self.parse_binary(Prec::Nullish as u8)?;
        if !self.eat(TokenKind::Question) {
            return Ok(test);
        }
        let consequent = self.parse_assignment()?;
        self.expect(TokenKind::Colon)?;
        let alternate = self.parse_assignment()?;
        let span = self.nodes[test].span.merge(self.nodes[alternate].span);
        Ok(self.alloc(
            span,
            NodeKind::ConditionalExpression {
                test,
                consequent,
                alternate,
            },
        ))
    }

    fn parse_binary(&mut self, min_prec: u8) -> ParseResult<NodeId> {
        let mut left = self.parse_unary()?;
        loop {
            let Some((prec, op)) = binary_op(&self.peek().kind, self.no_in) else {
                break;
            };
            let prec = prec as u8;
            if prec < min_prec {
                break;
            }
            self.advance();
            // `**` is right associative: parse the right side at the same level
            let next_min = if prec == Prec::Exponent as u8 {
                prec
            } else {
                prec + 1
            };
            let right = self.parse_binary(next_min)?;
            let span = self.nodes[left].span.merge(self.nodes[right].span);
            left = match op {
                BinKind::Binary(operator) => self.alloc(
                    span,
                    NodeKind::BinaryExpression {
                        operator,
                        left,
                        right,
                    },
                ),
                BinKind::Logical(operator) => self.alloc(
                    span,
                    NodeKind::LogicalExpression {
                        operator,
                        left,
                        right,
                    },
                ),
            };
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> ParseResult<NodeId> {
        let token = self.peek().clone();
        let operator = match token.kind {
            TokenKind::Bang => Some(UnaryOp::Not),
            TokenKind::Tilde => Some(UnaryOp::BitNot),
            TokenKind::Plus => Some(UnaryOp::Plus),
            TokenKind::Minus => Some(UnaryOp::Minus),
            TokenKind::Typeof => Some(UnaryOp::Typeof),
            TokenKind::Void => Some(UnaryOp::Void),
            TokenKind::Delete => Some(UnaryOp::Delete),
            _ => None,
        };
        if let Some(operator) = operator {
            self.advance();
            let argument = self.parse_unary()?;
            let span = token.span.merge(self.nodes[argument].span);
            return Ok(self.alloc(span, NodeKind::UnaryExpression { operator, argument }));
        }
        if matches!(token.kind, TokenKind::PlusPlus | TokenKind::MinusMinus) {
            let operator = if matches!(token.kind, TokenKind::PlusPlus) {
                UpdateOp::Inc
            } else {
                UpdateOp::Dec
            };
            self.advance();
            let argument = self.parse_unary()?;
            let span = token.span.merge(self.nodes[argument].span);
            return Ok(self.alloc(
                span,
                NodeKind::UpdateExpression {
                    operator,
                    argument,
                    prefix: true,
                },
            ));
        }
        if matches!(token.kind, TokenKind::Await) {
            self.advance();
            let argument = self.parse_unary()?;
            let span = token.span.merge(self.nodes[argument].span);
            return Ok(self.alloc(span, NodeKind::AwaitExpression { argument }));
        }
        self.parse_postfix()
    }

    fn parse_postfix(&mut self) -> ParseResult<NodeId> {
        let expr = self.parse_call_member()?;
        let token = self.peek();
        // restricted production: no line terminator before postfix ++/--
        if matches!(token.kind, TokenKind::PlusPlus | TokenKind::MinusMinus)
            && !token.newline_before
        {
            let operator = if matches!(token.kind, TokenKind::PlusPlus) {
                UpdateOp::Inc
            } else {
                UpdateOp::Dec
            };
            let end = self.advance().span;
            let span = self.nodes[expr].span.merge(end);
            return Ok(self.alloc(
                span,
                NodeKind::UpdateExpression {
                    operator,
                    argument: expr,
                    prefix: false,
                },
            ));
        }
        Ok(expr)
    }

    fn parse_call_member(&mut self) -> ParseResult<NodeId> {
        let mut expr = if self.check(TokenKind::New) {
            self.parse_new()?
        } else {
            self.parse_primary()?
        };
        loop {
            match self.peek().kind {
                TokenKind::Dot => {
                    self.advance();
                    let (name, name_span) = self.expect_name()?;
                    let property = self.alloc(name_span, NodeKind::Identifier { name });
                    let span = self.nodes[expr].span.merge(name_span);
                    expr = self.alloc(
                        span,
                        NodeKind::MemberExpression {
                            object: expr,
                            property,
                            computed: false,
                        },
                    );
                }
                TokenKind::LBracket => {
                    self.advance();
                    let property = self.parse_expression()?;
                    let end = self.expect(TokenKind::RBracket)?.span;
                    let span = self.nodes[expr].span.merge(end);
                    expr = self.alloc(
                        span,
                        NodeKind::MemberExpression {
                            object: expr,
                            property,
                            computed: true,
                        },
                    );
                }
                TokenKind::LParen => {
                    let arguments = self.parse_arguments()?;
                    let span = self.nodes[expr].span.merge(self.prev_span());
                    expr = self.alloc(
                        span,
                        NodeKind::CallExpression {
                            callee: expr,
                            arguments,
                        },
                    );
                }
                TokenKind::TemplateFull(..) | TokenKind::TemplateHead(..) => {
                    return Err(ParseError::unsupported(
                        self.peek().span,
                        "tagged templates are not supported",
                    ));
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    fn parse_new(&mut self) -> ParseResult<NodeId> {
        let start = self.expect(TokenKind::New)?.span;
        let mut callee = if self.check(TokenKind::New) {
            self.parse_new()?
        } else {
            self.parse_primary()?
        };
        // member accesses bind to the callee before the argument list
        loop {
            match self.peek().kind {
                TokenKind::Dot => {
                    self.advance();
                    let (name, name_span) = self.expect_name()?;
                    let property = self.alloc(name_span, NodeKind::Identifier { name });
                    let span = self.nodes[callee].span.merge(name_span);
                    callee = self.alloc(
                        span,
                        NodeKind::MemberExpression {
                            object: callee,
                            property,
                            computed: false,
                        },
                    );
                }
                TokenKind::LBracket => {
                    self.advance();
                    let property = self.parse_expression()?;
                    let end = self.expect(TokenKind::RBracket)?.span;
                    let span = self.nodes[callee].span.merge(end);
                    callee = self.alloc(
                        span,
                        NodeKind::MemberExpression {
                            object: callee,
                            property,
                            computed: true,
                        },
                    );
                }
                _ => break,
            }
        }
        let arguments = if self.check(TokenKind::LParen) {
            self.parse_arguments()?
        } else {
            Vec::new()
        };
        let span = start.merge(self.prev_span());
        Ok(self.alloc(span, NodeKind::NewExpression { callee, arguments }))
    }

    fn parse_arguments(&mut self) -> ParseResult<Vec<NodeId>> {
        self.expect(TokenKind::LParen)?;
        let mut arguments = Vec::new();
        while !self.check(TokenKind::RParen) {
            if self.check(TokenKind::DotDotDot) {
                let start = self.advance().span;
                let argument = self.parse_assignment()?;
                let span = start.merge(self.nodes[argument].span);
                arguments.push(self.alloc(span, NodeKind::SpreadElement { argument }));
            } else {
                arguments.push(self.parse_assignment()?);
            }
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RParen)?;
        Ok(arguments)
    }

    fn parse_primary(&mut self) -> ParseResult<NodeId> {
        let token = self.peek().clone();
        match &token.kind {
            TokenKind::Number(n) => {
                self.advance();
                let raw = SmolStr::new(self.slice(token.span));
                Ok(self.alloc(
                    token.span,
                    NodeKind::Literal {
                        value: LiteralValue::Number(*n),
                        raw: Some(raw),
                    },
                ))
            }
            TokenKind::Str(s) => {
                self.advance();
                let raw = SmolStr::new(self.slice(token.span));
                Ok(self.alloc(
                    token.span,
                    NodeKind::Literal {
                        value: LiteralValue::Str(s.clone()),
                        raw: Some(raw),
                    },
                ))
            }
            TokenKind::Regex((pattern, flags)) => {
                self.advance();
                let raw = SmolStr::new(self.slice(token.span));
                Ok(self.alloc(
                    token.span,
                    NodeKind::Literal {
                        value: LiteralValue::Regex {
                            pattern: pattern.clone(),
                            flags: flags.clone(),
                        },
                        raw: Some(raw),
                    },
                ))
            }
            TokenKind::True | TokenKind::False => {
                self.advance();
                Ok(self.alloc(
                    token.span,
                    NodeKind::Literal {
                        value: LiteralValue::Bool(matches!(token.kind, TokenKind::True)),
                        raw: Some(SmolStr::new(self.slice(token.span))),
                    },
                ))
            }
            TokenKind::Null => {
                self.advance();
                Ok(self.alloc(
                    token.span,
                    NodeKind::Literal {
                        value: LiteralValue::Null,
                        raw: Some(SmolStr::new(self.slice(token.span))),
                    },
                ))
            }
            TokenKind::This => {
                self.advance();
                Ok(self.alloc(token.span, NodeKind::ThisExpression))
            }
            TokenKind::Ident(name)
                if name == "async" && matches!(self.peek_at(1).kind, TokenKind::Function) =>
            {
                self.advance();
                self.parse_function_expression(true)
            }
            TokenKind::Ident(name) => {
                self.advance();
                Ok(self.alloc(token.span, NodeKind::Identifier { name: name.clone() }))
            }
            TokenKind::Function => self.parse_function_expression(false),
            TokenKind::LParen => {
                self.advance();
                let saved = self.no_in;
                self.no_in = false;
                let expr = self.parse_expression()?;
                self.no_in = saved;
                self.expect(TokenKind::RParen)?;
                Ok(expr)
            }
            TokenKind::LBracket => self.parse_array_literal(),
            TokenKind::LBrace => self.parse_object_literal(),
            TokenKind::TemplateFull((cooked, raw)) => {
                self.advance();
                let quasi = self.alloc(
                    token.span,
                    NodeKind::TemplateElement {
                        cooked: cooked.clone(),
                        raw: raw.clone(),
                        tail: true,
                    },
                );
                Ok(self.alloc(
                    token.span,
                    NodeKind::TemplateLiteral {
                        quasis: vec![quasi],
                        expressions: vec![],
                    },
                ))
            }
            TokenKind::TemplateHead((cooked, raw)) => {
                self.advance();
                let mut quasis = vec![self.alloc(
                    token.span,
                    NodeKind::TemplateElement {
                        cooked: cooked.clone(),
                        raw: raw.clone(),
                        tail: false,
                    },
                )];
                let mut expressions = Vec::new();
                loop {
                    expressions.push(self.parse_expression()?);
                    let part = self.peek().clone();
                    match &part.kind {
                        TokenKind::TemplateMiddle((cooked, raw)) => {
                            self.advance();
                            quasis.push(self.alloc(
                                part.span,
                                NodeKind::TemplateElement {
                                    cooked: cooked.clone(),
                                    raw: raw.clone(),
                                    tail: false,
                                },
                            ));
                        }
                        TokenKind::TemplateTail((cooked, raw)) => {
                            self.advance();
                            quasis.push(self.alloc(
                                part.span,
                                NodeKind::TemplateElement {
                                    cooked: cooked.clone(),
                                    raw: raw.clone(),
                                    tail: true,
                                },
                            ));
                            break;
                        }
                        _ => return Err(ParseError::unexpected(&part, "template continuation")),
                    }
                }
                let span = token.span.merge(self.prev_span());
                Ok(self.alloc(
                    span,
                    NodeKind::TemplateLiteral {
                        quasis,
                        expressions,
                    },
                ))
            }
            _ => Err(ParseError::unexpected(&token, "expression")),
        }
    }

    fn parse_function_expression(&mut self, is_async: bool) -> ParseResult<NodeId> {
        let start = self.expect(TokenKind::Function)?.span;
        let id = if matches!(self.peek().kind, TokenKind::Ident(_)) {
            Some(self.expect_ident()?)
        } else {
            None
        };
        let params = self.parse_params()?;
        let body = self.parse_statement()?; // always a block
        let span = start.merge(self.nodes[body].span);
        Ok(self.alloc(
            span,
            NodeKind::FunctionExpression {
                id,
                params,
                body,
                is_async,
            },
        ))
    }

    fn parse_array_literal(&mut self) -> ParseResult<NodeId> {
        let start = self.expect(TokenKind::LBracket)?.span;
        let mut elements = Vec::new();
        while !self.check(TokenKind::RBracket) {
            if self.check(TokenKind::Comma) {
                self.advance();
                elements.push(None);
                continue;
            }
            if self.check(TokenKind::DotDotDot) {
                let spread_start = self.advance().span;
                let argument = self.parse_assignment()?;
                let span = spread_start.merge(self.nodes[argument].span);
                elements.push(Some(self.alloc(span, NodeKind::SpreadElement { argument })));
            } else {
                elements.push(Some(self.parse_assignment()?));
            }
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        let end = self.expect(TokenKind::RBracket)?.span;
        Ok(self.alloc(start.merge(end), NodeKind::ArrayExpression { elements }))
    }

    /// A property key: identifier (keywords allowed), string, number, or a
    /// computed `[expr]` key. Returns the key node and the computed flag.
    pub(crate) fn parse_property_key(&mut self) -> ParseResult<(NodeId, bool)> {
        let token = self.peek().clone();
        match &token.kind {
            TokenKind::LBracket => {
                self.advance();
                let key = self.parse_assignment()?;
                self.expect(TokenKind::RBracket)?;
                Ok((key, true))
            }
            TokenKind::Str(s) => {
                self.advance();
                let raw = SmolStr::new(self.slice(token.span));
                let key = self.alloc(
                    token.span,
                    NodeKind::Literal {
                        value: LiteralValue::Str(s.clone()),
                        raw: Some(raw),
                    },
                );
                Ok((key, false))
            }
            TokenKind::Number(n) => {
                self.advance();
                let raw = SmolStr::new(self.slice(token.span));
                let key = self.alloc(
                    token.span,
                    NodeKind::Literal {
                        value: LiteralValue::Number(*n),
                        raw: Some(raw),
                    },
                );
                Ok((key, false))
            }
            _ => {
                let (name, span) = self.expect_name()?;
                Ok((self.alloc(span, NodeKind::Identifier { name }), false))
            }
        }
    }

    fn parse_object_literal(&mut self) -> ParseResult<NodeId> {
        let start = self.expect(TokenKind::LBrace)?.span;
        let mut properties = Vec::new();
        while !self.check(TokenKind::RBrace) {
            if self.check(TokenKind::DotDotDot) {
                let spread_start = self.advance().span;
                let argument = self.parse_assignment()?;
                let span = spread_start.merge(self.nodes[argument].span);
                properties.push(self.alloc(span, NodeKind::SpreadElement { argument }));
            } else {
                properties.push(self.parse_object_property()?);
            }
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        let end = self.expect(TokenKind::RBrace)?.span;
        Ok(self.alloc(start.merge(end), NodeKind::ObjectExpression { properties }))
    }

    fn parse_object_property(&mut self) -> ParseResult<NodeId> {
        // accessor: `get name() {}` / `set name(v) {}`, unless `get`/`set`
        // is itself the key
        let accessor = match &self.peek().kind {
            TokenKind::Ident(name) if name == "get" || name == "set" => {
                let next = &self.peek_at(1).kind;
                let key_follows = matches!(
                    next,
                    TokenKind::Ident(_)
                        | TokenKind::Str(_)
                        | TokenKind::Number(_)
                        | TokenKind::LBracket
                ) || crate::keyword_name(next).is_some();
                if key_follows {
                    Some(if name == "get" {
                        PropertyKind::Get
                    } else {
                        PropertyKind::Set
                    })
                } else {
                    None
                }
            }
            _ => None,
        };

        if let Some(kind) = accessor {
            let start = self.advance().span;
            let (key, computed) = self.parse_property_key()?;
            let params = self.parse_params()?;
            let body = self.parse_statement()?;
            let fn_span = start.merge(self.nodes[body].span);
            let value = self.alloc(
                fn_span,
                NodeKind::FunctionExpression {
                    id: None,
                    params,
                    body,
                    is_async: false,
                },
            );
            let span = start.merge(fn_span);
            return Ok(self.alloc(
                span,
                NodeKind::Property {
                    key,
                    value,
                    kind,
                    computed,
                    shorthand: false,
                    method: false,
                },
            ));
        }

        let (key, computed) = self.parse_property_key()?;
        let key_span = self.nodes[key].span;

        if self.check(TokenKind::LParen) {
            // shorthand method
            let params = self.parse_params()?;
            let body = self.parse_statement()?;
            let fn_span = key_span.merge(self.nodes[body].span);
            let value = self.alloc(
                fn_span,
                NodeKind::FunctionExpression {
                    id: None,
                    params,
                    body,
                    is_async: false,
                },
            );
            return Ok(self.alloc(
                fn_span,
                NodeKind::Property {
                    key,
                    value,
                    kind: PropertyKind::Init,
                    computed,
                    shorthand: false,
                    method: true,
                },
            ));
        }

        if self.eat(TokenKind::Colon) {
            let value = self.parse_assignment()?;
            let span = key_span.merge(self.nodes[value].span);
            return Ok(self.alloc(
                span,
                NodeKind::Property {
                    key,
                    value,
                    kind: PropertyKind::Init,
                    computed,
                    shorthand: false,
                    method: false,
                },
            ));
        }

        // shorthand `{ a }`
        let name = match &self.nodes[key].kind {
            NodeKind::Identifier { name } => name.clone(),
            _ => return Err(ParseError::unexpected(self.peek(), "`:`")),
        };
        let value = self.alloc(key_span, NodeKind::Identifier { name });
        Ok(self.alloc(
            key_span,
            NodeKind::Property {
                key,
                value,
                kind: PropertyKind::Init,
                computed: false,
                shorthand: true,
                method: false,
            },
        ))
    }
}
