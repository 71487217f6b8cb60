// SPDX-License-Identifier: PMPL-1.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell

//! The AST printer.

use glueopt_ast::{
    Ast, Comment, LiteralValue, LogicalOp, NodeId, NodeKind, PropertyKind, UnaryOp,
};

use crate::{FormatConfig, Printed};

/// Precedence of an expression node, higher binds tighter. Statements and
/// other non-expression nodes report the maximum (they never need parens).
fn prec(kind: &NodeKind) -> u8 {
    use glueopt_ast::BinaryOp::*;
    match kind {
        NodeKind::SequenceExpression { .. } => 1,
        NodeKind::AssignmentExpression { .. } | NodeKind::ArrowFunctionExpression { .. } => 2,
        NodeKind::ConditionalExpression { .. } => 3,
        NodeKind::LogicalExpression { operator, .. } => match operator {
            LogicalOp::Nullish => 4,
            LogicalOp::Or => 5,
            LogicalOp::And => 6,
        },
        NodeKind::BinaryExpression { operator, .. } => match operator {
            BitOr => 7,
            BitXor => 8,
            BitAnd => 9,
            EqEq | NotEq | StrictEq | StrictNotEq => 10,
            Lt | Le | Gt | Ge | In | Instanceof => 11,
            Shl | Shr | UShr => 12,
            Add | Sub => 13,
            Mul | Div | Rem => 14,
            Pow => 15,
        },
        NodeKind::UnaryExpression { .. }
        | NodeKind::AwaitExpression { .. }
        | NodeKind::UpdateExpression { prefix: true, .. } => 16,
        NodeKind::UpdateExpression { prefix: false, .. } => 17,
        NodeKind::NewExpression { .. }
        | NodeKind::CallExpression { .. }
        | NodeKind::MemberExpression { .. } => 19,
        _ => 21,
    }
}

/// Does the leftmost token of this expression begin with `{` or `function`?
/// Such expressions need parens in statement position and as arrow bodies.
fn starts_with_hazard(ast: &Ast, id: NodeId) -> bool {
    match ast.kind(id) {
        NodeKind::ObjectExpression { .. }
        | NodeKind::FunctionExpression { .. } => true,
        NodeKind::SequenceExpression { expressions } => expressions
            .first()
            .is_some_and(|&first| starts_with_hazard(ast, first)),
        NodeKind::AssignmentExpression { left, .. }
        | NodeKind::BinaryExpression { left, .. }
        | NodeKind::LogicalExpression { left, .. } => starts_with_hazard(ast, *left),
        NodeKind::ConditionalExpression { test, .. } => starts_with_hazard(ast, *test),
        NodeKind::MemberExpression { object, .. } => starts_with_hazard(ast, *object),
        NodeKind::CallExpression { callee, .. } => starts_with_hazard(ast, *callee),
        NodeKind::UpdateExpression {
            prefix: false,
            argument,
            ..
        } => starts_with_hazard(ast, *argument),
        _ => false,
    }
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$'
}

/// Pretty printer over the arena AST.
pub struct Printer<'a> {
    ast: &'a Ast,
    config: &'a FormatConfig,
    output: String,
    indent_level: usize,
    needs_indent: bool,
    comments: &'a [Comment],
    comment_idx: usize,
}

impl<'a> Printer<'a> {
    pub fn new(ast: &'a Ast, config: &'a FormatConfig) -> Self {
        Self {
            ast,
            config,
            output: String::new(),
            indent_level: 0,
            needs_indent: true,
            comments: &ast.comments,
            comment_idx: 0,
        }
    }

    pub fn finish(mut self) -> Printed {
        if self.config.comments {
            let at_end = u32::MAX;
            self.flush_comments(at_end);
        }
        if !self.output.ends_with('\n') {
            self.output.push('\n');
        }
        let dropped_comments = self.comments.len() - self.comment_idx;
        Printed {
            output: self.output,
            dropped_comments,
        }
    }

    // === Low-level writing ===

    fn write_indent(&mut self) {
        if !self.config.minify {
            for _ in 0..self.indent_level {
                self.output.push_str("  ");
            }
        }
    }

    fn raw(&mut self, s: &str) {
        if self.needs_indent && !s.is_empty() {
            self.write_indent();
            self.needs_indent = false;
        }
        self.output.push_str(s);
    }

    /// Punctuation. Keeps `+ +`, `- -`, and `/ /` apart.
    fn sym(&mut self, s: &str) {
        if let (Some(last), Some(first)) = (self.output.chars().last(), s.chars().next()) {
            if !self.needs_indent
                && ((last == '+' && first == '+')
                    || (last == '-' && first == '-')
                    || (last == '/' && first == '/'))
            {
                self.output.push(' ');
            }
        }
        self.raw(s);
    }

    /// A keyword, identifier, or number. Inserts a space when glued to a
    /// preceding word character.
    fn word(&mut self, s: &str) {
        if let (Some(last), Some(first)) = (self.output.chars().last(), s.chars().next()) {
            if !self.needs_indent && is_word_char(last) && is_word_char(first) {
                self.output.push(' ');
            }
        }
        self.raw(s);
    }

    /// Optional whitespace, elided in minified mode.
    fn space(&mut self) {
        if !self.config.minify && !self.needs_indent {
            self.output.push(' ');
        }
    }

    fn newline(&mut self) {
        if !self.config.minify {
            self.output.push('\n');
            self.needs_indent = true;
        }
    }

    fn indent(&mut self) {
        self.indent_level += 1;
    }

    fn dedent(&mut self) {
        if self.indent_level > 0 {
            self.indent_level -= 1;
        }
    }

    /// Emit comments positioned before `before` in the original source.
    fn flush_comments(&mut self, before: u32) {
        if !self.config.comments || self.config.minify {
            return;
        }
        while self.comment_idx < self.comments.len()
            && self.comments[self.comment_idx].span.start < before
        {
            let comment = &self.comments[self.comment_idx];
            if comment.block {
                let text = format!("/*{}*/", comment.text);
                self.raw(&text);
            } else {
                let text = format!("//{}", comment.text);
                self.raw(&text);
            }
            self.newline();
            self.comment_idx += 1;
        }
    }

    // === Statements ===

    pub fn print_program(&mut self) {
        let NodeKind::Program { body } = self.ast.kind(self.ast.root) else {
            return;
        };
        self.statement_list(body.clone());
    }

    fn statement_list(&mut self, body: Vec<NodeId>) {
        for stmt in body {
            if matches!(self.ast.kind(stmt), NodeKind::EmptyStatement) {
                continue;
            }
            self.flush_comments(self.ast[stmt].span.start);
            self.stmt(stmt);
            self.newline();
        }
    }

    fn stmt(&mut self, id: NodeId) {
        match self.ast.kind(id) {
            NodeKind::EmptyStatement => self.sym(";"),
            NodeKind::BlockStatement { body } => {
                let body = body.clone();
                let all_empty = body
                    .iter()
                    .all(|&s| matches!(self.ast.kind(s), NodeKind::EmptyStatement));
                if all_empty {
                    self.sym("{");
                    self.sym("}");
                    return;
                }
                self.sym("{");
                self.newline();
                self.indent();
                self.statement_list(body);
                self.dedent();
                self.sym("}");
            }
            NodeKind::ExpressionStatement { expression, .. } => {
                let expression = *expression;
                if starts_with_hazard(self.ast, expression) {
                    self.sym("(");
                    self.expr(expression, 0);
                    self.sym(")");
                } else {
                    self.expr(expression, 1);
                }
                self.sym(";");
            }
            NodeKind::VariableDeclaration { .. } => {
                self.variable_declaration(id);
                self.sym(";");
            }
            NodeKind::FunctionDeclaration {
                id: fn_id,
                params,
                body,
                is_async,
            } => {
                let (fn_id, params, body, is_async) =
                    (*fn_id, params.clone(), *body, *is_async);
                if is_async {
                    self.word("async");
                }
                self.word("function");
                self.space();
                self.expr(fn_id, 21);
                self.param_list(&params);
                self.space();
                self.stmt(body);
            }
            NodeKind::ReturnStatement { argument } => {
                let argument = *argument;
                self.word("return");
                if let Some(argument) = argument {
                    self.space();
                    self.expr(argument, 1);
                }
                self.sym(";");
            }
            NodeKind::IfStatement {
                test,
                consequent,
                alternate,
            } => {
                let (test, consequent, alternate) = (*test, *consequent, *alternate);
                self.word("if");
                self.space();
                self.sym("(");
                self.expr(test, 0);
                self.sym(")");
                self.body_stmt(consequent);
                if let Some(alternate) = alternate {
                    self.space();
                    self.word("else");
                    self.body_stmt(alternate);
                }
            }
            NodeKind::ForStatement {
                init,
                test,
                update,
                body,
            } => {
                let (init, test, update, body) = (*init, *test, *update, *body);
                self.word("for");
                self.space();
                self.sym("(");
                if let Some(init) = init {
                    match self.ast.kind(init) {
                        NodeKind::VariableDeclaration { .. } => self.variable_declaration(init),
                        NodeKind::ExpressionStatement { expression, .. } => {
                            self.expr(*expression, 1)
                        }
                        _ => self.expr(init, 1),
                    }
                }
                self.sym(";");
                if let Some(test) = test {
                    self.space();
                    self.expr(test, 0);
                }
                self.sym(";");
                if let Some(update) = update {
                    self.space();
                    self.expr(update, 0);
                }
                self.sym(")");
                self.body_stmt(body);
            }
            NodeKind::ForInStatement { left, right, body }
            | NodeKind::ForOfStatement { left, right, body } => {
                let of = matches!(self.ast.kind(id), NodeKind::ForOfStatement { .. });
                let (left, right, body) = (*left, *right, *body);
                self.word("for");
                self.space();
                self.sym("(");
                match self.ast.kind(left) {
                    NodeKind::VariableDeclaration { .. } => self.variable_declaration(left),
                    _ => self.expr(left, 1),
                }
                self.word(if of { "of" } else { "in" });
                self.expr(right, 1);
                self.sym(")");
                self.body_stmt(body);
            }
            NodeKind::WhileStatement { test, body } => {
                let (test, body) = (*test, *body);
                self.word("while");
                self.space();
                self.sym("(");
                self.expr(test, 0);
                self.sym(")");
                self.body_stmt(body);
            }
            NodeKind::DoWhileStatement { body, test } => {
                let (body, test) = (*body, *test);
                self.word("do");
                self.space();
                self.stmt(body);
                self.space();
                self.word("while");
                self.space();
                self.sym("(");
                self.expr(test, 0);
                self.sym(")");
                self.sym(";");
            }
            NodeKind::BreakStatement { label } => {
                let label = *label;
                self.word("break");
                if let Some(label) = label {
                    self.space();
                    self.expr(label, 21);
                }
                self.sym(";");
            }
            NodeKind::ContinueStatement { label } => {
                let label = *label;
                self.word("continue");
                if let Some(label) = label {
                    self.space();
                    self.expr(label, 21);
                }
                self.sym(";");
            }
            NodeKind::LabeledStatement { label, body } => {
                let (label, body) = (*label, *body);
                self.expr(label, 21);
                self.sym(":");
                self.space();
                self.stmt(body);
            }
            NodeKind::SwitchStatement {
                discriminant,
                cases,
            } => {
                let (discriminant, cases) = (*discriminant, cases.clone());
                self.word("switch");
                self.space();
                self.sym("(");
                self.expr(discriminant, 0);
                self.sym(")");
                self.space();
                self.sym("{");
                self.newline();
                self.indent();
                for case in cases {
                    let NodeKind::SwitchCase { test, consequent } = self.ast.kind(case) else {
                        continue;
                    };
                    let (test, consequent) = (*test, consequent.clone());
                    match test {
                        Some(test) => {
                            self.word("case");
                            self.space();
                            self.expr(test, 1);
                            self.sym(":");
                        }
                        None => {
                            self.word("default");
                            self.sym(":");
                        }
                    }
                    self.newline();
                    self.indent();
                    self.statement_list(consequent);
                    self.dedent();
                }
                self.dedent();
                self.sym("}");
            }
            NodeKind::ThrowStatement { argument } => {
                let argument = *argument;
                self.word("throw");
                self.space();
                self.expr(argument, 1);
                self.sym(";");
            }
            NodeKind::TryStatement {
                block,
                handler,
                finalizer,
            } => {
                let (block, handler, finalizer) = (*block, *handler, *finalizer);
                self.word("try");
                self.space();
                self.stmt(block);
                if let Some(handler) = handler {
                    let NodeKind::CatchClause { param, body } = self.ast.kind(handler) else {
                        unreachable!("try handler is a catch clause");
                    };
                    let (param, body) = (*param, *body);
                    self.space();
                    self.word("catch");
                    if let Some(param) = param {
                        self.space();
                        self.sym("(");
                        self.expr(param, 21);
                        self.sym(")");
                    }
                    self.space();
                    self.stmt(body);
                }
                if let Some(finalizer) = finalizer {
                    self.space();
                    self.word("finally");
                    self.space();
                    self.stmt(finalizer);
                }
            }
            NodeKind::ExportNamedDeclaration {
                declaration,
                specifiers,
            } => {
                let (declaration, specifiers) = (*declaration, specifiers.clone());
                self.word("export");
                self.space();
                if let Some(declaration) = declaration {
                    self.stmt(declaration);
                } else {
                    self.sym("{");
                    for (i, spec) in specifiers.iter().enumerate() {
                        if i > 0 {
                            self.sym(",");
                            self.space();
                        }
                        let NodeKind::ExportSpecifier { local, exported } = self.ast.kind(*spec)
                        else {
                            continue;
                        };
                        let (local, exported) = (*local, *exported);
                        self.expr(local, 21);
                        if self.ast.ident_name(local) != self.ast.ident_name(exported) {
                            self.word("as");
                            self.expr(exported, 21);
                        }
                    }
                    self.sym("}");
                    self.sym(";");
                }
            }
            NodeKind::ExportDefaultDeclaration { declaration } => {
                let declaration = *declaration;
                self.word("export");
                self.word("default");
                self.space();
                if matches!(
                    self.ast.kind(declaration),
                    NodeKind::FunctionDeclaration { .. }
                ) {
                    self.stmt(declaration);
                } else {
                    self.expr(declaration, 2);
                    self.sym(";");
                }
            }
            NodeKind::ImportDeclaration { specifiers, source } => {
                let (specifiers, source) = (specifiers.clone(), *source);
                self.word("import");
                self.space();
                if !specifiers.is_empty() {
                    let mut named_open = false;
                    let mut first = true;
                    for spec in specifiers {
                        match self.ast.kind(spec) {
                            NodeKind::ImportDefaultSpecifier { local } => {
                                let local = *local;
                                if !first {
                                    self.sym(",");
                                    self.space();
                                }
                                self.expr(local, 21);
                            }
                            NodeKind::ImportNamespaceSpecifier { local } => {
                                let local = *local;
                                if !first {
                                    self.sym(",");
                                    self.space();
                                }
                                self.sym("*");
                                self.word("as");
                                self.expr(local, 21);
                            }
                            NodeKind::ImportSpecifier { local, imported } => {
                                let (local, imported) = (*local, *imported);
                                if !named_open {
                                    if !first {
                                        self.sym(",");
                                        self.space();
                                    }
                                    self.sym("{");
                                    named_open = true;
                                } else {
                                    self.sym(",");
                                    self.space();
                                }
                                self.expr(imported, 21);
                                if self.ast.ident_name(local) != self.ast.ident_name(imported) {
                                    self.word("as");
                                    self.expr(local, 21);
                                }
                            }
                            _ => {}
                        }
                        first = false;
                    }
                    if named_open {
                        self.sym("}");
                    }
                    self.space();
                    self.word("from");
                    self.space();
                }
                self.expr(source, 21);
                self.sym(";");
            }
            // a bare declarator list can only appear through pass rewrites
            _ => self.expr(id, 0),
        }
    }

    fn variable_declaration(&mut self, id: NodeId) {
        let NodeKind::VariableDeclaration {
            kind,
            declarations,
        } = self.ast.kind(id)
        else {
            return;
        };
        let (kind, declarations) = (*kind, declarations.clone());
        self.word(kind.as_str());
        self.space();
        let mut first = true;
        for decl in declarations {
            if matches!(self.ast.kind(decl), NodeKind::EmptyStatement) {
                continue;
            }
            if !first {
                self.sym(",");
                self.space();
            }
            first = false;
            let NodeKind::VariableDeclarator { id, init } = self.ast.kind(decl) else {
                continue;
            };
            let (target, init) = (*id, *init);
            self.expr(target, 21);
            if let Some(init) = init {
                self.space();
                self.sym("=");
                self.space();
                self.expr(init, 2);
            }
        }
    }

    /// A statement in single-statement position (loop body, if branch).
    /// An erased/empty body prints as a bare `;` with no leading space.
    fn body_stmt(&mut self, body: NodeId) {
        if matches!(self.ast.kind(body), NodeKind::EmptyStatement) {
            self.sym(";");
        } else {
            self.space();
            self.stmt(body);
        }
    }

    fn param_list(&mut self, params: &[NodeId]) {
        self.sym("(");
        for (i, &param) in params.iter().enumerate() {
            if i > 0 {
                self.sym(",");
                self.space();
            }
            self.expr(param, 2);
        }
        self.sym(")");
    }

    // === Expressions ===

    fn expr(&mut self, id: NodeId, min_prec: u8) {
        let needs_parens = prec(self.ast.kind(id)) < min_prec;
        if needs_parens {
            self.sym("(");
            self.expr_inner(id);
            self.sym(")");
        } else {
            self.expr_inner(id);
        }
    }

    fn expr_inner(&mut self, id: NodeId) {
        match self.ast.kind(id) {
            NodeKind::Identifier { name } => {
                let name = name.clone();
                self.word(&name);
            }
            NodeKind::Literal { value, raw } => {
                if let Some(raw) = raw {
                    let raw = raw.clone();
                    self.word(&raw);
                    return;
                }
                match value.clone() {
                    LiteralValue::Null => self.word("null"),
                    LiteralValue::Bool(true) => self.word("true"),
                    LiteralValue::Bool(false) => self.word("false"),
                    LiteralValue::Number(n) => {
                        let text = format_number(n);
                        self.word(&text);
                    }
                    LiteralValue::Str(s) => {
                        let text = quote_string(&s);
                        self.raw(&text);
                    }
                    LiteralValue::Regex { pattern, flags } => {
                        let text = format!("/{pattern}/{flags}");
                        self.sym(&text);
                    }
                }
            }
            NodeKind::ThisExpression => self.word("this"),
            NodeKind::SequenceExpression { expressions } => {
                let expressions = expressions.clone();
                for (i, expr) in expressions.iter().enumerate() {
                    if i > 0 {
                        self.sym(",");
                        self.space();
                    }
                    self.expr(*expr, 2);
                }
            }
            NodeKind::AssignmentExpression {
                operator,
                left,
                right,
            } => {
                let (operator, left, right) = (*operator, *left, *right);
                self.expr(left, 3);
                self.space();
                self.sym(operator.as_str());
                self.space();
                self.expr(right, 2);
            }
            NodeKind::ConditionalExpression {
                test,
                consequent,
                alternate,
            } => {
                let (test, consequent, alternate) = (*test, *consequent, *alternate);
                self.expr(test, 4);
                self.space();
                self.sym("?");
                self.space();
                self.expr(consequent, 2);
                self.space();
                self.sym(":");
                self.space();
                self.expr(alternate, 2);
            }
            NodeKind::LogicalExpression {
                operator,
                left,
                right,
            } => {
                let (operator, left, right) = (*operator, *left, *right);
                let own = prec(self.ast.kind(id));
                // `??` must not mix bare with `&&`/`||`
                let force_left = operator == LogicalOp::Nullish
                    && matches!(
                        self.ast.kind(left),
                        NodeKind::LogicalExpression { operator, .. }
                            if *operator != LogicalOp::Nullish
                    );
                if force_left {
                    self.sym("(");
                    self.expr(left, 0);
                    self.sym(")");
                } else {
                    self.expr(left, own);
                }
                self.space();
                if operator == LogicalOp::And || operator == LogicalOp::Or {
                    self.sym(operator.as_str());
                } else {
                    self.sym("??");
                }
                self.space();
                let force_right = operator == LogicalOp::Nullish
                    && matches!(
                        self.ast.kind(right),
                        NodeKind::LogicalExpression { operator, .. }
                            if *operator != LogicalOp::Nullish
                    );
                if force_right {
                    self.sym("(");
                    self.expr(right, 0);
                    self.sym(")");
                } else {
                    self.expr(right, own + 1);
                }
            }
            NodeKind::BinaryExpression {
                operator,
                left,
                right,
            } => {
                let (operator, left, right) = (*operator, *left, *right);
                let own = prec(self.ast.kind(id));
                let right_assoc = matches!(operator, glueopt_ast::BinaryOp::Pow);
                self.expr(left, if right_assoc { own + 1 } else { own });
                self.space();
                if matches!(
                    operator,
                    glueopt_ast::BinaryOp::In | glueopt_ast::BinaryOp::Instanceof
                ) {
                    self.word(operator.as_str());
                } else {
                    self.sym(operator.as_str());
                }
                self.space();
                self.expr(right, if right_assoc { own } else { own + 1 });
            }
            NodeKind::UnaryExpression { operator, argument } => {
                let (operator, argument) = (*operator, *argument);
                if operator.is_word() {
                    self.word(operator.as_str());
                    self.space();
                } else {
                    self.sym(operator.as_str());
                }
                // -(-x) and friends: parenthesize a same-sign nested operator
                let same_sign = match (operator, self.ast.kind(argument)) {
                    (UnaryOp::Minus, NodeKind::UnaryExpression { operator, .. }) => {
                        *operator == UnaryOp::Minus
                    }
                    (UnaryOp::Plus, NodeKind::UnaryExpression { operator, .. }) => {
                        *operator == UnaryOp::Plus
                    }
                    (
                        UnaryOp::Minus,
                        NodeKind::UpdateExpression {
                            operator: glueopt_ast::UpdateOp::Dec,
                            prefix: true,
                            ..
                        },
                    ) => true,
                    (
                        UnaryOp::Plus,
                        NodeKind::UpdateExpression {
                            operator: glueopt_ast::UpdateOp::Inc,
                            prefix: true,
                            ..
                        },
                    ) => true,
                    _ => false,
                };
                if same_sign {
                    self.sym("(");
                    self.expr(argument, 0);
                    self.sym(")");
                } else {
                    self.expr(argument, 16);
                }
            }
            NodeKind::UpdateExpression {
                operator,
                argument,
                prefix,
            } => {
                let (operator, argument, prefix) = (*operator, *argument, *prefix);
                if prefix {
                    self.sym(operator.as_str());
                    self.expr(argument, 16);
                } else {
                    self.expr(argument, 17);
                    self.sym(operator.as_str());
                }
            }
            NodeKind::AwaitExpression { argument } => {
                let argument = *argument;
                self.word("await");
                self.space();
                self.expr(argument, 16);
            }
            NodeKind::MemberExpression {
                object,
                property,
                computed,
            } => {
                let (object, property, computed) = (*object, *property, *computed);
                // a numeric literal object would swallow the dot
                let numeric_object = matches!(
                    self.ast.kind(object),
                    NodeKind::Literal {
                        value: LiteralValue::Number(_),
                        ..
                    }
                );
                if numeric_object {
                    self.sym("(");
                    self.expr(object, 0);
                    self.sym(")");
                } else {
                    self.expr(object, 19);
                }
                if computed {
                    self.sym("[");
                    self.expr(property, 0);
                    self.sym("]");
                } else {
                    self.sym(".");
                    self.expr(property, 21);
                }
            }
            NodeKind::CallExpression { callee, arguments } => {
                let (callee, arguments) = (*callee, arguments.clone());
                self.expr(callee, 19);
                self.argument_list(&arguments);
            }
            NodeKind::NewExpression { callee, arguments } => {
                let (callee, arguments) = (*callee, arguments.clone());
                self.word("new");
                self.space();
                if matches!(self.ast.kind(callee), NodeKind::CallExpression { .. }) {
                    self.sym("(");
                    self.expr(callee, 0);
                    self.sym(")");
                } else {
                    self.expr(callee, 19);
                }
                self.argument_list(&arguments);
            }
            NodeKind::ArrayExpression { elements } | NodeKind::ArrayPattern { elements } => {
                let elements = elements.clone();
                self.sym("[");
                for (i, element) in elements.iter().enumerate() {
                    if i > 0 {
                        self.sym(",");
                        self.space();
                    }
                    if let Some(element) = element {
                        self.expr(*element, 2);
                    }
                }
                self.sym("]");
            }
            NodeKind::ObjectExpression { properties }
            | NodeKind::ObjectPattern { properties } => {
                let properties = properties.clone();
                self.sym("{");
                for (i, &prop) in properties.iter().enumerate() {
                    if i > 0 {
                        self.sym(",");
                        self.space();
                    }
                    self.property(prop);
                }
                self.sym("}");
            }
            NodeKind::SpreadElement { argument } | NodeKind::RestElement { argument } => {
                let argument = *argument;
                self.sym("...");
                self.expr(argument, 2);
            }
            NodeKind::AssignmentPattern { left, right } => {
                let (left, right) = (*left, *right);
                self.expr(left, 21);
                self.space();
                self.sym("=");
                self.space();
                self.expr(right, 2);
            }
            NodeKind::FunctionExpression {
                id: fn_id,
                params,
                body,
                is_async,
            } => {
                let (fn_id, params, body, is_async) =
                    (*fn_id, params.clone(), *body, *is_async);
                if is_async {
                    self.word("async");
                }
                self.word("function");
                if let Some(fn_id) = fn_id {
                    self.space();
                    self.expr(fn_id, 21);
                } else {
                    self.space();
                }
                self.param_list(&params);
                self.space();
                self.stmt(body);
            }
            NodeKind::ArrowFunctionExpression {
                params,
                body,
                expression,
                is_async,
            } => {
                let (params, body, expression, is_async) =
                    (params.clone(), *body, *expression, *is_async);
                if is_async {
                    self.word("async");
                    self.space();
                }
                let single_ident = params.len() == 1
                    && matches!(self.ast.kind(params[0]), NodeKind::Identifier { .. });
                if single_ident {
                    self.expr(params[0], 21);
                } else {
                    self.param_list(&params);
                }
                self.space();
                self.sym("=>");
                self.space();
                if expression {
                    if starts_with_hazard(self.ast, body) {
                        self.sym("(");
                        self.expr(body, 0);
                        self.sym(")");
                    } else {
                        self.expr(body, 2);
                    }
                } else {
                    self.stmt(body);
                }
            }
            NodeKind::TemplateLiteral {
                quasis,
                expressions,
            } => {
                let (quasis, expressions) = (quasis.clone(), expressions.clone());
                self.raw("`");
                for (i, &quasi) in quasis.iter().enumerate() {
                    if let NodeKind::TemplateElement { raw, .. } = self.ast.kind(quasi) {
                        let raw = raw.clone();
                        self.raw(&raw);
                    }
                    if i < expressions.len() {
                        self.raw("${");
                        self.expr(expressions[i], 0);
                        self.raw("}");
                    }
                }
                self.raw("`");
            }
            NodeKind::Property { .. } => self.property(id),
            NodeKind::EmptyStatement => {}
            other => {
                // statements reached through expression positions only occur
                // for bodies; print them as statements
                let _ = other;
                self.stmt(id);
            }
        }
    }

    fn property(&mut self, id: NodeId) {
        let NodeKind::Property {
            key,
            value,
            kind,
            computed,
            shorthand,
            method,
        } = self.ast.kind(id)
        else {
            if let NodeKind::SpreadElement { .. } | NodeKind::RestElement { .. } =
                self.ast.kind(id)
            {
                self.expr_inner(id);
            }
            return;
        };
        let (key, value, kind, computed, shorthand, method) =
            (*key, *value, *kind, *computed, *shorthand, *method);

        if shorthand {
            self.expr(value, 21);
            return;
        }

        match kind {
            PropertyKind::Get => {
                self.word("get");
                self.space();
            }
            PropertyKind::Set => {
                self.word("set");
                self.space();
            }
            PropertyKind::Init => {}
        }

        if computed {
            self.sym("[");
            self.expr(key, 2);
            self.sym("]");
        } else {
            self.expr(key, 21);
        }

        if method || kind != PropertyKind::Init {
            // shorthand method or accessor: print the function parts
            if let NodeKind::FunctionExpression { params, body, .. } = self.ast.kind(value) {
                let (params, body) = (params.clone(), *body);
                self.param_list(&params);
                self.space();
                self.stmt(body);
            }
            return;
        }

        self.sym(":");
        self.space();
        self.expr(value, 2);
    }

    fn argument_list(&mut self, arguments: &[NodeId]) {
        self.sym("(");
        for (i, &arg) in arguments.iter().enumerate() {
            if i > 0 {
                self.sym(",");
                self.space();
            }
            self.expr(arg, 2);
        }
        self.sym(")");
    }
}

/// Shortest JavaScript spelling of a number value.
fn format_number(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n < 0.0 { "-Infinity" } else { "Infinity" }.to_string();
    }
    format!("{n}")
}

/// Double-quoted string with JavaScript escapes.
fn quote_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\0' => out.push_str("\\0"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\x{:02x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::{format_number, quote_string};

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(4.0), "4");
        assert_eq!(format_number(0.5), "0.5");
        assert_eq!(format_number(-3.0), "-3");
    }

    #[test]
    fn test_quote_string() {
        assert_eq!(quote_string("a\"b"), "\"a\\\"b\"");
        assert_eq!(quote_string("a\nb"), "\"a\\nb\"");
    }
}
