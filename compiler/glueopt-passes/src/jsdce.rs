// SPDX-License-Identifier: PMPL-1.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell

//! JSDCE and AJSDCE: scope-tracked elimination of unused bindings.
//!
//! One iteration runs two sub-walks. The collection walk maintains a stack
//! of per-function scope frames and records, for every name, whether it is
//! defined, used, or a parameter in that frame. Lookup is strictly
//! top-of-stack: a use that the frame does not define propagates one level
//! up as a synthetic use when the frame pops. The cleanup walk then runs
//! over the function body that just popped, erasing declarators, function
//! declarations, and (in aggressive mode) effect-free expression statements
//! whose names are in the frame's removal set.
//!
//! `AJSDCE` repeats aggressive iterations until one removes nothing.

use glueopt_ast::helpers::{empty_out, has_side_effects, is_empty, pattern_parts};
use glueopt_ast::walk::{recursive_walk, RecursiveVisitor};
use glueopt_ast::{Ast, Ident, NodeId, NodeKind};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::{PassContext, PassError};

/// One iteration of non-aggressive elimination.
pub fn jsdce(ast: &mut Ast, _cx: &mut PassContext) -> Result<(), PassError> {
    iteration(ast, false);
    Ok(())
}

/// Aggressive elimination to a fixed point.
pub fn ajsdce(ast: &mut Ast, _cx: &mut PassContext) -> Result<(), PassError> {
    while iteration(ast, true) > 0 {}
    Ok(())
}

#[derive(Debug, Default, Clone, Copy)]
struct Binding {
    def: bool,
    used: bool,
    param: bool,
}

type ScopeFrame = FxHashMap<Ident, Binding>;

/// Run one collection + cleanup iteration. Returns the number of erasures.
fn iteration(ast: &mut Ast, aggressive: bool) -> usize {
    let mut collector = Collector {
        scopes: vec![ScopeFrame::default()],
        aggressive,
        removed: 0,
    };
    let root = ast.root;
    recursive_walk(ast, root, &mut collector);

    // top level: no outer frame to propagate into, parameters impossible
    let frame = collector.scopes.pop().expect("top-level frame");
    let mut removal = FxHashSet::default();
    for (name, binding) in &frame {
        if binding.def && !binding.used {
            removal.insert(name.clone());
        }
    }
    collector.removed + clean_up(ast, root, &removal, aggressive)
}

struct Collector {
    scopes: Vec<ScopeFrame>,
    aggressive: bool,
    removed: usize,
}

impl Collector {
    fn top(&mut self) -> &mut ScopeFrame {
        self.scopes.last_mut().expect("scope stack is never empty")
    }

    fn mark_def(&mut self, name: &Ident) {
        self.top().entry(name.clone()).or_default().def = true;
    }

    fn mark_use(&mut self, name: &Ident) {
        self.top().entry(name.clone()).or_default().used = true;
    }

    fn mark_param(&mut self, name: &Ident) {
        let binding = self.top().entry(name.clone()).or_default();
        binding.def = true;
        binding.param = true;
    }

    /// Enter a function: push a frame, bind parameters, walk the body, pop
    /// the frame, propagate free uses outward, and clean the body with this
    /// frame's removal set.
    fn handle_function(&mut self, ast: &mut Ast, node: NodeId, defun: bool) {
        let (own_name, params, body) = match ast.kind(node) {
            NodeKind::FunctionDeclaration {
                id, params, body, ..
            } => (ast.ident_name(*id).cloned(), params.clone(), *body),
            NodeKind::FunctionExpression {
                id, params, body, ..
            } => (
                id.and_then(|id| ast.ident_name(id).cloned()),
                params.clone(),
                *body,
            ),
            NodeKind::ArrowFunctionExpression { params, body, .. } => {
                (None, params.clone(), *body)
            }
            _ => return,
        };

        // a defun's name binds in the enclosing scope; the name of a
        // function *expression* binds nowhere (it only serves stack traces)
        if defun {
            if let Some(name) = &own_name {
                self.mark_def(name);
            }
        }

        self.scopes.push(ScopeFrame::default());
        for param in params {
            let (bound, exprs) = pattern_parts(ast, param);
            for ident in bound {
                let name = ast.ident_name(ident).cloned().unwrap_or_default();
                self.mark_param(&name);
            }
            for expr in exprs {
                recursive_walk(ast, expr, self);
            }
        }
        recursive_walk(ast, body, self);
        let frame = self.scopes.pop().expect("function frame");

        // self-references do not keep a defun alive
        let own_name = if defun { own_name } else { None };
        let mut removal = FxHashSet::default();
        for (name, binding) in &frame {
            if own_name.as_ref() == Some(name) {
                continue;
            }
            if binding.used && !binding.def {
                // free reference, satisfied (or not) further out
                self.mark_use(name);
            } else if binding.def && !binding.used && !binding.param {
                removal.insert(name.clone());
            }
        }
        self.removed += clean_up(ast, body, &removal, self.aggressive);
    }
}

impl RecursiveVisitor for Collector {
    fn visit(&mut self, ast: &mut Ast, node: NodeId) -> bool {
        match ast.kind(node) {
            NodeKind::VariableDeclarator { id, init } => {
                let (id, init) = (*id, *init);
                let (bound, exprs) = pattern_parts(ast, id);
                for ident in bound {
                    let name = ast.ident_name(ident).cloned().unwrap_or_default();
                    self.mark_def(&name);
                }
                for expr in exprs {
                    recursive_walk(ast, expr, self);
                }
                if let Some(init) = init {
                    recursive_walk(ast, init, self);
                }
                true
            }
            NodeKind::ObjectExpression { properties } => {
                // property keys are not identifier uses
                for prop in properties.clone() {
                    match ast.kind(prop) {
                        NodeKind::Property {
                            key,
                            value,
                            computed,
                            ..
                        } => {
                            let (key, value, computed) = (*key, *value, *computed);
                            if computed {
                                recursive_walk(ast, key, self);
                            }
                            recursive_walk(ast, value, self);
                        }
                        NodeKind::SpreadElement { argument } => {
                            let argument = *argument;
                            recursive_walk(ast, argument, self);
                        }
                        _ => {}
                    }
                }
                true
            }
            NodeKind::MemberExpression {
                object,
                property,
                computed,
            } => {
                let (object, property, computed) = (*object, *property, *computed);
                recursive_walk(ast, object, self);
                if computed {
                    recursive_walk(ast, property, self);
                }
                true
            }
            NodeKind::FunctionDeclaration { .. } => {
                self.handle_function(ast, node, true);
                true
            }
            NodeKind::FunctionExpression { .. } | NodeKind::ArrowFunctionExpression { .. } => {
                self.handle_function(ast, node, false);
                true
            }
            NodeKind::Identifier { name } => {
                let name = name.clone();
                self.mark_use(&name);
                true
            }
            NodeKind::ExportNamedDeclaration {
                declaration,
                specifiers,
            } => {
                let (declaration, specifiers) = (*declaration, specifiers.clone());
                if let Some(declaration) = declaration {
                    recursive_walk(ast, declaration, self);
                    // exported declarations stay live
                    match ast.kind(declaration) {
                        NodeKind::VariableDeclaration { declarations, .. } => {
                            for decl in declarations.clone() {
                                if let NodeKind::VariableDeclarator { id, .. } = ast.kind(decl) {
                                    let id = *id;
                                    let (bound, _) = pattern_parts(ast, id);
                                    for ident in bound {
                                        let name =
                                            ast.ident_name(ident).cloned().unwrap_or_default();
                                        self.mark_use(&name);
                                    }
                                }
                            }
                        }
                        NodeKind::FunctionDeclaration { id, .. } => {
                            let name = ast.ident_name(*id).cloned().unwrap_or_default();
                            self.mark_use(&name);
                        }
                        _ => {}
                    }
                }
                for spec in specifiers {
                    if let NodeKind::ExportSpecifier { local, .. } = ast.kind(spec) {
                        let name = ast.ident_name(*local).cloned().unwrap_or_default();
                        self.mark_use(&name);
                    }
                }
                true
            }
            NodeKind::ExportDefaultDeclaration { declaration } => {
                let declaration = *declaration;
                if let NodeKind::FunctionDeclaration { id, .. } = ast.kind(declaration) {
                    let name = ast.ident_name(*id).cloned().unwrap_or_default();
                    self.mark_use(&name);
                }
                recursive_walk(ast, declaration, self);
                true
            }
            _ => false,
        }
    }
}

/// The cleanup walk over one function body (or the top level).
fn clean_up(ast: &mut Ast, body: NodeId, names: &FxHashSet<Ident>, aggressive: bool) -> usize {
    let mut cleaner = Cleaner {
        names,
        aggressive,
        removed: 0,
    };
    recursive_walk(ast, body, &mut cleaner);
    cleaner.removed
}

struct Cleaner<'a> {
    names: &'a FxHashSet<Ident>,
    aggressive: bool,
    removed: usize,
}

impl Cleaner<'_> {
    /// A declarator is kept if its initializer or any pattern-embedded
    /// expression has side effects, or if any bound name is not removable.
    fn keep_declarator(&self, ast: &Ast, decl: NodeId) -> bool {
        let NodeKind::VariableDeclarator { id, init } = ast.kind(decl) else {
            return true;
        };
        if init.is_some_and(|init| has_side_effects(ast, init)) {
            return true;
        }
        let (bound, exprs) = pattern_parts(ast, *id);
        if exprs.iter().any(|&expr| has_side_effects(ast, expr)) {
            return true;
        }
        bound.iter().any(|&ident| {
            ast.ident_name(ident)
                .map(|name| !self.names.contains(name))
                .unwrap_or(true)
        })
    }
}

impl RecursiveVisitor for Cleaner<'_> {
    fn visit(&mut self, ast: &mut Ast, node: NodeId) -> bool {
        match ast.kind(node) {
            NodeKind::VariableDeclaration { declarations, .. } => {
                let declarations = declarations.clone();
                let mut kept = Vec::with_capacity(declarations.len());
                for decl in declarations {
                    if self.keep_declarator(ast, decl) {
                        kept.push(decl);
                    } else {
                        self.removed += 1;
                    }
                }
                let emptied = kept.is_empty();
                if let NodeKind::VariableDeclaration { declarations, .. } = ast.kind_mut(node) {
                    *declarations = kept;
                }
                if emptied {
                    empty_out(ast, node);
                }
                true
            }
            NodeKind::ExpressionStatement { .. } => {
                if self.aggressive && !has_side_effects(ast, node) {
                    empty_out(ast, node);
                    self.removed += 1;
                }
                true
            }
            NodeKind::FunctionDeclaration { id, .. } => {
                let name = ast.ident_name(*id).cloned();
                if let Some(name) = name {
                    if self.names.contains(&name) {
                        empty_out(ast, node);
                        self.removed += 1;
                    }
                }
                // inner functions were cleaned when their own frames popped
                true
            }
            NodeKind::FunctionExpression { .. } | NodeKind::ArrowFunctionExpression { .. } => {
                true
            }
            NodeKind::ForStatement {
                init,
                test,
                update,
                body,
            } => {
                let (init, test, update, body) = (*init, *test, *update, *body);
                if let Some(init) = init {
                    recursive_walk(ast, init, self);
                }
                if let Some(test) = test {
                    recursive_walk(ast, test, self);
                }
                if let Some(update) = update {
                    recursive_walk(ast, update, self);
                }
                recursive_walk(ast, body, self);
                // `for (;;)` requires a null init, not an empty statement
                if init.is_some_and(|init| is_empty(ast, init)) {
                    if let NodeKind::ForStatement { init, .. } = ast.kind_mut(node) {
                        *init = None;
                    }
                }
                true
            }
            NodeKind::ForInStatement { right, body, .. }
            | NodeKind::ForOfStatement { right, body, .. } => {
                // the left-hand side is never removable
                let (right, body) = (*right, *body);
                recursive_walk(ast, right, self);
                recursive_walk(ast, body, self);
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glueopt_fmt::{print, FormatConfig};
    use glueopt_parser::parse;

    fn run_jsdce(source: &str) -> String {
        let mut ast = parse(source, false).expect("parse");
        let mut cx = PassContext::default();
        jsdce(&mut ast, &mut cx).unwrap();
        print(&ast, &FormatConfig::default()).output
    }

    fn run_ajsdce(source: &str) -> String {
        let mut ast = parse(source, false).expect("parse");
        let mut cx = PassContext::default();
        ajsdce(&mut ast, &mut cx).unwrap();
        print(&ast, &FormatConfig::default()).output
    }

    #[test]
    fn test_removes_unused_function_and_var() {
        // scenario: f and x are dead, y is used
        let out = run_jsdce("function f(){} var x = 1; var y = 2; use(y);");
        assert_eq!(out, "var y = 2;\nuse(y);\n");
    }

    #[test]
    fn test_keeps_side_effectful_init() {
        let out = run_jsdce("var x = sideEffect();");
        assert_eq!(out, "var x = sideEffect();\n");
        // aggressive mode must not remove it either
        let out = run_ajsdce("var x = sideEffect();");
        assert_eq!(out, "var x = sideEffect();\n");
    }

    #[test]
    fn test_partial_declaration_removal() {
        let out = run_jsdce("var a = 1, b = 2; use(b);");
        assert_eq!(out, "var b = 2;\nuse(b);\n");
    }

    #[test]
    fn test_parameters_survive() {
        let out = run_jsdce("function f(unused) { return 1; } use(f);");
        assert!(out.contains("function f(unused)"));
    }

    #[test]
    fn test_inner_scope_removal() {
        let out = run_jsdce("function f() { var dead = 1; return 2; } use(f);");
        assert_eq!(out, "function f() {\n  return 2;\n}\nuse(f);\n");
    }

    #[test]
    fn test_use_propagates_from_inner_scope() {
        // x is only used inside f; the use must reach the outer frame
        let out = run_jsdce("var x = 1; function f() { return x; } use(f);");
        assert!(out.contains("var x = 1;"));
    }

    #[test]
    fn test_self_recursion_does_not_keep_defun() {
        let out = run_jsdce("function f() { f(); }");
        assert_eq!(out, "");
    }

    #[test]
    fn test_named_function_expression_name_unbound() {
        // y exists only for stack traces; x is unused, so everything goes
        let out = run_jsdce("var x = function y() { return y; };");
        assert_eq!(out, "");
    }

    #[test]
    fn test_for_init_cleared() {
        let out = run_jsdce("for (var i = 0;;) { stop(); }");
        // i is unused; the init slot must become empty, not a stray `;`
        assert_eq!(out, "for (;;) {\n  stop();\n}\n");
    }

    #[test]
    fn test_for_in_lhs_never_removed() {
        let out = run_jsdce("for (var k in obj) { use(k); }");
        assert!(out.contains("for (var k in obj)"));
        // even an unused LHS survives
        let out = run_jsdce("for (var k in obj) { f(); }");
        assert!(out.contains("for (var k in obj)"));
    }

    #[test]
    fn test_exports_stay_live() {
        let source = "export var kept = 1; export function alsoKept() {}";
        let mut ast = parse(source, true).expect("parse");
        let mut cx = PassContext::default();
        jsdce(&mut ast, &mut cx).unwrap();
        let out = print(&ast, &FormatConfig::default()).output;
        assert!(out.contains("kept"));
        assert!(out.contains("alsoKept"));
    }

    #[test]
    fn test_export_specifiers_stay_live() {
        let source = "var a = 1, b = 2; export { a, b };";
        let mut ast = parse(source, true).expect("parse");
        let mut cx = PassContext::default();
        jsdce(&mut ast, &mut cx).unwrap();
        let out = print(&ast, &FormatConfig::default()).output;
        assert!(out.contains("var a = 1, b = 2;"));
    }

    #[test]
    fn test_property_names_are_not_uses() {
        // `x.dead` does not keep a binding named `dead` alive
        let out = run_jsdce("var dead = 1; x.dead;");
        assert!(!out.contains("var dead"));
        // but computed access is a use
        let out = run_jsdce("var key = 'a'; x[key];");
        assert!(out.contains("var key"));
    }

    #[test]
    fn test_object_keys_are_not_uses() {
        let out = run_jsdce("var dead = 1; use({dead: 2});");
        assert!(!out.contains("var dead"));
    }

    #[test]
    fn test_aggressive_removes_effect_free_statements() {
        let out = run_ajsdce("x + 1; f();");
        assert_eq!(out, "f();\n");
    }

    #[test]
    fn test_aggressive_keeps_directives() {
        let out = run_ajsdce("'use strict'; f();");
        assert!(out.contains("'use strict';"));
    }

    #[test]
    fn test_ajsdce_reaches_fixed_point() {
        // removing g's body statement makes g removable in a later pass
        let source = "var a = 1; var b = a; var c = b;";
        let out = run_ajsdce(source);
        assert_eq!(out, "");
        // and a second run changes nothing
        let mut ast = parse(&out, false).expect("reparse");
        let before = print(&ast, &FormatConfig::default()).output;
        let mut cx = PassContext::default();
        ajsdce(&mut ast, &mut cx).unwrap();
        let after = print(&ast, &FormatConfig::default()).output;
        assert_eq!(before, after);
    }

    #[test]
    fn test_destructuring_side_effects_keep_declarator() {
        let out = run_jsdce("var {a = f()} = obj;");
        assert!(out.contains("var {a = f()} = obj;"));
    }

    #[test]
    fn test_assignment_counts_as_use() {
        // conservative: writes keep the binding
        let out = run_jsdce("var x = 1; x = 2;");
        assert!(out.contains("var x = 1;"));
    }
}
