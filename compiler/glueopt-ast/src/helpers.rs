// SPDX-License-Identifier: PMPL-1.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell

//! Node construction and rewriting primitives shared by the passes.

use smol_str::SmolStr;

use crate::span::Span;
use crate::{Ast, LiteralValue, NodeId, NodeKind};

/// Erase a node in place. The arena slot keeps its span; the old kind (and
/// with it all child references) is gone, so the tombstone is a leaf for
/// every walker. Idempotent.
pub fn empty_out(ast: &mut Ast, node: NodeId) {
    ast[node].kind = NodeKind::EmptyStatement;
}

/// Whether the node has been erased.
pub fn is_empty(ast: &Ast, node: NodeId) -> bool {
    matches!(ast.kind(node), NodeKind::EmptyStatement)
}

/// Replace a literal's value and clear its raw spelling so the printer
/// regenerates it.
pub fn set_literal_value(ast: &mut Ast, node: NodeId, value: LiteralValue) {
    if let NodeKind::Literal { value: v, raw } = ast.kind_mut(node) {
        *v = value;
        *raw = None;
    }
}

/// `node` is a string literal.
pub fn is_literal_string(ast: &Ast, node: NodeId) -> bool {
    matches!(
        ast.kind(node),
        NodeKind::Literal {
            value: LiteralValue::Str(_),
            ..
        }
    )
}

/// The string payload of a string literal.
pub fn literal_string(ast: &Ast, node: NodeId) -> Option<SmolStr> {
    match ast.kind(node) {
        NodeKind::Literal {
            value: LiteralValue::Str(s),
            ..
        } => Some(s.clone()),
        _ => None,
    }
}

/// The numeric payload of a number literal.
pub fn literal_number(ast: &Ast, node: NodeId) -> Option<f64> {
    match ast.kind(node) {
        NodeKind::Literal {
            value: LiteralValue::Number(n),
            ..
        } => Some(*n),
        _ => None,
    }
}

/// Allocate a fresh number literal.
pub fn make_number(ast: &mut Ast, value: f64) -> NodeId {
    ast.alloc(
        Span::dummy(),
        NodeKind::Literal {
            value: LiteralValue::Number(value),
            raw: None,
        },
    )
}

/// Allocate a fresh identifier node.
pub fn make_ident(ast: &mut Ast, name: &str) -> NodeId {
    ast.alloc(
        Span::dummy(),
        NodeKind::Identifier { name: name.into() },
    )
}

/// Overwrite `node` in place with `name(args...)`.
///
/// Overwriting rather than replacing keeps every parent reference valid,
/// which is what lets the heap-rewrite passes swap an assignment or member
/// access for a helper call without knowing their parents.
pub fn make_call_expression(ast: &mut Ast, node: NodeId, name: &str, args: Vec<NodeId>) {
    let callee = make_ident(ast, name);
    ast[node].kind = NodeKind::CallExpression {
        callee,
        arguments: args,
    };
}

/// Move a node's current kind into a fresh arena slot and return the new id.
///
/// Used when a rewrite wants to wrap a node in place: the wrapper takes over
/// the original slot and points at the relocated original.
pub fn displace(ast: &mut Ast, node: NodeId) -> NodeId {
    let span = ast[node].span;
    let kind = std::mem::replace(&mut ast[node].kind, NodeKind::EmptyStatement);
    ast.alloc(span, kind)
}

/// Recursive descent over a destructuring pattern.
///
/// `on_expr` receives every non-pattern expression embedded in the pattern
/// (defaults, computed keys); `on_bound_ident` receives each bound
/// identifier.
pub fn walk_pattern(
    ast: &mut Ast,
    node: NodeId,
    on_expr: &mut dyn FnMut(&mut Ast, NodeId),
    on_bound_ident: &mut dyn FnMut(&mut Ast, NodeId),
) {
    match ast.kind(node) {
        NodeKind::Identifier { .. } => on_bound_ident(ast, node),
        NodeKind::AssignmentPattern { left, right } => {
            let (left, right) = (*left, *right);
            walk_pattern(ast, left, on_expr, on_bound_ident);
            on_expr(ast, right);
        }
        NodeKind::ObjectPattern { properties } => {
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
                            on_expr(ast, key);
                        }
                        walk_pattern(ast, value, on_expr, on_bound_ident);
                    }
                    NodeKind::RestElement { argument } => {
                        let argument = *argument;
                        walk_pattern(ast, argument, on_expr, on_bound_ident);
                    }
                    _ => {
                        on_expr(ast, prop);
                    }
                }
            }
        }
        NodeKind::ArrayPattern { elements } => {
            for element in elements.clone().into_iter().flatten() {
                walk_pattern(ast, element, on_expr, on_bound_ident);
            }
        }
        NodeKind::RestElement { argument } => {
            let argument = *argument;
            walk_pattern(ast, argument, on_expr, on_bound_ident);
        }
        _ => on_expr(ast, node),
    }
}

/// Non-mutating variant of [`walk_pattern`]: collect the bound identifier
/// nodes and the embedded expression nodes of a pattern in one shot.
///
/// Visitors that carry scope state use this instead of `walk_pattern` so the
/// pattern walk does not hold borrows while they recurse into expressions.
pub fn pattern_parts(ast: &Ast, node: NodeId) -> (Vec<NodeId>, Vec<NodeId>) {
    let mut bound = Vec::new();
    let mut exprs = Vec::new();
    collect_pattern(ast, node, &mut bound, &mut exprs);
    (bound, exprs)
}

fn collect_pattern(ast: &Ast, node: NodeId, bound: &mut Vec<NodeId>, exprs: &mut Vec<NodeId>) {
    match ast.kind(node) {
        NodeKind::Identifier { .. } => bound.push(node),
        NodeKind::AssignmentPattern { left, right } => {
            collect_pattern(ast, *left, bound, exprs);
            exprs.push(*right);
        }
        NodeKind::ObjectPattern { properties } => {
            for &prop in properties {
                match ast.kind(prop) {
                    NodeKind::Property {
                        key,
                        value,
                        computed,
                        ..
                    } => {
                        if *computed {
                            exprs.push(*key);
                        }
                        collect_pattern(ast, *value, bound, exprs);
                    }
                    NodeKind::RestElement { argument } => {
                        collect_pattern(ast, *argument, bound, exprs);
                    }
                    _ => exprs.push(prop),
                }
            }
        }
        NodeKind::ArrayPattern { elements } => {
            for &element in elements.iter().flatten() {
                collect_pattern(ast, element, bound, exprs);
            }
        }
        NodeKind::RestElement { argument } => collect_pattern(ast, *argument, bound, exprs),
        _ => exprs.push(node),
    }
}

/// Builtin constructors that are safe to invoke for effect-freedom purposes.
fn safe_to_construct(name: &str) -> bool {
    matches!(
        name,
        "TextDecoder"
            | "ArrayBuffer"
            | "Int8Array"
            | "Uint8Array"
            | "Int16Array"
            | "Uint16Array"
            | "Int32Array"
            | "Uint32Array"
            | "Float32Array"
            | "Float64Array"
    )
}

/// Conservative side-effect oracle.
///
/// Returns `false` only for constructs on a short safelist; anything
/// unrecognized counts as effectful. Nested function bodies are not entered
/// (defining a function has no effect). The safelist is part of the pass
/// semantics — widening it changes what JSDCE may delete.
pub fn has_side_effects(ast: &Ast, node: NodeId) -> bool {
    match ast.kind(node) {
        NodeKind::Literal { .. }
        | NodeKind::Identifier { .. }
        | NodeKind::EmptyStatement
        | NodeKind::TemplateElement { .. } => false,

        // defining a function is fine; its body runs later, if ever
        NodeKind::FunctionDeclaration { .. }
        | NodeKind::FunctionExpression { .. }
        | NodeKind::ArrowFunctionExpression { .. } => false,

        NodeKind::ExpressionStatement {
            expression,
            directive,
        } => *directive || has_side_effects(ast, *expression),

        NodeKind::UnaryExpression { argument, .. }
        | NodeKind::UpdateExpression { argument, .. }
        | NodeKind::SpreadElement { argument } => has_side_effects(ast, *argument),

        NodeKind::BinaryExpression { left, right, .. }
        | NodeKind::LogicalExpression { left, right, .. } => {
            has_side_effects(ast, *left) || has_side_effects(ast, *right)
        }

        NodeKind::ConditionalExpression {
            test,
            consequent,
            alternate,
        } => {
            has_side_effects(ast, *test)
                || has_side_effects(ast, *consequent)
                || has_side_effects(ast, *alternate)
        }

        NodeKind::VariableDeclaration { declarations, .. } => declarations
            .iter()
            .any(|&decl| has_side_effects(ast, decl)),

        NodeKind::VariableDeclarator { id, init } => {
            has_side_effects(ast, *id)
                || init.map(|init| has_side_effects(ast, init)).unwrap_or(false)
        }

        NodeKind::ObjectExpression { properties } => properties
            .iter()
            .any(|&prop| has_side_effects(ast, prop)),

        NodeKind::Property { key, value, computed, .. } => {
            (*computed && has_side_effects(ast, *key)) || has_side_effects(ast, *value)
        }

        NodeKind::ArrayExpression { elements } => elements
            .iter()
            .flatten()
            .any(|&element| has_side_effects(ast, element)),

        NodeKind::BlockStatement { body } => {
            body.iter().any(|&stmt| has_side_effects(ast, stmt))
        }

        // only Math.* member reads are known not to trip getters
        NodeKind::MemberExpression {
            object,
            property,
            computed,
        } => {
            let object_is_math = matches!(
                ast.kind(*object),
                NodeKind::Identifier { name } if name == "Math"
            );
            if !object_is_math {
                return true;
            }
            *computed && has_side_effects(ast, *property)
        }

        NodeKind::NewExpression { callee, arguments } => {
            let safe = matches!(
                ast.kind(*callee),
                NodeKind::Identifier { name } if safe_to_construct(name)
            );
            if !safe {
                return true;
            }
            arguments.iter().any(|&arg| has_side_effects(ast, arg))
        }

        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Node, PropertyKind};
    use la_arena::Arena;

    fn new_ast() -> Ast {
        let mut nodes = Arena::new();
        let root = nodes.alloc(Node {
            span: Span::dummy(),
            kind: NodeKind::Program { body: vec![] },
        });
        Ast {
            nodes,
            root,
            comments: Vec::new(),
            module: false,
        }
    }

    #[test]
    fn test_empty_out_is_idempotent() {
        let mut ast = new_ast();
        let id = make_ident(&mut ast, "x");
        empty_out(&mut ast, id);
        let first = format!("{:?}", ast.kind(id));
        empty_out(&mut ast, id);
        let second = format!("{:?}", ast.kind(id));
        assert_eq!(first, second);
        assert!(is_empty(&ast, id));
    }

    #[test]
    fn test_set_literal_value_clears_raw() {
        let mut ast = new_ast();
        let lit = ast.alloc(
            Span::dummy(),
            NodeKind::Literal {
                value: LiteralValue::Str("old".into()),
                raw: Some("'old'".into()),
            },
        );
        set_literal_value(&mut ast, lit, LiteralValue::Str("new".into()));
        match ast.kind(lit) {
            NodeKind::Literal { value, raw } => {
                assert_eq!(*value, LiteralValue::Str("new".into()));
                assert!(raw.is_none());
            }
            _ => panic!("literal expected"),
        }
    }

    #[test]
    fn test_make_call_expression_overwrites_in_place() {
        let mut ast = new_ast();
        let target = make_ident(&mut ast, "HEAP32");
        let arg = make_number(&mut ast, 4.0);
        make_call_expression(&mut ast, target, "LE_HEAP_LOAD_I32", vec![arg]);
        match ast.kind(target) {
            NodeKind::CallExpression { callee, arguments } => {
                assert_eq!(ast.ident_name(*callee).unwrap(), "LE_HEAP_LOAD_I32");
                assert_eq!(arguments, &vec![arg]);
            }
            _ => panic!("call expected"),
        }
    }

    #[test]
    fn test_walk_pattern_routes_handlers() {
        // { a, b: [c = d], ...rest }
        let mut ast = new_ast();
        let a = make_ident(&mut ast, "a");
        let a_key = make_ident(&mut ast, "a");
        let b_key = make_ident(&mut ast, "b");
        let c = make_ident(&mut ast, "c");
        let d = make_ident(&mut ast, "d");
        let assign = ast.alloc(
            Span::dummy(),
            NodeKind::AssignmentPattern { left: c, right: d },
        );
        let arr = ast.alloc(
            Span::dummy(),
            NodeKind::ArrayPattern {
                elements: vec![Some(assign)],
            },
        );
        let rest_ident = make_ident(&mut ast, "rest");
        let rest = ast.alloc(
            Span::dummy(),
            NodeKind::RestElement { argument: rest_ident },
        );
        let prop_a = ast.alloc(
            Span::dummy(),
            NodeKind::Property {
                key: a_key,
                value: a,
                kind: PropertyKind::Init,
                computed: false,
                shorthand: true,
                method: false,
            },
        );
        let prop_b = ast.alloc(
            Span::dummy(),
            NodeKind::Property {
                key: b_key,
                value: arr,
                kind: PropertyKind::Init,
                computed: false,
                shorthand: false,
                method: false,
            },
        );
        let pattern = ast.alloc(
            Span::dummy(),
            NodeKind::ObjectPattern {
                properties: vec![prop_a, prop_b, rest],
            },
        );

        let mut bound = Vec::new();
        let mut exprs = Vec::new();
        walk_pattern(
            &mut ast,
            pattern,
            &mut |ast, id| exprs.push(ast.ident_name(id).cloned()),
            &mut |ast, id| bound.push(ast.ident_name(id).unwrap().clone()),
        );
        assert_eq!(bound, vec!["a", "c", "rest"]);
        // the default expression `d` is the only embedded expression
        assert_eq!(exprs.len(), 1);
    }

    #[test]
    fn test_side_effect_oracle() {
        let mut ast = new_ast();
        // literals and identifiers are safe
        let lit = make_number(&mut ast, 1.0);
        assert!(!has_side_effects(&ast, lit));

        // calls are not
        let callee = make_ident(&mut ast, "f");
        let call = ast.alloc(
            Span::dummy(),
            NodeKind::CallExpression {
                callee,
                arguments: vec![],
            },
        );
        assert!(has_side_effects(&ast, call));

        // Math.floor is a safe member read; anything else is not
        let math = make_ident(&mut ast, "Math");
        let floor = make_ident(&mut ast, "floor");
        let member = ast.alloc(
            Span::dummy(),
            NodeKind::MemberExpression {
                object: math,
                property: floor,
                computed: false,
            },
        );
        assert!(!has_side_effects(&ast, member));

        let other = make_ident(&mut ast, "obj");
        let prop = make_ident(&mut ast, "x");
        let member = ast.alloc(
            Span::dummy(),
            NodeKind::MemberExpression {
                object: other,
                property: prop,
                computed: false,
            },
        );
        assert!(has_side_effects(&ast, member));

        // whitelisted constructors with safe arguments are safe
        let ctor = make_ident(&mut ast, "Uint8Array");
        let len = make_number(&mut ast, 16.0);
        let new_expr = ast.alloc(
            Span::dummy(),
            NodeKind::NewExpression {
                callee: ctor,
                arguments: vec![len],
            },
        );
        assert!(!has_side_effects(&ast, new_expr));

        let ctor = make_ident(&mut ast, "Worker");
        let new_expr = ast.alloc(
            Span::dummy(),
            NodeKind::NewExpression {
                callee: ctor,
                arguments: vec![],
            },
        );
        assert!(has_side_effects(&ast, new_expr));
    }
}
