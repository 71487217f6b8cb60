// SPDX-License-Identifier: PMPL-1.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell

//! The four traversal disciplines every pass is phrased in terms of.
//!
//! - [`visit_children`]: one level, field order, no recursion
//! - [`simple_walk`]: post-order, the handler has no control over recursion
//! - [`full_walk`] / [`full_walk_pre`]: post-order with an optional pruning
//!   pre-hook
//! - [`recursive_walk`]: the visitor decides which children to descend into
//!
//! Handlers receive `(&mut Ast, NodeId)` so they can rewrite nodes in place
//! while walking. Child ids are collected before recursing, so a handler that
//! replaces the current node's kind does not disturb the ongoing traversal.

use crate::{Ast, NodeId};

/// Invoke `f` once per child of `node`, in field declaration order.
///
/// An erased node (`EmptyStatement`) is a leaf.
pub fn visit_children<F>(ast: &mut Ast, node: NodeId, mut f: F)
where
    F: FnMut(&mut Ast, NodeId),
{
    for child in ast.children_of(node) {
        f(ast, child);
    }
}

/// Post-order walk: children first, then the handler on the node itself.
///
/// The handler is called for every node; match the kinds of interest inside
/// it. It is given no control over recursion.
pub fn simple_walk<F>(ast: &mut Ast, node: NodeId, f: &mut F)
where
    F: FnMut(&mut Ast, NodeId),
{
    visit_children(ast, node, |ast, child| simple_walk(ast, child, f));
    f(ast, node);
}

/// Post-order walk with no pruning.
pub fn full_walk<F>(ast: &mut Ast, node: NodeId, post: &mut F)
where
    F: FnMut(&mut Ast, NodeId),
{
    full_walk_pre(ast, node, &mut |_, _| true, post);
}

/// Hybrid walk: `pre` runs before descending and may return `false` to skip
/// the entire subtree (including `post` for the node itself).
pub fn full_walk_pre<P, F>(ast: &mut Ast, node: NodeId, pre: &mut P, post: &mut F)
where
    P: FnMut(&mut Ast, NodeId) -> bool,
    F: FnMut(&mut Ast, NodeId),
{
    if !pre(ast, node) {
        return;
    }
    visit_children(ast, node, |ast, child| full_walk_pre(ast, child, pre, post));
    post(ast, node);
}

/// A visitor with user-controlled recursion.
///
/// `visit` returns `true` when it handled the node — in which case only the
/// children it chose to pass back to [`recursive_walk`] were descended into —
/// or `false` to fall through to default recursion over all children.
///
/// This is the only discipline that can skip *specific* children, which the
/// passes need for `for-in`/`for-of` left-hand sides, nested function scopes,
/// and the computed/dot member distinction.
pub trait RecursiveVisitor {
    fn visit(&mut self, ast: &mut Ast, node: NodeId) -> bool;
}

/// Walk with a [`RecursiveVisitor`].
pub fn recursive_walk<V>(ast: &mut Ast, node: NodeId, visitor: &mut V)
where
    V: RecursiveVisitor + ?Sized,
{
    if !visitor.visit(ast, node) {
        visit_children(ast, node, |ast, child| recursive_walk(ast, child, visitor));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::helpers::empty_out;
    use crate::span::Span;
    use crate::{Node, NodeKind};
    use la_arena::Arena;

    fn ident(nodes: &mut Arena<Node>, name: &str) -> NodeId {
        nodes.alloc(Node {
            span: Span::dummy(),
            kind: NodeKind::Identifier { name: name.into() },
        })
    }

    fn small_program() -> (Ast, NodeId, NodeId) {
        // (a, b)
        let mut nodes = Arena::new();
        let a = ident(&mut nodes, "a");
        let b = ident(&mut nodes, "b");
        let seq = nodes.alloc(Node {
            span: Span::dummy(),
            kind: NodeKind::SequenceExpression {
                expressions: vec![a, b],
            },
        });
        let stmt = nodes.alloc(Node {
            span: Span::dummy(),
            kind: NodeKind::ExpressionStatement {
                expression: seq,
                directive: false,
            },
        });
        let root = nodes.alloc(Node {
            span: Span::dummy(),
            kind: NodeKind::Program { body: vec![stmt] },
        });
        (
            Ast {
                nodes,
                root,
                comments: Vec::new(),
                module: false,
            },
            a,
            stmt,
        )
    }

    #[test]
    fn test_simple_walk_is_post_order() {
        let (mut ast, ..) = small_program();
        let root = ast.root;
        let mut order = Vec::new();
        simple_walk(&mut ast, root, &mut |ast, id| {
            order.push(ast.kind(id).type_name());
        });
        assert_eq!(
            order,
            vec![
                "Identifier",
                "Identifier",
                "SequenceExpression",
                "ExpressionStatement",
                "Program"
            ]
        );
    }

    #[test]
    fn test_full_walk_pre_prunes() {
        let (mut ast, ..) = small_program();
        let root = ast.root;
        let mut post_count = 0;
        full_walk_pre(
            &mut ast,
            root,
            &mut |ast, id| !matches!(ast.kind(id), NodeKind::SequenceExpression { .. }),
            &mut |_, _| post_count += 1,
        );
        // program + statement only; the sequence subtree is skipped entirely
        assert_eq!(post_count, 2);
    }

    #[test]
    fn test_erased_node_is_a_leaf() {
        let (mut ast, _, stmt) = small_program();
        empty_out(&mut ast, stmt);
        let root = ast.root;
        let mut visited = Vec::new();
        simple_walk(&mut ast, root, &mut |ast, id| {
            visited.push(ast.kind(id).type_name());
        });
        assert_eq!(visited, vec!["EmptyStatement", "Program"]);
    }

    #[test]
    fn test_recursive_walk_default_recursion() {
        struct Counter {
            idents: usize,
        }
        impl RecursiveVisitor for Counter {
            fn visit(&mut self, ast: &mut Ast, node: NodeId) -> bool {
                if matches!(ast.kind(node), NodeKind::Identifier { .. }) {
                    self.idents += 1;
                }
                false
            }
        }
        let (mut ast, ..) = small_program();
        let root = ast.root;
        let mut v = Counter { idents: 0 };
        recursive_walk(&mut ast, root, &mut v);
        assert_eq!(v.idents, 2);
    }

    #[test]
    fn test_recursive_walk_skips_unchosen_children() {
        // Handle the sequence by descending only into its first expression.
        struct FirstOnly {
            seen: Vec<&'static str>,
        }
        impl RecursiveVisitor for FirstOnly {
            fn visit(&mut self, ast: &mut Ast, node: NodeId) -> bool {
                match ast.kind(node) {
                    NodeKind::SequenceExpression { expressions } => {
                        let first = expressions[0];
                        recursive_walk(ast, first, self);
                        true
                    }
                    NodeKind::Identifier { name } => {
                        self.seen.push(if name == "a" { "a" } else { "b" });
                        false
                    }
                    _ => false,
                }
            }
        }
        let (mut ast, ..) = small_program();
        let root = ast.root;
        let mut v = FirstOnly { seen: Vec::new() };
        recursive_walk(&mut ast, root, &mut v);
        assert_eq!(v.seen, vec!["a"]);
    }
}
