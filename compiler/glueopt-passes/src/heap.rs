// SPDX-License-Identifier: PMPL-1.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell

//! The heap-rewrite pass family.
//!
//! All five passes share one shape: a [`recursive_walk`] with handlers for
//! assignments, member accesses, and (for the little-endian pass) calls,
//! with recursion suppressed inside the helper functions each pass emits
//! calls to. An access counts as a HEAP access iff it is a computed member
//! whose object is a bare identifier naming one of the typed-array views.

use glueopt_ast::helpers::{displace, make_call_expression, make_ident, make_number};
use glueopt_ast::walk::{recursive_walk, RecursiveVisitor};
use glueopt_ast::{AssignOp, Ast, BinaryOp, NodeId, NodeKind};

use crate::{PassContext, PassError};

/// The typed-array views onto linear memory.
const HEAP_NAMES: &[&str] = &[
    "HEAP8", "HEAPU8", "HEAP16", "HEAPU16", "HEAP32", "HEAPU32", "HEAP64", "HEAPU64", "HEAPF32",
    "HEAPF64",
];

fn is_heap_name(name: &str) -> bool {
    HEAP_NAMES.contains(&name)
}

/// `(helper suffix, bytes per element)` for a heap view, e.g.
/// `HEAPU16 -> ("U16", 2)`. Byte-wide views return `None`.
fn le_heap_info(name: &str) -> Option<(&'static str, f64)> {
    Some(match name {
        "HEAP16" => ("I16", 2.0),
        "HEAPU16" => ("U16", 2.0),
        "HEAP32" => ("I32", 4.0),
        "HEAPU32" => ("U32", 4.0),
        "HEAP64" => ("I64", 8.0),
        "HEAPU64" => ("U64", 8.0),
        "HEAPF32" => ("F32", 4.0),
        "HEAPF64" => ("F64", 8.0),
        _ => return None,
    })
}

/// A computed `HEAPxx[idx]` access: returns `(object, property, name)`.
fn heap_access(ast: &Ast, node: NodeId) -> Option<(NodeId, NodeId, &'static str)> {
    let NodeKind::MemberExpression {
        object,
        property,
        computed: true,
    } = ast.kind(node)
    else {
        return None;
    };
    let name = ast.ident_name(*object)?;
    let canonical = HEAP_NAMES.iter().find(|&&h| h == name.as_str())?;
    Some((*object, *property, *canonical))
}

fn function_name(ast: &Ast, node: NodeId) -> Option<&str> {
    match ast.kind(node) {
        NodeKind::FunctionDeclaration { id, .. } => ast.ident_name(*id).map(|n| n.as_str()),
        _ => None,
    }
}

// === littleEndianHeap ===

/// Rewrite multi-byte heap accesses into `LE_HEAP_LOAD_*`/`LE_HEAP_STORE_*`
/// calls and `Atomics.x(...)` into `LE_ATOMICS_X(...)`.
pub fn little_endian_heap(ast: &mut Ast, _cx: &mut PassContext) -> Result<(), PassError> {
    let root = ast.root;
    recursive_walk(ast, root, &mut LittleEndian);
    Ok(())
}

struct LittleEndian;

impl RecursiveVisitor for LittleEndian {
    fn visit(&mut self, ast: &mut Ast, node: NodeId) -> bool {
        // the helpers themselves operate on raw bytes
        if let Some(name) = function_name(ast, node) {
            if name.starts_with("LE_HEAP") || name.starts_with("LE_ATOMICS_") {
                return true;
            }
            return false;
        }
        match ast.kind(node) {
            NodeKind::AssignmentExpression {
                operator: AssignOp::Assign,
                left,
                right,
            } => {
                let (left, right) = (*left, *right);
                let Some((_, property, name)) = heap_access(ast, left) else {
                    return false;
                };
                let Some((suffix, bytes)) = le_heap_info(name) else {
                    return false;
                };
                // HEAP32[p] = v  ->  LE_HEAP_STORE_I32(p * 4, v)
                let scale = make_number(ast, bytes);
                let offset = ast.alloc(
                    ast[property].span,
                    NodeKind::BinaryExpression {
                        operator: BinaryOp::Mul,
                        left: property,
                        right: scale,
                    },
                );
                make_call_expression(
                    ast,
                    node,
                    &format!("LE_HEAP_STORE_{suffix}"),
                    vec![offset, right],
                );
                recursive_walk(ast, property, self);
                recursive_walk(ast, right, self);
                true
            }
            NodeKind::AssignmentExpression { left, right, .. } => {
                let (left, right) = (*left, *right);
                // compound assignment to a heap slot keeps its shape; only
                // the index and value may contain rewritable accesses
                if let Some((_, property, _)) = heap_access(ast, left) {
                    recursive_walk(ast, property, self);
                    recursive_walk(ast, right, self);
                    true
                } else {
                    false
                }
            }
            NodeKind::MemberExpression { .. } => {
                let Some((_, property, name)) = heap_access(ast, node) else {
                    return false;
                };
                let Some((suffix, bytes)) = le_heap_info(name) else {
                    return false;
                };
                // x = HEAP32[p]  ->  x = LE_HEAP_LOAD_I32(p * 4)
                let scale = make_number(ast, bytes);
                let offset = ast.alloc(
                    ast[property].span,
                    NodeKind::BinaryExpression {
                        operator: BinaryOp::Mul,
                        left: property,
                        right: scale,
                    },
                );
                make_call_expression(ast, node, &format!("LE_HEAP_LOAD_{suffix}"), vec![offset]);
                recursive_walk(ast, property, self);
                true
            }
            NodeKind::CallExpression { callee, arguments } => {
                let (callee, arguments) = (*callee, arguments.clone());
                let NodeKind::MemberExpression {
                    object,
                    property,
                    computed: false,
                } = ast.kind(callee)
                else {
                    return false;
                };
                if ast.ident_name(*object).map(|n| n == "Atomics") != Some(true) {
                    return false;
                }
                let Some(op) = ast.ident_name(*property).cloned() else {
                    return false;
                };
                // Atomics.load(...)  ->  LE_ATOMICS_LOAD(...)
                let helper = format!("LE_ATOMICS_{}", op.to_uppercase());
                make_call_expression(ast, node, &helper, arguments.clone());
                for arg in arguments {
                    recursive_walk(ast, arg, self);
                }
                true
            }
            _ => false,
        }
    }
}

// === growableHeap ===

/// Guard every heap-view read with a `growMemViews()` refresh: a bare
/// `HEAP32` becomes `(growMemViews(), HEAP32)`. Re-assignments of the views
/// themselves are left alone.
pub fn growable_heap(ast: &mut Ast, _cx: &mut PassContext) -> Result<(), PassError> {
    let root = ast.root;
    recursive_walk(ast, root, &mut Growable);
    Ok(())
}

struct Growable;

impl RecursiveVisitor for Growable {
    fn visit(&mut self, ast: &mut Ast, node: NodeId) -> bool {
        match ast.kind(node) {
            NodeKind::ExportNamedDeclaration { .. }
            | NodeKind::ExportDefaultDeclaration { .. } => true,
            NodeKind::FunctionDeclaration { .. } => {
                matches!(
                    function_name(ast, node),
                    Some("growMemViews") | Some("LE_HEAP_UPDATE")
                )
            }
            NodeKind::AssignmentExpression { left, right, .. } => {
                let (left, right) = (*left, *right);
                let left_is_heap = ast
                    .ident_name(left)
                    .map(|n| is_heap_name(n))
                    .unwrap_or(false);
                if left_is_heap {
                    // HEAP32 = ... must keep its raw assignment target
                    recursive_walk(ast, right, self);
                    true
                } else {
                    false
                }
            }
            NodeKind::VariableDeclaration { declarations, .. } => {
                // declarator ids are binding positions, not reads
                for decl in declarations.clone() {
                    if let NodeKind::VariableDeclarator { init: Some(init), .. } = ast.kind(decl)
                    {
                        let init = *init;
                        recursive_walk(ast, init, self);
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
            NodeKind::Identifier { name } => {
                if is_heap_name(name) {
                    // HEAP32 -> (growMemViews(), HEAP32)
                    let original = displace(ast, node);
                    let callee = make_ident(ast, "growMemViews");
                    let call = ast.alloc(
                        ast[node].span,
                        NodeKind::CallExpression {
                            callee,
                            arguments: Vec::new(),
                        },
                    );
                    ast[node].kind = NodeKind::SequenceExpression {
                        expressions: vec![call, original],
                    };
                }
                true
            }
            _ => false,
        }
    }
}

// === unsignPointers ===

/// Force the index of a heap access to unsigned: a `>>` shift becomes `>>>`,
/// anything else is wrapped as `expr >>> 0`.
fn unsign(ast: &mut Ast, node: NodeId) {
    if let NodeKind::BinaryExpression { operator, .. } = ast.kind_mut(node) {
        if *operator == BinaryOp::Shr {
            *operator = BinaryOp::UShr;
            return;
        }
    }
    let original = displace(ast, node);
    let zero = make_number(ast, 0.0);
    ast[node].kind = NodeKind::BinaryExpression {
        operator: BinaryOp::UShr,
        left: original,
        right: zero,
    };
}

/// Unsign the pointers flowing into heap accesses and into the pointer
/// arguments of `set`/`subarray`/`copyWithin` calls on the views.
pub fn unsign_pointers(ast: &mut Ast, _cx: &mut PassContext) -> Result<(), PassError> {
    let root = ast.root;
    recursive_walk(ast, root, &mut Unsign);
    Ok(())
}

fn is_pointerish_name(name: &str) -> bool {
    is_heap_name(name) || name == "heap" || name == "HEAP"
}

struct Unsign;

impl RecursiveVisitor for Unsign {
    fn visit(&mut self, ast: &mut Ast, node: NodeId) -> bool {
        match ast.kind(node) {
            NodeKind::MemberExpression {
                object,
                property,
                computed: true,
            } => {
                let (object, property) = (*object, *property);
                let on_heap = ast
                    .ident_name(object)
                    .map(|n| is_pointerish_name(n))
                    .unwrap_or(false);
                if !on_heap {
                    return false;
                }
                unsign(ast, property);
                recursive_walk(ast, property, self);
                true
            }
            NodeKind::CallExpression { callee, arguments } => {
                let (callee, arguments) = (*callee, arguments.clone());
                let NodeKind::MemberExpression {
                    object,
                    property,
                    computed: false,
                } = ast.kind(callee)
                else {
                    return false;
                };
                let on_heap = ast
                    .ident_name(*object)
                    .map(|n| is_pointerish_name(n))
                    .unwrap_or(false);
                if !on_heap {
                    return false;
                }
                let pointer_args: &[usize] = match ast.ident_name(*property).map(|n| n.as_str()) {
                    Some("set") => &[1],
                    Some("subarray") => &[0, 1],
                    Some("copyWithin") => &[0, 1, 2],
                    _ => return false,
                };
                for &i in pointer_args {
                    if let Some(&arg) = arguments.get(i) {
                        unsign(ast, arg);
                    }
                }
                for arg in arguments {
                    recursive_walk(ast, arg, self);
                }
                true
            }
            _ => false,
        }
    }
}

// === asanify / safeHeap ===

/// The shared shape of the two instrumentation passes: loads become
/// `load(view, index)` calls, stores become `store(view, index, value)`.
struct Instrument {
    store_helper: &'static str,
    load_helper: &'static str,
    skip_prefix: &'static str,
    skip_exact: Option<&'static str>,
}

impl RecursiveVisitor for Instrument {
    fn visit(&mut self, ast: &mut Ast, node: NodeId) -> bool {
        if let Some(name) = function_name(ast, node) {
            if name.starts_with(self.skip_prefix) || Some(name) == self.skip_exact {
                return true;
            }
            return false;
        }
        match ast.kind(node) {
            NodeKind::AssignmentExpression {
                operator: AssignOp::Assign,
                left,
                right,
            } => {
                let (left, right) = (*left, *right);
                let Some((object, property, _)) = heap_access(ast, left) else {
                    return false;
                };
                // HEAP32[x] = y  ->  store(HEAP32, x, y)
                let view = displace(ast, object);
                make_call_expression(ast, node, self.store_helper, vec![view, property, right]);
                recursive_walk(ast, property, self);
                recursive_walk(ast, right, self);
                true
            }
            NodeKind::AssignmentExpression { left, right, .. } => {
                let (left, right) = (*left, *right);
                if let Some((_, property, _)) = heap_access(ast, left) {
                    recursive_walk(ast, property, self);
                    recursive_walk(ast, right, self);
                    true
                } else {
                    false
                }
            }
            NodeKind::MemberExpression { .. } => {
                let Some((object, property, _)) = heap_access(ast, node) else {
                    return false;
                };
                // HEAP32[x]  ->  load(HEAP32, x)
                let view = displace(ast, object);
                make_call_expression(ast, node, self.load_helper, vec![view, property]);
                recursive_walk(ast, property, self);
                true
            }
            _ => false,
        }
    }
}

/// Route heap traffic through the AddressSanitizer shims.
pub fn asanify(ast: &mut Ast, _cx: &mut PassContext) -> Result<(), PassError> {
    let root = ast.root;
    recursive_walk(
        ast,
        root,
        &mut Instrument {
            store_helper: "_asan_js_store",
            load_helper: "_asan_js_load",
            skip_prefix: "_asan_js_",
            skip_exact: Some("establishStackSpace"),
        },
    );
    Ok(())
}

/// Route heap traffic through the SAFE_HEAP checkers.
pub fn safe_heap(ast: &mut Ast, _cx: &mut PassContext) -> Result<(), PassError> {
    let root = ast.root;
    recursive_walk(
        ast,
        root,
        &mut Instrument {
            store_helper: "SAFE_HEAP_STORE",
            load_helper: "SAFE_HEAP_LOAD",
            skip_prefix: "SAFE_HEAP",
            skip_exact: None,
        },
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use glueopt_fmt::{print, FormatConfig};
    use glueopt_parser::parse;

    fn run(source: &str, pass: fn(&mut Ast, &mut PassContext) -> Result<(), PassError>) -> String {
        let mut ast = parse(source, false).expect("parse");
        let mut cx = PassContext::default();
        pass(&mut ast, &mut cx).expect("pass");
        print(&ast, &FormatConfig::default()).output
    }

    #[test]
    fn test_le_store_and_load() {
        let out = run("HEAP32[p] = v; x = HEAP32[q];", little_endian_heap);
        assert_eq!(
            out,
            "LE_HEAP_STORE_I32(p * 4, v);\nx = LE_HEAP_LOAD_I32(q * 4);\n"
        );
    }

    #[test]
    fn test_le_all_widths() {
        let out = run(
            "HEAP16[a] = 1; HEAPU32[b] = 2; HEAPF64[c] = 3; x = HEAPU16[d];",
            little_endian_heap,
        );
        assert!(out.contains("LE_HEAP_STORE_I16(a * 2, 1)"));
        assert!(out.contains("LE_HEAP_STORE_U32(b * 4, 2)"));
        assert!(out.contains("LE_HEAP_STORE_F64(c * 8, 3)"));
        assert!(out.contains("LE_HEAP_LOAD_U16(d * 2)"));
    }

    #[test]
    fn test_le_byte_accesses_untouched() {
        let out = run("HEAP8[p] = v; x = HEAPU8[q];", little_endian_heap);
        assert_eq!(out, "HEAP8[p] = v;\nx = HEAPU8[q];\n");
    }

    #[test]
    fn test_le_nested_access() {
        let out = run("HEAP32[HEAP32[p]] = v;", little_endian_heap);
        assert_eq!(out, "LE_HEAP_STORE_I32(LE_HEAP_LOAD_I32(p * 4) * 4, v);\n");
    }

    #[test]
    fn test_le_atomics() {
        let out = run("Atomics.load(HEAP32, x); Atomics.compareExchange(HEAP32, a, b, c);", little_endian_heap);
        assert!(out.contains("LE_ATOMICS_LOAD(HEAP32, x)"));
        assert!(out.contains("LE_ATOMICS_COMPAREEXCHANGE(HEAP32, a, b, c)"));
    }

    #[test]
    fn test_le_helpers_not_entered() {
        let source = "function LE_HEAP_STORE_I32(o, v) { HEAP32[o >> 2] = v; }\n";
        let out = run(source, little_endian_heap);
        assert!(out.contains("HEAP32[o >> 2] = v"));
    }

    #[test]
    fn test_growable_wraps_reads() {
        let out = run("f(HEAP32[p]);", growable_heap);
        assert_eq!(out, "f((growMemViews(), HEAP32)[p]);\n");
    }

    #[test]
    fn test_growable_skips_assignment_lhs() {
        let out = run("HEAP32 = new Int32Array(b); HEAP32[p] = HEAPU8[q];", growable_heap);
        assert!(out.starts_with("HEAP32 = new Int32Array(b);"));
        // reads on the RHS and in later statements are wrapped
        assert!(out.contains("(growMemViews(), HEAP32)[p] = (growMemViews(), HEAPU8)[q]"));
    }

    #[test]
    fn test_growable_skips_exports_and_helpers() {
        let source = "export var HEAP8 = x;";
        let mut ast = parse(source, true).expect("parse");
        let mut cx = PassContext::default();
        growable_heap(&mut ast, &mut cx).unwrap();
        let out = print(&ast, &FormatConfig::default()).output;
        assert_eq!(out, "export var HEAP8 = x;\n");

        let out = run(
            "function growMemViews() { HEAP32[p] = 1; }",
            growable_heap,
        );
        assert!(out.contains("HEAP32[p] = 1"));
    }

    #[test]
    fn test_growable_skips_declarator_ids() {
        let out = run("var HEAP32 = view();", growable_heap);
        assert_eq!(out, "var HEAP32 = view();\n");
    }

    #[test]
    fn test_unsign_shift_becomes_unsigned() {
        let out = run("x = HEAP32[p >> 2];", unsign_pointers);
        assert_eq!(out, "x = HEAP32[p >>> 2];\n");
    }

    #[test]
    fn test_unsign_plain_index_wrapped() {
        let out = run("x = HEAP8[n];", unsign_pointers);
        assert_eq!(out, "x = HEAP8[n >>> 0];\n");
    }

    #[test]
    fn test_unsign_lowercase_heap_alias() {
        let out = run("x = heap[n]; y = HEAP[m >> 1];", unsign_pointers);
        assert_eq!(out, "x = heap[n >>> 0];\ny = HEAP[m >>> 1];\n");
    }

    #[test]
    fn test_unsign_method_pointer_args() {
        let out = run("HEAP8.set(data, ptr);", unsign_pointers);
        assert_eq!(out, "HEAP8.set(data, ptr >>> 0);\n");
        let out = run("HEAP8.subarray(a, b);", unsign_pointers);
        assert_eq!(out, "HEAP8.subarray(a >>> 0, b >>> 0);\n");
        let out = run("HEAP8.copyWithin(a, b, c);", unsign_pointers);
        assert_eq!(out, "HEAP8.copyWithin(a >>> 0, b >>> 0, c >>> 0);\n");
    }

    #[test]
    fn test_unsign_double_application_shape() {
        // unsign twice: wrap, then wrap again
        let mut ast = parse("x = HEAP8[p];", false).expect("parse");
        let root = ast.root;
        let mut target = None;
        glueopt_ast::walk::simple_walk(&mut ast, root, &mut |ast, id| {
            if matches!(ast.kind(id), NodeKind::Identifier { name } if name == "p") {
                target = Some(id);
            }
        });
        let p = target.unwrap();
        unsign(&mut ast, p);
        unsign(&mut ast, p);
        let out = print(&ast, &FormatConfig::default()).output;
        assert_eq!(out, "x = HEAP8[p >>> 0 >>> 0];\n");
    }

    #[test]
    fn test_asanify() {
        let out = run("HEAP32[x] = y; z = HEAPU8[w];", asanify);
        assert_eq!(
            out,
            "_asan_js_store(HEAP32, x, y);\nz = _asan_js_load(HEAPU8, w);\n"
        );
    }

    #[test]
    fn test_asanify_skips_own_helpers() {
        let out = run(
            "function _asan_js_load(v, i) { return HEAP32[i]; }\nfunction establishStackSpace() { HEAP32[0] = 1; }",
            asanify,
        );
        assert!(out.contains("return HEAP32[i]"));
        assert!(out.contains("HEAP32[0] = 1"));
    }

    #[test]
    fn test_safe_heap() {
        let out = run("HEAPF64[d] = v; r = HEAP16[s];", safe_heap);
        assert_eq!(
            out,
            "SAFE_HEAP_STORE(HEAPF64, d, v);\nr = SAFE_HEAP_LOAD(HEAP16, s);\n"
        );
    }

    #[test]
    fn test_safe_heap_skips_helpers() {
        let out = run(
            "function SAFE_HEAP_STORE(v, i, x) { HEAP32[i] = x; }",
            safe_heap,
        );
        assert!(out.contains("HEAP32[i] = x"));
    }
}
