// SPDX-License-Identifier: PMPL-1.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell

//! The wasm↔JS reachability graph: `emitDCEGraph` builds and prints it,
//! `applyDCEGraphRemovals` consumes the verdict of the downstream metadce.

use glueopt_ast::helpers::{empty_out, has_side_effects, is_literal_string, literal_string};
use glueopt_ast::walk::{full_walk, full_walk_pre, simple_walk};
use glueopt_ast::{Ast, LiteralValue, NodeId, NodeKind};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;
use smol_str::SmolStr;
use std::collections::BTreeSet;

use crate::{PassContext, PassError};

/// One node of the emitted reachability graph.
#[derive(Debug, Serialize)]
struct GraphNode {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    import: Option<(String, String)>,
    #[serde(skip_serializing_if = "Option::is_none")]
    export: Option<String>,
    reaches: Vec<String>,
    #[serde(skip_serializing_if = "is_false")]
    root: bool,
}

fn is_false(b: &bool) -> bool {
    !*b
}

fn graph_name(name: &str, kind: &str) -> String {
    format!("emcc${kind}${name}")
}

// === Shared shape recognizers ===

/// `var wasmImports = { ... };` or `wasmImports = { ... };`.
/// Returns the object expression.
pub(crate) fn wasm_imports_value(ast: &Ast, node: NodeId) -> Option<NodeId> {
    match ast.kind(node) {
        NodeKind::VariableDeclaration { declarations, .. } if declarations.len() == 1 => {
            let NodeKind::VariableDeclarator { id, init } = ast.kind(declarations[0]) else {
                return None;
            };
            if ast.ident_name(*id).map(|n| n == "wasmImports") != Some(true) {
                return None;
            }
            let init = (*init)?;
            matches!(ast.kind(init), NodeKind::ObjectExpression { .. }).then_some(init)
        }
        NodeKind::AssignmentExpression {
            operator: glueopt_ast::AssignOp::Assign,
            left,
            right,
        } => {
            if ast.ident_name(*left).map(|n| n == "wasmImports") != Some(true) {
                return None;
            }
            matches!(ast.kind(*right), NodeKind::ObjectExpression { .. }).then_some(*right)
        }
        _ => None,
    }
}

/// `Module['name']`
pub(crate) fn module_use_name(ast: &Ast, node: NodeId) -> Option<SmolStr> {
    computed_string_member(ast, node, "Module")
}

/// `wasmExports['name']`
pub(crate) fn export_use_name(ast: &Ast, node: NodeId) -> Option<SmolStr> {
    computed_string_member(ast, node, "wasmExports")
}

fn computed_string_member(ast: &Ast, node: NodeId, object_name: &str) -> Option<SmolStr> {
    let NodeKind::MemberExpression {
        object,
        property,
        computed: true,
    } = ast.kind(node)
    else {
        return None;
    };
    if ast.ident_name(*object).map(|n| n == object_name) != Some(true) {
        return None;
    }
    literal_string(ast, *property)
}

/// The name of an object property key: identifier or string literal.
pub(crate) fn property_key_name(ast: &Ast, key: NodeId) -> Option<SmolStr> {
    ast.ident_name(key)
        .cloned()
        .or_else(|| literal_string(ast, key))
}

/// `name = wasmExports['w']`, possibly through a `Module['name'] =` link.
/// Returns `(jsName, wasmName)`.
fn export_assignment(ast: &Ast, expr: NodeId) -> Option<(SmolStr, SmolStr)> {
    let NodeKind::AssignmentExpression {
        operator: glueopt_ast::AssignOp::Assign,
        left,
        right,
    } = ast.kind(expr)
    else {
        return None;
    };
    if let Some(module_prop) = module_use_name(ast, *left) {
        // Module['_x'] = <inner assignment>, or directly = wasmExports['x']
        if let Some(found) = export_assignment(ast, *right) {
            return Some(found);
        }
        let wasm_name = export_use_name(ast, *right)?;
        return Some((module_prop, wasm_name));
    }
    let js_name = ast.ident_name(*left)?.clone();
    let wasm_name = export_use_name(ast, *right)?;
    Some((js_name, wasm_name))
}

// === emitDCEGraph ===

#[derive(Default)]
struct GraphBuilder {
    /// `(jsName, nativeName)` for each wasmImports entry.
    imports: Vec<(SmolStr, SmolStr)>,
    /// `(name, body)` of each erased top-level defun.
    defuns: Vec<(SmolStr, NodeId)>,
    /// `(jsName, wasmName)` in save order.
    exports: Vec<(SmolStr, SmolStr)>,
    export_seen: FxHashSet<SmolStr>,
    name_to_graph: FxHashMap<SmolStr, String>,
    module_prop_to_graph: FxHashMap<SmolStr, String>,
    export_name_to_graph: FxHashMap<SmolStr, String>,
    dyn_call_names: Vec<String>,
    found_imports_assign: bool,
    found_minimal_runtime_exports: bool,
    error: Option<PassError>,
}

impl GraphBuilder {
    fn save_asm_export(&mut self, js_name: SmolStr, wasm_name: SmolStr) {
        let graph = graph_name(&js_name, "export");
        self.name_to_graph.insert(js_name.clone(), graph.clone());
        self.module_prop_to_graph
            .insert(js_name.clone(), graph.clone());
        self.export_name_to_graph
            .insert(wasm_name.clone(), graph.clone());
        if js_name.starts_with("dynCall_") {
            self.dyn_call_names.push(graph);
        }
        if self.export_seen.insert(js_name.clone()) {
            self.exports.push((js_name, wasm_name));
        }
    }

    fn fail(&mut self, error: PassError) {
        if self.error.is_none() {
            self.error = Some(error);
        }
    }
}

/// Count the `wasmExports['…']` reads inside a subtree and return the first.
fn find_export_use(ast: &mut Ast, node: NodeId) -> (usize, Option<SmolStr>) {
    let mut count = 0;
    let mut first = None;
    full_walk(ast, node, &mut |ast, id| {
        if let Some(name) = export_use_name(ast, id) {
            count += 1;
            if first.is_none() {
                first = Some(name);
            }
        }
    });
    (count, first)
}

/// Build the reachability graph across the JS↔wasm seam and print it as a
/// JSON array on the stdout sink.
pub fn emit_dce_graph(ast: &mut Ast, cx: &mut PassContext) -> Result<(), PassError> {
    let mut builder = GraphBuilder::default();
    let special_scopes = std::cell::Cell::new(0i64);

    // First pass: recognize and erase the seam constructs so the second
    // pass sees only residual code. Function scopes count as special so a
    // nested declaration is never mistaken for a top-level defun.
    let root = ast.root;
    full_walk_pre(
        ast,
        root,
        &mut |ast, node| {
            if is_scope_node(ast, node) {
                special_scopes.set(special_scopes.get() + 1);
            }
            true
        },
        &mut |ast, node| {
            if is_scope_node(ast, node) {
                special_scopes.set(special_scopes.get() - 1);
            }
            first_pass(ast, node, special_scopes.get(), &mut builder);
        },
    );
    if let Some(error) = builder.error {
        return Err(error);
    }
    if special_scopes.get() != 0 {
        return Err(PassError::shape("special scopes must balance to zero"));
    }
    if !builder.found_imports_assign {
        return Err(PassError::shape("could not find the wasmImports assignment"));
    }

    // Exports injected by the caller.
    if let Some(info) = &cx.extra_info {
        for (js_name, wasm_name) in info.exports.clone() {
            builder.save_asm_export(js_name.into(), wasm_name.into());
        }
    }

    // Assemble the nodes: defuns, imports, exports.
    let mut nodes: Vec<GraphNode> = Vec::new();
    let mut index: FxHashMap<String, usize> = FxHashMap::default();
    let mut reaches: Vec<BTreeSet<String>> = Vec::new();

    for (name, _) in &builder.defuns {
        let graph = graph_name(name, "defun");
        index.insert(graph.clone(), nodes.len());
        nodes.push(GraphNode {
            name: graph,
            import: None,
            export: None,
            reaches: Vec::new(),
            root: false,
        });
        reaches.push(BTreeSet::new());
    }
    for (js_name, native_name) in &builder.imports {
        let graph = graph_name(js_name, "import");
        index.insert(graph.clone(), nodes.len());
        let mut own_reaches = BTreeSet::new();
        // the import is implemented by the JS symbol it was bound to
        if let Some(target) = builder.name_to_graph.get(js_name) {
            own_reaches.insert(target.clone());
        }
        nodes.push(GraphNode {
            name: graph,
            import: Some(("env".to_string(), native_name.to_string())),
            export: None,
            reaches: Vec::new(),
            root: false,
        });
        reaches.push(own_reaches);
    }
    for (js_name, wasm_name) in &builder.exports {
        let graph = graph_name(js_name, "export");
        index.insert(graph.clone(), nodes.len());
        nodes.push(GraphNode {
            name: graph,
            import: None,
            export: Some(wasm_name.to_string()),
            reaches: Vec::new(),
            root: false,
        });
        reaches.push(BTreeSet::new());
    }

    // Second pass: collect what each defun reaches, then what the residual
    // top level roots.
    let defuns = builder.defuns.clone();
    for (name, body) in defuns {
        let graph = graph_name(&name, "defun");
        let slot = index[&graph];
        let mut reached: Vec<Reach> = Vec::new();
        full_walk(ast, body, &mut |ast, node| {
            visit_use(ast, node, &builder, &mut reached);
        });
        apply_reaches(
            reached,
            Some(slot),
            &index,
            &mut nodes,
            &mut reaches,
            &builder.dyn_call_names,
            cx,
        );
    }
    let mut reached: Vec<Reach> = Vec::new();
    full_walk(ast, root, &mut |ast, node| {
        visit_use(ast, node, &builder, &mut reached);
    });
    apply_reaches(
        reached,
        None,
        &index,
        &mut nodes,
        &mut reaches,
        &builder.dyn_call_names,
        cx,
    );

    // Deterministic output: nodes sorted by name, reaches sorted ascending.
    for (node, set) in nodes.iter_mut().zip(reaches) {
        node.reaches = set.into_iter().collect();
    }
    nodes.sort_by(|a, b| a.name.cmp(&b.name));
    cx.out
        .push(serde_json::to_string_pretty(&nodes).unwrap_or_default());
    Ok(())
}

/// Function-bearing nodes whose contents are not top-level code.
fn is_scope_node(ast: &Ast, node: NodeId) -> bool {
    match ast.kind(node) {
        NodeKind::ArrowFunctionExpression { .. }
        | NodeKind::FunctionExpression { .. }
        | NodeKind::FunctionDeclaration { .. } => true,
        NodeKind::Property { kind, method, .. } => {
            *method || *kind != glueopt_ast::PropertyKind::Init
        }
        _ => false,
    }
}

fn first_pass(ast: &mut Ast, node: NodeId, special_scopes: i64, builder: &mut GraphBuilder) {
    // the imports table
    if let Some(object) = wasm_imports_value(ast, node) {
        let NodeKind::ObjectExpression { properties } = ast.kind(object) else {
            return;
        };
        for prop in properties.clone() {
            let NodeKind::Property { key, value, .. } = ast.kind(prop) else {
                continue;
            };
            let (key, mut value) = (*key, *value);
            let Some(native_name) = property_key_name(ast, key) else {
                builder.fail(PassError::shape("unrecognized wasmImports key"));
                return;
            };
            match ast.kind(value) {
                // numeric/inline entries carry no JS symbol
                NodeKind::Literal { .. }
                | NodeKind::FunctionExpression { .. }
                | NodeKind::ArrowFunctionExpression { .. } => continue,
                // a fallback like `wasmMemory || Module.wasmMemory`
                NodeKind::LogicalExpression { left, .. } => value = *left,
                _ => {}
            }
            let Some(js_name) = ast.ident_name(value).cloned() else {
                builder.fail(PassError::shape(
                    "wasmImports value must be an identifier",
                ));
                return;
            };
            builder.imports.push((js_name, native_name));
        }
        builder.found_imports_assign = true;
        empty_out(ast, node);
        return;
    }

    match ast.kind(node) {
        NodeKind::VariableDeclaration { declarations, .. } if declarations.len() == 1 => {
            let NodeKind::VariableDeclarator { id, init } = ast.kind(declarations[0]) else {
                return;
            };
            let (id, init) = (*id, *init);
            let Some(js_name) = ast.ident_name(id).cloned() else {
                return;
            };
            let Some(init) = init else { return };

            // var _x = wasmExports['x'];
            if let Some(wasm_name) = export_use_name(ast, init) {
                builder.save_asm_export(js_name, wasm_name);
                empty_out(ast, node);
                return;
            }

            // var _x = Module['_x'] = <...>;
            let NodeKind::AssignmentExpression { left, right, .. } = ast.kind(init) else {
                return;
            };
            let (left, right) = (*left, *right);
            if module_use_name(ast, left).as_ref() != Some(&js_name) {
                return;
            }
            if matches!(
                ast.kind(right),
                NodeKind::Literal {
                    value: LiteralValue::Number(_),
                    ..
                }
            ) {
                // a global address export: no wasm link, just erase
                empty_out(ast, node);
                return;
            }
            let (count, first) = find_export_use(ast, right);
            if count != 1 {
                builder.fail(PassError::shape(
                    "export pattern must contain exactly one wasmExports use",
                ));
                return;
            }
            builder.save_asm_export(js_name, first.expect("counted one use"));
            empty_out(ast, node);
        }
        NodeKind::FunctionDeclaration { id, body, .. } => {
            let (id, body) = (*id, *body);
            let Some(name) = ast.ident_name(id).cloned() else {
                return;
            };
            if name == "assignWasmExports" {
                // the minimal-runtime exports block
                if builder.found_minimal_runtime_exports {
                    builder.fail(PassError::shape(
                        "more than one assignWasmExports function",
                    ));
                    return;
                }
                let NodeKind::BlockStatement { body: stmts } = ast.kind(body) else {
                    return;
                };
                for stmt in stmts.clone() {
                    let NodeKind::ExpressionStatement { expression, .. } = ast.kind(stmt) else {
                        continue;
                    };
                    let expression = *expression;
                    if let Some((js_name, wasm_name)) = export_assignment(ast, expression) {
                        builder.save_asm_export(js_name, wasm_name);
                        empty_out(ast, stmt);
                    }
                }
                builder.found_minimal_runtime_exports = true;
                empty_out(ast, node);
                return;
            }
            if special_scopes == 0 {
                builder
                    .name_to_graph
                    .insert(name.clone(), graph_name(&name, "defun"));
                builder.defuns.push((name, body));
                empty_out(ast, node);
            }
        }
        _ => {}
    }
}

/// What a single use-site reaches.
enum Reach {
    One(String),
    /// A dynamic `dynCall` over-approximates to every `dynCall_*` export.
    AllDynCalls,
    /// A stray `wasmExports['…']` read roots the export unconditionally.
    Root(String),
}

fn visit_use(ast: &Ast, node: NodeId, builder: &GraphBuilder, out: &mut Vec<Reach>) {
    match ast.kind(node) {
        NodeKind::Identifier { name } => {
            if let Some(graph) = builder.name_to_graph.get(name) {
                out.push(Reach::One(graph.clone()));
            }
        }
        NodeKind::Literal {
            value: LiteralValue::Str(s),
            ..
        } if s == "dynCall_" => {
            // a computed dynCall lookup; anything may be called
            out.push(Reach::AllDynCalls);
        }
        NodeKind::CallExpression { callee, arguments } => {
            if ast.ident_name(*callee).map(|n| n == "dynCall") == Some(true) {
                match arguments.first() {
                    Some(&sig) if is_literal_string(ast, sig) => {
                        let sig = literal_string(ast, sig).expect("checked string");
                        out.push(Reach::One(graph_name(
                            &format!("dynCall_{sig}"),
                            "export",
                        )));
                    }
                    Some(_) => out.push(Reach::AllDynCalls),
                    None => {}
                }
            }
        }
        NodeKind::MemberExpression { .. } => {
            if let Some(name) = module_use_name(ast, node) {
                if let Some(graph) = builder.module_prop_to_graph.get(&name) {
                    out.push(Reach::One(graph.clone()));
                }
            } else if let Some(name) = export_use_name(ast, node) {
                if let Some(graph) = builder.export_name_to_graph.get(&name) {
                    out.push(Reach::Root(graph.clone()));
                }
            }
        }
        _ => {}
    }
}

#[allow(clippy::too_many_arguments)]
fn apply_reaches(
    reached: Vec<Reach>,
    from: Option<usize>,
    index: &FxHashMap<String, usize>,
    nodes: &mut [GraphNode],
    reaches: &mut [BTreeSet<String>],
    dyn_call_names: &[String],
    cx: &PassContext,
) {
    let mut targets: Vec<String> = Vec::new();
    for reach in reached {
        match reach {
            Reach::One(target) => targets.push(target),
            Reach::AllDynCalls => targets.extend(dyn_call_names.iter().cloned()),
            Reach::Root(graph) => {
                if let Some(&slot) = index.get(&graph) {
                    nodes[slot].root = true;
                }
            }
        }
    }
    for target in targets {
        match from {
            Some(slot) => {
                reaches[slot].insert(target);
            }
            None => match index.get(&target) {
                // reached from top-level code: unconditionally alive
                Some(&slot) => nodes[slot].root = true,
                None => cx.trace(&format!("metadce: missing declaration for {target}")),
            },
        }
    }
}

// === applyDCEGraphRemovals ===

/// Remove the imports and exports that the downstream metadce reported
/// unused. Every sidecar entry must be found in the AST.
pub fn apply_dce_graph_removals(ast: &mut Ast, cx: &mut PassContext) -> Result<(), PassError> {
    let info = cx
        .extra_info
        .as_ref()
        .ok_or(PassError::MissingExtraInfo("applyDCEGraphRemovals"))?;
    let unused_imports: FxHashSet<SmolStr> =
        info.unused_imports.iter().map(|s| SmolStr::new(s)).collect();
    let unused_exports: FxHashSet<SmolStr> =
        info.unused_exports.iter().map(|s| SmolStr::new(s)).collect();
    let mut found_imports: FxHashSet<SmolStr> = FxHashSet::default();
    let mut found_exports: FxHashSet<SmolStr> = FxHashSet::default();

    let root = ast.root;
    simple_walk(ast, root, &mut |ast, node| {
        // the imports table: drop unused entries, keeping any whose value
        // must still be evaluated
        if let Some(object) = wasm_imports_value(ast, node) {
            let NodeKind::ObjectExpression { properties } = ast.kind(object) else {
                return;
            };
            let mut kept = Vec::with_capacity(properties.len());
            for prop in properties.clone() {
                let NodeKind::Property { key, value, .. } = ast.kind(prop) else {
                    kept.push(prop);
                    continue;
                };
                let (key, value) = (*key, *value);
                let Some(name) = property_key_name(ast, key) else {
                    kept.push(prop);
                    continue;
                };
                if unused_imports.contains(&name) {
                    found_imports.insert(name);
                    if has_side_effects(ast, value) {
                        kept.push(prop);
                    }
                } else {
                    kept.push(prop);
                }
            }
            if let NodeKind::ObjectExpression { properties } = ast.kind_mut(object) {
                *properties = kept;
            }
            return;
        }

        match ast.kind(node) {
            // _x = wasmExports['x'];  or  Module['_x'] = _x = wasmExports['x'];
            NodeKind::ExpressionStatement { expression, .. } => {
                let expression = *expression;
                if let Some((_, wasm_name)) = export_assignment(ast, expression) {
                    if unused_exports.contains(&wasm_name) {
                        found_exports.insert(wasm_name);
                        empty_out(ast, node);
                    }
                }
            }
            // var _x = wasmExports['x'];  and the Module chain variant
            NodeKind::VariableDeclaration { declarations, .. } if declarations.len() == 1 => {
                let NodeKind::VariableDeclarator { id: _, init } = ast.kind(declarations[0])
                else {
                    return;
                };
                let Some(init) = *init else { return };
                let wasm_name = export_use_name(ast, init)
                    .or_else(|| export_assignment(ast, init).map(|(_, wasm)| wasm));
                if let Some(wasm_name) = wasm_name {
                    if unused_exports.contains(&wasm_name) {
                        found_exports.insert(wasm_name);
                        empty_out(ast, node);
                    }
                }
            }
            _ => {}
        }
    });

    for name in &unused_imports {
        if !found_imports.contains(name) {
            return Err(PassError::Consistency {
                what: format!("unused import `{name}` was not found in the module"),
            });
        }
    }
    for name in &unused_exports {
        if !found_exports.contains(name) {
            return Err(PassError::Consistency {
                what: format!("unused export `{name}` was not found in the module"),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extra_info::split_extra_info;
    use glueopt_fmt::{print, FormatConfig};
    use glueopt_parser::parse;

    fn emit(source: &str) -> Vec<serde_json::Value> {
        let mut ast = parse(source, false).expect("parse");
        let mut cx = PassContext::default();
        emit_dce_graph(&mut ast, &mut cx).expect("emit");
        serde_json::from_str(&cx.out[0]).expect("valid graph json")
    }

    const SCENARIO: &str =
        "var wasmImports = { env_log: _log };\nvar _malloc = wasmExports['malloc'];\nfunction _log() { _malloc(); }\n";

    #[test]
    fn test_minimal_graph() {
        let graph = emit(SCENARIO);
        assert_eq!(graph.len(), 3);
        assert_eq!(graph[0]["name"], "emcc$defun$_log");
        assert_eq!(graph[0]["reaches"][0], "emcc$export$_malloc");
        assert_eq!(graph[1]["name"], "emcc$export$_malloc");
        assert_eq!(graph[1]["export"], "malloc");
        assert_eq!(graph[2]["name"], "emcc$import$_log");
        assert_eq!(graph[2]["import"][0], "env");
        assert_eq!(graph[2]["import"][1], "env_log");
        assert_eq!(graph[2]["reaches"][0], "emcc$defun$_log");
    }

    #[test]
    fn test_graph_is_deterministic() {
        let mut ast1 = parse(SCENARIO, false).expect("parse");
        let mut cx1 = PassContext::default();
        emit_dce_graph(&mut ast1, &mut cx1).unwrap();
        let mut ast2 = parse(SCENARIO, false).expect("parse");
        let mut cx2 = PassContext::default();
        emit_dce_graph(&mut ast2, &mut cx2).unwrap();
        assert_eq!(cx1.out, cx2.out);
    }

    #[test]
    fn test_toplevel_use_roots_export() {
        let graph = emit(
            "var wasmImports = {};\nvar _main = wasmExports['main'];\n_main();\n",
        );
        let main = graph
            .iter()
            .find(|n| n["name"] == "emcc$export$_main")
            .expect("export node");
        assert_eq!(main["root"], true);
    }

    #[test]
    fn test_stray_export_use_is_root() {
        let graph = emit(
            "var wasmImports = {};\nvar _a = wasmExports['a'];\nfunction go() { wasmExports['a'](); }\n",
        );
        let a = graph
            .iter()
            .find(|n| n["name"] == "emcc$export$_a")
            .expect("export node");
        assert_eq!(a["root"], true);
    }

    #[test]
    fn test_static_and_dynamic_dyncalls() {
        let graph = emit(
            "var wasmImports = {};\nvar dynCall_vi = wasmExports['dynCall_vi'];\nvar dynCall_ii = wasmExports['dynCall_ii'];\nfunction a() { dynCall('vi', f); }\nfunction b(sig) { dynCall(sig, f); }\n",
        );
        let a = graph.iter().find(|n| n["name"] == "emcc$defun$a").unwrap();
        assert_eq!(a["reaches"].as_array().unwrap().len(), 1);
        assert_eq!(a["reaches"][0], "emcc$export$dynCall_vi");
        let b = graph.iter().find(|n| n["name"] == "emcc$defun$b").unwrap();
        let reaches = b["reaches"].as_array().unwrap();
        // the dynamic call over-approximates to every dynCall_* export
        assert!(reaches.contains(&serde_json::json!("emcc$export$dynCall_ii")));
        assert!(reaches.contains(&serde_json::json!("emcc$export$dynCall_vi")));
    }

    #[test]
    fn test_dyncall_string_literal_reaches_all() {
        let graph = emit(
            "var wasmImports = {};\nvar dynCall_v = wasmExports['dynCall_v'];\nfunction t() { return 'dynCall_'; }\n",
        );
        let t = graph.iter().find(|n| n["name"] == "emcc$defun$t").unwrap();
        assert_eq!(t["reaches"][0], "emcc$export$dynCall_v");
    }

    #[test]
    fn test_module_export_declaration_with_single_use() {
        let graph = emit(
            "var wasmImports = {};\nvar _go = Module['_go'] = (a) => (_go = Module['_go'] = wasmExports['go'])(a);\n",
        );
        let go = graph
            .iter()
            .find(|n| n["name"] == "emcc$export$_go")
            .expect("export registered");
        assert_eq!(go["export"], "go");
    }

    #[test]
    fn test_numeric_module_export_is_just_erased(){
        let source =
            "var wasmImports = {};\nvar _base = Module['_base'] = 1024;\nfunction f() {}\n";
        let mut ast = parse(source, false).expect("parse");
        let mut cx = PassContext::default();
        emit_dce_graph(&mut ast, &mut cx).unwrap();
        let graph: Vec<serde_json::Value> = serde_json::from_str(&cx.out[0]).unwrap();
        assert!(graph.iter().all(|n| n["name"] != "emcc$export$_base"));
        // and the declaration is gone from the program
        let out = print(&ast, &FormatConfig::default()).output;
        assert!(!out.contains("_base"));
    }

    #[test]
    fn test_import_logical_or_fallback() {
        let graph = emit(
            "var wasmImports = { memory: wasmMemory || Module.wasmMemory };\n",
        );
        let import = graph
            .iter()
            .find(|n| n["name"] == "emcc$import$wasmMemory")
            .expect("left side identifier is used");
        assert_eq!(import["import"][1], "memory");
    }

    #[test]
    fn test_literal_import_values_ignored() {
        let graph = emit("var wasmImports = { tableBase: 0, log: _log };\nfunction _log() {}\n");
        assert!(graph.iter().all(|n| n["name"] != "emcc$import$tableBase"));
        assert!(graph.iter().any(|n| n["name"] == "emcc$import$_log"));
    }

    #[test]
    fn test_assign_wasm_exports_block() {
        let graph = emit(
            "var wasmImports = {};\nfunction assignWasmExports(wasmExports) { _a = wasmExports['a']; Module['_b'] = _b = wasmExports['b']; }\n",
        );
        assert!(graph.iter().any(|n| n["name"] == "emcc$export$_a"));
        let b = graph.iter().find(|n| n["name"] == "emcc$export$_b").unwrap();
        assert_eq!(b["export"], "b");
        // assignWasmExports itself is not a defun
        assert!(graph.iter().all(|n| n["name"] != "emcc$defun$assignWasmExports"));
    }

    #[test]
    fn test_nested_function_declarations_are_not_defuns() {
        let graph = emit(
            "var wasmImports = {};\nfunction outer() { function inner() {} inner(); }\nvar obj = { method() { function hidden() {} } };\n",
        );
        assert!(graph.iter().any(|n| n["name"] == "emcc$defun$outer"));
        assert!(graph.iter().all(|n| n["name"] != "emcc$defun$inner"));
        assert!(graph.iter().all(|n| n["name"] != "emcc$defun$hidden"));
    }

    #[test]
    fn test_extra_info_exports_injected() {
        let text = "var wasmImports = {};\n// EXTRA_INFO: {\"exports\": [[\"_extra\", \"extra\"]]}";
        let (code, info) = split_extra_info(text).unwrap();
        let mut ast = parse(code, false).expect("parse");
        let mut cx = PassContext::new(info, false);
        emit_dce_graph(&mut ast, &mut cx).unwrap();
        let graph: Vec<serde_json::Value> = serde_json::from_str(&cx.out[0]).unwrap();
        let extra = graph
            .iter()
            .find(|n| n["name"] == "emcc$export$_extra")
            .expect("injected export");
        assert_eq!(extra["export"], "extra");
    }

    #[test]
    fn test_missing_imports_assignment_is_fatal() {
        let mut ast = parse("function f() {}", false).expect("parse");
        let mut cx = PassContext::default();
        assert!(matches!(
            emit_dce_graph(&mut ast, &mut cx),
            Err(PassError::Shape { .. })
        ));
    }

    const APPLY_INPUT: &str =
        "var wasmImports = { env_log: _log, keep: _keep };\nvar _malloc = wasmExports['malloc'];\nvar _free = wasmExports['free'];\n";

    fn apply_cx(json: &str) -> PassContext {
        let text = format!("x\n// EXTRA_INFO: {json}");
        let (_, info) = split_extra_info(&text).unwrap();
        PassContext::new(info, false)
    }

    #[test]
    fn test_apply_removals() {
        let mut ast = parse(APPLY_INPUT, false).expect("parse");
        let mut cx = apply_cx("{\"unusedImports\": [\"env_log\"], \"unusedExports\": [\"malloc\"]}");
        apply_dce_graph_removals(&mut ast, &mut cx).expect("apply");
        let out = print(&ast, &FormatConfig::default()).output;
        assert!(!out.contains("env_log"));
        assert!(out.contains("keep: _keep"));
        assert!(!out.contains("_malloc"));
        assert!(out.contains("_free"));
    }

    #[test]
    fn test_apply_keeps_side_effectful_import_value() {
        let mut ast = parse(
            "var wasmImports = { boot: runBoot() };\n",
            false,
        )
        .expect("parse");
        let mut cx = apply_cx("{\"unusedImports\": [\"boot\"]}");
        apply_dce_graph_removals(&mut ast, &mut cx).expect("apply");
        let out = print(&ast, &FormatConfig::default()).output;
        // the entry stays so its evaluation still happens
        assert!(out.contains("boot: runBoot()"));
    }

    #[test]
    fn test_apply_expression_statement_form() {
        let mut ast = parse(
            "var wasmImports = {};\n_a = wasmExports['a'];\nModule['_b'] = _b = wasmExports['b'];\n",
            false,
        )
        .expect("parse");
        let mut cx = apply_cx("{\"unusedExports\": [\"a\", \"b\"]}");
        apply_dce_graph_removals(&mut ast, &mut cx).expect("apply");
        let out = print(&ast, &FormatConfig::default()).output;
        assert!(!out.contains("wasmExports"));
    }

    #[test]
    fn test_apply_missing_entry_is_fatal() {
        let mut ast = parse(APPLY_INPUT, false).expect("parse");
        let mut cx = apply_cx("{\"unusedImports\": [\"nonexistent\"]}");
        assert!(matches!(
            apply_dce_graph_removals(&mut ast, &mut cx),
            Err(PassError::Consistency { .. })
        ));
        let mut ast = parse(APPLY_INPUT, false).expect("parse");
        let mut cx = apply_cx("{\"unusedExports\": [\"nonexistent\"]}");
        assert!(matches!(
            apply_dce_graph_removals(&mut ast, &mut cx),
            Err(PassError::Consistency { .. })
        ));
    }

    #[test]
    fn test_apply_requires_extra_info() {
        let mut ast = parse(APPLY_INPUT, false).expect("parse");
        let mut cx = PassContext::default();
        assert!(matches!(
            apply_dce_graph_removals(&mut ast, &mut cx),
            Err(PassError::MissingExtraInfo(_))
        ));
    }
}
