// SPDX-License-Identifier: PMPL-1.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell

//! Name minification: the deterministic short-name generator plus the
//! `minifyGlobals` and `minifyLocals` passes.

use glueopt_ast::helpers::pattern_parts;
use glueopt_ast::walk::{full_walk_pre, recursive_walk, simple_walk, RecursiveVisitor};
use glueopt_ast::{Ast, Ident, NodeId, NodeKind};
use rustc_hash::{FxHashMap, FxHashSet};
use smol_str::SmolStr;
use std::collections::BTreeMap;

use crate::extra_info::Globals;
use crate::{PassContext, PassError};

/// First characters of generated names.
const INITS: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ_$";
/// Later characters of generated names.
const LATERS: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ_$0123456789";

/// Names the generator must never produce.
const RESERVED: &[&str] = &[
    "do", "if", "in", "for", "new", "try", "var", "env", "let", "case", "else", "enum", "void",
    "this", "with",
];

/// Deterministic short-name generator.
///
/// A mixed-radix odometer over `INITS` for the first character and `LATERS`
/// for the rest, with the least significant digit first. The produced list
/// is append-only, so every caller sharing one generator sees a consistent
/// numbering; reserved words advance the counter without being stored.
#[derive(Debug, Default)]
pub struct NameMinifier {
    names: Vec<SmolStr>,
    state: Vec<usize>,
}

impl NameMinifier {
    /// Extend the generated list to at least `n + 1` names.
    pub fn ensure(&mut self, n: usize) {
        while self.names.len() <= n {
            self.generate();
        }
    }

    /// The `i`-th generated name. Call [`ensure`](Self::ensure) first.
    pub fn name(&self, i: usize) -> &SmolStr {
        &self.names[i]
    }

    fn generate(&mut self) {
        if self.state.is_empty() {
            self.state.push(0);
        }
        let mut name = String::with_capacity(self.state.len());
        name.push(INITS[self.state[0]] as char);
        for &digit in &self.state[1..] {
            name.push(LATERS[digit] as char);
        }
        if !RESERVED.contains(&name.as_str()) {
            self.names.push(name.into());
        }
        // advance the odometer; a new digit starts at zero
        let mut i = 0;
        loop {
            let limit = if i == 0 { INITS.len() } else { LATERS.len() };
            self.state[i] += 1;
            if self.state[i] < limit {
                break;
            }
            self.state[i] = 0;
            i += 1;
            if i == self.state.len() {
                self.state.push(0);
                break;
            }
        }
    }
}

// === minifyGlobals ===

/// Minify every name declared inside the single top-level `instantiate`
/// function (the wasm2js wrapper), plus the extra globals the sidecar
/// names. The mapping is published as the `// EXTRA_INFO:` output suffix.
pub fn minify_globals(ast: &mut Ast, cx: &mut PassContext) -> Result<(), PassError> {
    let NodeKind::Program { body } = ast.kind(ast.root) else {
        return Err(PassError::shape("program root expected"));
    };
    let body = body.clone();
    let [func] = body.as_slice() else {
        return Err(PassError::shape(
            "minifyGlobals input must be a single top-level function",
        ));
    };
    let func = *func;
    let NodeKind::FunctionDeclaration { id: fn_id, .. } = ast.kind(func) else {
        return Err(PassError::shape(
            "minifyGlobals input must be a single top-level function",
        ));
    };
    let fn_id = *fn_id;
    let original_name = ast
        .ident_name(fn_id)
        .cloned()
        .ok_or_else(|| PassError::shape("top-level function must be named"))?;

    // declared names in declaration order, and the property-name nodes of
    // dot accesses, which must never be renamed
    let mut declared: Vec<Ident> = Vec::new();
    let mut seen: FxHashSet<Ident> = FxHashSet::default();
    let mut ignore: FxHashSet<NodeId> = FxHashSet::default();
    full_walk_pre(
        ast,
        func,
        &mut |ast, node| {
            match ast.kind(node) {
                NodeKind::FunctionDeclaration { id, params, .. } => {
                    let (id, params) = (*id, params.clone());
                    if let Some(name) = ast.ident_name(id) {
                        if seen.insert(name.clone()) {
                            declared.push(name.clone());
                        }
                    }
                    for param in params {
                        let (bound, _) = pattern_parts(ast, param);
                        for ident in bound {
                            if let Some(name) = ast.ident_name(ident) {
                                if seen.insert(name.clone()) {
                                    declared.push(name.clone());
                                }
                            }
                        }
                    }
                }
                NodeKind::FunctionExpression { params, .. }
                | NodeKind::ArrowFunctionExpression { params, .. } => {
                    for param in params.clone() {
                        let (bound, _) = pattern_parts(ast, param);
                        for ident in bound {
                            if let Some(name) = ast.ident_name(ident) {
                                if seen.insert(name.clone()) {
                                    declared.push(name.clone());
                                }
                            }
                        }
                    }
                }
                NodeKind::VariableDeclarator { id, .. } => {
                    let id = *id;
                    let (bound, _) = pattern_parts(ast, id);
                    for ident in bound {
                        if let Some(name) = ast.ident_name(ident) {
                            if seen.insert(name.clone()) {
                                declared.push(name.clone());
                            }
                        }
                    }
                }
                NodeKind::MemberExpression {
                    property,
                    computed: false,
                    ..
                } => {
                    ignore.insert(*property);
                }
                _ => {}
            }
            true
        },
        &mut |_, _| {},
    );

    // extra globals count as declared too
    if let Some(Globals::List(extra)) = &cx.extra_info.as_ref().and_then(|i| i.globals.clone()) {
        for name in extra {
            let name: Ident = name.as_str().into();
            if seen.insert(name.clone()) {
                declared.push(name);
            }
        }
    }

    cx.minifier.ensure(declared.len());
    let mut minified: BTreeMap<String, String> = BTreeMap::new();
    let mut rename: FxHashMap<Ident, Ident> = FxHashMap::default();
    for (i, name) in declared.iter().enumerate() {
        let short = cx.minifier.name(i).clone();
        minified.insert(name.to_string(), short.to_string());
        rename.insert(name.clone(), short);
    }

    simple_walk(ast, func, &mut |ast, node| {
        if ignore.contains(&node) {
            return;
        }
        if let NodeKind::Identifier { name } = ast.kind_mut(node) {
            if let Some(short) = rename.get(name) {
                *name = short.clone();
            }
        }
    });

    // the wrapper itself keeps its public name
    if let NodeKind::Identifier { name } = ast.kind_mut(fn_id) {
        *name = original_name;
    }

    let json = serde_json::to_string(&minified).unwrap_or_default();
    cx.suffix = Some(format!("// EXTRA_INFO:{json}"));
    Ok(())
}

// === minifyLocals ===

/// Minify the local names (and labels) of every top-level function, using
/// `extraInfo.globals` for the names that cross function boundaries.
pub fn minify_locals(ast: &mut Ast, cx: &mut PassContext) -> Result<(), PassError> {
    let Some(Globals::Map(globals)) = cx.extra_info.as_ref().and_then(|i| i.globals.clone())
    else {
        return Err(PassError::MissingExtraInfo("minifyLocals"));
    };

    let NodeKind::Program { body } = ast.kind(ast.root) else {
        return Err(PassError::shape("program root expected"));
    };
    for func in body.clone() {
        let NodeKind::FunctionDeclaration { id, params, body, .. } = ast.kind(func) else {
            continue;
        };
        let (fn_id, params, fn_body) = (*id, params.clone(), *body);
        minify_one_function(ast, cx, &globals, fn_id, &params, fn_body)?;
    }
    Ok(())
}

fn minify_one_function(
    ast: &mut Ast,
    cx: &mut PassContext,
    globals: &FxHashMap<String, String>,
    fn_id: NodeId,
    params: &[NodeId],
    body: NodeId,
) -> Result<(), PassError> {
    // 1. local names: parameters plus every declarator in the function
    let mut local_names: FxHashSet<Ident> = FxHashSet::default();
    for &param in params {
        let (bound, _) = pattern_parts(ast, param);
        for ident in bound {
            if let Some(name) = ast.ident_name(ident) {
                local_names.insert(name.clone());
            }
        }
    }
    simple_walk(ast, body, &mut |ast, node| {
        if let NodeKind::VariableDeclarator { id, .. } = ast.kind(node) {
            let id = *id;
            let (bound, _) = pattern_parts(ast, id);
            for ident in bound {
                if let Some(name) = ast.ident_name(ident) {
                    local_names.insert(name.clone());
                }
            }
        }
    });

    // 2. pre-scan: pre-assigned minified globals reserve their short names;
    // a local name in callee position would mean the scope model is wrong
    let mut new_names: FxHashMap<Ident, Ident> = FxHashMap::default();
    let mut used_names: FxHashSet<Ident> = FxHashSet::default();
    let mut callee_violation: Option<Ident> = None;
    simple_walk(ast, body, &mut |ast, node| {
        match ast.kind(node) {
            NodeKind::Identifier { name } => {
                if !local_names.contains(name) {
                    if let Some(short) = globals.get(name.as_str()) {
                        let short: Ident = short.as_str().into();
                        new_names.insert(name.clone(), short.clone());
                        used_names.insert(short);
                    }
                }
            }
            NodeKind::CallExpression { callee, .. } => {
                if let Some(name) = ast.ident_name(*callee) {
                    if local_names.contains(name) && callee_violation.is_none() {
                        callee_violation = Some(name.clone());
                    }
                }
            }
            _ => {}
        }
    });
    if let Some(name) = callee_violation {
        return Err(PassError::shape(format!(
            "local name `{name}` must not appear as a call target"
        )));
    }

    // 3. parameters first
    let mut next = 0usize;
    for &param in params {
        let (bound, _) = pattern_parts(ast, param);
        for ident in bound {
            let Some(old) = ast.ident_name(ident).cloned() else {
                continue;
            };
            let fresh = next_minified(cx, &mut next, &used_names, &local_names);
            new_names.insert(old, fresh.clone());
            if let NodeKind::Identifier { name } = ast.kind_mut(ident) {
                *name = fresh;
            }
        }
    }

    // 4. body walk: rename on first encounter, labels in their own space
    let mut renamer = Renamer {
        cx,
        next,
        new_names,
        used_names,
        local_names,
        labels: FxHashMap::default(),
        next_label: 0,
    };
    recursive_walk(ast, body, &mut renamer);

    // 5. the function's own name comes from the globals mapping
    if let Some(old) = ast.ident_name(fn_id).cloned() {
        if let Some(short) = globals.get(old.as_str()) {
            let short: Ident = short.as_str().into();
            if let NodeKind::Identifier { name } = ast.kind_mut(fn_id) {
                *name = short;
            }
        }
    }
    Ok(())
}

/// The next generated name that collides with neither the pre-reserved
/// minified globals nor the original local names.
fn next_minified(
    cx: &mut PassContext,
    next: &mut usize,
    used_names: &FxHashSet<Ident>,
    local_names: &FxHashSet<Ident>,
) -> Ident {
    loop {
        cx.minifier.ensure(*next);
        let candidate = cx.minifier.name(*next).clone();
        *next += 1;
        if !used_names.contains(&candidate) && !local_names.contains(&candidate) {
            return candidate;
        }
    }
}

struct Renamer<'a> {
    cx: &'a mut PassContext,
    next: usize,
    new_names: FxHashMap<Ident, Ident>,
    used_names: FxHashSet<Ident>,
    local_names: FxHashSet<Ident>,
    labels: FxHashMap<Ident, Ident>,
    next_label: usize,
}

impl Renamer<'_> {
    fn label_name(&mut self, old: &Ident) -> Ident {
        if let Some(short) = self.labels.get(old) {
            return short.clone();
        }
        self.cx.minifier.ensure(self.next_label);
        let short = self.cx.minifier.name(self.next_label).clone();
        self.next_label += 1;
        self.labels.insert(old.clone(), short.clone());
        short
    }

    fn rename_label(&mut self, ast: &mut Ast, label: NodeId) {
        let Some(old) = ast.ident_name(label).cloned() else {
            return;
        };
        let short = self.label_name(&old);
        if let NodeKind::Identifier { name } = ast.kind_mut(label) {
            *name = short;
        }
    }
}

impl RecursiveVisitor for Renamer<'_> {
    fn visit(&mut self, ast: &mut Ast, node: NodeId) -> bool {
        match ast.kind(node) {
            NodeKind::LabeledStatement { label, body } => {
                let (label, body) = (*label, *body);
                self.rename_label(ast, label);
                recursive_walk(ast, body, self);
                true
            }
            NodeKind::BreakStatement { label: Some(label) }
            | NodeKind::ContinueStatement { label: Some(label) } => {
                let label = *label;
                self.rename_label(ast, label);
                true
            }
            NodeKind::MemberExpression {
                object,
                property,
                computed,
            } => {
                // dot-property names live outside the local namespace
                let (object, property, computed) = (*object, *property, *computed);
                recursive_walk(ast, object, self);
                if computed {
                    recursive_walk(ast, property, self);
                }
                true
            }
            NodeKind::ObjectExpression { properties } => {
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
            NodeKind::Identifier { name } => {
                let old = name.clone();
                if let Some(short) = self.new_names.get(&old) {
                    let short = short.clone();
                    if let NodeKind::Identifier { name } = ast.kind_mut(node) {
                        *name = short;
                    }
                } else if self.local_names.contains(&old) {
                    let fresh = next_minified(
                        self.cx,
                        &mut self.next,
                        &self.used_names,
                        &self.local_names,
                    );
                    self.new_names.insert(old, fresh.clone());
                    if let NodeKind::Identifier { name } = ast.kind_mut(node) {
                        *name = fresh;
                    }
                }
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extra_info::split_extra_info;
    use glueopt_fmt::{print, FormatConfig};
    use glueopt_parser::parse;

    #[test]
    fn test_generator_first_names() {
        let mut gen = NameMinifier::default();
        gen.ensure(3);
        assert_eq!(gen.name(0), "a");
        assert_eq!(gen.name(1), "b");
        assert_eq!(gen.name(2), "c");
        assert_eq!(gen.name(3), "d");
    }

    #[test]
    fn test_generator_skips_reserved() {
        let mut gen = NameMinifier::default();
        gen.ensure(200);
        for i in 0..=200 {
            assert!(
                !RESERVED.contains(&gen.name(i).as_str()),
                "reserved word {} produced",
                gen.name(i)
            );
        }
    }

    #[test]
    fn test_generator_uniqueness_and_start_char() {
        let mut gen = NameMinifier::default();
        gen.ensure(500);
        let mut seen = FxHashSet::default();
        for i in 0..=500 {
            let name = gen.name(i).clone();
            assert!(seen.insert(name.clone()), "duplicate name {name}");
            let first = name.chars().next().unwrap();
            assert!(
                first.is_ascii_alphabetic() || first == '_' || first == '$',
                "bad first char in {name}"
            );
        }
    }

    #[test]
    fn test_generator_rolls_over_to_two_chars() {
        let mut gen = NameMinifier::default();
        gen.ensure(54);
        // 54 single-character names (a..z, A..Z, _, $), then two characters
        assert_eq!(gen.name(53), "$");
        assert_eq!(gen.name(54), "aa");
        assert_eq!(gen.name(55), "ba");
    }

    #[test]
    fn test_minify_globals_basic() {
        let source = "function instantiate(bufferView) {\n  var temp = 1;\n  function inner(arg) { return temp + arg; }\n  return inner(bufferView.length);\n}\n";
        let mut ast = parse(source, false).expect("parse");
        let mut cx = PassContext::default();
        minify_globals(&mut ast, &mut cx).expect("pass");
        let out = print(&ast, &FormatConfig::default()).output;
        // the wrapper keeps its public name (it is minted `a`, then
        // restored); everything declared inside shrinks
        assert!(out.contains("function instantiate(b)"));
        assert!(!out.contains("temp"));
        assert!(!out.contains("inner"));
        // dot properties survive
        assert!(out.contains(".length"));
        // and the mapping is published as a suffix
        let suffix = cx.suffix.expect("suffix");
        assert!(suffix.starts_with("// EXTRA_INFO:"));
        let json: serde_json::Value =
            serde_json::from_str(suffix.trim_start_matches("// EXTRA_INFO:")).unwrap();
        assert_eq!(json["instantiate"], "a");
        assert_eq!(json["bufferView"], "b");
    }

    #[test]
    fn test_minify_globals_extra_globals_list() {
        let source = "function instantiate() { return wasmExtra; }";
        let text = "x\n// EXTRA_INFO: {\"globals\": [\"wasmExtra\"]}";
        let (_, info) = split_extra_info(text).unwrap();
        let mut ast = parse(source, false).expect("parse");
        let mut cx = PassContext::new(info, false);
        minify_globals(&mut ast, &mut cx).expect("pass");
        let out = print(&ast, &FormatConfig::default()).output;
        assert!(!out.contains("wasmExtra"));
    }

    #[test]
    fn test_minify_globals_shape_assertion() {
        let mut ast = parse("var x = 1; var y = 2;", false).expect("parse");
        let mut cx = PassContext::default();
        assert!(matches!(
            minify_globals(&mut ast, &mut cx),
            Err(PassError::Shape { .. })
        ));
    }

    fn locals_cx(globals_json: &str) -> PassContext {
        let text = format!("x\n// EXTRA_INFO: {{\"globals\": {globals_json}}}");
        let (_, info) = split_extra_info(&text).unwrap();
        PassContext::new(info, false)
    }

    #[test]
    fn test_minify_locals_params_and_vars() {
        let source = "function big(firstParam, secondParam) {\n  var localValue = firstParam + secondParam;\n  return localValue * 2;\n}\n";
        let mut ast = parse(source, false).expect("parse");
        let mut cx = locals_cx("{\"big\": \"q\"}");
        minify_locals(&mut ast, &mut cx).expect("pass");
        let out = print(&ast, &FormatConfig::default()).output;
        assert_eq!(out, "function q(a, b) {\n  var c = a + b;\n  return c * 2;\n}\n");
    }

    #[test]
    fn test_minify_locals_reserves_minified_globals() {
        // `a` is taken by a global reference; locals must avoid it
        let source = "function f(x) { return x + glob; }";
        let mut ast = parse(source, false).expect("parse");
        let mut cx = locals_cx("{\"glob\": \"a\", \"f\": \"z\"}");
        minify_locals(&mut ast, &mut cx).expect("pass");
        let out = print(&ast, &FormatConfig::default()).output;
        assert_eq!(out, "function z(b) {\n  return b + a;\n}\n");
    }

    #[test]
    fn test_minify_locals_labels_independent() {
        let source =
            "function f() {\n  outer: for (;;) {\n    for (;;) {\n      continue outer;\n    }\n    break outer;\n  }\n}\n";
        let mut ast = parse(source, false).expect("parse");
        let mut cx = locals_cx("{}");
        minify_locals(&mut ast, &mut cx).expect("pass");
        let out = print(&ast, &FormatConfig::default()).output;
        assert!(!out.contains("outer"));
        assert!(out.contains("a: for"));
        assert!(out.contains("continue a;"));
        assert!(out.contains("break a;"));
    }

    #[test]
    fn test_minify_locals_dot_properties_survive() {
        let source = "function f(ptr) { return obj.ptr + ptr; }";
        let mut ast = parse(source, false).expect("parse");
        let mut cx = locals_cx("{}");
        minify_locals(&mut ast, &mut cx).expect("pass");
        let out = print(&ast, &FormatConfig::default()).output;
        assert!(out.contains("obj.ptr"));
        assert!(out.contains("+ a"));
    }

    #[test]
    fn test_minify_locals_callee_assertion() {
        let source = "function f(cb) { cb(); }";
        let mut ast = parse(source, false).expect("parse");
        let mut cx = locals_cx("{}");
        assert!(matches!(
            minify_locals(&mut ast, &mut cx),
            Err(PassError::Shape { .. })
        ));
    }

    #[test]
    fn test_minify_locals_requires_globals_map() {
        let mut ast = parse("function f() {}", false).expect("parse");
        let mut cx = PassContext::default();
        assert!(matches!(
            minify_locals(&mut ast, &mut cx),
            Err(PassError::MissingExtraInfo(_))
        ));
    }

    #[test]
    fn test_minifier_state_is_monotonic_across_passes() {
        // two functions in one run share the generated list
        let source = "function f(p) { return p; }\nfunction g(q) { return q; }\n";
        let mut ast = parse(source, false).expect("parse");
        let mut cx = locals_cx("{}");
        minify_locals(&mut ast, &mut cx).expect("pass");
        let out = print(&ast, &FormatConfig::default()).output;
        // each function restarts its own numbering over the shared list
        assert_eq!(out, "function f(a) {\n  return a;\n}\nfunction g(a) {\n  return a;\n}\n");
    }
}
