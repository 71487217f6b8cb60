// SPDX-License-Identifier: PMPL-1.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell

//! End-to-end pipeline tests over glue-shaped inputs.

use glueopt::{process, Options};

fn run(source: &str, passes: &[&str]) -> glueopt::RunOutput {
    let options = Options {
        passes: passes.iter().map(|s| s.to_string()).collect(),
        ..Options::default()
    };
    process(source, &options).expect("pipeline")
}

#[test]
fn test_jsdce_pipeline() {
    let out = run("function f(){} var x = 1; var y = 2; use(y);", &["JSDCE"]);
    assert_eq!(out.printed.unwrap(), "var y = 2;\nuse(y);\n");
}

#[test]
fn test_multiple_passes_in_order() {
    // unsign first, then DCE drops the unused binding
    let out = run(
        "var dead = 1; HEAP32[p >> 2] = v;",
        &["unsignPointers", "JSDCE"],
    );
    assert_eq!(out.printed.unwrap(), "HEAP32[p >>> 2] = v;\n");
}

#[test]
fn test_emit_dce_graph_stdout() {
    let source = "var wasmImports = { env_log: _log };\nvar _malloc = wasmExports['malloc'];\nfunction _log() { _malloc(); }\n";
    let options = Options {
        passes: vec!["emitDCEGraph".to_string()],
        no_print: true,
        ..Options::default()
    };
    let out = process(source, &options).expect("pipeline");
    assert!(out.printed.is_none());
    assert_eq!(out.stdout.len(), 1);
    let graph: Vec<serde_json::Value> = serde_json::from_str(&out.stdout[0]).unwrap();
    assert_eq!(graph.len(), 3);
    assert_eq!(graph[0]["name"], "emcc$defun$_log");
}

#[test]
fn test_apply_dce_graph_removals_with_sidecar() {
    let source = "var wasmImports = { env_log: _log };\nvar _malloc = wasmExports['malloc'];\nfunction _log() { _malloc(); }\n// EXTRA_INFO: {\"unusedImports\": [\"env_log\"], \"unusedExports\": [\"malloc\"]}";
    let out = run(source, &["applyDCEGraphRemovals"]);
    let printed = out.printed.unwrap();
    assert!(!printed.contains("env_log"));
    assert!(!printed.contains("wasmExports['malloc']"));
    assert!(printed.contains("function _log()"));
}

#[test]
fn test_little_endian_heap_scenario() {
    let out = run("HEAP32[p] = v; x = HEAP32[q];", &["littleEndianHeap"]);
    assert_eq!(
        out.printed.unwrap(),
        "LE_HEAP_STORE_I32(p * 4, v);\nx = LE_HEAP_LOAD_I32(q * 4);\n"
    );
}

#[test]
fn test_minify_globals_suffix_round_trips() {
    let source = "function instantiate(info) {\n  var ret = info.exports;\n  return ret;\n}\n";
    let out = run(source, &["minifyGlobals"]);
    let printed = out.printed.unwrap();
    let marker = printed
        .lines()
        .last()
        .expect("suffix line");
    assert!(marker.starts_with("// EXTRA_INFO:"));
    // the suffix parses back through the sidecar reader
    let (_, info) =
        glueopt_passes::extra_info::split_extra_info(&printed).expect("suffix json");
    assert!(info.is_some());
}

#[test]
fn test_unknown_pass_fails() {
    let options = Options {
        passes: vec!["notAPass".to_string()],
        ..Options::default()
    };
    assert!(process("var x;", &options).is_err());
}

#[test]
fn test_parse_error_reports_line_and_caret() {
    let options = Options::default();
    let err = process("var x = ;", &options).unwrap_err();
    let text = format!("{err}");
    assert!(text.contains("1:9"), "got: {text}");
    assert!(text.contains('^'), "got: {text}");
}

#[test]
fn test_module_mode_export() {
    let options = Options {
        passes: vec!["JSDCE".to_string()],
        export_es6: true,
        ..Options::default()
    };
    let out = process("export var keep = 1;", &options).expect("pipeline");
    assert_eq!(out.printed.unwrap(), "export var keep = 1;\n");
}

#[test]
fn test_minify_whitespace() {
    let options = Options {
        minify_whitespace: true,
        ..Options::default()
    };
    let out = process("var x = 1;\nif (x) f();\n", &options).expect("pipeline");
    assert_eq!(out.printed.unwrap(), "var x=1;if(x)f();\n");
}

#[test]
fn test_closure_friendly_keeps_comments() {
    let options = Options {
        closure_friendly: true,
        ..Options::default()
    };
    let out = process("// licence header\nf();\n", &options).expect("pipeline");
    assert_eq!(out.printed.unwrap(), "// licence header\nf();\n");
}

#[test]
fn test_ajsdce_fixed_point_end_to_end() {
    let out = run("var a = 1; var b = a; var c = b; keep();", &["AJSDCE"]);
    assert_eq!(out.printed.unwrap(), "keep();\n");
}

#[test]
fn test_sidecar_not_parsed_as_code() {
    // everything after the marker is sidecar, not program text
    let out = run("f();\n// EXTRA_INFO: {\"mapping\": {}}", &["JSDCE"]);
    let printed = out.printed.unwrap();
    assert_eq!(printed, "f();\n");
}
