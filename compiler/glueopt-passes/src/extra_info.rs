// SPDX-License-Identifier: PMPL-1.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell

//! The `// EXTRA_INFO:` sidecar model.
//!
//! Everything after the last occurrence of the marker in the input file is
//! parsed as one JSON object. Which fields a pass reads is up to the pass;
//! unknown fields are ignored.

use rustc_hash::FxHashMap;
use serde::Deserialize;

/// Marker introducing the sidecar in the input text.
pub const EXTRA_INFO_MARKER: &str = "// EXTRA_INFO:";

/// Parsed sidecar contents.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ExtraInfo {
    /// Old name to new name, for `applyImportAndExportNameChanges`.
    pub mapping: FxHashMap<String, String>,

    /// Extra `[jsName, wasmName]` exports injected into `emitDCEGraph`.
    pub exports: Vec<(String, String)>,

    /// Native import names to drop, for `applyDCEGraphRemovals`.
    #[serde(rename = "unusedImports")]
    pub unused_imports: Vec<String>,

    /// Wasm export names to drop, for `applyDCEGraphRemovals`.
    #[serde(rename = "unusedExports")]
    pub unused_exports: Vec<String>,

    /// Global names: a mapping for `minifyLocals`, a plain list for
    /// `minifyGlobals`.
    pub globals: Option<Globals>,
}

/// The two shapes the `globals` field takes.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Globals {
    /// `{name: minified}`
    Map(FxHashMap<String, String>),
    /// `[name, ...]`
    List(Vec<String>),
}

/// Split source text into the program and its parsed sidecar.
///
/// The sidecar begins after the **last** occurrence of the marker.
pub fn split_extra_info(text: &str) -> Result<(&str, Option<ExtraInfo>), serde_json::Error> {
    match text.rfind(EXTRA_INFO_MARKER) {
        Some(at) => {
            let json = &text[at + EXTRA_INFO_MARKER.len()..];
            let info = serde_json::from_str(json)?;
            Ok((&text[..at], Some(info)))
        }
        None => Ok((text, None)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_sidecar() {
        let (code, info) = split_extra_info("var x = 1;\n").unwrap();
        assert_eq!(code, "var x = 1;\n");
        assert!(info.is_none());
    }

    #[test]
    fn test_sidecar_split_and_parse() {
        let text = "var x = 1;\n// EXTRA_INFO: {\"unusedImports\": [\"a\"], \"mapping\": {\"f\": \"g\"}}";
        let (code, info) = split_extra_info(text).unwrap();
        assert_eq!(code, "var x = 1;\n");
        let info = info.unwrap();
        assert_eq!(info.unused_imports, vec!["a"]);
        assert_eq!(info.mapping.get("f").map(String::as_str), Some("g"));
    }

    #[test]
    fn test_last_marker_wins() {
        let text = "// EXTRA_INFO: not this one\nvar x;\n// EXTRA_INFO: {\"exports\": [[\"_a\", \"a\"]]}";
        let (code, info) = split_extra_info(text).unwrap();
        assert!(code.contains("var x"));
        assert_eq!(info.unwrap().exports, vec![("_a".to_string(), "a".to_string())]);
    }

    #[test]
    fn test_globals_both_shapes() {
        let (_, info) =
            split_extra_info("x\n// EXTRA_INFO: {\"globals\": {\"a\": \"b\"}}").unwrap();
        assert!(matches!(info.unwrap().globals, Some(Globals::Map(_))));
        let (_, info) =
            split_extra_info("x\n// EXTRA_INFO: {\"globals\": [\"a\", \"b\"]}").unwrap();
        assert!(matches!(info.unwrap().globals, Some(Globals::List(_))));
    }

    #[test]
    fn test_bad_json_is_an_error() {
        assert!(split_extra_info("x\n// EXTRA_INFO: {nope").is_err());
    }
}
