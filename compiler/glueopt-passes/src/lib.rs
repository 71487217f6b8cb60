// SPDX-License-Identifier: PMPL-1.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell

//! The rewriting passes of the glueopt pipeline.
//!
//! Every pass has the same signature and is looked up by the exact name the
//! command line uses. Passes mutate the AST in place; a few also write JSON
//! to the driver's stdout sink ([`emitDCEGraph`](graph::emit_dce_graph),
//! [`dump`]) or produce an `// EXTRA_INFO:` suffix for the printed output
//! ([`minifyGlobals`](minify::minify_globals)).

pub mod extra_info;
pub mod graph;
pub mod heap;
pub mod jsdce;
pub mod minify;
pub mod name_changes;

use glueopt_ast::json::to_json;
use glueopt_ast::Ast;
use thiserror::Error;

use extra_info::ExtraInfo;
use minify::NameMinifier;

/// A registered pass.
pub type Pass = fn(&mut Ast, &mut PassContext) -> Result<(), PassError>;

/// A pass failure. All pass failures are fatal.
#[derive(Debug, Error)]
pub enum PassError {
    /// The pass needs the `// EXTRA_INFO:` sidecar and it was absent.
    #[error("pass `{0}` requires an // EXTRA_INFO: sidecar")]
    MissingExtraInfo(&'static str),

    /// The AST did not match a shape the pass relies on. The message names
    /// the violated rule.
    #[error("{rule}")]
    Shape { rule: String },

    /// A consistency requirement across the sidecar and the AST failed.
    #[error("{what}")]
    Consistency { what: String },

    /// The pipeline named a pass that does not exist.
    #[error("unknown pass: {0}")]
    UnknownPass(String),
}

impl PassError {
    pub(crate) fn shape(rule: impl Into<String>) -> Self {
        Self::Shape { rule: rule.into() }
    }
}

/// Shared state threaded through a pipeline run.
pub struct PassContext {
    /// The parsed sidecar, if the input carried one.
    pub extra_info: Option<ExtraInfo>,
    /// Trace notes to stderr.
    pub verbose: bool,
    /// Deterministic short-name generator, shared by the minification
    /// passes within this run.
    pub minifier: NameMinifier,
    /// Text appended after the printed program (set by `minifyGlobals`).
    pub suffix: Option<String>,
    /// Lines for the driver to write to stdout.
    pub out: Vec<String>,
}

impl PassContext {
    pub fn new(extra_info: Option<ExtraInfo>, verbose: bool) -> Self {
        Self {
            extra_info,
            verbose,
            minifier: NameMinifier::default(),
            suffix: None,
            out: Vec::new(),
        }
    }

    /// Emit a trace note when `--verbose` is set.
    pub fn trace(&self, message: &str) {
        if self.verbose {
            eprintln!("{message}");
        }
    }
}

impl Default for PassContext {
    fn default() -> Self {
        Self::new(None, false)
    }
}

/// Serialize the whole AST as ESTree-shaped JSON to the stdout sink.
pub fn dump(ast: &mut Ast, cx: &mut PassContext) -> Result<(), PassError> {
    let value = to_json(ast, ast.root);
    cx.out
        .push(serde_json::to_string_pretty(&value).unwrap_or_default());
    Ok(())
}

/// Look up a pass by its registered name.
pub fn lookup(name: &str) -> Result<Pass, PassError> {
    Ok(match name {
        "JSDCE" => jsdce::jsdce,
        "AJSDCE" => jsdce::ajsdce,
        "applyImportAndExportNameChanges" => name_changes::apply_import_and_export_name_changes,
        "emitDCEGraph" => graph::emit_dce_graph,
        "applyDCEGraphRemovals" => graph::apply_dce_graph_removals,
        "dump" => dump,
        "littleEndianHeap" => heap::little_endian_heap,
        "growableHeap" => heap::growable_heap,
        "unsignPointers" => heap::unsign_pointers,
        "minifyLocals" => minify::minify_locals,
        "asanify" => heap::asanify,
        "safeHeap" => heap::safe_heap,
        "minifyGlobals" => minify::minify_globals,
        other => return Err(PassError::UnknownPass(other.to_string())),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_registered_names_resolve() {
        for name in [
            "JSDCE",
            "AJSDCE",
            "applyImportAndExportNameChanges",
            "emitDCEGraph",
            "applyDCEGraphRemovals",
            "dump",
            "littleEndianHeap",
            "growableHeap",
            "unsignPointers",
            "minifyLocals",
            "asanify",
            "safeHeap",
            "minifyGlobals",
        ] {
            assert!(lookup(name).is_ok(), "{name} should be registered");
        }
    }

    #[test]
    fn test_unknown_pass_is_fatal() {
        assert!(matches!(
            lookup("JSDCe"),
            Err(PassError::UnknownPass(name)) if name == "JSDCe"
        ));
    }
}
