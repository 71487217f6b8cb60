// SPDX-License-Identifier: PMPL-1.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell

//! The glueopt pipeline driver.
//!
//! Data flows linearly: source text → parsed AST plus the optional trailing
//! `// EXTRA_INFO:` sidecar → the named passes, in order → the printer.
//! Everything is synchronous and in memory; the only externalized effects
//! are the stdout/outfile writes the binary performs afterwards.

use glueopt_fmt::FormatConfig;
use glueopt_parser::parse;
use glueopt_passes::extra_info::split_extra_info;
use glueopt_passes::{lookup, PassContext};
use miette::miette;

/// Pipeline options, mirroring the command-line surface.
#[derive(Debug, Default, Clone)]
pub struct Options {
    /// Pass names, applied in order.
    pub passes: Vec<String>,
    /// Keep comments attached through the printer.
    pub closure_friendly: bool,
    /// Parse the input as an ES module.
    pub export_es6: bool,
    /// Trace notes to stderr.
    pub verbose: bool,
    /// Skip re-emission (used when a pass writes JSON to stdout).
    pub no_print: bool,
    /// Emit whitespace-minified output.
    pub minify_whitespace: bool,
}

/// The results of one pipeline run.
#[derive(Debug)]
pub struct RunOutput {
    /// The re-emitted program, unless `no_print` was set. Ends with a
    /// newline and carries the `// EXTRA_INFO:` suffix when a pass
    /// produced one.
    pub printed: Option<String>,
    /// JSON blocks passes wrote for stdout.
    pub stdout: Vec<String>,
}

/// Run the whole pipeline over one source text.
pub fn process(source: &str, options: &Options) -> miette::Result<RunOutput> {
    let (code, extra_info) = split_extra_info(source)
        .map_err(|e| miette!("failed to parse // EXTRA_INFO: sidecar: {e}"))?;

    let mut ast = parse(code, options.export_es6)
        .map_err(|e| miette!("{}", e.format_with_source(code)))?;

    let mut cx = PassContext::new(extra_info, options.verbose);
    for name in &options.passes {
        let pass = lookup(name).map_err(|e| miette!("{e}"))?;
        pass(&mut ast, &mut cx).map_err(|e| miette!("{name}: {e}"))?;
    }

    let printed = if options.no_print {
        None
    } else {
        let config = FormatConfig {
            minify: options.minify_whitespace,
            comments: options.closure_friendly,
        };
        let result = glueopt_fmt::print(&ast, &config);
        if options.closure_friendly && result.dropped_comments > 0 {
            cx.trace(&format!(
                "{} comments could not be reattached",
                result.dropped_comments
            ));
        }
        let mut text = result.output;
        if let Some(suffix) = &cx.suffix {
            text.push_str(suffix);
            text.push('\n');
        }
        Some(text)
    };

    Ok(RunOutput {
        printed,
        stdout: cx.out,
    })
}
