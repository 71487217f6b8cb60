// SPDX-License-Identifier: PMPL-1.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell

//! JavaScript printer for the glueopt AST.
//!
//! Two modes: beautified (2-space indent, one statement per line) and
//! whitespace-minified. Parentheses are regenerated from operator
//! precedence, so passes never have to track them. Output always ends with a
//! single newline.

mod printer;

use glueopt_ast::Ast;
pub use printer::Printer;

/// Printer configuration.
#[derive(Debug, Clone)]
pub struct FormatConfig {
    /// Emit whitespace-minified output instead of beautified.
    pub minify: bool,
    /// Reattach captured comments ahead of the statements that follow them.
    pub comments: bool,
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            minify: false,
            comments: false,
        }
    }
}

/// Printer output.
#[derive(Debug)]
pub struct Printed {
    /// The emitted program text, newline terminated.
    pub output: String,
    /// Comments that could not be placed (always zero when comment
    /// reattachment is off — they were never requested).
    pub dropped_comments: usize,
}

/// Print a whole program.
pub fn print(ast: &Ast, config: &FormatConfig) -> Printed {
    let mut printer = Printer::new(ast, config);
    printer.print_program();
    printer.finish()
}
