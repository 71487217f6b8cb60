// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell

//! Parser error types.

use glueopt_ast::span::Span;
use glueopt_lexer::Token;
use thiserror::Error;

/// Result type for parsing operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// A parsing error. All parse errors are fatal.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("unexpected {found}, expected {expected}")]
    UnexpectedToken {
        span: Span,
        found: String,
        expected: String,
    },

    #[error("unexpected end of input")]
    UnexpectedEof { span: Span },

    #[error("{message}")]
    Unsupported { span: Span, message: String },
}

impl ParseError {
    /// Create an unexpected token error.
    pub fn unexpected(token: &Token, expected: &str) -> Self {
        if matches!(token.kind, glueopt_lexer::TokenKind::Eof) {
            return Self::UnexpectedEof { span: token.span };
        }
        Self::UnexpectedToken {
            span: token.span,
            found: token.kind.describe(),
            expected: expected.to_string(),
        }
    }

    /// Create an error for syntax outside the supported subset.
    pub fn unsupported(span: Span, message: impl Into<String>) -> Self {
        Self::Unsupported {
            span,
            message: message.into(),
        }
    }

    /// Get the span of this error.
    pub fn span(&self) -> Span {
        match self {
            Self::UnexpectedToken { span, .. } => *span,
            Self::UnexpectedEof { span } => *span,
            Self::Unsupported { span, .. } => *span,
        }
    }

    /// Format this error as a diagnostic block with the offending source
    /// line and a caret under the error position.
    pub fn format_with_source(&self, source: &str) -> String {
        let span = self.span();
        let lc = span.start_linecol(source);
        let line_text = source.lines().nth(lc.line as usize - 1).unwrap_or("");

        let mut output = String::new();
        output.push_str(&format!("parse error at {}:{}: {}\n", lc.line, lc.col, self));
        output.push_str(&format!("  {} | {}\n", lc.line, line_text));
        let indent = format!("  {} | ", lc.line).len() + lc.col as usize - 1;
        output.push_str(&format!("{}^\n", " ".repeat(indent)));
        output
    }
}
