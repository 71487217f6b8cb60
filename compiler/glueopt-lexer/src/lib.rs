// SPDX-License-Identifier: PMPL-1.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell

//! Lexer for the ECMAScript subset emitted by the wasm toolchain.
//!
//! Tokenization is eager: [`tokenize`] produces the whole token vector up
//! front, which is what lets the parser do arbitrary lookahead (arrow
//! parameter lists) cheaply. Two spots of JavaScript lexing are context
//! sensitive and handled outside the `logos` table:
//!
//! - regex literals vs division, decided from the previous significant token
//! - template literals, rescanned by hand so `${ ... }` substitutions can
//!   nest arbitrary token runs (brace depth is tracked per open substitution)
//!
//! Comments are captured (text + span) rather than skipped, so the printer
//! can reattach them; they never appear in the token vector itself.

use glueopt_ast::span::Span;
use glueopt_ast::Comment;
use logos::Logos;
use smol_str::SmolStr;

/// A token with its span and whether a line terminator precedes it.
#[derive(Debug, Clone)]
pub struct Token {
    /// The kind of this token.
    pub kind: TokenKind,
    /// The source span of this token.
    pub span: Span,
    /// A line terminator (or a multi-line comment) separates this token from
    /// the previous one. Drives automatic semicolon insertion.
    pub newline_before: bool,
}

/// Token kinds produced by the lexer.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n\f\u{FEFF}]+")]
pub enum TokenKind {
    // === Keywords ===
    /// The `var` keyword.
    #[token("var")]
    Var,
    /// The `let` keyword.
    #[token("let")]
    Let,
    /// The `const` keyword.
    #[token("const")]
    Const,
    /// The `function` keyword.
    #[token("function")]
    Function,
    /// The `return` keyword.
    #[token("return")]
    Return,
    /// The `if` keyword.
    #[token("if")]
    If,
    /// The `else` keyword.
    #[token("else")]
    Else,
    /// The `for` keyword.
    #[token("for")]
    For,
    /// The `while` keyword.
    #[token("while")]
    While,
    /// The `do` keyword.
    #[token("do")]
    Do,
    /// The `break` keyword.
    #[token("break")]
    Break,
    /// The `continue` keyword.
    #[token("continue")]
    Continue,
    /// The `new` keyword.
    #[token("new")]
    New,
    /// The `typeof` operator keyword.
    #[token("typeof")]
    Typeof,
    /// The `void` operator keyword.
    #[token("void")]
    Void,
    /// The `delete` operator keyword.
    #[token("delete")]
    Delete,
    /// The `in` operator keyword.
    #[token("in")]
    In,
    /// The `instanceof` operator keyword.
    #[token("instanceof")]
    Instanceof,
    /// The `this` keyword.
    #[token("this")]
    This,
    /// The `null` literal keyword.
    #[token("null")]
    Null,
    /// The `true` literal keyword.
    #[token("true")]
    True,
    /// The `false` literal keyword.
    #[token("false")]
    False,
    /// The `switch` keyword.
    #[token("switch")]
    Switch,
    /// The `case` keyword.
    #[token("case")]
    Case,
    /// The `default` keyword.
    #[token("default")]
    Default,
    /// The `throw` keyword.
    #[token("throw")]
    Throw,
    /// The `try` keyword.
    #[token("try")]
    Try,
    /// The `catch` keyword.
    #[token("catch")]
    Catch,
    /// The `finally` keyword.
    #[token("finally")]
    Finally,
    /// The `export` keyword.
    #[token("export")]
    Export,
    /// The `import` keyword.
    #[token("import")]
    Import,
    /// The `await` keyword. Accepted everywhere, including top level.
    #[token("await")]
    Await,

    // === Literals and identifiers ===
    /// An identifier. Contextual keywords (`of`, `async`, `get`, `set`,
    /// `from`, `as`) stay identifiers; the parser checks their names.
    #[regex(r"[a-zA-Z_$][a-zA-Z0-9_$]*", |lex| SmolStr::new(lex.slice()))]
    Ident(SmolStr),

    /// Decimal numeric literal.
    #[regex(r"[0-9]+(\.[0-9]*)?([eE][+-]?[0-9]+)?", |lex| parse_decimal(lex.slice()))]
    #[regex(r"\.[0-9]+([eE][+-]?[0-9]+)?", |lex| parse_decimal(lex.slice()))]
    #[regex(r"0[xX][0-9a-fA-F]+", |lex| parse_radix(lex.slice(), 16))]
    #[regex(r"0[oO][0-7]+", |lex| parse_radix(lex.slice(), 8))]
    #[regex(r"0[bB][01]+", |lex| parse_radix(lex.slice(), 2))]
    Number(f64),

    /// String literal; payload is the cooked value, the raw spelling is the
    /// source slice of the span.
    #[regex(r#""([^"\\]|\\(.|\n))*""#, |lex| cook_string(lex.slice()))]
    #[regex(r#"'([^'\\]|\\(.|\n))*'"#, |lex| cook_string(lex.slice()))]
    Str(SmolStr),

    /// Regex literal, produced by rescanning a `/` in regex position.
    /// Payload: (the pattern between the slashes, the trailing flags).
    Regex((SmolStr, SmolStr)),

    /// Template literal with no substitutions. Payload: (cooked, raw).
    TemplateFull((SmolStr, SmolStr)),
    /// Opening template part, ends with `${`. Payload: (cooked, raw).
    TemplateHead((SmolStr, SmolStr)),
    /// Middle template part between substitutions. Payload: (cooked, raw).
    TemplateMiddle((SmolStr, SmolStr)),
    /// Closing template part, ends with a backtick. Payload: (cooked, raw).
    TemplateTail((SmolStr, SmolStr)),

    // === Comments (captured, never emitted as tokens) ===
    /// `// ...`
    #[regex(r"//[^\n]*", |lex| SmolStr::new(&lex.slice()[2..]))]
    LineComment(SmolStr),
    /// `/* ... */`
    #[regex(r"/\*([^*]|\*+[^*/])*\*+/", |lex| {
        let s = lex.slice();
        SmolStr::new(&s[2..s.len() - 2])
    })]
    BlockComment(SmolStr),

    // === Operators and punctuation ===
    #[token(">>>=")]
    UShrEq,
    #[token(">>>")]
    UShr,
    #[token(">>=")]
    ShrEq,
    #[token(">>")]
    Shr,
    #[token(">=")]
    Ge,
    #[token(">")]
    Gt,
    #[token("<<=")]
    ShlEq,
    #[token("<<")]
    Shl,
    #[token("<=")]
    Le,
    #[token("<")]
    Lt,
    #[token("===")]
    StrictEq,
    #[token("==")]
    EqEq,
    #[token("=>")]
    Arrow,
    #[token("=")]
    Eq,
    #[token("!==")]
    StrictNotEq,
    #[token("!=")]
    NotEq,
    #[token("!")]
    Bang,
    #[token("&&=")]
    AmpAmpEq,
    #[token("&&")]
    AmpAmp,
    #[token("&=")]
    AmpEq,
    #[token("&")]
    Amp,
    #[token("||=")]
    PipePipeEq,
    #[token("||")]
    PipePipe,
    #[token("|=")]
    PipeEq,
    #[token("|")]
    Pipe,
    #[token("??=")]
    QuestionQuestionEq,
    #[token("??")]
    QuestionQuestion,
    #[token("?")]
    Question,
    #[token("++")]
    PlusPlus,
    #[token("+=")]
    PlusEq,
    #[token("+")]
    Plus,
    #[token("--")]
    MinusMinus,
    #[token("-=")]
    MinusEq,
    #[token("-")]
    Minus,
    #[token("**=")]
    StarStarEq,
    #[token("**")]
    StarStar,
    #[token("*=")]
    StarEq,
    #[token("*")]
    Star,
    #[token("/=")]
    SlashEq,
    #[token("/")]
    Slash,
    #[token("%=")]
    PercentEq,
    #[token("%")]
    Percent,
    #[token("^=")]
    CaretEq,
    #[token("^")]
    Caret,
    #[token("~")]
    Tilde,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token(";")]
    Semi,
    #[token(",")]
    Comma,
    #[token("...")]
    DotDotDot,
    #[token(".")]
    Dot,
    #[token(":")]
    Colon,
    #[token("`")]
    Backtick,

    // === Special ===
    /// End of file.
    Eof,
    /// Unrecognized input.
    Error,
}

impl TokenKind {
    /// A short printable name for diagnostics.
    pub fn describe(&self) -> String {
        match self {
            TokenKind::Ident(name) => format!("identifier `{name}`"),
            TokenKind::Number(n) => format!("number `{n}`"),
            TokenKind::Str(_) => "string literal".to_string(),
            TokenKind::Regex(..) => "regex literal".to_string(),
            TokenKind::TemplateFull(..)
            | TokenKind::TemplateHead(..)
            | TokenKind::TemplateMiddle(..)
            | TokenKind::TemplateTail(..) => "template literal".to_string(),
            TokenKind::Eof => "end of input".to_string(),
            other => format!("{other:?}"),
        }
    }
}

/// Parses a decimal literal slice.
fn parse_decimal(s: &str) -> f64 {
    s.parse().unwrap_or_else(|_| {
        // `1.e3` style spellings
        let cleaned = s.replacen(".e", "e", 1).replacen(".E", "E", 1);
        cleaned.parse().unwrap_or(0.0)
    })
}

/// Parses a `0x`/`0o`/`0b` literal slice.
fn parse_radix(s: &str, radix: u32) -> f64 {
    u64::from_str_radix(&s[2..], radix).map(|v| v as f64).unwrap_or(0.0)
}

/// Processes escape sequences in a quoted string slice (quotes included).
fn cook_string(s: &str) -> SmolStr {
    cook_text(&s[1..s.len() - 1])
}

/// Processes escape sequences in raw string or template text.
fn cook_text(inner: &str) -> SmolStr {
    let mut result = String::with_capacity(inner.len());
    let mut chars = inner.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => result.push('\n'),
            Some('r') => result.push('\r'),
            Some('t') => result.push('\t'),
            Some('b') => result.push('\u{8}'),
            Some('f') => result.push('\u{c}'),
            Some('v') => result.push('\u{b}'),
            Some('0') => result.push('\0'),
            Some('\n') => {} // line continuation
            Some('\r') => {
                // line continuation, CRLF form
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
            }
            Some('x') => {
                let mut hex = String::new();
                for _ in 0..2 {
                    if let Some(&c) = chars.peek() {
                        if c.is_ascii_hexdigit() {
                            hex.push(c);
                            chars.next();
                        }
                    }
                }
                if let Some(ch) = u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    result.push(ch);
                }
            }
            Some('u') => {
                let mut hex = String::new();
                if chars.peek() == Some(&'{') {
                    chars.next();
                    while let Some(&c) = chars.peek() {
                        if c == '}' {
                            chars.next();
                            break;
                        }
                        if c.is_ascii_hexdigit() {
                            hex.push(c);
                            chars.next();
                        } else {
                            break;
                        }
                    }
                } else {
                    for _ in 0..4 {
                        if let Some(&c) = chars.peek() {
                            if c.is_ascii_hexdigit() {
                                hex.push(c);
                                chars.next();
                            }
                        }
                    }
                }
                if let Some(ch) = u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    result.push(ch);
                }
            }
            Some(c) => result.push(c),
            None => break,
        }
    }

    SmolStr::new(&result)
}

/// `/` after one of these tokens is division; anywhere else it starts a
/// regex literal. The standard previous-significant-token heuristic.
fn regex_allowed(prev: Option<&TokenKind>) -> bool {
    match prev {
        None => true,
        Some(kind) => !matches!(
            kind,
            TokenKind::Ident(_)
                | TokenKind::Number(_)
                | TokenKind::Str(_)
                | TokenKind::Regex(..)
                | TokenKind::TemplateFull(..)
                | TokenKind::TemplateTail(..)
                | TokenKind::RParen
                | TokenKind::RBracket
                | TokenKind::RBrace
                | TokenKind::PlusPlus
                | TokenKind::MinusMinus
                | TokenKind::This
                | TokenKind::Null
                | TokenKind::True
                | TokenKind::False
        ),
    }
}

/// Scan a regex literal body starting at the opening `/`.
///
/// Returns `(pattern, flags, end)` or `None` if unterminated.
fn scan_regex(source: &str, start: usize) -> Option<(SmolStr, SmolStr, usize)> {
    let rest = &source[start + 1..];
    let mut iter = rest.char_indices();
    let mut in_class = false;
    let mut pattern_end = None;
    while let Some((i, c)) = iter.next() {
        match c {
            '\\' => {
                iter.next();
            }
            '[' => in_class = true,
            ']' => in_class = false,
            '/' if !in_class => {
                pattern_end = Some(i);
                break;
            }
            '\n' => return None,
            _ => {}
        }
    }
    let pattern_end = pattern_end?;
    let pattern = SmolStr::new(&rest[..pattern_end]);
    let mut flags_end = pattern_end + 1;
    for c in rest[pattern_end + 1..].chars() {
        if c.is_ascii_alphabetic() {
            flags_end += 1;
        } else {
            break;
        }
    }
    let flags = SmolStr::new(&rest[pattern_end + 1..flags_end]);
    Some((pattern, flags, start + 1 + flags_end))
}

/// One scanned template part.
enum TemplatePart {
    /// Ends with `` ` ``.
    Closed { cooked: SmolStr, raw: SmolStr, end: usize },
    /// Ends with `${`; a substitution follows.
    Substitution { cooked: SmolStr, raw: SmolStr, end: usize },
    Unterminated,
}

/// Scan a template part beginning right after `` ` `` or a substitution's `}`.
fn scan_template_part(source: &str, start: usize) -> TemplatePart {
    let rest = &source[start..];
    let mut iter = rest.char_indices().peekable();
    while let Some((i, c)) = iter.next() {
        match c {
            '\\' => {
                iter.next();
            }
            '`' => {
                let raw = &rest[..i];
                return TemplatePart::Closed {
                    cooked: cook_text(raw),
                    raw: SmolStr::new(raw),
                    end: start + i + 1,
                };
            }
            '$' => {
                if matches!(iter.peek(), Some((_, '{'))) {
                    let raw = &rest[..i];
                    return TemplatePart::Substitution {
                        cooked: cook_text(raw),
                        raw: SmolStr::new(raw),
                        end: start + i + 2,
                    };
                }
            }
            _ => {}
        }
    }
    TemplatePart::Unterminated
}

/// Tokenize a complete source string.
///
/// Returns the token vector (terminated by an `Eof` token) and the captured
/// comments in source order.
pub fn tokenize(source: &str) -> (Vec<Token>, Vec<Comment>) {
    let mut tokens: Vec<Token> = Vec::new();
    let mut comments: Vec<Comment> = Vec::new();
    // brace depth of each open template substitution, innermost last
    let mut subst_depths: Vec<u32> = Vec::new();
    let mut last_end = 0usize;
    let mut pending_newline = false;
    let mut pos = 0usize;

    'outer: loop {
        let mut lex = TokenKind::lexer(&source[pos..]);
        while let Some(res) = lex.next() {
            let raw_span = lex.span();
            let start = pos + raw_span.start;
            let end = pos + raw_span.end;
            let span = Span::new(start as u32, end as u32);
            let kind = match res {
                Ok(kind) => kind,
                Err(()) => TokenKind::Error,
            };

            let kind = match kind {
                TokenKind::LineComment(text) => {
                    comments.push(Comment {
                        text,
                        span,
                        block: false,
                    });
                    continue;
                }
                TokenKind::BlockComment(text) => {
                    if text.contains('\n') {
                        pending_newline = true;
                    }
                    comments.push(Comment {
                        text,
                        span,
                        block: true,
                    });
                    continue;
                }
                TokenKind::Slash | TokenKind::SlashEq
                    if regex_allowed(tokens.last().map(|t| &t.kind)) =>
                {
                    let Some((pattern, flags, regex_end)) = scan_regex(source, start) else {
                        push_token(
                            &mut tokens,
                            TokenKind::Error,
                            span,
                            source,
                            &mut last_end,
                            &mut pending_newline,
                        );
                        break 'outer;
                    };
                    push_token(
                        &mut tokens,
                        TokenKind::Regex((pattern, flags)),
                        Span::new(start as u32, regex_end as u32),
                        source,
                        &mut last_end,
                        &mut pending_newline,
                    );
                    pos = regex_end;
                    continue 'outer;
                }
                TokenKind::Backtick => {
                    match scan_template_part(source, end) {
                        TemplatePart::Closed { cooked, raw, end: t_end } => {
                            push_token(
                                &mut tokens,
                                TokenKind::TemplateFull((cooked, raw)),
                                Span::new(start as u32, t_end as u32),
                                source,
                                &mut last_end,
                                &mut pending_newline,
                            );
                            pos = t_end;
                        }
                        TemplatePart::Substitution { cooked, raw, end: t_end } => {
                            push_token(
                                &mut tokens,
                                TokenKind::TemplateHead((cooked, raw)),
                                Span::new(start as u32, t_end as u32),
                                source,
                                &mut last_end,
                                &mut pending_newline,
                            );
                            subst_depths.push(0);
                            pos = t_end;
                        }
                        TemplatePart::Unterminated => {
                            push_token(
                                &mut tokens,
                                TokenKind::Error,
                                span,
                                source,
                                &mut last_end,
                                &mut pending_newline,
                            );
                            break 'outer;
                        }
                    }
                    continue 'outer;
                }
                TokenKind::LBrace => {
                    if let Some(depth) = subst_depths.last_mut() {
                        *depth += 1;
                    }
                    TokenKind::LBrace
                }
                TokenKind::RBrace => {
                    let closes_substitution = matches!(subst_depths.last(), Some(0));
                    if closes_substitution {
                        subst_depths.pop();
                        match scan_template_part(source, end) {
                            TemplatePart::Closed { cooked, raw, end: t_end } => {
                                push_token(
                                    &mut tokens,
                                    TokenKind::TemplateTail((cooked, raw)),
                                    Span::new(start as u32, t_end as u32),
                                    source,
                                    &mut last_end,
                                    &mut pending_newline,
                                );
                                pos = t_end;
                            }
                            TemplatePart::Substitution { cooked, raw, end: t_end } => {
                                push_token(
                                    &mut tokens,
                                    TokenKind::TemplateMiddle((cooked, raw)),
                                    Span::new(start as u32, t_end as u32),
                                    source,
                                    &mut last_end,
                                    &mut pending_newline,
                                );
                                subst_depths.push(0);
                                pos = t_end;
                            }
                            TemplatePart::Unterminated => {
                                push_token(
                                    &mut tokens,
                                    TokenKind::Error,
                                    span,
                                    source,
                                    &mut last_end,
                                    &mut pending_newline,
                                );
                                break 'outer;
                            }
                        }
                        continue 'outer;
                    }
                    if let Some(depth) = subst_depths.last_mut() {
                        *depth -= 1;
                    }
                    TokenKind::RBrace
                }
                other => other,
            };

            push_token(&mut tokens, kind, span, source, &mut last_end, &mut pending_newline);
        }
        break;
    }

    let eof_at = source.len() as u32;
    tokens.push(Token {
        kind: TokenKind::Eof,
        span: Span::empty(eof_at),
        newline_before: false,
    });
    (tokens, comments)
}

fn push_token(
    tokens: &mut Vec<Token>,
    kind: TokenKind,
    span: Span,
    source: &str,
    last_end: &mut usize,
    pending_newline: &mut bool,
) {
    let gap = &source[*last_end..span.start as usize];
    let newline_before = *pending_newline || gap.contains('\n');
    *pending_newline = false;
    *last_end = span.end as usize;
    tokens.push(Token {
        kind,
        span,
        newline_before,
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source).0.into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_keywords_and_idents() {
        let toks = kinds("var x = function f() {}");
        assert!(matches!(toks[0], TokenKind::Var));
        assert!(matches!(&toks[1], TokenKind::Ident(n) if n == "x"));
        assert!(matches!(toks[2], TokenKind::Eq));
        assert!(matches!(toks[3], TokenKind::Function));
        assert!(matches!(&toks[4], TokenKind::Ident(n) if n == "f"));
    }

    #[test]
    fn test_contextual_keywords_stay_idents() {
        let toks = kinds("of async get set from as");
        for tok in &toks[..6] {
            assert!(matches!(tok, TokenKind::Ident(_)), "got {tok:?}");
        }
    }

    #[test]
    fn test_numbers() {
        let toks = kinds("1 2.5 .5 1e3 0xFF 0o77 0b101");
        assert!(matches!(toks[0], TokenKind::Number(n) if n == 1.0));
        assert!(matches!(toks[1], TokenKind::Number(n) if n == 2.5));
        assert!(matches!(toks[2], TokenKind::Number(n) if n == 0.5));
        assert!(matches!(toks[3], TokenKind::Number(n) if n == 1000.0));
        assert!(matches!(toks[4], TokenKind::Number(n) if n == 255.0));
        assert!(matches!(toks[5], TokenKind::Number(n) if n == 63.0));
        assert!(matches!(toks[6], TokenKind::Number(n) if n == 5.0));
    }

    #[test]
    fn test_string_escapes() {
        let toks = kinds(r#"'a\nb' "q\x41" "A""#);
        assert!(matches!(&toks[0], TokenKind::Str(s) if s == "a\nb"));
        assert!(matches!(&toks[1], TokenKind::Str(s) if s == "qA"));
        assert!(matches!(&toks[2], TokenKind::Str(s) if s == "A"));
    }

    #[test]
    fn test_operators_longest_match() {
        let toks = kinds("a >>> b >>>= c >> d >= e");
        assert!(matches!(toks[1], TokenKind::UShr));
        assert!(matches!(toks[3], TokenKind::UShrEq));
        assert!(matches!(toks[5], TokenKind::Shr));
        assert!(matches!(toks[7], TokenKind::Ge));
    }

    #[test]
    fn test_regex_vs_division() {
        let toks = kinds("x = /ab[/]c/g; y = a / b;");
        assert!(
            matches!(&toks[2], TokenKind::Regex((pattern, flags))
                if pattern == "ab[/]c" && flags == "g"),
            "got {:?}",
            toks[2]
        );
        // `a / b` is division
        assert!(matches!(toks[7], TokenKind::Slash));
    }

    #[test]
    fn test_regex_after_paren_is_division() {
        let toks = kinds("(a) / b");
        assert!(matches!(toks[3], TokenKind::Slash));
    }

    #[test]
    fn test_template_without_substitution() {
        let toks = kinds("`hello`");
        assert!(
            matches!(&toks[0], TokenKind::TemplateFull((cooked, ..)) if cooked == "hello")
        );
    }

    #[test]
    fn test_template_with_substitutions() {
        let toks = kinds("`a${b}c${d}e`");
        assert!(matches!(&toks[0], TokenKind::TemplateHead((cooked, ..)) if cooked == "a"));
        assert!(matches!(&toks[1], TokenKind::Ident(n) if n == "b"));
        assert!(matches!(&toks[2], TokenKind::TemplateMiddle((cooked, ..)) if cooked == "c"));
        assert!(matches!(&toks[3], TokenKind::Ident(n) if n == "d"));
        assert!(matches!(&toks[4], TokenKind::TemplateTail((cooked, ..)) if cooked == "e"));
    }

    #[test]
    fn test_template_substitution_with_object_literal() {
        let toks = kinds("`v${ {a: 1} }w`");
        assert!(matches!(&toks[0], TokenKind::TemplateHead(..)));
        assert!(matches!(toks[1], TokenKind::LBrace));
        // ... object tokens ...
        let tail = toks
            .iter()
            .find(|t| matches!(t, TokenKind::TemplateTail(..)));
        assert!(tail.is_some(), "tail missing in {toks:?}");
    }

    #[test]
    fn test_comments_captured_not_emitted() {
        let (tokens, comments) = tokenize("a // trailing\n/* block */ b");
        assert_eq!(comments.len(), 2);
        assert_eq!(comments[0].text, " trailing");
        assert!(comments[1].block);
        assert!(matches!(&tokens[0].kind, TokenKind::Ident(n) if n == "a"));
        assert!(matches!(&tokens[1].kind, TokenKind::Ident(n) if n == "b"));
    }

    #[test]
    fn test_newline_before_flag() {
        let (tokens, _) = tokenize("a\nb c");
        assert!(!tokens[0].newline_before);
        assert!(tokens[1].newline_before);
        assert!(!tokens[2].newline_before);
    }

    #[test]
    fn test_multiline_block_comment_counts_as_newline() {
        let (tokens, _) = tokenize("a /* x\ny */ b");
        assert!(tokens[1].newline_before);
    }
}
