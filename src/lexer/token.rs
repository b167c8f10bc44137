/*
 * ==========================================================================
 * RECSPL - Table-Driven Compiler Front End
 * ==========================================================================
 *
 * Author:   Sam Wilcox
 *
 * License:
 * This file is part of the RECSPL compiler front end project.
 *
 * RECSPL is dual-licensed under the terms of:
 *   - The MIT license
 *   - The Apache License, Version 2.0
 *
 * You may choose either license to govern your use of this software.
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under these licenses is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 *
 * ==========================================================================
 */

use crate::error::CompileError;
use crate::span::Span;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Represents the **category of a lexical token** in RecSPL.
///
/// Every terminal of the RecSPL grammar has its own kind. Reserved words and
/// punctuation are *literal* kinds: the token's lexeme is always the same
/// fixed text. The four *lexical classes* (`VName`, `FName`, `Number`,
/// `String`) carry user-chosen text instead.
///
/// # Compiler Pipeline Role
/// ```text
/// Source Code → Lexer → TokenKind → Shift-Reduce Engine → Parse Tree
/// ```
///
/// The engine never matches on a `TokenKind` directly. It first maps the
/// token to a grammar terminal (see `parser::engine::lookup_symbol`), which
/// is what the ACTION table is keyed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TokenKind {
    /* ----------------------------- */
    /* PROGRAM STRUCTURE             */
    /* ----------------------------- */
    Main,
    Begin,
    End,

    /* ----------------------------- */
    /* COMMANDS                      */
    /* ----------------------------- */
    If,
    Then,
    Else,
    Skip,
    Halt,
    Print,
    Return,
    Input,

    /* ----------------------------- */
    /* TYPES                         */
    /* ----------------------------- */
    Num,
    Text,
    Void,

    /* ----------------------------- */
    /* OPERATORS                     */
    /* ----------------------------- */
    Not,
    Sqrt,
    Or,
    And,
    Eq,
    Grt,
    Add,
    Sub,
    Mul,
    Div,

    /* ----------------------------- */
    /* PUNCTUATION                   */
    /* ----------------------------- */
    LParen,
    RParen,
    Comma,
    Semicolon,
    LBrace,
    RBrace,
    /// `=`
    Assign,
    /// `<` as used in `V_x < input`
    InputOp,

    /* ----------------------------- */
    /* LEXICAL CLASSES               */
    /* ----------------------------- */
    /// `V_[a-z]([a-z]|[0-9])*`
    VName,
    /// `F_[a-z]([a-z]|[0-9])*`
    FName,
    /// `-?[0-9]+(\.[0-9]+)?`
    Number,
    /// `"[A-Z][a-z]{0,7}"`
    String,

    /// End-of-input marker.
    ///
    /// Always the **final token** of a sequence and never appears anywhere
    /// else.
    Eof,
}

impl TokenKind {
    /// The fixed source text of a literal kind.
    ///
    /// Returns `None` for the lexical classes and for `Eof`, whose lexemes
    /// are not fixed.
    pub fn literal(&self) -> Option<&'static str> {
        let text = match self {
            TokenKind::Main => "main",
            TokenKind::Begin => "begin",
            TokenKind::End => "end",
            TokenKind::If => "if",
            TokenKind::Then => "then",
            TokenKind::Else => "else",
            TokenKind::Skip => "skip",
            TokenKind::Halt => "halt",
            TokenKind::Print => "print",
            TokenKind::Return => "return",
            TokenKind::Input => "input",
            TokenKind::Num => "num",
            TokenKind::Text => "text",
            TokenKind::Void => "void",
            TokenKind::Not => "not",
            TokenKind::Sqrt => "sqrt",
            TokenKind::Or => "or",
            TokenKind::And => "and",
            TokenKind::Eq => "eq",
            TokenKind::Grt => "grt",
            TokenKind::Add => "add",
            TokenKind::Sub => "sub",
            TokenKind::Mul => "mul",
            TokenKind::Div => "div",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::Comma => ",",
            TokenKind::Semicolon => ";",
            TokenKind::LBrace => "{",
            TokenKind::RBrace => "}",
            TokenKind::Assign => "=",
            TokenKind::InputOp => "<",
            TokenKind::VName
            | TokenKind::FName
            | TokenKind::Number
            | TokenKind::String
            | TokenKind::Eof => return None,
        };
        Some(text)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::VName => "VNAME",
            TokenKind::FName => "FNAME",
            TokenKind::Number => "NUMBER",
            TokenKind::String => "STRING",
            TokenKind::Eof => "EOF",
            other => other.literal().unwrap_or("?"),
        };
        write!(f, "{}", name)
    }
}

/// Represents a **single lexical token**.
///
/// A `Token` is the pair `(kind, lexeme)` plus the location it was scanned
/// from. Tokens are immutable once produced and are stored verbatim in the
/// leaves of the parse tree.
///
/// # Example Tokens
/// ```text
/// main   →  { kind: Main,   lexeme: "main" }
/// V_x    →  { kind: VName,  lexeme: "V_x"  }
/// 42     →  { kind: Number, lexeme: "42"   }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// The classified category of the token.
    pub kind: TokenKind,

    /// The exact source text that produced this token (empty for `Eof`).
    pub lexeme: String,

    /// Where the token starts. Unknown for externally supplied tokens.
    #[serde(default)]
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            span: Span::default(),
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Builds a literal token from its fixed text.
    ///
    /// Returns `None` when `kind` is a lexical class or `Eof`.
    pub fn literal(kind: TokenKind) -> Option<Self> {
        kind.literal().map(|text| Self::new(kind, text))
    }

    pub fn eof() -> Self {
        Self::new(TokenKind::Eof, "")
    }

    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::Eof
    }
}

impl fmt::Display for Token {
    /// Formats a token for **user-facing output**.
    ///
    /// Prints the lexeme the user wrote; `Eof` has no text, so it prints
    /// as `EOF`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_eof() {
            write!(f, "EOF")
        } else {
            write!(f, "{}", self.lexeme)
        }
    }
}

/// Reads a token stream produced outside the crate.
///
/// The text is a JSON array of `{ "kind": "...", "lexeme": "..." }`
/// records; `span` may be given as `{ "line": .., "column": .. }` and
/// defaults to unknown.
///
/// # Errors
/// `MalformedArtifact`, carrying the JSON line, when the text is not such
/// an array or a record names a kind RecSPL does not have. Whether the
/// stream ends in exactly one `EOF` is checked later, by the engine.
pub fn tokens_from_json(text: &str) -> Result<Vec<Token>, CompileError> {
    serde_json::from_str(text).map_err(|err| CompileError::MalformedArtifact {
        line: Some(err.line()),
        detail: err.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_tokens_carry_their_fixed_text() {
        assert_eq!(Token::literal(TokenKind::Semicolon), Some(Token::new(TokenKind::Semicolon, ";")));
        assert_eq!(Token::literal(TokenKind::VName), None);
        assert_eq!(Token::literal(TokenKind::Eof), None);
    }

    #[test]
    fn json_streams_use_uppercase_kinds() {
        let tokens = tokens_from_json(
            r#"[{"kind":"VNAME","lexeme":"V_x","span":{"line":2,"column":4}},{"kind":"EOF","lexeme":""}]"#,
        )
        .unwrap();

        assert_eq!(tokens[0], Token::new(TokenKind::VName, "V_x").with_span(Span::new(2, 4)));
        assert!(tokens[1].is_eof());
        assert_eq!(tokens[1].span, Span::default());
    }

    #[test]
    fn unknown_kinds_are_malformed_artifacts() {
        let err = tokens_from_json(
            "[\n  {\"kind\":\"MAIN\",\"lexeme\":\"main\"},\n  {\"kind\":\"WHILE\",\"lexeme\":\"while\"}\n]",
        )
        .unwrap_err();

        assert_eq!(err.code(), "E_ARTIFACT");
        match err {
            CompileError::MalformedArtifact { line, detail } => {
                assert_eq!(line, Some(3));
                assert!(detail.contains("unknown variant `WHILE`"));
            }
            other => panic!("expected a malformed artifact, got {:?}", other),
        }
    }

    #[test]
    fn non_array_input_is_rejected() {
        assert!(matches!(
            tokens_from_json(r#"{"kind":"EOF"}"#),
            Err(CompileError::MalformedArtifact { line: Some(1), .. })
        ));
    }
}
