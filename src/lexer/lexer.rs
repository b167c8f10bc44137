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

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::error::CompileError;
use crate::lexer::keywords::{keyword, punctuation};
use crate::lexer::token::{Token, TokenKind};
use crate::span::Span;

static VNAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\AV_[a-z][a-z0-9]*").expect("VNAME pattern"));
static FNAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\AF_[a-z][a-z0-9]*").expect("FNAME pattern"));
static STRING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"\A"[A-Z][a-z]{0,7}""#).expect("STRING pattern"));
static NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\A-?[0-9]+(\.[0-9]+)?").expect("NUMBER pattern"));
static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\A[a-z]+").expect("WORD pattern"));

/// Scans RecSPL source text into a flat token sequence.
///
/// The lexer works on byte offsets into the borrowed source and keeps
/// enough bookkeeping (`line`, `line_start`) to stamp every token with a
/// [`Span`].
pub struct Lexer<'a> {
    source: &'a str,
    current: usize,
    line: usize,
    line_start: usize,
    pub tokens: Vec<Token>,
}

/// Public entry point for lexical analysis.
///
/// # Returns
/// The full token sequence, always terminated by exactly one `Eof` token,
/// or a `CompileError::Lexical` pointing at the first unrecognised text.
///
/// # Example
/// ```text
/// "main begin end"  →  [main, begin, end, EOF]
/// ```
pub fn tokenize(source: &str) -> Result<Vec<Token>, CompileError> {
    let mut lexer = Lexer::new(source);
    lexer.scan_tokens()?;
    Ok(lexer.tokens)
}

impl<'a> Lexer<'a> {
    /// Creates a lexer positioned at the start of `source`.
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            current: 0,
            line: 1,
            line_start: 0,
            tokens: Vec::new(),
        }
    }

    /// Performs complete lexical analysis over the entire source input.
    ///
    /// # Behavior
    /// - Whitespace separates tokens and is otherwise ignored
    /// - The first token that cannot be classified stops the scan
    /// - A terminating `TokenKind::Eof` is appended on success
    pub fn scan_tokens(&mut self) -> Result<(), CompileError> {
        loop {
            self.skip_whitespace();

            if self.is_at_end() {
                break;
            }

            self.scan_token()?;
        }

        let span = self.span();
        self.tokens.push(Token::eof().with_span(span));

        debug!(tokens = self.tokens.len(), "lexing complete");
        Ok(())
    }

    /// Scans and emits a single token starting at the cursor.
    ///
    /// Classification order matters: punctuation and strings are decided by
    /// their first character, numbers may start with `-`, and user names
    /// must be tried before plain words because `V_x` would otherwise never
    /// match anything.
    fn scan_token(&mut self) -> Result<(), CompileError> {
        let span = self.span();
        let source = self.source;
        let rest = &source[self.current..];

        let Some(ch) = rest.chars().next() else {
            return Ok(());
        };

        if let Some(kind) = punctuation(ch) {
            self.push(kind, ch.len_utf8(), span);
            return Ok(());
        }

        if ch == '"' {
            let m = STRING.find(rest).ok_or_else(|| self.error(span))?;
            self.push(TokenKind::String, m.end(), span);
            return Ok(());
        }

        if ch == '-' || ch.is_ascii_digit() {
            let m = NUMBER.find(rest).ok_or_else(|| self.error(span))?;
            self.push(TokenKind::Number, m.end(), span);
            return Ok(());
        }

        if let Some(m) = VNAME.find(rest) {
            return self.push_word(TokenKind::VName, m.end(), span);
        }

        if let Some(m) = FNAME.find(rest) {
            return self.push_word(TokenKind::FName, m.end(), span);
        }

        if let Some(m) = WORD.find(rest) {
            return match keyword(m.as_str()) {
                Some(kind) => self.push_word(kind, m.end(), span),
                None => Err(self.error(span)),
            };
        }

        Err(self.error(span))
    }

    /// Emits a word-like token, rejecting it if more identifier characters
    /// follow (`mainx`, `V_aB`).
    fn push_word(&mut self, kind: TokenKind, len: usize, span: Span) -> Result<(), CompileError> {
        let next = self.source[self.current + len..].chars().next();

        if matches!(next, Some(c) if c.is_ascii_alphanumeric() || c == '_') {
            return Err(self.error(span));
        }

        self.push(kind, len, span);
        Ok(())
    }

    fn push(&mut self, kind: TokenKind, len: usize, span: Span) {
        let lexeme = &self.source[self.current..self.current + len];
        self.tokens.push(Token::new(kind, lexeme).with_span(span));
        self.current += len;
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.source[self.current..].chars().next() {
            if !ch.is_whitespace() {
                break;
            }

            self.current += ch.len_utf8();

            if ch == '\n' {
                self.line += 1;
                self.line_start = self.current;
            }
        }
    }

    /// Builds a lexical error covering the run of non-whitespace text at
    /// the cursor.
    fn error(&self, span: Span) -> CompileError {
        let text: String = self.source[self.current..]
            .chars()
            .take_while(|c| !c.is_whitespace())
            .collect();

        CompileError::Lexical { text, span }
    }

    fn span(&self) -> Span {
        let column = self.source[self.line_start..self.current].chars().count();
        Span::new(self.line, column)
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.source.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn scans_a_minimal_program() {
        assert_eq!(
            kinds("main begin end"),
            vec![TokenKind::Main, TokenKind::Begin, TokenKind::End, TokenKind::Eof]
        );
    }

    #[test]
    fn scans_lexical_classes_with_their_text() {
        let tokens = tokenize(r#"V_x = F_go ( -3.5 , "Hello" , V_y2 )"#).unwrap();
        let pairs: Vec<(TokenKind, &str)> =
            tokens.iter().map(|t| (t.kind, t.lexeme.as_str())).collect();

        assert_eq!(
            pairs,
            vec![
                (TokenKind::VName, "V_x"),
                (TokenKind::Assign, "="),
                (TokenKind::FName, "F_go"),
                (TokenKind::LParen, "("),
                (TokenKind::Number, "-3.5"),
                (TokenKind::Comma, ","),
                (TokenKind::String, "\"Hello\""),
                (TokenKind::Comma, ","),
                (TokenKind::VName, "V_y2"),
                (TokenKind::RParen, ")"),
                (TokenKind::Eof, ""),
            ]
        );
    }

    #[test]
    fn punctuation_needs_no_surrounding_whitespace() {
        assert_eq!(
            kinds("V_a<input;"),
            vec![
                TokenKind::VName,
                TokenKind::InputOp,
                TokenKind::Input,
                TokenKind::Semicolon,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn tracks_lines_and_columns() {
        let tokens = tokenize("main\n  begin\nend").unwrap();
        assert_eq!(tokens[0].span, Span::new(1, 0));
        assert_eq!(tokens[1].span, Span::new(2, 2));
        assert_eq!(tokens[2].span, Span::new(3, 0));
    }

    #[test]
    fn rejects_words_that_run_into_identifier_characters() {
        let err = tokenize("mainx begin").unwrap_err();
        assert!(matches!(
            err,
            CompileError::Lexical { ref text, span } if text == "mainx" && span == Span::new(1, 0)
        ));

        assert!(tokenize("V_aB").is_err());
    }

    #[test]
    fn rejects_malformed_strings() {
        let err = tokenize(r#"print "hello""#).unwrap_err();
        assert!(matches!(err, CompileError::Lexical { ref text, .. } if text == "\"hello\""));
    }

    #[test]
    fn empty_source_is_just_eof() {
        assert_eq!(kinds("   \n "), vec![TokenKind::Eof]);
    }
}
