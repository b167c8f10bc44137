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

use crate::lexer::token::TokenKind;

/// Maps a lowercase word to its **reserved keyword** kind.
///
/// This function is used by the lexer to tell reserved words apart from
/// text that merely looks like one. RecSPL has no free-form identifiers:
/// user names always start with `V_` or `F_`, so a bare lowercase word is
/// either a keyword or a lexical error.
///
/// # Parameters
/// - `word`: A run of lowercase letters extracted from source code.
///
/// # Returns
/// - `Some(kind)` if the word is reserved.
/// - `None` otherwise.
///
/// # Examples
/// ```text
/// begin  -> Some(Begin)
/// grt    -> Some(Grt)
/// mainx  -> None
/// ```
pub fn keyword(word: &str) -> Option<TokenKind> {
    let kind = match word {
        "main" => TokenKind::Main,
        "begin" => TokenKind::Begin,
        "end" => TokenKind::End,
        "if" => TokenKind::If,
        "then" => TokenKind::Then,
        "else" => TokenKind::Else,
        "skip" => TokenKind::Skip,
        "halt" => TokenKind::Halt,
        "print" => TokenKind::Print,
        "return" => TokenKind::Return,
        "input" => TokenKind::Input,
        "num" => TokenKind::Num,
        "text" => TokenKind::Text,
        "void" => TokenKind::Void,
        "not" => TokenKind::Not,
        "sqrt" => TokenKind::Sqrt,
        "or" => TokenKind::Or,
        "and" => TokenKind::And,
        "eq" => TokenKind::Eq,
        "grt" => TokenKind::Grt,
        "add" => TokenKind::Add,
        "sub" => TokenKind::Sub,
        "mul" => TokenKind::Mul,
        "div" => TokenKind::Div,
        _ => return None,
    };
    Some(kind)
}

/// Maps a single punctuation character to its kind.
pub fn punctuation(ch: char) -> Option<TokenKind> {
    let kind = match ch {
        '(' => TokenKind::LParen,
        ')' => TokenKind::RParen,
        ',' => TokenKind::Comma,
        ';' => TokenKind::Semicolon,
        '{' => TokenKind::LBrace,
        '}' => TokenKind::RBrace,
        '=' => TokenKind::Assign,
        '<' => TokenKind::InputOp,
        _ => return None,
    };
    Some(kind)
}
