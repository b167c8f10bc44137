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

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A terminal symbol of the RecSPL grammar.
///
/// Reserved words and punctuation are terminals in their own right. The
/// four lexical classes collapse every user-chosen lexeme onto one symbol:
///
/// ```text
/// V  → any VNAME      F  → any FNAME
/// N  → any NUMBER     T  → any STRING
/// ```
///
/// `Eof` is the end-of-input lookahead, written `$` in the table artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Terminal {
    Main,
    Begin,
    End,
    If,
    Then,
    Else,
    Skip,
    Halt,
    Print,
    Return,
    Input,
    Num,
    Text,
    Void,
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
    LParen,
    RParen,
    Comma,
    Semicolon,
    LBrace,
    RBrace,
    Assign,
    Less,
    V,
    F,
    N,
    T,
    Eof,
}

impl Terminal {
    pub const ALL: [Terminal; 37] = [
        Terminal::Main,
        Terminal::Begin,
        Terminal::End,
        Terminal::If,
        Terminal::Then,
        Terminal::Else,
        Terminal::Skip,
        Terminal::Halt,
        Terminal::Print,
        Terminal::Return,
        Terminal::Input,
        Terminal::Num,
        Terminal::Text,
        Terminal::Void,
        Terminal::Not,
        Terminal::Sqrt,
        Terminal::Or,
        Terminal::And,
        Terminal::Eq,
        Terminal::Grt,
        Terminal::Add,
        Terminal::Sub,
        Terminal::Mul,
        Terminal::Div,
        Terminal::LParen,
        Terminal::RParen,
        Terminal::Comma,
        Terminal::Semicolon,
        Terminal::LBrace,
        Terminal::RBrace,
        Terminal::Assign,
        Terminal::Less,
        Terminal::V,
        Terminal::F,
        Terminal::N,
        Terminal::T,
        Terminal::Eof,
    ];

    /// The canonical text of the terminal, as written in grammar rules and
    /// in the table artifact.
    pub fn text(&self) -> &'static str {
        match self {
            Terminal::Main => "main",
            Terminal::Begin => "begin",
            Terminal::End => "end",
            Terminal::If => "if",
            Terminal::Then => "then",
            Terminal::Else => "else",
            Terminal::Skip => "skip",
            Terminal::Halt => "halt",
            Terminal::Print => "print",
            Terminal::Return => "return",
            Terminal::Input => "input",
            Terminal::Num => "num",
            Terminal::Text => "text",
            Terminal::Void => "void",
            Terminal::Not => "not",
            Terminal::Sqrt => "sqrt",
            Terminal::Or => "or",
            Terminal::And => "and",
            Terminal::Eq => "eq",
            Terminal::Grt => "grt",
            Terminal::Add => "add",
            Terminal::Sub => "sub",
            Terminal::Mul => "mul",
            Terminal::Div => "div",
            Terminal::LParen => "(",
            Terminal::RParen => ")",
            Terminal::Comma => ",",
            Terminal::Semicolon => ";",
            Terminal::LBrace => "{",
            Terminal::RBrace => "}",
            Terminal::Assign => "=",
            Terminal::Less => "<",
            Terminal::V => "V",
            Terminal::F => "F",
            Terminal::N => "N",
            Terminal::T => "T",
            Terminal::Eof => "$",
        }
    }

    pub fn from_text(text: &str) -> Option<Terminal> {
        Terminal::ALL.iter().copied().find(|t| t.text() == text)
    }
}

/// A nonterminal of the RecSPL grammar, including the augmented start
/// symbol `PROG'`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NonTerminal {
    /// `PROG'`, the augmented start symbol.
    Start,
    Prog,
    GlobVars,
    VTyp,
    VName,
    Algo,
    Instruc,
    Command,
    Atomic,
    Const,
    Assign,
    Call,
    Branch,
    Term,
    Op,
    Arg,
    Cond,
    Simple,
    Composit,
    UnOp,
    BinOp,
    FName,
    Functions,
    Decl,
    Header,
    FTyp,
    Body,
    Prolog,
    Epilog,
    LocVars,
    SubFuncs,
}

impl NonTerminal {
    pub const ALL: [NonTerminal; 31] = [
        NonTerminal::Start,
        NonTerminal::Prog,
        NonTerminal::GlobVars,
        NonTerminal::VTyp,
        NonTerminal::VName,
        NonTerminal::Algo,
        NonTerminal::Instruc,
        NonTerminal::Command,
        NonTerminal::Atomic,
        NonTerminal::Const,
        NonTerminal::Assign,
        NonTerminal::Call,
        NonTerminal::Branch,
        NonTerminal::Term,
        NonTerminal::Op,
        NonTerminal::Arg,
        NonTerminal::Cond,
        NonTerminal::Simple,
        NonTerminal::Composit,
        NonTerminal::UnOp,
        NonTerminal::BinOp,
        NonTerminal::FName,
        NonTerminal::Functions,
        NonTerminal::Decl,
        NonTerminal::Header,
        NonTerminal::FTyp,
        NonTerminal::Body,
        NonTerminal::Prolog,
        NonTerminal::Epilog,
        NonTerminal::LocVars,
        NonTerminal::SubFuncs,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            NonTerminal::Start => "PROG'",
            NonTerminal::Prog => "PROG",
            NonTerminal::GlobVars => "GLOBVARS",
            NonTerminal::VTyp => "VTYP",
            NonTerminal::VName => "VNAME",
            NonTerminal::Algo => "ALGO",
            NonTerminal::Instruc => "INSTRUC",
            NonTerminal::Command => "COMMAND",
            NonTerminal::Atomic => "ATOMIC",
            NonTerminal::Const => "CONST",
            NonTerminal::Assign => "ASSIGN",
            NonTerminal::Call => "CALL",
            NonTerminal::Branch => "BRANCH",
            NonTerminal::Term => "TERM",
            NonTerminal::Op => "OP",
            NonTerminal::Arg => "ARG",
            NonTerminal::Cond => "COND",
            NonTerminal::Simple => "SIMPLE",
            NonTerminal::Composit => "COMPOSIT",
            NonTerminal::UnOp => "UNOP",
            NonTerminal::BinOp => "BINOP",
            NonTerminal::FName => "FNAME",
            NonTerminal::Functions => "FUNCTIONS",
            NonTerminal::Decl => "DECL",
            NonTerminal::Header => "HEADER",
            NonTerminal::FTyp => "FTYP",
            NonTerminal::Body => "BODY",
            NonTerminal::Prolog => "PROLOG",
            NonTerminal::Epilog => "EPILOG",
            NonTerminal::LocVars => "LOCVARS",
            NonTerminal::SubFuncs => "SUBFUNCS",
        }
    }

    pub fn from_name(name: &str) -> Option<NonTerminal> {
        NonTerminal::ALL.iter().copied().find(|n| n.name() == name)
    }
}

/// Any grammar symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Symbol {
    Terminal(Terminal),
    NonTerminal(NonTerminal),
}

impl Symbol {
    /// Parses the canonical text of a symbol.
    ///
    /// Terminal and nonterminal spellings never collide (nonterminals are
    /// multi-letter upper case, the single-letter class terminals are not
    /// nonterminal names), so the lookup order does not matter.
    pub fn parse(text: &str) -> Option<Symbol> {
        Terminal::from_text(text)
            .map(Symbol::Terminal)
            .or_else(|| NonTerminal::from_name(text).map(Symbol::NonTerminal))
    }

    pub fn text(&self) -> &'static str {
        match self {
            Symbol::Terminal(t) => t.text(),
            Symbol::NonTerminal(n) => n.name(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Symbol::Terminal(_))
    }
}

impl From<Terminal> for Symbol {
    fn from(t: Terminal) -> Self {
        Symbol::Terminal(t)
    }
}

impl From<NonTerminal> for Symbol {
    fn from(n: NonTerminal) -> Self {
        Symbol::NonTerminal(n)
    }
}

impl fmt::Display for Terminal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

impl fmt::Display for NonTerminal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

// Nonterminals travel as their grammar names in serialized trees so the
// output stays readable by code generators that know nothing about Rust.
impl Serialize for NonTerminal {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for NonTerminal {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        NonTerminal::from_name(&name)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown nonterminal `{}`", name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_spelling_parses_back_to_its_symbol() {
        for t in Terminal::ALL {
            assert_eq!(Symbol::parse(t.text()), Some(Symbol::Terminal(t)));
        }
        for n in NonTerminal::ALL {
            assert_eq!(Symbol::parse(n.name()), Some(Symbol::NonTerminal(n)));
        }
    }

    #[test]
    fn unknown_spellings_are_rejected() {
        assert_eq!(Symbol::parse("PROGRAM"), None);
        assert_eq!(Symbol::parse("while"), None);
        assert_eq!(Symbol::parse(""), None);
    }

    #[test]
    fn nonterminals_serialize_as_grammar_names() {
        let json = serde_json::to_string(&NonTerminal::Start).unwrap();
        assert_eq!(json, "\"PROG'\"");
        let back: NonTerminal = serde_json::from_str(&json).unwrap();
        assert_eq!(back, NonTerminal::Start);
        assert!(serde_json::from_str::<NonTerminal>("\"NOPE\"").is_err());
    }
}
