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
use std::fmt;

use crate::grammar::symbol::{NonTerminal, Symbol, Terminal};

/// A single production `lhs → rhs`.
///
/// `index` is the rule number the parsing table refers to in its
/// `r<index>` actions. An empty `rhs` is a nullable production.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrammarRule {
    pub index: usize,
    pub lhs: NonTerminal,
    pub rhs: Vec<Symbol>,
}

impl GrammarRule {
    /// Number of stack entries a reduction by this rule pops.
    pub fn arity(&self) -> usize {
        self.rhs.len()
    }

    /// `true` when the rule derives the empty string.
    pub fn is_nullable(&self) -> bool {
        self.rhs.is_empty()
    }
}

impl fmt::Display for GrammarRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} →", self.lhs)?;
        if self.rhs.is_empty() {
            return write!(f, " ε");
        }
        for symbol in &self.rhs {
            write!(f, " {}", symbol)?;
        }
        Ok(())
    }
}

/// The immutable, indexed list of production rules.
#[derive(Debug, Clone)]
pub struct Grammar {
    rules: Vec<GrammarRule>,
}

static RECSPL: Lazy<Grammar> = Lazy::new(Grammar::build_recspl);

impl Grammar {
    /// Builds a grammar from `(lhs, rhs)` pairs, numbering the rules in the
    /// order given. Rule `0` should be the augmented start rule.
    pub fn new(rules: Vec<(NonTerminal, Vec<Symbol>)>) -> Self {
        let rules = rules
            .into_iter()
            .enumerate()
            .map(|(index, (lhs, rhs))| GrammarRule { index, lhs, rhs })
            .collect();

        Self { rules }
    }

    /// The shared RecSPL grammar, built once per process.
    pub fn recspl() -> &'static Grammar {
        &RECSPL
    }

    pub fn rule(&self, index: usize) -> Option<&GrammarRule> {
        self.rules.get(index)
    }

    pub fn rules(&self) -> &[GrammarRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// The augmented start symbol (`PROG'`), i.e. the LHS of rule 0.
    pub fn start_symbol(&self) -> Option<NonTerminal> {
        self.rules.first().map(|rule| rule.lhs)
    }

    /// Finds the rule whose LHS and RHS match exactly.
    ///
    /// Parse trees do not remember which rule built an inner node; this is
    /// how callers recover it from the node's label and children.
    pub fn find(&self, lhs: NonTerminal, rhs: &[Symbol]) -> Option<&GrammarRule> {
        self.rules
            .iter()
            .find(|rule| rule.lhs == lhs && rule.rhs == rhs)
    }

    /// The fixed RecSPL rule list.
    ///
    /// Rule numbers are part of the table artifact's contract: the
    /// `r<index>` entries in `recspl_table.csv` refer to positions in this
    /// list, so rules must never be reordered.
    fn build_recspl() -> Grammar {
        use NonTerminal as Nt;
        use Terminal as Tm;

        fn t(terminal: Terminal) -> Symbol {
            Symbol::Terminal(terminal)
        }

        fn n(nonterminal: NonTerminal) -> Symbol {
            Symbol::NonTerminal(nonterminal)
        }

        Grammar::new(vec![
            // 0
            (Nt::Start, vec![n(Nt::Prog)]),
            (Nt::Prog, vec![t(Tm::Main), n(Nt::GlobVars), n(Nt::Algo), n(Nt::Functions)]),
            (Nt::GlobVars, vec![]),
            (Nt::GlobVars, vec![n(Nt::VTyp), n(Nt::VName), t(Tm::Comma), n(Nt::GlobVars)]),
            (Nt::VTyp, vec![t(Tm::Num)]),
            // 5
            (Nt::VTyp, vec![t(Tm::Text)]),
            (Nt::VName, vec![t(Tm::V)]),
            (Nt::Algo, vec![t(Tm::Begin), n(Nt::Instruc), t(Tm::End)]),
            (Nt::Instruc, vec![]),
            (Nt::Instruc, vec![n(Nt::Command), t(Tm::Semicolon), n(Nt::Instruc)]),
            // 10
            (Nt::Command, vec![t(Tm::Skip)]),
            (Nt::Command, vec![t(Tm::Halt)]),
            (Nt::Command, vec![t(Tm::Print), n(Nt::Atomic)]),
            (Nt::Command, vec![t(Tm::Return), n(Nt::Atomic)]),
            (Nt::Command, vec![n(Nt::Assign)]),
            // 15
            (Nt::Command, vec![n(Nt::Call)]),
            (Nt::Command, vec![n(Nt::Branch)]),
            (Nt::Atomic, vec![n(Nt::VName)]),
            (Nt::Atomic, vec![n(Nt::Const)]),
            (Nt::Const, vec![t(Tm::N)]),
            // 20
            (Nt::Const, vec![t(Tm::T)]),
            (Nt::Assign, vec![n(Nt::VName), t(Tm::Less), t(Tm::Input)]),
            (Nt::Assign, vec![n(Nt::VName), t(Tm::Assign), n(Nt::Term)]),
            (
                Nt::Call,
                vec![
                    n(Nt::FName),
                    t(Tm::LParen),
                    n(Nt::Atomic),
                    t(Tm::Comma),
                    n(Nt::Atomic),
                    t(Tm::Comma),
                    n(Nt::Atomic),
                    t(Tm::RParen),
                ],
            ),
            (
                Nt::Branch,
                vec![
                    t(Tm::If),
                    n(Nt::Cond),
                    t(Tm::Then),
                    n(Nt::Algo),
                    t(Tm::Else),
                    n(Nt::Algo),
                ],
            ),
            // 25
            (Nt::Term, vec![n(Nt::Atomic)]),
            (Nt::Term, vec![n(Nt::Call)]),
            (Nt::Term, vec![n(Nt::Op)]),
            (Nt::Op, vec![n(Nt::UnOp), t(Tm::LParen), n(Nt::Arg), t(Tm::RParen)]),
            (
                Nt::Op,
                vec![
                    n(Nt::BinOp),
                    t(Tm::LParen),
                    n(Nt::Arg),
                    t(Tm::Comma),
                    n(Nt::Arg),
                    t(Tm::RParen),
                ],
            ),
            // 30
            (Nt::Arg, vec![n(Nt::Atomic)]),
            (Nt::Arg, vec![n(Nt::Op)]),
            (Nt::Cond, vec![n(Nt::Simple)]),
            (Nt::Cond, vec![n(Nt::Composit)]),
            (
                Nt::Simple,
                vec![
                    n(Nt::BinOp),
                    t(Tm::LParen),
                    n(Nt::Atomic),
                    t(Tm::Comma),
                    n(Nt::Atomic),
                    t(Tm::RParen),
                ],
            ),
            // 35
            (
                Nt::Composit,
                vec![
                    n(Nt::BinOp),
                    t(Tm::LParen),
                    n(Nt::Simple),
                    t(Tm::Comma),
                    n(Nt::Simple),
                    t(Tm::RParen),
                ],
            ),
            (Nt::Composit, vec![n(Nt::UnOp), t(Tm::LParen), n(Nt::Simple), t(Tm::RParen)]),
            (Nt::UnOp, vec![t(Tm::Not)]),
            (Nt::UnOp, vec![t(Tm::Sqrt)]),
            (Nt::BinOp, vec![t(Tm::Or)]),
            // 40
            (Nt::BinOp, vec![t(Tm::And)]),
            (Nt::BinOp, vec![t(Tm::Eq)]),
            (Nt::BinOp, vec![t(Tm::Grt)]),
            (Nt::BinOp, vec![t(Tm::Add)]),
            (Nt::BinOp, vec![t(Tm::Sub)]),
            // 45
            (Nt::BinOp, vec![t(Tm::Mul)]),
            (Nt::BinOp, vec![t(Tm::Div)]),
            (Nt::FName, vec![t(Tm::F)]),
            (Nt::Functions, vec![]),
            (Nt::Functions, vec![n(Nt::Decl), n(Nt::Functions)]),
            // 50
            (Nt::Decl, vec![n(Nt::Header), n(Nt::Body)]),
            (
                Nt::Header,
                vec![
                    n(Nt::FTyp),
                    n(Nt::FName),
                    t(Tm::LParen),
                    n(Nt::VName),
                    t(Tm::Comma),
                    n(Nt::VName),
                    t(Tm::Comma),
                    n(Nt::VName),
                    t(Tm::RParen),
                ],
            ),
            (Nt::FTyp, vec![t(Tm::Num)]),
            (Nt::FTyp, vec![t(Tm::Void)]),
            (
                Nt::Body,
                vec![
                    n(Nt::Prolog),
                    n(Nt::LocVars),
                    n(Nt::Algo),
                    n(Nt::Epilog),
                    n(Nt::SubFuncs),
                    t(Tm::End),
                ],
            ),
            // 55
            (Nt::Prolog, vec![t(Tm::LBrace)]),
            (Nt::Epilog, vec![t(Tm::RBrace)]),
            (
                Nt::LocVars,
                vec![
                    n(Nt::VTyp),
                    n(Nt::VName),
                    t(Tm::Comma),
                    n(Nt::VTyp),
                    n(Nt::VName),
                    t(Tm::Comma),
                    n(Nt::VTyp),
                    n(Nt::VName),
                    t(Tm::Comma),
                ],
            ),
            (Nt::SubFuncs, vec![n(Nt::Functions)]),
        ])
    }
}
