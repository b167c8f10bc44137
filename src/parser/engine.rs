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

use tracing::{debug, trace};

use crate::config::CompilerConfig;
use crate::error::CompileError;
use crate::grammar::{Action, Grammar, ParsingTable, StateId, Symbol, Terminal};
use crate::lexer::{Token, TokenKind};
use crate::parser::tree::{NodeId, ParseTree};

/// The automaton's start state.
pub const START_STATE: StateId = 0;

/// Maps a token to the terminal the ACTION table is keyed by.
///
/// Literal tokens (reserved words, punctuation) are looked up by their
/// text; the four lexical classes by their class:
///
/// ```text
/// main  → `main`     ;    → `;`
/// V_x   → `V`        F_f  → `F`
/// 3.5   → `N`        "Hi" → `T`
/// EOF   → `$`
/// ```
///
/// # Errors
/// `MalformedArtifact` when a literal token's lexeme is not the text its
/// kind stands for (e.g. kind `Main` with lexeme `begin`), which can only
/// happen with externally supplied token streams.
pub fn lookup_symbol(token: &Token) -> Result<Terminal, CompileError> {
    let terminal = match token.kind {
        TokenKind::VName => Terminal::V,
        TokenKind::FName => Terminal::F,
        TokenKind::Number => Terminal::N,
        TokenKind::String => Terminal::T,
        TokenKind::Eof => Terminal::Eof,
        kind => {
            let literal = kind.literal().filter(|text| *text == token.lexeme);
            literal.and_then(Terminal::from_text).ok_or_else(|| {
                CompileError::MalformedArtifact {
                    line: None,
                    detail: format!("token of kind `{}` has lexeme `{}`", kind, token.lexeme),
                }
            })?
        }
    };

    Ok(terminal)
}

/// The three stacks the engine keeps in lock-step.
///
/// `states` always holds one more entry than the other two: the start
/// state sits at the bottom with no symbol or node of its own.
struct ParseStacks {
    states: Vec<StateId>,
    symbols: Vec<Symbol>,
    nodes: Vec<NodeId>,
}

impl ParseStacks {
    fn new() -> Self {
        Self {
            states: vec![START_STATE],
            symbols: Vec::new(),
            nodes: Vec::new(),
        }
    }

    fn state(&self) -> StateId {
        // The start state is never popped.
        self.states.last().copied().unwrap_or(START_STATE)
    }

    fn push(&mut self, state: StateId, symbol: Symbol, node: NodeId) {
        self.states.push(state);
        self.symbols.push(symbol);
        self.nodes.push(node);
    }

    /// Pops the top `count` entries, returned bottom-to-top.
    fn pop(&mut self, count: usize) -> Option<(Vec<Symbol>, Vec<NodeId>)> {
        let keep = self.symbols.len().checked_sub(count)?;
        self.states.truncate(keep + 1);
        Some((self.symbols.split_off(keep), self.nodes.split_off(keep)))
    }
}

/// A table-driven LR parser.
///
/// The engine borrows an immutable grammar and table, so one pair can back
/// any number of engines (and threads). Each call to [`parse`] owns its
/// own stacks and tree; nothing carries over between calls.
///
/// # Example
/// ```text
/// let engine = ShiftReduceEngine::recspl()?;
/// let tree = engine.parse(&tokens)?;
/// ```
///
/// [`parse`]: ShiftReduceEngine::parse
#[derive(Debug, Clone)]
pub struct ShiftReduceEngine<'a> {
    grammar: &'a Grammar,
    table: &'a ParsingTable,
    config: CompilerConfig,
}

impl<'a> ShiftReduceEngine<'a> {
    pub fn new(grammar: &'a Grammar, table: &'a ParsingTable) -> Self {
        Self {
            grammar,
            table,
            config: CompilerConfig::default(),
        }
    }

    pub fn with_config(mut self, config: CompilerConfig) -> Self {
        self.config = config;
        self
    }

    /// Parses `tokens` into a tree, or reports the first failure.
    ///
    /// # Behavior
    /// Each step looks up `ACTION[top state, lookup symbol]`:
    /// - **Shift** wraps the token in a leaf and pushes it
    /// - **Reduce** pops the rule's arity from all three stacks, adopts
    ///   the popped nodes under a new inner node and follows GOTO
    /// - **Accept** hangs the reduced start production under the root
    ///
    /// A missing ACTION entry is a syntax error. A missing GOTO entry, a
    /// reduce by an unknown rule, or an accept in the wrong configuration
    /// means the table itself is broken.
    ///
    /// # Errors
    /// - `MalformedArtifact` if the stream is empty, does not end in
    ///   exactly one `EOF`, or holds an inconsistent literal token
    /// - `Syntax` with the state and offending token
    /// - `TableConsistency` for a broken table
    /// - `StepBudgetExceeded` when `max_steps` is set and exhausted
    pub fn parse(&self, tokens: &[Token]) -> Result<ParseTree, CompileError> {
        check_stream(tokens)?;

        let start = self.grammar.start_symbol().ok_or_else(|| CompileError::TableConsistency {
            state: START_STATE,
            detail: "grammar has no rules".to_string(),
        })?;

        let mut tree = ParseTree::new(start);
        let mut stacks = ParseStacks::new();
        let mut position = 0;
        let mut steps = 0usize;

        loop {
            steps += 1;
            if let Some(limit) = self.config.max_steps {
                if steps > limit {
                    return Err(CompileError::StepBudgetExceeded { limit });
                }
            }

            let state = stacks.state();
            let token = tokens.get(position).ok_or_else(|| CompileError::TableConsistency {
                state,
                detail: "shifted past EOF".to_string(),
            })?;
            let lookahead = lookup_symbol(token)?;

            let action = self
                .table
                .action(state, lookahead)
                .ok_or_else(|| CompileError::Syntax {
                    state,
                    token: token.clone(),
                    expected: self.table.expected(state),
                })?;

            if self.config.trace_actions {
                trace!(state, symbol = %lookahead, action = %action, "engine step");
            }

            match action {
                Action::Shift(next) => {
                    let leaf = tree.allocate_leaf(token.clone());
                    stacks.push(next, Symbol::Terminal(lookahead), leaf);
                    position += 1;
                }
                Action::Reduce(index) => self.reduce(&mut tree, &mut stacks, index)?,
                Action::Accept => {
                    self.accept(&mut tree, &stacks, lookahead)?;
                    debug!(nodes = tree.len(), tokens = tokens.len(), steps, "input accepted");
                    return Ok(tree);
                }
            }
        }
    }

    fn reduce(
        &self,
        tree: &mut ParseTree,
        stacks: &mut ParseStacks,
        index: usize,
    ) -> Result<(), CompileError> {
        let state = stacks.state();
        let inconsistent = |detail: String| CompileError::TableConsistency { state, detail };

        let rule = self
            .grammar
            .rule(index)
            .ok_or_else(|| inconsistent(format!("reduce by unknown rule {}", index)))?;

        let (symbols, children) = stacks
            .pop(rule.arity())
            .ok_or_else(|| inconsistent(format!("stack too shallow to reduce by `{}`", rule)))?;

        if symbols != rule.rhs {
            return Err(inconsistent(format!("stack does not end in the RHS of `{}`", rule)));
        }

        let below = stacks.state();
        let next = self.table.goto(below, rule.lhs).ok_or_else(|| {
            CompileError::TableConsistency {
                state: below,
                detail: format!("no GOTO entry for `{}`", rule.lhs),
            }
        })?;

        let node = tree.allocate_inner(rule.lhs, children);
        stacks.push(next, Symbol::NonTerminal(rule.lhs), node);

        Ok(())
    }

    /// Accept is only honored with `EOF` ahead and exactly the RHS of the
    /// augmented start rule on the stack.
    fn accept(
        &self,
        tree: &mut ParseTree,
        stacks: &ParseStacks,
        lookahead: Terminal,
    ) -> Result<(), CompileError> {
        let start_rhs = self.grammar.rule(0).map(|rule| rule.rhs.as_slice());

        match stacks.nodes.as_slice() {
            [node] if lookahead == Terminal::Eof && start_rhs == Some(stacks.symbols.as_slice()) => {
                tree.attach_root_child(*node);
                Ok(())
            }
            _ => Err(CompileError::TableConsistency {
                state: stacks.state(),
                detail: format!(
                    "accept on `{}` with {} symbols on the stack",
                    lookahead,
                    stacks.symbols.len()
                ),
            }),
        }
    }
}

/// A token stream must be non-empty and carry exactly one `EOF`, last.
fn check_stream(tokens: &[Token]) -> Result<(), CompileError> {
    let malformed = |detail: &str| CompileError::MalformedArtifact {
        line: None,
        detail: detail.to_string(),
    };

    match tokens.iter().position(Token::is_eof) {
        None => Err(malformed("token stream is not terminated by EOF")),
        Some(at) if at + 1 != tokens.len() => Err(malformed("EOF before the end of the token stream")),
        Some(_) => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::NonTerminal;
    use crate::lexer::tokenize;

    fn recspl_engine() -> ShiftReduceEngine<'static> {
        ShiftReduceEngine::new(Grammar::recspl(), ParsingTable::recspl().unwrap())
    }

    fn parse(source: &str) -> Result<ParseTree, CompileError> {
        recspl_engine().parse(&tokenize(source).unwrap())
    }

    /// `PROG' → PROG`, `PROG → main`.
    fn tiny_grammar() -> Grammar {
        Grammar::new(vec![
            (NonTerminal::Start, vec![Symbol::NonTerminal(NonTerminal::Prog)]),
            (NonTerminal::Prog, vec![Symbol::Terminal(Terminal::Main)]),
        ])
    }

    fn tiny_table(with_goto: bool) -> ParsingTable {
        let mut table = ParsingTable::new();
        table.insert_action(0, Terminal::Main, Action::Shift(2));
        table.insert_action(2, Terminal::Eof, Action::Reduce(1));
        table.insert_action(1, Terminal::Eof, Action::Accept);
        if with_goto {
            table.insert_goto(0, NonTerminal::Prog, 1);
        }
        table
    }

    fn main_only() -> Vec<Token> {
        vec![Token::new(TokenKind::Main, "main"), Token::eof()]
    }

    #[test]
    fn maps_tokens_to_lookup_symbols() {
        let cases = [
            (Token::new(TokenKind::Main, "main"), Terminal::Main),
            (Token::new(TokenKind::Semicolon, ";"), Terminal::Semicolon),
            (Token::new(TokenKind::InputOp, "<"), Terminal::Less),
            (Token::new(TokenKind::VName, "V_x"), Terminal::V),
            (Token::new(TokenKind::FName, "F_go"), Terminal::F),
            (Token::new(TokenKind::Number, "-2.5"), Terminal::N),
            (Token::new(TokenKind::String, "\"Hi\""), Terminal::T),
            (Token::eof(), Terminal::Eof),
        ];

        for (token, expected) in cases {
            assert_eq!(lookup_symbol(&token).unwrap(), expected);
        }
    }

    #[test]
    fn rejects_literal_tokens_with_foreign_lexemes() {
        let err = lookup_symbol(&Token::new(TokenKind::Main, "begin")).unwrap_err();
        assert_eq!(err.code(), "E_ARTIFACT");
    }

    #[test]
    fn accepts_the_smallest_program() {
        let tree = parse("main begin end").unwrap();
        let prog = tree.child(tree.root(), 0).unwrap();
        let labels: Vec<_> = tree.children(prog).iter().map(|c| tree.label(*c)).collect();

        assert_eq!(tree.label(tree.root()), Some(NonTerminal::Start));
        assert_eq!(tree.label(prog), Some(NonTerminal::Prog));
        assert_eq!(
            labels,
            vec![None, Some(NonTerminal::GlobVars), Some(NonTerminal::Algo), Some(NonTerminal::Functions)]
        );

        let algo = tree.child(prog, 2).unwrap();
        let instruc = tree.child(algo, 1).unwrap();
        assert_eq!(tree.token(tree.child(algo, 0).unwrap()).unwrap().lexeme, "begin");
        assert_eq!(tree.label(instruc), Some(NonTerminal::Instruc));
        assert!(tree.children(instruc).is_empty());
        assert!(tree.validate().is_ok());
    }

    #[test]
    fn builds_one_node_per_shift_and_reduce() {
        let tree = parse("main begin skip ; end").unwrap();
        // 5 leaves, 7 reductions (GLOBVARS, COMMAND, INSTRUC x2, ALGO,
        // FUNCTIONS, PROG) and the root.
        assert_eq!(tree.len(), 13);
        assert_eq!(tree.frontier().len(), 5);
    }

    #[test]
    fn missing_end_is_a_syntax_error_at_eof() {
        let err = parse("main begin skip ;").unwrap_err();

        match err {
            CompileError::Syntax { state, token, expected } => {
                assert_eq!(state, 36);
                assert!(token.is_eof());
                assert!(expected.contains(&Terminal::End));
            }
            other => panic!("expected a syntax error, got {:?}", other),
        }
    }

    #[test]
    fn command_without_semicolon_is_a_syntax_error() {
        let err = parse("main begin skip end").unwrap_err();
        assert!(matches!(err, CompileError::Syntax { state: 29, ref token, .. } if token.lexeme == "end"));
    }

    #[test]
    fn stream_must_end_in_exactly_one_eof() {
        let engine = recspl_engine();
        let no_eof = vec![Token::new(TokenKind::Main, "main")];
        let early_eof = vec![Token::eof(), Token::new(TokenKind::Main, "main"), Token::eof()];

        assert_eq!(engine.parse(&no_eof).unwrap_err().code(), "E_ARTIFACT");
        assert_eq!(engine.parse(&early_eof).unwrap_err().code(), "E_ARTIFACT");
        assert_eq!(engine.parse(&[]).unwrap_err().code(), "E_ARTIFACT");
    }

    #[test]
    fn custom_grammar_and_table_drive_the_engine() {
        let grammar = tiny_grammar();
        let table = tiny_table(true);
        let tree = ShiftReduceEngine::new(&grammar, &table).parse(&main_only()).unwrap();

        assert_eq!(tree.len(), 3);
        assert_eq!(tree.frontier()[0].lexeme, "main");
    }

    #[test]
    fn missing_goto_is_a_table_error_not_a_syntax_error() {
        let grammar = tiny_grammar();
        let table = tiny_table(false);
        let err = ShiftReduceEngine::new(&grammar, &table).parse(&main_only()).unwrap_err();

        assert!(matches!(err, CompileError::TableConsistency { state: 0, .. }));
    }

    #[test]
    fn reduce_by_unknown_rule_is_a_table_error() {
        let grammar = tiny_grammar();
        let mut table = tiny_table(true);
        table.insert_action(2, Terminal::Eof, Action::Reduce(9));

        let err = ShiftReduceEngine::new(&grammar, &table).parse(&main_only()).unwrap_err();
        assert_eq!(err.code(), "E_TABLE");
    }

    #[test]
    fn step_budget_stops_the_engine() {
        let grammar = tiny_grammar();
        let table = tiny_table(true);
        let tokens = main_only();

        // shift, reduce, accept
        let exact = CompilerConfig::default().with_max_steps(3);
        let short = CompilerConfig::default().with_max_steps(2);

        assert!(ShiftReduceEngine::new(&grammar, &table)
            .with_config(exact)
            .parse(&tokens)
            .is_ok());
        assert_eq!(
            ShiftReduceEngine::new(&grammar, &table)
                .with_config(short)
                .parse(&tokens)
                .unwrap_err(),
            CompileError::StepBudgetExceeded { limit: 2 }
        );
    }
}
