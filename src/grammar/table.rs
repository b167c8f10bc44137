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
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

use crate::error::CompileError;
use crate::grammar::rules::Grammar;
use crate::grammar::symbol::{NonTerminal, Symbol, Terminal};

/// An automaton state number.
pub type StateId = usize;

/// The shipped ACTION/GOTO table for the RecSPL grammar.
const RECSPL_ARTIFACT: &str = include_str!("recspl_table.csv");

const HEADER: &str = "STATE;SYMBOL;TYPE;VALUE";
const DELIMITER: char = ';';

static RECSPL: Lazy<Result<ParsingTable, CompileError>> =
    Lazy::new(|| ParsingTable::from_artifact(RECSPL_ARTIFACT, Grammar::recspl()));

/// One ACTION table entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Consume the lookahead and enter the given state.
    Shift(StateId),
    /// Reduce by the rule with this index.
    Reduce(usize),
    /// The input is a sentence of the grammar.
    Accept,
}

impl Action {
    /// Parses the artifact spelling: `s<state>`, `r<rule>` or `acc`.
    pub fn parse(text: &str) -> Option<Action> {
        if text == "acc" {
            return Some(Action::Accept);
        }

        let (tag, number) = text.split_at(text.char_indices().nth(1)?.0);
        let number: usize = number.parse().ok()?;

        match tag {
            "s" => Some(Action::Shift(number)),
            "r" => Some(Action::Reduce(number)),
            _ => None,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Shift(state) => write!(f, "s{}", state),
            Action::Reduce(rule) => write!(f, "r{}", rule),
            Action::Accept => write!(f, "acc"),
        }
    }
}

/// The two partial maps that drive the shift-reduce engine.
///
/// - `ACTION[state, terminal]` → shift / reduce / accept
/// - `GOTO[state, nonterminal]` → state
///
/// The table is immutable once loaded and may be shared read-only between
/// any number of parses. At most one action per key is enforced at load
/// time; the engine itself trusts the table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsingTable {
    actions: BTreeMap<(StateId, Terminal), Action>,
    gotos: BTreeMap<(StateId, NonTerminal), StateId>,
}

impl ParsingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// The shared RecSPL table, parsed once per process from the artifact
    /// compiled into the crate.
    pub fn recspl() -> Result<&'static ParsingTable, CompileError> {
        RECSPL.as_ref().map_err(Clone::clone)
    }

    /// Records an ACTION entry, returning the entry it replaced (if any).
    pub fn insert_action(
        &mut self,
        state: StateId,
        terminal: Terminal,
        action: Action,
    ) -> Option<Action> {
        self.actions.insert((state, terminal), action)
    }

    /// Records a GOTO entry, returning the entry it replaced (if any).
    pub fn insert_goto(
        &mut self,
        state: StateId,
        nonterminal: NonTerminal,
        next: StateId,
    ) -> Option<StateId> {
        self.gotos.insert((state, nonterminal), next)
    }

    pub fn action(&self, state: StateId, terminal: Terminal) -> Option<Action> {
        self.actions.get(&(state, terminal)).copied()
    }

    pub fn goto(&self, state: StateId, nonterminal: NonTerminal) -> Option<StateId> {
        self.gotos.get(&(state, nonterminal)).copied()
    }

    /// Terminals with a defined action in `state`, in symbol order.
    ///
    /// Used to tell the user what the parser would have accepted.
    pub fn expected(&self, state: StateId) -> Vec<Terminal> {
        self.actions
            .range((state, Terminal::Main)..=(state, Terminal::Eof))
            .map(|((_, terminal), _)| *terminal)
            .collect()
    }

    pub fn action_count(&self) -> usize {
        self.actions.len()
    }

    pub fn goto_count(&self) -> usize {
        self.gotos.len()
    }

    /// Loads a table from its persisted text form.
    ///
    /// # Format
    /// ```text
    /// STATE;SYMBOL;TYPE;VALUE
    /// 0;main;ACTION;s2
    /// 12;";";ACTION;r11
    /// 3;ALGO;GOTO;7
    /// ```
    ///
    /// A field wrapped in double quotes may contain the `;` delimiter.
    ///
    /// # Errors
    /// `MalformedArtifact` (with the 1-based line) when:
    /// - a line does not have exactly four fields
    /// - a state or value is not a number / action spelling
    /// - a symbol is unknown, or of the wrong class for its entry type
    /// - a reduce action names a rule the grammar does not have
    /// - a `(state, symbol)` key is defined twice
    pub fn from_artifact(text: &str, grammar: &Grammar) -> Result<ParsingTable, CompileError> {
        let mut table = ParsingTable::new();
        let mut lines = text.lines().enumerate();

        match lines.next() {
            Some((_, header)) if header.trim() == HEADER => {}
            _ => return Err(malformed(1, format!("expected header `{}`", HEADER))),
        }

        for (index, line) in lines {
            let line_no = index + 1;

            if line.trim().is_empty() {
                continue;
            }

            let fields = split_fields(line);
            let [state, symbol, kind, value] = fields.as_slice() else {
                return Err(malformed(
                    line_no,
                    format!("expected 4 fields, found {}", fields.len()),
                ));
            };

            let state: StateId = state
                .parse()
                .map_err(|_| malformed(line_no, format!("invalid state `{}`", state)))?;

            let symbol = Symbol::parse(symbol)
                .ok_or_else(|| malformed(line_no, format!("unknown symbol `{}`", symbol)))?;

            match (kind.as_str(), symbol) {
                ("ACTION", Symbol::Terminal(terminal)) => {
                    let action = Action::parse(value)
                        .ok_or_else(|| malformed(line_no, format!("invalid action `{}`", value)))?;

                    if let Action::Reduce(rule) = action {
                        if grammar.rule(rule).is_none() {
                            return Err(malformed(
                                line_no,
                                format!("reduce by unknown rule {}", rule),
                            ));
                        }
                    }

                    if table.insert_action(state, terminal, action).is_some() {
                        return Err(malformed(
                            line_no,
                            format!("duplicate ACTION for ({}, {})", state, terminal),
                        ));
                    }
                }
                ("GOTO", Symbol::NonTerminal(nonterminal)) => {
                    let next: StateId = value
                        .parse()
                        .map_err(|_| malformed(line_no, format!("invalid GOTO state `{}`", value)))?;

                    if table.insert_goto(state, nonterminal, next).is_some() {
                        return Err(malformed(
                            line_no,
                            format!("duplicate GOTO for ({}, {})", state, nonterminal),
                        ));
                    }
                }
                ("ACTION", Symbol::NonTerminal(nonterminal)) => {
                    return Err(malformed(
                        line_no,
                        format!("ACTION keyed by nonterminal `{}`", nonterminal),
                    ));
                }
                ("GOTO", Symbol::Terminal(terminal)) => {
                    return Err(malformed(
                        line_no,
                        format!("GOTO keyed by terminal `{}`", terminal),
                    ));
                }
                (other, _) => {
                    return Err(malformed(line_no, format!("unknown entry type `{}`", other)));
                }
            }
        }

        debug!(
            actions = table.action_count(),
            gotos = table.goto_count(),
            "parsing table loaded"
        );
        Ok(table)
    }

    /// Writes the table back out in the format `from_artifact` reads.
    ///
    /// ACTION entries come first, then GOTO entries, each ordered by state
    /// and symbol, so the output is stable across runs.
    pub fn to_artifact(&self) -> String {
        let mut out = String::from(HEADER);
        out.push('\n');

        for ((state, terminal), action) in &self.actions {
            out.push_str(&format!(
                "{};{};ACTION;{}\n",
                state,
                quote(terminal.text()),
                action
            ));
        }

        for ((state, nonterminal), next) in &self.gotos {
            out.push_str(&format!("{};{};GOTO;{}\n", state, nonterminal, next));
        }

        out
    }
}

fn malformed(line: usize, detail: String) -> CompileError {
    CompileError::MalformedArtifact {
        line: Some(line),
        detail,
    }
}

/// Symbols that collide with artifact syntax are written quoted.
fn quote(text: &str) -> String {
    if text.contains(DELIMITER) || text.contains('{') || text.contains('}') {
        format!("\"{}\"", text)
    } else {
        text.to_string()
    }
}

/// Splits one artifact line on `;`, honouring double-quoted fields.
///
/// Quotes only toggle delimiter handling; they are not part of the field.
/// Every field is trimmed.
fn split_fields(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for ch in line.chars() {
        match ch {
            '"' => in_quotes = !in_quotes,
            DELIMITER if !in_quotes => {
                fields.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(ch),
        }
    }

    fields.push(current.trim().to_string());
    fields
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_action_spellings() {
        assert_eq!(Action::parse("s12"), Some(Action::Shift(12)));
        assert_eq!(Action::parse("r0"), Some(Action::Reduce(0)));
        assert_eq!(Action::parse("acc"), Some(Action::Accept));
        assert_eq!(Action::parse("x3"), None);
        assert_eq!(Action::parse("s"), None);
        assert_eq!(Action::parse(""), None);
    }

    #[test]
    fn splits_quoted_delimiters() {
        assert_eq!(split_fields(r#"12;";";ACTION;r9"#), vec!["12", ";", "ACTION", "r9"]);
        assert_eq!(split_fields("1 ; main ; ACTION ; s2"), vec!["1", "main", "ACTION", "s2"]);
    }

    #[test]
    fn shipped_table_loads_against_the_grammar() {
        let table = ParsingTable::recspl().unwrap();

        assert_eq!(table.action(0, Terminal::Main), Some(Action::Shift(2)));
        assert_eq!(table.action(1, Terminal::Eof), Some(Action::Accept));
        assert_eq!(table.goto(0, NonTerminal::Prog), Some(1));
        assert!(table.action(0, Terminal::Begin).is_none());
        assert_eq!(table.action_count(), 288);
        assert_eq!(table.goto_count(), 116);
    }

    #[test]
    fn artifact_round_trips() {
        let table = ParsingTable::recspl().unwrap();
        let text = table.to_artifact();
        let again = ParsingTable::from_artifact(&text, Grammar::recspl()).unwrap();

        assert_eq!(&again, table);
    }

    #[test]
    fn rejects_unknown_symbols_with_line_numbers() {
        let text = "STATE;SYMBOL;TYPE;VALUE\n0;main;ACTION;s2\n1;while;ACTION;s3\n";
        let err = ParsingTable::from_artifact(text, Grammar::recspl()).unwrap_err();

        assert!(matches!(err, CompileError::MalformedArtifact { line: Some(3), .. }));
    }

    #[test]
    fn rejects_reduce_by_missing_rule() {
        let text = "STATE;SYMBOL;TYPE;VALUE\n0;main;ACTION;r99\n";
        let err = ParsingTable::from_artifact(text, Grammar::recspl()).unwrap_err();

        assert!(matches!(err, CompileError::MalformedArtifact { line: Some(2), .. }));
    }

    #[test]
    fn rejects_duplicate_keys_and_misplaced_symbols() {
        let duplicate = "STATE;SYMBOL;TYPE;VALUE\n0;main;ACTION;s2\n0;main;ACTION;s3\n";
        assert!(ParsingTable::from_artifact(duplicate, Grammar::recspl()).is_err());

        let goto_on_terminal = "STATE;SYMBOL;TYPE;VALUE\n0;main;GOTO;4\n";
        assert!(ParsingTable::from_artifact(goto_on_terminal, Grammar::recspl()).is_err());

        let missing_header = "0;main;ACTION;s2\n";
        assert!(ParsingTable::from_artifact(missing_header, Grammar::recspl()).is_err());
    }

    #[test]
    fn lists_expected_terminals_for_a_state() {
        let table = ParsingTable::recspl().unwrap();
        assert_eq!(table.expected(0), vec![Terminal::Main]);
    }
}
