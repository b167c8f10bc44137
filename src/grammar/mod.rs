/*
 * ==========================================================================
 * RECSPL - Table-Driven Compiler Front End
 * ==========================================================================
 *
 * File:     grammar/mod.rs
 * Purpose:  Grammar model and parsing tables.
 *
 * This module holds everything the shift-reduce engine consults but never
 * changes:
 *   - The closed set of grammar symbols
 *   - The numbered production rules
 *   - The ACTION/GOTO table and its persisted artifact form
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

/// Terminal / nonterminal enumerations and their canonical spellings.
pub mod symbol;

/// Production rules and the fixed RecSPL grammar.
pub mod rules;

/// ACTION/GOTO tables and the `;`-separated artifact reader/writer.
pub mod table;

pub use rules::{Grammar, GrammarRule};
pub use symbol::{NonTerminal, Symbol, Terminal};
pub use table::{Action, ParsingTable, StateId};
