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

use thiserror::Error;

use crate::grammar::{StateId, Terminal};
use crate::lexer::Token;
use crate::semantic::scope::ScopeId;
use crate::semantic::types::Type;
use crate::span::Span;

/// Every way a compilation can fail.
///
/// The front end is fail-fast: the first error ends the run and nothing is
/// recovered locally. Each variant carries the structured context needed to
/// point at the offending construct.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompileError {
    /// The scanner met text that is not a RecSPL token.
    #[error("unrecognised input `{text}`")]
    Lexical { text: String, span: Span },

    /// No ACTION entry exists for the current state and lookahead.
    #[error("syntax error in state {state}: unexpected `{token}`")]
    Syntax {
        state: StateId,
        token: Token,
        /// Terminals that do have an action in `state`.
        expected: Vec<Terminal>,
    },

    /// The parsing table disagrees with itself or with the grammar, e.g. a
    /// reduction succeeded but GOTO has no entry for the reduced symbol.
    /// This is a broken table, not broken input.
    #[error("parsing table is inconsistent in state {state}: {detail}")]
    TableConsistency { state: StateId, detail: String },

    #[error(transparent)]
    Scope(#[from] ScopeError),

    #[error(transparent)]
    Type(#[from] TypeError),

    /// A token stream, table artifact or serialized tree refers to
    /// something the grammar does not know, or is structurally invalid.
    #[error(
        "malformed artifact{}: {detail}",
        .line.map(|l| format!(" (line {})", l)).unwrap_or_default()
    )]
    MalformedArtifact { line: Option<usize>, detail: String },

    #[error("invalid configuration: {detail}")]
    Config { detail: String },

    /// The engine ran more actions than `CompilerConfig::max_steps` allows.
    #[error("parser exceeded its budget of {limit} steps")]
    StepBudgetExceeded { limit: usize },
}

/// A reference that does not resolve, or a declaration that clashes.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScopeError {
    #[error("variable `{name}` is not declared in scope {scope} or any enclosing scope")]
    UndeclaredVariable {
        name: String,
        scope: ScopeId,
        span: Span,
    },

    #[error("function `{name}` is not declared in scope {scope} or any enclosing scope")]
    UndeclaredFunction {
        name: String,
        scope: ScopeId,
        span: Span,
    },

    #[error("`{name}` is declared twice in scope {scope}")]
    Redeclared {
        name: String,
        scope: ScopeId,
        span: Span,
    },
}

/// A violation of the `num`/`text` typing rules.
///
/// `function` is the name of the function whose body contains the error,
/// or `main` for the main algorithm.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TypeError {
    #[error("in {function}: cannot assign {found} to `{variable}` of type {expected}")]
    AssignmentMismatch {
        function: String,
        variable: String,
        expected: Type,
        found: Type,
        span: Span,
    },

    #[error("in {function}: argument {position} of `{callee}` expects {expected}, found {found}")]
    ArgumentMismatch {
        function: String,
        callee: String,
        position: usize,
        expected: Type,
        found: Type,
        span: Span,
    },

    #[error("in {function}: `{callee}` takes {expected} arguments, found {found}")]
    ArityMismatch {
        function: String,
        callee: String,
        expected: usize,
        found: usize,
        span: Span,
    },

    #[error("in {function}: returned {found} but the function returns {expected}")]
    ReturnMismatch {
        function: String,
        expected: Type,
        found: Type,
        span: Span,
    },

    #[error("`return` is only allowed inside a function body")]
    ReturnOutsideFunction { span: Span },

    #[error("in {function}: operand of `{operator}` must be {expected}, found {found}")]
    OperandMismatch {
        function: String,
        operator: String,
        expected: Type,
        found: Type,
        span: Span,
    },
}

impl CompileError {
    /// Stable error code, one per failure class.
    pub fn code(&self) -> &'static str {
        match self {
            CompileError::Lexical { .. } => "E_LEX",
            CompileError::Syntax { .. } => "E_SYNTAX",
            CompileError::TableConsistency { .. } => "E_TABLE",
            CompileError::Scope(_) => "E_SCOPE",
            CompileError::Type(_) => "E_TYPE",
            CompileError::MalformedArtifact { .. } => "E_ARTIFACT",
            CompileError::Config { .. } => "E_CONFIG",
            CompileError::StepBudgetExceeded { .. } => "E_BUDGET",
        }
    }

    /// Primary source location, when the error is tied to source text.
    pub fn span(&self) -> Option<Span> {
        let span = match self {
            CompileError::Lexical { span, .. } => *span,
            CompileError::Syntax { token, .. } => token.span,
            CompileError::Scope(err) => err.span(),
            CompileError::Type(err) => err.span(),
            _ => return None,
        };

        span.is_known().then_some(span)
    }

    /// Optional follow-up hint for the user.
    pub fn help(&self) -> Option<String> {
        match self {
            CompileError::Syntax { expected, .. } if !expected.is_empty() => {
                let list: Vec<String> = expected.iter().map(|t| format!("`{}`", t)).collect();
                Some(format!("expected one of {}", list.join(", ")))
            }
            CompileError::Lexical { .. } => Some(
                "names look like `V_name` / `F_name`, text like \"Word\" (capital first, at most 8 letters)"
                    .to_string(),
            ),
            CompileError::TableConsistency { .. } => {
                Some("the parsing table does not match the grammar; regenerate it".to_string())
            }
            CompileError::Scope(ScopeError::UndeclaredVariable { .. }) => Some(
                "declare the variable globally or in the local variables of an enclosing function"
                    .to_string(),
            ),
            CompileError::StepBudgetExceeded { .. } => {
                Some("raise `max_steps` or check the parsing table for cycles".to_string())
            }
            _ => None,
        }
    }
}

impl ScopeError {
    pub fn span(&self) -> Span {
        match self {
            ScopeError::UndeclaredVariable { span, .. }
            | ScopeError::UndeclaredFunction { span, .. }
            | ScopeError::Redeclared { span, .. } => *span,
        }
    }
}

impl TypeError {
    pub fn span(&self) -> Span {
        match self {
            TypeError::AssignmentMismatch { span, .. }
            | TypeError::ArgumentMismatch { span, .. }
            | TypeError::ArityMismatch { span, .. }
            | TypeError::ReturnMismatch { span, .. }
            | TypeError::ReturnOutsideFunction { span }
            | TypeError::OperandMismatch { span, .. } => *span,
        }
    }
}
