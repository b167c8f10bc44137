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

//! Shape-checked accessors the semantic passes use to read parse trees.
//!
//! Trees built by the engine always have the shapes the grammar promises,
//! but trees read back from JSON or built from a custom grammar may not,
//! so every accessor reports a mismatch instead of panicking.

use crate::error::CompileError;
use crate::grammar::NonTerminal;
use crate::lexer::Token;
use crate::parser::{NodeId, ParseTree};

pub(crate) fn unexpected_shape(tree: &ParseTree, id: NodeId, what: &str) -> CompileError {
    let found = match (tree.label(id), tree.token(id)) {
        (Some(label), _) => label.to_string(),
        (None, Some(token)) => format!("`{}`", token),
        (None, None) => "nothing".to_string(),
    };

    CompileError::MalformedArtifact {
        line: None,
        detail: format!("expected {} at node {}, found {}", what, id, found),
    }
}

/// The `index`-th child of `id`.
pub(crate) fn child(tree: &ParseTree, id: NodeId, index: usize) -> Result<NodeId, CompileError> {
    tree.child(id, index)
        .ok_or_else(|| unexpected_shape(tree, id, &format!("a child at position {}", index)))
}

/// The `index`-th child of `id`, which must be labeled `label`.
pub(crate) fn labeled_child(
    tree: &ParseTree,
    id: NodeId,
    index: usize,
    label: NonTerminal,
) -> Result<NodeId, CompileError> {
    let found = child(tree, id, index)?;
    if tree.label(found) == Some(label) {
        Ok(found)
    } else {
        Err(unexpected_shape(tree, found, label.name()))
    }
}

/// The leaf under a single-terminal nonterminal such as `VNAME`, `FNAME`,
/// `VTYP` or `BINOP`, with its node id.
pub(crate) fn leaf(tree: &ParseTree, id: NodeId) -> Result<(NodeId, &Token), CompileError> {
    let leaf = child(tree, id, 0)?;
    tree.token(leaf)
        .map(|token| (leaf, token))
        .ok_or_else(|| unexpected_shape(tree, leaf, "a token"))
}
