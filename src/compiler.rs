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

use tracing::info;

use crate::config::CompilerConfig;
use crate::error::CompileError;
use crate::grammar::{Grammar, ParsingTable};
use crate::lexer::{tokenize, Token};
use crate::parser::{ParseTree, ShiftReduceEngine};
use crate::semantic::{self, Analysis};

/// Everything the front end produces for one accepted program.
///
/// This is what downstream code generators consume: the tree for the
/// program's structure, the analysis for names, scopes and bindings.
#[derive(Debug, Clone)]
pub struct Compilation {
    pub tokens: Vec<Token>,
    pub tree: ParseTree,
    pub analysis: Analysis,
}

/// Compiles RecSPL source text with the default configuration.
///
/// # Pipeline
/// ```text
/// source → tokenize → ShiftReduceEngine → resolve → check → Compilation
/// ```
pub fn compile(source: &str) -> Result<Compilation, CompileError> {
    compile_with(source, &CompilerConfig::default())
}

pub fn compile_with(source: &str, config: &CompilerConfig) -> Result<Compilation, CompileError> {
    let tokens = tokenize(source)?;
    compile_tokens_with(tokens, config)
}

/// Compiles an externally scanned token stream (ending in `EOF`).
pub fn compile_tokens(tokens: Vec<Token>) -> Result<Compilation, CompileError> {
    compile_tokens_with(tokens, &CompilerConfig::default())
}

pub fn compile_tokens_with(
    tokens: Vec<Token>,
    config: &CompilerConfig,
) -> Result<Compilation, CompileError> {
    let engine = ShiftReduceEngine::new(Grammar::recspl(), ParsingTable::recspl()?)
        .with_config(config.clone());

    let tree = engine.parse(&tokens)?;
    let analysis = semantic::resolve(&tree)?;
    semantic::check(&tree, &analysis)?;

    info!(
        tokens = tokens.len(),
        nodes = tree.len(),
        symbols = analysis.symbols.len(),
        "compilation succeeded"
    );

    Ok(Compilation {
        tokens,
        tree,
        analysis,
    })
}
