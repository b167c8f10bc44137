/*
 * ==========================================================================
 * RECSPL - Table-Driven Compiler Front End
 * ==========================================================================
 *
 * File:     semantic/mod.rs
 * Purpose:  Semantic passes over accepted parse trees.
 *
 * This module wires together:
 *   - The num / text / void type model
 *   - Scopes and the program-wide symbol table
 *   - The scope & symbol resolver
 *   - The type checker
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

/// `Type`: num, text, void.
pub mod types;

/// Scope tree, symbol entries and scope-chain lookups.
pub mod scope;

/// Declaration walk, internal naming and reference binding.
pub mod resolver;

/// Typing rules for assignments, calls, conditions and returns.
pub mod typecheck;

mod nodes;

pub use resolver::{resolve, Analysis};
pub use scope::{Scope, ScopeId, ScopeTree, SymbolEntry, SymbolTable, GLOBAL_SCOPE};
pub use typecheck::{check, TypeChecker};
pub use types::Type;
