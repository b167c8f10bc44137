/*
 * ==========================================================================
 * RECSPL - Table-Driven Compiler Front End
 * ==========================================================================
 *
 * File:     lib.rs
 * Purpose:  Crate root for the RecSPL compiler front end.
 *
 * Stages, leaf-first:
 *   - lexer     source text → tokens
 *   - grammar   rules and the ACTION/GOTO table
 *   - parser    tokens → parse tree (shift-reduce engine)
 *   - semantic  scopes, symbol table, type checking
 *
 * `compiler` chains them; every stage is also usable on its own.
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

pub mod compiler;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod grammar;
pub mod lexer;
pub mod parser;
pub mod semantic;
pub mod span;

pub use compiler::{compile, compile_tokens, compile_tokens_with, compile_with, Compilation};
pub use config::CompilerConfig;
pub use diagnostics::DiagnosticPrinter;
pub use error::{CompileError, ScopeError, TypeError};
pub use span::Span;
