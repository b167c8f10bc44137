/*
 * ==========================================================================
 * RECSPL - Table-Driven Compiler Front End
 * ==========================================================================
 *
 * File:     parser/mod.rs
 * Purpose:  Table-driven parsing into a concrete syntax tree.
 *
 * This module wires together:
 *   - The arena that stores parse trees
 *   - The shift-reduce engine that builds them
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

/// Parse tree arena:
/// - Root / inner / leaf nodes addressed by `NodeId`
/// - Traversals, dumps and JSON (de)serialization
pub mod tree;

/// Shift-reduce engine:
/// - Three lock-step stacks driven by ACTION/GOTO
/// - Token → lookup-symbol mapping
pub mod engine;

pub use engine::{lookup_symbol, ShiftReduceEngine};
pub use tree::{Node, NodeId, NodeKind, ParseTree};
