/*
 * ==========================================================================
 * RECSPL - Table-Driven Compiler Front End
 * ==========================================================================
 *
 * File:     lexer/mod.rs
 * Purpose:  Root module for the RecSPL scanner.
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

/// Token and token-kind definitions shared by every later stage.
pub mod token;

/// Reserved words and punctuation tables.
pub mod keywords;

/// The regex-driven scanner itself.
pub mod lexer;

pub use lexer::tokenize;
pub use token::{tokens_from_json, Token, TokenKind};
