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

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::lexer::{Token, TokenKind};

/// The RecSPL value types.
///
/// Variables are `num` or `text`. Functions return `num` or nothing
/// (`void`); `void` is never the type of a variable or constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Type {
    Num,
    Text,
    Void,
}

impl Type {
    /// The type named by a `VTYP`/`FTYP` keyword token.
    pub fn from_keyword(token: &Token) -> Option<Type> {
        match token.kind {
            TokenKind::Num => Some(Type::Num),
            TokenKind::Text => Some(Type::Text),
            TokenKind::Void => Some(Type::Void),
            _ => None,
        }
    }

    /// The type of a `CONST` literal token.
    pub fn of_literal(token: &Token) -> Option<Type> {
        match token.kind {
            TokenKind::Number => Some(Type::Num),
            TokenKind::String => Some(Type::Text),
            _ => None,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Type::Num => "num",
            Type::Text => "text",
            Type::Void => "void",
        };
        f.write_str(name)
    }
}
