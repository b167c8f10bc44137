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

use crate::error::CompileError;

/// Knobs for a single compilation.
///
/// The config is handed to the engine and pipeline explicitly; nothing is
/// read from the environment.
///
/// # JSON Form
/// ```text
/// { "max_steps": 10000, "trace_actions": true }
/// ```
///
/// Missing fields take their defaults, so `{}` is a valid config.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompilerConfig {
    /// Upper bound on the number of shift/reduce actions the engine may
    /// perform. `None` means unbounded.
    pub max_steps: Option<usize>,

    /// Emit one `trace!` event per engine action.
    pub trace_actions: bool,
}

impl CompilerConfig {
    /// Parses a config from JSON text.
    ///
    /// # Errors
    /// `CompileError::Config` when the text is not valid JSON or names a
    /// field this struct does not have.
    pub fn from_json(text: &str) -> Result<Self, CompileError> {
        serde_json::from_str(text).map_err(|err| CompileError::Config {
            detail: err.to_string(),
        })
    }

    pub fn with_max_steps(mut self, limit: usize) -> Self {
        self.max_steps = Some(limit);
        self
    }

    pub fn with_trace_actions(mut self, enabled: bool) -> Self {
        self.trace_actions = enabled;
        self
    }
}
