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


use crate::error::CompileError;

/// Renders human-friendly, compiler-style diagnostics for RecSPL errors.
///
/// This printer:
/// - Formats errors with their stable code and message
/// - Adds file/line/column information when the error has a source span
/// - Displays the offending source line with a caret (`^`) under it
/// - Optionally shows a helpful follow-up hint
///
/// Errors without a span (broken tables, malformed artifacts, exhausted
/// step budgets) render as a header plus help only.
pub struct DiagnosticPrinter {
    /// Full source text the error refers to.
    source: String,

    /// Display name of the source (e.g. `prog.txt`).
    file_name: String,
}

impl DiagnosticPrinter {
    /// Creates a new diagnostic printer for a given source file.
    ///
    /// # Arguments
    /// - `file_name` → The name shown in the `-->` line
    /// - `source` → The full source text of that file
    pub fn new(file_name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            source: source.into(),
        }
    }

    /// Builds the full report for `error`.
    ///
    /// # Output Example
    /// ```text
    /// error[E_TYPE]: in main: cannot assign num to `V_x` of type text
    ///   --> prog.txt:1:25
    ///    |
    ///  1 | main text V_x , begin V_x = 1 ; end
    ///    |                         ^
    /// ```
    pub fn render(&self, error: &CompileError) -> String {
        let mut out = String::new();

        out.push_str(&format!("error[{}]: {}\n", error.code(), error));

        if let Some(span) = error.span() {
            let src_line = self
                .source
                .lines()
                .nth(span.line.saturating_sub(1))
                .unwrap_or("");

            out.push_str(&format!("  --> {}:{}\n", self.file_name, span));
            out.push_str("   |\n");
            out.push_str(&format!("{:>3} | {}\n", span.line, src_line));
            out.push_str(&format!("   | {}^\n", " ".repeat(span.column)));
        }

        if let Some(help) = error.help() {
            out.push_str(&format!("\nhelp: {}\n", help));
        }

        out
    }

    /// Prints the report for `error` to stderr.
    pub fn print(&self, error: &CompileError) {
        eprint!("{}", self.render(error));
    }
}
