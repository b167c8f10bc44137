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

use serde::Serialize;

use crate::error::CompileError;
use crate::semantic::types::Type;

/// Index of a scope in its `ScopeTree`.
pub type ScopeId = usize;

/// The program-wide scope: global variables, the main algorithm and every
/// top-level function name live here.
pub const GLOBAL_SCOPE: ScopeId = 0;

/// One lexical scope.
///
/// Every function declaration opens exactly one scope whose parent is the
/// scope the declaration appears in.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scope {
    pub id: ScopeId,
    pub parent: Option<ScopeId>,

    /// Name of the function that opened this scope (`None` for global).
    pub owner: Option<String>,

    /// Symbol-table indices of the variables declared here, in order.
    pub variables: Vec<usize>,

    /// Symbol-table indices of the functions declared directly in this
    /// scope (i.e. whose `enclosing_scope` is this scope).
    pub functions: Vec<usize>,
}

/// The nested scopes of one program, rooted at `GLOBAL_SCOPE`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScopeTree {
    scopes: Vec<Scope>,
}

impl Default for ScopeTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeTree {
    /// A tree holding only the global scope.
    pub fn new() -> Self {
        Self {
            scopes: vec![Scope {
                id: GLOBAL_SCOPE,
                parent: None,
                owner: None,
                variables: Vec::new(),
                functions: Vec::new(),
            }],
        }
    }

    /// Opens a fresh child scope of `parent` and returns its id.
    pub fn open(&mut self, parent: ScopeId, owner: &str) -> ScopeId {
        let id = self.scopes.len();
        self.scopes.push(Scope {
            id,
            parent: Some(parent),
            owner: Some(owner.to_string()),
            variables: Vec::new(),
            functions: Vec::new(),
        });
        id
    }

    pub fn get(&self, id: ScopeId) -> Option<&Scope> {
        self.scopes.get(id)
    }

    pub(crate) fn get_mut(&mut self, id: ScopeId) -> Option<&mut Scope> {
        self.scopes.get_mut(id)
    }

    pub fn scopes(&self) -> &[Scope] {
        &self.scopes
    }

    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    pub fn parent(&self, id: ScopeId) -> Option<ScopeId> {
        self.get(id).and_then(|scope| scope.parent)
    }

    /// `id` followed by its ancestors, innermost first, ending at global.
    pub fn chain(&self, id: ScopeId) -> impl Iterator<Item = ScopeId> + '_ {
        std::iter::successors(self.get(id).map(|scope| scope.id), move |current| {
            self.parent(*current)
        })
    }

    /// Resolves a variable name from `scope` outwards; the first match wins.
    pub fn lookup_variable(&self, symbols: &SymbolTable, scope: ScopeId, name: &str) -> Option<usize> {
        self.chain(scope).find_map(|id| find_named(symbols, &self.scopes[id].variables, name))
    }

    /// A variable declared directly in `scope`, ignoring enclosing scopes.
    pub fn find_local_variable(&self, symbols: &SymbolTable, scope: ScopeId, name: &str) -> Option<usize> {
        self.get(scope).and_then(|s| find_named(symbols, &s.variables, name))
    }

    /// A function declared directly in `scope`, ignoring enclosing scopes.
    pub fn find_local_function(&self, symbols: &SymbolTable, scope: ScopeId, name: &str) -> Option<usize> {
        self.get(scope).and_then(|s| find_named(symbols, &s.functions, name))
    }

    /// Resolves a function name as seen from `scope`.
    ///
    /// A function is visible when the scope it is declared in lies on the
    /// caller's chain, which admits the caller itself, its siblings, its
    /// direct sub-functions, its ancestors and their siblings.
    pub fn lookup_function(&self, symbols: &SymbolTable, scope: ScopeId, name: &str) -> Option<usize> {
        self.chain(scope).find_map(|id| find_named(symbols, &self.scopes[id].functions, name))
    }
}

fn find_named(symbols: &SymbolTable, indices: &[usize], name: &str) -> Option<usize> {
    indices
        .iter()
        .copied()
        .find(|index| symbols.get(*index).map(|entry| entry.original_name.as_str()) == Some(name))
}

/// One declared name.
///
/// For a variable, `declaring_scope` is the scope it is declared in and
/// `enclosing_scope` that scope's parent (`GLOBAL_SCOPE` for globals).
/// For a function, `declaring_scope` is the scope its own body opens and
/// `enclosing_scope` the scope its declaration appears in.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SymbolEntry {
    pub original_name: String,
    pub kind: Type,
    pub declaring_scope: ScopeId,
    pub enclosing_scope: ScopeId,
    /// `v1, v2, …` for variables, `f1, f2, …` for functions.
    pub internal_name: String,
    pub is_function: bool,
    /// Declared inside another function's sub-function region.
    pub is_subfunction: bool,
    /// Formal parameter types, in order. Empty for variables.
    pub parameters: Vec<Type>,
}

/// The flat, declaration-ordered list of every symbol in a program.
///
/// Entries are appended once during resolution and never changed.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SymbolTable {
    entries: Vec<SymbolEntry>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `entry` and returns its index.
    pub(crate) fn push(&mut self, entry: SymbolEntry) -> usize {
        self.entries.push(entry);
        self.entries.len() - 1
    }

    pub fn get(&self, index: usize) -> Option<&SymbolEntry> {
        self.entries.get(index)
    }

    pub fn entries(&self) -> &[SymbolEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn variables(&self) -> impl Iterator<Item = &SymbolEntry> {
        self.entries.iter().filter(|entry| !entry.is_function)
    }

    pub fn functions(&self) -> impl Iterator<Item = &SymbolEntry> {
        self.entries.iter().filter(|entry| entry.is_function)
    }

    /// Finds an entry by its internal name.
    pub fn by_internal_name(&self, internal: &str) -> Option<&SymbolEntry> {
        self.entries.iter().find(|entry| entry.internal_name == internal)
    }

    /// The table as a JSON array of entries, in declaration order.
    ///
    /// This is the form handed to intermediate-code generators.
    pub fn to_json(&self) -> Result<String, CompileError> {
        serde_json::to_string_pretty(&self.entries).map_err(|err| {
            CompileError::MalformedArtifact {
                line: None,
                detail: err.to_string(),
            }
        })
    }

    /// Plain-text listing, one row per entry, in declaration order.
    ///
    /// ```text
    /// NAME  TYPE  SCOPE  INTERNAL  ENCLOSING  SUBFUNCTION  FUNCTION
    /// V_x   num   0      v1        0          false        false
    /// ```
    pub fn dump(&self) -> String {
        let width = self
            .entries
            .iter()
            .map(|entry| entry.original_name.len())
            .max()
            .unwrap_or(0)
            .max("NAME".len());

        let mut out = format!(
            "{:<width$}  TYPE  SCOPE  INTERNAL  ENCLOSING  SUBFUNCTION  FUNCTION\n",
            "NAME",
            width = width
        );

        for entry in &self.entries {
            out.push_str(&format!(
                "{:<width$}  {:<4}  {:<5}  {:<8}  {:<9}  {:<11}  {}\n",
                entry.original_name,
                entry.kind.to_string(),
                entry.declaring_scope,
                entry.internal_name,
                entry.enclosing_scope,
                entry.is_subfunction,
                entry.is_function,
                width = width
            ));
        }

        out
    }
}
