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

use std::collections::BTreeMap;
use tracing::debug;

use crate::error::{CompileError, ScopeError};
use crate::grammar::NonTerminal;
use crate::parser::{NodeId, ParseTree};
use crate::semantic::nodes::{labeled_child, leaf, unexpected_shape};
use crate::semantic::scope::{ScopeId, ScopeTree, SymbolEntry, SymbolTable, GLOBAL_SCOPE};
use crate::semantic::types::Type;
use crate::span::Span;

/// Every function takes exactly three parameters, all `num`.
const PARAMETER_SLOTS: [usize; 3] = [3, 5, 7];

/// `VTYP` positions inside `LOCVARS`; each is followed by its `VNAME`.
const LOCAL_SLOTS: [usize; 3] = [0, 3, 6];

/// The result of scope resolution.
///
/// Read-only from here on: the type checker and code generators consume
/// it together with the tree it was computed from.
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub scopes: ScopeTree,
    pub symbols: SymbolTable,

    /// Leaf node id of every declared or referenced `V`/`F` token →
    /// index of the symbol it denotes.
    pub bindings: BTreeMap<NodeId, usize>,
}

impl Analysis {
    /// The symbol a `V`/`F` leaf was bound to.
    pub fn binding(&self, leaf: NodeId) -> Option<&SymbolEntry> {
        self.bindings.get(&leaf).and_then(|index| self.symbols.get(*index))
    }
}

/// A call site whose target is looked up once every function is declared.
struct PendingCall {
    leaf: NodeId,
    scope: ScopeId,
    name: String,
    span: Span,
}

/// Everything one resolution pass accumulates. Lives exactly as long as
/// the pass; nothing is shared between compilations.
#[derive(Default)]
struct ResolverState {
    scopes: ScopeTree,
    symbols: SymbolTable,
    bindings: BTreeMap<NodeId, usize>,
    pending: Vec<PendingCall>,
    variable_count: usize,
    function_count: usize,
}

impl ResolverState {
    fn declare_variable(
        &mut self,
        tree: &ParseTree,
        vname: NodeId,
        kind: Type,
        scope: ScopeId,
    ) -> Result<(), CompileError> {
        let (leaf_id, token) = leaf(tree, vname)?;
        let name = token.lexeme.clone();

        if self.scopes.find_local_variable(&self.symbols, scope, &name).is_some() {
            return Err(ScopeError::Redeclared {
                name,
                scope,
                span: token.span,
            }
            .into());
        }

        self.variable_count += 1;
        let internal_name = format!("v{}", self.variable_count);
        debug!(name = %name, internal = %internal_name, scope, kind = %kind, "declared variable");

        let index = self.symbols.push(SymbolEntry {
            original_name: name,
            kind,
            declaring_scope: scope,
            enclosing_scope: self.scopes.parent(scope).unwrap_or(GLOBAL_SCOPE),
            internal_name,
            is_function: false,
            is_subfunction: false,
            parameters: Vec::new(),
        });

        if let Some(declared_in) = self.scopes.get_mut(scope) {
            declared_in.variables.push(index);
        }
        self.bindings.insert(leaf_id, index);

        Ok(())
    }

    /// Declares the variable `VTYP VNAME` found at `vtyp_index` and
    /// `vtyp_index + 1` under `list`.
    fn declare_typed(
        &mut self,
        tree: &ParseTree,
        list: NodeId,
        vtyp_index: usize,
        scope: ScopeId,
    ) -> Result<(), CompileError> {
        let vtyp = labeled_child(tree, list, vtyp_index, NonTerminal::VTyp)?;
        let vname = labeled_child(tree, list, vtyp_index + 1, NonTerminal::VName)?;
        let (keyword, token) = leaf(tree, vtyp)?;
        let kind = Type::from_keyword(token)
            .filter(|kind| *kind != Type::Void)
            .ok_or_else(|| unexpected_shape(tree, keyword, "`num` or `text`"))?;

        self.declare_variable(tree, vname, kind, scope)
    }

    /// Records the function declared by `decl`, opens its scope and
    /// declares its parameters there. Returns the new scope.
    fn declare_function(
        &mut self,
        tree: &ParseTree,
        decl: NodeId,
        scope: ScopeId,
    ) -> Result<ScopeId, CompileError> {
        let header = labeled_child(tree, decl, 0, NonTerminal::Header)?;
        let ftyp = labeled_child(tree, header, 0, NonTerminal::FTyp)?;
        let fname = labeled_child(tree, header, 1, NonTerminal::FName)?;

        let (keyword, type_token) = leaf(tree, ftyp)?;
        let kind = Type::from_keyword(type_token)
            .filter(|kind| *kind != Type::Text)
            .ok_or_else(|| unexpected_shape(tree, keyword, "`num` or `void`"))?;

        let (leaf_id, token) = leaf(tree, fname)?;
        let name = token.lexeme.clone();

        if self.scopes.find_local_function(&self.symbols, scope, &name).is_some() {
            return Err(ScopeError::Redeclared {
                name,
                scope,
                span: token.span,
            }
            .into());
        }

        let is_subfunction = tree
            .ancestors(decl)
            .any(|ancestor| tree.label(ancestor) == Some(NonTerminal::SubFuncs));

        let body_scope = self.scopes.open(scope, &name);
        self.function_count += 1;
        let internal_name = format!("f{}", self.function_count);

        debug!(
            name = %name,
            internal = %internal_name,
            scope = body_scope,
            parent = scope,
            is_subfunction,
            "opened function scope"
        );

        let index = self.symbols.push(SymbolEntry {
            original_name: name,
            kind,
            declaring_scope: body_scope,
            enclosing_scope: scope,
            internal_name,
            is_function: true,
            is_subfunction,
            parameters: vec![Type::Num; PARAMETER_SLOTS.len()],
        });

        if let Some(declared_in) = self.scopes.get_mut(scope) {
            declared_in.functions.push(index);
        }
        self.bindings.insert(leaf_id, index);

        for slot in PARAMETER_SLOTS {
            let vname = labeled_child(tree, header, slot, NonTerminal::VName)?;
            self.declare_variable(tree, vname, Type::Num, body_scope)?;
        }

        Ok(body_scope)
    }

    fn reference_variable(
        &mut self,
        tree: &ParseTree,
        vname: NodeId,
        scope: ScopeId,
    ) -> Result<(), CompileError> {
        let (leaf_id, token) = leaf(tree, vname)?;

        match self.scopes.lookup_variable(&self.symbols, scope, &token.lexeme) {
            Some(index) => {
                self.bindings.insert(leaf_id, index);
                Ok(())
            }
            None => Err(ScopeError::UndeclaredVariable {
                name: token.lexeme.clone(),
                scope,
                span: token.span,
            }
            .into()),
        }
    }

    fn defer_call(&mut self, tree: &ParseTree, fname: NodeId, scope: ScopeId) -> Result<(), CompileError> {
        let (leaf_id, token) = leaf(tree, fname)?;
        self.pending.push(PendingCall {
            leaf: leaf_id,
            scope,
            name: token.lexeme.clone(),
            span: token.span,
        });
        Ok(())
    }

    fn resolve_calls(&mut self) -> Result<(), CompileError> {
        for call in std::mem::take(&mut self.pending) {
            let index = self
                .scopes
                .lookup_function(&self.symbols, call.scope, &call.name)
                .ok_or(ScopeError::UndeclaredFunction {
                    name: call.name,
                    scope: call.scope,
                    span: call.span,
                })?;
            self.bindings.insert(call.leaf, index);
        }
        Ok(())
    }
}

/// Builds the scope tree and symbol table for an accepted parse tree and
/// binds every variable and function reference to its declaration.
///
/// # Traversal
/// One pre-order, left-to-right walk driven by an explicit work stack.
/// Each work item carries the scope it is in, so no scope has to be
/// "closed" on the way back up. Visiting nodes in source order is what
/// makes internal names follow declaration order:
///
/// ```text
/// GLOBVARS  → declare `VTYP VNAME` in scope 0
/// DECL      → declare the function, open its scope, declare its
///             three parameters, continue into BODY in the new scope
/// LOCVARS   → declare three `VTYP VNAME` in the current scope
/// VNAME     → (under ATOMIC or ASSIGN) resolve along the scope chain
/// FNAME     → (under CALL) resolve after the walk
/// ```
///
/// Calls are resolved last so that the main algorithm, and functions
/// declared earlier, can call functions declared later in the text.
///
/// # Errors
/// - `ScopeError::UndeclaredVariable` / `UndeclaredFunction` for a
///   reference with no visible declaration
/// - `ScopeError::Redeclared` for a name declared twice in one scope
/// - `MalformedArtifact` when the tree does not have RecSPL's shape
pub fn resolve(tree: &ParseTree) -> Result<Analysis, CompileError> {
    let mut state = ResolverState::default();
    let mut work = vec![(tree.root(), GLOBAL_SCOPE)];

    while let Some((id, scope)) = work.pop() {
        match tree.label(id) {
            Some(NonTerminal::GlobVars) if !tree.children(id).is_empty() => {
                state.declare_typed(tree, id, 0, scope)?;
            }
            Some(NonTerminal::LocVars) => {
                for slot in LOCAL_SLOTS {
                    state.declare_typed(tree, id, slot, scope)?;
                }
            }
            Some(NonTerminal::Decl) => {
                let body_scope = state.declare_function(tree, id, scope)?;
                work.push((labeled_child(tree, id, 1, NonTerminal::Body)?, body_scope));
                continue;
            }
            Some(NonTerminal::VName) => {
                let parent = tree.parent(id).and_then(|parent| tree.label(parent));
                if matches!(parent, Some(NonTerminal::Atomic) | Some(NonTerminal::Assign)) {
                    state.reference_variable(tree, id, scope)?;
                }
            }
            Some(NonTerminal::FName) => {
                let parent = tree.parent(id).and_then(|parent| tree.label(parent));
                if parent == Some(NonTerminal::Call) {
                    state.defer_call(tree, id, scope)?;
                }
            }
            _ => {}
        }

        work.extend(tree.children(id).iter().rev().map(|child| (*child, scope)));
    }

    state.resolve_calls()?;

    debug!(
        scopes = state.scopes.len(),
        variables = state.variable_count,
        functions = state.function_count,
        "scope resolution complete"
    );

    Ok(Analysis {
        scopes: state.scopes,
        symbols: state.symbols,
        bindings: state.bindings,
    })
}
