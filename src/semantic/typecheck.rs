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

use tracing::debug;

use crate::error::{CompileError, ScopeError, TypeError};
use crate::grammar::NonTerminal;
use crate::lexer::TokenKind;
use crate::parser::{NodeId, ParseTree};
use crate::semantic::nodes::{child, labeled_child, leaf, unexpected_shape};
use crate::semantic::resolver::Analysis;
use crate::semantic::scope::{ScopeId, SymbolEntry, GLOBAL_SCOPE};
use crate::semantic::types::Type;
use crate::span::Span;

/// `ATOMIC` positions inside `CALL`.
const ARGUMENT_SLOTS: [usize; 3] = [2, 4, 6];

/// The function body currently being checked.
struct FunctionContext {
    name: String,
    scope: ScopeId,
    /// `None` for the main algorithm, which cannot return.
    returns: Option<Type>,
}

/// Verifies the `num`/`text` typing rules over a resolved tree.
///
/// Each construct is checked exactly once, at the node that owns it:
///
/// ```text
/// COMMAND → print / return operands
/// ASSIGN  → target type vs. `input` or TERM type
/// CALL    → callee, arity and argument types
/// SIMPLE  → comparison operands
/// OP      → operator arguments that are ATOMICs (nested OPs are
///           checked at their own node and are always `num`)
/// ```
///
/// The walk uses an explicit stack like the resolver does; the first
/// violation ends the check.
pub struct TypeChecker<'a> {
    tree: &'a ParseTree,
    analysis: &'a Analysis,
    contexts: Vec<FunctionContext>,
}

/// Runs the type checker over `tree`.
pub fn check(tree: &ParseTree, analysis: &Analysis) -> Result<(), CompileError> {
    TypeChecker::new(tree, analysis).run()
}

impl<'a> TypeChecker<'a> {
    pub fn new(tree: &'a ParseTree, analysis: &'a Analysis) -> Self {
        Self {
            tree,
            analysis,
            contexts: vec![FunctionContext {
                name: "main".to_string(),
                scope: GLOBAL_SCOPE,
                returns: None,
            }],
        }
    }

    pub fn run(mut self) -> Result<(), CompileError> {
        let tree = self.tree;
        let mut work = vec![(tree.root(), 0usize)];

        while let Some((id, context)) = work.pop() {
            match tree.label(id) {
                Some(NonTerminal::Decl) => {
                    let inner = self.enter_function(id)?;
                    work.push((labeled_child(tree, id, 1, NonTerminal::Body)?, inner));
                    continue;
                }
                Some(NonTerminal::Command) => self.check_command(id, context)?,
                Some(NonTerminal::Assign) => self.check_assign(id, context)?,
                Some(NonTerminal::Call) => self.check_call(id, context)?,
                Some(NonTerminal::Simple) => self.check_simple(id, context)?,
                Some(NonTerminal::Op) => self.check_op(id, context)?,
                _ => {}
            }

            work.extend(tree.children(id).iter().rev().map(|child| (*child, context)));
        }

        debug!(functions = self.contexts.len() - 1, "type check complete");
        Ok(())
    }

    fn enter_function(&mut self, decl: NodeId) -> Result<usize, CompileError> {
        let header = labeled_child(self.tree, decl, 0, NonTerminal::Header)?;
        let fname = labeled_child(self.tree, header, 1, NonTerminal::FName)?;
        let entry = self.function(fname, GLOBAL_SCOPE)?;

        debug!(function = %entry.original_name, returns = %entry.kind, "checking function");

        self.contexts.push(FunctionContext {
            name: entry.original_name.clone(),
            scope: entry.declaring_scope,
            returns: Some(entry.kind),
        });
        Ok(self.contexts.len() - 1)
    }

    fn function_name(&self, context: usize) -> String {
        self.contexts
            .get(context)
            .map(|c| c.name.clone())
            .unwrap_or_default()
    }

    fn scope_of(&self, context: usize) -> ScopeId {
        self.contexts.get(context).map(|c| c.scope).unwrap_or(GLOBAL_SCOPE)
    }

    /// The variable a `VNAME` node was bound to by the resolver.
    fn variable(&self, vname: NodeId, scope: ScopeId) -> Result<(&'a SymbolEntry, Span), CompileError> {
        let (leaf_id, token) = leaf(self.tree, vname)?;
        let analysis = self.analysis;

        match analysis.binding(leaf_id) {
            Some(entry) if !entry.is_function => Ok((entry, token.span)),
            _ => Err(ScopeError::UndeclaredVariable {
                name: token.lexeme.clone(),
                scope,
                span: token.span,
            }
            .into()),
        }
    }

    /// The function an `FNAME` node was bound to by the resolver.
    fn function(&self, fname: NodeId, scope: ScopeId) -> Result<&'a SymbolEntry, CompileError> {
        let (leaf_id, token) = leaf(self.tree, fname)?;
        let analysis = self.analysis;

        match analysis.binding(leaf_id) {
            Some(entry) if entry.is_function => Ok(entry),
            _ => Err(ScopeError::UndeclaredFunction {
                name: token.lexeme.clone(),
                scope,
                span: token.span,
            }
            .into()),
        }
    }

    /// Type and location of an `ATOMIC`: a bound variable or a literal.
    fn atomic_type(&self, atomic: NodeId, context: usize) -> Result<(Type, Span), CompileError> {
        let inner = child(self.tree, atomic, 0)?;

        match self.tree.label(inner) {
            Some(NonTerminal::VName) => {
                let (entry, span) = self.variable(inner, self.scope_of(context))?;
                Ok((entry.kind, span))
            }
            Some(NonTerminal::Const) => {
                let (literal, token) = leaf(self.tree, inner)?;
                let kind = Type::of_literal(token)
                    .ok_or_else(|| unexpected_shape(self.tree, literal, "a number or string"))?;
                Ok((kind, token.span))
            }
            _ => Err(unexpected_shape(self.tree, inner, "VNAME or CONST")),
        }
    }

    fn check_command(&self, command: NodeId, context: usize) -> Result<(), CompileError> {
        let first = child(self.tree, command, 0)?;
        let Some(keyword) = self.tree.token(first) else {
            return Ok(());
        };

        match keyword.kind {
            TokenKind::Print => {
                self.atomic_type(child(self.tree, command, 1)?, context)?;
            }
            TokenKind::Return => {
                let (found, _) = self.atomic_type(child(self.tree, command, 1)?, context)?;
                let returns = self.contexts.get(context).and_then(|c| c.returns);

                match returns {
                    None => {
                        return Err(TypeError::ReturnOutsideFunction { span: keyword.span }.into());
                    }
                    Some(expected) if expected != found => {
                        return Err(TypeError::ReturnMismatch {
                            function: self.function_name(context),
                            expected,
                            found,
                            span: keyword.span,
                        }
                        .into());
                    }
                    Some(_) => {}
                }
            }
            _ => {}
        }

        Ok(())
    }

    fn check_assign(&self, assign: NodeId, context: usize) -> Result<(), CompileError> {
        let vname = labeled_child(self.tree, assign, 0, NonTerminal::VName)?;
        let (target, span) = self.variable(vname, self.scope_of(context))?;
        let operator = child(self.tree, assign, 1)?;

        let found = match self.tree.token(operator).map(|token| token.kind) {
            Some(TokenKind::InputOp) => Type::Num,
            Some(TokenKind::Assign) => self.term_type(child(self.tree, assign, 2)?, context)?,
            _ => return Err(unexpected_shape(self.tree, operator, "`<` or `=`")),
        };

        if found != target.kind {
            return Err(TypeError::AssignmentMismatch {
                function: self.function_name(context),
                variable: target.original_name.clone(),
                expected: target.kind,
                found,
                span,
            }
            .into());
        }

        Ok(())
    }

    /// The type a `TERM` produces. Calls and operator applications are
    /// checked internally when the walk reaches their own nodes.
    fn term_type(&self, term: NodeId, context: usize) -> Result<Type, CompileError> {
        let inner = child(self.tree, term, 0)?;

        match self.tree.label(inner) {
            Some(NonTerminal::Atomic) => Ok(self.atomic_type(inner, context)?.0),
            Some(NonTerminal::Call) => {
                let fname = labeled_child(self.tree, inner, 0, NonTerminal::FName)?;
                Ok(self.function(fname, self.scope_of(context))?.kind)
            }
            Some(NonTerminal::Op) => Ok(Type::Num),
            _ => Err(unexpected_shape(self.tree, inner, "ATOMIC, CALL or OP")),
        }
    }

    fn check_call(&self, call: NodeId, context: usize) -> Result<(), CompileError> {
        let fname = labeled_child(self.tree, call, 0, NonTerminal::FName)?;
        let callee = self.function(fname, self.scope_of(context))?;
        let (_, name_token) = leaf(self.tree, fname)?;

        if callee.parameters.len() != ARGUMENT_SLOTS.len() {
            return Err(TypeError::ArityMismatch {
                function: self.function_name(context),
                callee: callee.original_name.clone(),
                expected: callee.parameters.len(),
                found: ARGUMENT_SLOTS.len(),
                span: name_token.span,
            }
            .into());
        }

        for (position, (slot, expected)) in ARGUMENT_SLOTS.iter().zip(&callee.parameters).enumerate() {
            let atomic = labeled_child(self.tree, call, *slot, NonTerminal::Atomic)?;
            let (found, span) = self.atomic_type(atomic, context)?;

            if found != *expected {
                return Err(TypeError::ArgumentMismatch {
                    function: self.function_name(context),
                    callee: callee.original_name.clone(),
                    position: position + 1,
                    expected: *expected,
                    found,
                    span,
                }
                .into());
            }
        }

        Ok(())
    }

    /// `eq` compares any two operands of one type; every other operator
    /// in a comparison wants `num` on both sides.
    fn check_simple(&self, simple: NodeId, context: usize) -> Result<(), CompileError> {
        let binop = labeled_child(self.tree, simple, 0, NonTerminal::BinOp)?;
        let (_, operator) = leaf(self.tree, binop)?;
        let (left, _) = self.atomic_type(labeled_child(self.tree, simple, 2, NonTerminal::Atomic)?, context)?;
        let (right, right_span) =
            self.atomic_type(labeled_child(self.tree, simple, 4, NonTerminal::Atomic)?, context)?;

        let mismatch = |expected: Type, found: Type, span: Span| {
            CompileError::from(TypeError::OperandMismatch {
                function: self.function_name(context),
                operator: operator.lexeme.clone(),
                expected,
                found,
                span,
            })
        };

        if operator.kind == TokenKind::Eq {
            if left != right {
                return Err(mismatch(left, right, right_span));
            }
            return Ok(());
        }

        if left != Type::Num {
            return Err(mismatch(Type::Num, left, operator.span));
        }
        if right != Type::Num {
            return Err(mismatch(Type::Num, right, right_span));
        }

        Ok(())
    }

    /// Every `ATOMIC` argument of an operator must be `num`.
    fn check_op(&self, op: NodeId, context: usize) -> Result<(), CompileError> {
        let (_, operator) = leaf(self.tree, child(self.tree, op, 0)?)?;

        for arg in self.tree.children(op) {
            if self.tree.label(*arg) != Some(NonTerminal::Arg) {
                continue;
            }

            let inner = child(self.tree, *arg, 0)?;
            if self.tree.label(inner) != Some(NonTerminal::Atomic) {
                continue;
            }

            let (found, span) = self.atomic_type(inner, context)?;
            if found != Type::Num {
                return Err(TypeError::OperandMismatch {
                    function: self.function_name(context),
                    operator: operator.lexeme.clone(),
                    expected: Type::Num,
                    found,
                    span,
                }
                .into());
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::{Grammar, ParsingTable};
    use crate::lexer::tokenize;
    use crate::parser::ShiftReduceEngine;
    use crate::semantic::resolver::resolve;

    fn typecheck(source: &str) -> Result<(), CompileError> {
        let tokens = tokenize(source)?;
        let engine = ShiftReduceEngine::new(Grammar::recspl(), ParsingTable::recspl()?);
        let tree = engine.parse(&tokens)?;
        let analysis = resolve(&tree)?;
        check(&tree, &analysis)
    }

    /// Wraps `algo` as the body of `num F_f ( V_a , V_b , V_c )` with
    /// locals `num V_n`, `text V_t`, `num V_m`.
    fn in_function(ftyp: &str, algo: &str) -> String {
        format!(
            "main begin end {} F_f ( V_a , V_b , V_c ) \
             {{ num V_n , text V_t , num V_m , begin {} end }} end",
            ftyp, algo
        )
    }

    #[test]
    fn well_typed_programs_pass() {
        let programs = [
            "main num V_x , begin V_x = 1 ; end",
            "main text V_s , begin V_s = \"Hello\" ; print V_s ; end",
            "main num V_x , begin V_x < input ; V_x = add ( V_x , mul ( 2 , V_x ) ) ; end",
            "main text V_s , begin if eq ( V_s , \"Hi\" ) then begin halt ; end else begin skip ; end ; end",
            "main num V_x , begin if and ( grt ( V_x , 1 ) , eq ( V_x , 4 ) ) then begin end else begin end ; end",
            "main num V_x , begin if not ( eq ( V_x , 4 ) ) then begin end else begin end ; end",
        ];

        for program in programs {
            assert_eq!(typecheck(program), Ok(()), "{}", program);
        }
        assert_eq!(typecheck(&in_function("num", "V_n = V_a ; return V_n ;")), Ok(()));
    }

    #[test]
    fn assignment_of_the_wrong_type_fails() {
        let err = typecheck("main text V_x , begin V_x = 1 ; end").unwrap_err();

        assert_eq!(
            err,
            CompileError::Type(TypeError::AssignmentMismatch {
                function: "main".into(),
                variable: "V_x".into(),
                expected: Type::Text,
                found: Type::Num,
                span: Span::new(1, 22),
            })
        );
    }

    #[test]
    fn input_needs_a_numeric_target() {
        let err = typecheck("main text V_x , begin V_x < input ; end").unwrap_err();
        assert!(matches!(err, CompileError::Type(TypeError::AssignmentMismatch { found: Type::Num, .. })));
    }

    #[test]
    fn operators_only_take_numbers() {
        let err = typecheck("main text V_s , num V_x , begin V_x = sqrt ( V_s ) ; end").unwrap_err();
        assert!(matches!(
            err,
            CompileError::Type(TypeError::OperandMismatch { ref operator, found: Type::Text, .. }) if operator == "sqrt"
        ));

        let nested = "main text V_s , num V_x , begin V_x = add ( 1 , sub ( V_s , 2 ) ) ; end";
        assert!(matches!(
            typecheck(nested).unwrap_err(),
            CompileError::Type(TypeError::OperandMismatch { ref operator, .. }) if operator == "sub"
        ));
    }

    #[test]
    fn comparisons_check_their_operands() {
        let eq = "main text V_s , begin if eq ( V_s , 1 ) then begin end else begin end ; end";
        assert!(matches!(
            typecheck(eq).unwrap_err(),
            CompileError::Type(TypeError::OperandMismatch { expected: Type::Text, found: Type::Num, .. })
        ));

        let grt = "main text V_s , begin if grt ( V_s , V_s ) then begin end else begin end ; end";
        assert!(matches!(
            typecheck(grt).unwrap_err(),
            CompileError::Type(TypeError::OperandMismatch { expected: Type::Num, .. })
        ));
    }

    #[test]
    fn call_arguments_must_be_numbers() {
        let source = "main text V_s , begin F_f ( 1 , V_s , 3 ) ; end \
            void F_f ( V_a , V_b , V_c ) { num V_n , num V_o , num V_p , begin skip ; end } end";

        assert!(matches!(
            typecheck(source).unwrap_err(),
            CompileError::Type(TypeError::ArgumentMismatch { position: 2, found: Type::Text, .. })
        ));
    }

    #[test]
    fn void_calls_have_no_value() {
        let source = "main num V_x , begin V_x = F_f ( 1 , 2 , 3 ) ; end \
            void F_f ( V_a , V_b , V_c ) { num V_n , num V_o , num V_p , begin skip ; end } end";

        assert!(matches!(
            typecheck(source).unwrap_err(),
            CompileError::Type(TypeError::AssignmentMismatch { found: Type::Void, .. })
        ));
    }

    #[test]
    fn returns_must_match_the_function() {
        let text_return = typecheck(&in_function("num", "return V_t ;")).unwrap_err();
        assert!(matches!(
            text_return,
            CompileError::Type(TypeError::ReturnMismatch { ref function, expected: Type::Num, found: Type::Text, .. })
                if function == "F_f"
        ));

        let void_return = typecheck(&in_function("void", "return V_n ;")).unwrap_err();
        assert!(matches!(
            void_return,
            CompileError::Type(TypeError::ReturnMismatch { expected: Type::Void, .. })
        ));

        let main_return = typecheck("main num V_x , begin return V_x ; end").unwrap_err();
        assert!(matches!(main_return, CompileError::Type(TypeError::ReturnOutsideFunction { .. })));
    }

    #[test]
    fn branches_check_both_arms() {
        let source = "main text V_s , begin if eq ( 1 , 1 ) then begin skip ; end \
            else begin V_s = 2 ; end ; end";
        assert!(matches!(typecheck(source).unwrap_err(), CompileError::Type(TypeError::AssignmentMismatch { .. })));
    }
}
