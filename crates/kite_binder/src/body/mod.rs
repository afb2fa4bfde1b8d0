//! Method body binding.
//!
//! [`MethodBodyBinder`] turns the statements of one method (or the global
//! statements of a program) into a bound tree. Every failure is reported
//! and replaced by an `Error`-typed node, so one bad expression does not
//! hide problems in its siblings.
//!
//! - `statements`: statement kinds, loops, `return`
//! - `expressions`: literals, operators, assignments, conversions
//! - `names`: identifiers, `this`, member access, ambiguous names
//! - `calls`: method calls, generic arguments, object creation

mod calls;
mod expressions;
mod names;
mod statements;

use crate::context::BindingContext;
use crate::scope::{ScopeId, ScopeKind};
use kite_semantic::{BoundReturnStatement, BoundStatement, LabelGenerator, LabelId, MethodId, MethodSymbol, TypeId};
use kite_syntax::{BlockStatement, StatementSyntax};
use std::rc::Rc;

pub struct MethodBodyBinder<'c, 't> {
    ctx: &'c mut BindingContext<'t>,
    /// `None` while binding global statements that belong to no method.
    method: Option<MethodId>,
    /// The type whose members are visible without qualification.
    owner: Option<TypeId>,
    scope: ScopeId,
    /// Active loops, innermost last: (break label, continue label).
    loops: Vec<(LabelId, LabelId)>,
    labels: LabelGenerator,
}

impl<'c, 't> MethodBodyBinder<'c, 't> {
    pub fn new(ctx: &'c mut BindingContext<'t>, method: Option<MethodId>, owner: Option<TypeId>, scope: ScopeId) -> Self {
        Self {
            ctx,
            method,
            owner,
            scope,
            loops: Vec::new(),
            labels: LabelGenerator::new(),
        }
    }

    /// Bind a method body in a block scope below the method scope.
    pub fn bind_body(&mut self, body: &BlockStatement) -> Rc<BoundStatement> {
        self.bind_block(body)
    }

    /// Bind top-level statements directly in the binder's scope, so their
    /// variables are declared in it.
    pub fn bind_global_statements(&mut self, statements: &[&StatementSyntax]) -> Rc<BoundStatement> {
        let bound = statements.iter().map(|statement| self.bind_statement(statement)).collect();
        BoundStatement::block(bound)
    }

    /// Like [`bind_global_statements`](Self::bind_global_statements), but a
    /// trailing expression statement with a value becomes the result of the
    /// script.
    pub fn bind_script_statements(&mut self, statements: &[&StatementSyntax]) -> Rc<BoundStatement> {
        let Some((StatementSyntax::Expression(last), rest)) = statements.split_last().map(|(l, r)| (*l, r)) else {
            return self.bind_global_statements(statements);
        };
        let mut bound: Vec<Rc<BoundStatement>> = rest.iter().map(|statement| self.bind_statement(statement)).collect();

        let expression = self.bind_expression(&last.expression, true);
        let builtins = self.ctx.builtins();
        let return_type = self.method_symbol().map_or(builtins.any, |method| method.return_type);
        if expression.ty == builtins.void || expression.is_error() {
            bound.push(BoundStatement::expression(expression));
        } else {
            let expression = self.convert(expression, return_type, false);
            bound.push(Rc::new(BoundStatement::Return(BoundReturnStatement { expression: Some(expression) })));
        }
        BoundStatement::block(bound)
    }

    /// The label numbering used so far, for the lowerer to continue.
    pub fn into_labels(self) -> LabelGenerator {
        self.labels
    }

    // ------------------------------------------------------------------------
    // Context helpers
    // ------------------------------------------------------------------------

    fn method_symbol(&self) -> Option<&MethodSymbol> {
        self.method.map(|method| self.ctx.symbols.method(method))
    }

    /// Whether `this` and instance members are unavailable.
    fn is_static_context(&self) -> bool {
        self.method_symbol().map_or(true, |method| method.is_static())
    }

    fn is_script_main(&self) -> bool {
        self.ctx.options.script && self.method_symbol().is_some_and(|method| method.is_entry_point())
    }

    fn push_scope(&mut self) -> ScopeId {
        let previous = self.scope;
        self.scope = self.ctx.scopes.create(ScopeKind::Block, Some(previous));
        previous
    }

    fn pop_scope(&mut self, previous: ScopeId) {
        self.scope = previous;
    }
}
