use super::MethodBodyBinder;
use kite_diagnostics::messages::*;
use kite_semantic::{
    BoundExpression, BoundExpressionKind, BoundForStatement, BoundIfStatement, BoundReturnStatement, BoundStatement,
    BoundVariableDeclaration, BoundWhileStatement, LabelId, VariableSymbol,
};
use kite_core::text::Location;
use kite_syntax::{
    BlockStatement, ExpressionStatement, ForStatement, IfStatement, LiteralValue, ReturnStatement, StatementSyntax,
    VariableDeclaration, WhileStatement,
};
use std::rc::Rc;

impl MethodBodyBinder<'_, '_> {
    pub(super) fn bind_statement(&mut self, statement: &StatementSyntax) -> Rc<BoundStatement> {
        match statement {
            StatementSyntax::Block(node) => self.bind_block(node),
            StatementSyntax::Expression(node) => self.bind_expression_statement(node),
            StatementSyntax::VariableDeclaration(node) => self.bind_variable_declaration(node),
            StatementSyntax::If(node) => self.bind_if(node),
            StatementSyntax::While(node) => self.bind_while(node),
            StatementSyntax::For(node) => self.bind_for(node),
            StatementSyntax::Break(location) => self.bind_loop_jump(*location, "break"),
            StatementSyntax::Continue(location) => self.bind_loop_jump(*location, "continue"),
            StatementSyntax::Return(node) => self.bind_return(node),
        }
    }

    pub(super) fn bind_block(&mut self, block: &BlockStatement) -> Rc<BoundStatement> {
        let previous = self.push_scope();
        let statements = block.statements.iter().map(|statement| self.bind_statement(statement)).collect();
        self.pop_scope(previous);
        BoundStatement::block(statements)
    }

    /// A no-op standing in for a statement that failed to bind.
    fn error_statement(&self, location: Location) -> Rc<BoundStatement> {
        BoundStatement::expression(BoundExpression::error(self.ctx.builtins().error, location))
    }

    fn bind_expression_statement(&mut self, node: &ExpressionStatement) -> Rc<BoundStatement> {
        let expression = self.bind_expression(&node.expression, true);
        let allowed = matches!(
            expression.kind,
            BoundExpressionKind::Assignment(_)
                | BoundExpressionKind::MemberAssignment(_)
                | BoundExpressionKind::MethodCall(_)
                | BoundExpressionKind::Error
        );
        if !allowed && !self.ctx.options.script {
            self.ctx.report(expression.location, &INVALID_EXPRESSION_STATEMENT, &[]);
        }
        BoundStatement::expression(expression)
    }

    fn bind_variable_declaration(&mut self, node: &VariableDeclaration) -> Rc<BoundStatement> {
        let name = node.identifier.text.as_str();
        let location = node.identifier.location;
        let builtins = self.ctx.builtins();

        let declared_type = node.type_clause.as_ref().map(|syntax| self.ctx.resolve_type(self.scope, syntax));
        let (ty, initializer) = match (declared_type, &node.initializer) {
            (Some(ty), Some(initializer)) => (ty, Some(self.bind_conversion(initializer, ty, false))),
            (Some(ty), None) => (ty, None),
            (None, Some(initializer)) => {
                let bound = self.bind_expression(initializer, false);
                (bound.ty, Some(bound))
            }
            (None, None) => {
                self.ctx.report(location, &VARIABLE_0_REQUIRES_A_TYPE_OR_AN_INITIALIZER, &[name]);
                (builtins.error, None)
            }
        };

        let variable =
            self.ctx.symbols.add_variable(VariableSymbol::local(name, ty, node.is_readonly, Some(location)));
        if !self.ctx.scopes.declare_variable(self.scope, name, variable) {
            self.ctx.report(location, &VARIABLE_0_IS_ALREADY_DECLARED, &[name]);
        }
        Rc::new(BoundStatement::VariableDeclaration(BoundVariableDeclaration { variable, initializer }))
    }

    fn bind_if(&mut self, node: &IfStatement) -> Rc<BoundStatement> {
        let bool_type = self.ctx.builtins().bool;
        let condition = self.bind_conversion(&node.condition, bool_type, false);
        let then_statement = self.bind_statement(&node.then_statement);
        let else_statement = node.else_statement.as_ref().map(|statement| self.bind_statement(statement));
        Rc::new(BoundStatement::If(BoundIfStatement { condition, then_statement, else_statement }))
    }

    fn bind_while(&mut self, node: &WhileStatement) -> Rc<BoundStatement> {
        let bool_type = self.ctx.builtins().bool;
        let condition = self.bind_conversion(&node.condition, bool_type, false);
        let (body, break_label, continue_label) = self.bind_loop_body(&node.body);
        Rc::new(BoundStatement::While(BoundWhileStatement { condition, body, break_label, continue_label }))
    }

    fn bind_for(&mut self, node: &ForStatement) -> Rc<BoundStatement> {
        let int = self.ctx.builtins().int;
        let lower_bound = self.bind_conversion(&node.lower_bound, int, false);
        let upper_bound = self.bind_conversion(&node.upper_bound, int, false);

        let previous = self.push_scope();
        let name = node.identifier.text.as_str();
        let variable = self
            .ctx
            .symbols
            .add_variable(VariableSymbol::local(name, int, true, Some(node.identifier.location)));
        if !self.ctx.scopes.declare_variable(self.scope, name, variable) {
            self.ctx.report(node.identifier.location, &VARIABLE_0_IS_ALREADY_DECLARED, &[name]);
        }
        let upper_bound_variable = self.ctx.symbols.add_variable(VariableSymbol::local("upperBound", int, true, None));
        let (body, break_label, continue_label) = self.bind_loop_body(&node.body);
        self.pop_scope(previous);

        Rc::new(BoundStatement::For(BoundForStatement {
            variable,
            lower_bound,
            upper_bound,
            upper_bound_variable,
            body,
            break_label,
            continue_label,
        }))
    }

    fn bind_loop_body(&mut self, body: &StatementSyntax) -> (Rc<BoundStatement>, LabelId, LabelId) {
        let break_label = self.labels.fresh();
        let continue_label = self.labels.fresh();
        self.loops.push((break_label, continue_label));
        let body = self.bind_statement(body);
        self.loops.pop();
        (body, break_label, continue_label)
    }

    fn bind_loop_jump(&mut self, location: Location, keyword: &str) -> Rc<BoundStatement> {
        let Some(&(break_label, continue_label)) = self.loops.last() else {
            self.ctx.report(location, &_0_CAN_ONLY_BE_USED_INSIDE_A_LOOP, &[keyword]);
            return self.error_statement(location);
        };
        let target = if keyword == "break" { break_label } else { continue_label };
        BoundStatement::goto(target)
    }

    fn bind_return(&mut self, node: &ReturnStatement) -> Rc<BoundStatement> {
        let builtins = self.ctx.builtins();
        let Some(method) = self.method else {
            self.ctx.report(node.location, &RETURN_OUTSIDE_OF_A_METHOD, &[]);
            if let Some(expression) = &node.expression {
                self.bind_expression(expression, true);
            }
            return self.error_statement(node.location);
        };
        let return_type = self.ctx.symbols.method(method).return_type;
        let method_name = self.ctx.symbols.method_display_name(method);

        let expression = match &node.expression {
            Some(expression) if return_type == builtins.void => {
                let bound = self.bind_expression(expression, true);
                self.ctx.report(bound.location, &METHOD_0_RETURNS_VOID, &[&method_name]);
                None
            }
            Some(expression) => Some(self.bind_conversion(expression, return_type, false)),
            None if return_type == builtins.void || self.ctx.symbols.is_error(return_type) => None,
            None if self.is_script_main() => Some(BoundExpression::new(
                BoundExpressionKind::Literal(LiteralValue::String(String::new())),
                builtins.string,
                node.location,
            )),
            None => {
                let type_name = self.ctx.symbols.display_type(return_type);
                self.ctx.report(node.location, &METHOD_0_MUST_RETURN_A_VALUE_OF_TYPE_1, &[&method_name, &type_name]);
                None
            }
        };
        Rc::new(BoundStatement::Return(BoundReturnStatement { expression }))
    }
}
