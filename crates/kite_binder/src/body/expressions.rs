use super::MethodBodyBinder;
use kite_core::text::Location;
use kite_diagnostics::messages::*;
use kite_semantic::{
    BoundAssignment, BoundBinaryExpression, BoundBinaryOperator, BoundExpression, BoundExpressionKind,
    BoundUnaryExpression, BoundUnaryOperator, Conversion, TypeId,
};
use kite_syntax::{AssignmentExpression, BinaryExpression, ExpressionSyntax, LiteralValue, UnaryExpression};
use std::rc::Rc;

impl MethodBodyBinder<'_, '_> {
    /// Bind an expression. Unless `can_be_void`, a `Void` result is
    /// reported and replaced by an error node.
    pub(super) fn bind_expression(&mut self, expression: &ExpressionSyntax, can_be_void: bool) -> Rc<BoundExpression> {
        let bound = self.bind_expression_internal(expression);
        if !can_be_void && bound.ty == self.ctx.builtins().void {
            self.ctx.report(bound.location, &EXPRESSION_MUST_HAVE_A_VALUE, &[]);
            return self.error_expression(bound.location);
        }
        bound
    }

    fn bind_expression_internal(&mut self, expression: &ExpressionSyntax) -> Rc<BoundExpression> {
        match expression {
            ExpressionSyntax::Literal(node) => {
                let builtins = self.ctx.builtins();
                let ty = match node.value {
                    LiteralValue::Int(_) => builtins.int,
                    LiteralValue::Bool(_) => builtins.bool,
                    LiteralValue::String(_) => builtins.string,
                };
                BoundExpression::new(BoundExpressionKind::Literal(node.value.clone()), ty, node.location)
            }
            ExpressionSyntax::Name(identifier) => self.bind_name(identifier),
            ExpressionSyntax::This(location) => self.bind_this(*location),
            ExpressionSyntax::Parenthesized(node) => self.bind_expression(&node.expression, false),
            ExpressionSyntax::Unary(node) => self.bind_unary(node),
            ExpressionSyntax::Binary(node) => self.bind_binary(node),
            ExpressionSyntax::Assignment(node) => self.bind_assignment(node),
            ExpressionSyntax::MemberAccess(node) => self.bind_member_access(node),
            ExpressionSyntax::MemberAssignment(node) => self.bind_member_assignment(node),
            ExpressionSyntax::Call(node) => self.bind_call(node),
            ExpressionSyntax::ObjectCreation(node) => self.bind_object_creation(node),
        }
    }

    pub(super) fn error_expression(&self, location: Location) -> Rc<BoundExpression> {
        BoundExpression::error(self.ctx.builtins().error, location)
    }

    // ------------------------------------------------------------------------
    // Conversions
    // ------------------------------------------------------------------------

    /// Bind `expression` and convert it to `ty`.
    pub(super) fn bind_conversion(
        &mut self,
        expression: &ExpressionSyntax,
        ty: TypeId,
        allow_explicit: bool,
    ) -> Rc<BoundExpression> {
        let bound = self.bind_expression(expression, false);
        self.convert(bound, ty, allow_explicit)
    }

    pub(super) fn convert(&mut self, expression: Rc<BoundExpression>, ty: TypeId, allow_explicit: bool) -> Rc<BoundExpression> {
        let location = expression.location;
        let conversion = Conversion::classify(&self.ctx.symbols, expression.ty, ty);
        match conversion {
            Conversion::Identity => expression,
            Conversion::None => {
                let from = self.ctx.symbols.display_type(expression.ty);
                let to = self.ctx.symbols.display_type(ty);
                self.ctx.report(location, &CANNOT_CONVERT_0_TO_1, &[&from, &to]);
                self.error_expression(location)
            }
            Conversion::Explicit if !allow_explicit => {
                let from = self.ctx.symbols.display_type(expression.ty);
                let to = self.ctx.symbols.display_type(ty);
                self.ctx.report(location, &CANNOT_IMPLICITLY_CONVERT_0_TO_1, &[&from, &to]);
                self.error_expression(location)
            }
            Conversion::Implicit | Conversion::Explicit => {
                BoundExpression::new(BoundExpressionKind::Conversion(expression), ty, location)
            }
        }
    }

    // ------------------------------------------------------------------------
    // Operators
    // ------------------------------------------------------------------------

    fn bind_unary(&mut self, node: &UnaryExpression) -> Rc<BoundExpression> {
        let operand = self.bind_expression(&node.operand, false);
        let location = node.operator_location.union(&operand.location);
        if operand.is_error() {
            return self.error_expression(location);
        }
        let builtins = self.ctx.builtins();
        let Some(operator) = BoundUnaryOperator::bind(node.operator, operand.ty, &builtins) else {
            let type_name = self.ctx.symbols.display_type(operand.ty);
            self.ctx.report(node.operator_location, &UNARY_OPERATOR_0_IS_NOT_DEFINED_FOR_1, &[node.operator.text(), &type_name]);
            return self.error_expression(location);
        };
        let ty = operator.result_type;
        BoundExpression::new(BoundExpressionKind::Unary(BoundUnaryExpression { operator, operand }), ty, location)
    }

    fn bind_binary(&mut self, node: &BinaryExpression) -> Rc<BoundExpression> {
        let left = self.bind_expression(&node.left, false);
        let right = self.bind_expression(&node.right, false);
        let location = left.location.union(&right.location);
        if left.is_error() || right.is_error() {
            return self.error_expression(location);
        }
        let builtins = self.ctx.builtins();
        let Some(operator) = BoundBinaryOperator::bind(node.operator, left.ty, right.ty, &builtins) else {
            let left_name = self.ctx.symbols.display_type(left.ty);
            let right_name = self.ctx.symbols.display_type(right.ty);
            self.ctx.report(
                node.operator_location,
                &BINARY_OPERATOR_0_IS_NOT_DEFINED_FOR_1_AND_2,
                &[node.operator.text(), &left_name, &right_name],
            );
            return self.error_expression(location);
        };
        let ty = operator.result_type;
        BoundExpression::new(BoundExpressionKind::Binary(BoundBinaryExpression { left, operator, right }), ty, location)
    }

    // ------------------------------------------------------------------------
    // Assignment
    // ------------------------------------------------------------------------

    /// `name = value`. A name that is not a variable may still be a field
    /// of the current type.
    fn bind_assignment(&mut self, node: &AssignmentExpression) -> Rc<BoundExpression> {
        let name = node.identifier.text.as_str();
        let location = node.identifier.location.union(&node.expression.location());

        if let Some(variable) = self.ctx.scopes.lookup_variable(self.scope, name) {
            let symbol = self.ctx.symbols.variable(variable);
            let (ty, is_readonly) = (symbol.ty, symbol.is_readonly);
            let expression = self.bind_conversion(&node.expression, ty, false);
            if is_readonly {
                self.ctx.report(node.identifier.location, &_0_IS_READONLY, &[name]);
            }
            return BoundExpression::new(
                BoundExpressionKind::Assignment(BoundAssignment { variable, expression }),
                ty,
                location,
            );
        }

        if let Some(field) = self.implicit_field(name) {
            return self.bind_field_assignment(None, field, &node.identifier, &node.expression, location);
        }

        self.ctx.report(node.identifier.location, &THE_NAME_0_DOES_NOT_EXIST, &[name]);
        self.bind_expression(&node.expression, true);
        self.error_expression(location)
    }
}
