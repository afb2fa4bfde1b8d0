//! Structured control flow to labels and gotos.
//!
//! ```text
//! if c then s                 gotoFalse End if c; s; End:
//! if c then s else t          gotoFalse Else if c; s; goto End; Else: t; End:
//! while c body                Continue: gotoFalse Break if c; body; goto Continue; Break:
//! for i = a to b body         var i = a; let upper = b;
//!                             Check: gotoFalse Break if i <= upper; body;
//!                             Continue: i = i + 1; goto Check; Break:
//! ```
//!
//! `break` and `continue` are already gotos when they reach the lowerer.
//! Statements without control constructs are reused as they are.

use kite_core::text::Location;
use kite_semantic::{
    BoundAssignment, BoundBinaryExpression, BoundBinaryOperator, BoundExpression, BoundExpressionKind,
    BoundForStatement, BoundIfStatement, BoundStatement, BoundVariableDeclaration, BoundWhileStatement,
    BuiltinTypes, LabelGenerator,
};
use kite_syntax::{BinaryOperatorKind, LiteralValue};
use std::rc::Rc;

pub struct Lowerer {
    labels: LabelGenerator,
    builtins: BuiltinTypes,
}

impl Lowerer {
    /// `labels` must continue the numbering used while binding the body.
    pub fn new(labels: LabelGenerator, builtins: BuiltinTypes) -> Self {
        Self { labels, builtins }
    }

    /// A lowerer for a body whose binder state is gone.
    pub fn for_body(body: &BoundStatement, builtins: BuiltinTypes) -> Self {
        Self::new(LabelGenerator::continuing_after(body), builtins)
    }

    /// Lower `body` into a flat block. A block that is already flat comes
    /// back as the same `Rc`.
    pub fn lower(&mut self, body: &Rc<BoundStatement>) -> Rc<BoundStatement> {
        if let BoundStatement::Block(block) = body.as_ref() {
            if block.statements.iter().all(|statement| !statement.is_structured()) {
                return Rc::clone(body);
            }
        }
        let mut output = Vec::new();
        self.flatten(body, &mut output);
        BoundStatement::block(output)
    }

    fn flatten(&mut self, statement: &Rc<BoundStatement>, output: &mut Vec<Rc<BoundStatement>>) {
        match statement.as_ref() {
            BoundStatement::Block(block) => {
                for statement in &block.statements {
                    self.flatten(statement, output);
                }
            }
            BoundStatement::If(node) => self.lower_if(node, output),
            BoundStatement::While(node) => self.lower_while(node, output),
            BoundStatement::For(node) => self.lower_for(node, output),
            _ => output.push(Rc::clone(statement)),
        }
    }

    fn lower_if(&mut self, node: &BoundIfStatement, output: &mut Vec<Rc<BoundStatement>>) {
        let end_label = self.labels.fresh();
        match &node.else_statement {
            None => {
                output.push(BoundStatement::conditional_goto(end_label, Rc::clone(&node.condition), false));
                self.flatten(&node.then_statement, output);
                output.push(BoundStatement::label(end_label));
            }
            Some(else_statement) => {
                let else_label = self.labels.fresh();
                output.push(BoundStatement::conditional_goto(else_label, Rc::clone(&node.condition), false));
                self.flatten(&node.then_statement, output);
                output.push(BoundStatement::goto(end_label));
                output.push(BoundStatement::label(else_label));
                self.flatten(else_statement, output);
                output.push(BoundStatement::label(end_label));
            }
        }
    }

    fn lower_while(&mut self, node: &BoundWhileStatement, output: &mut Vec<Rc<BoundStatement>>) {
        output.push(BoundStatement::label(node.continue_label));
        output.push(BoundStatement::conditional_goto(node.break_label, Rc::clone(&node.condition), false));
        self.flatten(&node.body, output);
        output.push(BoundStatement::goto(node.continue_label));
        output.push(BoundStatement::label(node.break_label));
    }

    fn lower_for(&mut self, node: &BoundForStatement, output: &mut Vec<Rc<BoundStatement>>) {
        let location = node.lower_bound.location;
        let check_label = self.labels.fresh();

        output.push(Rc::new(BoundStatement::VariableDeclaration(BoundVariableDeclaration {
            variable: node.variable,
            initializer: Some(Rc::clone(&node.lower_bound)),
        })));
        output.push(Rc::new(BoundStatement::VariableDeclaration(BoundVariableDeclaration {
            variable: node.upper_bound_variable,
            initializer: Some(Rc::clone(&node.upper_bound)),
        })));

        let counter = self.variable(node.variable, location);
        let upper = self.variable(node.upper_bound_variable, location);
        let condition = self.binary(counter, BinaryOperatorKind::LessOrEquals, upper, location);
        output.push(BoundStatement::label(check_label));
        output.push(BoundStatement::conditional_goto(node.break_label, condition, false));

        self.flatten(&node.body, output);

        let one = BoundExpression::new(BoundExpressionKind::Literal(LiteralValue::Int(1)), self.builtins.int, location);
        let counter = self.variable(node.variable, location);
        let increment = self.binary(counter, BinaryOperatorKind::Add, one, location);
        let assignment = BoundExpression::new(
            BoundExpressionKind::Assignment(BoundAssignment { variable: node.variable, expression: increment }),
            self.builtins.int,
            location,
        );
        output.push(BoundStatement::label(node.continue_label));
        output.push(BoundStatement::expression(assignment));
        output.push(BoundStatement::goto(check_label));
        output.push(BoundStatement::label(node.break_label));
    }

    fn variable(&self, variable: kite_semantic::VariableId, location: Location) -> Rc<BoundExpression> {
        BoundExpression::new(BoundExpressionKind::Variable(variable), self.builtins.int, location)
    }

    /// An Int operation from the fixed operator table.
    fn binary(
        &self,
        left: Rc<BoundExpression>,
        kind: BinaryOperatorKind,
        right: Rc<BoundExpression>,
        location: Location,
    ) -> Rc<BoundExpression> {
        let int = self.builtins.int;
        match BoundBinaryOperator::bind(kind, int, int, &self.builtins) {
            Some(operator) => BoundExpression::new(
                BoundExpressionKind::Binary(BoundBinaryExpression { left, operator, right }),
                operator.result_type,
                location,
            ),
            None => BoundExpression::error(self.builtins.error, location),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kite_core::text::{SourceId, TextSpan};
    use kite_semantic::{LabelId, SymbolTable};

    fn at(start: u32) -> Location {
        Location::new(SourceId(0), TextSpan::new(start, 1))
    }

    #[test]
    fn test_lower_if_without_else() {
        let symbols = SymbolTable::new();
        let b = *symbols.builtins();
        let condition = BoundExpression::new(BoundExpressionKind::Literal(LiteralValue::Bool(true)), b.bool, at(0));
        let then_statement = BoundStatement::goto(LabelId(0));
        let body = BoundStatement::block(vec![Rc::new(BoundStatement::If(BoundIfStatement {
            condition,
            then_statement: Rc::clone(&then_statement),
            else_statement: None,
        }))]);

        let lowered = Lowerer::for_body(&body, b).lower(&body);
        let BoundStatement::Block(block) = lowered.as_ref() else {
            panic!("lowering produces a block");
        };
        assert_eq!(block.statements.len(), 3);
        assert!(matches!(
            block.statements[0].as_ref(),
            BoundStatement::ConditionalGoto(goto) if !goto.jump_if_true && goto.label == LabelId(1)
        ));
        assert!(Rc::ptr_eq(&block.statements[1], &then_statement));
        assert!(matches!(block.statements[2].as_ref(), BoundStatement::Label(LabelId(1))));
    }
}
