//! Bound tree to text.
//!
//! Renders bound and lowered bodies in a stable, source-like notation. The
//! output only depends on the tree and the symbol table, so printing the
//! result of two identical bindings yields identical text.

use crate::bound_tree::*;
use crate::symbols::{FieldId, SymbolTable};
use kite_syntax::LiteralValue;

pub struct BoundTreePrinter<'s> {
    output: String,
    indent_level: u32,
    symbols: &'s SymbolTable,
}

impl<'s> BoundTreePrinter<'s> {
    pub fn new(symbols: &'s SymbolTable) -> Self {
        Self {
            output: String::with_capacity(1024),
            indent_level: 0,
            symbols,
        }
    }

    /// Print a statement followed by a newline.
    pub fn print(&mut self, statement: &BoundStatement) -> String {
        self.output.clear();
        self.print_statement(statement);
        std::mem::take(&mut self.output)
    }

    pub fn print_expression_to_string(&mut self, expression: &BoundExpression) -> String {
        self.output.clear();
        self.print_expression(expression);
        std::mem::take(&mut self.output)
    }

    // ========================================================================
    // Statement printing
    // ========================================================================

    fn print_statement(&mut self, statement: &BoundStatement) {
        let symbols = self.symbols;
        match statement {
            BoundStatement::Block(block) => {
                self.write_indent();
                self.write("{\n");
                self.increase_indent();
                for statement in &block.statements {
                    self.print_statement(statement);
                }
                self.decrease_indent();
                self.write_indent();
                self.write("}\n");
            }
            BoundStatement::Expression(statement) => {
                self.write_indent();
                self.print_expression(&statement.expression);
                self.write("\n");
            }
            BoundStatement::VariableDeclaration(declaration) => {
                let variable = symbols.variable(declaration.variable);
                self.write_indent();
                self.write(if variable.is_readonly { "let " } else { "var " });
                self.write(&variable.name);
                self.write(": ");
                self.write_owned(symbols.display_type(variable.ty));
                if let Some(initializer) = &declaration.initializer {
                    self.write(" = ");
                    self.print_expression(initializer);
                }
                self.write("\n");
            }
            BoundStatement::If(statement) => {
                self.write_indent();
                self.write("if ");
                self.print_expression(&statement.condition);
                self.write("\n");
                self.print_nested(&statement.then_statement);
                if let Some(else_statement) = &statement.else_statement {
                    self.write_indent();
                    self.write("else\n");
                    self.print_nested(else_statement);
                }
            }
            BoundStatement::While(statement) => {
                self.write_indent();
                self.write("while ");
                self.print_expression(&statement.condition);
                self.write("\n");
                self.print_nested(&statement.body);
            }
            BoundStatement::For(statement) => {
                self.write_indent();
                self.write("for ");
                self.write(&symbols.variable(statement.variable).name);
                self.write(" = ");
                self.print_expression(&statement.lower_bound);
                self.write(" to ");
                self.print_expression(&statement.upper_bound);
                self.write("\n");
                self.print_nested(&statement.body);
            }
            BoundStatement::Return(statement) => {
                self.write_indent();
                self.write("return");
                if let Some(expression) = &statement.expression {
                    self.write(" ");
                    self.print_expression(expression);
                }
                self.write("\n");
            }
            BoundStatement::Goto(label) => {
                self.write_indent();
                self.write_owned(format!("goto {}\n", label));
            }
            BoundStatement::ConditionalGoto(goto) => {
                self.write_indent();
                self.write(if goto.jump_if_true { "goto " } else { "gotoFalse " });
                self.write_owned(goto.label.to_string());
                self.write(" if ");
                self.print_expression(&goto.condition);
                self.write("\n");
            }
            BoundStatement::Label(label) => {
                // Labels sit one level left of the code they mark.
                self.decrease_indent();
                self.write_indent();
                self.increase_indent();
                self.write_owned(format!("{}:\n", label));
            }
        }
    }

    fn print_nested(&mut self, statement: &BoundStatement) {
        if matches!(statement, BoundStatement::Block(_)) {
            self.print_statement(statement);
        } else {
            self.increase_indent();
            self.print_statement(statement);
            self.decrease_indent();
        }
    }

    // ========================================================================
    // Expression printing
    // ========================================================================

    fn print_expression(&mut self, expression: &BoundExpression) {
        let symbols = self.symbols;
        match &expression.kind {
            BoundExpressionKind::Literal(value) => match value {
                LiteralValue::Int(value) => self.write_owned(value.to_string()),
                LiteralValue::Bool(value) => self.write(if *value { "true" } else { "false" }),
                LiteralValue::String(value) => self.write_owned(format!("{:?}", value)),
            },
            BoundExpressionKind::Variable(variable) => self.write(&symbols.variable(*variable).name),
            BoundExpressionKind::Assignment(assignment) => {
                self.write(&symbols.variable(assignment.variable).name);
                self.write(" = ");
                self.print_expression(&assignment.expression);
            }
            BoundExpressionKind::Field(field) => self.write(&symbols.field(*field).name),
            BoundExpressionKind::This => self.write("this"),
            BoundExpressionKind::Unary(unary) => {
                self.write(unary.operator.kind.text());
                self.print_operand(&unary.operand);
            }
            BoundExpressionKind::Binary(binary) => {
                self.print_operand(&binary.left);
                self.write(" ");
                self.write(binary.operator.kind.text());
                self.write(" ");
                self.print_operand(&binary.right);
            }
            BoundExpressionKind::Conversion(operand) => {
                self.write_owned(symbols.display_type(expression.ty));
                self.write("(");
                self.print_expression(operand);
                self.write(")");
            }
            BoundExpressionKind::MethodCall(call) => {
                if let Some(receiver) = &call.receiver {
                    self.print_operand(receiver);
                    self.write(".");
                }
                self.write(&symbols.method(call.method).name);
                if !call.type_arguments.is_empty() {
                    let arguments: Vec<String> =
                        call.type_arguments.iter().map(|&ty| symbols.display_type(ty)).collect();
                    self.write_owned(format!("<{}>", arguments.join(", ")));
                }
                self.write("(");
                for (i, argument) in call.arguments.iter().enumerate() {
                    if i > 0 {
                        self.write(", ");
                    }
                    self.print_expression(argument);
                }
                self.write(")");
            }
            BoundExpressionKind::MemberAccess(access) => {
                self.print_member_target(access.target.as_deref(), access.field);
                self.write(&symbols.field(access.field).name);
            }
            BoundExpressionKind::MemberAssignment(assignment) => {
                self.print_member_target(assignment.target.as_deref(), assignment.field);
                self.write(&symbols.field(assignment.field).name);
                self.write(" = ");
                self.print_expression(&assignment.expression);
            }
            BoundExpressionKind::ObjectCreation => {
                self.write("new ");
                self.write_owned(symbols.display_type(expression.ty));
                self.write("()");
            }
            BoundExpressionKind::Error => self.write("?"),
        }
    }

    fn print_member_target(&mut self, target: Option<&BoundExpression>, field: FieldId) {
        let symbols = self.symbols;
        match target {
            Some(target) => self.print_operand(target),
            None => {
                let owner = symbols.field(field).containing_type;
                self.write_owned(symbols.display_type(owner));
            }
        }
        self.write(".");
    }

    fn print_operand(&mut self, expression: &BoundExpression) {
        let needs_parens = matches!(
            expression.kind,
            BoundExpressionKind::Binary(_) | BoundExpressionKind::Assignment(_) | BoundExpressionKind::MemberAssignment(_)
        );
        if needs_parens {
            self.write("(");
        }
        self.print_expression(expression);
        if needs_parens {
            self.write(")");
        }
    }

    // ========================================================================
    // Output helpers
    // ========================================================================

    fn write(&mut self, s: &str) {
        self.output.push_str(s);
    }

    fn write_owned(&mut self, s: String) {
        self.output.push_str(&s);
    }

    fn write_indent(&mut self) {
        for _ in 0..self.indent_level {
            self.output.push_str("    ");
        }
    }

    fn increase_indent(&mut self) {
        self.indent_level += 1;
    }

    fn decrease_indent(&mut self) {
        if self.indent_level > 0 {
            self.indent_level -= 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::{LabelId, VariableSymbol};
    use kite_core::text::{Location, SourceId, TextSpan};

    fn at(start: u32) -> Location {
        Location::new(SourceId(0), TextSpan::new(start, 1))
    }

    #[test]
    fn test_print_lowered_loop() {
        let mut symbols = SymbolTable::new();
        let b = *symbols.builtins();
        let i = symbols.add_variable(VariableSymbol::local("i", b.int, false, None));

        let read = BoundExpression::new(BoundExpressionKind::Variable(i), b.int, at(0));
        let ten = BoundExpression::new(BoundExpressionKind::Literal(LiteralValue::Int(10)), b.int, at(4));
        let operator = crate::operators::BoundBinaryOperator::bind(kite_syntax::BinaryOperatorKind::Less, b.int, b.int, &b)
            .expect("Int < Int");
        let condition = BoundExpression::new(
            BoundExpressionKind::Binary(BoundBinaryExpression { left: read, operator, right: ten }),
            b.bool,
            at(0),
        );
        let zero = BoundExpression::new(BoundExpressionKind::Literal(LiteralValue::Int(0)), b.int, at(8));

        let body = BoundStatement::block(vec![
            std::rc::Rc::new(BoundStatement::VariableDeclaration(BoundVariableDeclaration {
                variable: i,
                initializer: Some(zero),
            })),
            BoundStatement::label(LabelId(0)),
            BoundStatement::conditional_goto(LabelId(1), condition, false),
            BoundStatement::goto(LabelId(0)),
            BoundStatement::label(LabelId(1)),
        ]);

        let text = BoundTreePrinter::new(&symbols).print(&body);
        let expected = "{\n    var i: Int = 0\nLabel0:\n    gotoFalse Label1 if i < 10\n    goto Label0\nLabel1:\n}\n";
        assert_eq!(text, expected);
    }
}
