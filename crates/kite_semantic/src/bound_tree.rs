//! Bound tree definitions.
//!
//! The bound tree is the typed counterpart of the syntax tree. Nodes are
//! immutable and shared through `Rc`, so a rewrite that leaves a subtree
//! untouched can hand back the very same node.

use crate::operators::{BoundBinaryOperator, BoundUnaryOperator};
use crate::symbols::{FieldId, LabelId, MethodId, TypeId, VariableId};
use kite_core::text::Location;
use kite_syntax::LiteralValue;
use std::rc::Rc;

// ============================================================================
// Statements
// ============================================================================

#[derive(Debug, Clone)]
pub enum BoundStatement {
    Block(BoundBlock),
    Expression(BoundExpressionStatement),
    VariableDeclaration(BoundVariableDeclaration),
    If(BoundIfStatement),
    While(BoundWhileStatement),
    For(BoundForStatement),
    Return(BoundReturnStatement),
    Goto(LabelId),
    ConditionalGoto(BoundConditionalGoto),
    Label(LabelId),
}

#[derive(Debug, Clone)]
pub struct BoundBlock {
    pub statements: Vec<Rc<BoundStatement>>,
}

#[derive(Debug, Clone)]
pub struct BoundExpressionStatement {
    pub expression: Rc<BoundExpression>,
}

#[derive(Debug, Clone)]
pub struct BoundVariableDeclaration {
    pub variable: VariableId,
    pub initializer: Option<Rc<BoundExpression>>,
}

#[derive(Debug, Clone)]
pub struct BoundIfStatement {
    pub condition: Rc<BoundExpression>,
    pub then_statement: Rc<BoundStatement>,
    pub else_statement: Option<Rc<BoundStatement>>,
}

#[derive(Debug, Clone)]
pub struct BoundWhileStatement {
    pub condition: Rc<BoundExpression>,
    pub body: Rc<BoundStatement>,
    pub break_label: LabelId,
    pub continue_label: LabelId,
}

/// `for variable = lower_bound to upper_bound body`. The upper bound is
/// evaluated once into `upper_bound_variable`.
#[derive(Debug, Clone)]
pub struct BoundForStatement {
    pub variable: VariableId,
    pub lower_bound: Rc<BoundExpression>,
    pub upper_bound: Rc<BoundExpression>,
    pub upper_bound_variable: VariableId,
    pub body: Rc<BoundStatement>,
    pub break_label: LabelId,
    pub continue_label: LabelId,
}

#[derive(Debug, Clone)]
pub struct BoundReturnStatement {
    pub expression: Option<Rc<BoundExpression>>,
}

#[derive(Debug, Clone)]
pub struct BoundConditionalGoto {
    pub label: LabelId,
    pub condition: Rc<BoundExpression>,
    pub jump_if_true: bool,
}

impl BoundStatement {
    pub fn block(statements: Vec<Rc<BoundStatement>>) -> Rc<Self> {
        Rc::new(BoundStatement::Block(BoundBlock { statements }))
    }

    pub fn expression(expression: Rc<BoundExpression>) -> Rc<Self> {
        Rc::new(BoundStatement::Expression(BoundExpressionStatement { expression }))
    }

    pub fn goto(label: LabelId) -> Rc<Self> {
        Rc::new(BoundStatement::Goto(label))
    }

    pub fn label(label: LabelId) -> Rc<Self> {
        Rc::new(BoundStatement::Label(label))
    }

    pub fn conditional_goto(label: LabelId, condition: Rc<BoundExpression>, jump_if_true: bool) -> Rc<Self> {
        Rc::new(BoundStatement::ConditionalGoto(BoundConditionalGoto { label, condition, jump_if_true }))
    }

    /// Whether the statement is an if, loop or block that lowering removes.
    pub fn is_structured(&self) -> bool {
        matches!(
            self,
            BoundStatement::Block(_) | BoundStatement::If(_) | BoundStatement::While(_) | BoundStatement::For(_)
        )
    }

    pub fn children(&self) -> Vec<BoundNode<'_>> {
        match self {
            BoundStatement::Block(block) => block.statements.iter().map(BoundNode::Statement).collect(),
            BoundStatement::Expression(statement) => vec![BoundNode::Expression(&statement.expression)],
            BoundStatement::VariableDeclaration(declaration) => {
                declaration.initializer.iter().map(BoundNode::Expression).collect()
            }
            BoundStatement::If(statement) => {
                let mut children =
                    vec![BoundNode::Expression(&statement.condition), BoundNode::Statement(&statement.then_statement)];
                children.extend(statement.else_statement.iter().map(BoundNode::Statement));
                children
            }
            BoundStatement::While(statement) => {
                vec![BoundNode::Expression(&statement.condition), BoundNode::Statement(&statement.body)]
            }
            BoundStatement::For(statement) => vec![
                BoundNode::Expression(&statement.lower_bound),
                BoundNode::Expression(&statement.upper_bound),
                BoundNode::Statement(&statement.body),
            ],
            BoundStatement::Return(statement) => statement.expression.iter().map(BoundNode::Expression).collect(),
            BoundStatement::ConditionalGoto(goto) => vec![BoundNode::Expression(&goto.condition)],
            BoundStatement::Goto(_) | BoundStatement::Label(_) => Vec::new(),
        }
    }

    /// The largest label id used anywhere in this statement.
    pub fn max_label(&self) -> Option<LabelId> {
        let own = match self {
            BoundStatement::While(s) => Some(s.break_label.max(s.continue_label)),
            BoundStatement::For(s) => Some(s.break_label.max(s.continue_label)),
            BoundStatement::Goto(label) | BoundStatement::Label(label) => Some(*label),
            BoundStatement::ConditionalGoto(goto) => Some(goto.label),
            _ => None,
        };
        self.children()
            .into_iter()
            .filter_map(|child| match child {
                BoundNode::Statement(statement) => statement.max_label(),
                BoundNode::Expression(_) => None,
            })
            .chain(own)
            .max()
    }
}

// ============================================================================
// Expressions
// ============================================================================

/// A typed expression. `ty` is the Error type when binding failed.
#[derive(Debug, Clone)]
pub struct BoundExpression {
    pub kind: BoundExpressionKind,
    pub ty: TypeId,
    pub location: Location,
}

#[derive(Debug, Clone)]
pub enum BoundExpressionKind {
    Literal(LiteralValue),
    Variable(VariableId),
    Assignment(BoundAssignment),
    /// A field named without a receiver: an instance field of `this` or a
    /// static field of the enclosing type.
    Field(FieldId),
    This,
    Unary(BoundUnaryExpression),
    Binary(BoundBinaryExpression),
    /// Conversion of the operand to the node's type.
    Conversion(Rc<BoundExpression>),
    MethodCall(BoundMethodCall),
    MemberAccess(BoundMemberAccess),
    MemberAssignment(BoundMemberAssignment),
    /// A new instance of the node's type.
    ObjectCreation,
    Error,
}

#[derive(Debug, Clone)]
pub struct BoundAssignment {
    pub variable: VariableId,
    pub expression: Rc<BoundExpression>,
}

#[derive(Debug, Clone)]
pub struct BoundUnaryExpression {
    pub operator: BoundUnaryOperator,
    pub operand: Rc<BoundExpression>,
}

#[derive(Debug, Clone)]
pub struct BoundBinaryExpression {
    pub left: Rc<BoundExpression>,
    pub operator: BoundBinaryOperator,
    pub right: Rc<BoundExpression>,
}

#[derive(Debug, Clone)]
pub struct BoundMethodCall {
    /// `None` for static methods, built-ins and implicit `this` calls.
    pub receiver: Option<Rc<BoundExpression>>,
    pub method: MethodId,
    pub type_arguments: Vec<TypeId>,
    pub arguments: Vec<Rc<BoundExpression>>,
}

#[derive(Debug, Clone)]
pub struct BoundMemberAccess {
    /// `None` when the field is reached through a type name.
    pub target: Option<Rc<BoundExpression>>,
    pub field: FieldId,
}

#[derive(Debug, Clone)]
pub struct BoundMemberAssignment {
    /// `None` when the field is named through a type or without a receiver.
    pub target: Option<Rc<BoundExpression>>,
    pub field: FieldId,
    pub expression: Rc<BoundExpression>,
}

impl BoundExpression {
    pub fn new(kind: BoundExpressionKind, ty: TypeId, location: Location) -> Rc<Self> {
        Rc::new(Self { kind, ty, location })
    }

    pub fn error(error_type: TypeId, location: Location) -> Rc<Self> {
        Self::new(BoundExpressionKind::Error, error_type, location)
    }

    pub fn is_error(&self) -> bool {
        matches!(self.kind, BoundExpressionKind::Error)
    }

    pub fn as_bool_literal(&self) -> Option<bool> {
        match self.kind {
            BoundExpressionKind::Literal(LiteralValue::Bool(value)) => Some(value),
            _ => None,
        }
    }

    pub fn children(&self) -> Vec<BoundNode<'_>> {
        match &self.kind {
            BoundExpressionKind::Literal(_)
            | BoundExpressionKind::Variable(_)
            | BoundExpressionKind::Field(_)
            | BoundExpressionKind::This
            | BoundExpressionKind::ObjectCreation
            | BoundExpressionKind::Error => Vec::new(),
            BoundExpressionKind::Assignment(assignment) => vec![BoundNode::Expression(&assignment.expression)],
            BoundExpressionKind::Unary(unary) => vec![BoundNode::Expression(&unary.operand)],
            BoundExpressionKind::Binary(binary) => {
                vec![BoundNode::Expression(&binary.left), BoundNode::Expression(&binary.right)]
            }
            BoundExpressionKind::Conversion(operand) => vec![BoundNode::Expression(operand)],
            BoundExpressionKind::MethodCall(call) => call
                .receiver
                .iter()
                .chain(call.arguments.iter())
                .map(BoundNode::Expression)
                .collect(),
            BoundExpressionKind::MemberAccess(access) => access.target.iter().map(BoundNode::Expression).collect(),
            BoundExpressionKind::MemberAssignment(assignment) => assignment
                .target
                .iter()
                .chain(std::iter::once(&assignment.expression))
                .map(BoundNode::Expression)
                .collect(),
        }
    }
}

// ============================================================================
// Traversal
// ============================================================================

/// A child of a bound node.
#[derive(Debug, Clone, Copy)]
pub enum BoundNode<'a> {
    Statement(&'a Rc<BoundStatement>),
    Expression(&'a Rc<BoundExpression>),
}

/// Visit every expression below `statement` in evaluation order, children
/// before the expression that contains them.
pub fn for_each_expression<'a>(statement: &'a BoundStatement, visit: &mut impl FnMut(&'a BoundExpression)) {
    for child in statement.children() {
        match child {
            BoundNode::Statement(statement) => for_each_expression(statement, visit),
            BoundNode::Expression(expression) => visit_expression(expression, visit),
        }
    }
}

fn visit_expression<'a>(expression: &'a BoundExpression, visit: &mut impl FnMut(&'a BoundExpression)) {
    for child in expression.children() {
        if let BoundNode::Expression(child) = child {
            visit_expression(child, visit);
        }
    }
    visit(expression);
}

/// Hands out label ids unique within one method body.
#[derive(Debug, Clone, Default)]
pub struct LabelGenerator {
    next: u32,
}

impl LabelGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// A generator whose labels do not collide with any in `statement`.
    pub fn continuing_after(statement: &BoundStatement) -> Self {
        Self { next: statement.max_label().map_or(0, |label| label.0 + 1) }
    }

    pub fn fresh(&mut self) -> LabelId {
        let label = LabelId(self.next);
        self.next += 1;
        label
    }
}
