//! Programmatic construction of syntax trees.
//!
//! The builder stands in for a parser: it assigns every node a fresh,
//! strictly increasing span inside its source, so two nodes built through
//! the same builder never share a location. Diagnostics anchored at
//! different declarations therefore stay distinct after de-duplication.

use crate::node::*;
use crate::types::*;
use kite_core::text::{Location, SourceId, TextSpan};
use std::cell::Cell;

pub struct TreeBuilder {
    source: SourceId,
    file_name: String,
    next_pos: Cell<u32>,
}

impl TreeBuilder {
    pub fn new(source: SourceId, file_name: impl Into<String>) -> Self {
        Self {
            source,
            file_name: file_name.into(),
            next_pos: Cell::new(0),
        }
    }

    pub fn source(&self) -> SourceId {
        self.source
    }

    /// A fresh location `len` bytes wide.
    pub fn location(&self, len: u32) -> Location {
        let start = self.next_pos.get();
        self.next_pos.set(start + len.max(1) + 1);
        Location::new(self.source, TextSpan::new(start, len.max(1)))
    }

    /// Wrap the given members into a finished tree.
    pub fn finish(&self, members: Vec<MemberSyntax>) -> SyntaxTree {
        SyntaxTree::new(self.source, self.file_name.clone(), String::new(), CompilationUnit { members })
    }

    // ------------------------------------------------------------------------
    // Names and types
    // ------------------------------------------------------------------------

    pub fn ident(&self, text: &str) -> Identifier {
        Identifier {
            text: text.to_string(),
            location: self.location(text.len() as u32),
        }
    }

    pub fn ty(&self, name: &str) -> TypeSyntax {
        TypeSyntax {
            identifier: self.ident(name),
            generic_arguments: Vec::new(),
        }
    }

    pub fn generic_ty(&self, name: &str, arguments: Vec<TypeSyntax>) -> TypeSyntax {
        TypeSyntax {
            identifier: self.ident(name),
            generic_arguments: arguments,
        }
    }

    pub fn constraint(&self, parameter: &str, constraints: &[&str]) -> ConstraintClause {
        ConstraintClause {
            parameter: self.ident(parameter),
            constraints: constraints.iter().map(|c| self.ty(c)).collect(),
        }
    }

    // ------------------------------------------------------------------------
    // Declarations
    // ------------------------------------------------------------------------

    pub fn class(&self, name: &str) -> ClassBuilder<'_> {
        ClassBuilder {
            builder: self,
            node: ClassDeclaration {
                location: self.location(5),
                identifier: self.ident(name),
                generic_parameters: Vec::new(),
                constraints: Vec::new(),
                base: None,
                members: Vec::new(),
            },
        }
    }

    pub fn function(&self, name: &str) -> FunctionBuilder<'_> {
        FunctionBuilder {
            builder: self,
            node: FunctionDeclaration {
                location: self.location(8),
                identifier: self.ident(name),
                modifiers: ModifierFlags::NONE,
                generic_parameters: Vec::new(),
                constraints: Vec::new(),
                parameters: Vec::new(),
                return_type: None,
                body: None,
            },
        }
    }

    pub fn field(&self, name: &str, ty: &str) -> ClassMember {
        self.field_with(name, ty, ModifierFlags::NONE)
    }

    pub fn field_with(&self, name: &str, ty: &str, modifiers: ModifierFlags) -> ClassMember {
        ClassMember::Field(FieldDeclaration {
            location: self.location(3),
            identifier: self.ident(name),
            modifiers,
            type_clause: self.ty(ty),
        })
    }

    // ------------------------------------------------------------------------
    // Statements
    // ------------------------------------------------------------------------

    pub fn block(&self, statements: Vec<StatementSyntax>) -> StatementSyntax {
        StatementSyntax::Block(self.block_node(statements))
    }

    pub fn block_node(&self, statements: Vec<StatementSyntax>) -> BlockStatement {
        BlockStatement {
            location: self.location(1),
            statements,
        }
    }

    pub fn expr_stmt(&self, expression: ExpressionSyntax) -> StatementSyntax {
        StatementSyntax::Expression(ExpressionStatement { expression })
    }

    /// `var name: ty = initializer`
    pub fn var(&self, name: &str, ty: Option<&str>, initializer: Option<ExpressionSyntax>) -> StatementSyntax {
        self.variable(false, name, ty, initializer)
    }

    /// `let name: ty = initializer`
    pub fn let_(&self, name: &str, ty: Option<&str>, initializer: Option<ExpressionSyntax>) -> StatementSyntax {
        self.variable(true, name, ty, initializer)
    }

    fn variable(&self, is_readonly: bool, name: &str, ty: Option<&str>, initializer: Option<ExpressionSyntax>) -> StatementSyntax {
        StatementSyntax::VariableDeclaration(VariableDeclaration {
            location: self.location(3),
            is_readonly,
            identifier: self.ident(name),
            type_clause: ty.map(|t| self.ty(t)),
            initializer,
        })
    }

    pub fn if_(&self, condition: ExpressionSyntax, then: StatementSyntax, otherwise: Option<StatementSyntax>) -> StatementSyntax {
        StatementSyntax::If(IfStatement {
            location: self.location(2),
            condition,
            then_statement: Box::new(then),
            else_statement: otherwise.map(Box::new),
        })
    }

    pub fn while_(&self, condition: ExpressionSyntax, body: StatementSyntax) -> StatementSyntax {
        StatementSyntax::While(WhileStatement {
            location: self.location(5),
            condition,
            body: Box::new(body),
        })
    }

    pub fn for_(&self, name: &str, lower: ExpressionSyntax, upper: ExpressionSyntax, body: StatementSyntax) -> StatementSyntax {
        StatementSyntax::For(ForStatement {
            location: self.location(3),
            identifier: self.ident(name),
            lower_bound: lower,
            upper_bound: upper,
            body: Box::new(body),
        })
    }

    pub fn break_(&self) -> StatementSyntax {
        StatementSyntax::Break(self.location(5))
    }

    pub fn continue_(&self) -> StatementSyntax {
        StatementSyntax::Continue(self.location(8))
    }

    pub fn ret(&self, expression: Option<ExpressionSyntax>) -> StatementSyntax {
        StatementSyntax::Return(ReturnStatement {
            location: self.location(6),
            expression,
        })
    }

    // ------------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------------

    pub fn int(&self, value: i64) -> ExpressionSyntax {
        self.literal(LiteralValue::Int(value))
    }

    pub fn bool(&self, value: bool) -> ExpressionSyntax {
        self.literal(LiteralValue::Bool(value))
    }

    pub fn string(&self, value: &str) -> ExpressionSyntax {
        self.literal(LiteralValue::String(value.to_string()))
    }

    fn literal(&self, value: LiteralValue) -> ExpressionSyntax {
        ExpressionSyntax::Literal(LiteralExpression {
            location: self.location(1),
            value,
        })
    }

    pub fn name(&self, name: &str) -> ExpressionSyntax {
        ExpressionSyntax::Name(self.ident(name))
    }

    pub fn this(&self) -> ExpressionSyntax {
        ExpressionSyntax::This(self.location(4))
    }

    pub fn paren(&self, expression: ExpressionSyntax) -> ExpressionSyntax {
        ExpressionSyntax::Parenthesized(ParenthesizedExpression {
            location: self.location(1),
            expression: Box::new(expression),
        })
    }

    pub fn unary(&self, operator: UnaryOperatorKind, operand: ExpressionSyntax) -> ExpressionSyntax {
        ExpressionSyntax::Unary(UnaryExpression {
            operator_location: self.location(1),
            operator,
            operand: Box::new(operand),
        })
    }

    pub fn binary(&self, left: ExpressionSyntax, operator: BinaryOperatorKind, right: ExpressionSyntax) -> ExpressionSyntax {
        ExpressionSyntax::Binary(BinaryExpression {
            operator_location: self.location(1),
            left: Box::new(left),
            operator,
            right: Box::new(right),
        })
    }

    pub fn assign(&self, name: &str, expression: ExpressionSyntax) -> ExpressionSyntax {
        ExpressionSyntax::Assignment(AssignmentExpression {
            identifier: self.ident(name),
            expression: Box::new(expression),
        })
    }

    pub fn member(&self, target: ExpressionSyntax, member: &str) -> ExpressionSyntax {
        ExpressionSyntax::MemberAccess(MemberAccessExpression {
            target: Box::new(target),
            member: self.ident(member),
        })
    }

    pub fn member_assign(&self, target: ExpressionSyntax, member: &str, expression: ExpressionSyntax) -> ExpressionSyntax {
        ExpressionSyntax::MemberAssignment(MemberAssignmentExpression {
            target: Box::new(target),
            member: self.ident(member),
            expression: Box::new(expression),
        })
    }

    /// `name(arguments)`
    pub fn call(&self, name: &str, arguments: Vec<ExpressionSyntax>) -> ExpressionSyntax {
        self.call_generic(None, name, Vec::new(), arguments)
    }

    /// `target.name(arguments)`
    pub fn call_on(&self, target: ExpressionSyntax, name: &str, arguments: Vec<ExpressionSyntax>) -> ExpressionSyntax {
        self.call_generic(Some(target), name, Vec::new(), arguments)
    }

    /// `target.name<generic_arguments>(arguments)`
    pub fn call_generic(
        &self,
        target: Option<ExpressionSyntax>,
        name: &str,
        generic_arguments: Vec<TypeSyntax>,
        arguments: Vec<ExpressionSyntax>,
    ) -> ExpressionSyntax {
        ExpressionSyntax::Call(CallExpression {
            location: self.location(2),
            target: target.map(Box::new),
            identifier: self.ident(name),
            generic_arguments,
            arguments,
        })
    }

    pub fn new_object(&self, type_syntax: TypeSyntax) -> ExpressionSyntax {
        ExpressionSyntax::ObjectCreation(ObjectCreationExpression {
            location: self.location(3),
            type_syntax,
        })
    }
}

/// Builds a [`ClassDeclaration`].
pub struct ClassBuilder<'b> {
    builder: &'b TreeBuilder,
    node: ClassDeclaration,
}

impl<'b> ClassBuilder<'b> {
    pub fn base(mut self, name: &str) -> Self {
        self.node.base = Some(self.builder.ty(name));
        self
    }

    pub fn base_type(mut self, base: TypeSyntax) -> Self {
        self.node.base = Some(base);
        self
    }

    pub fn generic(mut self, name: &str) -> Self {
        self.node.generic_parameters.push(self.builder.ident(name));
        self
    }

    pub fn constraint(mut self, parameter: &str, constraints: &[&str]) -> Self {
        self.node.constraints.push(self.builder.constraint(parameter, constraints));
        self
    }

    pub fn member(mut self, member: ClassMember) -> Self {
        self.node.members.push(member);
        self
    }

    pub fn field(self, name: &str, ty: &str) -> Self {
        let field = self.builder.field(name, ty);
        self.member(field)
    }

    pub fn method(self, method: FunctionDeclaration) -> Self {
        self.member(ClassMember::Method(method))
    }

    pub fn build(self) -> ClassDeclaration {
        self.node
    }
}

/// Builds a [`FunctionDeclaration`].
pub struct FunctionBuilder<'b> {
    builder: &'b TreeBuilder,
    node: FunctionDeclaration,
}

impl<'b> FunctionBuilder<'b> {
    pub fn modifiers(mut self, modifiers: ModifierFlags) -> Self {
        self.node.modifiers |= modifiers;
        self
    }

    pub fn generic(mut self, name: &str) -> Self {
        self.node.generic_parameters.push(self.builder.ident(name));
        self
    }

    pub fn constraint(mut self, parameter: &str, constraints: &[&str]) -> Self {
        self.node.constraints.push(self.builder.constraint(parameter, constraints));
        self
    }

    pub fn param(mut self, name: &str, ty: &str) -> Self {
        self.node.parameters.push(ParameterSyntax {
            identifier: self.builder.ident(name),
            type_clause: Some(self.builder.ty(ty)),
        });
        self
    }

    /// A parameter written without a type clause.
    pub fn untyped_param(mut self, name: &str) -> Self {
        self.node.parameters.push(ParameterSyntax {
            identifier: self.builder.ident(name),
            type_clause: None,
        });
        self
    }

    pub fn returns(mut self, ty: &str) -> Self {
        self.node.return_type = Some(self.builder.ty(ty));
        self
    }

    pub fn body(mut self, statements: Vec<StatementSyntax>) -> Self {
        self.node.body = Some(self.builder.block_node(statements));
        self
    }

    pub fn build(self) -> FunctionDeclaration {
        self.node
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locations_are_distinct() {
        let b = TreeBuilder::new(SourceId(3), "a.kt");
        let x = b.ident("x");
        let y = b.ident("x");
        assert_ne!(x.location, y.location);
        assert_eq!(x.location.source, SourceId(3));
        assert!(x.location.span.end() < y.location.span.start);
    }

    #[test]
    fn test_builds_class_with_members() {
        let b = TreeBuilder::new(SourceId(0), "a.kt");
        let class = b
            .class("Point")
            .field("x", "Int")
            .method(b.function("len").returns("Int").body(vec![b.ret(Some(b.int(0)))]).build())
            .build();
        assert_eq!(class.identifier.text, "Point");
        assert_eq!(class.fields().count(), 1);
        assert_eq!(class.methods().count(), 1);
    }
}
