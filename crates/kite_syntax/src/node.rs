//! Syntax node definitions.
//!
//! Nodes are owned trees, built bottom-up by the parser. Every node that can
//! anchor a diagnostic carries a [`Location`].

use crate::types::*;
use kite_core::text::{LineMap, Location, SourceId};
use kite_diagnostics::Diagnostic;
use serde::{Deserialize, Serialize};

// ============================================================================
// Syntax Tree
// ============================================================================

/// One parsed input file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyntaxTree {
    pub source: SourceId,
    pub file_name: String,
    /// The source text. Only used to compute line information.
    #[serde(default)]
    pub text: String,
    pub root: CompilationUnit,
    /// Lexical and syntactic diagnostics reported by the parser. Merged
    /// unchanged into the final diagnostic list.
    #[serde(skip)]
    pub diagnostics: Vec<Diagnostic>,
}

impl SyntaxTree {
    pub fn new(source: SourceId, file_name: impl Into<String>, text: impl Into<String>, root: CompilationUnit) -> Self {
        Self {
            source,
            file_name: file_name.into(),
            text: text.into(),
            root,
            diagnostics: Vec::new(),
        }
    }

    /// Deserialize a tree handed over by an out-of-process parser.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn line_map(&self) -> LineMap {
        LineMap::new(&self.text)
    }

    pub fn classes(&self) -> impl Iterator<Item = &ClassDeclaration> {
        self.root.members.iter().filter_map(|m| match m {
            MemberSyntax::Class(c) => Some(c),
            _ => None,
        })
    }

    pub fn functions(&self) -> impl Iterator<Item = &FunctionDeclaration> {
        self.root.members.iter().filter_map(|m| match m {
            MemberSyntax::Function(f) => Some(f),
            _ => None,
        })
    }

    pub fn global_statements(&self) -> impl Iterator<Item = &StatementSyntax> {
        self.root.members.iter().filter_map(|m| match m {
            MemberSyntax::GlobalStatement(s) => Some(s),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompilationUnit {
    pub members: Vec<MemberSyntax>,
}

/// A top-level member of a file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum MemberSyntax {
    Class(ClassDeclaration),
    Function(FunctionDeclaration),
    GlobalStatement(StatementSyntax),
}

impl From<ClassDeclaration> for MemberSyntax {
    fn from(node: ClassDeclaration) -> Self {
        MemberSyntax::Class(node)
    }
}

impl From<FunctionDeclaration> for MemberSyntax {
    fn from(node: FunctionDeclaration) -> Self {
        MemberSyntax::Function(node)
    }
}

impl From<StatementSyntax> for MemberSyntax {
    fn from(node: StatementSyntax) -> Self {
        MemberSyntax::GlobalStatement(node)
    }
}

// ============================================================================
// Names and Types
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identifier {
    pub text: String,
    pub location: Location,
}

/// A type reference such as `Int` or `Box<String>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeSyntax {
    pub identifier: Identifier,
    #[serde(default)]
    pub generic_arguments: Vec<TypeSyntax>,
}

impl TypeSyntax {
    pub fn location(&self) -> Location {
        self.identifier.location
    }
}

/// `where T: A, B`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstraintClause {
    pub parameter: Identifier,
    pub constraints: Vec<TypeSyntax>,
}

// ============================================================================
// Declarations
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassDeclaration {
    pub identifier: Identifier,
    #[serde(default)]
    pub generic_parameters: Vec<Identifier>,
    #[serde(default)]
    pub constraints: Vec<ConstraintClause>,
    pub base: Option<TypeSyntax>,
    pub members: Vec<ClassMember>,
    pub location: Location,
}

impl ClassDeclaration {
    pub fn fields(&self) -> impl Iterator<Item = &FieldDeclaration> {
        self.members.iter().filter_map(|m| match m {
            ClassMember::Field(f) => Some(f),
            ClassMember::Method(_) => None,
        })
    }

    pub fn methods(&self) -> impl Iterator<Item = &FunctionDeclaration> {
        self.members.iter().filter_map(|m| match m {
            ClassMember::Method(f) => Some(f),
            ClassMember::Field(_) => None,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ClassMember {
    Field(FieldDeclaration),
    Method(FunctionDeclaration),
}

impl ClassMember {
    pub fn identifier(&self) -> &Identifier {
        match self {
            ClassMember::Field(f) => &f.identifier,
            ClassMember::Method(m) => &m.identifier,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldDeclaration {
    pub identifier: Identifier,
    #[serde(default)]
    pub modifiers: ModifierFlags,
    pub type_clause: TypeSyntax,
    pub location: Location,
}

/// A method inside a class, or a top-level function.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionDeclaration {
    pub identifier: Identifier,
    #[serde(default)]
    pub modifiers: ModifierFlags,
    #[serde(default)]
    pub generic_parameters: Vec<Identifier>,
    #[serde(default)]
    pub constraints: Vec<ConstraintClause>,
    pub parameters: Vec<ParameterSyntax>,
    pub return_type: Option<TypeSyntax>,
    pub body: Option<BlockStatement>,
    pub location: Location,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParameterSyntax {
    pub identifier: Identifier,
    pub type_clause: Option<TypeSyntax>,
}

// ============================================================================
// Statements
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StatementSyntax {
    Block(BlockStatement),
    Expression(ExpressionStatement),
    VariableDeclaration(VariableDeclaration),
    If(IfStatement),
    While(WhileStatement),
    For(ForStatement),
    Break(Location),
    Continue(Location),
    Return(ReturnStatement),
}

impl StatementSyntax {
    pub fn location(&self) -> Location {
        match self {
            StatementSyntax::Block(n) => n.location,
            StatementSyntax::Expression(n) => n.expression.location(),
            StatementSyntax::VariableDeclaration(n) => n.location,
            StatementSyntax::If(n) => n.location,
            StatementSyntax::While(n) => n.location,
            StatementSyntax::For(n) => n.location,
            StatementSyntax::Break(location) | StatementSyntax::Continue(location) => *location,
            StatementSyntax::Return(n) => n.location,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockStatement {
    pub statements: Vec<StatementSyntax>,
    pub location: Location,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpressionStatement {
    pub expression: ExpressionSyntax,
}

/// `var x: T = e` or `let x = e`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariableDeclaration {
    /// `let` declares a readonly binding.
    pub is_readonly: bool,
    pub identifier: Identifier,
    pub type_clause: Option<TypeSyntax>,
    pub initializer: Option<ExpressionSyntax>,
    pub location: Location,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IfStatement {
    pub condition: ExpressionSyntax,
    pub then_statement: Box<StatementSyntax>,
    pub else_statement: Option<Box<StatementSyntax>>,
    pub location: Location,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhileStatement {
    pub condition: ExpressionSyntax,
    pub body: Box<StatementSyntax>,
    pub location: Location,
}

/// `for i = lower to upper body`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForStatement {
    pub identifier: Identifier,
    pub lower_bound: ExpressionSyntax,
    pub upper_bound: ExpressionSyntax,
    pub body: Box<StatementSyntax>,
    pub location: Location,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReturnStatement {
    pub expression: Option<ExpressionSyntax>,
    pub location: Location,
}

// ============================================================================
// Expressions
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ExpressionSyntax {
    Literal(LiteralExpression),
    Name(Identifier),
    This(Location),
    Parenthesized(ParenthesizedExpression),
    Unary(UnaryExpression),
    Binary(BinaryExpression),
    Assignment(AssignmentExpression),
    MemberAccess(MemberAccessExpression),
    MemberAssignment(MemberAssignmentExpression),
    Call(CallExpression),
    ObjectCreation(ObjectCreationExpression),
}

impl ExpressionSyntax {
    pub fn location(&self) -> Location {
        match self {
            ExpressionSyntax::Literal(n) => n.location,
            ExpressionSyntax::Name(n) => n.location,
            ExpressionSyntax::This(location) => *location,
            ExpressionSyntax::Parenthesized(n) => n.location,
            ExpressionSyntax::Unary(n) => n.operator_location.union(&n.operand.location()),
            ExpressionSyntax::Binary(n) => n.left.location().union(&n.right.location()),
            ExpressionSyntax::Assignment(n) => n.identifier.location.union(&n.expression.location()),
            ExpressionSyntax::MemberAccess(n) => n.target.location().union(&n.member.location),
            ExpressionSyntax::MemberAssignment(n) => n.target.location().union(&n.expression.location()),
            ExpressionSyntax::Call(n) => n.location,
            ExpressionSyntax::ObjectCreation(n) => n.location,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LiteralValue {
    Int(i64),
    Bool(bool),
    String(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiteralExpression {
    pub value: LiteralValue,
    pub location: Location,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParenthesizedExpression {
    pub expression: Box<ExpressionSyntax>,
    pub location: Location,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnaryExpression {
    pub operator: UnaryOperatorKind,
    pub operator_location: Location,
    pub operand: Box<ExpressionSyntax>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BinaryExpression {
    pub left: Box<ExpressionSyntax>,
    pub operator: BinaryOperatorKind,
    pub operator_location: Location,
    pub right: Box<ExpressionSyntax>,
}

/// `name = expression`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignmentExpression {
    pub identifier: Identifier,
    pub expression: Box<ExpressionSyntax>,
}

/// `target.member`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberAccessExpression {
    pub target: Box<ExpressionSyntax>,
    pub member: Identifier,
}

/// `target.member = expression`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberAssignmentExpression {
    pub target: Box<ExpressionSyntax>,
    pub member: Identifier,
    pub expression: Box<ExpressionSyntax>,
}

/// `name<T>(args)` or `target.name<T>(args)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallExpression {
    pub target: Option<Box<ExpressionSyntax>>,
    pub identifier: Identifier,
    #[serde(default)]
    pub generic_arguments: Vec<TypeSyntax>,
    pub arguments: Vec<ExpressionSyntax>,
    pub location: Location,
}

/// `new T<Args>()`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectCreationExpression {
    pub type_syntax: TypeSyntax,
    pub location: Location,
}
