//! Flag types and operator kinds used by syntax nodes.

use serde::{Deserialize, Serialize};
use std::fmt;

bitflags::bitflags! {
    /// Modifier flags for member declarations.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct ModifierFlags: u32 {
        const NONE              = 0;
        const STATIC            = 1 << 0;
        const VIRTUAL           = 1 << 1;
        const OVERRIDE          = 1 << 2;
        const READONLY          = 1 << 3;

        const DISPATCH_MODIFIER = Self::VIRTUAL.bits() | Self::OVERRIDE.bits();
    }
}

impl Default for ModifierFlags {
    fn default() -> Self {
        Self::NONE
    }
}

/// Prefix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOperatorKind {
    Identity,
    Negation,
    LogicalNegation,
    OnesComplement,
}

impl UnaryOperatorKind {
    pub fn text(self) -> &'static str {
        match self {
            UnaryOperatorKind::Identity => "+",
            UnaryOperatorKind::Negation => "-",
            UnaryOperatorKind::LogicalNegation => "!",
            UnaryOperatorKind::OnesComplement => "~",
        }
    }
}

impl fmt::Display for UnaryOperatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

/// Infix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOperatorKind {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    BitwiseAnd,
    BitwiseOr,
    BitwiseXor,
    LogicalAnd,
    LogicalOr,
    Equals,
    NotEquals,
    Less,
    LessOrEquals,
    Greater,
    GreaterOrEquals,
}

impl BinaryOperatorKind {
    pub fn text(self) -> &'static str {
        match self {
            BinaryOperatorKind::Add => "+",
            BinaryOperatorKind::Subtract => "-",
            BinaryOperatorKind::Multiply => "*",
            BinaryOperatorKind::Divide => "/",
            BinaryOperatorKind::Modulo => "%",
            BinaryOperatorKind::BitwiseAnd => "&",
            BinaryOperatorKind::BitwiseOr => "|",
            BinaryOperatorKind::BitwiseXor => "^",
            BinaryOperatorKind::LogicalAnd => "&&",
            BinaryOperatorKind::LogicalOr => "||",
            BinaryOperatorKind::Equals => "==",
            BinaryOperatorKind::NotEquals => "!=",
            BinaryOperatorKind::Less => "<",
            BinaryOperatorKind::LessOrEquals => "<=",
            BinaryOperatorKind::Greater => ">",
            BinaryOperatorKind::GreaterOrEquals => ">=",
        }
    }
}

impl fmt::Display for BinaryOperatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}
