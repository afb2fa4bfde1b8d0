//! Operator resolution.
//!
//! Unary and binary operators are resolved through a fixed table keyed by
//! operator kind and operand types.

use crate::symbols::{BuiltinTypes, TypeId};
use kite_syntax::{BinaryOperatorKind, UnaryOperatorKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundUnaryOperator {
    pub kind: UnaryOperatorKind,
    pub operand_type: TypeId,
    pub result_type: TypeId,
}

impl BoundUnaryOperator {
    /// Look up `kind` applied to `operand_type`.
    pub fn bind(kind: UnaryOperatorKind, operand_type: TypeId, builtins: &BuiltinTypes) -> Option<Self> {
        let operand = match kind {
            UnaryOperatorKind::Identity | UnaryOperatorKind::Negation | UnaryOperatorKind::OnesComplement => {
                builtins.int
            }
            UnaryOperatorKind::LogicalNegation => builtins.bool,
        };
        (operand_type == operand).then_some(Self { kind, operand_type, result_type: operand })
    }

    /// `!` on Bool, used to build negated branch guards.
    pub fn logical_negation(builtins: &BuiltinTypes) -> Self {
        Self {
            kind: UnaryOperatorKind::LogicalNegation,
            operand_type: builtins.bool,
            result_type: builtins.bool,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundBinaryOperator {
    pub kind: BinaryOperatorKind,
    pub left_type: TypeId,
    pub right_type: TypeId,
    pub result_type: TypeId,
}

impl BoundBinaryOperator {
    /// Look up `kind` applied to `left_type` and `right_type`.
    pub fn bind(
        kind: BinaryOperatorKind,
        left_type: TypeId,
        right_type: TypeId,
        builtins: &BuiltinTypes,
    ) -> Option<Self> {
        use BinaryOperatorKind::*;

        let result_type = match kind {
            // Equality is defined on any two operands of the same value type.
            Equals | NotEquals => {
                let comparable = left_type == right_type && left_type != builtins.void;
                comparable.then_some(builtins.bool)?
            }
            _ => Self::table(kind, left_type, right_type, builtins)?,
        };
        Some(Self { kind, left_type, right_type, result_type })
    }

    fn table(kind: BinaryOperatorKind, left: TypeId, right: TypeId, b: &BuiltinTypes) -> Option<TypeId> {
        use BinaryOperatorKind::*;

        if left != right {
            return None;
        }
        let operand = left;
        let result = match kind {
            Add if operand == b.int || operand == b.string => operand,
            Subtract | Multiply | Divide | Modulo if operand == b.int => b.int,
            BitwiseAnd | BitwiseOr | BitwiseXor if operand == b.int || operand == b.bool => operand,
            LogicalAnd | LogicalOr if operand == b.bool => b.bool,
            Less | LessOrEquals | Greater | GreaterOrEquals if operand == b.int => b.bool,
            _ => return None,
        };
        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::SymbolTable;

    #[test]
    fn test_unary_table() {
        let table = SymbolTable::new();
        let b = table.builtins();
        let negate = BoundUnaryOperator::bind(UnaryOperatorKind::Negation, b.int, b).expect("-Int");
        assert_eq!(negate.result_type, b.int);
        assert!(BoundUnaryOperator::bind(UnaryOperatorKind::LogicalNegation, b.int, b).is_none());
        assert!(BoundUnaryOperator::bind(UnaryOperatorKind::OnesComplement, b.string, b).is_none());
    }

    #[test]
    fn test_binary_table() {
        let table = SymbolTable::new();
        let b = table.builtins();

        let concat = BoundBinaryOperator::bind(BinaryOperatorKind::Add, b.string, b.string, b).expect("String + String");
        assert_eq!(concat.result_type, b.string);

        let less = BoundBinaryOperator::bind(BinaryOperatorKind::Less, b.int, b.int, b).expect("Int < Int");
        assert_eq!(less.result_type, b.bool);

        let xor = BoundBinaryOperator::bind(BinaryOperatorKind::BitwiseXor, b.bool, b.bool, b).expect("Bool ^ Bool");
        assert_eq!(xor.result_type, b.bool);

        assert!(BoundBinaryOperator::bind(BinaryOperatorKind::Subtract, b.string, b.string, b).is_none());
        assert!(BoundBinaryOperator::bind(BinaryOperatorKind::Add, b.int, b.string, b).is_none());
        assert!(BoundBinaryOperator::bind(BinaryOperatorKind::LogicalAnd, b.int, b.int, b).is_none());
    }

    #[test]
    fn test_equality_on_same_types() {
        let table = SymbolTable::new();
        let b = table.builtins();
        assert!(BoundBinaryOperator::bind(BinaryOperatorKind::Equals, b.string, b.string, b).is_some());
        assert!(BoundBinaryOperator::bind(BinaryOperatorKind::NotEquals, b.any, b.any, b).is_some());
        assert!(BoundBinaryOperator::bind(BinaryOperatorKind::Equals, b.int, b.bool, b).is_none());
        assert!(BoundBinaryOperator::bind(BinaryOperatorKind::Equals, b.void, b.void, b).is_none());
    }
}
