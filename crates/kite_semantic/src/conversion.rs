//! Conversion classification between two types.

use crate::symbols::{SymbolTable, TypeId};

/// How a value of one type may become a value of another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conversion {
    None,
    Identity,
    Implicit,
    Explicit,
}

impl Conversion {
    pub fn exists(self) -> bool {
        self != Conversion::None
    }

    pub fn is_identity(self) -> bool {
        self == Conversion::Identity
    }

    pub fn is_implicit(self) -> bool {
        matches!(self, Conversion::Identity | Conversion::Implicit)
    }

    /// Classify the conversion from `from` to `to`.
    pub fn classify(symbols: &SymbolTable, from: TypeId, to: TypeId) -> Conversion {
        let b = symbols.builtins();
        if from == to {
            return Conversion::Identity;
        }
        if from == b.error || to == b.error {
            return Conversion::Identity;
        }
        if from == b.void || to == b.void {
            return Conversion::None;
        }
        if to == b.any {
            return Conversion::Implicit;
        }
        if from == b.any {
            return Conversion::Explicit;
        }

        let from_symbol = symbols.type_symbol(from);
        if from_symbol.is_generic_parameter()
            && from_symbol
                .constraints
                .iter()
                .any(|&constraint| {
                    !symbols.type_symbol(constraint).is_generic_parameter()
                        && Self::classify(symbols, constraint, to).is_implicit()
                })
        {
            return Conversion::Implicit;
        }

        if symbols.derives_from(from, to) {
            return Conversion::Implicit;
        }
        if symbols.derives_from(to, from) {
            return Conversion::Explicit;
        }

        let primitive = |ty: TypeId| ty == b.int || ty == b.bool;
        if (primitive(from) && to == b.string) || (from == b.string && primitive(to)) {
            return Conversion::Explicit;
        }
        Conversion::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::{TypeFlags, TypeSymbol};

    #[test]
    fn test_primitive_conversions() {
        let table = SymbolTable::new();
        let b = *table.builtins();
        assert_eq!(Conversion::classify(&table, b.int, b.int), Conversion::Identity);
        assert_eq!(Conversion::classify(&table, b.int, b.any), Conversion::Implicit);
        assert_eq!(Conversion::classify(&table, b.any, b.bool), Conversion::Explicit);
        assert_eq!(Conversion::classify(&table, b.int, b.string), Conversion::Explicit);
        assert_eq!(Conversion::classify(&table, b.string, b.bool), Conversion::Explicit);
        assert_eq!(Conversion::classify(&table, b.int, b.bool), Conversion::None);
        assert_eq!(Conversion::classify(&table, b.void, b.any), Conversion::None);
        assert_eq!(Conversion::classify(&table, b.error, b.int), Conversion::Identity);
    }

    #[test]
    fn test_class_conversions() {
        let mut table = SymbolTable::new();
        let any = table.builtins().any;
        let mut shape = TypeSymbol::new("Shape", TypeFlags::CLASS);
        shape.base_type = Some(any);
        let shape = table.add_type(shape);
        let mut square = TypeSymbol::new("Square", TypeFlags::CLASS);
        square.base_type = Some(shape);
        let square = table.add_type(square);

        assert_eq!(Conversion::classify(&table, square, shape), Conversion::Implicit);
        assert_eq!(Conversion::classify(&table, shape, square), Conversion::Explicit);
    }

    #[test]
    fn test_placeholder_converts_to_constraint() {
        let mut table = SymbolTable::new();
        let shape = table.add_type(TypeSymbol::new("Shape", TypeFlags::CLASS));
        let mut t = TypeSymbol::new("T", TypeFlags::GENERIC_PARAMETER);
        t.constraints = vec![shape];
        let t = table.add_type(t);

        assert_eq!(Conversion::classify(&table, t, shape), Conversion::Implicit);
        assert_eq!(Conversion::classify(&table, shape, t), Conversion::None);
    }
}
