//! Symbol definitions and the symbol table.
//!
//! Symbols live in one arena per kind and are referenced through small
//! copyable ids. A symbol is created once per declaration and never changes
//! afterwards, with one exception: the lowered body stored in a type's
//! [`MethodTable`], which is written exactly once through a [`OnceCell`].

use crate::bound_tree::BoundStatement;
use indexmap::IndexMap;
use kite_core::text::Location;
use rustc_hash::{FxBuildHasher, FxHashMap, FxHashSet};
use std::cell::OnceCell;
use std::fmt;
use std::rc::Rc;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
        pub struct $name(pub u32);

        impl $name {
            #[inline]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }
    };
}

define_id!(
    /// Handle to a [`TypeSymbol`].
    TypeId
);
define_id!(
    /// Handle to a [`MethodSymbol`].
    MethodId
);
define_id!(
    /// Handle to a [`FieldSymbol`].
    FieldId
);
define_id!(
    /// Handle to a [`VariableSymbol`] (locals and parameters).
    VariableId
);
define_id!(
    /// A jump target inside one method body.
    LabelId
);

impl fmt::Display for LabelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Label{}", self.0)
    }
}

bitflags::bitflags! {
    /// Flags describing what kind of type a [`TypeSymbol`] is.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TypeFlags: u32 {
        const NONE               = 0;
        const BUILTIN            = 1 << 0;
        const CLASS              = 1 << 1;
        const GENERIC_DEFINITION = 1 << 2;
        const GENERIC_PARAMETER  = 1 << 3;
        const CONSTRUCTED        = 1 << 4;
        const ENTRY_POINT        = 1 << 5;
        const ERROR              = 1 << 6;
    }
}

bitflags::bitflags! {
    /// Flags of a [`MethodSymbol`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct MethodFlags: u32 {
        const NONE        = 0;
        const STATIC      = 1 << 0;
        const VIRTUAL     = 1 << 1;
        const OVERRIDE    = 1 << 2;
        const BUILTIN     = 1 << 3;
        const ENTRY_POINT = 1 << 4;
    }
}

// ============================================================================
// Type symbols
// ============================================================================

#[derive(Debug, Clone)]
pub struct TypeSymbol {
    pub name: String,
    /// Every class declaration that used this name; the first one created
    /// the symbol, later ones are duplicates.
    pub declarations: Vec<Location>,
    pub flags: TypeFlags,
    pub base_type: Option<TypeId>,
    pub methods: MethodTable,
    /// Fields in declaration order.
    pub fields: Vec<FieldId>,
    pub generic_parameters: Vec<TypeId>,
    /// Constraint types of a generic-parameter placeholder.
    pub constraints: Vec<TypeId>,
    /// For a constructed type: the generic definition and its arguments.
    pub definition: Option<TypeId>,
    pub type_arguments: Vec<TypeId>,
}

impl TypeSymbol {
    pub fn new(name: impl Into<String>, flags: TypeFlags) -> Self {
        Self {
            name: name.into(),
            declarations: Vec::new(),
            flags,
            base_type: None,
            methods: MethodTable::new(),
            fields: Vec::new(),
            generic_parameters: Vec::new(),
            constraints: Vec::new(),
            definition: None,
            type_arguments: Vec::new(),
        }
    }

    pub fn declared_at(mut self, location: Location) -> Self {
        self.declarations.push(location);
        self
    }

    /// The first declaration site.
    pub fn declaration(&self) -> Option<Location> {
        self.declarations.first().copied()
    }

    pub fn is_builtin(&self) -> bool {
        self.flags.contains(TypeFlags::BUILTIN)
    }

    pub fn is_class(&self) -> bool {
        self.flags.contains(TypeFlags::CLASS)
    }

    pub fn is_generic_definition(&self) -> bool {
        self.flags.contains(TypeFlags::GENERIC_DEFINITION)
    }

    pub fn is_generic_parameter(&self) -> bool {
        self.flags.contains(TypeFlags::GENERIC_PARAMETER)
    }

    pub fn is_entry_point(&self) -> bool {
        self.flags.contains(TypeFlags::ENTRY_POINT)
    }
}

/// Maps each method declared by a type to its lowered body.
///
/// Cells start empty and are filled exactly once by the type binder. A cell
/// that stays empty marks a declaration-only method.
#[derive(Debug, Clone, Default)]
pub struct MethodTable {
    entries: IndexMap<MethodId, OnceCell<Rc<BoundStatement>>, FxBuildHasher>,
}

impl MethodTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `method`. Returns `false` if it is already present.
    pub fn declare(&mut self, method: MethodId) -> bool {
        if self.entries.contains_key(&method) {
            return false;
        }
        self.entries.insert(method, OnceCell::new());
        true
    }

    pub fn contains(&self, method: MethodId) -> bool {
        self.entries.contains_key(&method)
    }

    /// Declared methods in declaration order.
    pub fn methods(&self) -> impl Iterator<Item = MethodId> + '_ {
        self.entries.keys().copied()
    }

    pub fn body(&self, method: MethodId) -> Option<&Rc<BoundStatement>> {
        self.entries.get(&method).and_then(|cell| cell.get())
    }

    /// Store the lowered body of `method`. Hands `body` back if the method
    /// is not in this table or its body was already stored.
    pub fn set_body(&self, method: MethodId, body: Rc<BoundStatement>) -> Result<(), Rc<BoundStatement>> {
        match self.entries.get(&method) {
            Some(cell) => cell.set(body),
            None => Err(body),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ============================================================================
// Member and variable symbols
// ============================================================================

#[derive(Debug, Clone)]
pub struct MethodSymbol {
    pub name: String,
    pub declaration: Option<Location>,
    /// `None` for the built-in functions.
    pub containing_type: Option<TypeId>,
    pub flags: MethodFlags,
    pub parameters: Vec<VariableId>,
    pub return_type: TypeId,
    pub generic_parameters: Vec<TypeId>,
}

impl MethodSymbol {
    pub fn is_static(&self) -> bool {
        self.flags.contains(MethodFlags::STATIC)
    }

    pub fn is_virtual(&self) -> bool {
        self.flags.contains(MethodFlags::VIRTUAL)
    }

    pub fn is_override(&self) -> bool {
        self.flags.contains(MethodFlags::OVERRIDE)
    }

    pub fn is_entry_point(&self) -> bool {
        self.flags.contains(MethodFlags::ENTRY_POINT)
    }

    pub fn is_generic(&self) -> bool {
        !self.generic_parameters.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct FieldSymbol {
    pub name: String,
    pub declaration: Option<Location>,
    pub containing_type: TypeId,
    pub ty: TypeId,
    pub is_static: bool,
    pub is_readonly: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableKind {
    Local,
    Parameter,
}

#[derive(Debug, Clone)]
pub struct VariableSymbol {
    pub name: String,
    pub declaration: Option<Location>,
    pub kind: VariableKind,
    pub ty: TypeId,
    pub is_readonly: bool,
}

impl VariableSymbol {
    pub fn local(name: impl Into<String>, ty: TypeId, is_readonly: bool, declaration: Option<Location>) -> Self {
        Self { name: name.into(), declaration, kind: VariableKind::Local, ty, is_readonly }
    }

    /// Parameters are always readonly.
    pub fn parameter(name: impl Into<String>, ty: TypeId, declaration: Option<Location>) -> Self {
        Self { name: name.into(), declaration, kind: VariableKind::Parameter, ty, is_readonly: true }
    }

    pub fn is_parameter(&self) -> bool {
        self.kind == VariableKind::Parameter
    }
}

// ============================================================================
// Symbol table
// ============================================================================

/// The pre-declared primitive types.
#[derive(Debug, Clone, Copy)]
pub struct BuiltinTypes {
    pub any: TypeId,
    pub bool: TypeId,
    pub int: TypeId,
    pub string: TypeId,
    pub void: TypeId,
    pub error: TypeId,
}

/// Arena of every symbol created during one compilation.
#[derive(Debug, Clone)]
pub struct SymbolTable {
    types: Vec<TypeSymbol>,
    methods: Vec<MethodSymbol>,
    fields: Vec<FieldSymbol>,
    variables: Vec<VariableSymbol>,
    constructed: FxHashMap<(TypeId, Vec<TypeId>), TypeId>,
    builtins: BuiltinTypes,
    builtin_functions: Vec<MethodId>,
}

impl SymbolTable {
    /// A table holding the primitive types and the built-in functions
    /// `print`, `input` and `rnd`.
    pub fn new() -> Self {
        let placeholder = TypeId(0);
        let mut table = Self {
            types: Vec::new(),
            methods: Vec::new(),
            fields: Vec::new(),
            variables: Vec::new(),
            constructed: FxHashMap::default(),
            builtins: BuiltinTypes {
                any: placeholder,
                bool: placeholder,
                int: placeholder,
                string: placeholder,
                void: placeholder,
                error: placeholder,
            },
            builtin_functions: Vec::new(),
        };

        let builtin = TypeFlags::BUILTIN;
        table.builtins = BuiltinTypes {
            any: table.add_type(TypeSymbol::new("Any", builtin)),
            bool: table.add_type(TypeSymbol::new("Bool", builtin)),
            int: table.add_type(TypeSymbol::new("Int", builtin)),
            string: table.add_type(TypeSymbol::new("String", builtin)),
            void: table.add_type(TypeSymbol::new("Void", builtin)),
            error: table.add_type(TypeSymbol::new("Error", builtin | TypeFlags::ERROR)),
        };

        let BuiltinTypes { any, int, string, void, .. } = table.builtins;
        let print = table.add_builtin_function("print", &[("value", any)], void);
        let input = table.add_builtin_function("input", &[], string);
        let rnd = table.add_builtin_function("rnd", &[("max", int)], int);
        table.builtin_functions = vec![print, input, rnd];
        table
    }

    fn add_builtin_function(&mut self, name: &str, parameters: &[(&str, TypeId)], return_type: TypeId) -> MethodId {
        let parameters = parameters
            .iter()
            .map(|&(name, ty)| self.add_variable(VariableSymbol::parameter(name, ty, None)))
            .collect();
        self.add_method(MethodSymbol {
            name: name.to_string(),
            declaration: None,
            containing_type: None,
            flags: MethodFlags::BUILTIN | MethodFlags::STATIC,
            parameters,
            return_type,
            generic_parameters: Vec::new(),
        })
    }

    pub fn builtins(&self) -> &BuiltinTypes {
        &self.builtins
    }

    pub fn builtin_functions(&self) -> &[MethodId] {
        &self.builtin_functions
    }

    // ------------------------------------------------------------------------
    // Allocation and access
    // ------------------------------------------------------------------------

    pub fn add_type(&mut self, symbol: TypeSymbol) -> TypeId {
        let id = TypeId(self.types.len() as u32);
        self.types.push(symbol);
        id
    }

    pub fn add_method(&mut self, symbol: MethodSymbol) -> MethodId {
        let id = MethodId(self.methods.len() as u32);
        self.methods.push(symbol);
        id
    }

    pub fn add_field(&mut self, symbol: FieldSymbol) -> FieldId {
        let id = FieldId(self.fields.len() as u32);
        self.fields.push(symbol);
        id
    }

    pub fn add_variable(&mut self, symbol: VariableSymbol) -> VariableId {
        let id = VariableId(self.variables.len() as u32);
        self.variables.push(symbol);
        id
    }

    #[inline]
    pub fn type_symbol(&self, id: TypeId) -> &TypeSymbol {
        &self.types[id.index()]
    }

    #[inline]
    pub fn type_symbol_mut(&mut self, id: TypeId) -> &mut TypeSymbol {
        &mut self.types[id.index()]
    }

    #[inline]
    pub fn method(&self, id: MethodId) -> &MethodSymbol {
        &self.methods[id.index()]
    }

    #[inline]
    pub fn field(&self, id: FieldId) -> &FieldSymbol {
        &self.fields[id.index()]
    }

    #[inline]
    pub fn variable(&self, id: VariableId) -> &VariableSymbol {
        &self.variables[id.index()]
    }

    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    pub fn method_count(&self) -> usize {
        self.methods.len()
    }

    /// Name of a type as it appears in diagnostics, e.g. `Box<Int>`.
    pub fn display_type(&self, id: TypeId) -> String {
        let symbol = self.type_symbol(id);
        if symbol.type_arguments.is_empty() {
            return symbol.name.clone();
        }
        let arguments: Vec<String> = symbol.type_arguments.iter().map(|&arg| self.display_type(arg)).collect();
        format!("{}<{}>", symbol.name, arguments.join(", "))
    }

    pub fn method_display_name(&self, id: MethodId) -> String {
        let method = self.method(id);
        match method.containing_type {
            Some(owner) if !self.type_symbol(owner).is_entry_point() => {
                format!("{}.{}", self.display_type(owner), method.name)
            }
            _ => method.name.clone(),
        }
    }

    // ------------------------------------------------------------------------
    // Type relationships
    // ------------------------------------------------------------------------

    pub fn is_error(&self, id: TypeId) -> bool {
        id == self.builtins.error
    }

    /// The declared base of `id`. Constructed types share their
    /// definition's base.
    pub fn base_of(&self, id: TypeId) -> Option<TypeId> {
        self.type_symbol(self.member_owner(id)).base_type
    }

    /// The base types of `id`, nearest first. Stops when the chain revisits
    /// a type, so a cyclic chain terminates.
    pub fn base_chain(&self, id: TypeId) -> Vec<TypeId> {
        let mut chain = Vec::new();
        let mut seen = FxHashSet::default();
        seen.insert(id);
        let mut current = self.base_of(id);
        while let Some(base) = current {
            if !seen.insert(base) {
                break;
            }
            chain.push(base);
            current = self.base_of(base);
        }
        chain
    }

    /// Whether following base links from `id` leads back to `id`. A
    /// constructed base counts as its generic definition.
    pub fn has_cyclic_base(&self, id: TypeId) -> bool {
        let owner = self.member_owner(id);
        let mut seen = FxHashSet::default();
        let mut current = self.base_of(id);
        while let Some(base) = current {
            if self.member_owner(base) == owner {
                return true;
            }
            if !seen.insert(base) {
                return false;
            }
            current = self.base_of(base);
        }
        false
    }

    pub fn derives_from(&self, derived: TypeId, base: TypeId) -> bool {
        self.base_chain(derived).contains(&base)
    }

    /// The type whose member tables describe `id`: the generic definition
    /// for a constructed type, `id` itself otherwise.
    pub fn member_owner(&self, id: TypeId) -> TypeId {
        self.type_symbol(id).definition.unwrap_or(id)
    }

    /// Types searched for members of `id`, most derived first. A generic
    /// placeholder is searched through its constraint types.
    fn member_search_order(&self, id: TypeId) -> Vec<TypeId> {
        let mut order = Vec::new();
        let mut visited = FxHashSet::default();
        self.collect_member_owners(id, &mut order, &mut visited);
        order
    }

    fn collect_member_owners(&self, id: TypeId, order: &mut Vec<TypeId>, visited: &mut FxHashSet<TypeId>) {
        if !visited.insert(id) {
            return;
        }
        let symbol = self.type_symbol(id);
        if symbol.is_generic_parameter() {
            for &constraint in &symbol.constraints {
                self.collect_member_owners(constraint, order, visited);
            }
            return;
        }
        for candidate in std::iter::once(id).chain(self.base_chain(id)) {
            let owner = self.member_owner(candidate);
            if !order.contains(&owner) {
                order.push(owner);
            }
        }
    }

    /// A field declared directly on `owner`.
    pub fn declared_field(&self, owner: TypeId, name: &str) -> Option<FieldId> {
        self.type_symbol(owner).fields.iter().copied().find(|&field| self.field(field).name == name)
    }

    /// A method declared directly on `owner`.
    pub fn declared_method(&self, owner: TypeId, name: &str) -> Option<MethodId> {
        self.type_symbol(owner).methods.methods().find(|&method| self.method(method).name == name)
    }

    /// Find a field on `id` or one of its base types.
    pub fn lookup_field(&self, id: TypeId, name: &str) -> Option<FieldId> {
        self.member_search_order(id).into_iter().find_map(|owner| self.declared_field(owner, name))
    }

    /// Find a method on `id` or one of its base types. The most derived
    /// declaration wins, so overrides shadow what they override.
    pub fn lookup_method(&self, id: TypeId, name: &str) -> Option<MethodId> {
        self.member_search_order(id).into_iter().find_map(|owner| self.declared_method(owner, name))
    }

    // ------------------------------------------------------------------------
    // Generics
    // ------------------------------------------------------------------------

    /// The constructed type `definition<arguments>`, created on first use.
    pub fn construct(&mut self, definition: TypeId, arguments: Vec<TypeId>) -> TypeId {
        if arguments.is_empty() {
            return definition;
        }
        let key = (definition, arguments);
        if let Some(&existing) = self.constructed.get(&key) {
            return existing;
        }
        let def = self.type_symbol(definition);
        let mut symbol = TypeSymbol::new(def.name.clone(), TypeFlags::CLASS | TypeFlags::CONSTRUCTED);
        symbol.declarations = def.declarations.clone();
        symbol.definition = Some(definition);
        symbol.type_arguments = key.1.clone();
        let id = self.add_type(symbol);
        self.constructed.insert(key, id);
        id
    }

    /// Replace every occurrence of `parameters[i]` in `ty` by `arguments[i]`.
    pub fn substitute(&mut self, ty: TypeId, parameters: &[TypeId], arguments: &[TypeId]) -> TypeId {
        if let Some(position) = parameters.iter().position(|&p| p == ty) {
            return arguments.get(position).copied().unwrap_or(self.builtins.any);
        }
        let definition = self.type_symbol(ty).definition;
        match definition {
            Some(definition) => {
                let original = self.type_symbol(ty).type_arguments.clone();
                let substituted: Vec<TypeId> =
                    original.iter().map(|&arg| self.substitute(arg, parameters, arguments)).collect();
                if substituted == original {
                    ty
                } else {
                    self.construct(definition, substituted)
                }
            }
            None => ty,
        }
    }

    /// Type-parameter bindings implied by accessing a member declared on
    /// `owner` through `receiver`.
    ///
    /// Walks the base chain from `receiver` up to `owner`. Each constructed
    /// base is first substituted through the bindings of the type deriving
    /// from it, so `class IntBox : Box<Int>` binds `Box`'s `T` to `Int`.
    /// A generic placeholder is searched through its constraint types.
    pub fn member_substitution(&mut self, receiver: TypeId, owner: TypeId) -> (Vec<TypeId>, Vec<TypeId>) {
        if self.type_symbol(receiver).is_generic_parameter() {
            let constraints = self.type_symbol(receiver).constraints.clone();
            return constraints
                .into_iter()
                .find(|&constraint| self.derives_from_owner(constraint, owner))
                .map(|constraint| self.member_substitution(constraint, owner))
                .unwrap_or_default();
        }

        let mut current = receiver;
        let mut bindings = self.own_bindings(current);
        let mut seen = FxHashSet::default();
        while self.member_owner(current) != owner && seen.insert(self.member_owner(current)) {
            let Some(base) = self.base_of(current) else { break };
            let (parameters, arguments) = bindings;
            current = self.substitute(base, &parameters, &arguments);
            bindings = self.own_bindings(current);
        }
        if self.member_owner(current) == owner {
            bindings
        } else {
            (Vec::new(), Vec::new())
        }
    }

    /// The generic parameters of a constructed type's definition paired
    /// with its type arguments.
    fn own_bindings(&self, ty: TypeId) -> (Vec<TypeId>, Vec<TypeId>) {
        let symbol = self.type_symbol(ty);
        match symbol.definition {
            Some(definition) => (self.type_symbol(definition).generic_parameters.clone(), symbol.type_arguments.clone()),
            None => (Vec::new(), Vec::new()),
        }
    }

    fn derives_from_owner(&self, ty: TypeId, owner: TypeId) -> bool {
        std::iter::once(ty).chain(self.base_chain(ty)).any(|candidate| self.member_owner(candidate) == owner)
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn class(table: &mut SymbolTable, name: &str, base: Option<TypeId>) -> TypeId {
        let mut symbol = TypeSymbol::new(name, TypeFlags::CLASS);
        symbol.base_type = base;
        table.add_type(symbol)
    }

    fn field(table: &mut SymbolTable, owner: TypeId, name: &str) -> FieldId {
        let ty = table.builtins().int;
        let id = table.add_field(FieldSymbol {
            name: name.to_string(),
            declaration: None,
            containing_type: owner,
            ty,
            is_static: false,
            is_readonly: false,
        });
        table.type_symbol_mut(owner).fields.push(id);
        id
    }

    #[test]
    fn test_builtins_are_predeclared() {
        let table = SymbolTable::new();
        let builtins = *table.builtins();
        assert_eq!(table.type_symbol(builtins.any).name, "Any");
        assert_eq!(table.type_symbol(builtins.error).name, "Error");
        assert!(table.type_symbol(builtins.int).is_builtin());
        let names: Vec<&str> =
            table.builtin_functions().iter().map(|&m| table.method(m).name.as_str()).collect();
        assert_eq!(names, vec!["print", "input", "rnd"]);
    }

    #[test]
    fn test_base_chain_terminates_on_cycle() {
        let mut table = SymbolTable::new();
        let a = class(&mut table, "A", None);
        let b = class(&mut table, "B", Some(a));
        table.type_symbol_mut(a).base_type = Some(b);

        assert_eq!(table.base_chain(b), vec![a]);
        assert!(table.has_cyclic_base(a));
        assert!(table.has_cyclic_base(b));
    }

    #[test]
    fn test_lookup_field_walks_bases() {
        let mut table = SymbolTable::new();
        let any = table.builtins().any;
        let shape = class(&mut table, "Shape", Some(any));
        let square = class(&mut table, "Square", Some(shape));
        let sides = field(&mut table, shape, "sides");

        assert_eq!(table.lookup_field(square, "sides"), Some(sides));
        assert_eq!(table.lookup_field(square, "corners"), None);
        assert!(table.derives_from(square, shape));
        assert!(!table.derives_from(shape, square));
    }

    #[test]
    fn test_construct_is_interned_and_substitutes() {
        let mut table = SymbolTable::new();
        let int = table.builtins().int;
        let boxed = class(&mut table, "Box", None);
        let t = table.add_type(TypeSymbol::new("T", TypeFlags::GENERIC_PARAMETER));
        table.type_symbol_mut(boxed).generic_parameters.push(t);

        let first = table.construct(boxed, vec![int]);
        let second = table.construct(boxed, vec![int]);
        assert_eq!(first, second);
        assert_eq!(table.display_type(first), "Box<Int>");
        assert_eq!(table.member_owner(first), boxed);

        let (parameters, arguments) = table.member_substitution(first, boxed);
        assert_eq!(table.substitute(t, &parameters, &arguments), int);
    }

    #[test]
    fn test_member_substitution_walks_constructed_bases() {
        let mut table = SymbolTable::new();
        let int = table.builtins().int;
        let boxed = class(&mut table, "Box", None);
        let t = table.add_type(TypeSymbol::new("T", TypeFlags::GENERIC_PARAMETER));
        table.type_symbol_mut(boxed).generic_parameters.push(t);

        // class Wrapper<U> : Box<U>
        let wrapper = class(&mut table, "Wrapper", None);
        let u = table.add_type(TypeSymbol::new("U", TypeFlags::GENERIC_PARAMETER));
        table.type_symbol_mut(wrapper).generic_parameters.push(u);
        let box_of_u = table.construct(boxed, vec![u]);
        table.type_symbol_mut(wrapper).base_type = Some(box_of_u);

        // class IntWrapper : Wrapper<Int>
        let wrapper_of_int = table.construct(wrapper, vec![int]);
        let int_wrapper = class(&mut table, "IntWrapper", Some(wrapper_of_int));

        let (parameters, arguments) = table.member_substitution(int_wrapper, boxed);
        assert_eq!(table.substitute(t, &parameters, &arguments), int);

        let (parameters, arguments) = table.member_substitution(int_wrapper, wrapper);
        assert_eq!(table.substitute(u, &parameters, &arguments), int);
    }

    #[test]
    fn test_cycle_through_constructed_base_is_seen_from_both_ends() {
        let mut table = SymbolTable::new();
        let int = table.builtins().int;
        // class A : B<Int>, class B<T> : A
        let a = class(&mut table, "A", None);
        let b = class(&mut table, "B", Some(a));
        let t = table.add_type(TypeSymbol::new("T", TypeFlags::GENERIC_PARAMETER));
        table.type_symbol_mut(b).generic_parameters.push(t);
        let b_of_int = table.construct(b, vec![int]);
        table.type_symbol_mut(a).base_type = Some(b_of_int);

        assert!(table.has_cyclic_base(a));
        assert!(table.has_cyclic_base(b));
    }

    #[test]
    fn test_method_table_body_is_set_once() {
        let mut table = MethodTable::new();
        let body = Rc::new(BoundStatement::Block(crate::bound_tree::BoundBlock { statements: Vec::new() }));
        assert!(table.set_body(MethodId(0), body.clone()).is_err());

        assert!(table.declare(MethodId(0)));
        assert!(!table.declare(MethodId(0)));
        assert!(table.set_body(MethodId(0), body.clone()).is_ok());
        assert!(table.set_body(MethodId(0), body).is_err());
        assert!(table.body(MethodId(0)).is_some());
    }
}
