//! The scope chain.
//!
//! Scopes live in one arena and point at their parent by id. Each scope
//! keeps separate, insertion-ordered name maps for variables, types,
//! methods and fields; lookups walk outward and stop at the first hit.

use kite_core::OrderedMap;
use kite_semantic::{FieldId, MethodId, TypeId, VariableId};

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct ScopeId(pub u32);

impl ScopeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    /// The root of one compilation, or a projected previous submission.
    Global,
    /// The members and generic parameters of a class.
    Type,
    /// The parameters and generic parameters of one method.
    Method,
    Block,
}

#[derive(Debug, Clone)]
pub struct BoundScope {
    pub kind: ScopeKind,
    pub parent: Option<ScopeId>,
    variables: OrderedMap<String, VariableId>,
    types: OrderedMap<String, TypeId>,
    methods: OrderedMap<String, MethodId>,
    fields: OrderedMap<String, FieldId>,
}

impl BoundScope {
    fn new(kind: ScopeKind, parent: Option<ScopeId>) -> Self {
        Self {
            kind,
            parent,
            variables: OrderedMap::new(),
            types: OrderedMap::new(),
            methods: OrderedMap::new(),
            fields: OrderedMap::new(),
        }
    }

    pub fn declared_variables(&self) -> impl Iterator<Item = (&str, VariableId)> {
        self.variables.iter().map(|(name, &id)| (name.as_str(), id))
    }

    pub fn declared_types(&self) -> impl Iterator<Item = (&str, TypeId)> {
        self.types.iter().map(|(name, &id)| (name.as_str(), id))
    }

    pub fn declared_methods(&self) -> impl Iterator<Item = (&str, MethodId)> {
        self.methods.iter().map(|(name, &id)| (name.as_str(), id))
    }

    pub fn declared_fields(&self) -> impl Iterator<Item = (&str, FieldId)> {
        self.fields.iter().map(|(name, &id)| (name.as_str(), id))
    }
}

/// Arena of every scope created during one compilation.
#[derive(Debug, Clone, Default)]
pub struct Scopes {
    scopes: Vec<BoundScope>,
}

impl Scopes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&mut self, kind: ScopeKind, parent: Option<ScopeId>) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        self.scopes.push(BoundScope::new(kind, parent));
        id
    }

    #[inline]
    pub fn get(&self, id: ScopeId) -> &BoundScope {
        &self.scopes[id.index()]
    }

    /// `id` followed by its ancestors, innermost first.
    pub fn ancestors(&self, id: ScopeId) -> impl Iterator<Item = ScopeId> + '_ {
        std::iter::successors(Some(id), move |&current| self.get(current).parent)
    }

    // ------------------------------------------------------------------------
    // Declaration
    // ------------------------------------------------------------------------

    /// Declare a variable. Fails if a variable of that name is visible
    /// anywhere between `scope` and the nearest method or global scope.
    pub fn declare_variable(&mut self, scope: ScopeId, name: &str, variable: VariableId) -> bool {
        for current in self.ancestors(scope) {
            let current = self.get(current);
            if current.variables.contains_key(name) {
                return false;
            }
            if matches!(current.kind, ScopeKind::Method | ScopeKind::Global) {
                break;
            }
        }
        self.scopes[scope.index()].variables.insert(name.to_string(), variable);
        true
    }

    /// Declare a type. Types may shadow outer types.
    pub fn declare_type(&mut self, scope: ScopeId, name: &str, ty: TypeId) -> bool {
        let types = &mut self.scopes[scope.index()].types;
        if types.contains_key(name) {
            return false;
        }
        types.insert(name.to_string(), ty);
        true
    }

    /// Declare a method. Fails if `scope` already declares one of that name.
    pub fn declare_method(&mut self, scope: ScopeId, name: &str, method: MethodId) -> bool {
        let methods = &mut self.scopes[scope.index()].methods;
        if methods.contains_key(name) {
            return false;
        }
        methods.insert(name.to_string(), method);
        true
    }

    /// Declare a field. Fails if `scope` already declares one of that name.
    pub fn declare_field(&mut self, scope: ScopeId, name: &str, field: FieldId) -> bool {
        let fields = &mut self.scopes[scope.index()].fields;
        if fields.contains_key(name) {
            return false;
        }
        fields.insert(name.to_string(), field);
        true
    }

    // ------------------------------------------------------------------------
    // Lookup
    // ------------------------------------------------------------------------

    pub fn lookup_variable(&self, scope: ScopeId, name: &str) -> Option<VariableId> {
        self.ancestors(scope).find_map(|id| self.get(id).variables.get(name).copied())
    }

    pub fn lookup_type(&self, scope: ScopeId, name: &str) -> Option<TypeId> {
        self.ancestors(scope).find_map(|id| self.get(id).types.get(name).copied())
    }

    pub fn lookup_method(&self, scope: ScopeId, name: &str) -> Option<MethodId> {
        self.ancestors(scope).find_map(|id| self.get(id).methods.get(name).copied())
    }

    pub fn lookup_field(&self, scope: ScopeId, name: &str) -> Option<FieldId> {
        self.ancestors(scope).find_map(|id| self.get(id).fields.get(name).copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_walks_parents_and_shadows() {
        let mut scopes = Scopes::new();
        let root = scopes.create(ScopeKind::Global, None);
        let class = scopes.create(ScopeKind::Type, Some(root));
        assert!(scopes.declare_type(root, "T", TypeId(10)));
        assert!(scopes.declare_type(class, "T", TypeId(11)));

        assert_eq!(scopes.lookup_type(class, "T"), Some(TypeId(11)));
        assert_eq!(scopes.lookup_type(root, "T"), Some(TypeId(10)));
        assert_eq!(scopes.lookup_type(class, "U"), None);
        assert!(!scopes.declare_type(class, "T", TypeId(12)));
    }

    #[test]
    fn test_variables_conflict_up_to_method_scope() {
        let mut scopes = Scopes::new();
        let root = scopes.create(ScopeKind::Global, None);
        let class = scopes.create(ScopeKind::Type, Some(root));
        let method = scopes.create(ScopeKind::Method, Some(class));
        let block = scopes.create(ScopeKind::Block, Some(method));
        let inner = scopes.create(ScopeKind::Block, Some(block));

        assert!(scopes.declare_variable(root, "x", VariableId(0)));
        assert!(scopes.declare_variable(method, "p", VariableId(1)));
        assert!(scopes.declare_variable(block, "x", VariableId(2)));
        assert!(!scopes.declare_variable(inner, "x", VariableId(3)));
        assert!(!scopes.declare_variable(inner, "p", VariableId(4)));
        assert_eq!(scopes.lookup_variable(inner, "x"), Some(VariableId(2)));
    }

    #[test]
    fn test_declared_symbols_keep_order() {
        let mut scopes = Scopes::new();
        let root = scopes.create(ScopeKind::Global, None);
        scopes.declare_method(root, "zeta", MethodId(0));
        scopes.declare_method(root, "alpha", MethodId(1));
        assert!(!scopes.declare_method(root, "zeta", MethodId(2)));

        let names: Vec<&str> = scopes.get(root).declared_methods().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["zeta", "alpha"]);
    }
}
