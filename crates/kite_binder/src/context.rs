//! State shared by every pass of one compilation.

use crate::scope::{ScopeId, Scopes};
use kite_core::text::Location;
use kite_core::MultiMap;
use kite_diagnostics::messages::*;
use kite_diagnostics::{DiagnosticCollection, DiagnosticMessage};
use kite_semantic::{BuiltinTypes, Conversion, MethodId, SymbolTable, TypeId};
use kite_syntax::{FunctionDeclaration, TypeSyntax};
use rustc_hash::FxHashMap;

/// Knobs that change what the binder accepts.
#[derive(Debug, Clone)]
pub struct BindOptions {
    /// Wrap global statements into `$main` returning `Any`.
    pub script: bool,
    /// Name of the synthesized type that owns top-level functions and the
    /// entry point.
    pub main_type_name: String,
    pub check_definite_assignment: bool,
}

impl Default for BindOptions {
    fn default() -> Self {
        Self {
            script: false,
            main_type_name: "Program".to_string(),
            check_definite_assignment: true,
        }
    }
}

/// The symbol table, scope arena and diagnostics of one compilation,
/// threaded by `&mut` through every binder.
pub struct BindingContext<'t> {
    pub symbols: SymbolTable,
    pub scopes: Scopes,
    pub diagnostics: DiagnosticCollection,
    pub options: BindOptions,
    /// The global scope of this compilation.
    pub root: ScopeId,
    type_scopes: FxHashMap<TypeId, ScopeId>,
    method_scopes: FxHashMap<MethodId, ScopeId>,
    method_syntax: FxHashMap<MethodId, &'t FunctionDeclaration>,
}

impl<'t> BindingContext<'t> {
    pub fn new(symbols: SymbolTable, scopes: Scopes, root: ScopeId, options: BindOptions) -> Self {
        Self {
            symbols,
            scopes,
            diagnostics: DiagnosticCollection::new(),
            options,
            root,
            type_scopes: FxHashMap::default(),
            method_scopes: FxHashMap::default(),
            method_syntax: FxHashMap::default(),
        }
    }

    #[inline]
    pub fn report(&mut self, location: Location, message: &DiagnosticMessage, args: &[&str]) {
        self.diagnostics.report(location, message, args);
    }

    #[inline]
    pub fn builtins(&self) -> BuiltinTypes {
        *self.symbols.builtins()
    }

    pub fn type_scope(&self, ty: TypeId) -> Option<ScopeId> {
        self.type_scopes.get(&ty).copied()
    }

    pub fn set_type_scope(&mut self, ty: TypeId, scope: ScopeId) {
        self.type_scopes.insert(ty, scope);
    }

    pub fn method_scope(&self, method: MethodId) -> Option<ScopeId> {
        self.method_scopes.get(&method).copied()
    }

    pub fn set_method_scope(&mut self, method: MethodId, scope: ScopeId) {
        self.method_scopes.insert(method, scope);
    }

    pub fn method_syntax(&self, method: MethodId) -> Option<&'t FunctionDeclaration> {
        self.method_syntax.get(&method).copied()
    }

    pub fn set_method_syntax(&mut self, method: MethodId, syntax: &'t FunctionDeclaration) {
        self.method_syntax.insert(method, syntax);
    }

    // ------------------------------------------------------------------------
    // Type references
    // ------------------------------------------------------------------------

    /// Resolve a written type in `scope`. Failures are reported and yield
    /// the `Error` type.
    pub fn resolve_type(&mut self, scope: ScopeId, syntax: &TypeSyntax) -> TypeId {
        let error = self.builtins().error;
        let name = syntax.identifier.text.as_str();
        let Some(definition) = self.scopes.lookup_type(scope, name) else {
            self.report(syntax.location(), &TYPE_0_DOES_NOT_EXIST, &[name]);
            return error;
        };

        let arguments: Vec<TypeId> = syntax
            .generic_arguments
            .iter()
            .map(|argument| self.resolve_type(scope, argument))
            .collect();
        let parameters = self.symbols.type_symbol(definition).generic_parameters.clone();
        if parameters.len() != arguments.len() {
            let expected = parameters.len().to_string();
            let supplied = arguments.len().to_string();
            self.report(
                syntax.location(),
                &_0_EXPECTS_1_TYPE_ARGUMENTS_BUT_2_WERE_SUPPLIED,
                &[name, &expected, &supplied],
            );
            return error;
        }
        if arguments.is_empty() {
            return definition;
        }

        self.check_constraints(&parameters, &arguments, syntax.location());
        self.symbols.construct(definition, arguments)
    }

    /// Check every argument against the constraints of its parameter.
    pub fn check_constraints(&mut self, parameters: &[TypeId], arguments: &[TypeId], location: Location) {
        for (&parameter, &argument) in parameters.iter().zip(arguments) {
            if self.symbols.is_error(argument) {
                continue;
            }
            let constraints = self.symbols.type_symbol(parameter).constraints.clone();
            for constraint in constraints {
                let constraint = self.symbols.substitute(constraint, parameters, arguments);
                if Conversion::classify(&self.symbols, argument, constraint).is_implicit() {
                    continue;
                }
                let argument_name = self.symbols.display_type(argument);
                let constraint_name = self.symbols.display_type(constraint);
                let parameter_name = self.symbols.type_symbol(parameter).name.clone();
                self.report(
                    location,
                    &TYPE_0_DOES_NOT_SATISFY_CONSTRAINT_1_OF_2,
                    &[&argument_name, &constraint_name, &parameter_name],
                );
            }
        }
    }
}

/// Group declarations by name, names in first-seen order.
pub(crate) fn group_by_name<'a, T>(
    items: impl IntoIterator<Item = &'a T>,
    name: impl Fn(&'a T) -> &'a str,
) -> MultiMap<&'a str, &'a T>
where
    T: 'a,
{
    let mut groups = MultiMap::new();
    for item in items {
        groups.insert(name(item), item);
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scope::ScopeKind;
    use kite_core::text::SourceId;
    use kite_semantic::{TypeFlags, TypeSymbol};
    use kite_syntax::TreeBuilder;

    fn context() -> BindingContext<'static> {
        let symbols = SymbolTable::new();
        let mut scopes = Scopes::new();
        let root = scopes.create(ScopeKind::Global, None);
        let builtins = *symbols.builtins();
        scopes.declare_type(root, "Int", builtins.int);
        scopes.declare_type(root, "Any", builtins.any);
        BindingContext::new(symbols, scopes, root, BindOptions::default())
    }

    #[test]
    fn test_undefined_type_is_reported_once() {
        let mut ctx = context();
        let b = TreeBuilder::new(SourceId(0), "a.kt");
        let root = ctx.root;
        let ty = ctx.resolve_type(root, &b.ty("Missing"));

        assert!(ctx.symbols.is_error(ty));
        let codes: Vec<&str> = ctx.diagnostics.diagnostics().iter().map(|d| d.code).collect();
        assert_eq!(codes, vec!["KT2002"]);
    }

    #[test]
    fn test_generic_arity_and_construction() {
        let mut ctx = context();
        let root = ctx.root;
        let boxed = ctx.symbols.add_type(TypeSymbol::new("Box", TypeFlags::CLASS | TypeFlags::GENERIC_DEFINITION));
        let t = ctx.symbols.add_type(TypeSymbol::new("T", TypeFlags::GENERIC_PARAMETER));
        ctx.symbols.type_symbol_mut(boxed).generic_parameters.push(t);
        ctx.scopes.declare_type(root, "Box", boxed);

        let b = TreeBuilder::new(SourceId(0), "a.kt");
        let good = ctx.resolve_type(root, &b.generic_ty("Box", vec![b.ty("Int")]));
        assert_eq!(ctx.symbols.display_type(good), "Box<Int>");
        assert!(ctx.diagnostics.is_empty());

        let bare = ctx.resolve_type(root, &b.ty("Box"));
        assert!(ctx.symbols.is_error(bare));
        assert_eq!(ctx.diagnostics.diagnostics()[0].code, "KT1008");
    }

    #[test]
    fn test_group_by_name_keeps_first_seen_order() {
        let names = ["b", "a", "b"];
        let groups = group_by_name(names.iter(), |name| *name);
        let keys: Vec<&str> = groups.iter().map(|(key, _)| *key).collect();
        assert_eq!(keys, vec!["b", "a"]);
        assert_eq!(groups.get(&"b").map(|group| group.len()), Some(2));
    }
}
