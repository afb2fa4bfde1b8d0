//! Method signatures.

use crate::context::{group_by_name, BindingContext};
use crate::scope::{ScopeId, ScopeKind};
use crate::signature::{bind_constraint_clauses, declare_generic_parameters};
use kite_diagnostics::messages::*;
use kite_semantic::{MethodFlags, MethodId, MethodSymbol, TypeId, VariableSymbol};
use kite_syntax::{FunctionDeclaration, ModifierFlags};

/// Binds the signature of one method (or top-level function) declared in
/// `owner`, whose members live in `parent`.
pub struct MethodDeclarationBinder<'c, 't> {
    ctx: &'c mut BindingContext<'t>,
    owner: TypeId,
    parent: ScopeId,
}

impl<'c, 't> MethodDeclarationBinder<'c, 't> {
    pub fn new(ctx: &'c mut BindingContext<'t>, owner: TypeId, parent: ScopeId) -> Self {
        Self { ctx, owner, parent }
    }

    /// Bind `declaration` and register it in the owner's method table and
    /// in `parent`. Top-level functions pass `force_static`.
    pub fn bind(&mut self, declaration: &'t FunctionDeclaration, force_static: bool) -> MethodId {
        let name = declaration.identifier.text.as_str();
        let location = declaration.identifier.location;
        let scope = self.ctx.scopes.create(ScopeKind::Method, Some(self.parent));

        let generic_parameters = declare_generic_parameters(self.ctx, scope, &declaration.generic_parameters);
        bind_constraint_clauses(self.ctx, scope, name, &generic_parameters, &declaration.constraints);

        let groups = group_by_name(&declaration.parameters, |parameter| parameter.identifier.text.as_str());
        for (&parameter_name, group) in groups.iter() {
            if group.len() > 1 {
                for parameter in group {
                    self.ctx.report(parameter.identifier.location, &PARAMETER_0_IS_ALREADY_DECLARED, &[parameter_name]);
                }
            }
        }

        let mut parameters = Vec::with_capacity(declaration.parameters.len());
        for parameter in &declaration.parameters {
            let ty = match &parameter.type_clause {
                Some(type_clause) => self.ctx.resolve_type(scope, type_clause),
                None => {
                    let parameter_name = parameter.identifier.text.as_str();
                    self.ctx.report(parameter.identifier.location, &PARAMETER_0_REQUIRES_AN_EXPLICIT_TYPE, &[parameter_name]);
                    self.ctx.builtins().error
                }
            };
            let variable = self.ctx.symbols.add_variable(VariableSymbol::parameter(
                parameter.identifier.text.as_str(),
                ty,
                Some(parameter.identifier.location),
            ));
            self.ctx.scopes.declare_variable(scope, &parameter.identifier.text, variable);
            parameters.push(variable);
        }

        let return_type = match &declaration.return_type {
            Some(syntax) => self.ctx.resolve_type(scope, syntax),
            None => self.ctx.builtins().void,
        };

        let flags = self.method_flags(declaration, force_static);
        let id = self.ctx.symbols.add_method(MethodSymbol {
            name: name.to_string(),
            declaration: Some(location),
            containing_type: Some(self.owner),
            flags,
            parameters,
            return_type,
            generic_parameters,
        });

        self.ctx.symbols.type_symbol_mut(self.owner).methods.declare(id);
        if !self.ctx.scopes.declare_method(self.parent, name, id) {
            self.ctx.report(location, &FUNCTION_0_IS_ALREADY_DECLARED_IN_THIS_SCOPE, &[name]);
        }
        self.ctx.set_method_scope(id, scope);
        self.ctx.set_method_syntax(id, declaration);
        id
    }

    fn method_flags(&mut self, declaration: &FunctionDeclaration, force_static: bool) -> MethodFlags {
        let name = declaration.identifier.text.as_str();
        let location = declaration.identifier.location;
        let modifiers = declaration.modifiers;
        let mut flags = MethodFlags::NONE;

        if force_static || modifiers.contains(ModifierFlags::STATIC) {
            flags |= MethodFlags::STATIC;
        }
        if modifiers.contains(ModifierFlags::VIRTUAL | ModifierFlags::OVERRIDE) {
            self.ctx.report(location, &METHOD_0_CANNOT_BE_BOTH_VIRTUAL_AND_OVERRIDE, &[name]);
        } else if modifiers.contains(ModifierFlags::VIRTUAL) {
            flags |= MethodFlags::VIRTUAL;
        } else if modifiers.contains(ModifierFlags::OVERRIDE) {
            flags |= MethodFlags::OVERRIDE;
        }

        if flags.contains(MethodFlags::STATIC) && modifiers.intersects(ModifierFlags::DISPATCH_MODIFIER) {
            self.ctx.report(location, &STATIC_METHOD_0_CANNOT_BE_VIRTUAL_OR_OVERRIDE, &[name]);
            flags.remove(MethodFlags::VIRTUAL | MethodFlags::OVERRIDE);
        }
        flags
    }
}
