//! Class declarations and member signatures.
//!
//! [`TypeSignatureBinder`] creates one type symbol per class name.
//! [`TypeMembersSignatureBinder`] then fills in where clauses, fields and
//! method signatures. No body is bound until every class has been through
//! both.

use crate::context::{group_by_name, BindingContext};
use crate::method_declaration::MethodDeclarationBinder;
use crate::scope::ScopeKind;
use kite_diagnostics::messages::*;
use kite_semantic::{FieldSymbol, TypeFlags, TypeId, TypeSymbol};
use kite_syntax::{ClassDeclaration, ClassMember, ConstraintClause, Identifier, ModifierFlags};

pub struct TypeSignatureBinder<'c, 't> {
    ctx: &'c mut BindingContext<'t>,
}

impl<'c, 't> TypeSignatureBinder<'c, 't> {
    pub fn new(ctx: &'c mut BindingContext<'t>) -> Self {
        Self { ctx }
    }

    /// Declare the class in the root scope. Returns `None` when the name is
    /// already taken in this compilation; the extra declaration site is
    /// recorded on the first symbol for later reporting.
    pub fn bind(&mut self, class: &ClassDeclaration) -> Option<TypeId> {
        let root = self.ctx.root;
        let name = class.identifier.text.as_str();
        let location = class.identifier.location;

        let existing = self.ctx.scopes.get(root).declared_types().find(|(n, _)| *n == name).map(|(_, id)| id);
        if let Some(existing) = existing {
            if self.ctx.symbols.type_symbol(existing).is_builtin() {
                self.ctx.report(location, &CLASS_0_IS_ALREADY_DECLARED, &[name]);
            } else {
                self.ctx.symbols.type_symbol_mut(existing).declarations.push(location);
            }
            return None;
        }

        let mut flags = TypeFlags::CLASS;
        if !class.generic_parameters.is_empty() {
            flags |= TypeFlags::GENERIC_DEFINITION;
        }
        let ty = self.ctx.symbols.add_type(TypeSymbol::new(name, flags).declared_at(location));
        self.ctx.scopes.declare_type(root, name, ty);

        let scope = self.ctx.scopes.create(ScopeKind::Type, Some(root));
        self.ctx.set_type_scope(ty, scope);

        let parameters = declare_generic_parameters(self.ctx, scope, &class.generic_parameters);
        self.ctx.symbols.type_symbol_mut(ty).generic_parameters = parameters;
        Some(ty)
    }

    /// Report every declaration of a class name declared more than once.
    pub fn report_duplicates(&mut self, ty: TypeId) {
        let symbol = self.ctx.symbols.type_symbol(ty);
        if symbol.declarations.len() < 2 {
            return;
        }
        let name = symbol.name.clone();
        for location in symbol.declarations.clone() {
            self.ctx.report(location, &CLASS_0_IS_ALREADY_DECLARED, &[&name]);
        }
    }
}

/// Declare a placeholder type per generic parameter in `scope`. A name used
/// twice is reported at each use; only its first placeholder is visible.
pub(crate) fn declare_generic_parameters(
    ctx: &mut BindingContext<'_>,
    scope: crate::scope::ScopeId,
    identifiers: &[Identifier],
) -> Vec<TypeId> {
    let groups = group_by_name(identifiers, |identifier| identifier.text.as_str());
    for (&name, group) in groups.iter() {
        if group.len() > 1 {
            for identifier in group {
                ctx.report(identifier.location, &TYPE_PARAMETER_0_IS_ALREADY_DECLARED, &[name]);
            }
        }
    }

    identifiers
        .iter()
        .map(|identifier| {
            let placeholder = TypeSymbol::new(identifier.text.as_str(), TypeFlags::GENERIC_PARAMETER)
                .declared_at(identifier.location);
            let id = ctx.symbols.add_type(placeholder);
            ctx.scopes.declare_type(scope, &identifier.text, id);
            id
        })
        .collect()
}

/// Attach where-clause constraints to the placeholders in `parameters`.
/// Undefined constraint types are reported and dropped.
pub(crate) fn bind_constraint_clauses(
    ctx: &mut BindingContext<'_>,
    scope: crate::scope::ScopeId,
    owner_name: &str,
    parameters: &[TypeId],
    clauses: &[ConstraintClause],
) {
    for clause in clauses {
        let name = clause.parameter.text.as_str();
        let Some(parameter) = parameters.iter().copied().find(|&p| ctx.symbols.type_symbol(p).name == name) else {
            ctx.report(clause.parameter.location, &_0_IS_NOT_A_TYPE_PARAMETER_OF_1, &[name, owner_name]);
            continue;
        };
        for syntax in &clause.constraints {
            let constraint = ctx.resolve_type(scope, syntax);
            if !ctx.symbols.is_error(constraint) {
                ctx.symbols.type_symbol_mut(parameter).constraints.push(constraint);
            }
        }
    }
}

pub struct TypeMembersSignatureBinder<'c, 't> {
    ctx: &'c mut BindingContext<'t>,
    ty: TypeId,
}

impl<'c, 't> TypeMembersSignatureBinder<'c, 't> {
    pub fn new(ctx: &'c mut BindingContext<'t>, ty: TypeId) -> Self {
        Self { ctx, ty }
    }

    pub fn bind_constraints(&mut self, class: &ClassDeclaration) {
        let Some(scope) = self.ctx.type_scope(self.ty) else { return };
        let parameters = self.ctx.symbols.type_symbol(self.ty).generic_parameters.clone();
        bind_constraint_clauses(self.ctx, scope, &class.identifier.text, &parameters, &class.constraints);
    }

    /// Bind every field, then every method signature. Colliding names are
    /// reported at each declaration and only the first one is bound.
    pub fn bind_members(&mut self, class: &'t ClassDeclaration) {
        let Some(scope) = self.ctx.type_scope(self.ty) else { return };
        let class_name = class.identifier.text.as_str();

        let mut fields = Vec::new();
        let mut methods = Vec::new();
        let groups = group_by_name(&class.members, |member| member.identifier().text.as_str());
        for (&name, group) in groups.iter() {
            if name == class_name {
                for member in group {
                    self.ctx.report(member.identifier().location, &MEMBER_0_CANNOT_SHARE_THE_NAME_OF_ITS_CLASS, &[name]);
                }
                continue;
            }
            if group.len() > 1 {
                let has_field = group.iter().any(|member| matches!(member, ClassMember::Field(_)));
                let has_method = group.iter().any(|member| matches!(member, ClassMember::Method(_)));
                let message = match (has_field, has_method) {
                    (true, true) => &MEMBER_0_IS_DECLARED_AS_FIELD_AND_METHOD_IN_1,
                    (true, false) => &FIELD_0_IS_ALREADY_DECLARED_IN_1,
                    _ => &METHOD_0_IS_ALREADY_DECLARED_IN_1,
                };
                for member in group {
                    self.ctx.report(member.identifier().location, message, &[name, class_name]);
                }
            }
            match group[0] {
                ClassMember::Field(field) => fields.push(field),
                ClassMember::Method(method) => methods.push(method),
            }
        }

        for field in fields {
            let ty = self.ctx.resolve_type(scope, &field.type_clause);
            let id = self.ctx.symbols.add_field(FieldSymbol {
                name: field.identifier.text.clone(),
                declaration: Some(field.identifier.location),
                containing_type: self.ty,
                ty,
                is_static: field.modifiers.contains(ModifierFlags::STATIC),
                is_readonly: field.modifiers.contains(ModifierFlags::READONLY),
            });
            self.ctx.symbols.type_symbol_mut(self.ty).fields.push(id);
            self.ctx.scopes.declare_field(scope, &field.identifier.text, id);
        }

        for method in methods {
            MethodDeclarationBinder::new(self.ctx, self.ty, scope).bind(method, false);
        }

        tracing::debug!(class = class_name, members = class.members.len(), "bound member signatures");
    }
}
