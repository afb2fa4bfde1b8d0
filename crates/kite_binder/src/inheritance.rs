//! Member rules that depend on the base chain: hiding, overriding and
//! members introduced incompatibly by two different bases.

use crate::context::BindingContext;
use kite_diagnostics::messages::*;
use kite_semantic::{FieldId, MethodId, TypeId};

pub struct InheritanceChecker<'c, 't> {
    ctx: &'c mut BindingContext<'t>,
    ty: TypeId,
}

impl<'c, 't> InheritanceChecker<'c, 't> {
    pub fn new(ctx: &'c mut BindingContext<'t>, ty: TypeId) -> Self {
        Self { ctx, ty }
    }

    pub fn check(&mut self) {
        let Some(base) = self.ctx.symbols.base_of(self.ty) else { return };
        if self.ctx.symbols.has_cyclic_base(self.ty) {
            return;
        }
        let methods: Vec<MethodId> = self.ctx.symbols.type_symbol(self.ty).methods.methods().collect();
        for method in methods {
            self.check_method(base, method);
        }
        let fields = self.ctx.symbols.type_symbol(self.ty).fields.clone();
        for field in fields {
            self.check_field(base, field);
        }
        self.check_base_conflicts();
    }

    fn check_method(&mut self, base: TypeId, method: MethodId) {
        let symbols = &self.ctx.symbols;
        let symbol = symbols.method(method);
        let Some(location) = symbol.declaration else { return };
        let name = symbol.name.clone();
        let is_override = symbol.is_override();

        if let Some(field) = symbols.lookup_field(base, &name) {
            let owner = symbols.display_type(symbols.field(field).containing_type);
            self.ctx.report(location, &MEMBER_0_HIDES_INHERITED_MEMBER_OF_1, &[&name, &owner]);
            return;
        }

        let inherited = symbols.lookup_method(base, &name);
        match (inherited, is_override) {
            (None, true) => {
                self.ctx.report(location, &METHOD_0_HAS_NO_VIRTUAL_METHOD_TO_OVERRIDE, &[&name]);
            }
            (None, false) => {}
            (Some(inherited), true) => {
                let base_symbol = symbols.method(inherited);
                if !(base_symbol.is_virtual() || base_symbol.is_override()) {
                    self.ctx.report(location, &METHOD_0_HAS_NO_VIRTUAL_METHOD_TO_OVERRIDE, &[&name]);
                } else if !self.signatures_match(method, inherited) {
                    let owner = self.owner_name(inherited);
                    self.ctx.report(location, &METHOD_0_DOES_NOT_MATCH_OVERRIDDEN_IN_1, &[&name, &owner]);
                }
            }
            (Some(inherited), false) => {
                let owner = self.owner_name(inherited);
                self.ctx.report(location, &METHOD_0_IS_ALREADY_DECLARED_IN_BASE_1, &[&name, &owner]);
            }
        }
    }

    fn check_field(&mut self, base: TypeId, field: FieldId) {
        let symbols = &self.ctx.symbols;
        let symbol = symbols.field(field);
        let Some(location) = symbol.declaration else { return };
        let name = symbol.name.clone();

        let owner = if let Some(inherited) = symbols.lookup_field(base, &name) {
            symbols.field(inherited).containing_type
        } else if let Some(inherited) = symbols.lookup_method(base, &name) {
            match symbols.method(inherited).containing_type {
                Some(owner) => owner,
                None => return,
            }
        } else {
            return;
        };
        let owner = symbols.display_type(owner);
        self.ctx.report(location, &MEMBER_0_HIDES_INHERITED_MEMBER_OF_1, &[&name, &owner]);
    }

    /// Two different bases introducing one name, at least one of them as a
    /// field, leave the inherited member ambiguous.
    fn check_base_conflicts(&mut self) {
        let symbols = &self.ctx.symbols;
        // (name, introducing type, is a field)
        let mut introduced: Vec<(String, TypeId, bool)> = Vec::new();
        for base in symbols.base_chain(self.ty) {
            let owner = symbols.member_owner(base);
            let base_symbol = symbols.type_symbol(owner);
            for &field in &base_symbol.fields {
                introduced.push((symbols.field(field).name.clone(), owner, true));
            }
            for method in base_symbol.methods.methods() {
                introduced.push((symbols.method(method).name.clone(), owner, false));
            }
        }

        let type_name = symbols.display_type(self.ty);
        let declarations = symbols.type_symbol(self.ty).declarations.clone();
        let mut reported: Vec<String> = Vec::new();
        let mut findings = Vec::new();
        for (index, (name, first_owner, first_is_field)) in introduced.iter().enumerate() {
            if reported.contains(name) {
                continue;
            }
            let conflict = introduced[index + 1..].iter().find(|(other_name, other_owner, other_is_field)| {
                other_name == name && other_owner != first_owner && (*first_is_field || *other_is_field)
            });
            if let Some((_, second_owner, _)) = conflict {
                reported.push(name.clone());
                findings.push((name.clone(), symbols.display_type(*first_owner), symbols.display_type(*second_owner)));
            }
        }

        for (name, first, second) in findings {
            for &location in &declarations {
                self.ctx.report(location, &MEMBER_0_OF_1_IS_INTRODUCED_BY_BOTH_2_AND_3, &[&name, &type_name, &first, &second]);
            }
        }
    }

    fn signatures_match(&self, method: MethodId, inherited: MethodId) -> bool {
        let symbols = &self.ctx.symbols;
        let (a, b) = (symbols.method(method), symbols.method(inherited));
        a.return_type == b.return_type
            && a.is_static() == b.is_static()
            && a.generic_parameters.len() == b.generic_parameters.len()
            && a.parameters.len() == b.parameters.len()
            && a.parameters
                .iter()
                .zip(&b.parameters)
                .all(|(&x, &y)| symbols.variable(x).ty == symbols.variable(y).ty)
    }

    fn owner_name(&self, method: MethodId) -> String {
        match self.ctx.symbols.method(method).containing_type {
            Some(owner) => self.ctx.symbols.display_type(owner),
            None => String::new(),
        }
    }
}
