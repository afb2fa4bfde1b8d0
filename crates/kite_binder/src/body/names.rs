//! Identifiers, `this` and member access.
//!
//! A bare identifier may name a local variable, a field of the current type
//! and a type at the same time. On its own it resolves in that order. When
//! it is the target of `.member`, the candidate whose type actually has
//! `member` wins; several winners are ambiguous, and no winner falls back
//! to the first candidate so the member lookup reports the real problem.

use super::MethodBodyBinder;
use kite_core::text::Location;
use kite_diagnostics::messages::*;
use kite_semantic::{
    BoundExpression, BoundExpressionKind, BoundMemberAccess, BoundMemberAssignment, FieldId, TypeId, VariableId,
};
use kite_syntax::{ExpressionSyntax, Identifier, MemberAccessExpression, MemberAssignmentExpression};
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NameCandidate {
    Variable(VariableId),
    Field(FieldId),
    Type(TypeId),
}

/// What the member after a name is expected to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum MemberKind {
    Field,
    Method,
}

/// The left side of `target.member`.
pub(super) enum Receiver {
    Value(Rc<BoundExpression>),
    Type(TypeId),
    /// Binding failed and has been reported.
    Error,
}

impl MethodBodyBinder<'_, '_> {
    // ------------------------------------------------------------------------
    // Names
    // ------------------------------------------------------------------------

    fn name_candidates(&self, name: &str) -> Vec<NameCandidate> {
        let mut candidates = Vec::new();
        if let Some(variable) = self.ctx.scopes.lookup_variable(self.scope, name) {
            candidates.push(NameCandidate::Variable(variable));
        }
        if let Some(field) = self.implicit_field(name) {
            candidates.push(NameCandidate::Field(field));
        }
        if let Some(ty) = self.ctx.scopes.lookup_type(self.scope, name) {
            candidates.push(NameCandidate::Type(ty));
        }
        candidates
    }

    /// A field of the current type (or its bases) usable without `this.`.
    pub(super) fn implicit_field(&self, name: &str) -> Option<FieldId> {
        let owner = self.owner?;
        self.ctx.symbols.lookup_field(owner, name)
    }

    pub(super) fn bind_name(&mut self, identifier: &Identifier) -> Rc<BoundExpression> {
        let name = identifier.text.as_str();
        match self.name_candidates(name).first().copied() {
            Some(candidate) => self.bind_candidate_value(candidate, identifier),
            None => {
                self.ctx.report(identifier.location, &THE_NAME_0_DOES_NOT_EXIST, &[name]);
                self.error_expression(identifier.location)
            }
        }
    }

    fn bind_candidate_value(&mut self, candidate: NameCandidate, identifier: &Identifier) -> Rc<BoundExpression> {
        let location = identifier.location;
        match candidate {
            NameCandidate::Variable(variable) => {
                let ty = self.ctx.symbols.variable(variable).ty;
                BoundExpression::new(BoundExpressionKind::Variable(variable), ty, location)
            }
            NameCandidate::Field(field) => self.bind_implicit_field_access(field, identifier),
            NameCandidate::Type(_) => {
                self.ctx.report(location, &_0_IS_A_TYPE_NOT_A_VALUE, &[&identifier.text]);
                self.error_expression(location)
            }
        }
    }

    fn bind_implicit_field_access(&mut self, field: FieldId, identifier: &Identifier) -> Rc<BoundExpression> {
        if !self.ctx.symbols.field(field).is_static && self.is_static_context() {
            self.ctx.report(identifier.location, &INSTANCE_MEMBER_0_IN_STATIC_CONTEXT, &[&identifier.text]);
            return self.error_expression(identifier.location);
        }
        let ty = match self.owner {
            Some(owner) => self.field_type_through(owner, field),
            None => self.ctx.symbols.field(field).ty,
        };
        BoundExpression::new(BoundExpressionKind::Field(field), ty, identifier.location)
    }

    /// The type of `field` as seen through a value of type `receiver`, with
    /// the generic parameters of the declaring type substituted.
    fn field_type_through(&mut self, receiver: TypeId, field: FieldId) -> TypeId {
        let symbol = self.ctx.symbols.field(field);
        let (declared, owner) = (symbol.ty, symbol.containing_type);
        let (parameters, arguments) = self.ctx.symbols.member_substitution(receiver, owner);
        self.ctx.symbols.substitute(declared, &parameters, &arguments)
    }

    pub(super) fn bind_this(&mut self, location: Location) -> Rc<BoundExpression> {
        match self.owner {
            Some(owner) if !self.is_static_context() => BoundExpression::new(BoundExpressionKind::This, owner, location),
            _ => {
                self.ctx.report(location, &THIS_IS_NOT_AVAILABLE_IN_A_STATIC_CONTEXT, &[]);
                self.error_expression(location)
            }
        }
    }

    // ------------------------------------------------------------------------
    // Receivers
    // ------------------------------------------------------------------------

    /// Bind the target of `target.member`.
    pub(super) fn bind_receiver(&mut self, target: &ExpressionSyntax, member: &str, kind: MemberKind) -> Receiver {
        let ExpressionSyntax::Name(identifier) = target else {
            let bound = self.bind_expression(target, false);
            return if bound.is_error() { Receiver::Error } else { Receiver::Value(bound) };
        };

        let name = identifier.text.as_str();
        let candidates = self.name_candidates(name);
        let chosen = match candidates.as_slice() {
            [] => {
                self.ctx.report(identifier.location, &THE_NAME_0_DOES_NOT_EXIST, &[name]);
                return Receiver::Error;
            }
            [only] => *only,
            _ => {
                let matching: Vec<NameCandidate> = candidates
                    .iter()
                    .copied()
                    .filter(|&candidate| self.candidate_has_member(candidate, member, kind))
                    .collect();
                match matching.as_slice() {
                    [single] => *single,
                    [] => candidates[0],
                    _ => {
                        let described = self.describe_candidates(name, &matching);
                        self.ctx.report(identifier.location, &ACCESS_TO_0_IS_AMBIGUOUS_BETWEEN_1, &[name, &described]);
                        return Receiver::Error;
                    }
                }
            }
        };

        match chosen {
            NameCandidate::Type(ty) => Receiver::Type(ty),
            candidate => {
                let bound = self.bind_candidate_value(candidate, identifier);
                if bound.is_error() {
                    Receiver::Error
                } else {
                    Receiver::Value(bound)
                }
            }
        }
    }

    /// Whether accessing `member` through `candidate` would find something
    /// of the right kind: an instance member through a value, a static one
    /// through a type.
    fn candidate_has_member(&self, candidate: NameCandidate, member: &str, kind: MemberKind) -> bool {
        let symbols = &self.ctx.symbols;
        let (ty, wants_static) = match candidate {
            NameCandidate::Variable(variable) => (symbols.variable(variable).ty, false),
            NameCandidate::Field(field) => (symbols.field(field).ty, false),
            NameCandidate::Type(ty) => (ty, true),
        };
        match kind {
            MemberKind::Field => symbols
                .lookup_field(ty, member)
                .is_some_and(|field| symbols.field(field).is_static == wants_static),
            MemberKind::Method => symbols
                .lookup_method(ty, member)
                .is_some_and(|method| symbols.method(method).is_static() == wants_static),
        }
    }

    fn describe_candidates(&self, name: &str, candidates: &[NameCandidate]) -> String {
        let described: Vec<String> = candidates
            .iter()
            .map(|candidate| match candidate {
                NameCandidate::Variable(_) => format!("variable '{}'", name),
                NameCandidate::Field(_) => format!("field '{}'", name),
                NameCandidate::Type(_) => format!("type '{}'", name),
            })
            .collect();
        match described.split_last() {
            Some((last, rest)) if !rest.is_empty() => format!("{} and {}", rest.join(", "), last),
            _ => described.join(""),
        }
    }

    // ------------------------------------------------------------------------
    // Member access
    // ------------------------------------------------------------------------

    /// Resolve `member` as a field through `receiver`, reporting misuse.
    /// Returns the receiver expression (if any), the field and its type as
    /// seen through the receiver.
    fn resolve_field(&mut self, receiver: Receiver, member: &Identifier) -> Option<(Option<Rc<BoundExpression>>, FieldId, TypeId)> {
        let name = member.text.as_str();
        match receiver {
            Receiver::Error => None,
            Receiver::Value(target) => {
                let Some(field) = self.ctx.symbols.lookup_field(target.ty, name) else {
                    let type_name = self.ctx.symbols.display_type(target.ty);
                    self.ctx.report(member.location, &TYPE_1_HAS_NO_FIELD_0, &[name, &type_name]);
                    return None;
                };
                let symbol = self.ctx.symbols.field(field);
                let (is_static, owner) = (symbol.is_static, symbol.containing_type);
                if is_static {
                    let owner_name = self.ctx.symbols.display_type(owner);
                    self.ctx.report(member.location, &STATIC_MEMBER_0_MUST_BE_ACCESSED_THROUGH_TYPE_1, &[name, &owner_name]);
                    return None;
                }
                let ty = self.field_type_through(target.ty, field);
                Some((Some(target), field, ty))
            }
            Receiver::Type(ty) => {
                let Some(field) = self.ctx.symbols.lookup_field(ty, name) else {
                    let type_name = self.ctx.symbols.display_type(ty);
                    self.ctx.report(member.location, &TYPE_1_HAS_NO_FIELD_0, &[name, &type_name]);
                    return None;
                };
                let symbol = self.ctx.symbols.field(field);
                let (declared, is_static) = (symbol.ty, symbol.is_static);
                if !is_static {
                    let type_name = self.ctx.symbols.display_type(ty);
                    self.ctx.report(member.location, &INSTANCE_MEMBER_0_CANNOT_BE_ACCESSED_THROUGH_TYPE_1, &[name, &type_name]);
                    return None;
                }
                Some((None, field, declared))
            }
        }
    }

    pub(super) fn bind_member_access(&mut self, node: &MemberAccessExpression) -> Rc<BoundExpression> {
        let location = node.target.location().union(&node.member.location);
        let receiver = self.bind_receiver(&node.target, &node.member.text, MemberKind::Field);
        match self.resolve_field(receiver, &node.member) {
            Some((target, field, ty)) => {
                BoundExpression::new(BoundExpressionKind::MemberAccess(BoundMemberAccess { target, field }), ty, location)
            }
            None => self.error_expression(location),
        }
    }

    pub(super) fn bind_member_assignment(&mut self, node: &MemberAssignmentExpression) -> Rc<BoundExpression> {
        let location = node.target.location().union(&node.expression.location());
        let receiver = self.bind_receiver(&node.target, &node.member.text, MemberKind::Field);
        match self.resolve_field(receiver, &node.member) {
            Some((target, field, ty)) => self.finish_field_assignment(target, field, ty, &node.member, &node.expression, location),
            None => {
                self.bind_expression(&node.expression, true);
                self.error_expression(location)
            }
        }
    }

    /// `field = value` where `field` is reached without a written target.
    pub(super) fn bind_field_assignment(
        &mut self,
        target: Option<Rc<BoundExpression>>,
        field: FieldId,
        identifier: &Identifier,
        value: &ExpressionSyntax,
        location: Location,
    ) -> Rc<BoundExpression> {
        if !self.ctx.symbols.field(field).is_static && self.is_static_context() {
            self.ctx.report(identifier.location, &INSTANCE_MEMBER_0_IN_STATIC_CONTEXT, &[&identifier.text]);
            self.bind_expression(value, true);
            return self.error_expression(location);
        }
        let ty = match self.owner {
            Some(owner) => self.field_type_through(owner, field),
            None => self.ctx.symbols.field(field).ty,
        };
        self.finish_field_assignment(target, field, ty, identifier, value, location)
    }

    fn finish_field_assignment(
        &mut self,
        target: Option<Rc<BoundExpression>>,
        field: FieldId,
        ty: TypeId,
        member: &Identifier,
        value: &ExpressionSyntax,
        location: Location,
    ) -> Rc<BoundExpression> {
        let expression = self.bind_conversion(value, ty, false);
        if self.ctx.symbols.field(field).is_readonly {
            self.ctx.report(member.location, &_0_IS_READONLY, &[&member.text]);
        }
        BoundExpression::new(
            BoundExpressionKind::MemberAssignment(BoundMemberAssignment { target, field, expression }),
            ty,
            location,
        )
    }
}
