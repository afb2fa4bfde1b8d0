//! Method calls and object creation.

use super::names::{MemberKind, Receiver};
use super::MethodBodyBinder;
use kite_diagnostics::messages::*;
use kite_semantic::{BoundExpression, BoundExpressionKind, BoundMethodCall, MethodId, TypeId};
use kite_syntax::{CallExpression, ObjectCreationExpression};
use std::rc::Rc;

impl MethodBodyBinder<'_, '_> {
    pub(super) fn bind_call(&mut self, node: &CallExpression) -> Rc<BoundExpression> {
        let name = node.identifier.text.as_str();

        let (receiver, method) = match &node.target {
            None => {
                let Some(method) = self.lookup_unqualified_method(name) else {
                    if let Some(ty) = self.conversion_target(node) {
                        return self.bind_conversion(&node.arguments[0], ty, true);
                    }
                    self.ctx.report(node.identifier.location, &METHOD_0_DOES_NOT_EXIST, &[name]);
                    return self.bind_failed_call(node);
                };
                let is_static = self.ctx.symbols.method(method).is_static();
                if !is_static && self.is_static_context() {
                    self.ctx.report(node.identifier.location, &INSTANCE_MEMBER_0_IN_STATIC_CONTEXT, &[name]);
                    return self.bind_failed_call(node);
                }
                (None, method)
            }
            Some(target) => match self.bind_receiver(target, name, MemberKind::Method) {
                Receiver::Error => return self.bind_failed_call(node),
                Receiver::Value(target) => {
                    let Some(method) = self.ctx.symbols.lookup_method(target.ty, name) else {
                        let type_name = self.ctx.symbols.display_type(target.ty);
                        self.ctx.report(node.identifier.location, &TYPE_1_HAS_NO_METHOD_0, &[name, &type_name]);
                        return self.bind_failed_call(node);
                    };
                    if self.ctx.symbols.method(method).is_static() {
                        let owner = self.method_owner_name(method);
                        self.ctx.report(node.identifier.location, &STATIC_MEMBER_0_MUST_BE_ACCESSED_THROUGH_TYPE_1, &[name, &owner]);
                        return self.bind_failed_call(node);
                    }
                    (Some(target), method)
                }
                Receiver::Type(ty) => {
                    let Some(method) = self.ctx.symbols.lookup_method(ty, name) else {
                        let type_name = self.ctx.symbols.display_type(ty);
                        self.ctx.report(node.identifier.location, &TYPE_1_HAS_NO_METHOD_0, &[name, &type_name]);
                        return self.bind_failed_call(node);
                    };
                    if !self.ctx.symbols.method(method).is_static() {
                        let type_name = self.ctx.symbols.display_type(ty);
                        self.ctx.report(node.identifier.location, &INSTANCE_MEMBER_0_CANNOT_BE_ACCESSED_THROUGH_TYPE_1, &[name, &type_name]);
                        return self.bind_failed_call(node);
                    }
                    (None, method)
                }
            },
        };

        self.bind_call_to(node, receiver, method)
    }

    /// Methods of the current type and its bases first, then functions
    /// visible in scope.
    fn lookup_unqualified_method(&self, name: &str) -> Option<MethodId> {
        self.owner
            .and_then(|owner| self.ctx.symbols.lookup_method(owner, name))
            .or_else(|| self.ctx.scopes.lookup_method(self.scope, name))
    }

    /// `Type(value)` with one argument and no type arguments is an
    /// explicit conversion.
    fn conversion_target(&self, node: &CallExpression) -> Option<TypeId> {
        if node.arguments.len() != 1 || !node.generic_arguments.is_empty() {
            return None;
        }
        let ty = self.ctx.scopes.lookup_type(self.scope, &node.identifier.text)?;
        let symbol = self.ctx.symbols.type_symbol(ty);
        (!symbol.is_generic_definition()).then_some(ty)
    }

    fn method_owner_name(&self, method: MethodId) -> String {
        match self.ctx.symbols.method(method).containing_type {
            Some(owner) => self.ctx.symbols.display_type(owner),
            None => String::new(),
        }
    }

    /// Bind the arguments of a call that could not be resolved so their own
    /// problems are still reported.
    fn bind_failed_call(&mut self, node: &CallExpression) -> Rc<BoundExpression> {
        for argument in &node.arguments {
            self.bind_expression(argument, false);
        }
        self.error_expression(node.location)
    }

    fn bind_call_to(&mut self, node: &CallExpression, receiver: Option<Rc<BoundExpression>>, method: MethodId) -> Rc<BoundExpression> {
        let symbol = self.ctx.symbols.method(method);
        let method_name = self.ctx.symbols.method_display_name(method);
        let generic_parameters = symbol.generic_parameters.clone();
        let declared_parameters = symbol.parameters.clone();
        let declared_return = symbol.return_type;
        let declaring_type = symbol.containing_type;

        // Type arguments. A count mismatch is reported once; the method's
        // placeholders then read as `Any`.
        let type_arguments: Vec<TypeId> = node
            .generic_arguments
            .iter()
            .map(|argument| self.ctx.resolve_type(self.scope, argument))
            .collect();
        let arity_matches = type_arguments.len() == generic_parameters.len();
        if !arity_matches {
            let expected = generic_parameters.len().to_string();
            let supplied = type_arguments.len().to_string();
            self.ctx.report(
                node.location,
                &_0_EXPECTS_1_TYPE_ARGUMENTS_BUT_2_WERE_SUPPLIED,
                &[&method_name, &expected, &supplied],
            );
        } else if !type_arguments.is_empty() {
            self.ctx.check_constraints(&generic_parameters, &type_arguments, node.location);
        }

        if node.arguments.len() != declared_parameters.len() {
            let expected = declared_parameters.len().to_string();
            let given = node.arguments.len().to_string();
            self.ctx.report(node.location, &_0_REQUIRES_1_ARGUMENTS_BUT_WAS_GIVEN_2, &[&method_name, &expected, &given]);
            return self.bind_failed_call(node);
        }

        // An unqualified call sees the method through the current type.
        let seen_through = receiver.as_ref().map(|target| target.ty).or(self.owner);
        let (mut parameters, mut arguments) = match (seen_through, declaring_type) {
            (Some(seen_through), Some(declaring_type)) => self.ctx.symbols.member_substitution(seen_through, declaring_type),
            _ => (Vec::new(), Vec::new()),
        };
        parameters.extend(generic_parameters.iter().copied());
        if arity_matches {
            arguments.extend(type_arguments.iter().copied());
        }

        let mut bound_arguments = Vec::with_capacity(node.arguments.len());
        for (argument, &parameter) in node.arguments.iter().zip(&declared_parameters) {
            let declared = self.ctx.symbols.variable(parameter).ty;
            let ty = self.ctx.symbols.substitute(declared, &parameters, &arguments);
            bound_arguments.push(self.bind_conversion(argument, ty, false));
        }
        let return_type = self.ctx.symbols.substitute(declared_return, &parameters, &arguments);

        let location = match &receiver {
            Some(target) => target.location.union(&node.location),
            None => node.identifier.location.union(&node.location),
        };
        BoundExpression::new(
            BoundExpressionKind::MethodCall(BoundMethodCall {
                receiver,
                method,
                type_arguments: if arity_matches { type_arguments } else { Vec::new() },
                arguments: bound_arguments,
            }),
            return_type,
            location,
        )
    }

    pub(super) fn bind_object_creation(&mut self, node: &ObjectCreationExpression) -> Rc<BoundExpression> {
        let name = node.type_syntax.identifier.text.as_str();
        let name_location = node.type_syntax.location();
        let Some(definition) = self.ctx.scopes.lookup_type(self.scope, name) else {
            self.ctx.report(name_location, &TYPE_0_DOES_NOT_EXIST, &[name]);
            return self.error_expression(node.location);
        };

        let symbol = self.ctx.symbols.type_symbol(definition);
        if symbol.declarations.len() > 1 {
            self.ctx.report(name_location, &TYPE_NAME_0_IS_AMBIGUOUS, &[name]);
            return self.error_expression(node.location);
        }
        if !symbol.is_class() || symbol.is_entry_point() {
            self.ctx.report(name_location, &CANNOT_CREATE_AN_INSTANCE_OF_0, &[name]);
            return self.error_expression(node.location);
        }

        let ty = self.ctx.resolve_type(self.scope, &node.type_syntax);
        if self.ctx.symbols.is_error(ty) {
            return self.error_expression(node.location);
        }
        BoundExpression::new(BoundExpressionKind::ObjectCreation, ty, node.location)
    }
}
