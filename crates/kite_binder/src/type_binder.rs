//! Whole-type completion: the inheritance clause, then every method body.

use crate::body::MethodBodyBinder;
use crate::context::BindingContext;
use crate::error::BindError;
use kite_diagnostics::messages::*;
use kite_flow::ControlFlowGraph;
use kite_lowering::{InstructionStream, Lowerer};
use kite_semantic::{BoundStatement, LabelGenerator, MethodId, TypeId};
use kite_syntax::ClassDeclaration;
use std::rc::Rc;

pub struct TypeBinder<'c, 't> {
    ctx: &'c mut BindingContext<'t>,
    ty: TypeId,
}

impl<'c, 't> TypeBinder<'c, 't> {
    pub fn new(ctx: &'c mut BindingContext<'t>, ty: TypeId) -> Self {
        Self { ctx, ty }
    }

    /// Link the base type named in `class`, or `Any` when there is none.
    /// A base that cannot be inherited from is reported and left unlinked.
    pub fn bind_inheritance(&mut self, class: &ClassDeclaration) {
        let any = self.ctx.builtins().any;
        let Some(syntax) = &class.base else {
            self.ctx.symbols.type_symbol_mut(self.ty).base_type = Some(any);
            return;
        };
        let Some(scope) = self.ctx.type_scope(self.ty) else { return };

        let base = self.ctx.resolve_type(scope, syntax);
        if self.ctx.symbols.is_error(base) {
            return;
        }
        let base_symbol = self.ctx.symbols.type_symbol(base);
        if (base_symbol.is_builtin() && base != any) || base_symbol.is_generic_parameter() {
            let base_name = self.ctx.symbols.display_type(base);
            self.ctx.report(syntax.location(), &TYPE_0_CANNOT_DERIVE_FROM_BUILTIN_1, &[&class.identifier.text, &base_name]);
            return;
        }
        self.ctx.symbols.type_symbol_mut(self.ty).base_type = Some(base);
    }

    /// Bind, lower and check the body of every user-written method.
    #[tracing::instrument(level = "debug", skip_all, fields(ty = %self.ctx.symbols.display_type(self.ty)))]
    pub fn bind_bodies(&mut self) -> Result<(), BindError> {
        let methods: Vec<MethodId> = self.ctx.symbols.type_symbol(self.ty).methods.methods().collect();
        for method in methods {
            if self.ctx.symbols.method(method).is_entry_point() {
                continue;
            }
            let Some(syntax) = self.ctx.method_syntax(method) else { continue };
            let Some(body) = &syntax.body else { continue };
            let Some(scope) = self.ctx.method_scope(method) else {
                return Err(BindError::MissingMethodSymbol(self.ctx.symbols.method_display_name(method)));
            };

            let mut binder = MethodBodyBinder::new(self.ctx, Some(method), Some(self.ty), scope);
            let bound = binder.bind_body(body);
            let labels = binder.into_labels();
            complete_body(self.ctx, method, bound, labels)?;
        }
        Ok(())
    }
}

/// Lower a bound body, run the flow analyses over it and store it in its
/// method table cell.
pub fn complete_body(
    ctx: &mut BindingContext<'_>,
    method: MethodId,
    body: Rc<BoundStatement>,
    labels: LabelGenerator,
) -> Result<Rc<BoundStatement>, BindError> {
    let builtins = ctx.builtins();
    let name = ctx.symbols.method_display_name(method);
    let lowered = Lowerer::new(labels, builtins).lower(&body);

    let stream = InstructionStream::new(&lowered).map_err(|source| BindError::MalformedBody { method: name.clone(), source })?;
    let graph = ControlFlowGraph::build(&stream, &builtins);

    let symbol = ctx.symbols.method(method);
    let (return_type, is_entry_point, declaration, owner) =
        (symbol.return_type, symbol.is_entry_point(), symbol.declaration, symbol.containing_type);
    let needs_value = return_type != builtins.void && !ctx.symbols.is_error(return_type) && !is_entry_point;
    if needs_value && !graph.all_paths_return() {
        if let Some(location) = declaration {
            ctx.report(location, &NOT_ALL_CODE_PATHS_OF_0_RETURN_A_VALUE, &[&name]);
        }
    }

    if ctx.options.check_definite_assignment {
        for read in graph.uninitialized_reads(&ctx.symbols) {
            let variable = ctx.symbols.variable(read.variable).name.clone();
            ctx.report(read.location, &USE_OF_POSSIBLY_UNINITIALIZED_VARIABLE_0, &[&variable]);
        }
    }

    tracing::debug!(
        method = %name,
        statements = stream.len(),
        blocks = graph.blocks().len(),
        edges = graph.edges().len(),
        "lowered method body"
    );

    let owner = owner.ok_or_else(|| BindError::MissingTypeSymbol(name.clone()))?;
    ctx.symbols
        .type_symbol(owner)
        .methods
        .set_body(method, Rc::clone(&lowered))
        .map_err(|_| BindError::BodyAlreadyBound(name))?;
    Ok(lowered)
}
