//! Whole-program binding.
//!
//! [`ProgramBinder`] runs every pass over a forest of syntax trees in a
//! fixed order. Each pass only starts once the previous one has seen every
//! tree, so a body may use a class declared later in another file:
//!
//! 1. declare the built-in types and functions in the root scope
//! 2. class signatures, then duplicate class names
//! 3. where clauses, base types, inheritance cycles
//! 4. member signatures
//! 5. the entry-point type and top-level function signatures
//! 6. member rules that depend on the base chain
//! 7. program shape: global statements and `main`
//! 8. class and function bodies
//! 9. the global statements, as the body of the synthesized entry point
//!
//! A program can continue a previous one ([`ProgramBinder::with_previous`]):
//! the previous global scopes become parents of the new root scope.

use crate::body::MethodBodyBinder;
use crate::context::{group_by_name, BindOptions, BindingContext};
use crate::error::BindError;
use crate::inheritance::InheritanceChecker;
use crate::method_declaration::MethodDeclarationBinder;
use crate::scope::{ScopeId, ScopeKind, Scopes};
use crate::signature::{TypeMembersSignatureBinder, TypeSignatureBinder};
use crate::type_binder::{complete_body, TypeBinder};
use kite_diagnostics::messages::*;
use kite_diagnostics::DiagnosticCollection;
use kite_semantic::{
    BoundStatement, FieldId, MethodFlags, MethodId, MethodSymbol, SymbolTable, TypeFlags, TypeId, TypeSymbol,
    VariableId,
};
use kite_syntax::{ClassDeclaration, FunctionDeclaration, StatementSyntax, SyntaxTree};
use std::rc::Rc;

/// Name of the entry point synthesized in script mode.
pub const SCRIPT_MAIN_NAME: &str = "$main";
pub const MAIN_NAME: &str = "main";

// ============================================================================
// Bound Program
// ============================================================================

/// The names one finished compilation declared in its global scope, kept
/// so a later compilation can see them.
#[derive(Debug, Clone, Default)]
pub struct GlobalScope {
    pub variables: Vec<(String, VariableId)>,
    pub types: Vec<(String, TypeId)>,
    pub methods: Vec<(String, MethodId)>,
    pub fields: Vec<(String, FieldId)>,
}

impl GlobalScope {
    /// Snapshot `scope`, leaving out the built-ins every root re-declares.
    fn capture(scopes: &Scopes, scope: ScopeId, symbols: &SymbolTable) -> Self {
        let bound = scopes.get(scope);
        Self {
            variables: bound.declared_variables().map(owned).collect(),
            types: bound
                .declared_types()
                .filter(|&(_, ty)| !symbols.type_symbol(ty).is_builtin())
                .map(owned)
                .collect(),
            methods: bound
                .declared_methods()
                .filter(|&(_, method)| !symbols.method(method).flags.contains(MethodFlags::BUILTIN))
                .map(owned)
                .collect(),
            fields: bound.declared_fields().map(owned).collect(),
        }
    }

    /// Re-create this scope below `parent`.
    fn project(&self, scopes: &mut Scopes, parent: Option<ScopeId>) -> ScopeId {
        let scope = scopes.create(ScopeKind::Global, parent);
        for (name, variable) in &self.variables {
            scopes.declare_variable(scope, name, *variable);
        }
        for (name, ty) in &self.types {
            scopes.declare_type(scope, name, *ty);
        }
        for (name, method) in &self.methods {
            scopes.declare_method(scope, name, *method);
        }
        for (name, field) in &self.fields {
            scopes.declare_field(scope, name, *field);
        }
        scope
    }
}

/// Everything downstream stages need from one compilation.
#[derive(Debug, Clone)]
pub struct BoundProgram {
    pub diagnostics: DiagnosticCollection,
    /// The entry point of a program: an explicit `main` or the one wrapping
    /// the global statements.
    pub main: Option<MethodId>,
    /// The entry point of a script. Never set together with `main`.
    pub script_main: Option<MethodId>,
    pub symbols: SymbolTable,
    /// Classes declared by this compilation, then the entry-point type.
    pub types: Vec<TypeId>,
    /// Global scopes of this compilation and the ones it continues, oldest
    /// first.
    pub globals: Vec<GlobalScope>,
}

impl BoundProgram {
    pub fn entry_point(&self) -> Option<MethodId> {
        self.main.or(self.script_main)
    }

    /// The lowered body of `method`, if it has one.
    pub fn body(&self, method: MethodId) -> Option<&Rc<BoundStatement>> {
        let owner = self.symbols.method(method).containing_type?;
        self.symbols.type_symbol(owner).methods.body(method)
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.has_errors()
    }
}

// ============================================================================
// Program Binder
// ============================================================================

pub struct ProgramBinder<'t> {
    trees: &'t [SyntaxTree],
    options: BindOptions,
    previous: Option<&'t BoundProgram>,
}

/// The synthesized type holding top-level functions and the entry point.
struct EntryType {
    ty: TypeId,
    /// `false` when a user class already uses the name.
    can_synthesize: bool,
}

impl<'t> ProgramBinder<'t> {
    pub fn new(trees: &'t [SyntaxTree], options: BindOptions) -> Self {
        Self { trees, options, previous: None }
    }

    pub fn with_previous(mut self, previous: &'t BoundProgram) -> Self {
        self.previous = Some(previous);
        self
    }

    #[tracing::instrument(skip_all, fields(trees = self.trees.len(), script = self.options.script))]
    pub fn bind(self) -> Result<BoundProgram, BindError> {
        let (symbols, mut scopes, mut globals) = match self.previous {
            Some(previous) => (previous.symbols.clone(), Scopes::new(), previous.globals.clone()),
            None => (SymbolTable::new(), Scopes::new(), Vec::new()),
        };
        let mut parent = None;
        for global in &globals {
            parent = Some(global.project(&mut scopes, parent));
        }
        let root = scopes.create(ScopeKind::Global, parent);

        let mut ctx = BindingContext::new(symbols, scopes, root, self.options.clone());
        declare_builtins(&mut ctx);

        let classes = self.bind_class_signatures(&mut ctx);
        self.bind_hierarchy(&mut ctx, &classes);
        for &(ty, class) in &classes {
            TypeMembersSignatureBinder::new(&mut ctx, ty).bind_members(class);
        }

        let functions: Vec<&'t FunctionDeclaration> = self.trees.iter().flat_map(|tree| tree.functions()).collect();
        let statements: Vec<&'t StatementSyntax> =
            self.trees.iter().flat_map(|tree| tree.global_statements()).collect();
        let entry = self.bind_entry_type(&mut ctx, &classes, &functions, !statements.is_empty());

        for &(ty, _) in &classes {
            InheritanceChecker::new(&mut ctx, ty).check();
        }

        self.check_global_statement_files(&mut ctx);
        let (main, script_main) = self.choose_entry_point(&mut ctx, &classes, entry.as_ref(), &statements);
        tracing::debug!(main = ?main, script_main = ?script_main, "entry point chosen");

        for &(ty, _) in &classes {
            TypeBinder::new(&mut ctx, ty).bind_bodies()?;
        }
        if let Some(entry) = &entry {
            TypeBinder::new(&mut ctx, entry.ty).bind_bodies()?;
        }
        self.bind_global_statements(&mut ctx, entry.as_ref(), main.or(script_main), &statements)?;

        let mut types: Vec<TypeId> = classes.iter().map(|&(ty, _)| ty).collect();
        types.extend(entry.map(|entry| entry.ty));
        globals.push(GlobalScope::capture(&ctx.scopes, root, &ctx.symbols));

        tracing::debug!(
            types = types.len(),
            diagnostics = ctx.diagnostics.len(),
            "program bound"
        );
        Ok(BoundProgram {
            diagnostics: ctx.diagnostics,
            main,
            script_main,
            symbols: ctx.symbols,
            types,
            globals,
        })
    }

    fn bind_class_signatures(&self, ctx: &mut BindingContext<'t>) -> Vec<(TypeId, &'t ClassDeclaration)> {
        let mut classes = Vec::new();
        for tree in self.trees {
            for class in tree.classes() {
                if let Some(ty) = TypeSignatureBinder::new(ctx).bind(class) {
                    classes.push((ty, class));
                }
            }
        }
        for &(ty, _) in &classes {
            TypeSignatureBinder::new(ctx).report_duplicates(ty);
        }
        tracing::debug!(classes = classes.len(), "declared class signatures");
        classes
    }

    /// Where clauses and base types. A type on an inheritance cycle is
    /// reported at every declaration and unlinked from its base.
    fn bind_hierarchy(&self, ctx: &mut BindingContext<'t>, classes: &[(TypeId, &'t ClassDeclaration)]) {
        for &(ty, class) in classes {
            TypeMembersSignatureBinder::new(ctx, ty).bind_constraints(class);
        }
        for &(ty, class) in classes {
            TypeBinder::new(ctx, ty).bind_inheritance(class);
        }

        let cyclic: Vec<TypeId> =
            classes.iter().map(|&(ty, _)| ty).filter(|&ty| ctx.symbols.has_cyclic_base(ty)).collect();
        for &ty in &cyclic {
            let symbol = ctx.symbols.type_symbol(ty);
            let (name, declarations) = (symbol.name.clone(), symbol.declarations.clone());
            for location in declarations {
                ctx.report(location, &TYPE_0_CANNOT_INHERIT_FROM_ITSELF, &[&name]);
            }
        }
        for ty in cyclic {
            ctx.symbols.type_symbol_mut(ty).base_type = None;
        }
    }

    /// Create the entry-point type when there are top-level functions or
    /// global statements, and bind the function signatures into it.
    fn bind_entry_type(
        &self,
        ctx: &mut BindingContext<'t>,
        classes: &[(TypeId, &'t ClassDeclaration)],
        functions: &[&'t FunctionDeclaration],
        has_global_statements: bool,
    ) -> Option<EntryType> {
        if functions.is_empty() && !has_global_statements {
            return None;
        }
        let name = ctx.options.main_type_name.clone();

        let conflicting = classes.iter().find(|&&(ty, _)| ctx.symbols.type_symbol(ty).name == name).map(|&(ty, _)| ty);
        if let Some(conflicting) = conflicting {
            let declarations = ctx.symbols.type_symbol(conflicting).declarations.clone();
            for location in declarations {
                ctx.report(location, &TYPE_0_CONFLICTS_WITH_THE_ENTRY_POINT_TYPE, &[&name]);
            }
        }

        let any = ctx.builtins().any;
        let ty = ctx.symbols.add_type(TypeSymbol::new(name.as_str(), TypeFlags::CLASS | TypeFlags::ENTRY_POINT));
        ctx.symbols.type_symbol_mut(ty).base_type = Some(any);

        let groups = group_by_name(functions.iter().copied(), |function| function.identifier.text.as_str());
        for (&function_name, group) in groups.iter() {
            if group.len() > 1 {
                for function in group {
                    ctx.report(function.identifier.location, &METHOD_0_IS_ALREADY_DECLARED_IN_1, &[function_name, name.as_str()]);
                }
            }
            let root = ctx.root;
            MethodDeclarationBinder::new(ctx, ty, root).bind(group[0], true);
        }

        Some(EntryType { ty, can_synthesize: conflicting.is_none() })
    }

    fn check_global_statement_files(&self, ctx: &mut BindingContext<'t>) {
        let firsts: Vec<&StatementSyntax> =
            self.trees.iter().filter_map(|tree| tree.global_statements().next()).collect();
        if firsts.len() < 2 {
            return;
        }
        for statement in firsts {
            ctx.report(statement.location(), &GLOBAL_STATEMENTS_MUST_BE_CONFINED_TO_A_SINGLE_FILE, &[]);
        }
    }

    /// Returns `(main, script_main)`.
    fn choose_entry_point(
        &self,
        ctx: &mut BindingContext<'t>,
        classes: &[(TypeId, &'t ClassDeclaration)],
        entry: Option<&EntryType>,
        statements: &[&'t StatementSyntax],
    ) -> (Option<MethodId>, Option<MethodId>) {
        let candidates = main_candidates(ctx, classes, entry);
        let can_synthesize = entry.is_some_and(|entry| entry.can_synthesize) && !statements.is_empty();

        if ctx.options.script {
            for &candidate in &candidates {
                if let Some(location) = ctx.symbols.method(candidate).declaration {
                    ctx.report(location, &MAIN_CANNOT_BE_DECLARED_IN_A_SCRIPT, &[]);
                }
            }
            let script_main = match entry {
                Some(entry) if can_synthesize => {
                    let any = ctx.builtins().any;
                    Some(synthesize_entry_point(ctx, entry.ty, SCRIPT_MAIN_NAME, any, statements))
                }
                _ => None,
            };
            return (None, script_main);
        }

        let mut explicit = None;
        for &candidate in &candidates {
            let symbol = ctx.symbols.method(candidate);
            let valid = symbol.is_static() && symbol.parameters.is_empty() && symbol.return_type == ctx.builtins().void;
            let Some(location) = symbol.declaration else { continue };
            if !valid {
                ctx.report(location, &MAIN_MUST_HAVE_THE_CORRECT_SIGNATURE, &[]);
            } else if explicit.is_none() {
                explicit = Some(candidate);
            }
            if !statements.is_empty() {
                ctx.report(location, &MAIN_CANNOT_BE_USED_WITH_GLOBAL_STATEMENTS, &[]);
            }
        }

        if !candidates.is_empty() {
            return (explicit, None);
        }
        let main = match entry {
            Some(entry) if can_synthesize => {
                let void = ctx.builtins().void;
                Some(synthesize_entry_point(ctx, entry.ty, MAIN_NAME, void, statements))
            }
            _ => None,
        };
        (main, None)
    }

    /// Bind the global statements: as the body of the synthesized entry
    /// point, or, when there is none, only for their diagnostics.
    fn bind_global_statements(
        &self,
        ctx: &mut BindingContext<'t>,
        entry: Option<&EntryType>,
        entry_point: Option<MethodId>,
        statements: &[&'t StatementSyntax],
    ) -> Result<(), BindError> {
        if statements.is_empty() {
            return Ok(());
        }
        let owner = entry.map(|entry| entry.ty);
        let root = ctx.root;
        let synthesized = entry_point.filter(|&method| ctx.symbols.method(method).is_entry_point());

        let Some(method) = synthesized else {
            MethodBodyBinder::new(ctx, None, owner, root).bind_global_statements(statements);
            return Ok(());
        };
        let script = ctx.options.script;
        let mut binder = MethodBodyBinder::new(ctx, Some(method), owner, root);
        let body = if script {
            binder.bind_script_statements(statements)
        } else {
            binder.bind_global_statements(statements)
        };
        let labels = binder.into_labels();
        complete_body(ctx, method, body, labels)?;
        Ok(())
    }
}

fn owned<T>((name, id): (&str, T)) -> (String, T) {
    (name.to_string(), id)
}

/// Declare the built-in types and functions in `ctx.root`.
fn declare_builtins(ctx: &mut BindingContext<'_>) {
    let root = ctx.root;
    let builtins = ctx.builtins();
    for ty in [builtins.any, builtins.bool, builtins.int, builtins.string, builtins.void, builtins.error] {
        let name = ctx.symbols.type_symbol(ty).name.clone();
        ctx.scopes.declare_type(root, &name, ty);
    }
    let functions = ctx.symbols.builtin_functions().to_vec();
    for function in functions {
        let name = ctx.symbols.method(function).name.clone();
        ctx.scopes.declare_method(root, &name, function);
    }
}

/// Methods that could be meant as the program's `main`: top-level
/// functions, static class methods and any method of a class named like
/// the entry-point type.
fn main_candidates(
    ctx: &BindingContext<'_>,
    classes: &[(TypeId, &ClassDeclaration)],
    entry: Option<&EntryType>,
) -> Vec<MethodId> {
    let symbols = &ctx.symbols;
    let mut candidates = Vec::new();
    if let Some(method) = entry.and_then(|entry| symbols.declared_method(entry.ty, MAIN_NAME)) {
        candidates.push(method);
    }
    for &(ty, _) in classes {
        let Some(method) = symbols.declared_method(ty, MAIN_NAME) else { continue };
        let in_main_type = symbols.type_symbol(ty).name == ctx.options.main_type_name;
        if in_main_type || symbols.method(method).is_static() {
            candidates.push(method);
        }
    }
    candidates
}

fn synthesize_entry_point(
    ctx: &mut BindingContext<'_>,
    owner: TypeId,
    name: &str,
    return_type: TypeId,
    statements: &[&StatementSyntax],
) -> MethodId {
    let method = ctx.symbols.add_method(MethodSymbol {
        name: name.to_string(),
        declaration: statements.first().map(|statement| statement.location()),
        containing_type: Some(owner),
        flags: MethodFlags::ENTRY_POINT | MethodFlags::STATIC,
        parameters: Vec::new(),
        return_type,
        generic_parameters: Vec::new(),
    });
    ctx.symbols.type_symbol_mut(owner).methods.declare(method);
    method
}
