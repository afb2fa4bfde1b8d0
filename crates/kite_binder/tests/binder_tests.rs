//! End-to-end binder tests over forests built with `TreeBuilder`.

use kite_binder::{bind, BindOptions, BoundProgram};
use kite_core::text::SourceId;
use kite_semantic::{BoundStatement, BoundTreePrinter, MethodId};
use kite_syntax::{BinaryOperatorKind, ExpressionSyntax, MemberSyntax, ModifierFlags, SyntaxTree, TreeBuilder};

fn builder() -> TreeBuilder {
    TreeBuilder::new(SourceId(0), "main.kt")
}

fn bind_program(trees: &[SyntaxTree]) -> BoundProgram {
    bind(trees, BindOptions::default()).expect("binding should not fault")
}

fn bind_script(trees: &[SyntaxTree]) -> BoundProgram {
    let options = BindOptions { script: true, ..BindOptions::default() };
    bind(trees, options).expect("binding should not fault")
}

fn codes(program: &BoundProgram) -> Vec<&'static str> {
    program.diagnostics.diagnostics().iter().map(|d| d.code).collect()
}

fn count(program: &BoundProgram, code: &str) -> usize {
    codes(program).iter().filter(|c| **c == code).count()
}

fn method_named(program: &BoundProgram, name: &str) -> MethodId {
    program
        .types
        .iter()
        .flat_map(|&ty| program.symbols.type_symbol(ty).methods.methods())
        .find(|&method| program.symbols.method(method).name == name)
        .unwrap_or_else(|| panic!("no method named {}", name))
}

/// Every lowered body of the program, printed, in declaration order.
fn printed_bodies(program: &BoundProgram) -> Vec<String> {
    let mut printer = BoundTreePrinter::new(&program.symbols);
    program
        .types
        .iter()
        .flat_map(|&ty| program.symbols.type_symbol(ty).methods.methods())
        .filter_map(|method| program.body(method).map(|body| printer.print(body)))
        .collect()
}

// ============================================================================
// Declarations
// ============================================================================

#[test]
fn test_field_and_method_collision_is_reported_at_every_site() {
    let b = builder();
    let class = b
        .class("C")
        .field("foo", "Int")
        .field("foo", "Int")
        .method(b.function("foo").body(vec![]).build())
        .build();
    let program = bind_program(&[b.finish(vec![class.into()])]);

    assert_eq!(count(&program, "KT1007"), 3);
    assert_eq!(program.diagnostics.len(), 3);
}

#[test]
fn test_duplicate_class_is_reported_at_every_declaration() {
    let a = TreeBuilder::new(SourceId(0), "a.kt");
    let b = TreeBuilder::new(SourceId(1), "b.kt");
    let first = a.finish(vec![a.class("Shape").build().into()]);
    let second = b.finish(vec![b.class("Shape").build().into()]);

    let program = bind_program(&[first, second]);

    assert_eq!(codes(&program), vec!["KT1001", "KT1001"]);
}

#[test]
fn test_class_named_like_builtin_is_reported() {
    let b = builder();
    let program = bind_program(&[b.finish(vec![b.class("Int").build().into()])]);

    assert_eq!(codes(&program), vec!["KT1001"]);
}

#[test]
fn test_member_named_like_class_is_reported() {
    let b = builder();
    let class = b.class("Node").field("Node", "Int").build();
    let program = bind_program(&[b.finish(vec![class.into()])]);

    assert_eq!(codes(&program), vec!["KT1006"]);
}

#[test]
fn test_duplicate_parameter_and_missing_parameter_type() {
    let b = builder();
    let function = b
        .function("f")
        .param("a", "Int")
        .param("a", "Int")
        .untyped_param("b")
        .body(vec![])
        .build();
    let program = bind_program(&[b.finish(vec![function.into()])]);

    assert_eq!(count(&program, "KT1004"), 2);
    assert_eq!(count(&program, "KT1010"), 1);
}

#[test]
fn test_generic_constraint_violation() {
    let b = builder();
    let animal = b.class("Animal").build();
    let cage = b.class("Cage").generic("T").constraint("T", &["Animal"]).build();
    let main = b
        .function("main")
        .body(vec![b.var("c", None, Some(b.new_object(b.generic_ty("Cage", vec![b.ty("Int")]))))])
        .build();
    let program = bind_program(&[b.finish(vec![animal.into(), cage.into(), main.into()])]);

    assert_eq!(codes(&program), vec!["KT1009"]);
}

#[test]
fn test_virtual_and_override_together_is_reported() {
    let b = builder();
    let class = b
        .class("Shape")
        .method(b.function("area").modifiers(ModifierFlags::VIRTUAL | ModifierFlags::OVERRIDE).body(vec![]).build())
        .build();
    let program = bind_program(&[b.finish(vec![class.into()])]);

    assert_eq!(count(&program, "KT1011"), 1);
}

#[test]
fn test_function_named_like_builtin_is_reported() {
    let b = builder();
    let function = b.function("print").param("value", "Int").body(vec![]).build();
    let statement = b.expr_stmt(b.call("print", vec![b.string("hi")]));
    let program = bind_program(&[b.finish(vec![function.into(), statement.into()])]);

    assert_eq!(codes(&program), vec!["KT1016"]);
}

// ============================================================================
// Generic calls
// ============================================================================

fn identity_box(b: &TreeBuilder) -> MemberSyntax {
    b.class("Box")
        .method(
            b.function("id")
                .modifiers(ModifierFlags::STATIC)
                .generic("T")
                .param("value", "T")
                .returns("T")
                .body(vec![b.ret(Some(b.name("value")))])
                .build(),
        )
        .build()
        .into()
}

#[test]
fn test_generic_arity_mismatch_is_reported_once() {
    let b = builder();
    let call = b.call_generic(Some(b.name("Box")), "id", vec![b.ty("Int"), b.ty("Bool")], vec![b.int(1)]);
    let main = b.function("main").body(vec![b.expr_stmt(call)]).build();
    let program = bind_program(&[b.finish(vec![identity_box(&b), main.into()])]);

    assert_eq!(codes(&program), vec!["KT1008"]);
}

#[test]
fn test_generic_arity_mismatch_is_reported_once_with_bad_arguments() {
    let b = builder();
    let call = b.call_generic(Some(b.name("Box")), "id", vec![], vec![b.int(1), b.int(2)]);
    let main = b.function("main").body(vec![b.expr_stmt(call)]).build();
    let program = bind_program(&[b.finish(vec![identity_box(&b), main.into()])]);

    assert_eq!(count(&program, "KT1008"), 1);
    assert_eq!(count(&program, "KT3006"), 1);
}

#[test]
fn test_type_arguments_on_non_generic_callee() {
    let b = builder();
    let call = b.call_generic(None, "print", vec![b.ty("Int")], vec![b.int(1)]);
    let main = b.function("main").body(vec![b.expr_stmt(call)]).build();
    let program = bind_program(&[b.finish(vec![main.into()])]);

    assert_eq!(codes(&program), vec!["KT1008"]);
}

#[test]
fn test_generic_call_substitutes_return_type() {
    let b = builder();
    let call = b.call_generic(Some(b.name("Box")), "id", vec![b.ty("Int")], vec![b.int(1)]);
    let main = b.function("main").body(vec![b.var("n", Some("Int"), Some(call))]).build();
    let program = bind_program(&[b.finish(vec![identity_box(&b), main.into()])]);

    assert!(codes(&program).is_empty(), "{:?}", codes(&program));
}

// ============================================================================
// Names and conversions
// ============================================================================

#[test]
fn test_variable_and_field_with_same_member_are_ambiguous() {
    let b = builder();
    let counter = b.class("Counter").field("value", "Int").build();
    let holder = b
        .class("Holder")
        .field("item", "Counter")
        .method(
            b.function("run")
                .body(vec![
                    b.var("item", Some("Counter"), Some(b.new_object(b.ty("Counter")))),
                    b.expr_stmt(b.member_assign(b.name("item"), "value", b.int(1))),
                ])
                .build(),
        )
        .build();
    let program = bind_program(&[b.finish(vec![counter.into(), holder.into()])]);

    assert_eq!(codes(&program), vec!["KT2006"]);
}

#[test]
fn test_member_shape_picks_variable_or_type() {
    let b = builder();
    let counter = b
        .class("Counter")
        .field("value", "Int")
        .member(b.field_with("total", "Int", ModifierFlags::STATIC))
        .build();
    let main = b
        .function("main")
        .body(vec![
            b.var("Counter", Some("Counter"), Some(b.new_object(b.ty("Counter")))),
            b.expr_stmt(b.member_assign(b.name("Counter"), "value", b.int(1))),
            b.expr_stmt(b.member_assign(b.name("Counter"), "total", b.int(2))),
        ])
        .build();
    let program = bind_program(&[b.finish(vec![counter.into(), main.into()])]);

    assert!(codes(&program).is_empty(), "{:?}", codes(&program));
}

#[test]
fn test_no_matching_candidate_reports_the_member_problem() {
    let b = builder();
    let counter = b.class("Counter").field("value", "Int").build();
    let main = b
        .function("main")
        .body(vec![
            b.var("Counter", Some("Counter"), Some(b.new_object(b.ty("Counter")))),
            b.expr_stmt(b.member_assign(b.name("Counter"), "missing", b.int(1))),
        ])
        .build();
    let program = bind_program(&[b.finish(vec![counter.into(), main.into()])]);

    assert_eq!(codes(&program), vec!["KT2005"]);
}

#[test]
fn test_implicit_and_explicit_conversions() {
    let b = builder();
    let main = b
        .function("main")
        .body(vec![
            b.var("s", Some("String"), Some(b.int(1))),
            b.var("flag", Some("Bool"), Some(b.int(1))),
            b.var("n", Some("Int"), Some(b.call("Int", vec![b.string("5")]))),
        ])
        .build();
    let program = bind_program(&[b.finish(vec![main.into()])]);

    assert_eq!(codes(&program), vec!["KT3001", "KT3002"]);
}

#[test]
fn test_undefined_operator_and_names() {
    let b = builder();
    let main = b
        .function("main")
        .body(vec![
            b.var("x", None, Some(b.binary(b.bool(true), BinaryOperatorKind::Add, b.int(1)))),
            b.expr_stmt(b.assign("missing", b.int(1))),
            b.expr_stmt(b.call("nowhere", vec![])),
        ])
        .build();
    let program = bind_program(&[b.finish(vec![main.into()])]);

    assert_eq!(codes(&program), vec!["KT3004", "KT2001", "KT2003"]);
}

#[test]
fn test_readonly_assignments_are_reported() {
    let b = builder();
    let class = b
        .class("Config")
        .member(b.field_with("limit", "Int", ModifierFlags::READONLY))
        .method(
            b.function("reset")
                .body(vec![
                    b.let_("fixed", None, Some(b.int(1))),
                    b.expr_stmt(b.assign("fixed", b.int(2))),
                    b.expr_stmt(b.member_assign(b.this(), "limit", b.int(3))),
                ])
                .build(),
        )
        .build();
    let program = bind_program(&[b.finish(vec![class.into()])]);

    assert_eq!(codes(&program), vec!["KT3007", "KT3007"]);
}

#[test]
fn test_this_in_static_method() {
    let b = builder();
    let class = b
        .class("Util")
        .field("value", "Int")
        .method(
            b.function("make")
                .modifiers(ModifierFlags::STATIC)
                .body(vec![b.expr_stmt(b.member_assign(b.this(), "value", b.int(1)))])
                .build(),
        )
        .build();
    let program = bind_program(&[b.finish(vec![class.into()])]);

    assert_eq!(codes(&program), vec!["KT2009"]);
}

#[test]
fn test_local_cannot_redeclare_parameter() {
    let b = builder();
    let function = b.function("f").param("a", "Int").body(vec![b.var("a", Some("Int"), Some(b.int(1)))]).build();
    let program = bind_program(&[b.finish(vec![function.into()])]);

    assert_eq!(codes(&program), vec!["KT1005"]);
}

// ============================================================================
// Control flow
// ============================================================================

#[test]
fn test_missing_return_is_reported_once_at_method() {
    let b = builder();
    let function = b
        .function("pick")
        .param("flag", "Bool")
        .returns("Int")
        .body(vec![b.if_(b.name("flag"), b.block(vec![b.ret(Some(b.int(1)))]), None)])
        .build();
    let name_location = function.identifier.location;
    let program = bind_program(&[b.finish(vec![function.into()])]);

    assert_eq!(codes(&program), vec!["KT4005"]);
    assert_eq!(program.diagnostics.diagnostics()[0].location, Some(name_location));
}

#[test]
fn test_returning_on_every_path_is_accepted() {
    let b = builder();
    let function = b
        .function("pick")
        .param("flag", "Bool")
        .returns("Int")
        .body(vec![b.if_(
            b.name("flag"),
            b.block(vec![b.ret(Some(b.int(1)))]),
            Some(b.block(vec![b.ret(Some(b.int(2)))])),
        )])
        .build();
    let program = bind_program(&[b.finish(vec![function.into()])]);

    assert!(codes(&program).is_empty(), "{:?}", codes(&program));
}

#[test]
fn test_variable_declared_in_one_branch_is_possibly_uninitialized() {
    let b = builder();
    let function = b
        .function("show")
        .param("flag", "Bool")
        .body(vec![
            b.if_(b.name("flag"), b.var("x", Some("Int"), Some(b.int(1))), None),
            b.expr_stmt(b.call("print", vec![b.name("x")])),
        ])
        .build();
    let program = bind_program(&[b.finish(vec![function.into()])]);

    assert_eq!(codes(&program), vec!["KT4006"]);
}

#[test]
fn test_variable_declared_before_if_is_assigned() {
    let b = builder();
    let function = b
        .function("show")
        .param("flag", "Bool")
        .body(vec![
            b.var("x", Some("Int"), Some(b.int(0))),
            b.if_(b.name("flag"), b.expr_stmt(b.assign("x", b.int(1))), None),
            b.expr_stmt(b.call("print", vec![b.name("x")])),
        ])
        .build();
    let program = bind_program(&[b.finish(vec![function.into()])]);

    assert!(codes(&program).is_empty(), "{:?}", codes(&program));
}

fn assign_under(b: &TreeBuilder, condition: ExpressionSyntax) -> SyntaxTree {
    let check = b
        .function("check")
        .param("flag", "Bool")
        .body(vec![
            b.var("x", Some("Int"), None),
            b.if_(condition, b.block(vec![b.expr_stmt(b.assign("x", b.int(1)))]), None),
            b.expr_stmt(b.call("print", vec![b.name("x")])),
        ])
        .build();
    b.finish(vec![check.into()])
}

#[test]
fn test_assignment_under_literal_true_is_definite() {
    let b = builder();
    let program = bind_program(&[assign_under(&b, b.bool(true))]);

    assert!(!codes(&program).contains(&"KT4006"), "{:?}", codes(&program));
}

#[test]
fn test_assignment_under_unknown_condition_is_not_definite() {
    let b = builder();
    let program = bind_program(&[assign_under(&b, b.name("flag"))]);

    assert_eq!(count(&program, "KT4006"), 1);
}

#[test]
fn test_definite_assignment_can_be_disabled() {
    let b = builder();
    let tree = assign_under(&b, b.name("flag"));
    let options = BindOptions { check_definite_assignment: false, ..BindOptions::default() };
    let program = bind(&[tree], options).expect("binding should not fault");

    assert_eq!(count(&program, "KT4006"), 0);
}

#[test]
fn test_loop_jumps_and_returns() {
    let b = builder();
    let function = b
        .function("run")
        .body(vec![
            b.break_(),
            b.while_(b.bool(true), b.block(vec![b.break_(), b.continue_()])),
            b.ret(Some(b.int(1))),
        ])
        .build();
    let needs_value = b.function("value").returns("Int").body(vec![b.ret(None)]).build();
    let program = bind_program(&[b.finish(vec![function.into(), needs_value.into()])]);

    assert_eq!(codes(&program), vec!["KT4001", "KT4003", "KT4004"]);
}

#[test]
fn test_bodies_are_stored_lowered() {
    let b = builder();
    let function = b
        .function("count")
        .body(vec![b.for_("i", b.int(1), b.int(3), b.expr_stmt(b.call("print", vec![b.name("i")])))])
        .build();
    let program = bind_program(&[b.finish(vec![function.into()])]);

    let body = program.body(method_named(&program, "count")).expect("body is stored");
    let BoundStatement::Block(block) = body.as_ref() else { panic!("lowered body is a block") };
    assert!(block.statements.iter().all(|statement| !statement.is_structured()));
}

// ============================================================================
// Inheritance
// ============================================================================

#[test]
fn test_cyclic_inheritance_terminates_and_is_reported() {
    let b = builder();
    let a = b.class("A").base("B").build();
    let c = b.class("B").base("A").build();
    let program = bind_program(&[b.finish(vec![a.into(), c.into()])]);

    assert_eq!(codes(&program), vec!["KT5001", "KT5001"]);
    for &ty in &program.types {
        assert!(program.symbols.type_symbol(ty).base_type.is_none());
    }
}

#[test]
fn test_self_inheritance_is_reported() {
    let b = builder();
    let program = bind_program(&[b.finish(vec![b.class("Loop").base("Loop").build().into()])]);

    assert_eq!(codes(&program), vec!["KT5001"]);
}

#[test]
fn test_cycle_through_constructed_base_is_reported_on_both_types() {
    let b = builder();
    let a = b.class("A").base_type(b.generic_ty("B", vec![b.ty("Int")])).build();
    let generic = b.class("B").generic("T").base("A").build();
    let program = bind_program(&[b.finish(vec![a.into(), generic.into()])]);

    assert_eq!(codes(&program), vec!["KT5001", "KT5001"]);
}

#[test]
fn test_builtin_and_undefined_bases() {
    let b = builder();
    let number = b.class("Number").base("Int").build();
    let orphan = b.class("Orphan").base("Missing").build();
    let program = bind_program(&[b.finish(vec![number.into(), orphan.into()])]);

    assert_eq!(codes(&program), vec!["KT5006", "KT2002"]);
}

#[test]
fn test_override_rules() {
    let b = builder();
    let base = b
        .class("Base")
        .method(b.function("speak").modifiers(ModifierFlags::VIRTUAL).returns("Int").body(vec![b.ret(Some(b.int(1)))]).build())
        .method(b.function("plain").body(vec![]).build())
        .method(b.function("shape").modifiers(ModifierFlags::VIRTUAL).body(vec![]).build())
        .build();
    let derived = b
        .class("Derived")
        .base("Base")
        .method(b.function("speak").modifiers(ModifierFlags::OVERRIDE).returns("Int").body(vec![b.ret(Some(b.int(2)))]).build())
        .method(b.function("plain").body(vec![]).build())
        .method(b.function("missing").modifiers(ModifierFlags::OVERRIDE).body(vec![]).build())
        .method(b.function("shape").modifiers(ModifierFlags::OVERRIDE).param("x", "Int").body(vec![]).build())
        .build();
    let program = bind_program(&[b.finish(vec![base.into(), derived.into()])]);

    assert_eq!(codes(&program), vec!["KT5003", "KT5004", "KT5005"]);
}

#[test]
fn test_field_and_method_from_different_bases_conflict() {
    let b = builder();
    let a = b.class("A").field("x", "Int").build();
    let middle = b.class("B").base("A").method(b.function("x").body(vec![]).build()).build();
    let leaf = b.class("C").base("B").build();
    let program = bind_program(&[b.finish(vec![a.into(), middle.into(), leaf.into()])]);

    assert_eq!(codes(&program), vec!["KT5007", "KT5002"]);
}

#[test]
fn test_derived_converts_to_base() {
    let b = builder();
    let animal = b.class("Animal").build();
    let dog = b.class("Dog").base("Animal").build();
    let main = b
        .function("main")
        .body(vec![
            b.var("a", Some("Animal"), Some(b.new_object(b.ty("Dog")))),
            b.var("d", Some("Dog"), Some(b.name("a"))),
        ])
        .build();
    let program = bind_program(&[b.finish(vec![animal.into(), dog.into(), main.into()])]);

    assert_eq!(codes(&program), vec!["KT3001"]);
}

/// `class Box<T> { value: T; get(): T }` and `class IntBox : Box<Int>` with
/// extra members using what it inherits.
fn generic_base_classes(b: &TreeBuilder) -> Vec<MemberSyntax> {
    let boxed = b
        .class("Box")
        .generic("T")
        .field("value", "T")
        .method(b.function("get").returns("T").body(vec![b.ret(Some(b.name("value")))]).build())
        .build();
    let int_box = b
        .class("IntBox")
        .base_type(b.generic_ty("Box", vec![b.ty("Int")]))
        .method(b.function("read").returns("Int").body(vec![b.ret(Some(b.name("value")))]).build())
        .method(
            b.function("twice")
                .returns("Int")
                .body(vec![b.ret(Some(b.binary(b.call("get", vec![]), BinaryOperatorKind::Add, b.call("get", vec![]))))])
                .build(),
        )
        .method(
            b.function("reset")
                .body(vec![b.expr_stmt(b.assign("value", b.int(0)))])
                .build(),
        )
        .build();
    vec![boxed.into(), int_box.into()]
}

#[test]
fn test_members_inherited_through_constructed_base_are_substituted() {
    let b = builder();
    let mut members = generic_base_classes(&b);
    let main = b
        .function("main")
        .body(vec![
            b.var("v", Some("IntBox"), Some(b.new_object(b.ty("IntBox")))),
            b.var("n", Some("Int"), Some(b.member(b.name("v"), "value"))),
            b.var("m", Some("Int"), Some(b.call_on(b.name("v"), "get", vec![]))),
            b.expr_stmt(b.member_assign(b.name("v"), "value", b.binary(b.name("n"), BinaryOperatorKind::Add, b.name("m")))),
        ])
        .build();
    members.push(main.into());
    let program = bind_program(&[b.finish(members)]);

    assert!(codes(&program).is_empty(), "{:?}", codes(&program));
}

#[test]
fn test_inherited_member_keeps_substituted_type() {
    let b = builder();
    let mut members = generic_base_classes(&b);
    let main = b
        .function("main")
        .body(vec![
            b.var("v", Some("IntBox"), Some(b.new_object(b.ty("IntBox")))),
            b.var("s", Some("Bool"), Some(b.member(b.name("v"), "value"))),
        ])
        .build();
    members.push(main.into());
    let program = bind_program(&[b.finish(members)]);

    let messages: Vec<&str> = program.diagnostics.diagnostics().iter().map(|d| d.message_text.as_str()).collect();
    assert_eq!(codes(&program), vec!["KT3002"]);
    assert!(messages[0].contains("'Int'"), "{:?}", messages);
}

#[test]
fn test_substitution_follows_generic_base_chain() {
    let b = builder();
    let mut members = generic_base_classes(&b);
    // class Wrapper<U> : Box<U>, class StringWrapper : Wrapper<String>
    let wrapper = b.class("Wrapper").generic("U").base_type(b.generic_ty("Box", vec![b.ty("U")])).build();
    let strings = b.class("StringWrapper").base_type(b.generic_ty("Wrapper", vec![b.ty("String")])).build();
    let main = b
        .function("main")
        .body(vec![
            b.var("w", Some("StringWrapper"), Some(b.new_object(b.ty("StringWrapper")))),
            b.var("s", Some("String"), Some(b.call_on(b.name("w"), "get", vec![]))),
        ])
        .build();
    members.extend([wrapper.into(), strings.into(), main.into()]);
    let program = bind_program(&[b.finish(members)]);

    assert!(codes(&program).is_empty(), "{:?}", codes(&program));
}

// ============================================================================
// Entry points
// ============================================================================

#[test]
fn test_global_statements_become_main() {
    let b = builder();
    let tree = b.finish(vec![b.expr_stmt(b.call("print", vec![b.int(1)])).into()]);
    let program = bind_program(&[tree]);

    assert!(codes(&program).is_empty(), "{:?}", codes(&program));
    let main = program.main.expect("main is synthesized");
    let symbol = program.symbols.method(main);
    assert_eq!(symbol.name, "main");
    assert!(symbol.is_entry_point());
    assert_eq!(symbol.return_type, program.symbols.builtins().void);
    assert!(program.body(main).is_some());
    assert!(program.script_main.is_none());
}

#[test]
fn test_explicit_main_is_chosen() {
    let b = builder();
    let main = b.function("main").body(vec![]).build();
    let program = bind_program(&[b.finish(vec![main.into()])]);

    assert!(codes(&program).is_empty());
    assert_eq!(program.main, Some(method_named(&program, "main")));
}

#[test]
fn test_static_main_in_class_is_chosen() {
    let b = builder();
    let class = b.class("App").method(b.function("main").modifiers(ModifierFlags::STATIC).body(vec![]).build()).build();
    let program = bind_program(&[b.finish(vec![class.into()])]);

    assert!(codes(&program).is_empty());
    assert!(program.main.is_some());
}

#[test]
fn test_main_with_wrong_signature() {
    let b = builder();
    let main = b.function("main").param("argument", "Int").body(vec![]).build();
    let program = bind_program(&[b.finish(vec![main.into()])]);

    assert_eq!(codes(&program), vec!["KT6003"]);
    assert!(program.main.is_none());
}

#[test]
fn test_main_together_with_global_statements() {
    let b = builder();
    let main = b.function("main").body(vec![]).build();
    let statement = b.expr_stmt(b.call("print", vec![b.int(1)]));
    let program = bind_program(&[b.finish(vec![main.into(), statement.into()])]);

    assert_eq!(codes(&program), vec!["KT6004"]);
    assert_eq!(program.main, Some(method_named(&program, "main")));
}

#[test]
fn test_global_statements_in_two_files() {
    let a = TreeBuilder::new(SourceId(0), "a.kt");
    let b = TreeBuilder::new(SourceId(1), "b.kt");
    let first = a.finish(vec![a.expr_stmt(a.call("print", vec![a.int(1)])).into()]);
    let second = b.finish(vec![b.expr_stmt(b.call("print", vec![b.int(2)])).into()]);
    let program = bind_program(&[first, second]);

    assert_eq!(count(&program, "KT6001"), 2);
}

#[test]
fn test_user_type_named_like_entry_point_type() {
    let b = builder();
    let class = b.class("Program").build();
    let statement = b.expr_stmt(b.call("print", vec![b.int(1)]));
    let program = bind_program(&[b.finish(vec![class.into(), statement.into()])]);

    assert_eq!(codes(&program), vec!["KT6005"]);
    assert!(program.main.is_none());
}

#[test]
fn test_return_in_discarded_global_statements() {
    let b = builder();
    let main = b.function("main").body(vec![]).build();
    let program = bind_program(&[b.finish(vec![main.into(), b.ret(None).into()])]);

    assert_eq!(codes(&program), vec!["KT6004", "KT4002"]);
}

#[test]
fn test_script_wraps_global_statements() {
    let b = builder();
    let tree = b.finish(vec![
        b.var("x", None, Some(b.int(1))).into(),
        b.expr_stmt(b.binary(b.name("x"), BinaryOperatorKind::Add, b.int(1))).into(),
    ]);
    let program = bind_script(&[tree]);

    assert!(codes(&program).is_empty(), "{:?}", codes(&program));
    let script_main = program.script_main.expect("script main is synthesized");
    assert_eq!(program.symbols.method(script_main).name, "$main");
    assert_eq!(program.symbols.method(script_main).return_type, program.symbols.builtins().any);
    assert!(program.main.is_none());

    let printed = printed_bodies(&program).join("");
    assert!(printed.contains("return"), "{}", printed);
    let globals = program.globals.last().expect("global scope snapshot");
    assert_eq!(globals.variables.len(), 1);
    assert_eq!(globals.variables[0].0, "x");
}

#[test]
fn test_script_bare_return_yields_a_value() {
    let b = builder();
    let tree = b.finish(vec![b.ret(None).into()]);
    let program = bind_script(&[tree]);

    assert!(codes(&program).is_empty(), "{:?}", codes(&program));
}

#[test]
fn test_script_rejects_explicit_main() {
    let b = builder();
    let main = b.function("main").body(vec![]).build();
    let statement = b.expr_stmt(b.call("print", vec![b.int(1)]));
    let program = bind_script(&[b.finish(vec![main.into(), statement.into()])]);

    assert_eq!(codes(&program), vec!["KT6002"]);
    assert!(program.script_main.is_some());
}

#[test]
fn test_top_level_functions_are_callable_from_globals() {
    let b = builder();
    let square = b
        .function("square")
        .param("n", "Int")
        .returns("Int")
        .body(vec![b.ret(Some(b.binary(b.name("n"), BinaryOperatorKind::Multiply, b.name("n"))))])
        .build();
    let statement = b.expr_stmt(b.call("print", vec![b.call("square", vec![b.int(3)])]));
    let program = bind_program(&[b.finish(vec![square.into(), statement.into()])]);

    assert!(codes(&program).is_empty(), "{:?}", codes(&program));
    assert!(program.body(method_named(&program, "square")).is_some());
}

// ============================================================================
// Determinism
// ============================================================================

#[test]
fn test_binding_twice_is_identical() {
    let b = builder();
    let shape = b
        .class("Shape")
        .field("sides", "Int")
        .method(
            b.function("describe")
                .returns("String")
                .body(vec![
                    b.var("total", Some("Int"), None),
                    b.while_(
                        b.binary(b.name("sides"), BinaryOperatorKind::Greater, b.int(0)),
                        b.block(vec![b.expr_stmt(b.assign("total", b.name("sides")))]),
                    ),
                    b.expr_stmt(b.call("print", vec![b.name("total")])),
                ])
                .build(),
        )
        .build();
    let main = b.function("main").body(vec![b.var("s", Some("Shape"), Some(b.new_object(b.ty("Shape"))))]).build();
    let trees = vec![b.finish(vec![shape.into(), main.into()])];

    let first = bind_program(&trees);
    let second = bind_program(&trees);

    assert!(!first.diagnostics.is_empty());
    assert_eq!(first.diagnostics.diagnostics(), second.diagnostics.diagnostics());
    assert_eq!(printed_bodies(&first), printed_bodies(&second));
    assert_eq!(first.symbols.type_count(), second.symbols.type_count());
    assert_eq!(first.symbols.method_count(), second.symbols.method_count());
}
