use crate::common::*;
use cadl::prelude::*;

#[test]
fn same_arguments_give_the_same_instance() {
    let program = compile(
        r#"
        model Box<T> { value: T }
        model A { x: Box<string>; y: Box<string>; z: Box<int32> }
        model B { x: Box<string>; list: string[]; again: string[] }
    "#,
    );
    assert!(program.diagnostics().is_empty(), "{:?}", program.diagnostics());

    let a = model(&program, type_named(&program, "A"));
    let b = model(&program, type_named(&program, "B"));
    let ty = |m: &cadl::compiler::ModelType, name: &str| m.property(name).map(|p| p.ty);

    assert_eq!(ty(a, "x"), ty(a, "y"));
    assert_eq!(ty(a, "x"), ty(b, "x"));
    assert_ne!(ty(a, "x"), ty(a, "z"));
    assert_eq!(ty(b, "list"), ty(b, "again"));

    let template = program.symbols().resolve_qualified("Box").expect("Box");
    assert_eq!(program.template_instances(template).len(), 2);
}

#[test]
fn structural_arguments_give_the_same_instance() {
    let program = compile(
        r#"
        model Box<T> { value: T }
        model A {
            u1: Box<string | int32>;
            u2: Box<string | int32>;
            swapped: Box<int32 | string>;
            m1: Box<{ x: string }>;
            m2: Box<{ x: string }>;
            other: Box<{ x?: string }>;
        }
    "#,
    );
    assert!(program.diagnostics().is_empty(), "{:?}", program.diagnostics());

    let a = model(&program, type_named(&program, "A"));
    let ty = |name: &str| a.property(name).map(|p| p.ty);
    assert_eq!(ty("u1"), ty("u2"));
    assert_ne!(ty("u1"), ty("swapped"));
    assert_eq!(ty("m1"), ty("m2"));
    assert_ne!(ty("m1"), ty("other"));

    let template = program.symbols().resolve_qualified("Box").expect("Box");
    assert_eq!(program.template_instances(template).len(), 4);
}

#[test]
fn instance_substitutes_arguments() {
    let program = compile("model Box<T> { value: T } model A { b: Box<int32> }");
    let a = model(&program, type_named(&program, "A"));
    let instance = model(&program, a.property("b").expect("b").ty);

    let value = instance.property("value").expect("value").ty;
    assert_eq!(program.type_name(value), "int32");
    assert_eq!(program.type_name(a.property("b").expect("b").ty), "Box<int32>");
}

#[test]
fn defaults_fill_trailing_arguments() {
    let program = compile(
        r#"
        model Page<T, Cursor = string, Next = Cursor> { items: T[]; cursor: Cursor; next: Next }
        model A { page: Page<int32> }
    "#,
    );
    assert!(program.diagnostics().is_empty(), "{:?}", program.diagnostics());

    let a = model(&program, type_named(&program, "A"));
    assert_eq!(
        program.type_name(a.property("page").expect("page").ty),
        "Page<int32, string, string>"
    );
}

#[test]
fn wrong_arity_is_contained() {
    let program = compile(
        r#"
        op foo<A, B>(a: A, b: B): void;
        op none: foo;
        op three: foo<string, string, string>;
        op fine: foo<string, int32>;
    "#,
    );
    assert_eq!(
        codes(&program),
        [DiagnosticCode::InvalidTemplateArgs, DiagnosticCode::InvalidTemplateArgs]
    );
    assert!(is_error(&program, type_named(&program, "none")));
    assert!(is_error(&program, type_named(&program, "three")));
    assert!(!is_error(&program, type_named(&program, "fine")));
}

#[test]
fn template_body_errors_surface_without_instances() {
    let program = compile("model Box<T> { value: T; other: Nope }");
    assert_eq!(codes(&program), [DiagnosticCode::UnknownIdentifier]);
}
