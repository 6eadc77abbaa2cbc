use crate::common::*;
use cadl::prelude::*;

#[test]
fn properties_keep_declaration_order() {
    let program = compile(
        r#"
        model Base { id: string }
        model Extra { note?: string }
        model Pet extends Base { name: string; ...Extra; "kebab-name": int32; age?: int32 }
    "#,
    );
    assert!(program.diagnostics().is_empty(), "{:?}", program.diagnostics());

    let pet = model(&program, type_named(&program, "Pet"));
    assert_eq!(pet.property_names(), ["name", "note", "kebab-name", "age"]);
    assert_eq!(pet.base_model, Some(type_named(&program, "Base")));
    assert!(pet.property("note").is_some_and(|p| p.optional));
}

#[test]
fn duplicate_property_is_contained() {
    let program = compile("model A { x: string; y: int32; x: int32 }");
    assert_eq!(codes(&program), [DiagnosticCode::DuplicateProperty]);

    let a = model(&program, type_named(&program, "A"));
    assert_eq!(a.property_names(), ["x", "y"]);
    assert_eq!(program.type_name(a.property("x").expect("x").ty), "string");
}

#[test]
fn cycles_are_reported_once() {
    let program = compile("model A is B {} model B is A {}");
    assert_eq!(codes(&program), [DiagnosticCode::CyclicReference]);

    let program = compile("model A { ...A }");
    assert_eq!(codes(&program), [DiagnosticCode::CyclicReference]);

    let program = compile("model A extends A {}");
    assert_eq!(codes(&program), [DiagnosticCode::CyclicReference]);
}

#[test]
fn transitive_cycles_are_reported_once() {
    let program = compile("model A { ...B } model B { ...C } model C { ...A }");
    assert_eq!(codes(&program), [DiagnosticCode::CyclicReference]);

    let program = compile("model A extends B {} model B extends C {} model C extends A {}");
    assert_eq!(codes(&program), [DiagnosticCode::CyclicReference]);
}

#[test]
fn derived_model_referenced_from_its_base() {
    let program = compile(
        r#"
        model Base { children: Derived[] }
        model Derived extends Base { x: string }
    "#,
    );
    assert!(program.diagnostics().is_empty(), "{:?}", program.diagnostics());

    let derived = model(&program, type_named(&program, "Derived"));
    assert_eq!(derived.base_model, Some(type_named(&program, "Base")));
    assert_eq!(derived.property_names(), ["x"]);
}

#[test]
fn is_of_a_model_that_references_the_copy() {
    let program = compile(
        r#"
        model A { b?: B }
        model B is A { x: string }
    "#,
    );
    assert!(program.diagnostics().is_empty(), "{:?}", program.diagnostics());

    let a_id = type_named(&program, "A");
    let b_id = type_named(&program, "B");
    let b = model(&program, b_id);
    assert_eq!(b.property_names(), ["b", "x"]);
    assert_eq!(b.source_model, Some(a_id));
    assert_eq!(model(&program, a_id).property("b").map(|p| p.ty), Some(b_id));

    let program = compile("model A { b?: B } model B { ...A; x: string }");
    assert!(program.diagnostics().is_empty(), "{:?}", program.diagnostics());
    assert_eq!(model(&program, type_named(&program, "B")).property_names(), ["b", "x"]);
}

#[test]
fn recursive_properties_are_not_cycles() {
    let program = compile(
        r#"
        model Tree { children: Tree[]; parent?: Tree; sibling?: Other }
        model Other { tree: Tree }
    "#,
    );
    assert!(program.diagnostics().is_empty(), "{:?}", program.diagnostics());

    let tree_id = type_named(&program, "Tree");
    let tree = model(&program, tree_id);
    assert_eq!(tree.property("parent").map(|p| p.ty), Some(tree_id));
}

#[test]
fn is_copies_from_primitives() {
    let program = compile("model Name is string { }");
    assert!(program.diagnostics().is_empty(), "{:?}", program.diagnostics());

    let name = type_named(&program, "Name");
    let target = DecoratorTarget::Type(name);
    assert_eq!(
        program.state().get(keys::INTRINSIC, &target),
        Some(&DecoratorValue::string("string"))
    );
    assert_eq!(model(&program, name).source_model, Some(type_named(&program, "string")));
}

#[test]
fn unions_and_model_expressions() {
    let program = compile("model A { u: string | int32 | string; inline: { a: string; b?: boolean } }");
    assert!(program.diagnostics().is_empty(), "{:?}", program.diagnostics());

    let a = model(&program, type_named(&program, "A"));
    assert_eq!(program.type_name(a.property("u").expect("u").ty), "string | int32");
    assert_eq!(
        program.type_name(a.property("inline").expect("inline").ty),
        "{ a: string, b?: boolean }"
    );
}

#[test]
fn invalid_heritage_and_spread() {
    let program = compile("op f(): void; model A extends f {} model B { ...(string | int32) }");
    assert_eq!(
        codes(&program),
        [DiagnosticCode::InvalidBaseType, DiagnosticCode::InvalidSpread]
    );
}

#[test]
fn references_to_non_types() {
    let program = compile("namespace N {} model A { n: N; d: doc; m: Missing }");
    assert_eq!(
        codes(&program),
        [
            DiagnosticCode::InvalidTypeReference,
            DiagnosticCode::InvalidTypeReference,
            DiagnosticCode::UnknownIdentifier,
        ]
    );
}
