use crate::common::*;
use cadl::prelude::*;
use cadl::testing::TestHost;

#[test]
fn namespaces_merge_across_files() {
    let host = TestHost::new();
    host.add_file("a.cadl", "namespace A.B { model One {} }");
    host.add_file(
        "main.cadl",
        r#"
        import "./a.cadl";
        namespace A.B;
        model Two { one: One }
    "#,
    );
    let program = host.compile("main.cadl").expect("no diagnostics");

    let namespace = program.symbols().resolve_qualified("A.B").expect("A.B");
    let mut names: Vec<&str> = program
        .namespace_members(namespace)
        .iter()
        .map(|id| program.symbols().symbol(*id).name.as_str())
        .collect();
    names.sort_unstable();
    assert_eq!(names, ["One", "Two"]);
}

#[test]
fn duplicate_declarations_are_shadowed() {
    let program = compile("model A { x: string } model A { y: string } op take(a: A): void;");
    assert_eq!(codes(&program), [DiagnosticCode::DuplicateSymbol]);

    let a = model(&program, type_named(&program, "A"));
    assert_eq!(a.property_names(), ["x"]);

    let shadowed: Vec<_> = program
        .symbols()
        .iter()
        .filter(|symbol| symbol.name == "A" && symbol.is_shadowed())
        .collect();
    assert_eq!(shadowed.len(), 1);
    assert!(program.type_of(shadowed[0].id).is_some());
}

#[test]
fn repeated_namespace_behind_a_model_is_one_namespace() {
    let program = compile(
        r#"
        model A {}
        namespace A { model X {} }
        namespace A { model Y { x: X } }
    "#,
    );
    assert_eq!(
        codes(&program),
        [DiagnosticCode::DuplicateSymbol, DiagnosticCode::DuplicateSymbol]
    );

    let shadowed: Vec<_> = program
        .symbols()
        .iter()
        .filter(|symbol| symbol.name == "A" && symbol.kind == SymbolKind::Namespace)
        .collect();
    assert_eq!(shadowed.len(), 1);
    assert!(shadowed[0].is_shadowed());

    let mut names: Vec<&str> = program
        .namespace_members(shadowed[0].id)
        .iter()
        .map(|id| program.symbols().symbol(*id).name.as_str())
        .collect();
    names.sort_unstable();
    assert_eq!(names, ["X", "Y"]);
}

#[test]
fn using_brings_names_into_scope() {
    let program = compile(
        r#"
        namespace Lib { model Thing {} }
        namespace App {
            using Lib;
            model Holder { thing: Thing }
        }
    "#,
    );
    assert!(program.diagnostics().is_empty(), "{:?}", program.diagnostics());
}

#[test]
fn ambiguous_using_is_reported() {
    let program = compile(
        r#"
        namespace L1 { model Thing {} }
        namespace L2 { model Thing {} }
        namespace App {
            using L1;
            using L2;
            model Holder { thing: Thing }
        }
    "#,
    );
    assert_eq!(codes(&program), [DiagnosticCode::AmbiguousReference]);
}

#[test]
fn unknown_using_is_reported() {
    let program = compile("using Nowhere; model A {}");
    assert_eq!(codes(&program), [DiagnosticCode::UnknownNamespace]);
}

#[test]
fn qualified_references_resolve() {
    let program = compile("namespace A.B { model Pet {} } model Owner { pet: A.B.Pet; bad: A.B.Cat }");
    assert_eq!(codes(&program), [DiagnosticCode::UnknownIdentifier]);
    let owner = model(&program, type_named(&program, "Owner"));
    assert_eq!(owner.property("pet").map(|p| p.ty), Some(type_named(&program, "A.B.Pet")));
}
