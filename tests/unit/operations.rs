use crate::common::*;
use cadl::prelude::*;
use cadl::testing::TestHost;

fn parameter_names(program: &Program, id: TypeId) -> Vec<String> {
    let op = operation(program, id);
    model(program, op.parameters)
        .property_names()
        .into_iter()
        .map(str::to_string)
        .collect()
}

#[test]
fn can_return_void() {
    let host = TestHost::new();
    host.add_file("main.cadl", "@test op foo(): void;");
    let (program, tests, diagnostics) = host.compile_and_diagnose("main.cadl").expect("compiles");
    assert!(diagnostics.is_empty(), "{diagnostics:?}");

    let foo = operation(&program, tests["foo"]);
    assert_eq!(
        program.get_type(foo.return_type),
        Some(&Type::Intrinsic(cadl::compiler::IntrinsicKind::Void))
    );
}

#[test]
fn reuse_copies_templated_signatures() {
    let host = TestHost::new();
    host.add_file(
        "main.cadl",
        r#"
        model StringA is string {}
        model StringB is string {}
        model PayloadA {}
        model PayloadB {}

        op foo<TString, TPayload>(name: TString, payload: TPayload): boolean;
        @test op newFoo: foo<StringA, PayloadA>;

        interface InterfaceOperationsToo {
            @test newFooToo: foo<StringB, PayloadB>;
        }
    "#,
    );
    let (program, tests, diagnostics) = host.compile_and_diagnose("main.cadl").expect("compiles");
    assert!(diagnostics.is_empty(), "{diagnostics:?}");

    for name in ["newFoo", "newFooToo"] {
        let id = tests[name];
        assert_eq!(parameter_names(&program, id), ["name", "payload"]);
        let returned = program.get_type(operation(&program, id).return_type);
        assert!(matches!(returned, Some(Type::Model(m)) if m.name == "boolean"));
    }

    let new_foo = operation(&program, tests["newFoo"]);
    let name = model(&program, new_foo.parameters).property("name").expect("name");
    assert_eq!(program.type_name(name.ty), "StringA");
}

#[test]
fn reuse_gets_a_fresh_identity() {
    let program = compile("op a(x: string): int32; op b: a; op c: a;");
    assert!(program.diagnostics().is_empty(), "{:?}", program.diagnostics());

    let a = operation(&program, type_named(&program, "a"));
    let b = operation(&program, type_named(&program, "b"));
    let c = operation(&program, type_named(&program, "c"));
    assert_ne!(a.parameters, b.parameters);
    assert_ne!(b.parameters, c.parameters);
    assert_eq!(a.return_type, c.return_type);
    assert_eq!(b.source_operation, Some(type_named(&program, "a")));
    assert_eq!(c.source_operation, Some(type_named(&program, "a")));
}

#[test]
fn reusing_a_reused_signature_is_rejected() {
    let program = compile(
        r#"
        op a(x: string): int32;
        op b: a;
        op c: b;
        interface Store { d: b; }
    "#,
    );
    assert_eq!(
        codes(&program),
        [
            DiagnosticCode::InvalidOperationReference,
            DiagnosticCode::InvalidOperationReference
        ]
    );
    assert!(!is_error(&program, type_named(&program, "b")));
    assert!(is_error(&program, type_named(&program, "c")));
    assert!(is_error(&program, type_named(&program, "Store.d")));
}

#[test]
fn decorators_rerun_on_the_reusing_operation() {
    let program = compile(
        r#"
        @doc("base op") @tag("base")
        op base(@doc("the id") id: string): void;

        @tag("extra")
        op derived: base;

        @doc("mine")
        op overridden: base;
    "#,
    );
    assert!(program.diagnostics().is_empty(), "{:?}", program.diagnostics());

    let derived_id = type_named(&program, "derived");
    let derived = operation(&program, derived_id);
    let state = program.state();

    let target = DecoratorTarget::Type(derived_id);
    assert_eq!(state.get(keys::DOC, &target), Some(&DecoratorValue::string("base op")));
    assert_eq!(
        state.get_all(keys::TAG, &target),
        [DecoratorValue::string("base"), DecoratorValue::string("extra")]
    );

    let parameter = DecoratorTarget::property(derived.parameters, "id");
    assert_eq!(state.get(keys::DOC, &parameter), Some(&DecoratorValue::string("the id")));

    // Both @doc applications run; the reusing declaration's comes last.
    let overridden = DecoratorTarget::Type(type_named(&program, "overridden"));
    assert_eq!(state.get(keys::DOC, &overridden), Some(&DecoratorValue::string("mine")));
}

#[test]
fn reusing_a_model_is_rejected() {
    let program = compile("model M {} op f: M;");
    assert_eq!(codes(&program), [DiagnosticCode::InvalidOperationReference]);
    assert!(is_error(&program, type_named(&program, "f")));
}

#[test]
fn duplicate_parameters_are_duplicate_properties() {
    let program = compile("op f(a: string, a: int32): void;");
    assert_eq!(codes(&program), [DiagnosticCode::DuplicateProperty]);
    assert_eq!(parameter_names(&program, type_named(&program, "f")), ["a"]);
}
