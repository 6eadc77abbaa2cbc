use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::common::*;
use cadl::compiler::{DecoratorDefinition, DecoratorTargets};
use cadl::prelude::*;
use cadl::testing::TestHost;

#[test]
fn decorators_write_state() {
    let program = compile(
        r#"
        @doc("A pet.")
        model Pet {
            @key id: string;
            @doc("Display name.") name: string;
        }

        @tag("pets") @tag("read")
        op list(): Pet[];
    "#,
    );
    assert!(program.diagnostics().is_empty(), "{:?}", program.diagnostics());

    let pet = type_named(&program, "Pet");
    let state = program.state();
    assert_eq!(
        state.get(keys::DOC, &DecoratorTarget::Type(pet)).and_then(DecoratorValue::as_str),
        Some("A pet.")
    );
    assert_eq!(
        state
            .get(keys::KEY, &DecoratorTarget::property(pet, "id"))
            .and_then(DecoratorValue::as_str),
        Some("id")
    );
    assert!(!state.contains(keys::KEY, &DecoratorTarget::property(pet, "name")));

    let list = DecoratorTarget::Type(type_named(&program, "list"));
    let tags: Vec<_> = state
        .get_all(keys::TAG, &list)
        .iter()
        .filter_map(DecoratorValue::as_str)
        .collect();
    assert_eq!(tags, ["pets", "read"]);
}

#[test]
fn targets_are_validated() {
    let program = compile(
        r#"
        @key model M {}
        @intrinsic("x") op f(): void;
        model P { @tag("t") p: string }
    "#,
    );
    assert_eq!(
        codes(&program),
        [
            DiagnosticCode::InvalidDecoratorTarget,
            DiagnosticCode::InvalidDecoratorTarget,
            DiagnosticCode::InvalidDecoratorTarget,
        ]
    );
    assert!(!program.state().contains(keys::KEY, &DecoratorTarget::Type(type_named(&program, "M"))));
}

#[test]
fn unknown_decorators_are_reported() {
    let program = compile("@nothing model M {} @Pet model Pet {}");
    assert_eq!(
        codes(&program),
        [DiagnosticCode::UnknownDecorator, DiagnosticCode::UnknownDecorator]
    );
}

#[test]
fn bad_arguments_are_reported() {
    let program = compile(r#"@doc model A {} @doc(1) model B {} @doc("x", "y") model C {}"#);
    assert_eq!(
        codes(&program),
        [
            DiagnosticCode::InvalidArgument,
            DiagnosticCode::InvalidArgument,
            DiagnosticCode::InvalidArgument,
        ]
    );
}

#[test]
fn deprecation_is_a_warning() {
    let source = r#"
        @deprecated("use Current")
        model Legacy {}
        model Current { old: Legacy }
    "#;

    let program = compile(source);
    assert_eq!(codes(&program), [DiagnosticCode::Deprecated]);
    assert_eq!(program.diagnostics()[0].severity, Severity::Warning);
    assert!(program.diagnostics()[0].message.contains("use Current"));
    assert!(!program.has_errors());

    let host = TestHost::new().with_options(CompilerOptions::default().warning_as_error(true));
    host.add_file("main.cadl", source);
    let program = host.compile_program("main.cadl").expect("compiles");
    assert!(program.has_errors());
}

#[test]
fn library_decorators_run_once_per_concrete_type() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);

    let mut library = DecoratorLibrary::builtin();
    library.register(DecoratorDefinition::new(
        "audited",
        DecoratorTargets::MODEL,
        move |ctx, target, _args| {
            counter.fetch_add(1, Ordering::SeqCst);
            ctx.state_mut().set("audited", target.clone(), DecoratorValue::string("yes"));
        },
    ));

    let host = TestHost::new().with_compiler(Compiler::with_library(library));
    host.add_file(
        "main.cadl",
        r#"
        @audited model Box<T> { item: T }
        model A { a: Box<string>; b: Box<string>; c: Box<int32> }
    "#,
    );
    let program = host.compile("main.cadl").expect("no diagnostics");

    // The template declaration itself is never decorated.
    assert_eq!(calls.load(Ordering::SeqCst), 2);

    let a = model(&program, type_named(&program, "A"));
    let boxed = a.property("a").expect("a").ty;
    assert!(program.state().contains("audited", &DecoratorTarget::Type(boxed)));
}
