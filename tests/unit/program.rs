use std::path::Path;

use crate::common::*;
use cadl::core::{OptionsError, parse_option_overrides};
use cadl::prelude::*;
use cadl::testing::{TestHost, TestHostError};

#[test]
fn missing_import_is_fatal() {
    let host = TestHost::new();
    host.add_file("main.cadl", r#"import "./missing.cadl"; model A {}"#);

    match host.compile_program("main.cadl") {
        Err(CompileError::SourceNotFound { path, imported_from }) => {
            assert_eq!(path, host.resolve(Path::new("missing.cadl")));
            assert_eq!(imported_from, Some(host.resolve(Path::new("main.cadl"))));
        }
        other => panic!("expected a missing-source error, got {other:?}"),
    }
}

#[test]
fn missing_entry_is_fatal() {
    let host = TestHost::new();
    assert!(matches!(
        host.compile("main.cadl"),
        Err(TestHostError::Compile(CompileError::SourceNotFound { imported_from: None, .. }))
    ));
}

#[test]
fn compile_rejects_programs_with_diagnostics() {
    let host = TestHost::new();
    host.add_file("main.cadl", "model A { b: Missing }");
    match host.compile("main.cadl") {
        Err(TestHostError::Diagnostics(diagnostics)) => {
            assert_eq!(diagnostics.len(), 1);
            assert_eq!(diagnostics[0].code, DiagnosticCode::UnknownIdentifier);
        }
        other => panic!("expected diagnostics, got {other:?}"),
    }
}

#[test]
fn compilations_are_isolated() {
    let host = TestHost::new();
    host.add_file(
        "main.cadl",
        r#"import "./b.cadl"; model A { b: B; broken: Missing; ...A }"#,
    );
    host.add_file("b.cadl", "model B {}");
    let failing = host.compile_program("main.cadl").expect("failing program still compiles");
    assert_eq!(
        codes(&failing),
        [DiagnosticCode::UnknownIdentifier, DiagnosticCode::CyclicReference]
    );

    host.add_file("main.cadl", "model C { name: string }");
    let clean = host.compile_program("main.cadl").expect("clean program");
    assert!(clean.diagnostics().is_empty(), "{:?}", clean.diagnostics());

    for leaked in ["A", "B"] {
        assert!(clean.resolve_type(leaked).is_none(), "{leaked} leaked");
    }
    assert!(failing.resolve_type("C").is_none());
    assert_eq!(model(&clean, type_named(&clean, "C")).property_names(), ["name"]);
    assert_eq!(clean.source_files().len() + 1, failing.source_files().len());
}

#[test]
fn diagnostics_carry_locations() {
    let program = compile("model A {\n  b: Missing;\n}");
    let diagnostic = &program.diagnostics()[0];
    let location = diagnostic.location.expect("located");
    let file = program.source_file(location.file).expect("source file");
    assert!(file.path.ends_with("main.cadl"));
}

#[test]
fn option_overrides_feed_misc_options() {
    let overrides = parse_option_overrides(&["strict=true", "openapi.out=api.json"]).expect("valid");

    let mut options = CompilerOptions::default();
    for (key, value) in &overrides.misc_options {
        options = options.with_misc_option(key.clone(), value.clone());
    }
    assert_eq!(options.misc_option("strict"), Some("true"));
    assert_eq!(options.misc_option("out"), None);

    assert!(matches!(
        parse_option_overrides(&["nope"]),
        Err(OptionsError::InvalidOption(_))
    ));
}

#[test]
fn watch_loop_picks_up_changes_made_mid_run() {
    let host = TestHost::new();
    host.add_file("main.cadl", "model A {}");

    let mut state = RecompileLoop::new();
    assert!(state.notify());
    let stale = host.compile("main.cadl").expect("first run");

    // An edit lands while the first run is still in flight.
    host.add_file("main.cadl", "model A { x: string }");
    assert!(!state.notify());
    assert!(!state.notify());

    assert_eq!(state.complete(), cadl::compiler::Completion::Rerun);
    drop(stale);
    let fresh = host.compile("main.cadl").expect("rerun");
    assert_eq!(state.complete(), cadl::compiler::Completion::Deliver);

    assert_eq!(model(&fresh, type_named(&fresh, "A")).property_names(), ["x"]);
    assert_eq!(state.runs_started(), 2);
    assert_eq!(state.results_discarded(), 1);
}

#[test]
fn watch_driver_delivers_fresh_programs() {
    let host = TestHost::new();
    host.add_file("main.cadl", "model A { x: string }");

    let driver = WatchDriver::new(|| host.compile("main.cadl"));
    let program = driver.notify().expect("idle driver runs").expect("compiles");
    assert!(program.resolve_type("A").is_some());
    assert_eq!(driver.runs_started(), 1);
}
