use cadl::prelude::*;
use cadl::testing::TestHost;

/// Compile a single `main.cadl`, keeping diagnostics.
pub fn compile(source: &str) -> Program {
    let host = TestHost::new();
    host.add_file("main.cadl", source);
    host.compile_program("main.cadl").expect("compiles")
}

pub fn codes(program: &Program) -> Vec<DiagnosticCode> {
    program.diagnostics().iter().map(|d| d.code).collect()
}

pub fn type_named(program: &Program, name: &str) -> TypeId {
    program
        .resolve_type(name)
        .unwrap_or_else(|| panic!("no type named {name}"))
}

pub fn model<'p>(program: &'p Program, id: TypeId) -> &'p cadl::compiler::ModelType {
    program
        .get_type(id)
        .and_then(Type::as_model)
        .unwrap_or_else(|| panic!("{} is not a model", program.type_name(id)))
}

pub fn operation<'p>(program: &'p Program, id: TypeId) -> &'p cadl::compiler::OperationType {
    program
        .get_type(id)
        .and_then(Type::as_operation)
        .unwrap_or_else(|| panic!("{} is not an operation", program.type_name(id)))
}

pub fn is_error(program: &Program, id: TypeId) -> bool {
    program.types().is_error(id)
}
