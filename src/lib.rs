//! Cadl
//!
//! Front end for the Cadl interface definition language: parse source files,
//! bind them into namespaces and symbols, and type-check models, operations
//! and interfaces, including templates, declaration reuse and decorators.
//!
//! # Example
//!
//! ```
//! use cadl::prelude::*;
//! use cadl::testing::TestHost;
//!
//! let host = TestHost::new();
//! host.add_file("main.cadl", "model Pet { name: string; age?: int32 }");
//! let program = host.compile("main.cadl").unwrap();
//!
//! let pet = program.resolve_type("Pet").unwrap();
//! let model = program.get_type(pet).and_then(Type::as_model).unwrap();
//! assert_eq!(model.property_names(), ["name", "age"]);
//! ```

pub mod host;
pub mod testing;

pub use cadl_compiler as compiler;
pub use cadl_core as core;
pub use cadl_parser as parser;
pub use cadl_registry as registry;

pub use host::StdHost;

pub mod prelude {
    pub use cadl_compiler::{
        Compiler, DecoratorLibrary, DecoratorTarget, DecoratorValue, Program, RecompileLoop,
        SourceFile, StateMap, Type, TypeId, WatchDriver,
    };
    pub use cadl_compiler::decorators::keys;
    pub use cadl_core::{
        CompileError, CompilerHost, CompilerOptions, Diagnostic, DiagnosticCode, HostError,
        LogLine, Severity, SourceFileId,
    };
    pub use cadl_registry::{SymbolId, SymbolKind, SymbolTable};
}
