//! Compiler passes.
//!
//! - [`binding`]: declare symbols, merge namespaces, wire `using` directives
//!
//! Checking is demand-driven rather than a fixed pass; see [`crate::checker`].

pub mod binding;

pub use binding::{BindingOutput, BindingPass};
