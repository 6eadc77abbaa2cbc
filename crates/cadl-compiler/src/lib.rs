//! Cadl Compiler
//!
//! Binder, checker and template instantiator for the Cadl interface
//! definition language.
//!
//! ## Architecture
//!
//! - **Load**: the stdlib, additional imports, the entry file and its imports
//!   are read through a [`CompilerHost`](cadl_core::CompilerHost) and parsed
//! - **Bind**: every declaration becomes a symbol; namespaces merge
//! - **Check**: declarations resolve on demand into types, templates
//!   instantiate, decorators run
//!
//! ## Modules
//!
//! - [`checker`]: Demand-driven type checking and template instantiation
//! - [`decorators`]: Decorator library, handlers and the state map
//! - [`passes`]: Binding pass
//! - [`program`]: Compilation driver and the resulting [`Program`]
//! - [`stdlib`]: Built-in models
//! - [`template`]: Substitution maps and the instance cache
//! - [`types`]: Type arena and type variants
//! - [`watch`]: Recompile loop for watch mode

pub mod checker;
pub mod decorators;
pub mod passes;
pub mod program;
pub mod stdlib;
pub mod template;
pub mod types;
pub mod watch;

pub use checker::{CheckOutput, check};
pub use decorators::{
    DecoratorApplication, DecoratorContext, DecoratorDefinition, DecoratorLibrary,
    DecoratorTarget, DecoratorTargets, DecoratorValue, StateMap,
};
pub use passes::{BindingOutput, BindingPass};
pub use program::{Compiler, Program, SourceFile};
pub use template::TemplateInstanceCache;
pub use types::{
    InterfaceType, IntrinsicKind, ModelProperty, ModelType, OperationType, TemplateInstance,
    TemplateParameterType, Type, TypeArena, TypeId, UnionType,
};
pub use watch::{Completion, LoopState, RecompileLoop, WatchDriver};
