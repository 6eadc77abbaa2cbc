//! Decorators: definitions, arguments and the context handlers run in.
//!
//! A [`DecoratorLibrary`] is a list of [`DecoratorDefinition`]s. The binder
//! declares each one as a `Decorator` symbol in the global namespace; the
//! checker resolves `@name(args)` against those symbols and invokes the
//! handler once the decorated type is structurally complete.
//!
//! Handlers only see the type graph read-only. Anything they want to remember
//! goes into the [`StateMap`].

mod builtin;
mod state;

pub use builtin::keys;
pub use state::StateMap;

use std::fmt;
use std::sync::Arc;

use bitflags::bitflags;
use cadl_core::{CompilerOptions, Diagnostic, DiagnosticCode, Location};
use cadl_registry::{DecoratorId, SymbolTable};
use ordered_float::OrderedFloat;

use crate::types::{Type, TypeArena, TypeId};

/// A decorator argument after resolution.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DecoratorValue {
    String(String),
    Number(OrderedFloat<f64>),
    Boolean(bool),
    Type(TypeId),
}

impl DecoratorValue {
    pub fn string(value: impl Into<String>) -> Self {
        DecoratorValue::String(value.into())
    }

    pub fn number(value: f64) -> Self {
        DecoratorValue::Number(OrderedFloat(value))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            DecoratorValue::String(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            DecoratorValue::Number(value) => Some(value.into_inner()),
            _ => None,
        }
    }

    pub fn as_type(&self) -> Option<TypeId> {
        match self {
            DecoratorValue::Type(id) => Some(*id),
            _ => None,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            DecoratorValue::String(_) => "string",
            DecoratorValue::Number(_) => "number",
            DecoratorValue::Boolean(_) => "boolean",
            DecoratorValue::Type(_) => "type",
        }
    }
}

/// What a decorator is applied to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DecoratorTarget {
    Type(TypeId),
    /// A property of a model, parameters of operations included.
    Property { model: TypeId, name: String },
}

impl DecoratorTarget {
    pub fn property(model: TypeId, name: impl Into<String>) -> Self {
        DecoratorTarget::Property {
            model,
            name: name.into(),
        }
    }

    /// The type this target is, or lives on.
    pub fn type_id(&self) -> TypeId {
        match self {
            DecoratorTarget::Type(id) => *id,
            DecoratorTarget::Property { model, .. } => *model,
        }
    }
}

bitflags! {
    /// Target kinds a decorator accepts.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct DecoratorTargets: u8 {
        const MODEL = 1 << 0;
        const OPERATION = 1 << 1;
        const INTERFACE = 1 << 2;
        const PROPERTY = 1 << 3;
        const ANY = Self::MODEL.bits() | Self::OPERATION.bits() | Self::INTERFACE.bits() | Self::PROPERTY.bits();
    }
}

impl DecoratorTargets {
    /// Human readable list for diagnostics, e.g. `model or operation`.
    pub fn describe(self) -> String {
        let names: Vec<&str> = [
            (DecoratorTargets::MODEL, "model"),
            (DecoratorTargets::OPERATION, "operation"),
            (DecoratorTargets::INTERFACE, "interface"),
            (DecoratorTargets::PROPERTY, "property"),
        ]
        .into_iter()
        .filter(|(flag, _)| self.contains(*flag))
        .map(|(_, name)| name)
        .collect();
        names.join(" or ")
    }
}

/// A decorator occurrence with its resolved arguments.
///
/// Kept on the decorated type so the decorator can be applied again when the
/// declaration is copied (`is`, spread, operation reuse).
#[derive(Debug, Clone, PartialEq)]
pub struct DecoratorApplication {
    pub decorator: DecoratorId,
    pub name: String,
    pub args: Vec<DecoratorValue>,
    pub location: Option<Location>,
}

pub type DecoratorHandler =
    Arc<dyn Fn(&mut DecoratorContext<'_>, &DecoratorTarget, &[DecoratorValue]) + Send + Sync>;

#[derive(Clone)]
pub struct DecoratorDefinition {
    pub name: String,
    pub targets: DecoratorTargets,
    pub handler: DecoratorHandler,
}

impl DecoratorDefinition {
    pub fn new<F>(name: impl Into<String>, targets: DecoratorTargets, handler: F) -> Self
    where
        F: Fn(&mut DecoratorContext<'_>, &DecoratorTarget, &[DecoratorValue]) + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            targets,
            handler: Arc::new(handler),
        }
    }
}

impl fmt::Debug for DecoratorDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecoratorDefinition")
            .field("name", &self.name)
            .field("targets", &self.targets)
            .finish_non_exhaustive()
    }
}

/// The decorators available to a compilation.
#[derive(Debug, Clone, Default)]
pub struct DecoratorLibrary {
    definitions: Vec<DecoratorDefinition>,
}

impl DecoratorLibrary {
    /// An empty library.
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in decorators (`@doc`, `@summary`, `@intrinsic`, `@key`,
    /// `@tag`, `@deprecated`, `@test`).
    pub fn builtin() -> Self {
        let mut library = Self::new();
        builtin::register(&mut library);
        library
    }

    pub fn register(&mut self, definition: DecoratorDefinition) -> DecoratorId {
        let id = DecoratorId(self.definitions.len() as u32);
        self.definitions.push(definition);
        id
    }

    pub fn get(&self, id: DecoratorId) -> Option<&DecoratorDefinition> {
        self.definitions.get(id.0 as usize)
    }

    pub fn find(&self, name: &str) -> Option<DecoratorId> {
        self.definitions
            .iter()
            .position(|d| d.name == name)
            .map(|index| DecoratorId(index as u32))
    }

    pub fn iter(&self) -> impl Iterator<Item = (DecoratorId, &DecoratorDefinition)> {
        self.definitions
            .iter()
            .enumerate()
            .map(|(index, d)| (DecoratorId(index as u32), d))
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

/// What a decorator handler can see and do.
pub struct DecoratorContext<'a> {
    pub(crate) types: &'a TypeArena,
    pub(crate) symbols: &'a SymbolTable,
    pub(crate) state: &'a mut StateMap,
    pub(crate) diagnostics: &'a mut Vec<Diagnostic>,
    pub(crate) options: &'a CompilerOptions,
    pub(crate) decorator: &'a str,
    pub(crate) location: Option<Location>,
}

impl<'a> DecoratorContext<'a> {
    pub fn types(&self) -> &TypeArena {
        self.types
    }

    pub fn symbols(&self) -> &SymbolTable {
        self.symbols
    }

    pub fn options(&self) -> &CompilerOptions {
        self.options
    }

    pub fn state(&self) -> &StateMap {
        &*self.state
    }

    pub fn state_mut(&mut self) -> &mut StateMap {
        &mut *self.state
    }

    /// Name of the decorator being run.
    pub fn decorator(&self) -> &str {
        self.decorator
    }

    /// Where the decorator was written.
    pub fn location(&self) -> Option<Location> {
        self.location
    }

    /// The decorated type, or the model owning a decorated property.
    pub fn target_type(&self, target: &DecoratorTarget) -> Option<&Type> {
        self.types.get(target.type_id())
    }

    pub fn report(&mut self, code: DiagnosticCode, message: impl Into<String>) {
        self.diagnostics
            .push(Diagnostic::new(code, message).at_opt(self.location));
    }

    pub fn invalid_argument(&mut self, message: impl Into<String>) {
        self.report(DiagnosticCode::InvalidArgument, message);
    }

    /// Check the argument count, reporting a mismatch.
    pub fn expect_arg_count(&mut self, args: &[DecoratorValue], min: usize, max: usize) -> bool {
        if (min..=max).contains(&args.len()) {
            return true;
        }
        let expected = if min == max {
            min.to_string()
        } else {
            format!("{min} to {max}")
        };
        let message = format!(
            "@{} expects {} argument(s) but got {}.",
            self.decorator,
            expected,
            args.len()
        );
        self.invalid_argument(message);
        false
    }

    /// String argument at `index`, reporting when it has another kind.
    pub fn string_arg<'v>(&mut self, args: &'v [DecoratorValue], index: usize) -> Option<&'v str> {
        let value = args.get(index)?;
        if let Some(text) = value.as_str() {
            return Some(text);
        }
        let message = format!(
            "@{} argument {} must be a string, found {}.",
            self.decorator,
            index + 1,
            value.kind_name()
        );
        self.invalid_argument(message);
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn targets_describe_lists_kinds() {
        let targets = DecoratorTargets::MODEL | DecoratorTargets::OPERATION;
        assert_eq!(targets.describe(), "model or operation");
        assert_eq!(DecoratorTargets::ANY.describe(), "model or operation or interface or property");
    }

    #[test]
    fn library_lookup_by_name() {
        let mut library = DecoratorLibrary::new();
        let id = library.register(DecoratorDefinition::new(
            "flag",
            DecoratorTargets::MODEL,
            |_, _, _| {},
        ));
        assert_eq!(library.find("flag"), Some(id));
        assert_eq!(library.get(id).map(|d| d.name.as_str()), Some("flag"));
        assert!(library.find("other").is_none());
    }

    #[test]
    fn builtin_library_has_core_decorators() {
        let library = DecoratorLibrary::builtin();
        for name in ["doc", "summary", "intrinsic", "key", "tag", "deprecated", "test"] {
            assert!(library.find(name).is_some(), "missing @{name}");
        }
    }

    #[test]
    fn decorator_values_order_and_hash() {
        let a = DecoratorValue::number(1.5);
        let b = DecoratorValue::number(1.5);
        assert_eq!(a, b);
        assert_eq!(a.as_number(), Some(1.5));
        assert_eq!(DecoratorValue::string("x").as_str(), Some("x"));
    }
}
