//! Checked types.
//!
//! [`Type`] is a closed set of variants. Every consumer matches on it
//! exhaustively; nothing downcasts. Types refer to each other by [`TypeId`], so
//! self-referential and mutually-referential models need no ownership tricks.

mod arena;

pub use arena::{TypeArena, TypeId};

use cadl_core::Location;
use cadl_registry::SymbolId;

use crate::decorators::DecoratorApplication;

/// Which declaration and arguments produced a template instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateInstance {
    pub declaration: SymbolId,
    pub arguments: Vec<TypeId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntrinsicKind {
    Void,
    Never,
}

impl IntrinsicKind {
    pub fn name(self) -> &'static str {
        match self {
            IntrinsicKind::Void => "void",
            IntrinsicKind::Never => "never",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModelProperty {
    pub name: String,
    pub ty: TypeId,
    pub optional: bool,
    /// Decorators that apply to this property, including ones carried over by
    /// `is`, spread and operation reuse.
    pub decorators: Vec<DecoratorApplication>,
    pub location: Option<Location>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ModelType {
    /// Empty for model expressions and operation parameter bags.
    pub name: String,
    pub symbol: Option<SymbolId>,
    /// Properties in declaration order.
    pub properties: Vec<ModelProperty>,
    pub base_model: Option<TypeId>,
    /// Model this one was declared `is`.
    pub source_model: Option<TypeId>,
    pub template: Option<TemplateInstance>,
    pub decorators: Vec<DecoratorApplication>,
}

impl ModelType {
    pub fn property(&self, name: &str) -> Option<&ModelProperty> {
        self.properties.iter().find(|p| p.name == name)
    }

    pub fn property_names(&self) -> Vec<&str> {
        self.properties.iter().map(|p| p.name.as_str()).collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OperationType {
    pub name: String,
    pub symbol: Option<SymbolId>,
    /// Anonymous model holding the parameters.
    pub parameters: TypeId,
    pub return_type: TypeId,
    /// Operation whose signature this one reuses.
    pub source_operation: Option<TypeId>,
    /// Owning interface symbol for interface members.
    pub interface: Option<SymbolId>,
    pub template: Option<TemplateInstance>,
    pub decorators: Vec<DecoratorApplication>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InterfaceType {
    pub name: String,
    pub symbol: Option<SymbolId>,
    /// Member operations in declaration order.
    pub operations: Vec<(String, TypeId)>,
    pub decorators: Vec<DecoratorApplication>,
}

impl InterfaceType {
    pub fn operation(&self, name: &str) -> Option<TypeId> {
        self.operations
            .iter()
            .find(|(op_name, _)| op_name == name)
            .map(|(_, id)| *id)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnionType {
    /// Distinct options in first-seen order.
    pub options: Vec<TypeId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TemplateParameterType {
    pub name: String,
    pub symbol: SymbolId,
    pub default: Option<TypeId>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    Intrinsic(IntrinsicKind),
    Model(ModelType),
    Operation(OperationType),
    Interface(InterfaceType),
    Union(UnionType),
    TemplateParameter(TemplateParameterType),
    /// Placeholder for a failed resolution.
    Error,
}

impl Type {
    /// Kind name used in messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Type::Intrinsic(_) => "intrinsic",
            Type::Model(_) => "model",
            Type::Operation(_) => "operation",
            Type::Interface(_) => "interface",
            Type::Union(_) => "union",
            Type::TemplateParameter(_) => "template parameter",
            Type::Error => "error",
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Type::Error)
    }

    pub fn as_model(&self) -> Option<&ModelType> {
        match self {
            Type::Model(model) => Some(model),
            _ => None,
        }
    }

    pub fn as_operation(&self) -> Option<&OperationType> {
        match self {
            Type::Operation(op) => Some(op),
            _ => None,
        }
    }

    pub fn as_interface(&self) -> Option<&InterfaceType> {
        match self {
            Type::Interface(iface) => Some(iface),
            _ => None,
        }
    }

    pub fn as_union(&self) -> Option<&UnionType> {
        match self {
            Type::Union(union) => Some(union),
            _ => None,
        }
    }

    /// Declared name, if the type has one.
    pub fn name(&self) -> Option<&str> {
        match self {
            Type::Intrinsic(kind) => Some(kind.name()),
            Type::Model(model) if !model.name.is_empty() => Some(&model.name),
            Type::Operation(op) => Some(&op.name),
            Type::Interface(iface) => Some(&iface.name),
            Type::TemplateParameter(param) => Some(&param.name),
            _ => None,
        }
    }

    /// Decorators recorded on the type itself.
    pub fn decorators(&self) -> &[DecoratorApplication] {
        match self {
            Type::Model(model) => &model.decorators,
            Type::Operation(op) => &op.decorators,
            Type::Interface(iface) => &iface.decorators,
            _ => &[],
        }
    }
}
