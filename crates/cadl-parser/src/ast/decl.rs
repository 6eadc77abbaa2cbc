//! Declaration AST nodes.
//!
//! Declarations that become symbols are wrapped in `Arc` so symbol tables can
//! point at them without borrowing the tree, and so a parsed library can be
//! shared read-only between compilations.

use std::sync::Arc;

use cadl_core::Span;

use super::Ident;
use super::types::TypeExpr;

/// A statement inside a file or namespace body.
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    Namespace(Arc<NamespaceDecl>),
    Model(Arc<ModelDecl>),
    Operation(Arc<OperationDecl>),
    Interface(Arc<InterfaceDecl>),
    Using(UsingDecl),
}

impl Item {
    pub fn span(&self) -> Span {
        match self {
            Item::Namespace(d) => d.span,
            Item::Model(d) => d.span,
            Item::Operation(d) => d.span,
            Item::Interface(d) => d.span,
            Item::Using(d) => d.span,
        }
    }
}

/// `import "./file.cadl";`
#[derive(Debug, Clone, PartialEq)]
pub struct ImportDecl {
    pub path: String,
    pub span: Span,
}

/// `using A.B;`
#[derive(Debug, Clone, PartialEq)]
pub struct UsingDecl {
    pub path: Vec<Ident>,
    pub span: Span,
}

/// `namespace A.B { ... }` or blockless `namespace A.B;`
#[derive(Debug, Clone, PartialEq)]
pub struct NamespaceDecl {
    pub decorators: Vec<DecoratorExpr>,
    pub path: Vec<Ident>,
    pub items: Vec<Item>,
    pub blockless: bool,
    pub span: Span,
}

/// Literal argument to a decorator.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    String(String),
    Number(f64),
    Boolean(bool),
}

#[derive(Debug, Clone, PartialEq)]
pub enum DecoratorArgExpr {
    Literal(Literal, Span),
    Type(TypeExpr),
}

impl DecoratorArgExpr {
    pub fn span(&self) -> Span {
        match self {
            DecoratorArgExpr::Literal(_, span) => *span,
            DecoratorArgExpr::Type(expr) => expr.span(),
        }
    }
}

/// `@name` or `@ns.name(args...)`
#[derive(Debug, Clone, PartialEq)]
pub struct DecoratorExpr {
    pub path: Vec<Ident>,
    pub args: Vec<DecoratorArgExpr>,
    pub span: Span,
}

impl DecoratorExpr {
    pub fn path_text(&self) -> String {
        self.path
            .iter()
            .map(|segment| segment.name.as_str())
            .collect::<Vec<_>>()
            .join(".")
    }
}

/// `<T, U = string>`
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateParamDecl {
    pub name: Ident,
    pub default: Option<TypeExpr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDecl {
    pub decorators: Vec<DecoratorExpr>,
    pub name: Ident,
    pub optional: bool,
    pub ty: TypeExpr,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ModelMember {
    Property(PropertyDecl),
    /// `...Other`
    Spread(TypeExpr, Span),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ModelHeritage {
    None,
    Extends(TypeExpr),
    Is(TypeExpr),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModelDecl {
    pub decorators: Vec<DecoratorExpr>,
    pub name: Ident,
    pub template_params: Vec<TemplateParamDecl>,
    pub heritage: ModelHeritage,
    pub members: Vec<ModelMember>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum OperationSignature {
    /// `(params): ReturnType`
    Declaration {
        parameters: Vec<ModelMember>,
        parameters_span: Span,
        return_type: TypeExpr,
    },
    /// `: other<Args>`
    Reference(TypeExpr),
}

#[derive(Debug, Clone, PartialEq)]
pub struct OperationDecl {
    pub decorators: Vec<DecoratorExpr>,
    pub name: Ident,
    pub template_params: Vec<TemplateParamDecl>,
    pub signature: OperationSignature,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InterfaceDecl {
    pub decorators: Vec<DecoratorExpr>,
    pub name: Ident,
    pub operations: Vec<Arc<OperationDecl>>,
    pub span: Span,
}
