//! Type expression AST nodes.

use cadl_core::Span;

use super::Ident;
use super::decl::ModelMember;

/// Built-in keyword types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntrinsicKeyword {
    Void,
    Never,
}

impl IntrinsicKeyword {
    pub fn name(self) -> &'static str {
        match self {
            IntrinsicKeyword::Void => "void",
            IntrinsicKeyword::Never => "never",
        }
    }
}

/// A (possibly qualified, possibly templated) reference: `A.B.Foo<string, Bar>`.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeReference {
    /// Dotted path segments, at least one.
    pub path: Vec<Ident>,
    pub args: Vec<TypeExpr>,
    /// Whether `<...>` was written, even if empty.
    pub has_arg_list: bool,
    pub span: Span,
}

impl TypeReference {
    /// The path as written, e.g. `A.B.Foo`.
    pub fn path_text(&self) -> String {
        self.path
            .iter()
            .map(|segment| segment.name.as_str())
            .collect::<Vec<_>>()
            .join(".")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeExpr {
    Reference(TypeReference),
    Intrinsic(IntrinsicKeyword, Span),
    /// `A | B | C`
    Union(Vec<TypeExpr>, Span),
    /// `{ a: string; ...B }`
    ModelExpression(Vec<ModelMember>, Span),
    /// `T[]`, sugar for `Array<T>`.
    Array(Box<TypeExpr>, Span),
}

impl TypeExpr {
    pub fn span(&self) -> Span {
        match self {
            TypeExpr::Reference(r) => r.span,
            TypeExpr::Intrinsic(_, span) => *span,
            TypeExpr::Union(_, span) => *span,
            TypeExpr::ModelExpression(_, span) => *span,
            TypeExpr::Array(_, span) => *span,
        }
    }
}
