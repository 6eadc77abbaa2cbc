//! Template instantiation support.
//!
//! The checker instantiates a templated declaration by checking its body again
//! under a [`SubstitutionMap`]; the [`TemplateInstanceCache`] makes the result
//! identity-stable per argument list.

mod cache;
mod substitution;

pub use cache::TemplateInstanceCache;
pub use substitution::{SubstitutionMap, TemplateArgError, build_substitution_map};
