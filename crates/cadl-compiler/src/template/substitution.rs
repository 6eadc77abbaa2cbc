//! Template parameter substitution.

use cadl_registry::SymbolId;
use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::types::TypeId;

/// Map from template parameter symbol to the argument bound to it.
pub type SubstitutionMap = FxHashMap<SymbolId, TypeId>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateArgError {
    #[error("expected {expected} template argument(s) but got {got}")]
    CountMismatch { expected: usize, got: usize },
}

/// Bind each parameter to its argument.
///
/// # Errors
/// Returns an error if the number of arguments doesn't match parameters.
pub fn build_substitution_map(
    template_params: &[SymbolId],
    type_args: &[TypeId],
) -> Result<SubstitutionMap, TemplateArgError> {
    if template_params.len() != type_args.len() {
        return Err(TemplateArgError::CountMismatch {
            expected: template_params.len(),
            got: type_args.len(),
        });
    }

    Ok(template_params
        .iter()
        .copied()
        .zip(type_args.iter().copied())
        .collect())
}
