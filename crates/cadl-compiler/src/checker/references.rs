//! Type expressions, name resolution and template instantiation.

use cadl_core::{Diagnostic, DiagnosticCode, Location};
use cadl_parser::ast::{Ident, IntrinsicKeyword, TypeExpr, TypeReference};
use cadl_registry::{DeclarationNode, ResolutionResult, SymbolId, SymbolKind};

use super::{Checker, Ctx, Demand};
use crate::decorators::{DecoratorTarget, keys};
use crate::template::build_substitution_map;
use crate::types::{IntrinsicKind, TypeId};

/// Stdlib model that `T[]` desugars to.
const ARRAY_MODEL: &str = "Array";

impl Checker<'_> {
    pub(crate) fn check_type_expr(&mut self, expr: &TypeExpr, ctx: &Ctx<'_>, demand: Demand) -> TypeId {
        match expr {
            TypeExpr::Reference(reference) => self.check_type_reference(reference, ctx, demand),
            TypeExpr::Intrinsic(keyword, _) => self.types.intrinsic(match keyword {
                IntrinsicKeyword::Void => IntrinsicKind::Void,
                IntrinsicKeyword::Never => IntrinsicKind::Never,
            }),
            TypeExpr::Union(options, _) => self.check_union(options, ctx),
            TypeExpr::ModelExpression(members, _) => self.check_model_expression(members, ctx),
            TypeExpr::Array(element, span) => {
                self.check_array(element, ctx.location(*span), ctx, demand)
            }
        }
    }

    fn check_union(&mut self, options: &[TypeExpr], ctx: &Ctx<'_>) -> TypeId {
        let mut resolved: Vec<TypeId> = Vec::with_capacity(options.len());
        for option in options {
            let id = self.check_type_expr(option, ctx, Demand::Reference);
            if !resolved.contains(&id) {
                resolved.push(id);
            }
        }
        let dependent = resolved.iter().any(|id| self.is_dependent(*id));
        let id = self.types.intern_union(resolved);
        if dependent {
            self.dependent_types.insert(id);
        }
        id
    }

    fn check_array(
        &mut self,
        element: &TypeExpr,
        location: Location,
        ctx: &Ctx<'_>,
        demand: Demand,
    ) -> TypeId {
        let element = self.check_type_expr(element, ctx, Demand::Reference);
        let Some(array) = self.symbols.resolve_qualified(ARRAY_MODEL) else {
            self.error_at(
                DiagnosticCode::UnknownIdentifier,
                format!("Unknown identifier {ARRAY_MODEL}"),
                location,
            );
            return self.error_type();
        };
        self.instantiate(array, vec![element], location, demand)
    }

    fn check_type_reference(
        &mut self,
        reference: &TypeReference,
        ctx: &Ctx<'_>,
        demand: Demand,
    ) -> TypeId {
        let location = ctx.location(reference.span);
        let Some(symbol_id) = self.resolve_path(&reference.path, ctx) else {
            return self.error_type();
        };

        let symbols = self.symbols;
        let symbol = symbols.symbol(symbol_id);
        let path = reference.path_text();

        let id = match symbol.kind {
            SymbolKind::Namespace | SymbolKind::Decorator => {
                self.error_at(
                    DiagnosticCode::InvalidTypeReference,
                    format!("'{path}' is a {}, not a type.", symbol.kind.name()),
                    location,
                );
                return self.error_type();
            }
            SymbolKind::TemplateParameter => {
                if reference.has_arg_list {
                    self.error_at(
                        DiagnosticCode::InvalidTemplateArgs,
                        format!("Template parameter '{path}' cannot take template arguments."),
                        location,
                    );
                    return self.error_type();
                }
                return match ctx.subst.get(&symbol_id) {
                    Some(bound) => *bound,
                    None => self.param_type(symbol_id),
                };
            }
            SymbolKind::Model | SymbolKind::Operation | SymbolKind::Interface => {
                let args: Vec<TypeId> = reference
                    .args
                    .iter()
                    .map(|arg| self.check_type_expr(arg, ctx, Demand::Reference))
                    .collect();

                if symbol.is_templated() {
                    self.instantiate(symbol_id, args, location, demand)
                } else if reference.has_arg_list {
                    self.error_at(
                        DiagnosticCode::InvalidTemplateArgs,
                        format!("'{path}' is not a template and cannot take template arguments."),
                        location,
                    );
                    return self.error_type();
                } else {
                    self.resolve_symbol(symbol_id, Vec::new(), demand, Some(location))
                }
            }
        };

        self.check_deprecated(id, &path, location);
        id
    }

    /// Resolve a dotted name from the context scope, reporting failures.
    pub(crate) fn resolve_path(&mut self, path: &[Ident], ctx: &Ctx<'_>) -> Option<SymbolId> {
        let (first, rest) = path.split_first()?;
        let found = self.symbols.lookup(ctx.scope, &first.name);
        let mut current = self.expect_found(found, first, ctx)?;

        for segment in rest {
            match self.symbols.lookup_member(current, &segment.name) {
                Some(member) => current = member,
                None => {
                    let container = self.symbols.qualified_name(current);
                    self.error_at(
                        DiagnosticCode::UnknownIdentifier,
                        format!("'{container}' doesn't have member '{}'", segment.name),
                        ctx.location(segment.span),
                    );
                    return None;
                }
            }
        }
        Some(current)
    }

    /// Unwrap a lookup result, reporting ambiguity or absence.
    pub(crate) fn expect_found(
        &mut self,
        found: ResolutionResult<SymbolId>,
        name: &Ident,
        ctx: &Ctx<'_>,
    ) -> Option<SymbolId> {
        match found {
            ResolutionResult::Found(id) => Some(id),
            ResolutionResult::Ambiguous(candidates) => {
                let names: Vec<String> = candidates
                    .iter()
                    .map(|(_, id)| self.symbols.qualified_name(*id))
                    .collect();
                self.error_at(
                    DiagnosticCode::AmbiguousReference,
                    format!(
                        "'{}' is an ambiguous name between {}.",
                        name.name,
                        names.join(", ")
                    ),
                    ctx.location(name.span),
                );
                None
            }
            ResolutionResult::NotFound => {
                self.error_at(
                    DiagnosticCode::UnknownIdentifier,
                    format!("Unknown identifier {}", name.name),
                    ctx.location(name.span),
                );
                None
            }
        }
    }

    /// Instantiate a templated declaration, filling omitted arguments from
    /// parameter defaults.
    pub(crate) fn instantiate(
        &mut self,
        template: SymbolId,
        mut args: Vec<TypeId>,
        location: Location,
        demand: Demand,
    ) -> TypeId {
        if args.iter().any(|arg| self.types.is_error(*arg)) {
            return self.error_type();
        }

        let symbols = self.symbols;
        let symbol = symbols.symbol(template);
        let params = &symbol.template_params;
        let explicit = args.len();

        if explicit > params.len() {
            self.error_at(
                DiagnosticCode::InvalidTemplateArgs,
                format!(
                    "Too many template arguments for '{}': expected {}, got {explicit}.",
                    symbol.name,
                    params.len()
                ),
                location,
            );
            return self.error_type();
        }

        for index in explicit..params.len() {
            let param = symbols.symbol(params[index]);
            let default = param.declaration().and_then(|declaration| match &declaration.node {
                DeclarationNode::TemplateParameter(decl) => {
                    decl.default.as_ref().map(|expr| (declaration.file, expr))
                }
                _ => None,
            });
            let Some((file, expr)) = default else {
                self.error_at(
                    DiagnosticCode::InvalidTemplateArgs,
                    format!(
                        "Too few template arguments for '{}': expected {}, got {explicit}.",
                        symbol.name,
                        params.len()
                    ),
                    location,
                );
                return self.error_type();
            };

            let subst = match build_substitution_map(&params[..index], &args) {
                Ok(subst) => subst,
                Err(error) => {
                    self.internal_error(anyhow::anyhow!(error).context("binding template defaults"));
                    return self.error_type();
                }
            };
            let ctx = Ctx {
                file,
                scope: param.parent,
                subst: &subst,
                dependent: args.iter().any(|arg| self.is_dependent(*arg)),
            };

            if !self.enter(Some(location)) {
                return self.error_type();
            }
            let value = self.check_type_expr(expr, &ctx, Demand::Reference);
            self.depth -= 1;

            if self.types.is_error(value) {
                return self.error_type();
            }
            args.push(value);
        }

        self.resolve_symbol(template, args, demand, Some(location))
    }

    /// Warn when a reference names something marked `@deprecated`.
    fn check_deprecated(&mut self, id: TypeId, path: &str, location: Location) {
        let target = DecoratorTarget::Type(id);
        let Some(reason) = self.state.get(keys::DEPRECATED, &target) else {
            return;
        };
        let message = match reason.as_str() {
            Some(reason) => format!("'{path}' is deprecated: {reason}"),
            None => format!("'{path}' is deprecated."),
        };
        self.report(Diagnostic::new(DiagnosticCode::Deprecated, message).at(location));
    }
}
