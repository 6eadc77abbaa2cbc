//! Resolving decorator applications and running them.
//!
//! Applications are resolved while a type is built and stored on it, so that
//! `model A is B` and `op b: a` can re-run the source's decorators against
//! the new type. They run once the type is finished: property decorators
//! first, then the type's own, in stored order.

use cadl_core::{Diagnostic, DiagnosticCode};
use cadl_parser::ast::{DecoratorArgExpr, DecoratorExpr, Literal};
use cadl_registry::{DeclarationNode, SymbolId, SymbolKind};

use super::{Checker, Ctx, Demand};
use crate::decorators::{
    DecoratorApplication, DecoratorContext, DecoratorTarget, DecoratorTargets, DecoratorValue,
};
use crate::types::{Type, TypeId};

impl Checker<'_> {
    /// Resolve each `@name(args)`. Applications that fail to resolve are
    /// reported and dropped.
    pub(super) fn resolve_decorators(
        &mut self,
        decorators: &[DecoratorExpr],
        ctx: &Ctx<'_>,
    ) -> Vec<DecoratorApplication> {
        decorators
            .iter()
            .filter_map(|decorator| self.resolve_decorator(decorator, ctx))
            .collect()
    }

    fn resolve_decorator(
        &mut self,
        decorator: &DecoratorExpr,
        ctx: &Ctx<'_>,
    ) -> Option<DecoratorApplication> {
        let symbol = self.resolve_decorator_symbol(decorator, ctx)?;
        let symbols = self.symbols;
        let id = match symbols.symbol(symbol).declaration().map(|d| &d.node) {
            Some(DeclarationNode::Decorator(id)) => *id,
            _ => {
                self.internal_error(anyhow::anyhow!(
                    "decorator symbol '{}' has no decorator declaration",
                    symbols.qualified_name(symbol)
                ));
                return None;
            }
        };

        let mut args = Vec::with_capacity(decorator.args.len());
        for arg in &decorator.args {
            let value = match arg {
                DecoratorArgExpr::Literal(Literal::String(text), _) => DecoratorValue::string(text.clone()),
                DecoratorArgExpr::Literal(Literal::Number(number), _) => DecoratorValue::number(*number),
                DecoratorArgExpr::Literal(Literal::Boolean(flag), _) => DecoratorValue::Boolean(*flag),
                DecoratorArgExpr::Type(expr) => {
                    let ty = self.check_type_expr(expr, ctx, Demand::Reference);
                    if self.types.is_error(ty) {
                        return None;
                    }
                    DecoratorValue::Type(ty)
                }
            };
            args.push(value);
        }

        Some(DecoratorApplication {
            decorator: id,
            name: symbols.symbol(symbol).name.clone(),
            args,
            location: Some(ctx.location(decorator.span)),
        })
    }

    /// `@name` finds the nearest decorator called `name`, ignoring types of
    /// the same name; `@Ns.name` walks namespaces first.
    fn resolve_decorator_symbol(&mut self, decorator: &DecoratorExpr, ctx: &Ctx<'_>) -> Option<SymbolId> {
        let (first, rest) = decorator.path.split_first()?;
        let location = ctx.location(decorator.span);
        let unknown = |checker: &mut Self| -> Option<SymbolId> {
            checker.error_at(
                DiagnosticCode::UnknownDecorator,
                format!("Unknown decorator @{}", decorator.path_text()),
                location,
            );
            None
        };

        let wanted = if rest.is_empty() {
            SymbolKind::Decorator
        } else {
            SymbolKind::Namespace
        };
        let found = self
            .symbols
            .lookup_where(ctx.scope, &first.name, |symbol| symbol.kind == wanted);
        if found.is_not_found() {
            return unknown(self);
        }
        let mut current = self.expect_found(found, first, ctx)?;

        for segment in rest {
            match self.symbols.lookup_member(current, &segment.name) {
                Some(member) => current = member,
                None => return unknown(self),
            }
        }
        if self.symbols.symbol(current).kind != SymbolKind::Decorator {
            return unknown(self);
        }
        Some(current)
    }

    /// Run every decorator stored on a finished type.
    pub(super) fn apply_decorators(&mut self, id: TypeId) {
        if self.abandoning.is_some() {
            return;
        }
        let Some(ty) = self.types.get(id) else {
            return;
        };

        let (properties_of, own, kind) = match ty {
            Type::Model(model) => (Some(id), model.decorators.clone(), DecoratorTargets::MODEL),
            Type::Operation(operation) => (
                Some(operation.parameters),
                operation.decorators.clone(),
                DecoratorTargets::OPERATION,
            ),
            Type::Interface(interface) => (None, interface.decorators.clone(), DecoratorTargets::INTERFACE),
            _ => return,
        };

        if let Some(model_id) = properties_of {
            let properties: Vec<_> = self
                .types
                .get(model_id)
                .and_then(Type::as_model)
                .map(|model| {
                    model
                        .properties
                        .iter()
                        .map(|p| (p.name.clone(), p.decorators.clone()))
                        .collect()
                })
                .unwrap_or_default();
            for (name, applications) in properties {
                for application in &applications {
                    let target = DecoratorTarget::property(model_id, name.clone());
                    self.invoke(application, &target, DecoratorTargets::PROPERTY);
                }
            }
        }

        let target = DecoratorTarget::Type(id);
        for application in &own {
            self.invoke(application, &target, kind);
        }
    }

    fn invoke(
        &mut self,
        application: &DecoratorApplication,
        target: &DecoratorTarget,
        kind: DecoratorTargets,
    ) {
        let library = self.library;
        let Some(definition) = library.get(application.decorator) else {
            self.internal_error(anyhow::anyhow!(
                "decorator @{} ({:?}) is not in the library",
                application.name,
                application.decorator
            ));
            return;
        };

        if !definition.targets.intersects(kind) {
            let message = format!(
                "@{} cannot be applied to a {}; it applies to {}.",
                definition.name,
                kind.describe(),
                definition.targets.describe()
            );
            self.report(
                Diagnostic::new(DiagnosticCode::InvalidDecoratorTarget, message)
                    .at_opt(application.location),
            );
            return;
        }

        let mut produced = Vec::new();
        {
            let mut context = DecoratorContext {
                types: &self.types,
                symbols: self.symbols,
                state: &mut self.state,
                diagnostics: &mut produced,
                options: self.options,
                decorator: &definition.name,
                location: application.location,
            };
            (definition.handler)(&mut context, target, &application.args);
        }
        for diagnostic in produced {
            self.report(diagnostic);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{check_source, codes, type_of};
    use crate::decorators::{DecoratorTarget, DecoratorValue, keys};
    use cadl_core::DiagnosticCode;

    #[test]
    fn doc_is_recorded_on_the_model() {
        let output = check_source("@doc(\"A pet\") model Pet {}");
        let target = DecoratorTarget::Type(type_of(&output, "Pet"));
        assert_eq!(
            output.state.get(keys::DOC, &target),
            Some(&DecoratorValue::string("A pet"))
        );
    }

    #[test]
    fn property_decorators_target_the_property() {
        let output = check_source("model Pet { @key id: string }");
        let target = DecoratorTarget::property(type_of(&output, "Pet"), "id");
        assert_eq!(
            output.state.get(keys::KEY, &target),
            Some(&DecoratorValue::string("id"))
        );
    }

    #[test]
    fn unknown_decorator_is_reported() {
        let output = check_source("@nope model Pet {}");
        assert_eq!(codes(&output), [DiagnosticCode::UnknownDecorator]);
    }

    #[test]
    fn wrong_target_is_reported() {
        let output = check_source("@key model Pet {}");
        assert_eq!(codes(&output), [DiagnosticCode::InvalidDecoratorTarget]);
    }

    #[test]
    fn namespace_decorators_are_rejected() {
        let output = check_source("@doc(\"x\") namespace N {}");
        assert_eq!(codes(&output), [DiagnosticCode::InvalidDecoratorTarget]);
    }

    #[test]
    fn template_declarations_do_not_run_decorators() {
        let output = check_source("@doc(\"page\") model Page<T> { items: T[] } model A { p: Page<string> }");
        let declaration = DecoratorTarget::Type(type_of(&output, "Page"));
        assert!(!output.state.contains(keys::DOC, &declaration));
        assert_eq!(output.state.targets(keys::DOC).count(), 1);
    }

    #[test]
    fn is_reruns_source_decorators_on_the_new_model() {
        let output = check_source("@doc(\"base\") model B {} model A is B {}");
        let a = DecoratorTarget::Type(type_of(&output, "A"));
        assert_eq!(
            output.state.get(keys::DOC, &a),
            Some(&DecoratorValue::string("base"))
        );
    }

    #[test]
    fn type_arguments_are_passed_as_types() {
        let output = check_source("@test model A {} @tag(\"x\") op f(): void;");
        assert!(output.diagnostics.is_empty(), "{:?}", output.diagnostics);
        assert_eq!(output.state.targets(keys::TEST).count(), 1);
        assert_eq!(output.state.targets(keys::TAG).count(), 1);
    }
}
