//! Operations, operation reuse (`op b: a`) and interfaces.

use cadl_core::DiagnosticCode;
use cadl_parser::ast::{InterfaceDecl, OperationDecl, OperationSignature};
use cadl_registry::{LocalScopeKind, ScopeRef, SymbolFlags, SymbolId};

use super::{Checker, Ctx, Demand};
use crate::types::{InterfaceType, ModelType, OperationType, TemplateInstance, Type, TypeId};

impl Checker<'_> {
    pub(super) fn check_operation_declaration(
        &mut self,
        symbol: SymbolId,
        decl: &OperationDecl,
        template: Option<TemplateInstance>,
        ctx: &Ctx<'_>,
        id: TypeId,
    ) {
        let interface = self.owning_interface(symbol);

        let operation = match &decl.signature {
            OperationSignature::Declaration {
                parameters,
                return_type,
                ..
            } => {
                let mut properties = Vec::new();
                self.check_members(parameters, ctx, &mut properties);
                let parameters = self.alloc(
                    Type::Model(ModelType {
                        properties,
                        ..ModelType::default()
                    }),
                    ctx.dependent,
                );
                let return_type = self.check_type_expr(return_type, ctx, Demand::Reference);
                let decorators = self.resolve_decorators(&decl.decorators, ctx);
                OperationType {
                    name: decl.name.name.clone(),
                    symbol: Some(symbol),
                    parameters,
                    return_type,
                    source_operation: None,
                    interface,
                    template,
                    decorators,
                }
            }
            OperationSignature::Reference(expr) => {
                let source_id = self.check_type_expr(expr, ctx, Demand::Complete);
                let own = self.resolve_decorators(&decl.decorators, ctx);
                let source = match self.types.get(source_id) {
                    Some(Type::Operation(source)) if source.source_operation.is_some() => {
                        let name = source.name.clone();
                        self.error_at(
                            DiagnosticCode::InvalidOperationReference,
                            format!(
                                "Cannot reuse the signature of '{name}', which itself reuses another operation's signature."
                            ),
                            ctx.location(expr.span()),
                        );
                        self.finish(id, Type::Error);
                        return;
                    }
                    Some(Type::Operation(source)) => source.clone(),
                    Some(Type::Error) | Some(Type::TemplateParameter(_)) => {
                        self.finish(id, Type::Error);
                        return;
                    }
                    _ => {
                        self.error_at(
                            DiagnosticCode::InvalidOperationReference,
                            "An operation can only reuse the signature of another operation.",
                            ctx.location(expr.span()),
                        );
                        self.finish(id, Type::Error);
                        return;
                    }
                };

                // Fresh parameter model so decorators re-run against this operation.
                let properties = self
                    .types
                    .get(source.parameters)
                    .and_then(Type::as_model)
                    .map(|model| model.properties.clone())
                    .unwrap_or_default();
                let dependent = ctx.dependent || self.is_dependent(source_id);
                let parameters = self.alloc(
                    Type::Model(ModelType {
                        properties,
                        ..ModelType::default()
                    }),
                    dependent,
                );

                let mut decorators = source.decorators;
                decorators.extend(own);
                OperationType {
                    name: decl.name.name.clone(),
                    symbol: Some(symbol),
                    parameters,
                    return_type: source.return_type,
                    source_operation: Some(source_id),
                    interface,
                    template,
                    decorators,
                }
            }
        };

        self.finish(id, Type::Operation(operation));
        if !ctx.dependent {
            self.apply_decorators(id);
        }
    }

    pub(super) fn check_interface_declaration(
        &mut self,
        symbol: SymbolId,
        decl: &InterfaceDecl,
        ctx: &Ctx<'_>,
        id: TypeId,
    ) {
        let symbols = self.symbols;
        let mut operations = Vec::new();
        for member in symbols.members(symbol) {
            let operation = self.check_declaration(*member);
            self.symbol_types.insert(*member, operation);
            operations.push((symbols.symbol(*member).name.clone(), operation));
        }

        let decorators = self.resolve_decorators(&decl.decorators, ctx);
        self.finish(
            id,
            Type::Interface(InterfaceType {
                name: decl.name.name.clone(),
                symbol: Some(symbol),
                operations,
                decorators,
            }),
        );
        if !ctx.dependent {
            self.apply_decorators(id);
        }
    }

    fn owning_interface(&self, operation: SymbolId) -> Option<SymbolId> {
        let symbol = self.symbols.symbol(operation);
        if !symbol.flags.contains(SymbolFlags::INTERFACE_MEMBER) {
            return None;
        }
        match symbol.parent {
            ScopeRef::Local(scope) => match self.symbols.local(scope).kind {
                LocalScopeKind::Interface(owner) => Some(owner),
                LocalScopeKind::TemplateParameters(_) => None,
            },
            ScopeRef::Namespace(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{check_source, codes, operation_of, type_of};
    use cadl_core::DiagnosticCode;

    #[test]
    fn parameters_become_an_anonymous_model() {
        let output = check_source("op create(name: string, tag?: string): boolean;");
        let operation = operation_of(&output, "create");
        let parameters = output.types.get(operation.parameters).and_then(|t| t.as_model());
        assert_eq!(parameters.map(|m| m.property_names()), Some(vec!["name", "tag"]));
        assert!(operation.source_operation.is_none());
    }

    #[test]
    fn reuse_copies_the_signature() {
        let output = check_source("op a(x: string): int32; op b: a;");
        let a = operation_of(&output, "a");
        let b = operation_of(&output, "b");
        assert_eq!(a.return_type, b.return_type);
        assert_ne!(a.parameters, b.parameters);
        assert_eq!(b.source_operation, Some(type_of(&output, "a")));
    }

    #[test]
    fn reusing_a_reused_signature_is_rejected() {
        let output = check_source("op a(x: string): void; op b: a; op c: b;");
        assert_eq!(codes(&output), [DiagnosticCode::InvalidOperationReference]);
        assert!(output.diagnostics[0].message.contains("'b'"));
        assert!(output.types.is_error(type_of(&output, "c")));
        assert!(operation_of(&output, "b").source_operation.is_some());
    }

    #[test]
    fn reusing_a_model_is_invalid() {
        let output = check_source("model M {} op b: M;");
        assert_eq!(codes(&output), [DiagnosticCode::InvalidOperationReference]);
    }

    #[test]
    fn reuse_cycle_is_reported() {
        let output = check_source("op a: b; op b: a;");
        assert_eq!(codes(&output), [DiagnosticCode::CyclicReference]);
    }

    #[test]
    fn interface_lists_operations_in_order() {
        let output = check_source("interface Store { get(): string; put(value: string): void; }");
        let store = output
            .types
            .get(type_of(&output, "Store"))
            .and_then(|t| t.as_interface())
            .cloned();
        let store = store.expect("interface type");
        let names: Vec<&str> = store.operations.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, ["get", "put"]);

        let get = operation_of(&output, "Store.get");
        assert!(get.interface.is_some());
    }
}
