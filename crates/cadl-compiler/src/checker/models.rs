//! Models, their members, and anonymous model expressions.

use cadl_core::{DiagnosticCode, Location};
use cadl_parser::ast::{ModelDecl, ModelHeritage, ModelMember};
use cadl_registry::{SymbolId, SymbolKind};
use rustc_hash::FxHashSet;

use super::{Checker, Ctx, Demand};
use crate::decorators::DecoratorApplication;
use crate::types::{ModelProperty, ModelType, TemplateInstance, Type, TypeId};

impl Checker<'_> {
    pub(super) fn check_model_declaration(
        &mut self,
        symbol: SymbolId,
        decl: &ModelDecl,
        template: Option<TemplateInstance>,
        ctx: &Ctx<'_>,
        id: TypeId,
    ) {
        let mut model = ModelType {
            name: decl.name.name.clone(),
            symbol: Some(symbol),
            template,
            ..ModelType::default()
        };
        let mut inherited: Vec<DecoratorApplication> = Vec::new();

        match &decl.heritage {
            ModelHeritage::None => {}
            ModelHeritage::Is(expr) => {
                let source = self.check_type_expr(expr, ctx, Demand::Complete);
                match self.types.get(source) {
                    Some(Type::Model(source_model)) => {
                        model.properties = source_model.properties.clone();
                        inherited = source_model.decorators.clone();
                        model.source_model = Some(source);
                    }
                    Some(Type::Error) | Some(Type::TemplateParameter(_)) => {}
                    _ => self.error_at(
                        DiagnosticCode::InvalidBaseType,
                        "A model can only be declared 'is' another model.",
                        ctx.location(expr.span()),
                    ),
                }
            }
            ModelHeritage::Extends(expr) => {
                let base = self.check_type_expr(expr, ctx, Demand::Reference);
                let is_model = match self.types.get(base) {
                    Some(ty) => ty.as_model().is_some(),
                    // Still resolving further up the stack.
                    None => self.reserved_kind(base) == Some(SymbolKind::Model),
                };
                if self.base_chain_reaches(base, id) {
                    let name = self.symbols.qualified_name(symbol);
                    self.error_at(
                        DiagnosticCode::CyclicReference,
                        format!("Type '{name}' recursively references itself."),
                        ctx.location(expr.span()),
                    );
                } else if is_model {
                    model.base_model = Some(base);
                } else if !matches!(
                    self.types.get(base),
                    Some(Type::Error) | Some(Type::TemplateParameter(_))
                ) {
                    self.error_at(
                        DiagnosticCode::InvalidBaseType,
                        "A model can only extend another model.",
                        ctx.location(expr.span()),
                    );
                }
            }
        }

        self.check_members(&decl.members, ctx, &mut model.properties);

        let own = self.resolve_decorators(&decl.decorators, ctx);
        model.decorators = inherited;
        model.decorators.extend(own);

        self.finish(id, Type::Model(model));
        if !ctx.dependent {
            self.apply_decorators(id);
        }
    }

    /// Whether following `extends` from `base` arrives at `model`. Unfinished
    /// links end the walk; the model finishing last sees the whole loop.
    fn base_chain_reaches(&self, base: TypeId, model: TypeId) -> bool {
        let mut visited = FxHashSet::default();
        let mut current = Some(base);
        while let Some(id) = current {
            if id == model {
                return true;
            }
            if !visited.insert(id) {
                return false;
            }
            current = self
                .types
                .get(id)
                .and_then(Type::as_model)
                .and_then(|m| m.base_model);
        }
        false
    }

    /// `{ a: string, ...B }` written inline.
    ///
    /// Outside template bodies, expressions without decorators are structural:
    /// equal property lists share one handle, so `Box<{ x: string }>` names
    /// the same instance wherever it is written.
    pub(super) fn check_model_expression(
        &mut self,
        members: &[ModelMember],
        ctx: &Ctx<'_>,
    ) -> TypeId {
        let mut properties = Vec::new();
        self.check_members(members, ctx, &mut properties);

        let structural = !ctx.dependent && properties.iter().all(|p| p.decorators.is_empty());
        let shape: Vec<(String, TypeId, bool)> = properties
            .iter()
            .map(|p| (p.name.clone(), p.ty, p.optional))
            .collect();
        if structural {
            if let Some(id) = self.model_expressions.get(&shape) {
                return *id;
            }
        }

        let id = self.alloc(
            Type::Model(ModelType {
                properties,
                ..ModelType::default()
            }),
            ctx.dependent,
        );
        if structural {
            self.model_expressions.insert(shape, id);
        } else if !ctx.dependent {
            self.apply_decorators(id);
        }
        id
    }

    /// Append properties and spreads to `properties` in source order.
    pub(super) fn check_members(
        &mut self,
        members: &[ModelMember],
        ctx: &Ctx<'_>,
        properties: &mut Vec<ModelProperty>,
    ) {
        for member in members {
            match member {
                ModelMember::Property(decl) => {
                    let ty = self.check_type_expr(&decl.ty, ctx, Demand::Reference);
                    let decorators = self.resolve_decorators(&decl.decorators, ctx);
                    let location = ctx.location(decl.name.span);
                    let property = ModelProperty {
                        name: decl.name.name.clone(),
                        ty,
                        optional: decl.optional,
                        decorators,
                        location: Some(location),
                    };
                    self.add_property(properties, property, location);
                }
                ModelMember::Spread(expr, span) => {
                    let location = ctx.location(*span);
                    let source = self.check_type_expr(expr, ctx, Demand::Complete);
                    let spread = match self.types.get(source) {
                        Some(Type::Model(model)) => model.properties.clone(),
                        Some(Type::Error) | Some(Type::TemplateParameter(_)) => continue,
                        _ => {
                            self.error_at(
                                DiagnosticCode::InvalidSpread,
                                "Cannot spread properties of a type that is not a model.",
                                location,
                            );
                            continue;
                        }
                    };
                    for property in spread {
                        self.add_property(properties, property, location);
                    }
                }
            }
        }
    }

    fn add_property(
        &mut self,
        properties: &mut Vec<ModelProperty>,
        property: ModelProperty,
        location: Location,
    ) {
        if properties.iter().any(|existing| existing.name == property.name) {
            self.error_at(
                DiagnosticCode::DuplicateProperty,
                format!("Model already has a property named '{}'.", property.name),
                location,
            );
            return;
        }
        properties.push(property);
    }
}
