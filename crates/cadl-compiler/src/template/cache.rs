//! Template instance cache.
//!
//! Maps (template declaration, argument types) to the instance type so that
//! instantiating the same template with the same arguments always yields the
//! same [`TypeId`].

use cadl_registry::SymbolId;
use rustc_hash::FxHashMap;

use crate::types::TypeId;

#[derive(Debug, Default, Clone)]
pub struct TemplateInstanceCache {
    instances: FxHashMap<(SymbolId, Vec<TypeId>), TypeId>,
    /// Instances per declaration, in creation order.
    by_declaration: FxHashMap<SymbolId, Vec<TypeId>>,
}

impl TemplateInstanceCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, template: SymbolId, args: Vec<TypeId>, instance: TypeId) {
        if self.instances.insert((template, args), instance).is_none() {
            self.by_declaration.entry(template).or_default().push(instance);
        }
    }

    pub fn get(&self, template: SymbolId, args: &[TypeId]) -> Option<TypeId> {
        self.instances.get(&(template, args.to_vec())).copied()
    }

    pub fn contains(&self, template: SymbolId, args: &[TypeId]) -> bool {
        self.instances.contains_key(&(template, args.to_vec()))
    }

    /// Every instance of `template`, in creation order.
    pub fn instances_of(&self, template: SymbolId) -> &[TypeId] {
        self.by_declaration
            .get(&template)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Type, TypeArena};

    #[test]
    fn cache_new_is_empty() {
        let cache = TemplateInstanceCache::new();
        assert!(cache.is_empty());
    }

    #[test]
    fn same_arguments_hit_the_cache() {
        let mut arena = TypeArena::new();
        let template = SymbolId::new(4);
        let arg = arena.alloc(Type::Error);
        let instance = arena.reserve();

        let mut cache = TemplateInstanceCache::new();
        cache.insert(template, vec![arg], instance);
        cache.insert(template, vec![arg], instance);

        assert!(cache.contains(template, &[arg]));
        assert_eq!(cache.get(template, &[arg]), Some(instance));
        assert_eq!(cache.get(template, &[arena.void()]), None);
        assert_eq!(cache.instances_of(template), &[instance]);
    }

    #[test]
    fn argument_order_matters() {
        let arena = TypeArena::new();
        let template = SymbolId::new(1);
        let mut cache = TemplateInstanceCache::new();
        cache.insert(template, vec![arena.void(), arena.never()], arena.error());

        assert!(cache.contains(template, &[arena.void(), arena.never()]));
        assert!(!cache.contains(template, &[arena.never(), arena.void()]));
    }
}
