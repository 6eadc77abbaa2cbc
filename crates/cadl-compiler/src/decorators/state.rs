//! Decorator metadata side table.
//!
//! Decorators never mutate types. They record values here, keyed by a state
//! key (one per decorator library concern) and the decorated target.

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;

use super::{DecoratorTarget, DecoratorValue};

#[derive(Debug, Default, Clone)]
pub struct StateMap {
    entries: FxHashMap<&'static str, BTreeMap<DecoratorTarget, Vec<DecoratorValue>>>,
}

impl StateMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the value stored for `target`.
    pub fn set(&mut self, key: &'static str, target: DecoratorTarget, value: DecoratorValue) {
        self.entries.entry(key).or_default().insert(target, vec![value]);
    }

    /// Append to the list stored for `target`.
    pub fn push(&mut self, key: &'static str, target: DecoratorTarget, value: DecoratorValue) {
        self.entries
            .entry(key)
            .or_default()
            .entry(target)
            .or_default()
            .push(value);
    }

    /// First value stored for `target`.
    pub fn get(&self, key: &str, target: &DecoratorTarget) -> Option<&DecoratorValue> {
        self.get_all(key, target).first()
    }

    /// Every value stored for `target`, in the order they were recorded.
    pub fn get_all(&self, key: &str, target: &DecoratorTarget) -> &[DecoratorValue] {
        self.entries
            .get(key)
            .and_then(|targets| targets.get(target))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn contains(&self, key: &str, target: &DecoratorTarget) -> bool {
        !self.get_all(key, target).is_empty()
    }

    /// Targets that have a value for `key`, ordered by target.
    pub fn targets(&self, key: &str) -> impl Iterator<Item = (&DecoratorTarget, &[DecoratorValue])> {
        self.entries
            .get(key)
            .into_iter()
            .flat_map(|targets| targets.iter().map(|(t, v)| (t, v.as_slice())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TypeArena;

    #[test]
    fn set_replaces_and_push_appends() {
        let arena = TypeArena::new();
        let target = DecoratorTarget::Type(arena.void());
        let mut state = StateMap::new();

        state.set("doc", target.clone(), DecoratorValue::string("first"));
        state.set("doc", target.clone(), DecoratorValue::string("second"));
        assert_eq!(state.get_all("doc", &target), &[DecoratorValue::string("second")]);

        state.push("tag", target.clone(), DecoratorValue::string("a"));
        state.push("tag", target.clone(), DecoratorValue::string("b"));
        assert_eq!(state.get_all("tag", &target).len(), 2);
        assert!(!state.contains("summary", &target));
    }

    #[test]
    fn property_targets_are_distinct_from_their_model() {
        let arena = TypeArena::new();
        let model = arena.void();
        let mut state = StateMap::new();
        state.set(
            "key",
            DecoratorTarget::property(model, "id"),
            DecoratorValue::Boolean(true),
        );

        assert!(state.contains("key", &DecoratorTarget::property(model, "id")));
        assert!(!state.contains("key", &DecoratorTarget::Type(model)));
        assert_eq!(state.targets("key").count(), 1);
    }
}
