//! Per-compilation storage for types.

use std::fmt;

use anyhow::{Result, bail};
use rustc_hash::FxHashMap;

use super::{IntrinsicKind, Type, UnionType};

/// Handle to a type in a [`TypeArena`].
///
/// Two handles are equal exactly when they name the same type. Identity, not
/// structure, is what template memoization guarantees.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TypeId(u32);

impl TypeId {
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeId({})", self.0)
    }
}

#[derive(Debug)]
enum Slot {
    /// Handed out, structure not known yet.
    Reserved,
    Finished(Type),
}

/// Append-only type storage.
///
/// A slot is reserved when resolution of a type starts, so references made
/// while it is being resolved get a stable handle, and finished exactly once.
#[derive(Debug)]
pub struct TypeArena {
    slots: Vec<Slot>,
    void: TypeId,
    never: TypeId,
    error: TypeId,
    /// Unions are structural: one handle per ordered option list.
    unions: FxHashMap<Vec<TypeId>, TypeId>,
}

impl Default for TypeArena {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeArena {
    pub fn new() -> Self {
        let mut arena = Self {
            slots: Vec::new(),
            void: TypeId(0),
            never: TypeId(0),
            error: TypeId(0),
            unions: FxHashMap::default(),
        };
        arena.void = arena.alloc(Type::Intrinsic(IntrinsicKind::Void));
        arena.never = arena.alloc(Type::Intrinsic(IntrinsicKind::Never));
        arena.error = arena.alloc(Type::Error);
        arena
    }

    pub fn void(&self) -> TypeId {
        self.void
    }

    pub fn never(&self) -> TypeId {
        self.never
    }

    pub fn error(&self) -> TypeId {
        self.error
    }

    pub fn intrinsic(&self, kind: IntrinsicKind) -> TypeId {
        match kind {
            IntrinsicKind::Void => self.void,
            IntrinsicKind::Never => self.never,
        }
    }

    /// Store a finished type.
    pub fn alloc(&mut self, ty: Type) -> TypeId {
        let id = TypeId(self.slots.len() as u32);
        self.slots.push(Slot::Finished(ty));
        id
    }

    /// The union of `options`, allocated on first use. The same ordered
    /// options always give the same handle.
    pub fn intern_union(&mut self, options: Vec<TypeId>) -> TypeId {
        if let Some(id) = self.unions.get(&options) {
            return *id;
        }
        let id = self.alloc(Type::Union(UnionType {
            options: options.clone(),
        }));
        self.unions.insert(options, id);
        id
    }

    /// Hand out a handle whose type is filled in later by [`finish`](Self::finish).
    pub fn reserve(&mut self) -> TypeId {
        let id = TypeId(self.slots.len() as u32);
        self.slots.push(Slot::Reserved);
        id
    }

    /// Fill a reserved slot. Finishing twice is a compiler defect.
    pub fn finish(&mut self, id: TypeId, ty: Type) -> Result<()> {
        match self.slots.get_mut(id.index()) {
            Some(slot @ Slot::Reserved) => {
                *slot = Slot::Finished(ty);
                Ok(())
            }
            Some(Slot::Finished(_)) => bail!("type slot {id:?} finished twice"),
            None => bail!("type slot {id:?} was never reserved"),
        }
    }

    /// The type behind a handle, or `None` while it is still being resolved.
    pub fn get(&self, id: TypeId) -> Option<&Type> {
        match self.slots.get(id.index())? {
            Slot::Finished(ty) => Some(ty),
            Slot::Reserved => None,
        }
    }

    pub fn is_finished(&self, id: TypeId) -> bool {
        self.get(id).is_some()
    }

    /// The error singleton, or a slot finished as [`Type::Error`].
    pub fn is_error(&self, id: TypeId) -> bool {
        id == self.error || matches!(self.get(id), Some(Type::Error))
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Finished types in allocation order.
    pub fn iter(&self) -> impl Iterator<Item = (TypeId, &Type)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| match slot {
            Slot::Finished(ty) => Some((TypeId(index as u32), ty)),
            Slot::Reserved => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn singletons_are_preallocated() {
        let arena = TypeArena::new();
        assert_eq!(arena.get(arena.void()), Some(&Type::Intrinsic(IntrinsicKind::Void)));
        assert_eq!(arena.get(arena.never()), Some(&Type::Intrinsic(IntrinsicKind::Never)));
        assert!(arena.is_error(arena.error()));
        assert_eq!(arena.intrinsic(IntrinsicKind::Void), arena.void());
    }

    #[test]
    fn reserved_slot_is_filled_once() {
        let mut arena = TypeArena::new();
        let id = arena.reserve();
        assert!(arena.get(id).is_none());

        let union = Type::Union(UnionType { options: vec![arena.void()] });
        arena.finish(id, union.clone()).unwrap();
        assert_eq!(arena.get(id), Some(&union));

        let err = arena.finish(id, Type::Error).unwrap_err();
        assert!(err.to_string().contains("finished twice"));
    }

    #[test]
    fn unions_with_the_same_options_share_a_handle() {
        let mut arena = TypeArena::new();
        let (void, never) = (arena.void(), arena.never());
        let first = arena.intern_union(vec![void, never]);
        assert_eq!(arena.intern_union(vec![void, never]), first);
        assert_ne!(arena.intern_union(vec![never, void]), first);
    }

    #[test]
    fn iter_skips_reserved_slots() {
        let mut arena = TypeArena::new();
        arena.reserve();
        assert_eq!(arena.iter().count(), 3);
        assert_eq!(arena.len(), 4);
    }
}
