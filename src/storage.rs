//! Provider registry
//!
//! Providers are kept in registration order. A type index maps every type a
//! provider is assignable to onto the positions of those providers, so the
//! type pass of a lookup never scans the whole registry.

use crate::TypeKey;
use crate::provider::Provider;
use ahash::RandomState;
use std::any::TypeId;
use std::collections::HashMap;

/// Insertion-ordered provider storage with a type index.
pub(crate) struct ProviderStorage {
    /// Providers, in registration order
    providers: Vec<Box<dyn Provider>>,
    /// Assignable type -> ascending provider positions
    by_type: HashMap<TypeId, Vec<usize>, RandomState>,
}

impl ProviderStorage {
    /// Create empty storage.
    #[inline]
    pub(crate) fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create with room for `capacity` providers.
    #[inline]
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            providers: Vec::with_capacity(capacity),
            by_type: HashMap::with_capacity_and_hasher(capacity, RandomState::new()),
        }
    }

    /// Append a provider and index it; returns its position.
    pub(crate) fn insert(&mut self, provider: Box<dyn Provider>) -> usize {
        let position = self.providers.len();
        let mut keys = provider.assignable_to();
        keys.dedup();
        for key in keys {
            let positions = self.by_type.entry(key.id()).or_default();
            if positions.last() != Some(&position) {
                positions.push(position);
            }
        }
        self.providers.push(provider);
        position
    }

    /// Positions of providers assignable to `ty`, in registration order.
    #[inline]
    pub(crate) fn assignable_to(&self, ty: TypeKey) -> &[usize] {
        self.by_type
            .get(&ty.id())
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// The provider at `position`.
    #[inline]
    pub(crate) fn get(&self, position: usize) -> Option<&dyn Provider> {
        self.providers.get(position).map(|p| &**p)
    }

    /// Every provider, in registration order.
    #[inline]
    pub(crate) fn iter(&self) -> impl Iterator<Item = &dyn Provider> {
        self.providers.iter().map(|p| &**p)
    }

    /// Number of registered providers.
    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.providers.len()
    }

    /// Number of distinct indexed types.
    #[inline]
    pub(crate) fn indexed_types(&self) -> usize {
        self.by_type.len()
    }
}

impl Default for ProviderStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ProviderStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderStorage")
            .field("count", &self.len())
            .field("types", &self.indexed_types())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{Decorated, InterfaceA, PtrImplA};
    use crate::{ValueProvider, shared};

    #[test]
    fn test_insert_preserves_order() {
        let mut storage = ProviderStorage::new();

        assert_eq!(storage.insert(Box::new(ValueProvider::new(1_i32))), 0);
        assert_eq!(storage.insert(Box::new(ValueProvider::new(2_u8))), 1);
        assert_eq!(storage.insert(Box::new(ValueProvider::new(3_i32))), 2);

        assert_eq!(storage.len(), 3);
        assert_eq!(storage.assignable_to(TypeKey::of::<i32>()), &[0, 2]);
        assert_eq!(storage.assignable_to(TypeKey::of::<u8>()), &[1]);
        assert!(storage.assignable_to(TypeKey::of::<u64>()).is_empty());
    }

    #[test]
    fn test_indexes_interfaces() {
        let mut storage = ProviderStorage::new();
        storage.insert(Box::new(ValueProvider::new(shared(Decorated))));
        storage.insert(Box::new(ValueProvider::new(shared(PtrImplA::default()))));

        let iface = TypeKey::handle::<dyn InterfaceA>();
        assert_eq!(storage.assignable_to(iface), &[0, 1]);
        assert_eq!(storage.assignable_to(TypeKey::handle::<Decorated>()), &[0]);
        assert_eq!(storage.indexed_types(), 3);
    }

    #[test]
    fn test_get_and_iter() {
        let mut storage = ProviderStorage::default();
        storage.insert(Box::new(ValueProvider::new(1_i32).named("one")));

        assert_eq!(storage.get(0).map(|p| p.name()), Some("one"));
        assert!(storage.get(1).is_none());
        assert_eq!(storage.iter().count(), 1);
    }
}
