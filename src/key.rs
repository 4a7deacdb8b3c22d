//! Runtime type descriptors
//!
//! Matching in the graph never casts ad hoc: every produced, requested and
//! context type is reduced to a [`TypeKey`] and compared by identity.

use crate::{Descriptor, Injectable, Shared};
use std::any::TypeId;
use std::hash::{Hash, Hasher};

/// Identity of a Rust type, with its name kept for diagnostics.
#[derive(Clone, Copy, Debug)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
}

impl TypeKey {
    /// Key for `T`.
    #[inline]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// Key of the handle type `Shared<T>`.
    ///
    /// Contexts and interfaces are compared in handle space, so a concrete
    /// consumer and a trait it implements can be matched by the same key.
    #[inline]
    pub fn handle<T: ?Sized + 'static>() -> Self {
        Self::of::<Shared<T>>()
    }

    /// The underlying `TypeId`.
    #[inline]
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// The type name, as reported by `std::any::type_name`.
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl std::fmt::Display for TypeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name)
    }
}

/// The consumer on whose behalf a lookup is made.
///
/// A provider declared `within::<C>()` is visible to a consumer when the
/// consumer is `C` itself or implements the interface `C`.
#[derive(Clone, Debug)]
pub struct Context {
    key: TypeKey,
    name: &'static str,
    implements: Vec<TypeKey>,
}

impl Context {
    /// Context for consumers of type `T`.
    pub fn of<T: Injectable>() -> Self {
        Self::from_descriptor(&Descriptor::<T>::of())
    }

    pub(crate) fn from_descriptor<T: Injectable>(descriptor: &Descriptor<T>) -> Self {
        Self {
            key: TypeKey::handle::<T>(),
            name: std::any::type_name::<T>(),
            implements: descriptor.interfaces(),
        }
    }

    /// Name of the consumer type.
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Whether a provider declared with context `declared` is visible here.
    pub fn accepts(&self, declared: TypeKey) -> bool {
        self.key == declared || self.implements.contains(&declared)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{Decorator, InterfaceA, ServiceInterface, ServiceValueImpl};

    #[test]
    fn test_key_identity() {
        assert_eq!(TypeKey::of::<u32>(), TypeKey::of::<u32>());
        assert_ne!(TypeKey::of::<u32>(), TypeKey::of::<i32>());
        assert_eq!(TypeKey::of::<String>().name(), "alloc::string::String");
    }

    #[test]
    fn test_context_accepts_own_type() {
        let ctx = Context::of::<Decorator>();
        assert!(ctx.accepts(TypeKey::handle::<Decorator>()));
        assert!(!ctx.accepts(TypeKey::handle::<ServiceValueImpl>()));
        assert!(!ctx.accepts(TypeKey::of::<Decorator>()));
    }

    #[test]
    fn test_context_accepts_implemented_interface() {
        let ctx = Context::of::<ServiceValueImpl>();
        assert!(ctx.accepts(TypeKey::handle::<dyn ServiceInterface>()));
        assert!(!ctx.accepts(TypeKey::handle::<dyn InterfaceA>()));
    }
}
