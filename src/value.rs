//! Handles and type-erased values
//!
//! Providers produce [`Value`]s. A value remembers the [`TypeKey`] it was
//! produced as and, when it holds a [`Shared`] handle to an
//! [`Injectable`] object, a completion view of that object. The view
//! survives interface casts, so a `Shared<dyn Trait>` can still be
//! completed through the concrete type behind it.

use crate::{Context, Descriptor, DiError, FieldInfo, Injectable, Result, TypeKey};
use parking_lot::RwLock;
use std::any::Any;
use std::sync::Arc;

/// Mutable, shareable handle to an object in the graph.
///
/// Fields are populated in place through the lock; identity is the
/// allocation. Interface views are `Shared<dyn Trait>`.
pub type Shared<T> = Arc<RwLock<T>>;

/// Wrap `value` in a new handle.
#[inline]
pub fn shared<T>(value: T) -> Shared<T> {
    Arc::new(RwLock::new(value))
}

/// Whether two handles point at the same object, regardless of how each is
/// typed.
#[inline]
pub fn same_handle<A: ?Sized, B: ?Sized>(a: &Shared<A>, b: &Shared<B>) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

/// Completion view of an object behind a handle.
pub(crate) trait Target: Send + Sync {
    /// Structural type of the object (`T`, not `Shared<T>`).
    fn structure(&self) -> TypeKey;

    /// Consumer context for lookups made on the object's behalf.
    fn context(&self) -> Context;

    /// Injectable fields, in declaration order.
    fn fields(&self) -> Vec<FieldInfo>;

    /// Set field `index` to `value`.
    fn assign(&self, index: usize, value: &Value) -> Result<()>;

    /// Whether every injectable field is set.
    fn is_complete(&self) -> bool;

    /// Overwrite the whole object with `value`, which must hold a `T`.
    fn replace(&self, value: &Value) -> Result<()>;

    /// Handle keys the object can be viewed as, besides its own.
    fn interfaces(&self) -> Vec<TypeKey>;

    /// The handle viewed as interface `to`.
    fn cast(&self, to: TypeKey) -> Option<Arc<dyn Any + Send + Sync>>;

    /// Address of the object, stable across views.
    fn address(&self) -> usize;
}

struct Object<T> {
    handle: Shared<T>,
    descriptor: Arc<Descriptor<T>>,
}

impl<T: Injectable> Target for Object<T> {
    fn structure(&self) -> TypeKey {
        TypeKey::of::<T>()
    }

    fn context(&self) -> Context {
        Context::from_descriptor(&self.descriptor)
    }

    fn fields(&self) -> Vec<FieldInfo> {
        self.descriptor.fields().copied().collect()
    }

    fn assign(&self, index: usize, value: &Value) -> Result<()> {
        let field = self
            .descriptor
            .field_at(index)
            .ok_or_else(|| DiError::mismatch(self.structure(), value.type_key()))?;
        let mut object = self.handle.write();
        field.assign(&mut object, value)
    }

    fn is_complete(&self) -> bool {
        let object = self.handle.read();
        self.descriptor
            .field_entries()
            .iter()
            .all(|field| field.is_set(&object))
    }

    fn replace(&self, value: &Value) -> Result<()> {
        let content = value
            .downcast::<T>()
            .ok_or_else(|| DiError::mismatch(self.structure(), value.type_key()))?;
        *self.handle.write() = content;
        Ok(())
    }

    fn interfaces(&self) -> Vec<TypeKey> {
        self.descriptor.interfaces()
    }

    fn cast(&self, to: TypeKey) -> Option<Arc<dyn Any + Send + Sync>> {
        self.descriptor
            .interface(to)
            .map(|iface| iface.cast(&self.handle))
    }

    fn address(&self) -> usize {
        Arc::as_ptr(&self.handle).cast::<()>() as usize
    }
}

/// A type-erased value produced by a provider.
#[derive(Clone)]
pub struct Value {
    ty: TypeKey,
    inner: Arc<dyn Any + Send + Sync>,
    object: Option<Arc<dyn Target>>,
}

impl Value {
    /// A plain value. It is never completed.
    pub fn new<T: Send + Sync + 'static>(value: T) -> Self {
        Self {
            ty: TypeKey::of::<T>(),
            inner: Arc::new(value),
            object: None,
        }
    }

    /// A handle to an object the graph can complete.
    pub fn object<T: Injectable>(handle: Shared<T>) -> Self {
        let object = Object {
            handle: Arc::clone(&handle),
            descriptor: Arc::new(Descriptor::of()),
        };
        Self {
            ty: TypeKey::of::<Shared<T>>(),
            inner: Arc::new(handle),
            object: Some(Arc::new(object)),
        }
    }

    /// The type this value was produced as.
    #[inline]
    pub fn type_key(&self) -> TypeKey {
        self.ty
    }

    /// Whether this value is a handle to a completable object.
    #[inline]
    pub fn is_object(&self) -> bool {
        self.object.is_some()
    }

    /// Clone the content out as `T`, if that is what this value holds.
    pub fn downcast<T: Clone + 'static>(&self) -> Option<T> {
        self.inner.downcast_ref::<T>().cloned()
    }

    /// Every type this value can be handed out as: its own type first, then
    /// the interfaces of the object behind it.
    pub fn assignable_to(&self) -> Vec<TypeKey> {
        let mut keys = vec![self.ty];
        if let Some(object) = &self.object {
            keys.extend(object.interfaces());
        }
        keys
    }

    /// This value viewed as type `to`.
    pub fn coerce(&self, to: TypeKey) -> Option<Value> {
        if self.ty == to {
            return Some(self.clone());
        }

        let object = self.object.as_ref()?;
        let inner = object.cast(to)?;
        Some(Self {
            ty: to,
            inner,
            object: Some(Arc::clone(object)),
        })
    }

    #[inline]
    pub(crate) fn target(&self) -> Option<&Arc<dyn Target>> {
        self.object.as_ref()
    }
}

impl std::fmt::Debug for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Value")
            .field("type", &self.ty.name())
            .field("object", &self.object.is_some())
            .finish()
    }
}
