//! Injection metadata
//!
//! An [`Injectable`] type declares, once, which of its fields the graph may
//! populate and which interfaces its handle can be viewed as. The graph
//! never inspects a type beyond what its [`Descriptor`] lists.
//!
//! # Example
//!
//! ```rust
//! use inject_graph::{Descriptor, Injectable, Shared};
//!
//! trait Clock: Send + Sync {
//!     fn now(&self) -> u64;
//! }
//!
//! #[derive(Clone, Default)]
//! struct SystemClock;
//!
//! impl Clock for SystemClock {
//!     fn now(&self) -> u64 { 0 }
//! }
//!
//! impl Injectable for SystemClock {
//!     fn describe(d: &mut Descriptor<Self>) {
//!         d.implements::<dyn Clock>(|s| s as Shared<dyn Clock>);
//!     }
//! }
//!
//! #[derive(Clone, Default)]
//! struct Scheduler {
//!     clock: Option<Shared<dyn Clock>>,
//!     tick: Option<u64>,
//! }
//!
//! impl Injectable for Scheduler {
//!     fn describe(d: &mut Descriptor<Self>) {
//!         d.field("clock", |s| &s.clock, |s| &mut s.clock)
//!             .named_field("tick", "scheduler.tick", |s| &s.tick, |s| &mut s.tick);
//!     }
//! }
//! ```

use crate::{DiError, Result, Shared, TypeKey, Value};
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

/// A type whose instances the graph can complete.
///
/// Implement [`describe`](Injectable::describe) to list injectable fields
/// and implemented interfaces, or derive it with `#[derive(Injectable)]`
/// (feature `derive`). Types with nothing to declare use the default.
pub trait Injectable: Clone + Send + Sync + 'static {
    /// Declare injectable fields and interfaces.
    fn describe(descriptor: &mut Descriptor<Self>) {
        let _ = descriptor;
    }
}

macro_rules! impl_injectable_leaf {
    ($($ty:ty),* $(,)?) => {
        $(impl Injectable for $ty {})*
    };
}

impl_injectable_leaf!(
    bool, char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64,
    String,
);

impl<T: Clone + Send + Sync + 'static> Injectable for Vec<T> {}

impl<K, V> Injectable for HashMap<K, V>
where
    K: Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
}

/// Public description of one injectable field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldInfo {
    /// Rust field name
    pub name: &'static str,
    /// Lookup name; empty means any provider of the right type
    pub lookup: &'static str,
    /// Declared type of the field's content
    pub ty: TypeKey,
}

type IsSetFn<T> = Box<dyn Fn(&T) -> bool + Send + Sync>;
type AssignFn<T> = Box<dyn Fn(&mut T, &Value) -> Result<()> + Send + Sync>;
type CastFn<T> = Box<dyn Fn(&Shared<T>) -> Arc<dyn Any + Send + Sync> + Send + Sync>;

pub(crate) struct Field<T> {
    pub(crate) info: FieldInfo,
    is_set: IsSetFn<T>,
    assign: AssignFn<T>,
}

impl<T> Field<T> {
    #[inline]
    pub(crate) fn is_set(&self, target: &T) -> bool {
        (self.is_set)(target)
    }

    #[inline]
    pub(crate) fn assign(&self, target: &mut T, value: &Value) -> Result<()> {
        (self.assign)(target, value)
    }
}

pub(crate) struct Interface<T> {
    pub(crate) key: TypeKey,
    cast: CastFn<T>,
}

impl<T> Interface<T> {
    #[inline]
    pub(crate) fn cast(&self, handle: &Shared<T>) -> Arc<dyn Any + Send + Sync> {
        (self.cast)(handle)
    }
}

/// Injection metadata of `T`, built by [`Injectable::describe`].
pub struct Descriptor<T> {
    fields: Vec<Field<T>>,
    interfaces: Vec<Interface<T>>,
}

impl<T: Injectable> Descriptor<T> {
    /// Build the descriptor of `T`.
    pub fn of() -> Self {
        let mut descriptor = Self {
            fields: Vec::new(),
            interfaces: Vec::new(),
        };
        T::describe(&mut descriptor);
        descriptor
    }

    /// Declare an injectable field without a lookup name.
    pub fn field<X>(
        &mut self,
        name: &'static str,
        get: fn(&T) -> &Option<X>,
        get_mut: fn(&mut T) -> &mut Option<X>,
    ) -> &mut Self
    where
        X: Clone + Send + Sync + 'static,
    {
        self.named_field(name, "", get, get_mut)
    }

    /// Declare an injectable field bound to providers named `lookup`.
    pub fn named_field<X>(
        &mut self,
        name: &'static str,
        lookup: &'static str,
        get: fn(&T) -> &Option<X>,
        get_mut: fn(&mut T) -> &mut Option<X>,
    ) -> &mut Self
    where
        X: Clone + Send + Sync + 'static,
    {
        let ty = TypeKey::of::<X>();
        self.fields.push(Field {
            info: FieldInfo { name, lookup, ty },
            is_set: Box::new(move |target| get(target).is_some()),
            assign: Box::new(move |target, value| {
                let content = value
                    .downcast::<X>()
                    .ok_or_else(|| DiError::mismatch(ty, value.type_key()))?;
                *get_mut(target) = Some(content);
                Ok(())
            }),
        });
        self
    }

    /// Declare that `Shared<T>` can be viewed as `Shared<I>`.
    ///
    /// The cast is normally an unsizing coercion: `|s| s as Shared<dyn I>`.
    pub fn implements<I>(&mut self, cast: fn(Shared<T>) -> Shared<I>) -> &mut Self
    where
        I: ?Sized + Send + Sync + 'static,
    {
        self.interfaces.push(Interface {
            key: TypeKey::handle::<I>(),
            cast: Box::new(move |handle| {
                Arc::new(cast(Arc::clone(handle))) as Arc<dyn Any + Send + Sync>
            }),
        });
        self
    }

    /// The declared injectable fields, in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = &FieldInfo> {
        self.fields.iter().map(|f| &f.info)
    }

    /// Handle keys of every declared interface.
    pub fn interfaces(&self) -> Vec<TypeKey> {
        self.interfaces.iter().map(|i| i.key).collect()
    }

    pub(crate) fn field_at(&self, index: usize) -> Option<&Field<T>> {
        self.fields.get(index)
    }

    pub(crate) fn field_entries(&self) -> &[Field<T>] {
        &self.fields
    }

    pub(crate) fn interface(&self, key: TypeKey) -> Option<&Interface<T>> {
        self.interfaces.iter().find(|i| i.key == key)
    }
}

impl<T> std::fmt::Debug for Descriptor<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Descriptor")
            .field("type", &std::any::type_name::<T>())
            .field("fields", &self.fields.iter().map(|f| f.info.name).collect::<Vec<_>>())
            .field("interfaces", &self.interfaces.len())
            .finish()
    }
}
