//! Provider capability and value providers
//!
//! A [`Provider`] is a recipe for a value of some type. The graph selects
//! providers by the types they are assignable to, their optional context
//! and their name, and asks the winner to [`resolve`](Provider::resolve).

use crate::{Context, Descriptor, Injectable, Result, Shared, TypeKey, Value};
use std::collections::HashMap;

/// The operations a provider may call back into while resolving.
///
/// [`Graph`](crate::Graph) implements this; builders only ever see it
/// through this trait.
pub trait Resolver {
    /// Select exactly one provider for `ty` and resolve it.
    fn find(&self, ty: TypeKey, context: Option<&Context>, name: &str) -> Result<Value>;

    /// Populate every injectable field reachable from `target`.
    fn complete_value(&self, target: &Value) -> Result<()>;
}

/// Something that can produce a value of a known type on demand.
pub trait Provider: Send + Sync {
    /// The type produced.
    fn type_key(&self) -> TypeKey;

    /// Every type a produced value can be handed out as.
    fn assignable_to(&self) -> Vec<TypeKey> {
        vec![self.type_key()]
    }

    /// Disambiguating name; empty when unnamed.
    fn name(&self) -> &str {
        ""
    }

    /// Handle key of the consumer type this provider is restricted to.
    fn context(&self) -> Option<TypeKey> {
        None
    }

    /// Whether consumers must not recurse into the produced value.
    fn is_complete(&self) -> bool {
        false
    }

    /// Produce the value.
    fn resolve(&self, resolver: &dyn Resolver) -> Result<Value>;

    /// This provider as a value provider, if it is one.
    fn as_value(&self) -> Option<&ValueProvider> {
        None
    }
}

/// Types that a provider can hand to the graph.
///
/// Implemented for handles to [`Injectable`] objects, which the graph can
/// complete and cast to their interfaces, and for common plain types.
pub trait IntoValue: Send + Sync + 'static {
    /// Key of the produced type.
    fn type_key() -> TypeKey
    where
        Self: Sized;

    /// Every type the produced value can be handed out as.
    fn assignable_to() -> Vec<TypeKey>
    where
        Self: Sized,
    {
        vec![Self::type_key()]
    }

    /// Erase into a [`Value`].
    fn into_value(self) -> Value;
}

impl<T: Injectable> IntoValue for Shared<T> {
    fn type_key() -> TypeKey {
        TypeKey::of::<Shared<T>>()
    }

    fn assignable_to() -> Vec<TypeKey> {
        let mut keys = vec![Self::type_key()];
        keys.extend(Descriptor::<T>::of().interfaces());
        keys
    }

    fn into_value(self) -> Value {
        Value::object(self)
    }
}

macro_rules! impl_into_value_plain {
    ($($ty:ty),* $(,)?) => {
        $(
            impl IntoValue for $ty {
                #[inline]
                fn type_key() -> TypeKey {
                    TypeKey::of::<$ty>()
                }

                #[inline]
                fn into_value(self) -> Value {
                    Value::new(self)
                }
            }
        )*
    };
}

impl_into_value_plain!(
    bool, char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64,
    String, &'static str,
);

impl<T: Clone + Send + Sync + 'static> IntoValue for Vec<T> {
    fn type_key() -> TypeKey {
        TypeKey::of::<Vec<T>>()
    }

    fn into_value(self) -> Value {
        Value::new(self)
    }
}

impl<K, V> IntoValue for HashMap<K, V>
where
    K: Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn type_key() -> TypeKey {
        TypeKey::of::<HashMap<K, V>>()
    }

    fn into_value(self) -> Value {
        Value::new(self)
    }
}

// =============================================================================
// Value Provider
// =============================================================================

/// Provider wrapping a pre-existing value.
///
/// By default the value is not complete: when it is an object, the graph
/// still injects into it during [`Graph::resolve`](crate::Graph::resolve).
///
/// # Examples
///
/// ```rust
/// use inject_graph::{Graph, ValueProvider};
///
/// let mut graph = Graph::new();
/// graph.provide(ValueProvider::new("https://www.example.org/hello").named("hello.url"));
///
/// let url: &str = graph.get("HELLO.URL").unwrap();
/// assert_eq!(url, "https://www.example.org/hello");
/// ```
#[derive(Clone, Debug)]
pub struct ValueProvider {
    value: Value,
    name: String,
    context: Option<TypeKey>,
    complete: bool,
}

impl ValueProvider {
    /// Provide `value`.
    pub fn new<T: IntoValue>(value: T) -> Self {
        Self::from_value(value.into_value())
    }

    /// Provide any plain value that has no [`IntoValue`] impl.
    pub fn plain<T: Send + Sync + 'static>(value: T) -> Self {
        Self::from_value(Value::new(value))
    }

    /// Provide an already erased value.
    pub fn from_value(value: Value) -> Self {
        Self {
            value,
            name: String::new(),
            context: None,
            complete: false,
        }
    }

    /// Only match lookups for `name` (case-insensitive).
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Prefer this provider for consumers of type (or interface) `C`.
    pub fn within<C: ?Sized + 'static>(mut self) -> Self {
        self.context = Some(TypeKey::handle::<C>());
        self
    }

    /// Mark the value as complete: it substitutes matching targets whole and
    /// is never injected into.
    pub fn complete(mut self) -> Self {
        self.complete = true;
        self
    }

    /// The wrapped value.
    #[inline]
    pub fn value(&self) -> &Value {
        &self.value
    }
}

impl Provider for ValueProvider {
    fn type_key(&self) -> TypeKey {
        self.value.type_key()
    }

    fn assignable_to(&self) -> Vec<TypeKey> {
        self.value.assignable_to()
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn context(&self) -> Option<TypeKey> {
        self.context
    }

    fn is_complete(&self) -> bool {
        self.complete
    }

    fn resolve(&self, _resolver: &dyn Resolver) -> Result<Value> {
        Ok(self.value.clone())
    }

    fn as_value(&self) -> Option<&ValueProvider> {
        Some(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{Decorated, Decorator, InterfaceA, NullResolver, StructA};
    use crate::shared;
    use std::sync::Arc;

    #[test]
    fn test_resolves_to_declared_type() {
        let p = ValueProvider::new(7_u64);
        assert_eq!(p.type_key(), TypeKey::of::<u64>());

        let v = p.resolve(&NullResolver).unwrap();
        assert_eq!(v.downcast::<u64>(), Some(7));
    }

    #[test]
    fn test_resolves_to_same_object() {
        let p = ValueProvider::new(shared(StructA::default()));

        let r1 = p.resolve(&NullResolver).unwrap();
        let r2 = p.resolve(&NullResolver).unwrap();

        let h1 = r1.downcast::<Shared<StructA>>().unwrap();
        let h2 = r2.downcast::<Shared<StructA>>().unwrap();
        assert!(Arc::ptr_eq(&h1, &h2));
    }

    #[test]
    fn test_defaults() {
        let p = ValueProvider::new(1_i32);
        assert_eq!(p.name(), "");
        assert_eq!(p.context(), None);
        assert!(!p.is_complete());
        assert!(p.as_value().is_some());
    }

    #[test]
    fn test_modifiers() {
        let p = ValueProvider::new(shared(Decorated))
            .named("primary")
            .within::<Decorator>()
            .complete();

        assert_eq!(p.name(), "primary");
        assert_eq!(p.context(), Some(TypeKey::handle::<Decorator>()));
        assert!(p.is_complete());
        assert!(p
            .assignable_to()
            .contains(&TypeKey::handle::<dyn InterfaceA>()));
    }

    #[test]
    fn test_plain_values_are_not_objects() {
        let p = ValueProvider::plain(std::time::Duration::from_secs(1));
        assert!(!p.value().is_object());
    }
}
