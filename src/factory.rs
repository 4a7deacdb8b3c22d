//! Builder and singleton providers
//!
//! A [`BuilderProvider`] wraps a closure whose parameters are resolved
//! through the graph each time it is asked for a value. A
//! [`SingletonProvider`] wraps any provider and remembers the first value it
//! produced.

use crate::provider::{IntoValue, Provider, Resolver};
use crate::{DiError, Injectable, Result, Shared, TypeKey, Value, shared};
use once_cell::sync::OnceCell;
use std::sync::Arc;

#[cfg(feature = "logging")]
use tracing::{debug, trace};

// =============================================================================
// Parameters
// =============================================================================

/// A builder parameter the graph knows how to supply.
pub trait Dependency: Sized + 'static {
    /// Key of the parameter type.
    fn type_key() -> TypeKey;

    /// Produce the parameter.
    fn resolve(resolver: &dyn Resolver) -> Result<Self>;
}

/// Handles, including interface handles, are looked up without context or
/// name.
impl<T: ?Sized + Send + Sync + 'static> Dependency for Shared<T> {
    #[inline]
    fn type_key() -> TypeKey {
        TypeKey::of::<Shared<T>>()
    }

    fn resolve(resolver: &dyn Resolver) -> Result<Self> {
        let key = <Self as Dependency>::type_key();
        let value = resolver.find(key, None, "")?;
        value
            .downcast::<Shared<T>>()
            .ok_or_else(|| DiError::mismatch(key, value.type_key()))
    }
}

/// A concrete builder parameter.
///
/// A default `T` is allocated and completed through the graph, then handed
/// to the builder by value. A complete provider of `T` replaces the default
/// wholesale.
///
/// ```rust
/// use inject_graph::{BuilderProvider, Fresh, Graph, ValueProvider};
///
/// let mut graph = Graph::new();
/// graph
///     .provide(ValueProvider::new(21_i32).complete())
///     .provide(BuilderProvider::new(|n: Fresh<i32>| n.0 * 2).named("answer"));
///
/// assert_eq!(graph.get::<i32>("answer").unwrap(), 42);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Fresh<T>(pub T);

impl<T> Fresh<T> {
    /// Unwrap the completed value.
    #[inline]
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> std::ops::Deref for Fresh<T> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T: Injectable + Default> Dependency for Fresh<T> {
    #[inline]
    fn type_key() -> TypeKey {
        TypeKey::of::<T>()
    }

    fn resolve(resolver: &dyn Resolver) -> Result<Self> {
        let handle = shared(T::default());
        resolver.complete_value(&Value::object(Arc::clone(&handle)))?;
        let completed = handle.read().clone();
        Ok(Fresh(completed))
    }
}

/// A closure the graph can call with resolved parameters.
///
/// Implemented for every `Fn(A, B, ..) -> R` of up to eight
/// [`Dependency`] parameters returning an [`IntoValue`].
pub trait Factory<Args>: Send + Sync + 'static {
    /// What the closure produces.
    type Output: IntoValue;

    /// Keys of the parameters, in order.
    fn parameters() -> Vec<TypeKey>;

    /// Resolve every parameter, then call the closure once.
    fn call(&self, resolver: &dyn Resolver) -> Result<Self::Output>;
}

macro_rules! impl_factory {
    ($($arg:ident),*) => {
        impl<Func, R, $($arg,)*> Factory<($($arg,)*)> for Func
        where
            Func: Fn($($arg),*) -> R + Send + Sync + 'static,
            R: IntoValue,
            $($arg: Dependency,)*
        {
            type Output = R;

            fn parameters() -> Vec<TypeKey> {
                vec![$($arg::type_key()),*]
            }

            #[allow(non_snake_case)]
            fn call(&self, resolver: &dyn Resolver) -> Result<R> {
                let _ = resolver;
                $(let $arg = $arg::resolve(resolver)?;)*
                Ok((self)($($arg),*))
            }
        }
    };
}

impl_factory!();
impl_factory!(A);
impl_factory!(A, B);
impl_factory!(A, B, C);
impl_factory!(A, B, C, D);
impl_factory!(A, B, C, D, E);
impl_factory!(A, B, C, D, E, F);
impl_factory!(A, B, C, D, E, F, G);
impl_factory!(A, B, C, D, E, F, G, H);

// =============================================================================
// Builder Provider
// =============================================================================

type BuildFn = Box<dyn Fn(&dyn Resolver) -> Result<Value> + Send + Sync>;

/// Provider that calls a builder closure on every resolution.
///
/// Each resolution resolves the parameters anew and produces a new value;
/// wrap it in a [`SingletonProvider`] to build once.
pub struct BuilderProvider {
    key: TypeKey,
    assignable: Vec<TypeKey>,
    parameters: Vec<TypeKey>,
    name: String,
    context: Option<TypeKey>,
    build: BuildFn,
}

impl BuilderProvider {
    /// Wrap `factory`.
    pub fn new<Args: 'static, F: Factory<Args>>(factory: F) -> Self {
        let key = <F::Output as IntoValue>::type_key();
        Self {
            key,
            assignable: <F::Output as IntoValue>::assignable_to(),
            parameters: F::parameters(),
            name: String::new(),
            context: None,
            build: Box::new(move |resolver| {
                #[cfg(feature = "logging")]
                debug!(
                    target: "inject_graph",
                    service = key.name(),
                    "Invoking builder"
                );

                factory
                    .call(resolver)
                    .map(IntoValue::into_value)
                    .map_err(|e| DiError::builder_failed(key, e))
            }),
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

    /// Build at most once.
    pub fn singleton(self) -> SingletonProvider {
        SingletonProvider::new(self)
    }

    /// Keys of the builder's parameters, in order.
    #[inline]
    pub fn parameters(&self) -> &[TypeKey] {
        &self.parameters
    }
}

impl Provider for BuilderProvider {
    fn type_key(&self) -> TypeKey {
        self.key
    }

    fn assignable_to(&self) -> Vec<TypeKey> {
        self.assignable.clone()
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn context(&self) -> Option<TypeKey> {
        self.context
    }

    fn resolve(&self, resolver: &dyn Resolver) -> Result<Value> {
        (self.build)(resolver)
    }
}

impl std::fmt::Debug for BuilderProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuilderProvider")
            .field("type", &self.key.name())
            .field("parameters", &self.parameters.len())
            .field("name", &self.name)
            .finish()
    }
}

// =============================================================================
// Singleton Provider
// =============================================================================

/// Provider that resolves its inner provider once and then returns the cached
/// value.
///
/// A failed first resolution caches nothing; the next call tries again.
pub struct SingletonProvider {
    inner: Box<dyn Provider>,
    instance: OnceCell<Value>,
}

impl SingletonProvider {
    /// Memoize `inner`.
    pub fn new(inner: impl Provider + 'static) -> Self {
        Self {
            inner: Box::new(inner),
            instance: OnceCell::new(),
        }
    }

    /// Whether the value has been produced.
    #[inline]
    pub fn is_cached(&self) -> bool {
        self.instance.get().is_some()
    }
}

impl Provider for SingletonProvider {
    fn type_key(&self) -> TypeKey {
        self.inner.type_key()
    }

    fn assignable_to(&self) -> Vec<TypeKey> {
        self.inner.assignable_to()
    }

    fn name(&self) -> &str {
        self.inner.name()
    }

    fn context(&self) -> Option<TypeKey> {
        self.inner.context()
    }

    fn is_complete(&self) -> bool {
        self.is_cached()
    }

    fn resolve(&self, resolver: &dyn Resolver) -> Result<Value> {
        if let Some(value) = self.instance.get() {
            #[cfg(feature = "logging")]
            trace!(
                target: "inject_graph",
                service = self.type_key().name(),
                "Singleton already initialized, returning cached value"
            );
            return Ok(value.clone());
        }

        self.instance
            .get_or_try_init(|| {
                #[cfg(feature = "logging")]
                debug!(
                    target: "inject_graph",
                    service = self.type_key().name(),
                    "Singleton initializing on first resolution"
                );

                self.inner.resolve(resolver)
            })
            .cloned()
    }
}

impl std::fmt::Debug for SingletonProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SingletonProvider")
            .field("type", &self.type_key().name())
            .field("cached", &self.is_cached())
            .finish()
    }
}
