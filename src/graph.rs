//! The object graph
//!
//! A [`Graph`] holds providers and uses them to populate the injectable
//! fields of target objects. Completion walks breadth-first from the target
//! through every nested object it attaches until the reachable structure is
//! populated or a lookup fails.

use crate::provider::{Provider, Resolver};
use crate::storage::ProviderStorage;
use crate::value::Target;
use crate::{Context, DiError, Injectable, Result, Shared, TypeKey, Value};
use ahash::RandomState;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use std::thread::ThreadId;

#[cfg(feature = "logging")]
use tracing::{debug, trace};

/// Default limit on nested provider resolutions.
pub const DEFAULT_MAX_DEPTH: usize = 64;

// =============================================================================
// Configuration
// =============================================================================

/// Configures a [`Graph`] before it is created.
///
/// # Examples
///
/// ```rust
/// use inject_graph::Graph;
///
/// let graph = Graph::builder().capacity(16).max_depth(8).build();
/// assert_eq!(graph.max_depth(), 8);
/// ```
#[derive(Clone, Debug)]
pub struct GraphBuilder {
    capacity: usize,
    max_depth: usize,
}

impl GraphBuilder {
    /// Pre-allocate room for `capacity` providers.
    #[inline]
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Fail with [`DiError::DepthExceeded`] past `max_depth` nested
    /// resolutions. Values below 1 are raised to 1 so that a lookup
    /// always reaches its own provider.
    #[inline]
    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth.max(1);
        self
    }

    /// Create the graph.
    pub fn build(self) -> Graph {
        #[cfg(feature = "logging")]
        debug!(
            target: "inject_graph",
            capacity = self.capacity,
            max_depth = self.max_depth,
            "Creating new object graph"
        );

        Graph {
            storage: ProviderStorage::with_capacity(self.capacity),
            in_flight: Mutex::new(HashMap::default()),
            max_depth: self.max_depth,
        }
    }
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self {
            capacity: 0,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

// =============================================================================
// Graph
// =============================================================================

/// Registry of providers and the engine that completes objects from them.
///
/// A built graph can be shared across threads for lookups and completion.
/// Cycle detection tracks each thread's resolutions separately.
///
/// # Examples
///
/// ```rust
/// use inject_graph::{shared, Descriptor, Graph, Injectable, ValueProvider};
///
/// #[derive(Clone, Default)]
/// struct Endpoint {
///     url: Option<String>,
/// }
///
/// impl Injectable for Endpoint {
///     fn describe(d: &mut Descriptor<Self>) {
///         d.named_field("url", "url", |s| &s.url, |s| &mut s.url);
///     }
/// }
///
/// let mut graph = Graph::new();
/// graph.provide(ValueProvider::new(String::from("https://example.org")).named("url"));
///
/// let endpoint = shared(Endpoint::default());
/// graph.complete(&endpoint).unwrap();
/// assert_eq!(endpoint.read().url.as_deref(), Some("https://example.org"));
/// ```
pub struct Graph {
    storage: ProviderStorage,
    /// Per thread, positions of providers currently being resolved,
    /// outermost first
    in_flight: Mutex<InFlightStacks>,
    max_depth: usize,
}

type InFlightStacks = HashMap<ThreadId, Vec<usize>, RandomState>;

/// Pops the calling thread's in-flight stack when a resolution ends,
/// successful or not.
struct InFlight<'a> {
    stacks: &'a Mutex<InFlightStacks>,
    thread: ThreadId,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        let mut stacks = self.stacks.lock();
        if let Some(stack) = stacks.get_mut(&self.thread) {
            stack.pop();
            if stack.is_empty() {
                stacks.remove(&self.thread);
            }
        }
    }
}

impl Graph {
    /// Create an empty graph.
    #[inline]
    pub fn new() -> Self {
        GraphBuilder::default().build()
    }

    /// Create a graph with room for `capacity` providers.
    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        GraphBuilder::default().capacity(capacity).build()
    }

    /// Configure a graph.
    #[inline]
    pub fn builder() -> GraphBuilder {
        GraphBuilder::default()
    }

    // =========================================================================
    // Registration
    // =========================================================================

    /// Register a provider after every existing one.
    ///
    /// Nothing is validated or deduplicated here; ambiguities surface at
    /// lookup time.
    pub fn provide(&mut self, provider: impl Provider + 'static) -> &mut Self {
        self.provide_boxed(Box::new(provider))
    }

    /// Register several providers, preserving their order.
    pub fn provide_all<I>(&mut self, providers: I) -> &mut Self
    where
        I: IntoIterator<Item = Box<dyn Provider>>,
    {
        for provider in providers {
            self.provide_boxed(provider);
        }
        self
    }

    fn provide_boxed(&mut self, provider: Box<dyn Provider>) -> &mut Self {
        #[cfg(feature = "logging")]
        debug!(
            target: "inject_graph",
            service = provider.type_key().name(),
            name = provider.name(),
            context = provider.context().map(|c| c.name()),
            complete = provider.is_complete(),
            provider_count = self.storage.len() + 1,
            "Registering provider"
        );

        self.storage.insert(provider);
        self
    }

    /// Number of registered providers.
    #[inline]
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    /// Whether no provider is registered.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.storage.len() == 0
    }

    /// Limit on nested resolutions.
    #[inline]
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    // =========================================================================
    // Lookup
    // =========================================================================

    /// Select exactly one provider for `ty` and resolve it.
    ///
    /// Candidates are narrowed three times: providers assignable to `ty`;
    /// then, given a `context`, providers scoped to that consumer, falling
    /// back to unscoped providers when none is; then providers whose name
    /// equals `name` ignoring case. The survivor's value is returned viewed
    /// as `ty`.
    pub fn find(&self, ty: TypeKey, context: Option<&Context>, name: &str) -> Result<Value> {
        #[cfg(feature = "logging")]
        trace!(
            target: "inject_graph",
            service = ty.name(),
            context = context.map(Context::name),
            name = name,
            "Looking up provider"
        );

        let position = self.select(ty, context, name)?;
        let value = self.resolve_at(position, ty)?;
        value
            .coerce(ty)
            .ok_or_else(|| DiError::mismatch(ty, value.type_key()))
    }

    /// Typed lookup without context.
    ///
    /// Handles are requested by their handle type, e.g.
    /// `graph.get::<Shared<dyn Clock>>("")`.
    pub fn get<T: Clone + Send + Sync + 'static>(&self, name: &str) -> Result<T> {
        let key = TypeKey::of::<T>();
        let value = self.find(key, None, name)?;
        value
            .downcast::<T>()
            .ok_or_else(|| DiError::mismatch(key, value.type_key()))
    }

    fn select(&self, ty: TypeKey, context: Option<&Context>, name: &str) -> Result<usize> {
        let by_type = self.storage.assignable_to(ty);

        let by_context = match context {
            None => by_type.to_vec(),
            Some(ctx) => {
                let mut scoped = Vec::new();
                let mut open = Vec::new();
                for &position in by_type {
                    match self.storage.get(position).and_then(|p| p.context()) {
                        None => open.push(position),
                        Some(declared) if ctx.accepts(declared) => scoped.push(position),
                        Some(_) => {}
                    }
                }
                if scoped.is_empty() { open } else { scoped }
            }
        };

        let survivors: Vec<usize> = by_context
            .into_iter()
            .filter(|&position| {
                self.storage
                    .get(position)
                    .is_some_and(|p| names_match(p.name(), name))
            })
            .collect();

        match survivors.as_slice() {
            [position] => Ok(*position),
            [] => Err(DiError::no_provider(ty)),
            _ => Err(DiError::Ambiguous {
                type_name: ty.name(),
                context: context.map_or("<none>", Context::name),
                name: name.to_owned(),
            }),
        }
    }

    /// Resolve the provider at `position` under the recursion guard.
    fn resolve_at(&self, position: usize, ty: TypeKey) -> Result<Value> {
        let provider = self
            .storage
            .get(position)
            .ok_or_else(|| DiError::no_provider(ty))?;
        let _guard = self.enter(position, provider.type_key())?;
        provider.resolve(self)
    }

    fn enter(&self, position: usize, ty: TypeKey) -> Result<InFlight<'_>> {
        let thread = std::thread::current().id();
        let mut stacks = self.in_flight.lock();
        let depth = stacks.get(&thread).map_or(0, Vec::len);
        let reentered = stacks
            .get(&thread)
            .is_some_and(|stack| stack.contains(&position));

        if reentered {
            #[cfg(feature = "logging")]
            debug!(
                target: "inject_graph",
                service = ty.name(),
                depth = depth,
                "Provider re-entered while resolving"
            );
            return Err(DiError::circular(ty));
        }
        if depth >= self.max_depth {
            return Err(DiError::DepthExceeded {
                type_name: ty.name(),
                limit: self.max_depth,
            });
        }
        stacks.entry(thread).or_default().push(position);
        Ok(InFlight {
            stacks: &self.in_flight,
            thread,
        })
    }

    // =========================================================================
    // Completion
    // =========================================================================

    /// Populate every injectable field reachable from `target`.
    ///
    /// On failure, fields populated so far stay populated.
    pub fn complete<T: Injectable>(&self, target: &Shared<T>) -> Result<()> {
        self.complete_value(&Value::object(Arc::clone(target)))
    }

    /// [`complete`](Graph::complete) for an erased value.
    ///
    /// Fails with [`DiError::InvalidTarget`] without touching anything when
    /// `target` is not an object handle.
    pub fn complete_value(&self, target: &Value) -> Result<()> {
        let Some(root) = target.target() else {
            return Err(DiError::invalid_target(target.type_key()));
        };

        #[cfg(feature = "logging")]
        debug!(
            target: "inject_graph",
            service = root.structure().name(),
            "Completing target"
        );

        let mut queue: VecDeque<Arc<dyn Target>> = VecDeque::from([Arc::clone(root)]);
        let mut visited: HashSet<usize, RandomState> = HashSet::default();

        while let Some(item) = queue.pop_front() {
            if !visited.insert(item.address()) {
                continue;
            }

            if let Some(replacement) = self.substitute(item.structure())? {
                item.replace(&replacement)?;
                continue;
            }

            let context = item.context();
            let mut attached = Vec::new();
            for (index, field) in item.fields().into_iter().enumerate() {
                let value = self
                    .find(field.ty, Some(&context), field.lookup)
                    .map_err(|e| DiError::field(field.name, field.ty, e))?;
                item.assign(index, &value)?;
                attached.push(value);
            }

            for value in attached {
                if let Some(nested) = value.target() {
                    if !nested.is_complete() {
                        queue.push_back(Arc::clone(nested));
                    }
                }
            }
        }

        Ok(())
    }

    /// Value of the first complete provider of `structure`, if any.
    fn substitute(&self, structure: TypeKey) -> Result<Option<Value>> {
        let position = self
            .storage
            .assignable_to(structure)
            .iter()
            .copied()
            .find(|&position| self.storage.get(position).is_some_and(|p| p.is_complete()));

        let Some(position) = position else {
            return Ok(None);
        };

        #[cfg(feature = "logging")]
        debug!(
            target: "inject_graph",
            service = structure.name(),
            "Substituting complete provider for target"
        );

        self.resolve_at(position, structure).map(Some)
    }

    // =========================================================================
    // Resolution
    // =========================================================================

    /// Complete every registered [`ValueProvider`](crate::ValueProvider)
    /// holding an object that is not flagged complete.
    ///
    /// Returns the first failure; see [`resolve_all`](Graph::resolve_all).
    pub fn resolve(&self) -> Result<()> {
        match self.resolve_all().into_iter().next() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Like [`resolve`](Graph::resolve), but returns every failure.
    pub fn resolve_all(&self) -> Vec<DiError> {
        #[cfg(feature = "logging")]
        debug!(
            target: "inject_graph",
            provider_count = self.storage.len(),
            "Resolving graph"
        );

        let errors: Vec<DiError> = self
            .storage
            .iter()
            .filter_map(|provider| provider.as_value())
            .filter(|provider| !provider.is_complete() && provider.value().is_object())
            .filter_map(|provider| {
                self.complete_value(provider.value())
                    .err()
                    .map(|e| DiError::root(provider.type_key(), e))
            })
            .collect();

        #[cfg(feature = "logging")]
        if !errors.is_empty() {
            debug!(
                target: "inject_graph",
                error_count = errors.len(),
                "Graph resolution failed"
            );
        }

        errors
    }
}

impl Resolver for Graph {
    fn find(&self, ty: TypeKey, context: Option<&Context>, name: &str) -> Result<Value> {
        Graph::find(self, ty, context, name)
    }

    fn complete_value(&self, target: &Value) -> Result<()> {
        Graph::complete_value(self, target)
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Graph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Graph")
            .field("storage", &self.storage)
            .field("max_depth", &self.max_depth)
            .finish()
    }
}

/// Case-insensitive name comparison.
fn names_match(a: &str, b: &str) -> bool {
    a.chars()
        .flat_map(char::to_lowercase)
        .eq(b.chars().flat_map(char::to_lowercase))
}
