//! # inject-graph - Object-Graph Assembly for Rust
//!
//! Register *providers* (recipes for values of particular types) with a
//! [`Graph`], then hand it *target* objects whose fields are marked for
//! injection. The graph matches each field's declared type, and optionally a
//! name and the consuming type, to exactly one provider, assigns the value and
//! keeps going breadth-first through every nested object it attaches.
//!
//! ## Features
//!
//! - **Three provider kinds** - pre-built values, builder closures whose
//!   parameters are resolved through the graph, and memoizing singletons
//! - **Interfaces** - providers are matched through `Shared<dyn Trait>` views
//!   their types declare
//! - **Names and contexts** - disambiguate by case-insensitive name, or scope
//!   a provider to the consumers of one type or interface
//! - **Guarded recursion** - builder cycles and runaway nesting fail with an
//!   error instead of overflowing the stack
//! - **Observable** - optional `tracing` events with JSON or pretty output
//!
//! ## Quick Start
//!
//! ```rust
//! use inject_graph::prelude::*;
//!
//! trait Tokens: Send + Sync {
//!     fn token(&self) -> String;
//! }
//!
//! #[derive(Clone, Default)]
//! struct StaticTokens;
//!
//! impl Tokens for StaticTokens {
//!     fn token(&self) -> String {
//!         "secret".into()
//!     }
//! }
//!
//! impl Injectable for StaticTokens {
//!     fn describe(d: &mut Descriptor<Self>) {
//!         d.implements::<dyn Tokens>(|s| s as Shared<dyn Tokens>);
//!     }
//! }
//!
//! #[derive(Clone, Default)]
//! struct Client {
//!     tokens: Option<Shared<dyn Tokens>>,
//!     url: Option<String>,
//! }
//!
//! impl Injectable for Client {
//!     fn describe(d: &mut Descriptor<Self>) {
//!         d.field("tokens", |s| &s.tokens, |s| &mut s.tokens)
//!             .named_field("url", "client.url", |s| &s.url, |s| &mut s.url);
//!     }
//! }
//!
//! let client = shared(Client::default());
//!
//! let mut graph = Graph::new();
//! graph
//!     .provide(BuilderProvider::new(|| shared(StaticTokens)).singleton())
//!     .provide(ValueProvider::new(String::from("https://example.org")).named("client.url"))
//!     .provide(ValueProvider::new(Arc::clone(&client)));
//!
//! graph.resolve().unwrap();
//!
//! let client = client.read();
//! assert_eq!(client.url.as_deref(), Some("https://example.org"));
//! assert_eq!(client.tokens.as_ref().unwrap().read().token(), "secret");
//! ```
//!
//! ## Matching
//!
//! A lookup for a type keeps the providers assignable to it; when made on
//! behalf of a consumer, it prefers providers scoped to that consumer (or an
//! interface it implements) and otherwise falls back to unscoped ones; last,
//! it keeps the providers whose name matches. Exactly one must remain.

mod descriptor;
mod error;
mod factory;
mod graph;
mod key;
#[cfg(feature = "logging")]
pub mod logging;
mod provider;
mod storage;
mod value;

#[cfg(test)]
mod fixtures;

pub use descriptor::{Descriptor, FieldInfo, Injectable};
pub use error::*;
pub use factory::*;
pub use graph::*;
pub use key::*;
pub use provider::*;
pub use value::{Shared, Value, same_handle, shared};

#[cfg(feature = "derive")]
pub use inject_graph_derive::Injectable;

// Re-export tracing macros for convenience when logging feature is enabled
#[cfg(feature = "logging")]
pub use tracing::{debug, error, info, trace, warn};

// Re-export for convenience
pub use std::sync::Arc;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        BuilderProvider, Context, Descriptor, DiError, Fresh, Graph, Injectable, Provider, Result,
        Shared, SingletonProvider, TypeKey, ValueProvider, shared,
    };
    pub use std::sync::Arc;
}
