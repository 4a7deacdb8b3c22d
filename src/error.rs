//! Error types for graph assembly

use crate::TypeKey;
use thiserror::Error;

/// Errors that can occur while completing or querying a [`Graph`](crate::Graph)
#[derive(Error, Debug, Clone)]
pub enum DiError {
    /// `complete` was handed a value that is not an object handle
    #[error("Tried to complete a non-handle value ({type_name})")]
    InvalidTarget { type_name: &'static str },

    /// No provider survived type, context and name selection
    #[error("Could not find provider for {type_name}")]
    NoProvider { type_name: &'static str },

    /// More than one provider survived type, context and name selection
    #[error("Found multiple providers for type: {type_name}, context: {context}, name: {name}")]
    Ambiguous {
        type_name: &'static str,
        context: &'static str,
        name: String,
    },

    /// An injectable field could not be populated
    #[error("Encountered error attempting to set a field ({field}) of type {type_name}: {source}")]
    Field {
        field: &'static str,
        type_name: &'static str,
        #[source]
        source: Box<DiError>,
    },

    /// A builder failed to resolve one of its parameters
    #[error("Builder for {type_name} could not resolve its parameters: {source}")]
    BuilderFailed {
        type_name: &'static str,
        #[source]
        source: Box<DiError>,
    },

    /// Completing a root value provider failed during `Graph::resolve`
    #[error("Encountered error while trying to complete ({type_name}): {source}")]
    Root {
        type_name: &'static str,
        #[source]
        source: Box<DiError>,
    },

    /// A provider was re-entered while it was still being resolved
    #[error("Dependency cycle detected while resolving: {type_name}")]
    CircularDependency { type_name: &'static str },

    /// Nested resolution went deeper than the configured limit
    #[error("Resolution depth limit ({limit}) exceeded while resolving: {type_name}")]
    DepthExceeded { type_name: &'static str, limit: usize },

    /// A value did not hold the type it was registered as
    #[error("Expected a value of type {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },
}

impl DiError {
    /// Create a NoProvider error for a type
    #[inline]
    pub fn no_provider(ty: TypeKey) -> Self {
        Self::NoProvider {
            type_name: ty.name(),
        }
    }

    /// Create an InvalidTarget error for a type
    #[inline]
    pub fn invalid_target(ty: TypeKey) -> Self {
        Self::InvalidTarget {
            type_name: ty.name(),
        }
    }

    /// Wrap a failure to populate `field`
    #[inline]
    pub fn field(field: &'static str, ty: TypeKey, source: DiError) -> Self {
        Self::Field {
            field,
            type_name: ty.name(),
            source: Box::new(source),
        }
    }

    /// Wrap a builder parameter failure
    #[inline]
    pub fn builder_failed(ty: TypeKey, source: DiError) -> Self {
        Self::BuilderFailed {
            type_name: ty.name(),
            source: Box::new(source),
        }
    }

    /// Wrap a failure to complete a root value provider
    #[inline]
    pub fn root(ty: TypeKey, source: DiError) -> Self {
        Self::Root {
            type_name: ty.name(),
            source: Box::new(source),
        }
    }

    /// Create a CircularDependency error
    #[inline]
    pub fn circular(ty: TypeKey) -> Self {
        Self::CircularDependency {
            type_name: ty.name(),
        }
    }

    /// Create a TypeMismatch error
    #[inline]
    pub fn mismatch(expected: TypeKey, found: TypeKey) -> Self {
        Self::TypeMismatch {
            expected: expected.name(),
            found: found.name(),
        }
    }

    /// The innermost error of a wrapped chain.
    pub fn root_cause(&self) -> &DiError {
        let mut current = self;
        loop {
            match current {
                Self::Field { source, .. }
                | Self::BuilderFailed { source, .. }
                | Self::Root { source, .. } => current = source,
                _ => return current,
            }
        }
    }
}

/// Result type alias for graph operations
pub type Result<T> = std::result::Result<T, DiError>;

#[cfg(test)]
mod tests {
    use super::*;

    struct Missing;

    #[test]
    fn test_nested_message_keeps_path() {
        let ty = TypeKey::of::<Missing>();
        let err = DiError::root(
            ty,
            DiError::field("b", ty, DiError::no_provider(ty)),
        );

        let name = std::any::type_name::<Missing>();
        assert_eq!(
            err.to_string(),
            format!(
                "Encountered error while trying to complete ({name}): \
                 Encountered error attempting to set a field (b) of type {name}: \
                 Could not find provider for {name}"
            )
        );
    }

    #[test]
    fn test_root_cause() {
        let ty = TypeKey::of::<Missing>();
        let err = DiError::field("x", ty, DiError::builder_failed(ty, DiError::circular(ty)));

        assert!(matches!(
            err.root_cause(),
            DiError::CircularDependency { .. }
        ));
    }
}
