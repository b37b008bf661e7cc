//! Error types shared by schema composition and request execution.

use thiserror::Error;

/// Failures that can occur while composing a supergraph from subgraphs.
#[derive(Debug, Clone, Error)]
pub enum ConfigurationError {
    #[error("at least one subgraph must be registered")]
    NoSubgraphs,

    #[error(
        "field `{field}` on type `{type_name}` is defined by both `{first_graph}` and `{second_graph}`"
    )]
    FieldCollision {
        type_name: String,
        field: String,
        first_graph: String,
        second_graph: String,
    },

    #[error(
        "root field `{field}` is exposed at the root by both `{first_graph}` and `{second_graph}`"
    )]
    DuplicateRootField {
        field: String,
        first_graph: String,
        second_graph: String,
    },

    #[error("type transformer rejected the schema: {message}")]
    TransformerRejected { message: String },

    #[error("{} configuration errors occurred", .0.len())]
    Multiple(Vec<ConfigurationError>),
}

/// Failures that can occur while resolving a request against a composed supergraph.
#[derive(Debug, Clone, Error)]
pub enum ExecutionError {
    #[error("Subgraph {0} not found")]
    SubgraphNotFound(String),

    #[error("expected an object value while extracting field `{field}`, found {found}")]
    ExtractorTypeMismatch { field: String, found: &'static str },

    #[error("subgraph `{subgraph}` returned a malformed response: {message}")]
    MalformedResponse { subgraph: String, message: String },

    #[error("subgraph `{subgraph}` transport error: {message}")]
    Transport { subgraph: String, message: String },

    #[error("batched entity fetch to `{subgraph}` returned fewer results than requested")]
    BatchShortfall { subgraph: String },

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Opaque pass-through for errors raised by document parsing/validation.
///
/// The core never constructs this itself; it only forwards what an external
/// collaborator handed it.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct ValidationError(pub String);
