//! The subgraph transport boundary consumed by composition and resolution.

use crate::error::ExecutionError;
use crate::selection::OperationType;
use crate::value::Value;
use apollo_compiler::validation::Valid;
use apollo_compiler::Schema;
use async_trait::async_trait;
use indexmap::IndexMap;
use std::sync::Arc;

/// A named backend GraphQL service.
///
/// The core never constructs transport; it only calls [`run`](Self::run)
/// with a fully synthesized document. Implementations own however they
/// reach the subgraph (HTTP, in-process, a test double).
#[async_trait]
pub trait SubgraphExecutor: Send + Sync {
    /// Unique within a supergraph.
    fn name(&self) -> &str;

    /// The subgraph's own schema, parsed once at registration time.
    fn schema(&self) -> &Valid<Schema>;

    /// When false, this subgraph contributes only through `extend` bindings,
    /// never directly at the supergraph root.
    fn expose_at_root(&self) -> bool {
        true
    }

    async fn run(
        &self,
        query: &str,
        operation_type: OperationType,
        variables: IndexMap<String, Value>,
    ) -> Result<Value, ExecutionError>;
}

/// A registered handle to a subgraph, as tracked by the gateway.
pub type SubgraphHandle = Arc<dyn SubgraphExecutor>;

/// Parses a subgraph's SDL once, at registration time.
///
/// Validation of *inbound request documents* stays an external collaborator,
/// but parsing a subgraph's own schema into a value the composer can walk is
/// part of composing the supergraph and happens up front, not per request.
pub fn parse_subgraph_schema(sdl: &str, name: &str) -> Result<Valid<Schema>, ExecutionError> {
    Schema::parse_and_validate(sdl, format!("{name}.graphql")).map_err(|e| {
        ExecutionError::MalformedResponse {
            subgraph: name.to_string(),
            message: e.to_string(),
        }
    })
}
