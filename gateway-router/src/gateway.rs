//! The gateway's public surface: `build` composes a supergraph once,
//! `execute` resolves one request against it.

use gateway_federation::compose_subgraphs;
use gateway_federation::schema::SupergraphSchema;
use gateway_federation::selection::{Field, OperationType};
use gateway_federation::subgraph::{SubgraphExecutor, SubgraphHandle};
use gateway_federation::value::Value;
use gateway_federation::visitor::TypeVisitor;
use gateway_federation::ConfigurationError;
use indexmap::IndexMap;

use crate::fetch::{BatchResultShortfall, FetchDataSource};
use crate::introspection;
use crate::resolver;
use crate::tracing_wrapper;

/// Construction-time policy knobs. `shortfall` resolves the one open
/// question the composition model leaves to the implementation (see
/// `BatchResultShortfall`).
#[derive(Debug, Clone, Copy, Default)]
pub struct GatewayConfig {
    pub shortfall: BatchResultShortfall,
}

/// A `{data, errors}` response, GraphQL wire-format shaped.
#[derive(Debug, Clone)]
pub struct Response {
    pub data: Value,
    pub errors: Vec<String>,
}

/// The composed supergraph plus its subgraph handles. Read-only and
/// shareable across concurrent requests once built.
pub struct Gateway {
    schema: SupergraphSchema,
    subgraphs: IndexMap<String, SubgraphHandle>,
    shortfall: BatchResultShortfall,
}

impl Gateway {
    /// Composes `subgraphs` into a supergraph, applying `transformers` in
    /// order, and registers each subgraph's executor for later dispatch.
    pub fn build(
        subgraphs: Vec<SubgraphHandle>,
        transformers: Vec<Box<dyn TypeVisitor>>,
        config: GatewayConfig,
    ) -> Result<Self, ConfigurationError> {
        let schema = compose_subgraphs(&subgraphs, transformers)?;
        let subgraphs = subgraphs.into_iter().map(|s| (s.name().to_string(), s)).collect();
        Ok(Gateway {
            schema,
            subgraphs,
            shortfall: config.shortfall,
        })
    }

    /// Resolves one selection tree against the composed supergraph.
    ///
    /// `fields` must already be a parsed, schema-valid selection — parsing
    /// and validating the inbound document is the caller's responsibility.
    pub async fn execute(&self, mut fields: Vec<Field>, operation_type: OperationType) -> Response {
        if !fields.is_empty() && fields.iter().all(Field::is_introspection) {
            let data = introspection::resolve_root(&fields, &self.schema, operation_type);
            return Response { data, errors: Vec::new() };
        }

        let root_type_name = match operation_type {
            OperationType::Query => self.schema.query_type.as_deref(),
            OperationType::Mutation => self.schema.mutation_type.as_deref(),
            OperationType::Subscription => self.schema.subscription_type.as_deref(),
        };
        let Some(root_type_name) = root_type_name else {
            return Response {
                data: Value::Null,
                errors: vec![format!("no {operation_type} root registered in the supergraph")],
            };
        };

        resolver::bind_selection(&self.schema, root_type_name, &mut fields);

        let data_source = FetchDataSource::new(&self.subgraphs, self.shortfall);
        let outcome = tracing_wrapper::traced(operation_type, &fields, resolver::resolve_root(&fields, operation_type, &data_source)).await;

        match outcome {
            Ok(data) => Response { data, errors: Vec::new() },
            Err(err) => Response {
                data: Value::Null,
                errors: vec![err.to_string()],
            },
        }
    }
}
