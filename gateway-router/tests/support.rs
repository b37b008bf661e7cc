use apollo_compiler::validation::Valid;
use apollo_compiler::Schema;
use async_trait::async_trait;
use gateway_federation::error::ExecutionError;
use gateway_federation::selection::OperationType;
use gateway_federation::subgraph::SubgraphExecutor;
use gateway_federation::value::Value;
use indexmap::IndexMap;
use std::sync::Arc;

/// A subgraph test double whose response is computed from the rendered
/// query text, so one mock can answer several distinct fetches.
pub struct MockSubgraph {
    name: String,
    schema: Valid<Schema>,
    handler: Box<dyn Fn(&str) -> Value + Send + Sync>,
}

impl MockSubgraph {
    pub fn new(name: &str, sdl: &str, handler: impl Fn(&str) -> Value + Send + Sync + 'static) -> Arc<Self> {
        let schema = Schema::parse_and_validate(sdl, format!("{name}.graphql")).expect("valid subgraph sdl");
        Arc::new(MockSubgraph {
            name: name.to_string(),
            schema,
            handler: Box::new(handler),
        })
    }
}

#[async_trait]
impl SubgraphExecutor for MockSubgraph {
    fn name(&self) -> &str {
        &self.name
    }

    fn schema(&self) -> &Valid<Schema> {
        &self.schema
    }

    async fn run(&self, query: &str, _operation_type: OperationType, _variables: IndexMap<String, Value>) -> Result<Value, ExecutionError> {
        Ok((self.handler)(query))
    }
}

/// Installs a fmt subscriber so `RUST_LOG=gateway_router=trace cargo test --
/// --nocapture` shows the spans opened by `tracing_wrapper::traced`. Safe to
/// call from every test; only the first call wins.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

pub fn object(pairs: Vec<(&str, Value)>) -> Value {
    let mut fields = IndexMap::new();
    for (key, value) in pairs {
        fields.insert(key.to_string(), value);
    }
    Value::Object(fields)
}
