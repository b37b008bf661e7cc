//! Deduplicates and batches fetch requests against subgraph executors.
//!
//! One [`dataloader::cached::Loader`] is kept per subgraph for the lifetime
//! of a single request's execution. Equal [`FetchRequest`]s enqueued within
//! the same batch window share one promise; [`GatewayBatchFn::load`] is
//! where mutation-sequential dispatch, entity-batch coalescing, and generic
//! alias-demultiplexed batching are decided.

use async_trait::async_trait;
use dataloader::cached::Loader as CachedLoader;
use dataloader::BatchFn;
use gateway_federation::error::ExecutionError;
use gateway_federation::selection::{Field, OperationType};
use gateway_federation::subgraph::SubgraphExecutor;
use gateway_federation::subgraph::SubgraphHandle;
use gateway_federation::synthesize::{render_document, render_fields, render_value};
use gateway_federation::value::Value;
use indexmap::IndexMap;
use std::collections::HashMap;
use std::collections::HashSet;
use std::hash::Hash;
use std::hash::Hasher;

/// The resolved value of a fetch, or the error that aborted it.
pub type FetchOutcome = Result<Value, ExecutionError>;

/// What happens when a coalesced entity-batch call returns fewer results
/// than the number of distinct argument values requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BatchResultShortfall {
    /// Unmatched parents resolve to null; no error raised.
    #[default]
    Null,
    /// Raises [`ExecutionError::BatchShortfall`].
    Fail,
}

/// A deduplication/batching key for one pending subgraph call.
///
/// Equality is structural over all fields; two keys differing only in
/// argument ordering within a mapping are equal, since `IndexMap`'s own
/// `PartialEq` already ignores insertion order for `arguments`, and
/// `selection`/`arguments` are additionally compared through their
/// canonical rendered form so alias or traversal-order differences never
/// cause spurious cache misses.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub subgraph: String,
    pub source_field_name: String,
    pub operation_type: OperationType,
    pub selection: Vec<Field>,
    pub arguments: IndexMap<String, Value>,
    pub batch_enabled: bool,
}

impl FetchRequest {
    fn canonical_selection(&self) -> String {
        render_fields(&self.selection)
    }

    fn canonical_arguments(&self) -> String {
        let mut names: Vec<&String> = self.arguments.keys().collect();
        names.sort();
        names
            .into_iter()
            .map(|name| format!("{name}:{}", render_value(&self.arguments[name])))
            .collect::<Vec<_>>()
            .join(",")
    }

    fn to_field(&self) -> Field {
        Field::leaf(self.source_field_name.clone())
            .with_arguments(self.arguments.clone())
            .with_fields(self.selection.clone())
    }
}

impl PartialEq for FetchRequest {
    fn eq(&self, other: &Self) -> bool {
        self.subgraph == other.subgraph
            && self.source_field_name == other.source_field_name
            && self.operation_type == other.operation_type
            && self.batch_enabled == other.batch_enabled
            && self.canonical_selection() == other.canonical_selection()
            && self.canonical_arguments() == other.canonical_arguments()
    }
}

impl Eq for FetchRequest {}

impl Hash for FetchRequest {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.subgraph.hash(state);
        self.source_field_name.hash(state);
        self.operation_type.hash(state);
        self.batch_enabled.hash(state);
        self.canonical_selection().hash(state);
        self.canonical_arguments().hash(state);
    }
}

struct GatewayBatchFn {
    subgraph: SubgraphHandle,
    shortfall: BatchResultShortfall,
}

impl GatewayBatchFn {
    async fn dispatch_one(&self, request: &FetchRequest) -> FetchOutcome {
        let alias = "f0".to_string();
        let document = render_document(request.operation_type, &[(alias.clone(), request.to_field())]);
        let response = self
            .subgraph
            .run(&document, request.operation_type, IndexMap::new())
            .await?;
        response.get(&alias).cloned().ok_or_else(|| ExecutionError::MalformedResponse {
            subgraph: request.subgraph.clone(),
            message: format!("missing alias `{alias}` in response"),
        })
    }

    async fn dispatch_batch(&self, requests: &[FetchRequest]) -> HashMap<FetchRequest, FetchOutcome> {
        let aliased: Vec<(String, Field)> = requests
            .iter()
            .enumerate()
            .map(|(i, request)| (format!("f{i}"), request.to_field()))
            .collect();
        let operation_type = requests[0].operation_type;
        let document = render_document(operation_type, &aliased);

        let mut results = HashMap::new();
        match self.subgraph.run(&document, operation_type, IndexMap::new()).await {
            Ok(response) => {
                for (i, request) in requests.iter().enumerate() {
                    let alias = format!("f{i}");
                    let outcome = response.get(&alias).cloned().ok_or_else(|| ExecutionError::MalformedResponse {
                        subgraph: request.subgraph.clone(),
                        message: format!("missing alias `{alias}` in response"),
                    });
                    results.insert(request.clone(), outcome);
                }
            }
            Err(err) => {
                for request in requests {
                    results.insert(request.clone(), Err(err.clone()));
                }
            }
        }
        results
    }

    /// Groups batch-enabled requests that differ only in a single
    /// scalar/object argument and issues one list-argument call per group,
    /// returning the same full list result to every member.
    async fn coalesce(&self, requests: Vec<FetchRequest>) -> (HashMap<FetchRequest, FetchOutcome>, Vec<FetchRequest>) {
        let mut buckets: IndexMap<String, Vec<FetchRequest>> = IndexMap::new();
        let mut leftover = Vec::new();

        for request in requests {
            if !request.batch_enabled {
                leftover.push(request);
                continue;
            }
            let mut names: Vec<&String> = request.arguments.keys().collect();
            names.sort();
            let signature = format!(
                "{}\u{1}{}\u{1}{}\u{1}{}",
                request.subgraph,
                request.source_field_name,
                request.canonical_selection(),
                names.into_iter().cloned().collect::<Vec<_>>().join(","),
            );
            buckets.entry(signature).or_default().push(request);
        }

        let mut out = HashMap::new();
        for (_, group) in buckets {
            if group.len() < 2 {
                leftover.extend(group);
                continue;
            }
            match self.try_coalesce_group(&group).await {
                Some(outcome) => {
                    for request in &group {
                        out.insert(request.clone(), outcome.clone());
                    }
                }
                None => leftover.extend(group),
            }
        }
        (out, leftover)
    }

    /// Returns `None` when the group does not fit the single-varying-argument
    /// shape, in which case the caller falls back to generic batching.
    async fn try_coalesce_group(&self, group: &[FetchRequest]) -> Option<FetchOutcome> {
        let first = &group[0];
        let mut varying: Option<String> = None;
        for name in first.arguments.keys() {
            let values: Vec<&Value> = group.iter().map(|r| r.arguments.get(name).unwrap_or(&Value::Null)).collect();
            let distinct: HashSet<String> = values.iter().map(|v| render_value(v)).collect();
            if distinct.len() > 1 {
                // Only a scalar- or object-valued argument can be collected
                // into a list for an entity-style batch call; a list-valued
                // argument would need a list-of-lists, which no subgraph
                // accepts, so fall back to generic batching instead.
                if varying.is_some() || !values.iter().all(|v| matches!(v, Value::Scalar(..) | Value::Object(..))) {
                    return None;
                }
                varying = Some(name.clone());
            }
        }
        let varying = varying?;

        let mut values = Vec::new();
        let mut seen = HashSet::new();
        for request in group {
            let value = request.arguments.get(&varying).cloned().unwrap_or(Value::Null);
            if seen.insert(render_value(&value)) {
                values.push(value);
            }
        }

        let mut combined_arguments = first.arguments.clone();
        combined_arguments.insert(varying, Value::List(values.clone()));

        let combined = FetchRequest {
            subgraph: first.subgraph.clone(),
            source_field_name: first.source_field_name.clone(),
            operation_type: first.operation_type,
            selection: first.selection.clone(),
            arguments: combined_arguments,
            batch_enabled: first.batch_enabled,
        };

        let outcome = self.dispatch_one(&combined).await;

        if self.shortfall == BatchResultShortfall::Fail {
            if let Ok(Value::List(items)) = &outcome {
                if items.len() < values.len() {
                    return Some(Err(ExecutionError::BatchShortfall {
                        subgraph: first.subgraph.clone(),
                    }));
                }
            }
        }

        Some(outcome)
    }
}

#[async_trait]
impl BatchFn<FetchRequest, FetchOutcome> for GatewayBatchFn {
    async fn load(&mut self, keys: &[FetchRequest]) -> HashMap<FetchRequest, FetchOutcome> {
        let mut results = HashMap::new();

        let (mutations, rest): (Vec<FetchRequest>, Vec<FetchRequest>) =
            keys.iter().cloned().partition(|key| key.operation_type == OperationType::Mutation);

        for request in &mutations {
            let outcome = self.dispatch_one(request).await;
            results.insert(request.clone(), outcome);
        }

        let (coalesced, leftover) = self.coalesce(rest).await;
        results.extend(coalesced);

        if !leftover.is_empty() {
            results.extend(self.dispatch_batch(&leftover).await);
        }

        results
    }
}

/// Per-request fetch coordinator: one loader per subgraph, torn down at the
/// end of the request's execution.
pub struct FetchDataSource {
    loaders: HashMap<String, CachedLoader<FetchRequest, FetchOutcome, GatewayBatchFn>>,
}

impl FetchDataSource {
    pub fn new(subgraphs: &IndexMap<String, SubgraphHandle>, shortfall: BatchResultShortfall) -> Self {
        let loaders = subgraphs
            .iter()
            .map(|(name, handle)| {
                let batch_fn = GatewayBatchFn {
                    subgraph: handle.clone(),
                    shortfall,
                };
                (name.clone(), CachedLoader::new(batch_fn).with_yield_count(100))
            })
            .collect();
        FetchDataSource { loaders }
    }

    /// Enqueues a fetch request, returning its resolved value once the
    /// owning batch window dispatches.
    pub async fn enqueue(&self, request: FetchRequest) -> FetchOutcome {
        let Some(loader) = self.loaders.get(&request.subgraph) else {
            return Err(ExecutionError::SubgraphNotFound(request.subgraph.clone()));
        };
        loader.load(request).await
    }
}
