//! Declarative bindings from a supergraph field to a subgraph field.

use crate::value::Value;
use std::fmt;
use std::sync::Arc;

/// Given the parent object's value at a mapping key, produces the argument
/// name/value pair to send to the subgraph. Returning `None` drops the
/// argument from the dispatched call (used when the source value is null).
pub type ArgumentMapper = Arc<dyn Fn(&Value) -> Option<(String, Value)> + Send + Sync>;

/// Re-associates one batched candidate result with its parent.
pub type BatchFilter = Arc<dyn Fn(&Value, &Value) -> bool + Send + Sync>;

/// Binds a supergraph field to the subgraph field that resolves it.
///
/// A field carrying an `Extend` is resolved entirely by `source_graph`;
/// nested children may recurse back into other subgraphs through their own
/// bindings.
#[derive(Clone)]
pub struct Extend {
    pub source_graph: String,
    pub source_field_name: String,
    pub target: Option<String>,
    /// `(parent_key, mapper)` pairs, applied in order.
    pub argument_mappings: Vec<(String, ArgumentMapper)>,
    pub additional_fields: Vec<String>,
    pub filter_batch_results: Option<BatchFilter>,
}

impl Extend {
    /// An identity extend: the field is owned by `source_graph` under the
    /// same name, with no argument dataflow from a parent object. This is
    /// what the composer attaches to every root-reachable field before any
    /// user transformer runs.
    pub fn identity(source_graph: impl Into<String>, field_name: impl Into<String>) -> Self {
        let field_name = field_name.into();
        Extend {
            source_graph: source_graph.into(),
            source_field_name: field_name,
            target: None,
            argument_mappings: Vec::new(),
            additional_fields: Vec::new(),
            filter_batch_results: None,
        }
    }

    pub fn with_argument_mapping(mut self, parent_key: impl Into<String>, mapper: ArgumentMapper) -> Self {
        self.argument_mappings.push((parent_key.into(), mapper));
        self
    }

    pub fn with_additional_field(mut self, name: impl Into<String>) -> Self {
        self.additional_fields.push(name.into());
        self
    }

    pub fn with_batch_filter(mut self, filter: BatchFilter) -> Self {
        self.filter_batch_results = Some(filter);
        self
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    /// Whether the fetch data source may coalesce sibling requests bound to
    /// this extend into one batched, list-argument subgraph call.
    pub fn batch_enabled(&self) -> bool {
        self.filter_batch_results.is_some()
    }
}

impl fmt::Debug for Extend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Extend")
            .field("source_graph", &self.source_graph)
            .field("source_field_name", &self.source_field_name)
            .field("target", &self.target)
            .field("argument_mappings", &self.argument_mappings.iter().map(|(k, _)| k.as_str()).collect::<Vec<_>>())
            .field("additional_fields", &self.additional_fields)
            .field("batch_enabled", &self.batch_enabled())
            .finish()
    }
}
