//! Parsed selection nodes: the resolver's input tree.

use crate::extend::Extend;
use crate::value::Value;
use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;

/// A pure projection from a parent object to a value. Does not perform I/O.
pub type ExtractorFn = Arc<dyn Fn(&Value) -> Value + Send + Sync>;

/// How a selection's value is produced.
#[derive(Clone)]
pub enum Resolver {
    /// In-process projection from the already-resolved parent.
    Extractor(ExtractorFn),
    /// Remote subgraph call, described by an `Extend` binding.
    Fetcher(Arc<Extend>),
}

impl fmt::Debug for Resolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resolver::Extractor(_) => write!(f, "Resolver::Extractor(..)"),
            Resolver::Fetcher(extend) => f.debug_tuple("Resolver::Fetcher").field(extend).finish(),
        }
    }
}

/// One node of a selection tree.
#[derive(Debug, Clone)]
pub struct Field {
    /// The field name as understood by the resolver producing it.
    pub name: String,
    /// The alias under which this field's value appears in the response.
    pub output_name: String,
    pub arguments: IndexMap<String, Value>,
    pub fields: Vec<Field>,
    /// Concrete type names this selection applies to, for interface/union
    /// narrowing. `None` means it applies unconditionally.
    pub targets: Option<Vec<String>>,
    /// When set and this is the sole child of a singleton-list fetch result,
    /// the wrapping list is unwrapped (entity-fetch flattening).
    pub eliminate: bool,
    /// Absent at the parsed root input; bound during composition.
    pub resolver: Option<Resolver>,
}

impl Field {
    /// A bare selection node with no resolver bound yet, as produced by
    /// parsing an inbound request before composition-time annotation.
    pub fn leaf(name: impl Into<String>) -> Self {
        let name = name.into();
        Field {
            output_name: name.clone(),
            name,
            arguments: IndexMap::new(),
            fields: Vec::new(),
            targets: None,
            eliminate: false,
            resolver: None,
        }
    }

    pub fn with_output_name(mut self, alias: impl Into<String>) -> Self {
        self.output_name = alias.into();
        self
    }

    pub fn with_arguments(mut self, arguments: IndexMap<String, Value>) -> Self {
        self.arguments = arguments;
        self
    }

    pub fn with_fields(mut self, fields: Vec<Field>) -> Self {
        self.fields = fields;
        self
    }

    pub fn with_resolver(mut self, resolver: Resolver) -> Self {
        self.resolver = Some(resolver);
        self
    }

    pub fn eliminating(mut self) -> Self {
        self.eliminate = true;
        self
    }

    pub fn with_targets(mut self, targets: Vec<String>) -> Self {
        self.targets = Some(targets);
        self
    }

    /// Whether this is the gateway's own introspection namespace
    /// (`__schema`, `__type`), which bypasses the federation engine.
    pub fn is_introspection(&self) -> bool {
        self.name.starts_with("__")
    }

    /// Produces a plain copy of this node's structure with resolver bindings
    /// stripped, used when lowering a supergraph selection into the plain
    /// selection sent to a subgraph.
    pub fn without_resolver(&self) -> Field {
        Field {
            name: self.name.clone(),
            output_name: self.output_name.clone(),
            arguments: self.arguments.clone(),
            fields: self.fields.iter().map(Field::without_resolver).collect(),
            targets: self.targets.clone(),
            eliminate: self.eliminate,
            resolver: None,
        }
    }
}

/// The GraphQL operation kind a selection tree is rooted at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationType {
    Query,
    Mutation,
    Subscription,
}

impl OperationType {
    /// Whether sibling fields at the same level batch (`Query`/`Subscription`)
    /// or run strictly sequentially (`Mutation`).
    pub fn batches_siblings(self) -> bool {
        !matches!(self, OperationType::Mutation)
    }
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationType::Query => write!(f, "query"),
            OperationType::Mutation => write!(f, "mutation"),
            OperationType::Subscription => write!(f, "subscription"),
        }
    }
}
