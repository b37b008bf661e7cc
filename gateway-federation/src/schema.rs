//! The composed supergraph representation the resolver routes against.

use crate::extend::Extend;
use indexmap::IndexMap;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct ArgumentDef {
    pub name: String,
    pub type_name: String,
}

/// A field of an object type, annotated with the subgraph binding that
/// resolves it. Every root-reachable field carries one by the time
/// composition finishes.
#[derive(Debug, Clone)]
pub struct FieldDef {
    pub name: String,
    pub type_name: String,
    pub arguments: Vec<ArgumentDef>,
    pub extend: Option<Arc<Extend>>,
}

impl FieldDef {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        FieldDef {
            name: name.into(),
            type_name: type_name.into(),
            arguments: Vec::new(),
            extend: None,
        }
    }
}

/// An object type and its fields. Interfaces, unions, enums, input objects,
/// and scalars are composed by name only: the resolver never needs to route
/// through them directly, only through the object fields that return them.
#[derive(Debug, Clone, Default)]
pub struct ObjectTypeDef {
    pub name: String,
    pub fields: IndexMap<String, FieldDef>,
}

impl ObjectTypeDef {
    pub fn new(name: impl Into<String>) -> Self {
        ObjectTypeDef {
            name: name.into(),
            fields: IndexMap::new(),
        }
    }
}

/// A composed supergraph: object types plus the names of its root types.
#[derive(Debug, Clone, Default)]
pub struct SupergraphSchema {
    pub types: IndexMap<String, ObjectTypeDef>,
    pub query_type: Option<String>,
    pub mutation_type: Option<String>,
    pub subscription_type: Option<String>,
}

impl SupergraphSchema {
    pub fn root_type(&self, operation_type: crate::selection::OperationType) -> Option<&ObjectTypeDef> {
        use crate::selection::OperationType::*;
        let name = match operation_type {
            Query => self.query_type.as_deref(),
            Mutation => self.mutation_type.as_deref(),
            Subscription => self.subscription_type.as_deref(),
        }?;
        self.types.get(name)
    }

    pub fn field(&self, type_name: &str, field_name: &str) -> Option<&FieldDef> {
        self.types.get(type_name)?.fields.get(field_name)
    }
}
