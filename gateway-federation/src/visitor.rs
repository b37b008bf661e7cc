//! Pluggable transformations applied to a supergraph after merge.

use crate::extend::Extend;
use crate::schema::{ArgumentDef, FieldDef, ObjectTypeDef};
use std::sync::Arc;

/// A transformation over the schema tree, with an entry point per node kind.
/// Override only what a given transformer touches; the rest are no-ops.
///
/// `.extend(...)`, `.filter_field(...)`, and similar user-level DSL
/// operations are implemented as `TypeVisitor`s.
pub trait TypeVisitor {
    fn visit_type(&mut self, _type_def: &mut ObjectTypeDef) {}
    fn visit_field(&mut self, _type_name: &str, _field: &mut FieldDef) {}
    fn visit_argument(&mut self, _type_name: &str, _field_name: &str, _argument: &mut ArgumentDef) {}
    fn visit_directive(&mut self, _type_name: &str, _directive_name: &str) {}
}

/// Rewrites the `Extend` binding on one named field.
pub struct ExtendVisitor {
    pub type_name: String,
    pub field_name: String,
    pub extend: Extend,
}

impl ExtendVisitor {
    pub fn new(type_name: impl Into<String>, field_name: impl Into<String>, extend: Extend) -> Self {
        ExtendVisitor {
            type_name: type_name.into(),
            field_name: field_name.into(),
            extend,
        }
    }
}

impl TypeVisitor for ExtendVisitor {
    fn visit_type(&mut self, type_def: &mut ObjectTypeDef) {
        // `visit_field` only reaches fields a subgraph already declared; an
        // extend binding commonly introduces a field no subgraph owns (a
        // cross-graph key lookup, an entity-fetch relation), so it is added
        // here if absent, then bound below like any other field.
        if type_def.name != self.type_name {
            return;
        }
        type_def
            .fields
            .entry(self.field_name.clone())
            .or_insert_with(|| FieldDef::new(self.field_name.clone(), self.extend.target.clone().unwrap_or_default()));
    }

    fn visit_field(&mut self, type_name: &str, field: &mut FieldDef) {
        if type_name == self.type_name && field.name == self.field_name {
            field.extend = Some(Arc::new(self.extend.clone()));
        }
    }
}

/// Removes one named field from one named type.
pub struct FilterFieldVisitor {
    pub type_name: String,
    pub field_name: String,
}

impl FilterFieldVisitor {
    pub fn new(type_name: impl Into<String>, field_name: impl Into<String>) -> Self {
        FilterFieldVisitor {
            type_name: type_name.into(),
            field_name: field_name.into(),
        }
    }
}

impl TypeVisitor for FilterFieldVisitor {
    fn visit_type(&mut self, type_def: &mut ObjectTypeDef) {
        if type_def.name == self.type_name {
            type_def.fields.shift_remove(&self.field_name);
        }
    }
}
