//! Serves `__schema`/`__type` directly from the composed supergraph,
//! bypassing the federation engine and every subgraph entirely.

use gateway_federation::schema::{FieldDef, ObjectTypeDef, SupergraphSchema};
use gateway_federation::selection::{Field, OperationType};
use gateway_federation::value::Value;
use indexmap::IndexMap;

fn arg_string(arguments: &IndexMap<String, Value>, key: &str) -> Option<String> {
    match arguments.get(key) {
        Some(Value::Scalar(_, v)) => v.as_str().map(str::to_string),
        _ => None,
    }
}

fn type_ref(name: Option<&str>) -> Value {
    match name {
        None => Value::Null,
        Some(name) => {
            let mut fields = IndexMap::new();
            fields.insert("name".to_string(), Value::string(name));
            Value::Object(fields)
        }
    }
}

fn field_meta(field_def: &FieldDef, requested: &[Field]) -> Value {
    let mut fields = IndexMap::new();
    for child in requested {
        let value = match child.name.as_str() {
            "name" => Value::string(&field_def.name),
            "type" => type_ref(Some(&field_def.type_name)),
            _ => Value::Null,
        };
        fields.insert(child.output_name.clone(), value);
    }
    Value::Object(fields)
}

fn type_meta(type_def: &ObjectTypeDef, requested: &[Field]) -> Value {
    let mut fields = IndexMap::new();
    for child in requested {
        let value = match child.name.as_str() {
            "name" => Value::string(&type_def.name),
            "kind" => Value::enum_value("OBJECT"),
            "fields" => Value::List(type_def.fields.values().map(|f| field_meta(f, &child.fields)).collect()),
            _ => Value::Null,
        };
        fields.insert(child.output_name.clone(), value);
    }
    Value::Object(fields)
}

fn schema_meta(schema: &SupergraphSchema, requested: &[Field]) -> Value {
    let mut fields = IndexMap::new();
    for child in requested {
        let value = match child.name.as_str() {
            "queryType" => type_ref(schema.query_type.as_deref()),
            "mutationType" => type_ref(schema.mutation_type.as_deref()),
            "subscriptionType" => type_ref(schema.subscription_type.as_deref()),
            "types" => Value::List(schema.types.values().map(|t| type_meta(t, &child.fields)).collect()),
            _ => Value::Null,
        };
        fields.insert(child.output_name.clone(), value);
    }
    Value::Object(fields)
}

/// Resolves one root-level introspection field (`__schema`, `__type`, or
/// `__typename`). `operation_type` picks which root `__typename` reports.
pub fn resolve(field: &Field, schema: &SupergraphSchema, operation_type: OperationType) -> Value {
    match field.name.as_str() {
        "__schema" => schema_meta(schema, &field.fields),
        "__type" => {
            let Some(requested_name) = arg_string(&field.arguments, "name") else {
                return Value::Null;
            };
            match schema.types.get(&requested_name) {
                Some(type_def) => type_meta(type_def, &field.fields),
                None => Value::Null,
            }
        }
        "__typename" => {
            let root_type_name = match operation_type {
                OperationType::Query => schema.query_type.as_deref(),
                OperationType::Mutation => schema.mutation_type.as_deref(),
                OperationType::Subscription => schema.subscription_type.as_deref(),
            };
            Value::string(root_type_name.unwrap_or_default())
        }
        _ => Value::Null,
    }
}

/// Resolves every top-level field in a purely-introspection request.
pub fn resolve_root(fields: &[Field], schema: &SupergraphSchema, operation_type: OperationType) -> Value {
    let mut object = IndexMap::new();
    for field in fields {
        object.insert(field.output_name.clone(), resolve(field, schema, operation_type));
    }
    Value::Object(object)
}
