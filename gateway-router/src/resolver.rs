//! Recursive selection-tree walker: extraction vs. fetch, sibling batching
//! vs. sequencing, and entity-fetch flattening.

use futures::future::BoxFuture;
use futures::future::try_join_all;
use futures::FutureExt;
use gateway_federation::error::ExecutionError;
use gateway_federation::extend::Extend;
use gateway_federation::schema::SupergraphSchema;
use gateway_federation::selection::{Field, OperationType, Resolver};
use gateway_federation::value::Value;
use indexmap::IndexMap;

use crate::fetch::{FetchDataSource, FetchRequest};

/// Walks `schema` and attaches an `Extractor` or `Fetcher` resolver to every
/// node of `fields`, recursing into each field's declared return type.
///
/// Nodes with no matching field definition (scalar leaves, or fields the
/// schema doesn't know about) are left unbound; the resolver treats an
/// unbound node the same as an `Extractor` that pulls its value straight off
/// the parent object by name.
pub fn bind_selection(schema: &SupergraphSchema, type_name: &str, fields: &mut [Field]) {
    for field in fields.iter_mut() {
        if field.is_introspection() {
            continue;
        }
        let Some(field_def) = schema.field(type_name, &field.name) else {
            continue;
        };

        field.resolver = Some(match &field_def.extend {
            Some(extend) => Resolver::Fetcher(extend.clone()),
            None => {
                // Parent objects — whether built by `resolve_object` or
                // returned straight from a subgraph response — are always
                // keyed by `output_name`, since that's the alias every field
                // is rendered under (see `render_field_body`).
                let output_name = field.output_name.clone();
                Resolver::Extractor(std::sync::Arc::new(move |parent: &Value| {
                    parent.get(&output_name).cloned().unwrap_or(Value::Null)
                }))
            }
        });

        let next_type = strip_type_wrappers(&field_def.type_name);
        bind_selection(schema, &next_type, &mut field.fields);
    }
}

fn strip_type_wrappers(type_name: &str) -> String {
    type_name.chars().filter(|c| *c != '!' && *c != '[' && *c != ']').collect()
}

/// Resolves a whole selection tree against an empty root parent, producing
/// the top-level response object. `fields` must already be bound (see
/// [`bind_selection`]).
pub async fn resolve_root(
    fields: &[Field],
    operation_type: OperationType,
    data_source: &FetchDataSource,
) -> Result<Value, ExecutionError> {
    let root = Value::Object(IndexMap::new());
    let object = resolve_object(fields, &root, operation_type, data_source).await?;
    Ok(Value::Object(object))
}

fn resolve_object<'a>(
    fields: &'a [Field],
    parent: &'a Value,
    operation_type: OperationType,
    data_source: &'a FetchDataSource,
) -> BoxFuture<'a, Result<IndexMap<String, Value>, ExecutionError>> {
    async move {
        if operation_type.batches_siblings() {
            let resolved = try_join_all(fields.iter().map(|field| resolve_field(field, parent, operation_type, data_source))).await?;
            Ok(fields.iter().map(|f| f.output_name.clone()).zip(resolved).collect())
        } else {
            let mut object = IndexMap::new();
            for field in fields {
                let value = resolve_field(field, parent, operation_type, data_source).await?;
                object.insert(field.output_name.clone(), value);
            }
            Ok(object)
        }
    }
    .boxed()
}

fn resolve_field<'a>(
    field: &'a Field,
    parent: &'a Value,
    operation_type: OperationType,
    data_source: &'a FetchDataSource,
) -> BoxFuture<'a, Result<Value, ExecutionError>> {
    async move {
        match &field.resolver {
            Some(Resolver::Fetcher(extend)) => resolve_fetcher(field, extend, parent, operation_type, data_source).await,
            _ => resolve_extractor(field, parent, operation_type, data_source).await,
        }
    }
    .boxed()
}

async fn resolve_extractor(
    field: &Field,
    parent: &Value,
    operation_type: OperationType,
    data_source: &FetchDataSource,
) -> Result<Value, ExecutionError> {
    let Some(parent_object) = parent.as_object() else {
        return Ok(Value::Null);
    };

    let value = match &field.resolver {
        Some(Resolver::Extractor(extractor)) => extractor(parent),
        _ => parent_object.get(&field.output_name).cloned().unwrap_or(Value::Null),
    };

    if field.fields.is_empty() {
        return Ok(value);
    }

    match value {
        Value::Object(_) => {
            let object = resolve_object(&field.fields, &value, operation_type, data_source).await?;
            Ok(Value::Object(object))
        }
        other => Ok(other),
    }
}

/// Lowers a selection for dispatch to `extend.source_graph`. Structure is
/// preserved through `Extractor` descendants (resolved from this same
/// fetch's response); a descendant that is itself a `Fetcher` is omitted
/// entirely — it is resolved by its own later fetch — but the parent keys
/// its argument mappings read are added as extra sibling leaves so they are
/// available on the object handed to that later fetch.
fn lower_for_fetch(fields: &[Field]) -> Vec<Field> {
    let mut result = Vec::new();
    let mut needed_keys: Vec<String> = Vec::new();

    for field in fields {
        match &field.resolver {
            Some(Resolver::Fetcher(extend)) => {
                needed_keys.extend(extend.argument_mappings.iter().map(|(key, _)| key.clone()));
            }
            _ => {
                let mut plain = field.without_resolver();
                plain.fields = lower_for_fetch(&field.fields);
                result.push(plain);
            }
        }
    }

    // `resolve_fetcher` later reads the parent object by `parent_key` from
    // the object `resolve_object` builds, which is keyed by `output_name`,
    // not `name` — an aliased sibling (`storeId: id`) doesn't satisfy a
    // needed key of `id` even though its underlying field name matches.
    for key in needed_keys {
        if !result.iter().any(|f| f.output_name == key) {
            result.push(Field::leaf(key));
        }
    }

    result
}

async fn resolve_fetcher(
    field: &Field,
    extend: &Extend,
    parent: &Value,
    operation_type: OperationType,
    data_source: &FetchDataSource,
) -> Result<Value, ExecutionError> {
    let mut selection = lower_for_fetch(&field.fields);
    for extra in &extend.additional_fields {
        if !selection.iter().any(|f| f.output_name == *extra) {
            let mut leaf = Field::leaf(extra.clone());
            if let Some(target) = &extend.target {
                leaf = leaf.with_targets(vec![target.clone()]);
            }
            selection.push(leaf);
        }
    }

    let mut arguments = field.arguments.clone();
    for (parent_key, mapper) in &extend.argument_mappings {
        let source_value = parent.get(parent_key).cloned().unwrap_or(Value::Null);
        if let Some((name, value)) = mapper(&source_value) {
            if !value.is_null() {
                arguments.insert(name, value);
            }
        }
    }

    let request = FetchRequest {
        subgraph: extend.source_graph.clone(),
        source_field_name: extend.source_field_name.clone(),
        operation_type,
        selection,
        arguments,
        batch_enabled: extend.batch_enabled(),
    };

    let result = data_source.enqueue(request).await?;

    let filtered = match (&result, &extend.filter_batch_results) {
        (Value::List(items), Some(filter)) => Value::List(items.iter().filter(|candidate| filter(parent, candidate)).cloned().collect()),
        _ => result,
    };

    if let [only_child] = field.fields.as_slice() {
        if only_child.eliminate {
            if let Value::List(items) = &filtered {
                match items.as_slice() {
                    [single] => return resolve_field(only_child, single, operation_type, data_source).await,
                    // No batch member matched this parent's key: the field is a
                    // to-one relationship, so it resolves to Null rather than
                    // an empty list.
                    [] => return Ok(Value::Null),
                    _ => {}
                }
            }
        }
    }

    // A childless fetched field (a scalar leaf like `hello`, or a scalar
    // list like `tags: [String]`) has nothing left to project; the fetched
    // value itself is the result, same as an `Extractor` returning a
    // non-object value as-is.
    if field.fields.is_empty() {
        return Ok(filtered);
    }

    match filtered {
        Value::List(items) => {
            let resolved = try_join_all(items.iter().map(|item| async move {
                let object = resolve_object(&field.fields, item, operation_type, data_source).await?;
                Ok::<Value, ExecutionError>(Value::Object(object))
            }))
            .await?;
            Ok(Value::List(resolved))
        }
        other => {
            let object = resolve_object(&field.fields, &other, operation_type, data_source).await?;
            Ok(Value::Object(object))
        }
    }
}
