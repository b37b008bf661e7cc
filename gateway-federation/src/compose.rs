//! Merges subgraph schemas into one supergraph and annotates every
//! root-reachable field with the binding that resolves it.

use crate::error::ConfigurationError;
use crate::extend::Extend;
use crate::schema::{ArgumentDef, FieldDef, ObjectTypeDef, SupergraphSchema};
use crate::subgraph::SubgraphHandle;
use crate::visitor::TypeVisitor;
use apollo_compiler::schema::ExtendedType;
use std::sync::Arc;

/// Accumulates composition errors while walking subgraphs in registration
/// order. Registration order is preserved (not sorted by name) because
/// supergraph field order is user observable.
struct Composer {
    errors: Vec<ConfigurationError>,
}

impl Composer {
    fn new() -> Self {
        Composer { errors: Vec::new() }
    }

    fn merge(&mut self, subgraphs: &[SubgraphHandle]) -> SupergraphSchema {
        let mut supergraph = SupergraphSchema::default();

        for subgraph in subgraphs {
            if !subgraph.expose_at_root() {
                continue;
            }
            let schema = subgraph.schema();
            let definition = &schema.schema_definition;

            let root_type_names: Vec<String> = [
                definition.query.as_ref().map(|c| c.name.to_string()),
                definition.mutation.as_ref().map(|c| c.name.to_string()),
                definition.subscription.as_ref().map(|c| c.name.to_string()),
            ]
            .into_iter()
            .flatten()
            .collect();

            if let Some(name) = definition.query.as_ref().map(|c| c.name.to_string()) {
                supergraph.query_type.get_or_insert(name);
            }
            if let Some(name) = definition.mutation.as_ref().map(|c| c.name.to_string()) {
                supergraph.mutation_type.get_or_insert(name);
            }
            if let Some(name) = definition.subscription.as_ref().map(|c| c.name.to_string()) {
                supergraph.subscription_type.get_or_insert(name);
            }

            for (type_name, extended_type) in schema.types.iter() {
                let ExtendedType::Object(object) = extended_type else {
                    continue;
                };
                let type_name_str = type_name.to_string();
                let is_root = root_type_names.contains(&type_name_str);

                let type_def = supergraph
                    .types
                    .entry(type_name_str.clone())
                    .or_insert_with(|| ObjectTypeDef::new(type_name_str.clone()));

                for (field_name, field) in object.fields.iter() {
                    let field_name_str = field_name.to_string();
                    if field_name_str == "_service" || field_name_str == "_entities" {
                        continue;
                    }

                    if let Some(existing) = type_def.fields.get(&field_name_str) {
                        if let Some(existing_extend) = &existing.extend {
                            if existing_extend.source_graph != subgraph.name() {
                                if is_root {
                                    self.errors.push(ConfigurationError::DuplicateRootField {
                                        field: field_name_str.clone(),
                                        first_graph: existing_extend.source_graph.clone(),
                                        second_graph: subgraph.name().to_string(),
                                    });
                                } else {
                                    self.errors.push(ConfigurationError::FieldCollision {
                                        type_name: type_name_str.clone(),
                                        field: field_name_str.clone(),
                                        first_graph: existing_extend.source_graph.clone(),
                                        second_graph: subgraph.name().to_string(),
                                    });
                                }
                            }
                        }
                        continue;
                    }

                    let mut field_def = FieldDef::new(field_name_str.clone(), field.ty.to_string());
                    field_def.arguments = field
                        .arguments
                        .iter()
                        .map(|arg| ArgumentDef {
                            name: arg.name.to_string(),
                            type_name: arg.ty.to_string(),
                        })
                        .collect();

                    if is_root {
                        field_def.extend = Some(Arc::new(Extend::identity(subgraph.name(), field_name_str.clone())));
                    }

                    type_def.fields.insert(field_name_str, field_def);
                }
            }
        }

        supergraph
    }
}

/// Merges subgraph root types into one supergraph, annotates every
/// root-reachable field with an identity `Extend`, and runs user
/// transformers in order.
pub fn compose_subgraphs(
    subgraphs: &[SubgraphHandle],
    transformers: Vec<Box<dyn TypeVisitor>>,
) -> Result<SupergraphSchema, ConfigurationError> {
    if subgraphs.is_empty() {
        return Err(ConfigurationError::NoSubgraphs);
    }

    let mut composer = Composer::new();
    let mut schema = composer.merge(subgraphs);

    if !composer.errors.is_empty() {
        return Err(ConfigurationError::Multiple(composer.errors));
    }

    for mut transformer in transformers {
        for type_def in schema.types.values_mut() {
            transformer.visit_type(type_def);
            let type_name = type_def.name.clone();
            for field in type_def.fields.values_mut() {
                transformer.visit_field(&type_name, field);
                for argument in field.arguments.iter_mut() {
                    transformer.visit_argument(&type_name, &field.name, argument);
                }
            }
        }
    }

    Ok(schema)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExecutionError;
    use crate::schema::SupergraphSchema;
    use crate::selection::OperationType;
    use crate::value::Value;
    use apollo_compiler::validation::Valid;
    use apollo_compiler::Schema;
    use async_trait::async_trait;
    use indexmap::IndexMap;

    struct StubSubgraph {
        name: &'static str,
        schema: Valid<Schema>,
    }

    impl StubSubgraph {
        fn new(name: &'static str, sdl: &str) -> SubgraphHandle {
            Arc::new(StubSubgraph {
                name,
                schema: Schema::parse_and_validate(sdl, format!("{name}.graphql")).expect("valid sdl"),
            })
        }
    }

    #[async_trait]
    impl crate::subgraph::SubgraphExecutor for StubSubgraph {
        fn name(&self) -> &str {
            self.name
        }

        fn schema(&self) -> &Valid<Schema> {
            &self.schema
        }

        async fn run(&self, _query: &str, _operation_type: OperationType, _variables: IndexMap<String, Value>) -> Result<Value, ExecutionError> {
            unimplemented!("composition tests never dispatch a request")
        }
    }

    #[test]
    fn empty_subgraph_list_is_rejected() {
        let result = compose_subgraphs(&[], Vec::new());
        assert!(matches!(result, Err(ConfigurationError::NoSubgraphs)));
    }

    #[test]
    fn supergraph_schema_starts_empty() {
        let schema = SupergraphSchema::default();
        assert!(schema.types.is_empty());
        assert!(schema.query_type.is_none());
    }

    #[test]
    fn same_root_field_from_two_subgraphs_is_rejected() {
        let a = StubSubgraph::new("a", "type Query { hello: String }");
        let b = StubSubgraph::new("b", "type Query { hello: String }");

        let result = compose_subgraphs(&[a, b], Vec::new());
        match result {
            Err(ConfigurationError::Multiple(errors)) => {
                assert!(matches!(errors[0], ConfigurationError::DuplicateRootField { .. }));
            }
            other => panic!("expected a duplicate root field error, got {other:?}"),
        }
    }

    #[test]
    fn shared_non_root_field_across_subgraphs_merges_without_error() {
        // Non-root entity fields (e.g. a shared key field) commonly appear
        // identically in more than one subgraph; validating they agree is
        // schema-diff validation, explicitly out of scope, so the composer
        // keeps the first declaration rather than rejecting the merge.
        let a = StubSubgraph::new("a", "type Query { books: [Book] } type Book { id: Int }");
        let b = StubSubgraph::new("b", "type Query { authors: [Author] } type Book { id: Int }");

        let schema = compose_subgraphs(&[a, b], Vec::new()).expect("shared field merges cleanly");
        assert!(schema.field("Book", "id").is_some());
    }
}
