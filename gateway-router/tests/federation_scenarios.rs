#[path = "support.rs"]
mod support;

use gateway_federation::extend::Extend;
use gateway_federation::selection::{Field, OperationType};
use gateway_federation::value::Value;
use gateway_federation::visitor::ExtendVisitor;
use gateway_router::{Gateway, GatewayConfig};
use indexmap::IndexMap;
use pretty_assertions::assert_eq;
use std::sync::Arc;
use support::{init_tracing, object, MockSubgraph};

fn args(pairs: Vec<(&str, Value)>) -> IndexMap<String, Value> {
    let mut map = IndexMap::new();
    for (key, value) in pairs {
        map.insert(key.to_string(), value);
    }
    map
}

#[tokio::test]
async fn root_passthrough() {
    init_tracing();
    let subgraph = MockSubgraph::new("a", "type Query { hello: String }", |_query| object(vec![("f0", Value::string("world"))]));

    let gateway = Gateway::build(vec![subgraph], Vec::new(), GatewayConfig::default()).expect("composition succeeds");

    let fields = vec![Field::leaf("hello")];
    let response = gateway.execute(fields, OperationType::Query).await;

    assert!(response.errors.is_empty());
    assert_eq!(response.data, object(vec![("hello", Value::string("world"))]));
}

#[tokio::test]
async fn cross_graph_extension() {
    init_tracing();
    let stores = MockSubgraph::new(
        "stores",
        "type Query { store(id: Int): Store } type Store { id: Int } type BookSells { id: Int }",
        |query| {
            if query.contains("bookSells") {
                object(vec![("f0", object(vec![("id", Value::int(99))]))])
            } else {
                object(vec![("f0", object(vec![("id", Value::int(1))]))])
            }
        },
    );

    let extend = Extend::identity("stores", "bookSells").with_argument_mapping(
        "id",
        Arc::new(|parent_id: &Value| Some(("storeId".to_string(), parent_id.clone()))),
    );
    let transformer = ExtendVisitor::new("Store", "bookSells", extend);

    let gateway =
        Gateway::build(vec![stores], vec![Box::new(transformer)], GatewayConfig::default()).expect("composition succeeds");

    let fields = vec![Field::leaf("store")
        .with_arguments(args(vec![("id", Value::int(1))]))
        .with_fields(vec![Field::leaf("id"), Field::leaf("bookSells").with_fields(vec![Field::leaf("id")])])];

    let response = gateway.execute(fields, OperationType::Query).await;

    assert!(response.errors.is_empty());
    assert_eq!(
        response.data,
        object(vec![(
            "store",
            object(vec![("id", Value::int(1)), ("bookSells", object(vec![("id", Value::int(99))]))])
        )])
    );
}

#[tokio::test]
async fn entity_fetch_with_batch_filter_coalesces_into_one_call() {
    init_tracing();
    use std::sync::atomic::{AtomicUsize, Ordering};

    let author_calls = Arc::new(AtomicUsize::new(0));
    let author_calls_counter = author_calls.clone();

    let books = MockSubgraph::new(
        "books",
        "type Query { books: [Book] } type Book { id: Int authorId: Int } type Author { id: Int }",
        move |query| {
            if query.contains("author") {
                author_calls_counter.fetch_add(1, Ordering::SeqCst);
                object(vec![(
                    "f0",
                    Value::List(vec![
                        object(vec![("id", Value::int(10))]),
                        object(vec![("id", Value::int(20))]),
                        object(vec![("id", Value::int(30))]),
                    ]),
                )])
            } else {
                object(vec![(
                    "f0",
                    Value::List(vec![
                        object(vec![("id", Value::int(1)), ("authorId", Value::int(10))]),
                        object(vec![("id", Value::int(2)), ("authorId", Value::int(20))]),
                        object(vec![("id", Value::int(3)), ("authorId", Value::int(30))]),
                    ]),
                )])
            }
        },
    );

    let extend = Extend::identity("books", "author")
        .with_argument_mapping("authorId", Arc::new(|id: &Value| Some(("authorId".to_string(), id.clone()))))
        .with_additional_field("id")
        .with_batch_filter(Arc::new(|parent, candidate| parent.get("authorId") == candidate.get("id")));
    let transformer = ExtendVisitor::new("Book", "author", extend);

    let gateway =
        Gateway::build(vec![books], vec![Box::new(transformer)], GatewayConfig::default()).expect("composition succeeds");

    let fields = vec![Field::leaf("books").with_fields(vec![
        Field::leaf("id"),
        Field::leaf("author").with_fields(vec![Field::leaf("id")]),
    ])];

    let response = gateway.execute(fields, OperationType::Query).await;

    assert!(response.errors.is_empty());
    assert_eq!(author_calls.load(Ordering::SeqCst), 1, "sibling author fetches must coalesce into one subgraph call");

    let results = response.data.get("books").and_then(Value::as_list).expect("books list");
    assert_eq!(results.len(), 3);
    for (book, expected_author_id) in results.iter().zip([10, 20, 30]) {
        let author_list = book.get("author").and_then(Value::as_list).expect("author list");
        assert_eq!(author_list.len(), 1);
        assert_eq!(author_list[0].get("id"), Some(&Value::int(expected_author_id)));
    }
}

#[tokio::test]
async fn eliminate_flattens_singleton_entity_result() {
    init_tracing();
    let books = MockSubgraph::new(
        "books",
        "type Query { books: [Book] } type Book { id: Int authorId: Int } type Author { id: Int name: String }",
        move |query| {
            if query.contains("author") {
                object(vec![("f0", Value::List(vec![object(vec![("id", Value::int(10)), ("name", Value::string("Ada"))])]))])
            } else {
                object(vec![("f0", Value::List(vec![object(vec![("id", Value::int(1)), ("authorId", Value::int(10))])]))])
            }
        },
    );

    let extend = Extend::identity("books", "author")
        .with_argument_mapping("authorId", Arc::new(|id: &Value| Some(("authorId".to_string(), id.clone()))))
        .with_additional_field("id")
        .with_batch_filter(Arc::new(|parent, candidate| parent.get("authorId") == candidate.get("id")));
    let transformer = ExtendVisitor::new("Book", "author", extend);

    let gateway =
        Gateway::build(vec![books], vec![Box::new(transformer)], GatewayConfig::default()).expect("composition succeeds");

    let fields = vec![Field::leaf("books").with_fields(vec![
        Field::leaf("id"),
        Field::leaf("author").with_fields(vec![Field::leaf("name").eliminating()]),
    ])];

    let response = gateway.execute(fields, OperationType::Query).await;

    assert!(response.errors.is_empty());
    let results = response.data.get("books").and_then(Value::as_list).expect("books list");
    assert_eq!(results.len(), 1);
    // `name` has `eliminate = true` and is the sole child of the singleton
    // author match, so `author` resolves directly to the scalar name value
    // instead of `{ name: "Ada" }`.
    assert_eq!(results[0].get("author"), Some(&Value::string("Ada")));
}

#[tokio::test]
async fn aliased_child_of_a_fetched_field_resolves_by_alias() {
    init_tracing();
    let stores = MockSubgraph::new(
        "stores",
        "type Query { store(id: Int): Store } type Store { id: Int }",
        |_query| object(vec![("f0", object(vec![("sid", Value::int(5))]))]),
    );

    let gateway = Gateway::build(vec![stores], Vec::new(), GatewayConfig::default()).expect("composition succeeds");

    let fields = vec![Field::leaf("store")
        .with_arguments(args(vec![("id", Value::int(1))]))
        .with_fields(vec![Field::leaf("id").with_output_name("sid")])];

    let response = gateway.execute(fields, OperationType::Query).await;

    assert!(response.errors.is_empty());
    assert_eq!(response.data, object(vec![("store", object(vec![("sid", Value::int(5))]))]));
}

#[tokio::test]
async fn missing_subgraph_surfaces_as_execution_error() {
    init_tracing();
    let subgraph = MockSubgraph::new("a", "type Query { hello: String }", |_query| object(vec![("f0", Value::string("world"))]));

    let extend = Extend::identity("missing", "hello");
    let transformer = ExtendVisitor::new("Query", "hello", extend);

    let gateway =
        Gateway::build(vec![subgraph], vec![Box::new(transformer)], GatewayConfig::default()).expect("composition succeeds");

    let fields = vec![Field::leaf("hello")];
    let response = gateway.execute(fields, OperationType::Query).await;

    assert_eq!(response.data, Value::Null);
    assert_eq!(response.errors.len(), 1);
    assert_eq!(response.errors[0], "Subgraph missing not found");
}

#[tokio::test]
async fn introspection_bypasses_every_subgraph() {
    init_tracing();
    use std::sync::atomic::{AtomicBool, Ordering};

    let called = Arc::new(AtomicBool::new(false));
    let called_in_handler = called.clone();
    let subgraph = MockSubgraph::new("a", "type Query { hello: String }", move |_query| {
        called_in_handler.store(true, Ordering::SeqCst);
        object(vec![("f0", Value::string("world"))])
    });

    let gateway = Gateway::build(vec![subgraph], Vec::new(), GatewayConfig::default()).expect("composition succeeds");

    let fields = vec![Field::leaf("__schema").with_fields(vec![Field::leaf("types").with_fields(vec![Field::leaf("name")])])];
    let response = gateway.execute(fields, OperationType::Query).await;

    assert!(response.errors.is_empty());
    assert!(!called.load(Ordering::SeqCst), "introspection must not reach any subgraph");
    let types = response.data.get("types").and_then(Value::as_list).expect("types list");
    assert!(types.iter().any(|t| t.get("name") == Some(&Value::string("Query"))));
}

#[tokio::test]
async fn mutation_siblings_are_serialized_left_to_right() {
    use std::sync::Mutex;

    init_tracing();
    let order = Arc::new(Mutex::new(Vec::<&'static str>::new()));
    let order_in_handler = order.clone();
    let subgraph = MockSubgraph::new(
        "a",
        "type Query { hello: String } type Mutation { addBook: Int addAuthor: Int }",
        move |query| {
            if query.contains("addBook") {
                order_in_handler.lock().unwrap().push("addBook");
                object(vec![("f0", Value::int(1))])
            } else {
                order_in_handler.lock().unwrap().push("addAuthor");
                object(vec![("f0", Value::int(2))])
            }
        },
    );

    let gateway = Gateway::build(vec![subgraph], Vec::new(), GatewayConfig::default()).expect("composition succeeds");

    let fields = vec![Field::leaf("addBook"), Field::leaf("addAuthor")];
    let response = gateway.execute(fields, OperationType::Mutation).await;

    assert!(response.errors.is_empty());
    assert_eq!(*order.lock().unwrap(), vec!["addBook", "addAuthor"]);
    assert_eq!(
        response.data,
        object(vec![("addBook", Value::int(1)), ("addAuthor", Value::int(2))])
    );
}
