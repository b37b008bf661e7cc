pub mod compose;
pub mod error;
pub mod extend;
pub mod schema;
pub mod selection;
pub mod subgraph;
pub mod synthesize;
pub mod value;
pub mod visitor;

pub use compose::compose_subgraphs;
pub use error::{ConfigurationError, ExecutionError, ValidationError};
pub use extend::Extend;
pub use schema::{FieldDef, ObjectTypeDef, SupergraphSchema};
pub use selection::{Field, OperationType, Resolver};
pub use subgraph::{parse_subgraph_schema, SubgraphExecutor, SubgraphHandle};
pub use synthesize::{render_document, render_fields, render_value};
pub use value::{ScalarKind, Value};
pub use visitor::{ExtendVisitor, FilterFieldVisitor, TypeVisitor};
