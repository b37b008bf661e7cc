pub mod fetch;
pub mod gateway;
pub mod introspection;
pub mod resolver;
pub mod tracing_wrapper;

pub use fetch::{BatchResultShortfall, FetchDataSource, FetchRequest};
pub use gateway::{Gateway, GatewayConfig, Response};
