//! Wraps execution in a span carrying the PII-masked query as an attribute.

use gateway_federation::error::ExecutionError;
use gateway_federation::selection::{Field, OperationType};
use gateway_federation::synthesize::render_document;
use gateway_federation::value::Value;
use std::future::Future;
use tracing::Instrument;

fn mask_field(field: &Field) -> Field {
    let mut masked = field.clone();
    masked.resolver = None;
    masked.arguments = field.arguments.iter().map(|(k, v)| (k.clone(), v.masked())).collect();
    masked.fields = field.fields.iter().map(mask_field).collect();
    masked
}

/// Runs `body` inside a `"query"` span whose `query` attribute is the
/// reconstructed document with every argument value masked.
pub async fn traced<F>(operation_type: OperationType, fields: &[Field], body: F) -> Result<Value, ExecutionError>
where
    F: Future<Output = Result<Value, ExecutionError>>,
{
    let masked: Vec<(String, Field)> = fields.iter().map(|f| (f.output_name.clone(), mask_field(f))).collect();
    let masked_query = render_document(operation_type, &masked);

    let span = tracing::info_span!(target: "gateway", "query", query = %masked_query, otel.status_code = tracing::field::Empty);
    async move {
        let result = body.await;
        if result.is_err() {
            tracing::Span::current().record("otel.status_code", "ERROR");
        }
        result
    }
    .instrument(span)
    .await
}
