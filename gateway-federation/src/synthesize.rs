//! Renders selection trees and values back into GraphQL document text.
//!
//! Used by the fetch data source to build the single synthesized document
//! dispatched per `(subgraph, operation)` batch group.

use crate::selection::{Field, OperationType};
use crate::value::{ScalarKind, Value};
use indexmap::IndexMap;
use std::fmt::Write as _;

/// Renders one value as a GraphQL input literal.
pub fn render_value(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Scalar(ScalarKind::String, v) => {
            format!("{:?}", v.as_str().unwrap_or_default())
        }
        Value::Scalar(ScalarKind::Enum, v) => v.as_str().unwrap_or_default().to_string(),
        Value::Scalar(_, v) => v.to_string(),
        Value::List(items) => {
            let rendered: Vec<String> = items.iter().map(render_value).collect();
            format!("[{}]", rendered.join(", "))
        }
        Value::Object(fields) => {
            let rendered: Vec<String> = fields
                .iter()
                .map(|(k, v)| format!("{k}: {}", render_value(v)))
                .collect();
            format!("{{{}}}", rendered.join(", "))
        }
    }
}

fn render_arguments(arguments: &IndexMap<String, Value>) -> String {
    if arguments.is_empty() {
        return String::new();
    }
    let rendered: Vec<String> = arguments
        .iter()
        .map(|(k, v)| format!("{k}: {}", render_value(v)))
        .collect();
    format!("({})", rendered.join(", "))
}

fn render_field(out: &mut String, field: &Field) {
    match &field.targets {
        Some(targets) if !targets.is_empty() => {
            for (i, target) in targets.iter().enumerate() {
                if i > 0 {
                    let _ = write!(out, " ");
                }
                let _ = write!(out, "... on {target} {{ ");
                render_field_body(out, field);
                let _ = write!(out, " }}");
            }
        }
        _ => render_field_body(out, field),
    }
}

/// Renders the field itself, without the `targets` inline-fragment wrapper
/// `render_field` applies around it.
fn render_field_body(out: &mut String, field: &Field) {
    if field.output_name == field.name {
        let _ = write!(out, "{}", field.name);
    } else {
        let _ = write!(out, "{}: {}", field.output_name, field.name);
    }
    let _ = write!(out, "{}", render_arguments(&field.arguments));
    if !field.fields.is_empty() {
        let _ = write!(out, " {{ ");
        for (i, child) in field.fields.iter().enumerate() {
            if i > 0 {
                let _ = write!(out, " ");
            }
            render_field(out, child);
        }
        let _ = write!(out, " }}");
    }
}

/// Renders a list of selections as plain GraphQL selection text, with no
/// surrounding operation or aliasing. Used to build a canonical form for
/// fetch-request deduplication.
pub fn render_fields(fields: &[Field]) -> String {
    let mut out = String::new();
    for field in fields {
        render_field(&mut out, field);
        out.push(' ');
    }
    out
}

/// Renders a set of top-level aliased selections as one operation document.
///
/// Aliases follow the `f0, f1, …` convention in declaration order so that
/// colliding `sourceFieldName`s within a batch group can be demultiplexed
/// from the response by alias.
pub fn render_document(operation_type: OperationType, aliased_fields: &[(String, Field)]) -> String {
    let mut body = String::new();
    for (alias, field) in aliased_fields {
        let mut aliased = field.clone();
        aliased.output_name = alias.clone();
        render_field(&mut body, &aliased);
        body.push(' ');
    }
    format!("{operation_type} {{ {body}}}")
}
