//! OpenAPI 3.0 planner

use serde_json::Value;

use super::{example_text, operations, pretty_json, resolve, synthesize, ImportPlan};
use crate::constants::BASE_URL_PLACEHOLDER;
use crate::error::ImportError;
use crate::models::{Body, FormField, MultipartField};

pub(super) fn plan(spec: &Value) -> Result<ImportPlan, ImportError> {
    let base_url = base_url(spec);
    let mut plan = ImportPlan::new(spec);

    for operation in operations(spec) {
        let mut planned = operation.planned_request(&base_url);
        if let Some(request_body) = operation.operation.get("requestBody") {
            if let Some(body) = body_from_request_body(request_body, spec)? {
                planned.request.body = body;
            }
        }
        plan.requests.push(planned);
    }

    Ok(plan)
}

/// `servers[0].url` with its variables filled from their defaults.
/// Relative urls get the `{{BASE_URL}}` placeholder in front.
fn base_url(spec: &Value) -> String {
    let Some(server) = spec.pointer("/servers/0") else {
        return BASE_URL_PLACEHOLDER.to_string();
    };

    let mut url = server
        .get("url")
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_string();
    if let Some(variables) = server.get("variables").and_then(Value::as_object) {
        for (name, variable) in variables {
            if let Some(default) = variable.get("default").and_then(Value::as_str) {
                url = url.replace(&format!("{{{}}}", name), default);
            }
        }
    }

    let url = url.trim_end_matches('/');
    if url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else {
        format!("{}{}", BASE_URL_PLACEHOLDER, url)
    }
}

/// Pick the first supported media type, in order: JSON, url-encoded form,
/// multipart form, octet-stream.
fn body_from_request_body(request_body: &Value, spec: &Value) -> Result<Option<Body>, ImportError> {
    let request_body = resolve(request_body, spec);
    let Some(content) = request_body.get("content").and_then(Value::as_object) else {
        return Ok(None);
    };

    // The schema drives the body; a media-level example only counts without one
    if let Some(media) = content.get("application/json") {
        let example = synthesize(media_schema(media, spec), spec);
        return Ok(Some(Body::json(pretty_json(&example)?)));
    }

    if let Some(media) = content.get("application/x-www-form-urlencoded") {
        let fields = properties(media, spec)
            .map(|(name, property)| FormField::disabled(name, example_text(property.get("example"))))
            .collect();
        return Ok(Some(Body::UrlEncodedForm { fields }));
    }

    if let Some(media) = content.get("multipart/form-data") {
        let fields = properties(media, spec)
            .map(|(name, property)| {
                let field = if property.get("format").and_then(Value::as_str) == Some("binary") {
                    MultipartField::file(name, None)
                } else {
                    MultipartField::text(name, "")
                };
                field.disabled()
            })
            .collect();
        return Ok(Some(Body::MultipartForm { fields }));
    }

    if content.contains_key("application/octet-stream") {
        return Ok(Some(Body::File { path: None }));
    }

    Ok(None)
}

/// The media type's schema, or the media object itself when it has none
fn media_schema<'a>(media: &'a Value, spec: &'a Value) -> &'a Value {
    let media = resolve(media, spec);
    resolve(media.get("schema").unwrap_or(media), spec)
}

/// Declared properties of the media type's schema, each one resolved
fn properties<'a>(media: &'a Value, spec: &'a Value) -> impl Iterator<Item = (&'a str, &'a Value)> {
    media_schema(media, spec)
        .get("properties")
        .and_then(Value::as_object)
        .into_iter()
        .flatten()
        .map(move |(name, property)| (name.as_str(), resolve(property, spec)))
}
