//! Swagger 2.0 planner

use serde_json::Value;

use super::{operations, parameter_name, pretty_json, synthesize, ImportPlan};
use crate::constants::DEFAULT_SPEC_HOST;
use crate::error::ImportError;
use crate::models::{Body, FormField, MultipartField};

pub(super) fn plan(spec: &Value) -> Result<ImportPlan, ImportError> {
    let base_url = base_url(spec);
    let mut plan = ImportPlan::new(spec);

    for operation in operations(spec) {
        let mut planned = operation.planned_request(&base_url);

        let form: Vec<&Value> = operation.parameters_in("formData").collect();
        let body_param = operation.parameters_in("body").last();

        if let Some(param) = body_param {
            let example = match param.get("schema") {
                Some(schema) => synthesize(schema, spec),
                None => Value::Object(Default::default()),
            };
            planned.request.body = Body::json(pretty_json(&example)?);
        } else if !form.is_empty() {
            planned.request.body = form_body(&form);
        }

        plan.requests.push(planned);
    }

    Ok(plan)
}

/// `scheme://host/basePath`, preferring https when the spec offers it
fn base_url(spec: &Value) -> String {
    let offers_https = spec
        .get("schemes")
        .and_then(Value::as_array)
        .map(|schemes| schemes.iter().any(|s| s.as_str() == Some("https")))
        .unwrap_or(false);
    let scheme = if offers_https { "https" } else { "http" };

    let host = spec
        .get("host")
        .and_then(Value::as_str)
        .unwrap_or(DEFAULT_SPEC_HOST);
    let base_path = spec
        .get("basePath")
        .and_then(Value::as_str)
        .unwrap_or("")
        .trim_end_matches('/');

    format!("{}://{}{}", scheme, host, base_path)
}

/// Multipart as soon as one field is a file, url-encoded otherwise
fn form_body(form: &[&Value]) -> Body {
    let is_file = |param: &Value| param.get("type").and_then(Value::as_str) == Some("file");

    if form.iter().any(|param| is_file(param)) {
        let fields = form
            .iter()
            .filter_map(|param| {
                let name = parameter_name(param)?;
                let field = if is_file(param) {
                    MultipartField::file(name, None)
                } else {
                    MultipartField::text(name, "")
                };
                Some(field.disabled())
            })
            .collect();
        Body::MultipartForm { fields }
    } else {
        let fields = form
            .iter()
            .filter_map(|param| parameter_name(param))
            .map(|name| FormField::disabled(name, ""))
            .collect();
        Body::UrlEncodedForm { fields }
    }
}
