//! HTTP client wrapper - sends resolved requests and buffers responses

use std::path::Path;
use std::time::{Duration, Instant};

use base64::Engine;
use reqwest::header::CONTENT_TYPE;
use reqwest::multipart;
use tokio::sync::oneshot;

use crate::error::NetworkError;
use crate::models::{ApiKeyLocation, Auth, Body, HttpMethod, MultipartValue, Request, RequestOptions};
use crate::query::merge_query;

/// Buffered response of a sent request
#[derive(Clone, Debug, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    /// Pretty-printed when the payload is JSON
    pub body: String,
    pub time_ms: u64,
}

/// Create an HTTP client honoring the request's transport options
pub fn create_client(options: &RequestOptions) -> Result<reqwest::Client, NetworkError> {
    let redirect = if options.follow_redirects {
        reqwest::redirect::Policy::limited(10)
    } else {
        reqwest::redirect::Policy::none()
    };

    let mut builder = reqwest::Client::builder()
        .redirect(redirect)
        .danger_accept_invalid_certs(!options.verify_tls);
    if options.timeout > 0.0 {
        builder = builder.timeout(Duration::from_secs_f64(options.timeout));
    }
    builder
        .build()
        .map_err(|e| NetworkError::Request(e.to_string()))
}

fn to_method(method: HttpMethod) -> reqwest::Method {
    match method {
        HttpMethod::GET => reqwest::Method::GET,
        HttpMethod::POST => reqwest::Method::POST,
        HttpMethod::PUT => reqwest::Method::PUT,
        HttpMethod::PATCH => reqwest::Method::PATCH,
        HttpMethod::DELETE => reqwest::Method::DELETE,
        HttpMethod::HEAD => reqwest::Method::HEAD,
        HttpMethod::OPTIONS => reqwest::Method::OPTIONS,
        HttpMethod::TRACE => reqwest::Method::TRACE,
    }
}

async fn read_file(path: &Path) -> Result<Vec<u8>, NetworkError> {
    tokio::fs::read(path).await.map_err(|e| NetworkError::File {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Build a request from an already resolved template
async fn build_request(
    client: &reqwest::Client,
    request: &Request,
    auth: Option<&Auth>,
) -> Result<reqwest::RequestBuilder, NetworkError> {
    let mut url = merge_query(
        &request.url,
        request
            .params
            .iter()
            .filter(|p| p.enabled)
            .map(|p| (p.key.as_str(), p.value.as_str())),
    );
    if let Some(Auth::ApiKey {
        key,
        value,
        location: ApiKeyLocation::Param,
    }) = auth
    {
        url = merge_query(&url, [(key.as_str(), value.as_str())]);
    }

    let mut req_builder = client.request(to_method(request.method), &url);

    // Add headers
    for header in request.headers.iter().filter(|h| h.enabled) {
        req_builder = req_builder.header(&header.key, &header.value);
    }
    let has_content_type = request
        .headers
        .iter()
        .any(|h| h.enabled && h.key.eq_ignore_ascii_case("content-type"));

    // Add auth
    match auth {
        Some(Auth::Basic { username, password }) => {
            let credentials = format!("{}:{}", username, password);
            let encoded = base64::engine::general_purpose::STANDARD.encode(credentials);
            req_builder = req_builder.header("Authorization", format!("Basic {}", encoded));
        }
        Some(Auth::Bearer { token }) => {
            req_builder = req_builder.header("Authorization", token);
        }
        Some(Auth::ApiKey {
            key,
            value,
            location: ApiKeyLocation::Header,
        }) => {
            req_builder = req_builder.header(key, value);
        }
        Some(Auth::ApiKey { .. }) | None => {}
        Some(Auth::Digest { .. }) => {
            return Err(NetworkError::Unsupported("digest authentication".to_string()));
        }
    }

    // Add body
    if !request.body_enabled {
        return Ok(req_builder);
    }
    req_builder = match &request.body {
        Body::Raw { language, text } => {
            if !has_content_type {
                req_builder = req_builder.header(CONTENT_TYPE, language.content_type());
            }
            req_builder.body(text.clone())
        }
        Body::File { path: Some(path) } => {
            let bytes = read_file(path).await?;
            if !has_content_type {
                let mime = mime_guess::from_path(path).first_or_octet_stream();
                req_builder = req_builder.header(CONTENT_TYPE, mime.essence_str());
            }
            req_builder.body(bytes)
        }
        Body::File { path: None } => req_builder,
        Body::UrlEncodedForm { fields } => {
            let pairs: Vec<(&str, &str)> = fields
                .iter()
                .filter(|f| f.enabled)
                .map(|f| (f.key.as_str(), f.value.as_str()))
                .collect();
            req_builder.form(&pairs)
        }
        Body::MultipartForm { fields } => {
            let mut form = multipart::Form::new();
            for field in fields.iter().filter(|f| f.enabled) {
                form = match &field.value {
                    MultipartValue::Text(text) => form.text(field.key.clone(), text.clone()),
                    MultipartValue::File(Some(path)) => {
                        let bytes = read_file(path).await?;
                        let file_name = path
                            .file_name()
                            .map(|name| name.to_string_lossy().into_owned())
                            .unwrap_or_default();
                        let mime = mime_guess::from_path(path).first_or_octet_stream();
                        let part = multipart::Part::bytes(bytes)
                            .file_name(file_name)
                            .mime_str(mime.essence_str())
                            .map_err(|e| NetworkError::Request(e.to_string()))?;
                        form.part(field.key.clone(), part)
                    }
                    MultipartValue::File(None) => form,
                };
            }
            req_builder.multipart(form)
        }
    };

    Ok(req_builder)
}

fn classify(e: reqwest::Error) -> NetworkError {
    if e.is_timeout() {
        NetworkError::Timeout
    } else if e.is_connect() {
        NetworkError::Connect(e.to_string())
    } else if e.is_body() || e.is_decode() {
        NetworkError::Body(e.to_string())
    } else {
        NetworkError::Request(e.to_string())
    }
}

/// Execute a resolved request and return the response (buffered)
pub async fn execute_request(
    request: &Request,
    auth: Option<&Auth>,
) -> Result<HttpResponse, NetworkError> {
    let client = create_client(&request.options)?;
    let start = Instant::now();
    let req_builder = build_request(&client, request, auth).await?;

    tracing::info!(url = %request.url, method = %request.method, "Executing request");
    let resp = req_builder.send().await.map_err(|e| {
        tracing::warn!(url = %request.url, error = %e, "Request failed");
        classify(e)
    })?;

    let status = resp.status().as_u16();
    let headers = resp
        .headers()
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect();
    let body = resp.text().await.map_err(classify)?;
    let formatted = match serde_json::from_str::<serde_json::Value>(&body) {
        Ok(json) => serde_json::to_string_pretty(&json).unwrap_or(body),
        Err(_) => body,
    };
    let time_ms = start.elapsed().as_millis() as u64;
    tracing::info!(status, time_ms, "Request completed");

    Ok(HttpResponse {
        status,
        headers,
        body: formatted,
        time_ms,
    })
}

/// Same as [`execute_request`], abandoned as soon as `cancel_rx` fires
pub async fn execute_cancellable(
    request: &Request,
    auth: Option<&Auth>,
    mut cancel_rx: oneshot::Receiver<()>,
) -> Result<HttpResponse, NetworkError> {
    tokio::select! {
        biased;

        _ = &mut cancel_rx => {
            tracing::info!(url = %request.url, "Request cancelled");
            Err(NetworkError::Cancelled)
        }
        result = execute_request(request, auth) => result,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FormField, Header, MultipartField, Param};
    use mockito::Matcher;
    use std::io::Write;

    fn request(url: String) -> Request {
        let mut request = Request::new(1, "test");
        request.url = url;
        request
    }

    #[tokio::test]
    async fn test_get_with_params_headers_and_basic_auth() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/pets")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("limit".into(), "10".into()),
                Matcher::UrlEncoded("api_key".into(), "k1".into()),
            ]))
            .match_header("x-trace", "1")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id":1}"#)
            .create_async()
            .await;

        let mut req = request(format!("{}/pets", server.url()));
        req.params = vec![Param::new("limit", "10"), Param::disabled("skip", "5")];
        req.headers = vec![Header::new("X-Trace", "1")];
        let auth = Auth::ApiKey {
            key: "api_key".into(),
            value: "k1".into(),
            location: ApiKeyLocation::Param,
        };

        let resp = execute_request(&req, Some(&auth)).await.unwrap();
        assert_eq!(resp.status, 200);
        assert_eq!(resp.body, "{\n  \"id\": 1\n}");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_basic_and_bearer_headers() {
        let mut server = mockito::Server::new_async().await;
        let basic = server
            .mock("GET", "/basic")
            .match_header("authorization", "Basic dTpw")
            .create_async()
            .await;
        let bearer = server
            .mock("GET", "/bearer")
            .match_header("authorization", "Token abc")
            .create_async()
            .await;

        let auth = Auth::Basic {
            username: "u".into(),
            password: "p".into(),
        };
        execute_request(&request(format!("{}/basic", server.url())), Some(&auth))
            .await
            .unwrap();

        let auth = Auth::Bearer {
            token: "Token abc".into(),
        };
        execute_request(&request(format!("{}/bearer", server.url())), Some(&auth))
            .await
            .unwrap();

        basic.assert_async().await;
        bearer.assert_async().await;
    }

    #[tokio::test]
    async fn test_raw_body_sets_content_type() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/notes")
            .match_header("content-type", "application/json")
            .match_body(r#"{"a":1}"#)
            .with_status(201)
            .create_async()
            .await;

        let mut req = request(format!("{}/notes", server.url()));
        req.method = HttpMethod::POST;
        req.body_enabled = true;
        req.body = Body::json(r#"{"a":1}"#);

        let resp = execute_request(&req, None).await.unwrap();
        assert_eq!(resp.status, 201);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_disabled_body_is_not_sent() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/empty")
            .match_body("")
            .create_async()
            .await;

        let mut req = request(format!("{}/empty", server.url()));
        req.method = HttpMethod::POST;
        req.body = Body::json(r#"{"a":1}"#);

        execute_request(&req, None).await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_urlencoded_form() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/form")
            .match_header("content-type", "application/x-www-form-urlencoded")
            .match_body("name=rex&age=3")
            .create_async()
            .await;

        let mut req = request(format!("{}/form", server.url()));
        req.method = HttpMethod::POST;
        req.body_enabled = true;
        req.body = Body::UrlEncodedForm {
            fields: vec![
                FormField::new("name", "rex"),
                FormField::new("age", "3"),
                FormField::disabled("skip", "1"),
            ],
        };

        execute_request(&req, None).await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_multipart_with_file_part() {
        let mut file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        write!(file, "hello").unwrap();

        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/upload")
            .match_header(
                "content-type",
                Matcher::Regex("^multipart/form-data; boundary=".into()),
            )
            .match_body(Matcher::AllOf(vec![
                Matcher::Regex(r#"name="note""#.into()),
                Matcher::Regex("hello".into()),
            ]))
            .create_async()
            .await;

        let mut req = request(format!("{}/upload", server.url()));
        req.method = HttpMethod::POST;
        req.body_enabled = true;
        req.body = Body::MultipartForm {
            fields: vec![
                MultipartField::text("note", "hi"),
                MultipartField::file("doc", Some(file.path().to_path_buf())),
                MultipartField::file("missing", None),
            ],
        };

        execute_request(&req, None).await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_missing_body_file_is_an_error() {
        let mut req = request("http://127.0.0.1:9/never".to_string());
        req.method = HttpMethod::PUT;
        req.body_enabled = true;
        req.body = Body::File {
            path: Some("/definitely/not/here.bin".into()),
        };
        let err = execute_request(&req, None).await.unwrap_err();
        assert!(matches!(err, NetworkError::File { .. }));
    }

    #[tokio::test]
    async fn test_digest_is_unsupported() {
        let req = request("http://127.0.0.1:9/".to_string());
        let auth = Auth::Digest {
            username: "u".into(),
            password: "p".into(),
        };
        assert!(matches!(
            execute_request(&req, Some(&auth)).await,
            Err(NetworkError::Unsupported(_))
        ));
    }

    #[tokio::test]
    async fn test_cancel_wins_over_send() {
        let (cancel_tx, cancel_rx) = oneshot::channel();
        cancel_tx.send(()).unwrap();
        let req = request("http://127.0.0.1:9/".to_string());
        assert_eq!(
            execute_cancellable(&req, None, cancel_rx).await,
            Err(NetworkError::Cancelled)
        );
    }
}
