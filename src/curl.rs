//! cURL export of resolved requests

use crate::models::{ApiKeyLocation, Auth, Body, MultipartValue, Request};
use crate::query::merge_query;

/// Single-quote `value` for a POSIX shell
pub fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "'\"'\"'"))
}

/// Format a resolved request as a cURL command.
///
/// Token order is fixed: method, url (params merged in), headers, body, auth.
pub fn to_curl(request: &Request, auth: Option<&Auth>) -> String {
    let mut parts = vec![
        "curl".to_string(),
        "--request".to_string(),
        request.method.as_str().to_string(),
    ];

    // URL
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
    parts.push("--url".to_string());
    parts.push(shell_quote(&url));

    // Headers
    for header in request.headers.iter().filter(|h| h.enabled) {
        parts.push("--header".to_string());
        parts.push(shell_quote(&format!("{}: {}", header.key, header.value)));
    }

    // Body
    if request.body_enabled {
        push_body(&mut parts, &request.body);
    }

    // Auth
    match auth {
        Some(Auth::Basic { username, password }) => {
            parts.push("--user".to_string());
            parts.push(shell_quote(&format!("{}:{}", username, password)));
        }
        Some(Auth::Bearer { token }) => {
            parts.push("--header".to_string());
            parts.push(shell_quote(&format!("Authorization: {}", token)));
        }
        Some(Auth::ApiKey {
            key,
            value,
            location: ApiKeyLocation::Header,
        }) => {
            parts.push("--header".to_string());
            parts.push(shell_quote(&format!("{}: {}", key, value)));
        }
        Some(Auth::Digest { username, password }) => {
            parts.push("--digest".to_string());
            parts.push("--user".to_string());
            parts.push(shell_quote(&format!("{}:{}", username, password)));
        }
        // Already merged into the url
        Some(Auth::ApiKey { .. }) | None => {}
    }

    parts.join(" ")
}

fn push_body(parts: &mut Vec<String>, body: &Body) {
    match body {
        Body::Raw { text, .. } => {
            if !text.is_empty() {
                parts.push("--data".to_string());
                parts.push(shell_quote(text));
            }
        }
        Body::File { path } => {
            if let Some(path) = path {
                parts.push("--data".to_string());
                parts.push(shell_quote(&format!("@{}", path.display())));
            }
        }
        Body::UrlEncodedForm { fields } => {
            for field in fields.iter().filter(|f| f.enabled) {
                parts.push("--data".to_string());
                parts.push(shell_quote(&format!("{}={}", field.key, field.value)));
            }
        }
        Body::MultipartForm { fields } => {
            for field in fields.iter().filter(|f| f.enabled) {
                let arg = match &field.value {
                    MultipartValue::Text(text) => format!("{}={}", field.key, text),
                    MultipartValue::File(Some(path)) => format!("{}=@{}", field.key, path.display()),
                    MultipartValue::File(None) => continue,
                };
                parts.push("--form".to_string());
                parts.push(shell_quote(&arg));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FormField, Header, HttpMethod, MultipartField, Param};
    use std::path::PathBuf;

    fn request(url: &str) -> Request {
        let mut request = Request::new(1, "test");
        request.url = url.to_string();
        request
    }

    #[test]
    fn test_get_with_header() {
        let mut req = request("https://api.example.com/me");
        req.headers = vec![
            Header::new("Authorization", "Bearer abc"),
            Header::disabled("X-Debug", "1"),
        ];
        assert_eq!(
            to_curl(&req, None),
            "curl --request GET --url 'https://api.example.com/me' --header 'Authorization: Bearer abc'"
        );
    }

    #[test]
    fn test_params_merged_into_url() {
        let mut req = request("https://h/pets?limit=5");
        req.params = vec![
            Param::new("limit", "10"),
            Param::new("tag", "dog"),
            Param::disabled("skip", "1"),
        ];
        assert_eq!(
            to_curl(&req, None),
            "curl --request GET --url 'https://h/pets?limit=10&tag=dog'"
        );
    }

    #[test]
    fn test_raw_body_quotes_single_quotes() {
        let mut req = request("https://h/notes");
        req.method = HttpMethod::POST;
        req.body_enabled = true;
        req.body = Body::json(r#"{"note": "it's"}"#);
        assert_eq!(
            to_curl(&req, None),
            r#"curl --request POST --url 'https://h/notes' --data '{"note": "it'"'"'s"}'"#
        );
    }

    #[test]
    fn test_disabled_or_empty_body_is_omitted() {
        let mut req = request("https://h/");
        req.body = Body::json("{}");
        assert_eq!(to_curl(&req, None), "curl --request GET --url 'https://h/'");

        req.body_enabled = true;
        req.body = Body::json("");
        assert_eq!(to_curl(&req, None), "curl --request GET --url 'https://h/'");
    }

    #[test]
    fn test_form_bodies() {
        let mut req = request("https://h/upload");
        req.method = HttpMethod::POST;
        req.body_enabled = true;
        req.body = Body::UrlEncodedForm {
            fields: vec![FormField::new("a", "1"), FormField::disabled("b", "2")],
        };
        assert_eq!(
            to_curl(&req, None),
            "curl --request POST --url 'https://h/upload' --data 'a=1'"
        );

        req.body = Body::MultipartForm {
            fields: vec![
                MultipartField::text("name", "rex"),
                MultipartField::file("photo", Some(PathBuf::from("/tmp/rex.png"))),
                MultipartField::file("missing", None),
            ],
        };
        assert_eq!(
            to_curl(&req, None),
            "curl --request POST --url 'https://h/upload' --form 'name=rex' --form 'photo=@/tmp/rex.png'"
        );

        req.body = Body::File {
            path: Some(PathBuf::from("/tmp/payload.bin")),
        };
        assert_eq!(
            to_curl(&req, None),
            "curl --request POST --url 'https://h/upload' --data '@/tmp/payload.bin'"
        );
    }

    #[test]
    fn test_auth_flags_come_last() {
        let mut req = request("https://h/");
        req.headers = vec![Header::new("Accept", "*/*")];

        let basic = Auth::Basic {
            username: "u".into(),
            password: "p".into(),
        };
        assert_eq!(
            to_curl(&req, Some(&basic)),
            "curl --request GET --url 'https://h/' --header 'Accept: */*' --user 'u:p'"
        );

        let bearer = Auth::Bearer {
            token: "Bearer xyz".into(),
        };
        assert_eq!(
            to_curl(&req, Some(&bearer)),
            "curl --request GET --url 'https://h/' --header 'Accept: */*' --header 'Authorization: Bearer xyz'"
        );

        let digest = Auth::Digest {
            username: "u".into(),
            password: "p".into(),
        };
        assert_eq!(
            to_curl(&req, Some(&digest)),
            "curl --request GET --url 'https://h/' --header 'Accept: */*' --digest --user 'u:p'"
        );
    }

    #[test]
    fn test_api_key_locations() {
        let req = request("https://h/items");
        let header = Auth::ApiKey {
            key: "X-Api-Key".into(),
            value: "k1".into(),
            location: ApiKeyLocation::Header,
        };
        assert_eq!(
            to_curl(&req, Some(&header)),
            "curl --request GET --url 'https://h/items' --header 'X-Api-Key: k1'"
        );

        let param = Auth::ApiKey {
            key: "api_key".into(),
            value: "k1".into(),
            location: ApiKeyLocation::Param,
        };
        assert_eq!(
            to_curl(&req, Some(&param)),
            "curl --request GET --url 'https://h/items?api_key=k1'"
        );
    }

    #[test]
    fn test_shell_quote() {
        assert_eq!(shell_quote(""), "''");
        assert_eq!(shell_quote("a b"), "'a b'");
        assert_eq!(shell_quote("it's"), r#"'it'"'"'s'"#);
    }
}
