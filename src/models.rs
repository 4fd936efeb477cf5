use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_TIMEOUT_SECS;

/// Storage identifier
pub type Id = u64;

/// HTTP Method enum
#[allow(clippy::upper_case_acronyms)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum HttpMethod {
    #[default]
    GET,
    POST,
    PUT,
    PATCH,
    DELETE,
    HEAD,
    OPTIONS,
    TRACE,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::GET => "GET",
            HttpMethod::POST => "POST",
            HttpMethod::PUT => "PUT",
            HttpMethod::PATCH => "PATCH",
            HttpMethod::DELETE => "DELETE",
            HttpMethod::HEAD => "HEAD",
            HttpMethod::OPTIONS => "OPTIONS",
            HttpMethod::TRACE => "TRACE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpMethod::GET),
            "POST" => Ok(HttpMethod::POST),
            "PUT" => Ok(HttpMethod::PUT),
            "PATCH" => Ok(HttpMethod::PATCH),
            "DELETE" => Ok(HttpMethod::DELETE),
            "HEAD" => Ok(HttpMethod::HEAD),
            "OPTIONS" => Ok(HttpMethod::OPTIONS),
            "TRACE" => Ok(HttpMethod::TRACE),
            _ => Err(format!("Unknown HTTP method: {}", s)),
        }
    }
}

/// Enabled key/value pair. Used for headers, query params,
/// url-encoded form fields and environment variables.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyValue {
    pub enabled: bool,
    pub key: String,
    pub value: String,
}

impl KeyValue {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        KeyValue {
            enabled: true,
            key: key.into(),
            value: value.into(),
        }
    }

    /// An entry the user has to opt into
    pub fn disabled(key: impl Into<String>, value: impl Into<String>) -> Self {
        KeyValue {
            enabled: false,
            ..KeyValue::new(key, value)
        }
    }
}

pub type Header = KeyValue;
pub type Param = KeyValue;
pub type FormField = KeyValue;
pub type Variable = KeyValue;

/// Language of a raw body, drives the Content-Type sent with it
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RawLanguage {
    #[default]
    Plain,
    Json,
    Yaml,
    Html,
    Xml,
}

impl RawLanguage {
    pub fn content_type(&self) -> &'static str {
        match self {
            RawLanguage::Plain => "text/plain",
            RawLanguage::Json => "application/json",
            RawLanguage::Yaml => "application/x-yaml",
            RawLanguage::Html => "text/html",
            RawLanguage::Xml => "application/xml",
        }
    }
}

/// Value of a multipart field: either inline text or a file on disk
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum MultipartValue {
    Text(String),
    /// `None` until the user picks a file
    File(Option<PathBuf>),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultipartField {
    pub enabled: bool,
    pub key: String,
    pub value: MultipartValue,
}

impl MultipartField {
    pub fn text(key: impl Into<String>, value: impl Into<String>) -> Self {
        MultipartField {
            enabled: true,
            key: key.into(),
            value: MultipartValue::Text(value.into()),
        }
    }

    pub fn file(key: impl Into<String>, path: Option<PathBuf>) -> Self {
        MultipartField {
            enabled: true,
            key: key.into(),
            value: MultipartValue::File(path),
        }
    }

    pub fn disabled(self) -> Self {
        MultipartField {
            enabled: false,
            ..self
        }
    }
}

/// Request body. The variant is the body mode; its payload is the only one stored.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Body {
    Raw { language: RawLanguage, text: String },
    File { path: Option<PathBuf> },
    UrlEncodedForm { fields: Vec<FormField> },
    MultipartForm { fields: Vec<MultipartField> },
}

impl Body {
    pub fn json(text: impl Into<String>) -> Self {
        Body::Raw {
            language: RawLanguage::Json,
            text: text.into(),
        }
    }
}

impl Default for Body {
    fn default() -> Self {
        Body::Raw {
            language: RawLanguage::Plain,
            text: String::new(),
        }
    }
}

/// Transport options of a request
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RequestOptions {
    /// Seconds
    pub timeout: f64,
    pub follow_redirects: bool,
    pub verify_tls: bool,
}

impl Default for RequestOptions {
    fn default() -> Self {
        RequestOptions {
            timeout: DEFAULT_TIMEOUT_SECS,
            follow_redirects: false,
            verify_tls: true,
        }
    }
}

/// A single HTTP request template. Only templates are stored, never resolved values.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Request {
    pub id: Option<Id>,
    pub folder_id: Id,
    pub name: String,
    pub method: HttpMethod,
    pub url: String,
    #[serde(default)]
    pub headers: Vec<Header>,
    #[serde(default)]
    pub params: Vec<Param>,
    #[serde(default)]
    pub body_enabled: bool,
    #[serde(default)]
    pub body: Body,
    #[serde(default)]
    pub auth_enabled: bool,
    /// Auth preset applied when `auth_enabled` is set
    #[serde(default)]
    pub auth_preset_id: Option<Id>,
    #[serde(default)]
    pub options: RequestOptions,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Request {
    pub fn new(folder_id: Id, name: impl Into<String>) -> Self {
        Request {
            id: None,
            folder_id,
            name: name.into(),
            method: HttpMethod::GET,
            url: String::new(),
            headers: Vec::new(),
            params: Vec::new(),
            body_enabled: false,
            body: Body::default(),
            auth_enabled: false,
            auth_preset_id: None,
            options: RequestOptions::default(),
            created_at: None,
            updated_at: None,
        }
    }
}

/// A folder of requests. `parent_id == None` marks a root folder.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Folder {
    pub id: Option<Id>,
    pub parent_id: Option<Id>,
    pub name: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Folder {
    pub fn new(parent_id: Option<Id>, name: impl Into<String>) -> Self {
        Folder {
            id: None,
            parent_id,
            name: name.into(),
            created_at: None,
            updated_at: None,
        }
    }
}

/// Named, ordered set of variables
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Environment {
    pub id: Option<Id>,
    pub name: String,
    #[serde(default)]
    pub variables: Vec<Variable>,
}

impl Environment {
    pub fn new(name: impl Into<String>) -> Self {
        Environment {
            id: None,
            name: name.into(),
            variables: Vec::new(),
        }
    }

    pub fn with_variable(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.variables.push(Variable::new(key, value));
        self
    }

    pub fn is_global(&self) -> bool {
        self.name == crate::constants::GLOBAL_ENVIRONMENT
    }
}

/// Where an API key is sent
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiKeyLocation {
    Header,
    Param,
}

/// Authentication credentials, one variant per auth mode
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Auth {
    Basic {
        username: String,
        password: String,
    },
    /// Sent verbatim as the Authorization header value
    Bearer { token: String },
    ApiKey {
        key: String,
        value: String,
        location: ApiKeyLocation,
    },
    Digest {
        username: String,
        password: String,
    },
}

/// Reusable named credentials referenced by requests
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthPreset {
    pub id: Option<Id>,
    pub name: String,
    pub auth: Auth,
}

impl AuthPreset {
    pub fn new(name: impl Into<String>, auth: Auth) -> Self {
        AuthPreset {
            id: None,
            name: name.into(),
            auth,
        }
    }
}
