//! String leaves of request and auth templates

use crate::models::{Auth, AuthPreset, Body, KeyValue, MultipartField, MultipartValue, Request};

/// A template whose string leaves may contain placeholders
pub trait Resolvable: Clone {
    /// Call `f` on every string that takes part in resolution
    fn visit_strings(&mut self, f: &mut dyn FnMut(&mut String));
}

impl Resolvable for KeyValue {
    fn visit_strings(&mut self, f: &mut dyn FnMut(&mut String)) {
        f(&mut self.key);
        f(&mut self.value);
    }
}

impl Resolvable for MultipartField {
    fn visit_strings(&mut self, f: &mut dyn FnMut(&mut String)) {
        f(&mut self.key);
        if let MultipartValue::Text(text) = &mut self.value {
            f(text);
        }
    }
}

impl Resolvable for Body {
    fn visit_strings(&mut self, f: &mut dyn FnMut(&mut String)) {
        match self {
            Body::Raw { text, .. } => f(text),
            Body::File { .. } => {}
            Body::UrlEncodedForm { fields } => fields.iter_mut().for_each(|field| field.visit_strings(f)),
            Body::MultipartForm { fields } => fields.iter_mut().for_each(|field| field.visit_strings(f)),
        }
    }
}

impl Resolvable for Request {
    fn visit_strings(&mut self, f: &mut dyn FnMut(&mut String)) {
        f(&mut self.url);
        for header in &mut self.headers {
            header.visit_strings(f);
        }
        for param in &mut self.params {
            param.visit_strings(f);
        }
        self.body.visit_strings(f);
    }
}

impl Resolvable for Auth {
    fn visit_strings(&mut self, f: &mut dyn FnMut(&mut String)) {
        match self {
            Auth::Basic { username, password } | Auth::Digest { username, password } => {
                f(username);
                f(password);
            }
            Auth::Bearer { token } => f(token),
            Auth::ApiKey { key, value, .. } => {
                f(key);
                f(value);
            }
        }
    }
}

impl Resolvable for AuthPreset {
    fn visit_strings(&mut self, f: &mut dyn FnMut(&mut String)) {
        self.auth.visit_strings(f);
    }
}
