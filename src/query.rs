//! Query string merging for request URLs

use url::form_urlencoded;

/// Merge `pairs` into the query of `url`.
///
/// A key already present in the URL keeps its position and takes the new
/// value; new keys are appended in order. The rest of the URL is left as
/// written, so unresolved placeholders survive.
pub fn merge_query<'a>(url: &str, pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> String {
    let pairs: Vec<(&str, &str)> = pairs.into_iter().collect();
    if pairs.is_empty() {
        return url.to_string();
    }

    let (without_fragment, fragment) = match url.split_once('#') {
        Some((head, fragment)) => (head, Some(fragment)),
        None => (url, None),
    };
    let (base, query) = match without_fragment.split_once('?') {
        Some((base, query)) => (base, query),
        None => (without_fragment, ""),
    };

    // Existing segments stay as written; only merged keys are re-encoded
    let mut segments: Vec<String> = query
        .split('&')
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .collect();
    for (key, value) in pairs {
        let encoded = form_urlencoded::Serializer::new(String::new())
            .append_pair(key, value)
            .finish();
        let mut replaced = false;
        segments.retain_mut(|segment| {
            if segment_key(segment).as_deref() != Some(key) {
                return true;
            }
            if replaced {
                return false;
            }
            *segment = encoded.clone();
            replaced = true;
            true
        });
        if !replaced {
            segments.push(encoded);
        }
    }
    let query = segments.join("&");

    let mut out = format!("{}?{}", base, query);
    if let Some(fragment) = fragment {
        out.push('#');
        out.push_str(fragment);
    }
    out
}

/// Decoded key of one `key=value` segment
fn segment_key(segment: &str) -> Option<String> {
    form_urlencoded::parse(segment.as_bytes())
        .next()
        .map(|(key, _)| key.into_owned())
}
