use http::{HeaderMap, Method};

use super::SignatureError;

/// Build the signed prefix prepended to the body.
///
/// ```text
/// <METHOD> <PATH>\n
/// <name>: <value>\n      one line per required header, lowercase names, sorted
/// \n
/// ```
///
/// Header names are matched case-insensitively and duplicates in
/// `required` are collapsed.
///
/// # Errors
///
/// - [`SignatureError::MissingHeader`] if a required header is absent
/// - [`SignatureError::MalformedHeader`] if its value is not visible ASCII
pub fn canonical_prefix(
    method: &Method,
    path: &str,
    headers: &HeaderMap,
    required: &[&str],
) -> Result<Vec<u8>, SignatureError> {
    let mut names: Vec<String> = required.iter().map(|n| n.to_ascii_lowercase()).collect();
    names.sort();
    names.dedup();

    let mut prefix = format!("{} {path}\n", method.as_str());
    for name in &names {
        let value = headers
            .get(name.as_str())
            .ok_or_else(|| SignatureError::MissingHeader(name.clone()))?
            .to_str()
            .map_err(|e| SignatureError::MalformedHeader(format!("{name}: {e}")))?;
        prefix.push_str(name);
        prefix.push_str(": ");
        prefix.push_str(value);
        prefix.push('\n');
    }
    prefix.push('\n');
    Ok(prefix.into_bytes())
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use http::HeaderValue;

    use super::*;

    #[test]
    fn sorts_and_lowercases_required_headers() {
        let mut headers = HeaderMap::new();
        headers.insert("X-Date", HeaderValue::from_static("2024-01-01"));
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));
        headers.insert("X-Ignored", HeaderValue::from_static("nope"));

        let prefix =
            canonical_prefix(&Method::POST, "/v1/items", &headers, &["X-Date", "content-type"])
                .unwrap();
        assert_eq!(
            String::from_utf8(prefix).unwrap(),
            "POST /v1/items\ncontent-type: application/json\nx-date: 2024-01-01\n\n"
        );
    }

    #[test]
    fn no_required_headers_still_ends_with_blank_line() {
        let prefix = canonical_prefix(&Method::GET, "/", &HeaderMap::new(), &[]).unwrap();
        assert_eq!(prefix, b"GET /\n\n");
    }

    #[test]
    fn missing_header_is_reported() {
        let err = canonical_prefix(&Method::GET, "/", &HeaderMap::new(), &["Digest"]).unwrap_err();
        assert_eq!(err, SignatureError::MissingHeader("digest".to_owned()));
    }
}
