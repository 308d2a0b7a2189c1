use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use ed25519_dalek::Signature;

use super::SignatureError;

/// Parsed `Authorization: <SCHEME> <identifier>:<base64-signature>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationHeader {
    scheme: String,
    identifier: String,
    signature: Signature,
}

impl AuthorizationHeader {
    /// Parse a header value, requiring `expected_scheme` (case-insensitive).
    ///
    /// The identifier may itself contain `:`; the signature is everything
    /// after the last one.
    ///
    /// # Errors
    ///
    /// - [`SignatureError::UnsupportedScheme`] for another scheme
    /// - [`SignatureError::MalformedHeader`] for a missing identifier,
    ///   undecodable base64 or a signature of the wrong length
    pub fn parse(value: &str, expected_scheme: &str) -> Result<Self, SignatureError> {
        let (scheme, credentials) = value
            .trim()
            .split_once(' ')
            .ok_or_else(|| SignatureError::MalformedHeader("missing scheme".to_owned()))?;
        if !scheme.eq_ignore_ascii_case(expected_scheme) {
            return Err(SignatureError::UnsupportedScheme(scheme.to_owned()));
        }

        let (identifier, encoded) = credentials
            .trim()
            .rsplit_once(':')
            .ok_or_else(|| SignatureError::MalformedHeader("missing ':' separator".to_owned()))?;
        if identifier.is_empty() {
            return Err(SignatureError::MalformedHeader("empty identifier".to_owned()));
        }

        let bytes = STANDARD
            .decode(encoded)
            .map_err(|e| SignatureError::MalformedHeader(format!("signature encoding: {e}")))?;
        let signature = Signature::from_slice(&bytes)
            .map_err(|e| SignatureError::MalformedHeader(format!("signature bytes: {e}")))?;

        Ok(Self {
            scheme: scheme.to_owned(),
            identifier: identifier.to_owned(),
            signature,
        })
    }

    /// Render a header value for a client request.
    #[must_use]
    pub fn render(scheme: &str, identifier: &str, signature: &Signature) -> String {
        format!(
            "{scheme} {identifier}:{}",
            STANDARD.encode(signature.to_bytes())
        )
    }

    #[must_use]
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    #[must_use]
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    #[must_use]
    pub fn signature(&self) -> &Signature {
        &self.signature
    }
}
