use ed25519_dalek::VerifyingKey;

use super::{AuthorizationHeader, SignatureError, SignatureVerifier};

/// Per-request state tying a parsed authorization header to its verifier
/// and, once the body is deserialized, to the payload it carried.
///
/// Created by the header phase, fed by the body phase, finished after the
/// payload is known.
#[derive(Debug)]
pub struct PartialVerification<P> {
    header: AuthorizationHeader,
    verifier: SignatureVerifier,
    payload: Option<P>,
}

impl<P> PartialVerification<P> {
    #[must_use]
    pub fn new(header: AuthorizationHeader, verifier: SignatureVerifier) -> Self {
        Self {
            header,
            verifier,
            payload: None,
        }
    }

    #[must_use]
    pub fn identifier(&self) -> &str {
        self.header.identifier()
    }

    #[must_use]
    pub fn is_awaiting_key(&self) -> bool {
        self.verifier.is_awaiting_key()
    }

    /// # Errors
    ///
    /// See [`SignatureVerifier::update`].
    pub fn feed(&mut self, chunk: &[u8]) -> Result<(), SignatureError> {
        self.verifier.update(chunk)
    }

    /// Attach the deserialized payload and, for self-signed requests, the
    /// key it disclosed.
    pub fn bind_payload(&mut self, payload: P, disclosed_key: Option<VerifyingKey>) {
        if let Some(key) = disclosed_key {
            self.verifier.provide_key(key);
        }
        self.payload = Some(payload);
    }

    /// Split into the pending check and the late-bound payload.
    #[must_use]
    pub fn into_parts(self) -> (PendingCheck, Option<P>) {
        (
            PendingCheck {
                header: self.header,
                verifier: self.verifier,
            },
            self.payload,
        )
    }
}

/// Header plus verifier, ready for the final check.
#[derive(Debug)]
pub struct PendingCheck {
    header: AuthorizationHeader,
    verifier: SignatureVerifier,
}

impl PendingCheck {
    #[must_use]
    pub fn identifier(&self) -> &str {
        self.header.identifier()
    }

    /// Run the signature check and return the verified identity with the
    /// key that proved it.
    ///
    /// # Errors
    ///
    /// See [`SignatureVerifier::check_signature`].
    pub fn check(self) -> Result<(String, VerifyingKey), SignatureError> {
        let PendingCheck { header, verifier } = self;
        let key = verifier.check_signature()?;
        Ok((header.identifier().to_owned(), key))
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use ed25519_dalek::SigningKey;

    use super::*;
    use crate::signature::sign_request;

    #[test]
    fn payload_disclosed_key_completes_verification() {
        let signer = SigningKey::from_bytes(&[11u8; 32]);
        let prefix = b"PUT /keys\n\n";
        let body = b"{\"key\":\"...\"}";
        let sig = sign_request(&signer, prefix, body).unwrap();
        let header = AuthorizationHeader::parse(
            &AuthorizationHeader::render("Signed", "device-1", &sig),
            "Signed",
        )
        .unwrap();

        let verifier = SignatureVerifier::self_signed(*header.signature(), prefix, 4096).unwrap();
        let mut partial = PartialVerification::new(header, verifier);
        partial.feed(body).unwrap();
        partial.bind_payload("decoded", Some(signer.verifying_key()));

        let (pending, payload) = partial.into_parts();
        assert_eq!(payload, Some("decoded"));
        let (identifier, key) = pending.check().unwrap();
        assert_eq!(identifier, "device-1");
        assert_eq!(key, signer.verifying_key());
    }
}
