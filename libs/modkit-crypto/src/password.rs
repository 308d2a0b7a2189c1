//! PBKDF2 password hashing.
//!
//! Hashes are stored in a self-describing form so verification needs no
//! outside knowledge of how they were produced:
//!
//! ```text
//! $<algorithm-tag>$<rounds>$<salt>$<output>
//! ```
//!
//! Salt and output are standard base64 with `+` replaced by `.` so the
//! string can be embedded in URLs without escaping.

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use rand::RngCore;
use serde::Deserialize;
use sha2::{Sha256, Sha512};
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

/// Iteration count used for newly derived hashes.
pub const DEFAULT_ROUNDS: u32 = 10_000;

/// Stored hashes claiming more rounds than this are rejected.
pub const MAX_ROUNDS: u32 = 10_000_000;

/// Salt length in bytes (128 bits).
pub const SALT_LEN: usize = 16;

const OUTPUT_LEN: usize = 32;
const MAX_OUTPUT_LEN: usize = 64;

/// PRF family behind a hash tag. Deserializes from the tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub enum HashAlgorithm {
    /// PBKDF2 with HMAC-SHA256, tagged `pbkdf2`.
    #[serde(rename = "pbkdf2")]
    Pbkdf2Sha256,
    /// PBKDF2 with HMAC-SHA512, tagged `pbkdf2-sha512`.
    #[serde(rename = "pbkdf2-sha512")]
    Pbkdf2Sha512,
}

impl HashAlgorithm {
    /// Tag written between the first two `$` separators.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Pbkdf2Sha256 => "pbkdf2",
            Self::Pbkdf2Sha512 => "pbkdf2-sha512",
        }
    }

    /// Resolve a stored tag. Unknown tags yield `None`.
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "pbkdf2" => Some(Self::Pbkdf2Sha256),
            "pbkdf2-sha512" => Some(Self::Pbkdf2Sha512),
            _ => None,
        }
    }

    fn derive(self, password: &[u8], salt: &[u8], rounds: u32, out: &mut [u8]) {
        match self {
            Self::Pbkdf2Sha256 => pbkdf2::pbkdf2_hmac::<Sha256>(password, salt, rounds, out),
            Self::Pbkdf2Sha512 => pbkdf2::pbkdf2_hmac::<Sha512>(password, salt, rounds, out),
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// A password hash in its persisted string form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashedCredential(String);

impl HashedCredential {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for HashedCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<HashedCredential> for String {
    fn from(value: HashedCredential) -> Self {
        value.0
    }
}

/// Parsed components of a stored hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashParams {
    pub algorithm: HashAlgorithm,
    pub rounds: u32,
    pub salt: Vec<u8>,
    pub output: Vec<u8>,
}

impl HashParams {
    /// Parse a stored hash string.
    ///
    /// Returns `None` for anything malformed: wrong segment count, unknown
    /// tag, rounds outside `1..=MAX_ROUNDS`, undecodable or empty segments.
    #[must_use]
    pub fn parse(stored: &str) -> Option<Self> {
        let mut parts = stored.split('$');
        if !parts.next()?.is_empty() {
            return None;
        }
        let algorithm = HashAlgorithm::from_tag(parts.next()?)?;
        let rounds: u32 = parts.next()?.parse().ok()?;
        let salt = decode_segment(parts.next()?)?;
        let output = decode_segment(parts.next()?)?;
        if parts.next().is_some() {
            return None;
        }
        if rounds == 0 || rounds > MAX_ROUNDS {
            return None;
        }
        if salt.is_empty() || output.is_empty() || output.len() > MAX_OUTPUT_LEN {
            return None;
        }
        Some(Self {
            algorithm,
            rounds,
            salt,
            output,
        })
    }
}

/// Derives and verifies password hashes.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    algorithm: HashAlgorithm,
    rounds: u32,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self {
            algorithm: HashAlgorithm::Pbkdf2Sha256,
            rounds: DEFAULT_ROUNDS,
        }
    }
}

impl PasswordHasher {
    /// Build a hasher for new hashes. `rounds` is clamped to `1..=MAX_ROUNDS`.
    #[must_use]
    pub fn new(algorithm: HashAlgorithm, rounds: u32) -> Self {
        Self {
            algorithm,
            rounds: rounds.clamp(1, MAX_ROUNDS),
        }
    }

    #[must_use]
    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    #[must_use]
    pub fn rounds(&self) -> u32 {
        self.rounds
    }

    /// Hash `password` under a fresh random salt.
    ///
    /// Two calls with the same password produce different strings; both
    /// verify.
    #[must_use]
    pub fn derive_hash(&self, password: &str) -> HashedCredential {
        let mut salt = [0u8; SALT_LEN];
        rand::rng().fill_bytes(&mut salt);

        let mut output = Zeroizing::new([0u8; OUTPUT_LEN]);
        self.algorithm
            .derive(password.as_bytes(), &salt, self.rounds, output.as_mut_slice());

        HashedCredential(format!(
            "${}${}${}${}",
            self.algorithm.tag(),
            self.rounds,
            encode_segment(&salt),
            encode_segment(output.as_slice()),
        ))
    }

    /// Check `password` against a stored hash.
    ///
    /// Fails closed: malformed, empty or unknown-algorithm input returns
    /// `false`. The stored algorithm and rounds are honoured regardless of
    /// this hasher's own settings.
    #[must_use]
    pub fn verify(&self, password: &str, stored: &str) -> bool {
        let Some(params) = HashParams::parse(stored) else {
            tracing::debug!("stored password hash is malformed");
            return false;
        };

        let mut candidate = Zeroizing::new(vec![0u8; params.output.len()]);
        params.algorithm.derive(
            password.as_bytes(),
            &params.salt,
            params.rounds,
            candidate.as_mut_slice(),
        );

        candidate.as_slice().ct_eq(&params.output).into()
    }

    /// Whether a stored hash should be re-derived with this hasher's
    /// settings on the next successful login.
    #[must_use]
    pub fn needs_rehash(&self, stored: &str) -> bool {
        HashParams::parse(stored)
            .is_none_or(|p| p.algorithm != self.algorithm || p.rounds < self.rounds)
    }
}

/// Hash with the default hasher.
#[must_use]
pub fn derive_hash(password: &str) -> HashedCredential {
    PasswordHasher::default().derive_hash(password)
}

/// Verify with the default hasher.
#[must_use]
pub fn verify(password: &str, stored: &str) -> bool {
    PasswordHasher::default().verify(password, stored)
}

fn encode_segment(bytes: &[u8]) -> String {
    STANDARD.encode(bytes).replace('+', ".")
}

fn decode_segment(segment: &str) -> Option<Vec<u8>> {
    STANDARD.decode(segment.replace('.', "+")).ok()
}
