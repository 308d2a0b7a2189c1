//! Typed attribute bag carried by a [`LoginResult`](crate::LoginResult).
//!
//! Keys form a closed set and each key has a fixed value kind. The kind is
//! checked when a value is inserted, so readers never have to guess.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Value shape an [`AttributeKey`] accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeKind {
    Text,
    Number,
    TextList,
}

impl fmt::Display for AttributeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Text => "text",
            Self::Number => "number",
            Self::TextList => "text list",
        })
    }
}

/// Provider-specific facts about an authenticated user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeKey {
    DisplayName,
    GivenName,
    Surname,
    Email,
    /// Login principal, e.g. a UPN.
    Principal,
    /// Backend's own numeric user id.
    NumericId,
    /// Transitive group memberships.
    Groups,
}

impl AttributeKey {
    pub const ALL: [Self; 7] = [
        Self::DisplayName,
        Self::GivenName,
        Self::Surname,
        Self::Email,
        Self::Principal,
        Self::NumericId,
        Self::Groups,
    ];

    #[must_use]
    pub const fn kind(self) -> AttributeKind {
        match self {
            Self::DisplayName | Self::GivenName | Self::Surname | Self::Email | Self::Principal => {
                AttributeKind::Text
            }
            Self::NumericId => AttributeKind::Number,
            Self::Groups => AttributeKind::TextList,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DisplayName => "display_name",
            Self::GivenName => "given_name",
            Self::Surname => "surname",
            Self::Email => "email",
            Self::Principal => "principal",
            Self::NumericId => "numeric_id",
            Self::Groups => "groups",
        }
    }
}

impl fmt::Display for AttributeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AttributeKey {
    type Err = AttributeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|key| key.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| AttributeError::UnknownKey(s.to_owned()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Text(String),
    Number(i64),
    TextList(Vec<String>),
}

impl AttributeValue {
    #[must_use]
    pub const fn kind(&self) -> AttributeKind {
        match self {
            Self::Text(_) => AttributeKind::Text,
            Self::Number(_) => AttributeKind::Number,
            Self::TextList(_) => AttributeKind::TextList,
        }
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        Self::Number(value)
    }
}

impl From<Vec<String>> for AttributeValue {
    fn from(value: Vec<String>) -> Self {
        Self::TextList(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AttributeError {
    #[error("attribute `{key}` expects a {expected} value, got {actual}")]
    KindMismatch {
        key: AttributeKey,
        expected: AttributeKind,
        actual: AttributeKind,
    },

    #[error("unknown attribute `{0}`")]
    UnknownKey(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<AttributeKey, AttributeValue>")]
pub struct Attributes(BTreeMap<AttributeKey, AttributeValue>);

impl Attributes {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// [`AttributeError::KindMismatch`] if `value` is not of `key`'s kind.
    pub fn insert(
        &mut self,
        key: AttributeKey,
        value: impl Into<AttributeValue>,
    ) -> Result<Option<AttributeValue>, AttributeError> {
        let value = value.into();
        if value.kind() != key.kind() {
            return Err(AttributeError::KindMismatch {
                key,
                expected: key.kind(),
                actual: value.kind(),
            });
        }
        Ok(self.0.insert(key, value))
    }

    /// Store a text value; returns `false` without storing when `key` is not
    /// text-valued.
    pub fn set_text(&mut self, key: AttributeKey, value: String) -> bool {
        if key.kind() != AttributeKind::Text {
            return false;
        }
        self.0.insert(key, AttributeValue::Text(value));
        true
    }

    /// Store a number; returns `false` without storing when `key` is not
    /// numeric.
    pub fn set_number(&mut self, key: AttributeKey, value: i64) -> bool {
        if key.kind() != AttributeKind::Number {
            return false;
        }
        self.0.insert(key, AttributeValue::Number(value));
        true
    }

    pub fn set_groups(&mut self, groups: Vec<String>) {
        self.0
            .insert(AttributeKey::Groups, AttributeValue::TextList(groups));
    }

    #[must_use]
    pub fn get(&self, key: AttributeKey) -> Option<&AttributeValue> {
        self.0.get(&key)
    }

    #[must_use]
    pub fn text(&self, key: AttributeKey) -> Option<&str> {
        match self.0.get(&key) {
            Some(AttributeValue::Text(v)) => Some(v),
            _ => None,
        }
    }

    #[must_use]
    pub fn number(&self, key: AttributeKey) -> Option<i64> {
        match self.0.get(&key) {
            Some(AttributeValue::Number(v)) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub fn text_list(&self, key: AttributeKey) -> Option<&[String]> {
        match self.0.get(&key) {
            Some(AttributeValue::TextList(v)) => Some(v),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn entries(&self) -> impl Iterator<Item = (AttributeKey, &AttributeValue)> {
        self.0.iter().map(|(k, v)| (*k, v))
    }
}

impl TryFrom<BTreeMap<AttributeKey, AttributeValue>> for Attributes {
    type Error = AttributeError;

    fn try_from(map: BTreeMap<AttributeKey, AttributeValue>) -> Result<Self, Self::Error> {
        let mut attrs = Self::new();
        for (key, value) in map {
            attrs.insert(key, value)?;
        }
        Ok(attrs)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn keys_parse_from_their_names() {
        for key in AttributeKey::ALL {
            assert_eq!(key.as_str().parse::<AttributeKey>(), Ok(key));
        }
        assert_eq!("Display_Name".parse(), Ok(AttributeKey::DisplayName));
        assert_eq!(
            "shoe_size".parse::<AttributeKey>(),
            Err(AttributeError::UnknownKey("shoe_size".to_owned()))
        );
    }

    #[test]
    fn insert_checks_kind() {
        let mut attrs = Attributes::new();
        attrs.insert(AttributeKey::Email, "ann@example.com").unwrap();
        attrs.insert(AttributeKey::NumericId, 42).unwrap();

        let err = attrs.insert(AttributeKey::Groups, "admins").unwrap_err();
        assert_eq!(
            err,
            AttributeError::KindMismatch {
                key: AttributeKey::Groups,
                expected: AttributeKind::TextList,
                actual: AttributeKind::Text,
            }
        );
        assert_eq!(attrs.len(), 2);
    }

    #[test]
    fn typed_getters() {
        let mut attrs = Attributes::new();
        attrs.insert(AttributeKey::DisplayName, "Ann").unwrap();
        attrs
            .insert(AttributeKey::Groups, vec!["a".to_owned(), "b".to_owned()])
            .unwrap();

        assert_eq!(attrs.text(AttributeKey::DisplayName), Some("Ann"));
        assert_eq!(attrs.number(AttributeKey::DisplayName), None);
        assert_eq!(
            attrs.text_list(AttributeKey::Groups),
            Some(["a".to_owned(), "b".to_owned()].as_slice())
        );
        assert_eq!(attrs.text(AttributeKey::Surname), None);
    }

    #[test]
    fn set_text_ignores_non_text_keys() {
        let mut attrs = Attributes::new();
        assert!(attrs.set_text(AttributeKey::Surname, "Example".to_owned()));
        assert!(!attrs.set_text(AttributeKey::NumericId, "7".to_owned()));
        assert_eq!(attrs.len(), 1);
    }

    #[test]
    fn deserialization_rejects_wrong_kind() {
        let ok: Attributes = serde_json::from_str(r#"{"numeric_id": 7, "email": "x@y"}"#).unwrap();
        assert_eq!(ok.number(AttributeKey::NumericId), Some(7));

        let bad = serde_json::from_str::<Attributes>(r#"{"numeric_id": "seven"}"#);
        assert!(bad.is_err());
    }
}
