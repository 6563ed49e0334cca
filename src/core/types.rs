//! core::types
//!
//! Strong types for entity identity.
//!
//! # Types
//!
//! - [`Guid`] - Placeholder or persisted entity identifier
//! - [`GuidAssignments`] - Placeholder to persisted guid mapping returned by a catalog
//!
//! # Placeholders
//!
//! Entities that have not been created yet are referenced by a negative
//! integer guid chosen by the client. Once the catalog creates the entity it
//! reports the real guid, and the placeholder is replaced. The two kinds are
//! kept apart so a placeholder can never be mistaken for a persisted
//! identifier.
//!
//! # Examples
//!
//! ```
//! use catalog_entities::core::types::Guid;
//!
//! let pending = Guid::placeholder(-1).unwrap();
//! assert!(pending.is_placeholder());
//!
//! let stored = Guid::persisted("f3a2390d-f300-487e-8756-b27767e540f0").unwrap();
//! assert!(stored.is_persisted());
//!
//! // Placeholders must be negative
//! assert!(Guid::placeholder(0).is_err());
//! ```

use std::collections::HashMap;
use std::fmt;
use std::ops::RangeInclusive;

use rand::Rng;
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use thiserror::Error;

/// Errors from type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid placeholder guid {0}: placeholders must be negative")]
    InvalidPlaceholder(i64),

    #[error("invalid persisted guid: {0}")]
    InvalidPersisted(String),

    #[error("invalid guid value: {0}")]
    InvalidGuidValue(String),
}

/// Upper bound of the placeholders [`Guid::fresh_placeholder`] draws.
///
/// A [`GuidTracker`](crate::core::guid::GuidTracker) with the default start
/// stays above this for its first 999,999,000 allocations.
pub const FRESH_PLACEHOLDER_CEILING: i64 = -1_000_000_000;

const FRESH_PLACEHOLDER_RANGE: RangeInclusive<i64> = -1_999_999_999..=FRESH_PLACEHOLDER_CEILING;

/// An entity identifier.
///
/// A guid is either a placeholder (a negative integer chosen by the client)
/// or a persisted identifier assigned by the catalog. It remembers the JSON
/// form it was read in, so a guid parsed from the wire is written back
/// unchanged: `"-5"` stays a string and `42` stays an integer. Two guids are
/// equal when they have the same wire form.
///
/// Build guids with [`Guid::placeholder`], [`Guid::persisted`] or
/// [`Guid::from_json`]; there is no way to construct a non-negative
/// placeholder.
///
/// # Example
///
/// ```
/// use catalog_entities::core::types::Guid;
///
/// let guid: Guid = serde_json::from_str("-7").unwrap();
/// assert_eq!(guid, Guid::placeholder(-7).unwrap());
///
/// let guid: Guid = serde_json::from_str("\"-7\"").unwrap();
/// assert_eq!(guid.as_placeholder(), Some(-7));
/// assert_eq!(serde_json::to_string(&guid).unwrap(), "\"-7\"");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Guid(Repr);

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Repr {
    /// Always negative; `quoted` when the wire form is a string
    Placeholder { value: i64, quoted: bool },
    /// Persisted identifier sent as a JSON string
    Text(String),
    /// Persisted identifier sent as a non-negative JSON integer
    Number(u64),
}

impl Guid {
    /// Create a placeholder guid, written as a JSON integer.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidPlaceholder` if `value` is not negative.
    pub fn placeholder(value: i64) -> Result<Self, TypeError> {
        if value >= 0 {
            return Err(TypeError::InvalidPlaceholder(value));
        }
        Ok(Guid(Repr::Placeholder {
            value,
            quoted: false,
        }))
    }

    /// Create a persisted guid, written as a JSON string.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidPersisted` if `value` is empty or is the
    /// text of a negative integer, which the wire reads as a placeholder.
    pub fn persisted(value: impl Into<String>) -> Result<Self, TypeError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(TypeError::InvalidPersisted(
                "persisted guid cannot be empty".into(),
            ));
        }
        if value.parse::<i64>().is_ok_and(|v| v < 0) {
            return Err(TypeError::InvalidPersisted(format!(
                "'{value}' is a placeholder"
            )));
        }
        Ok(Guid(Repr::Text(value)))
    }

    /// Draw a fresh placeholder for an entity constructed without a guid.
    ///
    /// Placeholders drawn this way are not coordinated with each other. Use
    /// [`GuidTracker`](crate::core::guid::GuidTracker) when a batch needs
    /// unique placeholders.
    pub fn fresh_placeholder() -> Self {
        let value = rand::rng().random_range(FRESH_PLACEHOLDER_RANGE);
        Guid(Repr::Placeholder {
            value,
            quoted: false,
        })
    }

    /// Parse a guid from its JSON wire value.
    ///
    /// Negative integers, or strings holding one, are placeholders. Other
    /// strings and non-negative integers are persisted identifiers.
    ///
    /// # Errors
    ///
    /// Returns an error for any other JSON type, a fractional number, or an
    /// empty string.
    pub fn from_json(value: &Value) -> Result<Self, TypeError> {
        match value {
            Value::Number(n) => {
                if let Some(v) = n.as_u64() {
                    Ok(Guid(Repr::Number(v)))
                } else if let Some(v) = n.as_i64() {
                    Self::placeholder(v)
                } else {
                    Err(TypeError::InvalidGuidValue(n.to_string()))
                }
            }
            Value::String(s) => Self::from_wire_str(s),
            other => Err(TypeError::InvalidGuidValue(other.to_string())),
        }
    }

    fn from_wire_str(s: &str) -> Result<Self, TypeError> {
        match s.parse::<i64>() {
            Ok(value) if value < 0 => Ok(Guid(Repr::Placeholder {
                value,
                quoted: true,
            })),
            _ => Self::persisted(s),
        }
    }

    /// The placeholder value, if this is a placeholder.
    pub fn as_placeholder(&self) -> Option<i64> {
        match self.0 {
            Repr::Placeholder { value, .. } => Some(value),
            Repr::Text(_) | Repr::Number(_) => None,
        }
    }

    /// Check whether this guid is a placeholder.
    pub fn is_placeholder(&self) -> bool {
        matches!(self.0, Repr::Placeholder { .. })
    }

    /// Check whether this guid is a persisted identifier.
    pub fn is_persisted(&self) -> bool {
        !self.is_placeholder()
    }

    /// The JSON wire value of this guid.
    pub fn to_json(&self) -> Value {
        match &self.0 {
            Repr::Placeholder {
                value,
                quoted: false,
            } => Value::from(*value),
            Repr::Placeholder {
                value,
                quoted: true,
            } => Value::String(value.to_string()),
            Repr::Text(s) => Value::String(s.clone()),
            Repr::Number(v) => Value::from(*v),
        }
    }
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Repr::Placeholder { value, .. } => write!(f, "{}", value),
            Repr::Text(s) => f.write_str(s),
            Repr::Number(v) => write!(f, "{}", v),
        }
    }
}

impl Serialize for Guid {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match &self.0 {
            Repr::Placeholder {
                value,
                quoted: false,
            } => serializer.serialize_i64(*value),
            Repr::Placeholder {
                value,
                quoted: true,
            } => serializer.collect_str(value),
            Repr::Text(s) => serializer.serialize_str(s),
            Repr::Number(v) => serializer.serialize_u64(*v),
        }
    }
}

impl<'de> Deserialize<'de> for Guid {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct GuidVisitor;

        impl Visitor<'_> for GuidVisitor {
            type Value = Guid;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an integer or string guid")
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Guid, E> {
                match u64::try_from(v) {
                    Ok(v) => Ok(Guid(Repr::Number(v))),
                    Err(_) => Guid::placeholder(v).map_err(E::custom),
                }
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Guid, E> {
                Ok(Guid(Repr::Number(v)))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Guid, E> {
                Guid::from_wire_str(v).map_err(E::custom)
            }
        }

        deserializer.deserialize_any(GuidVisitor)
    }
}

/// Placeholder to persisted guid mapping reported by a catalog after a create call.
///
/// Keys are the placeholder guid text (e.g. `"-1001"`) exactly as the catalog
/// echoes them. A placeholder resolves whether it was written as an integer or
/// a string.
///
/// # Example
///
/// ```
/// use catalog_entities::core::types::{Guid, GuidAssignments};
/// use serde_json::json;
///
/// let response = json!({
///     "guidAssignments": { "-1001": "0f3c1a3e-0000-4000-8000-000000000001" }
/// });
/// let assignments = GuidAssignments::from_mutation_response(&response).unwrap();
///
/// let placeholder = Guid::placeholder(-1001).unwrap();
/// assert_eq!(
///     assignments.resolve(&placeholder),
///     Some(Guid::persisted("0f3c1a3e-0000-4000-8000-000000000001").unwrap())
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GuidAssignments(HashMap<String, String>);

impl GuidAssignments {
    /// Create an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `placeholder` was persisted as `persisted`.
    ///
    /// # Errors
    ///
    /// Returns an error if `placeholder` is not a placeholder guid or
    /// `persisted` is not a persisted guid.
    pub fn insert(&mut self, placeholder: &Guid, persisted: &Guid) -> Result<(), TypeError> {
        let Some(p) = placeholder.as_placeholder() else {
            return Err(TypeError::InvalidGuidValue(format!(
                "'{placeholder}' is not a placeholder"
            )));
        };
        if !persisted.is_persisted() {
            return Err(TypeError::InvalidPersisted(format!(
                "'{persisted}' is not a persisted guid"
            )));
        }
        self.0.insert(p.to_string(), persisted.to_string());
        Ok(())
    }

    /// Read the `guidAssignments` object of a mutation response.
    ///
    /// A response without `guidAssignments` yields an empty mapping.
    ///
    /// # Errors
    ///
    /// Returns an error if `guidAssignments` is present but is not an object
    /// of strings.
    pub fn from_mutation_response(response: &Value) -> Result<Self, TypeError> {
        let Some(raw) = response.get("guidAssignments") else {
            return Ok(Self::default());
        };
        let map = raw
            .as_object()
            .ok_or_else(|| TypeError::InvalidGuidValue(raw.to_string()))?;

        let mut assignments = HashMap::with_capacity(map.len());
        for (placeholder, persisted) in map {
            let persisted = persisted
                .as_str()
                .filter(|s| !s.trim().is_empty())
                .ok_or_else(|| TypeError::InvalidPersisted(persisted.to_string()))?;
            assignments.insert(placeholder.clone(), persisted.to_string());
        }
        Ok(Self(assignments))
    }

    /// Look up the persisted guid for a placeholder.
    ///
    /// Persisted guids never resolve.
    pub fn resolve(&self, guid: &Guid) -> Option<Guid> {
        let placeholder = guid.as_placeholder()?;
        let real = self.0.get(&placeholder.to_string())?;
        Some(Guid(Repr::Text(real.clone())))
    }

    /// Number of recorded assignments.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check whether no assignments are recorded.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
