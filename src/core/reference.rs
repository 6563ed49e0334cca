//! core::reference
//!
//! Minimum references to catalog entities.
//!
//! # Overview
//!
//! When one entity points at another (a process input, a relationship
//! attribute) the full payload of the target is never embedded. Instead the
//! target is reduced to exactly three fields: `typeName`, `qualifiedName` and
//! `guid`. This keeps payloads small and breaks reference cycles.
//!
//! A reference can be taken from a typed [`Entity`], from an existing
//! [`MinimumReference`], or from a raw JSON record (a flat reference or a full
//! serialized entity). [`EntityRef`] names those three sources and
//! [`to_minimum`] is the single reduction rule.
//!
//! # Failure
//!
//! A raw record missing one of the three fields is an error. It is reported
//! to the caller rather than producing a partial reference.
//!
//! # Example
//!
//! ```
//! use catalog_entities::core::reference::{to_minimum, EntityRef};
//! use serde_json::json;
//!
//! let full = json!({
//!     "typeName": "DataSet",
//!     "guid": -1,
//!     "attributes": { "qualifiedName": "e1", "name": "e1", "owner": "me" }
//! });
//!
//! let reference = to_minimum(EntityRef::from(&full)).unwrap();
//! assert_eq!(
//!     reference.to_json(),
//!     json!({ "typeName": "DataSet", "qualifiedName": "e1", "guid": -1 })
//! );
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::core::entity::Entity;
use crate::core::types::{Guid, GuidAssignments, TypeError};

/// Key of the type name in every wire representation.
pub const TYPE_NAME_KEY: &str = "typeName";

/// Key of the qualified name in references and attribute maps.
pub const QUALIFIED_NAME_KEY: &str = "qualifiedName";

/// Key of the guid in every wire representation.
pub const GUID_KEY: &str = "guid";

/// Errors from building a minimum reference.
#[derive(Debug, Error, PartialEq)]
pub enum ReferenceError {
    #[error("entity reference must be a JSON object, found {found}")]
    NotAnObject { found: String },

    #[error("entity reference is missing required field '{field}'")]
    MissingField { field: &'static str },

    #[error("entity reference field '{field}' must be a {expected}")]
    InvalidField {
        field: &'static str,
        expected: &'static str,
    },

    #[error("entity reference has an invalid guid: {0}")]
    InvalidGuid(#[from] TypeError),
}

/// The three-field stand-in for an entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MinimumReference {
    /// Catalog type of the referenced entity
    pub type_name: String,
    /// Qualified name of the referenced entity
    pub qualified_name: String,
    /// Guid of the referenced entity
    pub guid: Guid,
}

impl MinimumReference {
    /// Create a reference from its parts.
    pub fn new(
        type_name: impl Into<String>,
        qualified_name: impl Into<String>,
        guid: Guid,
    ) -> Self {
        Self {
            type_name: type_name.into(),
            qualified_name: qualified_name.into(),
            guid,
        }
    }

    /// The JSON object form: exactly `typeName`, `qualifiedName`, `guid`.
    pub fn to_json(&self) -> Value {
        let mut map = Map::with_capacity(3);
        map.insert(TYPE_NAME_KEY.into(), Value::String(self.type_name.clone()));
        map.insert(
            QUALIFIED_NAME_KEY.into(),
            Value::String(self.qualified_name.clone()),
        );
        map.insert(GUID_KEY.into(), self.guid.to_json());
        Value::Object(map)
    }
}

impl From<MinimumReference> for Value {
    fn from(reference: MinimumReference) -> Self {
        reference.to_json()
    }
}

/// Anything a minimum reference can be taken from.
#[derive(Debug, Clone, Copy)]
pub enum EntityRef<'a> {
    /// A typed entity (or process)
    Entity(&'a Entity),
    /// An already-reduced reference
    Reference(&'a MinimumReference),
    /// A raw JSON record, flat or a full serialized entity
    Record(&'a Value),
}

impl<'a> From<&'a Entity> for EntityRef<'a> {
    fn from(entity: &'a Entity) -> Self {
        EntityRef::Entity(entity)
    }
}

impl<'a> From<&'a MinimumReference> for EntityRef<'a> {
    fn from(reference: &'a MinimumReference) -> Self {
        EntityRef::Reference(reference)
    }
}

impl<'a> From<&'a Value> for EntityRef<'a> {
    fn from(record: &'a Value) -> Self {
        EntityRef::Record(record)
    }
}

/// Reduce any entity source to its minimum reference.
///
/// The result is a fresh value that shares nothing with the input.
///
/// # Errors
///
/// Only [`EntityRef::Record`] can fail: when the record is not an object,
/// lacks `typeName`, `guid` or `qualifiedName`, or holds them with the wrong
/// type. `qualifiedName` is looked up at the top level, then under
/// `uniqueAttributes`, then under `attributes`.
pub fn to_minimum(source: EntityRef<'_>) -> Result<MinimumReference, ReferenceError> {
    let reference = match source {
        EntityRef::Entity(entity) => MinimumReference::new(
            entity.type_name(),
            entity.qualified_name(),
            entity.guid().clone(),
        ),
        EntityRef::Reference(reference) => reference.clone(),
        EntityRef::Record(record) => from_record(record)?,
    };
    tracing::trace!(
        type_name = %reference.type_name,
        qualified_name = %reference.qualified_name,
        guid = %reference.guid,
        "normalized entity reference"
    );
    Ok(reference)
}

/// Reduce every source in order, stopping at the first failure.
pub fn to_minimum_all(sources: &[EntityRef<'_>]) -> Result<Vec<MinimumReference>, ReferenceError> {
    sources.iter().map(|source| to_minimum(*source)).collect()
}

fn from_record(record: &Value) -> Result<MinimumReference, ReferenceError> {
    let object = record.as_object().ok_or_else(|| ReferenceError::NotAnObject {
        found: json_type_name(record).to_string(),
    })?;

    let type_name = required_str(object.get(TYPE_NAME_KEY), TYPE_NAME_KEY)?;

    let guid = object
        .get(GUID_KEY)
        .ok_or(ReferenceError::MissingField { field: GUID_KEY })?;
    let guid = Guid::from_json(guid)?;

    let qualified_name = object
        .get(QUALIFIED_NAME_KEY)
        .or_else(|| nested(object, "uniqueAttributes"))
        .or_else(|| nested(object, "attributes"));
    let qualified_name = required_str(qualified_name, QUALIFIED_NAME_KEY)?;

    Ok(MinimumReference::new(type_name, qualified_name, guid))
}

fn nested<'v>(object: &'v Map<String, Value>, container: &str) -> Option<&'v Value> {
    object.get(container)?.get(QUALIFIED_NAME_KEY)
}

fn required_str<'v>(
    value: Option<&'v Value>,
    field: &'static str,
) -> Result<&'v str, ReferenceError> {
    value
        .ok_or(ReferenceError::MissingField { field })?
        .as_str()
        .ok_or(ReferenceError::InvalidField {
            field,
            expected: "string",
        })
}

/// Name of a JSON value's type, for error messages.
pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Replace a placeholder guid inside a raw reference record.
///
/// Records without a guid, or with a guid that does not resolve, are left
/// untouched. Returns whether the record changed.
pub(crate) fn reassign_record_guid(record: &mut Value, assignments: &GuidAssignments) -> bool {
    let Some(slot) = record.get_mut(GUID_KEY) else {
        return false;
    };
    let Ok(current) = Guid::from_json(slot) else {
        return false;
    };
    match assignments.resolve(&current) {
        Some(persisted) => {
            *slot = persisted.to_json();
            true
        }
        None => false,
    }
}
