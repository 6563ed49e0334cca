//! core::entity
//!
//! Catalog entities and their JSON wire form.
//!
//! # Single Source of Truth
//!
//! An entity's `qualifiedName` and `name` live only in its attribute map.
//! [`Entity::qualified_name`] and [`Entity::name`] read from the map and the
//! setters write into it, so the two can never disagree. The map always holds
//! both keys as strings: construction inserts them, parsing requires them,
//! and [`Entity::set_attribute`]/[`Entity::remove_attribute`] refuse to break
//! them.
//!
//! # Wire Form
//!
//! ```text
//! {
//!   "typeName": "DataSet",
//!   "guid": -1,                     // placeholder (integer) or persisted (string)
//!   "status": null,
//!   "attributes": { "qualifiedName": "...", "name": "...", ... },
//!   "classifications": [],
//!   "relationshipAttributes": {}
//! }
//! ```
//!
//! Every key is always written. Absent auxiliary values are written as `null`
//! rather than dropped.
//!
//! # Example
//!
//! ```
//! use catalog_entities::core::entity::{Entity, JsonForm};
//! use catalog_entities::core::types::Guid;
//! use serde_json::json;
//!
//! let table = Entity::builder("DataSet", "sales.orders", "orders")
//!     .guid(Guid::placeholder(-1).unwrap())
//!     .attribute("owner", json!("sales-team"))
//!     .build();
//!
//! let full = table.to_json(JsonForm::Full);
//! assert_eq!(full["attributes"]["owner"], "sales-team");
//!
//! let minimum = table.to_json(JsonForm::Minimum);
//! assert_eq!(
//!     minimum,
//!     json!({ "typeName": "DataSet", "qualifiedName": "sales.orders", "guid": -1 })
//! );
//! ```

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::core::classification::Classification;
use crate::core::reference::{
    json_type_name, reassign_record_guid, to_minimum, to_minimum_all, EntityRef,
    MinimumReference, ReferenceError, GUID_KEY, QUALIFIED_NAME_KEY, TYPE_NAME_KEY,
};
use crate::core::types::{Guid, GuidAssignments, TypeError};

/// Key of the display name in the attribute map.
pub const NAME_KEY: &str = "name";

const STATUS_KEY: &str = "status";
const ATTRIBUTES_KEY: &str = "attributes";
const CLASSIFICATIONS_KEY: &str = "classifications";
const RELATIONSHIP_ATTRIBUTES_KEY: &str = "relationshipAttributes";

/// Errors from entity parsing and mutation.
#[derive(Debug, Error)]
pub enum EntityError {
    #[error("invalid entity JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("entity is missing required field '{0}'")]
    MissingField(&'static str),

    #[error("entity field '{field}' must be {expected}, found {found}")]
    InvalidField {
        field: &'static str,
        expected: &'static str,
        found: &'static str,
    },

    #[error("attribute '{0}' identifies the entity and cannot be removed")]
    ProtectedAttribute(String),

    #[error("invalid reference: {0}")]
    Reference(#[from] ReferenceError),

    #[error("type validation failed: {0}")]
    Type(#[from] TypeError),
}

/// Which representation [`Entity::to_json`] produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonForm {
    /// Every field of the entity
    #[default]
    Full,
    /// The three-field minimum reference
    Minimum,
}

/// A typed, identified catalog record.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    type_name: String,
    guid: Guid,
    status: Option<String>,
    attributes: Map<String, Value>,
    classifications: Option<Vec<Value>>,
    relationship_attributes: Option<Map<String, Value>>,
}

impl Entity {
    /// Create an entity with a fresh placeholder guid.
    ///
    /// Use [`Entity::builder`] to set a guid or extra fields.
    pub fn new(
        type_name: impl Into<String>,
        qualified_name: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self::builder(type_name, qualified_name, name).build()
    }

    /// Create a builder with the identity fields.
    pub fn builder(
        type_name: impl Into<String>,
        qualified_name: impl Into<String>,
        name: impl Into<String>,
    ) -> EntityBuilder {
        EntityBuilder::new(type_name, qualified_name, name)
    }

    /// Parse an entity from its JSON wire form.
    ///
    /// `typeName` and `attributes` are required, and `attributes` must hold
    /// string `qualifiedName` and `name`. `guid`, `status`,
    /// `classifications` and `relationshipAttributes` are read when present;
    /// a missing guid becomes a fresh placeholder. Unknown attributes are kept
    /// verbatim, unknown top-level fields are ignored.
    ///
    /// # Errors
    ///
    /// Returns an error when a required field is missing or a present field
    /// has the wrong JSON type.
    pub fn from_json(data: &Value) -> Result<Self, EntityError> {
        let object = data.as_object().ok_or(EntityError::InvalidField {
            field: "entity",
            expected: "an object",
            found: json_type_name(data),
        })?;

        let type_name = object
            .get(TYPE_NAME_KEY)
            .ok_or(EntityError::MissingField(TYPE_NAME_KEY))?;
        let type_name = expect_str(type_name, TYPE_NAME_KEY)?.to_string();

        let attributes = object
            .get(ATTRIBUTES_KEY)
            .ok_or(EntityError::MissingField(ATTRIBUTES_KEY))?;
        let attributes = match attributes {
            Value::Object(map) => map.clone(),
            other => {
                return Err(EntityError::InvalidField {
                    field: ATTRIBUTES_KEY,
                    expected: "an object",
                    found: json_type_name(other),
                })
            }
        };
        for key in [QUALIFIED_NAME_KEY, NAME_KEY] {
            let value = attributes
                .get(key)
                .ok_or(EntityError::MissingField(key))?;
            expect_str(value, key)?;
        }

        let guid = match object.get(GUID_KEY) {
            None | Some(Value::Null) => Guid::fresh_placeholder(),
            Some(raw) => Guid::from_json(raw)?,
        };

        let status = match object.get(STATUS_KEY) {
            None | Some(Value::Null) => None,
            Some(raw) => Some(expect_str(raw, STATUS_KEY)?.to_string()),
        };

        let classifications = match object.get(CLASSIFICATIONS_KEY) {
            None | Some(Value::Null) => None,
            Some(Value::Array(items)) => Some(items.clone()),
            Some(other) => {
                return Err(EntityError::InvalidField {
                    field: CLASSIFICATIONS_KEY,
                    expected: "an array",
                    found: json_type_name(other),
                })
            }
        };

        let relationship_attributes = match object.get(RELATIONSHIP_ATTRIBUTES_KEY) {
            None | Some(Value::Null) => None,
            Some(Value::Object(map)) => Some(map.clone()),
            Some(other) => {
                return Err(EntityError::InvalidField {
                    field: RELATIONSHIP_ATTRIBUTES_KEY,
                    expected: "an object",
                    found: json_type_name(other),
                })
            }
        };

        Ok(Self {
            type_name,
            guid,
            status,
            attributes,
            classifications,
            relationship_attributes,
        })
    }

    /// Serialize to the requested form.
    pub fn to_json(&self, form: JsonForm) -> Value {
        match form {
            JsonForm::Minimum => self.to_minimum().to_json(),
            JsonForm::Full => {
                let mut map = Map::with_capacity(6);
                map.insert(TYPE_NAME_KEY.into(), Value::String(self.type_name.clone()));
                map.insert(GUID_KEY.into(), self.guid.to_json());
                map.insert(
                    STATUS_KEY.into(),
                    self.status.clone().map_or(Value::Null, Value::String),
                );
                map.insert(
                    ATTRIBUTES_KEY.into(),
                    Value::Object(self.attributes.clone()),
                );
                map.insert(
                    CLASSIFICATIONS_KEY.into(),
                    self.classifications.clone().map_or(Value::Null, Value::Array),
                );
                map.insert(
                    RELATIONSHIP_ATTRIBUTES_KEY.into(),
                    self.relationship_attributes
                        .clone()
                        .map_or(Value::Null, Value::Object),
                );
                Value::Object(map)
            }
        }
    }

    /// The minimum reference to this entity.
    pub fn to_minimum(&self) -> MinimumReference {
        MinimumReference::new(
            self.type_name.clone(),
            self.qualified_name(),
            self.guid.clone(),
        )
    }

    /// Serialize the full form to a string, pretty-printed if `pretty`.
    pub fn to_json_string(&self, pretty: bool) -> Result<String, EntityError> {
        let text = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(text)
    }

    // =========================================================================
    // Identity
    // =========================================================================

    /// The catalog type name.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// The qualified name, read from the attribute map.
    pub fn qualified_name(&self) -> &str {
        self.identity_attribute(QUALIFIED_NAME_KEY)
    }

    /// The display name, read from the attribute map.
    pub fn name(&self) -> &str {
        self.identity_attribute(NAME_KEY)
    }

    fn identity_attribute(&self, key: &str) -> &str {
        self.attributes
            .get(key)
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    /// Set the qualified name.
    pub fn set_qualified_name(&mut self, qualified_name: impl Into<String>) {
        self.attributes.insert(
            QUALIFIED_NAME_KEY.into(),
            Value::String(qualified_name.into()),
        );
    }

    /// Set the display name.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.attributes
            .insert(NAME_KEY.into(), Value::String(name.into()));
    }

    /// The entity guid.
    pub fn guid(&self) -> &Guid {
        &self.guid
    }

    /// Replace the guid, typically once the catalog reports the persisted one.
    pub fn set_guid(&mut self, guid: Guid) {
        tracing::debug!(
            qualified_name = %self.qualified_name(),
            from = %self.guid,
            to = %guid,
            "reassigning entity guid"
        );
        self.guid = guid;
    }

    /// Check whether the entity still carries a placeholder guid.
    pub fn is_placeholder(&self) -> bool {
        self.guid.is_placeholder()
    }

    /// Swap placeholder guids for persisted ones.
    ///
    /// Rewrites the entity's own guid and any reference guids stored under
    /// `relationshipAttributes`. Returns whether anything changed.
    pub fn apply_guid_assignments(&mut self, assignments: &GuidAssignments) -> bool {
        let mut changed = false;
        if let Some(persisted) = assignments.resolve(&self.guid) {
            self.set_guid(persisted);
            changed = true;
        }
        if let Some(relationships) = self.relationship_attributes.as_mut() {
            for value in relationships.values_mut() {
                changed |= reassign_references(value, assignments);
            }
        }
        changed
    }

    /// The entity status, if known.
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    /// Set or clear the status.
    pub fn set_status(&mut self, status: Option<String>) {
        self.status = status;
    }

    // =========================================================================
    // Attributes
    // =========================================================================

    /// All attributes, including `qualifiedName` and `name`.
    pub fn attributes(&self) -> &Map<String, Value> {
        &self.attributes
    }

    /// A single attribute.
    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    /// Set an attribute, returning the previous value.
    ///
    /// # Errors
    ///
    /// Returns `EntityError::InvalidField` when setting `qualifiedName` or
    /// `name` to a non-string value.
    pub fn set_attribute(
        &mut self,
        name: impl Into<String>,
        value: Value,
    ) -> Result<Option<Value>, EntityError> {
        let name = name.into();
        if let Some(key) = identity_key(&name) {
            expect_str(&value, key)?;
        }
        Ok(self.attributes.insert(name, value))
    }

    /// Remove an attribute, returning its value.
    ///
    /// # Errors
    ///
    /// Returns `EntityError::ProtectedAttribute` for `qualifiedName` and `name`.
    pub fn remove_attribute(&mut self, name: &str) -> Result<Option<Value>, EntityError> {
        if identity_key(name).is_some() {
            return Err(EntityError::ProtectedAttribute(name.to_string()));
        }
        Ok(self.attributes.shift_remove(name))
    }

    /// Raw attribute map access for types built on an entity.
    ///
    /// Callers must not touch the identity keys.
    pub(crate) fn attributes_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.attributes
    }

    // =========================================================================
    // Classifications and relationships
    // =========================================================================

    /// Classifications as received or added, `None` if never specified.
    pub fn classifications(&self) -> Option<&[Value]> {
        self.classifications.as_deref()
    }

    /// Attach a classification.
    pub fn add_classification(
        &mut self,
        classification: Classification,
    ) -> Result<(), EntityError> {
        let value = classification.to_json()?;
        self.classifications
            .get_or_insert_with(Vec::new)
            .push(value);
        Ok(())
    }

    /// Attach several classifications in order.
    ///
    /// All are serialized before any is attached.
    pub fn add_classifications(
        &mut self,
        classifications: impl IntoIterator<Item = Classification>,
    ) -> Result<(), EntityError> {
        let values = classifications
            .into_iter()
            .map(|c| c.to_json())
            .collect::<Result<Vec<_>, _>>()?;
        self.classifications
            .get_or_insert_with(Vec::new)
            .extend(values);
        Ok(())
    }

    /// Relationship attributes, `None` if never specified.
    pub fn relationship_attributes(&self) -> Option<&Map<String, Value>> {
        self.relationship_attributes.as_ref()
    }

    /// Point relationship `name` at a single entity.
    ///
    /// The target is stored as a minimum reference and replaces any previous
    /// value of the relationship.
    pub fn add_relationship<'a>(
        &mut self,
        name: impl Into<String>,
        target: impl Into<EntityRef<'a>>,
    ) -> Result<(), ReferenceError> {
        let reference = to_minimum(target.into())?;
        self.relationship_attributes
            .get_or_insert_with(Map::new)
            .insert(name.into(), reference.to_json());
        Ok(())
    }

    /// Point relationship `name` at a list of entities.
    ///
    /// Every target is reduced before anything is stored, so a malformed
    /// target leaves the entity unchanged.
    pub fn add_relationships(
        &mut self,
        name: impl Into<String>,
        targets: &[EntityRef<'_>],
    ) -> Result<(), ReferenceError> {
        let references = to_minimum_all(targets)?;
        let list = references.into_iter().map(Value::from).collect();
        self.relationship_attributes
            .get_or_insert_with(Map::new)
            .insert(name.into(), Value::Array(list));
        Ok(())
    }
}

/// Rewrite placeholder guids in a reference or list of references.
pub(crate) fn reassign_references(value: &mut Value, assignments: &GuidAssignments) -> bool {
    if let Value::Array(items) = value {
        return items.iter_mut().fold(false, |changed, item| {
            reassign_record_guid(item, assignments) | changed
        });
    }
    reassign_record_guid(value, assignments)
}

fn identity_key(name: &str) -> Option<&'static str> {
    match name {
        QUALIFIED_NAME_KEY => Some(QUALIFIED_NAME_KEY),
        NAME_KEY => Some(NAME_KEY),
        _ => None,
    }
}

fn expect_str<'v>(value: &'v Value, field: &'static str) -> Result<&'v str, EntityError> {
    value.as_str().ok_or(EntityError::InvalidField {
        field,
        expected: "a string",
        found: json_type_name(value),
    })
}

/// Borrowed wire layout, in the key order catalogs emit.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EntityWire<'a> {
    type_name: &'a str,
    guid: &'a Guid,
    status: Option<&'a str>,
    attributes: &'a Map<String, Value>,
    classifications: Option<&'a [Value]>,
    relationship_attributes: Option<&'a Map<String, Value>>,
}

impl Serialize for Entity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        EntityWire {
            type_name: &self.type_name,
            guid: &self.guid,
            status: self.status.as_deref(),
            attributes: &self.attributes,
            classifications: self.classifications.as_deref(),
            relationship_attributes: self.relationship_attributes.as_ref(),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Entity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Entity::from_json(&value).map_err(de::Error::custom)
    }
}

/// Parse an entity from a JSON string.
///
/// # Example
///
/// ```
/// use catalog_entities::core::entity::parse_entity;
///
/// let entity = parse_entity(r#"{
///     "typeName": "DataSet",
///     "guid": "f3a2390d-f300-487e-8756-b27767e540f0",
///     "attributes": { "qualifiedName": "db.table", "name": "table" }
/// }"#).unwrap();
///
/// assert_eq!(entity.qualified_name(), "db.table");
/// assert!(!entity.is_placeholder());
/// ```
pub fn parse_entity(json: &str) -> Result<Entity, EntityError> {
    let value: Value = serde_json::from_str(json)?;
    Entity::from_json(&value)
}

/// Builder for entities with a guid or extra fields.
#[derive(Debug, Clone)]
pub struct EntityBuilder {
    type_name: String,
    qualified_name: String,
    name: String,
    guid: Option<Guid>,
    status: Option<String>,
    attributes: Map<String, Value>,
    classifications: Vec<Value>,
    relationship_attributes: Map<String, Value>,
}

impl EntityBuilder {
    /// Create a builder with the identity fields.
    pub fn new(
        type_name: impl Into<String>,
        qualified_name: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            type_name: type_name.into(),
            qualified_name: qualified_name.into(),
            name: name.into(),
            guid: None,
            status: None,
            attributes: Map::new(),
            classifications: Vec::new(),
            relationship_attributes: Map::new(),
        }
    }

    /// Set the guid. Without one, a fresh placeholder is drawn.
    pub fn guid(mut self, guid: Guid) -> Self {
        self.guid = Some(guid);
        self
    }

    /// Set the status.
    pub fn status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// Add one extra attribute.
    pub fn attribute(mut self, name: impl Into<String>, value: Value) -> Self {
        self.attributes.insert(name.into(), value);
        self
    }

    /// Merge extra attributes.
    pub fn attributes(mut self, attributes: Map<String, Value>) -> Self {
        self.attributes.extend(attributes);
        self
    }

    /// Set the opaque classification list.
    pub fn classifications(mut self, classifications: Vec<Value>) -> Self {
        self.classifications = classifications;
        self
    }

    /// Set the opaque relationship attributes.
    pub fn relationship_attributes(mut self, relationships: Map<String, Value>) -> Self {
        self.relationship_attributes = relationships;
        self
    }

    /// Build the entity.
    ///
    /// Extra attributes named `qualifiedName` or `name` are dropped in favor
    /// of the identity fields given to the builder.
    pub fn build(self) -> Entity {
        let mut attributes = Map::with_capacity(self.attributes.len() + 2);
        attributes.insert(
            QUALIFIED_NAME_KEY.into(),
            Value::String(self.qualified_name),
        );
        attributes.insert(NAME_KEY.into(), Value::String(self.name));
        for (key, value) in self.attributes {
            if identity_key(&key).is_some() {
                tracing::debug!(attribute = %key, "ignoring extra identity attribute");
                continue;
            }
            attributes.insert(key, value);
        }

        Entity {
            type_name: self.type_name,
            guid: self.guid.unwrap_or_else(Guid::fresh_placeholder),
            status: self.status,
            attributes,
            classifications: Some(self.classifications),
            relationship_attributes: Some(self.relationship_attributes),
        }
    }
}
