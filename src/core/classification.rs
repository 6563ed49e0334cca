//! core::classification
//!
//! Classification records attached to entities.
//!
//! Entities keep their classifications as opaque JSON so that whatever a
//! catalog returns survives a round trip. [`Classification`] is the typed way
//! to build new ones before they are added with
//! [`Entity::add_classification`](crate::core::entity::Entity::add_classification).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::core::types::Guid;

/// A classification (tag) applied to an entity.
///
/// # Example
///
/// ```
/// use catalog_entities::core::classification::Classification;
/// use serde_json::json;
///
/// let pii = Classification::new("PII").with_attribute("level", json!("high"));
/// assert_eq!(
///     pii.to_json().unwrap(),
///     json!({ "typeName": "PII", "attributes": { "level": "high" } })
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Classification {
    /// Classification type name
    pub type_name: String,

    /// Classification attributes
    #[serde(default)]
    pub attributes: Map<String, Value>,

    /// Guid of the entity the classification is attached to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_guid: Option<Guid>,

    /// Whether the classification propagates along lineage
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub propagate: Option<bool>,

    /// Whether propagated copies are removed when the source entity is deleted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remove_propagations_on_entity_delete: Option<bool>,
}

impl Classification {
    /// Create a classification with no attributes.
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            attributes: Map::new(),
            entity_guid: None,
            propagate: None,
            remove_propagations_on_entity_delete: None,
        }
    }

    /// Set an attribute.
    pub fn with_attribute(mut self, name: impl Into<String>, value: Value) -> Self {
        self.attributes.insert(name.into(), value);
        self
    }

    /// Set the owning entity guid.
    pub fn with_entity_guid(mut self, guid: Guid) -> Self {
        self.entity_guid = Some(guid);
        self
    }

    /// Set propagation along lineage.
    pub fn with_propagate(mut self, propagate: bool) -> Self {
        self.propagate = Some(propagate);
        self
    }

    /// Set removal of propagated copies on delete.
    pub fn with_remove_propagations_on_entity_delete(mut self, remove: bool) -> Self {
        self.remove_propagations_on_entity_delete = Some(remove);
        self
    }

    /// The JSON wire form, as produced by its `Serialize` impl.
    pub fn to_json(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}
