//! core::process
//!
//! Lineage processes: entities with ordered inputs and outputs.
//!
//! # Inputs and Outputs
//!
//! A process keeps its lineage in the attribute map under `inputs` and
//! `outputs`, like every other attribute. Each list has two distinct states:
//!
//! - `null` - unspecified; the catalog keeps whatever it already has
//! - an array - specified, possibly empty
//!
//! Lists built here hold only minimum references. Lists read from a catalog
//! response are kept exactly as received.
//!
//! # Example
//!
//! ```
//! use catalog_entities::core::entity::{Entity, JsonForm};
//! use catalog_entities::core::process::Process;
//! use catalog_entities::core::reference::EntityRef;
//! use catalog_entities::core::types::Guid;
//!
//! let raw = Entity::builder("DataSet", "raw.events", "events")
//!     .guid(Guid::placeholder(-1).unwrap())
//!     .build();
//! let clean = Entity::builder("DataSet", "clean.events", "events")
//!     .guid(Guid::placeholder(-2).unwrap())
//!     .build();
//!
//! let job = Process::new(
//!     "Process",
//!     "jobs.clean_events",
//!     "clean_events",
//!     Some(&[EntityRef::from(&raw)]),
//!     Some(&[EntityRef::from(&clean)]),
//! )
//! .unwrap();
//!
//! let json = job.to_json(JsonForm::Full);
//! assert_eq!(json["attributes"]["inputs"][0]["qualifiedName"], "raw.events");
//! assert_eq!(json["attributes"]["outputs"][0]["guid"], -2);
//! ```

use std::ops::Deref;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use thiserror::Error;

use crate::core::classification::Classification;
use crate::core::entity::{reassign_references, Entity, EntityError};
use crate::core::reference::{
    json_type_name, to_minimum, to_minimum_all, EntityRef, MinimumReference, ReferenceError,
};
use crate::core::types::{Guid, GuidAssignments};

/// Attribute holding the process inputs.
pub const INPUTS_KEY: &str = "inputs";

/// Attribute holding the process outputs.
pub const OUTPUTS_KEY: &str = "outputs";

/// Errors from process construction, parsing and lineage mutation.
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error(transparent)]
    Entity(#[from] EntityError),

    #[error("invalid lineage reference: {0}")]
    Reference(#[from] ReferenceError),

    #[error("process attribute '{field}' must be null or an array, found {found}")]
    InvalidLineage {
        field: &'static str,
        found: &'static str,
    },

    #[error("'{0}' can only be changed through the process lineage methods")]
    LineageAttribute(&'static str),
}

/// A lineage node: an entity with inputs and outputs.
#[derive(Debug, Clone, PartialEq)]
pub struct Process {
    entity: Entity,
}

impl Process {
    /// Create a process with a fresh placeholder guid.
    ///
    /// `None` leaves a list unspecified. `Some` stores the minimum reference of
    /// every element in order, including the empty case.
    ///
    /// # Errors
    ///
    /// Returns `ProcessError::Reference` if any element cannot be reduced.
    pub fn new(
        type_name: impl Into<String>,
        qualified_name: impl Into<String>,
        name: impl Into<String>,
        inputs: Option<&[EntityRef<'_>]>,
        outputs: Option<&[EntityRef<'_>]>,
    ) -> Result<Self, ProcessError> {
        Self::from_entity(Entity::new(type_name, qualified_name, name), inputs, outputs)
    }

    /// Turn an entity into a process with the given lineage.
    ///
    /// Any `inputs`/`outputs` attributes already on the entity are replaced.
    pub fn from_entity(
        entity: Entity,
        inputs: Option<&[EntityRef<'_>]>,
        outputs: Option<&[EntityRef<'_>]>,
    ) -> Result<Self, ProcessError> {
        let inputs = normalize(inputs)?;
        let outputs = normalize(outputs)?;

        let mut process = Self { entity };
        let attributes = process.entity.attributes_mut();
        attributes.insert(INPUTS_KEY.into(), inputs);
        attributes.insert(OUTPUTS_KEY.into(), outputs);
        Ok(process)
    }

    /// Parse a process from its JSON wire form.
    ///
    /// `inputs` and `outputs` are kept exactly as received: no reduction and
    /// no reordering.
    ///
    /// # Errors
    ///
    /// Returns an error for anything [`Entity::from_json`] rejects, or when
    /// `inputs`/`outputs` are present but neither `null` nor an array.
    pub fn from_json(data: &Value) -> Result<Self, ProcessError> {
        let entity = Entity::from_json(data)?;
        Self::try_from(entity)
    }

    /// The process inputs, `None` when unspecified.
    pub fn inputs(&self) -> Option<&[Value]> {
        self.lineage(INPUTS_KEY)
    }

    /// The process outputs, `None` when unspecified.
    pub fn outputs(&self) -> Option<&[Value]> {
        self.lineage(OUTPUTS_KEY)
    }

    fn lineage(&self, key: &str) -> Option<&[Value]> {
        self.entity
            .attribute(key)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
    }

    /// Append one input.
    ///
    /// An unspecified input list becomes specified.
    pub fn add_input<'a>(&mut self, source: impl Into<EntityRef<'a>>) -> Result<(), ProcessError> {
        let reference = to_minimum(source.into())?;
        self.append(INPUTS_KEY, vec![reference])
    }

    /// Append several inputs in order.
    ///
    /// Every source is reduced first; on failure the process is unchanged.
    pub fn add_inputs(&mut self, sources: &[EntityRef<'_>]) -> Result<(), ProcessError> {
        let references = to_minimum_all(sources)?;
        self.append(INPUTS_KEY, references)
    }

    /// Append one output.
    ///
    /// An unspecified output list becomes specified.
    pub fn add_output<'a>(&mut self, source: impl Into<EntityRef<'a>>) -> Result<(), ProcessError> {
        let reference = to_minimum(source.into())?;
        self.append(OUTPUTS_KEY, vec![reference])
    }

    /// Append several outputs in order.
    ///
    /// Every source is reduced first; on failure the process is unchanged.
    pub fn add_outputs(&mut self, sources: &[EntityRef<'_>]) -> Result<(), ProcessError> {
        let references = to_minimum_all(sources)?;
        self.append(OUTPUTS_KEY, references)
    }

    /// Replace the whole input list. `None` makes it unspecified.
    pub fn set_inputs(&mut self, sources: Option<&[EntityRef<'_>]>) -> Result<(), ProcessError> {
        let inputs = normalize(sources)?;
        self.entity
            .attributes_mut()
            .insert(INPUTS_KEY.into(), inputs);
        Ok(())
    }

    /// Replace the whole output list. `None` makes it unspecified.
    pub fn set_outputs(&mut self, sources: Option<&[EntityRef<'_>]>) -> Result<(), ProcessError> {
        let outputs = normalize(sources)?;
        self.entity
            .attributes_mut()
            .insert(OUTPUTS_KEY.into(), outputs);
        Ok(())
    }

    fn append(
        &mut self,
        key: &'static str,
        references: Vec<MinimumReference>,
    ) -> Result<(), ProcessError> {
        let added = references.len();
        let slot = self
            .entity
            .attributes_mut()
            .entry(key)
            .or_insert(Value::Null);
        if slot.is_null() {
            *slot = Value::Array(Vec::with_capacity(added));
        }
        let found = json_type_name(slot);
        let items = slot
            .as_array_mut()
            .ok_or(ProcessError::InvalidLineage { field: key, found })?;
        items.extend(references.into_iter().map(Value::from));

        tracing::debug!(
            process = %self.entity.qualified_name(),
            field = key,
            added,
            "extended process lineage"
        );
        Ok(())
    }

    /// Swap placeholder guids for persisted ones.
    ///
    /// Covers the process guid, its relationship references, and every
    /// input and output reference. Returns whether anything changed.
    pub fn apply_guid_assignments(&mut self, assignments: &GuidAssignments) -> bool {
        let mut changed = self.entity.apply_guid_assignments(assignments);
        let attributes = self.entity.attributes_mut();
        for key in [INPUTS_KEY, OUTPUTS_KEY] {
            if let Some(list) = attributes.get_mut(key) {
                changed |= reassign_references(list, assignments);
            }
        }
        changed
    }

    /// The underlying entity.
    pub fn as_entity(&self) -> &Entity {
        &self.entity
    }

    // =========================================================================
    // Entity fields
    // =========================================================================

    /// Set a non-lineage attribute, returning the previous value.
    ///
    /// # Errors
    ///
    /// Returns `ProcessError::LineageAttribute` for `inputs` and `outputs`,
    /// and anything [`Entity::set_attribute`] rejects.
    pub fn set_attribute(
        &mut self,
        name: impl Into<String>,
        value: Value,
    ) -> Result<Option<Value>, ProcessError> {
        let name = name.into();
        if let Some(key) = lineage_key(&name) {
            return Err(ProcessError::LineageAttribute(key));
        }
        Ok(self.entity.set_attribute(name, value)?)
    }

    /// Remove a non-lineage attribute, returning its value.
    ///
    /// Use [`set_inputs`](Self::set_inputs) with `None` to unspecify lineage.
    pub fn remove_attribute(&mut self, name: &str) -> Result<Option<Value>, ProcessError> {
        if let Some(key) = lineage_key(name) {
            return Err(ProcessError::LineageAttribute(key));
        }
        Ok(self.entity.remove_attribute(name)?)
    }

    /// Set the qualified name.
    pub fn set_qualified_name(&mut self, qualified_name: impl Into<String>) {
        self.entity.set_qualified_name(qualified_name);
    }

    /// Set the display name.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.entity.set_name(name);
    }

    /// Replace the guid.
    pub fn set_guid(&mut self, guid: Guid) {
        self.entity.set_guid(guid);
    }

    /// Set or clear the status.
    pub fn set_status(&mut self, status: Option<String>) {
        self.entity.set_status(status);
    }

    /// Attach a classification.
    pub fn add_classification(
        &mut self,
        classification: Classification,
    ) -> Result<(), ProcessError> {
        Ok(self.entity.add_classification(classification)?)
    }

    /// Attach several classifications in order.
    pub fn add_classifications(
        &mut self,
        classifications: impl IntoIterator<Item = Classification>,
    ) -> Result<(), ProcessError> {
        Ok(self.entity.add_classifications(classifications)?)
    }

    /// Point relationship `name` at a single entity.
    pub fn add_relationship<'a>(
        &mut self,
        name: impl Into<String>,
        target: impl Into<EntityRef<'a>>,
    ) -> Result<(), ProcessError> {
        Ok(self.entity.add_relationship(name, target)?)
    }

    /// Point relationship `name` at a list of entities.
    pub fn add_relationships(
        &mut self,
        name: impl Into<String>,
        targets: &[EntityRef<'_>],
    ) -> Result<(), ProcessError> {
        Ok(self.entity.add_relationships(name, targets)?)
    }

    /// Unwrap into the underlying entity.
    pub fn into_entity(self) -> Entity {
        self.entity
    }
}

fn lineage_key(name: &str) -> Option<&'static str> {
    match name {
        INPUTS_KEY => Some(INPUTS_KEY),
        OUTPUTS_KEY => Some(OUTPUTS_KEY),
        _ => None,
    }
}

fn normalize(sources: Option<&[EntityRef<'_>]>) -> Result<Value, ReferenceError> {
    match sources {
        None => Ok(Value::Null),
        Some(sources) => {
            let references = to_minimum_all(sources)?;
            Ok(Value::Array(
                references.into_iter().map(Value::from).collect(),
            ))
        }
    }
}

impl Deref for Process {
    type Target = Entity;

    fn deref(&self) -> &Entity {
        &self.entity
    }
}

impl<'a> From<&'a Process> for EntityRef<'a> {
    fn from(process: &'a Process) -> Self {
        EntityRef::Entity(&process.entity)
    }
}

impl TryFrom<Entity> for Process {
    type Error = ProcessError;

    /// Wrap an entity, keeping its lineage attributes as they are.
    fn try_from(entity: Entity) -> Result<Self, ProcessError> {
        for key in [INPUTS_KEY, OUTPUTS_KEY] {
            match entity.attribute(key) {
                None | Some(Value::Null) | Some(Value::Array(_)) => {}
                Some(other) => {
                    return Err(ProcessError::InvalidLineage {
                        field: key,
                        found: json_type_name(other),
                    })
                }
            }
        }
        Ok(Self { entity })
    }
}

impl Serialize for Process {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.entity.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Process {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Process::from_json(&value).map_err(de::Error::custom)
    }
}

/// Parse a process from a JSON string.
pub fn parse_process(json: &str) -> Result<Process, ProcessError> {
    let value: Value = serde_json::from_str(json).map_err(EntityError::from)?;
    Process::from_json(&value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::entity::JsonForm;
    use serde_json::json;

    fn dataset(qualified_name: &str, guid: i64) -> Entity {
        Entity::builder("DataSet", qualified_name, qualified_name)
            .guid(Guid::placeholder(guid).unwrap())
            .attribute("owner", json!("data-team"))
            .build()
    }

    fn empty_process() -> Process {
        Process::new("Process", "test", "test", Some(&[]), Some(&[])).unwrap()
    }

    fn all_minimal(list: &[Value]) -> bool {
        list.iter()
            .all(|item| item.as_object().is_some_and(|o| o.len() == 3))
    }

    mod construction {
        use super::*;

        #[test]
        fn unspecified_lineage_stays_null() {
            let process = Process::new("Process", "test", "test", None, None).unwrap();

            assert_eq!(process.attribute("inputs"), Some(&Value::Null));
            assert_eq!(process.attribute("outputs"), Some(&Value::Null));
            assert_eq!(process.inputs(), None);
            assert_eq!(process.outputs(), None);

            let json = process.to_json(JsonForm::Full);
            assert_eq!(json["attributes"]["inputs"], Value::Null);
            assert_eq!(json["attributes"]["outputs"], Value::Null);
        }

        #[test]
        fn empty_lineage_is_specified() {
            let process = empty_process();

            assert_eq!(process.inputs(), Some(&[][..]));
            assert_eq!(process.to_json(JsonForm::Full)["attributes"]["outputs"], json!([]));
        }

        #[test]
        fn mixed_sources_are_minimized() {
            let e1 = dataset("e1", -1);
            let e2 = dataset("e2", -2);
            let e2_min = e2.to_json(JsonForm::Minimum);

            let process = Process::new(
                "Process",
                "test",
                "test",
                Some(&[EntityRef::from(&e1)]),
                Some(&[EntityRef::from(&e2_min)]),
            )
            .unwrap();

            let inputs = process.inputs().unwrap();
            let outputs = process.outputs().unwrap();
            assert_eq!(inputs.len(), 1);
            assert_eq!(outputs.len(), 1);
            assert!(all_minimal(inputs));
            assert!(all_minimal(outputs));
            assert_eq!(
                inputs[0],
                json!({"typeName": "DataSet", "qualifiedName": "e1", "guid": -1})
            );
        }

        #[test]
        fn full_serialized_entity_is_minimized() {
            let e1 = dataset("e1", -1);
            let full = e1.to_json(JsonForm::Full);
            let process =
                Process::new("Process", "p", "p", Some(&[EntityRef::from(&full)]), None).unwrap();

            assert!(all_minimal(process.inputs().unwrap()));
        }

        #[test]
        fn same_entity_as_input_and_output() {
            let e1 = dataset("e1", -1);
            let source = [EntityRef::from(&e1)];
            let process = Process::new("Process", "p", "p", Some(&source), Some(&source)).unwrap();

            assert_eq!(process.inputs(), process.outputs());
        }

        #[test]
        fn malformed_source_fails() {
            let bad = json!({"guid": "123"});
            let result = Process::new("Process", "p", "p", Some(&[EntityRef::from(&bad)]), None);

            assert!(matches!(
                result,
                Err(ProcessError::Reference(ReferenceError::MissingField {
                    field: "typeName"
                }))
            ));
        }

        #[test]
        fn from_entity_keeps_extra_attributes() {
            let entity = Entity::builder("spark_job", "jobs.etl", "etl")
                .attribute("schedule", json!("@daily"))
                .build();
            let process = Process::from_entity(entity, None, Some(&[])).unwrap();

            assert_eq!(process.type_name(), "spark_job");
            assert_eq!(process.attribute("schedule"), Some(&json!("@daily")));
            assert_eq!(process.outputs(), Some(&[][..]));
        }
    }

    mod add_lineage {
        use super::*;

        #[test]
        fn stored_reference_keeps_guid_wire_form() {
            let quoted = json!({"typeName": "DataSet", "qualifiedName": "e3", "guid": "-3"});
            let numeric = json!({"typeName": "DataSet", "qualifiedName": "e4", "guid": 4});
            let mut process = empty_process();
            process.add_input(&quoted).unwrap();
            process.add_output(&numeric).unwrap();

            assert_eq!(process.inputs().unwrap()[0], quoted);
            assert_eq!(process.outputs().unwrap()[0], numeric);
        }

        #[test]
        fn add_input_grows_by_one() {
            let e1 = dataset("e1", -1);
            let mut process = empty_process();
            process.add_input(&e1).unwrap();

            assert_eq!(process.inputs().unwrap().len(), 1);
            assert!(all_minimal(process.inputs().unwrap()));
        }

        #[test]
        fn add_outputs_keeps_order() {
            let e2 = dataset("e2", -2);
            let e3 = dataset("e3", -2);
            let e3_min = e3.to_json(JsonForm::Minimum);
            let mut process = empty_process();
            process
                .add_outputs(&[EntityRef::from(&e2), EntityRef::from(&e3_min)])
                .unwrap();

            let outputs = process.outputs().unwrap();
            assert_eq!(outputs.len(), 2);
            assert!(all_minimal(outputs));
            assert_eq!(outputs[0]["qualifiedName"], "e2");
            assert_eq!(outputs[1]["qualifiedName"], "e3");
        }

        #[test]
        fn add_to_unspecified_initializes() {
            let e1 = dataset("e1", -1);
            let mut process = Process::new("Process", "p", "p", None, None).unwrap();
            process.add_input(&e1).unwrap();

            assert_eq!(process.inputs().unwrap().len(), 1);
            assert_eq!(process.outputs(), None);
        }

        #[test]
        fn add_accepts_references_and_processes() {
            let upstream = Process::new("Process", "upstream", "upstream", None, None).unwrap();
            let reference = MinimumReference::new("DataSet", "e9", Guid::placeholder(-9).unwrap());
            let mut process = empty_process();
            process.add_input(&upstream).unwrap();
            process.add_input(&reference).unwrap();

            let inputs = process.inputs().unwrap();
            assert_eq!(inputs[0]["typeName"], "Process");
            assert_eq!(inputs[1]["qualifiedName"], "e9");
        }

        #[test]
        fn failed_batch_leaves_process_unchanged() {
            let e1 = dataset("e1", -1);
            let bad = json!({"typeName": "DataSet", "guid": -5});
            let mut process = empty_process();

            let result = process.add_inputs(&[EntityRef::from(&e1), EntityRef::from(&bad)]);

            assert!(result.is_err());
            assert_eq!(process.inputs(), Some(&[][..]));
        }

        #[test]
        fn lineage_cannot_be_written_as_attribute() {
            let e1 = dataset("e1", -1);
            let mut process = empty_process();
            process.add_input(&e1).unwrap();

            assert!(matches!(
                process.set_attribute("inputs", json!([{"guid": "raw"}])),
                Err(ProcessError::LineageAttribute("inputs"))
            ));
            assert!(matches!(
                process.set_attribute("outputs", json!("oops")),
                Err(ProcessError::LineageAttribute("outputs"))
            ));
            assert!(matches!(
                process.remove_attribute("outputs"),
                Err(ProcessError::LineageAttribute("outputs"))
            ));
            assert_eq!(process.inputs().unwrap().len(), 1);
            assert!(all_minimal(process.inputs().unwrap()));
            assert_eq!(process.outputs(), Some(&[][..]));
        }

        #[test]
        fn other_attributes_pass_through() {
            let mut process = empty_process();
            process.set_attribute("owner", json!("etl")).unwrap();
            process.set_status(Some("ACTIVE".into()));

            assert_eq!(process.attribute("owner"), Some(&json!("etl")));
            assert_eq!(process.remove_attribute("owner").unwrap(), Some(json!("etl")));
            assert!(matches!(
                process.remove_attribute("qualifiedName"),
                Err(ProcessError::Entity(EntityError::ProtectedAttribute(_)))
            ));
            assert_eq!(process.status(), Some("ACTIVE"));
        }

        #[test]
        fn set_inputs_replaces() {
            let e1 = dataset("e1", -1);
            let e2 = dataset("e2", -2);
            let mut process = empty_process();
            process.add_input(&e1).unwrap();

            process.set_inputs(Some(&[EntityRef::from(&e2)])).unwrap();
            assert_eq!(process.inputs().unwrap().len(), 1);
            assert_eq!(process.inputs().unwrap()[0]["qualifiedName"], "e2");

            process.set_outputs(None).unwrap();
            assert_eq!(process.attribute("outputs"), Some(&Value::Null));
        }
    }

    mod from_json {
        use super::*;

        fn catalog_process() -> Value {
            json!({
                "typeName": "Process",
                "attributes": {
                    "owner": null,
                    "replicatedTo": null,
                    "replicatedFrom": null,
                    "qualifiedName": "testEntity",
                    "name": "testEntity",
                    "description": null,
                    "inputs": [{"guid": "123"}],
                    "outputs": [{"guid": "456"}]
                },
                "guid": "f3a2390d-f300-487e-8756-b27767e540f0",
                "status": "ACTIVE",
                "relationshipAttributes": {
                    "schema": [],
                    "inputToProcesses": [],
                    "children": [],
                    "attachedSchema": [],
                    "meanings": [],
                    "outputFromProcesses": []
                }
            })
        }

        #[test]
        fn keeps_lineage_verbatim() {
            let source = catalog_process();
            let process = Process::from_json(&source).unwrap();

            assert_eq!(process.qualified_name(), "testEntity");
            assert_eq!(process.name(), "testEntity");
            assert_eq!(process.type_name(), "Process");
            assert_eq!(
                process.inputs(),
                source["attributes"]["inputs"].as_array().map(Vec::as_slice)
            );
            assert_eq!(
                process.outputs(),
                source["attributes"]["outputs"].as_array().map(Vec::as_slice)
            );
        }

        #[test]
        fn round_trips_through_to_json() {
            let source = catalog_process();
            let process = Process::from_json(&source).unwrap();
            let json = process.to_json(JsonForm::Full);

            assert_eq!(json["attributes"], source["attributes"]);
            assert_eq!(json["guid"], source["guid"]);
            assert_eq!(json["relationshipAttributes"], source["relationshipAttributes"]);
        }

        #[test]
        fn missing_lineage_is_unspecified() {
            let process = Process::from_json(&json!({
                "typeName": "Process",
                "attributes": {"qualifiedName": "p", "name": "p"}
            }))
            .unwrap();

            assert_eq!(process.inputs(), None);
            assert_eq!(process.attribute("inputs"), None);
        }

        #[test]
        fn rejects_non_array_lineage() {
            let result = Process::from_json(&json!({
                "typeName": "Process",
                "attributes": {"qualifiedName": "p", "name": "p", "outputs": {"guid": "1"}}
            }));

            assert!(matches!(
                result,
                Err(ProcessError::InvalidLineage {
                    field: "outputs",
                    found: "object"
                })
            ));
        }

        #[test]
        fn entity_errors_propagate() {
            let result = Process::from_json(&json!({"typeName": "Process"}));
            assert!(matches!(
                result,
                Err(ProcessError::Entity(EntityError::MissingField("attributes")))
            ));
        }

        #[test]
        fn parse_and_deserialize_agree() {
            let text = catalog_process().to_string();
            let parsed = parse_process(&text).unwrap();
            let deserialized: Process = serde_json::from_str(&text).unwrap();

            assert_eq!(parsed.inputs(), deserialized.inputs());
            assert_eq!(parsed.qualified_name(), deserialized.qualified_name());
        }

        #[test]
        fn try_from_entity() {
            let entity = Entity::from_json(&catalog_process()).unwrap();
            let process = Process::try_from(entity).unwrap();
            assert_eq!(process.inputs().unwrap().len(), 1);
        }
    }

    mod guid_reconciliation {
        use super::*;

        #[test]
        fn rewrites_process_and_lineage() {
            let e1 = dataset("e1", -1);
            let e2 = dataset("e2", -2);
            let mut process = Process::from_entity(
                Entity::builder("Process", "p", "p")
                    .guid(Guid::placeholder(-3).unwrap())
                    .build(),
                Some(&[EntityRef::from(&e1)]),
                Some(&[EntityRef::from(&e2)]),
            )
            .unwrap();

            let assignments = GuidAssignments::from_mutation_response(&json!({
                "guidAssignments": {"-1": "g1", "-3": "g3"}
            }))
            .unwrap();

            assert!(process.apply_guid_assignments(&assignments));
            assert_eq!(process.guid(), &Guid::persisted("g3").unwrap());
            assert_eq!(process.inputs().unwrap()[0]["guid"], "g1");
            assert_eq!(process.outputs().unwrap()[0]["guid"], -2);
        }

        #[test]
        fn unspecified_lineage_is_ignored() {
            let mut process = Process::new("Process", "p", "p", None, None).unwrap();
            let assignments = GuidAssignments::new();

            assert!(!process.apply_guid_assignments(&assignments));
            assert_eq!(process.inputs(), None);
        }
    }
}
