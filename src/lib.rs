//! catalog-entities - Entity and lineage model for metadata catalog payloads
//!
//! A typed model of the JSON documents a metadata catalog (Apache Atlas style)
//! exchanges over its REST API: generic entities, lineage processes that link
//! input and output entities, and the compact minimum reference used to point
//! at an entity from another one.
//!
//! # Architecture
//!
//! Everything lives under [`core`]:
//!
//! - [`core::types`] - Guid and guid assignment types
//! - [`core::guid`] - Unique placeholder allocation for a batch
//! - [`core::reference`] - Minimum references and the reference rule
//! - [`core::classification`] - Classifications attached to entities
//! - [`core::entity`] - Entities and their JSON mapping
//! - [`core::process`] - Processes with nullable inputs and outputs
//!
//! # Example
//!
//! ```
//! use catalog_entities::{Entity, EntityRef, JsonForm, Process};
//!
//! let table = Entity::new("hive_table", "db.orders@prod", "orders");
//! let mut etl = Process::new("etl_job", "jobs.daily@prod", "daily", None, None).unwrap();
//! assert!(etl.inputs().is_none());
//!
//! etl.add_input(&table).unwrap();
//! let json = etl.to_json(JsonForm::Full);
//! assert_eq!(json["attributes"]["inputs"][0]["qualifiedName"], "db.orders@prod");
//! ```
//!
//! # Logging
//!
//! The crate emits `tracing` events and never installs a subscriber.

pub mod core;

pub use crate::core::classification::Classification;
pub use crate::core::entity::{Entity, EntityBuilder, EntityError, JsonForm};
pub use crate::core::guid::GuidTracker;
pub use crate::core::process::{Process, ProcessError};
pub use crate::core::reference::{to_minimum, EntityRef, MinimumReference, ReferenceError};
pub use crate::core::types::{Guid, GuidAssignments, TypeError};
