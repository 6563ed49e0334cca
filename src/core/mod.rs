//! core
//!
//! Entity model, lineage processes, and the JSON mapping for catalog payloads.
//!
//! # Modules
//!
//! - [`types`] - Strong types: Guid, GuidAssignments
//! - [`guid`] - Placeholder guid allocation
//! - [`reference`] - Minimum references and the conversion rule
//! - [`classification`] - Classification payloads attached to entities
//! - [`entity`] - The generic catalog entity
//! - [`process`] - Lineage process entity with inputs and outputs
//!
//! # Design Principles
//!
//! - Identity attributes live in one place: the attributes map
//! - Missing lineage and empty lineage are different states
//! - Parsing is strict about structure and lenient about extra keys

pub mod classification;
pub mod entity;
pub mod guid;
pub mod process;
pub mod reference;
pub mod types;
