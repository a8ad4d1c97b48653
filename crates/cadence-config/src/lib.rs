//! Cadence Config
//!
//! This crate contains the serializable types shared by every Cadence crate:
//! task definitions, workflows and their tasks, workflow triggers, and the
//! identifier keys used to look them up. It also holds the process
//! configuration (`SchedulerConfig`) that selects a store backend.
//!
//! Definitions can be loaded from:
//! - JSON files (via the CLI)
//! - Database storage (as JSON blobs)
//!
//! None of these types validate themselves. Structural validation of a
//! workflow's task graph happens in `cadence-scheduler` before anything is
//! persisted.

mod definition;
mod id;
mod property;
mod settings;
mod trigger;
mod workflow;

pub use definition::TaskDefinition;
pub use id::{TaskDefinitionId, WorkflowId, WorkflowTriggerId};
pub use property::{Properties, PropertyValue};
pub use settings::{ConfigError, SchedulerConfig, StoreConfig};
pub use trigger::{Schedule, WorkflowTrigger};
pub use workflow::{Workflow, WorkflowTask};
