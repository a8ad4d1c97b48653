//! Cadence Scheduler
//!
//! This crate keeps workflow definitions and their triggers consistent with
//! each other and with the external job scheduler.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      WorkflowService                        │
//! │  - add / update: validate, then persist                     │
//! │  - delete: remove every trigger, then the workflow          │
//! └─────────────────────────────────────────────────────────────┘
//!            │                                   │
//!            ▼                                   ▼
//! ┌───────────────────────────┐   ┌─────────────────────────────┐
//! │     WorkflowValidator     │   │   WorkflowTriggerService    │
//! │  - definition lookups     │   │  (TriggerLifecycle)         │
//! │  - dependency graph check │   │  - persist + JobScheduler   │
//! └───────────────────────────┘   └─────────────────────────────┘
//! ```
//!
//! Mutating operations on one workflow are serialized through
//! [`WorkflowLocks`], shared by the workflow and trigger services, so a
//! trigger can never be added for a workflow that is concurrently being
//! deleted.
//!
//! # Usage
//!
//! ```ignore
//! use cadence_scheduler::{InMemoryJobScheduler, SchedulerServices};
//! use cadence_store::Stores;
//!
//! let services = SchedulerServices::new(Stores::in_memory(), Arc::new(InMemoryJobScheduler::new()));
//! services.task_definitions.add(&definition).await?;
//! services.workflows.add(&workflow).await?;
//! services.triggers.add(&trigger).await?;
//! services.workflows.delete(&workflow.id()).await?;
//! ```

mod definition;
mod error;
mod job;
mod lock;
mod services;
mod trigger;
mod validation;
mod workflow;

pub use definition::TaskDefinitionService;
pub use error::SchedulerError;
pub use job::{InMemoryJobScheduler, JobScheduler, JobSchedulerError};
pub use lock::WorkflowLocks;
pub use services::SchedulerServices;
pub use trigger::{TriggerLifecycle, WorkflowTriggerService};
pub use validation::{WorkflowValidator, check_dependencies};
pub use workflow::WorkflowService;
