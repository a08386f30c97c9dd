//! # docdrop-delivery
//!
//! Trigger-driven delivery pipeline.
//!
//! Call [`run_task`] to deliver every path mapping of one task over a single
//! remote session, or [`run_all`] to process every configured task in order.
//! The building blocks are usable on their own:
//! - [`glob`] — pattern matching against a base directory
//! - [`manifest`] — include ∖ exclude file set of a triggered directory
//! - [`trigger`] — trigger discovery for one mapping
//! - [`executor`] — upload + cleanup for one trigger file

pub mod error;
pub mod executor;
pub mod glob;
pub mod manifest;
pub mod runner;
pub mod trigger;

pub use error::DeliveryError;
pub use executor::{deliver, DeliveryOutcome, DeliveryTarget};
pub use runner::{
    run_all, run_mapping, run_task, MappingFailure, MappingReport, RunOptions, RunSummary,
    TaskReport, TaskResult,
};
pub use trigger::ScanOutcome;
