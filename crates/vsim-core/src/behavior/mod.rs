//! Per-kind operation handlers.
//!
//! Handlers are composed from the inventory and the task engine. Only the
//! datastore has behaviors beyond the defaults.

pub mod browse;
pub mod datastore;
