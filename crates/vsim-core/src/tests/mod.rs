//! Scenario tests spanning registry, inventory, task engine and behaviors.
//!
//! - `integration.rs`: datastore search, refresh and destroy end to end
//! - `ordering.rs`: parallel task execution and graph consistency
//! - `helpers.rs`: simulator setup on temporary backing directories

mod helpers;

// Re-export for convenience
pub use helpers::*;
