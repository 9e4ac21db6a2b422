//! Application-level configuration.
//!
//! - [`CouncilConfig`]: who sits on the council and who writes the synthesis
//! - [`ExecutionParams`]: timeouts for gateway calls

pub mod council_config;
pub mod execution_params;

pub use council_config::CouncilConfig;
pub use execution_params::ExecutionParams;
