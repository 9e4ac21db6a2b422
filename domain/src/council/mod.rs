//! Council deliberation domain
//!
//! Everything between "N models answered" and "here is the result":
//! anonymous labels, ranking extraction, mean-rank aggregation, the stage
//! state machine and the result bundle.

pub mod aggregate;
pub mod label;
pub mod parsing;
pub mod response;
pub mod result;
pub mod state;
