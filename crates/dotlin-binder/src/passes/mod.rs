//! Binder passes.
//!
//! - [`construction`]: build contexts and bound nodes for every module
//! - [`analysis`]: run the three analysis phases over every declaration

pub mod analysis;
pub mod construction;

pub use analysis::AnalysisPass;
pub use construction::{ConstructionOutput, ConstructionPass};
