//! HTTP API handlers for cyberguard-ai
//!
//! Thin layer over [`crate::pipeline::Analyzer`]: extract the input, run the
//! analysis, render the assessment as JSON.

pub mod analyze;
pub mod health;
pub mod history;
pub mod status;

pub use analyze::analyze_routes;
pub use health::health_routes;
pub use history::history_routes;
pub use status::status_routes;
