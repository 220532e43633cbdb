//! Library components of the migration CLI: the orchestrator pipeline,
//! logging with PHI redaction, and the run-report artifacts.

pub mod logging;
pub mod pipeline;
pub mod report;
