//! End-to-end production of a short from a script: collaborators, fallbacks, compose, render.

/// Orchestrator.
pub mod pipeline;
/// Script files.
pub mod script;
/// Per-run scratch directory.
pub mod workspace;
