//! Utility functions and helpers for the gemgate gateway.
//!
//! - `logging`: Tracing and logging initialization.

pub mod logging;
