//! Unit tests for the task module.
//!
//! Tests are organised by layer: domain values and transitions, the
//! in-memory adapters, notification fan-out, and lifecycle orchestration.

mod adapter_tests;
