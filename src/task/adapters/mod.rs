//! Adapter implementations for task ports.

pub mod log;
pub mod memory;
pub mod postgres;
