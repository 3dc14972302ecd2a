//! Task lifecycle management for Taskpulse.
//!
//! Tasks are created, edited, completed, reopened and deleted from chat
//! commands. Every transition is persisted through the repository port,
//! keeps the reminder table in step through the reminder-scheduling port,
//! and fans out chat notifications to the participants. The module follows
//! hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
