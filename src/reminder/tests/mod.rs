//! Unit tests for reminder timing and the timer table.
