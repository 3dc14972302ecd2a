//! Unit tests for chat command dispatch.
