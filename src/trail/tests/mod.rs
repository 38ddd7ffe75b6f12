//! Unit tests for the trail module.
