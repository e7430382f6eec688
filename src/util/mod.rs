//! Shared utility functions.

pub mod timestamp;
