//! Shared helpers

pub mod validators;
