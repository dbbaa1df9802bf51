//! Domain types shared across operations

pub mod delta;

pub use delta::DeltaStatus;
