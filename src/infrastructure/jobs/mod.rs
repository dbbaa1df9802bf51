//! Apply-job types

pub mod types;

pub use types::{JobId, JobStatus};
