//! Infrastructure: database, queue and job plumbing

pub mod database;
pub mod jobs;
pub mod queue;
