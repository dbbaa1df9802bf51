//! Core operations on the delta store

pub mod apply;
pub mod deltas;
pub mod projects;
pub mod users;
