//! Crate-wide error types

use thiserror::Error;
use uuid::Uuid;

use crate::infrastructure::queue::QueueError;

/// Errors surfaced by core operations
#[derive(Error, Debug)]
pub enum CoreError {
	/// Project does not exist
	#[error("Project not found: {0}")]
	ProjectNotFound(Uuid),

	/// User does not exist
	#[error("User not found: {0}")]
	UserNotFound(i32),

	/// Apply job does not exist
	#[error("Apply job not found: {0}")]
	JobNotFound(Uuid),

	/// Requested job status change is not allowed
	#[error("Job {job} cannot move from '{from}' to '{to}'")]
	InvalidJobTransition {
		job: Uuid,
		from: String,
		to: String,
	},

	/// Project name failed validation
	#[error("Invalid project name: {0}")]
	InvalidProjectName(String),

	/// Database error
	#[error("Database error: {0}")]
	Database(#[from] sea_orm::DbErr),

	/// Job queue error
	#[error("Queue error: {0}")]
	Queue(#[from] QueueError),

	/// IO error
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),

	/// JSON error
	#[error("JSON error: {0}")]
	Json(#[from] serde_json::Error),
}

/// Result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;
