//! Core types for the apply-job system

use serde::{Deserialize, Serialize};
use std::fmt;
use strum::{Display, EnumString};
use uuid::Uuid;

/// Unique identifier for an apply job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobId(pub Uuid);

impl JobId {
	pub fn new() -> Self {
		Self(Uuid::new_v4())
	}
}

impl Default for JobId {
	fn default() -> Self {
		Self::new()
	}
}

impl fmt::Display for JobId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl From<Uuid> for JobId {
	fn from(uuid: Uuid) -> Self {
		Self(uuid)
	}
}

impl From<JobId> for Uuid {
	fn from(id: JobId) -> Self {
		id.0
	}
}

/// Current status of an apply job.
///
/// Stored as text in the `apply_jobs.status` column. A job in an active
/// status still holds its deltas claimed; only terminal statuses release
/// them for future admission.
#[derive(
	Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum JobStatus {
	/// Job is waiting to be executed
	Queued,
	/// Job is currently running
	Running,
	/// Job completed successfully
	Completed,
	/// Job failed with an error
	Failed,
	/// Job was cancelled
	Cancelled,
}

impl JobStatus {
	/// Statuses that keep the job's deltas claimed
	pub const ACTIVE: [JobStatus; 2] = [Self::Queued, Self::Running];

	pub fn is_terminal(&self) -> bool {
		matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
	}

	pub fn is_active(&self) -> bool {
		matches!(self, Self::Queued | Self::Running)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::str::FromStr;

	#[test]
	fn active_and_terminal_partition_statuses() {
		for status in [
			JobStatus::Queued,
			JobStatus::Running,
			JobStatus::Completed,
			JobStatus::Failed,
			JobStatus::Cancelled,
		] {
			assert_ne!(status.is_active(), status.is_terminal());
		}
	}

	#[test]
	fn status_round_trips_through_text() {
		assert_eq!(JobStatus::from_str("queued").unwrap(), JobStatus::Queued);
		assert_eq!(JobStatus::Running.to_string(), "running");
	}
}
