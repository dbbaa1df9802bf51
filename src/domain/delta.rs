//! Delta lifecycle status

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Status of a recorded offline edit awaiting application.
///
/// Stored as text in the `deltas.last_status` column. `Applied` and
/// `NotApplied` are terminal; `NotApplied` means the delta was judged
/// unapplicable and is never reconsidered for a new apply job.
#[derive(
	Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DeltaStatus {
	/// Uploaded, not yet picked up by any apply job
	Pending,
	/// An apply job has begun processing this delta
	Started,
	/// Successfully applied to the project dataset
	Applied,
	/// Judged unapplicable; final, never retried automatically
	NotApplied,
	/// Last apply attempt failed; eligible for retry
	Error,
}

impl DeltaStatus {
	/// Statuses a new apply job may still pick up
	pub const ELIGIBLE: [DeltaStatus; 3] = [Self::Pending, Self::Started, Self::Error];

	pub fn is_terminal(&self) -> bool {
		matches!(self, Self::Applied | Self::NotApplied)
	}
}
