//! Job queue client
//!
//! The admission controller only needs one thing from the work queue: the set
//! of job ids the queue has actually started executing (as opposed to merely
//! enqueued). The client is an injected dependency so admission can be tested
//! deterministically without a live queue.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use thiserror::Error;
use tokio::sync::RwLock;

use super::jobs::JobId;

/// Name of the queue that processes delta apply jobs
pub const DELTA_QUEUE: &str = "delta";

/// Errors reported by a queue backend
#[derive(Error, Debug)]
pub enum QueueError {
	/// Queue backend could not be reached
	#[error("Queue unavailable: {0}")]
	Unavailable(String),

	/// Backend returned something the client could not interpret
	#[error("Invalid queue response: {0}")]
	InvalidResponse(String),
}

/// Read access to a queue's started-job registry
#[async_trait]
pub trait QueueClient: Send + Sync {
	/// Ids of jobs currently executing on the named queue
	async fn started_job_ids(&self, queue: &str) -> Result<HashSet<JobId>, QueueError>;
}

/// In-process queue registry.
///
/// Backs tests and single-process deployments; a worker marks a job started
/// when it picks it up and finished when it releases it.
#[derive(Default)]
pub struct InMemoryQueue {
	started: RwLock<HashMap<String, HashSet<JobId>>>,
}

impl InMemoryQueue {
	pub fn new() -> Self {
		Self::default()
	}

	pub async fn mark_started(&self, queue: &str, job_id: JobId) {
		self.started
			.write()
			.await
			.entry(queue.to_string())
			.or_default()
			.insert(job_id);
	}

	pub async fn mark_finished(&self, queue: &str, job_id: JobId) {
		if let Some(jobs) = self.started.write().await.get_mut(queue) {
			jobs.remove(&job_id);
		}
	}
}

#[async_trait]
impl QueueClient for InMemoryQueue {
	async fn started_job_ids(&self, queue: &str) -> Result<HashSet<JobId>, QueueError> {
		Ok(self
			.started
			.read()
			.await
			.get(queue)
			.cloned()
			.unwrap_or_default())
	}
}
