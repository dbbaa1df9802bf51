//! Apply-job admission control and lifecycle
//!
//! [`request_apply`] is the single entry point that turns pending deltas into
//! a new apply job. Everything else here is the status-transition surface the
//! worker process uses while draining the queue.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use sea_orm::sea_query::{Cond, Expr, Query};
use sea_orm::{
	ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait,
	ModelTrait, QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::DeltaStatus;
use crate::error::{CoreError, Result};
use crate::infrastructure::database::entities::{apply_job, apply_job_delta, delta};
use crate::infrastructure::jobs::{JobId, JobStatus};
use crate::infrastructure::queue::QueueClient;
use crate::operations::projects;

/// An apply job together with the deltas it claimed
#[derive(Debug, Clone)]
pub struct ApplyJobWithDeltas {
	pub job: apply_job::Model,
	pub deltas: Vec<delta::Model>,
}

/// Admit eligible deltas into a new apply job.
///
/// Selects the project's deltas whose status is still workable (`pending`,
/// `started` or `error`; `not_applied` is final and never reconsidered),
/// excludes any delta already claimed by an in-flight job, optionally
/// restricts to `delta_ids`, and creates one job claiming exactly that set.
/// Returns `Ok(None)` when nothing is eligible; that is not an error.
///
/// Selection and claim happen in one write transaction, and the job row is
/// inserted before candidates are read: on SQLite the insert takes the
/// database write lock, so a concurrent admission for the same deltas blocks
/// until this transaction resolves and then sees the new claims. Ids in
/// `delta_ids` that belong to other projects fall out via the project filter.
#[allow(clippy::too_many_arguments)]
pub async fn request_apply(
	db: &DatabaseConnection,
	queue: &dyn QueueClient,
	queue_name: &str,
	project_id: Uuid,
	created_by: i32,
	overwrite_conflicts: bool,
	delta_ids: Option<&[Uuid]>,
	limit: u64,
) -> Result<Option<ApplyJobWithDeltas>> {
	debug!(
		"Requested apply on project {}; overwrite_conflicts: {}; delta_ids: {:?}",
		project_id, overwrite_conflicts, delta_ids
	);

	projects::get_project(db, project_id).await?;

	// Jobs the queue is actively executing; their deltas must not be
	// claimed again even if the database status lags behind.
	let started: Vec<Uuid> = queue
		.started_job_ids(queue_name)
		.await?
		.into_iter()
		.map(Uuid::from)
		.collect();

	let txn = db.begin().await?;

	let now = Utc::now();
	let job = apply_job::ActiveModel {
		id: Set(JobId::new().into()),
		project_id: Set(project_id),
		created_by_id: Set(created_by),
		overwrite_conflicts: Set(overwrite_conflicts),
		status: Set(JobStatus::Queued.to_string()),
		created_at: Set(now),
		updated_at: Set(now),
		started_at: Set(None),
		finished_at: Set(None),
	}
	.insert(&txn)
	.await?;

	// Deltas already claimed by a job that is active in the database or in
	// the queue's started registry.
	let claimed = Query::select()
		.column((apply_job_delta::Entity, apply_job_delta::Column::DeltaId))
		.from(apply_job_delta::Entity)
		.inner_join(
			apply_job::Entity,
			Expr::col((apply_job::Entity, apply_job::Column::Id)).equals((
				apply_job_delta::Entity,
				apply_job_delta::Column::ApplyJobId,
			)),
		)
		.cond_where(
			Cond::any()
				.add(
					Expr::col((apply_job::Entity, apply_job::Column::Status))
						.is_in(JobStatus::ACTIVE.map(|s| s.to_string())),
				)
				.add(
					Expr::col((apply_job::Entity, apply_job::Column::Id))
						.is_in(started),
				),
		)
		.to_owned();

	let mut candidates = delta::Entity::find()
		.filter(delta::Column::ProjectId.eq(project_id))
		.filter(delta::Column::LastStatus.is_in(DeltaStatus::ELIGIBLE.map(|s| s.to_string())))
		.filter(Expr::col((delta::Entity, delta::Column::Id)).not_in_subquery(claimed));

	if let Some(ids) = delta_ids {
		candidates = candidates.filter(delta::Column::Id.is_in(ids.iter().copied()));
	}

	let deltas = candidates
		.order_by_asc(delta::Column::CreatedAt)
		.limit(limit)
		.all(&txn)
		.await?;

	if deltas.is_empty() {
		// Nothing to do; the provisional job row disappears with the txn.
		txn.rollback().await?;
		debug!("No eligible deltas on project {}", project_id);
		return Ok(None);
	}

	apply_job_delta::Entity::insert_many(deltas.iter().map(|d| {
		apply_job_delta::ActiveModel {
			apply_job_id: Set(job.id),
			delta_id: Set(d.id),
		}
	}))
	.exec(&txn)
	.await?;

	txn.commit().await?;

	info!(
		"Created apply job {} on project {} claiming {} deltas",
		job.id,
		project_id,
		deltas.len()
	);

	Ok(Some(ApplyJobWithDeltas { job, deltas }))
}

/// Fetch an apply job, erroring if absent
pub async fn get_job(db: &DatabaseConnection, job_id: Uuid) -> Result<apply_job::Model> {
	apply_job::Entity::find_by_id(job_id)
		.one(db)
		.await?
		.ok_or(CoreError::JobNotFound(job_id))
}

/// Deltas claimed by a job
pub async fn job_deltas(db: &DatabaseConnection, job_id: Uuid) -> Result<Vec<delta::Model>> {
	let job = get_job(db, job_id).await?;
	Ok(job.find_related(delta::Entity).all(db).await?)
}

/// Move a queued job to `running` and mark its deltas started.
///
/// Called by the worker as it picks the job up; the worker also registers
/// the id in its queue's started registry.
pub async fn start_job(db: &DatabaseConnection, job_id: Uuid) -> Result<apply_job::Model> {
	let job = get_job(db, job_id).await?;

	let txn = db.begin().await?;
	let now = Utc::now();

	// Conditional transition: of two workers racing for the same job, only
	// the one whose update still finds it queued takes it.
	let taken = apply_job::Entity::update_many()
		.col_expr(
			apply_job::Column::Status,
			Expr::value(JobStatus::Running.to_string()),
		)
		.col_expr(apply_job::Column::StartedAt, Expr::value(Some(now)))
		.col_expr(apply_job::Column::UpdatedAt, Expr::value(now))
		.filter(apply_job::Column::Id.eq(job_id))
		.filter(apply_job::Column::Status.eq(JobStatus::Queued.to_string()))
		.exec(&txn)
		.await?
		.rows_affected;

	if taken == 0 {
		txn.rollback().await?;
		return Err(CoreError::InvalidJobTransition {
			job: job_id,
			from: job.status,
			to: JobStatus::Running.to_string(),
		});
	}

	let claimed = Query::select()
		.column(apply_job_delta::Column::DeltaId)
		.from(apply_job_delta::Entity)
		.and_where(
			Expr::col(apply_job_delta::Column::ApplyJobId).eq(job_id),
		)
		.to_owned();

	delta::Entity::update_many()
		.col_expr(
			delta::Column::LastStatus,
			Expr::value(DeltaStatus::Started.to_string()),
		)
		.col_expr(delta::Column::UpdatedAt, Expr::value(now))
		.filter(Expr::col((delta::Entity, delta::Column::Id)).in_subquery(claimed))
		.exec(&txn)
		.await?;

	txn.commit().await?;

	info!("Apply job {} started", job_id);
	get_job(db, job_id).await
}

/// Per-delta outcome reported by the worker
#[derive(Debug, Clone)]
pub struct DeltaResult {
	pub delta_id: Uuid,
	pub status: DeltaStatus,
	pub feedback: Option<serde_json::Value>,
}

/// Finish a job with a terminal status and record per-delta outcomes.
///
/// Results for deltas the job never claimed are skipped with a warning.
/// Job row and delta updates commit together.
pub async fn finish_job(
	db: &DatabaseConnection,
	job_id: Uuid,
	status: JobStatus,
	results: &[DeltaResult],
) -> Result<apply_job::Model> {
	if !status.is_terminal() {
		let job = get_job(db, job_id).await?;
		return Err(CoreError::InvalidJobTransition {
			job: job_id,
			from: job.status,
			to: status.to_string(),
		});
	}

	let job = get_job(db, job_id).await?;
	let claimed: HashSet<Uuid> = job
		.find_related(delta::Entity)
		.all(db)
		.await?
		.into_iter()
		.map(|d| d.id)
		.collect();

	let txn = db.begin().await?;
	let now = Utc::now();

	let mut active: apply_job::ActiveModel = job.into();
	active.status = Set(status.to_string());
	active.finished_at = Set(Some(now));
	active.updated_at = Set(now);
	let job = active.update(&txn).await?;

	for result in results {
		if !claimed.contains(&result.delta_id) {
			warn!(
				"Ignoring result for delta {} not claimed by job {}",
				result.delta_id, job_id
			);
			continue;
		}

		delta::Entity::update_many()
			.col_expr(
				delta::Column::LastStatus,
				Expr::value(result.status.to_string()),
			)
			.col_expr(
				delta::Column::LastFeedback,
				Expr::value(result.feedback.clone()),
			)
			.col_expr(delta::Column::UpdatedAt, Expr::value(now))
			.filter(delta::Column::Id.eq(result.delta_id))
			.exec(&txn)
			.await?;
	}

	txn.commit().await?;

	info!("Apply job {} finished as {}", job_id, status);
	Ok(job)
}

/// Fail jobs whose worker terminated without reporting back.
///
/// Any job still active but untouched since `cutoff` is moved to `failed`,
/// releasing its deltas for future admission. Returns the number of jobs
/// reaped.
pub async fn fail_stale_jobs(db: &DatabaseConnection, cutoff: DateTime<Utc>) -> Result<u64> {
	let now = Utc::now();
	let reaped = apply_job::Entity::update_many()
		.col_expr(
			apply_job::Column::Status,
			Expr::value(JobStatus::Failed.to_string()),
		)
		.col_expr(apply_job::Column::FinishedAt, Expr::value(Some(now)))
		.col_expr(apply_job::Column::UpdatedAt, Expr::value(now))
		.filter(apply_job::Column::Status.is_in(JobStatus::ACTIVE.map(|s| s.to_string())))
		.filter(apply_job::Column::UpdatedAt.lt(cutoff))
		.exec(db)
		.await?
		.rows_affected;

	if reaped > 0 {
		warn!("Failed {} stale apply jobs", reaped);
	}
	Ok(reaped)
}
