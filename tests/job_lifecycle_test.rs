//! Worker-facing job status transitions

mod common;

use std::collections::HashSet;

use pretty_assertions::assert_eq;
use sea_orm::{ActiveModelTrait, ActiveValue::Set, EntityTrait};
use uuid::Uuid;

use common::{seed_delta, seed_project, setup};
use fieldsync_core::domain::DeltaStatus;
use fieldsync_core::infrastructure::database::entities::{apply_job, delta};
use fieldsync_core::infrastructure::jobs::JobStatus;
use fieldsync_core::operations::apply::{self, DeltaResult};

async fn delta_status(ctx: &common::TestContext, id: Uuid) -> String {
	delta::Entity::find_by_id(id)
		.one(ctx.core.conn())
		.await
		.unwrap()
		.unwrap()
		.last_status
}

#[tokio::test]
async fn start_job_marks_job_running_and_deltas_started() {
	let ctx = setup().await;
	let (user, project) = seed_project(&ctx.core, "survey-2025").await;
	let a = seed_delta(&ctx.core, project, user, DeltaStatus::Pending).await;
	let b = seed_delta(&ctx.core, project, user, DeltaStatus::Error).await;

	let outcome = ctx
		.core
		.request_apply(project, user, false, None)
		.await
		.unwrap()
		.unwrap();

	let job = apply::start_job(ctx.core.conn(), outcome.job.id).await.unwrap();
	assert_eq!(job.status, JobStatus::Running.to_string());
	assert!(job.started_at.is_some());

	assert_eq!(delta_status(&ctx, a).await, "started");
	assert_eq!(delta_status(&ctx, b).await, "started");
}

#[tokio::test]
async fn start_job_rejects_non_queued_jobs() {
	let ctx = setup().await;
	let (user, project) = seed_project(&ctx.core, "survey-2025").await;
	seed_delta(&ctx.core, project, user, DeltaStatus::Pending).await;

	let outcome = ctx
		.core
		.request_apply(project, user, false, None)
		.await
		.unwrap()
		.unwrap();

	apply::start_job(ctx.core.conn(), outcome.job.id).await.unwrap();
	assert!(apply::start_job(ctx.core.conn(), outcome.job.id).await.is_err());
}

#[tokio::test]
async fn concurrent_starts_hand_the_job_to_exactly_one_worker() {
	let ctx = setup().await;
	let (user, project) = seed_project(&ctx.core, "survey-2025").await;
	seed_delta(&ctx.core, project, user, DeltaStatus::Pending).await;

	let outcome = ctx
		.core
		.request_apply(project, user, false, None)
		.await
		.unwrap()
		.unwrap();

	let (first, second) = tokio::join!(
		apply::start_job(ctx.core.conn(), outcome.job.id),
		apply::start_job(ctx.core.conn(), outcome.job.id),
	);
	assert!(first.is_ok() ^ second.is_ok());

	let job = apply::get_job(ctx.core.conn(), outcome.job.id).await.unwrap();
	assert_eq!(job.status, JobStatus::Running.to_string());
	assert!(job.started_at.is_some());
}

#[tokio::test]
async fn finish_job_records_terminal_statuses_and_feedback() {
	let ctx = setup().await;
	let (user, project) = seed_project(&ctx.core, "survey-2025").await;
	let a = seed_delta(&ctx.core, project, user, DeltaStatus::Pending).await;
	let b = seed_delta(&ctx.core, project, user, DeltaStatus::Pending).await;

	let outcome = ctx
		.core
		.request_apply(project, user, false, None)
		.await
		.unwrap()
		.unwrap();
	apply::start_job(ctx.core.conn(), outcome.job.id).await.unwrap();

	let unclaimed = Uuid::new_v4();
	let job = apply::finish_job(
		ctx.core.conn(),
		outcome.job.id,
		JobStatus::Completed,
		&[
			DeltaResult {
				delta_id: a,
				status: DeltaStatus::Applied,
				feedback: Some(serde_json::json!({"features": 4})),
			},
			DeltaResult {
				delta_id: b,
				status: DeltaStatus::NotApplied,
				feedback: Some(serde_json::json!({"reason": "geometry conflict"})),
			},
			// results for deltas the job never claimed are ignored
			DeltaResult {
				delta_id: unclaimed,
				status: DeltaStatus::Applied,
				feedback: None,
			},
		],
	)
	.await
	.unwrap();

	assert_eq!(job.status, JobStatus::Completed.to_string());
	assert!(job.finished_at.is_some());
	assert_eq!(delta_status(&ctx, a).await, "applied");
	assert_eq!(delta_status(&ctx, b).await, "not_applied");

	let stored = delta::Entity::find_by_id(b)
		.one(ctx.core.conn())
		.await
		.unwrap()
		.unwrap();
	assert_eq!(
		stored.last_feedback,
		Some(serde_json::json!({"reason": "geometry conflict"}))
	);
}

#[tokio::test]
async fn finish_job_rejects_non_terminal_status() {
	let ctx = setup().await;
	let (user, project) = seed_project(&ctx.core, "survey-2025").await;
	seed_delta(&ctx.core, project, user, DeltaStatus::Pending).await;

	let outcome = ctx
		.core
		.request_apply(project, user, false, None)
		.await
		.unwrap()
		.unwrap();

	let result =
		apply::finish_job(ctx.core.conn(), outcome.job.id, JobStatus::Running, &[]).await;
	assert!(result.is_err());
}

#[tokio::test]
async fn finished_job_releases_unapplied_deltas_for_readmission() {
	let ctx = setup().await;
	let (user, project) = seed_project(&ctx.core, "survey-2025").await;
	let a = seed_delta(&ctx.core, project, user, DeltaStatus::Pending).await;
	let b = seed_delta(&ctx.core, project, user, DeltaStatus::Pending).await;

	let first = ctx
		.core
		.request_apply(project, user, false, None)
		.await
		.unwrap()
		.unwrap();
	apply::start_job(ctx.core.conn(), first.job.id).await.unwrap();
	apply::finish_job(
		ctx.core.conn(),
		first.job.id,
		JobStatus::Failed,
		&[
			DeltaResult {
				delta_id: a,
				status: DeltaStatus::Applied,
				feedback: None,
			},
			DeltaResult {
				delta_id: b,
				status: DeltaStatus::Error,
				feedback: None,
			},
		],
	)
	.await
	.unwrap();

	// only the errored delta comes back; the applied one is terminal
	let second = ctx
		.core
		.request_apply(project, user, false, None)
		.await
		.unwrap()
		.expect("errored delta is eligible again");
	let claimed: HashSet<Uuid> = second.deltas.iter().map(|d| d.id).collect();
	assert_eq!(claimed, HashSet::from([b]));
}

#[tokio::test]
async fn fail_stale_jobs_reaps_only_old_active_jobs() {
	let ctx = setup().await;
	let (user, project) = seed_project(&ctx.core, "survey-2025").await;
	seed_delta(&ctx.core, project, user, DeltaStatus::Pending).await;

	let outcome = ctx
		.core
		.request_apply(project, user, false, None)
		.await
		.unwrap()
		.unwrap();

	// a fresh job is untouched
	let cutoff = chrono::Utc::now() - chrono::Duration::hours(1);
	assert_eq!(apply::fail_stale_jobs(ctx.core.conn(), cutoff).await.unwrap(), 0);

	// backdate the job and it gets reaped
	let mut active: apply_job::ActiveModel = outcome.job.clone().into();
	active.updated_at = Set(chrono::Utc::now() - chrono::Duration::hours(2));
	active.update(ctx.core.conn()).await.unwrap();

	assert_eq!(apply::fail_stale_jobs(ctx.core.conn(), cutoff).await.unwrap(), 1);

	let job = apply::get_job(ctx.core.conn(), outcome.job.id).await.unwrap();
	assert_eq!(job.status, JobStatus::Failed.to_string());
	assert!(job.finished_at.is_some());

	// its deltas are admissible again
	let second = ctx.core.request_apply(project, user, false, None).await.unwrap();
	assert!(second.is_some());
}
