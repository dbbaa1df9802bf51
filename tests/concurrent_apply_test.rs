//! Two concurrent admissions must never claim the same delta twice

mod common;

use std::collections::HashSet;

use uuid::Uuid;

use common::{seed_delta, seed_project, setup};
use fieldsync_core::domain::DeltaStatus;

#[tokio::test]
async fn concurrent_requests_claim_disjoint_delta_sets() {
	let ctx = setup().await;
	let (user, project) = seed_project(&ctx.core, "survey-2025").await;

	let mut eligible = HashSet::new();
	for _ in 0..8 {
		eligible.insert(seed_delta(&ctx.core, project, user, DeltaStatus::Pending).await);
	}

	let (first, second) = tokio::join!(
		ctx.core.request_apply(project, user, false, None),
		ctx.core.request_apply(project, user, false, None),
	);

	let claims = |outcome: &Option<fieldsync_core::operations::apply::ApplyJobWithDeltas>| {
		outcome
			.as_ref()
			.map(|o| o.deltas.iter().map(|d| d.id).collect::<HashSet<Uuid>>())
			.unwrap_or_default()
	};

	let first = claims(&first.unwrap());
	let second = claims(&second.unwrap());

	// one call wins all deltas, or they split them; never both the same one
	assert!(first.is_disjoint(&second));
	assert!(first.union(&second).all(|id| eligible.contains(id)));
	assert!(!first.is_empty() || !second.is_empty());
}

#[tokio::test]
async fn many_sequential_requests_create_at_most_one_active_claim_per_delta() {
	let ctx = setup().await;
	let (user, project) = seed_project(&ctx.core, "survey-2025").await;

	let delta = seed_delta(&ctx.core, project, user, DeltaStatus::Pending).await;

	let mut claiming_jobs = 0;
	for _ in 0..5 {
		if let Some(outcome) = ctx.core.request_apply(project, user, false, None).await.unwrap() {
			assert_eq!(outcome.deltas.len(), 1);
			assert_eq!(outcome.deltas[0].id, delta);
			claiming_jobs += 1;
		}
	}

	assert_eq!(claiming_jobs, 1);
}
