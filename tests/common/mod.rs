//! Shared setup for integration tests

use std::sync::Arc;

use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, ActiveValue::Set, DatabaseConnection, EntityTrait};
use tempfile::TempDir;
use uuid::Uuid;

use fieldsync_core::domain::DeltaStatus;
use fieldsync_core::infrastructure::database::entities::delta;
use fieldsync_core::infrastructure::queue::InMemoryQueue;
use fieldsync_core::Core;

/// A core backed by a temp-dir database plus direct handles for test setup.
pub struct TestContext {
	pub core: Core,
	pub queue: Arc<InMemoryQueue>,
	// dropped last; removes the database file
	_data_dir: TempDir,
}

pub async fn setup() -> TestContext {
	let data_dir = TempDir::new().unwrap();
	let queue = Arc::new(InMemoryQueue::new());
	let core = Core::open(data_dir.path(), queue.clone()).await.unwrap();
	TestContext {
		core,
		queue,
		_data_dir: data_dir,
	}
}

/// Seed a user and a project owned by them.
pub async fn seed_project(core: &Core, name: &str) -> (i32, Uuid) {
	let user = core
		.create_user(&format!("{name}_owner"), None)
		.await
		.unwrap();
	let project = core.create_project(name, None, user.id).await.unwrap();
	(user.id, project.id)
}

/// Register a delta and force it into the given status.
pub async fn seed_delta(
	core: &Core,
	project_id: Uuid,
	user_id: i32,
	status: DeltaStatus,
) -> Uuid {
	let model = core
		.register_delta(
			project_id,
			user_id,
			serde_json::json!({"method": "patch", "feature": "road_17"}),
		)
		.await
		.unwrap();
	if status != DeltaStatus::Pending {
		set_delta_status(core.conn(), model.id, status).await;
	}
	model.id
}

pub async fn set_delta_status(conn: &DatabaseConnection, delta_id: Uuid, status: DeltaStatus) {
	let model = delta::Entity::find_by_id(delta_id)
		.one(conn)
		.await
		.unwrap()
		.unwrap();
	let mut active: delta::ActiveModel = model.into();
	active.last_status = Set(status.to_string());
	active.update(conn).await.unwrap();
}

/// Backdate a delta so ordering-sensitive tests are deterministic.
pub async fn set_delta_created_at(
	conn: &DatabaseConnection,
	delta_id: Uuid,
	created_at: DateTime<Utc>,
) {
	let model = delta::Entity::find_by_id(delta_id)
		.one(conn)
		.await
		.unwrap()
		.unwrap();
	let mut active: delta::ActiveModel = model.into();
	active.created_at = Set(created_at);
	active.update(conn).await.unwrap();
}
