//! Delta registration and queries

use chrono::Utc;
use sea_orm::{
	ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait,
	QueryFilter, QueryOrder,
};
use tracing::{debug, info};
use uuid::Uuid;

use crate::domain::DeltaStatus;
use crate::error::Result;
use crate::infrastructure::database::entities::delta;
use crate::operations::{projects, users};

/// Record an offline edit uploaded by a client.
///
/// New deltas always enter the store as [`DeltaStatus::Pending`]; only the
/// apply worker moves them onward.
pub async fn register_delta(
	db: &DatabaseConnection,
	project_id: Uuid,
	created_by: i32,
	content: serde_json::Value,
) -> Result<delta::Model> {
	projects::get_project(db, project_id).await?;
	users::get_user(db, created_by).await?;

	let now = Utc::now();
	let model = delta::ActiveModel {
		id: Set(Uuid::new_v4()),
		project_id: Set(project_id),
		content: Set(content),
		last_status: Set(DeltaStatus::Pending.to_string()),
		last_feedback: Set(None),
		created_by_id: Set(created_by),
		created_at: Set(now),
		updated_at: Set(now),
	}
	.insert(db)
	.await?;

	info!("Registered delta {} on project {}", model.id, project_id);
	Ok(model)
}

/// List a project's deltas, oldest first
pub async fn list_deltas(db: &DatabaseConnection, project_id: Uuid) -> Result<Vec<delta::Model>> {
	projects::get_project(db, project_id).await?;

	let deltas = delta::Entity::find()
		.filter(delta::Column::ProjectId.eq(project_id))
		.order_by_asc(delta::Column::CreatedAt)
		.all(db)
		.await?;

	debug!("Found {} deltas for project {}", deltas.len(), project_id);
	Ok(deltas)
}
