//! Project management

use chrono::Utc;
use sea_orm::{
	ActiveModelTrait, ActiveValue::Set, DatabaseConnection, EntityTrait, QueryOrder,
};
use tracing::info;
use uuid::Uuid;

use crate::error::{CoreError, Result};
use crate::infrastructure::database::entities::project;
use crate::operations::users;
use crate::shared::validators::validate_project_name;

/// Create a project owned by an existing user.
///
/// The name is validated against the platform naming rules before anything
/// touches the database.
pub async fn create_project(
	db: &DatabaseConnection,
	name: &str,
	description: Option<&str>,
	owner_id: i32,
) -> Result<project::Model> {
	validate_project_name(name)?;
	users::get_user(db, owner_id).await?;

	let now = Utc::now();
	let model = project::ActiveModel {
		id: Set(Uuid::new_v4()),
		name: Set(name.to_string()),
		description: Set(description.map(str::to_string)),
		owner_id: Set(owner_id),
		created_at: Set(now),
		updated_at: Set(now),
	}
	.insert(db)
	.await?;

	info!("Created project {} ({})", model.name, model.id);
	Ok(model)
}

/// Fetch a project, erroring if absent
pub async fn get_project(db: &DatabaseConnection, project_id: Uuid) -> Result<project::Model> {
	project::Entity::find_by_id(project_id)
		.one(db)
		.await?
		.ok_or(CoreError::ProjectNotFound(project_id))
}

/// List all projects, oldest first
pub async fn list_projects(db: &DatabaseConnection) -> Result<Vec<project::Model>> {
	Ok(project::Entity::find()
		.order_by_asc(project::Column::CreatedAt)
		.all(db)
		.await?)
}
