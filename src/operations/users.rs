//! User records
//!
//! Authentication is an external concern; these rows only provide creator
//! attribution for projects, deltas and jobs.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ActiveValue::Set, DatabaseConnection, EntityTrait};
use tracing::info;

use crate::error::{CoreError, Result};
use crate::infrastructure::database::entities::user;

/// Create a user record
pub async fn create_user(
	db: &DatabaseConnection,
	username: &str,
	email: Option<&str>,
) -> Result<user::Model> {
	let model = user::ActiveModel {
		username: Set(username.to_string()),
		email: Set(email.map(str::to_string)),
		created_at: Set(Utc::now()),
		..Default::default()
	}
	.insert(db)
	.await?;

	info!("Created user {} ({})", model.username, model.id);
	Ok(model)
}

/// Fetch a user, erroring if absent
pub async fn get_user(db: &DatabaseConnection, user_id: i32) -> Result<user::Model> {
	user::Entity::find_by_id(user_id)
		.one(db)
		.await?
		.ok_or(CoreError::UserNotFound(user_id))
}
