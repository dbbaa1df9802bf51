//! fieldsync-core
//!
//! Delta-synchronization core for a geospatial collaboration platform:
//! projects collect offline edits ("deltas") uploaded from the field, and an
//! admission controller bundles eligible deltas into apply jobs for a worker
//! queue. Web routing, authentication and blob storage are external
//! collaborators and live outside this crate.

pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod operations;
pub mod shared;

use std::path::Path;
use std::sync::Arc;

use sea_orm::DatabaseConnection;
use tracing::info;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::error::Result;
use crate::infrastructure::database::entities::{apply_job, delta, project, user};
use crate::infrastructure::database::Database;
use crate::infrastructure::queue::QueueClient;
use crate::operations::apply::ApplyJobWithDeltas;

/// The main context for all core operations
pub struct Core {
	/// Application configuration
	config: AppConfig,

	/// Relational store
	db: Arc<Database>,

	/// Work queue client (injected; see [`infrastructure::queue`])
	queue: Arc<dyn QueueClient>,
}

impl Core {
	/// Initialize a Core instance rooted at the given data directory
	pub async fn open(data_dir: &Path, queue: Arc<dyn QueueClient>) -> Result<Self> {
		info!("Initializing fieldsync core at {:?}", data_dir);

		// 1. Load or create app config
		let config = AppConfig::load_or_create(data_dir)?;
		config.ensure_directories()?;

		// 2. Open the database and bring the schema up to date
		let db = Database::open(&config.database_path()).await?;
		db.migrate().await?;

		Ok(Self {
			config,
			db: Arc::new(db),
			queue,
		})
	}

	/// Get the application configuration
	pub fn config(&self) -> &AppConfig {
		&self.config
	}

	/// Get the database connection
	pub fn conn(&self) -> &DatabaseConnection {
		self.db.conn()
	}

	/// Create a user record
	pub async fn create_user(&self, username: &str, email: Option<&str>) -> Result<user::Model> {
		operations::users::create_user(self.conn(), username, email).await
	}

	/// Create a project owned by an existing user
	pub async fn create_project(
		&self,
		name: &str,
		description: Option<&str>,
		owner_id: i32,
	) -> Result<project::Model> {
		operations::projects::create_project(self.conn(), name, description, owner_id).await
	}

	/// List all projects
	pub async fn list_projects(&self) -> Result<Vec<project::Model>> {
		operations::projects::list_projects(self.conn()).await
	}

	/// Record an offline edit uploaded by a client
	pub async fn register_delta(
		&self,
		project_id: Uuid,
		created_by: i32,
		content: serde_json::Value,
	) -> Result<delta::Model> {
		operations::deltas::register_delta(self.conn(), project_id, created_by, content).await
	}

	/// List a project's deltas
	pub async fn list_deltas(&self, project_id: Uuid) -> Result<Vec<delta::Model>> {
		operations::deltas::list_deltas(self.conn(), project_id).await
	}

	/// Admit eligible deltas into a new apply job.
	///
	/// Returns `Ok(None)` when the project has nothing to apply.
	pub async fn request_apply(
		&self,
		project_id: Uuid,
		created_by: i32,
		overwrite_conflicts: bool,
		delta_ids: Option<&[Uuid]>,
	) -> Result<Option<ApplyJobWithDeltas>> {
		operations::apply::request_apply(
			self.conn(),
			self.queue.as_ref(),
			&self.config.queue_name,
			project_id,
			created_by,
			overwrite_conflicts,
			delta_ids,
			self.config.apply_deltas_limit,
		)
		.await
	}

	/// Fetch an apply job
	pub async fn get_job(&self, job_id: Uuid) -> Result<apply_job::Model> {
		operations::apply::get_job(self.conn(), job_id).await
	}

	/// Deltas claimed by a job
	pub async fn job_deltas(&self, job_id: Uuid) -> Result<Vec<delta::Model>> {
		operations::apply::job_deltas(self.conn(), job_id).await
	}
}
