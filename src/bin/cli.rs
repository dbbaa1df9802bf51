//! fieldsync CLI
//!
//! Thin operational front-end over the core: inspect the delta store and
//! request apply jobs. The long-running worker is a separate process.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use comfy_table::Table;
use uuid::Uuid;

use fieldsync_core::config::{default_data_dir, AppConfig};
use fieldsync_core::infrastructure::queue::InMemoryQueue;
use fieldsync_core::Core;

#[derive(Parser)]
#[command(name = "fieldsync", about = "Delta-sync core for field-collected geodata")]
struct Cli {
	/// Data directory (defaults to the platform data dir)
	#[arg(long, env = "FIELDSYNC_DATA_DIR", global = true)]
	data_dir: Option<PathBuf>,

	#[command(subcommand)]
	command: Commands,
}

#[derive(Subcommand)]
enum Commands {
	/// Manage users
	User {
		#[command(subcommand)]
		command: UserCommands,
	},
	/// Manage projects
	Project {
		#[command(subcommand)]
		command: ProjectCommands,
	},
	/// Inspect deltas
	Delta {
		#[command(subcommand)]
		command: DeltaCommands,
	},
	/// Request an apply job for a project's pending deltas
	Apply {
		/// Project id
		project: Uuid,
		/// Requesting user id
		#[arg(short, long)]
		user: i32,
		/// Let the worker overwrite conflicting features
		#[arg(long)]
		overwrite_conflicts: bool,
		/// Restrict to specific delta ids (repeatable)
		#[arg(long = "delta-id")]
		delta_ids: Vec<Uuid>,
	},
}

#[derive(Subcommand)]
enum UserCommands {
	/// Create a user
	Create {
		/// Username
		username: String,
		/// Email address
		#[arg(short, long)]
		email: Option<String>,
	},
}

#[derive(Subcommand)]
enum ProjectCommands {
	/// Create a new project
	Create {
		/// Project name
		name: String,
		/// Owning user id
		#[arg(short, long)]
		owner: i32,
		/// Description
		#[arg(short, long)]
		description: Option<String>,
	},
	/// List all projects
	List,
}

#[derive(Subcommand)]
enum DeltaCommands {
	/// List a project's deltas
	List {
		/// Project id
		project: Uuid,
	},
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	let cli = Cli::parse();

	let data_dir = match cli.data_dir {
		Some(dir) => dir,
		None => default_data_dir()?,
	};

	// RUST_LOG wins; otherwise the configured log level applies
	let config = AppConfig::load_or_create(&data_dir)?;
	tracing_subscriber::fmt()
		.with_env_filter(
			tracing_subscriber::EnvFilter::try_from_default_env()
				.unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
		)
		.init();

	let core = Core::open(&data_dir, Arc::new(InMemoryQueue::new())).await?;

	match cli.command {
		Commands::User { command } => match command {
			UserCommands::Create { username, email } => {
				let user = core.create_user(&username, email.as_deref()).await?;
				println!("Created user {} (id {})", user.username, user.id);
			}
		},
		Commands::Project { command } => match command {
			ProjectCommands::Create {
				name,
				owner,
				description,
			} => {
				let project = core
					.create_project(&name, description.as_deref(), owner)
					.await?;
				println!("Created project {} ({})", project.name, project.id);
			}
			ProjectCommands::List => {
				let projects = core.list_projects().await?;
				let mut table = Table::new();
				table.set_header(["Id", "Name", "Owner", "Created"]);
				for project in projects {
					table.add_row([
						project.id.to_string(),
						project.name,
						project.owner_id.to_string(),
						project.created_at.to_rfc3339(),
					]);
				}
				println!("{table}");
			}
		},
		Commands::Delta { command } => match command {
			DeltaCommands::List { project } => {
				let deltas = core.list_deltas(project).await?;
				let mut table = Table::new();
				table.set_header(["Id", "Status", "Created by", "Created"]);
				for delta in deltas {
					table.add_row([
						delta.id.to_string(),
						delta.last_status,
						delta.created_by_id.to_string(),
						delta.created_at.to_rfc3339(),
					]);
				}
				println!("{table}");
			}
		},
		Commands::Apply {
			project,
			user,
			overwrite_conflicts,
			delta_ids,
		} => {
			let filter = (!delta_ids.is_empty()).then_some(delta_ids.as_slice());
			match core
				.request_apply(project, user, overwrite_conflicts, filter)
				.await?
			{
				Some(outcome) => {
					println!(
						"Created apply job {} claiming {} deltas",
						outcome.job.id,
						outcome.deltas.len()
					);
				}
				None => println!("Nothing to apply"),
			}
		}
	}

	Ok(())
}
