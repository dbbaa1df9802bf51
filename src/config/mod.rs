//! Application configuration

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::error::{CoreError, Result};

/// Default cap on deltas bundled into a single apply job
pub const DEFAULT_APPLY_DELTAS_LIMIT: u64 = 1000;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
	/// Config schema version
	pub version: u32,

	/// Data directory path
	pub data_dir: PathBuf,

	/// Logging level
	pub log_level: String,

	/// Name of the queue processing apply jobs
	pub queue_name: String,

	/// Maximum number of deltas admitted into one apply job
	pub apply_deltas_limit: u64,
}

impl AppConfig {
	const TARGET_VERSION: u32 = 1;

	/// Load configuration from a specific data directory
	pub fn load_from(data_dir: &Path) -> Result<Self> {
		let config_path = Self::config_path(data_dir);

		if config_path.exists() {
			info!("Loading config from {:?}", config_path);
			let json = fs::read_to_string(&config_path)?;
			let mut config: AppConfig = serde_json::from_str(&json)?;

			if config.version < Self::TARGET_VERSION {
				info!(
					"Migrating config from v{} to v{}",
					config.version,
					Self::TARGET_VERSION
				);
				config.migrate()?;
				config.save()?;
			}

			Ok(config)
		} else {
			warn!("No config found, creating default at {:?}", config_path);
			let config = Self::default_with_dir(data_dir.to_path_buf());
			config.save()?;
			Ok(config)
		}
	}

	/// Load or create configuration
	pub fn load_or_create(data_dir: &Path) -> Result<Self> {
		Self::load_from(data_dir).or_else(|_| {
			let config = Self::default_with_dir(data_dir.to_path_buf());
			config.save()?;
			Ok(config)
		})
	}

	/// Create default configuration with specific data directory
	pub fn default_with_dir(data_dir: PathBuf) -> Self {
		Self {
			version: Self::TARGET_VERSION,
			data_dir,
			log_level: "info".to_string(),
			queue_name: crate::infrastructure::queue::DELTA_QUEUE.to_string(),
			apply_deltas_limit: DEFAULT_APPLY_DELTAS_LIMIT,
		}
	}

	/// Save configuration to disk
	pub fn save(&self) -> Result<()> {
		fs::create_dir_all(&self.data_dir)?;

		let config_path = Self::config_path(&self.data_dir);
		let json = serde_json::to_string_pretty(self)?;
		fs::write(&config_path, json)?;
		info!("Saved config to {:?}", config_path);
		Ok(())
	}

	fn config_path(data_dir: &Path) -> PathBuf {
		data_dir.join("fieldsync.json")
	}

	/// Get the path of the SQLite database file
	pub fn database_path(&self) -> PathBuf {
		self.data_dir.join("fieldsync.db")
	}

	/// Get the path for logs directory
	pub fn logs_dir(&self) -> PathBuf {
		self.data_dir.join("logs")
	}

	/// Ensure all required directories exist
	pub fn ensure_directories(&self) -> Result<()> {
		fs::create_dir_all(&self.data_dir)?;
		fs::create_dir_all(self.logs_dir())?;
		Ok(())
	}

	fn migrate(&mut self) -> Result<()> {
		match self.version {
			0 => {
				self.version = 1;
				Ok(())
			}
			1 => Ok(()),
			v => Err(CoreError::Io(std::io::Error::new(
				std::io::ErrorKind::InvalidData,
				format!("Unknown config version: {}", v),
			))),
		}
	}
}

impl Default for AppConfig {
	fn default() -> Self {
		let data_dir = default_data_dir().unwrap_or_else(|_| PathBuf::from("."));
		Self::default_with_dir(data_dir)
	}
}

/// Default platform data directory for fieldsync
pub fn default_data_dir() -> Result<PathBuf> {
	dirs::data_dir()
		.map(|dir| dir.join("fieldsync"))
		.ok_or_else(|| {
			CoreError::Io(std::io::Error::new(
				std::io::ErrorKind::NotFound,
				"Could not determine platform data directory",
			))
		})
}
