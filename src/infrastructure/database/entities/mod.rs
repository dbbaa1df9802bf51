//! SeaORM entity definitions
//!
//! These map the delta-sync domain models to database tables.

pub mod apply_job;
pub mod apply_job_delta;
pub mod delta;
pub mod project;
pub mod user;

// Re-export all entities
pub use apply_job::Entity as ApplyJob;
pub use apply_job_delta::Entity as ApplyJobDelta;
pub use delta::Entity as Delta;
pub use project::Entity as Project;
pub use user::Entity as User;

// Re-export active models for easy access
pub use apply_job::ActiveModel as ApplyJobActive;
pub use apply_job_delta::ActiveModel as ApplyJobDeltaActive;
pub use delta::ActiveModel as DeltaActive;
pub use project::ActiveModel as ProjectActive;
pub use user::ActiveModel as UserActive;
