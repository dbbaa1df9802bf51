//! Apply job entity
//!
//! A work order bundling one or more deltas for processing by a worker.
//! Rows are only ever created by the admission controller and never with an
//! empty delta set.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "apply_jobs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub project_id: Uuid,
    pub created_by_id: i32,
    /// Interpreted by the worker, opaque to admission
    pub overwrite_conflicts: bool,
    pub status: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
    pub started_at: Option<DateTimeUtc>,
    pub finished_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::project::Entity",
        from = "Column::ProjectId",
        to = "super::project::Column::Id"
    )]
    Project,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::CreatedById",
        to = "super::user::Column::Id"
    )]
    CreatedBy,
}

impl Related<super::project::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Project.def()
    }
}

impl Related<super::delta::Entity> for Entity {
    fn to() -> RelationDef {
        super::apply_job_delta::Relation::Delta.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::apply_job_delta::Relation::ApplyJob.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
