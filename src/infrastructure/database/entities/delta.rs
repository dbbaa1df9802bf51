//! Delta entity
//!
//! One row per offline edit uploaded by a client. `last_status` holds a
//! [`DeltaStatus`](crate::domain::DeltaStatus) as text; `last_feedback` is
//! written by the apply worker.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "deltas")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub project_id: Uuid,
    pub content: Json,
    pub last_status: String,
    pub last_feedback: Option<Json>,
    pub created_by_id: i32,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
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

impl Related<super::apply_job::Entity> for Entity {
    fn to() -> RelationDef {
        super::apply_job_delta::Relation::ApplyJob.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::apply_job_delta::Relation::Delta.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
