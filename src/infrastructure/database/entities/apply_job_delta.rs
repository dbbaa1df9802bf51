//! Junction table linking apply jobs to the deltas they claim

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "apply_job_deltas")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub apply_job_id: Uuid,
    #[sea_orm(primary_key, auto_increment = false)]
    pub delta_id: Uuid,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::apply_job::Entity",
        from = "Column::ApplyJobId",
        to = "super::apply_job::Column::Id"
    )]
    ApplyJob,
    #[sea_orm(
        belongs_to = "super::delta::Entity",
        from = "Column::DeltaId",
        to = "super::delta::Column::Id"
    )]
    Delta,
}

impl Related<super::apply_job::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ApplyJob.def()
    }
}

impl Related<super::delta::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Delta.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
