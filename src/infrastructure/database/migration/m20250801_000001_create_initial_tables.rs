//! Initial migration to create all tables

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create users table
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Users::Id).integer().not_null().auto_increment().primary_key())
                    .col(ColumnDef::new(Users::Username).string().not_null().unique_key())
                    .col(ColumnDef::new(Users::Email).string())
                    .col(ColumnDef::new(Users::CreatedAt).timestamp_with_time_zone().not_null())
                    .to_owned(),
            )
            .await?;

        // Create projects table
        manager
            .create_table(
                Table::create()
                    .table(Projects::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Projects::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Projects::Name).string().not_null())
                    .col(ColumnDef::new(Projects::Description).string())
                    .col(ColumnDef::new(Projects::OwnerId).integer().not_null())
                    .col(ColumnDef::new(Projects::CreatedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Projects::UpdatedAt).timestamp_with_time_zone().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Projects::Table, Projects::OwnerId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                    )
                    .to_owned(),
            )
            .await?;

        // Create deltas table
        manager
            .create_table(
                Table::create()
                    .table(Deltas::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Deltas::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Deltas::ProjectId).uuid().not_null())
                    .col(ColumnDef::new(Deltas::Content).json().not_null())
                    .col(ColumnDef::new(Deltas::LastStatus).string().not_null())
                    .col(ColumnDef::new(Deltas::LastFeedback).json())
                    .col(ColumnDef::new(Deltas::CreatedById).integer().not_null())
                    .col(ColumnDef::new(Deltas::CreatedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Deltas::UpdatedAt).timestamp_with_time_zone().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Deltas::Table, Deltas::ProjectId)
                            .to(Projects::Table, Projects::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Deltas::Table, Deltas::CreatedById)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                    )
                    .to_owned(),
            )
            .await?;

        // Create apply_jobs table
        manager
            .create_table(
                Table::create()
                    .table(ApplyJobs::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(ApplyJobs::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(ApplyJobs::ProjectId).uuid().not_null())
                    .col(ColumnDef::new(ApplyJobs::CreatedById).integer().not_null())
                    .col(ColumnDef::new(ApplyJobs::OverwriteConflicts).boolean().not_null().default(false))
                    .col(ColumnDef::new(ApplyJobs::Status).string().not_null())
                    .col(ColumnDef::new(ApplyJobs::CreatedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(ApplyJobs::UpdatedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(ApplyJobs::StartedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(ApplyJobs::FinishedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .from(ApplyJobs::Table, ApplyJobs::ProjectId)
                            .to(Projects::Table, Projects::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(ApplyJobs::Table, ApplyJobs::CreatedById)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                    )
                    .to_owned(),
            )
            .await?;

        // Create apply_job_deltas junction table
        manager
            .create_table(
                Table::create()
                    .table(ApplyJobDeltas::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(ApplyJobDeltas::ApplyJobId).uuid().not_null())
                    .col(ColumnDef::new(ApplyJobDeltas::DeltaId).uuid().not_null())
                    .primary_key(
                        Index::create()
                            .col(ApplyJobDeltas::ApplyJobId)
                            .col(ApplyJobDeltas::DeltaId)
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(ApplyJobDeltas::Table, ApplyJobDeltas::ApplyJobId)
                            .to(ApplyJobs::Table, ApplyJobs::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(ApplyJobDeltas::Table, ApplyJobDeltas::DeltaId)
                            .to(Deltas::Table, Deltas::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                    )
                    .to_owned(),
            )
            .await?;

        // Indices for the admission queries
        manager
            .create_index(
                Index::create()
                    .name("idx_deltas_project_status")
                    .table(Deltas::Table)
                    .col(Deltas::ProjectId)
                    .col(Deltas::LastStatus)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_apply_jobs_status")
                    .table(ApplyJobs::Table)
                    .col(ApplyJobs::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_apply_job_deltas_delta")
                    .table(ApplyJobDeltas::Table)
                    .col(ApplyJobDeltas::DeltaId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop tables in reverse order of creation
        manager
            .drop_table(Table::drop().table(ApplyJobDeltas::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ApplyJobs::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Deltas::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Projects::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;

        Ok(())
    }
}

// Table identifiers

#[derive(Iden)]
enum Users {
    Table,
    Id,
    Username,
    Email,
    CreatedAt,
}

#[derive(Iden)]
enum Projects {
    Table,
    Id,
    Name,
    Description,
    OwnerId,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Deltas {
    Table,
    Id,
    ProjectId,
    Content,
    LastStatus,
    LastFeedback,
    CreatedById,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum ApplyJobs {
    Table,
    Id,
    ProjectId,
    CreatedById,
    OverwriteConflicts,
    Status,
    CreatedAt,
    UpdatedAt,
    StartedAt,
    FinishedAt,
}

#[derive(Iden)]
enum ApplyJobDeltas {
    Table,
    ApplyJobId,
    DeltaId,
}
