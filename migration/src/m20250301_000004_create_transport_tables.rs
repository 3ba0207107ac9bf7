use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Identifiers for the `transport_requests` table (jobs) and its columns.
#[derive(DeriveIden)]
enum TransportRequests {
    Table,
    Id,
    ClientId,
    ProviderId,
    ServiceType,
    PickupLocation,
    PickupLatitude,
    PickupLongitude,
    DropoffLocation,
    DropoffLatitude,
    DropoffLongitude,
    PickupTime,
    Budget,
    EstimatedPrice,
    DistanceKm,
    RoutePolyline,
    EstimatedMinutes,
    Description,
    Status,
    IsUrgent,
    VehicleTypeRequired,
    Rating,
    Review,
    CreatedAt,
    CompletedAt,
}

#[derive(DeriveIden)]
enum TransportBids {
    Table,
    Id,
    JobId,
    ProviderId,
    Amount,
    Proposal,
    EstimatedMinutes,
    Status,
    CreatedAt,
}

#[derive(DeriveIden)]
enum TransportContracts {
    Table,
    Id,
    JobId,
    ClientId,
    ProviderId,
    AgreedAmount,
    Terms,
    Status,
    ConfirmedByProvider,
    CreatedAt,
}

/// No unique constraint on `service_type`: only one active row per type is
/// enforced by deactivating siblings on save.
#[derive(DeriveIden)]
enum ContractTemplates {
    Table,
    Id,
    ServiceType,
    Terms,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TransportRequests::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TransportRequests::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(TransportRequests::ClientId).uuid().not_null())
                    .col(ColumnDef::new(TransportRequests::ProviderId).uuid().null())
                    .col(ColumnDef::new(TransportRequests::ServiceType).string().not_null())
                    .col(
                        ColumnDef::new(TransportRequests::PickupLocation)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TransportRequests::PickupLatitude)
                            .double()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TransportRequests::PickupLongitude)
                            .double()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TransportRequests::DropoffLocation)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TransportRequests::DropoffLatitude)
                            .double()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TransportRequests::DropoffLongitude)
                            .double()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TransportRequests::PickupTime)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(TransportRequests::Budget).double().not_null())
                    .col(ColumnDef::new(TransportRequests::EstimatedPrice).double().null())
                    .col(ColumnDef::new(TransportRequests::DistanceKm).double().not_null())
                    .col(ColumnDef::new(TransportRequests::RoutePolyline).text().null())
                    .col(
                        ColumnDef::new(TransportRequests::EstimatedMinutes)
                            .integer()
                            .null(),
                    )
                    .col(ColumnDef::new(TransportRequests::Description).text().null())
                    .col(
                        ColumnDef::new(TransportRequests::Status)
                            .string()
                            .not_null()
                            .default("open"),
                    )
                    .col(
                        ColumnDef::new(TransportRequests::IsUrgent)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(TransportRequests::VehicleTypeRequired)
                            .string()
                            .null(),
                    )
                    .col(ColumnDef::new(TransportRequests::Rating).integer().null())
                    .col(ColumnDef::new(TransportRequests::Review).text().null())
                    .col(
                        ColumnDef::new(TransportRequests::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TransportRequests::CompletedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_transport_requests_client_id")
                            .from(TransportRequests::Table, TransportRequests::ClientId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_transport_requests_provider_id")
                            .from(TransportRequests::Table, TransportRequests::ProviderId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(TransportBids::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(TransportBids::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(TransportBids::JobId).uuid().not_null())
                    .col(ColumnDef::new(TransportBids::ProviderId).uuid().not_null())
                    .col(ColumnDef::new(TransportBids::Amount).double().not_null())
                    .col(ColumnDef::new(TransportBids::Proposal).text().null())
                    .col(ColumnDef::new(TransportBids::EstimatedMinutes).integer().null())
                    .col(
                        ColumnDef::new(TransportBids::Status)
                            .string()
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(TransportBids::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_transport_bids_job_id")
                            .from(TransportBids::Table, TransportBids::JobId)
                            .to(TransportRequests::Table, TransportRequests::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_transport_bids_provider_id")
                            .from(TransportBids::Table, TransportBids::ProviderId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(TransportContracts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TransportContracts::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(TransportContracts::JobId)
                            .uuid()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(TransportContracts::ClientId).uuid().not_null())
                    .col(ColumnDef::new(TransportContracts::ProviderId).uuid().not_null())
                    .col(
                        ColumnDef::new(TransportContracts::AgreedAmount)
                            .double()
                            .not_null(),
                    )
                    .col(ColumnDef::new(TransportContracts::Terms).text().not_null())
                    .col(
                        ColumnDef::new(TransportContracts::Status)
                            .string()
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(TransportContracts::ConfirmedByProvider)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(TransportContracts::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_transport_contracts_job_id")
                            .from(TransportContracts::Table, TransportContracts::JobId)
                            .to(TransportRequests::Table, TransportRequests::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_transport_contracts_client_id")
                            .from(TransportContracts::Table, TransportContracts::ClientId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_transport_contracts_provider_id")
                            .from(TransportContracts::Table, TransportContracts::ProviderId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ContractTemplates::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ContractTemplates::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ContractTemplates::ServiceType).string().not_null())
                    .col(ColumnDef::new(ContractTemplates::Terms).text().not_null())
                    .col(
                        ColumnDef::new(ContractTemplates::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(ContractTemplates::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ContractTemplates::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ContractTemplates::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(TransportContracts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(TransportBids::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(TransportRequests::Table).to_owned())
            .await
    }
}
