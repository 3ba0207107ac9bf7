use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum Messages {
    Table,
    ChatRoomId,
    Seq,
    SenderId,
}

#[derive(DeriveIden)]
enum ChatRooms {
    Table,
    ClientId,
    FreelancerId,
}

#[derive(DeriveIden)]
enum TransportRequests {
    Table,
    ClientId,
    ProviderId,
    Status,
}

#[derive(DeriveIden)]
enum TransportBids {
    Table,
    JobId,
    ProviderId,
}

#[derive(DeriveIden)]
enum Notifications {
    Table,
    UserId,
    IsRead,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Per-room history is read in sequence order; the pair is unique.
        manager
            .create_index(
                Index::create()
                    .name("idx_messages_room_seq")
                    .table(Messages::Table)
                    .col(Messages::ChatRoomId)
                    .col(Messages::Seq)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_messages_sender_id")
                    .table(Messages::Table)
                    .col(Messages::SenderId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_chat_rooms_client_id")
                    .table(ChatRooms::Table)
                    .col(ChatRooms::ClientId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_chat_rooms_freelancer_id")
                    .table(ChatRooms::Table)
                    .col(ChatRooms::FreelancerId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_transport_requests_client_status")
                    .table(TransportRequests::Table)
                    .col(TransportRequests::ClientId)
                    .col(TransportRequests::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_transport_requests_provider_status")
                    .table(TransportRequests::Table)
                    .col(TransportRequests::ProviderId)
                    .col(TransportRequests::Status)
                    .to_owned(),
            )
            .await?;

        // One bid per provider per job.
        manager
            .create_index(
                Index::create()
                    .name("idx_transport_bids_job_provider")
                    .table(TransportBids::Table)
                    .col(TransportBids::JobId)
                    .col(TransportBids::ProviderId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_notifications_user_read")
                    .table(Notifications::Table)
                    .col(Notifications::UserId)
                    .col(Notifications::IsRead)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for name in [
            "idx_messages_room_seq",
            "idx_messages_sender_id",
            "idx_chat_rooms_client_id",
            "idx_chat_rooms_freelancer_id",
            "idx_transport_requests_client_status",
            "idx_transport_requests_provider_status",
            "idx_transport_bids_job_provider",
            "idx_notifications_user_read",
        ] {
            manager
                .drop_index(Index::drop().name(name).to_owned())
                .await?;
        }

        Ok(())
    }
}
