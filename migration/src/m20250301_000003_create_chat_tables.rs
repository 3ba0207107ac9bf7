use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// One room per project, between its client and freelancer.
#[derive(DeriveIden)]
enum ChatRooms {
    Table,
    Id,
    ProjectId,
    ClientId,
    FreelancerId,
    IsActive,
    ProjectStatus,
    Budget,
    Deadline,
    LastMilestoneMessageId,
    LastMessageAt,
    CreatedAt,
}

#[derive(DeriveIden)]
enum ProjectMilestones {
    Table,
    Id,
    ChatRoomId,
    Title,
    Description,
    DueDate,
    Amount,
    IsCompleted,
    CompletedAt,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Messages {
    Table,
    Id,
    ChatRoomId,
    SenderId,
    Seq,
    Content,
    MessageType,
    IsRead,
    IsPinned,
    HasAttachment,
    RelatedMilestoneId,
    RelatedProposalId,
    CreatedAt,
}

#[derive(DeriveIden)]
enum MessageAttachments {
    Table,
    Id,
    MessageId,
    UploadedBy,
    FileRef,
    FileName,
    FileType,
    Category,
    Description,
    UploadedAt,
}

/// Re-declare parent table identifiers for foreign-key references.
#[derive(DeriveIden)]
enum Projects {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // `last_milestone_message_id` points back into `messages`, which does not
        // exist yet; it is kept as a plain column and cleared on deletion.
        manager
            .create_table(
                Table::create()
                    .table(ChatRooms::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(ChatRooms::Id).uuid().not_null().primary_key())
                    .col(
                        ColumnDef::new(ChatRooms::ProjectId)
                            .uuid()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(ChatRooms::ClientId).uuid().not_null())
                    .col(ColumnDef::new(ChatRooms::FreelancerId).uuid().not_null())
                    .col(
                        ColumnDef::new(ChatRooms::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(ChatRooms::ProjectStatus)
                            .string()
                            .not_null()
                            .default("discussion"),
                    )
                    .col(ColumnDef::new(ChatRooms::Budget).double().null())
                    .col(
                        ColumnDef::new(ChatRooms::Deadline)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(ColumnDef::new(ChatRooms::LastMilestoneMessageId).uuid().null())
                    .col(
                        ColumnDef::new(ChatRooms::LastMessageAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ChatRooms::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_chat_rooms_project_id")
                            .from(ChatRooms::Table, ChatRooms::ProjectId)
                            .to(Projects::Table, Projects::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_chat_rooms_client_id")
                            .from(ChatRooms::Table, ChatRooms::ClientId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_chat_rooms_freelancer_id")
                            .from(ChatRooms::Table, ChatRooms::FreelancerId)
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
                    .table(ProjectMilestones::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ProjectMilestones::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ProjectMilestones::ChatRoomId).uuid().not_null())
                    .col(ColumnDef::new(ProjectMilestones::Title).string().not_null())
                    .col(ColumnDef::new(ProjectMilestones::Description).text().not_null())
                    .col(
                        ColumnDef::new(ProjectMilestones::DueDate)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ProjectMilestones::Amount).double().not_null())
                    .col(
                        ColumnDef::new(ProjectMilestones::IsCompleted)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(ProjectMilestones::CompletedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(ProjectMilestones::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_project_milestones_chat_room_id")
                            .from(ProjectMilestones::Table, ProjectMilestones::ChatRoomId)
                            .to(ChatRooms::Table, ChatRooms::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Messages::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Messages::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Messages::ChatRoomId).uuid().not_null())
                    .col(ColumnDef::new(Messages::SenderId).uuid().not_null())
                    .col(ColumnDef::new(Messages::Seq).big_integer().not_null())
                    .col(ColumnDef::new(Messages::Content).text().not_null())
                    .col(
                        ColumnDef::new(Messages::MessageType)
                            .string()
                            .not_null()
                            .default("regular"),
                    )
                    .col(
                        ColumnDef::new(Messages::IsRead)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Messages::IsPinned)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Messages::HasAttachment)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Messages::RelatedMilestoneId).uuid().null())
                    .col(ColumnDef::new(Messages::RelatedProposalId).uuid().null())
                    .col(
                        ColumnDef::new(Messages::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_messages_chat_room_id")
                            .from(Messages::Table, Messages::ChatRoomId)
                            .to(ChatRooms::Table, ChatRooms::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_messages_sender_id")
                            .from(Messages::Table, Messages::SenderId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_messages_related_milestone_id")
                            .from(Messages::Table, Messages::RelatedMilestoneId)
                            .to(ProjectMilestones::Table, ProjectMilestones::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(MessageAttachments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MessageAttachments::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(MessageAttachments::MessageId).uuid().not_null())
                    .col(ColumnDef::new(MessageAttachments::UploadedBy).uuid().not_null())
                    .col(ColumnDef::new(MessageAttachments::FileRef).text().not_null())
                    .col(ColumnDef::new(MessageAttachments::FileName).string().not_null())
                    .col(ColumnDef::new(MessageAttachments::FileType).string().not_null())
                    .col(
                        ColumnDef::new(MessageAttachments::Category)
                            .string()
                            .not_null()
                            .default("other"),
                    )
                    .col(ColumnDef::new(MessageAttachments::Description).text().null())
                    .col(
                        ColumnDef::new(MessageAttachments::UploadedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_message_attachments_message_id")
                            .from(MessageAttachments::Table, MessageAttachments::MessageId)
                            .to(Messages::Table, Messages::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_message_attachments_uploaded_by")
                            .from(MessageAttachments::Table, MessageAttachments::UploadedBy)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(MessageAttachments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Messages::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ProjectMilestones::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ChatRooms::Table).to_owned())
            .await
    }
}
