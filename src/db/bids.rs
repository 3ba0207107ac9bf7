use sea_orm::prelude::Expr;
use sea_orm::*;
use uuid::Uuid;

use crate::models::bids::{self, BidStatus, SubmitBid};

pub async fn insert_bid<C: ConnectionTrait>(
    db: &C,
    job_id: Uuid,
    provider_id: Uuid,
    input: SubmitBid,
) -> Result<bids::Model, DbErr> {
    let bid = bids::ActiveModel {
        id: Set(Uuid::new_v4()),
        job_id: Set(job_id),
        provider_id: Set(provider_id),
        amount: Set(input.amount),
        proposal: Set(input.proposal),
        estimated_minutes: Set(input.estimated_minutes),
        status: Set(BidStatus::Pending),
        created_at: Set(chrono::Utc::now()),
    };

    bid.insert(db).await
}

pub async fn get_bid_by_id<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> Result<Option<bids::Model>, DbErr> {
    bids::Entity::find_by_id(id).one(db).await
}

pub async fn find_bid_by_provider<C: ConnectionTrait>(
    db: &C,
    job_id: Uuid,
    provider_id: Uuid,
) -> Result<Option<bids::Model>, DbErr> {
    bids::Entity::find()
        .filter(bids::Column::JobId.eq(job_id))
        .filter(bids::Column::ProviderId.eq(provider_id))
        .one(db)
        .await
}

/// All bids on a job, newest first.
pub async fn get_bids_by_job<C: ConnectionTrait>(
    db: &C,
    job_id: Uuid,
) -> Result<Vec<bids::Model>, DbErr> {
    bids::Entity::find()
        .filter(bids::Column::JobId.eq(job_id))
        .order_by_desc(bids::Column::CreatedAt)
        .all(db)
        .await
}

pub async fn get_pending_bids<C: ConnectionTrait>(
    db: &C,
    job_id: Uuid,
) -> Result<Vec<bids::Model>, DbErr> {
    bids::Entity::find()
        .filter(bids::Column::JobId.eq(job_id))
        .filter(bids::Column::Status.eq(BidStatus::Pending))
        .all(db)
        .await
}

pub async fn set_bid_status<C: ConnectionTrait>(
    db: &C,
    bid_id: Uuid,
    status: BidStatus,
) -> Result<(), DbErr> {
    bids::Entity::update_many()
        .col_expr(bids::Column::Status, Expr::value(status))
        .filter(bids::Column::Id.eq(bid_id))
        .exec(db)
        .await?;

    Ok(())
}

/// Reject every PENDING bid on the job except `keep`.
pub async fn reject_pending_bids<C: ConnectionTrait>(
    db: &C,
    job_id: Uuid,
    keep: Option<Uuid>,
) -> Result<u64, DbErr> {
    let mut update = bids::Entity::update_many()
        .col_expr(bids::Column::Status, Expr::value(BidStatus::Rejected))
        .filter(bids::Column::JobId.eq(job_id))
        .filter(bids::Column::Status.eq(BidStatus::Pending));

    if let Some(keep) = keep {
        update = update.filter(bids::Column::Id.ne(keep));
    }

    Ok(update.exec(db).await?.rows_affected)
}

pub async fn delete_bids_for_job<C: ConnectionTrait>(db: &C, job_id: Uuid) -> Result<u64, DbErr> {
    let result = bids::Entity::delete_many()
        .filter(bids::Column::JobId.eq(job_id))
        .exec(db)
        .await?;

    Ok(result.rows_affected)
}
