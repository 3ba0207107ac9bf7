use sea_orm::prelude::Expr;
use sea_orm::*;
use uuid::Uuid;

use crate::models::contracts::{self, ContractStatus};

/// Insert a new contract (always starts Pending and unconfirmed).
pub async fn insert_contract<C: ConnectionTrait>(
    db: &C,
    job_id: Uuid,
    client_id: Uuid,
    provider_id: Uuid,
    agreed_amount: f64,
    terms: String,
) -> Result<contracts::Model, DbErr> {
    let contract = contracts::ActiveModel {
        id: Set(Uuid::new_v4()),
        job_id: Set(job_id),
        client_id: Set(client_id),
        provider_id: Set(provider_id),
        agreed_amount: Set(agreed_amount),
        terms: Set(terms),
        status: Set(ContractStatus::Pending),
        confirmed_by_provider: Set(false),
        created_at: Set(chrono::Utc::now()),
    };

    contract.insert(db).await
}

pub async fn get_contract_by_id<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> Result<Option<contracts::Model>, DbErr> {
    contracts::Entity::find_by_id(id).one(db).await
}

pub async fn get_contract_by_job<C: ConnectionTrait>(
    db: &C,
    job_id: Uuid,
) -> Result<Option<contracts::Model>, DbErr> {
    contracts::Entity::find()
        .filter(contracts::Column::JobId.eq(job_id))
        .one(db)
        .await
}

/// Mark a pending contract confirmed and active. Returns false if it was not pending.
pub async fn activate_contract<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<bool, DbErr> {
    let result = contracts::Entity::update_many()
        .col_expr(contracts::Column::Status, Expr::value(ContractStatus::Active))
        .col_expr(contracts::Column::ConfirmedByProvider, Expr::value(true))
        .filter(contracts::Column::Id.eq(id))
        .filter(contracts::Column::Status.eq(ContractStatus::Pending))
        .exec(db)
        .await?;

    Ok(result.rows_affected == 1)
}

pub async fn set_contract_status_for_job<C: ConnectionTrait>(
    db: &C,
    job_id: Uuid,
    status: ContractStatus,
) -> Result<(), DbErr> {
    contracts::Entity::update_many()
        .col_expr(contracts::Column::Status, Expr::value(status))
        .filter(contracts::Column::JobId.eq(job_id))
        .exec(db)
        .await?;

    Ok(())
}

pub async fn delete_contract_for_job<C: ConnectionTrait>(
    db: &C,
    job_id: Uuid,
) -> Result<DeleteResult, DbErr> {
    contracts::Entity::delete_many()
        .filter(contracts::Column::JobId.eq(job_id))
        .exec(db)
        .await
}
