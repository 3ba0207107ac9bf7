use sea_orm::*;
use std::collections::HashMap;
use uuid::Uuid;

use crate::models::users::{self, AccountType, CreateUserFromAuth};
use crate::models::{vehicles, wallets};

/// Create a user row from token claims the first time they are seen
/// (called by the auth extractor).
pub async fn find_or_create_from_auth<C: ConnectionTrait>(
    db: &C,
    input: CreateUserFromAuth,
) -> Result<users::Model, DbErr> {
    if let Some(existing) = users::Entity::find_by_id(input.id).one(db).await? {
        return Ok(existing);
    }

    let new_user = users::ActiveModel {
        id: Set(input.id),
        email: Set(input.email),
        username: Set(None),
        display_name: Set(input.display_name),
        role: Set(input.role),
        account_type: Set(AccountType::Regular),
        is_verified: Set(false),
        service_types: Set(None),
        created_at: Set(chrono::Utc::now()),
        updated_at: Set(None),
    };

    new_user.insert(db).await
}

pub async fn get_user_by_id<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> Result<Option<users::Model>, DbErr> {
    users::Entity::find_by_id(id).one(db).await
}

/// Fetch many users at once and return an id -> user map.
pub async fn get_users_by_ids<C: ConnectionTrait>(
    db: &C,
    ids: Vec<Uuid>,
) -> Result<HashMap<Uuid, users::Model>, DbErr> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows = users::Entity::find()
        .filter(users::Column::Id.is_in(ids))
        .all(db)
        .await?;

    Ok(rows.into_iter().map(|u| (u.id, u)).collect())
}

pub async fn get_vehicles_for_owner<C: ConnectionTrait>(
    db: &C,
    owner_id: Uuid,
) -> Result<Vec<vehicles::Model>, DbErr> {
    vehicles::Entity::find()
        .filter(vehicles::Column::OwnerId.eq(owner_id))
        .all(db)
        .await
}

pub async fn get_wallet<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
) -> Result<Option<wallets::Model>, DbErr> {
    wallets::Entity::find()
        .filter(wallets::Column::UserId.eq(user_id))
        .one(db)
        .await
}
