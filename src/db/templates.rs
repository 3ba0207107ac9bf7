use sea_orm::prelude::Expr;
use sea_orm::*;
use uuid::Uuid;

use crate::models::templates::{self, TemplateServiceType};

/// The active template for a service type, newest first if several slipped through.
pub async fn get_active_template<C: ConnectionTrait>(
    db: &C,
    service_type: TemplateServiceType,
) -> Result<Option<templates::Model>, DbErr> {
    templates::Entity::find()
        .filter(templates::Column::ServiceType.eq(service_type))
        .filter(templates::Column::IsActive.eq(true))
        .order_by_desc(templates::Column::UpdatedAt)
        .one(db)
        .await
}

/// Deactivate every active template for the type, then insert the new one active.
pub async fn replace_active_template<C: ConnectionTrait>(
    db: &C,
    service_type: TemplateServiceType,
    terms: String,
) -> Result<templates::Model, DbErr> {
    let now = chrono::Utc::now();

    templates::Entity::update_many()
        .col_expr(templates::Column::IsActive, Expr::value(false))
        .col_expr(templates::Column::UpdatedAt, Expr::value(now))
        .filter(templates::Column::ServiceType.eq(service_type))
        .filter(templates::Column::IsActive.eq(true))
        .exec(db)
        .await?;

    let template = templates::ActiveModel {
        id: Set(Uuid::new_v4()),
        service_type: Set(service_type),
        terms: Set(terms),
        is_active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
    };

    template.insert(db).await
}

pub async fn count_active_templates<C: ConnectionTrait>(
    db: &C,
    service_type: TemplateServiceType,
) -> Result<u64, DbErr> {
    templates::Entity::find()
        .filter(templates::Column::ServiceType.eq(service_type))
        .filter(templates::Column::IsActive.eq(true))
        .count(db)
        .await
}
