use actix_web::{HttpResponse, Responder, web};
use sea_orm::DatabaseConnection;

use crate::auth::middleware::AuthenticatedUser;
use crate::db::notifications as notification_db;
use crate::error::CoreError;
use crate::models::users::UserResponse;

/// GET /api/auth/me: return the currently authenticated user's profile.
pub async fn me(user: AuthenticatedUser) -> impl Responder {
    HttpResponse::Ok().json(UserResponse::from(user.0))
}

/// GET /api/auth/notifications: the caller's notifications, newest first.
pub async fn notifications(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, CoreError> {
    let rows = notification_db::get_notifications_for_user(db.get_ref(), user.0.id).await?;
    Ok(HttpResponse::Ok().json(rows))
}
