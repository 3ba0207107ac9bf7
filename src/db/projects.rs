use sea_orm::*;
use std::collections::HashMap;
use uuid::Uuid;

use crate::models::projects::{self, ProjectStatus};

pub async fn get_project_by_id<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> Result<Option<projects::Model>, DbErr> {
    projects::Entity::find_by_id(id).one(db).await
}

pub async fn update_project_status<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
    status: ProjectStatus,
) -> Result<projects::Model, DbErr> {
    let project = projects::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(DbErr::RecordNotFound("Project not found".to_string()))?;

    let mut active: projects::ActiveModel = project.into();
    active.status = Set(status);

    active.update(db).await
}

/// Fetch many projects at once and return an id -> project map.
pub async fn get_projects_by_ids<C: ConnectionTrait>(
    db: &C,
    ids: Vec<Uuid>,
) -> Result<HashMap<Uuid, projects::Model>, DbErr> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows = projects::Entity::find()
        .filter(projects::Column::Id.is_in(ids))
        .all(db)
        .await?;

    Ok(rows.into_iter().map(|p| (p.id, p)).collect())
}
