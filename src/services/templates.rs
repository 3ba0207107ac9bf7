use sea_orm::{ConnectionTrait, DatabaseConnection, TransactionTrait};
use tracing::info;

use crate::db::templates as template_db;
use crate::error::CoreError;
use crate::models::jobs::ServiceType;
use crate::models::templates::{self, SaveTemplate, TemplateServiceType};
use crate::models::users::{self, Roles};

/// Tokens every contract template must contain.
pub const REQUIRED_PLACEHOLDERS: [&str; 7] = [
    "service_type",
    "agreed_amount",
    "pickup_location",
    "dropoff_location",
    "client_name",
    "provider_name",
    "job_id",
];

/// Values substituted into a contract template.
#[derive(Debug, Clone)]
pub struct TermsContext {
    pub service_type: String,
    pub agreed_amount: f64,
    pub pickup_location: String,
    pub dropoff_location: String,
    pub client_name: String,
    pub provider_name: String,
    pub job_id: String,
}

impl TermsContext {
    fn value(&self, placeholder: &str) -> String {
        match placeholder {
            "service_type" => self.service_type.clone(),
            "agreed_amount" => format!("{:.2}", self.agreed_amount),
            "pickup_location" => self.pickup_location.clone(),
            "dropoff_location" => self.dropoff_location.clone(),
            "client_name" => self.client_name.clone(),
            "provider_name" => self.provider_name.clone(),
            _ => self.job_id.clone(),
        }
    }
}

/// Fail on the first required placeholder the template lacks.
pub fn check_placeholders(template: &str) -> Result<(), CoreError> {
    for placeholder in REQUIRED_PLACEHOLDERS {
        if !template.contains(&format!("{{{placeholder}}}")) {
            return Err(CoreError::MissingPlaceholder(placeholder));
        }
    }
    Ok(())
}

/// Substitute every required placeholder in one pass over the template.
/// Substituted values are never rescanned; unknown `{...}` text is copied.
pub fn render_terms(template: &str, ctx: &TermsContext) -> Result<String, CoreError> {
    check_placeholders(template)?;

    let mut terms = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        terms.push_str(&rest[..open]);
        let tail = &rest[open + 1..];
        let name = tail.find('}').map(|close| &tail[..close]);
        match name.filter(|n| REQUIRED_PLACEHOLDERS.contains(n)) {
            Some(name) => {
                terms.push_str(&ctx.value(name));
                rest = &tail[name.len() + 1..];
            }
            None => {
                terms.push('{');
                rest = tail;
            }
        }
    }
    terms.push_str(rest);

    Ok(terms)
}

/// The active template for the service type, falling back to DEFAULT.
pub async fn resolve_template<C: ConnectionTrait>(
    db: &C,
    service_type: ServiceType,
) -> Result<templates::Model, CoreError> {
    if let Some(t) = template_db::get_active_template(db, service_type.into()).await? {
        return Ok(t);
    }
    template_db::get_active_template(db, TemplateServiceType::Default)
        .await?
        .ok_or_else(|| CoreError::NoActiveTemplate(service_type.to_string()))
}

/// Store a new active template, deactivating any sibling of the same type.
/// A template missing a placeholder is refused before anything changes.
pub async fn save_template(
    db: &DatabaseConnection,
    actor: &users::Model,
    input: SaveTemplate,
) -> Result<templates::Model, CoreError> {
    if actor.role != Roles::Admin {
        return Err(CoreError::unauthorized("Only admins can manage contract templates"));
    }
    if input.terms.trim().is_empty() {
        return Err(CoreError::validation("Template terms cannot be empty"));
    }
    check_placeholders(&input.terms)?;

    let txn = db.begin().await?;
    let template = template_db::replace_active_template(&txn, input.service_type, input.terms).await?;
    txn.commit().await?;

    info!(template_id = %template.id, service_type = ?template.service_type, "contract template saved");
    Ok(template)
}
