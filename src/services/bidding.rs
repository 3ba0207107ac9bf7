use sea_orm::{DatabaseConnection, TransactionTrait};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::authorization::{require_job_client, require_job_provider};
use crate::db::bids as bid_db;
use crate::db::contracts as contract_db;
use crate::db::jobs::{self as job_db, RouteFacts};
use crate::db::users as user_db;
use crate::error::CoreError;
use crate::external::notify::{EntityRef, NotificationEmitter, NotificationEvent, emit_all};
use crate::external::{LatLng, LedgerService, ProviderDirectory, RouteOracle};
use crate::models::bids::{self, BidStatus, SubmitBid};
use crate::models::contracts::{self, ContractStatus};
use crate::models::jobs::{
    self, CompleteJob, CreateJob, JobDetail, JobFilter, JobListing, JobStatus,
};
use crate::models::notifications::NotificationKind;
use crate::models::templates::{self, SaveTemplate};
use crate::models::users;
use crate::services::eligibility;
use crate::services::pricing;
use crate::services::templates::{self as template_service, TermsContext};

const DEFAULT_PAGE_SIZE: u64 = 20;
const MAX_PAGE_SIZE: u64 = 100;

/// Transport job board: jobs, bids, contracts and the job lifecycle.
///
/// Collaborator lookups (providers, ledger, routes) run before any
/// transaction opens. Notifications are emitted after commit.
#[derive(Clone)]
pub struct BidEngine {
    db: DatabaseConnection,
    notifier: Arc<dyn NotificationEmitter>,
    providers: Arc<dyn ProviderDirectory>,
    ledger: Arc<dyn LedgerService>,
    routes: Arc<dyn RouteOracle>,
}

impl BidEngine {
    pub fn new(
        db: DatabaseConnection,
        notifier: Arc<dyn NotificationEmitter>,
        providers: Arc<dyn ProviderDirectory>,
        ledger: Arc<dyn LedgerService>,
        routes: Arc<dyn RouteOracle>,
    ) -> Self {
        Self {
            db,
            notifier,
            providers,
            ledger,
            routes,
        }
    }

    // ── Jobs ──

    /// Validate, check funds, price the route and store the job OPEN.
    pub async fn create_job(
        &self,
        client_id: Uuid,
        input: CreateJob,
    ) -> Result<jobs::Model, CoreError> {
        if input.pickup_location.trim().is_empty() || input.dropoff_location.trim().is_empty() {
            return Err(CoreError::validation("Pickup and dropoff locations are required"));
        }
        if input.pickup_time <= chrono::Utc::now() {
            return Err(CoreError::validation("Pickup time must be in the future"));
        }
        if !input.budget.is_finite() || input.budget < 0.0 {
            return Err(CoreError::validation("Budget must be zero or more"));
        }
        let origin = LatLng::new(input.pickup_latitude, input.pickup_longitude);
        let dest = LatLng::new(input.dropoff_latitude, input.dropoff_longitude);
        if !origin.is_valid() || !dest.is_valid() {
            return Err(CoreError::validation("Coordinates are out of range"));
        }

        if !self.ledger.check_balance(client_id, input.budget).await? {
            warn!(%client_id, budget = input.budget, "job rejected for insufficient funds");
            return Err(CoreError::InsufficientFunds(input.budget));
        }

        let route = self
            .routes
            .get_route(origin, dest)
            .await?
            .ok_or(CoreError::RouteUnavailable)?;

        let facts = RouteFacts {
            distance_km: route.distance_km,
            estimated_minutes: route.eta_minutes,
            estimated_price: pricing::estimated_price(input.service_type, route.distance_km),
            polyline: route.polyline,
        };
        let job = job_db::insert_job(&self.db, client_id, input, facts).await?;

        info!(
            job_id = %job.id,
            %client_id,
            service_type = %job.service_type,
            distance_km = job.distance_km,
            "transport job created"
        );
        Ok(job)
    }

    pub async fn list_open_jobs(&self, filter: JobFilter) -> Result<Vec<JobListing>, CoreError> {
        let page = filter.page.unwrap_or(1).max(1);
        let limit = filter
            .limit
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE);

        let jobs = job_db::get_open_jobs(&self.db, &filter, page, limit).await?;
        let counts =
            job_db::count_bids_for_jobs(&self.db, jobs.iter().map(|j| j.id).collect()).await?;

        Ok(jobs
            .into_iter()
            .map(|job| JobListing {
                bid_count: counts.get(&job.id).copied().unwrap_or(0),
                job,
            })
            .collect())
    }

    /// Participants see every bid and the contract; anyone else sees only
    /// their own bid.
    pub async fn job_detail(&self, job_id: Uuid, actor: Uuid) -> Result<JobDetail, CoreError> {
        let job = self.load_job(job_id).await?;

        let all_bids = bid_db::get_bids_by_job(&self.db, job.id).await?;
        let participant = job.is_participant(actor);
        let own_bid = all_bids.iter().any(|b| b.provider_id == actor);

        let (bids, contract) = if participant {
            (all_bids, contract_db::get_contract_by_job(&self.db, job.id).await?)
        } else {
            (
                all_bids.into_iter().filter(|b| b.provider_id == actor).collect(),
                None,
            )
        };

        let can_bid = job.status == JobStatus::Open
            && job.client_id != actor
            && !own_bid
            && match self.providers.get_eligibility(actor).await {
                Ok(profile) => eligibility::check_job(&profile, &job).is_ok(),
                Err(_) => false,
            };

        Ok(JobDetail {
            job,
            bids,
            contract,
            can_bid,
        })
    }

    // ── Bids ──

    pub async fn submit_bid(
        &self,
        job_id: Uuid,
        provider_id: Uuid,
        input: SubmitBid,
    ) -> Result<bids::Model, CoreError> {
        if !input.amount.is_finite() || input.amount < 0.0 {
            return Err(CoreError::validation("Bid amount must be zero or more"));
        }

        let job = self.load_job(job_id).await?;
        if job.client_id == provider_id {
            return Err(CoreError::validation("You cannot bid on your own job"));
        }

        let profile = self.providers.get_eligibility(provider_id).await?;
        if let Err(reason) = eligibility::check_job(&profile, &job) {
            warn!(%job_id, %provider_id, %reason, "bid refused");
            return Err(CoreError::IneligibleProvider(reason));
        }

        let txn = self.db.begin().await?;
        let job = job_db::get_job_for_update(&txn, job_id)
            .await?
            .ok_or_else(|| CoreError::not_found(format!("Job {job_id}")))?;
        if job.status != JobStatus::Open {
            return Err(CoreError::JobNotOpen);
        }
        if bid_db::find_bid_by_provider(&txn, job_id, provider_id)
            .await?
            .is_some()
        {
            return Err(CoreError::validation("You have already bid on this job"));
        }
        let bid = bid_db::insert_bid(&txn, job_id, provider_id, input).await?;
        txn.commit().await?;

        info!(bid_id = %bid.id, %job_id, %provider_id, amount = bid.amount, "bid submitted");

        emit_all(
            self.notifier.as_ref(),
            vec![NotificationEvent::new(
                job.client_id,
                NotificationKind::BidSubmitted,
                format!("New Bid on {}", job_label(&job)),
                format!(
                    "Provider {} submitted a bid of E{:.2}.",
                    profile.name, bid.amount
                ),
                EntityRef::Job(job.id),
            )],
        )
        .await;

        Ok(bid)
    }

    /// Client accepts one bid. The contract, the job assignment and every
    /// bid status change land in one transaction.
    pub async fn accept_bid(
        &self,
        bid_id: Uuid,
        actor: Uuid,
    ) -> Result<contracts::Model, CoreError> {
        let bid = bid_db::get_bid_by_id(&self.db, bid_id)
            .await?
            .ok_or_else(|| CoreError::not_found(format!("Bid {bid_id}")))?;
        let job = self.load_job(bid.job_id).await?;
        require_job_client(&job, actor)?;

        if job.status != JobStatus::Open {
            return Err(CoreError::JobNotOpen);
        }
        if bid.status != BidStatus::Pending {
            return Err(CoreError::InvalidTransition {
                from: format!("{:?}", bid.status),
                to: format!("{:?}", BidStatus::Accepted),
            });
        }

        let profile = self.providers.get_eligibility(bid.provider_id).await?;
        if let Err(reason) = eligibility::check_job(&profile, &job) {
            warn!(%bid_id, provider_id = %bid.provider_id, %reason, "acceptance refused");
            return Err(CoreError::IneligibleProvider(reason));
        }
        let client_name = user_db::get_user_by_id(&self.db, job.client_id)
            .await?
            .map(|u| u.full_name())
            .unwrap_or_default();

        let txn = self.db.begin().await?;

        let job = job_db::get_job_for_update(&txn, job.id)
            .await?
            .ok_or_else(|| CoreError::not_found(format!("Job {}", bid.job_id)))?;
        if job.status != JobStatus::Open {
            return Err(CoreError::JobNotOpen);
        }

        let template = template_service::resolve_template(&txn, job.service_type).await?;
        let terms = template_service::render_terms(
            &template.terms,
            &TermsContext {
                service_type: job.service_type.to_string(),
                agreed_amount: bid.amount,
                pickup_location: job.pickup_location.clone(),
                dropoff_location: job.dropoff_location.clone(),
                client_name: client_name.clone(),
                provider_name: profile.name.clone(),
                job_id: job.id.to_string(),
            },
        )?;

        if !job_db::claim_open_job(&txn, job.id, bid.provider_id).await? {
            return Err(CoreError::JobNotOpen);
        }
        let contract = contract_db::insert_contract(
            &txn,
            job.id,
            job.client_id,
            bid.provider_id,
            bid.amount,
            terms,
        )
        .await?;
        bid_db::set_bid_status(&txn, bid.id, BidStatus::Accepted).await?;
        let losers = bid_db::get_pending_bids(&txn, job.id).await?;
        bid_db::reject_pending_bids(&txn, job.id, Some(bid.id)).await?;

        txn.commit().await?;

        info!(
            %bid_id,
            job_id = %job.id,
            contract_id = %contract.id,
            provider_id = %bid.provider_id,
            rejected = losers.iter().filter(|b| b.id != bid.id).count(),
            "bid accepted"
        );

        let label = job_label(&job);
        let mut events = vec![NotificationEvent::new(
            bid.provider_id,
            NotificationKind::BidAccepted,
            format!("Bid Accepted for {label}"),
            format!("Your bid of E{:.2} was accepted by {client_name}.", bid.amount),
            EntityRef::Job(job.id),
        )];
        events.extend(losers.iter().filter(|b| b.id != bid.id).map(|b| {
            NotificationEvent::new(
                b.provider_id,
                NotificationKind::BidRejected,
                format!("Bid Rejected for {label}"),
                "Your bid was not accepted.",
                EntityRef::Job(job.id),
            )
        }));
        emit_all(self.notifier.as_ref(), events).await;

        Ok(contract)
    }

    // ── Contracts ──

    /// Provider confirms a pending contract. Eligibility is checked again
    /// since it may have lapsed after acceptance.
    pub async fn confirm_contract(
        &self,
        contract_id: Uuid,
        actor: Uuid,
    ) -> Result<contracts::Model, CoreError> {
        let contract = contract_db::get_contract_by_id(&self.db, contract_id)
            .await?
            .ok_or_else(|| CoreError::not_found(format!("Contract {contract_id}")))?;

        if contract.provider_id != actor {
            warn!(%contract_id, %actor, "contract confirm denied");
            return Err(CoreError::unauthorized(
                "Only the contracted provider can confirm",
            ));
        }
        if contract.status != ContractStatus::Pending {
            return Err(CoreError::InvalidTransition {
                from: format!("{:?}", contract.status),
                to: format!("{:?}", ContractStatus::Active),
            });
        }

        let job = self.load_job(contract.job_id).await?;
        let profile = self.providers.get_eligibility(actor).await?;
        if let Err(reason) = eligibility::check_job(&profile, &job) {
            warn!(%contract_id, %actor, %reason, "contract confirm refused");
            return Err(CoreError::EligibilityLapsed(reason));
        }

        let txn = self.db.begin().await?;
        if !contract_db::activate_contract(&txn, contract.id).await? {
            return Err(CoreError::InvalidTransition {
                from: "Pending".into(),
                to: "Active".into(),
            });
        }
        let contract = contract_db::get_contract_by_id(&txn, contract.id)
            .await?
            .ok_or_else(|| CoreError::not_found(format!("Contract {contract_id}")))?;
        txn.commit().await?;

        info!(%contract_id, job_id = %job.id, %actor, "contract confirmed");

        emit_all(
            self.notifier.as_ref(),
            vec![NotificationEvent::new(
                job.client_id,
                NotificationKind::ContractConfirmed,
                format!("Contract Confirmed for {}", job_label(&job)),
                format!("Provider {} confirmed the contract.", profile.name),
                EntityRef::Job(job.id),
            )],
        )
        .await;

        Ok(contract)
    }

    // ── Lifecycle ──

    /// Assigned provider starts an accepted job with an active contract.
    pub async fn start_job(&self, job_id: Uuid, actor: Uuid) -> Result<jobs::Model, CoreError> {
        let job = self.load_job(job_id).await?;
        require_job_provider(&job, actor)?;
        ensure_transition(job.status, JobStatus::InProgress)?;

        let contract_active = contract_db::get_contract_by_job(&self.db, job.id)
            .await?
            .is_some_and(|c| c.status == ContractStatus::Active);
        if !contract_active {
            return Err(CoreError::validation(
                "The contract must be confirmed before the job starts",
            ));
        }

        let txn = self.db.begin().await?;
        if !job_db::update_job_status(&txn, job.id, job.status, JobStatus::InProgress).await? {
            return Err(stale_transition(job.status, JobStatus::InProgress));
        }
        let job = self.reload_job(&txn, job_id).await?;
        txn.commit().await?;

        info!(%job_id, %actor, "job started");
        self.notify_status(&job).await;
        Ok(job)
    }

    /// Client closes an in-progress job, optionally rating it.
    pub async fn complete_job(
        &self,
        job_id: Uuid,
        actor: Uuid,
        input: CompleteJob,
    ) -> Result<jobs::Model, CoreError> {
        let job = self.load_job(job_id).await?;
        require_job_client(&job, actor)?;
        ensure_transition(job.status, JobStatus::Completed)?;

        if let Some(rating) = input.rating {
            if !(1..=5).contains(&rating) {
                return Err(CoreError::validation("Rating must be between 1 and 5"));
            }
        }

        let txn = self.db.begin().await?;
        if !job_db::update_job_status(&txn, job.id, job.status, JobStatus::Completed).await? {
            return Err(stale_transition(job.status, JobStatus::Completed));
        }
        let job = self.reload_job(&txn, job_id).await?;
        let job = job_db::record_completion(&txn, job, input.rating, input.review).await?;
        contract_db::set_contract_status_for_job(&txn, job.id, ContractStatus::Completed).await?;
        txn.commit().await?;

        info!(%job_id, %actor, rating = ?job.rating, "job completed");
        self.notify_status(&job).await;
        Ok(job)
    }

    /// Client cancels an open or accepted job.
    pub async fn cancel_job(&self, job_id: Uuid, actor: Uuid) -> Result<jobs::Model, CoreError> {
        let job = self.load_job(job_id).await?;
        require_job_client(&job, actor)?;
        ensure_transition(job.status, JobStatus::Cancelled)?;

        let txn = self.db.begin().await?;
        if !job_db::update_job_status(&txn, job.id, job.status, JobStatus::Cancelled).await? {
            return Err(stale_transition(job.status, JobStatus::Cancelled));
        }
        let rejected = bid_db::reject_pending_bids(&txn, job.id, None).await?;
        contract_db::set_contract_status_for_job(&txn, job.id, ContractStatus::Cancelled).await?;
        let job = self.reload_job(&txn, job_id).await?;
        txn.commit().await?;

        info!(%job_id, %actor, rejected, "job cancelled");
        self.notify_status(&job).await;
        Ok(job)
    }

    /// Client removes an open or cancelled job with its bids and contract.
    pub async fn delete_job(&self, job_id: Uuid, actor: Uuid) -> Result<(), CoreError> {
        let job = self.load_job(job_id).await?;
        require_job_client(&job, actor)?;
        if !matches!(job.status, JobStatus::Open | JobStatus::Cancelled) {
            return Err(CoreError::InvalidTransition {
                from: job.status.to_string(),
                to: "Deleted".into(),
            });
        }

        let bidders: Vec<Uuid> = {
            let mut seen = HashSet::new();
            bid_db::get_bids_by_job(&self.db, job.id)
                .await?
                .into_iter()
                .map(|b| b.provider_id)
                .filter(|p| seen.insert(*p))
                .collect()
        };
        let client_name = user_db::get_user_by_id(&self.db, job.client_id)
            .await?
            .map(|u| u.full_name())
            .unwrap_or_default();

        let txn = self.db.begin().await?;
        bid_db::delete_bids_for_job(&txn, job.id).await?;
        contract_db::delete_contract_for_job(&txn, job.id).await?;
        job_db::delete_job(&txn, job.id).await?;
        txn.commit().await?;

        info!(%job_id, %actor, bidders = bidders.len(), "job deleted");

        let title = format!("{} Deleted", job_label(&job));
        let mut events: Vec<NotificationEvent> = bidders
            .into_iter()
            .map(|provider| {
                NotificationEvent::new(
                    provider,
                    NotificationKind::JobDeleted,
                    title.clone(),
                    format!("The job you bid on was deleted by {client_name}."),
                    EntityRef::None,
                )
            })
            .collect();
        events.push(NotificationEvent::new(
            job.client_id,
            NotificationKind::JobDeleted,
            title,
            "You deleted this job.",
            EntityRef::None,
        ));
        emit_all(self.notifier.as_ref(), events).await;

        Ok(())
    }

    // ── Templates ──

    pub async fn save_template(
        &self,
        actor: &users::Model,
        input: SaveTemplate,
    ) -> Result<templates::Model, CoreError> {
        template_service::save_template(&self.db, actor, input).await
    }

    // ── Internals ──

    async fn load_job(&self, job_id: Uuid) -> Result<jobs::Model, CoreError> {
        job_db::get_job_by_id(&self.db, job_id)
            .await?
            .ok_or_else(|| CoreError::not_found(format!("Job {job_id}")))
    }

    async fn reload_job<C: sea_orm::ConnectionTrait>(
        &self,
        db: &C,
        job_id: Uuid,
    ) -> Result<jobs::Model, CoreError> {
        job_db::get_job_by_id(db, job_id)
            .await?
            .ok_or_else(|| CoreError::not_found(format!("Job {job_id}")))
    }

    async fn notify_status(&self, job: &jobs::Model) {
        emit_all(self.notifier.as_ref(), status_events(job)).await;
    }
}

fn job_label(job: &jobs::Model) -> String {
    format!("{} Job #{}", job.service_type, job.id)
}

fn ensure_transition(from: JobStatus, to: JobStatus) -> Result<(), CoreError> {
    if from.can_transition_to(to) {
        Ok(())
    } else {
        Err(CoreError::InvalidTransition {
            from: from.to_string(),
            to: to.to_string(),
        })
    }
}

fn stale_transition(from: JobStatus, to: JobStatus) -> CoreError {
    CoreError::InvalidTransition {
        from: from.to_string(),
        to: to.to_string(),
    }
}

/// Job status events for the client and, when assigned, the provider.
pub fn status_events(job: &jobs::Model) -> Vec<NotificationEvent> {
    let title = format!("Status Updated for {}", job_label(job));
    let mut events = vec![NotificationEvent::new(
        job.client_id,
        NotificationKind::JobStatusUpdated,
        title.clone(),
        format!("Your job status changed to {}.", job.status),
        EntityRef::Job(job.id),
    )];
    if let Some(provider) = job.provider_id {
        events.push(NotificationEvent::new(
            provider,
            NotificationKind::JobStatusUpdated,
            title,
            format!("The job status changed to {}.", job.status),
            EntityRef::Job(job.id),
        ));
    }
    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::jobs::ServiceType;

    fn job(status: JobStatus, provider: Option<Uuid>) -> jobs::Model {
        let now = chrono::Utc::now();
        jobs::Model {
            id: Uuid::new_v4(),
            client_id: Uuid::new_v4(),
            provider_id: provider,
            service_type: ServiceType::Delivery,
            pickup_location: "A".into(),
            pickup_latitude: 0.0,
            pickup_longitude: 0.0,
            dropoff_location: "B".into(),
            dropoff_latitude: 0.0,
            dropoff_longitude: 0.0,
            pickup_time: now,
            budget: 100.0,
            estimated_price: Some(80.0),
            distance_km: 10.0,
            route_polyline: None,
            estimated_minutes: Some(15),
            description: None,
            status,
            is_urgent: false,
            vehicle_type_required: None,
            rating: None,
            review: None,
            created_at: now,
            completed_at: None,
        }
    }

    #[test]
    fn transitions_follow_the_lifecycle() {
        assert!(ensure_transition(JobStatus::Open, JobStatus::Accepted).is_ok());
        assert!(ensure_transition(JobStatus::Accepted, JobStatus::InProgress).is_ok());
        assert!(ensure_transition(JobStatus::InProgress, JobStatus::Completed).is_ok());
        assert!(ensure_transition(JobStatus::Accepted, JobStatus::Cancelled).is_ok());

        let err = ensure_transition(JobStatus::Completed, JobStatus::Cancelled).unwrap_err();
        assert!(matches!(err, CoreError::InvalidTransition { .. }));
        assert!(ensure_transition(JobStatus::Open, JobStatus::InProgress).is_err());
        assert!(ensure_transition(JobStatus::InProgress, JobStatus::Cancelled).is_err());
    }

    #[test]
    fn status_events_reach_client_and_provider() {
        let provider = Uuid::new_v4();
        let j = job(JobStatus::InProgress, Some(provider));

        let events = status_events(&j);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].recipient, j.client_id);
        assert_eq!(events[1].recipient, provider);
        assert!(events[0].title.starts_with("Status Updated for Delivery Job #"));
        assert_eq!(events[1].body, "The job status changed to In Progress.");
    }

    #[test]
    fn unassigned_job_only_notifies_the_client() {
        let j = job(JobStatus::Cancelled, None);
        assert_eq!(status_events(&j).len(), 1);
    }
}
