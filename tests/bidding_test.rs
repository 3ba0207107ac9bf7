//! Transport bidding integration tests against in-memory SQLite.
//!
//! Run with: `cargo test --test bidding_test`
mod common;

use chrono::{Duration, Utc};
use sea_orm::{EntityTrait, PaginatorTrait};

use common::*;
use marketplace_core::db::templates as template_db;
use marketplace_core::error::CoreError;
use marketplace_core::external::EntityRef;
use marketplace_core::models::bids::{self, BidStatus, SubmitBid};
use marketplace_core::models::contracts::{self, ContractStatus};
use marketplace_core::models::jobs::{self, CompleteJob, JobFilter, JobStatus, ServiceType};
use marketplace_core::models::notifications::NotificationKind;
use marketplace_core::models::templates::{SaveTemplate, TemplateServiceType};
use marketplace_core::models::users::{self, Roles, ServiceTypes};
use marketplace_core::models::vehicles::VehicleType;
use marketplace_core::services::eligibility::Ineligibility;
use marketplace_core::services::pricing;

struct Board {
    h: TransportHarness,
    client: users::Model,
    job: jobs::Model,
}

async fn board_with(service_type: ServiceType) -> Board {
    let h = transport_harness(true, StaticRoutes::km(12.0)).await;
    let client = insert_user(&h.db, "Thandi", Roles::Client).await;
    let job = h
        .engine
        .create_job(client.id, job_input(service_type, 150.0))
        .await
        .unwrap();
    Board { h, client, job }
}

async fn board() -> Board {
    board_with(ServiceType::Taxi).await
}

fn bid(amount: f64) -> SubmitBid {
    SubmitBid {
        amount,
        proposal: Some("Clean car, on time".into()),
        estimated_minutes: Some(20),
    }
}

async fn job_row(b: &Board) -> jobs::Model {
    jobs::Entity::find_by_id(b.job.id)
        .one(&b.h.db)
        .await
        .unwrap()
        .unwrap()
}

async fn bid_row(b: &Board, id: uuid::Uuid) -> bids::Model {
    bids::Entity::find_by_id(id)
        .one(&b.h.db)
        .await
        .unwrap()
        .unwrap()
}

// ── createJob ──

#[tokio::test]
async fn job_is_priced_once_from_the_route() {
    let b = board().await;

    assert_eq!(b.job.status, JobStatus::Open);
    assert_eq!(b.job.distance_km, 12.0);
    assert_eq!(b.job.estimated_minutes, Some(25));
    assert_eq!(
        b.job.estimated_price,
        Some(pricing::estimated_price(ServiceType::Taxi, 12.0))
    );
    assert_eq!(b.job.estimated_price, Some(150.0));
    assert_eq!(b.h.routes.calls(), 1);
}

#[tokio::test]
async fn insufficient_funds_stops_before_routing() {
    let h = transport_harness(false, StaticRoutes::km(5.0)).await;
    let client = insert_user(&h.db, "Thandi", Roles::Client).await;

    let err = h
        .engine
        .create_job(client.id, job_input(ServiceType::Taxi, 900.0))
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::InsufficientFunds(b) if b == 900.0));
    assert_eq!(h.routes.calls(), 0);
    assert_eq!(jobs::Entity::find().count(&h.db).await.unwrap(), 0);
}

#[tokio::test]
async fn missing_route_persists_nothing() {
    let h = transport_harness(true, StaticRoutes::none()).await;
    let client = insert_user(&h.db, "Thandi", Roles::Client).await;

    let err = h
        .engine
        .create_job(client.id, job_input(ServiceType::Delivery, 100.0))
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::RouteUnavailable));
    assert_eq!(err.kind(), "route_unavailable");
    assert_eq!(jobs::Entity::find().count(&h.db).await.unwrap(), 0);
}

#[tokio::test]
async fn job_input_is_validated_first() {
    let h = transport_harness(false, StaticRoutes::km(5.0)).await;
    let client = insert_user(&h.db, "Thandi", Roles::Client).await;

    let mut past = job_input(ServiceType::Taxi, 100.0);
    past.pickup_time = Utc::now() - Duration::hours(1);
    let err = h.engine.create_job(client.id, past).await.unwrap_err();
    assert!(matches!(err, CoreError::Validation(_)));

    let mut off_map = job_input(ServiceType::Taxi, 100.0);
    off_map.pickup_latitude = 123.0;
    let err = h.engine.create_job(client.id, off_map).await.unwrap_err();
    assert!(matches!(err, CoreError::Validation(_)));

    assert_eq!(h.routes.calls(), 0);
}

// ── submitBid ──

#[tokio::test]
async fn eligible_provider_bids_and_client_is_notified() {
    let b = board().await;
    let provider = insert_provider(&b.h.db, "Sipho", ServiceTypes::Taxi).await;

    let placed = b
        .h
        .engine
        .submit_bid(b.job.id, provider.id, bid(120.0))
        .await
        .unwrap();
    assert_eq!(placed.status, BidStatus::Pending);

    let events = b.h.emitter.of_kind(NotificationKind::BidSubmitted);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].recipient, b.client.id);
    assert_eq!(events[0].link, EntityRef::Job(b.job.id));
    assert_eq!(events[0].body, "Provider Sipho submitted a bid of E120.00.");

    let err = b
        .h
        .engine
        .submit_bid(b.job.id, provider.id, bid(110.0))
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Validation(_)));
}

#[tokio::test]
async fn ineligible_providers_cannot_bid() {
    let b = board().await;

    let regular = insert_user(&b.h.db, "Zodwa", Roles::Client).await;
    let err = b
        .h
        .engine
        .submit_bid(b.job.id, regular.id, bid(100.0))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        CoreError::IneligibleProvider(Ineligibility::NotProvider)
    ));

    let unverified = insert_provider(&b.h.db, "Musa", ServiceTypes::Taxi).await;
    set_verified(&b.h.db, &unverified, false).await;
    let err = b
        .h
        .engine
        .submit_bid(b.job.id, unverified.id, bid(100.0))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        CoreError::IneligibleProvider(Ineligibility::Unverified)
    ));

    let courier = insert_provider(&b.h.db, "Lindiwe", ServiceTypes::Delivery).await;
    let err = b
        .h
        .engine
        .submit_bid(b.job.id, courier.id, bid(100.0))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        CoreError::IneligibleProvider(Ineligibility::ServiceTypeMismatch(ServiceType::Taxi))
    ));
    assert_eq!(err.kind(), "ineligible_provider");

    assert_eq!(bids::Entity::find().count(&b.h.db).await.unwrap(), 0);
}

#[tokio::test]
async fn delivery_needs_a_verified_vehicle_of_the_required_type() {
    let h = transport_harness(true, StaticRoutes::km(8.0)).await;
    let client = insert_user(&h.db, "Thandi", Roles::Client).await;
    let mut input = job_input(ServiceType::Delivery, 200.0);
    input.vehicle_type_required = Some(VehicleType::Van);
    let job = h.engine.create_job(client.id, input).await.unwrap();

    let courier = insert_provider(&h.db, "Lindiwe", ServiceTypes::Delivery).await;
    insert_vehicle(&h.db, courier.id, VehicleType::Van, false).await;
    let err = h
        .engine
        .submit_bid(job.id, courier.id, bid(180.0))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        CoreError::IneligibleProvider(Ineligibility::MissingVehicle(VehicleType::Van))
    ));

    insert_vehicle(&h.db, courier.id, VehicleType::Van, true).await;
    h.engine
        .submit_bid(job.id, courier.id, bid(180.0))
        .await
        .unwrap();
}

// ── acceptBid ──

#[tokio::test]
async fn accepting_a_bid_assigns_the_job_and_rejects_the_rest() {
    let b = board().await;
    insert_template(&b.h.db, TemplateServiceType::Taxi, FULL_TEMPLATE).await;

    let winner = insert_provider(&b.h.db, "Sipho", ServiceTypes::Taxi).await;
    let loser_a = insert_provider(&b.h.db, "Musa", ServiceTypes::Both).await;
    let loser_b = insert_provider(&b.h.db, "Ayanda", ServiceTypes::Taxi).await;

    let winning = b.h.engine.submit_bid(b.job.id, winner.id, bid(120.0)).await.unwrap();
    let a = b.h.engine.submit_bid(b.job.id, loser_a.id, bid(130.0)).await.unwrap();
    let c = b.h.engine.submit_bid(b.job.id, loser_b.id, bid(140.0)).await.unwrap();
    b.h.emitter.reset();

    let contract = b.h.engine.accept_bid(winning.id, b.client.id).await.unwrap();

    assert_eq!(contract.status, ContractStatus::Pending);
    assert!(!contract.confirmed_by_provider);
    assert_eq!(contract.agreed_amount, 120.0);
    assert_eq!(contract.provider_id, winner.id);
    assert_eq!(
        contract.terms,
        format!(
            "Taxi job {}: Thandi pays Sipho E120.00 to go from Mbabane Bus Rank to Manzini Market.",
            b.job.id
        )
    );

    let job = job_row(&b).await;
    assert_eq!(job.status, JobStatus::Accepted);
    assert_eq!(job.provider_id, Some(winner.id));

    assert_eq!(bid_row(&b, winning.id).await.status, BidStatus::Accepted);
    assert_eq!(bid_row(&b, a.id).await.status, BidStatus::Rejected);
    assert_eq!(bid_row(&b, c.id).await.status, BidStatus::Rejected);

    let accepted = b.h.emitter.of_kind(NotificationKind::BidAccepted);
    assert_eq!(accepted.len(), 1);
    assert_eq!(accepted[0].recipient, winner.id);

    let mut rejected: Vec<_> = b
        .h
        .emitter
        .of_kind(NotificationKind::BidRejected)
        .into_iter()
        .map(|e| e.recipient)
        .collect();
    rejected.sort();
    let mut expected = vec![loser_a.id, loser_b.id];
    expected.sort();
    assert_eq!(rejected, expected);
}

#[tokio::test]
async fn only_the_client_accepts() {
    let b = board().await;
    insert_template(&b.h.db, TemplateServiceType::Default, FULL_TEMPLATE).await;
    let provider = insert_provider(&b.h.db, "Sipho", ServiceTypes::Taxi).await;
    let placed = b.h.engine.submit_bid(b.job.id, provider.id, bid(100.0)).await.unwrap();

    let err = b.h.engine.accept_bid(placed.id, provider.id).await.unwrap_err();
    assert!(matches!(err, CoreError::Unauthorized(_)));
    assert_eq!(job_row(&b).await.status, JobStatus::Open);
}

#[tokio::test]
async fn default_template_is_the_fallback() {
    let b = board_with(ServiceType::Delivery).await;
    insert_template(&b.h.db, TemplateServiceType::Taxi, "taxi only").await;
    insert_template(&b.h.db, TemplateServiceType::Default, FULL_TEMPLATE).await;
    let courier = insert_provider(&b.h.db, "Lindiwe", ServiceTypes::Delivery).await;
    let placed = b.h.engine.submit_bid(b.job.id, courier.id, bid(90.0)).await.unwrap();

    let contract = b.h.engine.accept_bid(placed.id, b.client.id).await.unwrap();
    assert!(contract.terms.starts_with("Delivery job"));
}

#[tokio::test]
async fn missing_placeholder_rolls_back_everything() {
    let b = board().await;
    insert_template(
        &b.h.db,
        TemplateServiceType::Taxi,
        "{service_type} {agreed_amount} {pickup_location} {dropoff_location} {client_name} {provider_name}",
    )
    .await;
    let first = insert_provider(&b.h.db, "Sipho", ServiceTypes::Taxi).await;
    let second = insert_provider(&b.h.db, "Musa", ServiceTypes::Taxi).await;
    let winning = b.h.engine.submit_bid(b.job.id, first.id, bid(100.0)).await.unwrap();
    let other = b.h.engine.submit_bid(b.job.id, second.id, bid(110.0)).await.unwrap();
    b.h.emitter.reset();

    let err = b.h.engine.accept_bid(winning.id, b.client.id).await.unwrap_err();
    assert!(matches!(err, CoreError::MissingPlaceholder("job_id")));

    let job = job_row(&b).await;
    assert_eq!(job.status, JobStatus::Open);
    assert_eq!(job.provider_id, None);
    assert_eq!(bid_row(&b, winning.id).await.status, BidStatus::Pending);
    assert_eq!(bid_row(&b, other.id).await.status, BidStatus::Pending);
    assert_eq!(contracts::Entity::find().count(&b.h.db).await.unwrap(), 0);
    assert!(b.h.emitter.events().is_empty());
}

#[tokio::test]
async fn no_template_at_all_is_reported() {
    let b = board().await;
    let provider = insert_provider(&b.h.db, "Sipho", ServiceTypes::Taxi).await;
    let placed = b.h.engine.submit_bid(b.job.id, provider.id, bid(100.0)).await.unwrap();

    let err = b.h.engine.accept_bid(placed.id, b.client.id).await.unwrap_err();
    assert!(matches!(err, CoreError::NoActiveTemplate(_)));
    assert_eq!(job_row(&b).await.status, JobStatus::Open);
    assert_eq!(bid_row(&b, placed.id).await.status, BidStatus::Pending);
}

#[tokio::test]
async fn concurrent_accepts_produce_one_contract() {
    let b = board().await;
    insert_template(&b.h.db, TemplateServiceType::Taxi, FULL_TEMPLATE).await;
    let first = insert_provider(&b.h.db, "Sipho", ServiceTypes::Taxi).await;
    let second = insert_provider(&b.h.db, "Musa", ServiceTypes::Taxi).await;
    let bid_a = b.h.engine.submit_bid(b.job.id, first.id, bid(100.0)).await.unwrap();
    let bid_b = b.h.engine.submit_bid(b.job.id, second.id, bid(105.0)).await.unwrap();

    let (ra, rb) = tokio::join!(
        b.h.engine.accept_bid(bid_a.id, b.client.id),
        b.h.engine.accept_bid(bid_b.id, b.client.id),
    );

    let oks = [ra.is_ok(), rb.is_ok()].iter().filter(|ok| **ok).count();
    assert_eq!(oks, 1);
    let err = ra.err().or(rb.err()).unwrap();
    assert!(matches!(err, CoreError::JobNotOpen));

    assert_eq!(contracts::Entity::find().count(&b.h.db).await.unwrap(), 1);
    let accepted = bids::Entity::find()
        .all(&b.h.db)
        .await
        .unwrap()
        .into_iter()
        .filter(|bid| bid.status == BidStatus::Accepted)
        .count();
    assert_eq!(accepted, 1);
}

#[tokio::test]
async fn bids_on_a_taken_job_are_refused() {
    let b = board().await;
    insert_template(&b.h.db, TemplateServiceType::Taxi, FULL_TEMPLATE).await;
    let first = insert_provider(&b.h.db, "Sipho", ServiceTypes::Taxi).await;
    let late = insert_provider(&b.h.db, "Musa", ServiceTypes::Taxi).await;
    let placed = b.h.engine.submit_bid(b.job.id, first.id, bid(100.0)).await.unwrap();
    b.h.engine.accept_bid(placed.id, b.client.id).await.unwrap();

    let err = b.h.engine.submit_bid(b.job.id, late.id, bid(90.0)).await.unwrap_err();
    assert!(matches!(err, CoreError::JobNotOpen));
}

// ── confirmContract and lifecycle ──

struct Assigned {
    b: Board,
    provider: users::Model,
    contract: contracts::Model,
}

async fn assigned() -> Assigned {
    let b = board().await;
    insert_template(&b.h.db, TemplateServiceType::Taxi, FULL_TEMPLATE).await;
    let provider = insert_provider(&b.h.db, "Sipho", ServiceTypes::Taxi).await;
    let placed = b.h.engine.submit_bid(b.job.id, provider.id, bid(100.0)).await.unwrap();
    let contract = b.h.engine.accept_bid(placed.id, b.client.id).await.unwrap();
    b.h.emitter.reset();
    Assigned {
        b,
        provider,
        contract,
    }
}

#[tokio::test]
async fn confirm_rechecks_eligibility() {
    let a = assigned().await;

    let err = a
        .b
        .h
        .engine
        .confirm_contract(a.contract.id, a.b.client.id)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Unauthorized(_)));

    set_verified(&a.b.h.db, &a.provider, false).await;
    let err = a
        .b
        .h
        .engine
        .confirm_contract(a.contract.id, a.provider.id)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        CoreError::EligibilityLapsed(Ineligibility::Unverified)
    ));
    let stored = contracts::Entity::find_by_id(a.contract.id)
        .one(&a.b.h.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, ContractStatus::Pending);
    assert!(!stored.confirmed_by_provider);

    set_verified(&a.b.h.db, &a.provider, true).await;
    let confirmed = a
        .b
        .h
        .engine
        .confirm_contract(a.contract.id, a.provider.id)
        .await
        .unwrap();
    assert_eq!(confirmed.status, ContractStatus::Active);
    assert!(confirmed.confirmed_by_provider);

    let events = a.b.h.emitter.of_kind(NotificationKind::ContractConfirmed);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].recipient, a.b.client.id);

    let err = a
        .b
        .h
        .engine
        .confirm_contract(a.contract.id, a.provider.id)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::InvalidTransition { .. }));
}

#[tokio::test]
async fn job_runs_through_its_lifecycle() {
    let a = assigned().await;
    let engine = &a.b.h.engine;
    let job_id = a.b.job.id;

    let err = engine.start_job(job_id, a.provider.id).await.unwrap_err();
    assert!(matches!(err, CoreError::Validation(_)));

    engine
        .confirm_contract(a.contract.id, a.provider.id)
        .await
        .unwrap();

    let err = engine.start_job(job_id, a.b.client.id).await.unwrap_err();
    assert!(matches!(err, CoreError::Unauthorized(_)));

    a.b.h.emitter.reset();
    let started = engine.start_job(job_id, a.provider.id).await.unwrap();
    assert_eq!(started.status, JobStatus::InProgress);

    let updates = a.b.h.emitter.of_kind(NotificationKind::JobStatusUpdated);
    assert_eq!(updates.len(), 2);
    assert!(updates.iter().any(|e| e.recipient == a.b.client.id));
    assert!(updates.iter().any(|e| e.recipient == a.provider.id));

    let err = engine
        .complete_job(
            job_id,
            a.b.client.id,
            CompleteJob {
                rating: Some(6),
                review: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Validation(_)));

    let done = engine
        .complete_job(
            job_id,
            a.b.client.id,
            CompleteJob {
                rating: Some(5),
                review: Some("Smooth ride".into()),
            },
        )
        .await
        .unwrap();
    assert_eq!(done.status, JobStatus::Completed);
    assert_eq!(done.rating, Some(5));
    assert!(done.completed_at.is_some());

    let contract = contracts::Entity::find_by_id(a.contract.id)
        .one(&a.b.h.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(contract.status, ContractStatus::Completed);

    let err = engine.cancel_job(job_id, a.b.client.id).await.unwrap_err();
    assert!(matches!(err, CoreError::InvalidTransition { .. }));
    assert_eq!(err.kind(), "invalid_transition");
}

#[tokio::test]
async fn cancelling_an_accepted_job_cancels_its_contract() {
    let a = assigned().await;

    let cancelled = a
        .b
        .h
        .engine
        .cancel_job(a.b.job.id, a.b.client.id)
        .await
        .unwrap();
    assert_eq!(cancelled.status, JobStatus::Cancelled);

    let contract = contracts::Entity::find_by_id(a.contract.id)
        .one(&a.b.h.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(contract.status, ContractStatus::Cancelled);
}

#[tokio::test]
async fn cancelling_an_open_job_rejects_pending_bids() {
    let b = board().await;
    let provider = insert_provider(&b.h.db, "Sipho", ServiceTypes::Taxi).await;
    let placed = b.h.engine.submit_bid(b.job.id, provider.id, bid(100.0)).await.unwrap();

    b.h.engine.cancel_job(b.job.id, b.client.id).await.unwrap();
    assert_eq!(bid_row(&b, placed.id).await.status, BidStatus::Rejected);
}

#[tokio::test]
async fn delete_job_notifies_bidders() {
    let b = board().await;
    let first = insert_provider(&b.h.db, "Sipho", ServiceTypes::Taxi).await;
    let second = insert_provider(&b.h.db, "Musa", ServiceTypes::Taxi).await;
    b.h.engine.submit_bid(b.job.id, first.id, bid(100.0)).await.unwrap();
    b.h.engine.submit_bid(b.job.id, second.id, bid(101.0)).await.unwrap();
    b.h.emitter.reset();

    let err = b.h.engine.delete_job(b.job.id, first.id).await.unwrap_err();
    assert!(matches!(err, CoreError::Unauthorized(_)));

    b.h.engine.delete_job(b.job.id, b.client.id).await.unwrap();
    assert_eq!(jobs::Entity::find().count(&b.h.db).await.unwrap(), 0);
    assert_eq!(bids::Entity::find().count(&b.h.db).await.unwrap(), 0);

    let deleted = b.h.emitter.of_kind(NotificationKind::JobDeleted);
    assert_eq!(deleted.len(), 3);
    assert!(deleted.iter().all(|e| e.link == EntityRef::None));
}

#[tokio::test]
async fn accepted_job_cannot_be_deleted() {
    let a = assigned().await;
    let err = a
        .b
        .h
        .engine
        .delete_job(a.b.job.id, a.b.client.id)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::InvalidTransition { .. }));
}

// ── Board and detail ──

#[tokio::test]
async fn open_jobs_list_with_bid_counts_and_search() {
    let b = board().await;
    let mut other = job_input(ServiceType::Delivery, 80.0);
    other.pickup_location = "Ezulwini Valley".into();
    b.h.engine.create_job(b.client.id, other).await.unwrap();

    let provider = insert_provider(&b.h.db, "Sipho", ServiceTypes::Taxi).await;
    b.h.engine.submit_bid(b.job.id, provider.id, bid(100.0)).await.unwrap();

    let all = b.h.engine.list_open_jobs(JobFilter::default()).await.unwrap();
    assert_eq!(all.len(), 2);
    let taxi = all.iter().find(|l| l.job.id == b.job.id).unwrap();
    assert_eq!(taxi.bid_count, 1);

    let found = b
        .h
        .engine
        .list_open_jobs(JobFilter {
            search: Some("ezulwini".into()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].job.service_type, ServiceType::Delivery);

    let taxis = b
        .h
        .engine
        .list_open_jobs(JobFilter {
            service_type: Some(ServiceType::Taxi),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(taxis.len(), 1);
}

#[tokio::test]
async fn job_detail_scopes_bids_and_reports_can_bid() {
    let b = board().await;
    let sipho = insert_provider(&b.h.db, "Sipho", ServiceTypes::Taxi).await;
    let musa = insert_provider(&b.h.db, "Musa", ServiceTypes::Taxi).await;
    let newcomer = insert_provider(&b.h.db, "Ayanda", ServiceTypes::Taxi).await;
    b.h.engine.submit_bid(b.job.id, sipho.id, bid(100.0)).await.unwrap();
    b.h.engine.submit_bid(b.job.id, musa.id, bid(110.0)).await.unwrap();

    let as_client = b.h.engine.job_detail(b.job.id, b.client.id).await.unwrap();
    assert_eq!(as_client.bids.len(), 2);
    assert!(!as_client.can_bid);

    let as_bidder = b.h.engine.job_detail(b.job.id, sipho.id).await.unwrap();
    assert_eq!(as_bidder.bids.len(), 1);
    assert_eq!(as_bidder.bids[0].provider_id, sipho.id);
    assert!(!as_bidder.can_bid);

    let as_newcomer = b.h.engine.job_detail(b.job.id, newcomer.id).await.unwrap();
    assert!(as_newcomer.bids.is_empty());
    assert!(as_newcomer.can_bid);
}

// ── Templates ──

#[tokio::test]
async fn saving_a_template_replaces_the_active_one() {
    let h = transport_harness(true, StaticRoutes::km(5.0)).await;
    let admin = insert_user(&h.db, "Admin", Roles::Admin).await;
    let client = insert_user(&h.db, "Thandi", Roles::Client).await;

    let input = || SaveTemplate {
        service_type: TemplateServiceType::Taxi,
        terms: FULL_TEMPLATE.to_string(),
    };

    let err = h.engine.save_template(&client, input()).await.unwrap_err();
    assert!(matches!(err, CoreError::Unauthorized(_)));

    let first = h.engine.save_template(&admin, input()).await.unwrap();
    let second = h.engine.save_template(&admin, input()).await.unwrap();
    assert_ne!(first.id, second.id);

    assert_eq!(
        template_db::count_active_templates(&h.db, TemplateServiceType::Taxi)
            .await
            .unwrap(),
        1
    );
    let active = template_db::get_active_template(&h.db, TemplateServiceType::Taxi)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(active.id, second.id);
}

#[tokio::test]
async fn broken_template_is_refused_and_keeps_the_active_one() {
    let h = transport_harness(true, StaticRoutes::km(5.0)).await;
    let admin = insert_user(&h.db, "Admin", Roles::Admin).await;

    let good = h
        .engine
        .save_template(
            &admin,
            SaveTemplate {
                service_type: TemplateServiceType::Taxi,
                terms: FULL_TEMPLATE.to_string(),
            },
        )
        .await
        .unwrap();

    let err = h
        .engine
        .save_template(
            &admin,
            SaveTemplate {
                service_type: TemplateServiceType::Taxi,
                terms: FULL_TEMPLATE.replace("{provider_name}", "the driver"),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::MissingPlaceholder("provider_name")));

    let active = template_db::get_active_template(&h.db, TemplateServiceType::Taxi)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(active.id, good.id);
    assert_eq!(
        template_db::count_active_templates(&h.db, TemplateServiceType::Taxi)
            .await
            .unwrap(),
        1
    );
}

#[tokio::test]
async fn locations_with_braces_render_verbatim_into_terms() {
    let h = transport_harness(true, StaticRoutes::km(12.0)).await;
    let client = insert_user(&h.db, "Thandi", Roles::Client).await;
    let mut input = job_input(ServiceType::Taxi, 150.0);
    input.pickup_location = "Stand {service_type}".into();
    input.dropoff_location = "Gate {client_name}".into();
    let job = h.engine.create_job(client.id, input).await.unwrap();

    insert_template(&h.db, TemplateServiceType::Taxi, FULL_TEMPLATE).await;
    let provider = insert_provider(&h.db, "Sipho", ServiceTypes::Taxi).await;
    let placed = h.engine.submit_bid(job.id, provider.id, bid(120.0)).await.unwrap();

    let contract = h.engine.accept_bid(placed.id, client.id).await.unwrap();
    assert_eq!(
        contract.terms,
        format!(
            "Taxi job {}: Thandi pays Sipho E120.00 to go from Stand {{service_type}} to Gate {{client_name}}.",
            job.id
        )
    );
}
