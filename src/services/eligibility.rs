use thiserror::Error;

use crate::external::ProviderProfile;
use crate::models::jobs::{self, ServiceType};
use crate::models::users::AccountType;
use crate::models::vehicles::VehicleType;

/// Why a provider may not bid on or fulfil a job.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Ineligibility {
    #[error("account is not a provider account")]
    NotProvider,
    #[error("provider is not verified")]
    Unverified,
    #[error("provider does not offer {0} service")]
    ServiceTypeMismatch(ServiceType),
    #[error("provider has no verified {0}")]
    MissingVehicle(VehicleType),
}

/// Check a provider against a service type and optional vehicle requirement.
/// The vehicle requirement only applies to delivery jobs.
pub fn check(
    profile: &ProviderProfile,
    service_type: ServiceType,
    vehicle_required: Option<VehicleType>,
) -> Result<(), Ineligibility> {
    if profile.account_type != AccountType::Provider {
        return Err(Ineligibility::NotProvider);
    }
    if !profile.verified {
        return Err(Ineligibility::Unverified);
    }
    if !profile
        .service_types
        .is_some_and(|declared| declared.covers(service_type))
    {
        return Err(Ineligibility::ServiceTypeMismatch(service_type));
    }

    if service_type == ServiceType::Delivery {
        if let Some(required) = vehicle_required {
            let has_vehicle = profile
                .vehicles
                .iter()
                .any(|v| v.verified && v.vehicle_type == required);
            if !has_vehicle {
                return Err(Ineligibility::MissingVehicle(required));
            }
        }
    }

    Ok(())
}

pub fn check_job(profile: &ProviderProfile, job: &jobs::Model) -> Result<(), Ineligibility> {
    check(profile, job.service_type, job.vehicle_type_required)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external::VehicleSummary;
    use crate::models::users::ServiceTypes;
    use uuid::Uuid;

    fn provider(service_types: ServiceTypes) -> ProviderProfile {
        ProviderProfile {
            user_id: Uuid::new_v4(),
            name: "Sipho".into(),
            account_type: AccountType::Provider,
            verified: true,
            service_types: Some(service_types),
            vehicles: vec![],
        }
    }

    #[test]
    fn verified_taxi_provider_can_take_taxi_jobs() {
        assert_eq!(check(&provider(ServiceTypes::Taxi), ServiceType::Taxi, None), Ok(()));
        assert_eq!(check(&provider(ServiceTypes::Both), ServiceType::Taxi, None), Ok(()));
    }

    #[test]
    fn regular_accounts_are_rejected_first() {
        let mut p = provider(ServiceTypes::Taxi);
        p.account_type = AccountType::Regular;
        p.verified = false;
        assert_eq!(
            check(&p, ServiceType::Taxi, None),
            Err(Ineligibility::NotProvider)
        );
    }

    #[test]
    fn unverified_provider_is_rejected() {
        let mut p = provider(ServiceTypes::Both);
        p.verified = false;
        assert_eq!(
            check(&p, ServiceType::Delivery, None),
            Err(Ineligibility::Unverified)
        );
    }

    #[test]
    fn service_type_must_be_declared() {
        assert_eq!(
            check(&provider(ServiceTypes::Taxi), ServiceType::Delivery, None),
            Err(Ineligibility::ServiceTypeMismatch(ServiceType::Delivery))
        );

        let mut p = provider(ServiceTypes::Taxi);
        p.service_types = None;
        assert_eq!(
            check(&p, ServiceType::Taxi, None),
            Err(Ineligibility::ServiceTypeMismatch(ServiceType::Taxi))
        );
    }

    #[test]
    fn delivery_with_required_vehicle_needs_a_verified_one() {
        let mut p = provider(ServiceTypes::Delivery);
        p.vehicles = vec![VehicleSummary {
            vehicle_type: VehicleType::Van,
            verified: false,
        }];
        assert_eq!(
            check(&p, ServiceType::Delivery, Some(VehicleType::Van)),
            Err(Ineligibility::MissingVehicle(VehicleType::Van))
        );

        p.vehicles.push(VehicleSummary {
            vehicle_type: VehicleType::Van,
            verified: true,
        });
        assert_eq!(check(&p, ServiceType::Delivery, Some(VehicleType::Van)), Ok(()));
    }

    #[test]
    fn any_vehicle_delivery_needs_no_vehicle() {
        assert_eq!(
            check(&provider(ServiceTypes::Delivery), ServiceType::Delivery, None),
            Ok(())
        );
    }

    #[test]
    fn vehicle_requirement_ignored_for_taxi() {
        assert_eq!(
            check(&provider(ServiceTypes::Taxi), ServiceType::Taxi, Some(VehicleType::Truck)),
            Ok(())
        );
    }
}
