use crate::models::jobs::ServiceType;

/// Distance covered by the base fare.
pub const BASE_DISTANCE_KM: f64 = 3.0;

fn rates(service_type: ServiceType) -> (f64, f64) {
    match service_type {
        ServiceType::Taxi => (60.0, 10.0),
        ServiceType::Delivery => (80.0, 15.0),
    }
}

/// Base fare up to 3 km, then a per-km rate on the remainder. Rounded to cents.
pub fn estimated_price(service_type: ServiceType, distance_km: f64) -> f64 {
    let (base, rate) = rates(service_type);
    let price = if distance_km <= BASE_DISTANCE_KM {
        base
    } else {
        base + (distance_km - BASE_DISTANCE_KM) * rate
    };
    (price * 100.0).round() / 100.0
}
