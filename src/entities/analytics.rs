use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Analytics {
    pub total_customers: i64,
    pub total_drivers: i64,
    pub total_bookings: i64,
    pub bookings_by_status: StatusCounts,
    pub total_revenue: f64,
    pub total_distance: f64,
    pub average_fare: f64,
    pub average_driver_rating: f64,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StatusCounts {
    pub pending: i64,
    pub accepted: i64,
    pub completed: i64,
    pub cancelled: i64,
}
