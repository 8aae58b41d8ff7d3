use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, SubsecRound, Utc};
use oso::PolarClass;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Error;

pub const MIN_RATING: i32 = 1;
pub const MAX_RATING: i32 = 5;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub driver_id: Option<Uuid>,
    pub pickup_location: String,
    pub dropoff_location: String,
    pub fare: f64,
    pub distance: f64,
    pub status: Status,
    pub rating: Option<i32>,
    pub review: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Pending,
    Accepted,
    Completed,
    Cancelled,
}

impl Status {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Status {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "accepted" => Ok(Self::Accepted),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(Error::invalid_input_error("unknown booking status")),
        }
    }
}

/// Which bookings a customer may still cancel.
///
/// Completed bookings are never cancellable under either policy since their
/// rating already counts towards the driver's average.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CancelPolicy {
    PendingOnly,
    BeforeCompletion,
}

impl FromStr for CancelPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending_only" => Ok(Self::PendingOnly),
            "before_completion" => Ok(Self::BeforeCompletion),
            _ => Err(Error::invalid_input_error("unknown cancel policy")),
        }
    }
}

/// Raw booking request as it arrives from a customer.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBooking {
    pub pickup_location: Option<String>,
    pub dropoff_location: Option<String>,
    pub fare: Option<f64>,
    pub distance: Option<f64>,
}

fn required_text(value: Option<String>, field: &str) -> Result<String, Error> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(Error::invalid_input_error(&format!("{} is required", field))),
    }
}

fn required_amount(value: Option<f64>, field: &str) -> Result<f64, Error> {
    match value {
        Some(v) if v.is_finite() && v >= 0.0 => Ok(v),
        Some(_) => Err(Error::invalid_input_error(&format!(
            "{} must be a non-negative number",
            field
        ))),
        None => Err(Error::invalid_input_error(&format!("{} is required", field))),
    }
}

pub fn validate_rating(rating: i32) -> Result<(), Error> {
    if !(MIN_RATING..=MAX_RATING).contains(&rating) {
        return Err(Error::invalid_input_error("rating must be between 1 and 5"));
    }

    Ok(())
}

impl Booking {
    pub fn new(customer_id: Uuid, params: NewBooking) -> Result<Self, Error> {
        let pickup_location = required_text(params.pickup_location, "pickupLocation")?;
        let dropoff_location = required_text(params.dropoff_location, "dropoffLocation")?;
        let fare = required_amount(params.fare, "fare")?;
        let distance = required_amount(params.distance, "distance")?;

        Ok(Self {
            id: Uuid::new_v4(),
            customer_id,
            driver_id: None,
            pickup_location,
            dropoff_location,
            fare,
            distance,
            status: Status::Pending,
            rating: None,
            review: None,
            // postgres keeps microseconds
            created_at: Utc::now().trunc_subsecs(6),
        })
    }

    pub fn is_pending(&self) -> bool {
        self.status == Status::Pending
    }

    pub fn is_owned_by(&self, customer_id: Uuid) -> bool {
        self.customer_id == customer_id
    }

    pub fn is_assigned_to(&self, driver_id: Uuid) -> bool {
        self.driver_id == Some(driver_id)
    }

    /// In-memory counterpart of the store's conditional claim.
    pub fn accept(&mut self, driver_id: Uuid) -> Result<(), Error> {
        match self.status {
            Status::Pending => {
                self.status = Status::Accepted;
                self.driver_id = Some(driver_id);
                Ok(())
            }
            _ => Err(Error::conflict_error("booking already taken or not found")),
        }
    }

    /// Returns whether the booking changed.
    #[tracing::instrument(skip(self), fields(id = %self.id, status = %self.status))]
    pub fn cancel(&mut self, policy: CancelPolicy) -> Result<bool, Error> {
        match (self.status, policy) {
            (Status::Cancelled, _) => Ok(false),
            (Status::Pending, _) | (Status::Accepted, CancelPolicy::BeforeCompletion) => {
                self.status = Status::Cancelled;
                self.driver_id = None;
                Ok(true)
            }
            (Status::Accepted, CancelPolicy::PendingOnly) => Err(Error::invalid_state_error(
                "booking has already been accepted",
            )),
            (Status::Completed, _) => {
                Err(Error::invalid_state_error("booking has already been completed"))
            }
        }
    }

    /// Records the review and completes the ride, returning the driver to
    /// re-aggregate.
    #[tracing::instrument(skip(self, review), fields(id = %self.id, status = %self.status))]
    pub fn rate(&mut self, rating: i32, review: Option<String>) -> Result<Uuid, Error> {
        validate_rating(rating)?;

        match (self.status, self.driver_id) {
            (Status::Accepted, Some(driver_id)) | (Status::Completed, Some(driver_id)) => {
                self.rating = Some(rating);
                self.review = review
                    .map(|r| r.trim().to_string())
                    .filter(|r| !r.is_empty());
                self.status = Status::Completed;
                Ok(driver_id)
            }
            (Status::Pending, _) | (Status::Cancelled, _) => {
                Err(Error::invalid_state_error("ride not finished yet"))
            }
            _ => Err(Error::unexpected_error()),
        }
    }
}

impl PolarClass for Booking {
    fn get_polar_class_builder() -> oso::ClassBuilder<Booking> {
        oso::Class::builder()
            .name("Booking")
            .add_attribute_getter("id", |recv: &Booking| recv.id)
            .add_attribute_getter("customer_id", |recv: &Booking| recv.customer_id)
            .add_attribute_getter("driver_id", |recv: &Booking| recv.driver_id)
            .add_attribute_getter("status", |recv: &Booking| recv.status.name().to_string())
            .add_method("is_pending", Booking::is_pending)
            .add_method("is_owned_by", Booking::is_owned_by)
            .add_method("is_assigned_to", Booking::is_assigned_to)
    }

    fn get_polar_class() -> oso::Class {
        let builder = Booking::get_polar_class_builder();
        builder.build()
    }
}
