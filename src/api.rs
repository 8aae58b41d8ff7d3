use async_trait::async_trait;
use uuid::Uuid;

use crate::auth::User;
use crate::entities::{
    Analytics, Booking, DriverRatings, NewAdmin, NewBooking, Page, Profile, RatingOutcome,
    RatingSummary, Registration, Session,
};
use crate::error::Error;

#[async_trait]
pub trait IdentityAPI {
    async fn register(&self, registration: Registration) -> Result<Profile, Error>;
    async fn create_admin(&self, user: User, params: NewAdmin) -> Result<Profile, Error>;
    async fn ensure_admin(&self, email: String, password: String) -> Result<(), Error>;
    async fn login(&self, email: String, password: String) -> Result<Session, Error>;
    async fn logout(&self, token: Uuid) -> Result<(), Error>;
    async fn authenticate(&self, token: Uuid) -> Result<User, Error>;
    async fn find_profile(&self, user: User) -> Result<Profile, Error>;
}

#[async_trait]
pub trait BookingAPI {
    async fn create_booking(&self, user: User, params: NewBooking) -> Result<Booking, Error>;
    async fn find_booking(&self, user: User, id: Uuid) -> Result<Booking, Error>;
    async fn accept_booking(&self, user: User, id: Uuid) -> Result<Booking, Error>;
    async fn cancel_booking(&self, user: User, id: Uuid) -> Result<Booking, Error>;
    async fn rate_booking(
        &self,
        user: User,
        id: Uuid,
        rating: Option<i32>,
        review: Option<String>,
    ) -> Result<(Booking, RatingOutcome), Error>;
    async fn list_pending_bookings(&self, user: User, page: Page) -> Result<Vec<Booking>, Error>;
    async fn list_booking_history(&self, user: User, page: Page) -> Result<Vec<Booking>, Error>;
    async fn list_driver_rides(&self, user: User, page: Page) -> Result<Vec<Booking>, Error>;
}

#[async_trait]
pub trait RatingAPI {
    async fn recompute_driver_rating(&self, driver_id: Uuid) -> Result<RatingSummary, Error>;
    async fn driver_ratings(&self, driver_id: Uuid) -> Result<DriverRatings, Error>;
}

#[async_trait]
pub trait AnalyticsAPI {
    async fn analytics(&self, user: User) -> Result<Analytics, Error>;
}

pub trait API: IdentityAPI + BookingAPI + RatingAPI + AnalyticsAPI {}
