mod analytics;
mod booking;
mod driver;
mod member;
mod page;
mod rating;
mod session;

pub use analytics::{Analytics, StatusCounts};
pub use booking::{
    validate_rating, Booking, CancelPolicy, NewBooking, Status as BookingStatus, MAX_RATING,
    MIN_RATING,
};
pub use driver::{Driver, VehicleDetails};
pub use member::{
    normalize_email, validate_credentials, Admin, Credentials, Customer, NewAdmin, Profile,
    Registration, UserKind, ValidRegistration,
};
pub use page::Page;
pub use rating::{round_to_tenth, DriverRatings, RatingEntry, RatingOutcome, RatingSummary};
pub use session::Session;
