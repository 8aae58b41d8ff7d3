use oso::{Oso, PolarClass};

use crate::auth::{Platform, User};
use crate::entities::Booking;

pub fn new() -> Result<Oso, oso::OsoError> {
    let mut o = Oso::new();

    o.register_class(Platform::get_polar_class())?;
    o.register_class(User::get_polar_class())?;
    o.register_class(Booking::get_polar_class())?;

    o.load_str(include_str!("rules.polar"))?;

    Ok(o)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{NewBooking, UserKind};
    use uuid::Uuid;

    fn user(kind: UserKind) -> User {
        User::new(Uuid::new_v4(), kind)
    }

    fn booking_for(customer: &User) -> Booking {
        Booking::new(
            customer.id,
            NewBooking {
                pickup_location: Some("A".into()),
                dropoff_location: Some("B".into()),
                fare: Some(12.5),
                distance: Some(3.0),
            },
        )
        .unwrap()
    }

    #[test]
    fn platform_role_test() {
        let authorizor = new().unwrap();

        let customer = user(UserKind::Customer);

        let result =
            authorizor.query_rule("has_role", (customer.clone(), "customer", Platform::default()));
        assert!(result.unwrap().next().unwrap().is_ok());

        let result =
            authorizor.query_rule("has_role", (customer.clone(), "driver", Platform::default()));
        assert!(result.unwrap().next().is_none());
    }

    #[test]
    fn customer_platform_permissions_test() {
        let authorizor = new().unwrap();
        let customer = user(UserKind::Customer);

        for action in [
            "create_booking",
            "list_booking_history",
            "cancel_booking",
            "rate_booking",
        ] {
            let result = authorizor.is_allowed(customer.clone(), action, Platform::default());
            assert_eq!(result.unwrap(), true, "{}", action);
        }

        for action in [
            "list_pending_bookings",
            "accept_booking",
            "read_analytics",
            "create_admin",
        ] {
            let result = authorizor.is_allowed(customer.clone(), action, Platform::default());
            assert_eq!(result.unwrap(), false, "{}", action);
        }
    }

    #[test]
    fn driver_platform_permissions_test() {
        let authorizor = new().unwrap();
        let driver = user(UserKind::Driver);

        for action in ["list_pending_bookings", "list_driver_rides", "accept_booking"] {
            let result = authorizor.is_allowed(driver.clone(), action, Platform::default());
            assert_eq!(result.unwrap(), true, "{}", action);
        }

        for action in ["create_booking", "rate_booking", "read_analytics"] {
            let result = authorizor.is_allowed(driver.clone(), action, Platform::default());
            assert_eq!(result.unwrap(), false, "{}", action);
        }
    }

    #[test]
    fn admin_platform_permissions_test() {
        let authorizor = new().unwrap();
        let admin = user(UserKind::Admin);

        let result = authorizor.is_allowed(admin.clone(), "read_analytics", Platform::default());
        assert_eq!(result.unwrap(), true);

        let result = authorizor.is_allowed(admin.clone(), "create_admin", Platform::default());
        assert_eq!(result.unwrap(), true);

        let result = authorizor.is_allowed(admin.clone(), "accept_booking", Platform::default());
        assert_eq!(result.unwrap(), false);
    }

    #[test]
    fn booking_read_test() {
        let authorizor = new().unwrap();

        let owner = user(UserKind::Customer);
        let stranger = user(UserKind::Customer);
        let driver = user(UserKind::Driver);
        let other_driver = user(UserKind::Driver);
        let admin = user(UserKind::Admin);

        let mut booking = booking_for(&owner);

        // while pending, any driver may look at it

        let result = authorizor.is_allowed(owner.clone(), "read", booking.clone());
        assert_eq!(result.unwrap(), true);

        let result = authorizor.is_allowed(stranger.clone(), "read", booking.clone());
        assert_eq!(result.unwrap(), false);

        let result = authorizor.is_allowed(driver.clone(), "read", booking.clone());
        assert_eq!(result.unwrap(), true);

        let result = authorizor.is_allowed(other_driver.clone(), "read", booking.clone());
        assert_eq!(result.unwrap(), true);

        booking.accept(driver.id).unwrap();

        // after acceptance only the assigned driver

        let result = authorizor.is_allowed(driver.clone(), "read", booking.clone());
        assert_eq!(result.unwrap(), true);

        let result = authorizor.is_allowed(other_driver.clone(), "read", booking.clone());
        assert_eq!(result.unwrap(), false);

        let result = authorizor.is_allowed(owner.clone(), "read", booking.clone());
        assert_eq!(result.unwrap(), true);

        let result = authorizor.is_allowed(admin.clone(), "read", booking.clone());
        assert_eq!(result.unwrap(), true);
    }
}
