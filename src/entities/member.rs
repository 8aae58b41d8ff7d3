use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::{Driver, VehicleDetails};
use crate::error::Error;

pub const MIN_PASSWORD_LENGTH: usize = 6;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum UserKind {
    Customer,
    Driver,
    Admin,
}

impl UserKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::Driver => "driver",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for UserKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for UserKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "customer" => Ok(Self::Customer),
            "driver" => Ok(Self::Driver),
            "admin" => Ok(Self::Admin),
            _ => Err(Error::invalid_input_error("unknown user kind")),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Admin {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// A member's public record, tagged with its kind on the wire.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Profile {
    Customer(Customer),
    Driver(Driver),
    Admin(Admin),
}

impl Profile {
    pub fn id(&self) -> Uuid {
        match self {
            Self::Customer(customer) => customer.id,
            Self::Driver(driver) => driver.id,
            Self::Admin(admin) => admin.id,
        }
    }

    pub fn kind(&self) -> UserKind {
        match self {
            Self::Customer(_) => UserKind::Customer,
            Self::Driver(_) => UserKind::Driver,
            Self::Admin(_) => UserKind::Admin,
        }
    }
}

/// Self-service sign up. Admins are never created through this path.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub kind: Option<UserKind>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub phone: Option<String>,
    pub vehicle_model: Option<String>,
    pub vehicle_plate: Option<String>,
    pub license_number: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAdmin {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Credentials {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ValidRegistration {
    Customer(Credentials),
    Driver(Credentials, VehicleDetails),
}

fn required(value: Option<String>, field: &str) -> Result<String, Error> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(Error::invalid_input_error(&format!("{} is required", field))),
    }
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn validate_credentials(
    name: Option<String>,
    email: Option<String>,
    password: Option<String>,
    phone: Option<String>,
) -> Result<Credentials, Error> {
    let name = required(name, "name")?;

    let email = normalize_email(&required(email, "email")?);
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => (),
        _ => return Err(Error::invalid_input_error("email is invalid")),
    }

    let password = password.unwrap_or_default();
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(Error::invalid_input_error(
            "password must be at least 6 characters",
        ));
    }

    let phone = phone.map(|p| p.trim().to_string()).filter(|p| !p.is_empty());

    Ok(Credentials {
        name,
        email,
        password,
        phone,
    })
}

impl Registration {
    pub fn validate(self) -> Result<ValidRegistration, Error> {
        let kind = self
            .kind
            .ok_or_else(|| Error::invalid_input_error("kind is required"))?;

        let credentials = validate_credentials(self.name, self.email, self.password, self.phone)?;

        match kind {
            UserKind::Customer => Ok(ValidRegistration::Customer(credentials)),
            UserKind::Driver => {
                let vehicle = VehicleDetails {
                    vehicle_model: required(self.vehicle_model, "vehicleModel")?,
                    vehicle_plate: required(self.vehicle_plate, "vehiclePlate")?,
                    license_number: required(self.license_number, "licenseNumber")?,
                };
                Ok(ValidRegistration::Driver(credentials, vehicle))
            }
            UserKind::Admin => Err(Error::forbidden_error()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn customer_registration() -> Registration {
        Registration {
            kind: Some(UserKind::Customer),
            name: Some("Ada".into()),
            email: Some(" Ada@Example.com ".into()),
            password: Some("secret1".into()),
            phone: Some("".into()),
            ..Default::default()
        }
    }

    #[test]
    fn customer_registration_test() {
        match customer_registration().validate().unwrap() {
            ValidRegistration::Customer(credentials) => {
                assert_eq!(credentials.email, "ada@example.com");
                assert_eq!(credentials.phone, None);
            }
            other => panic!("unexpected registration {:?}", other),
        }
    }

    #[test]
    fn driver_registration_requires_vehicle_test() {
        let registration = Registration {
            kind: Some(UserKind::Driver),
            vehicle_model: Some("Corolla".into()),
            ..customer_registration()
        };

        let err = registration.validate().unwrap_err();
        assert!(err.is_invalid_input_error());

        let registration = Registration {
            kind: Some(UserKind::Driver),
            vehicle_model: Some("Corolla".into()),
            vehicle_plate: Some("KA-01-1234".into()),
            license_number: Some("DL-42".into()),
            ..customer_registration()
        };

        assert!(matches!(
            registration.validate().unwrap(),
            ValidRegistration::Driver(_, _)
        ));
    }

    #[test]
    fn admin_self_registration_is_forbidden_test() {
        let registration = Registration {
            kind: Some(UserKind::Admin),
            ..customer_registration()
        };

        assert!(registration.validate().unwrap_err().is_forbidden_error());
    }

    #[test]
    fn invalid_credentials_test() {
        let cases = [
            Registration {
                kind: None,
                ..customer_registration()
            },
            Registration {
                email: Some("not-an-email".into()),
                ..customer_registration()
            },
            Registration {
                email: Some("@example.com".into()),
                ..customer_registration()
            },
            Registration {
                password: Some("short".into()),
                ..customer_registration()
            },
            Registration {
                name: Some("  ".into()),
                ..customer_registration()
            },
        ];

        for registration in cases {
            assert!(registration.validate().unwrap_err().is_invalid_input_error());
        }
    }

    #[test]
    fn profile_is_tagged_by_kind_test() {
        let profile = Profile::Admin(Admin {
            id: Uuid::new_v4(),
            name: "root".into(),
            email: "root@example.com".into(),
            created_at: Utc::now(),
        });

        let value = serde_json::to_value(&profile).unwrap();
        assert_eq!(value["kind"], "admin");
        assert_eq!(value["email"], "root@example.com");
        assert_eq!(profile.kind(), UserKind::Admin);
    }
}
