use std::env;
use std::net::SocketAddr;
use std::str::FromStr;

use chrono::Duration;

use crate::entities::CancelPolicy;
use crate::error::Error;

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub max_connections: u32,
    pub bind_address: SocketAddr,
    pub settings: Settings,
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

/// Runtime knobs consumed by the engine.
#[derive(Clone, Debug)]
pub struct Settings {
    pub session_ttl: Duration,
    pub cancel_policy: CancelPolicy,
    pub max_page_size: i64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            session_ttl: Duration::minutes(1440),
            cancel_policy: CancelPolicy::BeforeCompletion,
            max_page_size: 100,
        }
    }
}

#[derive(Clone, Debug)]
pub struct BootstrapAdmin {
    pub email: String,
    pub password: String,
}

impl Config {
    #[tracing::instrument(name = "Config::from_env")]
    pub fn from_env() -> Result<Self, Error> {
        // a missing .env file is fine, the process environment is used as-is
        dotenv::dotenv().ok();

        let database_url = env::var("DATABASE_URL")?;
        let max_connections = parse_var("DATABASE_MAX_CONNECTIONS", 5)?;
        let bind_address = parse_var("BIND_ADDRESS", SocketAddr::from(([127, 0, 0, 1], 3000)))?;

        let session_ttl_minutes: i64 = parse_var("SESSION_TTL_MINUTES", 1440)?;
        if session_ttl_minutes <= 0 {
            return Err(Error::invalid_input_error(
                "SESSION_TTL_MINUTES must be positive",
            ));
        }

        let max_page_size: i64 = parse_var("MAX_PAGE_SIZE", 100)?;
        if max_page_size <= 0 {
            return Err(Error::invalid_input_error("MAX_PAGE_SIZE must be positive"));
        }

        let cancel_policy = parse_var("CANCEL_POLICY", CancelPolicy::BeforeCompletion)?;

        let bootstrap_admin = match (env::var("ADMIN_EMAIL"), env::var("ADMIN_PASSWORD")) {
            (Ok(email), Ok(password)) => Some(BootstrapAdmin { email, password }),
            _ => None,
        };

        Ok(Self {
            database_url,
            max_connections,
            bind_address,
            settings: Settings {
                session_ttl: Duration::minutes(session_ttl_minutes),
                cancel_policy,
                max_page_size,
            },
            bootstrap_admin,
        })
    }
}

fn parse_var<T: FromStr>(name: &str, default: T) -> Result<T, Error> {
    match env::var(name) {
        Ok(raw) => raw.trim().parse().map_err(|_| {
            tracing::error!("invalid value for {}: {:?}", name, raw);
            Error::invalid_input_error(&format!("invalid value for {}", name))
        }),
        Err(env::VarError::NotPresent) => Ok(default),
        Err(err) => Err(err.into()),
    }
}

#[test]
fn parse_var_default_test() {
    let value: u32 = parse_var("RIDESHARE_TEST_UNSET_VARIABLE", 7).unwrap();
    assert_eq!(value, 7);
}

#[test]
fn parse_var_invalid_test() {
    env::set_var("RIDESHARE_TEST_INVALID_VARIABLE", "not-a-number");

    let result: Result<u32, Error> = parse_var("RIDESHARE_TEST_INVALID_VARIABLE", 7);
    assert!(result.unwrap_err().is_invalid_input_error());
}

#[test]
fn parse_var_cancel_policy_test() {
    env::set_var("RIDESHARE_TEST_CANCEL_POLICY", "pending_only");

    let policy = parse_var("RIDESHARE_TEST_CANCEL_POLICY", CancelPolicy::BeforeCompletion);
    assert_eq!(policy.unwrap(), CancelPolicy::PendingOnly);
}
