use axum::extract::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use std::env;
use std::fmt::{self, Debug};

#[derive(Debug, Clone, PartialEq)]
pub struct Error {
    pub code: i32,
    pub message: String,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for Error {}

impl From<env::VarError> for Error {
    fn from(err: env::VarError) -> Self {
        Error::env_var_error(err)
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            // 23505: unique_violation
            if db_err.code().as_deref() == Some("23505") {
                return Error::conflict_error("already exists");
            }
        }

        Error::database_error(err)
    }
}

impl From<oso::OsoError> for Error {
    fn from(err: oso::OsoError) -> Self {
        tracing::error!("authorizor error: {}", err);
        Error::unexpected_error()
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_message = match self.code {
            1..=99 => "Internal Server Error",
            _ => self.message.as_str(),
        };

        let body = Json(json!({
            "code": self.code,
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self.code {
            1..=99 => StatusCode::INTERNAL_SERVER_ERROR,
            102 => StatusCode::NOT_FOUND,
            104 => StatusCode::UNAUTHORIZED,
            105 => StatusCode::FORBIDDEN,
            _ => StatusCode::BAD_REQUEST,
        }
    }

    pub fn invalid_state_error(message: &str) -> Error {
        Error {
            code: 100,
            message: message.into(),
        }
    }

    pub fn invalid_input_error(message: &str) -> Error {
        Error {
            code: 101,
            message: message.into(),
        }
    }

    pub fn not_found_error(message: &str) -> Error {
        Error {
            code: 102,
            message: message.into(),
        }
    }

    pub fn conflict_error(message: &str) -> Error {
        Error {
            code: 103,
            message: message.into(),
        }
    }

    pub fn unauthorized_error() -> Error {
        Error {
            code: 104,
            message: "unauthorized".into(),
        }
    }

    pub fn forbidden_error() -> Error {
        Error {
            code: 105,
            message: "forbidden".into(),
        }
    }

    pub fn env_var_error(_: env::VarError) -> Error {
        Error {
            code: 1,
            message: "environment variable error".into(),
        }
    }

    pub fn database_error<T: Debug>(err: T) -> Error {
        tracing::error!("database error: {:?}", err);

        Error {
            code: 2,
            message: "database error".into(),
        }
    }

    pub fn unexpected_error() -> Error {
        Error {
            code: 5,
            message: "unexpected error".into(),
        }
    }

    pub fn is_invalid_state_error(&self) -> bool {
        self.code == 100
    }

    pub fn is_invalid_input_error(&self) -> bool {
        self.code == 101
    }

    pub fn is_not_found_error(&self) -> bool {
        self.code == 102
    }

    pub fn is_conflict_error(&self) -> bool {
        self.code == 103
    }

    pub fn is_unauthorized_error(&self) -> bool {
        self.code == 104
    }

    pub fn is_forbidden_error(&self) -> bool {
        self.code == 105
    }
}

#[test]
fn status_code_mapping_test() {
    assert_eq!(
        Error::invalid_input_error("x").status_code(),
        StatusCode::BAD_REQUEST
    );
    assert_eq!(
        Error::invalid_state_error("x").status_code(),
        StatusCode::BAD_REQUEST
    );
    assert_eq!(
        Error::conflict_error("x").status_code(),
        StatusCode::BAD_REQUEST
    );
    assert_eq!(
        Error::not_found_error("x").status_code(),
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        Error::unauthorized_error().status_code(),
        StatusCode::UNAUTHORIZED
    );
    assert_eq!(Error::forbidden_error().status_code(), StatusCode::FORBIDDEN);
    assert_eq!(
        Error::unexpected_error().status_code(),
        StatusCode::INTERNAL_SERVER_ERROR
    );
}

#[test]
fn internal_errors_hide_message_test() {
    let response = Error::database_error("connection reset").into_response();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}
