//! Some helper functions for the API.

use labeling_common::authorization::{self, Operation};
use labeling_common::consensus::ConsensusError;
use labeling_common::db_util::{DbError, PgPool, PgPooledConnection, get_pooled_database_connection};
use labeling_common::{USER_HEADER, UserRecord};
use rocket::fairing::{Fairing, Info, Kind};
use rocket::http::Header;
use rocket::http::Status;
use rocket::outcome::Outcome;
use rocket::request::{self, FromRequest, Request};
use rocket::response::Response;
use rocket::response::status as rocket_status;
use rocket::serde::json::Json;
use rocket::serde::{Deserialize, Serialize};
use std::time::Instant;

#[derive(Clone, Copy)]
pub struct RequestTimingFairing;

#[rocket::async_trait]
impl Fairing for RequestTimingFairing {
    fn info(&self) -> Info {
        Info {
            name: "Request timing",
            kind: Kind::Request | Kind::Response,
        }
    }

    async fn on_request(&self, request: &mut Request<'_>, _data: &mut rocket::Data<'_>) {
        request.local_cache(Instant::now);
    }

    async fn on_response<'r>(&self, request: &'r Request<'_>, response: &mut Response<'r>) {
        let started_at = request.local_cache(Instant::now);
        let elapsed = started_at.elapsed();
        let status = response.status().code;

        tracing::info!(
            method = %request.method(),
            path = %request.uri(),
            status = status,
            elapsed_ms = elapsed.as_millis(),
            "Request Completed"
        );
    }
}

#[derive(Clone, Copy)]
pub struct CorsFairing;

#[rocket::async_trait]
impl Fairing for CorsFairing {
    fn info(&self) -> Info {
        Info {
            name: "CORS",
            kind: Kind::Response,
        }
    }

    async fn on_response<'r>(&self, _request: &'r Request<'_>, response: &mut Response<'r>) {
        response.set_header(Header::new("Access-Control-Allow-Origin", "*"));
        response.set_header(Header::new(
            "Access-Control-Allow-Methods",
            "GET, POST, DELETE, OPTIONS",
        ));
        response.set_header(Header::new("Access-Control-Allow-Headers", "*"));
        response.set_header(Header::new("Access-Control-Max-Age", "86400"));
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(crate = "rocket::serde")]
#[serde(rename_all = "snake_case")]
pub enum ApiErrorKind {
    NotFound,
    BadRequest,
    Unauthorized,
    Forbidden,
    Conflict,
    UnprocessableEntity,
    Internal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct ApiErrorBody {
    pub error: ApiErrorKind,
    pub message: String,
}

impl ApiErrorBody {
    fn new(error: ApiErrorKind, message: impl Into<String>) -> Self {
        Self {
            error,
            message: message.into(),
        }
    }
}

pub type ApiError = rocket_status::Custom<Json<ApiErrorBody>>;
pub type ApiResult<T> = Result<Json<T>, ApiError>;
pub type ApiCreated<T> = Result<rocket_status::Created<Json<T>>, ApiError>;
pub type ApiNoContent = Result<rocket_status::NoContent, ApiError>;

fn api_error(status: Status, kind: ApiErrorKind, message: impl Into<String>) -> ApiError {
    rocket_status::Custom(status, Json(ApiErrorBody::new(kind, message)))
}

pub fn not_found_error(message: impl Into<String>) -> ApiError {
    api_error(Status::NotFound, ApiErrorKind::NotFound, message)
}

pub fn bad_request_error(message: impl Into<String>) -> ApiError {
    api_error(Status::BadRequest, ApiErrorKind::BadRequest, message)
}

pub fn unauthorized_error(message: impl Into<String>) -> ApiError {
    api_error(Status::Unauthorized, ApiErrorKind::Unauthorized, message)
}

pub fn forbidden_error(message: impl Into<String>) -> ApiError {
    api_error(Status::Forbidden, ApiErrorKind::Forbidden, message)
}

pub fn conflict_error(message: impl Into<String>) -> ApiError {
    api_error(Status::Conflict, ApiErrorKind::Conflict, message)
}

pub fn unprocessable_entity_error(message: impl Into<String>) -> ApiError {
    api_error(
        Status::UnprocessableEntity,
        ApiErrorKind::UnprocessableEntity,
        message,
    )
}

pub fn internal_error(message: impl Into<String>) -> ApiError {
    api_error(Status::InternalServerError, ApiErrorKind::Internal, message)
}

/// Map a storage error onto the matching HTTP error.
pub fn db_error(err: DbError) -> ApiError {
    match err {
        DbError::NotFound(msg) => not_found_error(msg),
        DbError::Conflict(msg) => conflict_error(msg),
        DbError::Invalid(msg) => bad_request_error(msg),
        other => {
            tracing::error!(error = %other, "Database request failed");
            internal_error("The request could not be completed.")
        }
    }
}

/// No consensus means nothing was found for the item.
pub fn consensus_error(err: ConsensusError) -> ApiError {
    match err {
        ConsensusError::NoAnnotations { .. } => not_found_error(err.to_string()),
    }
}

/// Check out a connection from the managed pool.
pub fn connection(pool: &PgPool) -> Result<PgPooledConnection, ApiError> {
    get_pooled_database_connection(pool).map_err(db_error)
}

/// The caller, as forwarded by the authentication gateway and resolved to a stored user.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub UserRecord);

impl CurrentUser {
    /// Fail with 403 unless the caller's role allows the operation.
    pub fn require(&self, operation: Operation) -> Result<(), ApiError> {
        if authorization::authorize(self.0.role, operation) {
            Ok(())
        } else {
            Err(forbidden_error(format!(
                "Role {} may not perform {operation:?}.",
                self.0.role
            )))
        }
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for CurrentUser {
    type Error = String;

    async fn from_request(request: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        let Some(username) = request
            .headers()
            .get_one(USER_HEADER)
            .map(str::trim)
            .filter(|u| !u.is_empty())
        else {
            return Outcome::Error((Status::Unauthorized, format!("Missing {USER_HEADER} header.")));
        };
        let Some(pool) = request.rocket().state::<PgPool>() else {
            return Outcome::Error((
                Status::InternalServerError,
                "Database pool is not configured.".to_string(),
            ));
        };

        let lookup = connection(pool).and_then(|mut conn| {
            labeling_common::db_util::get_user_by_username(&mut conn, username).map_err(db_error)
        });
        match lookup {
            Ok(user) => Outcome::Success(CurrentUser(user)),
            Err(err) if err.0 == Status::NotFound => {
                tracing::warn!(username = username, "Request from unknown user");
                Outcome::Error((Status::Unauthorized, format!("Unknown user {username}.")))
            }
            Err(err) => Outcome::Error((err.0, err.1.0.message)),
        }
    }
}
