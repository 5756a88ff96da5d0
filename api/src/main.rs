//! An api for labeling data items, validating the labels, and reporting consensus and progress.

#[macro_use]
extern crate rocket;

mod annotations;
mod helpers;
mod items;
mod labels;
mod users;
mod validations;

use helpers::*;
use labeling_common::config::Settings;
use labeling_common::db_util::{self, PgPool};
use rocket::serde::json::{Json, Value, json};
use rocket::{Build, Catcher, Request, Rocket};
use rocket_prometheus::PrometheusMetrics;
use tracing_subscriber::EnvFilter;

#[get("/health")]
fn health() -> Value {
    json!({ "status": "ok" })
}

#[catch(400)]
fn bad_request(_req: &Request) -> Json<ApiErrorBody> {
    bad_request_error("The request could not be understood.").1
}

#[catch(401)]
fn unauthorized(_req: &Request) -> Json<ApiErrorBody> {
    unauthorized_error("Authentication is required.").1
}

#[catch(403)]
fn forbidden(_req: &Request) -> Json<ApiErrorBody> {
    forbidden_error("You are not allowed to do that.").1
}

#[catch(404)]
fn not_found(_req: &Request) -> Json<ApiErrorBody> {
    not_found_error("The requested resource could not be found.").1
}

#[catch(422)]
fn unprocessable_entity(_req: &Request) -> Json<ApiErrorBody> {
    unprocessable_entity_error("The request body was not valid.").1
}

#[catch(500)]
fn internal(_req: &Request) -> Json<ApiErrorBody> {
    internal_error("Something went wrong on our end.").1
}

fn catchers() -> Vec<Catcher> {
    catchers![
        bad_request,
        unauthorized,
        forbidden,
        not_found,
        unprocessable_entity,
        internal
    ]
}

/// Assemble the server around an existing pool so tests can supply their own.
fn build_rocket(settings: Settings, pool: PgPool) -> Rocket<Build> {
    let prometheus = PrometheusMetrics::new();

    rocket::build()
        .manage(settings)
        .manage(pool)
        .attach(RequestTimingFairing)
        .attach(CorsFairing)
        .attach(prometheus.clone())
        .mount("/metrics", prometheus)
        .mount(
            "/",
            routes![
                health,
                items::list_data_items,
                items::list_pending_data_items,
                items::get_data_item,
                items::create_data_item,
                items::update_data_item,
                items::get_consensus,
                items::get_progress,
                labels::list_labels,
                labels::get_label,
                labels::create_label,
                labels::delete_label,
                annotations::list_annotations,
                annotations::get_annotation,
                annotations::create_annotation,
                annotations::delete_annotation,
                validations::list_validations,
                validations::get_validation,
                validations::create_validation,
                validations::delete_validation,
                users::get_me,
                users::get_my_stats,
                users::get_user_stats,
                users::create_user,
            ],
        )
        .register("/", catchers())
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
}

#[rocket::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let settings = Settings::from_env()?;
    let pool = db_util::get_database_pool(&settings)?;
    tracing::info!(
        data_types = ?settings.enabled_data_types,
        pool_size = settings.pool_size,
        "Database pool ready"
    );

    build_rocket(settings, pool).launch().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use labeling_common::USER_HEADER;
    use rocket::http::{Header, Status};
    use rocket::local::blocking::Client;

    fn client() -> Client {
        let pool = db_util::get_lazy_database_pool("postgres://nobody@127.0.0.1:1/labeling", 1);
        Client::tracked(build_rocket(Settings::default(), pool)).expect("valid rocket instance")
    }

    #[test]
    fn test_health() {
        let client = client();
        let response = client.get("/health").dispatch();
        assert_eq!(response.status(), Status::Ok);
        let body: Value = response.into_json().unwrap();
        assert_eq!(body["status"], "ok");
    }

    #[test]
    fn test_unknown_route_returns_json_404() {
        let client = client();
        let response = client.get("/no-such-thing").dispatch();
        assert_eq!(response.status(), Status::NotFound);
        let body: Value = response.into_json().unwrap();
        assert_eq!(body["error"], "not_found");
    }

    #[test]
    fn test_missing_user_header_is_unauthorized() {
        let client = client();
        for path in ["/data-items", "/data-items/1/consensus", "/users/me/stats"] {
            let response = client.get(path).dispatch();
            assert_eq!(response.status(), Status::Unauthorized, "{path}");
            let body: Value = response.into_json().unwrap();
            assert_eq!(body["error"], "unauthorized");
        }
    }

    #[test]
    fn test_blank_user_header_is_unauthorized() {
        let client = client();
        let response = client
            .post("/annotations")
            .header(Header::new(USER_HEADER, "  "))
            .json(&json!({ "item_id": 1, "label_id": 1 }))
            .dispatch();
        assert_eq!(response.status(), Status::Unauthorized);
    }

    #[test]
    fn test_responses_carry_cors_headers() {
        let client = client();
        let response = client.get("/health").dispatch();
        assert_eq!(
            response.headers().get_one("Access-Control-Allow-Origin"),
            Some("*")
        );
    }
}
