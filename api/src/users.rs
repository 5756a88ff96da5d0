use crate::helpers::*;
use labeling_common::authorization::{self, Operation};
use labeling_common::db_util::{self, PgPool};
use labeling_common::{NewUser, UserRecord};
use labeling_common::progress::{self, UserStats};
use rocket::State;
use rocket::response::status as rocket_status;
use rocket::serde::json::Json;

#[get("/users/me")]
pub fn get_me(user: CurrentUser) -> ApiResult<UserRecord> {
    Ok(Json(user.0))
}

#[get("/users/me/stats")]
pub fn get_my_stats(user: CurrentUser, pool: &State<PgPool>) -> ApiResult<UserStats> {
    get_user_stats(user.0.user_id, user, pool)
}

/// Annotation counts and precision for one user. Only admins may look at other users.
#[get("/users/<id>/stats")]
pub fn get_user_stats(id: u32, user: CurrentUser, pool: &State<PgPool>) -> ApiResult<UserStats> {
    user.require(Operation::ReadUserStats)?;
    if !authorization::can_read_user_stats(&user.0, id) {
        return Err(forbidden_error("Only admins may read other users' stats."));
    }
    let mut conn = connection(pool)?;
    let snapshot = db_util::get_user_snapshot(&mut conn, id).map_err(db_error)?;
    Ok(Json(progress::user_stats(&snapshot)))
}

/// Register a user. Credentials stay with the authentication gateway.
#[post("/users", data = "<body>")]
pub fn create_user(
    body: Json<NewUser>,
    user: CurrentUser,
    pool: &State<PgPool>,
) -> ApiCreated<UserRecord> {
    user.require(Operation::CreateUser)?;
    let mut conn = connection(pool)?;
    let created = db_util::insert_user(&mut conn, &body).map_err(db_error)?;
    tracing::info!(user_id = created.user_id, role = %created.role, "User registered");
    Ok(rocket_status::Created::new(format!("/users/{}", created.user_id)).body(Json(created)))
}
