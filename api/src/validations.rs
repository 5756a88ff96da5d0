use crate::helpers::*;
use labeling_common::authorization::Operation;
use labeling_common::db_util::{self, PgPool};
use labeling_common::{NewValidation, ValidationRecord};
use rocket::State;
use rocket::response::status as rocket_status;
use rocket::serde::json::Json;

#[get("/validations")]
pub fn list_validations(user: CurrentUser, pool: &State<PgPool>) -> ApiResult<Vec<ValidationRecord>> {
    user.require(Operation::ReadValidation)?;
    let mut conn = connection(pool)?;
    db_util::get_all_validations(&mut conn)
        .map(Json)
        .map_err(db_error)
}

#[get("/validations/<id>")]
pub fn get_validation(id: u32, user: CurrentUser, pool: &State<PgPool>) -> ApiResult<ValidationRecord> {
    user.require(Operation::ReadValidation)?;
    let mut conn = connection(pool)?;
    db_util::get_validation_by_id(&mut conn, id)
        .map(Json)
        .map_err(db_error)
}

/// Approve or reject an annotation. Each annotation is validated once.
#[post("/validations", data = "<body>")]
pub fn create_validation(
    body: Json<NewValidation>,
    user: CurrentUser,
    pool: &State<PgPool>,
) -> ApiCreated<ValidationRecord> {
    user.require(Operation::CreateValidation)?;
    let mut conn = connection(pool)?;
    let validation =
        db_util::insert_validation(&mut conn, user.0.user_id, &body).map_err(db_error)?;
    tracing::info!(
        validation_id = validation.validation_id,
        annotation_id = validation.annotation_id,
        is_approved = validation.is_approved,
        "Annotation validated"
    );
    Ok(
        rocket_status::Created::new(format!("/validations/{}", validation.validation_id))
            .body(Json(validation)),
    )
}

#[delete("/validations/<id>")]
pub fn delete_validation(id: u32, user: CurrentUser, pool: &State<PgPool>) -> ApiNoContent {
    user.require(Operation::DeleteValidation)?;
    let mut conn = connection(pool)?;
    db_util::delete_validation(&mut conn, id).map_err(db_error)?;
    tracing::info!(validation_id = id, "Validation deleted");
    Ok(rocket_status::NoContent)
}
