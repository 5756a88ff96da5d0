use crate::helpers::*;
use labeling_common::authorization::Operation;
use labeling_common::db_util::{self, PgPool};
use labeling_common::{LabelRecord, NewLabel};
use rocket::State;
use rocket::response::status as rocket_status;
use rocket::serde::json::Json;

#[get("/labels")]
pub fn list_labels(user: CurrentUser, pool: &State<PgPool>) -> ApiResult<Vec<LabelRecord>> {
    user.require(Operation::ListLabels)?;
    let mut conn = connection(pool)?;
    db_util::get_all_labels(&mut conn).map(Json).map_err(db_error)
}

#[get("/labels/<id>")]
pub fn get_label(id: u32, user: CurrentUser, pool: &State<PgPool>) -> ApiResult<LabelRecord> {
    user.require(Operation::ListLabels)?;
    let mut conn = connection(pool)?;
    db_util::get_label_by_id(&mut conn, id)
        .map(Json)
        .map_err(db_error)
}

#[post("/labels", data = "<body>")]
pub fn create_label(
    body: Json<NewLabel>,
    user: CurrentUser,
    pool: &State<PgPool>,
) -> ApiCreated<LabelRecord> {
    user.require(Operation::CreateLabel)?;
    let mut conn = connection(pool)?;
    let label = db_util::insert_label(&mut conn, &body).map_err(db_error)?;
    tracing::info!(label_id = label.label_id, name = %label.name, "Label created");
    Ok(rocket_status::Created::new(format!("/labels/{}", label.label_id)).body(Json(label)))
}

#[delete("/labels/<id>")]
pub fn delete_label(id: u32, user: CurrentUser, pool: &State<PgPool>) -> ApiNoContent {
    user.require(Operation::DeleteLabel)?;
    let mut conn = connection(pool)?;
    db_util::delete_label(&mut conn, id).map_err(db_error)?;
    tracing::info!(label_id = id, "Label deleted");
    Ok(rocket_status::NoContent)
}
