use crate::helpers::*;
use labeling_common::authorization::{self, Operation};
use labeling_common::db_util::{self, PgPool};
use labeling_common::{AnnotationRecord, NewAnnotation};
use rocket::State;
use rocket::response::status as rocket_status;
use rocket::serde::json::Json;

/// All annotations, or only those on one item with `?item=<id>`.
#[get("/annotations?<item>")]
pub fn list_annotations(
    item: Option<u32>,
    user: CurrentUser,
    pool: &State<PgPool>,
) -> ApiResult<Vec<AnnotationRecord>> {
    user.require(Operation::ReadAnnotation)?;
    let mut conn = connection(pool)?;
    match item {
        Some(item_id) => db_util::get_annotations_for_item(&mut conn, item_id),
        None => db_util::get_all_annotations(&mut conn),
    }
    .map(Json)
    .map_err(db_error)
}

#[get("/annotations/<id>")]
pub fn get_annotation(id: u32, user: CurrentUser, pool: &State<PgPool>) -> ApiResult<AnnotationRecord> {
    user.require(Operation::ReadAnnotation)?;
    let mut conn = connection(pool)?;
    db_util::get_annotation_by_id(&mut conn, id)
        .map(Json)
        .map_err(db_error)
}

/// Submit the caller's label for an item. Each contributor labels an item once.
#[post("/annotations", data = "<body>")]
pub fn create_annotation(
    body: Json<NewAnnotation>,
    user: CurrentUser,
    pool: &State<PgPool>,
) -> ApiCreated<AnnotationRecord> {
    user.require(Operation::CreateAnnotation)?;
    let mut conn = connection(pool)?;
    let annotation =
        db_util::insert_annotation(&mut conn, user.0.user_id, &body).map_err(db_error)?;
    tracing::info!(
        annotation_id = annotation.annotation_id,
        item_id = annotation.item_id,
        user_id = annotation.user_id,
        "Annotation submitted"
    );
    Ok(
        rocket_status::Created::new(format!("/annotations/{}", annotation.annotation_id))
            .body(Json(annotation)),
    )
}

#[delete("/annotations/<id>")]
pub fn delete_annotation(id: u32, user: CurrentUser, pool: &State<PgPool>) -> ApiNoContent {
    user.require(Operation::DeleteAnnotation)?;
    let mut conn = connection(pool)?;
    let annotation = db_util::get_annotation_by_id(&mut conn, id).map_err(db_error)?;
    if !authorization::can_delete_annotation(&user.0, &annotation) {
        return Err(forbidden_error("Only the author or an admin may delete an annotation."));
    }
    db_util::delete_annotation(&mut conn, id).map_err(db_error)?;
    tracing::info!(annotation_id = id, "Annotation deleted");
    Ok(rocket_status::NoContent)
}
