//! Data item routes, including the consensus and progress reports.

use crate::helpers::*;
use labeling_common::authorization::Operation;
use labeling_common::config::Settings;
use labeling_common::db_util::{self, PgPool};
use labeling_common::progress::{self, ConsensusReport, ItemProgress};
use labeling_common::{DataItemRecord, NewDataItem, Role};
use rocket::State;
use rocket::response::status as rocket_status;
use rocket::serde::json::Json;
use rocket::serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct ItemActivity {
    pub is_active: bool,
}

#[get("/data-items")]
pub fn list_data_items(user: CurrentUser, pool: &State<PgPool>) -> ApiResult<Vec<DataItemRecord>> {
    user.require(Operation::ListDataItems)?;
    let mut conn = connection(pool)?;
    db_util::get_active_data_items(&mut conn)
        .map(Json)
        .map_err(db_error)
}

/// Active items the caller has not labeled yet.
#[get("/data-items/pending")]
pub fn list_pending_data_items(
    user: CurrentUser,
    pool: &State<PgPool>,
) -> ApiResult<Vec<DataItemRecord>> {
    user.require(Operation::ListPendingDataItems)?;
    let mut conn = connection(pool)?;
    db_util::get_pending_data_items_for_user(&mut conn, user.0.user_id)
        .map(Json)
        .map_err(db_error)
}

#[get("/data-items/<id>")]
pub fn get_data_item(id: u32, user: CurrentUser, pool: &State<PgPool>) -> ApiResult<DataItemRecord> {
    user.require(Operation::ReadDataItem)?;
    let mut conn = connection(pool)?;
    let item = db_util::get_data_item_by_id(&mut conn, id).map_err(db_error)?;
    // Inactive items are hidden from everyone but admins
    if !item.is_active && user.0.role != Role::Admin {
        return Err(not_found_error(format!("Data item #{id} not found.")));
    }
    Ok(Json(item))
}

#[post("/data-items", data = "<body>")]
pub fn create_data_item(
    body: Json<NewDataItem>,
    user: CurrentUser,
    pool: &State<PgPool>,
    settings: &State<Settings>,
) -> ApiCreated<DataItemRecord> {
    user.require(Operation::CreateDataItem)?;
    let mut conn = connection(pool)?;
    let item = db_util::insert_data_item(&mut conn, settings, &body).map_err(db_error)?;
    tracing::info!(item_id = item.item_id, data_type = %item.data_type, "Data item created");
    Ok(rocket_status::Created::new(format!("/data-items/{}", item.item_id)).body(Json(item)))
}

#[patch("/data-items/<id>", data = "<body>")]
pub fn update_data_item(
    id: u32,
    body: Json<ItemActivity>,
    user: CurrentUser,
    pool: &State<PgPool>,
) -> ApiResult<DataItemRecord> {
    user.require(Operation::UpdateDataItem)?;
    let mut conn = connection(pool)?;
    db_util::set_data_item_active(&mut conn, id, body.is_active)
        .map(Json)
        .map_err(db_error)
}

/// The label most contributors chose for the item.
#[get("/data-items/<id>/consensus")]
pub fn get_consensus(id: u32, user: CurrentUser, pool: &State<PgPool>) -> ApiResult<ConsensusReport> {
    user.require(Operation::ReadItemStats)?;
    let mut conn = connection(pool)?;
    let snapshot = db_util::get_item_snapshot(&mut conn, id).map_err(db_error)?;
    progress::consensus_report(&snapshot)
        .map(Json)
        .map_err(consensus_error)
}

#[get("/data-items/<id>/progress")]
pub fn get_progress(id: u32, user: CurrentUser, pool: &State<PgPool>) -> ApiResult<ItemProgress> {
    user.require(Operation::ReadItemStats)?;
    let mut conn = connection(pool)?;
    let snapshot = db_util::get_item_snapshot(&mut conn, id).map_err(db_error)?;
    Ok(Json(progress::item_progress(&snapshot)))
}
