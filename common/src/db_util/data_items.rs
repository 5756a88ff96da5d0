use super::schema::{annotations, data_items};
use super::*;

#[derive(Queryable, Selectable)]
#[diesel(table_name = data_items)]
struct DataItemPrivate {
    id: i32,
    content: String,
    data_type: String,
    is_active: bool,
    created_at: DateTime<Utc>,
}

#[derive(Insertable)]
#[diesel(table_name = data_items)]
struct DataItemPrivateNew {
    content: String,
    data_type: String,
    is_active: bool,
}

fn private_to_public(p: DataItemPrivate) -> Result<DataItemRecord, DbError> {
    use conversions::*;
    Ok(DataItemRecord {
        item_id: i32_to_u32(p.id)?,
        content: p.content,
        data_type: deserialize_data_type(&p.data_type)?,
        is_active: p.is_active,
        created_at: p.created_at,
    })
}

fn build_new_row(settings: &Settings, new_item: &NewDataItem) -> Result<DataItemPrivateNew, DbError> {
    if new_item.content.trim().is_empty() {
        return Err(DbError::Invalid("Data item content cannot be empty.".to_string()));
    }
    if !settings.accepts(new_item.data_type) {
        return Err(DbError::Invalid(format!(
            "Data type {} is not enabled on this deployment.",
            new_item.data_type
        )));
    }
    Ok(DataItemPrivateNew {
        content: new_item.content.clone(),
        data_type: conversions::serialize_data_type(new_item.data_type),
        is_active: new_item.is_active,
    })
}

/// Add a data item, provided its data type is enabled in the settings.
pub fn insert_data_item(
    conn: &mut PgConnection,
    settings: &Settings,
    new_item: &NewDataItem,
) -> Result<DataItemRecord, DbError> {
    let insert_row = build_new_row(settings, new_item)?;

    diesel::insert_into(data_items::table)
        .values(&insert_row)
        .returning(DataItemPrivate::as_returning())
        .get_result(conn)
        .map_err(|e| DbError::from_diesel(e, "Data item"))
        .and_then(private_to_public)
}

pub fn get_data_item_by_id(conn: &mut PgConnection, row_id: u32) -> Result<DataItemRecord, DbError> {
    let row_id = conversions::u32_to_i32(row_id)?;

    data_items::table
        .filter(data_items::id.eq(row_id))
        .select(DataItemPrivate::as_select())
        .first(conn)
        .map_err(|e| DbError::from_diesel(e, &format!("Data item #{row_id}")))
        .and_then(private_to_public)
}

/// All items contributors can see.
pub fn get_active_data_items(conn: &mut PgConnection) -> Result<Vec<DataItemRecord>, DbError> {
    let items_private: Vec<DataItemPrivate> = data_items::table
        .filter(data_items::is_active.eq(true))
        .order(data_items::id.asc())
        .select(DataItemPrivate::as_select())
        .load(conn)?;

    items_private
        .into_iter()
        .map(private_to_public)
        .collect::<Result<Vec<DataItemRecord>, DbError>>()
}

/// Active items the user has not annotated yet.
pub fn get_pending_data_items_for_user(
    conn: &mut PgConnection,
    input_user_id: u32,
) -> Result<Vec<DataItemRecord>, DbError> {
    let input_user_id = conversions::u32_to_i32(input_user_id)?;

    let annotated_ids = annotations::table
        .filter(annotations::user_id.eq(input_user_id))
        .select(annotations::item_id);

    let items_private: Vec<DataItemPrivate> = data_items::table
        .filter(data_items::is_active.eq(true))
        .filter(diesel::dsl::not(data_items::id.eq_any(annotated_ids)))
        .order(data_items::id.asc())
        .select(DataItemPrivate::as_select())
        .load(conn)?;

    items_private
        .into_iter()
        .map(private_to_public)
        .collect::<Result<Vec<DataItemRecord>, DbError>>()
}

/// Show or hide an item from contributors. Existing annotations are kept.
pub fn set_data_item_active(
    conn: &mut PgConnection,
    row_id: u32,
    input_is_active: bool,
) -> Result<DataItemRecord, DbError> {
    let row_id = conversions::u32_to_i32(row_id)?;

    diesel::update(data_items::table.filter(data_items::id.eq(row_id)))
        .set(data_items::is_active.eq(input_is_active))
        .returning(DataItemPrivate::as_returning())
        .get_result(conn)
        .map_err(|e| DbError::from_diesel(e, &format!("Data item #{row_id}")))
        .and_then(private_to_public)
}
