use super::schema::labels;
use super::*;

#[derive(Queryable, Selectable)]
#[diesel(table_name = labels)]
struct LabelPrivate {
    id: i32,
    name: String,
}

#[derive(Insertable)]
#[diesel(table_name = labels)]
struct LabelPrivateNew {
    name: String,
}

fn private_to_public(p: LabelPrivate) -> Result<LabelRecord, DbError> {
    Ok(LabelRecord {
        label_id: conversions::i32_to_u32(p.id)?,
        name: p.name,
    })
}

/// Add a label. Names are unique, so a repeated name is a conflict.
pub fn insert_label(conn: &mut PgConnection, new_label: &NewLabel) -> Result<LabelRecord, DbError> {
    let input_name = new_label.name.trim();
    if input_name.is_empty() {
        return Err(DbError::Invalid("Label name cannot be empty.".to_string()));
    }

    let insert_row = LabelPrivateNew {
        name: input_name.to_string(),
    };

    diesel::insert_into(labels::table)
        .values(&insert_row)
        .returning(LabelPrivate::as_returning())
        .get_result(conn)
        .map_err(|e| DbError::from_diesel(e, &format!("Label {input_name}")))
        .and_then(private_to_public)
}

pub fn get_label_by_id(conn: &mut PgConnection, row_id: u32) -> Result<LabelRecord, DbError> {
    let row_id = conversions::u32_to_i32(row_id)?;

    labels::table
        .filter(labels::id.eq(row_id))
        .select(LabelPrivate::as_select())
        .first(conn)
        .map_err(|e| DbError::from_diesel(e, &format!("Label #{row_id}")))
        .and_then(private_to_public)
}

pub fn get_all_labels(conn: &mut PgConnection) -> Result<Vec<LabelRecord>, DbError> {
    let items_private: Vec<LabelPrivate> = labels::table
        .order(labels::name.asc())
        .select(LabelPrivate::as_select())
        .load(conn)?;

    items_private
        .into_iter()
        .map(private_to_public)
        .collect::<Result<Vec<LabelRecord>, DbError>>()
}

/// Remove a label. Annotations that chose it are removed with it.
pub fn delete_label(conn: &mut PgConnection, row_id: u32) -> Result<(), DbError> {
    let row_id = conversions::u32_to_i32(row_id)?;

    let deleted = diesel::delete(labels::table.filter(labels::id.eq(row_id))).execute(conn)?;
    if deleted == 0 {
        return Err(DbError::NotFound(format!("Label #{row_id} not found.")));
    }
    Ok(())
}
