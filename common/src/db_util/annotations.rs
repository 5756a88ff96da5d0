use super::schema::annotations;
use super::*;

#[derive(Queryable, Selectable)]
#[diesel(table_name = annotations)]
struct AnnotationPrivate {
    id: i32,
    item_id: i32,
    user_id: i32,
    label_id: i32,
    created_at: DateTime<Utc>,
}

#[derive(Insertable)]
#[diesel(table_name = annotations)]
struct AnnotationPrivateNew {
    item_id: i32,
    user_id: i32,
    label_id: i32,
}

fn private_to_public(p: AnnotationPrivate) -> Result<AnnotationRecord, DbError> {
    use conversions::*;
    Ok(AnnotationRecord {
        annotation_id: i32_to_u32(p.id)?,
        item_id: i32_to_u32(p.item_id)?,
        user_id: i32_to_u32(p.user_id)?,
        label_id: i32_to_u32(p.label_id)?,
        created_at: p.created_at,
    })
}

/// Record a contributor's label for an item.
///
/// The item must exist and be active, the label must exist, and the user
/// must not have annotated the item before. The unique index on
/// `(item_id, user_id)` backs the last check up under concurrent writes.
pub fn insert_annotation(
    conn: &mut PgConnection,
    contributor_id: u32,
    new_annotation: &NewAnnotation,
) -> Result<AnnotationRecord, DbError> {
    let insert_row = AnnotationPrivateNew {
        item_id: conversions::u32_to_i32(new_annotation.item_id)?,
        user_id: conversions::u32_to_i32(contributor_id)?,
        label_id: conversions::u32_to_i32(new_annotation.label_id)?,
    };

    conn.transaction(|conn| {
        let item = get_data_item_by_id(conn, new_annotation.item_id)?;
        if !item.is_active {
            return Err(DbError::Invalid(format!(
                "Data item #{} is not open for labeling.",
                item.item_id
            )));
        }
        get_label_by_id(conn, new_annotation.label_id)?;

        let already_annotated: i64 = annotations::table
            .filter(annotations::item_id.eq(insert_row.item_id))
            .filter(annotations::user_id.eq(insert_row.user_id))
            .count()
            .get_result(conn)?;
        if already_annotated > 0 {
            return Err(DbError::Conflict(
                "You have already annotated this item.".to_string(),
            ));
        }

        diesel::insert_into(annotations::table)
            .values(&insert_row)
            .returning(AnnotationPrivate::as_returning())
            .get_result(conn)
            .map_err(|e| DbError::from_diesel(e, "Annotation"))
            .and_then(private_to_public)
    })
}

pub fn get_annotation_by_id(
    conn: &mut PgConnection,
    row_id: u32,
) -> Result<AnnotationRecord, DbError> {
    let row_id = conversions::u32_to_i32(row_id)?;

    annotations::table
        .filter(annotations::id.eq(row_id))
        .select(AnnotationPrivate::as_select())
        .first(conn)
        .map_err(|e| DbError::from_diesel(e, &format!("Annotation #{row_id}")))
        .and_then(private_to_public)
}

pub fn get_all_annotations(conn: &mut PgConnection) -> Result<Vec<AnnotationRecord>, DbError> {
    let items_private: Vec<AnnotationPrivate> = annotations::table
        .order(annotations::id.asc())
        .select(AnnotationPrivate::as_select())
        .load(conn)?;

    items_private
        .into_iter()
        .map(private_to_public)
        .collect::<Result<Vec<AnnotationRecord>, DbError>>()
}

pub fn get_annotations_for_item(
    conn: &mut PgConnection,
    input_item_id: u32,
) -> Result<Vec<AnnotationRecord>, DbError> {
    let input_item_id = conversions::u32_to_i32(input_item_id)?;

    let items_private: Vec<AnnotationPrivate> = annotations::table
        .filter(annotations::item_id.eq(input_item_id))
        .order(annotations::id.asc())
        .select(AnnotationPrivate::as_select())
        .load(conn)?;

    items_private
        .into_iter()
        .map(private_to_public)
        .collect::<Result<Vec<AnnotationRecord>, DbError>>()
}

/// Remove an annotation. Its validation, if any, goes with it.
pub fn delete_annotation(conn: &mut PgConnection, row_id: u32) -> Result<(), DbError> {
    let row_id = conversions::u32_to_i32(row_id)?;

    let deleted =
        diesel::delete(annotations::table.filter(annotations::id.eq(row_id))).execute(conn)?;
    if deleted == 0 {
        return Err(DbError::NotFound(format!("Annotation #{row_id} not found.")));
    }
    Ok(())
}
