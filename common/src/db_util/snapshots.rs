//! Load the read-only views the consensus and progress engine works on.

use super::schema::{annotations, data_items, labels, validations};
use super::*;
use itertools::Itertools;

/// One row of an annotation joined with its label and optional validation.
type AnnotationRow = (i32, i32, String, Option<i32>, Option<bool>);

fn row_to_snapshot(row: AnnotationRow) -> Result<(u32, AnnotationSnapshot), DbError> {
    use conversions::*;
    let (annotation_id, item_id, label_name, validation_id, is_approved) = row;
    let validation = match (validation_id, is_approved) {
        (Some(validation_id), Some(is_approved)) => Some(ValidationSnapshot {
            validation_id: i32_to_u32(validation_id)?,
            is_approved,
        }),
        _ => None,
    };
    Ok((
        i32_to_u32(item_id)?,
        AnnotationSnapshot {
            annotation_id: i32_to_u32(annotation_id)?,
            label_name,
            validation,
        },
    ))
}

/// Load annotations matching a filter, in submission order.
macro_rules! load_annotation_rows {
    ($conn:expr, $filter:expr) => {
        annotations::table
            .inner_join(labels::table)
            .left_join(validations::table)
            .filter($filter)
            .order(annotations::id.asc())
            .select((
                annotations::id,
                annotations::item_id,
                labels::name,
                validations::id.nullable(),
                validations::is_approved.nullable(),
            ))
            .load::<AnnotationRow>($conn)
    };
}

/// Get an item with all of its annotations.
pub fn get_item_snapshot(conn: &mut PgConnection, input_item_id: u32) -> Result<ItemSnapshot, DbError> {
    let item = get_data_item_by_id(conn, input_item_id)?;
    let row_id = conversions::u32_to_i32(item.item_id)?;

    let rows = load_annotation_rows!(conn, annotations::item_id.eq(row_id))?;
    let annotations = rows
        .into_iter()
        .map(|row| row_to_snapshot(row).map(|(_, snapshot)| snapshot))
        .collect::<Result<Vec<_>, DbError>>()?;

    Ok(ItemSnapshot {
        item_id: item.item_id,
        annotations,
    })
}

/// Get a user with every annotation they have submitted.
pub fn get_user_snapshot(conn: &mut PgConnection, input_user_id: u32) -> Result<UserSnapshot, DbError> {
    let user = get_user_by_id(conn, input_user_id)?;
    let row_id = conversions::u32_to_i32(user.user_id)?;

    let rows = load_annotation_rows!(conn, annotations::user_id.eq(row_id))?;
    let annotations = rows
        .into_iter()
        .map(|row| row_to_snapshot(row).map(|(_, snapshot)| snapshot))
        .collect::<Result<Vec<_>, DbError>>()?;

    Ok(UserSnapshot {
        user_id: user.user_id,
        username: user.username,
        role: user.role,
        annotations,
    })
}

/// Get every active item with its annotations in two queries.
/// Items nobody has annotated yet are included with an empty list.
pub fn get_active_item_snapshots(conn: &mut PgConnection) -> Result<Vec<ItemSnapshot>, DbError> {
    let active_ids: Vec<i32> = data_items::table
        .filter(data_items::is_active.eq(true))
        .order(data_items::id.asc())
        .select(data_items::id)
        .load(conn)?;

    let rows = load_annotation_rows!(conn, annotations::item_id.eq_any(&active_ids))?;
    let mut grouped = rows
        .into_iter()
        .map(row_to_snapshot)
        .collect::<Result<Vec<_>, DbError>>()?
        .into_iter()
        .into_group_map();

    active_ids
        .into_iter()
        .map(|id| {
            let item_id = conversions::i32_to_u32(id)?;
            Ok(ItemSnapshot {
                item_id,
                annotations: grouped.remove(&item_id).unwrap_or_default(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test_log::test]
    fn test_row_without_validation() {
        let (item_id, snapshot) = row_to_snapshot((5, 2, "cat".to_string(), None, None)).unwrap();
        assert_eq!(item_id, 2);
        assert_eq!(snapshot.annotation_id, 5);
        assert_eq!(snapshot.label_name, "cat");
        assert!(!snapshot.is_validated());
    }

    #[test_log::test]
    fn test_row_with_rejection() {
        let (_, snapshot) =
            row_to_snapshot((5, 2, "cat".to_string(), Some(8), Some(false))).unwrap();
        assert_eq!(
            snapshot.validation,
            Some(ValidationSnapshot {
                validation_id: 8,
                is_approved: false,
            })
        );
        assert!(snapshot.is_rejected());
    }

    #[test_log::test]
    fn test_row_with_negative_id_fails() {
        assert!(matches!(
            row_to_snapshot((-1, 2, "cat".to_string(), None, None)),
            Err(DbError::Conversion(_))
        ));
    }
}
