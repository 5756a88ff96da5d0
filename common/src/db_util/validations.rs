use super::schema::validations;
use super::*;

#[derive(Queryable, Selectable)]
#[diesel(table_name = validations)]
struct ValidationPrivate {
    id: i32,
    annotation_id: i32,
    validator_id: i32,
    is_approved: bool,
    feedback: Option<String>,
    validated_at: DateTime<Utc>,
}

#[derive(Insertable)]
#[diesel(table_name = validations)]
struct ValidationPrivateNew {
    annotation_id: i32,
    validator_id: i32,
    is_approved: bool,
    feedback: Option<String>,
}

fn private_to_public(p: ValidationPrivate) -> Result<ValidationRecord, DbError> {
    use conversions::*;
    Ok(ValidationRecord {
        validation_id: i32_to_u32(p.id)?,
        annotation_id: i32_to_u32(p.annotation_id)?,
        validator_id: i32_to_u32(p.validator_id)?,
        is_approved: p.is_approved,
        feedback: p.feedback,
        validated_at: p.validated_at,
    })
}

fn build_new_row(
    validator_id: u32,
    new_validation: &NewValidation,
) -> Result<ValidationPrivateNew, DbError> {
    use conversions::*;
    Ok(ValidationPrivateNew {
        annotation_id: u32_to_i32(new_validation.annotation_id)?,
        validator_id: u32_to_i32(validator_id)?,
        is_approved: new_validation.is_approved,
        feedback: new_validation
            .feedback
            .as_deref()
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .map(str::to_string),
    })
}

/// Record a validator's decision on an annotation. Each annotation is validated at most once.
pub fn insert_validation(
    conn: &mut PgConnection,
    validator_id: u32,
    new_validation: &NewValidation,
) -> Result<ValidationRecord, DbError> {
    let insert_row = build_new_row(validator_id, new_validation)?;

    conn.transaction(|conn| {
        get_annotation_by_id(conn, new_validation.annotation_id)?;

        let already_validated: i64 = validations::table
            .filter(validations::annotation_id.eq(insert_row.annotation_id))
            .count()
            .get_result(conn)?;
        if already_validated > 0 {
            return Err(DbError::Conflict(format!(
                "Annotation #{} has already been validated.",
                new_validation.annotation_id
            )));
        }

        diesel::insert_into(validations::table)
            .values(&insert_row)
            .returning(ValidationPrivate::as_returning())
            .get_result(conn)
            .map_err(|e| DbError::from_diesel(e, "Validation"))
            .and_then(private_to_public)
    })
}

pub fn get_validation_by_id(
    conn: &mut PgConnection,
    row_id: u32,
) -> Result<ValidationRecord, DbError> {
    let row_id = conversions::u32_to_i32(row_id)?;

    validations::table
        .filter(validations::id.eq(row_id))
        .select(ValidationPrivate::as_select())
        .first(conn)
        .map_err(|e| DbError::from_diesel(e, &format!("Validation #{row_id}")))
        .and_then(private_to_public)
}

pub fn get_all_validations(conn: &mut PgConnection) -> Result<Vec<ValidationRecord>, DbError> {
    let items_private: Vec<ValidationPrivate> = validations::table
        .order(validations::id.asc())
        .select(ValidationPrivate::as_select())
        .load(conn)?;

    items_private
        .into_iter()
        .map(private_to_public)
        .collect::<Result<Vec<ValidationRecord>, DbError>>()
}

pub fn delete_validation(conn: &mut PgConnection, row_id: u32) -> Result<(), DbError> {
    let row_id = conversions::u32_to_i32(row_id)?;

    let deleted =
        diesel::delete(validations::table.filter(validations::id.eq(row_id))).execute(conn)?;
    if deleted == 0 {
        return Err(DbError::NotFound(format!("Validation #{row_id} not found.")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test_log::test]
    fn test_build_new_row_drops_blank_feedback() {
        let body = NewValidation {
            annotation_id: 3,
            is_approved: false,
            feedback: Some("   ".to_string()),
        };
        let row = build_new_row(9, &body).unwrap();
        assert_eq!(row.annotation_id, 3);
        assert_eq!(row.validator_id, 9);
        assert!(!row.is_approved);
        assert_eq!(row.feedback, None);
    }

    #[test_log::test]
    fn test_build_new_row_trims_feedback() {
        let body = NewValidation {
            annotation_id: 3,
            is_approved: true,
            feedback: Some(" looks right \n".to_string()),
        };
        let row = build_new_row(9, &body).unwrap();
        assert_eq!(row.feedback.as_deref(), Some("looks right"));
    }
}
