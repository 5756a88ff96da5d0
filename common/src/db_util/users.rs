use super::schema::users;
use super::*;

#[derive(Queryable, Selectable)]
#[diesel(table_name = users)]
struct UserPrivate {
    id: i32,
    username: String,
    role: String,
    date_joined: DateTime<Utc>,
}

#[derive(Insertable)]
#[diesel(table_name = users)]
struct UserPrivateNew {
    username: String,
    role: String,
}

fn private_to_public(p: UserPrivate) -> Result<UserRecord, DbError> {
    use conversions::*;
    Ok(UserRecord {
        user_id: i32_to_u32(p.id)?,
        username: p.username,
        role: deserialize_role(&p.role)?,
        date_joined: p.date_joined,
    })
}

/// Register a user the auth gateway knows about.
pub fn insert_user(conn: &mut PgConnection, new_user: &NewUser) -> Result<UserRecord, DbError> {
    let input_username = new_user.username.trim();
    if input_username.is_empty() {
        return Err(DbError::Invalid("Username cannot be empty.".to_string()));
    }

    let insert_row = UserPrivateNew {
        username: input_username.to_string(),
        role: conversions::serialize_role(new_user.role),
    };

    diesel::insert_into(users::table)
        .values(&insert_row)
        .returning(UserPrivate::as_returning())
        .get_result(conn)
        .map_err(|e| DbError::from_diesel(e, &format!("User {input_username}")))
        .and_then(private_to_public)
}

pub fn get_user_by_id(conn: &mut PgConnection, row_id: u32) -> Result<UserRecord, DbError> {
    let row_id = conversions::u32_to_i32(row_id)?;

    users::table
        .filter(users::id.eq(row_id))
        .select(UserPrivate::as_select())
        .first(conn)
        .map_err(|e| DbError::from_diesel(e, &format!("User #{row_id}")))
        .and_then(private_to_public)
}

pub fn get_user_by_username(
    conn: &mut PgConnection,
    input_username: &str,
) -> Result<UserRecord, DbError> {
    users::table
        .filter(users::username.eq(input_username))
        .select(UserPrivate::as_select())
        .first(conn)
        .map_err(|e| DbError::from_diesel(e, &format!("User {input_username}")))
        .and_then(private_to_public)
}
