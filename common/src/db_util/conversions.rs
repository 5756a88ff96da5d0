//! Safe-ish conversions between rust and sql types.

use super::*;

pub fn i32_to_u32(i: i32) -> Result<u32, DbError> {
    u32::try_from(i)
        .map_err(|_| DbError::Conversion(format!("i32 value {i} is negative and cannot be converted to u32")))
}
pub fn u32_to_i32(i: u32) -> Result<i32, DbError> {
    i32::try_from(i)
        .map_err(|_| DbError::Conversion(format!("u32 value {i} exceeds i32::MAX and cannot be converted to i32")))
}

pub fn serialize_role(role: Role) -> String {
    role.as_str().to_string()
}
pub fn deserialize_role(role: &str) -> Result<Role, DbError> {
    role.parse::<Role>().map_err(DbError::Conversion)
}

pub fn serialize_data_type(data_type: DataType) -> String {
    data_type.as_str().to_string()
}
pub fn deserialize_data_type(data_type: &str) -> Result<DataType, DbError> {
    data_type.parse::<DataType>().map_err(DbError::Conversion)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test_log::test]
    fn test_id_conversions() {
        assert_eq!(i32_to_u32(42).unwrap(), 42);
        assert!(i32_to_u32(-1).is_err());
        assert_eq!(u32_to_i32(42).unwrap(), 42);
        assert!(u32_to_i32(u32::MAX).is_err());
    }

    #[test_log::test]
    fn test_enum_conversions() {
        assert_eq!(deserialize_role(&serialize_role(Role::Validator)).unwrap(), Role::Validator);
        assert_eq!(
            deserialize_data_type(&serialize_data_type(DataType::Audio)).unwrap(),
            DataType::Audio
        );
        assert!(matches!(deserialize_role("root"), Err(DbError::Conversion(_))));
    }
}
