//! A library with common utilities for labeling data items and validating the labels.

pub mod authorization;
pub mod config;
pub mod consensus;
#[cfg(feature = "database")]
pub mod db_util;
pub mod metrics;
pub mod progress;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Header the upstream gateway uses to forward the authenticated username.
pub const USER_HEADER: &str = "X-Labeling-User";

/// Each kind of content a data item can hold.
/// Which of these a deployment accepts is decided by `config::Settings`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Image,
    Text,
    Audio,
}

impl DataType {
    pub const ALL: [DataType; 3] = [DataType::Image, DataType::Text, DataType::Audio];

    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::Image => "image",
            DataType::Text => "text",
            DataType::Audio => "audio",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "image" => Ok(DataType::Image),
            "text" => Ok(DataType::Text),
            "audio" => Ok(DataType::Audio),
            other => Err(format!("Unknown data type: {other}")),
        }
    }
}

/// The closed set of roles a user can hold.
#[derive(
    Debug, Copy, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Contributor,
    Validator,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Contributor => "contributor",
            Role::Validator => "validator",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "contributor" => Ok(Role::Contributor),
            "validator" => Ok(Role::Validator),
            "admin" => Ok(Role::Admin),
            other => Err(format!("Unknown role: {other}")),
        }
    }
}

/// A user as stored in the database. Credentials live with the auth gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub user_id: u32,
    pub username: String,
    pub role: Role,
    pub date_joined: DateTime<Utc>,
}

/// A piece of content waiting to be labeled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataItemRecord {
    pub item_id: u32,
    pub content: String,
    pub data_type: DataType,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelRecord {
    pub label_id: u32,
    pub name: String,
}

/// One contributor's label choice for one data item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationRecord {
    pub annotation_id: u32,
    pub item_id: u32,
    pub user_id: u32,
    pub label_id: u32,
    pub created_at: DateTime<Utc>,
}

/// A validator's decision on one annotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationRecord {
    pub validation_id: u32,
    pub annotation_id: u32,
    pub validator_id: u32,
    pub is_approved: bool,
    pub feedback: Option<String>,
    pub validated_at: DateTime<Utc>,
}

fn default_true() -> bool {
    true
}

/// Body of a request to create a data item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDataItem {
    pub content: String,
    pub data_type: DataType,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

/// Body of a request to register a user the auth gateway already knows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    pub username: String,
    #[serde(default)]
    pub role: Role,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLabel {
    pub name: String,
}

/// Body of a request to annotate an item. The contributor comes from the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAnnotation {
    pub item_id: u32,
    pub label_id: u32,
}

/// Body of a request to validate an annotation. The validator comes from the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewValidation {
    pub annotation_id: u32,
    #[serde(default = "default_true")]
    pub is_approved: bool,
    #[serde(default)]
    pub feedback: Option<String>,
}

/// The validation state of an annotation as seen by the engine.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationSnapshot {
    pub validation_id: u32,
    pub is_approved: bool,
}

/// An annotation reduced to what the engine needs: the chosen label and its validation, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationSnapshot {
    pub annotation_id: u32,
    pub label_name: String,
    pub validation: Option<ValidationSnapshot>,
}

impl AnnotationSnapshot {
    pub fn is_validated(&self) -> bool {
        self.validation.is_some()
    }

    pub fn is_approved(&self) -> bool {
        self.validation.is_some_and(|v| v.is_approved)
    }

    pub fn is_rejected(&self) -> bool {
        self.validation.is_some_and(|v| !v.is_approved)
    }
}

/// A data item together with all of its annotations, in submission order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemSnapshot {
    pub item_id: u32,
    pub annotations: Vec<AnnotationSnapshot>,
}

/// A user together with all of the annotations they have submitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSnapshot {
    pub user_id: u32,
    pub username: String,
    pub role: Role,
    pub annotations: Vec<AnnotationSnapshot>,
}

#[cfg(test)]
pub(crate) mod test_helpers {
    use super::*;

    /// Build an annotation snapshot. `validation` is `None` for unvalidated,
    /// `Some(true)` for approved and `Some(false)` for rejected.
    pub fn annotation(id: u32, label: &str, validation: Option<bool>) -> AnnotationSnapshot {
        AnnotationSnapshot {
            annotation_id: id,
            label_name: label.to_string(),
            validation: validation.map(|is_approved| ValidationSnapshot {
                validation_id: id + 1000,
                is_approved,
            }),
        }
    }

    pub fn item(item_id: u32, labels: &[&str]) -> ItemSnapshot {
        ItemSnapshot {
            item_id,
            annotations: labels
                .iter()
                .enumerate()
                .map(|(i, label)| annotation(i as u32 + 1, label, None))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test_log::test]
    fn test_data_type_round_trips_through_str() {
        for data_type in DataType::ALL {
            assert_eq!(data_type.as_str().parse::<DataType>(), Ok(data_type));
        }
        assert_eq!(" Image ".parse::<DataType>(), Ok(DataType::Image));
        assert!("video".parse::<DataType>().is_err());
    }

    #[test_log::test]
    fn test_role_parsing_and_default() {
        assert_eq!(Role::default(), Role::Contributor);
        assert_eq!("validator".parse::<Role>(), Ok(Role::Validator));
        assert_eq!("ADMIN".parse::<Role>(), Ok(Role::Admin));
        assert!("superuser".parse::<Role>().is_err());
    }

    #[test_log::test]
    fn test_new_validation_defaults_to_approved() {
        let body: NewValidation = serde_json::from_str(r#"{"annotation_id": 4}"#).unwrap();
        assert!(body.is_approved);
        assert_eq!(body.feedback, None);
    }

    #[test_log::test]
    fn test_new_user_defaults_to_contributor() {
        let body: NewUser = serde_json::from_str(r#"{"username": "carol"}"#).unwrap();
        assert_eq!(body.role, Role::Contributor);
    }

    #[test_log::test]
    fn test_data_type_serializes_lowercase() {
        let json = serde_json::to_string(&DataType::Audio).unwrap();
        assert_eq!(json, "\"audio\"");
    }
}
