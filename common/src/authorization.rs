//! Which role may do what.

use crate::{AnnotationRecord, Role, UserRecord};
use serde::Serialize;

/// Every operation the service exposes that needs a role check.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum Operation {
    ListDataItems,
    ListPendingDataItems,
    ReadDataItem,
    CreateDataItem,
    UpdateDataItem,
    ListLabels,
    CreateLabel,
    DeleteLabel,
    ReadAnnotation,
    CreateAnnotation,
    DeleteAnnotation,
    ReadValidation,
    CreateValidation,
    DeleteValidation,
    ReadItemStats,
    ReadUserStats,
    CreateUser,
}

/// Decide whether a role may perform an operation at all.
///
/// Ownership rules are layered on top by `can_delete_annotation` and `can_read_user_stats`.
pub fn authorize(role: Role, operation: Operation) -> bool {
    use Operation::*;
    match operation {
        ListDataItems | ListPendingDataItems | ReadDataItem | ListLabels | ReadAnnotation
        | ReadItemStats | ReadUserStats => true,
        CreateAnnotation => role == Role::Contributor,
        DeleteAnnotation => matches!(role, Role::Contributor | Role::Admin),
        ReadValidation | CreateValidation | DeleteValidation => role == Role::Validator,
        CreateDataItem | UpdateDataItem | CreateLabel | DeleteLabel | CreateUser => {
            role == Role::Admin
        }
    }
}

/// Contributors may delete their own annotations, admins may delete any.
pub fn can_delete_annotation(actor: &UserRecord, annotation: &AnnotationRecord) -> bool {
    match actor.role {
        Role::Admin => true,
        Role::Contributor => annotation.user_id == actor.user_id,
        Role::Validator => false,
    }
}

/// Anyone may read their own stats, admins may read everyone's.
pub fn can_read_user_stats(actor: &UserRecord, target_user_id: u32) -> bool {
    actor.role == Role::Admin || actor.user_id == target_user_id
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn user(user_id: u32, role: Role) -> UserRecord {
        UserRecord {
            user_id,
            username: format!("user{user_id}"),
            role,
            date_joined: Utc::now(),
        }
    }

    fn annotation_by(user_id: u32) -> AnnotationRecord {
        AnnotationRecord {
            annotation_id: 1,
            item_id: 1,
            user_id,
            label_id: 1,
            created_at: Utc::now(),
        }
    }

    #[test_log::test]
    fn test_only_contributors_annotate() {
        assert!(authorize(Role::Contributor, Operation::CreateAnnotation));
        assert!(!authorize(Role::Validator, Operation::CreateAnnotation));
        assert!(!authorize(Role::Admin, Operation::CreateAnnotation));
    }

    #[test_log::test]
    fn test_only_validators_validate() {
        for operation in [
            Operation::ReadValidation,
            Operation::CreateValidation,
            Operation::DeleteValidation,
        ] {
            assert!(authorize(Role::Validator, operation));
            assert!(!authorize(Role::Contributor, operation));
            assert!(!authorize(Role::Admin, operation));
        }
    }

    #[test_log::test]
    fn test_only_admins_manage_labels_and_items() {
        for operation in [
            Operation::CreateLabel,
            Operation::DeleteLabel,
            Operation::CreateDataItem,
            Operation::UpdateDataItem,
            Operation::CreateUser,
        ] {
            assert!(authorize(Role::Admin, operation));
            assert!(!authorize(Role::Contributor, operation));
            assert!(!authorize(Role::Validator, operation));
        }
    }

    #[test_log::test]
    fn test_reads_are_open_to_every_role() {
        for role in [Role::Contributor, Role::Validator, Role::Admin] {
            assert!(authorize(role, Operation::ListDataItems));
            assert!(authorize(role, Operation::ReadItemStats));
            assert!(authorize(role, Operation::ListLabels));
        }
    }

    #[test_log::test]
    fn test_annotation_deletion_ownership() {
        let owner = user(1, Role::Contributor);
        let other = user(2, Role::Contributor);
        let admin = user(3, Role::Admin);
        let validator = user(4, Role::Validator);
        let annotation = annotation_by(1);

        assert!(can_delete_annotation(&owner, &annotation));
        assert!(!can_delete_annotation(&other, &annotation));
        assert!(can_delete_annotation(&admin, &annotation));
        assert!(!can_delete_annotation(&validator, &annotation));
    }

    #[test_log::test]
    fn test_user_stats_visibility() {
        let contributor = user(1, Role::Contributor);
        let admin = user(2, Role::Admin);
        assert!(can_read_user_stats(&contributor, 1));
        assert!(!can_read_user_stats(&contributor, 5));
        assert!(can_read_user_stats(&admin, 5));
    }
}
