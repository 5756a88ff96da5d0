//! Derived counts over an item's or a user's annotations.
//!
//! Every function here is total: empty inputs report zero counts and a zero percentage.

use crate::{AnnotationSnapshot, ItemSnapshot, UserSnapshot};

/// `100 * part / whole`, or zero when there is nothing to divide by.
#[allow(clippy::cast_precision_loss)]
pub fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    100.0 * part as f64 / whole as f64
}

fn count_validated(annotations: &[AnnotationSnapshot]) -> usize {
    annotations.iter().filter(|a| a.is_validated()).count()
}

fn count_approved(annotations: &[AnnotationSnapshot]) -> usize {
    annotations.iter().filter(|a| a.is_approved()).count()
}

fn count_rejected(annotations: &[AnnotationSnapshot]) -> usize {
    annotations.iter().filter(|a| a.is_rejected()).count()
}

pub fn annotation_count(item: &ItemSnapshot) -> usize {
    item.annotations.len()
}

/// Annotations on the item that have a validation, approved or not.
pub fn validated_count(item: &ItemSnapshot) -> usize {
    count_validated(&item.annotations)
}

pub fn approved_count(item: &ItemSnapshot) -> usize {
    count_approved(&item.annotations)
}

/// True once the item has at least one annotation and every annotation has been validated.
pub fn is_fully_validated(item: &ItemSnapshot) -> bool {
    let total = annotation_count(item);
    total > 0 && total == validated_count(item)
}

/// Percentage of the item's annotations that have been validated.
pub fn validation_progress(item: &ItemSnapshot) -> f64 {
    percentage(validated_count(item), annotation_count(item))
}

pub fn total_annotations(user: &UserSnapshot) -> usize {
    user.annotations.len()
}

pub fn approved_annotations(user: &UserSnapshot) -> usize {
    count_approved(&user.annotations)
}

pub fn rejected_annotations(user: &UserSnapshot) -> usize {
    count_rejected(&user.annotations)
}

/// Annotations that have not been validated yet.
pub fn pending_validations(user: &UserSnapshot) -> usize {
    total_annotations(user) - approved_annotations(user) - rejected_annotations(user)
}

/// Percentage of the user's annotations that were approved.
pub fn precision(user: &UserSnapshot) -> f64 {
    percentage(approved_annotations(user), total_annotations(user))
}
