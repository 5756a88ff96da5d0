//! Table definitions shared by the query modules so they can be joined.

diesel::table! {
    users (id) {
        id -> Integer,
        username -> Varchar,
        role -> Varchar,
        date_joined -> Timestamptz,
    }
}

diesel::table! {
    data_items (id) {
        id -> Integer,
        content -> Text,
        data_type -> Varchar,
        is_active -> Bool,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    labels (id) {
        id -> Integer,
        name -> Varchar,
    }
}

diesel::table! {
    annotations (id) {
        id -> Integer,
        item_id -> Integer,
        user_id -> Integer,
        label_id -> Integer,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    validations (id) {
        id -> Integer,
        annotation_id -> Integer,
        validator_id -> Integer,
        is_approved -> Bool,
        feedback -> Nullable<Text>,
        validated_at -> Timestamptz,
    }
}

diesel::joinable!(annotations -> data_items (item_id));
diesel::joinable!(annotations -> users (user_id));
diesel::joinable!(annotations -> labels (label_id));
diesel::joinable!(validations -> annotations (annotation_id));

diesel::allow_tables_to_appear_in_same_query!(users, data_items, labels, annotations, validations);
