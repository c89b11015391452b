#[allow(unused_imports)]
use diesel::sql_types::*;

table! {
    use crate::datastore::structs::CategoryMapping;
    #[allow(unused_imports)]
    use diesel::sql_types::*;
    posts (id) {
        id -> Uuid,
        created_at -> Timestamptz,
        body -> Text,
        category -> CategoryMapping,
        author_id -> Text,
        liked_ids -> Array<Text>,
    }
}

table! {
    users (id) {
        id -> Text,
        created_at -> Timestamptz,
        name -> Text,
        image -> Nullable<Text>,
    }
}

table! {
    comments (id) {
        id -> Uuid,
        created_at -> Timestamptz,
        body -> Text,
        post_id -> Uuid,
        user_id -> Text,
    }
}

joinable!(comments -> posts (post_id));
joinable!(comments -> users (user_id));
allow_tables_to_appear_in_same_query!(comments, users);
allow_tables_to_appear_in_same_query!(comments, posts);
