//! Diesel schema for trail persistence.

diesel::table! {
    /// Trail records. Row-level security is enabled on this table.
    trails (id) {
        /// Trail identifier, defaulted by `gen_random_uuid()`.
        id -> Uuid,
        /// Query that produced the trail.
        query -> Text,
        /// Creation timestamp, defaulted by `now()`.
        created_at -> Timestamptz,
        /// Optional synthesis text.
        synthesis -> Nullable<Text>,
        /// Optional graph nodes as JSON.
        nodes -> Nullable<Json>,
        /// Optional graph edges as JSON.
        edges -> Nullable<Json>,
    }
}
