//! Diesel schema for task persistence.

diesel::table! {
    /// Task records.
    tasks (id) {
        /// Internal task identifier.
        id -> Uuid,
        /// Task description.
        description -> Text,
        /// Normalized creator identity.
        creator -> Text,
        /// Normalized assignee identities in display order.
        assignees -> Array<Text>,
        /// Optional due date.
        due_date -> Nullable<Timestamptz>,
        /// Optional free-text notes.
        notes -> Nullable<Text>,
        /// Lifecycle status.
        #[max_length = 16]
        status -> Varchar,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Completion timestamp, set while completed.
        completed_at -> Nullable<Timestamptz>,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}
