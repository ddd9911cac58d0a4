//! Diesel table definitions; must match `migrations/`.

diesel::table! {
    /// Delivery requests and their lifecycle state.
    deliveries (id) {
        id -> Int8,
        /// `created`, `delivers`, `completed` or `canceled`.
        status -> Text,
        destination -> Text,
        recipient_id -> Int8,
        courier_id -> Nullable<Int8>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
        /// Bumped by every transition; the optimistic concurrency token.
        version -> Int4,
    }
}
