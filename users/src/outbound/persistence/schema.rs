//! Diesel table definitions; must match `migrations/`.

diesel::table! {
    /// User accounts.
    users (id) {
        id -> Int8,
        /// Lowercase, unique.
        email -> Text,
        password_hash -> Text,
        /// `user`, `admin` or `courier`.
        role -> Text,
        /// `active`, `frozen` or `blocked`.
        status -> Text,
        created_at -> Timestamptz,
    }
}
