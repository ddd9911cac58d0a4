//! Internal Diesel row structs.

use chrono::{DateTime, Utc};
use diesel::prelude::*;

use super::schema::deliveries;

/// Row read from `deliveries`.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = deliveries)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct DeliveryRow {
    pub id: i64,
    pub status: String,
    pub destination: String,
    pub recipient_id: i64,
    pub courier_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub version: i32,
}

/// Row inserted into `deliveries`; id and version come from column defaults.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = deliveries)]
pub(crate) struct NewDeliveryRow<'a> {
    pub status: &'a str,
    pub destination: &'a str,
    pub recipient_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Columns a transition rewrites.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = deliveries)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct TransitionChangeset<'a> {
    pub status: &'a str,
    pub courier_id: Option<i64>,
    pub updated_at: DateTime<Utc>,
}
