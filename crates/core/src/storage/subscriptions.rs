//! Subscription storage operations
//!
//! Rows are returned with no time filter; deciding whether a subscription is
//! active belongs to the entitlement engine, which evaluates the window
//! against an explicit clock.

use rusqlite::{params, Connection, Row};
use tracing::instrument;
use uuid::Uuid;

use super::parse::{parse_datetime, parse_uuid, OptionalExt};
use crate::error::Result;
use crate::models::Subscription;

pub struct SubscriptionStore<'a> {
    conn: &'a Connection,
}

fn subscription_from_row(row: &Row<'_>) -> rusqlite::Result<Subscription> {
    Ok(Subscription {
        id: parse_uuid(&row.get::<_, String>(0)?)?,
        user_id: parse_uuid(&row.get::<_, String>(1)?)?,
        package_id: parse_uuid(&row.get::<_, String>(2)?)?,
        start_date: parse_datetime(&row.get::<_, String>(3)?)?,
        end_date: parse_datetime(&row.get::<_, String>(4)?)?,
    })
}

const SUBSCRIPTION_COLUMNS: &str = "id, user_id, package_id, start_date, end_date";

impl<'a> SubscriptionStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Create a new subscription
    #[instrument(skip(self, sub), fields(user_id = %sub.user_id, package_id = %sub.package_id))]
    pub fn create(&self, sub: &Subscription) -> Result<()> {
        self.conn.execute(
            "INSERT INTO subscriptions (id, user_id, package_id, start_date, end_date)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                sub.id.to_string(),
                sub.user_id.to_string(),
                sub.package_id.to_string(),
                sub.start_date.to_rfc3339(),
                sub.end_date.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Find subscription by ID
    #[instrument(skip(self))]
    pub fn find_by_id(&self, id: Uuid) -> Result<Option<Subscription>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {SUBSCRIPTION_COLUMNS} FROM subscriptions WHERE id = ?1"
        ))?;

        let sub = stmt
            .query_row(params![id.to_string()], subscription_from_row)
            .optional()?;

        Ok(sub)
    }

    /// All subscriptions held by a user, newest first
    #[instrument(skip(self))]
    pub fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Subscription>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {SUBSCRIPTION_COLUMNS} FROM subscriptions
             WHERE user_id = ?1 ORDER BY start_date DESC"
        ))?;

        let subs = stmt
            .query_map(params![user_id.to_string()], subscription_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(subs)
    }

    /// All subscriptions a user holds for one package
    ///
    /// Duplicates and overlaps are possible; callers treat the rows as a set.
    #[instrument(skip(self))]
    pub fn list_for_user_package(&self, user_id: Uuid, package_id: Uuid) -> Result<Vec<Subscription>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {SUBSCRIPTION_COLUMNS} FROM subscriptions
             WHERE user_id = ?1 AND package_id = ?2"
        ))?;

        let subs = stmt
            .query_map(
                params![user_id.to_string(), package_id.to_string()],
                subscription_from_row,
            )?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(subs)
    }

    /// Delete subscription
    #[instrument(skip(self))]
    pub fn delete(&self, subscription_id: Uuid) -> Result<()> {
        self.conn.execute(
            "DELETE FROM subscriptions WHERE id = ?1",
            params![subscription_id.to_string()],
        )?;
        Ok(())
    }
}
