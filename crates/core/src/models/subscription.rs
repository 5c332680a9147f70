//! Subscription model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Days of access granted by a purchase
pub const SUBSCRIPTION_DAYS: i64 = 365;

/// A time-boxed entitlement to one package
///
/// Activity is never stored; it is recomputed from the two timestamps on
/// every evaluation via [`Subscription::is_active_at`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscription {
    pub id: Uuid,
    pub user_id: Uuid,
    pub package_id: Uuid,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

impl Subscription {
    /// Build the subscription created by a purchase: starts now, runs one year
    pub fn purchase(user_id: Uuid, package_id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            package_id,
            start_date: now,
            end_date: now + chrono::Duration::days(SUBSCRIPTION_DAYS),
        }
    }

    /// Closed interval on both ends: the boundary instants count as active
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.start_date <= now && now <= self.end_date
    }
}
