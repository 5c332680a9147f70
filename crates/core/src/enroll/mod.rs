//! Subscription purchase flow
//!
//! A purchase always starts now and runs for a fixed year; subscriptions are
//! never updated afterwards and expire passively by falling out of their
//! window. Several overlapping subscriptions to the same package may coexist.

use chrono::{DateTime, Utc};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::Subscription;
use crate::storage::{CatalogRepository, SubscriptionRepository, UserRepository};

/// Purchase and listing operations over the repository stack
pub struct EnrollmentService<'a, R> {
    repo: &'a R,
}

impl<'a, R> EnrollmentService<'a, R>
where
    R: UserRepository + CatalogRepository + SubscriptionRepository,
{
    pub fn new(repo: &'a R) -> Self {
        Self { repo }
    }

    /// Purchase a package subscription for a user, starting at `now`
    #[instrument(skip(self))]
    pub fn purchase(
        &self,
        user_id: Uuid,
        package_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Subscription> {
        if !self.repo.user_exists(user_id)? {
            return Err(Error::NotFound(format!("user {user_id}")));
        }
        if !self.repo.package_exists(package_id)? {
            return Err(Error::NotFound(format!("package {package_id}")));
        }

        let sub = Subscription::purchase(user_id, package_id, now);
        self.store(sub)
    }

    /// Persist a subscription row, rejecting an inverted or empty window
    ///
    /// `Subscription::purchase` cannot produce one, so this only trips on
    /// hand-built rows (admin backfills, imports).
    #[instrument(skip(self, sub), fields(user_id = %sub.user_id, package_id = %sub.package_id))]
    pub fn store(&self, sub: Subscription) -> Result<Subscription> {
        if sub.end_date <= sub.start_date {
            return Err(Error::InvalidOperation(
                "Subscription end date must be after its start date".into(),
            ));
        }

        self.repo.create_subscription(&sub)?;
        info!(subscription_id = %sub.id, end_date = %sub.end_date, "Subscription created");
        Ok(sub)
    }

    /// Subscriptions of a user that are active at `now`
    pub fn active_subscriptions(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Vec<Subscription>> {
        let subs = self.repo.list_subscriptions_for_user(user_id)?;
        Ok(subs.into_iter().filter(|s| s.is_active_at(now)).collect())
    }
}
