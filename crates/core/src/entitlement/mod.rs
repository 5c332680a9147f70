//! Entitlement engine
//!
//! Owns the rule for whether a user may access a package, course, or lesson
//! at a given instant. The answer is a pure function of (evaluation time, the
//! user's subscriptions, the resource's containment chain Lesson -> Course ->
//! {Package...}). The clock is always passed in explicitly so fixed-clock
//! tests stay deterministic; nothing here reads wall-clock time or caches a
//! decision.
//!
//! Role bypass (Admin/Teacher) and the free-lesson exception live in
//! [`crate::access`], not here. The engine only answers the subscription
//! question.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::Subscription;
use crate::storage::Database;

/// The queries the engine needs from persisted state
///
/// Containment is mutable (packages gain and lose courses), so every method
/// must read a fresh view; implementations never memoize across calls.
pub trait EntitlementSource {
    fn user_exists(&self, user_id: Uuid) -> Result<bool>;
    fn package_exists(&self, package_id: Uuid) -> Result<bool>;
    fn course_exists(&self, course_id: Uuid) -> Result<bool>;

    /// Owning course of a lesson, `None` if the lesson id is unknown
    fn lesson_course(&self, lesson_id: Uuid) -> Result<Option<Uuid>>;

    /// Every package currently containing the course (possibly empty)
    fn packages_containing_course(&self, course_id: Uuid) -> Result<Vec<Uuid>>;

    /// Every subscription the user holds for the package, active or not
    fn subscriptions_for(&self, user_id: Uuid, package_id: Uuid) -> Result<Vec<Subscription>>;
}

impl EntitlementSource for Database {
    fn user_exists(&self, user_id: Uuid) -> Result<bool> {
        self.users().exists(user_id)
    }

    fn package_exists(&self, package_id: Uuid) -> Result<bool> {
        self.packages().exists(package_id)
    }

    fn course_exists(&self, course_id: Uuid) -> Result<bool> {
        self.courses().exists(course_id)
    }

    fn lesson_course(&self, lesson_id: Uuid) -> Result<Option<Uuid>> {
        self.lessons().course_of(lesson_id)
    }

    fn packages_containing_course(&self, course_id: Uuid) -> Result<Vec<Uuid>> {
        self.packages().packages_containing_course(course_id)
    }

    fn subscriptions_for(&self, user_id: Uuid, package_id: Uuid) -> Result<Vec<Subscription>> {
        self.subscriptions().list_for_user_package(user_id, package_id)
    }
}

/// The three entitlement queries, one per resource granularity
///
/// Split out as a trait so the access policy can be tested against a
/// call-counting mock.
pub trait EntitlementQueries {
    fn has_active_subscription_for_package(
        &self,
        user_id: Uuid,
        package_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<bool>;

    fn has_active_subscription_for_course(
        &self,
        user_id: Uuid,
        course_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<bool>;

    fn has_active_subscription_for_lesson(
        &self,
        user_id: Uuid,
        lesson_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<bool>;
}

/// Stateless entitlement evaluator over a storage view
pub struct EntitlementEngine<'a, S: EntitlementSource> {
    source: &'a S,
}

impl<'a, S: EntitlementSource> EntitlementEngine<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Self { source }
    }

    fn require_user(&self, user_id: Uuid) -> Result<()> {
        if !self.source.user_exists(user_id)? {
            return Err(Error::NotFound(format!("user {user_id}")));
        }
        Ok(())
    }

    /// True iff any subscription row for (user, package) is active at `now`
    fn any_active(&self, user_id: Uuid, package_id: Uuid, now: DateTime<Utc>) -> Result<bool> {
        let subs = self.source.subscriptions_for(user_id, package_id)?;
        Ok(subs.iter().any(|s| s.is_active_at(now)))
    }

    /// OR across every package containing the course
    ///
    /// A course in zero packages (orphaned containment) resolves to false,
    /// never an error.
    fn any_active_for_course(
        &self,
        user_id: Uuid,
        course_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<bool> {
        for package_id in self.source.packages_containing_course(course_id)? {
            if self.any_active(user_id, package_id, now)? {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

impl<S: EntitlementSource> EntitlementQueries for EntitlementEngine<'_, S> {
    fn has_active_subscription_for_package(
        &self,
        user_id: Uuid,
        package_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<bool> {
        self.require_user(user_id)?;
        if !self.source.package_exists(package_id)? {
            return Err(Error::NotFound(format!("package {package_id}")));
        }
        self.any_active(user_id, package_id, now)
    }

    fn has_active_subscription_for_course(
        &self,
        user_id: Uuid,
        course_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<bool> {
        self.require_user(user_id)?;
        if !self.source.course_exists(course_id)? {
            return Err(Error::NotFound(format!("course {course_id}")));
        }
        self.any_active_for_course(user_id, course_id, now)
    }

    fn has_active_subscription_for_lesson(
        &self,
        user_id: Uuid,
        lesson_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<bool> {
        self.require_user(user_id)?;
        let course_id = self
            .source
            .lesson_course(lesson_id)?
            .ok_or_else(|| Error::NotFound(format!("lesson {lesson_id}")))?;

        // The owning course may itself have been deleted; that is orphaned
        // containment and resolves to false through the empty package set.
        self.any_active_for_course(user_id, course_id, now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use std::collections::{HashMap, HashSet};

    /// In-memory source with explicit containment, no clock of its own
    #[derive(Default)]
    struct FixtureSource {
        users: HashSet<Uuid>,
        packages: HashSet<Uuid>,
        courses: HashSet<Uuid>,
        lesson_owner: HashMap<Uuid, Uuid>,
        course_packages: HashMap<Uuid, Vec<Uuid>>,
        subscriptions: Vec<Subscription>,
    }

    impl EntitlementSource for FixtureSource {
        fn user_exists(&self, user_id: Uuid) -> Result<bool> {
            Ok(self.users.contains(&user_id))
        }

        fn package_exists(&self, package_id: Uuid) -> Result<bool> {
            Ok(self.packages.contains(&package_id))
        }

        fn course_exists(&self, course_id: Uuid) -> Result<bool> {
            Ok(self.courses.contains(&course_id))
        }

        fn lesson_course(&self, lesson_id: Uuid) -> Result<Option<Uuid>> {
            Ok(self.lesson_owner.get(&lesson_id).copied())
        }

        fn packages_containing_course(&self, course_id: Uuid) -> Result<Vec<Uuid>> {
            Ok(self.course_packages.get(&course_id).cloned().unwrap_or_default())
        }

        fn subscriptions_for(&self, user_id: Uuid, package_id: Uuid) -> Result<Vec<Subscription>> {
            Ok(self
                .subscriptions
                .iter()
                .filter(|s| s.user_id == user_id && s.package_id == package_id)
                .cloned()
                .collect())
        }
    }

    struct Fixture {
        source: FixtureSource,
        user: Uuid,
        package: Uuid,
        course: Uuid,
        lesson: Uuid,
        now: DateTime<Utc>,
    }

    /// One user, one package containing one course with one lesson
    fn fixture() -> Fixture {
        let mut source = FixtureSource::default();
        let user = Uuid::new_v4();
        let package = Uuid::new_v4();
        let course = Uuid::new_v4();
        let lesson = Uuid::new_v4();

        source.users.insert(user);
        source.packages.insert(package);
        source.courses.insert(course);
        source.lesson_owner.insert(lesson, course);
        source.course_packages.insert(course, vec![package]);

        Fixture {
            source,
            user,
            package,
            course,
            lesson,
            now: Utc::now(),
        }
    }

    fn window(user: Uuid, package: Uuid, start: DateTime<Utc>, end: DateTime<Utc>) -> Subscription {
        Subscription {
            id: Uuid::new_v4(),
            user_id: user,
            package_id: package,
            start_date: start,
            end_date: end,
        }
    }

    #[test]
    fn test_active_subscription_grants_lesson() {
        let mut f = fixture();
        f.source.subscriptions.push(window(
            f.user,
            f.package,
            f.now - Duration::days(10),
            f.now + Duration::days(355),
        ));

        let engine = EntitlementEngine::new(&f.source);
        assert!(engine
            .has_active_subscription_for_lesson(f.user, f.lesson, f.now)
            .unwrap());
    }

    #[test]
    fn test_expired_subscription_denies_lesson() {
        let mut f = fixture();
        f.source.subscriptions.push(window(
            f.user,
            f.package,
            f.now - Duration::days(375),
            f.now - Duration::days(1),
        ));

        let engine = EntitlementEngine::new(&f.source);
        assert!(!engine
            .has_active_subscription_for_lesson(f.user, f.lesson, f.now)
            .unwrap());
    }

    #[test]
    fn test_end_date_boundary_is_inclusive() {
        let mut f = fixture();
        f.source.subscriptions.push(window(
            f.user,
            f.package,
            f.now - Duration::days(365),
            f.now,
        ));

        let engine = EntitlementEngine::new(&f.source);
        // end_date == now is still active
        assert!(engine
            .has_active_subscription_for_package(f.user, f.package, f.now)
            .unwrap());
        // one tick past is not
        assert!(!engine
            .has_active_subscription_for_package(
                f.user,
                f.package,
                f.now + Duration::nanoseconds(1)
            )
            .unwrap());
    }

    #[test]
    fn test_future_start_inactive_until_reached() {
        let mut f = fixture();
        let start = f.now + Duration::days(3);
        f.source
            .subscriptions
            .push(window(f.user, f.package, start, start + Duration::days(365)));

        let engine = EntitlementEngine::new(&f.source);
        assert!(!engine
            .has_active_subscription_for_package(f.user, f.package, f.now)
            .unwrap());
        assert!(engine
            .has_active_subscription_for_package(f.user, f.package, start)
            .unwrap());
    }

    #[test]
    fn test_course_reachable_through_any_package() {
        let mut f = fixture();
        // Second package also contains the course; only it has an active sub
        let other = Uuid::new_v4();
        f.source.packages.insert(other);
        f.source
            .course_packages
            .get_mut(&f.course)
            .unwrap()
            .push(other);
        f.source.subscriptions.push(window(
            f.user,
            other,
            f.now - Duration::days(1),
            f.now + Duration::days(364),
        ));

        let engine = EntitlementEngine::new(&f.source);
        assert!(engine
            .has_active_subscription_for_course(f.user, f.course, f.now)
            .unwrap());
        // The first package alone still says no
        assert!(!engine
            .has_active_subscription_for_package(f.user, f.package, f.now)
            .unwrap());
    }

    #[test]
    fn test_lesson_check_equals_course_check() {
        let mut f = fixture();
        f.source.subscriptions.push(window(
            f.user,
            f.package,
            f.now - Duration::days(10),
            f.now + Duration::days(355),
        ));

        let engine = EntitlementEngine::new(&f.source);
        let by_lesson = engine
            .has_active_subscription_for_lesson(f.user, f.lesson, f.now)
            .unwrap();
        let by_course = engine
            .has_active_subscription_for_course(f.user, f.course, f.now)
            .unwrap();
        assert_eq!(by_lesson, by_course);
    }

    #[test]
    fn test_orphaned_course_resolves_false() {
        let mut f = fixture();
        f.source.course_packages.remove(&f.course);

        let engine = EntitlementEngine::new(&f.source);
        assert!(!engine
            .has_active_subscription_for_course(f.user, f.course, f.now)
            .unwrap());
    }

    #[test]
    fn test_lesson_with_deleted_course_resolves_false() {
        let mut f = fixture();
        // Course row is gone but the lesson still points at it
        f.source.courses.remove(&f.course);
        f.source.course_packages.remove(&f.course);

        let engine = EntitlementEngine::new(&f.source);
        assert!(!engine
            .has_active_subscription_for_lesson(f.user, f.lesson, f.now)
            .unwrap());
    }

    #[test]
    fn test_unknown_ids_are_not_found() {
        let f = fixture();
        let engine = EntitlementEngine::new(&f.source);

        let err = engine
            .has_active_subscription_for_lesson(f.user, Uuid::new_v4(), f.now)
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));

        let err = engine
            .has_active_subscription_for_package(Uuid::new_v4(), f.package, f.now)
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));

        let err = engine
            .has_active_subscription_for_course(f.user, Uuid::new_v4(), f.now)
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn test_duplicate_subscriptions_are_harmless() {
        let mut f = fixture();
        for _ in 0..3 {
            f.source.subscriptions.push(window(
                f.user,
                f.package,
                f.now - Duration::days(5),
                f.now + Duration::days(360),
            ));
        }

        let engine = EntitlementEngine::new(&f.source);
        assert!(engine
            .has_active_subscription_for_package(f.user, f.package, f.now)
            .unwrap());
    }

    #[test]
    fn test_engine_over_sqlite_database() {
        use crate::models::{Course, Lesson, Package, Role, User};

        let db = Database::open_in_memory().unwrap();
        let user = User::new(
            "alice".into(),
            "alice@example.com".into(),
            "hash".into(),
            Role::Student,
        );
        let package = Package::new("Complete".into(), None, 9900);
        let course = Course::new("Rust Basics".into(), None);
        let lesson = Lesson::new(course.id, "Ownership".into(), 1);

        db.users().create(&user).unwrap();
        db.packages().create(&package).unwrap();
        db.courses().create(&course).unwrap();
        db.lessons().create(&lesson).unwrap();
        db.packages().add_course(package.id, course.id).unwrap();

        let now = Utc::now();
        db.subscriptions()
            .create(&Subscription::purchase(
                user.id,
                package.id,
                now - Duration::days(10),
            ))
            .unwrap();

        let engine = EntitlementEngine::new(&db);
        assert!(engine
            .has_active_subscription_for_lesson(user.id, lesson.id, now)
            .unwrap());
        assert!(engine
            .has_active_subscription_for_course(user.id, course.id, now)
            .unwrap());
        assert!(engine
            .has_active_subscription_for_package(user.id, package.id, now)
            .unwrap());

        // Removing the course from the package revokes reachability at once
        db.packages().remove_course(package.id, course.id).unwrap();
        assert!(!engine
            .has_active_subscription_for_lesson(user.id, lesson.id, now)
            .unwrap());
    }

    #[test]
    fn test_repeated_calls_are_idempotent() {
        let mut f = fixture();
        f.source.subscriptions.push(window(
            f.user,
            f.package,
            f.now - Duration::days(10),
            f.now + Duration::days(355),
        ));

        let engine = EntitlementEngine::new(&f.source);
        let first = engine
            .has_active_subscription_for_lesson(f.user, f.lesson, f.now)
            .unwrap();
        for _ in 0..5 {
            let again = engine
                .has_active_subscription_for_lesson(f.user, f.lesson, f.now)
                .unwrap();
            assert_eq!(first, again);
        }
    }
}
