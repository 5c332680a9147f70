//! Access decision policy for content resources
//!
//! The role bypass is decided HERE, before the entitlement engine is ever
//! consulted, which keeps the engine pure and independently testable:
//!
//! - Admin and Teacher principals see everything.
//! - Free lessons are open to any authenticated principal.
//! - Everything else is gated by the engine's subscription check.
//!
//! Denials surface as `PermissionDenied` (403-class); an unknown resource id
//! inside the engine surfaces as `NotFound` (404-class) and propagates
//! untouched.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::entitlement::EntitlementQueries;
use crate::error::{Error, Result};
use crate::models::{Lesson, Role};

/// The authenticated caller, extracted from the request context upstream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal {
    pub user_id: Uuid,
    pub role: Role,
}

impl Principal {
    pub fn new(user_id: Uuid, role: Role) -> Self {
        Self { user_id, role }
    }
}

/// Grant or deny access to a package for this principal at `now`
pub fn check_package_access<E: EntitlementQueries>(
    engine: &E,
    principal: Principal,
    package_id: Uuid,
    now: DateTime<Utc>,
) -> Result<()> {
    if principal.role.bypasses_entitlement() {
        return Ok(());
    }

    if engine.has_active_subscription_for_package(principal.user_id, package_id, now)? {
        Ok(())
    } else {
        Err(Error::PermissionDenied(
            "You do not have access to this package".into(),
        ))
    }
}

/// Grant or deny access to a course for this principal at `now`
pub fn check_course_access<E: EntitlementQueries>(
    engine: &E,
    principal: Principal,
    course_id: Uuid,
    now: DateTime<Utc>,
) -> Result<()> {
    if principal.role.bypasses_entitlement() {
        return Ok(());
    }

    if engine.has_active_subscription_for_course(principal.user_id, course_id, now)? {
        Ok(())
    } else {
        Err(Error::PermissionDenied(
            "You do not have access to this course".into(),
        ))
    }
}

/// Grant or deny access to a lesson for this principal at `now`
///
/// Takes the lesson itself: the caller has already resolved the id (a missing
/// lesson is its 404), and the free-content exception needs the flag.
pub fn check_lesson_access<E: EntitlementQueries>(
    engine: &E,
    principal: Principal,
    lesson: &Lesson,
    now: DateTime<Utc>,
) -> Result<()> {
    if principal.role.bypasses_entitlement() {
        return Ok(());
    }

    if lesson.is_free {
        return Ok(());
    }

    if engine.has_active_subscription_for_lesson(principal.user_id, lesson.id, now)? {
        Ok(())
    } else {
        Err(Error::PermissionDenied(
            "You do not have access to this lesson".into(),
        ))
    }
}
