//! Lektora Core Library
//!
//! Domain models, storage, entitlement checks, access policy, and account
//! services for the Lektora course platform.

pub mod access;
pub mod auth;
pub mod config;
pub mod enroll;
pub mod entitlement;
pub mod error;
pub mod invariants;
pub mod models;
pub mod storage;

pub use access::{check_course_access, check_lesson_access, check_package_access, Principal};
pub use auth::AuthService;
pub use config::{Config, ConfigError};
pub use enroll::EnrollmentService;
pub use entitlement::{EntitlementEngine, EntitlementQueries, EntitlementSource};
pub use error::{Error, Result};
pub use models::*;
pub use storage::{
    CatalogRepository, Database, QuizRepository, Storage, SubscriptionRepository, UserRepository,
};
