//! Domain models

mod catalog;
mod quiz;
mod subscription;
mod user;

pub use catalog::{Course, Lesson, Package};
pub use quiz::{Quiz, QuizQuestion};
pub use subscription::Subscription;
pub use user::{Role, Session, User};
